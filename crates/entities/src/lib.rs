//! Decoding of HTML character references (entities).
//!
//! Named character references are resolved against a static table built with
//! `phf` so the lookup costs nothing at startup and the binary carries no
//! build-time data file. Numeric character references are decoded directly
//! per the WHATWG rules, including the legacy Windows-1252 remapping of the
//! C1 control range.

mod named_refs;

/// U+FFFD REPLACEMENT CHARACTER
const UNICODE_REPLACEMENT_CHAR: &[u8] = b"\xEF\xBF\xBD";

/// Where character reference decoding is taking place.
///
/// Attribute values tolerate "ambiguous ampersands" differently than text
/// content does: a reference without a trailing semicolon followed by an
/// alphanumeric character or `=` is left alone inside an attribute, since
/// browsers have long tolerated things like `href="?a&b=1"`.
#[derive(Debug, PartialEq)]
pub enum HtmlContext {
    Attribute,
    BodyText,
    ForeignText,
    Script,
    Style,
}

/// Decodes every character reference found in `input`, returning the
/// resulting byte string. Bytes that aren't part of a reference are passed
/// through unchanged.
pub fn decode(ctx: &HtmlContext, input: &[u8]) -> Box<[u8]> {
    let mut decoded: Vec<u8> = Vec::new();
    let end = input.len();
    let mut at = 0;
    let mut was_at = 0;

    while at + 1 < end {
        let next_character_reference_at = if let Some(pos) = memchr::memchr(b'&', &input[at..]) {
            at + pos
        } else {
            break;
        };

        if let Some((character_reference, token_len)) =
            decode_html_ref(ctx, input, next_character_reference_at)
        {
            if *ctx == HtmlContext::Attribute {
                let is_ambiguous_entity_terminator =
                    input[next_character_reference_at + token_len - 1] != b';';

                if is_ambiguous_entity_terminator
                    && (end > next_character_reference_at + token_len
                        && (input[next_character_reference_at + token_len].is_ascii_alphanumeric()
                            || input[next_character_reference_at + token_len] == b'='))
                {
                    at = next_character_reference_at + 1;
                    continue;
                }
            }

            at = next_character_reference_at;
            decoded.extend_from_slice(&input[was_at..at]);
            decoded.extend_from_slice(&character_reference);
            at += token_len;
            was_at = at;
            continue;
        }

        at = next_character_reference_at + 1;
    }

    if was_at < end {
        decoded.extend_from_slice(&input[was_at..]);
    }

    decoded.into_boxed_slice()
}

/// Decodes a single reference to an HTML entity starting at `offset`, which
/// must point at the `&`. Returns the decoded bytes and the length of the
/// matched span, or `None` if no reference starts there.
pub fn decode_html_ref(
    ctx: &HtmlContext,
    input: &[u8],
    offset: usize,
) -> Option<(Box<[u8]>, usize)> {
    if input.len() < offset + 2 {
        return None;
    }

    if input[offset] != b'&' {
        return None;
    }

    if input[offset + 1] == b'#' {
        return decode_html5_numeric_character_reference(input, offset);
    }

    decode_named_character_reference(ctx, input, offset)
}

/// Longest-match lookup against the named character reference table.
///
/// The HTML5 tokenizer finds the longest run of characters after `&` that
/// forms a valid entity name, preferring a match terminated with `;`.
/// Legacy entities without a trailing semicolon are only matched here;
/// the caller is responsible for the ambiguous-ampersand carve-out inside
/// attribute values.
fn decode_named_character_reference(
    _ctx: &HtmlContext,
    input: &[u8],
    offset: usize,
) -> Option<(Box<[u8]>, usize)> {
    let rest = &input[offset + 1..];
    let scan_len = rest
        .iter()
        .take(named_refs::MAX_NAME_LEN + 1)
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b';')
        .count();

    if scan_len == 0 {
        return None;
    }

    for len in (1..=scan_len).rev() {
        let candidate = &rest[..len];
        let Ok(name) = std::str::from_utf8(candidate) else {
            continue;
        };
        if let Some(value) = named_refs::NAMED_REFS.get(name) {
            return Some((value.as_bytes().into(), 1 + len));
        }
    }

    None
}

fn decode_html5_numeric_character_reference(
    input: &[u8],
    offset: usize,
) -> Option<(Box<[u8]>, usize)> {
    static HEX_DIGITS: [u8; 256] = {
        let mut table = [255u8; 256];
        let mut i = 0;
        while i < 10 {
            table[b'0' as usize + i] = i as u8;
            i += 1;
        }
        let mut i = 0;
        while i < 6 {
            table[b'a' as usize + i] = 10 + i as u8;
            table[b'A' as usize + i] = 10 + i as u8;
            i += 1;
        }
        table
    };

    static CP1252_REPLACEMENTS: [u32; 32] = [
        0x20AC, // 0x80 -> EURO SIGN (€).
        0x81,   // 0x81 -> (no change).
        0x201A, // 0x82 -> SINGLE LOW-9 QUOTATION MARK (‚).
        0x0192, // 0x83 -> LATIN SMALL LETTER F WITH HOOK (ƒ).
        0x201E, // 0x84 -> DOUBLE LOW-9 QUOTATION MARK („).
        0x2026, // 0x85 -> HORIZONTAL ELLIPSIS (…).
        0x2020, // 0x86 -> DAGGER (†).
        0x2021, // 0x87 -> DOUBLE DAGGER (‡).
        0x02C6, // 0x88 -> MODIFIER LETTER CIRCUMFLEX ACCENT (ˆ).
        0x2030, // 0x89 -> PER MILLE SIGN (‰).
        0x0160, // 0x8A -> LATIN CAPITAL LETTER S WITH CARON (Š).
        0x2039, // 0x8B -> SINGLE LEFT-POINTING ANGLE QUOTATION MARK (‹).
        0x0152, // 0x8C -> LATIN CAPITAL LIGATURE OE (Œ).
        0x8D,   // 0x8D -> (no change).
        0x017D, // 0x8E -> LATIN CAPITAL LETTER Z WITH CARON (Ž).
        0x8F,   // 0x8F -> (no change).
        0x90,   // 0x90 -> (no change).
        0x2018, // 0x91 -> LEFT SINGLE QUOTATION MARK (').
        0x2019, // 0x92 -> RIGHT SINGLE QUOTATION MARK (').
        0x201C, // 0x93 -> LEFT DOUBLE QUOTATION MARK (").
        0x201D, // 0x94 -> RIGHT DOUBLE QUOTATION MARK (").
        0x2022, // 0x95 -> BULLET (•).
        0x2013, // 0x96 -> EN DASH (–).
        0x2014, // 0x97 -> EM DASH (—).
        0x02DC, // 0x98 -> SMALL TILDE (˜).
        0x2122, // 0x99 -> TRADE MARK SIGN (™).
        0x0161, // 0x9A -> LATIN SMALL LETTER S WITH CARON (š).
        0x203A, // 0x9B -> SINGLE RIGHT-POINTING ANGLE QUOTATION MARK (›).
        0x0153, // 0x9C -> LATIN SMALL LIGATURE OE (œ).
        0x9D,   // 0x9D -> (no change).
        0x017E, // 0x9E -> LATIN SMALL LETTER Z WITH CARON (ž).
        0x0178, // 0x9F -> LATIN CAPITAL LETTER Y WITH DIAERESIS (Ÿ).
    ];

    let end = input.len();
    let mut at = offset;

    if end < offset + 3 {
        return None;
    }

    if input[at] != b'&' {
        return None;
    }

    if input[at + 1] != b'#' {
        return None;
    }

    at += 2;

    #[derive(PartialEq)]
    enum Base {
        Decimal,
        Hexadecimal,
    }

    let base = if at < end && b'X' == (input[at] & 0xDF) {
        at += 1;
        Base::Hexadecimal
    } else {
        Base::Decimal
    };

    let zeros_at = at;
    while at < end && b'0' == input[at] {
        at += 1;
    }
    let zero_count = at - zeros_at;

    let digits_at = at;
    if base == Base::Hexadecimal {
        while at < end && HEX_DIGITS[input[at] as usize] <= 0xF {
            at += 1;
        }
    } else {
        while at < end && HEX_DIGITS[input[at] as usize] <= 0x9 {
            at += 1;
        }
    }
    let digit_count = at - digits_at;
    let after_digits = at;

    let has_trailing_semicolon = (after_digits < end) && b';' == input[after_digits];
    let end_of_span = if has_trailing_semicolon {
        after_digits + 1
    } else {
        after_digits
    };
    let matched_byte_length = end_of_span - offset;

    // `&#` or `&#x` without digits returns into plaintext.
    if zero_count == 0 && digit_count == 0 {
        return None;
    }

    // Whereas `&#` and only zeros is invalid.
    if digit_count == 0 {
        return Some((UNICODE_REPLACEMENT_CHAR.into(), matched_byte_length));
    }

    // If there are too many digits then it's not worth parsing. It's invalid.
    if digit_count > if base == Base::Hexadecimal { 6 } else { 7 } {
        return Some((UNICODE_REPLACEMENT_CHAR.into(), matched_byte_length));
    }

    let mut code_point = 0u32;
    at = digits_at;
    if base == Base::Hexadecimal {
        for _ in 0..digit_count {
            code_point <<= 4;
            code_point += HEX_DIGITS[input[at] as usize] as u32;
            at += 1;
        }
    } else {
        for _ in 0..digit_count {
            code_point *= 10;
            code_point += HEX_DIGITS[input[at] as usize] as u32;
            at += 1;
        }
    }

    if (0x80..=0x9F).contains(&code_point) {
        code_point = CP1252_REPLACEMENTS[(code_point - 0x80) as usize];
    }

    if (0xD800..=0xDFFF).contains(&code_point) || code_point > 0x10FFFF {
        return Some((UNICODE_REPLACEMENT_CHAR.into(), matched_byte_length));
    }

    Some((
        html5_code_point_to_utf8_bytes(code_point),
        matched_byte_length,
    ))
}

fn html5_code_point_to_utf8_bytes(code_point: u32) -> Box<[u8]> {
    let mut slice = [0u8; 4];
    char::from_u32(code_point).map_or(UNICODE_REPLACEMENT_CHAR.into(), |c| {
        c.encode_utf8(&mut slice);
        slice[..c.len_utf8()].into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_out_of_range_numeric_hex_entity() {
        let input = b"&#xFFFFFF;";
        let decoded = decode(&HtmlContext::BodyText, input);
        let decoded = String::from_utf8(decoded.to_vec()).unwrap();
        assert_eq!(decoded, "\u{FFFD}");
    }

    #[test]
    fn decode_ref_out_of_range_numeric_hex_entity() {
        let input = b"&#xFFFFFF;";
        let (decoded, token_len) = decode_html_ref(&HtmlContext::BodyText, input, 0).unwrap();
        let decoded = String::from_utf8(decoded.to_vec()).unwrap();
        assert_eq!(decoded, "\u{FFFD}");
        assert_eq!(token_len, 10);
    }

    #[test]
    fn decode_surrogate_numeric_entity_is_replacement() {
        let input = b"&#xD800;";
        let (decoded, _) = decode_html_ref(&HtmlContext::BodyText, input, 0).unwrap();
        assert_eq!(decoded.as_ref(), UNICODE_REPLACEMENT_CHAR);
    }

    #[test]
    fn decode_cp1252_remap() {
        // &#128; is in the C1 control range and is remapped to U+20AC.
        let (decoded, len) = decode_html_ref(&HtmlContext::BodyText, b"&#128;", 0).unwrap();
        assert_eq!(String::from_utf8(decoded.to_vec()).unwrap(), "\u{20AC}");
        assert_eq!(len, 6);
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(
            decode_html_ref(&HtmlContext::BodyText, b"&amp;", 0),
            Some((b"&".as_slice().into(), 5))
        );
        assert_eq!(
            decode_html_ref(&HtmlContext::BodyText, b"&lt;", 0),
            Some((b"<".as_slice().into(), 4))
        );
        assert_eq!(
            decode_html_ref(&HtmlContext::BodyText, b"&gt;", 0),
            Some((b">".as_slice().into(), 4))
        );
        assert_eq!(
            decode_html_ref(&HtmlContext::BodyText, b"&quot;", 0),
            Some((b"\"".as_slice().into(), 6))
        );
    }

    #[test]
    fn test_legacy_entity_without_semicolon() {
        assert_eq!(
            decode_html_ref(&HtmlContext::BodyText, b"&nbsp", 0),
            Some((b"\xC2\xA0".as_slice().into(), 5))
        );
    }

    #[test]
    fn test_longest_match_wins() {
        // "&not" is a legacy entity on its own, but "&notin;" should match
        // the longer, more specific name rather than stopping at "&not".
        let (decoded, len) = decode_html_ref(&HtmlContext::BodyText, b"&notin;", 0).unwrap();
        assert_eq!(len, 7);
        assert_eq!(String::from_utf8(decoded.to_vec()).unwrap(), "\u{2209}");
    }

    #[test]
    fn ambiguous_ampersand_left_alone_in_attribute() {
        let input = b"?a&b=1";
        let decoded = decode(&HtmlContext::Attribute, input);
        assert_eq!(decoded.as_ref(), input.as_slice());
    }

    #[test]
    fn unterminated_reference_passes_through() {
        let input = b"Q&A";
        let decoded = decode(&HtmlContext::BodyText, input);
        assert_eq!(decoded.as_ref(), input.as_slice());
    }
}
