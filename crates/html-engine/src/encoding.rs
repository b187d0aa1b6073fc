//! The decoder boundary: turns a byte stream into the code-point stream the
//! tokenizer consumes, plus the `<meta charset>` sniff that can ask a host to
//! restart parsing with a different label.
//!
//! The tokenizer and tree constructor never see bytes or encoding labels;
//! everything here is a host-facing convenience layered in front of them.
//!
//! @see https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding
//! @see https://encoding.spec.whatwg.org/

use memchr::memmem;

/// How sure the host is of the encoding it handed the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingConfidence {
    /// A BOM or a transport-level label (e.g. an HTTP `Content-Type` charset
    /// parameter) fixed the encoding; a `<meta charset>` found later must
    /// not override it.
    Certain,
    /// No BOM or transport label was available; a `<meta charset>` found
    /// while scanning the head may override the guess.
    Tentative,
    /// The source is known not to carry a meaningful encoding (e.g. it was
    /// already decoded by the host). No sniff is performed.
    Irrelevant,
}

/// Consumes a byte stream and produces Unicode scalar values.
///
/// A decoder is a sink: the host feeds it bytes and it hands back code
/// points, replacing any sequence it cannot decode with U+FFFD rather than
/// failing. This crate ships [`Utf8Decoder`] as a convenience for hosts that
/// already have UTF-8 bytes; anything else is a host-supplied implementation
/// against the WHATWG Encoding registry.
pub trait Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String;
}

/// A `Decoder` covering exactly one label: UTF-8. Invalid sequences are
/// replaced with U+FFFD, matching the Encoding standard's UTF-8 decoder
/// error behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Decoder;

impl Decoder for Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Scans the first 1024 bytes of `bytes` for a `<meta charset="...">` or
/// `<meta http-equiv="content-type" content="...charset=...">` declaration,
/// per the encoding sniffing algorithm's prescan step. Returns the raw label
/// found, if any; resolving it to a known encoding is the host's job.
///
/// This crate performs the sniff as a byte-level prescan rather than by
/// running the full tokenizer and tree constructor and intercepting `<meta>`
/// in `in_head`, since the sniff must happen *before* a single parse with a
/// committed encoding begins.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<Box<str>> {
    let window = &bytes[..bytes.len().min(1024)];
    let mut search_from = 0;
    while let Some(rel) = memmem::find(&window[search_from..], b"<meta") {
        let tag_start = search_from + rel;
        let Some(tag_end_rel) = memmem::find(&window[tag_start..], b">") else {
            break;
        };
        let tag = &window[tag_start..tag_start + tag_end_rel];
        if let Some(label) = extract_charset_attribute(tag) {
            return Some(label);
        }
        if let Some(label) = extract_content_type_charset(tag) {
            return Some(label);
        }
        search_from = tag_start + tag_end_rel + 1;
    }
    None
}

fn ascii_lower(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(u8::to_ascii_lowercase).collect()
}

fn extract_charset_attribute(tag: &[u8]) -> Option<Box<str>> {
    let lower = ascii_lower(tag);
    let pos = memmem::find(&lower, b"charset")?;
    let rest = &tag[pos + "charset".len()..];
    let value = attribute_value_after_equals(rest)?;
    Some(String::from_utf8_lossy(value).trim().into())
}

fn extract_content_type_charset(tag: &[u8]) -> Option<Box<str>> {
    let lower = ascii_lower(tag);
    memmem::find(&lower, b"http-equiv")?;
    let pos = memmem::find(&lower, b"content=")?;
    let rest = &tag[pos + "content=".len()..];
    let value = attribute_value_after_equals(rest)?;
    let lower_value = ascii_lower(value);
    let charset_pos = memmem::find(&lower_value, b"charset=")?;
    let after = &value[charset_pos + "charset=".len()..];
    let label: Vec<u8> = after
        .iter()
        .copied()
        .take_while(|&b| !matches!(b, b';' | b'"' | b'\'' | b' '))
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&label).into())
    }
}

/// Given the bytes immediately following an attribute name, skips an `=` and
/// optional whitespace/quote, then returns the quoted or bare value.
fn attribute_value_after_equals(rest: &[u8]) -> Option<&[u8]> {
    let mut i = 0;
    while rest.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    if rest.get(i) != Some(&b'=') {
        return None;
    }
    i += 1;
    while rest.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    match rest.get(i) {
        Some(&quote @ (b'"' | b'\'')) => {
            let start = i + 1;
            let end = rest[start..].iter().position(|&b| b == quote)? + start;
            Some(&rest[start..end])
        }
        Some(_) => {
            let start = i;
            let end = rest[start..].iter().position(|&b| b.is_ascii_whitespace()).map_or(rest.len(), |p| start + p);
            Some(&rest[start..end])
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_utf8() {
        let mut decoder = Utf8Decoder;
        assert_eq!(decoder.decode("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn strips_leading_bom() {
        let mut decoder = Utf8Decoder;
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"hi");
        assert_eq!(decoder.decode(&bytes), "hi");
    }

    #[test]
    fn replaces_invalid_sequences() {
        let mut decoder = Utf8Decoder;
        assert_eq!(decoder.decode(&[0x68, 0xFF, 0x69]), "h\u{FFFD}i");
    }

    #[test]
    fn sniffs_meta_charset_attribute() {
        let html = b"<html><head><meta charset=\"shift-jis\"></head></html>";
        assert_eq!(sniff_meta_charset(html).as_deref(), Some("shift-jis"));
    }

    #[test]
    fn sniffs_http_equiv_content_type() {
        let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\">";
        assert_eq!(sniff_meta_charset(html).as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn no_meta_charset_yields_none() {
        assert_eq!(sniff_meta_charset(b"<html><head><title>x</title></head></html>"), None);
    }
}
