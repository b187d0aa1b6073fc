//! CSS Syntax Level 3 tokenizer, scoped to what the selector grammar needs.
//!
//! @see https://www.w3.org/TR/css-syntax-3/#tokenization

#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    Ident(Box<str>),
    Function(Box<str>),
    AtKeyword(Box<str>),
    Hash { value: Box<str>, is_id: bool },
    String(Box<str>),
    BadString,
    Url(Box<str>),
    BadUrl,
    Delim(char),
    Number { value: f64, is_integer: bool },
    Percentage(f64),
    Dimension { value: f64, unit: Box<str> },
    Whitespace,
    Cdo,
    Cdc,
    Colon,
    Semicolon,
    Comma,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Eof,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{0020}')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

fn is_non_printable(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{0008}' | '\u{000B}' | '\u{000E}'..='\u{001F}' | '\u{007F}')
}

/// Consumes one CSS token at a time from a preprocessed code-point buffer.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl CssTokenizer {
    pub fn new(source: &str) -> Self {
        let mut input = Vec::with_capacity(source.len());
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    input.push('\n');
                }
                '\u{000C}' => input.push('\n'),
                '\u{0000}' => input.push('\u{FFFD}'),
                _ => input.push(c),
            }
        }
        Self { input, pos: 0 }
    }

    /// Runs the tokenizer to completion, terminated by a trailing `Eof`.
    pub fn tokenize_all(source: &str) -> Vec<CssToken> {
        let mut tok = CssTokenizer::new(source);
        let mut out = Vec::new();
        loop {
            let next = tok.consume_token();
            let done = next == CssToken::Eof;
            out.push(next);
            if done {
                break;
            }
        }
        out
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn starts_escape(&self) -> bool {
        self.peek(0) == Some('\\') && self.peek(1) != Some('\n')
    }

    fn starts_ident_sequence(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some('-') => match self.peek(offset + 1) {
                Some(c) if is_name_start(c) || c == '-' => true,
                Some('\\') => self.peek(offset + 2) != Some('\n'),
                _ => false,
            },
            Some(c) if is_name_start(c) => true,
            Some('\\') => self.peek(offset + 1) != Some('\n'),
            _ => false,
        }
    }

    fn starts_number(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => matches!(self.peek(offset + 1), Some(c) if c.is_ascii_digit()),
            Some('+') | Some('-') => match self.peek(offset + 1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => matches!(self.peek(offset + 2), Some(c) if c.is_ascii_digit()),
                _ => false,
            },
            _ => false,
        }
    }

    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            None => '\u{FFFD}',
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::new();
                hex.push(c);
                while hex.len() < 6 {
                    match self.peek(0) {
                        Some(d) if d.is_ascii_hexdigit() => {
                            hex.push(d);
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                if self.peek(0).is_some_and(is_whitespace) {
                    self.pos += 1;
                }
                let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
                if code == 0 || code > 0x10FFFF || (0xD800..=0xDFFF).contains(&code) {
                    '\u{FFFD}'
                } else {
                    char::from_u32(code).unwrap_or('\u{FFFD}')
                }
            }
            Some(c) => c,
        }
    }

    fn consume_ident_sequence(&mut self) -> Box<str> {
        let mut s = String::new();
        loop {
            match self.peek(0) {
                Some(c) if is_name(c) => {
                    s.push(c);
                    self.pos += 1;
                }
                Some('\\') if self.starts_escape() => {
                    self.pos += 1;
                    s.push(self.consume_escaped_code_point());
                }
                _ => break,
            }
        }
        s.into()
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        let mut s = String::new();
        loop {
            let rest = &self.input[self.pos..];
            let jump = rest
                .iter()
                .position(|&c| c == quote || c == '\\' || c == '\n');
            match jump {
                None => {
                    s.push_str(&rest.iter().collect::<String>());
                    self.pos = self.input.len();
                    break;
                }
                Some(i) => {
                    s.extend(&rest[..i]);
                    self.pos += i;
                    match self.peek(0) {
                        None => break,
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some('\n') => return CssToken::BadString,
                        Some('\\') => {
                            if self.peek(1) == Some('\n') {
                                self.pos += 2;
                            } else if self.peek(1).is_none() {
                                self.pos += 1;
                            } else {
                                self.pos += 1;
                                s.push(self.consume_escaped_code_point());
                            }
                        }
                        _ => unreachable!(),
                    }
                }
            }
        }
        CssToken::String(s.into())
    }

    fn consume_number(&mut self) -> (f64, bool) {
        let mut repr = String::new();
        let mut is_integer = true;
        if matches!(self.peek(0), Some('+') | Some('-')) {
            repr.push(self.consume().unwrap());
        }
        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            repr.push(self.consume().unwrap());
        }
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            is_integer = false;
            repr.push(self.consume().unwrap());
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                repr.push(self.consume().unwrap());
            }
        }
        if matches!(self.peek(0), Some('e') | Some('E')) {
            let exp_digits_at = if matches!(self.peek(1), Some('+') | Some('-')) { 2 } else { 1 };
            if matches!(self.peek(exp_digits_at), Some(c) if c.is_ascii_digit()) {
                is_integer = false;
                repr.push(self.consume().unwrap());
                if matches!(self.peek(0), Some('+') | Some('-')) {
                    repr.push(self.consume().unwrap());
                }
                while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                    repr.push(self.consume().unwrap());
                }
            }
        }
        (repr.parse().unwrap_or(0.0), is_integer)
    }

    fn consume_numeric_token(&mut self) -> CssToken {
        let (value, is_integer) = self.consume_number();
        if self.starts_ident_sequence(0) {
            let unit = self.consume_ident_sequence();
            CssToken::Dimension { value, unit }
        } else if self.peek(0) == Some('%') {
            self.pos += 1;
            CssToken::Percentage(value)
        } else {
            CssToken::Number { value, is_integer }
        }
    }

    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                None | Some(')') => break,
                Some('\\') if self.starts_escape() => {
                    self.consume_escaped_code_point();
                }
                _ => {}
            }
        }
    }

    fn consume_url_token(&mut self) -> CssToken {
        let mut s = String::new();
        while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
            self.pos += 1;
        }
        loop {
            match self.peek(0) {
                None => break,
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if is_whitespace(c) => {
                    while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
                        self.pos += 1;
                    }
                    if self.peek(0) == Some(')') {
                        self.pos += 1;
                    } else {
                        self.consume_bad_url_remnants();
                        return CssToken::BadUrl;
                    }
                    break;
                }
                Some('"') | Some('\'') | Some('(') => {
                    self.consume_bad_url_remnants();
                    return CssToken::BadUrl;
                }
                Some(c) if is_non_printable(c) => {
                    self.consume_bad_url_remnants();
                    return CssToken::BadUrl;
                }
                Some('\\') => {
                    if self.starts_escape() {
                        self.pos += 1;
                        s.push(self.consume_escaped_code_point());
                    } else {
                        self.consume_bad_url_remnants();
                        return CssToken::BadUrl;
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.pos += 1;
                }
            }
        }
        CssToken::Url(s.into())
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_ident_sequence();
        if name.eq_ignore_ascii_case("url") && self.peek(0) == Some('(') {
            self.pos += 1;
            let mut ahead = 0;
            while matches!(self.peek(ahead), Some(c) if is_whitespace(c)) {
                ahead += 1;
            }
            if matches!(self.peek(ahead), Some('"') | Some('\'')) {
                return CssToken::Function(name);
            }
            return self.consume_url_token();
        }
        if self.peek(0) == Some('(') {
            self.pos += 1;
            return CssToken::Function(name);
        }
        CssToken::Ident(name)
    }

    fn consume_hash(&mut self) -> CssToken {
        self.pos += 1;
        let is_id = self.starts_ident_sequence(0);
        let value = if is_id || matches!(self.peek(0), Some(c) if is_name(c)) || self.starts_escape() {
            self.consume_ident_sequence()
        } else {
            Box::from("")
        };
        CssToken::Hash { value, is_id }
    }

    fn consume_whitespace(&mut self) -> CssToken {
        while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
            self.pos += 1;
        }
        CssToken::Whitespace
    }

    fn skip_comments(&mut self) {
        while self.peek(0) == Some('/') && self.peek(1) == Some('*') {
            self.pos += 2;
            loop {
                match self.peek(0) {
                    None => break,
                    Some('*') if self.peek(1) == Some('/') => {
                        self.pos += 2;
                        break;
                    }
                    Some(_) => self.pos += 1,
                }
            }
        }
    }

    fn consume_token(&mut self) -> CssToken {
        self.skip_comments();
        let Some(c) = self.peek(0) else { return CssToken::Eof };
        match c {
            c if is_whitespace(c) => self.consume_whitespace(),
            '"' | '\'' => {
                self.pos += 1;
                self.consume_string(c)
            }
            '#' => {
                if matches!(self.peek(1), Some(c) if is_name(c)) || self.peek(1) == Some('\\') {
                    self.consume_hash()
                } else {
                    self.pos += 1;
                    CssToken::Delim('#')
                }
            }
            '(' => {
                self.pos += 1;
                CssToken::LeftParen
            }
            ')' => {
                self.pos += 1;
                CssToken::RightParen
            }
            '+' | '.' if self.starts_number(0) => self.consume_numeric_token(),
            ',' => {
                self.pos += 1;
                CssToken::Comma
            }
            '-' => {
                if self.starts_number(0) {
                    self.consume_numeric_token()
                } else if self.peek(1) == Some('-') && self.peek(2) == Some('>') {
                    self.pos += 3;
                    CssToken::Cdc
                } else if self.starts_ident_sequence(0) {
                    self.consume_ident_like()
                } else {
                    self.pos += 1;
                    CssToken::Delim('-')
                }
            }
            ':' => {
                self.pos += 1;
                CssToken::Colon
            }
            ';' => {
                self.pos += 1;
                CssToken::Semicolon
            }
            '<' => {
                if self.peek(1) == Some('!') && self.peek(2) == Some('-') && self.peek(3) == Some('-') {
                    self.pos += 4;
                    CssToken::Cdo
                } else {
                    self.pos += 1;
                    CssToken::Delim('<')
                }
            }
            '@' => {
                self.pos += 1;
                if self.starts_ident_sequence(0) {
                    CssToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CssToken::Delim('@')
                }
            }
            '[' => {
                self.pos += 1;
                CssToken::LeftBracket
            }
            '\\' => {
                if self.starts_escape() {
                    self.consume_ident_like()
                } else {
                    self.pos += 1;
                    CssToken::Delim('\\')
                }
            }
            ']' => {
                self.pos += 1;
                CssToken::RightBracket
            }
            '{' => {
                self.pos += 1;
                CssToken::LeftBrace
            }
            '}' => {
                self.pos += 1;
                CssToken::RightBrace
            }
            c if c.is_ascii_digit() => self.consume_numeric_token(),
            c if is_name_start(c) => self.consume_ident_like(),
            c => {
                self.pos += 1;
                CssToken::Delim(c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<CssToken> {
        let mut v = CssTokenizer::tokenize_all(s);
        v.pop();
        v
    }

    #[test]
    fn simple_compound_selector_tokens() {
        assert_eq!(
            tokens("div.foo#bar"),
            vec![
                CssToken::Ident("div".into()),
                CssToken::Delim('.'),
                CssToken::Ident("foo".into()),
                CssToken::Hash { value: "bar".into(), is_id: true },
            ]
        );
    }

    #[test]
    fn attribute_selector_tokens() {
        assert_eq!(
            tokens("[data-x=\"y\" i]"),
            vec![
                CssToken::LeftBracket,
                CssToken::Ident("data-x".into()),
                CssToken::Delim('='),
                CssToken::String("y".into()),
                CssToken::Whitespace,
                CssToken::Ident("i".into()),
                CssToken::RightBracket,
            ]
        );
    }

    #[test]
    fn functional_pseudo_class_tokens() {
        assert_eq!(
            tokens(":nth-child(2n+1)"),
            vec![
                CssToken::Colon,
                CssToken::Function("nth-child".into()),
                CssToken::Dimension { value: 2.0, unit: "n".into() },
                CssToken::Number { value: 1.0, is_integer: true },
                CssToken::RightParen,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens("a/* comment */b"), vec![CssToken::Ident("a".into()), CssToken::Ident("b".into())]);
    }

    #[test]
    fn unterminated_string_at_eof_is_still_a_string() {
        assert_eq!(tokens("\"abc"), vec![CssToken::String("abc".into())]);
    }

    #[test]
    fn string_with_embedded_newline_is_bad_string() {
        let v = tokens("\"abc\nxyz");
        assert_eq!(v[0], CssToken::BadString);
    }
}
