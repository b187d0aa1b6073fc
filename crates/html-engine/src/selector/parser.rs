//! Component values and the Selectors Level 4 grammar built on top of them.
//!
//! @see https://www.w3.org/TR/css-syntax-3/#parser-entrypoints
//! @see https://www.w3.org/TR/selectors-4/#grammar

use super::css_tokenizer::{CssToken, CssTokenizer};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Brace,
    Bracket,
    Paren,
}

/// A token, function, or simple block, per the "component value" production.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    Token(CssToken),
    Function { name: Box<str>, value: Vec<ComponentValue> },
    SimpleBlock { open: BlockType, value: Vec<ComponentValue> },
}

/// Groups a flat token stream into the nested component-value shape the
/// grammar is defined over.
///
/// @see https://www.w3.org/TR/css-syntax-3/#consume-a-list-of-component-values
fn consume_component_values(tokens: &[CssToken], pos: &mut usize) -> Vec<ComponentValue> {
    let mut out = Vec::new();
    while *pos < tokens.len() {
        match &tokens[*pos] {
            CssToken::Eof => break,
            CssToken::RightBrace | CssToken::RightBracket | CssToken::RightParen => break,
            CssToken::LeftBrace => {
                *pos += 1;
                let value = consume_component_values(tokens, pos);
                if *pos < tokens.len() && tokens[*pos] == CssToken::RightBrace {
                    *pos += 1;
                }
                out.push(ComponentValue::SimpleBlock { open: BlockType::Brace, value });
            }
            CssToken::LeftBracket => {
                *pos += 1;
                let value = consume_component_values(tokens, pos);
                if *pos < tokens.len() && tokens[*pos] == CssToken::RightBracket {
                    *pos += 1;
                }
                out.push(ComponentValue::SimpleBlock { open: BlockType::Bracket, value });
            }
            CssToken::LeftParen => {
                *pos += 1;
                let value = consume_component_values(tokens, pos);
                if *pos < tokens.len() && tokens[*pos] == CssToken::RightParen {
                    *pos += 1;
                }
                out.push(ComponentValue::SimpleBlock { open: BlockType::Paren, value });
            }
            CssToken::Function(name) => {
                let name = name.clone();
                *pos += 1;
                let value = consume_component_values(tokens, pos);
                if *pos < tokens.len() && tokens[*pos] == CssToken::RightParen {
                    *pos += 1;
                }
                out.push(ComponentValue::Function { name, value });
            }
            other => {
                out.push(ComponentValue::Token(other.clone()));
                *pos += 1;
            }
        }
    }
    out
}

pub fn parse_component_values(source: &str) -> Vec<ComponentValue> {
    let tokens = CssTokenizer::tokenize_all(source);
    let mut pos = 0;
    consume_component_values(&tokens, &mut pos)
}

// ---- namespace resolution context ------------------------------------------

/// Prefix bindings available while resolving namespace-qualified selectors.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub namespaces: FxHashMap<Box<str>, Box<str>>,
    pub default_namespace: Option<Box<str>>,
}

impl ParseContext {
    pub fn bind(&mut self, prefix: impl Into<Box<str>>, uri: impl Into<Box<str>>) -> &mut Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }
}

// ---- selector AST -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum NsPrefix {
    /// No prefix written: matches any namespace for attributes, the
    /// context's default namespace (if any) for type selectors.
    None,
    /// `*|`: explicitly matches any namespace.
    Any,
    /// `ns|`: resolved against [`ParseContext::namespaces`].
    Named(Box<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSelector {
    Universal { namespace: NsPrefix },
    Named { namespace: NsPrefix, local_name: Box<str> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMatcher {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    CaseSensitive,
    AsciiCaseInsensitive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrSelector {
    pub namespace: NsPrefix,
    pub name: Box<str>,
    pub test: Option<(AttrMatcher, Box<str>, CaseSensitivity)>,
}

/// An `An+B` expression, as used by `:nth-child()` and relatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnB {
    pub a: i32,
    pub b: i32,
}

impl AnB {
    /// Does the 1-indexed position `index` satisfy `an + b`?
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let k = index - self.b;
        k % self.a == 0 && k / self.a >= 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Scope,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(AnB),
    NthLastChild(AnB),
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    /// A syntactically valid pseudo-class outside this crate's supported
    /// set (e.g. `:hover`, `:checked`). Parses so a selector list isn't
    /// rejected wholesale, but never matches any element.
    Unsupported(Box<str>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubclassSelector {
    Id(Box<str>),
    Class(Box<str>),
    Attr(AttrSelector),
    PseudoClass(PseudoClass),
    /// Parsed for grammar completeness but never matched against a live
    /// tree; no notion of rendering/layout exists here to give it meaning.
    PseudoElement(Box<str>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub type_selector: Option<TypeSelector>,
    pub subclasses: Vec<SubclassSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorList(pub Vec<ComplexSelector>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    pub message: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector: {}", self.message)
    }
}

impl std::error::Error for SelectorError {}

fn err(message: impl Into<String>) -> SelectorError {
    SelectorError { message: message.into() }
}

/// Parses a selector list against `ctx`'s namespace bindings.
pub fn parse_selector_list(source: &str, ctx: &ParseContext) -> Result<SelectorList, SelectorError> {
    let values = parse_component_values(source);
    let mut p = Parser { values: &values, pos: 0, ctx };
    p.parse_selector_list()
}

struct Parser<'a> {
    values: &'a [ComponentValue],
    pos: usize,
    ctx: &'a ParseContext,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a ComponentValue> {
        self.skip_ws_peek()
    }

    fn skip_ws_peek(&self) -> Option<&'a ComponentValue> {
        let mut i = self.pos;
        while let Some(ComponentValue::Token(CssToken::Whitespace)) = self.values.get(i) {
            i += 1;
        }
        self.values.get(i)
    }

    fn skip_ws(&mut self) {
        while matches!(self.values.get(self.pos), Some(ComponentValue::Token(CssToken::Whitespace))) {
            self.pos += 1;
        }
    }

    fn next(&mut self) -> Option<&'a ComponentValue> {
        self.skip_ws();
        let v = self.values.get(self.pos);
        if v.is_some() {
            self.pos += 1;
        }
        v
    }

    fn bump_raw(&mut self) -> Option<&'a ComponentValue> {
        let v = self.values.get(self.pos);
        if v.is_some() {
            self.pos += 1;
        }
        v
    }

    fn parse_selector_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut out = Vec::new();
        loop {
            out.push(self.parse_complex_selector()?);
            self.skip_ws();
            match self.values.get(self.pos) {
                Some(ComponentValue::Token(CssToken::Comma)) => {
                    self.pos += 1;
                }
                None => break,
                Some(other) => return Err(err(format!("unexpected token after selector: {other:?}"))),
            }
        }
        Ok(SelectorList(out))
    }

    fn parse_complex_selector(&mut self) -> Result<ComplexSelector, SelectorError> {
        let first = self.parse_compound_selector()?;
        let mut rest = Vec::new();
        loop {
            let Some(combinator) = self.peek_combinator() else { break };
            self.consume_combinator_tokens(combinator);
            self.skip_ws();
            let compound = self.parse_compound_selector()?;
            rest.push((combinator, compound));
        }
        Ok(ComplexSelector { first, rest })
    }

    /// Looks ahead for a combinator without consuming it, distinguishing a
    /// bare-whitespace descendant combinator from the start of the next
    /// comma-separated selector or end of input.
    fn peek_combinator(&self) -> Option<Combinator> {
        let mut i = self.pos;
        let mut saw_ws = false;
        while let Some(ComponentValue::Token(CssToken::Whitespace)) = self.values.get(i) {
            saw_ws = true;
            i += 1;
        }
        match self.values.get(i) {
            Some(ComponentValue::Token(CssToken::Delim('>'))) => Some(Combinator::Child),
            Some(ComponentValue::Token(CssToken::Delim('+'))) => Some(Combinator::NextSibling),
            Some(ComponentValue::Token(CssToken::Delim('~'))) => Some(Combinator::SubsequentSibling),
            Some(ComponentValue::Token(CssToken::Comma)) | None => None,
            Some(_) if saw_ws => Some(Combinator::Descendant),
            Some(_) => None,
        }
    }

    fn consume_combinator_tokens(&mut self, combinator: Combinator) {
        self.skip_ws();
        if combinator != Combinator::Descendant {
            self.pos += 1;
        }
    }

    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        if let Some(ts) = self.try_parse_type_selector()? {
            compound.type_selector = Some(ts);
        }
        loop {
            match self.values.get(self.pos) {
                Some(ComponentValue::Token(CssToken::Hash { value, is_id: true })) => {
                    compound.subclasses.push(SubclassSelector::Id(value.clone()));
                    self.pos += 1;
                }
                Some(ComponentValue::Token(CssToken::Hash { is_id: false, .. })) => {
                    return Err(err("id selector must start with a letter"));
                }
                Some(ComponentValue::Token(CssToken::Delim('.'))) => {
                    self.pos += 1;
                    let name = self.expect_ident()?;
                    compound.subclasses.push(SubclassSelector::Class(name));
                }
                Some(ComponentValue::SimpleBlock { open: BlockType::Bracket, value }) => {
                    let attr = self.parse_attr_selector(value)?;
                    compound.subclasses.push(SubclassSelector::Attr(attr));
                    self.pos += 1;
                }
                Some(ComponentValue::Token(CssToken::Colon)) => {
                    self.pos += 1;
                    let is_element = matches!(self.values.get(self.pos), Some(ComponentValue::Token(CssToken::Colon)));
                    if is_element {
                        self.pos += 1;
                    }
                    compound.subclasses.push(self.parse_pseudo(is_element)?);
                }
                _ => break,
            }
        }
        if compound.type_selector.is_none() && compound.subclasses.is_empty() {
            return Err(err("empty compound selector"));
        }
        Ok(compound)
    }

    fn expect_ident(&mut self) -> Result<Box<str>, SelectorError> {
        match self.bump_raw() {
            Some(ComponentValue::Token(CssToken::Ident(name))) => Ok(name.clone()),
            other => Err(err(format!("expected identifier, got {other:?}"))),
        }
    }

    fn resolve_ns_prefix(&self, prefix: Option<&str>) -> NsPrefix {
        match prefix {
            None => NsPrefix::None,
            Some("*") => NsPrefix::Any,
            Some(p) => NsPrefix::Named(p.into()),
        }
    }

    fn try_parse_type_selector(&mut self) -> Result<Option<TypeSelector>, SelectorError> {
        self.skip_ws();
        let save = self.pos;

        let prefix = match self.values.get(self.pos) {
            Some(ComponentValue::Token(CssToken::Ident(p))) if self.values.get(self.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('|'))) => {
                let p = p.clone();
                self.pos += 2;
                Some(p)
            }
            Some(ComponentValue::Token(CssToken::Delim('*'))) if self.values.get(self.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('|'))) => {
                self.pos += 2;
                Some(Box::from("*"))
            }
            _ => None,
        };

        match self.values.get(self.pos) {
            Some(ComponentValue::Token(CssToken::Ident(name))) => {
                let name = name.clone();
                self.pos += 1;
                Ok(Some(TypeSelector::Named { namespace: self.resolve_ns_prefix(prefix.as_deref()), local_name: name }))
            }
            Some(ComponentValue::Token(CssToken::Delim('*'))) => {
                self.pos += 1;
                Ok(Some(TypeSelector::Universal { namespace: self.resolve_ns_prefix(prefix.as_deref()) }))
            }
            _ => {
                if prefix.is_some() {
                    return Err(err("expected name after namespace prefix"));
                }
                self.pos = save;
                Ok(None)
            }
        }
    }

    fn parse_attr_selector(&mut self, inner: &[ComponentValue]) -> Result<AttrSelector, SelectorError> {
        let mut p = Parser { values: inner, pos: 0, ctx: self.ctx };
        p.skip_ws();

        let prefix = match inner.get(p.pos) {
            Some(ComponentValue::Token(CssToken::Ident(ident))) if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('|'))) => {
                let ident = ident.clone();
                p.pos += 2;
                Some(ident)
            }
            Some(ComponentValue::Token(CssToken::Delim('*'))) if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('|'))) => {
                p.pos += 2;
                Some(Box::from("*"))
            }
            _ => None,
        };
        let name = p.expect_ident()?;
        p.skip_ws();

        let test = match inner.get(p.pos) {
            None => None,
            Some(ComponentValue::Token(tok)) => {
                let matcher = match tok {
                    CssToken::Delim('=') => {
                        p.pos += 1;
                        AttrMatcher::Equals
                    }
                    CssToken::Delim('~') if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('='))) => {
                        p.pos += 2;
                        AttrMatcher::Includes
                    }
                    CssToken::Delim('|') if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('='))) => {
                        p.pos += 2;
                        AttrMatcher::DashMatch
                    }
                    CssToken::Delim('^') if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('='))) => {
                        p.pos += 2;
                        AttrMatcher::Prefix
                    }
                    CssToken::Delim('$') if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('='))) => {
                        p.pos += 2;
                        AttrMatcher::Suffix
                    }
                    CssToken::Delim('*') if inner.get(p.pos + 1) == Some(&ComponentValue::Token(CssToken::Delim('='))) => {
                        p.pos += 2;
                        AttrMatcher::Substring
                    }
                    other => return Err(err(format!("unsupported attribute matcher {other:?}"))),
                };
                p.skip_ws();
                let value = match inner.get(p.pos) {
                    Some(ComponentValue::Token(CssToken::String(s))) => {
                        p.pos += 1;
                        s.clone()
                    }
                    Some(ComponentValue::Token(CssToken::Ident(s))) => {
                        p.pos += 1;
                        s.clone()
                    }
                    other => return Err(err(format!("expected attribute value, got {other:?}"))),
                };
                p.skip_ws();
                let case = match inner.get(p.pos) {
                    Some(ComponentValue::Token(CssToken::Ident(flag))) if flag.eq_ignore_ascii_case("i") => {
                        p.pos += 1;
                        CaseSensitivity::AsciiCaseInsensitive
                    }
                    Some(ComponentValue::Token(CssToken::Ident(flag))) if flag.eq_ignore_ascii_case("s") => {
                        p.pos += 1;
                        CaseSensitivity::CaseSensitive
                    }
                    _ => CaseSensitivity::CaseSensitive,
                };
                Some((matcher, value, case))
            }
            Some(other) => return Err(err(format!("unexpected token in attribute selector: {other:?}"))),
        };

        Ok(AttrSelector { namespace: self.resolve_ns_prefix(prefix.as_deref()), name, test })
    }

    fn parse_pseudo(&mut self, is_element: bool) -> Result<SubclassSelector, SelectorError> {
        match self.bump_raw() {
            Some(ComponentValue::Token(CssToken::Ident(name))) => {
                if is_element {
                    return Ok(SubclassSelector::PseudoElement(name.clone()));
                }
                let pc = match name.to_ascii_lowercase().as_str() {
                    "root" => PseudoClass::Root,
                    "scope" => PseudoClass::Scope,
                    "empty" => PseudoClass::Empty,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    other => PseudoClass::Unsupported(other.into()),
                };
                Ok(SubclassSelector::PseudoClass(pc))
            }
            Some(ComponentValue::Function { name, value }) => {
                if is_element {
                    return Ok(SubclassSelector::PseudoElement(name.clone()));
                }
                let lower = name.to_ascii_lowercase();
                match lower.as_str() {
                    "not" | "is" | "where" => {
                        let mut inner = Parser { values: value, pos: 0, ctx: self.ctx };
                        let list = inner.parse_selector_list()?;
                        let pc = match lower.as_str() {
                            "not" => PseudoClass::Not(list),
                            "is" => PseudoClass::Is(list),
                            _ => PseudoClass::Where(list),
                        };
                        Ok(SubclassSelector::PseudoClass(pc))
                    }
                    "nth-child" | "nth-last-child" => {
                        let anb = parse_anb(value)?;
                        let pc = if lower == "nth-child" { PseudoClass::NthChild(anb) } else { PseudoClass::NthLastChild(anb) };
                        Ok(SubclassSelector::PseudoClass(pc))
                    }
                    _ => Ok(SubclassSelector::PseudoClass(PseudoClass::Unsupported(name.clone()))),
                }
            }
            other => Err(err(format!("expected pseudo-class name, got {other:?}"))),
        }
    }
}

/// Parses the `<an+b>` micro-syntax used by `:nth-child()` and friends.
///
/// @see https://www.w3.org/TR/css-syntax-3/#anb-microsyntax
fn parse_anb(value: &[ComponentValue]) -> Result<AnB, SelectorError> {
    let toks: Vec<&ComponentValue> = value
        .iter()
        .filter(|v| !matches!(v, ComponentValue::Token(CssToken::Whitespace)))
        .collect();

    if toks.len() == 1 {
        if let ComponentValue::Token(CssToken::Ident(id)) = toks[0] {
            if id.eq_ignore_ascii_case("odd") {
                return Ok(AnB { a: 2, b: 1 });
            }
            if id.eq_ignore_ascii_case("even") {
                return Ok(AnB { a: 2, b: 0 });
            }
        }
        if let ComponentValue::Token(CssToken::Number { value, is_integer: true }) = toks[0] {
            return Ok(AnB { a: 0, b: *value as i32 });
        }
        if let ComponentValue::Token(CssToken::Dimension { value, unit }) = toks[0] {
            if unit.eq_ignore_ascii_case("n") {
                return Ok(AnB { a: *value as i32, b: 0 });
            }
        }
    }

    // General `<n-dimension> <signed-integer>` / `<ndash-dimension> <signless-integer>` form.
    if toks.len() >= 2 {
        if let ComponentValue::Token(CssToken::Dimension { value, unit }) = toks[0] {
            if unit.eq_ignore_ascii_case("n") {
                let a = *value as i32;
                return parse_anb_tail(&toks[1..]).map(|b| AnB { a, b });
            }
            if unit.eq_ignore_ascii_case("n-") && toks.len() == 2 {
                if let ComponentValue::Token(CssToken::Number { value: bv, is_integer: true }) = toks[1] {
                    return Ok(AnB { a: *value as i32, b: -(*bv as i32) });
                }
            }
        }
        if let ComponentValue::Token(CssToken::Ident(id)) = toks[0] {
            if id.eq_ignore_ascii_case("n") {
                return parse_anb_tail(&toks[1..]).map(|b| AnB { a: 1, b });
            }
            if id.eq_ignore_ascii_case("-n") {
                return parse_anb_tail(&toks[1..]).map(|b| AnB { a: -1, b });
            }
        }
    }

    Err(err("invalid An+B expression"))
}

fn parse_anb_tail(rest: &[&ComponentValue]) -> Result<i32, SelectorError> {
    match rest {
        [] => Ok(0),
        [ComponentValue::Token(CssToken::Number { value, is_integer: true })] => Ok(*value as i32),
        [ComponentValue::Token(CssToken::Delim('+')), ComponentValue::Token(CssToken::Number { value, is_integer: true })] => Ok(*value as i32),
        [ComponentValue::Token(CssToken::Delim('-')), ComponentValue::Token(CssToken::Number { value, is_integer: true })] => Ok(-(*value as i32)),
        _ => Err(err("invalid An+B tail")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SelectorList {
        parse_selector_list(s, &ParseContext::default()).unwrap()
    }

    #[test]
    fn parses_tag_class_and_id() {
        let list = parse("div.card#main");
        assert_eq!(list.0.len(), 1);
        let compound = &list.0[0].first;
        assert_eq!(compound.type_selector, Some(TypeSelector::Named { namespace: NsPrefix::None, local_name: "div".into() }));
        assert_eq!(compound.subclasses.len(), 2);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse("ul > li a");
        let complex = &list.0[0];
        assert_eq!(complex.rest[0].0, Combinator::Child);
        assert_eq!(complex.rest[1].0, Combinator::Descendant);
    }

    #[test]
    fn parses_attribute_selector_with_case_flag() {
        let list = parse("input[type=\"checkbox\" i]");
        match &list.0[0].first.subclasses[0] {
            SubclassSelector::Attr(attr) => {
                assert_eq!(attr.name.as_ref(), "type");
                assert_eq!(attr.test.as_ref().unwrap().2, CaseSensitivity::AsciiCaseInsensitive);
            }
            other => panic!("expected attribute selector, got {other:?}"),
        }
    }

    #[test]
    fn parses_nth_child_an_b() {
        let list = parse(":nth-child(2n+1)");
        match &list.0[0].first.subclasses[0] {
            SubclassSelector::PseudoClass(PseudoClass::NthChild(anb)) => {
                assert_eq!(*anb, AnB { a: 2, b: 1 });
            }
            other => panic!("expected nth-child, got {other:?}"),
        }
    }

    #[test]
    fn parses_odd_even_keywords() {
        let list = parse(":nth-child(odd)");
        match &list.0[0].first.subclasses[0] {
            SubclassSelector::PseudoClass(PseudoClass::NthChild(anb)) => assert_eq!(*anb, AnB { a: 2, b: 1 }),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_nested_is_not() {
        let list = parse(":is(div, span):not(.hidden)");
        assert_eq!(list.0[0].first.subclasses.len(), 2);
    }

    #[test]
    fn rejects_malformed_selector() {
        assert!(parse_selector_list("###", &ParseContext::default()).is_err());
    }

    #[test]
    fn comma_separates_selector_list() {
        let list = parse("h1, h2, h3");
        assert_eq!(list.0.len(), 3);
    }
}
