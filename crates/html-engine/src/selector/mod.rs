//! A hand-built CSS Selectors Level 4 engine: tokenizer, grammar parser, and
//! a matcher that walks the tagged tree.
//!
//! The three stages mirror the CSS Syntax Level 3 pipeline: tokens are
//! grouped into component values, component values are interpreted as the
//! selector grammar, and the grammar is evaluated right-to-left against
//! document-order tree traversal.
//!
//! @see https://www.w3.org/TR/selectors-4/
//! @see https://www.w3.org/TR/css-syntax-3/

mod css_tokenizer;
mod matcher;
mod parser;

pub use matcher::{query_selector, query_selector_all};
pub use parser::{
    AnB, AttrMatcher, AttrSelector, CaseSensitivity, Combinator, CompoundSelector, ComplexSelector, NsPrefix, ParseContext,
    PseudoClass, SelectorError, SelectorList, SubclassSelector, TypeSelector,
};

/// Parses a selector list, resolving namespace prefixes against `ctx`.
pub fn parse_selector(source: &str, ctx: &ParseContext) -> Result<SelectorList, SelectorError> {
    parser::parse_selector_list(source, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat_mode::CompatMode;
    use crate::encoding::{EncodingConfidence, Utf8Decoder};
    use crate::error::IgnoreErrors;
    use crate::tree_builder::parse_document;

    #[test]
    fn parse_and_query_round_trip() {
        let mut errors = IgnoreErrors;
        let mut decoder = Utf8Decoder;
        let (tree, doc, _) = parse_document(
            "<body><ul><li class=\"x\">a</li><li>b</li></ul></body>".as_bytes(),
            EncodingConfidence::Irrelevant,
            &mut decoder,
            &mut errors,
        );
        let ctx = ParseContext::default();
        let list = parse_selector("li.x", &ctx).unwrap();
        let found = query_selector(&tree, doc, CompatMode::NoQuirks, &ctx, &list);
        assert!(found.is_some());
    }
}
