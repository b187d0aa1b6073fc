//! Parse errors and the sink that receives them.
//!
//! The HTML parsing algorithm is defined to recover from nearly every kind
//! of malformed input; a "parse error" in the spec's sense never aborts
//! parsing, it just gets reported. This module keeps that contract: parsing
//! always produces a tree, and [`ParseError`] values are delivered to a
//! caller-supplied sink rather than returned as `Err`. `Result` is reserved
//! for genuine host-level failures (I/O, fragment contexts that can't be
//! constructed, and so on).

use std::fmt;

/// One of the named parse errors from the tokenization and tree
/// construction stages.
///
/// @see https://html.spec.whatwg.org/#parse-errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    AbruptClosingOfEmptyComment,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    AbsenceOfDigitsInNumericCharacterReference,
    CdataInHtmlContent,
    CharacterReferenceOutsideUnicodeRange,
    ControlCharacterInInputStream,
    ControlCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInDoctype,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidCharacterSequenceAfterDoctypeName,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingDoctypeName,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    MissingEndTagName,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    MissingSemicolonAfterCharacterReference,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingWhitespaceBeforeDoctypeName,
    MissingWhitespaceBetweenAttributes,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    NestedComment,
    NoncharacterCharacterReference,
    NullCharacterReference,
    SurrogateCharacterReference,
    SurrogateInInputStream,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedNullCharacter,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnknownNamedCharacterReference,

    // Tree construction errors.
    UnexpectedDoctype,
    UnexpectedStartTagInHead,
    UnexpectedEndTag,
    UnexpectedStartTagIgnored,
    UnexpectedTokenInForeignContent,
    AdoptionAgencyReachedIterationLimit,
    ClosedElementsWithOpenChildren,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.into())
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for &str {
    fn from(val: ParseError) -> Self {
        use ParseError as E;
        match val {
            E::AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            E::AbruptDoctypePublicIdentifier => "abrupt-doctype-public-identifier",
            E::AbruptDoctypeSystemIdentifier => "abrupt-doctype-system-identifier",
            E::AbsenceOfDigitsInNumericCharacterReference => {
                "absence-of-digits-in-numeric-character-reference"
            }
            E::CdataInHtmlContent => "cdata-in-html-content",
            E::CharacterReferenceOutsideUnicodeRange => {
                "character-reference-outside-unicode-range"
            }
            E::ControlCharacterInInputStream => "control-character-in-input-stream",
            E::ControlCharacterReference => "control-character-reference",
            E::DuplicateAttribute => "duplicate-attribute",
            E::EndTagWithAttributes => "end-tag-with-attributes",
            E::EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            E::EofBeforeTagName => "eof-before-tag-name",
            E::EofInCdata => "eof-in-cdata",
            E::EofInComment => "eof-in-comment",
            E::EofInDoctype => "eof-in-doctype",
            E::EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            E::EofInTag => "eof-in-tag",
            E::IncorrectlyClosedComment => "incorrectly-closed-comment",
            E::IncorrectlyOpenedComment => "incorrectly-opened-comment",
            E::InvalidCharacterSequenceAfterDoctypeName => {
                "invalid-character-sequence-after-doctype-name"
            }
            E::InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            E::MissingAttributeValue => "missing-attribute-value",
            E::MissingDoctypeName => "missing-doctype-name",
            E::MissingDoctypePublicIdentifier => "missing-doctype-public-identifier",
            E::MissingDoctypeSystemIdentifier => "missing-doctype-system-identifier",
            E::MissingEndTagName => "missing-end-tag-name",
            E::MissingQuoteBeforeDoctypePublicIdentifier => {
                "missing-quote-before-doctype-public-identifier"
            }
            E::MissingQuoteBeforeDoctypeSystemIdentifier => {
                "missing-quote-before-doctype-system-identifier"
            }
            E::MissingSemicolonAfterCharacterReference => {
                "missing-semicolon-after-character-reference"
            }
            E::MissingWhitespaceAfterDoctypePublicKeyword => {
                "missing-whitespace-after-doctype-public-keyword"
            }
            E::MissingWhitespaceAfterDoctypeSystemKeyword => {
                "missing-whitespace-after-doctype-system-keyword"
            }
            E::MissingWhitespaceBeforeDoctypeName => "missing-whitespace-before-doctype-name",
            E::MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            E::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers => {
                "missing-whitespace-between-doctype-public-and-system-identifiers"
            }
            E::NestedComment => "nested-comment",
            E::NoncharacterCharacterReference => "noncharacter-character-reference",
            E::NullCharacterReference => "null-character-reference",
            E::SurrogateCharacterReference => "surrogate-character-reference",
            E::SurrogateInInputStream => "surrogate-in-input-stream",
            E::UnexpectedCharacterAfterDoctypeSystemIdentifier => {
                "unexpected-character-after-doctype-system-identifier"
            }
            E::UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            E::UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            }
            E::UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            }
            E::UnexpectedNullCharacter => "unexpected-null-character",
            E::UnexpectedQuestionMarkInsteadOfTagName => {
                "unexpected-question-mark-instead-of-tag-name"
            }
            E::UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            E::UnknownNamedCharacterReference => "unknown-named-character-reference",
            E::UnexpectedDoctype => "unexpected-doctype",
            E::UnexpectedStartTagInHead => "unexpected-start-tag-in-head",
            E::UnexpectedEndTag => "unexpected-end-tag",
            E::UnexpectedStartTagIgnored => "unexpected-start-tag-ignored",
            E::UnexpectedTokenInForeignContent => "unexpected-token-in-foreign-content",
            E::AdoptionAgencyReachedIterationLimit => "adoption-agency-reached-iteration-limit",
            E::ClosedElementsWithOpenChildren => "closed-elements-with-open-children",
        }
    }
}

impl From<&ParseError> for &str {
    fn from(val: &ParseError) -> Self {
        (*val).into()
    }
}

/// Byte offset range in the original input that a reported error pertains
/// to, for callers that want to underline the offending markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HtmlSpan {
    pub start: usize,
    pub len: usize,
}

/// Receives parse errors as parsing proceeds.
///
/// The default no-op sink is appropriate for callers who only want the
/// resulting tree. Implement this to collect diagnostics, or to log them
/// with `log::warn!` the way a browser's developer console would.
pub trait ParseErrorSink {
    fn report(&mut self, error: ParseError, at: HtmlSpan);
}

/// A sink that discards every error.
#[derive(Default)]
pub struct IgnoreErrors;

impl ParseErrorSink for IgnoreErrors {
    fn report(&mut self, _error: ParseError, _at: HtmlSpan) {}
}

/// A sink that collects every error into a `Vec`, in order.
#[derive(Default)]
pub struct CollectErrors {
    pub errors: Vec<(ParseError, HtmlSpan)>,
}

impl ParseErrorSink for CollectErrors {
    fn report(&mut self, error: ParseError, at: HtmlSpan) {
        self.errors.push((error, at));
    }
}

/// A sink that forwards every error to the `log` crate at `warn` level.
///
/// @see https://html.spec.whatwg.org/#parse-errors
#[derive(Default)]
pub struct LogErrors;

impl ParseErrorSink for LogErrors {
    fn report(&mut self, error: ParseError, at: HtmlSpan) {
        log::warn!(
            "{} at byte {}..{}",
            error,
            at.start,
            at.start + at.len
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_is_kebab_case() {
        assert_eq!(ParseError::EofInTag.to_string(), "eof-in-tag");
        assert_eq!(
            ParseError::MissingSemicolonAfterCharacterReference.to_string(),
            "missing-semicolon-after-character-reference"
        );
    }

    #[test]
    fn collect_sink_records_in_order() {
        let mut sink = CollectErrors::default();
        sink.report(ParseError::EofInTag, HtmlSpan { start: 0, len: 1 });
        sink.report(ParseError::DuplicateAttribute, HtmlSpan { start: 4, len: 2 });
        assert_eq!(sink.errors.len(), 2);
        assert_eq!(sink.errors[0].0, ParseError::EofInTag);
    }
}
