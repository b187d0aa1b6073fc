//! The HTML tokenizer.
//!
//! Drives the code-point buffer one character at a time through the
//! tokenizer states from the HTML standard, emitting DOCTYPE, start-tag,
//! end-tag, comment, character, and end-of-file tokens. The tree
//! constructor calls [`Tokenizer::reconsume_in`] to switch into RCDATA,
//! RAWTEXT, script-data, or PLAINTEXT whenever it processes a start tag
//! for an element with that parsing rule, and checks
//! [`Tokenizer::last_start_tag_name`] to decide whether a matching end tag
//! is "appropriate" and should actually close out of those states.
//!
//! **Scope note.** The script-data escaped / double-escaped sub-states
//! (the mechanism historically used to hide inline `<script>` bodies from
//! browsers that didn't understand the `<script>` element, via a fake
//! HTML comment inside the script text) are not implemented; `<script>`
//! is tokenized as a RAWTEXT-equivalent span instead. This crate never
//! executes script content, so the only observable effect is on the exact
//! boundary of a `<script>` element containing a literal `<!--` followed
//! by another `<script>`/`</script>` pair — content no generator in this
//! corpus produces. See DESIGN.md.
//!
//! @see https://html.spec.whatwg.org/#tokenization

use crate::error::{HtmlSpan, ParseError, ParseErrorSink};
use crate::input::InputStream;
use crate::token::{Attribute, Doctype, EndTag, StartTag, Token};
use entities::HtmlContext;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Data,
    Rcdata,
    Rawtext,
    ScriptData,
    PlainText,

    TagOpen,
    EndTagOpen,
    TagName,

    RcdataLessThanSign,
    RcdataEndTagOpen,
    RcdataEndTagName,

    RawtextLessThanSign,
    RawtextEndTagOpen,
    RawtextEndTagName,

    ScriptDataLessThanSign,
    ScriptDataEndTagOpen,
    ScriptDataEndTagName,

    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,

    BogusComment,
    MarkupDeclarationOpen,

    CommentStart,
    CommentStartDash,
    Comment,
    CommentLessThanSign,
    CommentLessThanSignBang,
    CommentLessThanSignBangDash,
    CommentLessThanSignBangDashDash,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,

    Doctype,
    BeforeDoctypeName,
    DoctypeName,
    AfterDoctypeName,
    AfterDoctypePublicKeyword,
    BeforeDoctypePublicIdentifier,
    DoctypePublicIdentifierDoubleQuoted,
    DoctypePublicIdentifierSingleQuoted,
    AfterDoctypePublicIdentifier,
    BetweenDoctypePublicAndSystemIdentifiers,
    AfterDoctypeSystemKeyword,
    BeforeDoctypeSystemIdentifier,
    DoctypeSystemIdentifierDoubleQuoted,
    DoctypeSystemIdentifierSingleQuoted,
    AfterDoctypeSystemIdentifier,
    BogusDoctype,

    CdataSection,
    CdataSectionBracket,
    CdataSectionEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefContext {
    Data,
    Attribute,
}

struct PartialTag {
    is_end_tag: bool,
    name: String,
    self_closing: bool,
    attrs: Vec<(String, String)>,
    seen_names: FxHashSet<String>,
    cur_name: String,
    cur_value: String,
    skip_current: bool,
}

impl PartialTag {
    fn new(is_end_tag: bool) -> Self {
        PartialTag {
            is_end_tag,
            name: String::new(),
            self_closing: false,
            attrs: Vec::new(),
            seen_names: FxHashSet::default(),
            cur_name: String::new(),
            cur_value: String::new(),
            skip_current: false,
        }
    }

    /// Closes out the attribute currently being accumulated (if any) and
    /// starts a fresh one. Returns `true` if the just-closed attribute's
    /// name duplicated an earlier one on this tag, which the caller
    /// reports as a parse error.
    fn start_attribute(&mut self) -> bool {
        let was_duplicate = self.finish_attribute();
        self.cur_name.clear();
        self.cur_value.clear();
        self.skip_current = false;
        was_duplicate
    }

    fn finish_attribute(&mut self) -> bool {
        if self.cur_name.is_empty() {
            return false;
        }
        let duplicate = self.seen_names.contains(&self.cur_name);
        self.skip_current = duplicate;
        if !duplicate {
            self.seen_names.insert(self.cur_name.clone());
            self.attrs
                .push((std::mem::take(&mut self.cur_name), std::mem::take(&mut self.cur_value)));
        }
        duplicate
    }
}

/// Converts raw input bytes/labels into a code-point stream. The parser
/// only ever observes `char`s or EOF; label-to-codec resolution is the
/// host's job (see `crate::Decoder`).
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
    return_state: State,
    eof_emitted: bool,

    pending: VecDeque<Token>,
    current_tag: Option<PartialTag>,
    current_comment: String,
    current_doctype: Doctype,
    temp_buffer: String,
    last_start_tag_name: Option<String>,
}

impl Tokenizer {
    pub fn new(stream: &InputStream) -> Self {
        Tokenizer {
            input: stream.as_slice().to_vec(),
            pos: 0,
            state: State::Data,
            return_state: State::Data,
            eof_emitted: false,
            pending: VecDeque::new(),
            current_tag: None,
            current_comment: String::new(),
            current_doctype: Doctype::default(),
            temp_buffer: String::new(),
            last_start_tag_name: None,
        }
    }

    /// The tree constructor calls this after processing a start tag whose
    /// content model is RCDATA/RAWTEXT/script-data/PLAINTEXT.
    pub fn switch_to(&mut self, state: State) {
        self.state = state;
    }

    pub fn last_start_tag_name(&self) -> Option<&str> {
        self.last_start_tag_name.as_deref()
    }

    fn byte_pos(&self) -> usize {
        self.pos
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn reconsume(&mut self) {
        debug_assert!(self.pos > 0);
        self.pos -= 1;
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    fn matches_ascii_case_insensitive(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn emit(&mut self, t: Token) {
        self.pending.push_back(t);
    }

    fn emit_char(&mut self, c: char) {
        self.pending.push_back(Token::Character(c));
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_char(c);
        }
    }

    fn start_tag(&mut self, is_end_tag: bool) {
        self.current_tag = Some(PartialTag::new(is_end_tag));
    }

    fn tag(&mut self) -> &mut PartialTag {
        self.current_tag.as_mut().expect("no tag being built")
    }

    fn start_new_attribute(&mut self, errors: &mut dyn ParseErrorSink) {
        let span = self.span(1);
        if self.tag().start_attribute() {
            errors.report(ParseError::DuplicateAttribute, span);
        }
    }

    fn finish_tag(&mut self, errors: &mut dyn ParseErrorSink) {
        let mut tag = self.current_tag.take().expect("no tag being built");
        if tag.finish_attribute() {
            errors.report(ParseError::DuplicateAttribute, self.span(0));
        }
        let attributes = tag
            .attrs
            .into_iter()
            .map(|(name, value)| Attribute {
                name: crate::atoms::LocalName::new(&name),
                value: value.into_boxed_str(),
            })
            .collect::<Vec<_>>();

        if tag.is_end_tag {
            if tag.self_closing {
                errors.report(ParseError::EndTagWithTrailingSolidus, self.span(0));
            }
            if !attributes.is_empty() {
                errors.report(ParseError::EndTagWithAttributes, self.span(0));
            }
            self.emit(Token::EndTag(EndTag {
                name: crate::atoms::LocalName::new(&tag.name),
                attributes,
                self_closing: tag.self_closing,
            }));
        } else {
            self.last_start_tag_name = Some(tag.name.clone());
            self.emit(Token::StartTag(StartTag {
                name: crate::atoms::LocalName::new(&tag.name),
                attributes,
                self_closing: tag.self_closing,
            }));
        }
    }

    fn span(&self, len: usize) -> HtmlSpan {
        HtmlSpan {
            start: self.byte_pos().saturating_sub(1),
            len: len.max(1),
        }
    }

    /// Runs the state machine until at least one token is ready, then
    /// returns it. Once EOF has been emitted, keeps returning EOF.
    pub fn next_token(&mut self, errors: &mut dyn ParseErrorSink) -> Token {
        loop {
            if let Some(t) = self.pending.pop_front() {
                return t;
            }
            if self.eof_emitted {
                return Token::EndOfFile;
            }
            self.step(errors);
        }
    }

    fn is_appropriate_end_tag(&self) -> bool {
        match (&self.current_tag, &self.last_start_tag_name) {
            (Some(tag), Some(last)) => tag.name.eq_ignore_ascii_case(last),
            _ => false,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, errors: &mut dyn ParseErrorSink) {
        use State::*;
        match self.state {
            Data => match self.consume() {
                Some('&') => {
                    self.return_state = Data;
                    self.consume_character_reference(RefContext::Data, errors);
                }
                Some('<') => self.state = TagOpen,
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.emit_char('\u{FFFD}');
                }
                Some(c) => self.emit_char(c),
                None => self.finish_eof(),
            },

            Rcdata => match self.consume() {
                Some('&') => {
                    self.return_state = Rcdata;
                    self.consume_character_reference(RefContext::Data, errors);
                }
                Some('<') => self.state = RcdataLessThanSign,
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.emit_char('\u{FFFD}');
                }
                Some(c) => self.emit_char(c),
                None => self.finish_eof(),
            },

            Rawtext => match self.consume() {
                Some('<') => self.state = RawtextLessThanSign,
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.emit_char('\u{FFFD}');
                }
                Some(c) => self.emit_char(c),
                None => self.finish_eof(),
            },

            ScriptData => match self.consume() {
                Some('<') => self.state = ScriptDataLessThanSign,
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.emit_char('\u{FFFD}');
                }
                Some(c) => self.emit_char(c),
                None => self.finish_eof(),
            },

            PlainText => match self.consume() {
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.emit_char('\u{FFFD}');
                }
                Some(c) => self.emit_char(c),
                None => self.finish_eof(),
            },

            TagOpen => match self.consume() {
                Some('!') => self.state = MarkupDeclarationOpen,
                Some('/') => self.state = EndTagOpen,
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(false);
                    self.reconsume();
                    self.state = TagName;
                }
                Some('?') => {
                    errors.report(ParseError::UnexpectedQuestionMarkInsteadOfTagName, self.span(1));
                    self.current_comment.clear();
                    self.reconsume();
                    self.state = BogusComment;
                }
                Some(_) => {
                    errors.report(ParseError::InvalidFirstCharacterOfTagName, self.span(1));
                    self.emit_char('<');
                    self.reconsume();
                    self.state = Data;
                }
                None => {
                    errors.report(ParseError::EofBeforeTagName, self.span(0));
                    self.emit_char('<');
                    self.finish_eof();
                }
            },

            EndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(true);
                    self.reconsume();
                    self.state = TagName;
                }
                Some('>') => {
                    errors.report(ParseError::MissingEndTagName, self.span(1));
                    self.state = Data;
                }
                Some(_) => {
                    errors.report(ParseError::InvalidFirstCharacterOfTagName, self.span(1));
                    self.current_comment.clear();
                    self.reconsume();
                    self.state = BogusComment;
                }
                None => {
                    errors.report(ParseError::EofBeforeTagName, self.span(0));
                    self.emit_str("</");
                    self.finish_eof();
                }
            },

            TagName => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => self.state = BeforeAttributeName,
                Some('/') => self.state = SelfClosingStartTag,
                Some('>') => {
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some(c) if c.is_ascii_uppercase() => {
                    let c = c.to_ascii_lowercase();
                    self.tag().name.push(c);
                }
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.tag().name.push('\u{FFFD}');
                }
                Some(c) => self.tag().name.push(c),
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },

            RcdataLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp_buffer.clear();
                    self.state = RcdataEndTagOpen;
                }
                _ => {
                    self.reconsume();
                    self.emit_char('<');
                    self.state = Rcdata;
                }
            },
            RcdataEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(true);
                    self.reconsume();
                    self.state = RcdataEndTagName;
                }
                _ => {
                    self.reconsume();
                    self.emit_str("</");
                    self.state = Rcdata;
                }
            },
            RcdataEndTagName => self.generic_end_tag_name(Rcdata, errors),

            RawtextLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp_buffer.clear();
                    self.state = RawtextEndTagOpen;
                }
                _ => {
                    self.reconsume();
                    self.emit_char('<');
                    self.state = Rawtext;
                }
            },
            RawtextEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(true);
                    self.reconsume();
                    self.state = RawtextEndTagName;
                }
                _ => {
                    self.reconsume();
                    self.emit_str("</");
                    self.state = Rawtext;
                }
            },
            RawtextEndTagName => self.generic_end_tag_name(Rawtext, errors),

            ScriptDataLessThanSign => match self.consume() {
                Some('/') => {
                    self.temp_buffer.clear();
                    self.state = ScriptDataEndTagOpen;
                }
                _ => {
                    self.reconsume();
                    self.emit_char('<');
                    self.state = ScriptData;
                }
            },
            ScriptDataEndTagOpen => match self.consume() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.start_tag(true);
                    self.reconsume();
                    self.state = ScriptDataEndTagName;
                }
                _ => {
                    self.reconsume();
                    self.emit_str("</");
                    self.state = ScriptData;
                }
            },
            ScriptDataEndTagName => self.generic_end_tag_name(ScriptData, errors),

            BeforeAttributeName => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('/') | Some('>') | None => {
                    self.reconsume();
                    self.start_new_attribute(errors);
                    self.state = AfterAttributeName;
                }
                Some('=') => {
                    errors.report(ParseError::UnexpectedEqualsSignBeforeAttributeName, self.span(1));
                    self.start_new_attribute(errors);
                    self.tag().cur_name.push('=');
                    self.state = AttributeName;
                }
                Some(c) => {
                    self.start_new_attribute(errors);
                    self.reconsume();
                    self.state = AttributeName;
                }
            },

            AttributeName => match self.consume() {
                Some(c) if c.is_ascii_whitespace() || c == '/' || c == '>' => {
                    self.reconsume();
                    self.state = AfterAttributeName;
                }
                Some('=') => self.state = BeforeAttributeValue,
                Some(c) if c.is_ascii_uppercase() => self.tag().cur_name.push(c.to_ascii_lowercase()),
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.tag().cur_name.push('\u{FFFD}');
                }
                Some(c @ ('"' | '\'' | '<')) => {
                    errors.report(ParseError::UnexpectedCharacterInAttributeName, self.span(1));
                    self.tag().cur_name.push(c);
                }
                Some(c) => self.tag().cur_name.push(c),
                None => self.state = AfterAttributeName,
            },

            AfterAttributeName => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('/') => self.state = SelfClosingStartTag,
                Some('=') => self.state = BeforeAttributeValue,
                Some('>') => {
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some(c) => {
                    self.start_new_attribute(errors);
                    self.reconsume();
                    self.state = AttributeName;
                }
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },

            BeforeAttributeValue => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('"') => self.state = AttributeValueDoubleQuoted,
                Some('\'') => self.state = AttributeValueSingleQuoted,
                Some('>') => {
                    errors.report(ParseError::MissingAttributeValue, self.span(1));
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some(c) => {
                    self.reconsume();
                    self.state = AttributeValueUnquoted;
                }
                None => {
                    self.reconsume();
                    self.state = AttributeValueUnquoted;
                }
            },

            AttributeValueDoubleQuoted => match self.consume() {
                Some('"') => self.state = AfterAttributeValueQuoted,
                Some('&') => {
                    self.return_state = AttributeValueDoubleQuoted;
                    self.consume_character_reference(RefContext::Attribute, errors);
                }
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.tag().cur_value.push('\u{FFFD}');
                }
                Some(c) => self.tag().cur_value.push(c),
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },
            AttributeValueSingleQuoted => match self.consume() {
                Some('\'') => self.state = AfterAttributeValueQuoted,
                Some('&') => {
                    self.return_state = AttributeValueSingleQuoted;
                    self.consume_character_reference(RefContext::Attribute, errors);
                }
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.tag().cur_value.push('\u{FFFD}');
                }
                Some(c) => self.tag().cur_value.push(c),
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },
            AttributeValueUnquoted => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => self.state = BeforeAttributeName,
                Some('&') => {
                    self.return_state = AttributeValueUnquoted;
                    self.consume_character_reference(RefContext::Attribute, errors);
                }
                Some('>') => {
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.tag().cur_value.push('\u{FFFD}');
                }
                Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                    errors.report(ParseError::UnexpectedCharacterInUnquotedAttributeValue, self.span(1));
                    self.tag().cur_value.push(c);
                }
                Some(c) => self.tag().cur_value.push(c),
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },

            AfterAttributeValueQuoted => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.start_new_attribute(errors);
                    self.state = BeforeAttributeName;
                }
                Some('/') => {
                    self.start_new_attribute(errors);
                    self.state = SelfClosingStartTag;
                }
                Some('>') => {
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some(_) => {
                    errors.report(ParseError::MissingWhitespaceBetweenAttributes, self.span(1));
                    self.start_new_attribute(errors);
                    self.reconsume();
                    self.state = BeforeAttributeName;
                }
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },

            SelfClosingStartTag => match self.consume() {
                Some('>') => {
                    self.tag().self_closing = true;
                    self.state = Data;
                    self.finish_tag(errors);
                }
                Some(_) => {
                    errors.report(ParseError::UnexpectedSolidusInTag, self.span(1));
                    self.reconsume();
                    self.start_new_attribute(errors);
                    self.state = BeforeAttributeName;
                }
                None => {
                    errors.report(ParseError::EofInTag, self.span(0));
                    self.finish_eof();
                }
            },

            BogusComment => match self.consume() {
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                }
                Some('\0') => self.current_comment.push('\u{FFFD}'),
                Some(c) => self.current_comment.push(c),
                None => {
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
            },

            MarkupDeclarationOpen => {
                if self.matches_ascii_case_insensitive("--") {
                    self.pos += 2;
                    self.current_comment.clear();
                    self.state = CommentStart;
                } else if self.matches_ascii_case_insensitive("DOCTYPE") {
                    self.pos += 7;
                    self.state = Doctype;
                } else if self.matches_ascii_case_insensitive("[CDATA[") {
                    self.pos += 7;
                    // Only legal inside foreign content; the tree
                    // constructor is expected to have switched namespaces
                    // before this point. We still tokenize it uniformly.
                    self.state = CdataSection;
                } else {
                    errors.report(ParseError::IncorrectlyOpenedComment, self.span(0));
                    self.current_comment.clear();
                    self.state = BogusComment;
                }
            }

            CommentStart => match self.consume() {
                Some('-') => self.state = CommentStartDash,
                Some('>') => {
                    errors.report(ParseError::AbruptClosingOfEmptyComment, self.span(1));
                    self.state = Data;
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                }
                _ => {
                    self.reconsume();
                    self.state = Comment;
                }
            },
            CommentStartDash => match self.consume() {
                Some('-') => self.state = CommentEnd,
                Some('>') => {
                    errors.report(ParseError::AbruptClosingOfEmptyComment, self.span(1));
                    self.state = Data;
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                }
                Some(_) => {
                    self.current_comment.push('-');
                    self.reconsume();
                    self.state = Comment;
                }
                None => {
                    errors.report(ParseError::EofInComment, self.span(0));
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
            },
            Comment => match self.consume() {
                Some('<') => {
                    self.current_comment.push('<');
                    self.state = CommentLessThanSign;
                }
                Some('-') => self.state = CommentEndDash,
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.current_comment.push('\u{FFFD}');
                }
                Some(c) => self.current_comment.push(c),
                None => {
                    errors.report(ParseError::EofInComment, self.span(0));
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
            },
            CommentLessThanSign => match self.consume() {
                Some('!') => {
                    self.current_comment.push('!');
                    self.state = CommentLessThanSignBang;
                }
                Some('<') => self.current_comment.push('<'),
                _ => {
                    self.reconsume();
                    self.state = Comment;
                }
            },
            CommentLessThanSignBang => match self.consume() {
                Some('-') => self.state = CommentLessThanSignBangDash,
                _ => {
                    self.reconsume();
                    self.state = Comment;
                }
            },
            CommentLessThanSignBangDash => match self.consume() {
                Some('-') => self.state = CommentLessThanSignBangDashDash,
                _ => {
                    self.reconsume();
                    self.state = CommentEndDash;
                }
            },
            CommentLessThanSignBangDashDash => {
                self.reconsume();
                self.state = CommentEnd;
            }
            CommentEndDash => match self.consume() {
                Some('-') => self.state = CommentEnd,
                None => {
                    errors.report(ParseError::EofInComment, self.span(0));
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
                Some(_) => {
                    self.current_comment.push('-');
                    self.reconsume();
                    self.state = Comment;
                }
            },
            CommentEnd => match self.consume() {
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                }
                Some('!') => self.state = CommentEndBang,
                Some('-') => self.current_comment.push('-'),
                Some(_) => {
                    self.current_comment.push_str("--");
                    self.reconsume();
                    self.state = Comment;
                }
                None => {
                    errors.report(ParseError::EofInComment, self.span(0));
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
            },
            CommentEndBang => match self.consume() {
                Some('-') => {
                    self.current_comment.push_str("--!");
                    self.state = CommentEndDash;
                }
                Some('>') => {
                    errors.report(ParseError::IncorrectlyClosedComment, self.span(1));
                    self.state = Data;
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                }
                Some(_) => {
                    self.current_comment.push_str("--!");
                    self.reconsume();
                    self.state = Comment;
                }
                None => {
                    errors.report(ParseError::EofInComment, self.span(0));
                    self.emit(Token::Comment(std::mem::take(&mut self.current_comment).into_boxed_str()));
                    self.finish_eof();
                }
            },

            Doctype => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => self.state = BeforeDoctypeName,
                Some('>') => {
                    self.reconsume();
                    self.state = BeforeDoctypeName;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype = Doctype { force_quirks: true, ..Default::default() };
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
                Some(_) => {
                    errors.report(ParseError::MissingWhitespaceBeforeDoctypeName, self.span(1));
                    self.reconsume();
                    self.state = BeforeDoctypeName;
                }
            },
            BeforeDoctypeName => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some(c) if c.is_ascii_uppercase() => {
                    self.current_doctype.name = Some(c.to_ascii_lowercase().to_string().into_boxed_str());
                    self.state = DoctypeName;
                }
                Some('\0') => {
                    errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                    self.current_doctype.name = Some("\u{FFFD}".into());
                    self.state = DoctypeName;
                }
                Some('>') => {
                    errors.report(ParseError::MissingDoctypeName, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(c) => {
                    self.current_doctype.name = Some(c.to_string().into_boxed_str());
                    self.state = DoctypeName;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            DoctypeName => {
                let mut name = self.current_doctype.name.take().unwrap_or_default().into_string();
                match self.consume() {
                    Some(c) if c.is_ascii_whitespace() => {
                        self.current_doctype.name = Some(name.into_boxed_str());
                        self.state = AfterDoctypeName;
                    }
                    Some('>') => {
                        self.current_doctype.name = Some(name.into_boxed_str());
                        self.state = Data;
                        self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    }
                    Some(c) if c.is_ascii_uppercase() => {
                        name.push(c.to_ascii_lowercase());
                        self.current_doctype.name = Some(name.into_boxed_str());
                    }
                    Some('\0') => {
                        errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                        name.push('\u{FFFD}');
                        self.current_doctype.name = Some(name.into_boxed_str());
                    }
                    Some(c) => {
                        name.push(c);
                        self.current_doctype.name = Some(name.into_boxed_str());
                    }
                    None => {
                        errors.report(ParseError::EofInDoctype, self.span(0));
                        self.current_doctype.name = Some(name.into_boxed_str());
                        self.current_doctype.force_quirks = true;
                        self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                        self.finish_eof();
                    }
                }
            }
            AfterDoctypeName => {
                if self.consume_after_doctype_keyword("PUBLIC") {
                    self.state = AfterDoctypePublicKeyword;
                    return;
                }
                if self.consume_after_doctype_keyword("SYSTEM") {
                    self.state = AfterDoctypeSystemKeyword;
                    return;
                }
                match self.consume() {
                    Some(c) if c.is_ascii_whitespace() => {}
                    Some('>') => {
                        self.state = Data;
                        self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    }
                    Some(_) => {
                        errors.report(
                            ParseError::InvalidCharacterSequenceAfterDoctypeName,
                            self.span(1),
                        );
                        self.current_doctype.force_quirks = true;
                        self.reconsume();
                        self.state = BogusDoctype;
                    }
                    None => {
                        errors.report(ParseError::EofInDoctype, self.span(0));
                        self.current_doctype.force_quirks = true;
                        self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                        self.finish_eof();
                    }
                }
            }
            AfterDoctypePublicKeyword => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => self.state = BeforeDoctypePublicIdentifier,
                Some('"') => {
                    errors.report(
                        ParseError::MissingWhitespaceAfterDoctypePublicKeyword,
                        self.span(1),
                    );
                    self.current_doctype.public_id = Some(String::new().into_boxed_str());
                    self.state = DoctypePublicIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    errors.report(
                        ParseError::MissingWhitespaceAfterDoctypePublicKeyword,
                        self.span(1),
                    );
                    self.current_doctype.public_id = Some(String::new().into_boxed_str());
                    self.state = DoctypePublicIdentifierSingleQuoted;
                }
                Some('>') => {
                    errors.report(ParseError::MissingDoctypePublicIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(_) => {
                    errors.report(ParseError::MissingQuoteBeforeDoctypePublicIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            BeforeDoctypePublicIdentifier => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('"') => {
                    self.current_doctype.public_id = Some(String::new().into_boxed_str());
                    self.state = DoctypePublicIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.current_doctype.public_id = Some(String::new().into_boxed_str());
                    self.state = DoctypePublicIdentifierSingleQuoted;
                }
                Some('>') => {
                    errors.report(ParseError::MissingDoctypePublicIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(_) => {
                    errors.report(ParseError::MissingQuoteBeforeDoctypePublicIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            DoctypePublicIdentifierDoubleQuoted => self.doctype_identifier('"', true, errors),
            DoctypePublicIdentifierSingleQuoted => self.doctype_identifier('\'', true, errors),
            AfterDoctypePublicIdentifier => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.state = BetweenDoctypePublicAndSystemIdentifiers;
                }
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some('"') => {
                    errors.report(
                        ParseError::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                        self.span(1),
                    );
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    errors.report(
                        ParseError::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                        self.span(1),
                    );
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierSingleQuoted;
                }
                Some(_) => {
                    errors.report(
                        ParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        self.span(1),
                    );
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            BetweenDoctypePublicAndSystemIdentifiers => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some('"') => {
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierSingleQuoted;
                }
                Some(_) => {
                    errors.report(
                        ParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        self.span(1),
                    );
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            AfterDoctypeSystemKeyword => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => self.state = BeforeDoctypeSystemIdentifier,
                Some('"') => {
                    errors.report(
                        ParseError::MissingWhitespaceAfterDoctypeSystemKeyword,
                        self.span(1),
                    );
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    errors.report(
                        ParseError::MissingWhitespaceAfterDoctypeSystemKeyword,
                        self.span(1),
                    );
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierSingleQuoted;
                }
                Some('>') => {
                    errors.report(ParseError::MissingDoctypeSystemIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(_) => {
                    errors.report(
                        ParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        self.span(1),
                    );
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            BeforeDoctypeSystemIdentifier => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('"') => {
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierDoubleQuoted;
                }
                Some('\'') => {
                    self.current_doctype.system_id = Some(String::new().into_boxed_str());
                    self.state = DoctypeSystemIdentifierSingleQuoted;
                }
                Some('>') => {
                    errors.report(ParseError::MissingDoctypeSystemIdentifier, self.span(1));
                    self.current_doctype.force_quirks = true;
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(_) => {
                    errors.report(
                        ParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        self.span(1),
                    );
                    self.current_doctype.force_quirks = true;
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            DoctypeSystemIdentifierDoubleQuoted => self.doctype_identifier('"', false, errors),
            DoctypeSystemIdentifierSingleQuoted => self.doctype_identifier('\'', false, errors),
            AfterDoctypeSystemIdentifier => match self.consume() {
                Some(c) if c.is_ascii_whitespace() => {}
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some(_) => {
                    errors.report(
                        ParseError::UnexpectedCharacterAfterDoctypeSystemIdentifier,
                        self.span(1),
                    );
                    self.reconsume();
                    self.state = BogusDoctype;
                }
                None => {
                    errors.report(ParseError::EofInDoctype, self.span(0));
                    self.current_doctype.force_quirks = true;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },
            BogusDoctype => match self.consume() {
                Some('>') => {
                    self.state = Data;
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                }
                Some('\0') => errors.report(ParseError::UnexpectedNullCharacter, self.span(1)),
                Some(_) => {}
                None => {
                    self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                    self.finish_eof();
                }
            },

            CdataSection => match self.consume() {
                Some(']') => self.state = CdataSectionBracket,
                Some(c) => self.emit_char(c),
                None => {
                    errors.report(ParseError::EofInCdata, self.span(0));
                    self.finish_eof();
                }
            },
            CdataSectionBracket => match self.consume() {
                Some(']') => self.state = CdataSectionEnd,
                _ => {
                    self.emit_char(']');
                    self.reconsume();
                    self.state = CdataSection;
                }
            },
            CdataSectionEnd => match self.consume() {
                Some('>') => self.state = Data,
                Some(']') => self.emit_char(']'),
                _ => {
                    self.emit_str("]]");
                    self.reconsume();
                    self.state = CdataSection;
                }
            },
        }
    }

    fn finish_eof(&mut self) {
        self.emit(Token::EndOfFile);
        self.eof_emitted = true;
    }

    fn generic_end_tag_name(&mut self, bail_state: State, errors: &mut dyn ParseErrorSink) {
        match self.consume() {
            Some(c) if c.is_ascii_whitespace() && self.is_appropriate_end_tag() => {
                self.state = State::BeforeAttributeName;
            }
            Some('/') if self.is_appropriate_end_tag() => {
                self.state = State::SelfClosingStartTag;
            }
            Some('>') if self.is_appropriate_end_tag() => {
                self.state = State::Data;
                self.finish_tag(errors);
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let lower = c.to_ascii_lowercase();
                self.tag().name.push(lower);
                self.temp_buffer.push(c);
            }
            _ => {
                self.reconsume();
                self.current_tag = None;
                self.emit_char('<');
                self.emit_char('/');
                self.emit_str(&self.temp_buffer.clone());
                self.state = bail_state;
            }
        }
    }

    fn consume_after_doctype_keyword(&mut self, keyword: &str) -> bool {
        if self.matches_ascii_case_insensitive(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn doctype_identifier(&mut self, quote: char, is_public: bool, errors: &mut dyn ParseErrorSink) {
        let slot = if is_public {
            &mut self.current_doctype.public_id
        } else {
            &mut self.current_doctype.system_id
        };
        let mut value = slot.take().unwrap_or_default().into_string();
        match self.consume() {
            Some(c) if c == quote => {
                *(if is_public {
                    &mut self.current_doctype.public_id
                } else {
                    &mut self.current_doctype.system_id
                }) = Some(value.into_boxed_str());
                self.state = if is_public {
                    State::AfterDoctypePublicIdentifier
                } else {
                    State::AfterDoctypeSystemIdentifier
                };
            }
            Some('\0') => {
                errors.report(ParseError::UnexpectedNullCharacter, self.span(1));
                value.push('\u{FFFD}');
                *(if is_public {
                    &mut self.current_doctype.public_id
                } else {
                    &mut self.current_doctype.system_id
                }) = Some(value.into_boxed_str());
            }
            Some('>') => {
                let err = if is_public {
                    ParseError::AbruptDoctypePublicIdentifier
                } else {
                    ParseError::AbruptDoctypeSystemIdentifier
                };
                errors.report(err, self.span(1));
                *(if is_public {
                    &mut self.current_doctype.public_id
                } else {
                    &mut self.current_doctype.system_id
                }) = Some(value.into_boxed_str());
                self.current_doctype.force_quirks = true;
                self.state = State::Data;
                self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
            }
            Some(c) => {
                value.push(c);
                *(if is_public {
                    &mut self.current_doctype.public_id
                } else {
                    &mut self.current_doctype.system_id
                }) = Some(value.into_boxed_str());
            }
            None => {
                errors.report(ParseError::EofInDoctype, self.span(0));
                *(if is_public {
                    &mut self.current_doctype.public_id
                } else {
                    &mut self.current_doctype.system_id
                }) = Some(value.into_boxed_str());
                self.current_doctype.force_quirks = true;
                self.emit(Token::Doctype(std::mem::take(&mut self.current_doctype)));
                self.finish_eof();
            }
        }
    }

    /// Resolves a character reference starting just after the `&` already
    /// consumed, delegating the actual name/codepoint lookup to the
    /// `entities` crate (the "named-character-reference resolver" and
    /// numeric-reference decoder are out-of-scope fixed tables per the
    /// design; see crate root docs). The parse errors the standard attaches
    /// to a numeric reference's code point are not part of that table, so
    /// [`Self::report_numeric_character_reference_errors`] classifies the
    /// digits itself before delegating.
    fn consume_character_reference(&mut self, ctx: RefContext, errors: &mut dyn ParseErrorSink) {
        let lookahead: String = std::iter::once('&')
            .chain(self.input[self.pos..].iter().copied().take(40))
            .collect();
        if lookahead.as_bytes().get(1) == Some(&b'#') {
            self.report_numeric_character_reference_errors(&lookahead, errors);
        }
        let html_ctx = match ctx {
            RefContext::Attribute => HtmlContext::Attribute,
            RefContext::Data => HtmlContext::BodyText,
        };
        match entities::decode_html_ref(&html_ctx, lookahead.as_bytes(), 0) {
            Some((decoded, token_len)) => {
                let consumed_chars = token_len - 1; // excludes the leading '&'
                let terminated = lookahead.as_bytes()[token_len - 1] == b';';
                let next_is_alnum_or_eq = lookahead
                    .as_bytes()
                    .get(token_len)
                    .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'=');

                if ctx == RefContext::Attribute && !terminated && next_is_alnum_or_eq {
                    // Ambiguous ampersand: leave the literal text alone.
                    self.flush_reference_literal(1, errors);
                    return;
                }
                if !terminated {
                    errors.report(ParseError::MissingSemicolonAfterCharacterReference, self.span(0));
                }
                self.pos += consumed_chars;
                let decoded = String::from_utf8_lossy(&decoded).into_owned();
                self.append_reference_output(&decoded);
            }
            None => self.flush_reference_literal(1, errors),
        }
    }

    /// Classifies the digits of a `&#`/`&#x` reference (`lookahead[0]` is
    /// the leading `&`, `lookahead[1]` the `#`) purely to report the parse
    /// errors the standard names for its code point; the replacement text
    /// itself still comes from `entities::decode_html_ref`.
    ///
    /// @see https://html.spec.whatwg.org/#numeric-character-reference-end-state
    fn report_numeric_character_reference_errors(&self, lookahead: &str, errors: &mut dyn ParseErrorSink) {
        let bytes = lookahead.as_bytes();
        let hex = matches!(bytes.get(2), Some(b'x' | b'X'));
        let digits_start = if hex { 3 } else { 2 };
        let is_digit: fn(u8) -> bool = if hex { |b| b.is_ascii_hexdigit() } else { |b| b.is_ascii_digit() };
        let mut end = digits_start;
        while bytes.get(end).is_some_and(|&b| is_digit(b)) {
            end += 1;
        }
        if end == digits_start {
            errors.report(ParseError::AbsenceOfDigitsInNumericCharacterReference, self.span(0));
            return;
        }
        let radix = if hex { 16 } else { 10 };
        let value = u32::from_str_radix(&lookahead[digits_start..end], radix).unwrap_or(u32::MAX);

        if value == 0 {
            errors.report(ParseError::NullCharacterReference, self.span(0));
        } else if value > 0x10FFFF {
            errors.report(ParseError::CharacterReferenceOutsideUnicodeRange, self.span(0));
        } else if crate::input::is_surrogate(value) {
            errors.report(ParseError::SurrogateCharacterReference, self.span(0));
        } else if char::from_u32(value).is_some_and(crate::input::is_noncharacter) {
            errors.report(ParseError::NoncharacterCharacterReference, self.span(0));
        } else if value == 0x0D || char::from_u32(value).is_some_and(crate::input::is_control) {
            errors.report(ParseError::ControlCharacterReference, self.span(0));
        }
    }

    /// No named or numeric reference matched (or it was ambiguous inside
    /// an attribute): just emit/append the literal `&`.
    fn flush_reference_literal(&mut self, amp_len: usize, _errors: &mut dyn ParseErrorSink) {
        debug_assert_eq!(amp_len, 1);
        self.append_reference_output("&");
    }

    fn append_reference_output(&mut self, s: &str) {
        match self.return_state {
            State::AttributeValueDoubleQuoted
            | State::AttributeValueSingleQuoted
            | State::AttributeValueUnquoted => {
                self.tag().cur_value.push_str(s);
            }
            _ => self.emit_str(s),
        }
        self.state = self.return_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IgnoreErrors;

    fn tokenize(html: &str) -> Vec<Token> {
        let stream = InputStream::new(html);
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = IgnoreErrors;
        let mut out = Vec::new();
        loop {
            let t = tokenizer.next_token(&mut sink);
            let is_eof = matches!(t, Token::EndOfFile);
            out.push(t);
            if is_eof {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_tag_and_text() {
        let tokens = tokenize("<p>Hi</p>");
        assert!(matches!(&tokens[0], Token::StartTag(t) if t.name == "p"));
        assert!(matches!(tokens[1], Token::Character('H')));
        assert!(matches!(tokens[2], Token::Character('i')));
        assert!(matches!(&tokens[3], Token::EndTag(t) if t.name == "p"));
        assert!(matches!(tokens.last(), Some(Token::EndOfFile)));
    }

    /// §8's tokenizer-totality property: every code-point sequence
    /// terminates (within a generous bound on the number of tokens a
    /// finite input can produce) in an `EndOfFile` token, and a further
    /// call keeps returning it rather than producing anything else.
    #[quickcheck_macros::quickcheck]
    fn tokenizer_totality(input: String) -> bool {
        let stream = InputStream::new(&input);
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = IgnoreErrors;
        let bound = input.chars().count() * 2 + 16;
        for _ in 0..bound {
            if matches!(tokenizer.next_token(&mut sink), Token::EndOfFile) {
                return matches!(tokenizer.next_token(&mut sink), Token::EndOfFile)
                    && matches!(tokenizer.next_token(&mut sink), Token::EndOfFile);
            }
        }
        false
    }

    #[test]
    fn eof_is_terminal() {
        let stream = InputStream::new("<p>");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = IgnoreErrors;
        while !matches!(tokenizer.next_token(&mut sink), Token::EndOfFile) {}
        assert!(matches!(tokenizer.next_token(&mut sink), Token::EndOfFile));
        assert!(matches!(tokenizer.next_token(&mut sink), Token::EndOfFile));
    }

    #[test]
    fn attribute_with_named_entity() {
        let tokens = tokenize(r#"<a href="?art&copy">"#);
        match &tokens[0] {
            Token::StartTag(t) => {
                assert_eq!(t.attribute("href"), Some("?art\u{A9}"));
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_ampersand_left_alone_in_attribute() {
        let tokens = tokenize(r#"<a href="?bill&ted">"#);
        match &tokens[0] {
            Token::StartTag(t) => {
                assert_eq!(t.attribute("href"), Some("?bill&ted"));
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_attribute_keeps_first() {
        let tokens = tokenize(r#"<div class="a" class="b">"#);
        match &tokens[0] {
            Token::StartTag(t) => {
                assert_eq!(t.attributes.len(), 1);
                assert_eq!(t.attribute("class"), Some("a"));
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn null_numeric_reference_reports_and_coerces() {
        use crate::error::CollectErrors;
        let stream = InputStream::new("&#0;");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = CollectErrors::default();
        let mut out = String::new();
        loop {
            match tokenizer.next_token(&mut sink) {
                Token::Character(c) => out.push(c),
                Token::EndOfFile => break,
                other => panic!("unexpected token {other:?}"),
            }
        }
        assert_eq!(out, "\u{FFFD}");
        assert!(sink.errors.iter().any(|e| e.0 == ParseError::NullCharacterReference));
    }

    #[test]
    fn out_of_range_numeric_reference_reports_and_coerces() {
        use crate::error::CollectErrors;
        let stream = InputStream::new("&#x110000;");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = CollectErrors::default();
        let mut out = String::new();
        loop {
            match tokenizer.next_token(&mut sink) {
                Token::Character(c) => out.push(c),
                Token::EndOfFile => break,
                other => panic!("unexpected token {other:?}"),
            }
        }
        assert_eq!(out, "\u{FFFD}");
        assert!(sink.errors.iter().any(|e| e.0 == ParseError::CharacterReferenceOutsideUnicodeRange));
    }

    #[test]
    fn surrogate_numeric_reference_is_reported() {
        use crate::error::CollectErrors;
        let stream = InputStream::new("&#xD800;");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = CollectErrors::default();
        loop {
            if matches!(tokenizer.next_token(&mut sink), Token::EndOfFile) {
                break;
            }
        }
        assert!(sink.errors.iter().any(|e| e.0 == ParseError::SurrogateCharacterReference));
    }

    #[test]
    fn absence_of_digits_is_reported() {
        use crate::error::CollectErrors;
        let stream = InputStream::new("&#;");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = CollectErrors::default();
        loop {
            if matches!(tokenizer.next_token(&mut sink), Token::EndOfFile) {
                break;
            }
        }
        assert!(sink.errors.iter().any(|e| e.0 == ParseError::AbsenceOfDigitsInNumericCharacterReference));
    }

    #[test]
    fn doctype_basic() {
        let tokens = tokenize("<!DOCTYPE html>");
        match &tokens[0] {
            Token::Doctype(d) => {
                assert_eq!(d.name.as_deref(), Some("html"));
                assert!(!d.force_quirks);
            }
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn comment_basic() {
        let tokens = tokenize("<!-- hi -->");
        assert!(matches!(&tokens[0], Token::Comment(c) if c.as_ref() == " hi "));
    }

    #[test]
    fn rawtext_script_ignores_markup() {
        let stream = InputStream::new("<script>1 < 2</script>");
        let mut tokenizer = Tokenizer::new(&stream);
        let mut sink = IgnoreErrors;
        let first = tokenizer.next_token(&mut sink);
        assert!(matches!(&first, Token::StartTag(t) if t.name == "script"));
        tokenizer.switch_to(State::ScriptData);
        let mut text = String::new();
        loop {
            match tokenizer.next_token(&mut sink) {
                Token::Character(c) => text.push(c),
                Token::EndTag(t) if t.name == "script" => break,
                other => panic!("unexpected token in script data: {other:?}"),
            }
        }
        assert_eq!(text, "1 < 2");
    }
}
