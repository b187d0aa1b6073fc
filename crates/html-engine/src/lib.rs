//! A standards-conformant HTML5 tokenizer and tree-construction parser,
//! plus a hand-built CSS Selectors Level 4 engine for querying the result.
//!
//! [`parse_document`] and [`parse_fragment`] run the WHATWG tree
//! construction algorithm to completion and hand back a [`Tree`]; the
//! [`selector`] module then lets callers run `query_selector`/
//! `query_selector_all` against it, and [`serializer`] turns a subtree back
//! into markup.
//!
//! @see https://html.spec.whatwg.org/multipage/parsing.html

mod active_formatting;
mod atoms;
mod compat_mode;
mod dom;
pub mod encoding;
pub mod error;
mod foreign;
mod input;
mod insertion_mode;
mod open_elements;
mod quirks;
pub mod selector;
pub mod serializer;
mod token;
mod tokenizer;
pub mod tree;
mod tree_builder;

pub use atoms::{Atom, LocalName, Namespace};
pub use compat_mode::CompatMode;
pub use dom::{Attribute, DocumentData, Node};
pub use encoding::{Decoder, EncodingConfidence, Utf8Decoder};
pub use error::{CollectErrors, HtmlSpan, IgnoreErrors, LogErrors, ParseError, ParseErrorSink};
pub use serializer::{serialize_children, serialize_document};
pub use tree::{NodeId, Tree};
pub use tree_builder::{parse_document, parse_fragment};
