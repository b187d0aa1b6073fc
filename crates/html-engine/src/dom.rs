//! The node variants stored in the tagged tree.
//!
//! Mirrors the seven-variant node union from the DOM: documents, doctypes,
//! fragments, elements, text, processing instructions, and comments. An
//! element's attributes keep insertion order; a second attribute for the
//! same (namespace, local name) is dropped by the tree constructor before it
//! ever reaches this struct (see `TreeBuilder::add_attribute`).

use crate::atoms::{LocalName, Namespace};
use crate::compat_mode::CompatMode;

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub namespace: Option<Namespace>,
    pub prefix: Option<Box<str>>,
    pub local_name: LocalName,
    pub value: Box<str>,
}

impl Attribute {
    pub fn new(local_name: LocalName, value: impl Into<Box<str>>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local_name,
            value: value.into(),
        }
    }

    /// ASCII-case-insensitive name match, the comparison the spec uses for
    /// attribute names (which are always lowercased by the tokenizer).
    pub fn name_is(&self, name: &str) -> bool {
        self.local_name.as_str().eq_ignore_ascii_case(name)
    }
}

/// A document's quirks status and associated flags.
#[derive(Debug, Clone, Default)]
pub struct DocumentData {
    pub compat_mode: CompatMode,
    pub iframe_srcdoc: bool,
    /// Set once the tokenizer's "scripting" flag would have disabled
    /// `<noscript>` RAWTEXT parsing. This crate never executes script, so
    /// the flag only affects tree shape, never behavior.
    pub scripting: bool,
}

/// A DOM node. Indexing and traversal are the tree's job (see [`crate::tree`]);
/// this type only carries the per-node payload.
#[derive(Debug, Clone)]
pub enum Node {
    Document(DocumentData),
    DocumentType {
        name: Box<str>,
        public_id: Box<str>,
        system_id: Box<str>,
    },
    DocumentFragment,
    Element {
        namespace: Namespace,
        prefix: Option<Box<str>>,
        local_name: LocalName,
        attributes: Vec<Attribute>,
    },
    Text(String),
    ProcessingInstruction {
        target: Box<str>,
        data: Box<str>,
    },
    Comment(Box<str>),
}

impl Node {
    /// Element-like nodes (document, fragment, element) can have children
    /// and therefore occupy a start/end slot pair in the tree. Everything
    /// else is a leaf.
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Node::Document(_) | Node::DocumentFragment | Node::Element { .. }
        )
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn local_name(&self) -> Option<&LocalName> {
        match self {
            Node::Element { local_name, .. } => Some(local_name),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<Namespace> {
        match self {
            Node::Element { namespace, .. } => Some(*namespace),
            _ => None,
        }
    }

    pub fn is_html_element(&self, atom: crate::atoms::Atom) -> bool {
        matches!(
            self,
            Node::Element { namespace: Namespace::Html, local_name, .. }
                if local_name.is(atom)
        )
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|a| a.name_is(name))
                .map(|a| a.value.as_ref()),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Node::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Text content for a leaf; used by the character iterator.
    pub fn text_data(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
