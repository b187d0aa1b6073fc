//! Serializing a parsed tree back to an HTML string.
//!
//! @see https://html.spec.whatwg.org/#serialising-html-fragments

use crate::atoms::Atom;
use crate::dom::Node;
use crate::tree::{NodeId, Tree};

/// Elements with no content model: they serialize as a single start tag
/// with no matching end tag and no children are ever inserted under them.
fn is_void(atom: Atom) -> bool {
    matches!(
        atom,
        Atom::area
            | Atom::base
            | Atom::basefont
            | Atom::bgsound
            | Atom::br
            | Atom::col
            | Atom::embed
            | Atom::frame
            | Atom::hr
            | Atom::img
            | Atom::input
            | Atom::keygen
            | Atom::link
            | Atom::meta
            | Atom::source
            | Atom::track
            | Atom::wbr
    )
}

/// Elements whose text content is never escaped when serialized.
fn is_raw_text_container(atom: Atom) -> bool {
    matches!(
        atom,
        Atom::style | Atom::script | Atom::xmp | Atom::iframe | Atom::noembed | Atom::noframes | Atom::plaintext
    )
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute_value(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Serializes a whole document (or document fragment) node, given its id —
/// the tree's sentinel root (index 0) is bookkeeping only and is never
/// itself a serializable node, so callers pass the `Document`/
/// `DocumentFragment` node returned by the tree builder.
pub fn serialize_document(tree: &Tree, document: NodeId) -> String {
    serialize_children(tree, document)
}

/// Serializes just the children of `node` — the "fragment serializing
/// algorithm" used for `innerHTML`-style output.
pub fn serialize_children(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    if tree.is_element_like(node) {
        for child in tree.children(node) {
            serialize_node(tree, child, &mut out);
        }
    }
    out
}

fn serialize_node(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match node {
        Node::Document(_) | Node::DocumentFragment => {
            for child in tree.children(id) {
                serialize_node(tree, child, out);
            }
        }
        Node::DocumentType { name, public_id, system_id } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                out.push_str(" PUBLIC \"");
                out.push_str(public_id);
                out.push('"');
                if !system_id.is_empty() {
                    out.push_str(" \"");
                    out.push_str(system_id);
                    out.push('"');
                }
            } else if !system_id.is_empty() {
                out.push_str(" SYSTEM \"");
                out.push_str(system_id);
                out.push('"');
            }
            out.push('>');
        }
        Node::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            out.push(' ');
            out.push_str(data);
            out.push('>');
        }
        Node::Text(s) => {
            let raw_parent = tree
                .parent(id)
                .and_then(|p| tree.get(p))
                .and_then(Node::local_name)
                .and_then(|n| match n {
                    crate::atoms::LocalName::Atom(a) => Some(*a),
                    crate::atoms::LocalName::Other(_) => None,
                })
                .is_some_and(is_raw_text_container);
            if raw_parent {
                out.push_str(s);
            } else {
                escape_text(s, out);
            }
        }
        Node::Element { namespace, prefix, local_name, attributes } => {
            let tag_name = match prefix {
                Some(p) => format!("{p}:{local_name}"),
                None => local_name.to_string(),
            };
            out.push('<');
            out.push_str(&tag_name);
            for attr in attributes {
                out.push(' ');
                if let Some(ns) = &attr.namespace {
                    if *ns != *namespace {
                        out.push_str(ns.uri());
                        out.push(':');
                    }
                }
                if let Some(p) = &attr.prefix {
                    out.push_str(p);
                    out.push(':');
                }
                out.push_str(attr.local_name.as_str());
                out.push_str("=\"");
                escape_attribute_value(&attr.value, out);
                out.push('"');
            }
            out.push('>');

            let atom = match local_name {
                crate::atoms::LocalName::Atom(a) => Some(*a),
                crate::atoms::LocalName::Other(_) => None,
            };
            if *namespace == crate::atoms::Namespace::Html && atom.is_some_and(is_void) {
                return;
            }

            for child in tree.children(id) {
                serialize_node(tree, child, out);
            }

            out.push_str("</");
            out.push_str(&tag_name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{LocalName, Namespace};
    use crate::dom::{Attribute, DocumentData};

    #[test]
    fn round_trips_simple_document() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let html = tree.append_child(
            doc,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new("html"),
                attributes: vec![],
            },
        );
        let body = tree.append_child(
            html,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new("body"),
                attributes: vec![],
            },
        );
        let p = tree.append_child(
            body,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new("p"),
                attributes: vec![Attribute::new(LocalName::new("class"), "greeting")],
            },
        );
        tree.append_child(p, Node::Text("Tom & Jerry".into()));
        tree.append_child(body, Node::Element {
            namespace: Namespace::Html,
            prefix: None,
            local_name: LocalName::new("br"),
            attributes: vec![],
        });

        let html_out = serialize_document(&tree, doc);
        assert_eq!(
            html_out,
            r#"<html><body><p class="greeting">Tom &amp; Jerry</p><br></body></html>"#
        );
    }

    #[test]
    fn script_contents_are_not_escaped() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let script = tree.append_child(
            doc,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new("script"),
                attributes: vec![],
            },
        );
        tree.append_child(script, Node::Text("1 < 2 && 3 > 1".into()));
        assert_eq!(serialize_document(&tree, doc), "<script>1 < 2 && 3 > 1</script>");
    }
}
