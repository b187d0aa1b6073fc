//! The stack of open elements and its scope predicates.
//!
//! @see https://html.spec.whatwg.org/#the-stack-of-open-elements

use crate::atoms::{Atom, LocalName, Namespace};
use crate::dom::Node;
use crate::tree::{NodeId, Tree};

/// A stack of nodes currently open for insertion, bottom (the `html`
/// element) to top (the current node).
#[derive(Default)]
pub struct OpenElements {
    stack: Vec<NodeId>,
}

/// The element categories the five scope predicates are parameterized by.
///
/// @see https://html.spec.whatwg.org/#has-an-element-in-the-specific-scope
enum ScopeKind {
    Regular,
    ListItem,
    Button,
    Table,
    Select,
}

impl OpenElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.stack.contains(&id)
    }

    /// Index from the bottom (0 = `html`), for the adoption agency
    /// algorithm's "node above" and "node below" bookkeeping.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.stack.iter().position(|&n| n == id)
    }

    pub fn at(&self, pos: usize) -> Option<NodeId> {
        self.stack.get(pos).copied()
    }

    pub fn replace_at(&mut self, pos: usize, id: NodeId) {
        self.stack[pos] = id;
    }

    pub fn insert_at(&mut self, pos: usize, id: NodeId) {
        self.stack.insert(pos, id);
    }

    /// Removes the first (topmost-found) occurrence of `id`, used by the
    /// adoption agency algorithm when an element is spliced elsewhere.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(pos) = self.position_of(id) {
            self.stack.remove(pos);
        }
    }

    /// Pops elements off the stack, including `id` itself, stopping once
    /// `id` has been popped.
    pub fn pop_until_and_including(&mut self, id: NodeId) {
        while let Some(top) = self.stack.pop() {
            if top == id {
                break;
            }
        }
    }

    /// Pops elements while `pred` holds for the current node (the
    /// "generate implied end tags" family of operations builds on this).
    pub fn pop_while(&mut self, tree: &Tree, mut pred: impl FnMut(&Node) -> bool) {
        while let Some(&top) = self.stack.last() {
            match tree.get(top) {
                Some(node) if pred(node) => {
                    self.stack.pop();
                }
                _ => break,
            }
        }
    }

    fn is_in_scope(&self, tree: &Tree, target: LocalName, target_ns: Namespace, kind: &ScopeKind) -> bool {
        for &id in self.stack.iter().rev() {
            let Some(node) = tree.get(id) else { continue };
            let Node::Element { namespace, local_name, .. } = node else {
                continue;
            };
            if *namespace == target_ns && *local_name == target {
                return true;
            }
            if Self::is_scope_boundary(*namespace, local_name, kind) {
                return false;
            }
        }
        false
    }

    fn is_scope_boundary(ns: Namespace, name: &LocalName, kind: &ScopeKind) -> bool {
        use Atom::*;
        let in_base_list = match ns {
            Namespace::Html => matches!(
                name,
                LocalName::Atom(applet | caption | html | table | td | th | marquee | object | template)
            ),
            Namespace::MathMl => matches!(name, LocalName::Atom(mi | mo | mn | ms | mtext | annotation_xml)),
            Namespace::Svg => matches!(name, LocalName::Atom(foreignObject | desc | title)),
        };
        if in_base_list {
            return true;
        }
        match kind {
            ScopeKind::Regular => false,
            ScopeKind::ListItem => matches!(name, LocalName::Atom(ol | ul)) && ns == Namespace::Html,
            ScopeKind::Button => matches!(name, LocalName::Atom(button)) && ns == Namespace::Html,
            ScopeKind::Table => {
                matches!(name, LocalName::Atom(html | table | template)) && ns == Namespace::Html
            }
            ScopeKind::Select => {
                // Select scope is the inverse: everything except optgroup/option
                // is a boundary.
                !matches!(name, LocalName::Atom(optgroup | option))
            }
        }
    }

    pub fn has_element_in_scope(&self, tree: &Tree, name: LocalName, ns: Namespace) -> bool {
        self.is_in_scope(tree, name, ns, &ScopeKind::Regular)
    }

    pub fn has_element_in_list_item_scope(&self, tree: &Tree, name: LocalName, ns: Namespace) -> bool {
        self.is_in_scope(tree, name, ns, &ScopeKind::ListItem)
    }

    pub fn has_element_in_button_scope(&self, tree: &Tree, name: LocalName, ns: Namespace) -> bool {
        self.is_in_scope(tree, name, ns, &ScopeKind::Button)
    }

    pub fn has_element_in_table_scope(&self, tree: &Tree, name: LocalName, ns: Namespace) -> bool {
        self.is_in_scope(tree, name, ns, &ScopeKind::Table)
    }

    /// "Select scope" treats every element except `optgroup`/`option` as a
    /// boundary, which `is_scope_boundary`'s `ScopeKind::Select` arm
    /// already encodes.
    pub fn has_element_in_select_scope(&self, tree: &Tree, name: LocalName, ns: Namespace) -> bool {
        self.is_in_scope(tree, name, ns, &ScopeKind::Select)
    }

    /// Returns whether the current node is an HTML element with local name
    /// `atom` — the common "current node is a `p`" style checks used all
    /// over the tree-construction dispatch.
    pub fn current_node_is(&self, tree: &Tree, atom: Atom) -> bool {
        self.current_node()
            .and_then(|id| tree.get(id))
            .is_some_and(|n| n.is_html_element(atom))
    }

    pub fn current_node_is_any_html(&self, tree: &Tree, atoms: &[Atom]) -> bool {
        self.current_node()
            .and_then(|id| tree.get(id))
            .is_some_and(|n| atoms.iter().any(|&a| n.is_html_element(a)))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.stack.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentData;

    fn el(tree: &mut Tree, parent: NodeId, name: &str) -> NodeId {
        tree.append_child(
            parent,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new(name),
                attributes: vec![],
            },
        )
    }

    #[test]
    fn regular_scope_stops_at_table() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let html = el(&mut tree, doc, "html");
        let body = el(&mut tree, html, "body");
        let table = el(&mut tree, body, "table");
        let tr = el(&mut tree, table, "tr");
        let td = el(&mut tree, tr, "td");
        let p = el(&mut tree, td, "p");

        let mut open = OpenElements::new();
        for id in [html, body, table, tr, td, p] {
            open.push(id);
        }

        assert!(open.has_element_in_scope(&tree, LocalName::new("p"), Namespace::Html));
        assert!(open.has_element_in_table_scope(&tree, LocalName::new("table"), Namespace::Html));
        // `body` isn't reachable from `td` in the regular scope because the
        // walk never needs to go past the `td`/`table` boundary to find it
        // (it's below td on the stack, so the scope walk — top to bottom —
        // would hit the table boundary first only if body were above it).
        assert!(!open.has_element_in_scope(&tree, LocalName::new("body"), Namespace::Html));
    }

    #[test]
    fn button_scope_blocks_on_button() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let html = el(&mut tree, doc, "html");
        let body = el(&mut tree, html, "body");
        let button = el(&mut tree, body, "button");
        let p = el(&mut tree, button, "p");

        let mut open = OpenElements::new();
        for id in [html, body, button, p] {
            open.push(id);
        }
        assert!(open.has_element_in_button_scope(&tree, LocalName::new("p"), Namespace::Html));
        assert!(!open.has_element_in_button_scope(&tree, LocalName::new("html"), Namespace::Html));
    }
}
