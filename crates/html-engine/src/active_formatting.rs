//! The list of active formatting elements.
//!
//! @see https://html.spec.whatwg.org/#the-list-of-active-formatting-elements

use crate::dom::{Attribute, Node};
use crate::tree::{NodeId, Tree};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Marker,
    Element(NodeId),
}

#[derive(Default)]
pub struct ActiveFormattingElements {
    entries: Vec<Entry>,
}

/// How many matching earlier entries (same tag, namespace, and exact
/// attribute set) are tolerated before the oldest is dropped.
///
/// @see https://html.spec.whatwg.org/#push-onto-the-list-of-active-formatting-elements
const NOAHS_ARK_LIMIT: usize = 3;

impl ActiveFormattingElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_marker(&mut self) {
        self.entries.push(Entry::Marker);
    }

    /// Clears entries back to (and including) the last marker, or the
    /// whole list if there is none — used when leaving a template, an
    /// applet, or an object boundary.
    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry == Entry::Marker {
                break;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<Entry> {
        self.entries.last().copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains(&Entry::Element(id))
    }

    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.entries.iter().position(|&e| e == Entry::Element(id))
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(pos) = self.position_of(id) {
            self.entries.remove(pos);
        }
    }

    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if let Some(pos) = self.position_of(old) {
            self.entries[pos] = Entry::Element(new);
        }
    }

    /// Inserts `new` immediately before `before` in the list (used by the
    /// adoption agency algorithm, which reinserts a cloned formatting
    /// element at the position its original occupied).
    pub fn insert_before(&mut self, before: NodeId, new: NodeId) {
        let pos = self.position_of(before).unwrap_or(self.entries.len());
        self.entries.insert(pos, Entry::Element(new));
    }

    pub fn elements_since_last_marker(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        let start = self
            .entries
            .iter()
            .rposition(|e| *e == Entry::Marker)
            .map_or(0, |p| p + 1);
        self.entries[start..].iter().filter_map(|e| match e {
            Entry::Element(id) => Some(*id),
            Entry::Marker => None,
        })
    }

    /// Appends `id` to the list, first applying the Noah's Ark clause: if
    /// three elements already present since the last marker have the same
    /// namespace, tag name, and attribute set (name and value, any order),
    /// the earliest of them is removed.
    pub fn push(&mut self, tree: &Tree, id: NodeId) {
        let Some(Node::Element { namespace, local_name, attributes, .. }) = tree.get(id) else {
            self.entries.push(Entry::Element(id));
            return;
        };

        let mut matches = Vec::new();
        for candidate in self.elements_since_last_marker() {
            if candidate == id {
                continue;
            }
            if is_noahs_ark_match(tree, candidate, *namespace, local_name, attributes) {
                matches.push(candidate);
            }
        }
        if matches.len() >= NOAHS_ARK_LIMIT {
            // `elements_since_last_marker` yields oldest-to-newest within
            // the active segment because the list itself is append-only.
            self.remove(matches[0]);
        }

        self.entries.push(Entry::Element(id));
    }

    /// Reconstructs the active formatting elements per the standard
    /// algorithm of the same name: walks backward to the first marker or
    /// already-open element, then re-inserts and re-opens each one in
    /// order back to the end of the list, calling `reopen` to actually
    /// create a clone on the tree and push it onto the stack of open
    /// elements.
    pub fn reconstruct(&mut self, mut reopen: impl FnMut(NodeId) -> NodeId, is_open: impl Fn(NodeId) -> bool) {
        if self.entries.is_empty() {
            return;
        }
        let Some(&Entry::Element(last)) = self.entries.last() else {
            return;
        };
        if is_open(last) {
            return;
        }

        let mut i = self.entries.len();
        loop {
            i -= 1;
            match self.entries[i] {
                Entry::Marker => {
                    i += 1;
                    break;
                }
                Entry::Element(id) if is_open(id) => {
                    i += 1;
                    break;
                }
                Entry::Element(_) => {
                    if i == 0 {
                        break;
                    }
                }
            }
        }

        for entry in &mut self.entries[i..] {
            if let Entry::Element(old) = *entry {
                let new = reopen(old);
                *entry = Entry::Element(new);
            }
        }
    }
}

fn is_noahs_ark_match(
    tree: &Tree,
    candidate: NodeId,
    namespace: crate::atoms::Namespace,
    local_name: &crate::atoms::LocalName,
    attributes: &[Attribute],
) -> bool {
    let Some(Node::Element {
        namespace: c_ns,
        local_name: c_name,
        attributes: c_attrs,
        ..
    }) = tree.get(candidate)
    else {
        return false;
    };
    if *c_ns != namespace || c_name != local_name || c_attrs.len() != attributes.len() {
        return false;
    }
    attributes.iter().all(|a| {
        c_attrs
            .iter()
            .any(|b| b.local_name == a.local_name && b.value == a.value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{LocalName, Namespace};
    use crate::dom::DocumentData;

    fn font(tree: &mut Tree, parent: NodeId, color: &str) -> NodeId {
        tree.append_child(
            parent,
            Node::Element {
                namespace: Namespace::Html,
                prefix: None,
                local_name: LocalName::new("font"),
                attributes: vec![Attribute::new(LocalName::new("color"), color)],
            },
        )
    }

    #[test]
    fn noahs_ark_drops_oldest_after_three_identical() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let mut afe = ActiveFormattingElements::new();

        let a = font(&mut tree, doc, "red");
        afe.push(&tree, a);
        let b = font(&mut tree, doc, "red");
        afe.push(&tree, b);
        let c = font(&mut tree, doc, "red");
        afe.push(&tree, c);
        assert!(afe.contains(a) && afe.contains(b) && afe.contains(c));

        let d = font(&mut tree, doc, "red");
        afe.push(&tree, d);
        assert!(!afe.contains(a), "oldest matching entry should have been dropped");
        assert!(afe.contains(b) && afe.contains(c) && afe.contains(d));
    }

    #[test]
    fn marker_resets_noahs_ark_window() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let mut afe = ActiveFormattingElements::new();

        for _ in 0..3 {
            let id = font(&mut tree, doc, "blue");
            afe.push(&tree, id);
        }
        afe.insert_marker();
        let after_marker = font(&mut tree, doc, "blue");
        afe.push(&tree, after_marker);
        assert_eq!(afe.elements_since_last_marker().count(), 1);
    }

    #[test]
    fn distinct_attributes_do_not_count_as_duplicates() {
        let mut tree = Tree::new();
        let doc = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        let mut afe = ActiveFormattingElements::new();

        for color in ["red", "green", "blue", "yellow"] {
            let id = font(&mut tree, doc, color);
            afe.push(&tree, id);
        }
        assert_eq!(afe.elements_since_last_marker().count(), 4);
    }
}
