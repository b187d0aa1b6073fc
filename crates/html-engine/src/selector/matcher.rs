//! Matching a parsed selector list against the tagged tree.
//!
//! Complex selectors are evaluated right-to-left: the rightmost compound
//! must match the candidate, then each earlier compound must match some
//! ancestor or sibling reachable via the combinator joining it to the
//! compound after it.
//!
//! @see https://www.w3.org/TR/selectors-4/#evaluating-selectors

use super::parser::{
    AttrMatcher, AttrSelector, CaseSensitivity, Combinator, CompoundSelector, ComplexSelector, NsPrefix, ParseContext,
    PseudoClass, SelectorList, SubclassSelector, TypeSelector,
};
use crate::atoms::Namespace;
use crate::compat_mode::CompatMode;
use crate::dom::Node;
use crate::tree::{NodeId, Tree};

/// HTML attributes the spec singles out as ASCII-case-insensitive,
/// independent of the document's quirks mode.
///
/// @see https://html.spec.whatwg.org/#case-sensitivity-of-selectors
fn is_ascii_case_insensitive_attribute(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "accept"
            | "accept-charset"
            | "align"
            | "alink"
            | "axis"
            | "bgcolor"
            | "charset"
            | "checked"
            | "clear"
            | "codetype"
            | "color"
            | "compact"
            | "declare"
            | "defer"
            | "dir"
            | "direction"
            | "disabled"
            | "enctype"
            | "face"
            | "frame"
            | "hreflang"
            | "http-equiv"
            | "lang"
            | "language"
            | "link"
            | "media"
            | "method"
            | "multiple"
            | "nohref"
            | "noresize"
            | "noshade"
            | "nowrap"
            | "readonly"
            | "rel"
            | "rev"
            | "rules"
            | "scope"
            | "scrolling"
            | "selected"
            | "shape"
            | "target"
            | "text"
            | "type"
            | "valign"
            | "valuetype"
            | "vlink"
    )
}

/// Carries the per-query state the matcher needs beyond the AST: the
/// document's compat mode (for `id`/`class` case folding) and the `:scope`
/// element.
pub struct MatchContext<'a> {
    pub tree: &'a Tree,
    pub compat_mode: CompatMode,
    pub scope: NodeId,
}

fn eq_maybe_ci(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn element_namespace(tree: &Tree, id: NodeId) -> Option<Namespace> {
    tree.get(id).and_then(Node::namespace)
}

fn matches_ns_prefix(ctx: &ParseContext, el_ns: Option<Namespace>, prefix: &NsPrefix, for_type_selector: bool) -> bool {
    match prefix {
        NsPrefix::Any => true,
        NsPrefix::Named(p) => ctx.namespaces.get(p.as_ref()).is_some_and(|uri| el_ns.is_some_and(|ns| ns.uri() == uri.as_ref())),
        NsPrefix::None => {
            if for_type_selector {
                match &ctx.default_namespace {
                    Some(uri) => el_ns.is_some_and(|ns| ns.uri() == uri.as_ref()),
                    None => true,
                }
            } else {
                true
            }
        }
    }
}

fn matches_type_selector(mc: &MatchContext, ctx: &ParseContext, id: NodeId, ts: &TypeSelector) -> bool {
    let Some(Node::Element { namespace, local_name, .. }) = mc.tree.get(id) else { return false };
    match ts {
        TypeSelector::Universal { namespace: ns } => matches_ns_prefix(ctx, Some(*namespace), ns, true),
        TypeSelector::Named { namespace: ns, local_name: name } => {
            matches_ns_prefix(ctx, Some(*namespace), ns, true) && eq_maybe_ci(local_name.as_str(), name, *namespace == Namespace::Html)
        }
    }
}

fn matches_attr_selector(mc: &MatchContext, ctx: &ParseContext, id: NodeId, attr: &AttrSelector) -> bool {
    let Some(Node::Element { namespace, attributes, .. }) = mc.tree.get(id) else { return false };
    let candidates: Vec<&crate::dom::Attribute> = attributes
        .iter()
        .filter(|a| {
            let name_matches = a.local_name.as_str().eq_ignore_ascii_case(&attr.name) && *namespace == Namespace::Html
                || a.local_name.as_str() == attr.name.as_ref();
            if !name_matches {
                return false;
            }
            match &attr.namespace {
                NsPrefix::Any => true,
                NsPrefix::None => a.namespace.is_none(),
                NsPrefix::Named(p) => ctx
                    .namespaces
                    .get(p.as_ref())
                    .is_some_and(|uri| a.namespace.is_some_and(|ns| ns.uri() == uri.as_ref())),
            }
        })
        .collect();

    let Some(found) = candidates.into_iter().next() else { return false };
    let Some((matcher, value, case)) = &attr.test else { return true };

    let ci = *case == CaseSensitivity::AsciiCaseInsensitive || (*namespace == Namespace::Html && is_ascii_case_insensitive_attribute(&attr.name));
    let actual = found.value.as_ref();
    match matcher {
        AttrMatcher::Equals => eq_maybe_ci(actual, value, ci),
        AttrMatcher::Includes => actual.split_ascii_whitespace().any(|tok| eq_maybe_ci(tok, value, ci)),
        AttrMatcher::DashMatch => eq_maybe_ci(actual, value, ci) || {
            let prefix_len = value.len();
            actual.len() > prefix_len
                && eq_maybe_ci(&actual[..prefix_len], value, ci)
                && actual.as_bytes().get(prefix_len) == Some(&b'-')
        },
        AttrMatcher::Prefix => !value.is_empty() && actual.len() >= value.len() && eq_maybe_ci(&actual[..value.len()], value, ci),
        AttrMatcher::Suffix => {
            !value.is_empty() && actual.len() >= value.len() && eq_maybe_ci(&actual[actual.len() - value.len()..], value, ci)
        }
        AttrMatcher::Substring => !value.is_empty() && {
            if ci {
                actual.to_ascii_lowercase().contains(&value.to_ascii_lowercase())
            } else {
                actual.contains(value.as_ref())
            }
        },
    }
}

fn element_children(tree: &Tree, parent: NodeId) -> Vec<NodeId> {
    tree.children(parent).filter(|&id| tree.get(id).is_some_and(Node::is_element)).collect()
}

fn matches_pseudo_class(mc: &MatchContext, ctx: &ParseContext, id: NodeId, pc: &PseudoClass) -> bool {
    match pc {
        PseudoClass::Root => mc.tree.parent(id).is_some_and(|p| mc.tree.get(p).is_some_and(|n| matches!(n, Node::Document(_)))),
        PseudoClass::Scope => id == mc.scope,
        PseudoClass::Empty => !mc.tree.children(id).any(|c| {
            mc.tree
                .get(c)
                .is_some_and(|n| n.is_element() || n.text_data().is_some_and(|t| !t.is_empty()))
        }),
        PseudoClass::FirstChild => sibling_index(mc.tree, id).is_some_and(|(i, _)| i == 0),
        PseudoClass::LastChild => sibling_index(mc.tree, id).is_some_and(|(i, n)| i + 1 == n),
        PseudoClass::OnlyChild => sibling_index(mc.tree, id).is_some_and(|(_, n)| n == 1),
        PseudoClass::NthChild(anb) => sibling_index(mc.tree, id).is_some_and(|(i, _)| anb.matches(i as i32 + 1)),
        PseudoClass::NthLastChild(anb) => sibling_index(mc.tree, id).is_some_and(|(i, n)| anb.matches((n - i) as i32)),
        PseudoClass::Not(list) => !matches_any(mc, ctx, id, list),
        PseudoClass::Is(list) | PseudoClass::Where(list) => matches_any(mc, ctx, id, list),
        PseudoClass::Unsupported(_) => false,
    }
}

fn sibling_index(tree: &Tree, id: NodeId) -> Option<(usize, usize)> {
    let parent = tree.parent(id)?;
    let siblings = element_children(tree, parent);
    let idx = siblings.iter().position(|&s| s == id)?;
    Some((idx, siblings.len()))
}

fn matches_compound(mc: &MatchContext, ctx: &ParseContext, id: NodeId, compound: &CompoundSelector) -> bool {
    if !mc.tree.get(id).is_some_and(Node::is_element) {
        return false;
    }
    if let Some(ts) = &compound.type_selector {
        if !matches_type_selector(mc, ctx, id, ts) {
            return false;
        }
    }
    compound.subclasses.iter().all(|sub| match sub {
        SubclassSelector::Id(want) => {
            let is_html = element_namespace(mc.tree, id) == Some(Namespace::Html) && mc.compat_mode == CompatMode::Quirks;
            mc.tree.get(id).and_then(|n| n.attribute("id")).is_some_and(|got| eq_maybe_ci(got, want, is_html))
        }
        SubclassSelector::Class(want) => {
            let is_html = element_namespace(mc.tree, id) == Some(Namespace::Html) && mc.compat_mode == CompatMode::Quirks;
            mc.tree
                .get(id)
                .and_then(|n| n.attribute("class"))
                .is_some_and(|got| got.split_ascii_whitespace().any(|tok| eq_maybe_ci(tok, want, is_html)))
        }
        SubclassSelector::Attr(attr) => matches_attr_selector(mc, ctx, id, attr),
        SubclassSelector::PseudoClass(pc) => matches_pseudo_class(mc, ctx, id, pc),
        SubclassSelector::PseudoElement(_) => false,
    })
}

fn matches_any(mc: &MatchContext, ctx: &ParseContext, id: NodeId, list: &SelectorList) -> bool {
    list.0.iter().any(|complex| matches_complex(mc, ctx, id, complex))
}

/// Evaluates a complex selector right-to-left against `id`.
fn matches_complex(mc: &MatchContext, ctx: &ParseContext, id: NodeId, complex: &ComplexSelector) -> bool {
    if complex.rest.is_empty() {
        return matches_compound(mc, ctx, id, &complex.first);
    }
    let (last_combinator, last_compound) = complex.rest.last().unwrap();
    if !matches_compound(mc, ctx, id, last_compound) {
        return false;
    }
    matches_rest(mc, ctx, id, &complex.first, &complex.rest[..complex.rest.len() - 1], *last_combinator)
}

/// Walks backward from `id` trying to satisfy the remaining prefix of
/// compound selectors joined by `combinator` as the link to `id`.
fn matches_rest(
    mc: &MatchContext,
    ctx: &ParseContext,
    id: NodeId,
    first: &CompoundSelector,
    rest: &[(Combinator, CompoundSelector)],
    combinator: Combinator,
) -> bool {
    let candidates: Vec<NodeId> = match combinator {
        Combinator::Child => mc.tree.parent(id).into_iter().collect(),
        Combinator::Descendant => ancestors(mc.tree, id),
        Combinator::NextSibling => mc.tree.prev_sibling(id).into_iter().filter(|&s| mc.tree.get(s).is_some_and(Node::is_element)).collect(),
        Combinator::SubsequentSibling => preceding_sibling_elements(mc.tree, id),
    };

    for cand in candidates {
        let compound = if rest.is_empty() { first } else { &rest.last().unwrap().1 };
        if !matches_compound(mc, ctx, cand, compound) {
            continue;
        }
        if rest.is_empty() {
            return true;
        }
        let next_combinator = rest.last().unwrap().0;
        if matches_rest(mc, ctx, cand, first, &rest[..rest.len() - 1], next_combinator) {
            return true;
        }
    }
    false
}

fn ancestors(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = id;
    while let Some(p) = tree.parent(cur) {
        if tree.get(p).is_some_and(Node::is_element) {
            out.push(p);
        }
        cur = p;
    }
    out
}

fn preceding_sibling_elements(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = id;
    while let Some(s) = tree.prev_sibling(cur) {
        if tree.get(s).is_some_and(Node::is_element) {
            out.push(s);
        }
        cur = s;
    }
    out
}

/// Returns the first descendant of `scope` (in document order) matching
/// `list`, or `None`.
pub fn query_selector(tree: &Tree, scope: NodeId, compat_mode: CompatMode, ctx: &ParseContext, list: &SelectorList) -> Option<NodeId> {
    let mc = MatchContext { tree, compat_mode, scope };
    tree.descendants(scope)
        .filter(|&id| tree.get(id).is_some_and(Node::is_element))
        .find(|&id| matches_any(&mc, ctx, id, list))
}

/// Invokes `sink` with every descendant of `scope` matching `list`, in
/// document order.
pub fn query_selector_all(tree: &Tree, scope: NodeId, compat_mode: CompatMode, ctx: &ParseContext, list: &SelectorList, mut sink: impl FnMut(NodeId)) {
    let mc = MatchContext { tree, compat_mode, scope };
    for id in tree.descendants(scope) {
        if !tree.get(id).is_some_and(Node::is_element) {
            continue;
        }
        if matches_any(&mc, ctx, id, list) {
            sink(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parser::parse_selector_list;
    use crate::tree_builder::parse_document;
    use crate::encoding::{EncodingConfidence, Utf8Decoder};
    use crate::error::IgnoreErrors;

    fn parse_html(html: &str) -> (Tree, NodeId) {
        let mut errors = IgnoreErrors;
        let mut decoder = Utf8Decoder;
        let (tree, doc, _) = parse_document(html.as_bytes(), EncodingConfidence::Irrelevant, &mut decoder, &mut errors);
        (tree, doc)
    }

    fn select_all(tree: &Tree, doc: NodeId, selector: &str) -> Vec<NodeId> {
        let list = parse_selector_list(selector, &ParseContext::default()).unwrap();
        let mut out = Vec::new();
        query_selector_all(tree, doc, CompatMode::NoQuirks, &ParseContext::default(), &list, |id| out.push(id));
        out
    }

    #[test]
    fn matches_class_selector() {
        let (tree, doc) = parse_html("<body><p class=\"a b\">x</p><p class=\"c\">y</p></body>");
        let matches = select_all(&tree, doc, ".a");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn matches_descendant_combinator() {
        let (tree, doc) = parse_html("<body><div><p>one</p></div><p>two</p></body>");
        let matches = select_all(&tree, doc, "div p");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn matches_child_combinator_strictly() {
        let (tree, doc) = parse_html("<body><div><span><a>x</a></span></div></body>");
        assert_eq!(select_all(&tree, doc, "div > a").len(), 0);
        assert_eq!(select_all(&tree, doc, "div > span > a").len(), 1);
    }

    #[test]
    fn matches_nth_child() {
        let (tree, doc) = parse_html("<body><ul><li>1</li><li>2</li><li>3</li></ul></body>");
        let matches = select_all(&tree, doc, "li:nth-child(2n+1)");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn query_selector_returns_first_in_document_order() {
        let (tree, doc) = parse_html("<body><p id=\"x\">a</p><p id=\"y\">b</p></body>");
        let list = parse_selector_list("p", &ParseContext::default()).unwrap();
        let found = query_selector(&tree, doc, CompatMode::NoQuirks, &ParseContext::default(), &list).unwrap();
        assert_eq!(tree.get(found).and_then(|n| n.attribute("id")), Some("x"));
    }

    #[test]
    fn not_and_is_compose() {
        let (tree, doc) = parse_html("<body><p class=\"a\">1</p><p class=\"b\">2</p><span class=\"a\">3</span></body>");
        let matches = select_all(&tree, doc, ":is(p, span):not(.b)");
        assert_eq!(matches.len(), 2);
    }
}
