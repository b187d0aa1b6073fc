//! Tree construction: the stage that turns tokens into the tagged tree.
//!
//! Drives a [`Tokenizer`] and, for each token, applies the rules for the
//! current [`InsertionMode`], maintaining the stack of open elements, the
//! list of active formatting elements, and the handful of element pointers
//! (`head`, `form`) the algorithm threads through. Tree construction errors
//! recover the same way tokenization errors do: report and continue, never
//! abort.
//!
//! @see https://html.spec.whatwg.org/#tree-construction

use crate::active_formatting::ActiveFormattingElements;
use crate::atoms::{Atom, LocalName, Namespace};
use crate::compat_mode::CompatMode;
use crate::dom::{Attribute as DomAttribute, DocumentData, Node};
use crate::encoding::{Decoder, EncodingConfidence};
use crate::error::{HtmlSpan, ParseError, ParseErrorSink};
use crate::foreign;
use crate::input::InputStream;
use crate::insertion_mode::InsertionMode;
use crate::open_elements::OpenElements;
use crate::quirks::decide_compat_mode;
use crate::token::{Attribute as TokenAttribute, Doctype, EndTag, StartTag, Token};
use crate::tokenizer::{State as TokenizerState, Tokenizer};
use crate::tree::{NodeId, Tree};

/// Formatting elements subject to the adoption agency algorithm. Several of
/// these (`big`, `nobr`, `strike`, `tt`) aren't in the closed `Atom` set, so
/// this compares by name string rather than by atom.
fn is_formatting_element_name(name: &str) -> bool {
    matches!(
        name,
        "a" | "b" | "big" | "code" | "em" | "font" | "i" | "nobr" | "s" | "small" | "strike" | "strong" | "tt" | "u"
    )
}

fn no_span() -> HtmlSpan {
    HtmlSpan { start: 0, len: 0 }
}

/// What to do after one pass through a mode handler.
enum Step {
    Done,
    Reprocess(Token),
}

/// Tree construction, parameterized only by what the stack-of-open-elements
/// / active-formatting-elements / insertion-mode state machine needs; all
/// actual node storage lives in `tree`.
pub struct TreeBuilder {
    tree: Tree,
    document: NodeId,
    mode: InsertionMode,
    orig_mode: InsertionMode,
    template_modes: Vec<InsertionMode>,
    open: OpenElements,
    afe: ActiveFormattingElements,
    head_element: Option<NodeId>,
    form_element: Option<NodeId>,
    frameset_ok: bool,
    scripting: bool,
    is_fragment: bool,
    pending_table_chars: String,
    pending_table_chars_non_whitespace: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        let mut tree = Tree::new();
        let document = tree.insert(tree.root(), Node::Document(DocumentData::default()));
        TreeBuilder {
            tree,
            document,
            mode: InsertionMode::Initial,
            orig_mode: InsertionMode::Initial,
            template_modes: Vec::new(),
            open: OpenElements::new(),
            afe: ActiveFormattingElements::new(),
            head_element: None,
            form_element: None,
            frameset_ok: true,
            scripting: false,
            is_fragment: false,
            pending_table_chars: String::new(),
            pending_table_chars_non_whitespace: false,
        }
    }

    fn set_document_compat_mode(&mut self, mode: CompatMode) {
        if let Some(Node::Document(data)) = self.tree.get_mut(self.document) {
            data.compat_mode = mode;
        }
    }

    fn run(&mut self, input: &str, errors: &mut dyn ParseErrorSink) {
        let stream = InputStream::new(input);
        let mut tokenizer = Tokenizer::new(&stream);
        loop {
            let token = tokenizer.next_token(errors);
            let is_eof = matches!(token, Token::EndOfFile);
            self.dispatch(token, &mut tokenizer, errors);
            if is_eof {
                break;
            }
        }
    }

    fn dispatch(&mut self, mut token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) {
        loop {
            let use_foreign = self.use_foreign_content_rules(&token);
            let step = if use_foreign {
                self.step_foreign_content(token, tok, errors)
            } else {
                self.step(token, tok, errors)
            };
            match step {
                Step::Done => return,
                Step::Reprocess(next) => token = next,
            }
        }
    }

    // ---- tree construction dispatcher -------------------------------------

    fn adjusted_current_node(&self) -> Option<NodeId> {
        self.open.current_node()
    }

    fn use_foreign_content_rules(&self, token: &Token) -> bool {
        let Some(target) = self.adjusted_current_node() else {
            return false;
        };
        if matches!(token, Token::EndOfFile) {
            return false;
        }
        let Some(Node::Element { namespace, local_name, attributes, .. }) = self.tree.get(target) else {
            return false;
        };
        if *namespace == Namespace::Html {
            return false;
        }
        let is_mathml_text_ip =
            *namespace == Namespace::MathMl && matches!(local_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext");
        if is_mathml_text_ip {
            match token {
                Token::StartTag(t) if t.name == "mglyph" || t.name == "malignmark" => {}
                Token::StartTag(_) | Token::Character(_) => return false,
                _ => {}
            }
        }
        let is_annotation_xml = *namespace == Namespace::MathMl && local_name.as_str() == "annotation-xml";
        if is_annotation_xml {
            if let Token::StartTag(t) = token {
                if t.name == "svg" {
                    return false;
                }
            }
            let encoding = attributes.iter().find(|a| a.name_is("encoding")).map(|a| a.value.to_ascii_lowercase());
            if matches!(encoding.as_deref(), Some("text/html") | Some("application/xhtml+xml"))
                && matches!(token, Token::StartTag(_))
            {
                return false;
            }
        }
        let is_html_ip = *namespace == Namespace::Svg
            && matches!(local_name.as_str(), "foreignObject" | "desc" | "title");
        if is_html_ip && matches!(token, Token::StartTag(_) | Token::Character(_)) {
            return false;
        }
        true
    }

    // ---- insertion helpers --------------------------------------------------

    fn current_namespace(&self) -> Namespace {
        self.open
            .current_node()
            .and_then(|id| self.tree.get(id))
            .and_then(Node::namespace)
            .unwrap_or(Namespace::Html)
    }

    fn is_table_shaped(&self, id: NodeId) -> bool {
        self.tree
            .get(id)
            .is_some_and(|n| matches!(n.local_name(), Some(ln) if matches!(ln.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr")))
    }

    fn foster_parent_position(&self) -> NodeId {
        let ids: Vec<NodeId> = self.open.iter().collect();
        if let Some(idx) = ids.iter().rposition(|&id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::table))) {
            let table = ids[idx];
            if self.tree.parent(table).is_some() {
                return table;
            }
            let above = if idx > 0 { ids[idx - 1] } else { ids[0] };
            return self.tree.end(above);
        }
        self.tree.end(ids[0])
    }

    fn insertion_point(&self, foster: bool) -> NodeId {
        let target = self.open.current_node().unwrap_or(self.document);
        if foster && self.is_table_shaped(target) {
            self.foster_parent_position()
        } else {
            self.tree.end(target)
        }
    }

    fn insert_comment(&mut self, data: Box<str>, target: Option<NodeId>) {
        let pos = target.map(|t| self.tree.end(t)).unwrap_or_else(|| self.insertion_point(false));
        self.tree.insert(pos, Node::Comment(data));
    }

    fn insert_character(&mut self, c: char, foster: bool) {
        let pos = self.insertion_point(foster);
        if let Some(prev) = self.tree.prev_sibling(pos) {
            if let Some(Node::Text(s)) = self.tree.get_mut(prev) {
                s.push(c);
                return;
            }
        }
        self.tree.insert(pos, Node::Text(c.to_string()));
    }

    fn adjust_attribute(&self, attr: &TokenAttribute, namespace: Namespace) -> DomAttribute {
        let raw = attr.name.as_str();
        let (ns, prefix, local) = foreign::adjust_foreign_attribute_name(raw);
        if ns.is_some() {
            return DomAttribute { namespace: ns, prefix, local_name: LocalName::new(&local), value: attr.value.clone() };
        }
        let local = match namespace {
            Namespace::Svg => foreign::adjust_svg_attribute_name(raw),
            Namespace::MathMl => foreign::adjust_mathml_attribute_name(raw),
            Namespace::Html => raw.into(),
        };
        DomAttribute::new(LocalName::new(&local), attr.value.clone())
    }

    fn create_element(&mut self, name: LocalName, namespace: Namespace, attrs: Vec<DomAttribute>, foster: bool) -> NodeId {
        let pos = self.insertion_point(foster);
        self.tree.insert(pos, Node::Element { namespace, prefix: None, local_name: name, attributes: attrs })
    }

    fn insert_html_element(&mut self, tag: &StartTag) -> NodeId {
        self.insert_html_element_foster(tag, false)
    }

    fn insert_html_element_foster(&mut self, tag: &StartTag, foster: bool) -> NodeId {
        let attrs = tag.attributes.iter().map(|a| DomAttribute::new(a.name.clone(), a.value.clone())).collect();
        let id = self.create_element(tag.name.clone(), Namespace::Html, attrs, foster);
        self.open.push(id);
        id
    }

    fn insert_foreign_element(&mut self, tag: &StartTag, namespace: Namespace) -> NodeId {
        let name: LocalName = if namespace == Namespace::Svg {
            LocalName::new(&foreign::adjust_svg_tag_name(tag.name.as_str()))
        } else {
            tag.name.clone()
        };
        let attrs = tag.attributes.iter().map(|a| self.adjust_attribute(a, namespace)).collect();
        let id = self.create_element(name, namespace, attrs, false);
        self.open.push(id);
        if tag.self_closing {
            self.open.pop();
        }
        id
    }

    fn insert_generic_rcdata_or_rawtext(&mut self, tag: &StartTag, tok: &mut Tokenizer, state: TokenizerState) {
        self.insert_html_element(tag);
        tok.switch_to(state);
        self.orig_mode = self.mode;
        self.mode = InsertionMode::Text;
    }

    // ---- scope-closing helpers ----------------------------------------------

    const IMPLIED_END_SET: &'static [&'static str] =
        &["dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc"];
    const IMPLIED_END_SET_THOROUGH: &'static [&'static str] =
        &["caption", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr"];

    fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        self.open.pop_while(&self.tree, |n| {
            n.local_name().is_some_and(|ln| {
                Self::IMPLIED_END_SET.contains(&ln.as_str()) && except != Some(ln.as_str())
            })
        });
    }

    fn generate_implied_end_tags_thoroughly(&mut self) {
        self.open.pop_while(&self.tree, |n| {
            n.local_name().is_some_and(|ln| {
                Self::IMPLIED_END_SET.contains(&ln.as_str()) || Self::IMPLIED_END_SET_THOROUGH.contains(&ln.as_str())
            })
        });
    }

    fn close_p_element(&mut self, errors: &mut dyn ParseErrorSink) {
        self.generate_implied_end_tags(Some("p"));
        if !self.open.current_node_is(&self.tree, Atom::p) {
            errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
        }
        loop {
            let Some(top) = self.open.pop() else { break };
            if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::p)) {
                break;
            }
        }
    }

    fn reconstruct_active_formatting_elements(&mut self) {
        let TreeBuilder { tree, open, afe, .. } = self;
        let is_open = |id: NodeId| open.contains(id);
        afe.reconstruct(
            |old| {
                let (namespace, local_name, attrs) = match tree.get(old) {
                    Some(Node::Element { namespace, local_name, attributes, .. }) => {
                        (*namespace, local_name.clone(), attributes.clone())
                    }
                    _ => unreachable!("active formatting entry must be an element"),
                };
                let current = open.current_node().expect("open stack non-empty during reconstruction");
                let pos = tree.end(current);
                let new_id = tree.insert(pos, Node::Element { namespace, prefix: None, local_name, attributes: attrs });
                open.push(new_id);
                new_id
            },
            is_open,
        );
    }

    /// Runs the adoption agency algorithm for end tag `subject`.
    ///
    /// @see https://html.spec.whatwg.org/#adoption-agency-algorithm
    fn adoption_agency(&mut self, subject: &str, errors: &mut dyn ParseErrorSink) {
        if let Some(current) = self.open.current_node() {
            if self.tree.get(current).is_some_and(|n| n.local_name().is_some_and(|ln| ln == subject))
                && self.afe.position_of(current).is_none()
            {
                self.open.pop();
                return;
            }
        }

        for _ in 0..8 {
            let entries: Vec<NodeId> = self.afe.elements_since_last_marker().collect();
            let Some(&fmt_elem) = entries
                .iter()
                .rev()
                .find(|&&id| self.tree.get(id).is_some_and(|n| n.local_name().is_some_and(|ln| ln == subject)))
            else {
                self.process_end_tag_in_body(subject, errors);
                return;
            };

            let Some(fmt_stack_idx) = self.open.position_of(fmt_elem) else {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                self.afe.remove(fmt_elem);
                continue;
            };

            let fmt_name = self.tree.get(fmt_elem).and_then(Node::local_name).cloned().unwrap_or(LocalName::new(subject));
            if !self.open.has_element_in_scope(&self.tree, fmt_name.clone(), Namespace::Html) {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                return;
            }
            if self.open.current_node() != Some(fmt_elem) {
                errors.report(ParseError::UnexpectedEndTag, no_span());
            }

            let stack: Vec<NodeId> = self.open.iter().collect();
            let furthest_block = stack[fmt_stack_idx + 1..]
                .iter()
                .find(|&&id| {
                    self.tree
                        .get(id)
                        .is_some_and(|n| n.local_name().is_some_and(|ln| Node::namespace(n).is_some_and(|ns| crate::atoms::is_special(ln, ns))))
                })
                .copied();

            let Some(furthest_block) = furthest_block else {
                while self.open.len() > fmt_stack_idx {
                    self.open.pop();
                }
                self.afe.remove(fmt_elem);
                return;
            };

            let common_ancestor = stack[fmt_stack_idx - 1];
            let mut bookmark_after: Option<NodeId> = None;
            let mut bookmark_is_replace = true;

            let mut node;
            let mut node_stack_idx = self.open.position_of(furthest_block).unwrap();
            let mut last_node = furthest_block;
            let mut inner_loop_counter = 0;

            loop {
                inner_loop_counter += 1;
                if node_stack_idx == 0 {
                    break;
                }
                node_stack_idx -= 1;
                node = self.open.at(node_stack_idx).unwrap();
                if node == fmt_elem {
                    break;
                }

                if inner_loop_counter > 3 {
                    self.afe.remove(node);
                    self.open.remove(node);
                    continue;
                }

                if self.afe.position_of(node).is_none() {
                    self.open.remove(node);
                    continue;
                }

                let (namespace, local_name, attrs) = match self.tree.get(node) {
                    Some(Node::Element { namespace, local_name, attributes, .. }) => {
                        (*namespace, local_name.clone(), attributes.clone())
                    }
                    _ => unreachable!(),
                };
                let new_node = self.tree.insert(
                    self.tree.end(common_ancestor),
                    Node::Element { namespace, prefix: None, local_name, attributes: attrs },
                );
                self.open.replace_at(node_stack_idx, new_node);
                self.afe.replace(node, new_node);

                if last_node == furthest_block {
                    bookmark_after = Some(new_node);
                    bookmark_is_replace = false;
                }

                self.tree.move_node(last_node, self.tree.end(new_node));
                last_node = new_node;
            }

            self.tree.move_node(last_node, self.insertion_point(self.is_table_shaped(common_ancestor)));

            let (fmt_namespace, fmt_attrs) = match self.tree.get(fmt_elem) {
                Some(Node::Element { namespace, attributes, .. }) => (*namespace, attributes.clone()),
                _ => unreachable!(),
            };
            let new_fmt = self.tree.insert(
                self.tree.end(furthest_block),
                Node::Element { namespace: fmt_namespace, prefix: None, local_name: fmt_name.clone(), attributes: fmt_attrs },
            );

            let children: Vec<NodeId> = self.tree.children(furthest_block).collect();
            for child in children {
                if child != new_fmt {
                    self.tree.move_node(child, new_fmt);
                }
            }
            // `new_fmt` itself was appended after collecting `children`, so it was
            // never among them; nothing further to relocate.

            if bookmark_is_replace {
                self.afe.replace(fmt_elem, new_fmt);
            } else if let Some(after) = bookmark_after {
                self.afe.insert_before(after, new_fmt);
                self.afe.remove(fmt_elem);
            }

            self.open.remove(fmt_elem);
            if let Some(pos) = self.open.position_of(furthest_block) {
                self.open.insert_at(pos + 1, new_fmt);
            }
        }
    }

    // ---- reset insertion mode -----------------------------------------------

    fn reset_insertion_mode(&mut self) {
        let stack: Vec<NodeId> = self.open.iter().collect();
        for idx in (0..stack.len()).rev() {
            let node_id = stack[idx];
            let last = idx == 0;
            let is = |a: Atom| self.tree.get(node_id).is_some_and(|n| n.is_html_element(a));

            if is(Atom::select) {
                for j in (0..idx).rev() {
                    let anc = stack[j];
                    if self.tree.get(anc).is_some_and(|n| n.is_html_element(Atom::template)) {
                        self.mode = InsertionMode::InSelect;
                        return;
                    }
                    if self.tree.get(anc).is_some_and(|n| n.is_html_element(Atom::table)) {
                        self.mode = InsertionMode::InSelectInTable;
                        return;
                    }
                }
                self.mode = InsertionMode::InSelect;
                return;
            }
            if (is(Atom::td) || is(Atom::th)) && !last {
                self.mode = InsertionMode::InCell;
                return;
            }
            if is(Atom::tr) {
                self.mode = InsertionMode::InRow;
                return;
            }
            if is(Atom::tbody) || is(Atom::thead) || is(Atom::tfoot) {
                self.mode = InsertionMode::InTableBody;
                return;
            }
            if is(Atom::caption) {
                self.mode = InsertionMode::InCaption;
                return;
            }
            if is(Atom::colgroup) {
                self.mode = InsertionMode::InColumnGroup;
                return;
            }
            if is(Atom::table) {
                self.mode = InsertionMode::InTable;
                return;
            }
            if is(Atom::template) {
                self.mode = *self.template_modes.last().unwrap_or(&InsertionMode::InBody);
                return;
            }
            if is(Atom::head) && !last {
                self.mode = InsertionMode::InHead;
                return;
            }
            if is(Atom::body) {
                self.mode = InsertionMode::InBody;
                return;
            }
            if is(Atom::frameset) {
                self.mode = InsertionMode::InFrameset;
                return;
            }
            if is(Atom::html) {
                self.mode = if self.head_element.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                };
                return;
            }
            if last {
                self.mode = InsertionMode::InBody;
                return;
            }
        }
    }

    // ---- top-level step dispatch --------------------------------------------

    fn step(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match self.mode {
            InsertionMode::Initial => self.initial(token, errors),
            InsertionMode::BeforeHtml => self.before_html(token),
            InsertionMode::BeforeHead => self.before_head(token, tok),
            InsertionMode::InHead => self.in_head(token, tok, errors),
            InsertionMode::InHeadNoscript => self.in_head_noscript(token, tok, errors),
            InsertionMode::AfterHead => self.after_head(token, tok),
            InsertionMode::InBody => self.in_body(token, tok, errors),
            InsertionMode::Text => self.text(token, tok, errors),
            InsertionMode::InTable => self.in_table(token, tok, errors),
            InsertionMode::InTableText => self.in_table_text(token),
            InsertionMode::InCaption => self.in_caption(token, tok, errors),
            InsertionMode::InColumnGroup => self.in_column_group(token),
            InsertionMode::InTableBody => self.in_table_body(token, tok, errors),
            InsertionMode::InRow => self.in_row(token, tok, errors),
            InsertionMode::InCell => self.in_cell(token, tok, errors),
            InsertionMode::InSelect => self.in_select(token, tok, errors),
            InsertionMode::InSelectInTable => self.in_select_in_table(token, tok, errors),
            InsertionMode::InTemplate => self.in_template(token, tok, errors),
            InsertionMode::AfterBody => self.after_body(token, tok),
            InsertionMode::InFrameset => self.in_frameset(token, tok),
            InsertionMode::AfterFrameset => self.after_frameset(token, tok),
            InsertionMode::AfterAfterBody => self.after_after_body(token, tok),
            InsertionMode::AfterAfterFrameset => self.after_after_frameset(token, tok),
        }
    }

    fn reprocess_in_body(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        self.in_body(token, tok, errors)
    }

    fn process_end_tag_in_body(&mut self, name: &str, errors: &mut dyn ParseErrorSink) {
        self.any_other_end_tag_in_body(name, errors);
    }

    // ---- "initial" ------------------------------------------------------------

    fn initial(&mut self, token: Token, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => Step::Done,
            Token::Comment(data) => {
                self.insert_comment(data, Some(self.document));
                Step::Done
            }
            Token::Doctype(d) => {
                let compat = decide_compat_mode(
                    d.name.as_deref(),
                    d.public_id.as_deref(),
                    d.system_id.as_deref(),
                    d.force_quirks,
                );
                self.set_document_compat_mode(compat);
                let pos = self.tree.end(self.document);
                self.tree.insert(
                    pos,
                    Node::DocumentType {
                        name: d.name.unwrap_or_default(),
                        public_id: d.public_id.unwrap_or_default(),
                        system_id: d.system_id.unwrap_or_default(),
                    },
                );
                self.mode = InsertionMode::BeforeHtml;
                Step::Done
            }
            other => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                self.mode = InsertionMode::BeforeHtml;
                Step::Reprocess(other)
            }
        }
    }

    fn before_html(&mut self, token: Token) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => Step::Done,
            Token::Comment(data) => {
                self.insert_comment(data, Some(self.document));
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::BeforeHead;
                Step::Done
            }
            Token::EndTag(ref t) if !matches!(t.name.as_str(), "head" | "body" | "html" | "br") => Step::Done,
            other => {
                let pos = self.tree.end(self.document);
                let html = self.tree.insert(
                    pos,
                    Node::Element { namespace: Namespace::Html, prefix: None, local_name: LocalName::new("html"), attributes: vec![] },
                );
                self.open.push(html);
                self.mode = InsertionMode::BeforeHead;
                Step::Reprocess(other)
            }
        }
    }

    fn before_head(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => Step::Done,
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if t.name == "head" => {
                let id = self.insert_html_element(t);
                self.head_element = Some(id);
                self.mode = InsertionMode::InHead;
                Step::Done
            }
            Token::EndTag(ref t) if !matches!(t.name.as_str(), "head" | "body" | "html" | "br") => Step::Done,
            other => {
                let synthetic = StartTag { name: LocalName::new("head"), attributes: vec![], self_closing: false };
                let id = self.insert_html_element(&synthetic);
                self.head_element = Some(id);
                self.mode = InsertionMode::InHead;
                let _ = tok;
                Step::Reprocess(other)
            }
        }
    }

    /// `<html>` start tags that show up after the `html` element already
    /// exists just merge their attributes in; shared by every insertion mode
    /// from `before head` onward.
    fn in_body_placeholder_for_html_tag(&mut self, tag: &StartTag) -> Step {
        self.merge_html_attributes(tag);
        Step::Done
    }

    fn merge_html_attributes(&mut self, tag: &StartTag) {
        let Some(html) = self.open.at(0) else { return };
        if let Some(Node::Element { attributes, .. }) = self.tree.get_mut(html) {
            for a in &tag.attributes {
                if !attributes.iter().any(|existing| existing.local_name == a.name) {
                    attributes.push(DomAttribute::new(a.name.clone(), a.value.clone()));
                }
            }
        }
    }

    fn in_head(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if matches!(t.name.as_str(), "base" | "basefont" | "bgsound" | "link") => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "meta" => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "title" => {
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rcdata);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "noscript" && self.scripting => {
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rawtext);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "noframes" | "style") => {
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rawtext);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "noscript" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::InHeadNoscript;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "script" => {
                self.insert_html_element(t);
                tok.switch_to(TokenizerState::ScriptData);
                self.orig_mode = self.mode;
                self.mode = InsertionMode::Text;
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "head" => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
                Step::Done
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "body" | "html" | "br") => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
                Step::Reprocess(token.clone())
            }
            Token::StartTag(ref t) if t.name == "template" => {
                self.insert_html_element(t);
                self.afe.insert_marker();
                self.frameset_ok = false;
                self.mode = InsertionMode::InTemplate;
                self.template_modes.push(InsertionMode::InTemplate);
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "template" => {
                if !self.open.iter().any(|id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::template))) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags_thoroughly();
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::template)) {
                        break;
                    }
                }
                self.afe.clear_to_last_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "head" => {
                errors.report(ParseError::UnexpectedStartTagInHead, no_span());
                Step::Done
            }
            Token::EndTag(_) => {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            other => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
                Step::Reprocess(other)
            }
        }
    }

    fn in_head_noscript(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::EndTag(ref t) if t.name == "noscript" => {
                self.open.pop();
                self.mode = InsertionMode::InHead;
                Step::Done
            }
            Token::Character(c) if c.is_whitespace_char() => self.in_head(token, tok, errors),
            Token::Comment(_) => self.in_head(token, tok, errors),
            Token::StartTag(ref t)
                if matches!(t.name.as_str(), "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style") =>
            {
                self.in_head(token, tok, errors)
            }
            Token::EndTag(ref t) if t.name == "br" => {
                self.open.pop();
                self.mode = InsertionMode::InHead;
                Step::Reprocess(token.clone())
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "head" | "noscript") => {
                errors.report(ParseError::UnexpectedStartTagInHead, no_span());
                Step::Done
            }
            Token::EndTag(_) => {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            other => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                self.open.pop();
                self.mode = InsertionMode::InHead;
                Step::Reprocess(other)
            }
        }
    }

    fn after_head(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if t.name == "body" => {
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.mode = InsertionMode::InBody;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "frameset" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::InFrameset;
                Step::Done
            }
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style" | "template" | "title"
                ) =>
            {
                if let Some(head) = self.head_element {
                    self.open.push(head);
                    let step = self.in_head(Token::StartTag(t.clone()), tok, &mut crate::error::IgnoreErrors);
                    self.open.remove(head);
                    step
                } else {
                    Step::Done
                }
            }
            Token::EndTag(ref t) if t.name == "template" => {
                if let Some(head) = self.head_element {
                    self.open.push(head);
                    let step = self.in_head(Token::EndTag(t.clone()), tok, &mut crate::error::IgnoreErrors);
                    step
                } else {
                    Step::Done
                }
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "body" | "html" | "br") => {
                self.start_body_implicitly();
                Step::Reprocess(token.clone())
            }
            Token::StartTag(ref t) if t.name == "head" => Step::Done,
            Token::EndTag(_) => Step::Done,
            other => {
                self.start_body_implicitly();
                Step::Reprocess(other)
            }
        }
    }

    fn start_body_implicitly(&mut self) {
        let synthetic = StartTag { name: LocalName::new("body"), attributes: vec![], self_closing: false };
        self.insert_html_element(&synthetic);
        self.mode = InsertionMode::InBody;
    }

    // ---- in body ---------------------------------------------------------------

    fn in_body(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character('\u{0000}') => {
                errors.report(ParseError::UnexpectedNullCharacter, no_span());
                Step::Done
            }
            Token::Character(c) if c.is_whitespace_char() => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(c, false);
                Step::Done
            }
            Token::Character(c) => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(c, false);
                self.frameset_ok = false;
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "html" => {
                errors.report(ParseError::UnexpectedStartTagInHead, no_span());
                self.merge_html_attributes(t);
                Step::Done
            }
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style" | "template" | "title"
                ) =>
            {
                self.in_head(token.clone(), tok, errors)
            }
            Token::EndTag(ref t) if t.name == "template" => self.in_head(token.clone(), tok, errors),
            Token::StartTag(ref t) if t.name == "body" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                if self.open.len() > 1 {
                    if let Some(body) = self.open.at(1) {
                        if let Some(Node::Element { attributes, .. }) = self.tree.get_mut(body) {
                            for a in &t.attributes {
                                if !attributes.iter().any(|e| e.local_name == a.name) {
                                    attributes.push(DomAttribute::new(a.name.clone(), a.value.clone()));
                                }
                            }
                        }
                    }
                }
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "frameset" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                Step::Done
            }
            Token::EndOfFile => {
                if !self.template_modes.is_empty() {
                    self.in_template(token, tok, errors)
                } else {
                    Step::Done
                }
            }
            Token::EndTag(ref t) if t.name == "body" => {
                if !self.open.has_element_in_scope(&self.tree, LocalName::new("body"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.mode = InsertionMode::AfterBody;
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "html" => {
                if !self.open.has_element_in_scope(&self.tree, LocalName::new("body"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.mode = InsertionMode::AfterBody;
                Step::Reprocess(token.clone())
            }
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog" | "dir" | "div"
                        | "dl" | "fieldset" | "figcaption" | "figure" | "footer" | "header" | "hgroup" | "main"
                        | "menu" | "nav" | "ol" | "p" | "section" | "summary" | "ul"
                ) =>
            {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                if self.open.current_node_is_any_html(
                    &self.tree,
                    &[Atom::h1, Atom::h2, Atom::h3, Atom::h4, Atom::h5, Atom::h6],
                ) {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    self.open.pop();
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "pre" | "listing") => {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "form" => {
                let in_template = self.open.iter().any(|id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::template)));
                if self.form_element.is_some() && !in_template {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    return Step::Done;
                }
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                let id = self.insert_html_element(t);
                if !in_template {
                    self.form_element = Some(id);
                }
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "li" => {
                self.frameset_ok = false;
                let open_ids: Vec<NodeId> = self.open.iter().collect();
                for &id in open_ids.iter().rev() {
                    let Some(node) = self.tree.get(id) else { continue };
                    if node.is_html_element(Atom::li) {
                        self.generate_implied_end_tags(Some("li"));
                        self.open.pop_until_and_including(id);
                        break;
                    }
                    if node.local_name().is_some_and(|ln| Node::namespace(node).is_some_and(|ns| crate::atoms::is_special(ln, ns)))
                        && !matches!(node.local_name().map(LocalName::as_str), Some("address" | "div" | "p"))
                    {
                        break;
                    }
                }
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "dd" | "dt") => {
                self.frameset_ok = false;
                let open_ids: Vec<NodeId> = self.open.iter().collect();
                for &id in open_ids.iter().rev() {
                    let Some(node) = self.tree.get(id) else { continue };
                    if node.local_name().is_some_and(|ln| matches!(ln.as_str(), "dd" | "dt")) {
                        let name = node.local_name().unwrap().as_str().to_string();
                        self.generate_implied_end_tags(Some(&name));
                        self.open.pop_until_and_including(id);
                        break;
                    }
                    if node.local_name().is_some_and(|ln| Node::namespace(node).is_some_and(|ns| crate::atoms::is_special(ln, ns)))
                        && !matches!(node.local_name().map(LocalName::as_str), Some("address" | "div" | "p"))
                    {
                        break;
                    }
                }
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "plaintext" => {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                tok.switch_to(TokenizerState::PlainText);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "button" => {
                if self.open.has_element_in_scope(&self.tree, LocalName::new("button"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    self.generate_implied_end_tags(None);
                    self.any_other_end_tag_in_body("button", errors);
                    return Step::Reprocess(token.clone());
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::EndTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details" | "dialog"
                        | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer" | "header"
                        | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol" | "pre" | "section" | "summary" | "ul"
                ) =>
            {
                if !self.open.has_element_in_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.open.current_node_is(&self.tree, atom_of(&t.name).unwrap_or(Atom::div)) {
                    errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                }
                self.open.pop_until_and_including(self.find_in_scope_id(t.name.as_str()).unwrap_or(self.open.current_node().unwrap()));
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "form" => {
                let in_template = self.open.iter().any(|id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::template)));
                if !in_template {
                    let Some(node) = self.form_element else {
                        errors.report(ParseError::UnexpectedEndTag, no_span());
                        return Step::Done;
                    };
                    self.form_element = None;
                    if !self.open.has_element_in_scope(&self.tree, LocalName::new("form"), Namespace::Html) {
                        errors.report(ParseError::UnexpectedEndTag, no_span());
                        return Step::Done;
                    }
                    self.generate_implied_end_tags(None);
                    if self.open.current_node() != Some(node) {
                        errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                    }
                    self.open.remove(node);
                } else {
                    if !self.open.has_element_in_scope(&self.tree, LocalName::new("form"), Namespace::Html) {
                        errors.report(ParseError::UnexpectedEndTag, no_span());
                        return Step::Done;
                    }
                    self.generate_implied_end_tags(None);
                    if !self.open.current_node_is(&self.tree, Atom::form) {
                        errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                    }
                    loop {
                        let Some(top) = self.open.pop() else { break };
                        if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::form)) {
                            break;
                        }
                    }
                }
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "p" => {
                if !self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    let synthetic = StartTag { name: LocalName::new("p"), attributes: vec![], self_closing: false };
                    self.insert_html_element(&synthetic);
                }
                self.close_p_element(errors);
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "li" => {
                if !self.open.has_element_in_list_item_scope(&self.tree, LocalName::new("li"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(Some("li"));
                if !self.open.current_node_is(&self.tree, Atom::li) {
                    errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::li)) {
                        break;
                    }
                }
                Step::Done
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "dd" | "dt") => {
                let name = t.name.clone();
                if !self.open.has_element_in_scope(&self.tree, name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(Some(name.as_str()));
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.local_name().is_some_and(|ln| *ln == name)) {
                        break;
                    }
                }
                Step::Done
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                if !self.open.current_node_is_any_html(&self.tree, &[Atom::h1, Atom::h2, Atom::h3, Atom::h4, Atom::h5, Atom::h6])
                    && !self
                        .open
                        .has_element_in_scope(&self.tree, LocalName::new("h1"), Namespace::Html)
                    && !self.any_heading_in_scope()
                {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self
                        .tree
                        .get(top)
                        .is_some_and(|n| n.local_name().is_some_and(|ln| matches!(ln.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")))
                    {
                        break;
                    }
                }
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "a" => {
                if let Some(existing) = self
                    .afe
                    .elements_since_last_marker()
                    .rev()
                    .find(|&id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::a)))
                {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    self.adoption_agency("a", errors);
                    self.afe.remove(existing);
                    self.open.remove(existing);
                }
                self.reconstruct_active_formatting_elements();
                let id = self.insert_html_element(t);
                self.afe.push(&self.tree, id);
                Step::Done
            }
            Token::StartTag(ref t) if is_formatting_element_name(t.name.as_str()) => {
                self.reconstruct_active_formatting_elements();
                let id = self.insert_html_element(t);
                self.afe.push(&self.tree, id);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.open.has_element_in_scope(&self.tree, LocalName::new("nobr"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    self.adoption_agency("nobr", errors);
                    self.reconstruct_active_formatting_elements();
                }
                let id = self.insert_html_element(t);
                self.afe.push(&self.tree, id);
                Step::Done
            }
            Token::EndTag(ref t) if is_formatting_element_name(t.name.as_str()) => {
                self.adoption_agency(t.name.as_str(), errors);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "applet" | "marquee" | "object") => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.afe.insert_marker();
                self.frameset_ok = false;
                Step::Done
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "applet" | "marquee" | "object") => {
                if !self.open.has_element_in_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.open.current_node_is(&self.tree, atom_of(&t.name).unwrap_or(Atom::object)) {
                    errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.local_name().is_some_and(|ln| *ln == t.name)) {
                        break;
                    }
                }
                self.afe.clear_to_last_marker();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "table" => {
                if !matches!(
                    self.tree.get(self.document).map(|_| ()),
                    _
                ) {
                }
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "area" | "br" | "embed" | "img" | "keygen" | "wbr") => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.open.pop();
                self.frameset_ok = false;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.open.pop();
                let is_hidden = t.attribute("type").is_some_and(|v| v.eq_ignore_ascii_case("hidden"));
                if !is_hidden {
                    self.frameset_ok = false;
                }
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "param" | "source" | "track") => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "hr" => {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.insert_html_element(t);
                self.open.pop();
                self.frameset_ok = false;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "image" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                let mut retagged = t.clone();
                retagged.name = LocalName::new("img");
                Step::Reprocess(Token::StartTag(retagged))
            }
            Token::StartTag(ref t) if t.name == "textarea" => {
                let id = self.insert_html_element(t);
                let _ = id;
                tok.switch_to(TokenizerState::Rcdata);
                self.orig_mode = self.mode;
                self.frameset_ok = false;
                self.mode = InsertionMode::Text;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "xmp" => {
                if self.open.has_element_in_button_scope(&self.tree, LocalName::new("p"), Namespace::Html) {
                    self.close_p_element(errors);
                }
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rawtext);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "iframe" => {
                self.frameset_ok = false;
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rawtext);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "noembed" => {
                self.insert_generic_rcdata_or_rawtext(t, tok, TokenizerState::Rawtext);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "select") => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InsertionMode::InTable | InsertionMode::InCaption | InsertionMode::InTableBody | InsertionMode::InRow | InsertionMode::InCell => {
                        InsertionMode::InSelectInTable
                    }
                    _ => InsertionMode::InSelect,
                };
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "optgroup" | "option") => {
                if self.open.current_node_is(&self.tree, Atom::option) {
                    self.open.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "rb" | "rtc") => {
                if self.open.has_element_in_scope(&self.tree, LocalName::new("ruby"), Namespace::Html) {
                    self.generate_implied_end_tags(None);
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "rp" | "rt") => {
                if self.open.has_element_in_scope(&self.tree, LocalName::new("ruby"), Namespace::Html) {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "math" => {
                self.reconstruct_active_formatting_elements();
                self.insert_foreign_element(t, Namespace::MathMl);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "svg" => {
                self.reconstruct_active_formatting_elements();
                self.insert_foreign_element(t, Namespace::Svg);
                Step::Done
            }
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                Step::Done
            }
            Token::StartTag(t) => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(&t);
                Step::Done
            }
            Token::EndTag(t) => {
                self.any_other_end_tag_in_body(t.name.as_str(), errors);
                Step::Done
            }
        }
    }

    fn any_heading_in_scope(&self) -> bool {
        ["h1", "h2", "h3", "h4", "h5", "h6"]
            .iter()
            .any(|h| self.open.has_element_in_scope(&self.tree, LocalName::new(h), Namespace::Html))
    }

    fn find_in_scope_id(&self, name: &str) -> Option<NodeId> {
        self.open.iter().rev().find(|&id| self.tree.get(id).is_some_and(|n| n.local_name().is_some_and(|ln| ln == name)))
    }

    fn any_other_end_tag_in_body(&mut self, name: &str, errors: &mut dyn ParseErrorSink) {
        let ids: Vec<NodeId> = self.open.iter().collect();
        for &id in ids.iter().rev() {
            let Some(node) = self.tree.get(id) else { continue };
            let matches_name = node.local_name().is_some_and(|ln| ln == name);
            if matches_name {
                self.generate_implied_end_tags(Some(name));
                if self.open.current_node() != Some(id) {
                    errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                }
                self.open.pop_until_and_including(id);
                return;
            }
            if node.local_name().is_some_and(|ln| Node::namespace(node).is_some_and(|ns| crate::atoms::is_special(ln, ns))) {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                return;
            }
        }
    }

    // ---- text --------------------------------------------------------------

    fn text(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character(c) => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::EndOfFile => {
                errors.report(ParseError::EofInTag, no_span());
                self.open.pop();
                self.mode = self.orig_mode;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if t.name == "script" => {
                self.open.pop();
                self.mode = self.orig_mode;
                Step::Done
            }
            Token::EndTag(_) => {
                self.open.pop();
                self.mode = self.orig_mode;
                let _ = tok;
                Step::Done
            }
            _ => Step::Done,
        }
    }

    // ---- table family --------------------------------------------------------

    fn clear_stack_back_to_table_context(&mut self) {
        loop {
            if self.open.current_node_is_any_html(&self.tree, &[Atom::table, Atom::template, Atom::html]) {
                break;
            }
            if self.open.pop().is_none() {
                break;
            }
        }
    }

    fn clear_stack_back_to_table_body_context(&mut self) {
        loop {
            if self
                .open
                .current_node_is_any_html(&self.tree, &[Atom::tbody, Atom::tfoot, Atom::thead, Atom::template, Atom::html])
            {
                break;
            }
            if self.open.pop().is_none() {
                break;
            }
        }
    }

    fn clear_stack_back_to_table_row_context(&mut self) {
        loop {
            if self.open.current_node_is_any_html(&self.tree, &[Atom::tr, Atom::template, Atom::html]) {
                break;
            }
            if self.open.pop().is_none() {
                break;
            }
        }
    }

    fn in_table(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        let is_table_text_context = self.open.current_node_is_any_html(&self.tree, &[Atom::table, Atom::tbody, Atom::tfoot, Atom::thead, Atom::tr]);
        match token {
            Token::Character(_) if is_table_text_context => {
                self.pending_table_chars.clear();
                self.pending_table_chars_non_whitespace = false;
                self.orig_mode = self.mode;
                self.mode = InsertionMode::InTableText;
                Step::Reprocess(token)
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "caption" => {
                self.clear_stack_back_to_table_context();
                self.afe.insert_marker();
                self.insert_html_element(t);
                self.mode = InsertionMode::InCaption;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "colgroup" => {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InColumnGroup;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "col" => {
                self.clear_stack_back_to_table_context();
                let synthetic = StartTag { name: LocalName::new("colgroup"), attributes: vec![], self_closing: false };
                self.insert_html_element(&synthetic);
                self.mode = InsertionMode::InColumnGroup;
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "tbody" | "tfoot" | "thead") => {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InTableBody;
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "td" | "th" | "tr") => {
                self.clear_stack_back_to_table_context();
                let synthetic = StartTag { name: LocalName::new("tbody"), attributes: vec![], self_closing: false };
                self.insert_html_element(&synthetic);
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if t.name == "table" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                if self.open.has_element_in_table_scope(&self.tree, LocalName::new("table"), Namespace::Html) {
                    loop {
                        let Some(top) = self.open.pop() else { break };
                        if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::table)) {
                            break;
                        }
                    }
                    self.reset_insertion_mode();
                    return Step::Reprocess(token);
                }
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "table" => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("table"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::table)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Done
            }
            Token::EndTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "style" | "script" | "template") => self.in_head(token.clone(), tok, errors),
            Token::EndTag(ref t) if t.name == "template" => self.in_head(token.clone(), tok, errors),
            Token::StartTag(ref t) if t.name == "input" && t.attribute("type").is_some_and(|v| v.eq_ignore_ascii_case("hidden")) => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "form" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                if self.form_element.is_none() {
                    let id = self.insert_html_element(t);
                    self.form_element = Some(id);
                    self.open.pop();
                }
                Step::Done
            }
            Token::EndOfFile => self.in_body(token, tok, errors),
            other => {
                errors.report(ParseError::UnexpectedTokenInForeignContent, no_span());
                self.reprocess_in_body_with_foster(other, tok, errors)
            }
        }
    }

    fn reprocess_in_body_with_foster(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        // "anything else" in `in table` processes using the in-body rules
        // with foster parenting enabled; `in_body`'s own inserts don't take
        // a foster flag, so characters/elements that escape the table are
        // routed here directly rather than through the generic `in_body`
        // dispatcher.
        match token {
            Token::Character(c) => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(c, true);
                if !c.is_whitespace_char() {
                    self.frameset_ok = false;
                }
                Step::Done
            }
            other => self.in_body(other, tok, errors),
        }
    }

    fn in_table_text(&mut self, token: Token) -> Step {
        match token {
            Token::Character('\u{0000}') => Step::Done,
            Token::Character(c) => {
                if !c.is_whitespace_char() {
                    self.pending_table_chars_non_whitespace = true;
                }
                self.pending_table_chars.push(c);
                Step::Done
            }
            other => {
                if self.pending_table_chars_non_whitespace {
                    let chars: Vec<char> = self.pending_table_chars.chars().collect();
                    self.pending_table_chars.clear();
                    self.mode = self.orig_mode;
                    for c in chars {
                        self.reconstruct_active_formatting_elements();
                        self.insert_character(c, true);
                    }
                    self.frameset_ok = false;
                } else {
                    let chars: Vec<char> = self.pending_table_chars.chars().collect();
                    self.pending_table_chars.clear();
                    self.mode = self.orig_mode;
                    for c in chars {
                        self.insert_character(c, false);
                    }
                }
                Step::Reprocess(other)
            }
        }
    }

    fn in_caption(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::EndTag(ref t) if t.name == "caption" => self.close_caption(errors),
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("caption"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    return Step::Done;
                }
                let step = self.close_caption(errors);
                if matches!(step, Step::Done) {
                    Step::Reprocess(token)
                } else {
                    step
                }
            }
            Token::EndTag(ref t) if t.name == "table" => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("caption"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                let _ = self.close_caption(errors);
                Step::Reprocess(token)
            }
            Token::EndTag(ref t)
                if matches!(t.name.as_str(), "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") =>
            {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            other => self.in_body(other, tok, errors),
        }
    }

    fn close_caption(&mut self, errors: &mut dyn ParseErrorSink) -> Step {
        self.generate_implied_end_tags(None);
        if !self.open.current_node_is(&self.tree, Atom::caption) {
            errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
        }
        loop {
            let Some(top) = self.open.pop() else { break };
            if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::caption)) {
                break;
            }
        }
        self.afe.clear_to_last_marker();
        self.mode = InsertionMode::InTable;
        Step::Done
    }

    fn in_column_group(&mut self, token: Token) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if t.name == "col" => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "colgroup" => {
                if !self.open.current_node_is(&self.tree, Atom::colgroup) {
                    return Step::Done;
                }
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "col" => Step::Done,
            Token::StartTag(ref t) if t.name == "template" => {
                let mut tok = Tokenizer::new(&InputStream::new(""));
                self.in_head(Token::StartTag(t.clone()), &mut tok, &mut crate::error::IgnoreErrors)
            }
            Token::EndTag(ref t) if t.name == "template" => {
                let mut tok = Tokenizer::new(&InputStream::new(""));
                self.in_head(Token::EndTag(t.clone()), &mut tok, &mut crate::error::IgnoreErrors)
            }
            Token::EndOfFile => {
                if !self.open.current_node_is(&self.tree, Atom::colgroup) {
                    return Step::Done;
                }
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Reprocess(token)
            }
            other => {
                if !self.open.current_node_is(&self.tree, Atom::colgroup) {
                    return Step::Done;
                }
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Reprocess(other)
            }
        }
    }

    fn in_table_body(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::StartTag(ref t) if t.name == "tr" => {
                self.clear_stack_back_to_table_body_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InRow;
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "th" | "td") => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                self.clear_stack_back_to_table_body_context();
                let synthetic = StartTag { name: LocalName::new("tr"), attributes: vec![], self_closing: false };
                self.insert_html_element(&synthetic);
                self.mode = InsertionMode::InRow;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "tbody" | "tfoot" | "thead") => {
                if !self.open.has_element_in_table_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_body_context();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Done
            }
            Token::StartTag(ref t)
                if matches!(t.name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead") =>
            {
                if !self.any_table_body_in_scope() {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_body_context();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if t.name == "table" => {
                if !self.any_table_body_in_scope() {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_body_context();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t)
                if matches!(t.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr") =>
            {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            other => self.in_table(other, tok, errors),
        }
    }

    fn any_table_body_in_scope(&self) -> bool {
        ["tbody", "tfoot", "thead"]
            .iter()
            .any(|n| self.open.has_element_in_table_scope(&self.tree, LocalName::new(n), Namespace::Html))
    }

    fn in_row(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::StartTag(ref t) if matches!(t.name.as_str(), "th" | "td") => {
                self.clear_stack_back_to_table_row_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InCell;
                self.afe.insert_marker();
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "tr" => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("tr"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_row_context();
                self.open.pop();
                self.mode = InsertionMode::InTableBody;
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr") => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("tr"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_row_context();
                self.open.pop();
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if t.name == "table" => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("tr"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_row_context();
                self.open.pop();
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "tbody" | "tfoot" | "thead") => {
                if !self.open.has_element_in_table_scope(&self.tree, t.name.clone(), Namespace::Html)
                    || !self.open.has_element_in_table_scope(&self.tree, LocalName::new("tr"), Namespace::Html)
                {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.clear_stack_back_to_table_row_context();
                self.open.pop();
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th") => {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            other => self.in_table(other, tok, errors),
        }
    }

    fn in_cell(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::EndTag(ref t) if matches!(t.name.as_str(), "td" | "th") => {
                if !self.open.has_element_in_table_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.generate_implied_end_tags(None);
                if !self.open.current_node_is_any_html(&self.tree, &[Atom::td, Atom::th]) {
                    errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
                }
                let name = t.name.clone();
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.local_name().is_some_and(|ln| *ln == name)) {
                        break;
                    }
                }
                self.afe.clear_to_last_marker();
                self.mode = InsertionMode::InRow;
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") => {
                if !self.open.has_element_in_table_scope(&self.tree, LocalName::new("td"), Namespace::Html)
                    && !self.open.has_element_in_table_scope(&self.tree, LocalName::new("th"), Namespace::Html)
                {
                    errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                    return Step::Done;
                }
                self.close_current_cell(errors);
                Step::Reprocess(token)
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") => {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            Token::EndTag(ref t) if matches!(t.name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") => {
                if !self.open.has_element_in_table_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                self.close_current_cell(errors);
                Step::Reprocess(token)
            }
            other => self.in_body(other, tok, errors),
        }
    }

    fn close_current_cell(&mut self, errors: &mut dyn ParseErrorSink) {
        self.generate_implied_end_tags(None);
        if !self.open.current_node_is_any_html(&self.tree, &[Atom::td, Atom::th]) {
            errors.report(ParseError::ClosedElementsWithOpenChildren, no_span());
        }
        loop {
            let Some(top) = self.open.pop() else { break };
            if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::td) || n.is_html_element(Atom::th)) {
                break;
            }
        }
        self.afe.clear_to_last_marker();
        self.mode = InsertionMode::InRow;
    }

    // ---- select family --------------------------------------------------------

    fn in_select(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character('\u{0000}') => {
                errors.report(ParseError::UnexpectedNullCharacter, no_span());
                Step::Done
            }
            Token::Character(c) => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if t.name == "option" => {
                if self.open.current_node_is(&self.tree, Atom::option) {
                    self.open.pop();
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "optgroup" => {
                if self.open.current_node_is(&self.tree, Atom::option) {
                    self.open.pop();
                }
                if self.open.current_node_is(&self.tree, Atom::optgroup) {
                    self.open.pop();
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "optgroup" => {
                let stack: Vec<NodeId> = self.open.iter().collect();
                if stack.len() >= 2
                    && self.tree.get(stack[stack.len() - 1]).is_some_and(|n| n.is_html_element(Atom::option))
                    && self.tree.get(stack[stack.len() - 2]).is_some_and(|n| n.is_html_element(Atom::optgroup))
                {
                    self.open.pop();
                }
                if self.open.current_node_is(&self.tree, Atom::optgroup) {
                    self.open.pop();
                } else {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                }
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "option" => {
                if self.open.current_node_is(&self.tree, Atom::option) {
                    self.open.pop();
                } else {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                }
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "select" => {
                if !self.open.has_element_in_select_scope(&self.tree, LocalName::new("select"), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::select)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "select" => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::select)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Done
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "input" | "keygen" | "textarea") => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                if !self.open.has_element_in_select_scope(&self.tree, LocalName::new("select"), Namespace::Html) {
                    return Step::Done;
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::select)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "script" | "template") => self.in_head(token.clone(), tok, errors),
            Token::EndTag(ref t) if t.name == "template" => self.in_head(token.clone(), tok, errors),
            Token::EndOfFile => self.in_body(token, tok, errors),
            _ => {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                Step::Done
            }
        }
    }

    fn in_select_in_table(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::StartTag(ref t)
                if matches!(t.name.as_str(), "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                errors.report(ParseError::UnexpectedStartTagIgnored, no_span());
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::select)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Reprocess(token)
            }
            Token::EndTag(ref t)
                if matches!(t.name.as_str(), "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                if !self.open.has_element_in_table_scope(&self.tree, t.name.clone(), Namespace::Html) {
                    errors.report(ParseError::UnexpectedEndTag, no_span());
                    return Step::Done;
                }
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::select)) {
                        break;
                    }
                }
                self.reset_insertion_mode();
                Step::Reprocess(token)
            }
            other => self.in_select(other, tok, errors),
        }
    }

    // ---- template --------------------------------------------------------------

    fn in_template(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character(_) | Token::Comment(_) | Token::Doctype(_) => self.in_body(token, tok, errors),
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script" | "style" | "template" | "title"
                ) =>
            {
                self.in_head(token.clone(), tok, errors)
            }
            Token::EndTag(ref t) if t.name == "template" => self.in_head(token.clone(), tok, errors),
            Token::StartTag(ref t) if matches!(t.name.as_str(), "caption" | "colgroup" | "tbody" | "tfoot" | "thead") => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InTable);
                self.mode = InsertionMode::InTable;
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if t.name == "col" => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InColumnGroup);
                self.mode = InsertionMode::InColumnGroup;
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if t.name == "tr" => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InTableBody);
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(token)
            }
            Token::StartTag(ref t) if matches!(t.name.as_str(), "td" | "th") => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InRow);
                self.mode = InsertionMode::InRow;
                Step::Reprocess(token)
            }
            Token::StartTag(_) => {
                self.template_modes.pop();
                self.template_modes.push(InsertionMode::InBody);
                self.mode = InsertionMode::InBody;
                Step::Reprocess(token)
            }
            Token::EndTag(_) => {
                errors.report(ParseError::UnexpectedEndTag, no_span());
                Step::Done
            }
            Token::EndOfFile => {
                if !self.open.iter().any(|id| self.tree.get(id).is_some_and(|n| n.is_html_element(Atom::template))) {
                    return Step::Done;
                }
                errors.report(ParseError::EofInTag, no_span());
                loop {
                    let Some(top) = self.open.pop() else { break };
                    if self.tree.get(top).is_some_and(|n| n.is_html_element(Atom::template)) {
                        break;
                    }
                }
                self.afe.clear_to_last_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                Step::Reprocess(token)
            }
        }
    }

    // ---- after body / frameset --------------------------------------------------

    fn after_body(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.in_body(token, tok, &mut crate::error::IgnoreErrors)
            }
            Token::Comment(data) => {
                if let Some(html) = self.open.at(0) {
                    self.insert_comment(data, Some(html));
                }
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::EndTag(ref t) if t.name == "html" => {
                self.mode = InsertionMode::AfterAfterBody;
                Step::Done
            }
            Token::EndOfFile => Step::Done,
            other => {
                self.mode = InsertionMode::InBody;
                Step::Reprocess(other)
            }
        }
    }

    fn in_frameset(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::StartTag(ref t) if t.name == "frameset" => {
                self.insert_html_element(t);
                Step::Done
            }
            Token::EndTag(ref t) if t.name == "frameset" => {
                if self.open.len() > 1 {
                    self.open.pop();
                }
                if !self.is_fragment && !self.open.current_node_is(&self.tree, Atom::frameset) {
                    self.mode = InsertionMode::AfterFrameset;
                }
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "frame" => {
                self.insert_html_element(t);
                self.open.pop();
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "noframes" => self.in_head(token.clone(), tok, &mut crate::error::IgnoreErrors),
            Token::EndOfFile => Step::Done,
            _ => Step::Done,
        }
    }

    fn after_frameset(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Character(c) if c.is_whitespace_char() => {
                self.insert_character(c, false);
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::StartTag(ref t) if t.name == "html" => self.in_body_placeholder_for_html_tag(t),
            Token::EndTag(ref t) if t.name == "html" => {
                self.mode = InsertionMode::AfterAfterFrameset;
                Step::Done
            }
            Token::StartTag(ref t) if t.name == "noframes" => self.in_head(token.clone(), tok, &mut crate::error::IgnoreErrors),
            Token::EndOfFile => Step::Done,
            _ => Step::Done,
        }
    }

    fn after_after_body(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Comment(data) => {
                self.insert_comment(data, Some(self.document));
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::Character(c) if c.is_whitespace_char() => {
                self.in_body(token, tok, &mut crate::error::IgnoreErrors)
            }
            Token::StartTag(ref t) if t.name == "html" => {
                self.in_body(token.clone(), tok, &mut crate::error::IgnoreErrors)
            }
            Token::EndOfFile => Step::Done,
            other => {
                self.mode = InsertionMode::InBody;
                Step::Reprocess(other)
            }
        }
    }

    fn after_after_frameset(&mut self, token: Token, tok: &mut Tokenizer) -> Step {
        match token {
            Token::Comment(data) => {
                self.insert_comment(data, Some(self.document));
                Step::Done
            }
            Token::Doctype(_) => Step::Done,
            Token::Character(c) if c.is_whitespace_char() => {
                self.in_body(token, tok, &mut crate::error::IgnoreErrors)
            }
            Token::StartTag(ref t) if t.name == "html" => {
                self.in_body(token.clone(), tok, &mut crate::error::IgnoreErrors)
            }
            Token::StartTag(ref t) if t.name == "noframes" => self.in_head(token.clone(), tok, &mut crate::error::IgnoreErrors),
            Token::EndOfFile => Step::Done,
            _ => Step::Done,
        }
    }

    // ---- foreign content --------------------------------------------------------

    fn step_foreign_content(&mut self, token: Token, tok: &mut Tokenizer, errors: &mut dyn ParseErrorSink) -> Step {
        match token {
            Token::Character('\u{0000}') => {
                errors.report(ParseError::UnexpectedNullCharacter, no_span());
                self.insert_character('\u{FFFD}', false);
                Step::Done
            }
            Token::Character(c) => {
                self.insert_character(c, false);
                if !c.is_whitespace_char() {
                    self.frameset_ok = false;
                }
                Step::Done
            }
            Token::Comment(data) => {
                self.insert_comment(data, None);
                Step::Done
            }
            Token::Doctype(_) => {
                errors.report(ParseError::UnexpectedDoctype, no_span());
                Step::Done
            }
            Token::StartTag(ref t)
                if matches!(
                    t.name.as_str(),
                    "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl" | "dt" | "em"
                        | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr" | "i" | "img" | "li"
                        | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre" | "ruby" | "s" | "small" | "span"
                        | "strong" | "strike" | "sub" | "sup" | "table" | "tt" | "u" | "ul" | "var"
                ) =>
            {
                errors.report(ParseError::UnexpectedTokenInForeignContent, no_span());
                while !self.at_integration_point_or_html() {
                    self.open.pop();
                }
                self.reprocess_in_body(token, tok, errors)
            }
            Token::StartTag(ref t) if t.name == "font" && t.attribute("color").or(t.attribute("face")).or(t.attribute("size")).is_some() => {
                errors.report(ParseError::UnexpectedTokenInForeignContent, no_span());
                while !self.at_integration_point_or_html() {
                    self.open.pop();
                }
                self.reprocess_in_body(token, tok, errors)
            }
            Token::StartTag(t) => {
                let namespace = self.current_namespace();
                self.insert_foreign_element(&t, namespace);
                Step::Done
            }
            Token::EndTag(ref t) if t.name.eq_ignore_ascii_case_str("script") && self.current_namespace() == Namespace::Svg => {
                self.open.pop();
                Step::Done
            }
            Token::EndTag(t) => {
                let ids: Vec<NodeId> = self.open.iter().collect();
                if ids.is_empty() {
                    return Step::Done;
                }
                let mut idx = ids.len() - 1;
                loop {
                    let node_id = ids[idx];
                    let matches_name =
                        self.tree.get(node_id).is_some_and(|n| n.local_name().is_some_and(|ln| ln.as_str().eq_ignore_ascii_case(t.name.as_str())));
                    if matches_name {
                        self.open.pop_until_and_including(node_id);
                        break;
                    }
                    if self.tree.get(node_id).is_some_and(|n| Node::namespace(n) == Some(Namespace::Html)) {
                        return self.in_body(Token::EndTag(t), tok, errors);
                    }
                    if idx == 0 {
                        break;
                    }
                    idx -= 1;
                }
                Step::Done
            }
            Token::EndOfFile => self.in_body(token, tok, errors),
        }
    }

    fn at_integration_point_or_html(&self) -> bool {
        let Some(current) = self.open.current_node() else { return true };
        let Some(Node::Element { namespace, local_name, .. }) = self.tree.get(current) else {
            return true;
        };
        *namespace == Namespace::Html
            || (*namespace == Namespace::MathMl && matches!(local_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext"))
            || (*namespace == Namespace::MathMl && local_name.as_str() == "annotation-xml")
            || (*namespace == Namespace::Svg && matches!(local_name.as_str(), "foreignObject" | "desc" | "title"))
    }
}

/// `LocalName`'s `PartialEq<&str>` is already ASCII-case-sensitive-exact
/// (tag names are lowercased by the tokenizer); foreign content's `script`
/// end tag check wants a case-insensitive compare against a literal.
trait EqIgnoreAsciiCaseStr {
    fn eq_ignore_ascii_case_str(&self, other: &str) -> bool;
}

impl EqIgnoreAsciiCaseStr for LocalName {
    fn eq_ignore_ascii_case_str(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

trait CharExt {
    fn is_whitespace_char(&self) -> bool;
}

impl CharExt for char {
    fn is_whitespace_char(&self) -> bool {
        matches!(self, '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}')
    }
}

/// Best-effort mapping back from a parsed tag name to its `Atom`, for the
/// handful of call sites that want to compare a just-matched end tag
/// against `current_node_is` without re-interning through `LocalName::new`.
fn atom_of(name: &LocalName) -> Option<Atom> {
    match name {
        LocalName::Atom(a) => Some(*a),
        LocalName::Other(_) => None,
    }
}

/// Runs the `<meta charset>`/`http-equiv` prescan when `confidence` leaves
/// the encoding open to override, per the encoding sniffing algorithm's
/// prescan step. Returns the raw label found, if any — acting on it (picking
/// a decoder for that label and reparsing) is the host's job; see `(a)` in
/// `DESIGN.md`'s Open Questions.
fn sniff_for_change(bytes: &[u8], confidence: EncodingConfidence) -> Option<Box<str>> {
    match confidence {
        EncodingConfidence::Tentative => crate::encoding::sniff_meta_charset(bytes),
        EncodingConfidence::Certain | EncodingConfidence::Irrelevant => None,
    }
}

/// Parses a complete document from bytes.
///
/// `hint` decodes `bytes` into the code-point stream the tokenizer consumes.
/// If `confidence` is [`EncodingConfidence::Tentative`], `bytes` is also
/// prescanned for a `<meta charset>`/`http-equiv` declaration; a label found
/// there is returned alongside the tree so the host can restart the parse
/// with the correct decoder (§5's "change the encoding" signal). The parse
/// always completes against `hint`'s decoding — this function never retries
/// itself.
///
/// @see https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding
pub fn parse_document(
    bytes: &[u8],
    confidence: EncodingConfidence,
    hint: &mut dyn Decoder,
    errors: &mut dyn ParseErrorSink,
) -> (Tree, NodeId, Option<Box<str>>) {
    let change_encoding = sniff_for_change(bytes, confidence);
    let input = hint.decode(bytes);
    let mut builder = TreeBuilder::new();
    builder.run(&input, errors);
    (builder.tree, builder.document, change_encoding)
}

/// Parses `bytes` as a fragment in the context of an element named
/// `context_name` in `context_ns`. Returns the tree, a synthetic `html`
/// element whose children are the parsed fragment (the wrapper element
/// itself is never meant to be serialized, see [`crate::serializer`]), and
/// any encoding-change label the same way [`parse_document`] does.
pub fn parse_fragment(
    bytes: &[u8],
    confidence: EncodingConfidence,
    hint: &mut dyn Decoder,
    context_ns: Namespace,
    context_name: &str,
    errors: &mut dyn ParseErrorSink,
) -> (Tree, NodeId, Option<Box<str>>) {
    let change_encoding = sniff_for_change(bytes, confidence);
    let input = hint.decode(bytes);

    let mut builder = TreeBuilder::new();
    builder.is_fragment = true;

    let root = builder.tree.insert(
        builder.tree.end(builder.document),
        Node::Element { namespace: Namespace::Html, prefix: None, local_name: LocalName::new("html"), attributes: vec![] },
    );
    builder.open.push(root);

    if context_name == "form" && context_ns == Namespace::Html {
        builder.form_element = Some(root);
    }
    if context_name == "template" && context_ns == Namespace::Html {
        builder.template_modes.push(InsertionMode::InTemplate);
    }
    builder.reset_insertion_mode();

    let stream = InputStream::new(&input);
    let mut tokenizer = Tokenizer::new(&stream);
    if context_ns == Namespace::Html {
        match context_name {
            "title" | "textarea" => tokenizer.switch_to(TokenizerState::Rcdata),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => tokenizer.switch_to(TokenizerState::Rawtext),
            "script" => tokenizer.switch_to(TokenizerState::ScriptData),
            "plaintext" => tokenizer.switch_to(TokenizerState::PlainText),
            _ => {}
        }
    }

    loop {
        let token = tokenizer.next_token(errors);
        let is_eof = matches!(token, Token::EndOfFile);
        builder.dispatch(token, &mut tokenizer, errors);
        if is_eof {
            break;
        }
    }

    (builder.tree, root, change_encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Utf8Decoder;
    use crate::error::IgnoreErrors;
    use crate::serializer::serialize_document;

    fn parse(html: &str) -> (Tree, NodeId) {
        let mut errors = IgnoreErrors;
        let mut decoder = Utf8Decoder;
        let (tree, doc, _) = parse_document(html.as_bytes(), EncodingConfidence::Irrelevant, &mut decoder, &mut errors);
        (tree, doc)
    }

    #[test]
    fn implicit_html_head_body_are_synthesized() {
        let (tree, doc) = parse("<p>hi</p>");
        let html = tree.children(doc).next().expect("html element");
        assert!(tree.get(html).is_some_and(|n| n.is_html_element(Atom::html)));
        let mut kids = tree.children(html);
        let head = kids.next().expect("head element");
        assert!(tree.get(head).is_some_and(|n| n.is_html_element(Atom::head)));
        let body = kids.next().expect("body element");
        assert!(tree.get(body).is_some_and(|n| n.is_html_element(Atom::body)));
    }

    #[test]
    fn unclosed_paragraph_is_autoclosed_by_next_paragraph() {
        let (tree, doc) = serialize_roundtrip("<p>one<p>two");
        assert_eq!(tree, "<html><head></head><body><p>one</p><p>two</p></body></html>");
        let _ = doc;
    }

    fn serialize_roundtrip(html: &str) -> (String, ()) {
        let (tree, doc) = parse(html);
        (serialize_document(&tree, doc), ())
    }

    #[test]
    fn doctype_sets_no_quirks_compat_mode() {
        let (tree, doc) = parse("<!DOCTYPE html><p>x</p>");
        let Some(Node::Document(data)) = tree.get(doc) else { panic!("expected document") };
        assert_eq!(data.compat_mode, CompatMode::NoQuirks);
    }

    #[test]
    fn formatting_element_reopens_after_table_foster_parenting() {
        let (tree, doc) = parse("<body><b>bold<table><tr><td>cell</td></tr></table>after</b></body>");
        let html = tree.children(doc).next().unwrap();
        let body = tree.children(html).nth(1).unwrap();
        // "bold" text should be wrapped in a <b>; "after" should be wrapped
        // in a second, reconstructed <b> that is a sibling of the table.
        let bs: Vec<NodeId> = tree
            .descendants(body)
            .filter(|&id| tree.get(id).is_some_and(|n| n.is_html_element(Atom::b)))
            .collect();
        assert!(bs.len() >= 2, "expected the formatting element to be reopened after the table");
    }

    #[test]
    fn table_text_is_foster_parented_before_the_table() {
        let (tree, doc) = serialize_roundtrip("<table>stray<tr><td>cell</td></tr></table>");
        assert!(tree.starts_with("<html><head></head><body>stray<table>"), "got: {tree}");
        let _ = doc;
    }

    #[test]
    fn svg_element_is_created_in_svg_namespace() {
        let (tree, doc) = parse("<body><svg><circle/></svg></body>");
        let html = tree.children(doc).next().unwrap();
        let body = tree.children(html).nth(1).unwrap();
        let svg = tree.children(body).next().unwrap();
        assert_eq!(tree.get(svg).and_then(Node::namespace), Some(Namespace::Svg));
    }
}
