//! html5ever TreeSink that builds an [`ArenaDom`].

use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};
use log::{debug, trace};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Where the tree builder wants a node to go.
#[derive(Clone, Copy)]
enum Position {
    LastChildOf(ArenaNodeId),
    Before(ArenaNodeId),
}

/// Builds an arena while html5ever drives the tree construction algorithm.
///
/// Handles are plain arena ids. TreeSink takes `&self` everywhere, so the
/// arena sits in a RefCell.
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
    quirks_mode: Cell<QuirksMode>,
    errors: Cell<usize>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(ArenaDom::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
            errors: Cell::new(0),
        }
    }

    pub fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }

    /// Insert a node or a run of text. Text next to an existing text node is
    /// merged into it, the way the DOM normalizes parser output.
    fn insert(&self, position: Position, child: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        match (position, child) {
            (Position::LastChildOf(parent), NodeOrText::AppendNode(node)) => {
                dom.append(parent, node);
            }
            (Position::LastChildOf(parent), NodeOrText::AppendText(text)) => {
                dom.append_text(parent, &text);
            }
            (Position::Before(sibling), NodeOrText::AppendNode(node)) => {
                dom.insert_before(sibling, node);
            }
            (Position::Before(sibling), NodeOrText::AppendText(text)) => {
                let prev = dom.get(sibling).map(|n| n.prev_sibling);
                if let Some(prev) = prev
                    && let Some(node) = dom.get_mut(prev)
                    && let ArenaNodeData::Text(existing) = &mut node.data
                {
                    existing.push_str(&text);
                    return;
                }
                let text_node = dom.create_text(text.to_string());
                dom.insert_before(sibling, text_node);
            }
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = ArenaNodeId;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        let errors = self.errors.get();
        if errors > 0 {
            debug!("html parse finished with {errors} recoverable error(s)");
        }
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.set(self.errors.get() + 1);
        trace!("html parse error: {msg}");
    }

    fn get_document(&self) -> ArenaNodeId {
        self.dom.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a ArenaNodeId) -> &'a QualName {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(*target).map(|n| &n.data) {
            Some(ArenaNodeData::Element { name, .. }) => {
                // SAFETY: the tree builder reads the name right away and never
                // holds it across a call that grows the arena, so the QualName
                // is not moved while the reference is alive.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &NO_NAME,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> ArenaNodeId {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();
        self.dom.borrow_mut().create_element(name, attrs)
    }

    fn create_comment(&self, text: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, target: StrTendril, _data: StrTendril) -> ArenaNodeId {
        // Not meaningful in HTML; kept as an inert comment.
        self.dom.borrow_mut().create_comment(format!("?{target}"))
    }

    fn append(&self, parent: &ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        self.insert(Position::LastChildOf(*parent), child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &ArenaNodeId,
        prev_element: &ArenaNodeId,
        child: NodeOrText<ArenaNodeId>,
    ) {
        let has_parent = self.dom.borrow().parent(*element).is_some();
        if has_parent {
            self.insert(Position::Before(*element), child);
        } else {
            self.insert(Position::LastChildOf(*prev_element), child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        let document = dom.document();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &ArenaNodeId) -> ArenaNodeId {
        // Template contents stay as ordinary children; declarative shadow
        // roots are promoted from them after parsing.
        *target
    }

    fn same_node(&self, x: &ArenaNodeId, y: &ArenaNodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn append_before_sibling(&self, sibling: &ArenaNodeId, new_node: NodeOrText<ArenaNodeId>) {
        self.insert(Position::Before(*sibling), new_node);
    }

    fn add_attrs_if_missing(&self, target: &ArenaNodeId, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            let name = attr.name.local.as_ref();
            if !dom.has_attr(*target, name) {
                // set_attr keeps the cached id and class list in sync
                dom.set_attr(*target, name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &ArenaNodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &ArenaNodeId, new_parent: &ArenaNodeId) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(*node).collect();
        for child in children {
            dom.detach(child);
            dom.append(*new_parent, child);
        }
    }
}

/// Parse an HTML document into a fresh arena.
pub fn parse_into_arena(html: &str) -> ArenaDom {
    parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
