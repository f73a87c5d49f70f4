//! Arena-based DOM with shadow roots and slot assignment.
//!
//! All nodes live in one contiguous vector; parent/child/sibling links are
//! indices into it. Nodes are never freed, so an [`ArenaNodeId`] keeps its
//! identity for the lifetime of the arena even after the node is detached.
//!
//! Two relations sit beside the plain tree links:
//!
//! * shadow ownership: a host element maps to a [`ArenaNodeData::ShadowRoot`]
//!   node, which is the root of a separate tree and points back at its host;
//! * slot assignment: a `<slot>` element maps to the ordered list of nodes
//!   projected into it.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::error::{Error, Result};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Encapsulation mode of a shadow root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

impl ShadowRootMode {
    /// Parse a `shadowrootmode` attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Root of an encapsulated subtree owned by `host`.
    ShadowRoot {
        host: ArenaNodeId,
        mode: ShadowRootMode,
    },
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast matching.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (ignored but needed for TreeSink).
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    /// Create a new node with the given data.
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Elements allowed to host a shadow root besides autonomous custom elements.
const SHADOW_HOST_TAGS: &[&str] = &[
    "article",
    "aside",
    "blockquote",
    "body",
    "div",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "main",
    "nav",
    "p",
    "section",
    "span",
];

/// Whether a tag name is a valid custom element name (contains a hyphen
/// after the first character).
pub fn is_custom_element_name(tag: &str) -> bool {
    tag.find('-').is_some_and(|pos| pos > 0)
}

/// Build a `QualName` in the HTML namespace.
pub fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

/// Arena-based DOM tree.
pub struct ArenaDom {
    /// All nodes in the arena.
    nodes: Vec<ArenaNode>,
    /// Document root ID.
    document: ArenaNodeId,
    /// Host element -> shadow root.
    shadow_roots: HashMap<ArenaNodeId, ArenaNodeId>,
    /// Slot element -> nodes currently assigned to it.
    assignments: HashMap<ArenaNodeId, Vec<ArenaNodeId>>,
    /// Projected node -> the slot it is assigned to.
    slotted: HashMap<ArenaNodeId, ArenaNodeId>,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            shadow_roots: HashMap::new(),
            assignments: HashMap::new(),
            slotted: HashMap::new(),
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    /// Allocate a new node in the arena.
    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        // Pre-extract id and class for fast CSS matching
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            if attr.name.local.as_ref() == "id" {
                id = Some(attr.value.clone());
            } else if attr.name.local.as_ref() == "class" {
                classes = attr
                    .value
                    .split_whitespace()
                    .map(|s| s.to_string())
                    .collect();
            }
        }

        self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create an HTML element from a tag name and `(name, value)` attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: value.to_string(),
            })
            .collect();
        self.create_element(html_name(tag), attrs)
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text.into())))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        // Get parent's last child
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        // Set child's parent and prev sibling
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        // Update old last child's next sibling
        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        // Update parent
        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let parent = self
            .get(sibling)
            .map(|n| n.parent)
            .unwrap_or(ArenaNodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(ArenaNodeId::NONE);

        // Set new node's links
        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        // Update sibling's prev
        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        // Update prev's next (or parent's first_child)
        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        // Try to append to existing text node
        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    ///
    /// The node and its subtree stay in the arena; ids into the subtree remain
    /// valid but [`ArenaDom::is_attached`] reports them as detached.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        // Update prev sibling's next pointer
        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            // Was first child
            p.first_child = next;
        }

        // Update next sibling's prev pointer
        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            // Was last child
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }

        // A detached node no longer projects into any slot.
        if let Some(slot) = self.slotted.remove(&target)
            && let Some(assigned) = self.assignments.get_mut(&slot)
        {
            assigned.retain(|&id| id != target);
        }
    }

    /// Attach a new, empty shadow root to `host`.
    pub fn attach_shadow(&mut self, host: ArenaNodeId, mode: ShadowRootMode) -> Result<ArenaNodeId> {
        let tag = self
            .element_name(host)
            .map(|n| n.to_string())
            .ok_or(Error::NodeNotFound(host))?;
        if !is_custom_element_name(&tag) && !SHADOW_HOST_TAGS.contains(&tag.as_str()) {
            return Err(Error::InvalidShadowHost(tag));
        }
        if self.shadow_roots.contains_key(&host) {
            return Err(Error::ShadowRootExists(host));
        }

        let root = self.alloc(ArenaNode::new(ArenaNodeData::ShadowRoot { host, mode }));
        self.shadow_roots.insert(host, root);
        Ok(root)
    }

    /// Get the shadow root owned by `host`, if any.
    pub fn shadow_root(&self, host: ArenaNodeId) -> Option<ArenaNodeId> {
        self.shadow_roots.get(&host).copied()
    }

    /// Get the host of a shadow root node.
    pub fn shadow_host(&self, root: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(root).and_then(|n| match n.data {
            ArenaNodeData::ShadowRoot { host, .. } => Some(host),
            _ => None,
        })
    }

    /// Get the mode of a shadow root node.
    pub fn shadow_mode(&self, root: ArenaNodeId) -> Option<ShadowRootMode> {
        self.get(root).and_then(|n| match n.data {
            ArenaNodeData::ShadowRoot { mode, .. } => Some(mode),
            _ => None,
        })
    }

    /// Iterate over `(host, shadow root)` pairs in host creation order.
    pub fn shadow_roots(&self) -> impl Iterator<Item = (ArenaNodeId, ArenaNodeId)> + '_ {
        let mut pairs: Vec<_> = self.shadow_roots.iter().map(|(h, r)| (*h, *r)).collect();
        pairs.sort();
        pairs.into_iter()
    }

    /// Replace the nodes projected into `slot`.
    pub fn assign_slot(&mut self, slot: ArenaNodeId, nodes: Vec<ArenaNodeId>) -> Result<()> {
        if !self.is_slot(slot) {
            return Err(Error::NotASlot(slot));
        }
        if let Some(previous) = self.assignments.remove(&slot) {
            for node in previous {
                if self.slotted.get(&node) == Some(&slot) {
                    self.slotted.remove(&node);
                }
            }
        }
        for &node in &nodes {
            if let Some(other) = self.slotted.insert(node, slot)
                && other != slot
                && let Some(assigned) = self.assignments.get_mut(&other)
            {
                // A node projects into one slot at a time.
                assigned.retain(|&id| id != node);
            }
        }
        self.assignments.insert(slot, nodes);
        Ok(())
    }

    /// Drop every slot assignment.
    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
        self.slotted.clear();
    }

    /// The slot `id` is projected into, if any.
    pub fn assigned_slot(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.slotted.get(&id).copied()
    }

    /// Nodes currently projected into `slot` (empty when nothing is assigned).
    pub fn assigned_nodes(&self, slot: ArenaNodeId) -> &[ArenaNodeId] {
        self.assignments
            .get(&slot)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Physical parent of a node.
    pub fn parent(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_some())
    }

    /// Parent in the rendered tree: a node projected into a slot has that
    /// slot as its parent, and a shadow root is replaced by its host.
    pub fn composed_parent(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        if let Some(slot) = self.assigned_slot(id) {
            return Some(slot);
        }
        let parent = self.parent(id)?;
        Some(self.shadow_host(parent).unwrap_or(parent))
    }

    /// Iterate over ancestors of `id` (nearest first) along
    /// [`ArenaDom::composed_parent`]. Shadow roots themselves are skipped.
    /// A projection cycle ends the walk after at most one step per node.
    pub fn composed_ancestors(&self, id: ArenaNodeId) -> ComposedAncestors<'_> {
        ComposedAncestors {
            dom: self,
            current: id,
            remaining: self.nodes.len(),
        }
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: ArenaNodeId) -> bool {
        let mut current = id;
        // Bounded by the arena size so a corrupted link cannot loop forever.
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.get(current) else {
                return false;
            };
            match node.data {
                ArenaNodeData::Document => return current == self.document,
                ArenaNodeData::ShadowRoot { host, .. } => current = host,
                _ => {
                    if node.parent.is_none() {
                        return false;
                    }
                    current = node.parent;
                }
            }
        }
        false
    }

    /// Root of the tree containing `id`: the document or a shadow root.
    pub fn tree_scope(&self, id: ArenaNodeId) -> ArenaNodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Find an element by id attribute within one tree scope.
    pub fn get_by_id_in(&self, scope: ArenaNodeId, id: &str) -> Option<ArenaNodeId> {
        self.find_from(scope, |node| {
            matches!(&node.data, ArenaNodeData::Element { id: Some(i), .. } if i == id)
        })
    }

    /// Find the first element matching a predicate (DFS from the document).
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        self.find_from(self.document, predicate)
    }

    /// Find the first node under `start` matching a predicate, in tree order.
    /// Shadow trees are not entered.
    pub fn find_from<F>(&self, start: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                // Push children in reverse order for left-to-right traversal
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|node| {
            if let ArenaNodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }

    /// Collect every node under `start` in tree order, entering shadow trees
    /// right after their host.
    pub fn descendants_composed(&self, start: ArenaNodeId) -> Vec<ArenaNodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<_> = self.children(id).collect();
            if let Some(root) = self.shadow_root(id) {
                children.insert(0, root);
            }
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Iterator over composed ancestors of a node.
pub struct ComposedAncestors<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
    remaining: usize,
}

impl Iterator for ComposedAncestors<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.remaining = self.remaining.checked_sub(1)?;
        let next = self.dom.composed_parent(self.current)?;
        self.current = next;
        Some(next)
    }
}

/// Convenience methods for element nodes.
impl ArenaDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's tag as a string slice.
    pub fn tag(&self, id: ArenaNodeId) -> Option<&str> {
        self.element_name(id).map(|n| n.as_ref())
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: ArenaNodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Check whether an attribute is present, regardless of value.
    pub fn has_attr(&self, id: ArenaNodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Set (or replace) an attribute value.
    pub fn set_attr(&mut self, id: ArenaNodeId, attr_name: &str, value: &str) {
        if let Some(node) = self.get_mut(id)
            && let ArenaNodeData::Element {
                attrs,
                id: elem_id,
                classes,
                ..
            } = &mut node.data
        {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                Some(attr) => attr.value = value.to_string(),
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: value.to_string(),
                }),
            }
            if attr_name == "id" {
                *elem_id = Some(value.to_string());
            } else if attr_name == "class" {
                *classes = value.split_whitespace().map(|s| s.to_string()).collect();
            }
        }
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Text(_)))
    }

    /// Check if node is a `<slot>` element.
    pub fn is_slot(&self, id: ArenaNodeId) -> bool {
        self.tag(id) == Some("slot")
    }

    /// Check if node is an autonomous custom element.
    pub fn is_custom_element(&self, id: ArenaNodeId) -> bool {
        self.tag(id).is_some_and(is_custom_element_name)
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
