//! Logical child enumeration over shadow roots and slots.

use std::collections::HashSet;

use log::trace;

use crate::dom::{ArenaDom, ArenaNodeId, ShadowRootMode};

/// How a slot's content is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotFallback {
    /// Nested slots in the assigned (or fallback) list are replaced by their
    /// own content, recursively.
    #[default]
    Flatten,
    /// The list is returned as is; nested slots are expanded only when the
    /// traversal reaches them.
    Opaque,
}

/// Enumerates the composed tree: what a node logically contains once shadow
/// roots and slot projection are resolved.
#[derive(Clone, Copy)]
pub struct ComposedWalker<'a> {
    dom: &'a ArenaDom,
    slot_fallback: SlotFallback,
    pierce_closed: bool,
}

impl<'a> ComposedWalker<'a> {
    pub fn new(dom: &'a ArenaDom) -> Self {
        Self {
            dom,
            slot_fallback: SlotFallback::default(),
            pierce_closed: false,
        }
    }

    pub fn with_slot_fallback(mut self, slot_fallback: SlotFallback) -> Self {
        self.slot_fallback = slot_fallback;
        self
    }

    /// Enter closed shadow roots as well as open ones.
    pub fn with_closed_shadow_roots(mut self, pierce: bool) -> Self {
        self.pierce_closed = pierce;
        self
    }

    pub fn dom(&self) -> &'a ArenaDom {
        self.dom
    }

    /// Logical children of `id`, elements and text only.
    ///
    /// * a `<slot>` yields its assigned nodes, or its own children when
    ///   nothing is assigned;
    /// * a shadow host yields the top-level children of its shadow root, and
    ///   nothing when the root is closed to us;
    /// * a custom element without a shadow root yields nothing;
    /// * anything else yields its direct children.
    pub fn children(&self, id: ArenaNodeId) -> Vec<ArenaNodeId> {
        let dom = self.dom;
        let nodes = if dom.is_slot(id) {
            self.slot_children(id)
        } else if let Some(root) = dom.shadow_root(id) {
            if self.can_enter(root) {
                dom.children(root).collect()
            } else {
                trace!("not entering closed shadow root of {id:?}");
                Vec::new()
            }
        } else if dom.is_custom_element(id) {
            // Light children of an un-upgraded host are not rendered.
            Vec::new()
        } else {
            dom.children(id).collect()
        };

        nodes
            .into_iter()
            .filter(|&n| dom.is_element(n) || dom.is_text(n))
            .collect()
    }

    /// Every node reachable from `start` in composed pre-order, `start`
    /// included. A node reachable along two paths is visited once.
    pub fn descendants(&self, start: ArenaNodeId) -> Vec<ArenaNodeId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                trace!("skipping already visited node {id:?}");
                continue;
            }
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    fn can_enter(&self, root: ArenaNodeId) -> bool {
        match self.dom.shadow_mode(root) {
            Some(ShadowRootMode::Open) => true,
            Some(ShadowRootMode::Closed) => self.pierce_closed,
            None => false,
        }
    }

    /// Assigned nodes, or fallback children when nothing is assigned.
    fn slot_content(&self, slot: ArenaNodeId) -> Vec<ArenaNodeId> {
        let assigned = self.dom.assigned_nodes(slot);
        if assigned.is_empty() {
            self.dom.children(slot).collect()
        } else {
            assigned.to_vec()
        }
    }

    fn slot_children(&self, slot: ArenaNodeId) -> Vec<ArenaNodeId> {
        let content = self.slot_content(slot);
        match self.slot_fallback {
            SlotFallback::Opaque => content,
            SlotFallback::Flatten => {
                let mut out = Vec::new();
                let mut seen = HashSet::from([slot]);
                self.flatten_into(content, &mut out, &mut seen);
                out
            }
        }
    }

    fn flatten_into(
        &self,
        nodes: Vec<ArenaNodeId>,
        out: &mut Vec<ArenaNodeId>,
        seen: &mut HashSet<ArenaNodeId>,
    ) {
        for node in nodes {
            if !self.dom.is_slot(node) {
                out.push(node);
            } else if seen.insert(node) {
                let inner = self.slot_content(node);
                self.flatten_into(inner, out, seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(dom: &mut ArenaDom, parent: ArenaNodeId, tag: &str) -> ArenaNodeId {
        let id = dom.create_html_element(tag, &[]);
        dom.append(parent, id);
        id
    }

    #[test]
    fn test_plain_children_skip_comments() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let div = el(&mut dom, doc, "div");
        let p = el(&mut dom, div, "p");
        let comment = dom.create_comment("note".into());
        dom.append(div, comment);
        let text = dom.create_text("tail");
        dom.append(div, text);

        let walker = ComposedWalker::new(&dom);
        assert_eq!(walker.children(div), vec![p, text]);
    }

    #[test]
    fn test_custom_element_without_shadow_root_is_empty() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let host = el(&mut dom, doc, "x-widget");
        el(&mut dom, host, "h2");

        assert!(ComposedWalker::new(&dom).children(host).is_empty());
    }

    #[test]
    fn test_shadow_host_yields_shadow_children_only() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let host = el(&mut dom, doc, "x-widget");
        let light = el(&mut dom, host, "p");
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let inner = el(&mut dom, root, "h2");

        let children = ComposedWalker::new(&dom).children(host);
        assert_eq!(children, vec![inner]);
        assert!(!children.contains(&light));
    }

    #[test]
    fn test_builtin_shadow_host() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let div = el(&mut dom, doc, "div");
        let root = dom.attach_shadow(div, ShadowRootMode::Open).unwrap();
        let nav = el(&mut dom, root, "nav");

        assert_eq!(ComposedWalker::new(&dom).children(div), vec![nav]);
    }

    #[test]
    fn test_closed_shadow_root() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let host = el(&mut dom, doc, "x-secret");
        let root = dom.attach_shadow(host, ShadowRootMode::Closed).unwrap();
        let h1 = el(&mut dom, root, "h1");

        assert!(ComposedWalker::new(&dom).children(host).is_empty());
        assert_eq!(
            ComposedWalker::new(&dom)
                .with_closed_shadow_roots(true)
                .children(host),
            vec![h1]
        );
    }

    #[test]
    fn test_slot_assigned_nodes() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let host = el(&mut dom, doc, "x-card");
        let light = el(&mut dom, host, "h3");
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let slot = el(&mut dom, root, "slot");
        el(&mut dom, slot, "span");
        dom.assign_slot(slot, vec![light]).unwrap();

        assert_eq!(ComposedWalker::new(&dom).children(slot), vec![light]);
    }

    #[test]
    fn test_slot_fallback_when_unassigned() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let slot = el(&mut dom, doc, "slot");
        let fallback = el(&mut dom, slot, "p");

        assert_eq!(ComposedWalker::new(&dom).children(slot), vec![fallback]);
    }

    #[test]
    fn test_nested_slot_flattening() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let outer = el(&mut dom, doc, "slot");
        let before = el(&mut dom, outer, "b");
        let inner = el(&mut dom, outer, "slot");
        let projected = dom.create_html_element("em", &[]);
        dom.append(doc, projected);
        dom.assign_slot(inner, vec![projected]).unwrap();

        let flat = ComposedWalker::new(&dom).children(outer);
        assert_eq!(flat, vec![before, projected]);

        let opaque = ComposedWalker::new(&dom)
            .with_slot_fallback(SlotFallback::Opaque)
            .children(outer);
        assert_eq!(opaque, vec![before, inner]);
    }

    #[test]
    fn test_descendants_preorder_across_boundaries() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let body = el(&mut dom, doc, "body");
        let host = el(&mut dom, body, "x-page");
        let light = el(&mut dom, host, "h2");
        let after = el(&mut dom, body, "footer");
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let header = el(&mut dom, root, "header");
        let slot = el(&mut dom, root, "slot");
        dom.assign_slot(slot, vec![light]).unwrap();

        let order = ComposedWalker::new(&dom).descendants(body);
        assert_eq!(order, vec![body, host, header, slot, light, after]);
    }

    #[test]
    fn test_projection_cycle_terminates() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let host = el(&mut dom, doc, "x-loop");
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let slot = el(&mut dom, root, "slot");
        // A host projected into its own shadow tree.
        dom.assign_slot(slot, vec![host]).unwrap();

        let order = ComposedWalker::new(&dom).descendants(host);
        assert_eq!(order, vec![host, slot]);
    }
}
