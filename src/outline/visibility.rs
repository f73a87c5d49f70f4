//! Effective visibility across shadow boundaries.

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::style::StyleMap;

/// Why a node is not rendered or not perceivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenReason {
    DisplayNone,
    VisibilityHidden,
    HiddenAttribute,
    AriaHidden,
    /// Not connected to the document.
    Detached,
}

/// Answers "is this node rendered and exposed?" against a style snapshot.
pub struct VisibilityOracle<'a> {
    dom: &'a ArenaDom,
    styles: &'a StyleMap,
}

impl<'a> VisibilityOracle<'a> {
    pub fn new(dom: &'a ArenaDom, styles: &'a StyleMap) -> Self {
        Self { dom, styles }
    }

    pub fn is_visible(&self, id: ArenaNodeId) -> bool {
        self.hidden_reason(id).is_none()
    }

    /// The first element on the way up from `id` (itself included) that hides
    /// it, and why. The walk follows the rendered tree: a projected node goes
    /// up through its slot, and a shadow root is crossed to its host.
    pub fn hidden_reason(&self, id: ArenaNodeId) -> Option<(ArenaNodeId, HiddenReason)> {
        let dom = self.dom;
        let mut current = id;

        for _ in 0..=dom.len() {
            if current == dom.document() {
                return None;
            }
            if let Some(reason) = self.element_hidden(current) {
                return Some((current, reason));
            }
            let next = dom
                .shadow_host(current)
                .or_else(|| dom.composed_parent(current));
            match next {
                Some(parent) => current = parent,
                None => return Some((current, HiddenReason::Detached)),
            }
        }
        Some((current, HiddenReason::Detached))
    }

    /// Whether this one element hides itself (ancestors are not consulted).
    pub fn element_hidden(&self, id: ArenaNodeId) -> Option<HiddenReason> {
        let dom = self.dom;
        if !dom.is_element(id) {
            return None;
        }
        if dom.has_attr(id, "hidden") {
            return Some(HiddenReason::HiddenAttribute);
        }
        if dom
            .get_attr(id, "aria-hidden")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        {
            return Some(HiddenReason::AriaHidden);
        }
        if self.styles.is_display_none(id) {
            return Some(HiddenReason::DisplayNone);
        }
        if self.styles.is_visibility_hidden(id) {
            return Some(HiddenReason::VisibilityHidden);
        }
        None
    }
}
