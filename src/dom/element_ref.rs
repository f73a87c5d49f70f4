//! selectors crate Element implementation for ArenaDom.
//!
//! Matching is confined to one tree scope: the parent of a shadow tree's
//! top-level element is its shadow root, which is not an element, so
//! document rules never reach into shadow trees and vice versa.

use std::fmt;

use cssparser::{CowRcStr, ParseError, SourceLocation, ToCss};
use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};

/// Wraps an interned atom so selectors can hash and serialize it.
macro_rules! css_atom {
    ($(#[$meta:meta])* $name:ident($atom:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $atom);

        impl precomputed_hash::PrecomputedHash for $name {
            fn precomputed_hash(&self) -> u32 {
                self.0.precomputed_hash()
            }
        }

        impl ToCss for $name {
            fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
                dest.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(<$atom>::from(s))
            }
        }

        impl<'a> From<&'a str> for $name {
            fn from(s: &'a str) -> Self {
                Self(<$atom>::from(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

css_atom!(
    /// Ids, classes, attribute values and prefixes.
    IdentStr(LocalName)
);
css_atom!(CssLocalName(LocalName));
css_atom!(CssNamespace(Namespace));

/// Selector implementation over the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors;

impl SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

impl<'i> selectors::parser::Parser<'i> for DomSelectors {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<PseudoClass, ParseError<'i, Self::Error>> {
        PseudoClass::from_name(&name).ok_or_else(|| {
            location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(
                name,
            ))
        })
    }
}

/// Pseudo-classes that are not tree-structural.
///
/// A static document has no pointer or focus, so the user-action states parse
/// but never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Link,
    AnyLink,
    Visited,
    /// Built-in elements, and custom elements that have a shadow root.
    Defined,
    Hover,
    Active,
    Focus,
    FocusVisible,
    FocusWithin,
}

impl PseudoClass {
    fn from_name(name: &str) -> Option<Self> {
        let pc = match name.to_ascii_lowercase().as_str() {
            "link" => Self::Link,
            "any-link" => Self::AnyLink,
            "visited" => Self::Visited,
            "defined" => Self::Defined,
            "hover" => Self::Hover,
            "active" => Self::Active,
            "focus" => Self::Focus,
            "focus-visible" => Self::FocusVisible,
            "focus-within" => Self::FocusWithin,
            _ => return None,
        };
        Some(pc)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::AnyLink => "any-link",
            Self::Visited => "visited",
            Self::Defined => "defined",
            Self::Hover => "hover",
            Self::Active => "active",
            Self::Focus => "focus",
            Self::FocusVisible => "focus-visible",
            Self::FocusWithin => "focus-within",
        }
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Hover | Self::Active)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(
            self,
            Self::Hover | Self::Active | Self::Focus | Self::FocusVisible | Self::FocusWithin
        )
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_char(':')?;
        dest.write_str(self.name())
    }
}

/// No pseudo-elements are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// An element handle for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub dom: &'a ArenaDom,
    pub id: ArenaNodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a ArenaDom, id: ArenaNodeId) -> Self {
        Self { dom, id }
    }

    fn wrap(&self, id: ArenaNodeId) -> Self {
        Self::new(self.dom, id)
    }

    fn attrs(&self) -> &'a [Attribute] {
        match self.dom.get(self.id).map(|n| &n.data) {
            Some(ArenaNodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Walk siblings in one direction until an element turns up.
    fn sibling_element(&self, step: fn(&ArenaNode) -> ArenaNodeId) -> Option<Self> {
        let mut current = step(self.dom.get(self.id)?);
        while let Some(node) = self.dom.get(current) {
            if self.dom.is_element(current) {
                return Some(self.wrap(current));
            }
            current = step(node);
        }
        None
    }

    fn is_hyperlink(&self) -> bool {
        matches!(self.dom.tag(self.id), Some("a" | "area")) && self.dom.has_attr(self.id, "href")
    }

    fn is_defined(&self) -> bool {
        !self.dom.is_custom_element(self.id) || self.dom.shadow_root(self.id).is_some()
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementRef")
            .field(&self.id)
            .field(&self.dom.tag(self.id).unwrap_or("#node"))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.dom
            .parent(self.id)
            .filter(|&p| self.dom.is_element(p))
            .map(|p| self.wrap(p))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        self.dom
            .parent(self.id)
            .is_some_and(|p| self.dom.shadow_host(p).is_some())
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        let scope = self.dom.tree_scope(self.id);
        self.dom.shadow_host(scope).map(|host| self.wrap(host))
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find(|&c| self.dom.is_element(c))
            .map(|c| self.wrap(c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.dom
            .element_namespace(self.id)
            .is_some_and(|ns| *ns == html5ever::ns!(html))
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom.element_name(self.id) == Some(&name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom.element_namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
            && self.dom.element_namespace(self.id) == other.dom.element_namespace(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.attrs().iter().any(|attr| {
            let ns_ok = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            ns_ok && attr.name.local == local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, DomSelectors>,
    ) -> bool {
        match pc {
            PseudoClass::Link | PseudoClass::AnyLink => self.is_hyperlink(),
            PseudoClass::Defined => self.is_defined(),
            _ => false,
        }
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, DomSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.is_hyperlink()
    }

    fn is_html_slot_element(&self) -> bool {
        self.dom.is_slot(self.id)
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_id(self.id)
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom
            .children(self.id)
            .all(|c| match self.dom.get(c).map(|n| &n.data) {
                Some(ArenaNodeData::Element { .. }) => false,
                Some(ArenaNodeData::Text(t)) => t.is_empty(),
                _ => true,
            })
    }

    fn is_root(&self) -> bool {
        self.dom.parent(self.id) == Some(self.dom.document())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}
