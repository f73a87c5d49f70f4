//! Heading and landmark outline extraction over the composed tree.
//!
//! The pieces, leaves first:
//!
//! * [`ComposedWalker`] enumerates logical children across shadow roots and slots;
//! * [`VisibilityOracle`] decides whether a node is rendered and perceivable;
//! * [`aggregate_text`] builds text alternatives from visible descendants;
//! * [`heading_level`] and [`LandmarkClassifier`] recognize outline entries;
//! * [`extract`] drives one depth-first pass and assembles the [`Outline`].
//!
//! # Example
//!
//! ```
//! use landmarks::dom::Document;
//! use landmarks::outline::{extract, ExtractOptions, HeadingLevel, LandmarkRole};
//!
//! let doc = Document::parse(
//!     r#"<title>Docs</title><nav>menu</nav><main><h1>Welcome<span hidden>ignored</span></h1></main>"#,
//! );
//! let extraction = extract(&doc, &ExtractOptions::default());
//! let outline = &extraction.outline;
//!
//! assert_eq!(outline.title, "Docs");
//! assert_eq!(outline.headings[0].level, HeadingLevel::H1);
//! assert_eq!(outline.headings[0].label, "Welcome");
//! assert_eq!(outline.landmarks[0].role, LandmarkRole::Navigation);
//! assert_eq!(outline.landmarks[1].role, LandmarkRole::Main);
//! ```

mod engine;
mod heading;
mod landmark;
mod text;
mod visibility;
mod walker;

#[cfg(feature = "serde")]
use serde::Serialize;

pub use engine::{ExtractOptions, Extraction, HeadingRefs, LandmarkPolicy, extract};
pub use heading::heading_level;
pub use landmark::{LandmarkClassifier, parse_role};
pub use text::aggregate_text;
pub use visibility::{HiddenReason, VisibilityOracle};
pub use walker::{ComposedWalker, SlotFallback};

/// Heading rank, `H1` being the most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Look up the level for a heading tag name (`h1`..`h6`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            "h4" => Some(HeadingLevel::H4),
            "h5" => Some(HeadingLevel::H5),
            "h6" => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    /// Numeric rank, 1 through 6.
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// Tag-style name as sent on the wire (`"H1"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
            HeadingLevel::H6 => "H6",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ARIA landmark roles recognized in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum LandmarkRole {
    Application,
    Banner,
    Complementary,
    Contentinfo,
    Form,
    Main,
    Navigation,
    Search,
    /// Only counts as a landmark when it has an accessible name.
    Region,
}

impl LandmarkRole {
    /// Roles that are landmarks whenever they appear in a `role` attribute.
    pub const UNCONDITIONAL: [LandmarkRole; 8] = [
        LandmarkRole::Application,
        LandmarkRole::Banner,
        LandmarkRole::Complementary,
        LandmarkRole::Contentinfo,
        LandmarkRole::Form,
        LandmarkRole::Main,
        LandmarkRole::Navigation,
        LandmarkRole::Search,
    ];

    /// Parse a role token. `region` is included.
    pub fn from_role(token: &str) -> Option<Self> {
        match token {
            "application" => Some(LandmarkRole::Application),
            "banner" => Some(LandmarkRole::Banner),
            "complementary" => Some(LandmarkRole::Complementary),
            "contentinfo" => Some(LandmarkRole::Contentinfo),
            "form" => Some(LandmarkRole::Form),
            "main" => Some(LandmarkRole::Main),
            "navigation" => Some(LandmarkRole::Navigation),
            "search" => Some(LandmarkRole::Search),
            "region" => Some(LandmarkRole::Region),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkRole::Application => "application",
            LandmarkRole::Banner => "banner",
            LandmarkRole::Complementary => "complementary",
            LandmarkRole::Contentinfo => "contentinfo",
            LandmarkRole::Form => "form",
            LandmarkRole::Main => "main",
            LandmarkRole::Navigation => "navigation",
            LandmarkRole::Search => "search",
            LandmarkRole::Region => "region",
        }
    }
}

impl std::fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visible heading and its text alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HeadingRecord {
    pub level: HeadingLevel,
    pub label: String,
}

/// A landmark region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LandmarkRecord {
    pub role: LandmarkRole,
    /// Accessible name, possibly empty.
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub visible: bool,
}

/// Result of one extraction: headings and landmarks in composed pre-order,
/// plus the document title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Outline {
    pub headings: Vec<HeadingRecord>,
    pub landmarks: Vec<LandmarkRecord>,
    pub title: String,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty() && self.landmarks.is_empty()
    }

    /// Serialize to the JSON payload consumed by the panel.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed variant of [`Outline::to_json`].
    #[cfg(feature = "serde")]
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
