//! # landmarks
//!
//! Extracts a navigable outline (headings and ARIA landmark regions, each
//! with a text label) from an HTML document, following the composed tree:
//! shadow roots are entered through their host and slots show the content
//! projected into them.
//!
//! ## Features
//!
//! - HTML parsing with declarative shadow DOM (`<template shadowrootmode>`)
//!   and automatic slot assignment
//! - Visibility that honours `display`, `visibility`, `hidden` and
//!   `aria-hidden` across shadow boundaries, with scoped `<style>` sheets
//! - Landmark classification with implicit roles, `header`/`footer` scoping
//!   and name-required regions
//! - A reference table for "jump to heading N" that tolerates later mutation
//!
//! ## Quick Start
//!
//! ```
//! use landmarks::{Document, ExtractOptions, extract};
//!
//! let doc = Document::parse(r#"
//!     <title>Shop</title>
//!     <header>Logo</header>
//!     <x-product>
//!       <template shadowrootmode="open"><h2><slot></slot></h2></template>
//!       Garden hose
//!     </x-product>
//! "#);
//!
//! let extraction = extract(&doc, &ExtractOptions::default());
//! assert_eq!(extraction.outline.title, "Shop");
//! assert_eq!(extraction.outline.headings[0].label, "Garden hose");
//! assert_eq!(extraction.outline.landmarks[0].role.as_str(), "banner");
//! ```
//!
//! ## Jumping to a heading
//!
//! ```
//! use landmarks::{Document, Session};
//!
//! let mut session = Session::new(Document::parse("<h1>Intro</h1><h2>Usage</h2>"));
//! session.refresh();
//!
//! let usage = session.locate(1).unwrap();
//! session.document_mut().dom_mut().detach(usage);
//! assert!(session.locate(1).is_none());
//! ```

pub mod dom;
pub mod error;
pub mod outline;
pub mod session;
pub mod style;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{ArenaDom, ArenaNodeId, Document, ShadowRootMode};
pub use error::{Error, Result};
pub use outline::{
    ExtractOptions, Extraction, HeadingLevel, HeadingRecord, LandmarkPolicy, LandmarkRecord,
    LandmarkRole, Outline, SlotFallback, extract,
};
pub use session::{LocatedElement, Session};
