//! Heading detection by tag.

use super::HeadingLevel;
use crate::dom::{ArenaDom, ArenaNodeId};

/// Heading level of `id` if it is an `h1`..`h6` element.
pub fn heading_level(dom: &ArenaDom, id: ArenaNodeId) -> Option<HeadingLevel> {
    dom.tag(id).and_then(HeadingLevel::from_tag)
}
