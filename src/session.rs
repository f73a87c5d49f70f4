//! Page-side state between outline requests.
//!
//! A [`Session`] owns the document and the most recent [`Extraction`]. Each
//! [`Session::refresh`] replaces the extraction wholesale; "jump to entry N"
//! requests resolve against whatever the last refresh recorded.

use log::debug;

use crate::dom::{ArenaNodeId, Document};
use crate::outline::{ExtractOptions, Extraction, HeadingLevel, Outline, extract};

/// What the highlight collaborator needs to present a located heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedElement {
    pub node: ArenaNodeId,
    pub tag: String,
    pub id: Option<String>,
    pub level: HeadingLevel,
    pub label: String,
}

pub struct Session {
    document: Document,
    options: ExtractOptions,
    extraction: Extraction,
}

impl Session {
    /// Wrap a document. Nothing is extracted until [`Session::refresh`].
    pub fn new(document: Document) -> Self {
        Self::with_options(document, ExtractOptions::default())
    }

    pub fn with_options(document: Document, options: ExtractOptions) -> Self {
        Self {
            document,
            options,
            extraction: Extraction::default(),
        }
    }

    /// Re-run extraction against the current document.
    pub fn refresh(&mut self) -> &Outline {
        self.extraction = extract(&self.document, &self.options);
        debug!(
            "session refreshed: {} heading reference(s)",
            self.extraction.refs.len()
        );
        &self.extraction.outline
    }

    /// The outline from the last refresh (empty before the first one).
    pub fn outline(&self) -> &Outline {
        &self.extraction.outline
    }

    pub fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    /// Heading element for outline entry `index`, if it is still attached.
    pub fn locate(&self, index: usize) -> Option<ArenaNodeId> {
        self.extraction.locate(self.document.dom(), index)
    }

    /// Like [`Session::locate`], with the details needed to present the hit.
    pub fn describe(&self, index: usize) -> Option<LocatedElement> {
        let node = self.locate(index)?;
        let heading = self.extraction.outline.headings.get(index)?;
        let dom = self.document.dom();
        Some(LocatedElement {
            node,
            tag: dom.tag(node)?.to_string(),
            id: dom.element_id(node).map(str::to_string),
            level: heading.level,
            label: heading.label.clone(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document. The reference table is not updated;
    /// entries whose nodes get detached simply stop resolving.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ExtractOptions) {
        self.options = options;
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
