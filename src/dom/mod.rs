//! Document model: an arena DOM with shadow roots and slots.
//!
//! # Example
//!
//! ```
//! use landmarks::dom::Document;
//!
//! let doc = Document::parse("<title>Home</title><body><main><h1>Hi</h1></main></body>");
//! assert_eq!(doc.title(), "Home");
//! assert!(doc.body().is_some());
//! ```

mod arena;
mod element_ref;
mod shadow;
mod tree_sink;

use std::path::Path;

use log::debug;

pub use arena::{
    ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter, ComposedAncestors,
    ShadowRootMode, html_name, is_custom_element_name,
};
pub use element_ref::{DomSelectors, ElementRef};
pub use shadow::{assign_slots, promote_declarative_shadow_roots};

use crate::error::Result;

/// A parsed (or programmatically built) document.
pub struct Document {
    dom: ArenaDom,
}

impl Document {
    /// Parse an HTML string.
    ///
    /// Declarative shadow roots are promoted and slots are assigned, so the
    /// result is ready for composed-tree traversal.
    pub fn parse(html: &str) -> Self {
        let mut dom = tree_sink::parse_into_arena(html);
        let roots = promote_declarative_shadow_roots(&mut dom);
        assign_slots(&mut dom);
        debug!(
            "parsed document: {} nodes, {} declarative shadow root(s)",
            dom.len(),
            roots
        );
        Self { dom }
    }

    /// Parse HTML bytes, detecting the character encoding.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        let hint = crate::util::extract_charset(bytes);
        let html = crate::util::decode_text(bytes, hint);
        Self::parse(&html)
    }

    /// Read and parse an HTML file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::parse_bytes(&bytes))
    }

    /// Wrap an arena built by hand. Slot assignment is left as the caller set it.
    pub fn from_dom(dom: ArenaDom) -> Self {
        Self { dom }
    }

    pub fn dom(&self) -> &ArenaDom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut ArenaDom {
        &mut self.dom
    }

    pub fn into_dom(self) -> ArenaDom {
        self.dom
    }

    /// Recompute automatic slot assignment after structural edits.
    pub fn reassign_slots(&mut self) {
        assign_slots(&mut self.dom);
    }

    /// The root element (`<html>`), if any.
    pub fn root_element(&self) -> Option<ArenaNodeId> {
        let doc = self.dom.document();
        self.dom.children(doc).find(|&id| self.dom.is_element(id))
    }

    /// The `<body>` element, if any.
    pub fn body(&self) -> Option<ArenaNodeId> {
        let root = self.root_element()?;
        self.dom
            .children(root)
            .find(|&id| self.dom.tag(id) == Some("body"))
    }

    /// Where outline traversal starts: the body, else the root element,
    /// else the document itself.
    pub fn outline_root(&self) -> ArenaNodeId {
        self.body()
            .or_else(|| self.root_element())
            .unwrap_or_else(|| self.dom.document())
    }

    /// The document title with whitespace collapsed, or an empty string.
    pub fn title(&self) -> String {
        let Some(title) = self.dom.find_by_tag("title") else {
            return String::new();
        };
        let raw: String = self
            .dom
            .children(title)
            .filter_map(|id| self.dom.text_content(id))
            .collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl From<ArenaDom> for Document {
    fn from(dom: ArenaDom) -> Self {
        Self::from_dom(dom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_whitespace_is_collapsed() {
        let doc = Document::parse("<title>\n  Annual   Report\t2024 </title><p>x</p>");
        assert_eq!(doc.title(), "Annual Report 2024");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let doc = Document::parse("<p>no title</p>");
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_outline_root_is_body() {
        let doc = Document::parse("<p>x</p>");
        let body = doc.body().expect("parser always creates a body");
        assert_eq!(doc.outline_root(), body);
    }

    #[test]
    fn test_outline_root_falls_back_to_document() {
        let doc = Document::from_dom(ArenaDom::new());
        assert_eq!(doc.outline_root(), doc.dom().document());
    }

    #[test]
    fn test_parse_bytes_windows_1252() {
        // 0xE9 is "é" in Windows-1252 and invalid as UTF-8.
        let bytes = b"<meta charset=\"windows-1252\"><title>Caf\xE9</title>";
        let doc = Document::parse_bytes(bytes);
        assert_eq!(doc.title(), "Caf\u{e9}");
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<title>From disk</title>").unwrap();

        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.title(), "From disk");
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let result = Document::open("/nonexistent/page.html");
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }
}
