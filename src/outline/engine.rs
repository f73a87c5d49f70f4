//! One-pass outline extraction.

use log::{debug, trace};

use super::heading::heading_level;
use super::landmark::LandmarkClassifier;
use super::text::aggregate_text;
use super::visibility::VisibilityOracle;
use super::walker::{ComposedWalker, SlotFallback};
use super::{HeadingLevel, HeadingRecord, LandmarkRecord, Outline};
use crate::dom::{ArenaDom, ArenaNodeId, Document};
use crate::style::{StyleMap, Stylesheet};

/// Which classified landmarks make it into the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandmarkPolicy {
    /// Only landmarks that are rendered and exposed.
    #[default]
    VisibleOnly,
    /// Every classified landmark; `visible` tells them apart.
    All,
}

impl LandmarkPolicy {
    fn admits(&self, record: &LandmarkRecord) -> bool {
        match self {
            LandmarkPolicy::VisibleOnly => record.visible,
            LandmarkPolicy::All => true,
        }
    }
}

/// Options for [`extract`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub landmarks: LandmarkPolicy,
    pub slot_fallback: SlotFallback,
    /// Enter closed shadow roots too.
    pub pierce_closed: bool,
    /// Author sheets applied to the document tree after its `<style>` elements.
    pub stylesheets: Vec<Stylesheet>,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_landmarks(mut self, policy: LandmarkPolicy) -> Self {
        self.landmarks = policy;
        self
    }

    pub fn with_slot_fallback(mut self, slot_fallback: SlotFallback) -> Self {
        self.slot_fallback = slot_fallback;
        self
    }

    pub fn with_closed_shadow_roots(mut self, pierce: bool) -> Self {
        self.pierce_closed = pierce;
        self
    }

    pub fn with_stylesheet(mut self, sheet: Stylesheet) -> Self {
        self.stylesheets.push(sheet);
        self
    }

    /// Parse and add an author stylesheet.
    pub fn with_css(self, css: &str) -> Self {
        self.with_stylesheet(Stylesheet::parse(css))
    }
}

/// Outline index -> originating heading element.
///
/// Entries are never rewritten when the tree changes; [`HeadingRefs::locate`]
/// checks that the node is still attached before handing it out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingRefs {
    nodes: Vec<ArenaNodeId>,
}

impl HeadingRefs {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The recorded node at `index`, attached or not.
    pub fn get(&self, index: usize) -> Option<ArenaNodeId> {
        self.nodes.get(index).copied()
    }

    /// The heading element for outline entry `index`, or `None` when the
    /// index is out of range or the element has left the document.
    pub fn locate(&self, dom: &ArenaDom, index: usize) -> Option<ArenaNodeId> {
        let id = self.get(index)?;
        if dom.is_attached(id) {
            Some(id)
        } else {
            debug!("heading reference {index} ({id:?}) is stale");
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ArenaNodeId> + '_ {
        self.nodes.iter().copied()
    }
}

/// Outline plus the reference table parallel to `outline.headings`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub outline: Outline,
    pub refs: HeadingRefs,
}

impl Extraction {
    /// Shorthand for [`HeadingRefs::locate`].
    pub fn locate(&self, dom: &ArenaDom, index: usize) -> Option<ArenaNodeId> {
        self.refs.locate(dom, index)
    }
}

/// Walk the composed tree once below the document body and collect visible
/// headings and landmarks. The body itself is not an outline entry.
///
/// A heading element is only ever recorded as a heading. Every node's
/// children are visited regardless of what the node itself turned out to be.
pub fn extract(document: &Document, options: &ExtractOptions) -> Extraction {
    let dom = document.dom();
    let styles = StyleMap::compute(dom, &options.stylesheets);
    let oracle = VisibilityOracle::new(dom, &styles);
    let walker = ComposedWalker::new(dom)
        .with_slot_fallback(options.slot_fallback)
        .with_closed_shadow_roots(options.pierce_closed);
    let classifier = LandmarkClassifier::new(walker, &oracle);

    let mut extraction = Extraction::default();
    let start = document.outline_root();
    // Only the body's descendants are entries; a hand-built tree without a
    // body starts at its root element and includes it.
    let skip = usize::from(document.body() == Some(start));

    for id in walker.descendants(start).into_iter().skip(skip) {
        if !dom.is_element(id) {
            continue;
        }

        if let Some(level) = heading_level(dom, id) {
            if oracle.is_visible(id) {
                record_heading(&mut extraction, &walker, &oracle, id, level);
            } else {
                trace!("skipping hidden {level} {id:?}");
            }
            continue;
        }

        if let Some(record) = classifier.classify(id) {
            if options.landmarks.admits(&record) {
                trace!("landmark {} {:?} name={:?}", record.role, id, record.name);
                extraction.outline.landmarks.push(record);
            } else {
                trace!("filtered hidden landmark {} {:?}", record.role, id);
            }
        }
    }

    extraction.outline.title = document.title();
    debug!(
        "extracted {} heading(s), {} landmark(s)",
        extraction.outline.headings.len(),
        extraction.outline.landmarks.len()
    );
    extraction
}

fn record_heading(
    extraction: &mut Extraction,
    walker: &ComposedWalker<'_>,
    oracle: &VisibilityOracle<'_>,
    id: ArenaNodeId,
    level: HeadingLevel,
) {
    let label = aggregate_text(walker, id, |n| oracle.is_visible(n));
    trace!("heading {level} {id:?} label={label:?}");
    extraction.outline.headings.push(HeadingRecord { level, label });
    extraction.refs.nodes.push(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::LandmarkRole;

    #[test]
    fn test_heading_scenario() {
        let doc = Document::parse(
            r#"<h1>Welcome<span style="display:none">ignored</span></h1>"#,
        );
        let result = extract(&doc, &ExtractOptions::default());

        assert_eq!(
            result.outline.headings,
            vec![HeadingRecord {
                level: HeadingLevel::H1,
                label: "Welcome".into()
            }]
        );
        assert_eq!(result.refs.len(), 1);
    }

    #[test]
    fn test_hidden_heading_is_skipped() {
        let doc = Document::parse(r#"<h2 hidden>gone</h2><h3>kept</h3>"#);
        let result = extract(&doc, &ExtractOptions::default());

        let levels: Vec<_> = result.outline.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![HeadingLevel::H3]);
        assert_eq!(result.refs.len(), result.outline.headings.len());
    }

    #[test]
    fn test_heading_with_only_hidden_content_has_empty_label() {
        let doc = Document::parse(r#"<h2><span aria-hidden="true">icon</span></h2>"#);
        let result = extract(&doc, &ExtractOptions::default());
        assert_eq!(result.outline.headings[0].label, "");
    }

    #[test]
    fn test_nested_entries_are_all_recorded() {
        let doc = Document::parse(
            "<main><nav><h2>Menu</h2></nav><section aria-label='A'><h3>Sub</h3></section></main>",
        );
        let result = extract(&doc, &ExtractOptions::default());

        let roles: Vec<_> = result.outline.landmarks.iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![LandmarkRole::Main, LandmarkRole::Navigation, LandmarkRole::Region]
        );
        assert_eq!(result.outline.headings.len(), 2);
    }

    #[test]
    fn test_landmark_policy() {
        let doc = Document::parse(r#"<nav>a</nav><aside style="visibility:hidden">b</aside>"#);

        let visible = extract(&doc, &ExtractOptions::default());
        assert_eq!(visible.outline.landmarks.len(), 1);

        let all = extract(&doc, &ExtractOptions::new().with_landmarks(LandmarkPolicy::All));
        assert_eq!(all.outline.landmarks.len(), 2);
        assert!(!all.outline.landmarks[1].visible);
    }

    #[test]
    fn test_heading_with_landmark_role_stays_a_heading() {
        let doc = Document::parse(r#"<h1 role="banner">Title</h1>"#);
        let result = extract(&doc, &ExtractOptions::default());
        assert_eq!(result.outline.headings.len(), 1);
        assert!(result.outline.landmarks.is_empty());
    }

    #[test]
    fn test_extra_stylesheet_hides_heading() {
        let doc = Document::parse(r#"<h1 class="sr">A</h1><h2>B</h2>"#);
        let options = ExtractOptions::new().with_css(".sr { display: none }");
        let result = extract(&doc, &options);
        assert_eq!(result.outline.headings.len(), 1);
        assert_eq!(result.outline.headings[0].label, "B");
    }

    #[test]
    fn test_locate_out_of_range() {
        let doc = Document::parse("<h1>Only</h1>");
        let result = extract(&doc, &ExtractOptions::default());
        assert!(result.locate(doc.dom(), 0).is_some());
        assert!(result.locate(doc.dom(), 1).is_none());
    }

    #[test]
    fn test_locate_after_removal() {
        let mut doc = Document::parse("<h1>a</h1><h2>b</h2><h3>c</h3>");
        let result = extract(&doc, &ExtractOptions::default());
        let third = result.refs.get(2).unwrap();

        doc.dom_mut().detach(third);
        assert_eq!(result.locate(doc.dom(), 2), None);
        assert!(result.locate(doc.dom(), 1).is_some());
    }

    #[test]
    fn test_body_is_not_classified() {
        let doc = Document::parse(r#"<body role="main"><nav aria-label="Site">x</nav></body>"#);
        let result = extract(&doc, &ExtractOptions::default());

        let roles: Vec<_> = result.outline.landmarks.iter().map(|l| l.role).collect();
        assert_eq!(roles, vec![LandmarkRole::Navigation]);
    }

    #[test]
    fn test_projected_heading_under_hidden_wrapper() {
        let doc = Document::parse(
            r#"<x-card><template shadowrootmode="open"><div style="visibility:hidden"><slot></slot></div></template><h2>Secret</h2></x-card>
               <x-card><template shadowrootmode="open"><div hidden><slot></slot></div></template><h2>Tucked</h2></x-card>
               <x-card><template shadowrootmode="open"><div><slot></slot></div></template><h2>Shown</h2></x-card>"#,
        );
        let result = extract(&doc, &ExtractOptions::default());

        let labels: Vec<_> = result.outline.headings.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Shown"]);
    }

    #[test]
    fn test_title_is_carried() {
        let doc = Document::parse("<title>Guide</title><h1>x</h1>");
        assert_eq!(extract(&doc, &ExtractOptions::default()).outline.title, "Guide");
    }
}
