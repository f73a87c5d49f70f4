//! Landmark role determination.
//!
//! An explicit `role` attribute decides on its own; without one the element's
//! tag maps to an implicit role. `header` and `footer` only count at page
//! level, and `form`/`section` (like `role="region"`) need a name, which may
//! come from their visible content.

use super::text::aggregate_text;
use super::visibility::VisibilityOracle;
use super::walker::ComposedWalker;
use super::{LandmarkRecord, LandmarkRole};
use crate::dom::ArenaNodeId;

/// Ancestor tags that scope a `header`/`footer` to a section of the page.
const SECTIONING_TAGS: &[&str] = &["article", "aside", "main", "nav", "section"];

/// Ancestor roles with the same effect.
const SECTIONING_ROLES: &[&str] = &["article", "complementary", "main", "navigation", "region"];

/// First token of a `role` attribute, lowercased. `None` when blank.
pub fn parse_role(value: &str) -> Option<String> {
    value
        .split_ascii_whitespace()
        .next()
        .map(|token| token.to_ascii_lowercase())
}

/// Classifies elements as landmarks.
pub struct LandmarkClassifier<'a, 'o> {
    walker: ComposedWalker<'a>,
    oracle: &'o VisibilityOracle<'a>,
}

impl<'a, 'o> LandmarkClassifier<'a, 'o> {
    pub fn new(walker: ComposedWalker<'a>, oracle: &'o VisibilityOracle<'a>) -> Self {
        Self { walker, oracle }
    }

    /// Classify `id`, or `None` if it is not a landmark. The record's
    /// `visible` flag is filled in but not acted on.
    pub fn classify(&self, id: ArenaNodeId) -> Option<LandmarkRecord> {
        let dom = self.walker.dom();
        let tag = dom.tag(id)?;

        let (role, name) = match dom.get_attr(id, "role").and_then(parse_role) {
            // An unrecognized explicit role hides the implicit one.
            Some(token) => match LandmarkRole::from_role(&token)? {
                LandmarkRole::Region => (LandmarkRole::Region, Some(self.required_name(id)?)),
                role => (role, None),
            },
            None => match tag {
                "aside" => (LandmarkRole::Complementary, None),
                "main" => (LandmarkRole::Main, None),
                "nav" => (LandmarkRole::Navigation, None),
                "footer" if !self.in_sectioning_ancestor(id) => (LandmarkRole::Contentinfo, None),
                "header" if !self.in_sectioning_ancestor(id) => (LandmarkRole::Banner, None),
                "form" => (LandmarkRole::Form, Some(self.required_name(id)?)),
                "section" => (LandmarkRole::Region, Some(self.required_name(id)?)),
                _ => return None,
            },
        };

        Some(LandmarkRecord {
            role,
            name: name.unwrap_or_else(|| self.accessible_name(id)),
            visible: self.oracle.is_visible(id),
        })
    }

    /// Accessible name for a landmark: `aria-labelledby` targets, then
    /// `aria-label`, then `title`, then the visible text inside it. Empty
    /// when none of them yields anything.
    pub fn accessible_name(&self, id: ArenaNodeId) -> String {
        let dom = self.walker.dom();

        if let Some(refs) = dom.get_attr(id, "aria-labelledby") {
            let scope = dom.tree_scope(id);
            let parts: Vec<String> = refs
                .split_ascii_whitespace()
                .filter_map(|target| dom.get_by_id_in(scope, target))
                .map(|target| self.referenced_text(target))
                .filter(|text| !text.is_empty())
                .collect();
            if !parts.is_empty() {
                return parts.join(" ");
            }
        }

        ["aria-label", "title"]
            .iter()
            .filter_map(|attr| dom.get_attr(id, attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| aggregate_text(&self.walker, id, |n| self.oracle.is_visible(n)))
    }

    fn required_name(&self, id: ArenaNodeId) -> Option<String> {
        let name = self.accessible_name(id);
        (!name.is_empty()).then_some(name)
    }

    /// Text of an `aria-labelledby` target. The target may itself be hidden;
    /// only hidden elements inside it are dropped.
    fn referenced_text(&self, target: ArenaNodeId) -> String {
        aggregate_text(&self.walker, target, |n| {
            self.oracle.element_hidden(n).is_none()
        })
    }

    /// Upward walk for an ancestor that scopes `header`/`footer`.
    fn in_sectioning_ancestor(&self, id: ArenaNodeId) -> bool {
        let dom = self.walker.dom();
        dom.composed_ancestors(id).any(|ancestor| {
            dom.tag(ancestor).is_some_and(|t| SECTIONING_TAGS.contains(&t))
                || dom
                    .get_attr(ancestor, "role")
                    .and_then(parse_role)
                    .is_some_and(|r| SECTIONING_ROLES.contains(&r.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ArenaDom, Document, ShadowRootMode};
    use crate::style::StyleMap;

    fn classify_all(html: &str) -> Vec<(String, Option<LandmarkRecord>)> {
        let doc = Document::parse(html);
        let dom = doc.dom();
        let styles = StyleMap::compute(dom, &[]);
        let oracle = VisibilityOracle::new(dom, &styles);
        let classifier = LandmarkClassifier::new(ComposedWalker::new(dom), &oracle);

        dom.descendants_composed(dom.document())
            .into_iter()
            .filter(|&id| dom.get_attr(id, "data-t").is_some())
            .map(|id| {
                let key = dom.get_attr(id, "data-t").unwrap_or_default().to_string();
                (key, classifier.classify(id))
            })
            .collect()
    }

    fn role_of(html: &str) -> Option<LandmarkRole> {
        classify_all(html)
            .into_iter()
            .next()
            .and_then(|(_, record)| record)
            .map(|r| r.role)
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(" Navigation search"), Some("navigation".into()));
        assert_eq!(parse_role("   "), None);
    }

    #[test]
    fn test_implicit_roles() {
        assert_eq!(role_of("<aside data-t>x</aside>"), Some(LandmarkRole::Complementary));
        assert_eq!(role_of("<main data-t>x</main>"), Some(LandmarkRole::Main));
        assert_eq!(role_of("<nav data-t>x</nav>"), Some(LandmarkRole::Navigation));
        assert_eq!(role_of("<header data-t>x</header>"), Some(LandmarkRole::Banner));
        assert_eq!(role_of("<footer data-t>x</footer>"), Some(LandmarkRole::Contentinfo));
        assert_eq!(role_of("<div data-t>x</div>"), None);
        assert_eq!(role_of("<article data-t>x</article>"), None);
    }

    #[test]
    fn test_explicit_roles() {
        assert_eq!(role_of(r#"<div role="search" data-t></div>"#), Some(LandmarkRole::Search));
        assert_eq!(
            role_of(r#"<div role="APPLICATION" data-t></div>"#),
            Some(LandmarkRole::Application)
        );
        // An unknown role suppresses the implicit one.
        assert_eq!(role_of(r#"<nav role="list" data-t></nav>"#), None);
        // A blank role does not.
        assert_eq!(role_of(r#"<nav role=" " data-t></nav>"#), Some(LandmarkRole::Navigation));
    }

    #[test]
    fn test_unnamed_nav_has_empty_name() {
        let results = classify_all("<nav data-t><a href='/'><img src='home.png'></a></nav>");
        let record = results[0].1.clone().unwrap();
        assert_eq!(record.role, LandmarkRole::Navigation);
        assert_eq!(record.name, "");
        assert!(record.visible);
    }

    #[test]
    fn test_name_from_visible_content() {
        let results = classify_all(
            r#"<nav data-t>Home <span hidden>Admin</span><a href="/shop">Shop</a></nav>"#,
        );
        assert_eq!(results[0].1.clone().unwrap().name, "Home Shop");
    }

    #[test]
    fn test_name_from_projected_content() {
        let results = classify_all(
            r#"<x-panel><template shadowrootmode="open"><section data-t><slot></slot></section></template><span>Projected title</span></x-panel>"#,
        );
        let record = results[0].1.clone().unwrap();
        assert_eq!(record.role, LandmarkRole::Region);
        assert_eq!(record.name, "Projected title");
    }

    #[test]
    fn test_name_attributes_win_over_content() {
        let results = classify_all(
            r#"<main title=" Catalogue " data-t><h1>Spring</h1></main>
               <aside aria-label="" data-t>Offers</aside>"#,
        );
        assert_eq!(results[0].1.clone().unwrap().name, "Catalogue");
        assert_eq!(results[1].1.clone().unwrap().name, "Offers");
    }

    #[test]
    fn test_header_footer_exclusion() {
        for wrapper in ["article", "aside", "main", "nav", "section"] {
            let html = format!("<{wrapper}><footer data-t>f</footer><header data-t>h</header></{wrapper}>");
            for (_, record) in classify_all(&html) {
                assert!(record.is_none(), "excluded inside <{wrapper}>");
            }
        }
        for role in ["article", "complementary", "main", "navigation", "region"] {
            let html = format!(r#"<div role="{role}"><footer data-t>f</footer></div>"#);
            assert_eq!(role_of(&html), None, "excluded inside role={role}");
        }
        assert_eq!(
            role_of("<div><div><header data-t>h</header></div></div>"),
            Some(LandmarkRole::Banner)
        );
    }

    #[test]
    fn test_exclusion_crosses_shadow_boundary() {
        let html = r#"<main><x-shell><template shadowrootmode="open"><footer data-t>f</footer></template></x-shell></main>"#;
        assert_eq!(role_of(html), None);
    }

    #[test]
    fn test_section_and_form_need_a_name() {
        assert_eq!(role_of("<section data-t><p hidden>Draft</p></section>"), None);
        assert_eq!(
            role_of(r#"<section aria-label="News" data-t></section>"#),
            Some(LandmarkRole::Region)
        );
        assert_eq!(role_of("<form data-t><input></form>"), None);
        assert_eq!(
            role_of(r#"<form data-t><span style="display:none">Sign up</span><input></form>"#),
            None
        );
        assert_eq!(
            role_of(r#"<form title="Sign in" data-t></form>"#),
            Some(LandmarkRole::Form)
        );
        assert_eq!(role_of(r#"<div role="region" data-t><b aria-hidden="true">*</b></div>"#), None);
        assert_eq!(
            role_of(r#"<div role="region" aria-label=" Stats " data-t></div>"#),
            Some(LandmarkRole::Region)
        );
        // Visible content names them too.
        let named = classify_all(
            r#"<section data-t><h2>Latest news</h2></section>
               <form data-t>Sign up<input></form>
               <div role="region" data-t>Stats</div>"#,
        );
        let named: Vec<_> = named
            .into_iter()
            .map(|(_, record)| record.map(|r| (r.role, r.name)))
            .collect();
        assert_eq!(
            named,
            vec![
                Some((LandmarkRole::Region, "Latest news".to_string())),
                Some((LandmarkRole::Form, "Sign up".to_string())),
                Some((LandmarkRole::Region, "Stats".to_string())),
            ]
        );
        // Explicit role="form" does not need a name.
        assert_eq!(role_of(r#"<div role="form" data-t></div>"#), Some(LandmarkRole::Form));
    }

    #[test]
    fn test_labelledby_name() {
        let results = classify_all(
            r#"<h2 id="t1">Latest <span hidden>secret</span>news</h2><p id="t2">today</p>
               <section aria-labelledby="t1 missing t2" aria-label="ignored" data-t></section>"#,
        );
        let record = results[0].1.clone().unwrap();
        assert_eq!(record.role, LandmarkRole::Region);
        assert_eq!(record.name, "Latest news today");
    }

    #[test]
    fn test_labelledby_hidden_target_still_names() {
        let results = classify_all(
            r#"<span id="lbl" hidden>Site menu</span><nav aria-labelledby="lbl" data-t></nav>"#,
        );
        assert_eq!(results[0].1.clone().unwrap().name, "Site menu");
    }

    #[test]
    fn test_labelledby_is_scoped_to_tree() {
        let mut dom = ArenaDom::new();
        let doc = dom.document();
        let outside = dom.create_html_element("span", &[("id", "lbl")]);
        dom.append(doc, outside);
        let text = dom.create_text("Outside");
        dom.append(outside, text);

        let host = dom.create_html_element("x-app", &[]);
        dom.append(doc, host);
        let root = dom.attach_shadow(host, ShadowRootMode::Open).unwrap();
        let nav = dom.create_html_element("nav", &[("aria-labelledby", "lbl")]);
        dom.append(root, nav);

        let styles = StyleMap::compute(&dom, &[]);
        let oracle = VisibilityOracle::new(&dom, &styles);
        let classifier = LandmarkClassifier::new(ComposedWalker::new(&dom), &oracle);

        assert_eq!(classifier.accessible_name(nav), "");
    }

    #[test]
    fn test_hidden_landmark_is_flagged_not_dropped() {
        let results = classify_all(r#"<aside style="display:none" data-t>x</aside>"#);
        let record = results[0].1.clone().unwrap();
        assert_eq!(record.role, LandmarkRole::Complementary);
        assert!(!record.visible);
    }
}
