//! Computed styles for the properties that decide whether content renders.
//!
//! Only `display` and `visibility` are tracked. Stylesheets are scoped the
//! way shadow DOM scopes them: `<style>` elements in the document (and any
//! extra sheets supplied by the caller) apply to the document tree, while a
//! `<style>` inside a shadow root applies only within that shadow tree.

mod css;
mod properties;

use std::collections::HashMap;

use log::trace;

pub use css::{
    CssRule, Declaration, Origin, PropertyValue, Specificity, Stylesheet, compute_style,
    parse_inline_declarations,
};
pub use properties::{Display, Visibility};

use crate::dom::{ArenaDom, ArenaNodeId, ElementRef};

/// Computed values of the tracked properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

impl ComputedStyle {
    /// Starting point for a child of `parent`: inherited properties are
    /// copied, the rest take their initial values.
    pub fn inherited_from(parent: &ComputedStyle) -> Self {
        Self {
            display: Display::default(),
            visibility: parent.visibility,
        }
    }

    /// Whether an element with this style generates no box at all.
    pub fn is_display_none(&self) -> bool {
        self.display == Display::None
    }
}

/// Browser default rules relevant to rendering.
pub fn user_agent_stylesheet() -> Stylesheet {
    Stylesheet::parse(
        r#"
        [hidden], area, base, basefont, datalist, head, link, meta, noembed,
        noframes, noscript, param, rp, script, style, template, title {
            display: none;
        }
        dialog:not([open]) { display: none; }
        html, body, address, blockquote, center, div, figure, figcaption,
        footer, form, header, hr, legend, listing, main, p, plaintext, pre,
        search, xmp, article, aside, h1, h2, h3, h4, h5, h6, hgroup, nav,
        section, dialog, details, summary, ul, ol, menu, dir, dl, dt, dd,
        fieldset {
            display: block;
        }
        li { display: list-item; }
        table { display: table; }
        slot { display: contents; }
        "#,
    )
}

/// Computed style for every element of a document, indexed by node id.
#[derive(Debug, Default)]
pub struct StyleMap {
    styles: Vec<Option<ComputedStyle>>,
}

impl StyleMap {
    /// Run the cascade over every element reachable from the document,
    /// including shadow trees. `extra` sheets apply to the document tree
    /// after its own `<style>` elements.
    pub fn compute(dom: &ArenaDom, extra: &[Stylesheet]) -> Self {
        let ua = user_agent_stylesheet();

        let mut scoped: HashMap<ArenaNodeId, Vec<Stylesheet>> = HashMap::new();
        scoped.insert(dom.document(), scope_stylesheets(dom, dom.document()));
        for (_, root) in dom.shadow_roots() {
            scoped.insert(root, scope_stylesheets(dom, root));
        }

        let mut styles = vec![None; dom.len()];
        let mut visited = vec![false; dom.len()];
        let mut stack = vec![(dom.document(), dom.document(), ComputedStyle::default())];
        // Projected nodes inherit from their slot, so they wait for it.
        let mut deferred = Vec::new();

        loop {
            while let Some((id, scope, inherited)) = stack.pop() {
                if std::mem::replace(&mut visited[id.index()], true) {
                    continue;
                }
                let style = if dom.is_element(id) {
                    let mut sheets: Vec<(&Stylesheet, Origin)> = vec![(&ua, Origin::UserAgent)];
                    if let Some(own) = scoped.get(&scope) {
                        sheets.extend(own.iter().map(|s| (s, Origin::Author)));
                    }
                    if scope == dom.document() {
                        sheets.extend(extra.iter().map(|s| (s, Origin::Author)));
                    }
                    let inline = dom
                        .get_attr(id, "style")
                        .map(parse_inline_declarations)
                        .unwrap_or_default();

                    let style = compute_style(ElementRef::new(dom, id), &sheets, &inline, Some(&inherited));
                    styles[id.index()] = Some(style);
                    style
                } else {
                    inherited
                };

                for child in dom.children(id) {
                    if dom.assigned_slot(child).is_some() {
                        deferred.push((child, scope, style));
                    } else {
                        stack.push((child, scope, style));
                    }
                }
                for &node in dom.assigned_nodes(id) {
                    stack.push((node, dom.tree_scope(node), style));
                }
                if let Some(root) = dom.shadow_root(id) {
                    stack.push((root, root, style));
                }
            }

            // Whatever no slot reached (a projection cycle, say) inherits
            // from its physical parent instead.
            stack.extend(deferred.drain(..).filter(|(id, _, _)| !visited[id.index()]));
            if stack.is_empty() {
                break;
            }
        }

        trace!(
            "computed styles for {} element(s) across {} tree scope(s)",
            styles.iter().filter(|s| s.is_some()).count(),
            scoped.len()
        );
        Self { styles }
    }

    /// Computed style of an element, if it was styled.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ComputedStyle> {
        self.styles.get(id.index()).and_then(|s| s.as_ref())
    }

    /// Whether `id` generates no box (`display: none`).
    pub fn is_display_none(&self, id: ArenaNodeId) -> bool {
        self.get(id).is_some_and(|s| s.is_display_none())
    }

    /// Whether `id` is `visibility: hidden` or `collapse`.
    pub fn is_visibility_hidden(&self, id: ArenaNodeId) -> bool {
        self.get(id).is_some_and(|s| s.visibility.is_hidden())
    }
}

/// Collect the `<style>` sheets that belong to one tree scope, in tree order.
/// Template contents and nested shadow trees are not entered.
fn scope_stylesheets(dom: &ArenaDom, scope: ArenaNodeId) -> Vec<Stylesheet> {
    let mut sheets = Vec::new();
    let mut stack = vec![scope];
    while let Some(id) = stack.pop() {
        match dom.tag(id) {
            Some("template") => continue,
            Some("style") => {
                if applies_to_screen(dom.get_attr(id, "media")) {
                    let css: String = dom.children(id).filter_map(|c| dom.text_content(c)).collect();
                    sheets.push(Stylesheet::parse(&css));
                }
                continue;
            }
            _ => {}
        }
        let mut children: Vec<_> = dom.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    sheets
}

/// Whether a `media` attribute value matches a screen.
fn applies_to_screen(media: Option<&str>) -> bool {
    let Some(media) = media else {
        return true;
    };
    let media = media.trim().to_ascii_lowercase();
    media.is_empty()
        || media
            .split(',')
            .map(str::trim)
            .any(|q| q == "all" || q == "screen" || q.starts_with("screen ") || q.starts_with("all "))
}
