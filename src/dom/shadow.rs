//! Declarative shadow roots and slot assignment.

use log::{debug, trace};

use super::arena::{ArenaDom, ArenaNodeId, ShadowRootMode};

/// Promote `<template shadowrootmode>` children to real shadow roots.
///
/// The template's contents move into a new shadow root on the template's
/// parent and the template itself is detached. Templates whose parent cannot
/// host a shadow root, or already has one, are left alone (they stay inert).
/// Returns the number of shadow roots created.
pub fn promote_declarative_shadow_roots(dom: &mut ArenaDom) -> usize {
    let templates: Vec<(ArenaNodeId, ShadowRootMode)> = dom
        .descendants_composed(dom.document())
        .into_iter()
        .filter(|&id| dom.tag(id) == Some("template"))
        .filter_map(|id| {
            dom.get_attr(id, "shadowrootmode")
                .or_else(|| dom.get_attr(id, "shadowroot"))
                .and_then(ShadowRootMode::from_attr)
                .map(|mode| (id, mode))
        })
        .collect();

    let mut created = 0;
    for (template, mode) in templates {
        let Some(host) = dom.parent(template).filter(|&p| dom.is_element(p)) else {
            continue;
        };
        let root = match dom.attach_shadow(host, mode) {
            Ok(root) => root,
            Err(e) => {
                debug!("leaving declarative shadow template inert: {e}");
                continue;
            }
        };

        let contents: Vec<_> = dom.children(template).collect();
        for child in contents {
            dom.detach(child);
            dom.append(root, child);
        }
        dom.detach(template);
        trace!("promoted shadow root {root:?} on host {host:?} ({mode:?})");
        created += 1;
    }
    created
}

/// Recompute slot assignment for every shadow root.
///
/// Within one shadow tree the first `<slot>` with a given name wins. A named
/// slot receives the host's element children whose `slot` attribute matches;
/// the first unnamed slot receives element children without a `slot`
/// attribute plus non-whitespace text children. Existing assignments are
/// replaced.
pub fn assign_slots(dom: &mut ArenaDom) {
    dom.clear_assignments();

    let hosts: Vec<_> = dom.shadow_roots().collect();
    for (host, root) in hosts {
        let slots = slots_in_tree(dom, root);
        let mut seen: Vec<String> = Vec::new();

        for slot in slots {
            let name = dom.get_attr(slot, "name").unwrap_or("").to_string();
            if seen.contains(&name) {
                continue;
            }

            let assigned: Vec<_> = dom
                .children(host)
                .filter(|&child| slottable_name(dom, child).as_deref() == Some(name.as_str()))
                .collect();
            trace!(
                "slot {:?} name={:?} assigned {} node(s)",
                slot,
                name,
                assigned.len()
            );
            if !assigned.is_empty() {
                // Infallible: `slots_in_tree` only yields slot elements.
                let _ = dom.assign_slot(slot, assigned);
            }
            seen.push(name);
        }
    }
}

/// The slot name a light-tree child targets, or `None` if it is not slottable.
fn slottable_name(dom: &ArenaDom, child: ArenaNodeId) -> Option<String> {
    if dom.is_element(child) {
        return Some(dom.get_attr(child, "slot").unwrap_or("").to_string());
    }
    match dom.text_content(child) {
        Some(text) if !text.trim().is_empty() => Some(String::new()),
        _ => None,
    }
}

/// Slot elements in one tree, in tree order. Nested shadow trees are separate
/// arena roots and are not entered.
fn slots_in_tree(dom: &ArenaDom, root: ArenaNodeId) -> Vec<ArenaNodeId> {
    let mut slots = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if dom.is_slot(id) {
            slots.push(id);
        }
        let mut children: Vec<_> = dom.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tree_sink::parse_into_arena;

    #[test]
    fn test_promotes_declarative_shadow_root() {
        let mut dom = parse_into_arena(
            r#"<body><x-card><template shadowrootmode="open"><h2>Card</h2></template></x-card></body>"#,
        );
        assert_eq!(promote_declarative_shadow_roots(&mut dom), 1);

        let host = dom.find_by_tag("x-card").unwrap();
        let root = dom.shadow_root(host).expect("shadow root attached");
        let h2 = dom.find_from(root, |n| {
            matches!(&n.data, crate::dom::ArenaNodeData::Element { name, .. } if name.local.as_ref() == "h2")
        });
        assert!(h2.is_some());
        assert!(dom.find_by_tag("template").is_none());
        assert_eq!(dom.shadow_mode(root), Some(ShadowRootMode::Open));
    }

    #[test]
    fn test_inert_template_is_kept() {
        let mut dom = parse_into_arena(r#"<body><table><template shadowrootmode="open"></template></table></body>"#);
        assert_eq!(promote_declarative_shadow_roots(&mut dom), 0);
        assert!(dom.find_by_tag("template").is_some());
    }

    #[test]
    fn test_nested_declarative_roots() {
        let mut dom = parse_into_arena(
            r#"<x-outer><template shadowrootmode="open"><x-inner><template shadowrootmode="closed"><p>deep</p></template></x-inner></template></x-outer>"#,
        );
        assert_eq!(promote_declarative_shadow_roots(&mut dom), 2);

        let inner = dom
            .descendants_composed(dom.document())
            .into_iter()
            .find(|&id| dom.tag(id) == Some("x-inner"))
            .unwrap();
        let inner_root = dom.shadow_root(inner).unwrap();
        assert_eq!(dom.shadow_mode(inner_root), Some(ShadowRootMode::Closed));
    }

    #[test]
    fn test_named_and_default_slot_assignment() {
        let mut dom = parse_into_arena(
            r#"<x-layout><h1 slot="title">Title</h1><p>Body</p>loose text<span slot="missing">x</span>
               <template shadowrootmode="open"><slot name="title"></slot><slot></slot></template></x-layout>"#,
        );
        promote_declarative_shadow_roots(&mut dom);
        assign_slots(&mut dom);

        let host = dom.find_by_tag("x-layout").unwrap();
        let root = dom.shadow_root(host).unwrap();
        let slots = slots_in_tree(&dom, root);
        assert_eq!(slots.len(), 2);

        let titled: Vec<_> = dom
            .assigned_nodes(slots[0])
            .iter()
            .filter_map(|&id| dom.tag(id))
            .collect();
        assert_eq!(titled, vec!["h1"]);

        let default = dom.assigned_nodes(slots[1]);
        assert_eq!(default.len(), 2);
        assert_eq!(dom.tag(default[0]), Some("p"));
        assert_eq!(dom.text_content(default[1]), Some("loose text"));
    }

    #[test]
    fn test_duplicate_slot_name_first_wins() {
        let mut dom = parse_into_arena(
            r#"<x-dup><b slot="a">x</b><template shadowrootmode="open"><slot name="a"></slot><slot name="a"></slot></template></x-dup>"#,
        );
        promote_declarative_shadow_roots(&mut dom);
        assign_slots(&mut dom);

        let host = dom.find_by_tag("x-dup").unwrap();
        let slots = slots_in_tree(&dom, dom.shadow_root(host).unwrap());
        assert_eq!(dom.assigned_nodes(slots[0]).len(), 1);
        assert!(dom.assigned_nodes(slots[1]).is_empty());
    }
}
