//! Text alternatives aggregated from visible descendants.

use std::collections::HashSet;

use super::walker::ComposedWalker;
use crate::dom::ArenaNodeId;

/// Concatenate the trimmed text under `node`, in composed order.
///
/// Element children are entered only when `visible` accepts them; text
/// children are always taken, since they have no rendering state of their
/// own. Non-empty fragments are joined with a single space.
pub fn aggregate_text<F>(walker: &ComposedWalker<'_>, node: ArenaNodeId, visible: F) -> String
where
    F: Fn(ArenaNodeId) -> bool,
{
    let dom = walker.dom();
    if let Some(text) = dom.text_content(node) {
        return text.trim().to_string();
    }

    let mut fragments: Vec<&str> = Vec::new();
    let mut visited = HashSet::from([node]);
    let mut stack = walker.children(node);
    stack.reverse();

    while let Some(id) = stack.pop() {
        if let Some(text) = dom.text_content(id) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                fragments.push(trimmed);
            }
            continue;
        }
        if !visited.insert(id) || !visible(id) {
            continue;
        }
        let mut children = walker.children(id);
        children.reverse();
        stack.extend(children);
    }

    fragments.join(" ")
}
