//! Low-level tree surgery shared by the merge-crate operations.
//!
//! `scraper` exposes parsed documents as an `ego_tree::Tree` of nodes, which
//! is where sibling insertion and detachment live. Everything here works on
//! deep copies of node values, so a source document is never consumed or
//! mutated by grafting parts of it elsewhere.

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use scraper::{Html, Node};

use scholarstack_shared::{Result, ScholarStackError};

/// Parse a document, rejecting markup truncated beyond recovery.
///
/// html5ever recovers from nearly anything, so the unrecoverable class is
/// limited to input that ends inside an open tag: the shape a partially
/// written save file takes.
pub(crate) fn parse_document(text: &str) -> Result<Html> {
    if let Some(tail) = truncated_tag(text) {
        return Err(ScholarStackError::parse(format!(
            "input ends inside an open tag: {tail:?}"
        )));
    }
    Ok(Html::parse_document(text))
}

/// Returns the trailing unterminated tag if the input ends inside one.
fn truncated_tag(text: &str) -> Option<String> {
    let idx = text.rfind('<')?;
    let rest = &text[idx..];
    let opens_tag = match rest[1..].chars().next() {
        None => true,
        Some(c) => c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?',
    };
    if opens_tag && !rest.contains('>') {
        Some(rest.chars().take(40).collect())
    } else {
        None
    }
}

/// Deep-copy the children of `src` under `dst`, preserving order.
pub(crate) fn copy_children(src: NodeRef<'_, Node>, dst: &mut NodeMut<'_, Node>) {
    for child in src.children() {
        let mut copied = dst.append(child.value().clone());
        copy_children(child, &mut copied);
    }
}

/// Insert a deep copy of `src` as the next sibling of `anchor` in `tree`.
///
/// Returns the new node's id, or `None` when the anchor is gone or has no
/// parent to hang a sibling under.
pub(crate) fn graft_after(
    tree: &mut Tree<Node>,
    anchor: NodeId,
    src: NodeRef<'_, Node>,
) -> Option<NodeId> {
    if tree.get(anchor)?.parent().is_none() {
        return None;
    }
    let mut anchor = tree.get_mut(anchor)?;
    let mut copied = anchor.insert_after(src.value().clone());
    let id = copied.id();
    copy_children(src, &mut copied);
    Some(id)
}

/// Append a deep copy of `src` as the last child of `parent` in `tree`.
pub(crate) fn graft_append(
    tree: &mut Tree<Node>,
    parent: NodeId,
    src: NodeRef<'_, Node>,
) -> Option<NodeId> {
    let mut parent = tree.get_mut(parent)?;
    let mut copied = parent.append(src.value().clone());
    let id = copied.id();
    copy_children(src, &mut copied);
    Some(id)
}

/// Replace the node at `target` with the top-level nodes of an HTML
/// fragment, in order. Returns false when the target is gone or orphaned.
pub(crate) fn replace_with_fragment(tree: &mut Tree<Node>, target: NodeId, fragment: &str) -> bool {
    match tree.get(target) {
        Some(node) if node.parent().is_some() => {}
        _ => return false,
    }

    let frag = Html::parse_fragment(fragment);
    let mut anchor = target;
    for child in frag.root_element().children() {
        match graft_after(tree, anchor, child) {
            Some(id) => anchor = id,
            None => return false,
        }
    }

    if let Some(mut node) = tree.get_mut(target) {
        node.detach();
    }
    true
}

/// Minimal text escaping for rebuilding text nodes as fragment markup.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
