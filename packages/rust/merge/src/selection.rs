//! Removing user-selected cards from the accumulating document.
//!
//! In the browser, clicking a card toggles the selection marker class (see
//! [`crate::instrument`]); stripping deletes every element carrying it,
//! matching the original's remove-selections gesture
//! (`querySelectorAll('.selected')` + `remove()`).

use ego_tree::NodeId;
use scraper::Selector;
use serde::Serialize;
use tracing::debug;

use scholarstack_shared::{Result, ScholarStackError};

use crate::dom;

/// Result of stripping selected elements.
#[derive(Debug, Clone, Serialize)]
pub struct StripOutcome {
    /// Serialized document after stripping.
    pub html: String,
    /// Number of elements removed.
    pub removed: usize,
}

/// Delete every element carrying `marker_class`.
pub fn strip_selected(html: &str, marker_class: &str) -> Result<StripOutcome> {
    let selector = Selector::parse(&format!(".{marker_class}")).map_err(|e| {
        ScholarStackError::validation(format!("selection class {marker_class:?}: {e}"))
    })?;

    let mut doc = dom::parse_document(html)?;
    let ids: Vec<NodeId> = doc.select(&selector).map(|el| el.id()).collect();
    for &id in &ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    debug!(removed = ids.len(), "stripped selected elements");
    Ok(StripOutcome {
        html: doc.html(),
        removed: ids.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_marked_elements() {
        let html = r#"<html><body><div class="gs_r gs_or gs_scl selected">gone</div><div class="gs_r gs_or gs_scl">kept</div></body></html>"#;

        let outcome = strip_selected(html, "selected").expect("strip");
        assert_eq!(outcome.removed, 1);
        assert!(!outcome.html.contains("gone"));
        assert!(outcome.html.contains("kept"));
    }

    #[test]
    fn nothing_selected_is_noop() {
        let html = r#"<html><body><div class="gs_r gs_or gs_scl">kept</div></body></html>"#;
        let outcome = strip_selected(html, "selected").expect("strip");
        assert_eq!(outcome.removed, 0);
        assert!(outcome.html.contains("kept"));
    }

    #[test]
    fn nested_selection_counts_every_element() {
        let html = r#"<html><body><div class="selected">outer<span class="selected">inner</span></div></body></html>"#;
        let outcome = strip_selected(html, "selected").expect("strip");
        assert_eq!(outcome.removed, 2);
        assert!(!outcome.html.contains("outer"));
        assert!(!outcome.html.contains("inner"));
    }

    #[test]
    fn invalid_marker_class_is_rejected() {
        assert!(matches!(
            strip_selected("<html></html>", "no good"),
            Err(ScholarStackError::Validation { .. })
        ));
    }
}
