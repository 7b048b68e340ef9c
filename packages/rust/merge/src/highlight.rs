//! Search-term highlighting inside the accumulating document.
//!
//! The desktop original delegated this to mark.js running in the live page
//! (`markInstance.unmark(); markInstance.mark(term)`); here the same
//! wrapping happens directly on the tree. Every occurrence of the term in
//! body text is wrapped in a `<mark>` carrying the highlight class, and
//! unmark splices the wrappers back out.

use ego_tree::{NodeId, NodeRef};
use regex::{Regex, RegexBuilder};
use scraper::{Node, Selector};
use serde::Serialize;
use tracing::debug;

use scholarstack_shared::{Result, ScholarStackError};

use crate::dom;

/// Result of a mark pass.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightOutcome {
    /// Serialized document after marking.
    pub html: String,
    /// Number of wrapped occurrences.
    pub marks: usize,
}

/// Result of an unmark pass.
#[derive(Debug, Clone, Serialize)]
pub struct ClearOutcome {
    /// Serialized document after clearing.
    pub html: String,
    /// Number of wrappers removed.
    pub removed: usize,
}

/// Wraps and unwraps term occurrences with `<mark class="...">`.
pub struct Highlighter {
    class_name: String,
    mark_selector: Selector,
}

impl Highlighter {
    /// Build a highlighter for the given wrapper class.
    pub fn new(class_name: &str) -> Result<Self> {
        let mark_selector = Selector::parse(&format!("mark.{class_name}")).map_err(|e| {
            ScholarStackError::validation(format!("highlight class {class_name:?}: {e}"))
        })?;
        Ok(Self {
            class_name: class_name.to_string(),
            mark_selector,
        })
    }

    /// Clear old highlights, then mark `term`: the gesture a search box
    /// makes on every keystroke.
    pub fn apply(&self, html: &str, term: &str) -> Result<HighlightOutcome> {
        let cleared = self.unmark(html)?;
        self.mark(&cleared.html, term)
    }

    /// Wrap every occurrence of `term` in body text.
    ///
    /// Matching is case-insensitive and literal. Script and style text is
    /// left alone, as is everything outside `<body>`. An empty term marks
    /// nothing. Existing wrappers are not skipped; use [`Highlighter::apply`]
    /// to re-highlight.
    pub fn mark(&self, html: &str, term: &str) -> Result<HighlightOutcome> {
        let mut doc = dom::parse_document(html)?;
        if term.is_empty() {
            return Ok(HighlightOutcome {
                html: doc.html(),
                marks: 0,
            });
        }
        let matcher = literal_matcher(term)?;

        let body_selector = Selector::parse("body").unwrap();
        let Some(body) = doc.select(&body_selector).next() else {
            return Ok(HighlightOutcome {
                html: doc.html(),
                marks: 0,
            });
        };

        let mut targets: Vec<(NodeId, String)> = Vec::new();
        collect_text_nodes(*body, &mut targets);

        let mut marks = 0;
        for (id, text) in targets {
            let ranges: Vec<std::ops::Range<usize>> =
                matcher.find_iter(&text).map(|m| m.range()).collect();
            if ranges.is_empty() {
                continue;
            }
            let fragment = self.marked_fragment(&text, &ranges);
            if dom::replace_with_fragment(&mut doc.tree, id, &fragment) {
                marks += ranges.len();
            }
        }

        debug!(term, marks, "marked term occurrences");
        Ok(HighlightOutcome {
            html: doc.html(),
            marks,
        })
    }

    /// Remove every wrapper this highlighter previously inserted, splicing
    /// the wrapped content back in place.
    pub fn unmark(&self, html: &str) -> Result<ClearOutcome> {
        let mut doc = dom::parse_document(html)?;
        let ids: Vec<NodeId> = doc.select(&self.mark_selector).map(|el| el.id()).collect();

        for &id in &ids {
            let Some(node) = doc.tree.get(id) else {
                continue;
            };
            if node.parent().is_none() {
                continue;
            }
            let children: Vec<NodeId> = node.children().map(|c| c.id()).collect();

            // Move the children out, in order, then drop the wrapper.
            let mut anchor = id;
            for child in children {
                if let Some(mut anchor_mut) = doc.tree.get_mut(anchor) {
                    anchor_mut.insert_id_after(child);
                }
                anchor = child;
            }
            if let Some(mut wrapper) = doc.tree.get_mut(id) {
                wrapper.detach();
            }
        }

        debug!(removed = ids.len(), "cleared highlight wrappers");
        Ok(ClearOutcome {
            html: doc.html(),
            removed: ids.len(),
        })
    }

    /// Rebuild a text node's markup with the match ranges wrapped.
    fn marked_fragment(&self, text: &str, ranges: &[std::ops::Range<usize>]) -> String {
        let mut out = String::with_capacity(text.len() + ranges.len() * 32);
        let mut cursor = 0;
        for range in ranges {
            out.push_str(&dom::escape_text(&text[cursor..range.start]));
            out.push_str("<mark class=\"");
            out.push_str(&self.class_name);
            out.push_str("\">");
            out.push_str(&dom::escape_text(&text[range.clone()]));
            out.push_str("</mark>");
            cursor = range.end;
        }
        out.push_str(&dom::escape_text(&text[cursor..]));
        out
    }
}

/// Case-insensitive literal matcher for a search term.
fn literal_matcher(term: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|e| ScholarStackError::validation(format!("term {term:?}: {e}")))
}

/// Collect body text nodes, skipping script and style content.
fn collect_text_nodes(node: NodeRef<'_, Node>, out: &mut Vec<(NodeId, String)>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push((child.id(), text.text.to_string())),
            Node::Element(el) if matches!(el.name(), "script" | "style") => {}
            Node::Element(_) => collect_text_nodes(child, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn highlighter() -> Highlighter {
        Highlighter::new("highlight").expect("highlighter")
    }

    const PAGE: &str = r#"<html><head><style>.deep{color:red}</style></head><body><p>Deep learning is deep.</p><div>Not shallow.</div><script>var deep = 1;</script></body></html>"#;

    #[test]
    fn mark_wraps_case_insensitively() {
        let outcome = highlighter().mark(PAGE, "deep").expect("mark");
        assert_eq!(outcome.marks, 2);
        // Original casing is preserved inside the wrappers.
        assert!(outcome.html.contains(r#"<mark class="highlight">Deep</mark> learning"#));
        assert!(outcome.html.contains(r#"is <mark class="highlight">deep</mark>."#));
    }

    #[test]
    fn mark_skips_script_and_style() {
        let outcome = highlighter().mark(PAGE, "deep").expect("mark");
        assert!(outcome.html.contains("<script>var deep = 1;</script>"));
        assert!(outcome.html.contains("<style>.deep{color:red}</style>"));
    }

    #[test]
    fn mark_counts_across_text_nodes() {
        let html = "<html><body><p>rust</p><p>Rust and RUST</p></body></html>";
        let outcome = highlighter().mark(html, "rust").expect("mark");
        assert_eq!(outcome.marks, 3);
    }

    #[test]
    fn empty_term_marks_nothing() {
        let outcome = highlighter().mark(PAGE, "").expect("mark");
        assert_eq!(outcome.marks, 0);
        assert_eq!(outcome.html, Html::parse_document(PAGE).html());
    }

    #[test]
    fn unmark_restores_original_text() {
        let h = highlighter();
        let marked = h.mark(PAGE, "deep").expect("mark");
        let cleared = h.unmark(&marked.html).expect("unmark");

        assert_eq!(cleared.removed, 2);
        assert!(!cleared.html.contains("<mark"));
        assert!(cleared.html.contains("Deep learning is deep."));
    }

    #[test]
    fn apply_replaces_previous_highlights() {
        let h = highlighter();
        let first = h.apply(PAGE, "deep").expect("first");
        let second = h.apply(&first.html, "shallow").expect("second");

        assert_eq!(second.marks, 1);
        assert!(!second.html.contains(r#"<mark class="highlight">Deep</mark>"#));
        assert!(second.html.contains(r#"<mark class="highlight">shallow</mark>"#));
    }

    #[test]
    fn mark_escapes_surrounding_entities() {
        let html = "<html><body><p>AT&amp;T does deep research</p></body></html>";
        let outcome = highlighter().mark(html, "deep").expect("mark");
        assert!(outcome.html.contains("AT&amp;T does"));
        assert!(outcome.html.contains(r#"<mark class="highlight">deep</mark> research"#));
    }

    #[test]
    fn term_with_regex_metacharacters_is_literal() {
        let html = "<html><body><p>c++ (systems)</p></body></html>";
        let outcome = highlighter().mark(html, "c++").expect("mark");
        assert_eq!(outcome.marks, 1);
        assert!(outcome.html.contains(r#"<mark class="highlight">c++</mark>"#));
    }

    #[test]
    fn invalid_class_is_rejected() {
        assert!(matches!(
            Highlighter::new("not a class"),
            Err(ScholarStackError::Validation { .. })
        ));
    }

    #[test]
    fn other_marks_are_left_alone() {
        let html =
            r#"<html><body><p><mark class="note">kept</mark> deep</p></body></html>"#;
        let h = highlighter();
        let cleared = h.unmark(html).expect("unmark");
        assert_eq!(cleared.removed, 0);
        assert!(cleared.html.contains(r#"<mark class="note">kept</mark>"#));
    }
}
