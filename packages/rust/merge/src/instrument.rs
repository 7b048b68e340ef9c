//! Bootstrap-time instrumentation of the accumulating document.
//!
//! A freshly adopted page gets the assets that make it interactive when the
//! saved file is opened in a browser: the mark.js tag and the marker style
//! in `<head>`, and the click-to-select script in `<body>`. Script and style
//! ship as crate assets templated on the configured signature and marker
//! class; the mark.js URL is configuration (a versioned asset reference).

use ego_tree::NodeId;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use scholarstack_shared::{CardSignature, MergeOptions, Result};

use crate::dom;

/// Click-to-toggle-selection script, templated.
const SELECT_SCRIPT: &str = include_str!("../assets/select.js");

/// Marker style rule, templated.
const SELECTION_STYLE: &str = include_str!("../assets/selection.css");

/// Options for document instrumentation.
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    /// mark.js asset URL for the `<head>` script tag.
    pub mark_js_url: String,
    /// Card signature the select script binds click handlers to.
    pub signature: CardSignature,
    /// Class toggled on clicked cards.
    pub marker_class: String,
}

impl From<&MergeOptions> for InstrumentOptions {
    fn from(options: &MergeOptions) -> Self {
        Self {
            mark_js_url: options.mark_js_url.clone(),
            signature: options.signature.clone(),
            marker_class: options.selection_class.clone(),
        }
    }
}

/// Inject the selection assets into `html`.
///
/// A document without a head or body is returned unchanged; a real page
/// shell always has both.
pub fn instrument(html: &str, options: &InstrumentOptions) -> Result<String> {
    let mut doc = dom::parse_document(html)?;

    let head_selector = Selector::parse("head").unwrap();
    let body_selector = Selector::parse("body").unwrap();
    let head = doc.select(&head_selector).next().map(|el| el.id());
    let body = doc.select(&body_selector).next().map(|el| el.id());
    let (Some(head), Some(body)) = (head, body) else {
        warn!("document has no head or body, skipping instrumentation");
        return Ok(html.to_string());
    };

    let head_fragment = format!(
        "<script src=\"{}\"></script><style>{}</style>",
        options.mark_js_url,
        SELECTION_STYLE
            .trim_end()
            .replace("{{marker_class}}", &options.marker_class),
    );
    let body_fragment = format!(
        "<script>\n{}</script>",
        SELECT_SCRIPT
            .replace("{{card_selector}}", &options.signature.class_selector())
            .replace("{{marker_class}}", &options.marker_class),
    );

    append_fragment(&mut doc, head, &head_fragment);
    append_fragment(&mut doc, body, &body_fragment);

    debug!(mark_js_url = %options.mark_js_url, "instrumented document");
    Ok(doc.html())
}

/// Append the top-level nodes of an HTML fragment as the last children of
/// `parent`.
fn append_fragment(doc: &mut Html, parent: NodeId, fragment: &str) {
    let frag = Html::parse_fragment(fragment);
    for child in frag.root_element().children() {
        dom::graft_append(&mut doc.tree, parent, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> InstrumentOptions {
        InstrumentOptions::from(&MergeOptions::default())
    }

    const SHELL: &str = r#"<html><head><title>results</title></head><body><div class="gs_r gs_or gs_scl">card</div></body></html>"#;

    #[test]
    fn injects_head_assets() {
        let out = instrument(SHELL, &options()).expect("instrument");
        assert!(out.contains(r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/mark.js/8.11.1/mark.min.js"></script>"#));
        assert!(out.contains("<style>.selected { background-color: yellow; }</style>"));
        // Both landed inside head.
        let head_end = out.find("</head>").unwrap();
        assert!(out.find("mark.min.js").unwrap() < head_end);
        assert!(out.find("background-color: yellow").unwrap() < head_end);
    }

    #[test]
    fn injects_select_script_into_body() {
        let out = instrument(SHELL, &options()).expect("instrument");
        let body_start = out.find("<body>").unwrap();
        let select = out.find("querySelectorAll('.gs_r.gs_or.gs_scl')").unwrap();
        assert!(select > body_start);
        assert!(out.contains("classList.toggle('selected')"));
    }

    #[test]
    fn templates_follow_configuration() {
        let custom = InstrumentOptions {
            mark_js_url: "https://assets.example.org/mark-9.0.0.min.js".into(),
            signature: CardSignature {
                tag: "article".into(),
                classes: vec!["entry".into(), "hit".into()],
            },
            marker_class: "picked".into(),
        };
        let out = instrument(SHELL, &custom).expect("instrument");
        assert!(out.contains("mark-9.0.0.min.js"));
        assert!(out.contains("querySelectorAll('.entry.hit')"));
        assert!(out.contains("classList.toggle('picked')"));
        assert!(out.contains(".picked { background-color: yellow; }"));
    }

    #[test]
    fn existing_content_is_preserved() {
        let out = instrument(SHELL, &options()).expect("instrument");
        assert!(out.contains("<title>results</title>"));
        assert!(out.contains(r#"<div class="gs_r gs_or gs_scl">card</div>"#));
    }
}
