//! The result-set merger.
//!
//! Appends the result cards of a freshly scraped source page after the last
//! card already present in the accumulating destination document. The first
//! merge into an empty destination adopts the source wholesale.

use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::{debug, info, warn};

use scholarstack_shared::{CardSignature, Result, ScholarStackError};

use crate::dom;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Summary of a completed merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// The destination was empty and adopted the source wholesale.
    pub bootstrapped: bool,
    /// Cards located in the source document.
    pub cards_found: usize,
    /// Cards appended to the destination.
    pub cards_appended: usize,
    /// Cards lost because the destination held no card to anchor on.
    pub cards_dropped: usize,
}

/// A merged destination document plus its report.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Serialized destination text after the merge.
    pub html: String,
    /// What happened.
    pub report: MergeReport,
}

/// A located result card, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    /// Heading text, how Scholar titles its entries.
    pub title: Option<String>,
    /// Link target of the heading, if any.
    pub href: Option<String>,
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

/// Locates result cards by structural signature and splices them between
/// documents.
pub struct Merger {
    signature: CardSignature,
    selector: Selector,
}

impl Merger {
    /// Build a merger for the given card signature.
    pub fn new(signature: CardSignature) -> Result<Self> {
        signature.validate()?;
        let selector = Selector::parse(&signature.css_selector()).map_err(|e| {
            ScholarStackError::signature(format!("{}: {e}", signature.css_selector()))
        })?;
        Ok(Self {
            signature,
            selector,
        })
    }

    /// The signature this merger locates cards with.
    pub fn signature(&self) -> &CardSignature {
        &self.signature
    }

    /// Merge the result cards of `source` into `destination`.
    ///
    /// An empty destination adopts the source text unchanged. Otherwise every
    /// source card, in document order, is deep-copied in as the next sibling
    /// of the destination's current last card; a destination without any card
    /// to anchor on drops the incoming card (counted, logged, not an error).
    /// Repeating a merge appends the same cards again; nothing deduplicates.
    /// The source text is never mutated.
    pub fn merge(&self, source: &str, destination: &str) -> Result<MergeOutcome> {
        if destination.is_empty() {
            debug!("empty destination, adopting source wholesale");
            return Ok(MergeOutcome {
                html: source.to_string(),
                report: MergeReport {
                    bootstrapped: true,
                    ..MergeReport::default()
                },
            });
        }

        let source_doc = dom::parse_document(source)?;
        let mut dest = dom::parse_document(destination)?;

        let cards: Vec<ElementRef<'_>> = source_doc.select(&self.selector).collect();
        let mut report = MergeReport {
            cards_found: cards.len(),
            ..MergeReport::default()
        };

        for card in &cards {
            // Insertions move the last card, so re-locate it every time.
            let anchor = dest.select(&self.selector).last().map(|el| el.id());
            let Some(anchor) = anchor else {
                report.cards_dropped += 1;
                warn!(
                    signature = %self.signature,
                    "destination has no result card to anchor on, dropping card"
                );
                continue;
            };
            match dom::graft_after(&mut dest.tree, anchor, **card) {
                Some(_) => report.cards_appended += 1,
                None => {
                    report.cards_dropped += 1;
                    warn!(signature = %self.signature, "anchor card is orphaned, dropping card");
                }
            }
        }

        info!(
            cards_found = report.cards_found,
            cards_appended = report.cards_appended,
            cards_dropped = report.cards_dropped,
            "merge completed"
        );

        Ok(MergeOutcome {
            html: dest.html(),
            report,
        })
    }

    /// List the result cards in a document, in document order.
    pub fn find_cards(&self, html: &str) -> Result<Vec<Card>> {
        let doc = dom::parse_document(html)?;
        let title_sel = Selector::parse("h3").unwrap();
        let link_sel = Selector::parse("h3 a[href]").unwrap();

        Ok(doc
            .select(&self.selector)
            .map(|el| Card {
                title: el
                    .select(&title_sel)
                    .next()
                    .map(|h| collapse_whitespace(&h.text().collect::<String>())),
                href: el
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            })
            .collect())
    }
}

/// Collapse runs of whitespace to single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
