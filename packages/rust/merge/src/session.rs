//! Session command queue over the accumulating document.
//!
//! The desktop original signaled between its views through shared mutable
//! flag cells polled on every render pass. Here the producer side enqueues
//! explicit commands instead, and [`Session::process`] drains them in order.

use std::collections::VecDeque;

use tracing::info;

use scholarstack_shared::{HtmlDocument, MergeOptions, Result};

use crate::highlight::Highlighter;
use crate::instrument::{InstrumentOptions, instrument};
use crate::merger::{MergeReport, Merger};
use crate::selection::strip_selected;

/// A queued document operation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Merge the result cards of a source page into the document.
    Merge {
        /// Source page text.
        source: String,
    },
    /// Re-highlight the document for a search term.
    Highlight {
        /// Term to mark.
        term: String,
    },
    /// Remove all highlights.
    ClearHighlights,
    /// Delete the cards selected in the browser.
    StripSelected,
}

/// What a processed command did.
#[derive(Debug, Clone)]
pub enum Applied {
    Merged(MergeReport),
    Highlighted { term: String, marks: usize },
    HighlightsCleared { removed: usize },
    SelectionsStripped { removed: usize },
}

/// An accumulating document plus the queue of operations against it.
pub struct Session {
    merger: Merger,
    highlighter: Highlighter,
    instrument_options: InstrumentOptions,
    document: HtmlDocument,
    queue: VecDeque<Command>,
}

impl Session {
    /// Start a session over an existing document (possibly empty).
    pub fn open(options: &MergeOptions, document: HtmlDocument) -> Result<Self> {
        Ok(Self {
            merger: Merger::new(options.signature.clone())?,
            highlighter: Highlighter::new(&options.highlight_class)?,
            instrument_options: InstrumentOptions {
                mark_js_url: options.mark_js_url.clone(),
                signature: options.signature.clone(),
                marker_class: options.selection_class.clone(),
            },
            document,
            queue: VecDeque::new(),
        })
    }

    /// Start a session over a new empty document.
    pub fn new(options: &MergeOptions) -> Result<Self> {
        Self::open(options, HtmlDocument::default())
    }

    /// The current document.
    pub fn document(&self) -> &HtmlDocument {
        &self.document
    }

    /// Consume the session, returning the document.
    pub fn into_document(self) -> HtmlDocument {
        self.document
    }

    /// Number of commands not yet processed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a command for the next [`Session::process`] call.
    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Drain the queue in FIFO order, applying each command to the document.
    ///
    /// Stops at the first failing command: the document keeps the last
    /// successfully applied state, and the failing command plus everything
    /// behind it stays queued.
    pub fn process(&mut self) -> Result<Vec<Applied>> {
        let mut applied = Vec::new();
        while let Some(command) = self.queue.pop_front() {
            match self.apply(&command) {
                Ok(record) => applied.push(record),
                Err(e) => {
                    self.queue.push_front(command);
                    return Err(e);
                }
            }
        }
        Ok(applied)
    }

    fn apply(&mut self, command: &Command) -> Result<Applied> {
        match command {
            Command::Merge { source } => {
                let outcome = self.merger.merge(source, &self.document.text)?;
                // A freshly adopted page gets its selection assets, once.
                // Instrument before committing, so a failure here leaves the
                // document as it was.
                self.document.text = if outcome.report.bootstrapped && !outcome.html.is_empty() {
                    let instrumented = instrument(&outcome.html, &self.instrument_options)?;
                    info!("bootstrapped and instrumented new document");
                    instrumented
                } else {
                    outcome.html
                };
                Ok(Applied::Merged(outcome.report))
            }
            Command::Highlight { term } => {
                if self.document.is_empty() {
                    return Ok(Applied::Highlighted {
                        term: term.clone(),
                        marks: 0,
                    });
                }
                let outcome = self.highlighter.apply(&self.document.text, term)?;
                self.document.text = outcome.html;
                Ok(Applied::Highlighted {
                    term: term.clone(),
                    marks: outcome.marks,
                })
            }
            Command::ClearHighlights => {
                if self.document.is_empty() {
                    return Ok(Applied::HighlightsCleared { removed: 0 });
                }
                let outcome = self.highlighter.unmark(&self.document.text)?;
                self.document.text = outcome.html;
                Ok(Applied::HighlightsCleared {
                    removed: outcome.removed,
                })
            }
            Command::StripSelected => {
                if self.document.is_empty() {
                    return Ok(Applied::SelectionsStripped { removed: 0 });
                }
                let outcome =
                    strip_selected(&self.document.text, &self.instrument_options.marker_class)?;
                self.document.text = outcome.html;
                Ok(Applied::SelectionsStripped {
                    removed: outcome.removed,
                })
            }
        }
    }
}
