//! HTML tree operations over accumulating result documents.
//!
//! This crate provides:
//! - [`Merger`]: appends result cards from scraped pages into the document
//! - [`Highlighter`]: native search-term highlighting
//! - [`strip_selected`]: deleting user-selected cards
//! - [`instrument`]: injecting the selection assets at bootstrap
//! - [`Session`]: the command queue tying the operations together

mod dom;
pub mod highlight;
pub mod instrument;
pub mod merger;
pub mod selection;
pub mod session;

pub use highlight::{ClearOutcome, HighlightOutcome, Highlighter};
pub use instrument::{InstrumentOptions, instrument};
pub use merger::{Card, MergeOutcome, MergeReport, Merger};
pub use selection::{StripOutcome, strip_selected};
pub use session::{Applied, Command, Session};
