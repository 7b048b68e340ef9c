//! Shared types, error model, and configuration for ScholarStack.
//!
//! This crate is the foundation depended on by all other ScholarStack crates.
//! It provides:
//! - [`ScholarStackError`]: the unified error type
//! - Domain types ([`CardSignature`], [`HtmlDocument`])
//! - Configuration ([`AppConfig`], runtime option structs, config loading)

pub mod config;
pub mod document;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_MARK_JS_URL, FetchConfig, HighlightConfig, MergeOptions, ScholarConfig,
    SelectionConfig, SignatureConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use document::{HtmlDocument, content_hash};
pub use error::{Result, ScholarStackError};
pub use types::CardSignature;
