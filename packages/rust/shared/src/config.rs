//! Application configuration for ScholarStack.
//!
//! User config lives at `~/.scholarstack/scholarstack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarStackError};
use crate::types::CardSignature;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "scholarstack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".scholarstack";

/// The mark.js build injected into accumulating documents. Versioned asset:
/// bumping the version happens here (or in the config file), not in code.
pub const DEFAULT_MARK_JS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mark.js/8.11.1/mark.min.js";

// ---------------------------------------------------------------------------
// Config structs (matching scholarstack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Result-card structural signature.
    #[serde(default)]
    pub signature: SignatureConfig,

    /// Search-term highlighting.
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Card selection marker.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Scholar fetch settings.
    #[serde(default)]
    pub scholar: ScholarConfig,
}

/// `[signature]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// Element tag name of a result card.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Class tokens a result card must carry.
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            classes: default_classes(),
        }
    }
}

fn default_tag() -> String {
    CardSignature::default().tag
}
fn default_classes() -> Vec<String> {
    CardSignature::default().classes
}

impl From<&SignatureConfig> for CardSignature {
    fn from(config: &SignatureConfig) -> Self {
        Self {
            tag: config.tag.clone(),
            classes: config.classes.clone(),
        }
    }
}

/// `[highlight]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Class applied to inserted `<mark>` wrappers.
    #[serde(default = "default_highlight_class")]
    pub class_name: String,

    /// mark.js asset URL injected into prepared documents.
    #[serde(default = "default_mark_js_url")]
    pub mark_js_url: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            class_name: default_highlight_class(),
            mark_js_url: default_mark_js_url(),
        }
    }
}

fn default_highlight_class() -> String {
    "highlight".into()
}
fn default_mark_js_url() -> String {
    DEFAULT_MARK_JS_URL.into()
}

/// `[selection]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Class toggled on clicked cards in the browser, and stripped by `strip`.
    #[serde(default = "default_selection_class")]
    pub class_name: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            class_name: default_selection_class(),
        }
    }
}

fn default_selection_class() -> String {
    "selected".into()
}

/// `[scholar]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarConfig {
    /// Scholar origin used to build result URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Interface language (`hl` query parameter).
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://scholar.google.com".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Runtime options (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for document operations, merged from config.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Result-card structural signature.
    pub signature: CardSignature,
    /// Class applied to highlight wrappers.
    pub highlight_class: String,
    /// Class marking selected cards.
    pub selection_class: String,
    /// mark.js asset URL for document instrumentation.
    pub mark_js_url: String,
}

impl From<&AppConfig> for MergeOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            signature: CardSignature::from(&config.signature),
            highlight_class: config.highlight.class_name.clone(),
            selection_class: config.selection.class_name.clone(),
            mark_js_url: config.highlight.mark_js_url.clone(),
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime fetch configuration for the Scholar client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Scholar origin.
    pub base_url: String,
    /// Interface language (`hl`).
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.scholar.base_url.clone(),
            language: config.scholar.language.clone(),
            timeout_secs: config.scholar.timeout_secs,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.scholarstack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScholarStackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.scholarstack/scholarstack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScholarStackError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ScholarStackError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScholarStackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScholarStackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScholarStackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("gs_r"));
        assert!(toml_str.contains("mark.min.js"));
        assert!(toml_str.contains("scholar.google.com"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.signature.tag, "div");
        assert_eq!(parsed.selection.class_name, "selected");
        assert_eq!(parsed.scholar.timeout_secs, 30);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[signature]
classes = ["entry", "hit"]

[scholar]
language = "ja"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.signature.tag, "div");
        assert_eq!(config.signature.classes, vec!["entry", "hit"]);
        assert_eq!(config.scholar.language, "ja");
        assert_eq!(config.scholar.base_url, "https://scholar.google.com");
        assert_eq!(config.highlight.class_name, "highlight");
    }

    #[test]
    fn merge_options_from_app_config() {
        let app = AppConfig::default();
        let options = MergeOptions::from(&app);
        assert_eq!(options.signature.css_selector(), "div.gs_r.gs_or.gs_scl");
        assert_eq!(options.highlight_class, "highlight");
        assert_eq!(options.selection_class, "selected");
        assert!(options.mark_js_url.contains("8.11.1"));
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = FetchConfig::from(&app);
        assert_eq!(fetch.base_url, "https://scholar.google.com");
        assert_eq!(fetch.language, "en");
        assert_eq!(fetch.timeout_secs, 30);
    }
}
