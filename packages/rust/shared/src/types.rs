//! Core domain types for ScholarStack documents.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarStackError};

// ---------------------------------------------------------------------------
// CardSignature
// ---------------------------------------------------------------------------

/// Structural signature identifying a single search-result entry.
///
/// An element is a result card when its tag name equals `tag` and its class
/// list contains every token in `classes`. Cards are located by this
/// structural match, never by identity. The default is the signature Google
/// Scholar result cards carry: `div.gs_r.gs_or.gs_scl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSignature {
    /// Element tag name.
    pub tag: String,
    /// Class tokens that must all be present on the element.
    pub classes: Vec<String>,
}

impl Default for CardSignature {
    fn default() -> Self {
        Self {
            tag: "div".into(),
            classes: vec!["gs_r".into(), "gs_or".into(), "gs_scl".into()],
        }
    }
}

impl CardSignature {
    /// CSS selector matching card elements, e.g. `div.gs_r.gs_or.gs_scl`.
    pub fn css_selector(&self) -> String {
        format!("{}.{}", self.tag, self.classes.join("."))
    }

    /// Class-only selector used inside injected browser scripts,
    /// e.g. `.gs_r.gs_or.gs_scl`.
    pub fn class_selector(&self) -> String {
        format!(".{}", self.classes.join("."))
    }

    /// Check that the signature can be rendered into a selector.
    pub fn validate(&self) -> Result<()> {
        if self.tag.is_empty() || !self.tag.chars().all(valid_token_char) {
            return Err(ScholarStackError::signature(format!(
                "invalid tag name {:?}",
                self.tag
            )));
        }
        if self.classes.is_empty() {
            return Err(ScholarStackError::signature(
                "at least one class token is required",
            ));
        }
        for class in &self.classes {
            if class.is_empty() || !class.chars().all(valid_token_char) {
                return Err(ScholarStackError::signature(format!(
                    "invalid class token {class:?}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for CardSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.css_selector())
    }
}

fn valid_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_signature_selectors() {
        let sig = CardSignature::default();
        assert_eq!(sig.css_selector(), "div.gs_r.gs_or.gs_scl");
        assert_eq!(sig.class_selector(), ".gs_r.gs_or.gs_scl");
        assert!(sig.validate().is_ok());
    }

    #[test]
    fn custom_signature_selectors() {
        let sig = CardSignature {
            tag: "article".into(),
            classes: vec!["entry".into(), "hit".into()],
        };
        assert_eq!(sig.css_selector(), "article.entry.hit");
        assert_eq!(sig.class_selector(), ".entry.hit");
        assert!(sig.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_tokens() {
        let empty_classes = CardSignature {
            tag: "div".into(),
            classes: vec![],
        };
        assert!(empty_classes.validate().is_err());

        let spaced = CardSignature {
            tag: "div".into(),
            classes: vec!["gs_r gs_or".into()],
        };
        assert!(spaced.validate().is_err());

        let bad_tag = CardSignature {
            tag: "div>script".into(),
            classes: vec!["gs_r".into()],
        };
        assert!(bad_tag.validate().is_err());
    }

    #[test]
    fn signature_toml_roundtrip() {
        let sig = CardSignature::default();
        let toml_str = toml::to_string(&sig).expect("serialize");
        let parsed: CardSignature = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, sig);
    }

    #[test]
    fn display_is_css_selector() {
        let sig = CardSignature::default();
        assert_eq!(sig.to_string(), "div.gs_r.gs_or.gs_scl");
    }
}
