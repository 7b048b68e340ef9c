//! The accumulating HTML document: strict-UTF-8 file I/O and hashing.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, ScholarStackError};

/// The accumulating destination document, held as UTF-8 text.
///
/// A new document starts with no text at all; the first merge into it copies
/// a source page wholesale. On disk it is a plain `.html` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    /// Document text. Empty means "new document, nothing merged yet".
    pub text: String,
}

impl HtmlDocument {
    /// Wrap existing text in a document.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// True for a document no merge has touched yet.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Read a document from disk. The bytes must be valid UTF-8.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ScholarStackError::io(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            ScholarStackError::encoding(format!("{} is not valid UTF-8: {e}", path.display()))
        })?;
        Ok(Self { text })
    }

    /// Read a document from disk, or start a new empty one if the file
    /// does not exist yet.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "document file not found, starting empty");
            Ok(Self::default())
        }
    }

    /// Write the document to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ScholarStackError::io(parent, e))?;
            }
        }
        std::fs::write(path, &self.text).map_err(|e| ScholarStackError::io(path, e))
    }

    /// SHA-256 hash of the document text.
    pub fn content_hash(&self) -> String {
        content_hash(&self.text)
    }
}

/// SHA-256 hex digest of arbitrary text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ss-doc-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn save_load_roundtrip() {
        let path = temp_path("roundtrip.html");
        let doc = HtmlDocument::new("<html><body>stacked results</body></html>");
        doc.save(&path).expect("save");

        let loaded = HtmlDocument::load(&path).expect("load");
        assert_eq!(loaded, doc);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_invalid_utf8() {
        let path = temp_path("latin1.html");
        std::fs::write(&path, [0x3c, 0x68, 0x31, 0x3e, 0xff, 0xfe]).expect("write bytes");

        let err = HtmlDocument::load(&path).unwrap_err();
        assert!(matches!(err, ScholarStackError::Encoding { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = HtmlDocument::load(Path::new("/nonexistent/stack.html")).unwrap_err();
        assert!(matches!(err, ScholarStackError::Io { .. }));
    }

    #[test]
    fn load_or_empty_starts_new_document() {
        let doc = HtmlDocument::load_or_empty(Path::new("/nonexistent/stack.html")).expect("load");
        assert!(doc.is_empty());
    }

    #[test]
    fn content_hash_is_sha256() {
        let doc = HtmlDocument::new("hello world");
        assert_eq!(
            doc.content_hash(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(doc.content_hash().len(), 64);
    }
}
