//! Core domain types for a stylesheet build.

use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// The stylesheet the build reads. Read once, never modified.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Where the text was read from.
    pub path: PathBuf,
    /// Full file contents.
    pub text: String,
}

/// The stylesheet the build produces.
#[derive(Debug, Clone)]
pub struct OutputDocument {
    /// Where the text will be written.
    pub path: PathBuf,
    /// Transformed stylesheet.
    pub text: String,
}

impl OutputDocument {
    /// Hex-encoded SHA-256 of the output text.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// BuildReport
// ---------------------------------------------------------------------------

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Destination the stylesheet was written to.
    pub output_path: PathBuf,
    /// Size of the written stylesheet.
    pub bytes_written: usize,
    /// Distinct class candidates found in content files.
    pub candidates_scanned: usize,
    /// Utility rules emitted by the expansion stage.
    pub utilities_generated: usize,
    /// SHA-256 of the written stylesheet.
    pub digest: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable() {
        let doc = OutputDocument {
            path: PathBuf::from("out.css"),
            text: ".p-4{padding:1rem}".into(),
        };
        let again = doc.clone();
        assert_eq!(doc.digest(), again.digest());
        assert_eq!(doc.digest().len(), 64);
    }

    #[test]
    fn digest_of_empty_text() {
        let doc = OutputDocument {
            path: PathBuf::from("out.css"),
            text: String::new(),
        };
        assert_eq!(
            doc.digest(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
