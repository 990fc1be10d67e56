//! Bundle data structures

use std::path::Path;

use tracing::debug;

use crate::classify::{self, BinaryReason, ClassifierConfig, Detection};
use crate::filter::PathFilter;

// Document format tokens
pub const TREE_HEADING: &str = "## File Structure";
pub const FILE_HEADER_PREFIX: &str = "### File: ";
pub const FENCE: &str = "```";
pub const BINARY_NOTE_PREFIX: &str = "[Binary file - ";
pub const BINARY_NOTE_SUFFIX: &str = " bytes]";
pub const INVALID_JSON_NOTE: &str = "[Note: Invalid JSON content]";
pub const DIR_MARKER: &str = "📁";
pub const FILE_MARKER: &str = "📄";

/// Bytes substituted for binary content on the decode side. The document
/// format records only the size of binary files, never their payload.
pub const BINARY_STUB: &[u8] = b"[Binary content not preserved]";

/// A single named file in a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Slash-separated relative path (may include subdirectories)
    pub path: String,
    /// Raw contents
    pub content: Vec<u8>,
    /// Whether the content was classified as binary
    pub is_binary: bool,
    /// Reason for the binary classification (if applicable)
    pub binary_reason: Option<BinaryReason>,
    /// Size in bytes as reported in the document
    pub size_bytes: u64,
}

impl FileRecord {
    /// Create a record with the given path and content
    /// Uses the default config to classify the content
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::with_config(path, content, &ClassifierConfig::default())
    }

    /// Create a record with a custom classifier config
    pub fn with_config(
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        config: &ClassifierConfig,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        let size_bytes = content.len() as u64;

        let (is_binary, binary_reason) = match classify::detect(&path, &content, config) {
            Detection::Text { .. } => (false, None),
            Detection::Binary { reason } => (true, Some(reason)),
        };
        debug!(path = %path, binary = is_binary, "classified content");

        Self {
            path,
            content,
            is_binary,
            binary_reason,
            size_bytes,
        }
    }

    /// Create a record with an explicit binary flag, skipping classification
    pub fn with_kind(
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        is_binary: bool,
    ) -> Self {
        let content = content.into();
        let size_bytes = content.len() as u64;
        Self {
            path: path.into(),
            content,
            is_binary,
            binary_reason: if is_binary {
                Some(BinaryReason::Explicit)
            } else {
                None
            },
            size_bytes,
        }
    }

    /// Create an empty binary record carrying only the reported size.
    /// The decoder uses this for binary sections, whose payloads are not
    /// recoverable from a document.
    pub fn binary_placeholder(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            content: Vec::new(),
            is_binary: true,
            binary_reason: Some(BinaryReason::Explicit),
            size_bytes,
        }
    }

    /// Language tag for the fenced block: the lower-cased extension of the
    /// basename, or `text` when the basename has none
    pub fn language_tag(&self) -> String {
        let basename = self.path.rsplit('/').next().unwrap_or(&self.path);
        match basename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => "text".to_string(),
        }
    }
}

/// Error building a bundle from a source collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// The source collection had no files at all
    Empty,
    /// Every candidate file was dropped by the path filter
    AllExcluded { total: usize },
}

impl std::fmt::Display for BundleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleError::Empty => write!(f, "no files to process"),
            BundleError::AllExcluded { total } => {
                write!(f, "all {} candidate files were excluded by filters", total)
            }
        }
    }
}

impl std::error::Error for BundleError {}

/// An ordered collection of file records plus a document title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Title emitted as the document's first heading
    pub title: String,
    /// Files in insertion order
    pub files: Vec<FileRecord>,
}

impl Bundle {
    /// Create an empty bundle with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            files: Vec::new(),
        }
    }

    /// Add a record to the bundle.
    /// Duplicate paths are kept as-is: the document gets one section per
    /// record, and decoding yields one record per section.
    pub fn push(&mut self, record: FileRecord) {
        self.files.push(record);
    }

    /// Read a file from disk, classify it and add it under `bundle_path`
    /// (defaults to the on-disk file name)
    pub fn push_from_path(&mut self, path: &Path, bundle_path: Option<String>) -> anyhow::Result<()> {
        let content = std::fs::read(path)?;

        let name = bundle_path.unwrap_or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string()
        });

        self.push(FileRecord::new(name, content));
        Ok(())
    }

    /// Build a bundle from `(path, content)` sources, dropping paths the
    /// filter excludes.
    ///
    /// Returns an error when the source sequence is empty or when every
    /// candidate was excluded, so callers never silently produce an empty
    /// document.
    pub fn from_sources<I, P, C>(
        title: impl Into<String>,
        sources: I,
        filter: &PathFilter,
        config: &ClassifierConfig,
    ) -> Result<Self, BundleError>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let mut bundle = Self::new(title);
        let mut total = 0usize;

        for (path, content) in sources {
            let path = path.into();
            total += 1;
            if filter.is_excluded(&path) {
                continue;
            }
            bundle.push(FileRecord::with_config(path, content, config));
        }

        if total == 0 {
            return Err(BundleError::Empty);
        }
        if bundle.files.is_empty() {
            return Err(BundleError::AllExcluded { total });
        }
        Ok(bundle)
    }

    /// Record paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when the bundle holds no records
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
