//! Path exclusion rules

use tracing::debug;

/// Base names dropped outright: ignore markers and OS metadata
const EXCLUDED_FILENAMES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".npmignore",
    ".dockerignore",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
];

/// Suffixes dropped: archives, compiled objects, logs, locks, env files
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".zip", ".tar", ".gz", ".bz2", ".xz", ".7z", ".rar", ".pyc", ".pyo", ".class", ".o", ".a",
    ".so", ".dll", ".dylib", ".exe", ".log", ".lock", ".env", ".tmp", ".swp",
];

/// Path substrings dropped: VCS metadata and dependency/build caches
const EXCLUDED_PATTERNS: &[&str] = &[
    ".git/",
    ".hg/",
    ".svn/",
    "node_modules/",
    "__pycache__/",
    ".venv/",
    ".mypy_cache/",
    ".pytest_cache/",
    ".idea/",
    ".vscode/",
    "target/",
];

/// Decides which paths are left out of a document
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Exact base names to exclude
    pub filenames: Vec<String>,
    /// Suffixes to exclude, dot included, matched case-insensitively
    pub extensions: Vec<String>,
    /// Substrings that exclude a path wherever they appear in it
    pub patterns: Vec<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            filenames: EXCLUDED_FILENAMES.iter().map(|s| s.to_string()).collect(),
            extensions: EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            patterns: EXCLUDED_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PathFilter {
    /// A filter that excludes nothing
    pub fn empty() -> Self {
        Self {
            filenames: Vec::new(),
            extensions: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Whether `path` should be left out.
    ///
    /// Rules in order: exact base-name match, case-insensitive suffix match,
    /// then a plain substring test of each pattern against the forward-slash
    /// form of the path. The substring test is deliberately not segment-aware,
    /// so a pattern like `.git/` also hits `vendor/.git/config`.
    pub fn is_excluded(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let basename = normalized.rsplit('/').next().unwrap_or(&normalized);

        if self.filenames.iter().any(|name| name == basename) {
            debug!(path = %path, "excluded by filename");
            return true;
        }

        let lower = normalized.to_ascii_lowercase();
        if self
            .extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
        {
            debug!(path = %path, "excluded by extension");
            return true;
        }

        if self
            .patterns
            .iter()
            .any(|pattern| normalized.contains(pattern.as_str()))
        {
            debug!(path = %path, "excluded by pattern");
            return true;
        }

        false
    }
}
