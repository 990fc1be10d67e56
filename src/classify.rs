//! Text/binary content classification

/// Extensions always treated as text, lower-cased without the dot
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "adoc", "py", "pyi", "js", "jsx", "ts", "tsx", "mjs", "cjs",
    "java", "c", "h", "cpp", "hpp", "cc", "hh", "cs", "go", "rs", "rb", "php", "swift", "kt",
    "kts", "scala", "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd", "html", "htm", "xml", "css",
    "scss", "sass", "less", "json", "jsonl", "yaml", "yml", "toml", "ini", "cfg", "conf", "sql",
    "r", "lua", "pl", "pm", "ex", "exs", "erl", "hs", "elm", "clj", "vue", "svelte", "dart",
    "gradle", "properties", "csv", "tsv", "tex", "bib", "diff", "patch",
];

/// Base names always treated as text, compared case-insensitively
const TEXT_FILENAMES: &[&str] = &[
    "readme",
    "license",
    "licence",
    "notice",
    "copying",
    "changelog",
    "contributing",
    "authors",
    "makefile",
    "dockerfile",
    "gemfile",
    "rakefile",
    "procfile",
    ".gitignore",
    ".gitattributes",
    ".editorconfig",
    ".dockerignore",
];

/// Tunable thresholds for the content heuristics
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Number of leading bytes inspected by the NUL and printable-ratio checks
    pub sample_len: usize,
    /// Fraction of non-printable bytes in the sample above which content is binary
    pub max_nonprintable_ratio: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_len: 1024,
            max_nonprintable_ratio: 0.30,
        }
    }
}

/// Result of content classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Content treated as text
    Text { reason: TextReason },
    /// Content treated as binary
    Binary { reason: BinaryReason },
}

/// Rule that classified content as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextReason {
    /// Zero-length content
    Empty,
    /// Extension is in the known-text set
    KnownExtension,
    /// Base name is in the known-text set
    KnownFilename,
    /// Guessed MIME type is `text/*`
    TextMime,
    /// Content starts with a Unicode byte-order mark
    ByteOrderMark,
    /// Entire buffer decodes as UTF-8
    ValidUtf8,
}

/// Rule that classified content as binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryReason {
    /// NUL byte within the sampled prefix
    NulByte,
    /// Too many non-printable bytes in the sampled prefix
    NonPrintable,
    /// Buffer is not valid UTF-8
    InvalidUtf8,
    /// Explicitly marked binary by the caller
    Explicit,
}

/// Classify content, first matching rule wins.
///
/// Name-based checks (extension, known file names, MIME guess) run before the
/// content heuristics so the common cases never touch the buffer. The NUL and
/// non-printable checks inspect only the first `sample_len` bytes and catch
/// binary formats that would decode as UTF-8 by chance; the full-buffer UTF-8
/// decode is the final fallback.
pub fn detect(name: &str, content: &[u8], config: &ClassifierConfig) -> Detection {
    if content.is_empty() {
        return Detection::Text {
            reason: TextReason::Empty,
        };
    }

    let basename = name.rsplit('/').next().unwrap_or(name).to_ascii_lowercase();

    if let Some((stem, ext)) = basename.rsplit_once('.') {
        if !stem.is_empty() && TEXT_EXTENSIONS.contains(&ext) {
            return Detection::Text {
                reason: TextReason::KnownExtension,
            };
        }
    }
    if TEXT_FILENAMES.contains(&basename.as_str()) {
        return Detection::Text {
            reason: TextReason::KnownFilename,
        };
    }

    if mime_guess::from_path(name)
        .first()
        .map_or(false, |mime| mime.type_() == mime_guess::mime::TEXT)
    {
        return Detection::Text {
            reason: TextReason::TextMime,
        };
    }

    if has_bom(content) {
        return Detection::Text {
            reason: TextReason::ByteOrderMark,
        };
    }

    let sample = &content[..content.len().min(config.sample_len)];
    if sample.contains(&0) {
        return Detection::Binary {
            reason: BinaryReason::NulByte,
        };
    }

    let nonprintable = sample.iter().filter(|&&b| !is_printable(b)).count();
    if nonprintable as f64 / sample.len() as f64 > config.max_nonprintable_ratio {
        return Detection::Binary {
            reason: BinaryReason::NonPrintable,
        };
    }

    if std::str::from_utf8(content).is_ok() {
        Detection::Text {
            reason: TextReason::ValidUtf8,
        }
    } else {
        Detection::Binary {
            reason: BinaryReason::InvalidUtf8,
        }
    }
}

/// Convenience wrapper around [`detect`]
pub fn is_binary(name: &str, content: &[u8], config: &ClassifierConfig) -> bool {
    matches!(detect(name, content, config), Detection::Binary { .. })
}

/// UTF-8, UTF-16-LE or UTF-16-BE byte-order mark
fn has_bom(content: &[u8]) -> bool {
    content.starts_with(&[0xEF, 0xBB, 0xBF])
        || content.starts_with(&[0xFF, 0xFE])
        || content.starts_with(&[0xFE, 0xFF])
}

/// Printable ASCII plus the whitespace/control bytes common in text files
fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | b'\n' | b'\r' | b'\t' | 0x0C | 0x08)
}
