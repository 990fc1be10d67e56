//! Document decoder

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::bundle::{
    Bundle, FileRecord, BINARY_NOTE_PREFIX, BINARY_NOTE_SUFFIX, BINARY_STUB, FENCE,
    FILE_HEADER_PREFIX,
};

/// Error type for document decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document contains no file header lines
    NoFiles,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::NoFiles => write!(f, "no files found in document"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Caller-owned cache of decoded byte buffers keyed by path.
///
/// [`Decoder::decode_with_cache`] repopulates it on every call. Binary
/// records map to [`BINARY_STUB`] since their payloads are not recoverable
/// from a document; duplicate paths keep the last section's bytes.
#[derive(Debug, Clone, Default)]
pub struct BufferCache {
    buffers: HashMap<String, Vec<u8>>,
}

impl BufferCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes cached for `path`
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.buffers.get(path).map(|b| b.as_slice())
    }

    /// Insert or overwrite the bytes for `path`
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.buffers.insert(path.into(), bytes);
    }

    /// Remove and return the bytes for `path`
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.buffers.remove(path)
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    /// Swap in a whole new set of buffers
    pub fn replace(&mut self, buffers: HashMap<String, Vec<u8>>) {
        self.buffers = buffers;
    }

    /// Number of cached buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Cached paths, in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(|k| k.as_str())
    }
}

/// Decodes a document back into a bundle
pub struct Decoder {}

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a document into a bundle of file records.
    ///
    /// Malformed markup never fails: a missing closing fence is closed at end
    /// of input, stray lines outside fences are ignored. The only error is a
    /// document without a single file header line.
    pub fn decode(&self, input: &str) -> Result<Bundle, DecodeError> {
        let mut parser = DocumentParser::new();
        // Split on '\n' only: str::lines would also drop a trailing '\r'
        // from body lines and change round-tripped content.
        for line in input.split('\n') {
            parser.parse_line(line);
        }
        parser.finish()
    }

    /// Decode a document and repopulate `cache` with one buffer per path:
    /// the text bytes for text records, [`BINARY_STUB`] for binary records.
    ///
    /// The returned bundle keeps one record per section even for duplicate
    /// paths; in the cache a later section overwrites an earlier one.
    pub fn decode_with_cache(
        &self,
        input: &str,
        cache: &mut BufferCache,
    ) -> Result<Bundle, DecodeError> {
        let bundle = self.decode(input)?;

        cache.clear();
        for file in &bundle.files {
            let bytes = if file.is_binary {
                BINARY_STUB.to_vec()
            } else {
                file.content.clone()
            };
            cache.insert(file.path.clone(), bytes);
        }

        Ok(bundle)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    InFile,
    InFence,
}

/// A file section currently being accumulated
struct OpenFile {
    path: String,
    body: Vec<String>,
    binary_size: Option<u64>,
}

impl OpenFile {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            body: Vec::new(),
            binary_size: None,
        }
    }
}

/// Internal line state machine
struct DocumentParser {
    files: Vec<FileRecord>,
    title: Option<String>,
    current: Option<OpenFile>,
    state: ParseState,
}

impl DocumentParser {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            title: None,
            current: None,
            state: ParseState::Idle,
        }
    }

    fn parse_line(&mut self, line: &str) {
        // Structural markers are matched with any trailing CR removed so
        // CRLF documents still parse; body lines are kept byte-for-byte.
        let marker = line.strip_suffix('\r').unwrap_or(line);

        // A header starts a new file wherever it appears, fenced or not
        if let Some(rest) = marker.strip_prefix(FILE_HEADER_PREFIX) {
            self.flush();
            self.current = Some(OpenFile::new(rest.trim()));
            self.state = ParseState::InFile;
            return;
        }

        if let Some(file) = self.current.as_mut() {
            if let Some(rest) = marker.strip_prefix(BINARY_NOTE_PREFIX) {
                // Binary section: keep the reported size, drop any body
                file.binary_size = Some(parse_size(rest));
                file.body.clear();
                return;
            }

            if is_fence_delimiter(marker) {
                self.state = match self.state {
                    ParseState::InFence => ParseState::InFile,
                    _ => ParseState::InFence,
                };
                return;
            }

            if self.state == ParseState::InFence && file.binary_size.is_none() {
                file.body.push(line.to_string());
            }
            return;
        }

        // No file open yet: the only line of interest is the document title
        if self.title.is_none() {
            if let Some(rest) = marker.strip_prefix("# ") {
                self.title = Some(rest.trim().to_string());
            }
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.current.take() {
            let record = match file.binary_size {
                Some(size) => {
                    debug!(path = %file.path, size, "decoded binary section");
                    FileRecord::binary_placeholder(file.path, size)
                }
                None => {
                    let text = file.body.join("\n");
                    debug!(path = %file.path, bytes = text.len(), "decoded text section");
                    FileRecord::with_kind(file.path, text.into_bytes(), false)
                }
            };
            self.files.push(record);
        }
    }

    fn finish(mut self) -> Result<Bundle, DecodeError> {
        if self.state == ParseState::InFence {
            warn!("document ended inside an open fence");
        }
        self.flush();

        if self.files.is_empty() {
            return Err(DecodeError::NoFiles);
        }
        Ok(Bundle {
            title: self.title.unwrap_or_default(),
            files: self.files,
        })
    }
}

/// Three backticks, optionally followed by a single bare tag.
/// Backticks followed by anything containing whitespace are content.
fn is_fence_delimiter(line: &str) -> bool {
    match line.strip_prefix(FENCE) {
        Some(rest) => rest.is_empty() || !rest.chars().any(char::is_whitespace),
        None => false,
    }
}

/// Byte count from the remainder of a placeholder line. Malformed counts
/// degrade to zero, the section still decodes as binary.
fn parse_size(rest: &str) -> u64 {
    let digits = rest.strip_suffix(BINARY_NOTE_SUFFIX).unwrap_or(rest);
    digits.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifierConfig;
    use crate::encoder::Encoder;
    use crate::filter::PathFilter;

    #[test]
    fn test_decode_simple_document() {
        let input = "# Demo\n\n## File Structure\n📄 hello.txt\n\n### File: hello.txt\n```txt\nHello\n```\n";

        let decoder = Decoder::new();
        let bundle = decoder.decode(input).unwrap();

        assert_eq!(bundle.title, "Demo");
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].path, "hello.txt");
        assert_eq!(bundle.files[0].content, b"Hello");
        assert!(!bundle.files[0].is_binary);
    }

    #[test]
    fn test_round_trip_text() {
        let mut bundle = Bundle::new("Round Trip");
        bundle.push(FileRecord::new("a.txt", "one\ntwo"));
        bundle.push(FileRecord::new("b.txt", "ends with newline\n"));
        bundle.push(FileRecord::new("c.txt", "two newlines\n\n"));

        let document = Encoder::new().encode(&bundle);
        let decoded = Decoder::new().decode(&document).unwrap();

        assert_eq!(decoded.title, "Round Trip");
        assert_eq!(decoded.files.len(), 3);
        for (original, roundtripped) in bundle.files.iter().zip(&decoded.files) {
            assert_eq!(original.path, roundtripped.path);
            assert_eq!(original.content, roundtripped.content);
        }
    }

    #[test]
    fn test_round_trip_carriage_returns() {
        let mut bundle = Bundle::new("CRLF");
        bundle.push(FileRecord::new("dos.txt", "x\r\ny"));

        let document = Encoder::new().encode(&bundle);
        let decoded = Decoder::new().decode(&document).unwrap();

        assert_eq!(decoded.files[0].content, b"x\r\ny");
    }

    #[test]
    fn test_decode_binary_placeholder() {
        let input = "### File: img.bin\n[Binary file - 3 bytes]\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert!(bundle.files[0].is_binary);
        assert_eq!(bundle.files[0].size_bytes, 3);
        assert!(bundle.files[0].content.is_empty());
    }

    #[test]
    fn test_malformed_size_degrades_to_zero() {
        let input = "### File: img.bin\n[Binary file - lots bytes]\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert!(bundle.files[0].is_binary);
        assert_eq!(bundle.files[0].size_bytes, 0);
    }

    #[test]
    fn test_decode_no_files() {
        let decoder = Decoder::new();
        assert_eq!(decoder.decode("").unwrap_err(), DecodeError::NoFiles);
        assert_eq!(
            decoder.decode("# Title\n\njust prose\n").unwrap_err(),
            DecodeError::NoFiles
        );
    }

    #[test]
    fn test_missing_closing_fence_closes_at_eof() {
        let input = "### File: a.txt\n```txt\nline1\nline2";

        let bundle = Decoder::new().decode(input).unwrap();

        assert_eq!(bundle.files[0].content, b"line1\nline2");
    }

    #[test]
    fn test_header_inside_fence_starts_new_file() {
        let input = "### File: a.txt\n```txt\nabc\n### File: b.txt\n```txt\ndef\n```\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert_eq!(bundle.files.len(), 2);
        assert_eq!(bundle.files[0].content, b"abc");
        assert_eq!(bundle.files[1].content, b"def");
    }

    #[test]
    fn test_fence_like_content_preserved() {
        // Backticks followed by more than a bare tag are not a delimiter
        let input = "### File: t.md\n```md\n``` not a delimiter\n```\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert_eq!(bundle.files[0].content, b"``` not a delimiter");
    }

    #[test]
    fn test_tree_section_produces_no_records() {
        let input =
            "# T\n\n## File Structure\n📁 a\n  📄 b.txt\n\n### File: a/b.txt\n```txt\nhi\n```\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].path, "a/b.txt");
    }

    #[test]
    fn test_invalid_json_note_is_not_content() {
        let mut bundle = Bundle::new("J");
        bundle.push(FileRecord::new("broken.json", "{not json"));

        let document = Encoder::new().encode(&bundle);
        let decoded = Decoder::new().decode(&document).unwrap();

        assert_eq!(decoded.files[0].content, b"{not json");
    }

    #[test]
    fn test_binary_note_inside_fence_marks_binary() {
        // Line dispatch checks the placeholder before fence handling, so a
        // placeholder-shaped line takes effect even between fences
        let input = "### File: odd.txt\n```txt\nabc\n[Binary file - 9 bytes]\n```\n";

        let bundle = Decoder::new().decode(input).unwrap();

        assert!(bundle.files[0].is_binary);
        assert_eq!(bundle.files[0].size_bytes, 9);
        assert!(bundle.files[0].content.is_empty());
    }

    #[test]
    fn test_duplicate_paths_keep_both_records() {
        let input = "### File: same.txt\n```txt\nfirst\n```\n\n### File: same.txt\n```txt\nsecond\n```\n";

        let mut cache = BufferCache::new();
        let bundle = Decoder::new()
            .decode_with_cache(input, &mut cache)
            .unwrap();

        assert_eq!(bundle.files.len(), 2);
        assert_eq!(bundle.files[0].content, b"first");
        assert_eq!(bundle.files[1].content, b"second");
        // The cache holds one buffer per path, the later section wins
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("same.txt"), Some(&b"second"[..]));
    }

    #[test]
    fn test_decode_with_cache_clears_previous_contents() {
        let mut cache = BufferCache::new();
        cache.insert("stale.txt", b"old".to_vec());

        let input = "### File: fresh.txt\n```txt\nnew\n```\n";
        Decoder::new().decode_with_cache(input, &mut cache).unwrap();

        assert!(cache.get("stale.txt").is_none());
        assert_eq!(cache.get("fresh.txt"), Some(&b"new"[..]));
    }

    #[test]
    fn test_binary_records_cache_the_stub() {
        let input = "### File: img.bin\n[Binary file - 3 bytes]\n";

        let mut cache = BufferCache::new();
        Decoder::new().decode_with_cache(input, &mut cache).unwrap();

        assert_eq!(cache.get("img.bin"), Some(BINARY_STUB));
    }

    #[test]
    fn test_missing_title_decodes_as_empty() {
        let input = "### File: a.txt\n```txt\nx\n```\n";
        let bundle = Decoder::new().decode(input).unwrap();
        assert_eq!(bundle.title, "");
    }

    #[test]
    fn test_end_to_end_mixed_bundle() {
        let mut bundle = Bundle::new("Mixed");
        bundle.push(FileRecord::new("README.md", "# Hi"));
        bundle.push(FileRecord::new("img.bin", &[0x00, 0x01, 0x02][..]));

        let document = Encoder::new().encode(&bundle);
        assert!(document.contains("```md\n# Hi\n```"));
        assert!(document.contains("[Binary file - 3 bytes]"));

        let decoded = Decoder::new().decode(&document).unwrap();
        assert_eq!(decoded.files.len(), 2);
        assert_eq!(decoded.files[0].path, "README.md");
        assert_eq!(decoded.files[0].content, b"# Hi");
        assert!(decoded.files[1].is_binary);
        assert_eq!(decoded.files[1].path, "img.bin");
        assert_eq!(decoded.files[1].size_bytes, 3);
    }

    #[test]
    fn test_buffer_cache_operations() {
        let mut cache = BufferCache::new();
        assert!(cache.is_empty());

        cache.insert("a", b"1".to_vec());
        cache.insert("b", b"2".to_vec());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.remove("a"), Some(b"1".to_vec()));
        assert!(cache.get("a").is_none());

        let mut fresh = HashMap::new();
        fresh.insert("c".to_string(), b"3".to_vec());
        cache.replace(fresh);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c"), Some(&b"3"[..]));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fs_round_trip_through_document_file() {
        let sources = vec![
            ("src/lib.rs", &b"pub fn f() {}\n"[..]),
            ("README.md", &b"# Project\n"[..]),
            ("node_modules/pkg/index.js", &b"module.exports = {};\n"[..]),
        ];
        let bundle = Bundle::from_sources(
            "proj",
            sources,
            &PathFilter::default(),
            &ClassifierConfig::default(),
        )
        .unwrap();
        assert_eq!(bundle.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.md");
        Encoder::new().encode_to_file(&bundle, &path).unwrap();

        let document = std::fs::read_to_string(&path).unwrap();
        let decoded = Decoder::new().decode(&document).unwrap();

        assert_eq!(decoded.title, "proj");
        assert_eq!(decoded.files.len(), 2);
        assert_eq!(decoded.files[0].path, "src/lib.rs");
        assert_eq!(decoded.files[0].content, b"pub fn f() {}\n");
        assert_eq!(decoded.files[1].path, "README.md");
        assert_eq!(decoded.files[1].content, b"# Project\n");
    }
}
