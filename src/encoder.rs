//! Document encoder

use std::borrow::Cow;

use anyhow::Result;
use tracing::{debug, warn};

use crate::bundle::{
    Bundle, FileRecord, BINARY_NOTE_PREFIX, BINARY_NOTE_SUFFIX, FENCE, FILE_HEADER_PREFIX,
    INVALID_JSON_NOTE, TREE_HEADING,
};
use crate::tree;

/// Encodes a bundle into the Markdown document format
pub struct Encoder {
    // Currently stateless; kept as a struct for future options
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a bundle to a document string.
    ///
    /// The tree section is re-derived from the record paths and always
    /// sorted; the file sections follow the bundle's insertion order. Text
    /// content is decoded lossily, so encoding itself cannot fail.
    pub fn encode(&self, bundle: &Bundle) -> String {
        let mut output = String::new();

        output.push_str("# ");
        output.push_str(&bundle.title);
        output.push_str("\n\n");

        output.push_str(TREE_HEADING);
        output.push('\n');
        output.push_str(&tree::render(bundle.paths()));
        output.push('\n');

        for file in &bundle.files {
            self.encode_file(&mut output, file);
        }

        output
    }

    /// Encode a single file section
    fn encode_file(&self, output: &mut String, file: &FileRecord) {
        output.push_str(FILE_HEADER_PREFIX);
        output.push_str(&file.path);
        output.push('\n');

        if file.is_binary {
            debug!(path = %file.path, size = file.size_bytes, "encoded binary placeholder");
            output.push_str(BINARY_NOTE_PREFIX);
            output.push_str(&file.size_bytes.to_string());
            output.push_str(BINARY_NOTE_SUFFIX);
            output.push_str("\n\n");
            return;
        }

        let text = String::from_utf8_lossy(&file.content);
        let tag = file.language_tag();

        let (text, invalid_json) = if tag == "json" {
            match canonicalize_json(&text) {
                Some(pretty) => (Cow::Owned(pretty), false),
                None => {
                    warn!(path = %file.path, "invalid JSON left unformatted");
                    (text, true)
                }
            }
        } else {
            (text, false)
        };

        debug!(path = %file.path, language = %tag, "encoded text section");
        output.push_str(FENCE);
        output.push_str(&tag);
        output.push('\n');
        output.push_str(&text);
        // The decoder strips exactly one newline before the closing fence,
        // so exactly one is emitted here regardless of the content's tail.
        output.push('\n');
        output.push_str(FENCE);
        output.push('\n');
        if invalid_json {
            output.push_str(INVALID_JSON_NOTE);
            output.push('\n');
        }
        output.push('\n');
    }

    /// Encode a bundle directly to a writer
    pub fn encode_to_writer<W: std::io::Write>(&self, bundle: &Bundle, mut writer: W) -> Result<()> {
        let encoded = self.encode(bundle);
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }

    /// Encode a bundle to a file
    pub fn encode_to_file(&self, bundle: &Bundle, path: &std::path::Path) -> Result<()> {
        let encoded = self.encode(bundle);
        std::fs::write(path, encoded)?;
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reformat JSON with 2-space indentation, keeping key order.
/// Returns `None` when the text does not parse as JSON.
fn canonicalize_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let mut bundle = Bundle::new("Test");
        bundle.push(FileRecord::new("hello.txt", "Hello"));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert_eq!(
            result,
            "# Test\n\n## File Structure\n📄 hello.txt\n\n### File: hello.txt\n```txt\nHello\n```\n\n"
        );
    }

    #[test]
    fn test_encode_binary_placeholder() {
        let mut bundle = Bundle::new("Bin");
        bundle.push(FileRecord::new("img.bin", &[0x00, 0x01, 0x02][..]));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("### File: img.bin\n[Binary file - 3 bytes]\n\n"));
        assert!(!result.contains("```bin"));
    }

    #[test]
    fn test_encode_tree_section() {
        let mut bundle = Bundle::new("Tree");
        bundle.push(FileRecord::new("a/b.txt", "b"));
        bundle.push(FileRecord::new("a/c.txt", "c"));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("## File Structure\n📁 a\n  📄 b.txt\n  📄 c.txt\n\n"));
    }

    #[test]
    fn test_sections_follow_insertion_order() {
        let mut bundle = Bundle::new("Order");
        bundle.push(FileRecord::new("z.txt", "last name, first section"));
        bundle.push(FileRecord::new("a.txt", "first name, last section"));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        let z_pos = result.find("### File: z.txt").unwrap();
        let a_pos = result.find("### File: a.txt").unwrap();
        assert!(z_pos < a_pos);
    }

    #[test]
    fn test_json_canonicalization() {
        let mut bundle = Bundle::new("Json");
        bundle.push(FileRecord::new("cfg.json", r#"{"a":1}"#));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("```json\n{\n  \"a\": 1\n}\n```\n\n"));
        assert!(!result.contains(INVALID_JSON_NOTE));
    }

    #[test]
    fn test_json_key_order_preserved() {
        let mut bundle = Bundle::new("Json");
        bundle.push(FileRecord::new("cfg.json", r#"{"b":1,"a":2}"#));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("{\n  \"b\": 1,\n  \"a\": 2\n}"));
    }

    #[test]
    fn test_json_canonicalization_idempotent() {
        let once = canonicalize_json(r#"{"a":1}"#).unwrap();
        assert_eq!(once, "{\n  \"a\": 1\n}");
        assert_eq!(canonicalize_json(&once).unwrap(), once);
    }

    #[test]
    fn test_invalid_json_annotated_outside_fence() {
        let mut bundle = Bundle::new("Json");
        bundle.push(FileRecord::new("broken.json", "{not json"));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("```json\n{not json\n```\n[Note: Invalid JSON content]\n\n"));
    }

    #[test]
    fn test_trailing_newline_not_doubled_conditionally() {
        let mut bundle = Bundle::new("NL");
        bundle.push(FileRecord::new("f.txt", "x\n"));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        // One newline belongs to the content, one separates it from the fence
        assert!(result.contains("### File: f.txt\n```txt\nx\n\n```\n\n"));
    }

    #[test]
    fn test_invalid_utf8_text_is_replaced_not_fatal() {
        let mut bundle = Bundle::new("Lossy");
        bundle.push(FileRecord::with_kind("weird.txt", &b"caf\xE9"[..], false));

        let encoder = Encoder::new();
        let result = encoder.encode(&bundle);

        assert!(result.contains("caf\u{FFFD}"));
    }

    #[test]
    fn test_encode_to_file() {
        let mut bundle = Bundle::new("Disk");
        bundle.push(FileRecord::new("a.txt", "on disk"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");

        let encoder = Encoder::new();
        encoder.encode_to_file(&bundle, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, encoder.encode(&bundle));
    }
}
