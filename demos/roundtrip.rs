//! Build a bundle in memory, render it as Markdown and decode it back.
//!
//! Run with: cargo run --example roundtrip

use repodoc::{Bundle, Decoder, Encoder, FileRecord};

fn main() -> anyhow::Result<()> {
    let mut bundle = Bundle::new("Demo Project");
    bundle.push(FileRecord::new(
        "README.md",
        "# Demo\n\nA small example project.\n",
    ));
    bundle.push(FileRecord::new(
        "src/main.rs",
        "fn main() {\n    println!(\"hello\");\n}\n",
    ));
    bundle.push(FileRecord::new(
        "config.json",
        "{\"name\":\"demo\",\"debug\":true}",
    ));
    bundle.push(FileRecord::new("assets/logo.png", vec![0x89, b'P', b'N', b'G', 0x00, 0x01]));

    let document = Encoder::new().encode(&bundle);
    println!("Encoded document ({} bytes):", document.len());
    println!("{}", "-".repeat(60));
    print!("{}", document);
    println!("{}", "-".repeat(60));

    let decoded = Decoder::new().decode(&document)?;
    println!("\nDecoded {} files from \"{}\":", decoded.len(), decoded.title);
    for file in &decoded.files {
        let kind = if file.is_binary { "binary" } else { "text" };
        println!("  {} ({}, {} bytes)", file.path, kind, file.size_bytes);
    }

    // Text content survives the round trip byte for byte
    for (original, restored) in bundle.files.iter().zip(decoded.files.iter()) {
        if original.is_binary {
            continue;
        }
        if original.path == "config.json" {
            // JSON is canonicalized during encoding, so only shape survives
            continue;
        }
        assert_eq!(
            original.content, restored.content,
            "content mismatch for {}",
            original.path
        );
    }
    println!("\nRound trip verified for text files.");

    Ok(())
}
