//! Walk through the text/binary classifier on a range of inputs and show
//! how each verdict changes the rendered document.
//!
//! Run with: cargo run --example detection

use repodoc::{
    classify, BinaryReason, Bundle, ClassifierConfig, Detection, Encoder, FileRecord, TextReason,
};

fn main() {
    let config = ClassifierConfig::default();

    let scenarios: Vec<(&str, Vec<u8>)> = vec![
        ("notes.txt", b"plain ascii text\n".to_vec()),
        ("empty.log", Vec::new()),
        ("Makefile", b"all:\n\tcc main.c\n".to_vec()),
        ("calendar.ics", b"BEGIN:VCALENDAR\nEND:VCALENDAR\n".to_vec()),
        ("utf16-notes", vec![0xFF, 0xFE, b'h', 0x00, b'i', 0x00]),
        ("photo.png", png_bytes()),
        ("data.dat", vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, b'a', 0x07, 0x08, 0x09]),
        ("latin1.data", b"caf\xE9 au lait".to_vec()),
    ];

    println!("{:<14} {:<8} reason", "file", "verdict");
    println!("{}", "-".repeat(48));

    for (name, content) in &scenarios {
        let detection = classify::detect(name, content, &config);
        let (verdict, reason) = describe(&detection);
        println!("{:<14} {:<8} {}", name, verdict, reason);
    }

    // Binary files become size placeholders in the document
    let mut bundle = Bundle::new("Detection Demo");
    bundle.push(FileRecord::new("notes.txt", b"plain ascii text\n".as_slice()));
    bundle.push(FileRecord::new("photo.png", png_bytes()));

    let document = Encoder::new().encode(&bundle);
    println!("\nRendered document:");
    println!("{}", "-".repeat(48));
    print!("{}", document);
}

fn describe(detection: &Detection) -> (&'static str, &'static str) {
    match detection {
        Detection::Text { reason } => {
            let why = match reason {
                TextReason::Empty => "empty content",
                TextReason::KnownExtension => "well-known text extension",
                TextReason::KnownFilename => "well-known text filename",
                TextReason::TextMime => "text MIME type",
                TextReason::ByteOrderMark => "byte order mark",
                TextReason::ValidUtf8 => "decodes as UTF-8",
            };
            ("text", why)
        }
        Detection::Binary { reason } => {
            let why = match reason {
                BinaryReason::NulByte => "NUL byte in sample",
                BinaryReason::NonPrintable => "too many non-printable bytes",
                BinaryReason::InvalidUtf8 => "not valid UTF-8",
                BinaryReason::Explicit => "caller override",
            };
            ("binary", why)
        }
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R']);
    bytes
}
