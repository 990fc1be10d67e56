//! # repodoc
//!
//! Packs a collection of files into a single Markdown document and unpacks
//! such documents back into file records.
//!
//! ## Document Format
//!
//! A document carries a title, a sorted directory tree and one section per
//! file, in input order:
//!
//! ````text
//! # my-project
//!
//! ## File Structure
//! 📁 src
//!   📄 main.rs
//! 📄 README.md
//! 📄 logo.png
//!
//! ### File: README.md
//! ```md
//! Hello.
//! ```
//!
//! ### File: src/main.rs
//! ```rs
//! fn main() {}
//! ```
//!
//! ### File: logo.png
//! [Binary file - 2048 bytes]
//! ````
//!
//! ## Binary Files
//!
//! Binary content is represented by a placeholder carrying only the byte
//! count. The payload is deliberately not embedded: the format is meant for
//! reading, not archival, so a round trip recovers the size and a fixed
//! sentinel buffer instead of the original bytes.
//!
//! ## Classification Rules
//!
//! Whether content is binary is decided per file, first match wins:
//! 1. Empty content → text
//! 2. Known text extension or known text file name → text
//! 3. Guessed MIME type is `text/*` → text
//! 4. Unicode byte-order mark → text
//! 5. NUL byte in the sampled prefix → binary
//! 6. Too many non-printable bytes in the sampled prefix → binary
//! 7. Full buffer decodes as UTF-8 → text, otherwise binary
//!
//! Sample length and the non-printable threshold are tunable via
//! [`ClassifierConfig`].
//!
//! ## Decoding
//!
//! The decoder is a tolerant line state machine: it recognizes file headers,
//! binary placeholders and fence delimiters, ignores everything else, and
//! treats end of input as an implicit fence close. It fails only when a
//! document contains no file sections at all.

pub mod bundle;
pub mod classify;
pub mod filter;
pub mod tree;
pub mod encoder;
pub mod decoder;

pub use bundle::{Bundle, BundleError, FileRecord, BINARY_STUB};
pub use classify::{BinaryReason, ClassifierConfig, Detection, TextReason};
pub use decoder::{BufferCache, DecodeError, Decoder};
pub use encoder::Encoder;
pub use filter::PathFilter;
