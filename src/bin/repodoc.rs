//! repodoc CLI
//!
//! Pack file trees into a Markdown document and unpack such documents again.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repodoc::{
    Bundle, ClassifierConfig, Decoder, Encoder, PathFilter, BINARY_STUB,
};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "repodoc")]
#[command(version)]
#[command(about = "Pack file collections into a single Markdown document and back")]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files and directories into a document
    Pack {
        /// Files and directories to pack
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output document file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Document title (default: directory name, or "Uploaded Files")
        #[arg(long)]
        title: Option<String>,

        /// Disable the default path exclusions
        #[arg(long)]
        no_filter: bool,
    },

    /// Extract a document into files
    #[command(visible_alias = "x")]
    Extract {
        /// Document file to extract (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Directory to extract into (default: current directory)
        #[arg(short = 'C', long, default_value = ".")]
        directory: PathBuf,

        /// Skip binary entries instead of writing placeholder files
        #[arg(long)]
        skip_binary: bool,
    },

    /// List the files recorded in a document
    #[command(visible_alias = "t")]
    List {
        /// Document file to list (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Pack {
            inputs,
            output,
            title,
            no_filter,
        } => pack(inputs, output, title, no_filter),
        Commands::Extract {
            input,
            directory,
            skip_binary,
        } => extract(input, directory, skip_binary),
        Commands::List { input, json } => list(input, json),
    }
}

fn setup_tracing(verbose: u8) {
    use tracing_subscriber::fmt;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn pack(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    title: Option<String>,
    no_filter: bool,
) -> Result<()> {
    let filter = if no_filter {
        PathFilter::empty()
    } else {
        PathFilter::default()
    };

    let mut sources: Vec<(String, Vec<u8>)> = Vec::new();
    for input in &inputs {
        if input.is_dir() {
            collect_directory(input, &mut sources)?;
        } else {
            let content = fs::read(input)
                .with_context(|| format!("Failed to read file: {}", input.display()))?;

            let name = input
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", input.display()))?
                .to_string_lossy()
                .to_string();

            sources.push((name, content));
        }
    }

    let title = title.unwrap_or_else(|| default_title(&inputs));
    let bundle = Bundle::from_sources(title, sources, &filter, &ClassifierConfig::default())?;
    info!("packed {} files", bundle.len());

    let document = Encoder::new().encode(&bundle);

    if let Some(output_path) = output {
        fs::write(&output_path, document)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;
    } else {
        print!("{}", document);
    }

    Ok(())
}

/// Collect every file under `dir` as a slash-separated relative path
fn collect_directory(dir: &Path, sources: &mut Vec<(String, Vec<u8>)>) -> Result<()> {
    for entry in walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let content =
            fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;

        let relative = path
            .strip_prefix(dir)
            .map_err(|_| anyhow::anyhow!("Failed to get relative path"))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        sources.push((name, content));
    }

    Ok(())
}

/// A single directory input names the document; anything else is an upload
fn default_title(inputs: &[PathBuf]) -> String {
    if let [only] = inputs {
        if only.is_dir() {
            let resolved = only.canonicalize().unwrap_or_else(|_| only.clone());
            if let Some(name) = resolved.file_name() {
                return name.to_string_lossy().to_string();
            }
        }
    }
    "Uploaded Files".to_string()
}

fn extract(input: Option<PathBuf>, directory: PathBuf, skip_binary: bool) -> Result<()> {
    let document = read_input(input)?;
    let bundle = Decoder::new().decode(&document)?;
    info!("extracting {} files", bundle.len());

    for file in &bundle.files {
        if file.is_binary && skip_binary {
            info!(path = %file.path, "skipped binary entry");
            continue;
        }

        let output_path = directory.join(&file.path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if file.is_binary {
            warn!(path = %file.path, size = file.size_bytes, "original bytes not recoverable, writing placeholder");
            fs::write(&output_path, BINARY_STUB)?;
        } else {
            fs::write(&output_path, &file.content)?;
        }
    }

    Ok(())
}

fn list(input: Option<PathBuf>, json: bool) -> Result<()> {
    let document = read_input(input)?;
    let bundle = Decoder::new().decode(&document)?;

    if json {
        let entries: Vec<serde_json::Value> = bundle
            .files
            .iter()
            .map(|file| {
                serde_json::json!({
                    "path": file.path,
                    "size_bytes": file.size_bytes,
                    "is_binary": file.is_binary,
                    "language": file.language_tag(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for file in &bundle.files {
            let kind = if file.is_binary {
                "binary".to_string()
            } else {
                file.language_tag()
            };
            println!("{}  {}  {}", file.path, kind, file.size_bytes);
        }
    }

    Ok(())
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    if let Some(path) = input {
        fs::read_to_string(&path).with_context(|| format!("Failed to read: {}", path.display()))
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
