//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cyberlens")]
#[command(about = "CyberLens: scan photos of messages for phishing and scams")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preprocess, OCR and classify an image
    Scan {
        /// Image path, `data:` URL, or `-` for stdin
        image: String,
        /// Preprocessing mode: text-enhance, binarize, adaptive, default
        #[arg(long)]
        mode: Option<String>,
        /// Classify with the local scorer only
        #[arg(long)]
        local: bool,
        /// Do not record the result in history
        #[arg(long)]
        no_history: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify text directly (reads stdin when TEXT is omitted)
    Analyze {
        text: Option<String>,
        #[arg(long)]
        local: bool,
        #[arg(long)]
        no_history: bool,
        #[arg(long)]
        json: bool,
    },
    /// Write the preprocessed version of an image
    Preprocess {
        input: String,
        output: PathBuf,
        #[arg(long)]
        mode: Option<String>,
    },
    /// Show or clear scan history
    History {
        /// Show at most N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Delete all entries
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        json: bool,
    },
    /// Save the remote API key to the OS keychain
    SetKey { key: String },
    /// Check the remote API connection
    TestRemote,
    /// Show the effective configuration
    Status,
}
