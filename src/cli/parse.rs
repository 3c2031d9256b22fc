//! CLI parse: clap types for hashsweep. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hashsweep CLI - checksum manifests for directory trees
#[derive(Debug, Parser)]
#[command(name = "hashsweep", version)]
#[command(about = "Generate checksum manifests and quarantine files that drift from them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hash every file under a directory and write a manifest
    Generate {
        /// Directory to scan (prompted for when omitted)
        directory: Option<PathBuf>,
        /// Manifest output path
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// File name to skip anywhere in the tree (repeatable)
        #[arg(long = "exclude", value_name = "NAME")]
        exclude: Vec<String>,
        /// Relative folder to skip entirely (repeatable)
        #[arg(long = "exclude-folder", value_name = "PREFIX")]
        exclude_folder: Vec<String>,
        /// Skip unreadable files instead of aborting
        #[arg(long)]
        keep_going: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check a directory against a reference manifest and quarantine drift
    Verify {
        /// Directory to scan (prompted for when omitted)
        directory: Option<PathBuf>,
        /// Manifest URL to download
        #[arg(long, conflicts_with = "manifest")]
        url: Option<String>,
        /// Use a local manifest file instead of downloading
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Destination for files whose digest changed
        #[arg(long)]
        outdated_dir: Option<PathBuf>,
        /// Destination for files missing from the manifest
        #[arg(long)]
        unknown_dir: Option<PathBuf>,
        /// File name to skip anywhere in the tree (repeatable)
        #[arg(long = "exclude", value_name = "NAME")]
        exclude: Vec<String>,
        /// Relative folder to skip entirely (repeatable)
        #[arg(long = "exclude-folder", value_name = "PREFIX")]
        exclude_folder: Vec<String>,
        /// Report what would move without touching the tree
        #[arg(long)]
        dry_run: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
