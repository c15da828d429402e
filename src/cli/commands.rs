use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rq", about = concat!("[>] reqmark v", env!("CARGO_PKG_VERSION"), " - task trees from plain text"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a task document and print its tree
    Parse(FileArgs),
    /// Show one task in detail
    Show(TaskArgs),
    /// Per-task link counts and existence
    Links(FileArgs),
    /// Print the line range owned by an identifier
    Locate(TaskArgs),
    /// Validate link targets and status markers
    Check(FileArgs),
    /// Track a document and report changes as they happen
    Watch(WatchArgs),
}

#[derive(Args)]
pub struct FileArgs {
    /// Task document path
    pub file: PathBuf,
}

#[derive(Args)]
pub struct TaskArgs {
    /// Task document path
    pub file: PathBuf,
    /// Task identifier, e.g. R1.2
    pub id: String,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Task document path
    pub file: PathBuf,
    /// Tick interval in milliseconds (overrides reqmark.toml)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}
