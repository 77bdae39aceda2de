//! Command-line interface definition

use clap::Parser;
use std::path::PathBuf;

/// ChatSH: natural language in, confirmed sh commands out
#[derive(Parser, Debug)]
#[command(name = "chatsh", disable_version_flag = true)]
pub struct Cli {
    /// Override the configured backend ("openai" or "ollama")
    #[arg(long)]
    pub backend: Option<String>,

    /// Path to an alternative config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print version information
    #[arg(short = 'V', long)]
    pub version: bool,
}
