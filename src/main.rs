//! `chatsh` - a conversational shell assistant
//!
//! Reads natural-language tasks, streams a model reply, extracts the first
//! fenced `sh` block, confirms execution, runs it, and feeds the outcome
//! back into the next turn. Missing or invalid configuration exits with
//! status 1 before any conversation begins; everything after that stays
//! inside the loop.

use anyhow::Result;
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::terminal::{TerminalGate, TerminalInput, TerminalOutput};
use chatsh_core::config::Config;
use chatsh_core::error::ChatshError;
use chatsh_core::llm::create_backend;
use chatsh_core::prompt::{detect_shell, system_prompt};
use chatsh_core::TurnCycle;

mod cli;
mod terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.version {
        let blue = Style::new().blue();
        println!(
            "{} v{} ({})",
            blue.apply_to("chatsh"),
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH")
        );
        return Ok(());
    }

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return fail_startup(e),
    };

    if let Some(backend) = &cli.backend {
        config.backend = backend.clone();
    }

    // Explicit startup sequence: detect the shell, build the prompt, then
    // initialize the selected backend before entering the loop.
    let shell_info = detect_shell().await;
    let mut backend = match create_backend(&config, system_prompt(&shell_info)) {
        Ok(backend) => backend,
        Err(e) => return fail_startup(e),
    };
    if let Err(e) = backend.initialize().await {
        return fail_startup(e);
    }

    println!("Welcome to ChatSH. Model: {}\n", config.model_name());

    let mut cycle = TurnCycle::new(
        backend,
        TerminalInput,
        TerminalGate::new(),
        TerminalOutput::new(),
    );
    cycle.run().await
}

fn load_config(cli: &Cli) -> Result<Config, ChatshError> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Report a configuration error and exit with status 1.
fn fail_startup(e: ChatshError) -> Result<()> {
    if matches!(e, ChatshError::ConfigNotFound { .. }) {
        eprintln!("{}", Config::template());
    } else {
        eprintln!("Error: {}", e);
    }
    std::process::exit(1);
}
