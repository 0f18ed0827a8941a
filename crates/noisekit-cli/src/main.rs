//! noisekit CLI
//!
//! Generates X25519 keys, runs exchanges, derives HKDF subkeys and
//! seals/opens AEAD messages from the terminal.

use std::io;

use clap::Parser;
use tracing::debug;

use noisekit_cli::cli::Cli;
use noisekit_cli::commands;
use noisekit_core::config::load_config;
use noisekit_core::tracing_init::init_tracing;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let project_dir = match &cli.project_dir {
        Some(dir) => Some(dir.clone()),
        None => std::env::current_dir().ok(),
    };
    let mut config = load_config(project_dir.as_deref())?;
    cli.apply_overrides(&mut config);

    init_tracing(&config.logging)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        suite = %config.channel.cipher_suite,
        "Starting noisekit"
    );

    let mut out = io::stdout().lock();
    commands::run(cli.command, &config, &mut out)
}
