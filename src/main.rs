//! pcmloop CLI - Looping PCM Audio Tool
//!
//! Command-line interface for unrolling and splitting looping WAV files.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use pcmloop::cli::commands;
use pcmloop::cli::{Cli, Commands};
use pcmloop::PcmError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("pcmloop v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("pcmloop v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = &result {
        if let Some(pcm_error) = err.downcast_ref::<PcmError>() {
            for suggestion in pcm_error.recovery_suggestions() {
                warn!("{}", suggestion);
            }
        }
    }

    result
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Info {
            input,
            json,
            loop_args,
        } => commands::info(&input, &loop_args, json)
            .with_context(|| format!("Failed to read {}", input.display())),
        Commands::Unroll {
            input,
            output,
            loops,
            fade,
            settings,
            loop_args,
        } => {
            let settings = commands::resolve_settings(settings.as_deref(), loops, fade)
                .context("Invalid render settings")?;
            commands::unroll(&input, &output, &loop_args, settings)
                .with_context(|| format!("Failed to unroll {}", input.display()))
        }
        Commands::Intro {
            input,
            output,
            loop_args,
        } => commands::intro(&input, &output, &loop_args)
            .with_context(|| format!("Failed to extract the intro of {}", input.display())),
        Commands::LoopBody {
            input,
            output,
            loop_args,
        } => commands::loop_body(&input, &output, &loop_args)
            .with_context(|| format!("Failed to extract the loop of {}", input.display())),
    }
}
