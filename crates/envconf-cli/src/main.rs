//! envconf CLI
//!
//! Command-line interface for environment-aware configuration and secrets.

mod builder;
mod cli;
mod commands;
mod error;
mod manifest;

use std::path::Path;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd, &cli.manifest, cli.env.as_deref(), &cli.context),
        None => {
            // No command provided - show help hint
            println!(
                "{} Environment-aware configuration and secrets",
                "envconf".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "envconf --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(
    cmd: Commands,
    manifest_path: &str,
    env: Option<&str>,
    context: &[String],
) -> Result<()> {
    // completions need no manifest
    if let Commands::Completions { shell } = cmd {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    let manifest = manifest::Manifest::load(Path::new(manifest_path))?;

    // usage trigger: report declarations without touching the network
    // or validating the environment
    if std::env::var(envconf_vars::USAGE_TRIGGER_VAR).is_ok() {
        let vars = builder::declare_vars(&manifest)?;
        println!("{}", vars.usage());
        return Ok(());
    }

    match cmd {
        Commands::Get {
            category,
            section,
            key,
            default,
        } => {
            let runtime = build_runtime(&manifest, env, context)?;
            commands::run_get(
                &runtime,
                &category,
                section.as_deref(),
                key.as_deref(),
                default.as_deref(),
            )
        }
        Commands::Dump { category } => {
            let runtime = build_runtime(&manifest, env, context)?;
            commands::run_dump(&runtime, category.as_deref())
        }
        Commands::Vars { usage } => {
            if usage {
                let vars = builder::declare_vars(&manifest)?;
                println!("{}", vars.usage());
                Ok(())
            } else {
                let vars = builder::build_vars(&manifest, env)?;
                commands::run_vars(&vars, false)
            }
        }
        Commands::Check => {
            let runtime = build_runtime(&manifest, env, context)?;
            commands::run_check(&runtime)
        }
        // handled before the manifest load
        Commands::Completions { .. } => Ok(()),
    }
}

fn build_runtime(
    manifest: &manifest::Manifest,
    env: Option<&str>,
    context: &[String],
) -> Result<builder::Runtime> {
    let runtime = builder::build(manifest, env, context)?;
    if std::env::var(envconf_vars::DUMP_TRIGGER_VAR).is_ok() {
        println!("{}", runtime.vars.dump());
    }
    Ok(runtime)
}
