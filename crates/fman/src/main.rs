use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

mod cli;
mod command;
mod config;
mod messages;
mod render;
mod repl;
mod shell;

use cli::Cli;
use config::Config;
use shell::Shell;

fn init_tracing(verbose: bool, level: &str) {
    let default = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, &config.log_level);

    let cwd = match &cli.start_dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("cannot start in {}", dir.display()))?,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let color = config.color && !cli.no_color && io::stdout().is_terminal();
    let format = cli.format.unwrap_or(config.diff_format);

    let stdout = io::stdout();
    let mut shell = Shell::new(cwd, config, stdout.lock())
        .with_color(color)
        .with_format(format);

    if !cli.command.is_empty() {
        if !shell.run_once(&cli.command)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    if io::stdin().is_terminal() {
        repl::run_interactive(&mut shell)?;
    } else {
        shell.run(io::stdin().lock())?;
    }
    tracing::debug!(cwd = %shell.cwd().display(), "shell exited");
    Ok(())
}
