//! Routine CLI Application
//!
//! Command-line interface for generating, storing and mailing workout
//! routines.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands, ListArgs};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use routine_core::{Config, RoutineServiceBuilder};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        config,
        no_color,
        command,
    } = Args::parse();

    let config = Config::load(config.as_deref()).context("Failed to load configuration")?;

    let service = RoutineServiceBuilder::new(config)
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize routine service")?;

    let cli = Cli::new(service, TerminalRenderer::new(!no_color));

    info!("Routine started");

    match command {
        Some(Generate(args)) => cli.generate(args).await,
        Some(Deliver(args)) => cli.deliver(args).await,
        Some(Show(args)) => cli.show(args).await,
        Some(List(args)) => cli.list(args).await,
        None => cli.list(ListArgs { limit: 20 }).await,
    }
}
