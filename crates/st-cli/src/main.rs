use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::{export, heatmap, import, log, serve, stats, status, toggle};
use st_cli::{Cli, Commands, Config, LogAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(st_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = st_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Stats { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            stats::run(&mut stdout, &db, *json)?;
        }
        Some(Commands::Heatmap { year, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let year = year.unwrap_or_else(|| Local::now().year());
            heatmap::run(&mut stdout, &db, year, *json)?;
        }
        Some(Commands::Log { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                LogAction::List { limit } => log::list(&mut stdout, &db, *limit)?,
                LogAction::Add { date, minutes } => log::add(&mut stdout, &db, *date, *minutes)?,
                LogAction::Deduct { date, minutes } => {
                    log::deduct(&mut stdout, &mut db, *date, *minutes)?;
                }
                LogAction::Edit { id, minutes } => log::edit(&mut stdout, &db, *id, *minutes)?,
                LogAction::Delete { id } => log::delete(&mut stdout, &db, *id)?,
            }
        }
        Some(Commands::Export { output }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            export::run(&mut stdout, &db, output.as_deref())?;
        }
        Some(Commands::Import { file }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            import::run(&mut stdout, &db, file)?;
        }
        Some(Commands::Serve) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(serve::run(db, config.listen_addr))?;
        }
        Some(Commands::Toggle) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(toggle::run(&mut stdout, config.listen_addr))?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
