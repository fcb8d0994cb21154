use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chashav_cli::commands::{add, flags, kavuahs, list, remove};
use chashav_cli::{Cli, Commands, Config, KavuahsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(chashav_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db =
        chashav_db::Database::open(&config.database_path).context("failed to open database")?;
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

    match &cli.command {
        Some(Commands::Add {
            date,
            period,
            secular,
            ignore_flagged,
            ignore_kavuah,
            comments,
        }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            add::run(
                &mut db,
                date,
                (*period).into(),
                *secular,
                *ignore_flagged,
                *ignore_kavuah,
                comments.clone(),
            )?;
        }
        Some(Commands::List { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            list::run(&db, *json)?;
        }
        Some(Commands::Remove { index }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            remove::run(&mut db, *index)?;
        }
        Some(Commands::Kavuahs { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                KavuahsAction::List { json } => kavuahs::list(&db, *json)?,
                KavuahsAction::Suggest => kavuahs::suggest(&db)?,
            }
        }
        Some(Commands::Flags { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            flags::run(&db, *json)?;
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
