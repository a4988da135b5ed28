use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sisatset_cli::commands::{children, quick, records, status};
use sisatset_cli::refresh::ChangeFeed;
use sisatset_cli::{ChildrenAction, Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(sisatset_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = sisatset_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
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
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut feed = ChangeFeed::new();
    feed.subscribe(|change| tracing::info!(?change, "schedule views are stale"));

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Quick(args)) => {
            let text = quick::read_input(args)?;
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let owner = config.household()?;
            quick::run(&mut stdout, &mut db, &owner, args, &text, &feed)?;
        }
        Some(Commands::Children(action)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let owner = config.household()?;
            match action {
                ChildrenAction::Add { name, grade, color } => {
                    children::add(&mut stdout, &mut db, &owner, name, grade, color, &feed)?;
                }
                ChildrenAction::List { json } => children::list(&mut stdout, &db, &owner, *json)?,
                ChildrenAction::Remove { id } => children::remove(&mut stdout, &mut db, id, &feed)?,
            }
        }
        Some(Commands::List { table, filters }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let owner = config.household()?;
            records::list(&mut stdout, &db, &owner, *table, filters)?;
        }
        Some(Commands::Update { table, id, fields }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            records::update(&mut stdout, &mut db, *table, id, fields, &feed)?;
        }
        Some(Commands::Delete { table, id }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            records::delete(&mut stdout, &mut db, *table, id, &feed)?;
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
