//! Command-line front end for report searches and catalog lookups.
//!
//! # Responsibility
//! - Open the reporting store, run one command and print `{status, body}`.
//!
//! # Invariants
//! - Search failures print the caller-safe message only.
//! - Logging is enabled only when a log directory is configured.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use sisri_core::{
    init_logging, open_db, open_db_in_memory, CatalogService, LogConfig, SearchRequest,
    SearchService, SqliteCatalogStore, SqliteSearchStore,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "sisri")]
#[clap(about = "Disaster-impact report search over a SISRI SQLite store")]
struct Args {
    /// SQLite database file; an empty in-memory store when omitted
    #[clap(long, env = "SISRI_DB")]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[clap(long, env = "SISRI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[clap(long, env = "SISRI_LOG_DIR")]
    log_dir: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a search request read as JSON from stdin or `--request`
    Search {
        #[clap(long)]
        request: Option<PathBuf>,
    },
    /// Municipality summary by id
    Municipality { id: i64 },
    /// Active condition, limitation and disposition options
    Options,
    /// Families whose surnames contain the term
    Families {
        #[clap(default_value = "")]
        term: String,
    },
    /// Grid-cell overview by exact code
    Grid { code: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let config = LogConfig::new(args.log_level.as_deref(), log_dir)?;
        init_logging(&config)?;
    }

    let conn = match args.db.as_ref() {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };

    let (status, body) = match args.command {
        Command::Search { request } => {
            let raw = read_request(request.as_ref())?;
            let request: SearchRequest =
                serde_json::from_str(&raw).context("search request is not valid JSON")?;
            let service = SearchService::new(SqliteSearchStore::try_new(&conn)?);
            match service.search(&request) {
                Ok(response) => (response.status_code(), serde_json::to_value(&response)?),
                Err(err) => (err.status_code(), json!({ "error": err.public_message() })),
            }
        }
        Command::Municipality { id } => {
            let service = CatalogService::new(SqliteCatalogStore::try_new(&conn)?);
            found_or_404(service.municipality_summary(id)?, "municipality not found")?
        }
        Command::Options => {
            let service = CatalogService::new(SqliteCatalogStore::try_new(&conn)?);
            (200, serde_json::to_value(service.resident_options()?)?)
        }
        Command::Families { term } => {
            let service = CatalogService::new(SqliteCatalogStore::try_new(&conn)?);
            (200, serde_json::to_value(service.search_families(&term)?)?)
        }
        Command::Grid { code } => {
            let service = CatalogService::new(SqliteCatalogStore::try_new(&conn)?);
            found_or_404(service.grid_cell_overview(&code)?, "grid cell not found")?
        }
    };

    info!("event=cli_exit module=cli status_code={status}");
    println!("{}", json!({ "status": status, "body": body }));
    Ok(())
}

fn read_request(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request `{}`", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read request from stdin")?;
            Ok(raw)
        }
    }
}

fn found_or_404<T: Serialize>(value: Option<T>, message: &str) -> Result<(u16, JsonValue)> {
    Ok(match value {
        Some(value) => (200, serde_json::to_value(value)?),
        None => (404, json!({ "error": message })),
    })
}
