mod db;
mod models;
mod repository;
mod run;
mod state;
mod ui;
mod validate;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DB_ENV: &str = "EXPENSETRACK_DB";
const LOG_ENV: &str = "EXPENSETRACK_LOG";
const DEFAULT_LOG_FILTER: &str = "expensetrack=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if run::as_info(&args) {
        return Ok(());
    }

    let data_dir = get_data_dir()?;
    init_logging(&data_dir)?;

    let db_path = std::env::var_os(DB_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("expensetrack.db"));
    tracing::info!(path = %db_path.display(), "opening expense store");

    let store = db::ExpenseStore::open(&db_path)?;
    let repository = repository::ExpenseRepository::new(store);
    let mut vm = state::ExpenseViewModel::new(repository, models::DEFAULT_MONTH);
    vm.initialize().await?;

    match args.len() {
        1 => run::as_tui(&mut vm).await,
        2.. => run::as_cli(&args, &mut vm).await,
        _ => {
            eprintln!("Usage: expensetrack [command]");
            Ok(())
        }
    }
}

fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "expensetrack", "ExpenseTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

/// Log to a file in the data directory; the terminal belongs to the TUI.
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("expensetrack.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}
