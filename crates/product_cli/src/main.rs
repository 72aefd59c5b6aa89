//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `product_core` linkage and storage bootstrap from a binary.
//! - Start file logging before the store is opened.
//! - Keep stdout deterministic for quick local sanity checks.

use clap::Parser;
use product_core::db::{open_db, open_db_in_memory};
use product_core::{
    init_logging, log_dir_for_store, CrudRepository, LogLevel, ProductRepository,
    SqliteProductRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

const MEMORY_LOG_DIR_NAME: &str = "product-store-logs";

#[derive(Debug, Parser)]
#[command(name = "product_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Opens a product store and prints a short health report")]
struct Args {
    /// SQLite file to open; an in-memory store is used when omitted
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Absolute log directory; defaults to `logs/` beside the database
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, default_value = product_core::default_log_level())]
    log_level: LogLevel,
}

impl Args {
    fn resolved_log_dir(&self) -> std::io::Result<PathBuf> {
        match (&self.log_dir, &self.db) {
            (Some(dir), _) => Ok(dir.clone()),
            (None, Some(db)) => log_dir_for_store(db),
            (None, None) => Ok(std::env::temp_dir().join(MEMORY_LOG_DIR_NAME)),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("product_core ping={}", product_core::ping());
    println!("product_core version={}", product_core::core_version());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = args.resolved_log_dir()?;
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| format!("log directory `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(args.log_level.as_str(), log_dir)?;

    let conn = match args.db.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteProductRepository::try_new(&conn)?;

    println!("products count={}", repo.count()?);
    if let Err(err) = repo.find_by_name(None) {
        println!("find_by_name(None) rejected: {err}");
    }
    Ok(())
}
