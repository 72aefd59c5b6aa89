//! Core persistence layer for the product catalog.
//! This crate owns the product data model, its SQLite schema and the
//! repository contracts callers use to reach it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, log_dir_for_store, logging_status, LogLevel};
pub use model::product::{Product, ProductId};
pub use model::validation::{ValidationError, PRODUCT_NAME_REQUIRED};
pub use repo::crud::{CrudRepository, PageQuery, RepoError, RepoResult};
pub use repo::product_repo::{ProductRepository, SqliteProductRepository};
pub use repo::sqlite_repo::{SqliteRepository, TableMapping};
pub use service::product_service::ProductService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
