//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the generic CRUD contract and entity-specific lookups.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce entity validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `NonUniqueResult`)
//!   in addition to DB transport errors.

pub mod crud;
pub mod product_repo;
pub mod sqlite_repo;
