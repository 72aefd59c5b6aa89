//! Domain model for the product catalog.
//!
//! # Responsibility
//! - Define canonical data structures persisted by the repository layer.
//! - Own input constraints and their user-facing messages.
//!
//! # Invariants
//! - Every persisted product is identified by a stable `ProductId`.
//! - Deletion is a hard delete; identifiers are still never reused.

pub mod product;
pub mod validation;
