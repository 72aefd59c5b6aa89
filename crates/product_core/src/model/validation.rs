//! Input constraints shared by entity writes and repository lookups.
//!
//! # Responsibility
//! - Carry a rejected field together with its user-facing message.
//! - Provide precondition helpers that run before any SQL is issued.
//!
//! # Invariants
//! - `Display` renders the message only, so callers can surface it verbatim.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// User-facing message for a missing or blank product name.
pub const PRODUCT_NAME_REQUIRED: &str = "Product name is required";

/// User-facing message for a negative product price.
pub const PRODUCT_PRICE_NEGATIVE: &str = "Product price must not be negative";

/// Rejected input with the offending field and a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    field: &'static str,
    message: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }

    /// Name of the rejected field or parameter.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Message intended for end users.
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}

impl Error for ValidationError {}

/// Unwraps a required parameter or fails with the given message.
pub fn require<T>(
    value: Option<T>,
    field: &'static str,
    message: &'static str,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::new(field, message))
}
