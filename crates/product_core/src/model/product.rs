//! Product domain model.
//!
//! # Responsibility
//! - Define the catalog record persisted in the `products` table.
//! - Validate write-time field constraints.
//!
//! # Invariants
//! - `id` is `None` until the first successful save and never changes after.
//! - Identifiers are assigned by storage and never reused for another product.
//! - `name` is not unique; lookups by name must handle duplicates explicitly.
//!
//! # See also
//! - `repo::product_repo` for the name lookup multiplicity policy.

use crate::model::validation::{ValidationError, PRODUCT_NAME_REQUIRED, PRODUCT_PRICE_NEGATIVE};
use serde::{Deserialize, Serialize};

/// Storage-assigned surrogate key of a product row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ProductId = i64;

/// Catalog product as seen by the repository layer.
///
/// Bookkeeping columns (`created_at`, `updated_at`) live only in SQL and are
/// not part of the value, so two saves of the same fields compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// `None` for products that have not been saved yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in the smallest currency unit (e.g. cents).
    pub price_cents: i64,
}

impl Product {
    /// Creates an unsaved product with no description.
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            price_cents,
        }
    }

    /// Builder-style setter for `description`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns whether this product has been persisted at least once.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks field constraints enforced on every write.
    ///
    /// # Errors
    /// - Blank `name` fails with "Product name is required".
    /// - Negative `price_cents` fails with a price message.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", PRODUCT_NAME_REQUIRED));
        }
        if self.price_cents < 0 {
            return Err(ValidationError::new("price_cents", PRODUCT_PRICE_NEGATIVE));
        }
        Ok(())
    }
}
