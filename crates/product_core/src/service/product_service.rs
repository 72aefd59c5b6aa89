//! Product use-case service.
//!
//! # Responsibility
//! - Provide stable catalog entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Repository errors are returned unchanged.

use crate::model::product::{Product, ProductId};
use crate::repo::crud::{CrudRepository, PageQuery, RepoError, RepoResult};
use crate::repo::product_repo::ProductRepository;

/// Use-case service wrapper for product operations.
pub struct ProductService<R: ProductRepository> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and persists a new product, returning it with its id.
    pub fn create_product(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        price_cents: i64,
    ) -> RepoResult<Product> {
        let mut product = Product::new(name, price_cents);
        product.description = description;
        self.repo.save(product)
    }

    /// Updates the product with a matching id, otherwise inserts it as new.
    pub fn save_product(&self, product: Product) -> RepoResult<Product> {
        self.repo.save(product)
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.find_by_id(id)
    }

    /// Looks up one product by exact name.
    ///
    /// `None` is rejected with "Product name is required".
    pub fn find_by_name(&self, name: Option<&str>) -> RepoResult<Option<Product>> {
        self.repo.find_by_name(name)
    }

    /// Lists products in id order, one page at a time.
    pub fn list_products(&self, page: &PageQuery) -> RepoResult<Vec<Product>> {
        self.repo.find_page(page)
    }

    /// Renames an existing product.
    ///
    /// # Contract
    /// - Fails with `NotFound` when `id` has no row. A plain `save` would
    ///   insert a new product instead, so the row is loaded first.
    /// - Other fields keep their persisted values.
    pub fn rename_product(&self, id: ProductId, name: impl Into<String>) -> RepoResult<Product> {
        let mut product = self.repo.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "product",
            id,
        })?;
        product.name = name.into();
        self.repo.save(product)
    }

    pub fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        self.repo.delete_by_id(id)
    }

    pub fn count_products(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
