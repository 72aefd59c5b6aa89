//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `Product` onto the `products` table for the generic repository.
//! - Add the name lookup on top of generic CRUD.
//!
//! # Invariants
//! - `find_by_name(None)` is rejected before any SQL runs.
//! - Name matching is exact under SQLite's default `BINARY` collation:
//!   case-sensitive, no trimming.
//! - A name matching more than one row is an error, never an arbitrary pick.
//!   The reported match count is capped at 2.

use crate::model::product::{Product, ProductId};
use crate::model::validation::{require, ValidationError, PRODUCT_NAME_REQUIRED};
use crate::repo::crud::{CrudRepository, PageQuery, RepoError, RepoResult};
use crate::repo::sqlite_repo::{SqliteRepository, TableMapping};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

/// Repository interface for products: generic CRUD plus lookup by name.
pub trait ProductRepository: CrudRepository<Product, ProductId> {
    /// Finds the single product whose name equals `name` exactly.
    ///
    /// # Errors
    /// - `Validation` with "Product name is required" when `name` is `None`.
    /// - `NonUniqueResult` when more than one product carries `name`.
    fn find_by_name(&self, name: Option<&str>) -> RepoResult<Option<Product>>;
}

impl TableMapping for Product {
    const ENTITY: &'static str = "product";
    const TABLE: &'static str = "products";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["name", "description", "price_cents"];
    const TOUCH_COLUMN: Option<&'static str> = Some("updated_at");

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            self.description.clone().map_or(Value::Null, Value::Text),
            Value::Integer(self.price_cents),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let product = Product {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            description: row.get("description")?,
            price_cents: row.get("price_cents")?,
        };
        product.validate().map_err(|err| {
            RepoError::InvalidData(format!(
                "product {} in products: {err}",
                product.id.unwrap_or_default()
            ))
        })?;
        Ok(product)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Product::validate(self)
    }
}

/// SQLite-backed product repository composed over the generic repository.
pub struct SqliteProductRepository<'conn> {
    inner: SqliteRepository<'conn, Product>,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// Same schema checks as `SqliteRepository::try_new`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            inner: SqliteRepository::try_new(conn)?,
        })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.inner.connection()
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn find_by_name(&self, name: Option<&str>) -> RepoResult<Option<Product>> {
        let name = require(name, "name", PRODUCT_NAME_REQUIRED)?;

        // Two rows are enough to prove the name is not unique.
        let sql = format!(
            "{} WHERE name = ?1 ORDER BY id ASC LIMIT 2;",
            SqliteRepository::<Product>::select_sql()
        );
        let mut matches = self.inner.query_entities(&sql, params![name])?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(RepoError::NonUniqueResult {
                name: name.to_string(),
                matches: count,
            }),
        }
    }
}

impl CrudRepository<Product, ProductId> for SqliteProductRepository<'_> {
    fn save(&self, entity: Product) -> RepoResult<Product> {
        self.inner.save(entity)
    }

    fn save_all(&self, entities: Vec<Product>) -> RepoResult<Vec<Product>> {
        self.inner.save_all(entities)
    }

    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.inner.find_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Product>> {
        self.inner.find_all()
    }

    fn find_all_by_id(&self, ids: &[ProductId]) -> RepoResult<Vec<Product>> {
        self.inner.find_all_by_id(ids)
    }

    fn find_page(&self, page: &PageQuery) -> RepoResult<Vec<Product>> {
        self.inner.find_page(page)
    }

    fn exists_by_id(&self, id: ProductId) -> RepoResult<bool> {
        self.inner.exists_by_id(id)
    }

    fn count(&self) -> RepoResult<u64> {
        self.inner.count()
    }

    fn delete_by_id(&self, id: ProductId) -> RepoResult<()> {
        self.inner.delete_by_id(id)
    }

    fn delete(&self, entity: &Product) -> RepoResult<()> {
        self.inner.delete(entity)
    }

    fn delete_all(&self) -> RepoResult<u64> {
        self.inner.delete_all()
    }
}
