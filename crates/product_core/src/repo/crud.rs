//! Generic CRUD contract shared by every entity repository.
//!
//! # Responsibility
//! - Define the storage-agnostic `CrudRepository<E, Id>` capability.
//! - Define the repository error taxonomy and paging options.
//!
//! # Invariants
//! - `save` is an upsert keyed by identifier: it updates the row matching the
//!   id and inserts a new row when no row matches.
//! - Missing rows on reads are `Ok(None)`; missing rows on deletes are
//!   `RepoError::NotFound`.
//! - Errors are returned to the caller unchanged; nothing is retried here.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PAGE_DEFAULT_LIMIT: u32 = 50;
const PAGE_LIMIT_MAX: u32 = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before reaching storage.
    Validation(ValidationError),
    /// Any failure raised by SQLite, passed through unchanged.
    Db(DbError),
    /// Delete or rename targeted an identifier with no row.
    NotFound { entity: &'static str, id: i64 },
    /// Single-result lookup matched more than one row. `matches` is a lower
    /// bound: lookups stop reading after the second row.
    NonUniqueResult { name: String, matches: usize },
    /// Persisted row could not be decoded into a valid entity.
    InvalidData(String),
    /// Connection has not been migrated to the schema this binary needs.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NonUniqueResult { name, matches } => write!(
                f,
                "expected at most one result for name `{name}`, found at least {matches}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Paging options for identifier-ordered listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Maximum rows to return. Defaults to 50 and clamps to 500.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl PageQuery {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Limit after applying the default and the upper bound.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(PAGE_DEFAULT_LIMIT)
            .min(PAGE_LIMIT_MAX)
    }
}

/// Generic create/read/update/delete capability for one entity type.
///
/// Implementations are stateless gateways: they hold no entity state and do
/// not cache reads.
pub trait CrudRepository<E, Id> {
    /// Updates the row matching the entity's id, or inserts a new row when the
    /// id is unset or matches no row.
    ///
    /// Returns the persisted entity. Inserts always carry a freshly assigned
    /// id, replacing any id the caller set.
    fn save(&self, entity: E) -> RepoResult<E>;
    /// Saves all entities atomically; one failure rolls back the whole batch.
    fn save_all(&self, entities: Vec<E>) -> RepoResult<Vec<E>>;
    fn find_by_id(&self, id: Id) -> RepoResult<Option<E>>;
    /// Returns every entity ordered by id.
    fn find_all(&self) -> RepoResult<Vec<E>>;
    /// Returns the entities that exist among `ids`, ordered by id.
    fn find_all_by_id(&self, ids: &[Id]) -> RepoResult<Vec<E>>;
    fn find_page(&self, page: &PageQuery) -> RepoResult<Vec<E>>;
    fn exists_by_id(&self, id: Id) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes the row with `id`, failing with `NotFound` when absent.
    fn delete_by_id(&self, id: Id) -> RepoResult<()>;
    /// Removes the entity's row. Never-saved entities are a no-op.
    fn delete(&self, entity: &E) -> RepoResult<()>;
    /// Removes every row and returns how many were deleted.
    fn delete_all(&self) -> RepoResult<u64>;
}
