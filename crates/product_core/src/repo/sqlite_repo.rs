//! SQLite implementation of the generic CRUD contract.
//!
//! # Responsibility
//! - Implement `CrudRepository` once for any entity described by a
//!   `TableMapping`.
//! - Refuse connections whose schema cannot serve the mapping.
//!
//! # Invariants
//! - Write paths call `TableMapping::validate()` before SQL mutations.
//! - Ids come from `AUTOINCREMENT` keys and are read back with
//!   `last_insert_rowid()`.
//! - Listing queries are ordered by id so results are deterministic.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::repo::crud::{CrudRepository, PageQuery, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::collections::HashSet;
use std::marker::PhantomData;

/// Current time as integer epoch milliseconds, evaluated by SQLite.
pub const EPOCH_MILLIS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Describes how one entity type is stored in one SQLite table.
///
/// The id column must be an `INTEGER PRIMARY KEY`.
pub trait TableMapping: Sized {
    /// Entity name used in error messages and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Data columns in the order produced by `column_values`.
    const COLUMNS: &'static [&'static str];
    /// Epoch-millis column refreshed on every update, when the table has one.
    const TOUCH_COLUMN: Option<&'static str> = None;

    fn id(&self) -> Option<i64>;
    fn assign_id(&mut self, id: i64);
    fn column_values(&self) -> Vec<Value>;
    /// Decodes a row selected as `id, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Generic SQLite-backed repository borrowing a migrated connection.
pub struct SqliteRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: TableMapping> SqliteRepository<'conn, E> {
    /// Wraps `conn` after checking that it can serve `E`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema does
    ///   not match the mapping.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema::<E>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// `SELECT id, COLUMNS... FROM TABLE` without a trailing clause.
    pub fn select_sql() -> String {
        format!(
            "SELECT {}, {} FROM {}",
            E::ID_COLUMN,
            E::COLUMNS.join(", "),
            E::TABLE
        )
    }

    /// Runs a query whose projection is `select_sql()` and decodes every row.
    pub fn query_entities<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }

        Ok(entities)
    }

    fn insert(&self, entity: &mut E) -> RepoResult<()> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            E::TABLE,
            E::COLUMNS.join(", ")
        );

        self.conn
            .execute(&sql, params_from_iter(entity.column_values()))?;
        let id = self.conn.last_insert_rowid();
        entity.assign_id(id);

        debug!(
            "event={}_save module=repo status=ok op=insert id={id}",
            E::ENTITY
        );
        Ok(())
    }

    /// Returns `false` when no row carries `id`.
    fn update(&self, id: i64, entity: &E) -> RepoResult<bool> {
        let mut assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>();
        if let Some(touch) = E::TOUCH_COLUMN {
            assignments.push(format!("{touch} = {EPOCH_MILLIS_SQL}"));
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{};",
            E::TABLE,
            assignments.join(", "),
            E::ID_COLUMN,
            E::COLUMNS.len() + 1
        );

        let mut values = entity.column_values();
        values.push(Value::Integer(id));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;

        if changed == 0 {
            return Ok(false);
        }

        debug!(
            "event={}_save module=repo status=ok op=update id={id}",
            E::ENTITY
        );
        Ok(true)
    }
}

impl<E: TableMapping> CrudRepository<E, i64> for SqliteRepository<'_, E> {
    fn save(&self, mut entity: E) -> RepoResult<E> {
        entity.validate()?;

        let updated = match entity.id() {
            Some(id) => self.update(id, &entity)?,
            None => false,
        };
        // An id with no row is inserted under a fresh key; the caller's id is
        // replaced so AUTOINCREMENT keys are never handed out twice.
        if !updated {
            self.insert(&mut entity)?;
        }

        Ok(entity)
    }

    fn save_all(&self, entities: Vec<E>) -> RepoResult<Vec<E>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity)?);
        }
        tx.commit()?;
        Ok(saved)
    }

    fn find_by_id(&self, id: i64) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?1;", Self::select_sql(), E::ID_COLUMN);
        Ok(self.query_entities(&sql, params![id])?.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", Self::select_sql(), E::ID_COLUMN);
        self.query_entities(&sql, [])
    }

    fn find_all_by_id(&self, ids: &[i64]) -> RepoResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "{} WHERE {id} IN ({placeholders}) ORDER BY {id} ASC;",
            Self::select_sql(),
            id = E::ID_COLUMN
        );
        self.query_entities(&sql, params_from_iter(ids.iter()))
    }

    fn find_page(&self, page: &PageQuery) -> RepoResult<Vec<E>> {
        let sql = format!(
            "{} ORDER BY {} ASC LIMIT ?1 OFFSET ?2;",
            Self::select_sql(),
            E::ID_COLUMN
        );
        self.query_entities(
            &sql,
            params![i64::from(page.effective_limit()), i64::from(page.offset)],
        )
    }

    fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            E::TABLE,
            E::ID_COLUMN
        );
        let exists: i64 = self.conn.query_row(&sql, params![id], |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {};", E::TABLE);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn delete_by_id(&self, id: i64) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1;", E::TABLE, E::ID_COLUMN);
        let changed = self.conn.execute(&sql, params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: E::ENTITY,
                id,
            });
        }

        Ok(())
    }

    fn delete(&self, entity: &E) -> RepoResult<()> {
        match entity.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(()),
        }
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let changed = self.conn.execute(&format!("DELETE FROM {};", E::TABLE), [])?;
        Ok(changed as u64)
    }
}

fn ensure_schema<E: TableMapping>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    if actual_version > expected_version {
        return Err(RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: expected_version,
        }));
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [E::TABLE],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", E::TABLE))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;

    for column in std::iter::once(E::ID_COLUMN).chain(E::COLUMNS.iter().copied()) {
        if !present.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }

    Ok(())
}
