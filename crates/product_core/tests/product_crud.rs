use product_core::db::migrations::latest_version;
use product_core::db::{open_db_in_memory, DbError};
use product_core::{
    CrudRepository, PageQuery, Product, ProductRepository, RepoError, SqliteProductRepository,
    PRODUCT_NAME_REQUIRED,
};
use rusqlite::Connection;
use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn save_then_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let product = Product::new("Widget", 1_999).with_description("blue, 10cm");
    let saved = repo.save(product.clone()).unwrap();

    let id = saved.id.unwrap();
    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, Product { id: Some(id), ..product });
}

#[test]
fn inserts_assign_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let first = repo.save(Product::new("Widget", 100)).unwrap();
    let second = repo.save(Product::new("Widget", 100)).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn saving_same_id_twice_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let saved = repo.save(Product::new("Gadget", 500)).unwrap();
    assert_eq!(repo.count().unwrap(), 1);

    let again = repo.save(saved.clone()).unwrap();
    assert_eq!(again, saved);
    assert_eq!(repo.count().unwrap(), 1);

    let mut changed = saved.clone();
    changed.price_cents = 750;
    changed.description = Some("now with batteries".to_string());
    repo.save(changed.clone()).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.find_by_id(saved.id.unwrap()).unwrap(), Some(changed));
}

#[test]
fn save_with_unknown_id_inserts_under_fresh_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("Ghost", 1);
    product.id = Some(42);

    let saved = repo.save(product).unwrap();
    let id = saved.id.unwrap();
    assert_ne!(id, 42);
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.find_by_id(42).unwrap(), None);
    assert_eq!(repo.find_by_id(id).unwrap(), Some(saved));
}

#[test]
fn save_with_unknown_id_never_reuses_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let deleted = repo.save(Product::new("Old", 1)).unwrap();
    repo.delete(&deleted).unwrap();

    let resurrected = repo.save(deleted.clone()).unwrap();
    assert!(resurrected.id.unwrap() > deleted.id.unwrap());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn find_by_id_for_missing_row_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    assert_eq!(repo.find_by_id(999).unwrap(), None);
    assert!(!repo.exists_by_id(999).unwrap());
}

#[test]
fn delete_by_id_removes_exactly_one_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let keep = repo.save(Product::new("Keep", 1)).unwrap();
    let drop = repo.save(Product::new("Drop", 2)).unwrap();
    let drop_id = drop.id.unwrap();
    assert_eq!(repo.count().unwrap(), 2);

    repo.delete_by_id(drop_id).unwrap();

    assert_eq!(repo.find_by_id(drop_id).unwrap(), None);
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.exists_by_id(keep.id.unwrap()).unwrap());
}

#[test]
fn delete_by_id_of_missing_row_fails_fast() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let err = repo.delete_by_id(7).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "product",
            id: 7
        }
    ));
}

#[test]
fn delete_entity_uses_its_id_and_ignores_unsaved_entities() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let saved = repo.save(Product::new("Lamp", 3_000)).unwrap();
    repo.delete(&Product::new("Never saved", 1)).unwrap();
    assert_eq!(repo.count().unwrap(), 1);

    repo.delete(&saved).unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let first = repo.save(Product::new("First", 1)).unwrap();
    repo.delete(&first).unwrap();
    let second = repo.save(Product::new("Second", 1)).unwrap();

    assert!(second.id.unwrap() > first.id.unwrap());
}

#[test]
fn find_all_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let names = ["c", "a", "b"];
    for name in names {
        repo.save(Product::new(name, 10)).unwrap();
    }

    let all = repo.find_all().unwrap();
    let loaded_names: Vec<_> = all.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(loaded_names, names);
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn find_all_by_id_skips_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let a = repo.save(Product::new("a", 1)).unwrap().id.unwrap();
    let b = repo.save(Product::new("b", 1)).unwrap().id.unwrap();

    let found = repo.find_all_by_id(&[b, 12_345, a]).unwrap();
    let ids: Vec<_> = found.iter().map(|item| item.id.unwrap()).collect();
    assert_eq!(ids, vec![a, b]);
    assert!(repo.find_all_by_id(&[]).unwrap().is_empty());
}

#[test]
fn find_page_uses_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    for index in 0..5 {
        repo.save(Product::new(format!("item-{index}"), index)).unwrap();
    }

    let page = repo.find_page(&PageQuery::new(2, 1)).unwrap();
    let names: Vec<_> = page.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["item-1", "item-2"]);

    let tail = repo
        .find_page(&PageQuery {
            offset: 4,
            ..PageQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
}

#[test]
fn save_all_commits_every_entity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let saved = repo
        .save_all(vec![Product::new("one", 1), Product::new("two", 2)])
        .unwrap();

    assert!(saved.iter().all(Product::is_persisted));
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn save_all_rolls_back_on_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let err = repo
        .save_all(vec![Product::new("valid", 1), Product::new("   ", 1)])
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn delete_all_reports_removed_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    repo.save(Product::new("a", 1)).unwrap();
    repo.save(Product::new("b", 1)).unwrap();

    assert_eq!(repo.delete_all().unwrap(), 2);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let err = repo.save(Product::new("", 1)).unwrap_err();
    assert_eq!(err.to_string(), PRODUCT_NAME_REQUIRED);

    let mut saved = repo.save(Product::new("Valid", 1)).unwrap();
    saved.price_cents = -5;
    let err = repo.save(saved).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn corrupted_row_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO products (name, price_cents) VALUES ('', 1);",
        [],
    )
    .unwrap();

    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteProductRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_products_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProductRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("products"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProductRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "products",
            column: "price_cents"
        })
    ));
}

#[test]
fn storage_failures_surface_as_db_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();
    repo.save(Product::new("Widget", 1)).unwrap();

    conn.execute_batch("DROP TABLE products;").unwrap();

    let save_err = repo.save(Product::new("Gadget", 2)).unwrap_err();
    assert!(matches!(save_err, RepoError::Db(DbError::Sqlite(_))));
    assert!(save_err.source().is_some());

    let count_err = repo.count().unwrap_err();
    assert!(matches!(count_err, RepoError::Db(_)));

    let lookup_err = repo.find_by_name(Some("Widget")).unwrap_err();
    assert!(matches!(lookup_err, RepoError::Db(_)));
}

#[test]
fn constraint_violation_on_save_surfaces_as_db_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_widgets BEFORE INSERT ON products
         WHEN NEW.name = 'Widget'
         BEGIN SELECT RAISE(ABORT, 'widgets are blocked'); END;",
    )
    .unwrap();

    let err = repo.save(Product::new("Widget", 1)).unwrap_err();
    match &err {
        RepoError::Db(DbError::Sqlite(source)) => {
            assert!(source.to_string().contains("widgets are blocked"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.source().is_some());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn updates_refresh_updated_at_in_epoch_millis() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut saved = repo.save(Product::new("Clock", 1)).unwrap();
    let id = saved.id.unwrap();
    conn.execute("UPDATE products SET updated_at = 0 WHERE id = ?1;", [id])
        .unwrap();

    saved.price_cents = 2;
    repo.save(saved).unwrap();

    let updated_at: i64 = conn
        .query_row("SELECT updated_at FROM products WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    let now_ms = i64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis(),
    )
    .unwrap();
    assert!((now_ms - updated_at).abs() < 5_000, "updated_at={updated_at} now={now_ms}");
}
