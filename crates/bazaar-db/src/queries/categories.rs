//! Category database queries.
//!
//! Categories are never created directly by callers; item inserts resolve a
//! category name to its id and create the row on first use.

use bazaar_common::{CategoryId, Error, Result};
use rusqlite::Connection;

use crate::models::Category;

/// Whether an error is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Look up a category id by exact (case-sensitive) name.
///
/// # Returns
///
/// * `Ok(Some(CategoryId))` - If a category with that name exists
/// * `Ok(None)` - If no category has that name
/// * `Err(Error)` - If a database error occurs
pub fn find_category_id(conn: &Connection, name: &str) -> Result<Option<CategoryId>> {
    let result = conn.query_row(
        "SELECT id FROM categories WHERE name = :name",
        rusqlite::named_params! { ":name": name },
        |row| row.get::<_, i64>(0),
    );

    match result {
        Ok(id) => Ok(Some(CategoryId::from(id))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::persistence(e.to_string())),
    }
}

/// Insert a category row.
///
/// If another writer created the same name first, the UNIQUE constraint
/// rejects this insert and the existing id is looked up and returned instead.
pub fn create_category(conn: &Connection, name: &str) -> Result<CategoryId> {
    match conn.execute(
        "INSERT INTO categories (name) VALUES (:name)",
        rusqlite::named_params! { ":name": name },
    ) {
        Ok(_) => Ok(CategoryId::from(conn.last_insert_rowid())),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!(category = name, "category already created, re-resolving");
            find_category_id(conn, name)?.ok_or_else(|| {
                Error::persistence(format!("category {} missing after unique conflict", name))
            })
        }
        Err(e) => Err(Error::persistence(e.to_string())),
    }
}

/// Resolve a category name to its id, creating the category if needed.
pub fn get_or_create_category(conn: &Connection, name: &str) -> Result<CategoryId> {
    match find_category_id(conn, name)? {
        Some(id) => Ok(id),
        None => create_category(conn, name),
    }
}

/// List all categories in creation order.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM categories ORDER BY id")
        .map_err(|e| Error::persistence(e.to_string()))?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: CategoryId::from(row.get::<_, i64>(0)?),
                name: row.get(1)?,
            })
        })
        .map_err(|e| Error::persistence(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(categories)
}

/// Count category rows.
pub fn count_categories(conn: &Connection) -> Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM categories", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|count| count as u64)
    .map_err(|e| Error::persistence(e.to_string()))
}
