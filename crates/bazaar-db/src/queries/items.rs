//! Item database queries.
//!
//! Items are always read joined with their category name. Inserting an item
//! resolves (or creates) its category in the same transaction.

use bazaar_common::{Error, ItemId, Result};
use rusqlite::{Connection, TransactionBehavior};

use crate::models::{Item, NewItem};
use crate::queries::categories;

/// Columns selected by every item read, in the order `parse_item_row` expects.
const ITEM_SELECT: &str = "SELECT items.id, items.name, categories.name, items.image_name
     FROM items
     INNER JOIN categories ON items.category_id = categories.id";

/// Parse an item from a database row.
///
/// Expects columns in order: id, name, category name, image_name.
fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: ItemId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        category: row.get(2)?,
        image: row.get(3)?,
    })
}

/// Escape `LIKE` metacharacters so a keyword matches literally.
///
/// Pair with `ESCAPE '\'` in the query.
pub fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Insert an item, creating its category on first use.
///
/// Runs inside a `BEGIN IMMEDIATE` transaction. If the item insert fails, the
/// transaction is dropped without commit and a category created by this call
/// is rolled back with it.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `item` - Item to insert
///
/// # Returns
///
/// * `Ok(ItemId)` - The id assigned to the new item
/// * `Err(Error)` - If a database error occurs
pub fn insert_item(conn: &mut Connection, item: &NewItem) -> Result<ItemId> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| Error::persistence(e.to_string()))?;

    let category_id = categories::get_or_create_category(&tx, &item.category)?;

    tx.execute(
        "INSERT INTO items (name, category_id, image_name)
         VALUES (:name, :category_id, :image_name)",
        rusqlite::named_params! {
            ":name": &item.name,
            ":category_id": category_id.get(),
            ":image_name": &item.image,
        },
    )
    .map_err(|e| Error::persistence(e.to_string()))?;

    let id = ItemId::from(tx.last_insert_rowid());

    tx.commit().map_err(|e| Error::persistence(e.to_string()))?;

    Ok(id)
}

/// Get an item by ID.
///
/// # Returns
///
/// * `Ok(Some(Item))` - The item if found
/// * `Ok(None)` - If the item does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<Item>> {
    let result = conn.query_row(
        &format!("{ITEM_SELECT} WHERE items.id = :id"),
        rusqlite::named_params! { ":id": id.get() },
        parse_item_row,
    );

    match result {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::persistence(e.to_string())),
    }
}

/// List every item in insertion order.
pub fn list_items(conn: &Connection) -> Result<Vec<Item>> {
    let mut stmt = conn
        .prepare(&format!("{ITEM_SELECT} ORDER BY items.id"))
        .map_err(|e| Error::persistence(e.to_string()))?;

    let items = stmt
        .query_map([], parse_item_row)
        .map_err(|e| Error::persistence(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(items)
}

/// Search items whose name contains `keyword`.
///
/// Uses SQLite `LIKE`, so matching is case-insensitive for ASCII letters.
/// Wildcard characters in the keyword are escaped and match literally.
///
/// # Returns
///
/// * `Ok(Vec<Item>)` - Matching items in insertion order (possibly empty)
/// * `Err(Error)` - If a database error occurs
pub fn search_items(conn: &Connection, keyword: &str) -> Result<Vec<Item>> {
    let pattern = format!("%{}%", escape_like(keyword));

    let mut stmt = conn
        .prepare(&format!(
            "{ITEM_SELECT} WHERE items.name LIKE :pattern ESCAPE '\\' ORDER BY items.id"
        ))
        .map_err(|e| Error::persistence(e.to_string()))?;

    let items = stmt
        .query_map(
            rusqlite::named_params! { ":pattern": &pattern },
            parse_item_row,
        )
        .map_err(|e| Error::persistence(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(items)
}

/// Count item rows.
pub fn count_items(conn: &Connection) -> Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get::<_, i64>(0))
        .map(|count| count as u64)
        .map_err(|e| Error::persistence(e.to_string()))
}
