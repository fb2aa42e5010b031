//! The catalog capability and its SQLite implementation.
//!
//! [`CatalogStore`] is the seam callers depend on. [`SqliteCatalog`] is the
//! production implementation backed by an explicitly passed connection pool;
//! tests can substitute any other implementation of the same contract.

use bazaar_common::{Error, ItemId, Result};

use crate::models::{Item, NewItem};
use crate::pool::{self, get_conn, DbPool};
use crate::queries::items;

/// Durable storage of items and their categories.
pub trait CatalogStore: Send + Sync {
    /// Ensure the schema exists. Idempotent.
    fn initialize(&self) -> Result<()>;

    /// Insert an item, creating its category on first use.
    fn insert(&self, item: &NewItem) -> Result<ItemId>;

    /// Every item joined with its category name, in insertion order.
    fn list_all(&self) -> Result<Vec<Item>>;

    /// A single item, or `Error::NotFound`.
    fn get_by_id(&self, id: ItemId) -> Result<Item>;

    /// Items whose name contains `keyword`.
    fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Item>>;
}

/// Check the required fields of an insert.
pub fn validate_new_item(item: &NewItem) -> Result<()> {
    if item.name.is_empty() {
        return Err(Error::invalid_request("name is required"));
    }
    if item.category.is_empty() {
        return Err(Error::invalid_request("category is required"));
    }
    if item.image.is_empty() {
        return Err(Error::invalid_request("image filename is required"));
    }
    Ok(())
}

/// Check a search keyword.
pub fn validate_keyword(keyword: &str) -> Result<()> {
    if keyword.is_empty() {
        return Err(Error::invalid_request("keyword is required"));
    }
    Ok(())
}

/// SQLite-backed catalog.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    /// Create a catalog over an already initialized pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a catalog and make sure its schema exists.
    pub fn open(pool: DbPool) -> Result<Self> {
        let catalog = Self::new(pool);
        catalog.initialize()?;
        Ok(catalog)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl CatalogStore for SqliteCatalog {
    fn initialize(&self) -> Result<()> {
        pool::prepare_schema(&self.pool)
    }

    fn insert(&self, item: &NewItem) -> Result<ItemId> {
        validate_new_item(item)?;

        let mut conn = get_conn(&self.pool)?;
        let id = items::insert_item(&mut conn, item)?;

        tracing::debug!(
            item_id = %id,
            name = %item.name,
            category = %item.category,
            "inserted item"
        );
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        let conn = get_conn(&self.pool)?;
        items::list_items(&conn)
    }

    fn get_by_id(&self, id: ItemId) -> Result<Item> {
        let conn = get_conn(&self.pool)?;
        items::get_item(&conn, id)?.ok_or_else(|| Error::not_found(format!("item {}", id)))
    }

    fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Item>> {
        validate_keyword(keyword)?;

        let conn = get_conn(&self.pool)?;
        items::search_items(&conn, keyword)
    }
}
