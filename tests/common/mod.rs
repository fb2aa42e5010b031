//! Shared test harness for integration tests.
//!
//! Provides [`MemoryCatalog`], an in-process [`CatalogStore`] fake, and
//! [`TestHarness`], which wires a [`Marketplace`] over either the fake or a
//! temporary SQLite database plus a temporary image directory.

#![allow(dead_code)]

use bazaar::images::ImageStore;
use bazaar::listing::Marketplace;
use bazaar_common::{Error, ItemId, Result};
use bazaar_db::catalog::{validate_keyword, validate_new_item, CatalogStore, SqliteCatalog};
use bazaar_db::models::{Item, NewItem};
use bazaar_db::pool::{init_pool, DbPool, PooledConnection};
use parking_lot::Mutex;
use tempfile::TempDir;

struct ItemRow {
    id: i64,
    name: String,
    category_id: i64,
    image: String,
}

/// Categories are indexed by `id - 1`, mirroring AUTOINCREMENT ids.
#[derive(Default)]
struct MemoryState {
    categories: Vec<String>,
    items: Vec<ItemRow>,
}

impl MemoryState {
    fn category_id(&mut self, name: &str) -> i64 {
        let index = match self.categories.iter().position(|c| c == name) {
            Some(index) => index,
            None => {
                self.categories.push(name.to_string());
                self.categories.len() - 1
            }
        };
        index as i64 + 1
    }

    fn joined(&self, row: &ItemRow) -> Result<Item> {
        let category = usize::try_from(row.category_id - 1)
            .ok()
            .and_then(|index| self.categories.get(index))
            .ok_or_else(|| {
                Error::persistence(format!(
                    "item {} references missing category {}",
                    row.id, row.category_id
                ))
            })?;
        Ok(Item {
            id: ItemId::from(row.id),
            name: row.name.clone(),
            category: category.clone(),
            image: row.image.clone(),
        })
    }
}

/// Catalog fake honoring the same contract as [`SqliteCatalog`].
///
/// Keyword search compares ASCII-lowercased names, like SQLite `LIKE`.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<MemoryState>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_count(&self) -> usize {
        self.state.lock().categories.len()
    }

    /// Drop every category, leaving items pointing at nothing.
    pub fn clear_categories(&self) {
        self.state.lock().categories.clear();
    }
}

impl CatalogStore for MemoryCatalog {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn insert(&self, item: &NewItem) -> Result<ItemId> {
        validate_new_item(item)?;

        let mut state = self.state.lock();
        let category_id = state.category_id(&item.category);
        let id = state.items.len() as i64 + 1;
        state.items.push(ItemRow {
            id,
            name: item.name.clone(),
            category_id,
            image: item.image.clone(),
        });
        Ok(ItemId::from(id))
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        let state = self.state.lock();
        state.items.iter().map(|row| state.joined(row)).collect()
    }

    fn get_by_id(&self, id: ItemId) -> Result<Item> {
        let state = self.state.lock();
        state
            .items
            .iter()
            .find(|row| row.id == id.get())
            .ok_or_else(|| Error::not_found(format!("item {}", id)))
            .and_then(|row| state.joined(row))
    }

    fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Item>> {
        validate_keyword(keyword)?;

        let needle = keyword.to_ascii_lowercase();
        let state = self.state.lock();
        state
            .items
            .iter()
            .filter(|row| row.name.to_ascii_lowercase().contains(&needle))
            .map(|row| state.joined(row))
            .collect()
    }
}

/// Marketplace over temporary storage. Dropping the harness removes it.
pub struct TestHarness<C> {
    pub market: Marketplace<C>,
    pub dir: TempDir,
}

impl TestHarness<SqliteCatalog> {
    /// Harness backed by a SQLite file in a temporary directory.
    pub fn sqlite() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("bazaar.sqlite3");
        let pool = init_pool(db_path.to_str().unwrap()).expect("failed to create pool");
        let images = ImageStore::open(dir.path().join("images")).expect("failed to open images");

        Self {
            market: Marketplace::new(SqliteCatalog::new(pool), images),
            dir,
        }
    }

    pub fn db(&self) -> &DbPool {
        self.market.catalog().pool()
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        bazaar_db::pool::get_conn(self.db()).expect("failed to get db connection")
    }
}

impl TestHarness<MemoryCatalog> {
    /// Harness backed by the in-memory catalog fake.
    pub fn memory() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let images = ImageStore::open(dir.path().join("images")).expect("failed to open images");

        Self {
            market: Marketplace::new(MemoryCatalog::new(), images),
            dir,
        }
    }
}

impl<C: CatalogStore> TestHarness<C> {
    /// Number of content-addressed blobs, `default.jpg` excluded.
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.market.images().root())
            .expect("failed to read image dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "default.jpg")
            .count()
    }
}
