//! Bazaar-DB: Catalog schema, migrations, and query operations
//!
//! This crate provides the item/category persistence layer for bazaar using
//! SQLite with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//! - `catalog` - The `CatalogStore` capability and its SQLite implementation
//!
//! # Example
//!
//! ```no_run
//! use bazaar_db::catalog::{CatalogStore, SqliteCatalog};
//! use bazaar_db::models::NewItem;
//! use bazaar_db::pool::init_pool;
//!
//! let pool = init_pool("/var/lib/bazaar/db.sqlite3").unwrap();
//! let catalog = SqliteCatalog::new(pool);
//!
//! let id = catalog.insert(&NewItem::new("Bike", "Sports", "default.jpg")).unwrap();
//! let item = catalog.get_by_id(id).unwrap();
//! println!("Listed {} in {}", item.name, item.category);
//! ```

pub mod catalog;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
