//! Construction of the process-wide storage handles from configuration.

use anyhow::{Context, Result};
use bazaar_db::catalog::SqliteCatalog;
use bazaar_db::pool::init_pool_with;

use crate::config::Config;
use crate::images::ImageStore;
use crate::listing::Marketplace;

/// Open the database pool and the image directory described by `config`.
///
/// Creates the database's parent directory and the image directory if they
/// are missing, applies pending migrations and installs `default.jpg`.
pub fn open_marketplace(config: &Config) -> Result<Marketplace<SqliteCatalog>> {
    let db_path = &config.database.path;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
    }

    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {:?}", db_path))?;
    tracing::debug!("Opening database at {}", db_path_str);
    let pool = init_pool_with(db_path_str, &config.database.pool_options())
        .with_context(|| format!("Failed to open database: {}", db_path_str))?;
    let catalog = SqliteCatalog::new(pool);

    let images = match &config.images.default_image {
        Some(path) => {
            let default = std::fs::read(path)
                .with_context(|| format!("Failed to read default image: {:?}", path))?;
            ImageStore::open_with_default(&config.images.dir, &default)
        }
        None => ImageStore::open(&config.images.dir),
    }
    .with_context(|| format!("Failed to open image directory: {:?}", config.images.dir))?;

    Ok(Marketplace::new(catalog, images))
}
