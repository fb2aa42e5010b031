//! Item submission and catalog browsing.
//!
//! [`Marketplace`] routes a submission's photo through the [`ImageStore`] and
//! records the item in a [`CatalogStore`]. Read paths go straight to the
//! catalog; image lookups fall back to the default image.

use std::path::PathBuf;

use bazaar_common::paths::DEFAULT_IMAGE;
use bazaar_common::{Error, ItemId, Result};
use bazaar_db::catalog::CatalogStore;
use bazaar_db::models::{Item, NewItem};

use crate::images::ImageStore;

/// An item listing as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub category: String,
    /// Photo bytes, or `None` to use the default image.
    pub image: Option<Vec<u8>>,
}

impl Submission {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image: None,
        }
    }

    /// Attach photo bytes.
    pub fn with_image(mut self, image: impl Into<Vec<u8>>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check required fields before anything is written.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_request("name is required"));
        }
        if self.category.is_empty() {
            return Err(Error::invalid_request("category is required"));
        }
        if matches!(&self.image, Some(data) if data.is_empty()) {
            return Err(Error::invalid_request("image data is empty"));
        }
        Ok(())
    }
}

/// Catalog plus image store, wired together for the submission flow.
pub struct Marketplace<C> {
    catalog: C,
    images: ImageStore,
}

impl<C: CatalogStore> Marketplace<C> {
    pub fn new(catalog: C, images: ImageStore) -> Self {
        Self { catalog, images }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// List a new item.
    ///
    /// The photo is stored first (or the default image is referenced), then
    /// the item row is inserted with its category in one transaction.
    pub fn submit(&self, submission: &Submission) -> Result<ItemId> {
        submission.validate()?;

        let image = match &submission.image {
            Some(data) => self.images.store(data)?,
            None => DEFAULT_IMAGE.to_string(),
        };

        let id = self.catalog.insert(&NewItem::new(
            submission.name.as_str(),
            submission.category.as_str(),
            image,
        ))?;

        tracing::info!(item_id = %id, name = %submission.name, "item received");
        Ok(id)
    }

    /// Every listed item.
    pub fn items(&self) -> Result<Vec<Item>> {
        self.catalog.list_all()
    }

    /// A single item by its client-supplied id.
    pub fn item(&self, id: &str) -> Result<Item> {
        let id: ItemId = id.parse()?;
        self.catalog.get_by_id(id)
    }

    /// Items whose name contains `keyword`.
    pub fn search(&self, keyword: &str) -> Result<Vec<Item>> {
        self.catalog.search_by_keyword(keyword)
    }

    /// Filesystem path to serve for an image filename.
    pub fn image_path(&self, filename: &str) -> Result<PathBuf> {
        let path = self.images.resolve_or_default(filename)?;
        tracing::info!(path = %path.display(), "returned image");
        Ok(path)
    }
}
