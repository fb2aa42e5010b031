//! Rust models matching the catalog schema.

use bazaar_common::{CategoryId, ItemId};
use serde::{Deserialize, Serialize};

/// Category row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Item row joined with its category name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[serde(rename = "image_name")]
    pub image: String,
}

/// Input for inserting a new item.
///
/// `category` is a category name; the row is created if it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub image: String,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image: image.into(),
        }
    }
}
