//! Bazaar-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across bazaar:
//!
//! - **Typed IDs**: Integer newtypes for items and categories
//! - **Path Rules**: Accepted image extensions and blob naming constants
//! - **Error Handling**: The error taxonomy shared by the catalog and image stores
//!
//! # Examples
//!
//! ```
//! use bazaar_common::{Error, ItemId, Result};
//! use bazaar_common::paths::is_accepted_image;
//! use std::path::Path;
//!
//! let id: ItemId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! assert!(is_accepted_image(Path::new("bike.jpg")));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("item 42"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::*;
