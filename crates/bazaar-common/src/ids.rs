//! Typed ID wrappers for the catalog's surrogate keys.
//!
//! Both IDs are SQLite `INTEGER PRIMARY KEY` values. The newtypes keep an
//! `ItemId` from being passed where a `CategoryId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Generate a newtype ID wrapper over `i64`.
///
/// The macro produces a struct with:
/// - `get()` returning the raw row id
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`,
///   `Serialize`, `Deserialize`
/// - `Display` and `FromStr` (parse failures are `Error::InvalidRequest`)
/// - `From<i64>` and `Into<i64>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident => $label:literal),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Return the raw row id.
                #[must_use]
                pub fn get(&self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    if s.is_empty() {
                        return Err(Error::invalid_request(concat!($label, " is required")));
                    }
                    s.parse::<i64>().map(Self).map_err(|_| {
                        Error::invalid_request(format!(concat!("invalid ", $label, ": {}"), s))
                    })
                }
            }

            impl From<i64> for $name {
                fn from(id: i64) -> Self {
                    Self(id)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Identifier of a listed item.
    ItemId => "item id",
    /// Identifier of a category row.
    CategoryId => "category id",
}
