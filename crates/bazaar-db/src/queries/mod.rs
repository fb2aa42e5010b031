//! Database query modules.
//!
//! - categories: Category lookup and on-demand creation
//! - items: Transactional item insert, listing, lookup, and keyword search

pub mod categories;
pub mod items;
