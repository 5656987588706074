//! # Reviewdb - Relational review data model
//!
//! Three persistent record types - customers, items, reviews - wired
//! together by foreign keys, with cycle-safe nested serialization.
//!
//! Reviewdb provides:
//! - Typed records for the three entities and a static relationship table
//! - SQLite-backed storage with CRUD and relationship queries derived
//!   from the foreign key columns (both navigation directions)
//! - Association-proxy projections (items a customer reviewed, customers
//!   who reviewed an item)
//! - Path-scoped serialization exclusion rules that prune reverse edges
//!   so nested output stays finite despite the cyclic reference graph

pub mod config;
pub mod customer;
pub mod entity;
pub mod item;
pub mod review;
pub mod serialize;
pub mod storage;

// Re-exports for convenient access
pub use customer::Customer;
pub use entity::{EntityKind, RelKind, Relation};
pub use item::Item;
pub use review::Review;
pub use serialize::{SerializeRules, Serializer};
pub use storage::SqliteStore;

/// Result type alias for Reviewdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Reviewdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid serialize rule: {0}")]
    InvalidRule(String),

    #[error("Referenced {0} row {1} no longer exists")]
    RowVanished(&'static str, i64),
}
