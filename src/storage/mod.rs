//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - customers(id, name)
//! - items(id, name, price)
//! - reviews(id, comment, customer_id, item_id)
//!
//! The review foreign keys are the only stored form of the relationships;
//! every navigation direction (a customer's reviews, an item's reviews, a
//! review's customer/item) is a query over them.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
