//! Customer record type

use serde::{Deserialize, Serialize};

/// A customer who writes reviews.
///
/// Reviews are not held on the record itself; they are a live query over
/// `reviews.customer_id`, exposed through the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Primary key, assigned by the storage layer on insert
    pub id: i64,
    /// Display name
    pub name: Option<String>,
}

impl Customer {
    /// Create a customer record with a known id
    pub fn new(id: i64, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
        }
    }
}

impl std::fmt::Display for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Customer {}, {}", self.id, self.name.as_deref().unwrap_or("-"))
    }
}
