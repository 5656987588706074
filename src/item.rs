//! Item record type

use serde::{Deserialize, Serialize};

/// An item that receives reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Primary key, assigned by the storage layer on insert
    pub id: i64,
    /// Display name
    pub name: Option<String>,
    /// Unit price
    pub price: Option<f64>,
}

impl Item {
    /// Create an item record with a known id
    pub fn new(id: i64, name: Option<&str>, price: Option<f64>) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
            price,
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item {}, {}", self.id, self.name.as_deref().unwrap_or("-"))?;
        match self.price {
            Some(price) => write!(f, ", {}", price),
            None => write!(f, ", -"),
        }
    }
}
