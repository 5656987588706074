//! Review record type

use serde::{Deserialize, Serialize};

/// A review linking one customer to one item.
///
/// The two foreign key columns are the only stored form of the
/// customer/item relationships; `customer` and `item` navigation on the
/// storage layer resolves them, and the reverse `reviews` collections on
/// both parents are queries over the same columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Primary key, assigned by the storage layer on insert
    pub id: i64,
    /// Free-form review text
    pub comment: Option<String>,
    /// Foreign key into `customers`
    pub customer_id: i64,
    /// Foreign key into `items`
    pub item_id: i64,
}

impl Review {
    /// Create a review record with a known id
    pub fn new(id: i64, comment: Option<&str>, customer_id: i64, item_id: i64) -> Self {
        Self {
            id,
            comment: comment.map(str::to_string),
            customer_id,
            item_id,
        }
    }
}

impl std::fmt::Display for Review {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Review {}, {}, customer {} -- item {}",
            self.id,
            self.comment.as_deref().unwrap_or("-"),
            self.customer_id,
            self.item_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let review = Review::new(1, Some("Great"), 1, 2);
        assert_eq!(review.to_string(), "Review 1, Great, customer 1 -- item 2");
    }

    #[test]
    fn test_json_shape() {
        let review = Review::new(1, Some("Great"), 1, 1);
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "comment": "Great",
                "customer_id": 1,
                "item_id": 1
            })
        );
    }
}
