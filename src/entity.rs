//! Entity kinds and the relationship table
//!
//! The three entity types and their declared relationships:
//! - `Customer` --reviews--> `Review` (one-to-many)
//! - `Item` --reviews--> `Review` (one-to-many)
//! - `Review` --customer--> `Customer`, --item--> `Item` (many-to-one)
//!
//! Each relationship is stored once (the foreign key columns on `reviews`);
//! both navigation directions are derived from it. This table is the single
//! source of truth the serializer walks and serialize rules are validated
//! against.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three persistent entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A customer who writes reviews
    Customer,
    /// An item that receives reviews
    Item,
    /// A review linking one customer to one item
    Review,
}

/// Cardinality of a declared relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelKind {
    /// Reference to exactly one related entity
    ToOne,
    /// Reference to a variable-size collection of related entities
    ToMany,
}

/// A declared relationship edge from one entity kind to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Relationship name as it appears in serialized output and rule paths
    pub name: &'static str,
    /// To-one or to-many
    pub kind: RelKind,
    /// Entity kind on the far side
    pub target: EntityKind,
}

impl EntityKind {
    /// Get the string representation of the entity kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Item => "item",
            EntityKind::Review => "review",
        }
    }

    /// Table the entity kind is persisted in
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Item => "items",
            EntityKind::Review => "reviews",
        }
    }

    /// Get all entity kinds
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Customer, EntityKind::Item, EntityKind::Review]
    }

    /// Relationships declared on this entity kind
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            EntityKind::Customer => &[Relation {
                name: "reviews",
                kind: RelKind::ToMany,
                target: EntityKind::Review,
            }],
            EntityKind::Item => &[Relation {
                name: "reviews",
                kind: RelKind::ToMany,
                target: EntityKind::Review,
            }],
            EntityKind::Review => &[
                Relation {
                    name: "customer",
                    kind: RelKind::ToOne,
                    target: EntityKind::Customer,
                },
                Relation {
                    name: "item",
                    kind: RelKind::ToOne,
                    target: EntityKind::Item,
                },
            ],
        }
    }

    /// Look up a declared relationship by name
    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations().iter().find(|rel| rel.name == name)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" | "customers" => Ok(EntityKind::Customer),
            "item" | "items" => Ok(EntityKind::Item),
            "review" | "reviews" => Ok(EntityKind::Review),
            _ => Err(Error::InvalidRule(format!("Unknown entity kind: {}", s))),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in EntityKind::all() {
            let s = kind.as_str();
            let parsed: EntityKind = s.parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_entity_kind_table_aliases() {
        assert_eq!(EntityKind::from_str("customers").unwrap(), EntityKind::Customer);
        assert_eq!(EntityKind::from_str("Items").unwrap(), EntityKind::Item);
        assert_eq!(EntityKind::from_str("reviews").unwrap(), EntityKind::Review);
        assert!(EntityKind::from_str("orders").is_err());
    }

    #[test]
    fn test_relation_lookup() {
        let rel = EntityKind::Customer.relation("reviews").unwrap();
        assert_eq!(rel.kind, RelKind::ToMany);
        assert_eq!(rel.target, EntityKind::Review);

        let rel = EntityKind::Review.relation("item").unwrap();
        assert_eq!(rel.kind, RelKind::ToOne);
        assert_eq!(rel.target, EntityKind::Item);

        assert!(EntityKind::Item.relation("customer").is_none());
    }

    #[test]
    fn test_forward_and_back_references_agree() {
        // Every to-many relationship has a to-one counterpart on the far side.
        for rel in EntityKind::Customer.relations() {
            assert!(rel.target.relations().iter().any(|back| {
                back.kind == RelKind::ToOne && back.target == EntityKind::Customer
            }));
        }
    }
}
