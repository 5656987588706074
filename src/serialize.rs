//! Cycle-safe nested serialization
//!
//! Serializing an entity walks its declared relationships depth-first and
//! emits a `serde_json::Value` tree. The reference graph is cyclic
//! (Customer -> Review -> Customer, Item -> Review -> Item), so each walk
//! carries two bounds:
//!
//! - Exclusion rules: dotted relationship paths, scoped to where they sit
//!   under the root ("reviews.customer" prunes the customer back-reference
//!   one level inside reviews, nothing else). Validated against the
//!   relationship table when the rule set is built.
//! - An ancestor chain of (kind, id) pairs: an entity already on the chain
//!   is never expanded again, so any rule set terminates on any data.

use serde_json::{Map, Value, json};

use crate::customer::Customer;
use crate::entity::EntityKind;
use crate::item::Item;
use crate::review::Review;
use crate::storage::SqliteStore;
use crate::{Error, Result};

/// Path-scoped exclusion rules for serializing one root entity kind.
#[derive(Debug, Clone)]
pub struct SerializeRules {
    root: EntityKind,
    excluded: Vec<String>,
}

impl SerializeRules {
    /// Build a rule set, resolving every dotted path through the
    /// relationship table. An unknown segment fails fast.
    pub fn new(root: EntityKind, paths: &[&str]) -> Result<Self> {
        for path in paths {
            validate_path(root, path)?;
        }
        Ok(Self {
            root,
            excluded: paths.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// The default rules for each entity kind: prune the reverse edge of
    /// whichever relationship was just expanded.
    pub fn defaults(root: EntityKind) -> Self {
        let excluded: &[&str] = match root {
            EntityKind::Customer => &["reviews.customer"],
            EntityKind::Item => &["reviews.item"],
            EntityKind::Review => &["customer.reviews", "item.reviews"],
        };
        Self {
            root,
            excluded: excluded.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Entity kind these rules serialize
    pub fn root(&self) -> EntityKind {
        self.root
    }

    /// Check whether a dotted path (relative to the root) is pruned
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|p| p == path)
    }
}

/// Resolve each segment of a dotted path as a relationship, starting at
/// `root`.
fn validate_path(root: EntityKind, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidRule("empty rule path".to_string()));
    }
    let mut current = root;
    for segment in path.split('.') {
        match current.relation(segment) {
            Some(rel) => current = rel.target,
            None => {
                return Err(Error::InvalidRule(format!(
                    "{} has no relationship '{}' (in rule '{}')",
                    current, segment, path
                )));
            }
        }
    }
    Ok(())
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Walks entities out of a store into nested JSON values.
pub struct Serializer<'a> {
    store: &'a SqliteStore,
}

impl<'a> Serializer<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Serialize a customer with the default rules
    pub fn customer_to_value(&self, customer: &Customer) -> Result<Value> {
        self.customer_to_value_with(customer, &SerializeRules::defaults(EntityKind::Customer))
    }

    /// Serialize a customer with an explicit rule set
    pub fn customer_to_value_with(
        &self,
        customer: &Customer,
        rules: &SerializeRules,
    ) -> Result<Value> {
        check_root(rules, EntityKind::Customer)?;
        let mut chain = vec![(EntityKind::Customer, customer.id)];
        self.walk_customer(customer, "", rules, &mut chain)
    }

    /// Serialize an item with the default rules
    pub fn item_to_value(&self, item: &Item) -> Result<Value> {
        self.item_to_value_with(item, &SerializeRules::defaults(EntityKind::Item))
    }

    /// Serialize an item with an explicit rule set
    pub fn item_to_value_with(&self, item: &Item, rules: &SerializeRules) -> Result<Value> {
        check_root(rules, EntityKind::Item)?;
        let mut chain = vec![(EntityKind::Item, item.id)];
        self.walk_item(item, "", rules, &mut chain)
    }

    /// Serialize a review with the default rules
    pub fn review_to_value(&self, review: &Review) -> Result<Value> {
        self.review_to_value_with(review, &SerializeRules::defaults(EntityKind::Review))
    }

    /// Serialize a review with an explicit rule set
    pub fn review_to_value_with(&self, review: &Review, rules: &SerializeRules) -> Result<Value> {
        check_root(rules, EntityKind::Review)?;
        let mut chain = vec![(EntityKind::Review, review.id)];
        self.walk_review(review, "", rules, &mut chain)
    }

    fn walk_customer(
        &self,
        customer: &Customer,
        prefix: &str,
        rules: &SerializeRules,
        chain: &mut Vec<(EntityKind, i64)>,
    ) -> Result<Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), json!(customer.id));
        map.insert("name".to_string(), json!(customer.name));

        let path = join_path(prefix, "reviews");
        if !rules.is_excluded(&path) {
            let mut nested = Vec::new();
            for review in self.store.reviews_for_customer(customer.id)? {
                if chain.contains(&(EntityKind::Review, review.id)) {
                    continue;
                }
                chain.push((EntityKind::Review, review.id));
                let value = self.walk_review(&review, &path, rules, chain)?;
                chain.pop();
                nested.push(value);
            }
            map.insert("reviews".to_string(), Value::Array(nested));
        }
        Ok(Value::Object(map))
    }

    fn walk_item(
        &self,
        item: &Item,
        prefix: &str,
        rules: &SerializeRules,
        chain: &mut Vec<(EntityKind, i64)>,
    ) -> Result<Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), json!(item.id));
        map.insert("name".to_string(), json!(item.name));
        map.insert("price".to_string(), json!(item.price));

        let path = join_path(prefix, "reviews");
        if !rules.is_excluded(&path) {
            let mut nested = Vec::new();
            for review in self.store.reviews_for_item(item.id)? {
                if chain.contains(&(EntityKind::Review, review.id)) {
                    continue;
                }
                chain.push((EntityKind::Review, review.id));
                let value = self.walk_review(&review, &path, rules, chain)?;
                chain.pop();
                nested.push(value);
            }
            map.insert("reviews".to_string(), Value::Array(nested));
        }
        Ok(Value::Object(map))
    }

    fn walk_review(
        &self,
        review: &Review,
        prefix: &str,
        rules: &SerializeRules,
        chain: &mut Vec<(EntityKind, i64)>,
    ) -> Result<Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), json!(review.id));
        map.insert("comment".to_string(), json!(review.comment));
        map.insert("customer_id".to_string(), json!(review.customer_id));
        map.insert("item_id".to_string(), json!(review.item_id));

        let path = join_path(prefix, "customer");
        if !rules.is_excluded(&path)
            && !chain.contains(&(EntityKind::Customer, review.customer_id))
        {
            let customer = self
                .store
                .customer_of(review)?
                .ok_or(Error::RowVanished("customer", review.customer_id))?;
            chain.push((EntityKind::Customer, customer.id));
            let value = self.walk_customer(&customer, &path, rules, chain)?;
            chain.pop();
            map.insert("customer".to_string(), value);
        }

        let path = join_path(prefix, "item");
        if !rules.is_excluded(&path) && !chain.contains(&(EntityKind::Item, review.item_id)) {
            let item = self
                .store
                .item_of(review)?
                .ok_or(Error::RowVanished("item", review.item_id))?;
            chain.push((EntityKind::Item, item.id));
            let value = self.walk_item(&item, &path, rules, chain)?;
            chain.pop();
            map.insert("item".to_string(), value);
        }

        Ok(Value::Object(map))
    }
}

fn check_root(rules: &SerializeRules, expected: EntityKind) -> Result<()> {
    if rules.root() != expected {
        return Err(Error::InvalidRule(format!(
            "rules built for {} used to serialize {}",
            rules.root(),
            expected
        )));
    }
    Ok(())
}
