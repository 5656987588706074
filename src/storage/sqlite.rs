//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use super::schema;
use crate::Result;
use crate::customer::Customer;
use crate::item::Item;
use crate::review::Review;

/// SQLite-backed storage for the review data model
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened review database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema and enable foreign key enforcement
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Customer Operations ==========

    /// Insert a customer; the id is assigned by the database
    pub fn create_customer(&self, name: Option<&str>) -> Result<Customer> {
        self.conn
            .execute("INSERT INTO customers (name) VALUES (?1)", params![name])?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created customer {}", id);
        Ok(Customer::new(id, name))
    }

    /// Get a customer by id
    pub fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        self.conn
            .query_row(
                "SELECT id, name FROM customers WHERE id = ?1",
                [id],
                |row| self.row_to_customer(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Update a customer's attributes; returns false if the row is gone
    pub fn update_customer(&self, customer: &Customer) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE customers SET name = ?1 WHERE id = ?2",
            params![customer.name, customer.id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a customer; refused by the storage layer while reviews
    /// still reference it
    pub fn delete_customer(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1", [id])?;
        if changed > 0 {
            tracing::debug!("Deleted customer {}", id);
        }
        Ok(changed > 0)
    }

    /// List all customers in id order
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM customers ORDER BY id")?;
        let customers = stmt
            .query_map([], |row| self.row_to_customer(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(customers)
    }

    /// Count all customers
    pub fn count_customers(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_customer(&self, row: &rusqlite::Row) -> rusqlite::Result<Customer> {
        Ok(Customer {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    // ========== Item Operations ==========

    /// Insert an item; the id is assigned by the database
    pub fn create_item(&self, name: Option<&str>, price: Option<f64>) -> Result<Item> {
        self.conn.execute(
            "INSERT INTO items (name, price) VALUES (?1, ?2)",
            params![name, price],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created item {}", id);
        Ok(Item::new(id, name, price))
    }

    /// Get an item by id
    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        self.conn
            .query_row(
                "SELECT id, name, price FROM items WHERE id = ?1",
                [id],
                |row| self.row_to_item(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Update an item's attributes; returns false if the row is gone
    pub fn update_item(&self, item: &Item) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE items SET name = ?1, price = ?2 WHERE id = ?3",
            params![item.name, item.price, item.id],
        )?;
        Ok(changed > 0)
    }

    /// Delete an item; refused by the storage layer while reviews still
    /// reference it
    pub fn delete_item(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
        if changed > 0 {
            tracing::debug!("Deleted item {}", id);
        }
        Ok(changed > 0)
    }

    /// List all items in id order
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, price FROM items ORDER BY id")?;
        let items = stmt
            .query_map([], |row| self.row_to_item(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(items)
    }

    /// Count all items
    pub fn count_items(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_item(&self, row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
        })
    }

    // ========== Review Operations ==========

    /// Insert a review against an existing customer and item.
    ///
    /// A dangling customer_id or item_id surfaces as the storage layer's
    /// foreign key violation, untranslated.
    pub fn create_review(
        &self,
        comment: Option<&str>,
        customer_id: i64,
        item_id: i64,
    ) -> Result<Review> {
        self.conn.execute(
            "INSERT INTO reviews (comment, customer_id, item_id) VALUES (?1, ?2, ?3)",
            params![comment, customer_id, item_id],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created review {} (customer {}, item {})", id, customer_id, item_id);
        Ok(Review::new(id, comment, customer_id, item_id))
    }

    /// Get a review by id
    pub fn get_review(&self, id: i64) -> Result<Option<Review>> {
        self.conn
            .query_row(
                "SELECT id, comment, customer_id, item_id FROM reviews WHERE id = ?1",
                [id],
                |row| self.row_to_review(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Update a review; repointing customer_id or item_id moves it between
    /// the parents' derived views, which follow the foreign keys
    pub fn update_review(&self, review: &Review) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE reviews SET comment = ?1, customer_id = ?2, item_id = ?3 WHERE id = ?4",
            params![review.comment, review.customer_id, review.item_id, review.id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a review; never cascades to the customer or item
    pub fn delete_review(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1", [id])?;
        if changed > 0 {
            tracing::debug!("Deleted review {}", id);
        }
        Ok(changed > 0)
    }

    /// List all reviews in id order
    pub fn list_reviews(&self) -> Result<Vec<Review>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, comment, customer_id, item_id FROM reviews ORDER BY id")?;
        let reviews = stmt
            .query_map([], |row| self.row_to_review(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(reviews)
    }

    /// Count all reviews
    pub fn count_reviews(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_review(&self, row: &rusqlite::Row) -> rusqlite::Result<Review> {
        Ok(Review {
            id: row.get(0)?,
            comment: row.get(1)?,
            customer_id: row.get(2)?,
            item_id: row.get(3)?,
        })
    }

    // ========== Relationship Queries ==========

    /// Reviews written by a customer, in review id order
    pub fn reviews_for_customer(&self, customer_id: i64) -> Result<Vec<Review>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, comment, customer_id, item_id FROM reviews WHERE customer_id = ?1 ORDER BY id",
        )?;
        let reviews = stmt
            .query_map([customer_id], |row| self.row_to_review(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(reviews)
    }

    /// Reviews received by an item, in review id order
    pub fn reviews_for_item(&self, item_id: i64) -> Result<Vec<Review>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, comment, customer_id, item_id FROM reviews WHERE item_id = ?1 ORDER BY id",
        )?;
        let reviews = stmt
            .query_map([item_id], |row| self.row_to_review(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(reviews)
    }

    /// The customer a review belongs to
    pub fn customer_of(&self, review: &Review) -> Result<Option<Customer>> {
        self.get_customer(review.customer_id)
    }

    /// The item a review belongs to
    pub fn item_of(&self, review: &Review) -> Result<Option<Item>> {
        self.get_item(review.item_id)
    }

    // ========== Association Proxies ==========

    /// Items a customer has reviewed: review.item projected over the
    /// customer's reviews, in review order. Duplicates are preserved -
    /// reviewing an item twice lists it twice.
    pub fn items_for_customer(&self, customer_id: i64) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.id, i.name, i.price FROM reviews r
             JOIN items i ON i.id = r.item_id
             WHERE r.customer_id = ?1 ORDER BY r.id",
        )?;
        let items = stmt
            .query_map([customer_id], |row| self.row_to_item(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(items)
    }

    /// Customers who reviewed an item, symmetric to items_for_customer
    pub fn customers_for_item(&self, item_id: i64) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name FROM reviews r
             JOIN customers c ON c.id = r.customer_id
             WHERE r.item_id = ?1 ORDER BY r.id",
        )?;
        let customers = stmt
            .query_map([item_id], |row| self.row_to_customer(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(customers)
    }

    // ========== Maintenance ==========

    /// Delete all data. Reviews go first so the foreign keys stay satisfied.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM reviews", [])?;
        self.conn.execute("DELETE FROM customers", [])?;
        self.conn.execute("DELETE FROM items", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            customers: self.count_customers()?,
            items: self.count_items()?,
            reviews: self.count_reviews()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub customers: usize,
    pub items: usize,
    pub reviews: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Customers: {}", self.customers)?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Reviews: {}", self.reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (SqliteStore, Customer, Item, Review) {
        let store = SqliteStore::open_in_memory().unwrap();
        let customer = store.create_customer(Some("Ada")).unwrap();
        let item = store.create_item(Some("Widget"), Some(9.99)).unwrap();
        let review = store
            .create_review(Some("Great"), customer.id, item.id)
            .unwrap();
        (store, customer, item, review)
    }

    #[test]
    fn test_customer_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        let customer = store.create_customer(Some("Ada")).unwrap();
        assert!(customer.id > 0);

        let retrieved = store.get_customer(customer.id).unwrap().unwrap();
        assert_eq!(retrieved, customer);

        let renamed = Customer::new(customer.id, Some("Grace"));
        assert!(store.update_customer(&renamed).unwrap());
        assert_eq!(
            store.get_customer(customer.id).unwrap().unwrap().name.as_deref(),
            Some("Grace")
        );

        assert!(store.delete_customer(customer.id).unwrap());
        assert!(store.get_customer(customer.id).unwrap().is_none());
    }

    #[test]
    fn test_item_crud() {
        let store = SqliteStore::open_in_memory().unwrap();

        let item = store.create_item(Some("Widget"), None).unwrap();
        let mut priced = item.clone();
        priced.price = Some(19.99);
        assert!(store.update_item(&priced).unwrap());

        let retrieved = store.get_item(item.id).unwrap().unwrap();
        assert_eq!(retrieved.price, Some(19.99));

        assert!(store.delete_item(item.id).unwrap());
        assert!(store.get_item(item.id).unwrap().is_none());
    }

    #[test]
    fn test_missing_rows_are_none_not_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_customer(42).unwrap().is_none());
        assert!(store.get_item(42).unwrap().is_none());
        assert!(store.get_review(42).unwrap().is_none());
        assert!(!store.delete_review(42).unwrap());
        assert!(store.reviews_for_customer(42).unwrap().is_empty());
    }

    #[test]
    fn test_review_round_trip() {
        let (store, customer, item, review) = seeded_store();

        let read_back = store.get_review(review.id).unwrap().unwrap();
        assert_eq!(store.customer_of(&read_back).unwrap().unwrap().id, customer.id);
        assert_eq!(store.item_of(&read_back).unwrap().unwrap().id, item.id);
    }

    #[test]
    fn test_dangling_review_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let customer = store.create_customer(Some("Ada")).unwrap();

        let result = store.create_review(Some("ghost item"), customer.id, 999);
        assert!(matches!(result, Err(crate::Error::Storage(_))));
    }

    #[test]
    fn test_delete_with_reviews_is_refused() {
        let (store, customer, item, review) = seeded_store();

        assert!(store.delete_customer(customer.id).is_err());
        assert!(store.delete_item(item.id).is_err());

        // Once the review is gone both parents can go.
        assert!(store.delete_review(review.id).unwrap());
        assert!(store.delete_customer(customer.id).unwrap());
        assert!(store.delete_item(item.id).unwrap());
    }

    #[test]
    fn test_bidirectional_consistency() {
        let (store, _, _, _) = seeded_store();

        for review in store.list_reviews().unwrap() {
            let by_customer = store.reviews_for_customer(review.customer_id).unwrap();
            assert!(by_customer.contains(&review));
            let by_item = store.reviews_for_item(review.item_id).unwrap();
            assert!(by_item.contains(&review));
        }
    }

    #[test]
    fn test_association_proxy_order_and_duplicates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let customer = store.create_customer(Some("Ada")).unwrap();
        let widget = store.create_item(Some("Widget"), Some(9.99)).unwrap();
        let gadget = store.create_item(Some("Gadget"), Some(4.50)).unwrap();

        store.create_review(Some("first"), customer.id, widget.id).unwrap();
        store.create_review(Some("second"), customer.id, gadget.id).unwrap();
        store.create_review(Some("again"), customer.id, widget.id).unwrap();

        let projected = store.items_for_customer(customer.id).unwrap();
        let expected: Vec<i64> = store
            .reviews_for_customer(customer.id)
            .unwrap()
            .iter()
            .map(|r| r.item_id)
            .collect();
        let actual: Vec<i64> = projected.iter().map(|i| i.id).collect();
        assert_eq!(actual, expected);
        assert_eq!(actual, vec![widget.id, gadget.id, widget.id]);

        let reviewers = store.customers_for_item(widget.id).unwrap();
        assert_eq!(reviewers.len(), 2);
        assert!(reviewers.iter().all(|c| c.id == customer.id));
    }

    #[test]
    fn test_repointing_review_moves_derived_views() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ada = store.create_customer(Some("Ada")).unwrap();
        let grace = store.create_customer(Some("Grace")).unwrap();
        let item = store.create_item(Some("Widget"), None).unwrap();
        let mut review = store.create_review(Some("Great"), ada.id, item.id).unwrap();

        review.customer_id = grace.id;
        assert!(store.update_review(&review).unwrap());

        assert!(store.reviews_for_customer(ada.id).unwrap().is_empty());
        let moved = store.reviews_for_customer(grace.id).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, review.id);
        assert_eq!(store.customers_for_item(item.id).unwrap()[0].id, grace.id);
    }

    #[test]
    fn test_stats_and_clear() {
        let (store, _, _, _) = seeded_store();

        let stats = store.stats().unwrap();
        assert_eq!(stats.customers, 1);
        assert_eq!(stats.items, 1);
        assert_eq!(stats.reviews, 1);

        store.clear_all().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.customers + stats.items + stats.reviews, 0);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_customer(Some("Ada")).unwrap().id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let customer = reopened.get_customer(id).unwrap().unwrap();
        assert_eq!(customer.name.as_deref(), Some("Ada"));
    }
}
