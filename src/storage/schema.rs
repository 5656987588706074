//! Database schema definitions
//!
//! Foreign key constraints are named fk_<table>_<column>_<referenced_table>
//! so schema diffs stay stable across migrations.

/// SQL to create the customers table
pub const CREATE_CUSTOMERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT
)
"#;

/// SQL to create the items table
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    price REAL
)
"#;

/// SQL to create the reviews table
/// Foreign keys are NOT NULL with no cascade clause: deleting a referenced
/// customer or item is refused while reviews still point at it.
pub const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    comment TEXT,
    customer_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    CONSTRAINT fk_reviews_customer_id_customers
        FOREIGN KEY (customer_id) REFERENCES customers(id),
    CONSTRAINT fk_reviews_item_id_items
        FOREIGN KEY (item_id) REFERENCES items(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_reviews_customer_id ON reviews(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_reviews_item_id ON reviews(item_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CUSTOMERS_TABLE,
        CREATE_ITEMS_TABLE,
        CREATE_REVIEWS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
