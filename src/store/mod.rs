//! SQLite-backed relational store for namespaced workshop tables.
//!
//! The store owns the `rusqlite` connection the registry's query tools run
//! against. It installs an `initcap` SQL function so query bodies can
//! normalize customer names to canonical capitalization, and it can create
//! and seed the five customer-service tables for a namespace with a small
//! embedded demo dataset.

use std::path::Path;

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use tracing::debug;

use crate::error::{Result, ToolbeltError};
use crate::namespace::Namespace;

/// Capitalize the first letter of each whitespace-delimited word and
/// lowercase the rest. Matches the normalization the workshop queries apply
/// to the customer name parameter.
pub fn initcap(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Wrapper around the SQLite connection the registry executes against
#[derive(Debug)]
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Connection::open(path.as_ref()).map_err(|e| {
            ToolbeltError::UnderlyingStoreUnavailable(format!(
                "failed to open database at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_connection(db)
    }

    /// Open an in-memory store. Used by tests and the demo CLI.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().map_err(|e| {
            ToolbeltError::UnderlyingStoreUnavailable(format!("failed to open in-memory database: {}", e))
        })?;
        Self::from_connection(db)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        install_functions(&db)?;
        Ok(Self { db })
    }

    /// The underlying connection, for query execution
    pub fn connection(&self) -> &Connection {
        &self.db
    }

    /// Create the five workshop tables for a namespace if they do not exist.
    pub fn create_tables(&self, namespace: &Namespace) -> Result<()> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {customers} (
                customer_id TEXT NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {purchases} (
                customer_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                purchase_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {browsing_history} (
                customer_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                action TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {email_logs} (
                customer_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                sent_date TEXT NOT NULL,
                opened INTEGER NOT NULL,
                clicked INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {product_catalog} (
                item_id TEXT NOT NULL,
                description TEXT NOT NULL
            );
            "#,
            customers = namespace.table("customers")?,
            purchases = namespace.table("purchases")?,
            browsing_history = namespace.table("browsing_history")?,
            email_logs = namespace.table("email_logs")?,
            product_catalog = namespace.table("product_catalog")?,
        );

        self.db
            .execute_batch(&ddl)
            .map_err(|e| ToolbeltError::Execution(e.to_string()))?;
        debug!(namespace = %namespace, "created workshop tables");
        Ok(())
    }

    /// Replace the namespace's table contents with the embedded demo dataset.
    pub fn seed_demo(&self, namespace: &Namespace) -> Result<()> {
        self.create_tables(namespace)?;

        let customers = namespace.table("customers")?;
        let purchases = namespace.table("purchases")?;
        let browsing = namespace.table("browsing_history")?;
        let emails = namespace.table("email_logs")?;
        let catalog = namespace.table("product_catalog")?;

        let dml = format!(
            r#"
            BEGIN;

            DELETE FROM {customers};
            INSERT INTO {customers} (customer_id, name) VALUES
                ('C1', 'David Sanchez'),
                ('C2', 'Maria Garcia'),
                ('C3', 'Aiko Tanaka');

            DELETE FROM {purchases};
            INSERT INTO {purchases} (customer_id, item_id, purchase_date) VALUES
                ('C1', 'I1', '2024-01-01'),
                ('C1', 'I2', '2024-03-01'),
                ('C2', 'I3', '2024-02-14'),
                ('C3', 'I1', '2024-04-02');

            DELETE FROM {browsing};
            INSERT INTO {browsing} (customer_id, item_id, action) VALUES
                ('C1', 'I3', 'view'),
                ('C1', 'I2', 'add_to_cart'),
                ('C2', 'I1', 'view'),
                ('C2', 'I4', 'view'),
                ('C3', 'I2', 'view');

            DELETE FROM {emails};
            INSERT INTO {emails} (customer_id, subject, sent_date, opened, clicked) VALUES
                ('C1', 'Your spring picks are here', '2024-03-05', 1, 0),
                ('C1', 'Return confirmation', '2024-03-10', 1, 1),
                ('C2', 'Welcome to the boutique', '2024-02-01', 0, 0),
                ('C3', 'New arrivals this week', '2024-04-05', 1, 0);

            DELETE FROM {catalog};
            INSERT INTO {catalog} (item_id, description) VALUES
                ('I1', 'Leather tote bag with gold hardware'),
                ('I2', 'Silk scarf with hand-rolled edges and floral print'),
                ('I3', 'Cashmere crewneck sweater in navy'),
                ('I4', 'Suede ankle boots with block heel');

            COMMIT;
            "#,
        );

        // A reseed either lands whole or leaves the tables as they were
        if let Err(e) = self.db.execute_batch(&dml) {
            let _ = self.db.execute_batch("ROLLBACK");
            return Err(ToolbeltError::Execution(e.to_string()));
        }
        debug!(namespace = %namespace, "seeded demo dataset");
        Ok(())
    }
}

fn install_functions(db: &Connection) -> Result<()> {
    db.create_scalar_function(
        "initcap",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let s: String = ctx.get(0)?;
            Ok(initcap(&s))
        },
    )
    .map_err(|e| ToolbeltError::UnderlyingStoreUnavailable(format!("failed to install initcap: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace() -> Namespace {
        Namespace::new("marion_test", "email").unwrap()
    }

    #[test]
    fn test_initcap() {
        assert_eq!(initcap("david sanchez"), "David Sanchez");
        assert_eq!(initcap("DAVID SANCHEZ"), "David Sanchez");
        assert_eq!(initcap("David Sanchez"), "David Sanchez");
        assert_eq!(initcap(""), "");
        assert_eq!(initcap("  two  spaces"), "  Two  Spaces");
    }

    #[test]
    fn test_initcap_idempotent() {
        let once = initcap("mArIa gArCiA");
        assert_eq!(initcap(&once), once);
    }

    #[test]
    fn test_initcap_sql_function() {
        let store = SqliteStore::open_in_memory().unwrap();
        let got: String = store
            .connection()
            .query_row("SELECT initcap('david sanchez')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(got, "David Sanchez");
    }

    #[test]
    fn test_create_tables_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ns = namespace();
        store.create_tables(&ns).unwrap();
        store.create_tables(&ns).unwrap();
    }

    #[test]
    fn test_seed_demo_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ns = namespace();
        store.seed_demo(&ns).unwrap();
        store.seed_demo(&ns).unwrap();

        let count: i64 = store
            .connection()
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", ns.table("customers").unwrap()),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_seed_demo_rolls_back_on_failure() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ns = namespace();
        store.seed_demo(&ns).unwrap();

        let customers = ns.table("customers").unwrap();
        store
            .connection()
            .execute(
                &format!("INSERT INTO {} (customer_id, name) VALUES ('C4', 'Test Person')", customers),
                [],
            )
            .unwrap();

        // Break a table reseeded late in the batch so the DML fails mid-way
        let emails = ns.table("email_logs").unwrap();
        store
            .connection()
            .execute_batch(&format!(
                "DROP TABLE {emails};
                 CREATE TABLE {emails} (
                    customer_id TEXT NOT NULL,
                    subject TEXT NOT NULL,
                    sent_date TEXT NOT NULL,
                    opened INTEGER NOT NULL,
                    clicked INTEGER NOT NULL,
                    extra TEXT NOT NULL
                 );",
            ))
            .unwrap();

        assert!(store.seed_demo(&ns).is_err());

        // The earlier customer reseed rolled back with it
        let count: i64 = store
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", customers), [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_open_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolbelt.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.seed_demo(&namespace()).unwrap();
        }

        // Data survives reopening
        let store = SqliteStore::open(&path).unwrap();
        let count: i64 = store
            .connection()
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", namespace().table("purchases").unwrap()),
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_open_unreachable_path() {
        let err = SqliteStore::open("/nonexistent/dir/toolbelt.db").unwrap_err();
        assert!(matches!(err, ToolbeltError::UnderlyingStoreUnavailable(_)));
    }
}
