//! FTS5 virtual table setup and management.

use crate::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

/// Configuration for FTS5 table.
#[derive(Debug, Clone)]
pub struct FTS5Config {
    /// Name of the FTS5 virtual table.
    pub table_name: String,
    /// Tokenizer configuration.
    pub tokenizer: String,
}

impl Default for FTS5Config {
    fn default() -> Self {
        Self {
            table_name: "doc_search".to_string(),
            // `_` stays inside tokens so `spherical_to_cartesian` is one term.
            tokenizer: "unicode61 remove_diacritics 1 tokenchars '_'".to_string(),
        }
    }
}

/// Manager for FTS5 setup and maintenance.
///
/// The virtual table mirrors the `entries` table; its rowid is the entry
/// ordinal and triggers keep the two in sync.
pub struct FTS5Manager<'a> {
    config: &'a FTS5Config,
}

impl<'a> FTS5Manager<'a> {
    /// Create a new FTS5 manager.
    pub fn new(config: &'a FTS5Config) -> Self {
        Self { config }
    }

    /// Check if the FTS5 table exists.
    pub fn table_exists(&self, conn: &Connection) -> Result<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&self.config.table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check if the FTS5 triggers exist.
    pub fn triggers_exist(&self, conn: &Connection) -> Result<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='trigger' AND name IN (?1, ?2, ?3)",
            [
                self.trigger_name("ai"),
                self.trigger_name("au"),
                self.trigger_name("ad"),
            ],
            |row| row.get(0),
        )?;
        Ok(count == 3)
    }

    /// Ensure FTS5 is fully set up.
    pub fn ensure_setup(&self, conn: &Connection) -> Result<()> {
        if !self.table_exists(conn)? {
            self.create_table(conn)?;
            self.populate_from_entries(conn)?;
        } else if !self.triggers_exist(conn)? {
            // Table exists but triggers missing - rows may be stale
            self.populate_from_entries(conn)?;
        }

        self.create_triggers(conn)?;
        Ok(())
    }

    /// Create the FTS5 virtual table.
    pub fn create_table(&self, conn: &Connection) -> Result<()> {
        let sql = format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts5(
                location,
                page,
                title,
                text,
                category UNINDEXED,
                tokenize=\"{}\"
            )",
            self.config.table_name, self.config.tokenizer
        );

        conn.execute(&sql, [])?;
        info!("Created FTS5 table: {}", self.config.table_name);
        Ok(())
    }

    /// Create triggers to keep FTS5 in sync with the entries table.
    pub fn create_triggers(&self, conn: &Connection) -> Result<()> {
        let table = &self.config.table_name;

        let insert_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER INSERT ON entries BEGIN
                INSERT INTO {} (rowid, location, page, title, text, category)
                VALUES (NEW.ordinal, NEW.location, NEW.page, NEW.title, NEW.text, NEW.category);
            END",
            self.trigger_name("ai"),
            table
        );
        conn.execute(&insert_trigger, [])?;

        let update_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER UPDATE ON entries BEGIN
                DELETE FROM {} WHERE rowid = OLD.ordinal;
                INSERT INTO {} (rowid, location, page, title, text, category)
                VALUES (NEW.ordinal, NEW.location, NEW.page, NEW.title, NEW.text, NEW.category);
            END",
            self.trigger_name("au"),
            table,
            table
        );
        conn.execute(&update_trigger, [])?;

        let delete_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER DELETE ON entries BEGIN
                DELETE FROM {} WHERE rowid = OLD.ordinal;
            END",
            self.trigger_name("ad"),
            table
        );
        conn.execute(&delete_trigger, [])?;

        debug!("Created FTS5 triggers for {}", table);
        Ok(())
    }

    /// Populate FTS5 from the existing entries table.
    pub fn populate_from_entries(&self, conn: &Connection) -> Result<()> {
        let table = &self.config.table_name;

        // execute_batch avoids the "returns results" error on DELETE
        conn.execute_batch(&format!("DELETE FROM {};", table))?;

        let sql = format!(
            "INSERT INTO {} (rowid, location, page, title, text, category)
             SELECT ordinal, location, page, title, text, category FROM entries",
            table
        );
        let rows = conn.execute(&sql, [])?;

        info!("Populated FTS5 table with {} entries", rows);
        Ok(())
    }

    /// Rebuild the FTS5 index completely.
    pub fn rebuild(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("DROP TABLE IF EXISTS {}", self.config.table_name),
            [],
        )?;
        for suffix in ["ai", "au", "ad"] {
            conn.execute(
                &format!("DROP TRIGGER IF EXISTS {}", self.trigger_name(suffix)),
                [],
            )?;
        }

        self.create_table(conn)?;
        self.create_triggers(conn)?;
        self.populate_from_entries(conn)?;

        info!("Rebuilt FTS5 index");
        Ok(())
    }

    /// Optimize the FTS5 index.
    pub fn optimize(&self, conn: &Connection) -> Result<()> {
        let sql = format!(
            "INSERT INTO {}({}) VALUES('optimize')",
            self.config.table_name, self.config.table_name
        );
        conn.execute(&sql, [])?;
        debug!("Optimized FTS5 index");
        Ok(())
    }

    /// Get statistics about the FTS5 index.
    pub fn get_stats(&self, conn: &Connection) -> Result<FTS5Stats> {
        let row_count: usize = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.config.table_name),
            [],
            |row| row.get(0),
        )?;

        Ok(FTS5Stats {
            table_name: self.config.table_name.clone(),
            row_count,
            tokenizer: self.config.tokenizer.clone(),
        })
    }

    fn trigger_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.config.table_name, suffix)
    }
}

/// Statistics about an FTS5 index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FTS5Stats {
    pub table_name: String,
    pub row_count: usize,
    pub tokenizer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE entries (
                ordinal INTEGER PRIMARY KEY,
                location TEXT NOT NULL,
                page TEXT NOT NULL,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                category TEXT NOT NULL
            )",
            [],
        )
        .unwrap();
        conn
    }

    fn insert(conn: &Connection, ordinal: i64, title: &str, text: &str) {
        conn.execute(
            "INSERT INTO entries VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                ordinal,
                format!("modules/util.html#{}", title),
                "Utilities",
                title,
                text,
                "method"
            ],
        )
        .unwrap();
    }

    #[test]
    fn test_fts5_setup() {
        let conn = create_test_db();
        let config = FTS5Config::default();
        let manager = FTS5Manager::new(&config);

        assert!(!manager.table_exists(&conn).unwrap());

        manager.ensure_setup(&conn).unwrap();

        assert!(manager.table_exists(&conn).unwrap());
        assert!(manager.triggers_exist(&conn).unwrap());
    }

    #[test]
    fn test_fts5_triggers() {
        let conn = create_test_db();
        let config = FTS5Config::default();
        let manager = FTS5Manager::new(&config);
        manager.ensure_setup(&conn).unwrap();

        insert(&conn, 0, "AstroBase.Util.rad2sec", "rad2sec(rad)");

        let count: usize = conn
            .query_row("SELECT COUNT(*) FROM doc_search", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let rowid: i64 = conn
            .query_row(
                "SELECT rowid FROM doc_search WHERE doc_search MATCH 'rad2sec'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rowid, 0);

        conn.execute(
            "UPDATE entries SET text = 'sec2rad(sec)' WHERE ordinal = 0",
            [],
        )
        .unwrap();
        let hits: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM doc_search WHERE doc_search MATCH 'text:sec2rad'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);

        conn.execute("DELETE FROM entries", []).unwrap();
        assert_eq!(manager.get_stats(&conn).unwrap().row_count, 0);
    }

    #[test]
    fn test_underscore_is_a_token_char() {
        let conn = create_test_db();
        let config = FTS5Config::default();
        FTS5Manager::new(&config).ensure_setup(&conn).unwrap();

        insert(&conn, 0, "AstroBase.Util.spherical_to_cartesian", "");

        let whole: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM doc_search WHERE doc_search MATCH '\"spherical_to_cartesian\"'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(whole, 1);

        let fragment: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM doc_search WHERE doc_search MATCH 'cartesian'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(fragment, 0);
    }

    #[test]
    fn test_fts5_rebuild_repopulates() {
        let conn = create_test_db();
        let config = FTS5Config::default();
        let manager = FTS5Manager::new(&config);
        manager.ensure_setup(&conn).unwrap();

        insert(&conn, 0, "AstroBase.Util.sec2rad", "sec2rad(sec)");
        insert(&conn, 1, "AstroBase.Util.rad2sec", "rad2sec(rad)");

        manager.rebuild(&conn).unwrap();
        manager.optimize(&conn).unwrap();

        assert!(manager.table_exists(&conn).unwrap());
        assert!(manager.triggers_exist(&conn).unwrap());
        assert_eq!(manager.get_stats(&conn).unwrap().row_count, 2);
    }
}
