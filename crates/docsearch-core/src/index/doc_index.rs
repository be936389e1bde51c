//! SQLite document index for querying search index entries.

use crate::config::{clamp_limit, SearchConfig};
use crate::models::{Category, DocEntry, SearchIndex};
use crate::stats::PageCount;
use crate::{DocSearchError, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::fts5::{FTS5Config, FTS5Manager, FTS5Stats};
use super::query::build_fts5_query;

/// Parameters for [`DocIndex::search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    /// Free text. Empty lists every entry that passes the filters.
    pub text: String,
    /// Only entries with one of these category tags. Empty means any.
    pub categories: Vec<String>,
    /// Only entries on one of these pages. Empty means any.
    pub pages: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            categories: Vec::new(),
            pages: Vec::new(),
            limit: SearchConfig::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.categories.push(category.as_str().to_string());
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.pages.push(page.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One matching entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Position of the entry in the loaded index.
    pub ordinal: usize,
    /// Relevance; higher is better. Zero when no text query was given.
    pub score: f64,
    #[serde(flatten)]
    pub entry: DocEntry,
}

/// Search result from the document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    pub total_count: usize,
    pub query_time_ms: f64,
    /// The FTS5 expression that was run; empty for a listing.
    pub query: String,
}

/// SQLite document index with FTS5 support.
pub struct DocIndex {
    db_path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
    fts5_config: FTS5Config,
}

impl DocIndex {
    /// Create or open a document index at the given path.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| DocSearchError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            ",
        )?;

        Self::from_connection(conn, Some(db_path))
    }

    /// Create a throwaway index held entirely in memory.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA temp_store=MEMORY;")?;
        Self::from_connection(conn, None)
    }

    /// Build an in-memory index already loaded with `index`.
    pub fn from_search_index(index: &SearchIndex) -> Result<Self> {
        let doc_index = Self::in_memory()?;
        doc_index.load(index)?;
        Ok(doc_index)
    }

    fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        Self::ensure_schema(&conn)?;

        let fts5_config = FTS5Config::default();
        FTS5Manager::new(&fts5_config).ensure_setup(&conn)?;

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
            fts5_config,
        })
    }

    /// Ensure the base schema exists.
    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                ordinal INTEGER PRIMARY KEY,
                location TEXT NOT NULL,
                page TEXT NOT NULL,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                category TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_location ON entries(location)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_category ON entries(category)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_page ON entries(page)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DocSearchError::lock_poisoned())
    }

    /// Path of the backing database, `None` for an in-memory index.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Replace the whole content with `index`.
    ///
    /// Runs in one transaction: readers see either the old or the new build.
    pub fn load(&self, index: &SearchIndex) -> Result<()> {
        let start = Instant::now();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM entries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO entries (ordinal, location, page, title, text, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (ordinal, entry) in index.iter().enumerate() {
                stmt.execute(params![
                    ordinal as i64,
                    entry.location,
                    entry.page,
                    entry.title,
                    entry.text,
                    entry.category.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "Loaded {} entries into document index in {:.1}ms",
            index.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Get the entry at `ordinal`.
    pub fn get(&self, ordinal: usize) -> Result<Option<DocEntry>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT ordinal, location, page, title, text, category
                 FROM entries WHERE ordinal = ?1",
                params![ordinal as i64],
                |row| Self::row_to_entry(row).map(|(_, entry)| entry),
            )
            .optional()?;

        Ok(result)
    }

    /// All entries with exactly this location, in index order.
    pub fn by_location(&self, location: &str) -> Result<Vec<DocEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT ordinal, location, page, title, text, category
             FROM entries WHERE location = ?1 ORDER BY ordinal",
        )?;
        let rows = stmt.query_map(params![location], Self::row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.1);
        }
        Ok(entries)
    }

    /// Search entries using FTS5 full-text search.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let start = Instant::now();
        let conn = self.lock()?;

        let limit = clamp_limit(query.limit);
        let fts5_query = build_fts5_query(&query.text);

        let (hits, total_count) = if fts5_query.is_empty() {
            self.search_all(&conn, query, limit)?
        } else {
            self.search_fts5(&conn, &fts5_query, query, limit)?
        };

        let query_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Search {:?} matched {} entries in {:.2}ms",
            query.text, total_count, query_time_ms
        );

        Ok(SearchResult {
            hits,
            total_count,
            query_time_ms,
            query: fts5_query,
        })
    }

    /// List entries in index order, without FTS5.
    fn search_all(
        &self,
        conn: &Connection,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<(Vec<SearchHit>, usize)> {
        let mut where_parts = vec!["1=1".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        push_filters(&mut where_parts, &mut params_vec, query);
        let where_clause = where_parts.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM entries e WHERE {}", where_clause);
        let total_count: usize = {
            let mut stmt = conn.prepare(&count_sql)?;
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            stmt.query_row(params_refs.as_slice(), |row| row.get(0))?
        };

        let sql = format!(
            "SELECT e.ordinal, e.location, e.page, e.title, e.text, e.category, 0.0 \
             FROM entries e WHERE {} ORDER BY e.ordinal LIMIT {} OFFSET {}",
            where_clause, limit, query.offset
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), Self::row_to_hit)?;

        Ok((collect_hits(rows), total_count))
    }

    /// Ranked search using FTS5.
    fn search_fts5(
        &self,
        conn: &Connection,
        fts5_query: &str,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<(Vec<SearchHit>, usize)> {
        let table_name = &self.fts5_config.table_name;

        // The MATCH runs in a subquery so bm25() always sees a full-text cursor.
        let mut where_parts = vec!["1=1".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(fts5_query.to_string())];
        push_filters(&mut where_parts, &mut params_vec, query);
        let where_clause = where_parts.join(" AND ");

        let count_sql = format!(
            "SELECT COUNT(*) FROM (SELECT rowid AS rid FROM {table} WHERE {table} MATCH ?) m \
             JOIN entries e ON e.ordinal = m.rid WHERE {where_clause}",
            table = table_name,
            where_clause = where_clause,
        );

        let total_count: usize = {
            let mut stmt = conn.prepare(&count_sql)?;
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            match stmt.query_row(params_refs.as_slice(), |row| row.get(0)) {
                Ok(count) => count,
                Err(e) => {
                    // FTS5 query may fail - return 0
                    error!("FTS5 count query failed: {}", e);
                    0
                }
            }
        };

        let weights = SearchConfig::BM25_WEIGHTS
            .iter()
            .map(|w| format!("{:?}", w))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT e.ordinal, e.location, e.page, e.title, e.text, e.category, m.score \
             FROM (SELECT rowid AS rid, -bm25({table}, {weights}) AS score \
                   FROM {table} WHERE {table} MATCH ?) m \
             JOIN entries e ON e.ordinal = m.rid \
             WHERE {where_clause} ORDER BY m.score DESC, e.ordinal LIMIT {limit} OFFSET {offset}",
            table = table_name,
            weights = weights,
            where_clause = where_clause,
            limit = limit,
            offset = query.offset,
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = match stmt.query_map(params_refs.as_slice(), Self::row_to_hit) {
            Ok(rows) => rows,
            Err(e) => {
                error!("FTS5 search failed: {}", e);
                return Ok((vec![], 0));
            }
        };

        Ok((collect_hits(rows), total_count))
    }

    /// Convert a row to an (ordinal, entry) pair.
    fn row_to_entry(row: &Row) -> rusqlite::Result<(usize, DocEntry)> {
        let ordinal: i64 = row.get(0)?;
        let category: String = row.get(5)?;
        Ok((
            ordinal as usize,
            DocEntry {
                location: row.get(1)?,
                page: row.get(2)?,
                title: row.get(3)?,
                text: row.get(4)?,
                category: Category::from(category),
            },
        ))
    }

    fn row_to_hit(row: &Row) -> rusqlite::Result<SearchHit> {
        let (ordinal, entry) = Self::row_to_entry(row)?;
        Ok(SearchHit {
            ordinal,
            score: row.get(6)?,
            entry,
        })
    }

    /// Distinct pages with their entry counts, in index order.
    pub fn pages(&self) -> Result<Vec<PageCount>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT page, COUNT(*) FROM entries GROUP BY page ORDER BY MIN(ordinal)",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PageCount {
                page: row.get(0)?,
                entries: row.get(1)?,
            })
        })?;

        let mut pages = Vec::new();
        for row in rows {
            pages.push(row?);
        }
        Ok(pages)
    }

    /// Get the count of entries.
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: usize = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Rebuild the container from the stored entries, in original order.
    pub fn export(&self) -> Result<SearchIndex> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT ordinal, location, page, title, text, category FROM entries ORDER BY ordinal",
        )?;
        let rows = stmt.query_map([], Self::row_to_entry)?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?.1);
        }
        Ok(SearchIndex::new(docs))
    }

    /// Statistics about the FTS5 table.
    pub fn fts5_stats(&self) -> Result<FTS5Stats> {
        let conn = self.lock()?;
        FTS5Manager::new(&self.fts5_config).get_stats(&conn)
    }

    /// Rebuild the FTS5 index.
    pub fn rebuild_fts5(&self) -> Result<()> {
        let conn = self.lock()?;
        FTS5Manager::new(&self.fts5_config).rebuild(&conn)?;
        debug!("Rebuilt FTS5 index");
        Ok(())
    }

    /// Optimize the FTS5 index.
    pub fn optimize_fts5(&self) -> Result<()> {
        let conn = self.lock()?;
        FTS5Manager::new(&self.fts5_config).optimize(&conn)?;
        debug!("Optimized FTS5 index");
        Ok(())
    }

    /// Checkpoint the WAL file.
    pub fn checkpoint_wal(&self) -> Result<()> {
        let conn = self.lock()?;
        // The pragma returns a status row.
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        debug!("Checkpointed WAL");
        Ok(())
    }

    /// Clear all entries from the index.
    pub fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM entries", [])?;
        debug!("Cleared document index");
        Ok(())
    }
}

/// Append category and page filters to a WHERE clause over `entries e`.
fn push_filters(
    where_parts: &mut Vec<String>,
    params_vec: &mut Vec<Box<dyn rusqlite::ToSql>>,
    query: &SearchQuery,
) {
    for (column, values) in [("e.category", &query.categories), ("e.page", &query.pages)] {
        if values.is_empty() {
            continue;
        }
        let placeholders: Vec<_> = values.iter().map(|_| "?").collect();
        where_parts.push(format!("{} IN ({})", column, placeholders.join(",")));
        for value in values {
            params_vec.push(Box::new(value.clone()));
        }
    }
}

fn collect_hits(
    rows: impl Iterator<Item = rusqlite::Result<SearchHit>>,
) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for row in rows {
        match row {
            Ok(hit) => hits.push(hit),
            Err(e) => warn!("Error reading entry row: {}", e),
        }
    }
    hits
}
