//! Centralized configuration for docsearch.
//!
//! Constants for the on-disk index format, query limits and the RPC server.

/// Settings for the generated `search_index.js` file.
pub struct IndexFileConfig;

impl IndexFileConfig {
    /// Variable the documentation generator assigns the payload to.
    pub const VARIABLE_NAME: &'static str = "documenterSearchIndex";
    pub const FILE_NAME: &'static str = "search_index.js";
    pub const BACKUP_SUFFIX: &'static str = "bak";
    /// The single top-level key of the payload object.
    pub const DOCS_KEY: &'static str = "docs";
}

/// Query defaults.
pub struct SearchConfig;

impl SearchConfig {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 500;
    /// bm25 column weights for (location, page, title, text, category).
    pub const BM25_WEIGHTS: [f64; 5] = [0.5, 2.0, 10.0, 1.0, 0.0];
}

/// JSON-RPC server defaults.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 0;
}

/// Clamp a requested result limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, SearchConfig::MAX_LIMIT)
}
