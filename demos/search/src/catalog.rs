//! In-memory catalog standing in for a search backend

use std::sync::Arc;

/// A fixed list of entries searched by case-insensitive substring.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Arc<[String]>,
}

impl Catalog {
    /// Catalog over the given entries.
    pub fn new<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Entries containing `query`, in catalog order, at most `limit` of them.
    pub fn search(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new([
            "rust", "rustc", "rustup", "rustfmt", "rust-analyzer", "ruby", "python", "tokio",
            "tracing", "serde", "futures", "reqwest", "clap", "chrono", "parking_lot",
        ])
    }
}
