pub mod persistent_cache;
pub mod traits;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use persistent_cache::JsonFileStore;
pub use traits::{CacheStore, MemoryStore};

/// A previously computed translation, keyed by article link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub title: String,
    pub content: String,
    pub translated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(title: String, content: String) -> Self {
        Self {
            title,
            content,
            translated_at: Utc::now(),
        }
    }
}

/// link -> translation. Ordered so the persisted document is stable between runs.
pub type TranslationCache = BTreeMap<String, CacheEntry>;
