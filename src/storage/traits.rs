use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::TranslationCache;

/// Whole-document backing store for the translation cache.
///
/// Read once before any translation and written once after all of them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the full cache. `Ok(None)` means nothing has been stored yet.
    async fn load(&self) -> Result<Option<TranslationCache>>;

    /// Replace the stored cache with `cache`.
    async fn save(&self, cache: &TranslationCache) -> Result<()>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

/// In-process store, used by tests and by `generate --no-cache`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    cache: Option<TranslationCache>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: TranslationCache) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                cache: Some(cache),
                saves: 0,
            }),
        }
    }

    /// Current stored document.
    pub fn snapshot(&self) -> Option<TranslationCache> {
        self.state.lock().cache.clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn load(&self) -> Result<Option<TranslationCache>> {
        Ok(self.state.lock().cache.clone())
    }

    async fn save(&self, cache: &TranslationCache) -> Result<()> {
        let mut state = self.state.lock();
        state.cache = Some(cache.clone());
        state.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
