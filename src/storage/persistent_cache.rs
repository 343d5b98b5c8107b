use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};
use crate::storage::traits::CacheStore;
use crate::storage::TranslationCache;

/// Translation cache persisted as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    cache_file: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(cache_file: P) -> Self {
        Self {
            cache_file: cache_file.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_file
    }
}

#[async_trait]
impl CacheStore for JsonFileStore {
    async fn load(&self) -> Result<Option<TranslationCache>> {
        let file_content = match fs::read_to_string(&self.cache_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", self.cache_file.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::Cache(format!(
                    "Failed to read cache file '{}': {}",
                    self.cache_file.display(), e
                )))
            }
        };

        let cache: TranslationCache = serde_json::from_str(&file_content)
            .map_err(|e| Error::Cache(format!(
                "Failed to parse cache file '{}': {}",
                self.cache_file.display(), e
            )))?;

        tracing::info!("Loaded translation cache: {} entries", cache.len());
        Ok(Some(cache))
    }

    async fn save(&self, cache: &TranslationCache) -> Result<()> {
        if let Some(dir) = self.cache_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| Error::Cache(format!(
                "Failed to create cache directory '{}': {}",
                dir.display(), e
            )))?;
        }

        let json_content = serde_json::to_string_pretty(cache)?;

        // Write to temporary file first, then rename (atomic operation)
        let temp_file = self.cache_file.with_extension("tmp");
        fs::write(&temp_file, json_content).await.map_err(|e| Error::Cache(format!(
            "Failed to write cache to '{}': {}",
            temp_file.display(), e
        )))?;

        fs::rename(&temp_file, &self.cache_file).await.map_err(|e| Error::Cache(format!(
            "Failed to rename cache file '{}' to '{}': {}",
            temp_file.display(), self.cache_file.display(), e
        )))?;

        tracing::info!("Saved translation cache: {} entries to {}", cache.len(), self.cache_file.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.cache_file.display().to_string()
    }
}
