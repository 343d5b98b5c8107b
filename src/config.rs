use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::feed::FeedSource;

/// Sample configuration shipped with the crate; `init` writes it out.
pub const SAMPLE_CONFIG: &str = include_str!("../security-feeds.toml");

pub const DEFAULT_CONFIG_FILE: &str = "security-feeds.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub translator: TranslatorSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sources: Vec<FeedSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_items_per_source")]
    pub max_items_per_source: usize,
}

/// Settings for the chat-completion translation service.
///
/// Translation is skipped when either `api_key` or `base_url` is empty.
#[derive(Clone, Serialize, Deserialize)]
pub struct TranslatorSettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_url")]
    pub url: String,

    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default = "default_site_description")]
    pub description: String,

    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file, then apply `.env` and process environment overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Invalid(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(Error::Config("Source name cannot be empty".to_string()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(Error::Config(format!("Duplicate source name: {}", source.name)));
            }

            let url = url::Url::parse(&source.feed_url)
                .map_err(|_| Error::InvalidUrl(source.feed_url.clone()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::InvalidUrl(source.feed_url.clone()));
            }
        }

        if self.translator.max_concurrent == 0 {
            return Err(Error::Config("translator.max_concurrent must be greater than 0".to_string()));
        }

        if self.fetch.max_items_per_source == 0 {
            return Err(Error::Config("fetch.max_items_per_source must be greater than 0".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("LLM_GATEWAY_API_KEY") {
            self.translator.api_key = key;
        }

        if let Some(base_url) = lookup("LLM_GATEWAY_BASE_URL") {
            self.translator.base_url = base_url;
        }

        if let Some(model) = lookup("LLM_GATEWAY_MODEL").filter(|m| !m.is_empty()) {
            self.translator.model = model;
        }

        if let Some(val) = lookup("SECURITY_FEED_MAX_CONCURRENT").and_then(|v| v.parse().ok()) {
            self.translator.max_concurrent = val;
        }

        if let Some(level) = lookup("SECURITY_FEED_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(dir) = lookup("SECURITY_FEED_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
    }

    /// `./security-feeds.toml` when present, otherwise the per-user config file.
    pub fn default_path() -> Result<PathBuf> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("security-feed"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }
}

impl TranslatorSettings {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }
}

impl std::fmt::Debug for TranslatorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_concurrent", &self.max_concurrent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_file", &self.cache_file)
            .finish()
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            max_items_per_source: default_max_items_per_source(),
        }
    }
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            model: default_model(),
            max_concurrent: default_max_concurrent(),
            request_timeout_secs: default_request_timeout(),
            cache_file: default_cache_file(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            title: default_site_title(),
            description: default_site_description(),
            language: default_language(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
            log_file: default_log_file(),
            json_format: false,
        }
    }
}

fn default_user_agent() -> String { "SecurityRSSFeed/1.0".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_max_items_per_source() -> usize { 20 }

fn default_model() -> String { "claude-haiku-4-5".to_string() }
fn default_max_concurrent() -> usize { 5 }
fn default_request_timeout() -> u64 { 60 }
fn default_cache_file() -> PathBuf { PathBuf::from(".cache/translation-cache.json") }

fn default_site_url() -> String { "https://your-username.github.io/security-rss-feed".to_string() }
fn default_site_title() -> String { "セキュリティ情報フィード".to_string() }
fn default_site_description() -> String { "セキュリティ関連記事を収集したRSSフィード".to_string() }
fn default_language() -> String { "ja".to_string() }

fn default_output_dir() -> PathBuf { PathBuf::from("site/security") }

fn default_log_level() -> String { "info".to_string() }
fn default_log_file() -> PathBuf { PathBuf::from("logs/security-feed.log") }
