use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{GiziError, Result};

/// Upper bound on concurrent per-serving fetches against the upstream host
pub const MAX_WORKERS_LIMIT: usize = 8;

/// Global gizi configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream site layout and markup markers
    #[serde(default)]
    pub site: SiteConfig,

    /// Outbound HTTP behaviour
    #[serde(default)]
    pub http: HttpConfig,

    /// Serving-size discovery
    #[serde(default)]
    pub portions: PortionConfig,

    /// How the CLI renders results (never consulted by the scraping core)
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the upstream pages live and which CSS markers identify their parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix for a food page; the slug is appended directly
    #[serde(default = "default_food_path")]
    pub food_path: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
    #[serde(default = "default_search_param")]
    pub search_param: String,
    /// Primary nutrition facts table
    #[serde(default = "default_facts_table")]
    pub facts_table: String,
    /// Tables scanned for serving-size links
    #[serde(default = "default_portion_tables")]
    pub portion_tables: String,
    /// Row marking the serving size the facts are rendered for
    #[serde(default = "default_selected_row")]
    pub selected_row: String,
    #[serde(default = "default_results_table")]
    pub results_table: String,
    /// Free-text description block inside a search result row
    #[serde(default = "default_result_description")]
    pub result_description: String,
}

fn default_base_url() -> String {
    "https://www.fatsecret.co.id".to_string()
}

fn default_food_path() -> String {
    "/kalori-gizi/umum/".to_string()
}

fn default_search_path() -> String {
    "/kalori-gizi/search".to_string()
}

fn default_search_param() -> String {
    "q".to_string()
}

fn default_facts_table() -> String {
    "table.generic.spaced".to_string()
}

fn default_portion_tables() -> String {
    "table.generic".to_string()
}

fn default_selected_row() -> String {
    "tr.selected".to_string()
}

fn default_results_table() -> String {
    "table.generic.searchResult".to_string()
}

fn default_result_description() -> String {
    "div.smallText".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            food_path: default_food_path(),
            search_path: default_search_path(),
            search_param: default_search_param(),
            facts_table: default_facts_table(),
            portion_tables: default_portion_tables(),
            selected_row: default_selected_row(),
            results_table: default_results_table(),
            result_description: default_result_description(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Extra attempts for timeouts, connection failures, 429 and 5xx
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Base delay between attempts; multiplied by the attempt number
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; gizi/0.1)".to_string()
}

fn default_retries() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    250
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortionConfig {
    /// Link texts accepted as serving sizes; anything else on the page is ignored
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Concurrent per-serving fetches (clamped to 1..=8)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_labels() -> Vec<String> {
    [
        "100 gram",
        "1 mangkok",
        "1 porsi",
        "1 tusuk",
        "1 gelas",
        "1 buah",
        "1 potong",
        "1 piring",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_workers() -> usize {
    4
}

impl PortionConfig {
    /// Worker count actually used by the aggregator
    pub fn workers(&self) -> usize {
        self.max_workers.clamp(1, MAX_WORKERS_LIMIT)
    }
}

impl Default for PortionConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            max_workers: default_max_workers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show absent nutrients as zero ("0 kcal", "0 g") instead of leaving them out
    #[serde(default = "default_true")]
    pub fill_missing: bool,
    /// Printed when a food has no facts table
    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,
}

fn default_true() -> bool {
    true
}

fn default_not_found_message() -> String {
    "Makanan tidak terdaftar".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fill_missing: default_true(),
            not_found_message: default_not_found_message(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.portions.labels.is_empty() {
            return Err(GiziError::ConfigError(
                "portions.labels must list at least one serving label".into(),
            ));
        }
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| GiziError::ConfigError(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Supports GIZI_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("GIZI_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "gizi")
            .ok_or_else(|| GiziError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
