//! Configuration types and loader
//!
//! A config file has a `paging` section for the mediator and an optional
//! `source` section describing an HTTP endpoint to page through.
//!
//! ```yaml
//! paging:
//!   page_size: 25
//!   load_offset: 3
//! source:
//!   base_url: https://api.example.com
//!   path: /v1/items
//!   records_path: data.items
//!   total_path: meta.total
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::mediator::DEFAULT_LOAD_OFFSET;
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediatorConfig {
    /// Mediator settings
    #[serde(default)]
    pub paging: PagingConfig,

    /// HTTP endpoint to fetch pages from
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

// ============================================================================
// Paging
// ============================================================================

/// Mediator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Items before the end at which the next page is requested
    #[serde(default = "default_load_offset")]
    pub load_offset: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            load_offset: default_load_offset(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_load_offset() -> usize {
    DEFAULT_LOAD_OFFSET
}

// ============================================================================
// Source
// ============================================================================

/// HTTP endpoint serving offset/limit pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL (e.g., "https://api.example.com")
    pub base_url: String,

    /// Path appended to the base URL
    #[serde(default)]
    pub path: String,

    /// Query parameter carrying the 1-based page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Dotted path to the item array in the response body
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Dotted path to the total item count in the response body
    #[serde(default = "default_total_path")]
    pub total_path: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Query parameters sent with every request
    #[serde(default)]
    pub query: StringMap,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Create a source config with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: String::new(),
            page_param: default_page_param(),
            limit_param: default_limit_param(),
            records_path: default_records_path(),
            total_path: default_total_path(),
            headers: StringMap::new(),
            query: StringMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the request path
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set where items and the total count live in the response
    #[must_use]
    pub fn paths(mut self, records_path: impl Into<String>, total_path: impl Into<String>) -> Self {
        self.records_path = records_path.into();
        self.total_path = total_path.into();
        self
    }

    /// Set the page and limit parameter names
    #[must_use]
    pub fn params(mut self, page_param: impl Into<String>, limit_param: impl Into<String>) -> Self {
        self.page_param = page_param.into();
        self.limit_param = limit_param.into();
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a fixed query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_records_path() -> String {
    "data".to_string()
}

fn default_total_path() -> String {
    "total".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// Loading
// ============================================================================

/// Load a config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<MediatorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    load_config_from_str(&content)
}

/// Load a config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<MediatorConfig> {
    let config: MediatorConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate a loaded config
pub fn validate_config(config: &MediatorConfig) -> Result<()> {
    if config.paging.page_size == 0 {
        return Err(Error::invalid_value(
            "paging.page_size",
            "must be greater than zero",
        ));
    }

    if let Some(source) = &config.source {
        validate_source(source)?;
    }

    Ok(())
}

fn validate_source(source: &SourceConfig) -> Result<()> {
    if source.base_url.is_empty() {
        return Err(Error::config("Source base_url cannot be empty"));
    }

    url::Url::parse(&source.base_url)?;

    let required = [
        ("source.page_param", &source.page_param),
        ("source.limit_param", &source.limit_param),
        ("source.records_path", &source.records_path),
        ("source.total_path", &source.total_path),
    ];
    for (field, value) in required {
        if value.is_empty() {
            return Err(Error::invalid_value(field, "cannot be empty"));
        }
    }

    if source.timeout_secs == 0 {
        return Err(Error::invalid_value(
            "source.timeout_secs",
            "must be greater than zero",
        ));
    }

    if source.page_param == source.limit_param {
        return Err(Error::config(
            "Source page_param and limit_param must differ",
        ));
    }

    Ok(())
}
