//! HTTP page source
//!
//! Requests one page per call:
//! `GET {base_url}/{path}?{page_param}={page}&{limit_param}={limit}`
//! and reads the items and total count out of the JSON response.

use crate::config::SourceConfig;
use crate::error::{Error, PagingError, Result};
use crate::mediator::{FetchResult, FetchedPage, PagedFetch};
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Fetches pages from an HTTP endpoint described by a [`SourceConfig`]
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    config: SourceConfig,
    endpoint: Url,
}

impl HttpPageSource {
    /// Create a source with its own HTTP client
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("paging-mediator/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a source sharing an existing HTTP client
    pub fn with_client(config: SourceConfig, client: Client) -> Result<Self> {
        let endpoint = build_endpoint(&config.base_url, &config.path)?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// The URL pages are requested from, without query parameters
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The source configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Fetch a single page
    ///
    /// `params` are added to the query after the configured fixed
    /// parameters and may override them. The page and limit parameters
    /// always come from `page` and `limit`.
    pub async fn fetch_page(
        &self,
        params: &StringMap,
        page: u32,
        limit: u32,
    ) -> Result<FetchedPage<JsonValue>> {
        let query = self.build_query(params, page, limit);

        let mut req = self.client.get(self.endpoint.clone()).query(&query);
        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        debug!("Requesting page {} (limit {}) from {}", page, limit, self.endpoint);
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Page {} request failed with {}", page, status.as_u16());
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: JsonValue = response.json().await?;
        Ok(self.decode(&body))
    }

    fn build_query(&self, params: &StringMap, page: u32, limit: u32) -> Vec<(String, String)> {
        let mut merged = self.config.query.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.insert(self.config.page_param.clone(), page.to_string());
        merged.insert(self.config.limit_param.clone(), limit.to_string());

        let mut query: Vec<(String, String)> = merged.into_iter().collect();
        query.sort();
        query
    }

    /// Pull the item array and total count out of a response body
    pub fn decode(&self, body: &JsonValue) -> FetchedPage<JsonValue> {
        let items = extract_path(body, &self.config.records_path)
            .and_then(JsonValue::as_array)
            .cloned();
        if items.is_none() {
            warn!(
                "No item array at '{}' in response",
                self.config.records_path
            );
        }

        let total_count = extract_path(body, &self.config.total_path).and_then(as_count);

        FetchedPage { items, total_count }
    }
}

#[async_trait]
impl PagedFetch<StringMap, JsonValue> for HttpPageSource {
    async fn fetch(&self, params: StringMap, page: u32, limit: u32) -> FetchResult<JsonValue> {
        self.fetch_page(&params, page, limit)
            .await
            .map_err(PagingError::from)
    }
}

fn build_endpoint(base_url: &str, path: &str) -> Result<Url> {
    if path.is_empty() {
        return Ok(Url::parse(base_url)?);
    }

    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Walk a dotted path (optionally prefixed with `$.`) into a JSON value
///
/// Numeric segments index into arrays.
pub fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(part)?,
            JsonValue::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Totals sometimes arrive as strings
fn as_count(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
