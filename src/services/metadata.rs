//! Page-count lookup against the Google Books volumes API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::{
    config::MetadataConfig,
    error::{AppError, AppResult},
};

/// Looks up how many pages a book has
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCountLookup: Send + Sync {
    async fn page_count(&self, title: &str, author: &str) -> AppResult<u32>;
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<VolumeItem>>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    #[serde(rename = "pageCount")]
    page_count: Option<u32>,
}

/// Build the `q` parameter for a title and author.
///
/// The author's surname is the second word of the name; a single-word name
/// gives no query.
pub fn volume_query(title: &str, author: &str) -> Option<String> {
    let surname = author.split_whitespace().nth(1)?.to_lowercase();
    let title = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if title.is_empty() {
        return None;
    }
    Some(format!("intitle:{} inauthor:{}", title, surname))
}

#[derive(Clone)]
pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(config: &MetadataConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid metadata base URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build metadata client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Full request URL for a query
    pub fn volumes_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }
}

#[async_trait]
impl PageCountLookup for GoogleBooksClient {
    async fn page_count(&self, title: &str, author: &str) -> AppResult<u32> {
        let query = volume_query(title, author).ok_or_else(|| {
            AppError::LookupUnavailable(format!(
                "Cannot build a volume query for '{}' by '{}'",
                title, author
            ))
        })?;

        let url = self.volumes_url(&query);
        tracing::debug!("Google Books lookup: {}", query);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Metadata(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Metadata(format!(
                "Google Books returned {}",
                response.status()
            )));
        }

        let parsed: VolumesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Malformed(format!("Unexpected Google Books response: {}", e)))?;

        parsed
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|item| item.volume_info.page_count)
            .filter(|pages| *pages > 0)
            .ok_or_else(|| AppError::LookupUnavailable(format!("No page count for '{}'", query)))
    }
}
