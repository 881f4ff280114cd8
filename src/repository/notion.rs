//! HTTP client for the Notion REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::NotionConfig,
    error::{AppError, AppResult},
    models::{
        notion::{ErrorBody, QueryRequest},
        Filter, Page, Property, PropertyMap, QueryResponse,
    },
};

use super::NotionApi;

const NOTION_VERSION: HeaderName = HeaderName::from_static("notion-version");

#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_base: String,
    database_id: String,
}

impl NotionClient {
    /// Build a client bound to one database
    pub fn new(config: &NotionConfig) -> AppResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| AppError::Internal(format!("Invalid Notion token: {}", e)))?;
        auth.set_sensitive(true);

        let version = HeaderValue::from_str(&config.api_version)
            .map_err(|e| AppError::Internal(format!("Invalid Notion API version: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(NOTION_VERSION, version);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("library-skill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build Notion client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            database_id: config.database_id.clone(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Send a request and decode the JSON body, mapping API errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Notion(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => format!("{} ({})", err.message, err.code),
                Err(_) => body,
            };
            tracing::warn!("Notion API returned {}: {}", status, detail);
            return Err(AppError::Notion(format!("{}: {}", status, detail)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Malformed(format!("Unexpected Notion response: {}", e)))
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn query_database(
        &self,
        filter: &Filter,
        start_cursor: Option<String>,
    ) -> AppResult<QueryResponse> {
        let url = format!("{}/databases/{}/query", self.api_base, self.database_id);
        tracing::debug!("Notion query: {:?} (cursor: {:?})", filter, start_cursor);

        let body = QueryRequest {
            filter,
            start_cursor: start_cursor.as_deref(),
        };
        self.send(self.http.post(url).json(&body)).await
    }

    async fn create_page(&self, properties: PropertyMap) -> AppResult<Page> {
        let url = format!("{}/pages", self.api_base);
        tracing::debug!("Notion create page: {:?}", properties.keys().collect::<Vec<_>>());

        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });
        self.send(self.http.post(url).json(&body)).await
    }

    async fn update_page(&self, page_id: Uuid, properties: PropertyMap) -> AppResult<Page> {
        let url = format!("{}/pages/{}", self.api_base, page_id);
        tracing::debug!(
            "Notion update page {}: {:?}",
            page_id,
            properties.keys().collect::<Vec<_>>()
        );

        let body = json!({ "properties": properties });
        self.send(self.http.patch(url).json(&body)).await
    }

    async fn retrieve_property(&self, page_id: Uuid, property_id: &str) -> AppResult<Property> {
        let url = format!(
            "{}/pages/{}/properties/{}",
            self.api_base, page_id, property_id
        );
        tracing::debug!("Notion retrieve property {} of page {}", property_id, page_id);

        self.send(self.http.get(url)).await
    }
}
