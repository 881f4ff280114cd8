//! Repository layer for the Notion library database

pub mod notion;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Filter, Page, Property, PropertyMap, QueryResponse},
};

pub use notion::NotionClient;

/// Operations the library needs from the database API.
///
/// Every call is scoped to the one database the implementation was built for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Query rows matching `filter`, one result page at a time
    async fn query_database(
        &self,
        filter: &Filter,
        start_cursor: Option<String>,
    ) -> AppResult<QueryResponse>;

    /// Create a row with the given property values
    async fn create_page(&self, properties: PropertyMap) -> AppResult<Page>;

    /// Overwrite the given property values on a row
    async fn update_page(&self, page_id: Uuid, properties: PropertyMap) -> AppResult<Page>;

    /// Read one property of a row by its identifier
    async fn retrieve_property(&self, page_id: Uuid, property_id: &str) -> AppResult<Property>;
}
