//! Business logic services

pub mod intents;
pub mod library;
pub mod metadata;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppResult,
    repository::{NotionApi, NotionClient},
};

use metadata::{GoogleBooksClient, PageCountLookup};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub library: library::LibraryService,
    pub intents: intents::IntentRouter,
}

impl Services {
    /// Create all services with clients built from the configuration
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let notion = NotionClient::new(&config.notion)?;
        tracing::info!("Notion client bound to database {}", notion.database_id());
        let metadata = GoogleBooksClient::new(&config.metadata)?;

        Ok(Self::with_clients(Arc::new(notion), Arc::new(metadata)))
    }

    /// Create all services over the given API clients
    pub fn with_clients(
        notion: Arc<dyn NotionApi>,
        metadata: Arc<dyn PageCountLookup>,
    ) -> Self {
        let library = library::LibraryService::new(notion, metadata);
        Self {
            intents: intents::IntentRouter::new(library.clone()),
            library,
        }
    }
}
