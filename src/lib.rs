//! Notion Library voice skill
//!
//! Backend for a voice skill that keeps a personal reading list in a Notion
//! database: recognized intents come in over HTTP, are turned into database
//! reads and writes, and go back out as spoken sentences.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
