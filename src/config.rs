//! Configuration management for the library skill

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Notion workspace access. One integration token, one database.
#[derive(Debug, Deserialize, Clone)]
pub struct NotionConfig {
    pub api_base: String,
    pub api_version: String,
    pub token: String,
    pub database_id: String,
    pub timeout_seconds: u64,
}

/// Public book-metadata API used for page counts
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkillConfig {
    /// When set, envelopes addressed to another skill are refused
    pub application_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub skill: SkillConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LIBRARY__)
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Integration token from NOTION_KEY if present
            .set_override_option("notion.token", env::var("NOTION_KEY").ok())?
            // Database id from NOTION_DATABASE_ID if present
            .set_override_option(
                "notion.database_id",
                env::var("NOTION_DATABASE_ID").ok(),
            )?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.token.is_empty() {
            return Err(ConfigError::Message(
                "notion.token is not set (NOTION_KEY)".to_string(),
            ));
        }
        if self.notion.database_id.is_empty() {
            return Err(ConfigError::Message(
                "notion.database_id is not set (NOTION_DATABASE_ID)".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            token: String::new(),
            database_id: String::new(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            api_key: None,
            timeout_seconds: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
