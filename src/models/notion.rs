//! Notion API wire types (the subset the library database uses)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Property values keyed by property name, as sent on create/update
pub type PropertyMap = serde_json::Map<String, Value>;

/// A database row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
}

impl Page {
    /// Identifier of a named property on this page
    pub fn property_id(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.id.as_str())
    }
}

/// A property on a page, or a property item returned by the
/// retrieve-property endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichText>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Number {
        number: Option<f64>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Equality filter on one database property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub property: String,
    #[serde(flatten)]
    pub condition: FilterCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Title { equals: String },
    Select { equals: String },
}

impl Filter {
    pub fn title_equals(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            condition: FilterCondition::Title {
                equals: value.to_string(),
            },
        }
    }

    pub fn select_equals(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            condition: FilterCondition::Select {
                equals: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub filter: &'a Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Body of a non-2xx Notion response
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Property writers
// ---------------------------------------------------------------------------

pub fn title_value(content: &str) -> Value {
    json!({
        "type": "title",
        "title": [ { "type": "text", "text": { "content": content } } ]
    })
}

pub fn select_value(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

pub fn number_value(number: u32) -> Value {
    json!({ "number": number })
}
