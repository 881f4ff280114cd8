//! Book records and the closed label sets stored on them

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::notion::{Page, PropertyValue},
};

/// Database property names
pub mod property {
    pub const TITLE: &str = "Name";
    pub const AUTHOR: &str = "Author";
    pub const STATUS: &str = "Status";
    pub const RATING: &str = "Rating";
    pub const GENRE: &str = "Genre";
    pub const FORMAT: &str = "Format";
    pub const PAGES: &str = "Pages";
}

// ---------------------------------------------------------------------------
// ReadingStatus
// ---------------------------------------------------------------------------

/// Where a book stands on the reading list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingStatus {
    Tbr,
    Dnf,
    CurrentlyReading,
    Finished,
}

impl ReadingStatus {
    /// Label stored in the Status select
    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::Tbr => "TBR",
            ReadingStatus::Dnf => "DNF",
            ReadingStatus::CurrentlyReading => "Currently Reading",
            ReadingStatus::Finished => "Finished",
        }
    }

    /// Parse a spoken or stored status, ignoring case and spacing
    pub fn from_spoken(value: &str) -> AppResult<Self> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match normalized.as_str() {
            "tbr" | "t.b.r." | "to be read" | "to read" | "want to read" => Ok(ReadingStatus::Tbr),
            "dnf" | "d.n.f." | "did not finish" | "not finished" | "abandoned" => {
                Ok(ReadingStatus::Dnf)
            }
            "currently reading" | "reading" | "in progress" => Ok(ReadingStatus::CurrentlyReading),
            "finished" | "read" | "done" | "completed" => Ok(ReadingStatus::Finished),
            _ => Err(AppError::InvalidValue(format!("Unknown reading status '{}'", value))),
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

static STAR_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(1|2|3|4|5|one|two|three|four|five)\s*-?\s*stars?$").expect("valid star regex")
});

/// Star rating, stored as a run of star glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    pub const GLYPH: &'static str = "⭐";

    /// Map a spoken rating phrase to a rating.
    ///
    /// "1 star" through "4 star" map to their count; anything else is five stars.
    pub fn from_spoken(phrase: &str) -> Self {
        let normalized = phrase.trim().to_lowercase();
        let stars = STAR_PHRASE
            .captures(&normalized)
            .and_then(|caps| caps.get(1))
            .map(|count| match count.as_str() {
                "1" | "one" => 1,
                "2" | "two" => 2,
                "3" | "three" => 3,
                "4" | "four" => 4,
                _ => 5,
            })
            .unwrap_or(5);
        Rating(stars)
    }

    pub fn stars(&self) -> u8 {
        self.0
    }

    /// Label stored in the Rating select
    pub fn label(&self) -> String {
        Self::GLYPH.repeat(self.0 as usize)
    }

    /// Parse a stored glyph label
    pub fn from_label(label: &str) -> Option<Self> {
        let count = label.matches(Self::GLYPH).count();
        if (1..=5).contains(&count) && label.trim().len() == count * Self::GLYPH.len() {
            Some(Rating(count as u8))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Physical or digital format of a copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Ebook,
    Audiobook,
    Book,
    /// Any label outside the usual three, written as spoken
    Other(String),
}

impl Format {
    pub fn from_spoken(value: &str) -> Self {
        let trimmed = value.trim();
        let compact: String = trimmed
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match compact.as_str() {
            "ebook" | "kindle" => Format::Ebook,
            "audiobook" | "audio" => Format::Audiobook,
            "book" | "physicalbook" | "paperback" | "hardcover" | "print" => Format::Book,
            _ => Format::Other(trimmed.to_string()),
        }
    }

    /// Label stored in the Format select
    pub fn label(&self) -> &str {
        match self {
            Format::Ebook => "Ebook",
            Format::Audiobook => "Audiobook",
            Format::Book => "Book",
            Format::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// BookRecord
// ---------------------------------------------------------------------------

/// One row of the library database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub page_id: Uuid,
    pub title: String,
    pub author: Option<String>,
    /// Raw Status label; see [`BookRecord::reading_status`]
    pub status: Option<String>,
    pub rating: Option<String>,
    pub genres: Vec<String>,
    pub format: Option<String>,
    pub pages: Option<u32>,
}

impl BookRecord {
    pub fn reading_status(&self) -> Option<ReadingStatus> {
        self.status
            .as_deref()
            .and_then(|s| ReadingStatus::from_spoken(s).ok())
    }

    /// Stored rating, when it is a well-formed run of stars
    pub fn rating(&self) -> Option<Rating> {
        self.rating.as_deref().and_then(Rating::from_label)
    }
}

impl From<&Page> for BookRecord {
    fn from(page: &Page) -> Self {
        let select = |name: &str| match page.properties.get(name).map(|p| &p.value) {
            Some(PropertyValue::Select { select }) => select.as_ref().map(|o| o.name.clone()),
            _ => None,
        };

        let title = match page.properties.get(property::TITLE).map(|p| &p.value) {
            Some(PropertyValue::Title { title }) => {
                title.iter().map(|t| t.plain_text.as_str()).collect()
            }
            _ => String::new(),
        };

        let genres = match page.properties.get(property::GENRE).map(|p| &p.value) {
            Some(PropertyValue::MultiSelect { multi_select }) => {
                multi_select.iter().map(|o| o.name.clone()).collect()
            }
            _ => Vec::new(),
        };

        let pages = match page.properties.get(property::PAGES).map(|p| &p.value) {
            Some(PropertyValue::Number { number: Some(n) }) if *n >= 0.0 => Some(*n as u32),
            _ => None,
        };

        Self {
            page_id: page.id,
            title,
            author: select(property::AUTHOR),
            status: select(property::STATUS),
            rating: select(property::RATING),
            genres,
            format: select(property::FORMAT),
            pages,
        }
    }
}

/// Outcome of a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ReadingStatus,
    /// Page count written with the change. `None` when the book was finished
    /// but the count could not be looked up.
    pub pages: Option<u32>,
}
