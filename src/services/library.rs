//! Reading-list operations against the library database

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::property,
        notion::{number_value, select_value, title_value},
        BookRecord, Filter, Format, Page, PropertyMap, PropertyValue, Rating, ReadingStatus,
        StatusUpdate,
    },
    repository::NotionApi,
    services::metadata::PageCountLookup,
};

#[derive(Clone)]
pub struct LibraryService {
    notion: Arc<dyn NotionApi>,
    metadata: Arc<dyn PageCountLookup>,
}

impl LibraryService {
    pub fn new(notion: Arc<dyn NotionApi>, metadata: Arc<dyn PageCountLookup>) -> Self {
        Self { notion, metadata }
    }

    /// Add a book to the library. A missing or empty status means TBR.
    pub async fn add_book(&self, title: &str, author: &str, status: Option<&str>) -> AppResult<()> {
        let status = match status.map(str::trim) {
            None | Some("") => ReadingStatus::Tbr,
            Some(spoken) => ReadingStatus::from_spoken(spoken)?,
        };

        let mut properties = PropertyMap::new();
        properties.insert(property::TITLE.to_string(), title_value(title));
        properties.insert(property::AUTHOR.to_string(), select_value(author));
        properties.insert(property::STATUS.to_string(), select_value(status.label()));

        let page = self.notion.create_page(properties).await?;
        tracing::info!("Added '{}' by {} as {} (page {})", title, author, status, page.id);
        Ok(())
    }

    /// First row whose title equals `title` exactly
    async fn find_page(&self, title: &str) -> AppResult<Page> {
        let filter = Filter::title_equals(property::TITLE, title);
        let response = self.notion.query_database(&filter, None).await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("No book titled '{}'", title)))
    }

    /// Fetch the record for a title
    pub async fn fetch_record(&self, title: &str) -> AppResult<BookRecord> {
        let page = self.find_page(title).await?;
        Ok(BookRecord::from(&page))
    }

    /// Number of books with the given status, across every result page
    pub async fn count_by_status(&self, status: &str) -> AppResult<usize> {
        let status = ReadingStatus::from_spoken(status)?;
        let filter = Filter::select_equals(property::STATUS, status.label());

        let mut count = 0;
        let mut cursor = None;
        loop {
            let response = self.notion.query_database(&filter, cursor.take()).await?;
            count += response.results.len();
            match (response.has_more, response.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!("{} books with status {}", count, status);
        Ok(count)
    }

    async fn read_property(&self, page: &Page, name: &str) -> AppResult<PropertyValue> {
        let property_id = page
            .property_id(name)
            .ok_or_else(|| AppError::Malformed(format!("Page {} has no '{}' property", page.id, name)))?;

        let property = self.notion.retrieve_property(page.id, property_id).await?;
        Ok(property.value)
    }

    async fn select_label(&self, page: &Page, name: &str) -> AppResult<String> {
        match self.read_property(page, name).await? {
            PropertyValue::Select { select: Some(option) } => Ok(option.name),
            PropertyValue::Select { select: None } => Err(AppError::NotFound(format!(
                "{} is not set on page {}",
                name, page.id
            ))),
            other => Err(AppError::Malformed(format!(
                "Expected '{}' to be a select, got {:?}",
                name, other
            ))),
        }
    }

    pub async fn read_author(&self, title: &str) -> AppResult<String> {
        let page = self.find_page(title).await?;
        self.select_label(&page, property::AUTHOR).await
    }

    pub async fn read_status(&self, title: &str) -> AppResult<String> {
        let page = self.find_page(title).await?;
        self.select_label(&page, property::STATUS).await
    }

    /// Genre tags joined as "A, B, " (each tag followed by the separator)
    pub async fn read_genre(&self, title: &str) -> AppResult<String> {
        let page = self.find_page(title).await?;
        match self.read_property(&page, property::GENRE).await? {
            PropertyValue::MultiSelect { multi_select } => Ok(multi_select
                .iter()
                .map(|option| format!("{}, ", option.name))
                .collect()),
            other => Err(AppError::Malformed(format!(
                "Expected Genre to be a multi-select, got {:?}",
                other
            ))),
        }
    }

    /// Change a book's status.
    ///
    /// Finishing a book also records its page count when one can be found;
    /// any other status resets Pages to 0.
    pub async fn update_status(&self, title: &str, status: &str) -> AppResult<StatusUpdate> {
        let status = ReadingStatus::from_spoken(status)?;
        let page = self.find_page(title).await?;

        let pages = if status == ReadingStatus::Finished {
            match self.finished_page_count(&page, title).await {
                Ok(pages) => Some(pages),
                Err(AppError::LookupUnavailable(reason)) => {
                    tracing::warn!("Page count unavailable for '{}': {}", title, reason);
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            Some(0)
        };

        let mut properties = PropertyMap::new();
        properties.insert(property::STATUS.to_string(), select_value(status.label()));
        if let Some(pages) = pages {
            properties.insert(property::PAGES.to_string(), number_value(pages));
        }

        self.notion.update_page(page.id, properties).await?;
        tracing::info!("Updated '{}' to {} (pages: {:?})", title, status, pages);
        Ok(StatusUpdate { status, pages })
    }

    async fn finished_page_count(&self, page: &Page, title: &str) -> AppResult<u32> {
        let author = match self.select_label(page, property::AUTHOR).await {
            Ok(author) => author,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::LookupUnavailable(format!("'{}' has no author", title)))
            }
            Err(e) => return Err(e),
        };
        self.metadata.page_count(title, &author).await
    }

    /// Set the rating from a spoken phrase such as "3 star"
    pub async fn update_rating(&self, title: &str, phrase: &str) -> AppResult<Rating> {
        let rating = Rating::from_spoken(phrase);
        let page = self.find_page(title).await?;

        let mut properties = PropertyMap::new();
        properties.insert(property::RATING.to_string(), select_value(&rating.label()));

        self.notion.update_page(page.id, properties).await?;
        tracing::info!("Rated '{}' {} stars", title, rating.stars());
        Ok(rating)
    }

    pub async fn update_format(&self, title: &str, format: &str) -> AppResult<Format> {
        let format = Format::from_spoken(format);
        let page = self.find_page(title).await?;

        let mut properties = PropertyMap::new();
        properties.insert(property::FORMAT.to_string(), select_value(format.label()));

        self.notion.update_page(page.id, properties).await?;
        tracing::info!("Set format of '{}' to {}", title, format);
        Ok(format)
    }
}
