//! Intent routing: one handler per recognized intent, tried in order

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{
        skill::{RequestEnvelope, ResponseBuilder, ResponseEnvelope},
        ReadingStatus,
    },
    services::library::LibraryService,
};

/// Slot names defined by the interaction model
pub mod slot {
    pub const BOOK_NAME: &str = "BOOK_NAME";
    pub const BOOK_AUTHOR: &str = "BOOK_AUTHOR";
    pub const BOOK_STATUS: &str = "BOOK_STATUS";
    pub const BOOK_FORMAT: &str = "BOOK_FORMAT";
    pub const BOOK_RATING: &str = "BOOK_RATING";
}

const GREETING: &str = "Opening your notion library. How can I help you?";
const HELP: &str = "You are in your notion library! You can ask me to retrieve or update properties like status, rating, format, and genre.";
const GOODBYE: &str = "Goodbye! Come visit your library soon.";
const FALLBACK: &str = "Sorry, I don't know about that. Please try again.";
const GENERIC_ERROR: &str = "Sorry, I had trouble doing what you asked. Please try again.";

/// The event being handled
pub struct HandlerInput<'a> {
    pub envelope: &'a RequestEnvelope,
}

impl<'a> HandlerInput<'a> {
    pub fn new(envelope: &'a RequestEnvelope) -> Self {
        Self { envelope }
    }

    pub fn request_type(&self) -> &'static str {
        self.envelope.request.request_type()
    }

    pub fn is_intent(&self, name: &str) -> bool {
        self.envelope.request.intent_name() == Some(name)
    }

    /// Value of a slot the intent cannot do without
    pub fn slot(&self, name: &str) -> AppResult<&'a str> {
        self.optional_slot(name)
            .ok_or_else(|| AppError::MissingSlot(name.to_string()))
    }

    pub fn optional_slot(&self, name: &str) -> Option<&'a str> {
        self.envelope
            .request
            .intent()
            .and_then(|intent| intent.slot_value(name))
    }
}

#[async_trait]
pub trait RequestHandler: Send + Sync {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool;

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope>;
}

/// Speak a result, or a fixed apology when the operation failed
fn speak_outcome<T>(
    result: AppResult<T>,
    apology: &str,
    speech: impl FnOnce(T) -> String,
) -> ResponseEnvelope {
    let text = match result {
        Ok(value) => speech(value),
        Err(e) => {
            tracing::warn!("Library operation failed: {}", e);
            apology.to_string()
        }
    };
    ResponseBuilder::new().speak(text).build()
}

// ---------------------------------------------------------------------------
// Static handlers
// ---------------------------------------------------------------------------

pub struct LaunchRequestHandler;

#[async_trait]
impl RequestHandler for LaunchRequestHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.request_type() == "LaunchRequest"
    }

    async fn handle(&self, _input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        Ok(ResponseBuilder::new().speak(GREETING).reprompt(GREETING).build())
    }
}

pub struct HelpIntentHandler;

#[async_trait]
impl RequestHandler for HelpIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("AMAZON.HelpIntent")
    }

    async fn handle(&self, _input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        Ok(ResponseBuilder::new().speak(HELP).reprompt(HELP).build())
    }
}

pub struct CancelAndStopIntentHandler;

#[async_trait]
impl RequestHandler for CancelAndStopIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("AMAZON.CancelIntent") || input.is_intent("AMAZON.StopIntent")
    }

    async fn handle(&self, _input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        Ok(ResponseBuilder::new().speak(GOODBYE).end_session(true).build())
    }
}

pub struct FallbackIntentHandler;

#[async_trait]
impl RequestHandler for FallbackIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("AMAZON.FallbackIntent")
    }

    async fn handle(&self, _input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        Ok(ResponseBuilder::new().speak(FALLBACK).reprompt(FALLBACK).build())
    }
}

pub struct SessionEndedRequestHandler;

#[async_trait]
impl RequestHandler for SessionEndedRequestHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.request_type() == "SessionEndedRequest"
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        if let crate::models::SkillRequest::SessionEndedRequest(details) = &input.envelope.request {
            tracing::info!("Session ended: {:?} {:?}", details.reason, details.error);
        }
        Ok(ResponseBuilder::new().end_session(true).build())
    }
}

// ---------------------------------------------------------------------------
// Library handlers
// ---------------------------------------------------------------------------

pub struct AddBookIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for AddBookIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("AddBookIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;
        let author = input.slot(slot::BOOK_AUTHOR)?;
        let status = input.optional_slot(slot::BOOK_STATUS);

        let result = self.library.add_book(title, author, status).await;
        Ok(speak_outcome(
            result,
            "Sorry, there was a problem in adding the book to your library. Please try again later.",
            |_| format!("{} written by {} was successfully added to your library.", title, author),
        ))
    }
}

pub struct GetBookByNumStatusIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for GetBookByNumStatusIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("GetBookByNumStatusIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let status = input.slot(slot::BOOK_STATUS)?;

        let result = self.library.count_by_status(status).await;
        Ok(speak_outcome(
            result,
            "Sorry, there was a problem in retrieving the number of books by status. Please try again later.",
            |count| match count {
                1 => format!("There is 1 book with the status {}.", status),
                n => format!("There are {} books with the status {}.", n, status),
            },
        ))
    }
}

pub struct GetBookStatusIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for GetBookStatusIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("GetBookStatusIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;

        let result = self.library.read_status(title).await;
        Ok(speak_outcome(
            result,
            &format!(
                "Sorry, there was a problem in retrieving the status of {}. Please try again later.",
                title
            ),
            |status| format!("The book {} has a status of {}.", title, status),
        ))
    }
}

pub struct GetBookAuthorIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for GetBookAuthorIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("GetBookAuthorIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;

        let result = self.library.read_author(title).await;
        Ok(speak_outcome(
            result,
            &format!(
                "Sorry, there was a problem in retrieving the author of {}. Please try again later.",
                title
            ),
            |author| format!("The author of {} is {}.", title, author),
        ))
    }
}

pub struct GetBookGenreIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for GetBookGenreIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("GetBookGenreIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;

        let result = self.library.read_genre(title).await;
        Ok(speak_outcome(
            result,
            &format!(
                "Sorry, there was a problem in retrieving the genre of {}. Please try again later.",
                title
            ),
            |genre| {
                let genre = genre.trim_end_matches(", ");
                if genre.is_empty() {
                    format!("{} does not have a genre yet.", title)
                } else {
                    format!("The genre of {} is {}.", title, genre)
                }
            },
        ))
    }
}

pub struct UpdateFormatIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for UpdateFormatIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("UpdateFormatIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;
        let format = input.slot(slot::BOOK_FORMAT)?;

        let result = self.library.update_format(title, format).await;
        Ok(speak_outcome(
            result,
            "Sorry, there was a problem in updating the format of the book. Please try again later.",
            |format| format!("The format of {} has been successfully updated to {}.", title, format),
        ))
    }
}

pub struct UpdateRatingIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for UpdateRatingIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("UpdateRatingIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;
        let rating = input.slot(slot::BOOK_RATING)?;

        let result = self.library.update_rating(title, rating).await;
        Ok(speak_outcome(
            result,
            "Sorry, there was a problem in updating the rating for the book. Please try again later.",
            |rating| match rating.stars() {
                1 => format!("{} has successfully been updated to 1 star.", title),
                n => format!("{} has successfully been updated to {} stars.", title, n),
            },
        ))
    }
}

pub struct UpdateStatusIntentHandler {
    library: LibraryService,
}

#[async_trait]
impl RequestHandler for UpdateStatusIntentHandler {
    fn can_handle(&self, input: &HandlerInput<'_>) -> bool {
        input.is_intent("UpdateStatusIntent")
    }

    async fn handle(&self, input: &HandlerInput<'_>) -> AppResult<ResponseEnvelope> {
        let title = input.slot(slot::BOOK_NAME)?;
        let status = input.slot(slot::BOOK_STATUS)?;

        let result = self.library.update_status(title, status).await;
        Ok(speak_outcome(
            result,
            "Sorry, there was a problem in updating the status of the book. Please try again later.",
            |update| {
                let confirmation = format!(
                    "The status of {} has been successfully updated to {}.",
                    title, update.status
                );
                match (update.status, update.pages) {
                    (ReadingStatus::Finished, Some(pages)) => {
                        format!("{} That's {} pages read.", confirmation, pages)
                    }
                    (ReadingStatus::Finished, None) => format!(
                        "{} I couldn't find its page count, so pages were left as they were.",
                        confirmation
                    ),
                    _ => confirmation,
                }
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Runs the first handler that accepts an event; failures become a
/// generic apology
#[derive(Clone)]
pub struct IntentRouter {
    handlers: Arc<Vec<Box<dyn RequestHandler>>>,
}

impl IntentRouter {
    /// Router with the skill's handlers in dispatch order
    pub fn new(library: LibraryService) -> Self {
        let handlers: Vec<Box<dyn RequestHandler>> = vec![
            Box::new(LaunchRequestHandler),
            Box::new(AddBookIntentHandler { library: library.clone() }),
            Box::new(GetBookByNumStatusIntentHandler { library: library.clone() }),
            Box::new(GetBookStatusIntentHandler { library: library.clone() }),
            Box::new(GetBookAuthorIntentHandler { library: library.clone() }),
            Box::new(GetBookGenreIntentHandler { library: library.clone() }),
            Box::new(UpdateFormatIntentHandler { library: library.clone() }),
            Box::new(UpdateRatingIntentHandler { library: library.clone() }),
            Box::new(UpdateStatusIntentHandler { library }),
            Box::new(HelpIntentHandler),
            Box::new(CancelAndStopIntentHandler),
            Box::new(FallbackIntentHandler),
            Box::new(SessionEndedRequestHandler),
        ];
        Self::with_handlers(handlers)
    }

    pub fn with_handlers(handlers: Vec<Box<dyn RequestHandler>>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    pub async fn dispatch(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let input = HandlerInput::new(envelope);
        tracing::info!(
            "Dispatching {} {}",
            input.request_type(),
            envelope.request.intent_name().unwrap_or("-")
        );

        let result = match self.handlers.iter().find(|h| h.can_handle(&input)) {
            Some(handler) => handler.handle(&input).await,
            None => Err(AppError::Internal(format!(
                "No handler for {} {:?}",
                input.request_type(),
                envelope.request.intent_name()
            ))),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Request failed: {}", e);
            Self::apology()
        })
    }

    /// Generic apology for events no handler could answer
    pub fn apology() -> ResponseEnvelope {
        ResponseBuilder::new()
            .speak(GENERIC_ERROR)
            .reprompt(GENERIC_ERROR)
            .build()
    }
}
