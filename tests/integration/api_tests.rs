//! API integration tests
//!
//! The full router runs in-process over an in-memory database.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use library_skill::{
    api,
    config::AppConfig,
    error::AppError,
    models::{PropertyValue, ReadingStatus},
    services::Services,
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{InMemoryNotion, StaticPageCounts};

struct TestApp {
    state: AppState,
    notion: Arc<InMemoryNotion>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let notion = Arc::new(InMemoryNotion::with_page_size(2));
        let counts = Arc::new(StaticPageCounts::new(&[("Dune", 412), ("Emma", 474)]));
        let services = Services::with_clients(notion.clone(), counts);

        Self {
            state: AppState {
                config: Arc::new(config),
                services: Arc::new(services),
            },
            notion,
        }
    }

    async fn post(&self, body: Value) -> (StatusCode, Value) {
        let response = api::create_router(self.state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/skill")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Send an intent and return the spoken text
    async fn say(&self, intent: &str, slots: Value) -> String {
        let (status, body) = self.post(intent_request(intent, slots)).await;
        assert_eq!(status, StatusCode::OK);
        body["response"]["outputSpeech"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

fn intent_request(intent: &str, slots: Value) -> Value {
    let slots: serde_json::Map<String, Value> = slots
        .as_object()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.clone(), json!({ "name": name, "value": value })))
        .collect();

    json!({
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "amzn1.echo-api.session.test",
            "application": { "applicationId": "amzn1.ask.skill.library" }
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "amzn1.echo-api.request.test",
            "locale": "en-US",
            "intent": { "name": intent, "confirmationStatus": "NONE", "slots": slots }
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let response = api::create_router(app.state.clone())
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_launch_request() {
    let app = TestApp::new();
    let (status, body) = app
        .post(json!({
            "version": "1.0",
            "request": { "type": "LaunchRequest", "requestId": "r1", "locale": "en-US" }
        }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["outputSpeech"]["text"],
        "Opening your notion library. How can I help you?"
    );
    assert_eq!(body["response"]["shouldEndSession"], false);
}

#[tokio::test]
async fn test_malformed_envelope_gets_apology() {
    let app = TestApp::new();
    let apology = "Sorry, I had trouble doing what you asked. Please try again.";

    let malformed = [
        json!({ "version": "1.0" }),
        json!({ "version": "1.0", "request": { "type": "IntentRequest", "requestId": "r1" } }),
        json!({ "request": "LaunchRequest" }),
    ];
    for body in malformed {
        let (status, body) = app.post(body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["outputSpeech"]["text"], apology);
        assert_eq!(body["response"]["reprompt"]["outputSpeech"]["text"], apology);
        assert_eq!(body["response"]["shouldEndSession"], false);
    }

    let response = api::create_router(app.state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/skill")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["response"]["outputSpeech"]["text"], apology);
}

#[tokio::test]
async fn test_lenient_envelope_fields() {
    let app = TestApp::new();

    // No version on the envelope
    let (status, body) = app
        .post(json!({ "request": { "type": "LaunchRequest", "requestId": "r1" } }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["outputSpeech"]["text"],
        "Opening your notion library. How can I help you?"
    );

    // Slots without a name
    app.say(
        "AddBookIntent",
        json!({ "BOOK_NAME": "Dune", "BOOK_AUTHOR": "Frank Herbert" }),
    )
    .await;
    let (status, body) = app
        .post(json!({
            "version": "1.0",
            "request": {
                "type": "IntentRequest",
                "requestId": "r2",
                "intent": {
                    "name": "GetBookAuthorIntent",
                    "slots": { "BOOK_NAME": { "value": "Dune" } }
                }
            }
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["outputSpeech"]["text"],
        "The author of Dune is Frank Herbert."
    );
}

#[tokio::test]
async fn test_application_id_check() {
    let mut config = AppConfig::default();
    config.skill.application_id = Some("amzn1.ask.skill.other".to_string());
    let app = TestApp::with_config(config);

    let (status, body) = app.post(intent_request("AMAZON.HelpIntent", json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let mut config = AppConfig::default();
    config.skill.application_id = Some("amzn1.ask.skill.library".to_string());
    let app = TestApp::with_config(config);

    let (status, _) = app.post(intent_request("AMAZON.HelpIntent", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reading_list_conversation() {
    let app = TestApp::new();

    let added = app
        .say(
            "AddBookIntent",
            json!({ "BOOK_NAME": "Dune", "BOOK_AUTHOR": "Frank Herbert", "BOOK_STATUS": "" }),
        )
        .await;
    assert_eq!(added, "Dune written by Frank Herbert was successfully added to your library.");

    let status = app.say("GetBookStatusIntent", json!({ "BOOK_NAME": "Dune" })).await;
    assert_eq!(status, "The book Dune has a status of TBR.");

    let author = app.say("GetBookAuthorIntent", json!({ "BOOK_NAME": "Dune" })).await;
    assert_eq!(author, "The author of Dune is Frank Herbert.");

    app.notion.set_genres("Dune", &["Science Fiction", "Classic"]);
    let genre = app.say("GetBookGenreIntent", json!({ "BOOK_NAME": "Dune" })).await;
    assert_eq!(genre, "The genre of Dune is Science Fiction, Classic.");

    let format = app
        .say("UpdateFormatIntent", json!({ "BOOK_NAME": "Dune", "BOOK_FORMAT": "e-book" }))
        .await;
    assert_eq!(format, "The format of Dune has been successfully updated to Ebook.");

    let finished = app
        .say("UpdateStatusIntent", json!({ "BOOK_NAME": "Dune", "BOOK_STATUS": "finished" }))
        .await;
    assert_eq!(
        finished,
        "The status of Dune has been successfully updated to Finished. That's 412 pages read."
    );

    let rated = app
        .say("UpdateRatingIntent", json!({ "BOOK_NAME": "Dune", "BOOK_RATING": "4 star" }))
        .await;
    assert_eq!(rated, "Dune has successfully been updated to 4 stars.");

    assert_eq!(
        app.notion.value("Dune", "Rating"),
        Some(
            serde_json::from_value::<PropertyValue>(json!({ "type": "select", "select": { "name": "⭐⭐⭐⭐" } }))
                .unwrap()
        )
    );
}

#[tokio::test]
async fn test_count_by_status_spans_result_pages() {
    let app = TestApp::new();
    for title in ["Dune", "Emma", "Ulysses", "Beloved", "Middlemarch"] {
        app.say(
            "AddBookIntent",
            json!({ "BOOK_NAME": title, "BOOK_AUTHOR": "Some Author", "BOOK_STATUS": "TBR" }),
        )
        .await;
    }
    app.say("UpdateStatusIntent", json!({ "BOOK_NAME": "Emma", "BOOK_STATUS": "reading" }))
        .await;

    // Page size is 2, so four matching books span two queries
    let tbr = app.say("GetBookByNumStatusIntent", json!({ "BOOK_STATUS": "tbr" })).await;
    assert_eq!(tbr, "There are 4 books with the status tbr.");

    let reading = app
        .say("GetBookByNumStatusIntent", json!({ "BOOK_STATUS": "Currently Reading" }))
        .await;
    assert_eq!(reading, "There is 1 book with the status Currently Reading.");
}

#[tokio::test]
async fn test_unknown_title_apologizes() {
    let app = TestApp::new();

    let status = app.say("GetBookStatusIntent", json!({ "BOOK_NAME": "Nonexistent" })).await;
    assert_eq!(
        status,
        "Sorry, there was a problem in retrieving the status of Nonexistent. Please try again later."
    );

    let update = app
        .say("UpdateStatusIntent", json!({ "BOOK_NAME": "Nonexistent", "BOOK_STATUS": "DNF" }))
        .await;
    assert_eq!(
        update,
        "Sorry, there was a problem in updating the status of the book. Please try again later."
    );
}

#[tokio::test]
async fn test_finished_without_page_count() {
    let app = TestApp::new();
    app.say(
        "AddBookIntent",
        json!({ "BOOK_NAME": "Beloved", "BOOK_AUTHOR": "Morrison" }),
    )
    .await;

    let spoken = app
        .say("UpdateStatusIntent", json!({ "BOOK_NAME": "Beloved", "BOOK_STATUS": "Finished" }))
        .await;
    assert_eq!(
        spoken,
        "The status of Beloved has been successfully updated to Finished. \
         I couldn't find its page count, so pages were left as they were."
    );
    assert_eq!(
        app.notion.value("Beloved", "Pages"),
        Some(PropertyValue::Number { number: None })
    );
}

#[tokio::test]
async fn test_library_scenario() {
    let app = TestApp::new();
    let library = &app.state.services.library;

    library.add_book("Dune", "Frank Herbert", None).await.unwrap();
    assert_eq!(app.notion.len(), 1);

    let record = library.fetch_record("Dune").await.unwrap();
    assert_eq!(record.title, "Dune");
    assert_eq!(record.author.as_deref(), Some("Frank Herbert"));
    assert_eq!(record.reading_status(), Some(ReadingStatus::Tbr));

    let update = library.update_status("Dune", "finished").await.unwrap();
    assert_eq!(update.status, ReadingStatus::Finished);
    assert!(update.pages.unwrap() > 0);

    let rating = library.update_rating("Dune", "5 star").await.unwrap();
    assert_eq!(rating.label(), "⭐⭐⭐⭐⭐");

    let record = library.fetch_record("Dune").await.unwrap();
    assert_eq!(record.status.as_deref(), Some("Finished"));
    assert_eq!(record.pages, Some(412));
    assert_eq!(record.rating.as_deref(), Some("⭐⭐⭐⭐⭐"));
    assert_eq!(record.rating().map(|r| r.stars()), Some(5));

    app.notion.set_genres("Dune", &["Fantasy", "Mystery"]);
    assert_eq!(library.read_genre("Dune").await.unwrap(), "Fantasy, Mystery, ");

    assert!(matches!(
        library.fetch_record("Nonexistent").await,
        Err(AppError::NotFound(_))
    ));
    assert!(library.read_author("Nonexistent").await.is_err());
    assert!(library.read_genre("Nonexistent").await.is_err());
    assert!(library.update_format("Nonexistent", "Book").await.is_err());
    assert!(library.update_rating("Nonexistent", "1 star").await.is_err());
}
