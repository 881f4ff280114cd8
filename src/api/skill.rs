//! Voice platform endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::skill::{RequestEnvelope, ResponseEnvelope},
    services::intents::IntentRouter,
    AppState,
};

/// Handle one request envelope from the voice platform
#[utoipa::path(
    post,
    path = "/skill",
    tag = "skill",
    request_body = RequestEnvelope,
    responses(
        (status = 200, description = "Spoken response, or an apology for an unreadable envelope", body = ResponseEnvelope),
        (status = 403, description = "Envelope addressed to another skill", body = crate::error::ErrorResponse)
    )
)]
pub async fn handle_request(
    State(state): State<AppState>,
    payload: Result<Json<RequestEnvelope>, JsonRejection>,
) -> AppResult<Json<ResponseEnvelope>> {
    let envelope = match payload {
        Ok(Json(envelope)) => envelope,
        Err(rejection) => {
            tracing::warn!("Unreadable skill envelope: {}", rejection.body_text());
            return Ok(Json(IntentRouter::apology()));
        }
    };

    if let Some(expected) = &state.config.skill.application_id {
        match envelope.application_id() {
            Some(actual) if actual == expected => {}
            actual => {
                return Err(AppError::Authorization(format!(
                    "Unexpected application id {:?}",
                    actual
                )))
            }
        }
    }

    let response = state.services.intents.dispatch(&envelope).await;
    Ok(Json(response))
}
