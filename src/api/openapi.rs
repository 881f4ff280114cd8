//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, skill};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notion Library Skill API",
        version = "1.0.0",
        description = "Voice skill endpoint for a Notion reading list",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Skill
        skill::handle_request,
    ),
    components(
        schemas(
            // Skill
            crate::models::skill::RequestEnvelope,
            crate::models::skill::ResponseEnvelope,
            crate::models::skill::SkillResponse,
            crate::models::skill::OutputSpeech,
            crate::models::skill::Reprompt,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "skill", description = "Voice platform requests")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
