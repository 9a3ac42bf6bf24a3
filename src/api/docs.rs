//! OpenAPI document for the user endpoints.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::{ErrorResponse, HealthResponse, ListErrorResponse};
use crate::users::{NewUser, User};

/// OpenAPI description of the backend.
#[derive(OpenApi)]
#[openapi(
    info(title = "userboard", description = "List and create user records"),
    paths(super::handlers::health, super::handlers::list_users, super::handlers::create_user),
    components(schemas(User, NewUser, HealthResponse, ListErrorResponse, ErrorResponse))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
