//! services/api/src/web/rest.rs
//!
//! Contains the health endpoint and the master definition for the OpenAPI
//! specification.

use axum::response::{IntoResponse, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::auth::{ActionResponse, SignInRequest, SignUpRequest};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::sign_up_handler,
        crate::web::auth::sign_in_handler,
        crate::web::auth::sign_out_handler,
        health_handler,
    ),
    components(
        schemas(SignUpRequest, SignInRequest, ActionResponse, HealthResponse)
    ),
    tags(
        (name = "auth", description = "Account creation, sign-in and session cookies.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/auth/sign-up", "/auth/sign-in", "/auth/sign-out", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
