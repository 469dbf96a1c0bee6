//! services/api/src/web/auth.rs
//!
//! Account endpoints for sign-up, sign-in, and sign-out.

use account_core::accounts::{
    ACCOUNT_CREATION_FAILED, EMAIL_IN_USE, LOGIN_FAILED, USER_ALREADY_EXISTS,
    USER_DOES_NOT_EXIST,
};
use account_core::{ActionOutcome, SignInParams, SignUpParams};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::web::cookie::{clear_session_cookie, session_cookie};
use crate::web::state::AppState;

pub const SIGNED_OUT: &str = "Signed out.";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub uid: String,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub id_token: String,
}

/// The two-field result returned by every account endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
        }
    }
}

fn sign_up_status(outcome: &ActionOutcome) -> StatusCode {
    match outcome.message.as_str() {
        _ if outcome.success => StatusCode::CREATED,
        USER_ALREADY_EXISTS | EMAIL_IN_USE => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn sign_in_status(outcome: &ActionOutcome) -> StatusCode {
    match outcome.message.as_str() {
        _ if outcome.success => StatusCode::OK,
        USER_DOES_NOT_EXIST => StatusCode::NOT_FOUND,
        _ => StatusCode::UNAUTHORIZED,
    }
}

/// Answers a body the JSON extractor refused with the flow's generic failure.
fn rejected_body(rejection: JsonRejection, message: &str) -> (StatusCode, Json<ActionResponse>) {
    warn!("Rejected request body: {}", rejection.body_text());
    (
        rejection.status(),
        Json(ActionResponse::from(ActionOutcome::failure(message))),
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/sign-up - Create the account record for a provider user
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = ActionResponse),
        (status = 409, description = "Account or email already exists", body = ActionResponse),
        (status = 422, description = "Malformed request body", body = ActionResponse),
        (status = 500, description = "Failed to create an account", body = ActionResponse)
    ),
    tag = "auth"
)]
pub async fn sign_up_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejected_body(rejection, ACCOUNT_CREATION_FAILED),
    };

    let outcome = state
        .accounts
        .sign_up(SignUpParams {
            uid: req.uid,
            name: req.name,
            email: req.email,
        })
        .await;

    (sign_up_status(&outcome), Json(ActionResponse::from(outcome)))
}

/// POST /auth/sign-in - Exchange an idToken for a session cookie
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ActionResponse),
        (status = 401, description = "Failed to log in", body = ActionResponse),
        (status = 404, description = "No account for the email", body = ActionResponse),
        (status = 422, description = "Malformed request body", body = ActionResponse)
    ),
    tag = "auth"
)]
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let (status, body) = rejected_body(rejection, LOGIN_FAILED);
            return (status, HeaderMap::new(), body);
        }
    };

    let outcome = state
        .accounts
        .sign_in(SignInParams {
            email: req.email,
            id_token: req.id_token,
        })
        .await;

    let mut headers = HeaderMap::new();
    if let Some(session) = &outcome.session {
        match session_cookie(&state.cookies, session) {
            Ok(cookie) => {
                headers.insert(header::SET_COOKIE, cookie);
            }
            Err(e) => {
                error!("Failed to build session cookie: {:?}", e);
                let response = ActionResponse::from(ActionOutcome::failure(LOGIN_FAILED));
                return (StatusCode::INTERNAL_SERVER_ERROR, headers, Json(response));
            }
        }
    }

    let status = sign_in_status(&outcome.result);
    (status, headers, Json(ActionResponse::from(outcome.result)))
}

/// POST /auth/sign-out - Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 200, description = "Session cookie cleared", body = ActionResponse)
    ),
    tag = "auth"
)]
pub async fn sign_out_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    match clear_session_cookie(&state.cookies) {
        Ok(cookie) => {
            headers.insert(header::SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to build clearing cookie: {:?}", e),
    }
    info!("Session cookie cleared");

    (
        StatusCode::OK,
        headers,
        Json(ActionResponse::from(ActionOutcome::success(SIGNED_OUT))),
    )
}
