//! services/api/src/adapters/identity.rs
//!
//! This module contains the adapter for Firebase Authentication, reached through
//! the Identity Toolkit admin REST API. It implements the `IdentityProvider`
//! port from the `core` crate.

use account_core::domain::{ProviderUser, VerifiedToken};
use account_core::ports::{IdentityProvider, PortError, PortResult, EMAIL_ALREADY_EXISTS};
use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

use super::google::{read_error, transport_error, GoogleError};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `IdentityProvider` port using the Identity Toolkit API.
#[derive(Clone)]
pub struct IdentityToolkitAdapter {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl IdentityToolkitAdapter {
    /// Creates a new `IdentityToolkitAdapter`.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            access_token: access_token.into(),
        }
    }

    fn accounts_lookup_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/accounts:lookup",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    fn create_session_cookie_url(&self) -> String {
        format!(
            "{}/v1/projects/{}:createSessionCookie",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: &Value) -> PortResult<T> {
        debug!(url, "Calling identity toolkit");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let (_, error) = read_error(response).await;
            return Err(map_provider_error(&error));
        }

        response.json::<T>().await.map_err(transport_error)
    }
}

//=========================================================================================
// "Impure" REST Payload Structs
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfoRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfoRecord {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
}
impl UserInfoRecord {
    fn to_domain(self) -> ProviderUser {
        ProviderUser {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            disabled: self.disabled,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieResponse {
    session_cookie: String,
}

/// Maps an Identity Toolkit error reason to the Firebase error code clients expect.
fn provider_code(reason: &str) -> &'static str {
    match reason {
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => EMAIL_ALREADY_EXISTS,
        "USER_NOT_FOUND" => "auth/user-not-found",
        "INVALID_ID_TOKEN" => "auth/invalid-id-token",
        "TOKEN_EXPIRED" => "auth/id-token-expired",
        "USER_DISABLED" => "auth/user-disabled",
        "PROJECT_NOT_FOUND" => "auth/project-not-found",
        "INSUFFICIENT_PERMISSION" => "auth/insufficient-permission",
        _ => "auth/internal-error",
    }
}

fn map_provider_error(error: &GoogleError) -> PortError {
    match error.reason() {
        "USER_NOT_FOUND" => PortError::NotFound(error.message.clone()),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => PortError::Unauthorized,
        reason => PortError::Provider {
            code: provider_code(reason).to_string(),
            message: error.message.clone(),
        },
    }
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for IdentityToolkitAdapter {
    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<ProviderUser>> {
        let body = json!({ "email": [email] });
        match self
            .post::<LookupResponse>(&self.accounts_lookup_url(), &body)
            .await
        {
            Ok(lookup) => Ok(lookup.users.into_iter().next().map(UserInfoRecord::to_domain)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn verify_id_token(&self, id_token: &str) -> PortResult<VerifiedToken> {
        let body = json!({ "idToken": id_token });
        let lookup: LookupResponse = self.post(&self.accounts_lookup_url(), &body).await?;
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or(PortError::Unauthorized)?;
        if user.disabled {
            return Err(PortError::Provider {
                code: provider_code("USER_DISABLED").to_string(),
                message: "USER_DISABLED".to_string(),
            });
        }
        Ok(VerifiedToken {
            uid: user.local_id,
            email: user.email,
        })
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> PortResult<String> {
        // The API takes the duration in whole seconds, encoded as an int64 string.
        let body = json!({
            "idToken": id_token,
            "validDuration": expires_in.num_seconds().to_string(),
        });
        let response: SessionCookieResponse =
            self.post(&self.create_session_cookie_url(), &body).await?;
        Ok(response.session_cookie)
    }
}
