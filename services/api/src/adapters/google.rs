//! services/api/src/adapters/google.rs
//!
//! Error envelope shared by the Google REST APIs (Identity Toolkit, Firestore).

use account_core::ports::PortError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: GoogleError,
}

/// The `error` object of a failed Google API call.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl GoogleError {
    /// The leading reason token of the message, e.g. `INVALID_ID_TOKEN` out of
    /// `"INVALID_ID_TOKEN : The token has been revoked."`.
    pub fn reason(&self) -> &str {
        self.message
            .split(|c: char| c == ':' || c.is_whitespace())
            .next()
            .unwrap_or_default()
    }
}

/// Parses the error body of a failed call. Bodies that are not a Google error
/// envelope are kept verbatim as the message.
pub fn parse_error(body: &str) -> GoogleError {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| GoogleError {
            message: body.to_string(),
            status: String::new(),
        })
}

/// Consumes a non-success response and returns its status with the parsed error.
pub async fn read_error(response: Response) -> (StatusCode, GoogleError) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    (status, parse_error(&body))
}

pub fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_reason_from_detailed_message() {
        let error = parse_error(
            r#"{"error":{"code":400,"message":"INVALID_ID_TOKEN : Token revoked","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(error.reason(), "INVALID_ID_TOKEN");
        assert_eq!(error.status, "INVALID_ARGUMENT");
    }

    #[test]
    fn keeps_non_json_body_as_message() {
        let error = parse_error("upstream connect error");
        assert_eq!(error.message, "upstream connect error");
        assert_eq!(error.reason(), "upstream");
    }
}
