//! crates/account_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the account flows.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the hosted identity provider and document store.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::{Account, ProviderUser, VerifiedToken};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Provider error code reported when an email address is already registered.
pub const EMAIL_ALREADY_EXISTS: &str = "auth/email-already-exists";

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, JSON).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Provider error {code}: {message}")]
    Provider { code: String, message: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

impl PortError {
    /// The provider-specific error code, if the error carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            PortError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves an email address to a provider user. `Ok(None)` when no user has it.
    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<ProviderUser>>;

    /// Verifies an `idToken` and returns the identity it asserts.
    async fn verify_id_token(&self, id_token: &str) -> PortResult<VerifiedToken>;

    /// Exchanges an `idToken` for a session cookie valid for `expires_in`.
    async fn create_session_cookie(&self, id_token: &str, expires_in: Duration)
        -> PortResult<String>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, uid: &str) -> PortResult<Option<Account>>;

    /// Writes a new account record.
    ///
    /// Implementations must fail with `PortError::AlreadyExists` rather than
    /// overwrite a record whose `uid` is already present.
    async fn set_account(&self, account: &Account) -> PortResult<()>;
}
