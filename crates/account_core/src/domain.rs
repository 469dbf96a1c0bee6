//! crates/account_core/src/domain.rs
//!
//! Defines the pure, core data structures for the account flows.
//! These structs are independent of any transport or serialization format.

use chrono::Duration;

/// The account record kept in the document store, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub name: String,
    pub email: String,
}

/// A user as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: bool,
}

/// The identity asserted by a verified `idToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: Option<String>,
}

/// An opaque session credential minted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub value: String,
    pub max_age: Duration,
}

// Caller-supplied input for account creation. Nothing here is validated.
#[derive(Debug, Clone)]
pub struct SignUpParams {
    pub uid: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SignInParams {
    pub email: String,
    pub id_token: String,
}

/// The two-field result every account flow reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of a sign-in: the outcome plus the cookie to set when it succeeded.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub result: ActionOutcome,
    pub session: Option<SessionCookie>,
}

impl SignInOutcome {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            result: ActionOutcome::failure(message),
            session: None,
        }
    }
}
