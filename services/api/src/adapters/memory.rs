//! services/api/src/adapters/memory.rs
//!
//! In-process implementations of the `AccountStore` and `IdentityProvider`
//! ports, for running the service without the hosted backends.

use std::collections::HashMap;

use account_core::domain::{Account, ProviderUser, VerifiedToken};
use account_core::ports::{
    AccountStore, IdentityProvider, PortError, PortResult, EMAIL_ALREADY_EXISTS,
};
use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// Account Store
//=========================================================================================

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored account records.
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_account(&self, uid: &str) -> PortResult<Option<Account>> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }

    async fn set_account(&self, account: &Account) -> PortResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.uid) {
            return Err(PortError::AlreadyExists(account.uid.clone()));
        }
        accounts.insert(account.uid.clone(), account.clone());
        Ok(())
    }
}

//=========================================================================================
// Identity Provider
//=========================================================================================

#[derive(Default)]
struct IdentityState {
    // email -> user
    users: HashMap<String, ProviderUser>,
    // idToken -> uid
    id_tokens: HashMap<String, String>,
    // session cookie -> uid
    sessions: HashMap<String, String>,
}

/// Issues opaque random tokens in place of signed JWTs.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    state: RwLock<IdentityState>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns it together with a fresh `idToken` for it.
    pub async fn register_user(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> PortResult<(ProviderUser, String)> {
        let mut state = self.state.write().await;
        if state.users.contains_key(email) {
            return Err(PortError::Provider {
                code: EMAIL_ALREADY_EXISTS.to_string(),
                message: format!("{email} is already registered"),
            });
        }

        let user = ProviderUser {
            uid: Uuid::new_v4().simple().to_string(),
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
            disabled: false,
        };
        let id_token = format!("idt-{}", Uuid::new_v4().simple());
        state.users.insert(email.to_string(), user.clone());
        state.id_tokens.insert(id_token.clone(), user.uid.clone());
        Ok((user, id_token))
    }

    /// Registers the development user and returns its `idToken`.
    ///
    /// Only the email and uid are logged; the token is left to the caller.
    pub async fn seed_dev_user(&self, email: &str) -> PortResult<String> {
        let (user, id_token) = self.register_user(email, Some("Dev")).await?;
        info!(email, uid = %user.uid, "Seeded development user");
        Ok(id_token)
    }

    /// The uid a previously issued session cookie belongs to.
    pub async fn session_owner(&self, session_cookie: &str) -> Option<String> {
        self.state.read().await.sessions.get(session_cookie).cloned()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_user_by_email(&self, email: &str) -> PortResult<Option<ProviderUser>> {
        Ok(self.state.read().await.users.get(email).cloned())
    }

    async fn verify_id_token(&self, id_token: &str) -> PortResult<VerifiedToken> {
        let state = self.state.read().await;
        let uid = state.id_tokens.get(id_token).ok_or(PortError::Unauthorized)?;
        let email = state
            .users
            .values()
            .find(|user| &user.uid == uid)
            .and_then(|user| user.email.clone());
        Ok(VerifiedToken {
            uid: uid.clone(),
            email,
        })
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> PortResult<String> {
        if expires_in <= Duration::zero() {
            return Err(PortError::Provider {
                code: "auth/invalid-session-cookie-duration".to_string(),
                message: "INVALID_DURATION".to_string(),
            });
        }
        let mut state = self.state.write().await;
        let uid = state
            .id_tokens
            .get(id_token)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        let session_cookie = format!("sess-{}", Uuid::new_v4().simple());
        state.sessions.insert(session_cookie.clone(), uid);
        Ok(session_cookie)
    }
}
