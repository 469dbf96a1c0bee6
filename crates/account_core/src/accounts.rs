//! crates/account_core/src/accounts.rs
//!
//! The account flows: sign-up, sign-in and session-cookie issuance.
//!
//! Every flow reports its result as an `ActionOutcome`. Port errors never
//! escape this module; they are logged and translated into a failure message.

use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info, warn};

use crate::domain::{
    Account, ActionOutcome, SessionCookie, SignInOutcome, SignInParams, SignUpParams,
};
use crate::ports::{AccountStore, IdentityProvider, PortError, PortResult, EMAIL_ALREADY_EXISTS};

/// Lifetime of an issued session cookie, in seconds (one week).
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

pub const USER_ALREADY_EXISTS: &str = "User already exists. Please sign in instead.";
pub const ACCOUNT_CREATED: &str = "Account created successfully. Please sign in.";
pub const EMAIL_IN_USE: &str = "This email is already in use.";
pub const ACCOUNT_CREATION_FAILED: &str = "Failed to create an account";
pub const USER_DOES_NOT_EXIST: &str = "User does not exist. Please create an account instead.";
pub const LOGGED_IN: &str = "Logged in successfully.";
pub const LOGIN_FAILED: &str = "Failed to log in";

pub fn session_lifetime() -> Duration {
    Duration::seconds(SESSION_MAX_AGE_SECS)
}

//=========================================================================================
// The Account Service
//=========================================================================================

/// Runs the account flows against an identity provider and an account store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    identity: Arc<dyn IdentityProvider>,
    require_token_match: bool,
}

impl AccountService {
    /// Creates a new `AccountService`. Token binding on sign-in is enabled.
    pub fn new(store: Arc<dyn AccountStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            require_token_match: true,
        }
    }

    /// When enabled, sign-in refuses an `idToken` whose uid differs from the
    /// uid of the account resolved by email.
    pub fn with_token_match(mut self, require_token_match: bool) -> Self {
        self.require_token_match = require_token_match;
        self
    }

    /// Creates the account record for `uid` unless one already exists.
    pub async fn sign_up(&self, params: SignUpParams) -> ActionOutcome {
        match self.create_account(params).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error creating user: {:?}", e);
                match e {
                    PortError::AlreadyExists(_) => ActionOutcome::failure(USER_ALREADY_EXISTS),
                    e if e.code() == Some(EMAIL_ALREADY_EXISTS) => {
                        ActionOutcome::failure(EMAIL_IN_USE)
                    }
                    _ => ActionOutcome::failure(ACCOUNT_CREATION_FAILED),
                }
            }
        }
    }

    async fn create_account(&self, params: SignUpParams) -> PortResult<ActionOutcome> {
        if self.store.get_account(&params.uid).await?.is_some() {
            warn!(uid = %params.uid, "Sign-up rejected, account already exists");
            return Ok(ActionOutcome::failure(USER_ALREADY_EXISTS));
        }

        let account = Account {
            uid: params.uid,
            name: params.name,
            email: params.email,
        };
        self.store.set_account(&account).await?;
        info!(uid = %account.uid, "Account created");

        Ok(ActionOutcome::success(ACCOUNT_CREATED))
    }

    /// Signs in the provider user registered under `email`, issuing a session cookie.
    pub async fn sign_in(&self, params: SignInParams) -> SignInOutcome {
        match self.authenticate(params).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error signing in: {:?}", e);
                SignInOutcome::rejected(LOGIN_FAILED)
            }
        }
    }

    async fn authenticate(&self, params: SignInParams) -> PortResult<SignInOutcome> {
        let Some(user) = self.identity.get_user_by_email(&params.email).await? else {
            warn!("Sign-in rejected, no provider user for the given email");
            return Ok(SignInOutcome::rejected(USER_DOES_NOT_EXIST));
        };

        if self.require_token_match {
            let verified = self.identity.verify_id_token(&params.id_token).await?;
            if verified.uid != user.uid {
                warn!(uid = %user.uid, "Sign-in rejected, idToken belongs to another account");
                return Err(PortError::Unauthorized);
            }
        }

        let session = self.issue_session_cookie(&params.id_token).await?;
        info!(uid = %user.uid, "User signed in");

        Ok(SignInOutcome {
            result: ActionOutcome::success(LOGGED_IN),
            session: Some(session),
        })
    }

    /// Exchanges `id_token` for a one-week session cookie.
    pub async fn issue_session_cookie(&self, id_token: &str) -> PortResult<SessionCookie> {
        let max_age = session_lifetime();
        let value = self
            .identity
            .create_session_cookie(id_token, max_age)
            .await?;
        Ok(SessionCookie { value, max_age })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProviderUser, VerifiedToken};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        accounts: Mutex<HashMap<String, Account>>,
        writes: AtomicUsize,
        write_error: Mutex<Option<PortError>>,
    }

    #[async_trait]
    impl AccountStore for MockStore {
        async fn get_account(&self, uid: &str) -> PortResult<Option<Account>> {
            Ok(self.accounts.lock().unwrap().get(uid).cloned())
        }

        async fn set_account(&self, account: &Account) -> PortResult<()> {
            if let Some(e) = self.write_error.lock().unwrap().take() {
                return Err(e);
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.accounts
                .lock()
                .unwrap()
                .insert(account.uid.clone(), account.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockIdentity {
        users: HashMap<String, ProviderUser>,
        tokens: HashMap<String, String>,
        cookie_requests: Mutex<Vec<Duration>>,
        fail_cookie: bool,
    }

    impl MockIdentity {
        fn with_user(uid: &str, email: &str, token: &str) -> Self {
            let mut identity = Self::default();
            identity.users.insert(
                email.to_string(),
                ProviderUser {
                    uid: uid.to_string(),
                    email: Some(email.to_string()),
                    display_name: None,
                    disabled: false,
                },
            );
            identity.tokens.insert(token.to_string(), uid.to_string());
            identity
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentity {
        async fn get_user_by_email(&self, email: &str) -> PortResult<Option<ProviderUser>> {
            Ok(self.users.get(email).cloned())
        }

        async fn verify_id_token(&self, id_token: &str) -> PortResult<VerifiedToken> {
            self.tokens
                .get(id_token)
                .map(|uid| VerifiedToken {
                    uid: uid.clone(),
                    email: None,
                })
                .ok_or(PortError::Unauthorized)
        }

        async fn create_session_cookie(
            &self,
            id_token: &str,
            expires_in: Duration,
        ) -> PortResult<String> {
            self.cookie_requests.lock().unwrap().push(expires_in);
            if self.fail_cookie {
                return Err(PortError::Unauthorized);
            }
            Ok(format!("cookie-for-{id_token}"))
        }
    }

    fn service(store: Arc<MockStore>, identity: Arc<MockIdentity>) -> AccountService {
        AccountService::new(store, identity)
    }

    fn sign_up_params(uid: &str, name: &str, email: &str) -> SignUpParams {
        SignUpParams {
            uid: uid.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn sign_up_writes_once_for_new_uid() {
        let store = Arc::new(MockStore::default());
        let accounts = service(store.clone(), Arc::new(MockIdentity::default()));

        let outcome = accounts
            .sign_up(sign_up_params("u1", "Ada", "ada@example.com"))
            .await;

        assert_eq!(outcome, ActionOutcome::success(ACCOUNT_CREATED));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_sign_up_keeps_original_record() {
        let store = Arc::new(MockStore::default());
        let accounts = service(store.clone(), Arc::new(MockIdentity::default()));

        let first = accounts
            .sign_up(sign_up_params("u1", "Ada", "ada@example.com"))
            .await;
        let second = accounts
            .sign_up(sign_up_params("u1", "Mallory", "mallory@example.com"))
            .await;

        assert!(first.success);
        assert_eq!(second, ActionOutcome::failure(USER_ALREADY_EXISTS));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        let stored = store.accounts.lock().unwrap().get("u1").cloned().unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.email, "ada@example.com");
    }

    #[tokio::test]
    async fn sign_up_maps_duplicate_email_code() {
        let store = Arc::new(MockStore::default());
        *store.write_error.lock().unwrap() = Some(PortError::Provider {
            code: EMAIL_ALREADY_EXISTS.to_string(),
            message: "EMAIL_EXISTS".to_string(),
        });
        let accounts = service(store, Arc::new(MockIdentity::default()));

        let outcome = accounts
            .sign_up(sign_up_params("u2", "Bob", "bob@example.com"))
            .await;

        assert_eq!(outcome, ActionOutcome::failure(EMAIL_IN_USE));
    }

    #[tokio::test]
    async fn sign_up_maps_lost_create_race_to_duplicate() {
        let store = Arc::new(MockStore::default());
        *store.write_error.lock().unwrap() = Some(PortError::AlreadyExists("u3".to_string()));
        let accounts = service(store, Arc::new(MockIdentity::default()));

        let outcome = accounts
            .sign_up(sign_up_params("u3", "Cy", "cy@example.com"))
            .await;

        assert_eq!(outcome, ActionOutcome::failure(USER_ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn sign_up_maps_other_errors_to_generic_failure() {
        let store = Arc::new(MockStore::default());
        *store.write_error.lock().unwrap() =
            Some(PortError::Unexpected("connection reset".to_string()));
        let accounts = service(store, Arc::new(MockIdentity::default()));

        let outcome = accounts
            .sign_up(sign_up_params("u4", "Dee", "dee@example.com"))
            .await;

        assert_eq!(outcome, ActionOutcome::failure(ACCOUNT_CREATION_FAILED));
    }

    #[tokio::test]
    async fn sign_in_unknown_email_never_requests_cookie() {
        let identity = Arc::new(MockIdentity::default());
        let accounts = service(Arc::new(MockStore::default()), identity.clone());

        let outcome = accounts
            .sign_in(SignInParams {
                email: "ghost@example.com".to_string(),
                id_token: "token".to_string(),
            })
            .await;

        assert_eq!(outcome.result, ActionOutcome::failure(USER_DOES_NOT_EXIST));
        assert!(outcome.session.is_none());
        assert!(identity.cookie_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_in_issues_one_week_cookie() {
        let identity = Arc::new(MockIdentity::with_user("u1", "ada@example.com", "tok-1"));
        let accounts = service(Arc::new(MockStore::default()), identity.clone());

        let outcome = accounts
            .sign_in(SignInParams {
                email: "ada@example.com".to_string(),
                id_token: "tok-1".to_string(),
            })
            .await;

        assert_eq!(outcome.result, ActionOutcome::success(LOGGED_IN));
        let session = outcome.session.expect("session cookie");
        assert_eq!(session.value, "cookie-for-tok-1");
        assert_eq!(session.max_age.num_seconds(), 604_800);
        assert_eq!(
            identity.cookie_requests.lock().unwrap().as_slice(),
            &[Duration::seconds(604_800)]
        );
    }

    #[tokio::test]
    async fn sign_in_rejects_token_of_another_account() {
        let mut identity = MockIdentity::with_user("u1", "ada@example.com", "tok-1");
        identity.tokens.insert("tok-2".to_string(), "u2".to_string());
        let identity = Arc::new(identity);
        let accounts = service(Arc::new(MockStore::default()), identity.clone());

        let outcome = accounts
            .sign_in(SignInParams {
                email: "ada@example.com".to_string(),
                id_token: "tok-2".to_string(),
            })
            .await;

        assert_eq!(outcome.result, ActionOutcome::failure(LOGIN_FAILED));
        assert!(outcome.session.is_none());
        assert!(identity.cookie_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_in_skips_token_binding_when_disabled() {
        let identity = Arc::new(MockIdentity::with_user("u1", "ada@example.com", "tok-1"));
        let accounts =
            service(Arc::new(MockStore::default()), identity).with_token_match(false);

        let outcome = accounts
            .sign_in(SignInParams {
                email: "ada@example.com".to_string(),
                id_token: "unverifiable".to_string(),
            })
            .await;

        assert!(outcome.result.success);
        assert!(outcome.session.is_some());
    }

    #[tokio::test]
    async fn sign_in_maps_cookie_failure_to_generic_failure() {
        let mut identity = MockIdentity::with_user("u1", "ada@example.com", "tok-1");
        identity.fail_cookie = true;
        let accounts = service(Arc::new(MockStore::default()), Arc::new(identity));

        let outcome = accounts
            .sign_in(SignInParams {
                email: "ada@example.com".to_string(),
                id_token: "tok-1".to_string(),
            })
            .await;

        assert_eq!(outcome.result, ActionOutcome::failure(LOGIN_FAILED));
        assert!(outcome.session.is_none());
    }
}
