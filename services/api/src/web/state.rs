//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::cookie::CookieSettings;
use account_core::AccountService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub cookies: CookieSettings,
}

impl AppState {
    /// Applies the account-flow settings of `config` to the service and cookies.
    pub fn new(accounts: AccountService, config: &Config) -> Self {
        Self {
            accounts: accounts.with_token_match(config.require_token_match),
            cookies: CookieSettings::from_config(config),
        }
    }
}
