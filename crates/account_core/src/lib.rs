pub mod accounts;
pub mod domain;
pub mod ports;

pub use accounts::AccountService;
pub use domain::{
    Account, ActionOutcome, ProviderUser, SessionCookie, SignInOutcome, SignInParams,
    SignUpParams, VerifiedToken,
};
pub use ports::{AccountStore, IdentityProvider, PortError, PortResult};
