//! Sign-in handshake handlers and supporting modules.
//!
//! Two entry points, both ending in a signed session cookie:
//!
//! - `POST /sign-in/oauth` starts a delegated OAuth2 authorization-code flow
//!   with a CSRF state binding and a PKCE code verifier, both persisted in
//!   signed short-TTL cookies.
//! - `POST /sign-in/credential` authenticates a local email/password account.
//!   Unknown emails, accounts without a password digest, and wrong passwords
//!   are indistinguishable to the caller; only the diagnostic log tells them
//!   apart.
//!
//! The cookie signing secret and cookie defaults are process-wide, read-only
//! configuration built once at startup (`SignInConfig`) and shared across
//! requests via `SignInState`.

pub(crate) mod cookie;
pub(crate) mod credential;
mod error;
pub(crate) mod oauth;
pub mod password;
pub(crate) mod providers;
pub(crate) mod session;
mod state;
pub(crate) mod storage;
pub(crate) mod types;
mod utils;

pub use credential::sign_in_credential;
pub use oauth::sign_in_oauth;
pub use providers::{Provider, ProviderRegistry};
pub use state::{SignInConfig, SignInState};
