//! Sign-in configuration, shared state, and the OAuth flow state.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use super::cookie::CookieOptions;
use super::providers::ProviderRegistry;
use super::utils::generate_token;
use anyhow::Result;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_FLOW_TTL_SECONDS: i64 = 10 * 60;
const SESSION_COOKIE_NAME: &str = "eniri_session";
const STATE_COOKIE_NAME: &str = "eniri_oauth_state";
const CODE_VERIFIER_COOKIE_NAME: &str = "eniri_code_verifier";

/// Process-wide sign-in configuration.
///
/// Built once at startup and shared read-only across requests; the signing
/// secret never changes after init.
#[derive(Clone, Debug)]
pub struct SignInConfig {
    base_url: String,
    secret: SecretString,
    session_ttl_seconds: i64,
    flow_ttl_seconds: i64,
    credential_enabled: bool,
}

impl SignInConfig {
    #[must_use]
    pub fn new(base_url: String, secret: SecretString) -> Self {
        Self {
            base_url,
            secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            flow_ttl_seconds: DEFAULT_FLOW_TTL_SECONDS,
            credential_enabled: true,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_flow_ttl_seconds(mut self, seconds: i64) -> Self {
        self.flow_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_credential_enabled(mut self, enabled: bool) -> Self {
        self.credential_enabled = enabled;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub(super) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn credential_enabled(&self) -> bool {
        self.credential_enabled
    }

    /// Only mark cookies secure when the service is served over HTTPS.
    pub(super) fn cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    pub(super) fn session_cookie_name(&self) -> &'static str {
        SESSION_COOKIE_NAME
    }

    pub(super) fn state_cookie_name(&self) -> &'static str {
        STATE_COOKIE_NAME
    }

    pub(super) fn code_verifier_cookie_name(&self) -> &'static str {
        CODE_VERIFIER_COOKIE_NAME
    }

    /// Short-TTL options shared by the two OAuth flow cookies.
    pub(super) fn flow_cookie_options(&self) -> CookieOptions {
        CookieOptions {
            max_age: Some(self.flow_ttl_seconds),
            secure: self.cookie_secure(),
            ..CookieOptions::default()
        }
    }

    /// Session cookie options. Without `remember` the `Max-Age` attribute is
    /// dropped and the cookie expires with the user agent session.
    pub(super) fn session_cookie_options(&self, remember: bool) -> CookieOptions {
        CookieOptions {
            max_age: remember.then_some(self.session_ttl_seconds),
            secure: self.cookie_secure(),
            ..CookieOptions::default()
        }
    }
}

/// Read-only state shared across all requests.
pub struct SignInState {
    config: SignInConfig,
    providers: ProviderRegistry,
}

impl SignInState {
    #[must_use]
    pub fn new(config: SignInConfig, providers: ProviderRegistry) -> Self {
        Self { config, providers }
    }

    #[must_use]
    pub fn config(&self) -> &SignInConfig {
        &self.config
    }

    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }
}

/// CSRF state for one OAuth initiation.
///
/// `state` goes to the external provider; `binder` never leaves the signed
/// cookie. The two tokens are generated independently, so neither is
/// derivable from the other, and both expire with the flow cookie.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct OauthFlowState {
    pub(super) state: String,
    pub(super) binder: String,
    pub(super) redirect: String,
}

impl OauthFlowState {
    /// Generate fresh tokens bound to the resolved redirect target.
    ///
    /// Target resolution order: explicit callback URL, else the origin of
    /// the page that initiated sign-in, else the service base URL. The order
    /// decides where the user lands after login; keep it.
    pub(super) fn generate(
        callback_url: Option<&str>,
        current_url: Option<&str>,
        base_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            state: generate_token()?,
            binder: generate_token()?,
            redirect: resolve_redirect_target(callback_url, current_url, base_url),
        })
    }
}

fn resolve_redirect_target(
    callback_url: Option<&str>,
    current_url: Option<&str>,
    base_url: &str,
) -> String {
    if let Some(callback) = callback_url {
        return callback.to_string();
    }
    if let Some(origin) = current_url.and_then(current_page_origin) {
        return origin;
    }
    base_url.to_string()
}

fn current_page_origin(current_url: &str) -> Option<String> {
    let parsed = Url::parse(current_url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}
