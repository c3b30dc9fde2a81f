//! Session issuance and the signed session cookie.

use axum::http::HeaderMap;
use sqlx::PgPool;
use tracing::debug;

use super::cookie::{get_signed_cookie, set_signed_cookie, CookieError};
use super::state::SignInConfig;
use super::storage::{lookup_session, SessionRecord, UserRecord};
use super::utils::{extract_client_ip, extract_user_agent, hash_session_token};

/// Request metadata recorded on every session.
#[derive(Debug, Default)]
pub(super) struct RequestContext {
    pub(super) ip_address: Option<String>,
    pub(super) user_agent: Option<String>,
}

impl RequestContext {
    pub(super) fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: extract_client_ip(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// A valid existing session together with its user.
#[derive(Debug)]
pub(super) struct SessionWithUser {
    pub(super) user: UserRecord,
    pub(super) session: SessionRecord,
}

/// Bind a session token to the signed session cookie.
///
/// `remember == false` omits `Max-Age`, so the cookie expires with the user
/// agent session instead of the configured default lifetime.
pub(super) fn bind_session_cookie(
    headers: &mut HeaderMap,
    config: &SignInConfig,
    token: &str,
    remember: bool,
) -> Result<(), CookieError> {
    set_signed_cookie(
        headers,
        config.session_cookie_name(),
        token,
        config.secret(),
        &config.session_cookie_options(remember),
    )
}

/// Resolve the signed session cookie into a session, if the request carries
/// a valid one.
///
/// Invalid signatures and lookup failures are logged and read as "no
/// session", so sign-in proceeds with full authentication instead.
pub(super) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &SignInConfig,
) -> Option<SessionWithUser> {
    let token = match get_signed_cookie(headers, config.session_cookie_name(), config.secret()) {
        Ok(Some(token)) => token,
        Ok(None) => return None,
        Err(err) => {
            debug!("Ignoring session cookie: {err}");
            return None;
        }
    };

    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(Some(row)) => Some(SessionWithUser {
            user: UserRecord {
                id: row.user_id,
                email: row.email,
                name: row.name,
            },
            session: SessionRecord {
                token,
                user_id: row.user_id,
                expires_at_unix: row.expires_at_unix,
            },
        }),
        Ok(None) => None,
        Err(err) => {
            debug!("Session lookup failed, continuing unauthenticated: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::bind_session_cookie;
    use crate::eniri::handlers::signin::SignInConfig;
    use axum::http::{header::SET_COOKIE, HeaderMap};
    use secrecy::SecretString;

    fn config() -> SignInConfig {
        SignInConfig::new(
            "https://id.example.com".to_string(),
            SecretString::from("cookie-secret".to_string()),
        )
        .with_session_ttl_seconds(3600)
    }

    fn rendered_cookie(remember: bool) -> String {
        let mut headers = HeaderMap::new();
        bind_session_cookie(&mut headers, &config(), "session-token", remember).expect("bind");
        headers
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("set-cookie header")
            .to_string()
    }

    #[test]
    fn remember_keeps_configured_max_age() {
        let cookie = rendered_cookie(true);
        assert!(cookie.starts_with("eniri_session="));
        assert!(cookie.contains("; Max-Age=3600"));
        assert!(cookie.contains("; Secure"));
    }

    #[test]
    fn dont_remember_drops_max_age() {
        let cookie = rendered_cookie(false);
        assert!(cookie.starts_with("eniri_session="));
        assert!(!cookie.contains("Max-Age"));
    }
}
