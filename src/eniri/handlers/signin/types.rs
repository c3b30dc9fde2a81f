//! Request/response types for the sign-in endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OauthSignInRequest {
    /// Id of a registered provider.
    pub provider: String,
    /// Where to send the user after the provider round trip.
    #[serde(rename = "callbackURL")]
    pub callback_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OauthSignInQuery {
    /// URL of the page that initiated sign-in; its origin is the redirect
    /// fallback when no callback URL is supplied.
    #[serde(rename = "currentURL")]
    pub current_url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OauthSignInResponse {
    pub url: String,
    pub state: String,
    /// Returned in the body as well as the cookie so non-cookie-capable
    /// clients can echo it back on callback.
    #[serde(rename = "codeVerifier")]
    pub code_verifier: String,
    pub redirect: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CredentialSignInRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: Option<String>,
    /// When true the session cookie carries no `Max-Age` and expires with
    /// the user agent session.
    #[serde(rename = "dontRememberMe", default)]
    pub dont_remember_me: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CredentialSignInResponse {
    pub user: UserResponse,
    pub session: SessionResponse,
    pub redirect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn oauth_request_uses_wire_field_names() -> Result<()> {
        let request: OauthSignInRequest = serde_json::from_value(serde_json::json!({
            "provider": "github",
            "callbackURL": "https://app.example.com/done",
        }))?;
        assert_eq!(request.provider, "github");
        assert_eq!(
            request.callback_url.as_deref(),
            Some("https://app.example.com/done")
        );
        Ok(())
    }

    #[test]
    fn credential_request_defaults_dont_remember_me() -> Result<()> {
        let request: CredentialSignInRequest = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "password": "hunter2",
        }))?;
        assert!(!request.dont_remember_me);
        assert_eq!(request.callback_url, None);
        Ok(())
    }

    #[test]
    fn oauth_response_round_trips() -> Result<()> {
        let response = OauthSignInResponse {
            url: "https://provider.example.com/authorize".to_string(),
            state: "state".to_string(),
            code_verifier: "verifier".to_string(),
            redirect: true,
        };
        let value = serde_json::to_value(&response)?;
        let verifier = value
            .get("codeVerifier")
            .and_then(serde_json::Value::as_str)
            .context("missing codeVerifier")?;
        assert_eq!(verifier, "verifier");
        let decoded: OauthSignInResponse = serde_json::from_value(value)?;
        assert!(decoded.redirect);
        Ok(())
    }

    #[test]
    fn credential_response_omits_absent_url() -> Result<()> {
        let response = CredentialSignInResponse {
            user: UserResponse {
                id: "id".to_string(),
                email: "a@x.com".to_string(),
                name: None,
            },
            session: SessionResponse {
                token: "token".to_string(),
                user_id: "id".to_string(),
                expires_at: 0,
            },
            redirect: false,
            url: None,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("url").is_none());
        assert!(value.get("session").and_then(|s| s.get("userId")).is_some());
        Ok(())
    }
}
