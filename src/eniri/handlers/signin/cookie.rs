//! Signed cookies bound to the process secret.
//!
//! Wire format: `b64url(plaintext).b64url(hmac_sha256(b64url(plaintext)))`.
//! The MAC covers the encoded payload, so any mutation of the stored value
//! invalidates the signature. Nothing here needs server-side storage.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum CookieError {
    /// Signature mismatch or malformed wire value.
    #[error("invalid cookie signature")]
    InvalidSignature,
    /// The MAC could not be keyed with the process secret.
    #[error("cookie signing failed: {0}")]
    Signing(String),
    /// The rendered cookie is not a valid header value.
    #[error("failed to write cookie: {0}")]
    Write(#[from] InvalidHeaderValue),
}

/// Per-cookie attributes. A `None` `max_age` renders no `Max-Age`, which
/// makes the cookie expire with the user agent session.
#[derive(Clone, Debug)]
pub struct CookieOptions {
    pub max_age: Option<i64>,
    pub path: &'static str,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: &'static str,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            path: "/",
            http_only: true,
            secure: false,
            same_site: "Lax",
        }
    }
}

fn keyed_mac(secret: &SecretString) -> Result<HmacSha256, CookieError> {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|err| CookieError::Signing(err.to_string()))
}

/// Compute the signed wire value for `plaintext`.
pub(super) fn seal(plaintext: &str, secret: &SecretString) -> Result<String, CookieError> {
    let payload = URL_SAFE_NO_PAD.encode(plaintext.as_bytes());
    let mut mac = keyed_mac(secret)?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{payload}.{signature}"))
}

/// Verify a wire value and return its plaintext.
///
/// Signature comparison is constant time via `Mac::verify_slice`; malformed
/// values fail the same way as bad signatures.
pub(super) fn unseal(wire: &str, secret: &SecretString) -> Result<String, CookieError> {
    let (payload, signature) = wire.split_once('.').ok_or(CookieError::InvalidSignature)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| CookieError::InvalidSignature)?;
    let mut mac = keyed_mac(secret)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| CookieError::InvalidSignature)?;
    let plaintext = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| CookieError::InvalidSignature)?;
    String::from_utf8(plaintext).map_err(|_| CookieError::InvalidSignature)
}

/// Sign `plaintext` and append a `Set-Cookie` header for `name`.
pub(super) fn set_signed_cookie(
    headers: &mut HeaderMap,
    name: &str,
    plaintext: &str,
    secret: &SecretString,
    options: &CookieOptions,
) -> Result<(), CookieError> {
    let value = seal(plaintext, secret)?;
    let mut cookie = format!("{name}={value}; Path={}", options.path);
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(options.same_site);
    if let Some(max_age) = options.max_age {
        cookie.push_str("; Max-Age=");
        cookie.push_str(&max_age.to_string());
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    headers.append(SET_COOKIE, HeaderValue::from_str(&cookie)?);
    Ok(())
}

/// Read cookie `name` from the request headers and verify its signature.
///
/// Returns `Ok(None)` when the cookie is absent.
pub(super) fn get_signed_cookie(
    headers: &HeaderMap,
    name: &str,
    secret: &SecretString,
) -> Result<Option<String>, CookieError> {
    let Some(wire) = extract_cookie(headers, name) else {
        return Ok(None);
    };
    unseal(&wire, secret).map(Some)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}
