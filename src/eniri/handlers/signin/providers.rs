//! Runtime-configured provider registry.
//!
//! Providers are descriptors loaded at startup and looked up by id at request
//! time. Only the `oauth2` kind can start a delegated authorization flow;
//! other kinds exist in the registry so a kind mismatch is handled by a plain
//! kind check, not a runtime type test.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum AuthorizationUrlError {
    #[error("invalid authorization endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Descriptor for one delegated authorization provider.
#[derive(Clone, Debug, Deserialize)]
pub struct Oauth2Provider {
    pub id: String,
    pub client_id: String,
    pub authorization_endpoint: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Oauth2Provider {
    /// Build the provider redirect URL for one authorization request.
    ///
    /// The code verifier itself never appears in the URL; only its S256
    /// challenge does.
    pub fn create_authorization_url(
        &self,
        state: &str,
        code_verifier: &str,
    ) -> Result<Url, AuthorizationUrlError> {
        let mut url = Url::parse(&self.authorization_endpoint)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("state", state)
                .append_pair("code_challenge", &code_challenge_s256(code_verifier))
                .append_pair("code_challenge_method", "S256");
            if !self.scopes.is_empty() {
                pairs.append_pair("scope", &self.scopes.join(" "));
            }
        }
        Ok(url)
    }
}

fn code_challenge_s256(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// A registered provider, keyed by `kind`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provider {
    Oauth2(Oauth2Provider),
    /// Local email/password accounts; cannot start a redirect flow.
    Credential { id: String },
}

impl Provider {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Oauth2(provider) => &provider.id,
            Self::Credential { id } => id,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Parse a registry from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("failed to parse provider registry")
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|provider| provider.id() == id)
    }
}
