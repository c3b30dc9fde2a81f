use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::eniri::{
    handlers::signin::{ProviderRegistry, SignInConfig},
    new,
};
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            providers,
            session_ttl,
            credential_disabled,
        } => {
            // Reject malformed base URLs before anything is bound to them.
            Url::parse(&globals.base_url)
                .with_context(|| format!("Invalid base URL: {}", globals.base_url))?;

            let registry = match providers {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read provider registry: {path}"))?;
                    ProviderRegistry::from_json(&raw)
                        .with_context(|| format!("Failed to parse provider registry: {path}"))?
                }
                None => ProviderRegistry::default(),
            };

            let config = SignInConfig::new(globals.base_url.clone(), globals.secret.clone())
                .with_session_ttl_seconds(session_ttl)
                .with_credential_enabled(!credential_disabled);

            new(port, dsn, config, registry).await?;
        }
    }

    Ok(())
}
