use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let base_url = matches
        .get_one("base-url")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --base-url"))?;

    let secret = matches
        .get_one("secret")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --secret"))?;

    let mut globals = GlobalArgs::new(base_url);
    globals.set_secret(SecretString::from(secret));

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow!("missing required argument: --dsn"))?,
        providers: matches
            .get_one("providers")
            .map(|s: &String| s.to_string()),
        session_ttl: matches
            .get_one::<i64>("session-ttl")
            .copied()
            .unwrap_or(604_800),
        credential_disabled: matches.get_flag("disable-credential"),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::handler;
    use crate::cli::{actions::Action, commands};
    use anyhow::Result;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "eniri",
            "--dsn",
            "postgres://localhost/eniri",
            "--base-url",
            "https://id.example.com",
            "--secret",
            "s3cret",
            "--disable-credential",
        ]);

        let (action, globals) = handler(&matches)?;
        assert_eq!(globals.base_url, "https://id.example.com");
        assert_eq!(globals.secret.expose_secret(), "s3cret");

        let Action::Server {
            port,
            dsn,
            providers,
            session_ttl,
            credential_disabled,
        } = action;
        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://localhost/eniri");
        assert_eq!(providers, None);
        assert_eq!(session_ttl, 604_800);
        assert!(credential_disabled);
        Ok(())
    }
}
