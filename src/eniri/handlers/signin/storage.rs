//! Database helpers for users, credential accounts, and sessions.

use anyhow::{anyhow, Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::session::RequestContext;
use super::utils::{generate_token, hash_session_token};

/// Provider id of the local email/password account rows.
pub(super) const CREDENTIAL_PROVIDER_ID: &str = "credential";

/// Minimal user fields needed by the sign-in flows.
#[derive(Debug, Clone)]
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) name: Option<String>,
}

/// Credential account attached to a user. A `None` digest is a valid state:
/// the account exists via another provider and must fail authentication.
#[derive(Debug)]
pub(super) struct AccountRecord {
    pub(super) password_hash: Option<String>,
}

/// A session with its raw token. The token exists only here and in the
/// cookie; the database stores its hash.
#[derive(Debug)]
pub(super) struct SessionRecord {
    pub(super) token: String,
    pub(super) user_id: Uuid,
    pub(super) expires_at_unix: i64,
}

/// Valid-session row joined to its user.
#[derive(Debug)]
pub(super) struct SessionRow {
    pub(super) user_id: Uuid,
    pub(super) email: String,
    pub(super) name: Option<String>,
    pub(super) expires_at_unix: i64,
}

/// Look up a user by exact email; no normalization happens here.
pub(super) async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, email, name FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
    }))
}

/// Find the credential account attached to a user, if any.
pub(super) async fn find_credential_account(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT password_hash
        FROM accounts
        WHERE user_id = $1
          AND provider_id = $2
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(CREDENTIAL_PROVIDER_ID)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credential account")?;

    Ok(row.map(|row| AccountRecord {
        password_hash: row.get("password_hash"),
    }))
}

/// Create a session row tagged with request metadata.
///
/// Generates a random token, stores only its hash, and returns the raw value
/// so the caller can set the session cookie.
pub(super) async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    context: &RequestContext,
    ttl_seconds: i64,
) -> Result<SessionRecord> {
    let query = r"
        INSERT INTO sessions (user_id, token_hash, ip_address, user_agent, expires_at)
        VALUES ($1, $2, $3, $4, NOW() + ($5 * INTERVAL '1 second'))
        RETURNING EXTRACT(EPOCH FROM expires_at)::BIGINT AS expires_at_unix
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(context.ip_address.as_deref())
            .bind(context.user_agent.as_deref())
            .bind(ttl_seconds)
            .fetch_one(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(row) => {
                return Ok(SessionRecord {
                    token,
                    user_id,
                    expires_at_unix: row.get("expires_at_unix"),
                })
            }
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

/// Look up an unexpired session by token hash.
pub(super) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionRow>> {
    let query = r"
        SELECT users.id, users.email, users.name,
               EXTRACT(EPOCH FROM sessions.expires_at)::BIGINT AS expires_at_unix
        FROM sessions
        JOIN users ON users.id = sessions.user_id
        WHERE sessions.token_hash = $1
          AND sessions.expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    if row.is_none() {
        return Ok(None);
    }

    // Record activity for audit/visibility without extending the session TTL.
    let query = "UPDATE sessions SET last_seen_at = NOW() WHERE token_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update session last_seen_at")?;

    Ok(row.map(|row| SessionRow {
        user_id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        expires_at_unix: row.get("expires_at_unix"),
    }))
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn account_without_digest_is_representable() {
        let account = AccountRecord {
            password_hash: None,
        };
        assert!(account.password_hash.is_none());
    }

    #[test]
    fn session_record_holds_values() {
        let record = SessionRecord {
            token: "token".to_string(),
            user_id: Uuid::nil(),
            expires_at_unix: 42,
        };
        assert_eq!(record.token, "token");
        assert_eq!(record.user_id, Uuid::nil());
        assert_eq!(record.expires_at_unix, 42);
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
