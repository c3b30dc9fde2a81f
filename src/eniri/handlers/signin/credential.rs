//! Email/password sign-in.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::{
    error::SignInError,
    password::{verify_password, DUMMY_PASSWORD_HASH},
    session::{authenticate_session, bind_session_cookie, RequestContext},
    state::SignInState,
    storage::{find_credential_account, find_user_by_email, insert_session, SessionRecord, UserRecord},
    types::{
        CredentialSignInRequest, CredentialSignInResponse, ErrorResponse, SessionResponse,
        UserResponse,
    },
    utils::valid_email,
};

#[utoipa::path(
    post,
    path = "/sign-in/credential",
    request_body = CredentialSignInRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set", body = CredentialSignInResponse),
        (status = 400, description = "Email and password sign-in is disabled", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Session creation or cookie signing failed", body = ErrorResponse)
    ),
    tag = "sign-in"
)]
pub async fn sign_in_credential(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<SignInState>>,
    payload: Option<Json<CredentialSignInRequest>>,
) -> Response {
    let request: CredentialSignInRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let config = state.config();
    if !config.credential_enabled() {
        return SignInError::CredentialDisabled.into_response();
    }

    // An already-authenticated caller gets their session echoed back, so
    // repeated sign-in calls are idempotent no-ops.
    if let Some(existing) = authenticate_session(&headers, &pool, config).await {
        let body = CredentialSignInResponse {
            user: user_response(&existing.user),
            session: session_response(&existing.session),
            redirect: request.callback_url.is_some(),
            url: request.callback_url,
        };
        return (StatusCode::OK, Json(body)).into_response();
    }

    match authenticate_credentials(&headers, &pool, &state, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn authenticate_credentials(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &SignInState,
    request: CredentialSignInRequest,
) -> Result<Response, SignInError> {
    let config = state.config();

    if !valid_email(&request.email) {
        warn!("Credential sign-in rejected: malformed email");
        equalize_verification_cost(&request.password).await;
        return Err(SignInError::InvalidCredentials);
    }

    let user = match find_user_by_email(pool, &request.email).await {
        Ok(user) => user,
        Err(err) => {
            error!("User lookup failed: {err}");
            return Err(SignInError::Internal);
        }
    };

    let Some(user) = user else {
        warn!("Credential sign-in rejected: unknown email");
        equalize_verification_cost(&request.password).await;
        return Err(SignInError::InvalidCredentials);
    };

    let account = match find_credential_account(pool, user.id).await {
        Ok(account) => account,
        Err(err) => {
            error!("Account lookup failed: {err}");
            return Err(SignInError::Internal);
        }
    };

    let Some(digest) = account.and_then(|account| account.password_hash) else {
        warn!(user_id = %user.id, "Credential sign-in rejected: no password digest on account");
        equalize_verification_cost(&request.password).await;
        return Err(SignInError::InvalidCredentials);
    };

    // Argon2 is CPU-bound by design; keep it off the async reactor.
    let password = request.password.clone();
    match tokio::task::spawn_blocking(move || verify_password(&digest, &password)).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "Credential sign-in rejected: password mismatch");
            return Err(SignInError::InvalidCredentials);
        }
        Err(err) => {
            error!("Password verification task failed: {err}");
            return Err(SignInError::Internal);
        }
    }

    let context = RequestContext::from_headers(headers);
    let session = match insert_session(pool, user.id, &context, config.session_ttl_seconds()).await
    {
        Ok(session) => session,
        Err(err) => {
            error!("Failed to create session: {err}");
            return Err(SignInError::Internal);
        }
    };

    // dontRememberMe inverts remembering: when set, the cookie drops
    // Max-Age and dies with the browser session.
    let mut response_headers = HeaderMap::new();
    if let Err(err) = bind_session_cookie(
        &mut response_headers,
        config,
        &session.token,
        !request.dont_remember_me,
    ) {
        error!("Failed to set session cookie: {err}");
        return Err(SignInError::Internal);
    }

    let body = CredentialSignInResponse {
        user: user_response(&user),
        session: session_response(&session),
        redirect: request.callback_url.is_some(),
        url: request.callback_url,
    };
    Ok((StatusCode::OK, response_headers, Json(body)).into_response())
}

/// Burn the same hashing cost as a real verification so unknown accounts are
/// not distinguishable by response time.
async fn equalize_verification_cost(password: &str) {
    let password = password.to_string();
    if let Err(err) =
        tokio::task::spawn_blocking(move || verify_password(DUMMY_PASSWORD_HASH, &password)).await
    {
        debug!("Dummy verification task failed: {err}");
    }
}

fn user_response(user: &UserRecord) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
    }
}

fn session_response(session: &SessionRecord) -> SessionResponse {
    SessionResponse {
        token: session.token.clone(),
        user_id: session.user_id.to_string(),
        expires_at: session.expires_at_unix,
    }
}
