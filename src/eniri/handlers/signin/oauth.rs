//! OAuth2 sign-in initiation.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, warn};

use super::{
    cookie::set_signed_cookie,
    error::SignInError,
    providers::Provider,
    state::{OauthFlowState, SignInState},
    types::{ErrorResponse, OauthSignInQuery, OauthSignInRequest, OauthSignInResponse},
    utils::generate_code_verifier,
};

#[utoipa::path(
    post,
    path = "/sign-in/oauth",
    request_body = OauthSignInRequest,
    params(
        ("currentURL" = Option<String>, Query, description = "URL of the page that initiated sign-in")
    ),
    responses(
        (status = 200, description = "Authorization URL and flow tokens", body = OauthSignInResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse),
        (status = 500, description = "Cookie signing or URL construction failed", body = ErrorResponse)
    ),
    tag = "sign-in"
)]
pub async fn sign_in_oauth(
    Query(query): Query<OauthSignInQuery>,
    state: Extension<Arc<SignInState>>,
    payload: Option<Json<OauthSignInRequest>>,
) -> Response {
    let request: OauthSignInRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let config = state.config();

    // Unknown ids and non-OAuth2 kinds are reported identically; callers
    // learn nothing about what is registered.
    let provider = match state.providers().get(&request.provider) {
        Some(Provider::Oauth2(provider)) => provider,
        Some(other) => {
            warn!(provider = other.id(), "Provider cannot start a delegated flow");
            return SignInError::ProviderNotFound.into_response();
        }
        None => {
            warn!(provider = %request.provider, "Unknown provider");
            return SignInError::ProviderNotFound.into_response();
        }
    };

    let flow = match OauthFlowState::generate(
        request.callback_url.as_deref(),
        query.current_url.as_deref(),
        config.base_url(),
    ) {
        Ok(flow) => flow,
        Err(err) => {
            error!("Failed to generate flow state: {err}");
            return SignInError::Internal.into_response();
        }
    };

    let code_verifier = match generate_code_verifier() {
        Ok(verifier) => verifier,
        Err(err) => {
            error!("Failed to generate code verifier: {err}");
            return SignInError::Internal.into_response();
        }
    };

    // The flow state and the verifier travel in two separate short-TTL
    // cookies. A stale pair with no completing callback is simply ignored
    // later, so already-written cookies are not rolled back on failure.
    let flow_json = match serde_json::to_string(&flow) {
        Ok(json) => json,
        Err(err) => {
            error!("Failed to serialize flow state: {err}");
            return SignInError::Internal.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    if let Err(err) = set_signed_cookie(
        &mut response_headers,
        config.state_cookie_name(),
        &flow_json,
        config.secret(),
        &config.flow_cookie_options(),
    ) {
        error!("Failed to set state cookie: {err}");
        return SignInError::Internal.into_response();
    }
    if let Err(err) = set_signed_cookie(
        &mut response_headers,
        config.code_verifier_cookie_name(),
        &code_verifier,
        config.secret(),
        &config.flow_cookie_options(),
    ) {
        error!("Failed to set code verifier cookie: {err}");
        return SignInError::Internal.into_response();
    }

    let url = match provider.create_authorization_url(&flow.state, &code_verifier) {
        Ok(url) => url,
        Err(err) => {
            error!(provider = %provider.id, "Failed to build authorization URL: {err}");
            return SignInError::Internal.into_response();
        }
    };

    let body = OauthSignInResponse {
        url: url.to_string(),
        state: flow.state,
        code_verifier,
        redirect: true,
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}
