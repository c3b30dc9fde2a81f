//! API error taxonomy for the sign-in endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::ErrorResponse;

/// Domain failures, converted at the boundary into a stable `{code, message}`
/// body with a fixed machine-readable code.
///
/// All credential-validation causes collapse into `InvalidCredentials` before
/// reaching this type; only the diagnostic log tells them apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignInError {
    #[error("Provider not found")]
    ProviderNotFound,
    #[error("Email and password sign-in is disabled")]
    CredentialDisabled,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Internal error")]
    Internal,
}

impl SignInError {
    pub(super) const fn status(&self) -> StatusCode {
        match self {
            Self::ProviderNotFound => StatusCode::NOT_FOUND,
            Self::CredentialDisabled => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(super) const fn code(&self) -> &'static str {
        match self {
            Self::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Self::CredentialDisabled => "CREDENTIAL_SIGN_IN_DISABLED",
            Self::InvalidCredentials => "INVALID_EMAIL_OR_PASSWORD",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for SignInError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::SignInError;
    use axum::http::StatusCode;

    #[test]
    fn status_mapping() {
        assert_eq!(SignInError::ProviderNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            SignInError::CredentialDisabled.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SignInError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SignInError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        // One external message for unknown email, missing digest, and wrong
        // password; causes are only distinguishable in the log.
        assert_eq!(
            SignInError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            SignInError::InvalidCredentials.code(),
            "INVALID_EMAIL_OR_PASSWORD"
        );
    }
}
