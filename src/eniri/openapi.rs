use super::handlers::{health, signin};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(description = "Sign-in service"),
    paths(
        health::health,
        signin::oauth::sign_in_oauth,
        signin::credential::sign_in_credential,
    ),
    components(schemas(
        signin::types::OauthSignInRequest,
        signin::types::OauthSignInResponse,
        signin::types::CredentialSignInRequest,
        signin::types::CredentialSignInResponse,
        signin::types::UserResponse,
        signin::types::SessionResponse,
        signin::types::ErrorResponse,
    )),
    tags(
        (name = "eniri", description = "Service endpoints"),
        (name = "sign-in", description = "Authentication handshake")
    )
)]
struct ApiDoc;

/// The `OpenAPI` document served next to the Swagger UI.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::openapi;

    #[test]
    fn openapi_document_lists_sign_in_paths() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/sign-in/oauth"));
        assert!(doc.paths.paths.contains_key("/sign-in/credential"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
