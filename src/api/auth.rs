//! Credential gate for the protected API routes.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use constant_time_eq::constant_time_eq;
use tracing::{debug, error};

use super::handlers::{AppState, ErrorBody};
use crate::error::AuthError;

/// Public half of the credential pair.
pub const PUBLIC_KEY: &str = "NZ_PUB_7f9a2e8c4b6d1a5f3e0c9b7a4d2f8e1c";

/// Query parameter carrying the public key.
pub const PUBLIC_KEY_PARAM: &str = "public_key";
/// Query parameter carrying the secret key.
pub const SECRET_KEY_PARAM: &str = "secret_key";
/// Header fallback for the public key.
pub const PUBLIC_KEY_HEADER: &str = "X-Public-Key";
/// Header fallback for the secret key.
pub const SECRET_KEY_HEADER: &str = "X-Secret-Key";

/// Keys supplied by a client.
///
/// Query parameters win over headers; empty values count as missing.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key.is_some())
            .field("secret_key", &self.secret_key.is_some())
            .finish()
    }
}

impl Credentials {
    /// Extract the keys from a request's query string and headers.
    pub fn extract(uri: &Uri, headers: &HeaderMap) -> Self {
        let params = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(params)| params)
            .unwrap_or_default();

        Self {
            public_key: query_value(&params, PUBLIC_KEY_PARAM)
                .or_else(|| header_value(headers, PUBLIC_KEY_HEADER)),
            secret_key: query_value(&params, SECRET_KEY_PARAM)
                .or_else(|| header_value(headers, SECRET_KEY_HEADER)),
        }
    }

    /// Both keys, or `None` if either is missing.
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.public_key.as_deref()?, self.secret_key.as_deref()?))
    }
}

// First occurrence wins, matching common query-string semantics.
fn query_value(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
        .filter(|value| !value.is_empty())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check a supplied pair against the public key and the stored secret.
///
/// An absent stored secret never matches.
pub fn verify(public_key: &str, secret_key: &str, stored: Option<&str>) -> Result<(), AuthError> {
    let public_ok = constant_time_eq(public_key.as_bytes(), PUBLIC_KEY.as_bytes());
    let secret_ok = stored
        .map(|stored| constant_time_eq(secret_key.as_bytes(), stored.as_bytes()))
        .unwrap_or(false);

    if public_ok && secret_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidKeys)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingKeys => StatusCode::UNAUTHORIZED,
            AuthError::InvalidKeys => StatusCode::FORBIDDEN,
        };
        let body = ErrorBody {
            error: self.to_string(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Axum middleware that requires a matching public/secret key pair.
///
/// The secret is re-read from the provider on every request.
pub async fn require_api_keys(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = Credentials::extract(request.uri(), request.headers());

    let Some((public_key, secret_key)) = credentials.pair() else {
        debug!(path = %request.uri().path(), ?credentials, "rejecting request: missing API keys");
        return AuthError::MissingKeys.into_response();
    };

    let stored = match state.secrets.current_secret() {
        Ok(stored) => stored,
        Err(err) => {
            error!(error = %err, "failed to read API secret");
            return state
                .pages
                .error_page(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    if let Err(rejection) = verify(public_key, secret_key, stored.as_deref()) {
        debug!(
            path = %request.uri().path(),
            secret_configured = stored.is_some(),
            "rejecting request: invalid API keys"
        );
        return rejection.into_response();
    }

    next.run(request).await
}
