//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::pages::{PageError, Pages, CONTACT_PAGE, INDEX_PAGE};
use crate::config::Config;
use crate::data::{count_field, DataDir, FileSecret, SecretProvider, APPS_FILE, V2RAYS_FILE};

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "Netzone API";
/// Service version reported by the health endpoint.
pub const SERVICE_VERSION: &str = "1.0.0";

/// WhatsApp community invite.
pub const WHATSAPP_URL: &str = "https://chat.whatsapp.com/Hre9DcY71UvC32oMVwwUrE";
/// Discord server invite.
pub const DISCORD_URL: &str = "https://discord.gg/DhPZ8uMv4v";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// JSON documents served by the data endpoints.
    pub data: DataDir,
    /// Source of the API secret key.
    pub secrets: Arc<dyn SecretProvider>,
    /// HTML pages, including the error page.
    pub pages: Pages,
}

impl AppState {
    /// Create new app state.
    pub fn new(data: DataDir, secrets: impl SecretProvider + 'static, pages: Pages) -> Self {
        Self {
            data,
            secrets: Arc::new(secrets),
            pages,
        }
    }

    /// App state reading everything from the paths in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            DataDir::new(&config.data_dir),
            FileSecret::new(&config.secret_key_file),
            Pages::new(&config.templates_dir),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("data", &self.data)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

/// Health check response.
///
/// Fields are declared in key order so the body serializes with sorted keys.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Advertised endpoints.
    pub endpoints: BTreeMap<&'static str, &'static str>,
    /// Service name.
    pub service: &'static str,
    /// Always "healthy".
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Success envelope for the data endpoints, fields in key order.
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// Length of the document's list field.
    pub count: usize,
    /// The document as loaded from disk.
    pub data: Value,
    pub success: bool,
}

/// Error body shared by the data endpoints and the credential gate.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Landing page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.pages.render(INDEX_PAGE)
}

/// Contact page.
pub async fn contact(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.pages.render(CONTACT_PAGE)
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    let endpoints = BTreeMap::from([
        ("health", "/api/health"),
        ("v2rays", "/api/v2rays (requires authentication)"),
    ]);

    (
        StatusCode::OK,
        Json(HealthResponse {
            endpoints,
            service: SERVICE_NAME,
            status: "healthy",
            version: SERVICE_VERSION,
        }),
    )
}

/// Free V2Ray configurations. Mounted behind the credential gate.
pub async fn v2rays(State(state): State<AppState>) -> Response {
    serve_document(&state.data, V2RAYS_FILE, "vpn_configs")
}

/// App catalogue.
pub async fn apps(State(state): State<AppState>) -> Response {
    serve_document(&state.data, APPS_FILE, "apps")
}

/// Load `file` and wrap it in an envelope counting `field`.
///
/// Failures are answered here as a JSON 500 rather than reaching the
/// generic error page.
fn serve_document(data: &DataDir, file: &str, field: &'static str) -> Response {
    let envelope = data.load_json(file).and_then(|doc| {
        let count = count_field(&doc, field)?;
        Ok(Envelope {
            count,
            data: doc,
            success: true,
        })
    });

    match envelope {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(err) => {
            warn!(file, error = %err, "failed to serve document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Internal server error".to_string(),
                    message: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Redirect to the WhatsApp community.
pub async fn whatsapp() -> Response {
    found(WHATSAPP_URL)
}

/// Redirect to the Discord server.
pub async fn discord() -> Response {
    found(DISCORD_URL)
}

// `Redirect::to` answers 303; these links have always been 302.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Fallback for unmatched paths and methods.
pub async fn not_found(State(state): State<AppState>) -> Response {
    state.pages.error_page(StatusCode::NOT_FOUND)
}
