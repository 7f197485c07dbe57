//! HTTP API route definitions.

use std::any::Any;

use axum::{
    handler::Handler,
    http::StatusCode,
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use super::auth::require_api_keys;
use super::handlers::{apps, contact, discord, health, index, not_found, v2rays, whatsapp, AppState};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), require_api_keys);
    let pages = state.pages.clone();

    Router::new()
        // Pages
        .route("/", get_only(index))
        .route("/contact", get_only(contact))
        // JSON API
        .route("/api/health", get_only(health))
        .route("/api/v2rays", get_only(v2rays).route_layer(gate))
        .route("/api/apps", get_only(apps))
        // Social links
        .route("/whatsapp", get_only(whatsapp))
        .route("/discord", get_only(discord))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            error!(panic = panic_message(panic.as_ref()), "handler panicked");
            pages.error_page(StatusCode::INTERNAL_SERVER_ERROR)
        }))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// GET (and HEAD) only; any other method gets the not-found page.
fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(not_found)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
