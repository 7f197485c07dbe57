//! HTTP API module: pages, JSON endpoints, the credential gate and redirects.

pub mod auth;
pub mod handlers;
pub mod pages;
pub mod routes;

pub use auth::{require_api_keys, Credentials, PUBLIC_KEY};
pub use handlers::AppState;
pub use pages::{PageError, Pages};
pub use routes::create_router;
