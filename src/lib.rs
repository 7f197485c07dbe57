//! Netzone web backend.
//!
//! Serves the landing and contact pages, read-only JSON documents from a
//! data directory, and redirects to the community's social channels.
//!
//! # Endpoints
//!
//! ```text
//! GET /              landing page
//! GET /contact       contact page
//! GET /api/health    service status
//! GET /api/v2rays    free V2Ray configs (public_key + secret_key required)
//! GET /api/apps      app catalogue
//! GET /whatsapp      302 to the WhatsApp community
//! GET /discord       302 to the Discord server
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`data`]: JSON documents and the API secret
//! - [`api`]: HTTP routes, handlers and the credential gate
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, Result};
