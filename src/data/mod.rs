//! Data module for the file-backed documents the API serves.
//!
//! This module handles:
//! - Loading JSON documents from the data directory
//! - Reporting the length of a document's list field
//! - Reading the API secret key

pub mod documents;
pub mod secret;

pub use documents::{count_field, DataDir, APPS_FILE, V2RAYS_FILE};
pub use secret::{FileSecret, SecretProvider, StaticSecret};
