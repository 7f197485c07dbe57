//! HTML pages served from the templates directory.
//!
//! Pages are read from disk on every request, so editing a template takes
//! effect without a restart. The not-found page doubles as the generic
//! error page for failures that escape the handlers.

use std::io;
use std::path::{Path, PathBuf};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Landing page.
pub const INDEX_PAGE: &str = "index.html";
/// Contact page.
pub const CONTACT_PAGE: &str = "contact.html";
/// Not-found page, also used for unhandled failures.
pub const ERROR_PAGE: &str = "404.html";

/// Served when the error page itself cannot be read.
const FALLBACK_ERROR_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Page not found</title></head>\n<body><h1>Page not found</h1><p><a href=\"/\">Back to Netzone</a></p></body>\n</html>\n";

/// Reads HTML pages from a directory.
#[derive(Debug, Clone)]
pub struct Pages {
    dir: PathBuf,
}

impl Pages {
    /// Serve pages from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory pages are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read `name` from the templates directory.
    pub fn render(&self, name: &str) -> Result<Html<String>, PageError> {
        let path = self.dir.join(name);
        std::fs::read_to_string(&path)
            .map(Html)
            .map_err(|source| {
                warn!(path = %path.display(), error = %source, "failed to read page");
                PageError {
                    source,
                    pages: self.clone(),
                }
            })
    }

    /// The error page with the given status.
    ///
    /// Never fails: a built-in page is used if the template is unreadable.
    pub fn error_page(&self, status: StatusCode) -> Response {
        let body = match std::fs::read_to_string(self.dir.join(ERROR_PAGE)) {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "error page unavailable, using built-in page");
                FALLBACK_ERROR_PAGE.to_string()
            }
        };
        (status, Html(body)).into_response()
    }
}

/// A failure that escaped a handler; rendered as the generic error page
/// with status 500.
#[derive(Error, Debug)]
#[error("failed to render page: {source}")]
pub struct PageError {
    #[source]
    source: io::Error,
    pages: Pages,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.pages.error_page(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
