//! Sources for the API secret key.

use std::io;
use std::path::{Path, PathBuf};

/// Supplies the secret key the credential gate compares against.
///
/// Called once per gated request. `Ok(None)` means no secret is
/// configured, which the gate treats as a mismatch for every request.
pub trait SecretProvider: Send + Sync {
    /// Current secret, if one is configured.
    fn current_secret(&self) -> io::Result<Option<String>>;
}

/// Secret read from a single-line file on every call.
#[derive(Debug, Clone)]
pub struct FileSecret {
    path: PathBuf,
}

impl FileSecret {
    /// Read the secret from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the secret is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretProvider for FileSecret {
    fn current_secret(&self) -> io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(content.trim().to_string()))
    }
}

/// Fixed in-memory secret.
#[derive(Clone, Default)]
pub struct StaticSecret(Option<String>);

impl StaticSecret {
    /// A provider that always returns `secret`.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Some(secret.into()))
    }

    /// A provider with no secret configured.
    pub fn absent() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticSecret")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SecretProvider for StaticSecret {
    fn current_secret(&self) -> io::Result<Option<String>> {
        Ok(self.0.clone())
    }
}
