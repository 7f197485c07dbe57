//! JSON documents loaded from the data directory.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::DataError;

/// Document listing the downloadable apps.
pub const APPS_FILE: &str = "apps.json";

/// Document listing the free V2Ray configurations.
pub const V2RAYS_FILE: &str = "free_v2rays.json";

/// Read-only view of the directory holding the JSON documents.
///
/// Nothing is cached: every load hits the filesystem, so edits to the
/// files are served on the next request.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Create a view rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the documents are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `filename` from the data directory.
    ///
    /// A missing file yields an empty object. Read and parse failures are
    /// returned to the caller unchanged.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_json(&self, filename: &str) -> Result<Value, DataError> {
        let path = self.root.join(filename);
        if !path.exists() {
            debug!(path = %path.display(), "document absent, serving empty object");
            return Ok(Value::Object(Map::new()));
        }

        let raw = std::fs::read_to_string(&path)?;
        let doc = serde_json::from_str(&raw)?;
        Ok(doc)
    }
}

/// Length of the list held under `field` in `doc`.
///
/// An absent field counts as zero. Arrays, objects and strings report their
/// length; any other value, or a `doc` that is not an object, is an error.
pub fn count_field(doc: &Value, field: &'static str) -> Result<usize, DataError> {
    let obj = doc.as_object().ok_or(DataError::NotAnObject {
        found: json_type(doc),
    })?;

    match obj.get(field) {
        None => Ok(0),
        Some(Value::Array(items)) => Ok(items.len()),
        Some(Value::Object(entries)) => Ok(entries.len()),
        Some(Value::String(s)) => Ok(s.chars().count()),
        Some(other) => Err(DataError::NoLength {
            field,
            found: json_type(other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
