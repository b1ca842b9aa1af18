//! Schema identity and compiled schema documents
//!
//! A published document is addressed by `(category, version, name)`:
//! - URL path: `/schemas/<category>/<version>/<name>.json`
//! - `$id`: the URL path under [`SCHEMA_BASE_URL`](super::SCHEMA_BASE_URL)

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::published::SCHEMA_BASE_URL;

/// Identifies one published schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaKey {
    pub category: String,
    pub version: String,
    pub name: String,
}

impl SchemaKey {
    pub fn new(
        category: impl Into<String>,
        version: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            version: version.into(),
            name: name.into(),
        }
    }

    /// File name including the `.json` extension
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// `<category>/<version>/<name>.json`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.category)
            .join(&self.version)
            .join(self.file_name())
    }

    /// Path served by the schema server
    pub fn url_path(&self) -> String {
        format!("/schemas/{}/{}/{}", self.category, self.version, self.file_name())
    }

    /// Canonical `$id` of the document
    pub fn id_url(&self) -> String {
        format!("{}{}", SCHEMA_BASE_URL, self.url_path())
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.version, self.name)
    }
}

/// A registered schema document with its compiled validator.
///
/// `content` holds the exact bytes the document was registered with;
/// `digest` is the SHA-256 of those bytes and doubles as the HTTP ETag.
pub struct PublishedSchema {
    pub key: SchemaKey,
    pub document: Value,
    pub content: String,
    pub digest: String,
    pub(crate) compiled: jsonschema::Validator,
}

impl PublishedSchema {
    /// The `$id` declared by the document
    pub fn id(&self) -> &str {
        self.document
            .get("$id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Parsed `version` of the document
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.key.version).ok()
    }
}

impl fmt::Debug for PublishedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishedSchema")
            .field("key", &self.key)
            .field("digest", &self.digest)
            .field("bytes", &self.content.len())
            .finish()
    }
}
