//! Schema HTTP Routes
//!
//! Read-only views of the registry:
//! - `/schemas/` lists categories
//! - `/schemas/{category}/` lists versions
//! - `/schemas/{category}/{version}/` lists documents
//! - `/schemas/{category}/{version}/{name}.json` serves one document
//!
//! Listings are HTML unless `?format=json` is given.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::schema::{SchemaKey, SchemaRegistry};

/// Published documents never change, so clients may cache them forever
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

// ==================
// Response Types
// ==================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl IndexEntry {
    fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Directory,
        }
    }

    fn file(name: String) -> Self {
        Self {
            name,
            kind: EntryKind::File,
        }
    }

    fn href(&self) -> String {
        match self.kind {
            EntryKind::Directory => format!("{}/", self.name),
            EntryKind::File => self.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub format: Option<String>,
}

// ==================
// Router
// ==================

pub fn schema_routes(registry: Arc<SchemaRegistry>) -> Router {
    Router::new()
        .route("/schemas", get(root_index_handler))
        .route("/schemas/", get(root_index_handler))
        .route("/schemas/:category", get(category_index_handler))
        .route("/schemas/:category/", get(category_index_handler))
        .route("/schemas/:category/:version", get(version_index_handler))
        .route("/schemas/:category/:version/", get(version_index_handler))
        .route("/schemas/:category/:version/:file", get(document_handler))
        .with_state(registry)
}

/// Fallback for every path no route claims
pub async fn not_found_handler() -> Response {
    not_found("no such path")
}

// ==================
// Handlers
// ==================

async fn root_index_handler(
    State(registry): State<Arc<SchemaRegistry>>,
    Query(query): Query<IndexQuery>,
) -> Response {
    let entries: Vec<IndexEntry> = registry
        .categories()
        .into_iter()
        .map(IndexEntry::directory)
        .collect();
    listing("/schemas/", false, entries, &query)
}

async fn category_index_handler(
    State(registry): State<Arc<SchemaRegistry>>,
    Path(category): Path<String>,
    Query(query): Query<IndexQuery>,
) -> Response {
    let versions = registry.versions(&category);
    if versions.is_empty() {
        return not_found(&format!("unknown schema category '{}'", category));
    }
    let entries = versions.into_iter().map(IndexEntry::directory).collect();
    listing(&format!("/schemas/{}/", category), true, entries, &query)
}

async fn version_index_handler(
    State(registry): State<Arc<SchemaRegistry>>,
    Path((category, version)): Path<(String, String)>,
    Query(query): Query<IndexQuery>,
) -> Response {
    let documents = registry.documents(&category, &version);
    if documents.is_empty() {
        return not_found(&format!("no schemas for {} {}", category, version));
    }
    let entries = documents
        .into_iter()
        .map(|s| IndexEntry::file(s.key.file_name()))
        .collect();
    listing(
        &format!("/schemas/{}/{}/", category, version),
        true,
        entries,
        &query,
    )
}

async fn document_handler(
    State(registry): State<Arc<SchemaRegistry>>,
    Path((category, version, file)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(name) = file.strip_suffix(".json") else {
        return not_found(&format!("'{}' is not a schema document", file));
    };
    let key = SchemaKey::new(category, version, name);
    let Some(schema) = registry.get(&key) else {
        return not_found(&format!("unknown schema '{}'", key));
    };

    let etag = format!("\"{}\"", schema.digest);
    if matches_etag(&headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [(ETAG, etag), (CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string())],
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (ETAG, etag),
            (CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL.to_string()),
        ],
        schema.content.clone(),
    )
        .into_response()
}

// ==================
// Helpers
// ==================

fn not_found(message: &str) -> Response {
    let body = ErrorResponse {
        error: "not_found".to_string(),
        message: message.to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn listing(path: &str, has_parent: bool, entries: Vec<IndexEntry>, query: &IndexQuery) -> Response {
    if query.format.as_deref() == Some("json") {
        return (StatusCode::OK, Json(entries)).into_response();
    }
    (StatusCode::OK, Html(render_index(path, has_parent, &entries))).into_response()
}

/// `If-None-Match` uses weak comparison, so `W/` prefixes are ignored
fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}

fn render_index(path: &str, has_parent: bool, entries: &[IndexEntry]) -> String {
    let title = escape_html(path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {0}</title></head>\n<body>\n<h1>Index of {0}</h1>\n<ul>\n",
        title
    );
    if has_parent {
        html.push_str("<li><a href=\"../\">../</a></li>\n");
    }
    for entry in entries {
        let href = escape_html(&entry.href());
        html.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", href));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_etag_matching() {
        let etag = "\"abc\"";
        let mut headers = HeaderMap::new();
        assert!(!matches_etag(&headers, etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"xyz\", W/\"abc\""));
        assert!(matches_etag(&headers, etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(matches_etag(&headers, etag));

        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"xyz\""));
        assert!(!matches_etag(&headers, etag));
    }

    #[test]
    fn test_index_entry_serialization() {
        let entries = vec![
            IndexEntry::directory("0.10.0"),
            IndexEntry::file("fmu_results.json".into()),
        ];
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["type"], "directory");
        assert_eq!(json[1]["name"], "fmu_results.json");
        assert_eq!(json[1]["type"], "file");
    }

    #[test]
    fn test_render_index_links() {
        let html = render_index(
            "/schemas/fmu_results/",
            true,
            &[IndexEntry::directory("0.10.0")],
        );
        assert!(html.contains("<title>Index of /schemas/fmu_results/</title>"));
        assert!(html.contains("<a href=\"../\">"));
        assert!(html.contains("<a href=\"0.10.0/\">0.10.0/</a>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a&b>"), "&lt;a&amp;b&gt;");
    }
}
