//! Schema loading from various sources.
//!
//! Handles loading schemas from files, strings, and the dashboard's HTTP
//! schema endpoints.

use std::path::Path;

use serde_json::Value;

use crate::error::ResolveError;
use crate::types::{Protocol, ResourceKind};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist,
/// or `ResolveError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded schema file");
    load_schema_str(&content)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `ResolveError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::InvalidJson { source })
}

/// Load a schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `ResolveError::NetworkError` if the request fails or the server
/// answers with an error status, or if the body isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Value, ResolveError> {
    let network_error = |source| ResolveError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    tracing::debug!(url, "fetching schema");
    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;

    response.json().map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// URL of the schema the dashboard backend publishes for a resource kind.
///
/// ```
/// use proxy_schema::{schema_endpoint, Protocol, ResourceKind};
///
/// let url = schema_endpoint("http://localhost:8080/", Protocol::Http, ResourceKind::Services).unwrap();
/// assert_eq!(url, "http://localhost:8080/api/http/services/schema.json");
/// ```
///
/// # Errors
///
/// Returns `ResolveError::UnsupportedResource` if the backend publishes no
/// schema for this protocol and kind (e.g. UDP TLS).
pub fn schema_endpoint(
    base: &str,
    protocol: Protocol,
    kind: ResourceKind,
) -> Result<String, ResolveError> {
    if !protocol.resource_kinds().contains(&kind) {
        return Err(ResolveError::UnsupportedResource {
            protocol: protocol.to_string(),
            kind: kind.to_string(),
        });
    }

    Ok(format!(
        "{}/api/{}/{}/schema.json",
        base.trim_end_matches('/'),
        protocol,
        kind
    ))
}

/// Load a schema from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_schema_auto(source: &str) -> Result<Value, ResolveError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_schema_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ResolveError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_schema(Path::new(source))
    }
}
