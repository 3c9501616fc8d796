//! Error types for schema resolution and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during schema loading, dereferencing and narrowing.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("cannot resolve $ref: {pointer}")]
    PointerNotFound { pointer: String },

    #[error("circular $ref: {pointer} (via {})", chain.join(" -> "))]
    CircularReference { pointer: String, chain: Vec<String> },

    #[error("invalid $ref at {path}: expected string, got {actual}")]
    InvalidReference { path: String, actual: String },

    #[error("property \"{name}\" not found in schema")]
    PropertyNotFound { name: String },

    #[error("no {kind} schema is published for protocol {protocol}")]
    UnsupportedResource { protocol: String, kind: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::FileNotFound { .. } | ResolveError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ResolveError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Resolve(e) => e.exit_code(),
            ValidateError::Invalid { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_exit_codes() {
        let err = ResolveError::FileNotFound {
            path: PathBuf::from("services.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = ResolveError::PointerNotFound {
            pointer: "#/$defs/Missing".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = ResolveError::CircularReference {
            pointer: "#/$defs/A".into(),
            chain: vec!["#/$defs/A".into(), "#/$defs/B".into()],
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            errors: vec![SchemaError {
                path: "/servers".into(),
                message: "expected array".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);

        let err = ValidateError::from(ResolveError::PropertyNotFound {
            name: "rateLimit".into(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn pointer_not_found_names_pointer() {
        let err = ResolveError::PointerNotFound {
            pointer: "#/$defs/Missing".into(),
        };
        assert_eq!(err.to_string(), "cannot resolve $ref: #/$defs/Missing");
    }

    #[test]
    fn circular_reference_shows_chain() {
        let err = ResolveError::CircularReference {
            pointer: "#/$defs/A".into(),
            chain: vec!["#/$defs/A".into(), "#/$defs/B".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular $ref: #/$defs/A (via #/$defs/A -> #/$defs/B)"
        );
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError {
            path: "/loadBalancer/servers".into(),
            message: "expected array, got string".into(),
        };
        assert_eq!(
            err.to_string(),
            "/loadBalancer/servers: expected array, got string"
        );
    }
}
