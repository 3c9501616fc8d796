//! Proxy Schema Resolver
//!
//! Dereferences and narrows the JSON Schemas a reverse-proxy admin backend
//! publishes for its configuration objects (routers, services, middlewares,
//! transports).
//!
//! Schemas arrive with `$ref` pointers into a local `$defs`/`definitions`
//! table and, for services, a `oneOf` union with one branch per variant.
//! [`resolve`] produces a self-contained tree; [`extract_subtype`] narrows it
//! to the schema of a single variant, ready for a form renderer.
//!
//! # Example
//!
//! ```
//! use proxy_schema::{extract_subtype, Variant};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "$defs": {
//!         "LB": {
//!             "type": "object",
//!             "properties": { "servers": { "type": "array" } }
//!         }
//!     },
//!     "oneOf": [
//!         { "properties": { "loadBalancer": { "$ref": "#/$defs/LB" } } },
//!         { "properties": { "weighted": { "type": "object" } } }
//!     ]
//! });
//!
//! let lb = extract_subtype(&schema, Variant::LoadBalancer).unwrap();
//! assert_eq!(lb["properties"]["servers"]["type"], "array");
//! ```
//!
//! # Resolution Rules
//!
//! | Node | Result |
//! |------|--------|
//! | null, boolean, number, string | unchanged |
//! | array | each element resolved, order kept |
//! | object with `$ref` | target resolved again (siblings ignored) |
//! | other object | every key resolved, `$defs`/`definitions` dropped |
//!
//! A `$ref` that leads back to itself is reported as
//! [`ResolveError::CircularReference`].

mod error;
mod extract;
mod linter;
mod loader;
mod pointer;
mod resolver;
mod types;
mod validator;

pub use error::{ResolveError, SchemaError, ValidateError};
pub use extract::{config_key, extract_property, extract_subtype, variant_config, variant_names};
pub use linter::{
    lint, lint_file, lint_value, Diagnostic, FileResult, FileStatus, LintResult, Severity,
};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str, schema_endpoint};
pub use pointer::resolve_pointer;
pub use resolver::{is_self_contained, resolve, resolve_with_root};
pub use types::{json_type_name, NodeKind, Protocol, ResourceKind, Variant};
pub use validator::{validate_against_schema, validate_variant};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
