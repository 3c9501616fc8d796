//! Configuration validation against narrowed schemas.

use serde_json::Value;

use crate::error::{ResolveError, SchemaError, ValidateError};
use crate::extract::{extract_subtype, variant_config};
use crate::types::Variant;

/// Validate a service configuration's variant settings.
///
/// Narrows `full_schema` to `variant`, then validates the settings found
/// under the variant's configuration key. A configuration without that key
/// is validated as `null`, which fails for any object schema.
///
/// # Errors
///
/// Returns `ValidateError::Resolve` if the schema cannot be resolved, or
/// `ValidateError::Invalid` if the settings don't match.
pub fn validate_variant(
    full_schema: &Value,
    variant: Variant,
    config: &Value,
) -> Result<(), ValidateError> {
    let narrowed = extract_subtype(full_schema, variant)?;
    let settings = variant_config(config, variant).unwrap_or(&Value::Null);

    validate_against_schema(&narrowed, settings)
}

/// Validate a payload against an already-resolved schema.
///
/// Use this when you've already resolved the schema and want to validate
/// multiple payloads against it.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ValidateError::Resolve(ResolveError::InvalidSchema {
            message: e.to_string(),
        })
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = errors.len(), "payload failed validation");
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_schema() -> Value {
        json!({
            "$defs": {
                "Server": {
                    "type": "object",
                    "properties": { "url": { "type": "string" } },
                    "required": ["url"]
                },
                "LB": {
                    "type": "object",
                    "properties": {
                        "servers": { "type": "array", "items": { "$ref": "#/$defs/Server" } }
                    },
                    "required": ["servers"]
                }
            },
            "oneOf": [
                { "properties": { "loadBalancer": { "$ref": "#/$defs/LB" } } },
                {
                    "properties": {
                        "weighted": {
                            "type": "object",
                            "properties": { "services": { "type": "array" } }
                        }
                    }
                }
            ]
        })
    }

    #[test]
    fn valid_load_balancer_config() {
        let config = json!({
            "loadBalancer": { "servers": [{ "url": "http://10.0.0.1:80" }] }
        });
        let result = validate_variant(&service_schema(), Variant::LoadBalancer, &config);
        assert!(result.is_ok());
    }

    #[test]
    fn nested_required_field_missing() {
        let config = json!({ "loadBalancer": { "servers": [{}] } });
        let result = validate_variant(&service_schema(), Variant::LoadBalancer, &config);
        match result {
            Err(ValidateError::Invalid { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "/servers/0");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn missing_variant_key_fails() {
        let config = json!({ "weighted": { "services": [] } });
        let result = validate_variant(&service_schema(), Variant::LoadBalancer, &config);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn broken_ref_is_resolve_error() {
        let schema = json!({
            "oneOf": [{ "properties": { "failover": { "$ref": "#/$defs/Failover" } } }]
        });
        let result = validate_variant(&schema, Variant::Failover, &json!({ "failover": {} }));
        assert!(matches!(
            result,
            Err(ValidateError::Resolve(ResolveError::PointerNotFound { .. }))
        ));
    }

    #[test]
    fn uncompilable_schema_is_invalid_schema() {
        let schema = json!({ "type": 12 });
        let result = validate_against_schema(&schema, &json!({}));
        assert!(matches!(
            result,
            Err(ValidateError::Resolve(ResolveError::InvalidSchema { .. }))
        ));
    }

    #[test]
    fn collects_multiple_errors() {
        let schema = json!({
            "type": "object",
            "properties": {
                "passHostHeader": { "type": "boolean" },
                "serversTransport": { "type": "string" }
            }
        });
        let payload = json!({ "passHostHeader": "yes", "serversTransport": 1 });
        match validate_against_schema(&schema, &payload) {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected 2 validation errors, got {:?}", other),
        }
    }
}
