//! Narrowing a resolved schema down to one variant or one named property.

use serde_json::Value;

use crate::error::ResolveError;
use crate::resolver::{resolve, resolve_with_root};
use crate::types::Variant;

/// Extract the sub-schema for one service variant.
///
/// The schema is fully resolved first. Then, in order:
/// 1. the first `oneOf` branch whose `properties` has the variant key wins;
/// 2. otherwise a top-level `properties[variant]` is returned;
/// 3. otherwise the whole resolved schema is returned unchanged.
///
/// Later `oneOf` branches exposing the same variant are ignored.
///
/// # Errors
///
/// Returns any `ResolveError` raised while resolving `full_schema`.
pub fn extract_subtype(full_schema: &Value, variant: Variant) -> Result<Value, ResolveError> {
    let mut resolved = resolve(full_schema)?;
    let key = variant.as_str();

    if let Some(branches) = resolved.get_mut("oneOf").and_then(Value::as_array_mut) {
        let mut matching = branches
            .iter_mut()
            .filter_map(|branch| branch.get_mut("properties")?.as_object_mut()?.remove(key));
        if let Some(found) = matching.next() {
            if matching.next().is_some() {
                tracing::debug!(variant = key, "several oneOf branches match, using the first");
            }
            return Ok(found);
        }
    }

    if let Some(found) = resolved
        .get_mut("properties")
        .and_then(Value::as_object_mut)
        .and_then(|props| props.remove(key))
    {
        return Ok(found);
    }

    tracing::debug!(variant = key, "no variant-specific schema, using the full schema");
    Ok(resolved)
}

/// Variant keys offered by the `oneOf` branches of a schema, in branch order.
///
/// Names outside the known variant set are included as-is; duplicates are
/// reported once.
pub fn variant_names(full_schema: &Value) -> Result<Vec<String>, ResolveError> {
    let resolved = resolve(full_schema)?;
    let mut names: Vec<String> = Vec::new();

    let branches = resolved
        .get("oneOf")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for branch in branches {
        let Some(props) = branch.get("properties").and_then(Value::as_object) else {
            continue;
        };
        for name in props.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }

    Ok(names)
}

/// Extract `properties[name]` from a schema and resolve it against the
/// whole schema.
///
/// Used for middleware schemas, where each middleware type is a property
/// whose `$ref`s point into the enclosing document's `$defs`.
///
/// # Errors
///
/// Returns `ResolveError::PropertyNotFound` if the property does not exist,
/// or any error raised while resolving it.
pub fn extract_property(full_schema: &Value, name: &str) -> Result<Value, ResolveError> {
    let property = full_schema
        .get("properties")
        .and_then(|props| props.get(name))
        .ok_or_else(|| ResolveError::PropertyNotFound {
            name: name.to_string(),
        })?;

    resolve_with_root(property, full_schema)
}

/// Key under which a variant's settings live in a service configuration.
///
/// Today this is the variant name itself.
pub fn config_key(variant: Variant) -> &'static str {
    variant.as_str()
}

/// Look up a variant's settings inside a service configuration object.
pub fn variant_config(config: &Value, variant: Variant) -> Option<&Value> {
    config.get(config_key(variant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_schema() -> Value {
        json!({
            "$defs": {
                "LB": {
                    "type": "object",
                    "properties": { "servers": { "type": "array" } }
                }
            },
            "oneOf": [
                { "properties": { "loadBalancer": { "$ref": "#/$defs/LB" } } },
                { "properties": { "weighted": { "type": "object" } } }
            ]
        })
    }

    #[test]
    fn extracts_referenced_variant() {
        let result = extract_subtype(&service_schema(), Variant::LoadBalancer).unwrap();
        assert_eq!(
            result,
            json!({ "type": "object", "properties": { "servers": { "type": "array" } } })
        );
    }

    #[test]
    fn extracts_inline_variant() {
        let result = extract_subtype(&service_schema(), Variant::Weighted).unwrap();
        assert_eq!(result, json!({ "type": "object" }));
    }

    #[test]
    fn first_matching_branch_wins() {
        let schema = json!({
            "oneOf": [
                { "properties": { "weighted": { "title": "first" } } },
                { "properties": { "weighted": { "title": "second" } } }
            ]
        });
        let result = extract_subtype(&schema, Variant::Weighted).unwrap();
        assert_eq!(result, json!({ "title": "first" }));
    }

    #[test]
    fn flat_properties_used_without_union() {
        let schema = json!({
            "type": "object",
            "properties": { "failover": { "required": ["service"] } }
        });
        let result = extract_subtype(&schema, Variant::Failover).unwrap();
        assert_eq!(result, json!({ "required": ["service"] }));
    }

    #[test]
    fn union_without_match_falls_back_to_properties() {
        let schema = json!({
            "oneOf": [{ "properties": { "weighted": {} } }],
            "properties": { "mirroring": { "type": "object" } }
        });
        let result = extract_subtype(&schema, Variant::Mirroring).unwrap();
        assert_eq!(result, json!({ "type": "object" }));
    }

    #[test]
    fn no_match_returns_resolved_schema() {
        let result = extract_subtype(&service_schema(), Variant::Failover).unwrap();
        assert_eq!(result, resolve(&service_schema()).unwrap());
    }

    #[test]
    fn resolution_errors_propagate() {
        let schema = json!({
            "oneOf": [{ "properties": { "weighted": { "$ref": "#/$defs/Gone" } } }]
        });
        let result = extract_subtype(&schema, Variant::Weighted);
        assert!(matches!(result, Err(ResolveError::PointerNotFound { .. })));
    }

    #[test]
    fn variant_names_in_branch_order() {
        let schema = json!({
            "oneOf": [
                { "properties": { "weighted": {} } },
                { "properties": { "loadBalancer": {} } },
                { "properties": { "weighted": {} } },
                { "type": "null" }
            ]
        });
        assert_eq!(variant_names(&schema).unwrap(), vec!["weighted", "loadBalancer"]);
    }

    #[test]
    fn variant_names_empty_without_union() {
        assert!(variant_names(&json!({ "type": "object" })).unwrap().is_empty());
    }

    #[test]
    fn extract_property_resolves_against_document() {
        let schema = json!({
            "$defs": {
                "RateLimit": {
                    "type": "object",
                    "properties": { "average": { "$ref": "#/$defs/Count" } }
                },
                "Count": { "type": "integer", "minimum": 0 }
            },
            "properties": {
                "rateLimit": { "$ref": "#/$defs/RateLimit" }
            }
        });
        let result = extract_property(&schema, "rateLimit").unwrap();
        assert_eq!(
            result,
            json!({
                "type": "object",
                "properties": { "average": { "type": "integer", "minimum": 0 } }
            })
        );
    }

    #[test]
    fn extract_property_missing() {
        let schema = json!({ "properties": {} });
        let result = extract_property(&schema, "retry");
        assert!(matches!(
            result,
            Err(ResolveError::PropertyNotFound { name }) if name == "retry"
        ));
    }

    #[test]
    fn config_key_is_variant_name() {
        for variant in Variant::ALL {
            assert_eq!(config_key(variant), variant.as_str());
        }
    }

    #[test]
    fn variant_config_lookup() {
        let config = json!({ "weighted": { "services": [] } });
        assert_eq!(
            variant_config(&config, Variant::Weighted),
            Some(&json!({ "services": [] }))
        );
        assert_eq!(variant_config(&config, Variant::LoadBalancer), None);
    }
}
