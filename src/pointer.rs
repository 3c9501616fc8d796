//! Pointer lookup within a root document.

use serde_json::Value;

use crate::error::ResolveError;

/// Resolve a `$ref` pointer (e.g. `"#/$defs/Foo"`) against `root`.
///
/// A leading `#/` is stripped; without it the whole string is split on `/`.
/// `"#"` and `""` address the root itself. Every step must land on an
/// object containing the next segment.
///
/// # Errors
///
/// Returns `ResolveError::PointerNotFound` naming the original pointer if a
/// segment is missing or an intermediate value is not an object.
pub fn resolve_pointer<'a>(pointer: &str, root: &'a Value) -> Result<&'a Value, ResolveError> {
    let path = pointer.strip_prefix("#/").unwrap_or(pointer);
    if path.is_empty() || path == "#" {
        return Ok(root);
    }

    let mut current = root;
    for segment in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = segment.replace("~1", "/").replace("~0", "~");
        current = current
            .as_object()
            .and_then(|map| map.get(&key))
            .ok_or_else(|| ResolveError::PointerNotFound {
                pointer: pointer.to_string(),
            })?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> Value {
        json!({
            "$defs": {
                "Foo": { "type": "string" },
                "a/b": { "type": "integer" },
                "Label": "plain"
            },
            "definitions": {
                "Bar": { "type": "boolean" }
            },
            "oneOf": [{ "type": "null" }]
        })
    }

    #[test]
    fn lookup_matches_direct_indexing() {
        let root = root();
        let found = resolve_pointer("#/$defs/Foo", &root).unwrap();
        assert_eq!(found, &root["$defs"]["Foo"]);
    }

    #[test]
    fn legacy_definitions_table() {
        let root = root();
        let found = resolve_pointer("#/definitions/Bar", &root).unwrap();
        assert_eq!(found, &json!({ "type": "boolean" }));
    }

    #[test]
    fn missing_prefix_is_tolerated() {
        let root = root();
        let found = resolve_pointer("$defs/Foo", &root).unwrap();
        assert_eq!(found, &json!({ "type": "string" }));
    }

    #[test]
    fn escaped_segment() {
        let root = root();
        let found = resolve_pointer("#/$defs/a~1b", &root).unwrap();
        assert_eq!(found, &json!({ "type": "integer" }));
    }

    #[test]
    fn hash_alone_is_root() {
        let root = root();
        assert_eq!(resolve_pointer("#", &root).unwrap(), &root);
        assert_eq!(resolve_pointer("", &root).unwrap(), &root);
    }

    #[test]
    fn missing_segment_errors() {
        let root = root();
        let result = resolve_pointer("#/$defs/Missing", &root);
        assert!(matches!(
            result,
            Err(ResolveError::PointerNotFound { pointer }) if pointer == "#/$defs/Missing"
        ));
    }

    #[test]
    fn walking_through_string_errors() {
        let root = root();
        let result = resolve_pointer("#/$defs/Label/type", &root);
        assert!(matches!(result, Err(ResolveError::PointerNotFound { .. })));
    }

    #[test]
    fn arrays_are_not_indexed() {
        let root = root();
        let result = resolve_pointer("#/oneOf/0", &root);
        assert!(matches!(result, Err(ResolveError::PointerNotFound { .. })));
    }
}
