//! Schema resolution - replaces every `$ref` with its dereferenced target.

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::pointer::resolve_pointer;
use crate::types::{json_type_name, NodeKind, DEFINITION_KEYS, REF_KEY};

/// Resolve every `$ref` in a schema, using the schema itself as root.
///
/// Returns a new tree without `$ref`, `$defs` or `definitions` keys.
///
/// # Errors
///
/// Returns `ResolveError::PointerNotFound` for a pointer that does not
/// resolve, `ResolveError::CircularReference` when a reference leads back to
/// itself, and `ResolveError::InvalidReference` for a non-string `$ref`.
pub fn resolve(schema: &Value) -> Result<Value, ResolveError> {
    resolve_with_root(schema, schema)
}

/// Resolve every `$ref` in `schema` against `root`.
///
/// `root` stays fixed for the whole pass, including inside referenced
/// sub-schemas. Use this to resolve a fragment (e.g. one middleware type)
/// whose pointers address the enclosing document.
pub fn resolve_with_root(schema: &Value, root: &Value) -> Result<Value, ResolveError> {
    let mut expanding = Vec::new();
    resolve_value(schema, root, "", &mut expanding)
}

/// Returns true if no `$ref`, `$defs` or `definitions` key appears anywhere.
pub fn is_self_contained(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            !map.contains_key(REF_KEY)
                && !DEFINITION_KEYS.iter().any(|k| map.contains_key(*k))
                && map.values().all(is_self_contained)
        }
        Value::Array(arr) => arr.iter().all(is_self_contained),
        _ => true,
    }
}

// --- Internal implementation ---

// `expanding` holds the pointers being dereferenced on the current path,
// outermost first.
fn resolve_value(
    value: &Value,
    root: &Value,
    path: &str,
    expanding: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    match NodeKind::of(value) {
        NodeKind::Primitive(other) => Ok(other.clone()),
        NodeKind::Array(arr) => resolve_array(arr, root, path, expanding),
        NodeKind::Reference(pointer) => resolve_reference(pointer, root, expanding),
        NodeKind::InvalidReference(actual) => Err(ResolveError::InvalidReference {
            path: format!("{}/{}", path, REF_KEY),
            actual: json_type_name(actual).to_string(),
        }),
        NodeKind::Object(map) => resolve_object(map, root, path, expanding),
    }
}

fn resolve_reference(
    pointer: &str,
    root: &Value,
    expanding: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    if let Some(start) = expanding.iter().position(|p| p == pointer) {
        let mut chain = expanding[start..].to_vec();
        chain.push(pointer.to_string());
        return Err(ResolveError::CircularReference {
            pointer: pointer.to_string(),
            chain,
        });
    }

    let target = resolve_pointer(pointer, root)?;
    tracing::trace!(pointer, depth = expanding.len(), "dereferencing $ref");

    // Errors inside the target are reported at the target's location
    let target_path = pointer.trim_start_matches('#');
    expanding.push(pointer.to_string());
    let resolved = resolve_value(target, root, target_path, expanding);
    expanding.pop();
    resolved
}

fn resolve_object(
    map: &Map<String, Value>,
    root: &Value,
    path: &str,
    expanding: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    let mut result = Map::new();

    for (key, value) in map {
        // Definitions only exist to be pointed at
        if DEFINITION_KEYS.contains(&key.as_str()) {
            continue;
        }

        let child_path = format!("{}/{}", path, key);
        let resolved = resolve_value(value, root, &child_path, expanding)?;
        result.insert(key.clone(), resolved);
    }

    Ok(Value::Object(result))
}

fn resolve_array(
    arr: &[Value],
    root: &Value,
    path: &str,
    expanding: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    let mut result = Vec::with_capacity(arr.len());
    for (i, item) in arr.iter().enumerate() {
        let item_path = format!("{}/{}", path, i);
        result.push(resolve_value(item, root, &item_path, expanding)?);
    }
    Ok(Value::Array(result))
}
