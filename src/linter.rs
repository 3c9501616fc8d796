//! Schema linting - static analysis of configuration schema files.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - `$ref` pointers that are external, malformed or don't resolve
//! - reference cycles
//! - `oneOf` unions where several branches expose the same variant

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ResolveError;
use crate::loader::{is_url, load_schema};
use crate::pointer::resolve_pointer;
use crate::resolver::{resolve, resolve_with_root};
use crate::types::{json_type_name, NodeKind, REF_KEY};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/oneOf/0/properties/weighted")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, files with warnings count as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        for diag in &file_result.diagnostics {
            match diag.severity {
                Severity::Error => total_errors += 1,
                Severity::Warning => total_warnings += 1,
            }
        }
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single schema file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display_file = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let schema = match load_schema(file) {
        Ok(s) => s,
        Err(e) => {
            return FileResult {
                file: display_file,
                status: FileStatus::Error,
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    code: "E001".to_string(),
                    file: file.to_path_buf(),
                    path: "/".to_string(),
                    message: format!("syntax error: {}", e),
                }],
            };
        }
    };

    let diagnostics = lint_value(&schema, file);
    tracing::debug!(file = %file.display(), count = diagnostics.len(), "linted schema");

    let status = if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        FileStatus::Error
    } else if diagnostics.is_empty() {
        FileStatus::Ok
    } else {
        FileStatus::Warning
    };

    FileResult {
        file: display_file,
        status,
        diagnostics,
    }
}

/// Lint an already-parsed schema. `file` is only used to label diagnostics.
pub fn lint_value(schema: &Value, file: &Path) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_refs(schema, file, "", schema, &mut diagnostics);

    // Union checks need a dereferenced tree; skip them if refs are broken
    if let Ok(resolved) = resolve(schema) {
        check_unions(&resolved, file, "", &mut diagnostics);
    }

    diagnostics
}

/// Recursively check `$ref` values in a schema.
fn check_refs(
    value: &Value,
    file: &Path,
    path: &str,
    root: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let error = |code: &str, message: String| Diagnostic {
        severity: Severity::Error,
        code: code.to_string(),
        file: file.to_path_buf(),
        path: path.to_string(),
        message,
    };

    match value {
        Value::Object(map) => {
            match NodeKind::of(value) {
                NodeKind::Reference(pointer) => {
                    if is_external_ref(pointer) {
                        diagnostics.push(error(
                            "E002",
                            format!("external reference not supported: {}", pointer),
                        ));
                    } else if resolve_pointer(pointer, root).is_err() {
                        diagnostics.push(error("E003", format!("pointer not found: {}", pointer)));
                    } else if let Err(ResolveError::CircularReference { chain, .. }) =
                        resolve_with_root(&json!({ "$ref": pointer }), root)
                    {
                        diagnostics.push(error(
                            "E006",
                            format!("circular reference: {}", chain.join(" -> ")),
                        ));
                    }
                }
                NodeKind::InvalidReference(actual) => {
                    diagnostics.push(error(
                        "E004",
                        format!(
                            "invalid $ref type: expected string, got {}",
                            json_type_name(actual)
                        ),
                    ));
                }
                _ => {}
            }

            // Siblings of $ref are ignored by the resolver but still linted
            for (key, val) in map {
                if key == REF_KEY {
                    continue;
                }
                let child_path = format!("{}/{}", path, key);
                check_refs(val, file, &child_path, root, diagnostics);
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                check_refs(item, file, &child_path, root, diagnostics);
            }
        }
        _ => {}
    }
}

/// A `$ref` naming another document: a URL, a file part before `#`, or a
/// bare schema file name. `$defs/A` without `#` is a local pointer.
fn is_external_ref(pointer: &str) -> bool {
    if is_url(pointer) {
        return true;
    }
    match pointer.find('#') {
        Some(i) => i > 0,
        None => {
            let first = pointer.split('/').next().unwrap_or_default();
            [".json", ".yaml", ".yml"]
                .iter()
                .any(|ext| first.ends_with(ext))
        }
    }
}

/// Warn on `oneOf` unions where a variant key appears in several branches.
///
/// Variant extraction takes the first such branch and ignores the rest.
fn check_unions(value: &Value, file: &Path, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(branches)) = map.get("oneOf") {
                let mut seen: HashMap<&str, usize> = HashMap::new();
                for (i, branch) in branches.iter().enumerate() {
                    let Some(props) = branch.get("properties").and_then(Value::as_object) else {
                        continue;
                    };
                    for key in props.keys() {
                        if let Some(first) = seen.get(key.as_str()) {
                            diagnostics.push(Diagnostic {
                                severity: Severity::Warning,
                                code: "W001".to_string(),
                                file: file.to_path_buf(),
                                path: format!("{}/oneOf/{}/properties/{}", path, i, key),
                                message: format!(
                                    "variant \"{}\" already offered by oneOf/{}; this branch is never selected",
                                    key, first
                                ),
                            });
                        } else {
                            seen.insert(key, i);
                        }
                    }
                }
            }

            for (key, val) in map {
                let child_path = format!("{}/{}", path, key);
                check_unions(val, file, &child_path, diagnostics);
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                check_unions(item, file, &child_path, diagnostics);
            }
        }
        _ => {}
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
