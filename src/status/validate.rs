//! Structural validation of the raw status document.
//!
//! Every issue is collected rather than stopping at the first one, so the
//! log gets a complete picture of what the caller sent. Unknown fields are
//! ignored. `null` is treated the same as an absent field.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::StatusDocument;

// ---------------------------------------------------------------------------
// Field table
// ---------------------------------------------------------------------------

enum Kind {
    Str,
    Num,
    Object(&'static [Field]),
}

struct Field {
    name: &'static str,
    kind: Kind,
    required: bool,
}

const fn required(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: true }
}

const fn optional(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: false }
}

const MODEL: &[Field] = &[
    required("id", Kind::Str),
    optional("display_name", Kind::Str),
];

const WORKSPACE: &[Field] = &[
    required("current_dir", Kind::Str),
    required("project_dir", Kind::Str),
];

const OUTPUT_STYLE: &[Field] = &[optional("name", Kind::Str)];

const COST: &[Field] = &[
    optional("total_cost_usd", Kind::Num),
    optional("total_duration_ms", Kind::Num),
    optional("total_api_duration_ms", Kind::Num),
    optional("total_lines_added", Kind::Num),
    optional("total_lines_removed", Kind::Num),
];

const CURRENT_USAGE: &[Field] = &[
    optional("input_tokens", Kind::Num),
    optional("output_tokens", Kind::Num),
    optional("cache_creation_input_tokens", Kind::Num),
    optional("cache_read_input_tokens", Kind::Num),
];

const CONTEXT_WINDOW: &[Field] = &[
    optional("total_input_tokens", Kind::Num),
    optional("total_output_tokens", Kind::Num),
    optional("context_window_size", Kind::Num),
    optional("current_usage", Kind::Object(CURRENT_USAGE)),
];

const DOCUMENT: &[Field] = &[
    required("session_id", Kind::Str),
    required("model", Kind::Object(MODEL)),
    required("workspace", Kind::Object(WORKSPACE)),
    optional("hook_event_name", Kind::Str),
    optional("transcript_path", Kind::Str),
    optional("cwd", Kind::Str),
    optional("version", Kind::Str),
    optional("output_style", Kind::Object(OUTPUT_STYLE)),
    optional("cost", Kind::Object(COST)),
    optional("context_window", Kind::Object(CONTEXT_WINDOW)),
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Field names from the document root; empty for the root itself.
    pub path: Vec<String>,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// Nested view of the issues, keyed by field name.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ErrorTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ErrorTree>,
}

#[derive(Debug, Error)]
#[error("invalid status document: {}", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Fold the flat issue list into a tree mirroring the document shape.
    pub fn tree(&self) -> ErrorTree {
        let mut root = ErrorTree::default();
        for issue in &self.issues {
            let mut node = &mut root;
            for segment in &issue.path {
                node = node.properties.entry(segment.clone()).or_default();
            }
            node.errors.push(issue.message.clone());
        }
        root
    }

    /// The issue tree as compact JSON, for logging.
    pub fn tree_json(&self) -> String {
        serde_json::to_string(&self.tree()).unwrap_or_else(|_| summarize(&self.issues))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `raw` against the status document shape and convert it.
pub fn validate(raw: &Value) -> Result<StatusDocument, ValidationError> {
    let mut issues = Vec::new();

    match raw {
        Value::Object(obj) => check_object(obj, DOCUMENT, &mut Vec::new(), &mut issues),
        other => issues.push(Issue {
            path: Vec::new(),
            message: format!("expected object, received {}", type_name(other)),
        }),
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    serde_json::from_value(raw.clone()).map_err(|e| ValidationError {
        issues: vec![Issue {
            path: Vec::new(),
            message: e.to_string(),
        }],
    })
}

fn check_object(
    obj: &Map<String, Value>,
    fields: &[Field],
    path: &mut Vec<String>,
    issues: &mut Vec<Issue>,
) {
    for field in fields {
        path.push(field.name.to_string());

        match obj.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    issues.push(issue(path, "required"));
                }
            }
            Some(value) => check_value(value, field, path, issues),
        }

        path.pop();
    }
}

fn check_value(value: &Value, field: &Field, path: &mut Vec<String>, issues: &mut Vec<Issue>) {
    match (&field.kind, value) {
        (Kind::Str, Value::String(s)) => {
            if field.required && s.is_empty() {
                issues.push(issue(path, "must not be empty"));
            }
        }
        (Kind::Num, Value::Number(_)) => {}
        (Kind::Object(children), Value::Object(obj)) => check_object(obj, children, path, issues),
        (kind, other) => issues.push(issue(
            path,
            &format!(
                "expected {}, received {}",
                kind_name(kind),
                type_name(other)
            ),
        )),
    }
}

fn issue(path: &[String], message: &str) -> Issue {
    Issue {
        path: path.to_vec(),
        message: message.to_string(),
    }
}

fn kind_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::Str => "string",
        Kind::Num => "number",
        Kind::Object(_) => "object",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "session_id": "abc-123",
            "model": {"id": "claude-opus-4.5", "display_name": "Opus 4.5"},
            "workspace": {"current_dir": "/home/u/project", "project_dir": "/home/u/project"}
        })
    }

    fn paths(err: &ValidationError) -> Vec<String> {
        err.issues().iter().map(|i| i.path.join(".")).collect()
    }

    #[test]
    fn test_minimal_document_is_valid() {
        let doc = validate(&minimal()).unwrap();
        assert_eq!(doc.session_id, "abc-123");
        assert_eq!(doc.model.id, "claude-opus-4.5");
        assert_eq!(doc.model.display_name.as_deref(), Some("Opus 4.5"));
        assert_eq!(doc.workspace.project_dir, "/home/u/project");
    }

    #[test]
    fn test_full_document_is_valid() {
        let raw = json!({
            "hook_event_name": "Status",
            "session_id": "abc-123",
            "transcript_path": "/tmp/t.jsonl",
            "cwd": "/home/u/project",
            "model": {"id": "claude-opus-4.5", "display_name": "Opus"},
            "workspace": {"current_dir": "/home/u/project/src", "project_dir": "/home/u/project"},
            "version": "2.0.0",
            "output_style": {"name": "default"},
            "cost": {"total_cost_usd": 0.42, "total_duration_ms": 1200, "total_lines_added": 3},
            "context_window": {
                "total_input_tokens": 1000,
                "context_window_size": 200000,
                "current_usage": {"input_tokens": 10, "cache_read_input_tokens": 5}
            }
        });
        let doc = validate(&raw).unwrap();
        assert_eq!(doc.version.as_deref(), Some("2.0.0"));
        let usage = doc.context_window.unwrap().current_usage.unwrap();
        assert_eq!(usage.input_tokens, Some(10.0));
    }

    #[test]
    fn test_empty_object_fails() {
        let err = validate(&json!({})).unwrap_err();
        assert_eq!(paths(&err), vec!["session_id", "model", "workspace"]);
    }

    #[test]
    fn test_partial_document_fails() {
        let err = validate(&json!({"session_id": "test"})).unwrap_err();
        assert_eq!(paths(&err), vec!["model", "workspace"]);
    }

    #[test]
    fn test_non_object_root_fails() {
        let err = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues()[0].path, Vec::<String>::new());
        assert!(err.issues()[0].message.contains("array"));

        assert!(validate(&json!("{ invalid: data }")).is_err());
    }

    #[test]
    fn test_empty_required_leaf_fails() {
        let mut raw = minimal();
        raw["model"]["id"] = json!("");
        let err = validate(&raw).unwrap_err();
        assert_eq!(paths(&err), vec!["model.id"]);
        assert_eq!(err.issues()[0].message, "must not be empty");
    }

    #[test]
    fn test_wrong_types_reported_at_full_path() {
        let mut raw = minimal();
        raw["workspace"]["current_dir"] = json!(42);
        raw["cost"] = json!({"total_cost_usd": "cheap"});
        raw["context_window"] = json!({"current_usage": {"output_tokens": true}});
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            paths(&err),
            vec![
                "workspace.current_dir",
                "cost.total_cost_usd",
                "context_window.current_usage.output_tokens"
            ]
        );
        assert_eq!(err.issues()[0].message, "expected string, received number");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut raw = minimal();
        raw["exceeds_200k_tokens"] = json!(true);
        raw["model"]["provider"] = json!({"nested": [1]});
        let doc = validate(&raw).unwrap();
        assert_eq!(doc.extra.get("exceeds_200k_tokens"), Some(&json!(true)));
    }

    #[test]
    fn test_null_optional_field_accepted() {
        let mut raw = minimal();
        raw["cost"] = Value::Null;
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn test_tree_groups_issues_by_path() {
        let err = validate(&json!({"model": {}, "workspace": {"current_dir": 1}})).unwrap_err();
        let tree = err.tree();
        assert_eq!(tree.properties["session_id"].errors, vec!["required"]);
        assert_eq!(
            tree.properties["model"].properties["id"].errors,
            vec!["required"]
        );
        let workspace = &tree.properties["workspace"];
        assert_eq!(workspace.properties.len(), 2);
        assert!(workspace.errors.is_empty());

        let json: Value = serde_json::from_str(&err.tree_json()).unwrap();
        assert_eq!(json["properties"]["model"]["properties"]["id"]["errors"][0], "required");
    }

    #[test]
    fn test_display_lists_every_issue() {
        let err = validate(&json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid status document:"));
        assert!(msg.contains("session_id: required"));
        assert!(msg.contains("workspace: required"));
    }
}
