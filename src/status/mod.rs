pub mod abbrev;
pub mod validate;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use validate::{validate, ValidationError};

/// Rendered when stdin carried no document at all.
pub const NO_STATUS: &str = "[no status]";

/// Rendered when stdin carried something that is not a usable document.
pub const MALFORMED_STATUS: &str = "[malformed status]";

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Session metadata piped by Claude Code on each statusline tick.
///
/// Only `session_id`, `model` and `workspace` are needed to render; the rest
/// is carried through for external themes. Unknown fields land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatusDocument {
    pub session_id: String,
    pub model: Model,
    pub workspace: Workspace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_style: Option<OutputStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<ContextWindow>,
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Model {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Workspace {
    pub current_dir: String,
    pub project_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutputStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Cost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_api_duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lines_added: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lines_removed: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContextWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_input_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_output_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_usage: Option<CurrentUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CurrentUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<f64>,
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// What arrived on stdin, before validation.
#[derive(Debug, PartialEq)]
pub enum StatusInput {
    /// Empty stdin or a bare `null`.
    Absent,
    /// Bytes that do not parse as JSON.
    Malformed(String),
    Document(Value),
}

impl StatusInput {
    /// Classify raw stdin bytes.
    pub fn from_bytes(buf: &[u8]) -> Self {
        if buf.iter().all(u8::is_ascii_whitespace) {
            return StatusInput::Absent;
        }

        match serde_json::from_slice::<Value>(buf) {
            Ok(Value::Null) => StatusInput::Absent,
            Ok(value) => StatusInput::Document(value),
            Err(e) => StatusInput::Malformed(e.to_string()),
        }
    }
}
