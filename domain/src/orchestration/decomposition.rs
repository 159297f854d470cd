//! Parsing of decomposition answers into subtask specs.
//!
//! The decomposer asks the model for a JSON array of
//! `{description, executor_type, task_id}` objects. Models routinely wrap the
//! array in markdown fences, so fences are stripped before parsing.

use serde_json::Value;
use thiserror::Error;

use super::entities::{ExecutorKind, SubtaskSpec, TaskDefinition};

/// Why a decomposition answer could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Expected a JSON array of subtasks")]
    NotAnArray,

    #[error("Subtask {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("Invalid subtask structure: element {index} is missing '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Subtask list is empty")]
    Empty,
}

/// Remove ```` ```json ```` and ```` ``` ```` markers and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn non_empty_str<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a decomposition answer for `parent_task_id`.
///
/// Every element must carry a string `description` and `executor_type`. A
/// missing `task_id` is filled in as `{parent_task_id}_sub{n}` (1-based); a
/// numeric one is stringified. The executor type is not checked against the
/// known kinds here: the dispatcher reports unknown types per subtask.
pub fn parse_subtasks(
    text: &str,
    parent_task_id: &str,
) -> Result<Vec<SubtaskSpec>, DecompositionError> {
    let cleaned = strip_code_fences(text);
    let parsed: Value = serde_json::from_str(&cleaned)
        .map_err(|e| DecompositionError::InvalidJson(e.to_string()))?;
    let items = parsed.as_array().ok_or(DecompositionError::NotAnArray)?;
    if items.is_empty() {
        return Err(DecompositionError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = item
                .as_object()
                .ok_or(DecompositionError::NotAnObject { index })?;
            let description = non_empty_str(obj, "description").ok_or(
                DecompositionError::MissingField {
                    index,
                    field: "description",
                },
            )?;
            let executor_type = non_empty_str(obj, "executor_type").ok_or(
                DecompositionError::MissingField {
                    index,
                    field: "executor_type",
                },
            )?;
            let task_id = match obj.get("task_id") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => format!("{}_sub{}", parent_task_id, index + 1),
            };
            Ok(SubtaskSpec::new(task_id, description, executor_type))
        })
        .collect()
}

/// The single subtask used when every decomposition attempt failed.
pub fn fallback_subtask(task: &TaskDefinition) -> SubtaskSpec {
    SubtaskSpec::new(
        format!("{}_fallback", task.task_id),
        format!("Implement: {}", task.description),
        ExecutorKind::Coder.as_str(),
    )
}
