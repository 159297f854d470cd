//! JSONL file writer for audit events.
//!
//! Each [`AuditEvent`] is serialized as a single JSON line with `agent`,
//! `operation`, `timestamp`, optional `session_id` and the event `details`,
//! appended to the file via a buffered writer.

use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use ube_application::ports::audit_log::{AuditEvent, AuditLog};

/// JSONL audit log that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and on
/// `Drop`. Existing files are appended to.
pub struct JsonlAuditLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Open (or create) the audit file at `path`.
    ///
    /// Creates parent directories if needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: AuditEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = Map::new();
        record.insert("timestamp".to_string(), Value::String(timestamp));
        record.insert("agent".to_string(), Value::String(event.agent_name));
        record.insert(
            "operation".to_string(),
            Value::String(event.operation.to_string()),
        );
        if let Some(session_id) = event.session_id {
            record.insert("session_id".to_string(), Value::String(session_id));
        }
        record.insert("details".to_string(), event.details);
        Value::Object(record)
    }
}

impl AuditLog for JsonlAuditLog {
    fn log(&self, event: AuditEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAuditLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ube_application::ports::audit_log::{FINAL_RESPONSE, TOOL_CALL_REQUEST};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_audit_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit/ube.audit.jsonl");
        let log = JsonlAuditLog::new(&path).unwrap();

        log.log(
            AuditEvent::new(
                "CoderExecutor",
                TOOL_CALL_REQUEST,
                json!({"tool": "get_context", "arguments": {"key": "lang"}}),
            )
            .with_session(Some("s-1")),
        );
        log.log(AuditEvent::new(
            "CoderExecutor",
            FINAL_RESPONSE,
            json!({"text": "done"}),
        ));
        drop(log);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["agent"], "CoderExecutor");
        assert_eq!(lines[0]["operation"], "TOOL_CALL_REQUEST");
        assert_eq!(lines[0]["session_id"], "s-1");
        assert_eq!(lines[0]["details"]["tool"], "get_context");
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(lines[1].get("session_id").is_none());
        assert_eq!(lines[1]["details"]["text"], "done");
    }

    #[test]
    fn test_jsonl_audit_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ube.audit.jsonl");

        for text in ["first", "second"] {
            let log = JsonlAuditLog::new(&path).unwrap();
            log.log(AuditEvent::new("Agent", FINAL_RESPONSE, json!({"text": text})));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["details"]["text"], "second");
    }

    #[test]
    fn test_jsonl_audit_returns_none_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlAuditLog::new(dir.path()).is_none());
    }
}
