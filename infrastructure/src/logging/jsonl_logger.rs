//! JSONL file writer for lifecycle events.
//!
//! Each [`LifecycleEvent`] is serialized as a single JSON line carrying its
//! `type` tag and a `timestamp`, appended to the file via a buffered writer.

use conductor_application::LifecycleEvent;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Append-only event log, one JSON object per line
pub struct JsonlEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLogger {
    /// Truncate or create `path`, creating missing parent directories
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        debug!(path = %path.display(), "Event log opened");

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event
    pub fn log(&self, event: &LifecycleEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let Ok(Value::Object(mut record)) = serde_json::to_value(event) else {
            return;
        };
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }

    /// Follow a bus subscription until the bus is dropped
    pub fn follow(self: Arc<Self>, mut rx: broadcast::Receiver<LifecycleEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.log(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event log fell behind; events were dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(path = %self.path.display(), "Event log subscription closed");
        })
    }
}

impl Drop for JsonlEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LifecycleBus;
    use conductor_application::LifecycleNotifier;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.events.jsonl");
        let logger = JsonlEventLogger::create(&path).unwrap();

        logger.log(&LifecycleEvent::ToolRetry {
            tool_id: "security-auditor".to_string(),
            attempt: 1,
            max_attempts: 3,
            error: "timed out".to_string(),
        });
        logger.log(&LifecycleEvent::Fallback {
            tool_id: "security-auditor".to_string(),
            fallback_id: "quality-checker".to_string(),
        });

        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for value in &lines {
            assert!(value.get("type").is_some());
            assert!(value.get("timestamp").is_some());
        }
        assert_eq!(lines[0]["type"], "tool_retry");
        assert_eq!(lines[0]["attempt"], 1);
        assert_eq!(lines[1]["type"], "fallback");
        assert_eq!(lines[1]["fallback_id"], "quality-checker");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        let logger = JsonlEventLogger::create(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_follow_writes_bus_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bus.jsonl");
        let logger = Arc::new(JsonlEventLogger::create(&path).unwrap());

        let bus = LifecycleBus::new(16);
        let handle = Arc::clone(&logger).follow(bus.subscribe());

        bus.on_fallback("a", "b");
        bus.on_tool_retry("a", 2, 3, "boom");
        drop(bus);
        handle.await.unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "fallback");
        assert_eq!(lines[1]["error"], "boom");
    }
}
