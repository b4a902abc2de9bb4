//! JSONL event sink and turn correlation IDs.
//!
//! When observation is enabled, each [`EventSink::emit`] call appends one JSON
//! object to `<artifacts_dir>/events.jsonl`, stamped with `time` and `event`.
//! Telemetry is best-effort: failures are logged and never reach the caller.

pub mod features;

pub use features::{TextFeatures, count_features};

use crate::config::TelemetryConfig;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::warn;

/// File name of the event log inside the artifacts directory.
pub const EVENTS_FILE: &str = "events.jsonl";

/// Version tag for the `local_features` event payload.
pub const FEATURES_VERSION: &str = "1";

/// Generate a unique ID for one agent turn.
///
/// Every event a turn writes to `events.jsonl` carries this ID as `turn_id`,
/// and the turn's log lines are prefixed with it.
pub fn generate_turn_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Counter keeps IDs unique when two turns start within the same tick.
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("turn-{ts:x}-{count:04x}")
}

/// Appends telemetry events to a JSONL file.
#[derive(Debug, Clone)]
pub struct EventSink {
    /// `None` when observation is disabled.
    path: Option<PathBuf>,
    features: bool,
}

impl EventSink {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            path: config
                .observe
                .then(|| config.artifacts_dir.join(EVENTS_FILE)),
            features: config.calibration && config.observe,
        }
    }

    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self {
            path: None,
            features: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Path of the event log, if observation is enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `fields` plus `time` and `event` as one JSON line.
    ///
    /// `fields` should be a JSON object; any other value is recorded under a
    /// `data` key.
    pub fn emit(&self, event: &str, fields: Value) {
        let Some(path) = &self.path else {
            return;
        };

        let mut record = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        record.insert(
            "time".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        record.insert("event".into(), Value::String(event.to_string()));

        if let Err(e) = append_line(path, &Value::Object(record)) {
            warn!("telemetry: {e}");
        }
    }

    /// Record local text features of the user's input for this turn.
    ///
    /// Only emitted in calibration mode with observation enabled.
    pub fn emit_local_features(&self, turn_id: &str, user_text: &str) {
        if !self.features {
            return;
        }
        self.emit(
            "local_features",
            json!({
                "turn_id": turn_id,
                "features_version": FEATURES_VERSION,
                "user": count_features(user_text),
            }),
        );
    }
}

fn append_line(path: &Path, record: &Value) -> Result<(), String> {
    let mut line =
        serde_json::to_vec(record).map_err(|e| format!("marshal event: {e}"))?;
    line.push(b'\n');

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| format!("mkdir {}: {e}", dir.display()))?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("open {}: {e}", path.display()))?;
    file.write_all(&line)
        .map_err(|e| format!("write {}: {e}", path.display()))
}
