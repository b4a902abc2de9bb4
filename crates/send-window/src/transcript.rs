//! Conversations on disk.
//!
//! A transcript file is a JSON array of [`Message`]s in the Anthropic
//! Messages shape. A missing file is an empty conversation, so a fresh
//! working directory needs no setup.

use crate::Message;
use std::path::Path;

/// Load a transcript. Returns an empty conversation if `path` doesn't exist.
pub fn load_transcript(path: &Path) -> Result<Vec<Message>, String> {
    let json = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(format!("Failed to read transcript {}: {e}", path.display())),
    };
    serde_json::from_str(&json)
        .map_err(|e| format!("Failed to parse transcript {}: {e}", path.display()))
}

/// Atomic write: serialize to a temp file next to `path`, then rename.
pub fn save_transcript(path: &Path, messages: &[Message]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(messages)
        .map_err(|e| format!("Failed to serialize transcript: {e}"))?;

    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| format!("Transcript path {} has no file name", path.display()))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, json)
        .map_err(|e| format!("Failed to write temp transcript: {e}"))?;
    std::fs::rename(&tmp_path, path).map_err(|e| format!("Failed to rename transcript: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Block;
    use serde_json::json;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let msgs = load_transcript(&dir.path().join("conversation.json")).unwrap();
        assert!(msgs.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("conversation.json");
        let msgs = vec![
            Message::user_text("read it"),
            Message::assistant(vec![Block::tool_use("t1", "read_file", json!({"path": "a"}))]),
            Message::user(vec![Block::tool_result_text("t1", "contents")]),
            Message::assistant(vec![Block::Opaque(json!({"type": "thinking", "thinking": "…"}))]),
        ];

        save_transcript(&path, &msgs).unwrap();
        let loaded = load_transcript(&path).unwrap();

        assert_eq!(loaded, msgs);
        assert!(!dir.path().join("sub").join(".conversation.json.tmp").exists());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"role": "user", "content": [{"text": "no type"}]}]"#).unwrap();

        let err = load_transcript(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse transcript"));
        assert!(err.contains("bad.json"));
    }
}
