//! Durable storage for the validated settings tree.
//!
//! Reads are permissive: a missing or malformed user file yields an empty
//! document so startup self-heals instead of failing. Writes are strict and
//! surface their errors to the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::Result;
use crate::schema::data::DataNode;

/// Load the raw persisted user data.
///
/// Returns `Null` when the file does not exist, cannot be read, or does not
/// parse; the caller validates the result against the rules either way, so
/// any of those cases simply means "start from defaults".
pub fn load_data(path: &Path) -> serde_json::Value {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return serde_json::Value::Null,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings file unreadable, starting from defaults");
            return serde_json::Value::Null;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings file malformed, starting from defaults");
            serde_json::Value::Null
        }
    }
}

/// Write the settings tree as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save_data(path: &Path, data: &DataNode) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(data)?;
    fs::write(path, text)?;
    debug!(path = %path.display(), "settings persisted");
    Ok(())
}

/// Conventional settings location for an application:
/// `<config dir>/<app>/settings.json`.
///
/// Returns `None` when the platform config directory cannot be determined.
pub fn default_settings_path(app: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app).join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn leaf_tree() -> DataNode {
        let mut children = BTreeMap::new();
        children.insert("volume".to_string(), DataNode::Leaf(Value::Int(50)));
        DataNode::Group(children)
    }

    #[test]
    fn test_load_missing_file_is_null() {
        let dir = TempDir::new().unwrap();
        let raw = load_data(&dir.path().join("settings.json"));
        assert!(raw.is_null());
    }

    #[test]
    fn test_load_malformed_file_is_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_data(&path).is_null());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        save_data(&path, &leaf_tree()).unwrap();

        let raw = load_data(&path);
        assert_eq!(raw, serde_json::json!({ "volume": 50 }));
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        save_data(&path, &leaf_tree()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"volume\": 50\n}");
    }

    #[test]
    fn test_default_settings_path_shape() {
        if let Some(path) = default_settings_path("tiller-test") {
            assert!(path.ends_with("tiller-test/settings.json"));
        }
    }
}
