//! Auth storage file I/O.
//!
//! Reads and writes `~/.chota/auth.json` with secure file permissions (0o600).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;
use crate::validate::validate_api_key;

/// Default auth file name.
const AUTH_FILE_NAME: &str = "auth.json";

/// Current on-disk format version.
const STORAGE_VERSION: u32 = 1;

/// On-disk credential record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStorage {
    /// Format version, always 1.
    pub version: u32,
    /// Stored Gemini API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// RFC 3339 timestamp of the last write.
    #[serde(default)]
    pub last_updated: String,
}

impl Default for AuthStorage {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            api_key: None,
            last_updated: String::new(),
        }
    }
}

/// Get the auth file path under the given data directory.
pub fn auth_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(AUTH_FILE_NAME)
}

/// Resolve `~/.chota/auth.json`.
pub fn default_auth_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    auth_file_path(&PathBuf::from(home).join(".chota"))
}

/// Load auth storage from file.
///
/// Returns `None` if the file doesn't exist or is invalid.
pub fn load_auth_storage(path: &Path) -> Option<AuthStorage> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read auth file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<AuthStorage>(&data) {
        Ok(storage) if storage.version == STORAGE_VERSION => Some(storage),
        Ok(storage) => {
            tracing::warn!("unsupported auth storage version: {}", storage.version);
            None
        }
        Err(e) => {
            tracing::warn!("failed to parse auth file: {e}");
            None
        }
    }
}

/// Save auth storage to file.
///
/// Creates parent directories if needed. Sets file permissions to 0o600.
pub fn save_auth_storage(path: &Path, storage: &mut AuthStorage) -> Result<(), AuthError> {
    storage.last_updated = chrono::Utc::now().to_rfc3339();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(storage)?;
    std::fs::write(path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

/// Read the stored API key, if any.
pub fn load_api_key(path: &Path) -> Option<String> {
    load_auth_storage(path)?
        .api_key
        .filter(|k| !k.trim().is_empty())
}

/// Validate and store an API key, replacing any previous one.
pub fn save_api_key(path: &Path, api_key: &str) -> Result<(), AuthError> {
    let key = validate_api_key(api_key)?;
    let mut storage = load_auth_storage(path).unwrap_or_default();
    storage.api_key = Some(key.to_string());
    save_auth_storage(path, &mut storage)
}

/// Remove the stored API key. A missing file is not an error.
pub fn clear_api_key(path: &Path) -> Result<(), AuthError> {
    let Some(mut storage) = load_auth_storage(path) else {
        return Ok(());
    };
    storage.api_key = None;
    save_auth_storage(path, &mut storage)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const KEY: &str = "AIzaSyA1234567890abcdefghijklmnopq";

    fn test_path(dir: &TempDir) -> PathBuf {
        dir.path().join("auth.json")
    }

    #[test]
    fn auth_file_path_joins_name() {
        let path = auth_file_path(Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/auth.json"));
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_auth_storage(&test_path(&dir)).is_none());
        assert!(load_api_key(&test_path(&dir)).is_none());
    }

    #[test]
    fn load_invalid_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        std::fs::write(&path, "not json").unwrap();
        assert!(load_auth_storage(&path).is_none());
    }

    #[test]
    fn load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        std::fs::write(&path, r#"{"version": 2, "apiKey": "AIza"}"#).unwrap();
        assert!(load_auth_storage(&path).is_none());
    }

    #[test]
    fn save_and_load_key() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_api_key(&path, &format!(" {KEY} ")).unwrap();

        assert_eq!(load_api_key(&path).as_deref(), Some(KEY));
        let storage = load_auth_storage(&path).unwrap();
        assert_eq!(storage.version, 1);
        assert!(!storage.last_updated.is_empty());
    }

    #[test]
    fn saved_file_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_api_key(&path, KEY).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["apiKey"], KEY);
        assert!(raw["lastUpdated"].is_string());
    }

    #[test]
    fn save_rejects_malformed_key() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        assert_matches!(save_api_key(&path, "nope"), Err(AuthError::InvalidKey(_)));
        assert!(!path.exists());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("auth.json");
        save_api_key(&path, KEY).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_api_key(&path, KEY).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_removes_key() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_api_key(&path, KEY).unwrap();
        clear_api_key(&path).unwrap();
        assert!(load_api_key(&path).is_none());
        assert!(load_auth_storage(&path).is_some());
    }

    #[test]
    fn clear_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(clear_api_key(&test_path(&dir)).is_ok());
    }
}
