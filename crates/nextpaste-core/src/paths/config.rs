//! Settings file and `.env` locations, plus settings persistence.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::data_root;
use crate::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

/// Location of the `.env` file that stores user overrides.
pub fn env_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(".env"))
}

/// Location of the JSON settings file.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE))
}

/// Load settings from the default settings file.
///
/// A missing file yields `Settings::default()` (every getter falls back).
pub fn load_settings() -> Result<Settings, PathError> {
    load_settings_from(&settings_path()?)
}

/// Load settings from an explicit file.
pub fn load_settings_from(path: &Path) -> Result<Settings, PathError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path).map_err(|e| PathError::SettingsFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&raw).map_err(|e| PathError::InvalidSettings {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write settings to the default settings file as pretty-printed JSON.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, PathError> {
    let path = settings_path()?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

/// Write settings to an explicit file, creating its parent directory.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), PathError> {
    let json = serde_json::to_string_pretty(settings).map_err(|e| PathError::InvalidSettings {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PathError::SettingsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    fs::write(path, json).map_err(|e| PathError::SettingsFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "Settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DATA_DIR_ENV;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::tempdir;

    #[test]
    fn test_paths_live_under_data_root() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, temp.path().to_string_lossy().as_ref());

        assert_eq!(settings_path().unwrap(), temp.path().join("settings.json"));
        assert_eq!(env_file_path().unwrap(), temp.path().join(".env"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, temp.path().to_string_lossy().as_ref());

        assert_eq!(load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, temp.path().to_string_lossy().as_ref());

        let settings = Settings {
            port: Some(9100),
            device_name: Some("desk".into()),
            ..Default::default()
        };
        let written = save_settings(&settings).unwrap();
        assert!(written.exists());

        let contents = fs::read_to_string(&written).unwrap();
        assert!(contents.contains("\"deviceName\""));
        assert_eq!(load_settings().unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, temp.path().to_string_lossy().as_ref());

        fs::write(temp.path().join("settings.json"), "{not json").unwrap();
        assert!(matches!(
            load_settings(),
            Err(PathError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_explicit_path_creates_parent() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("settings.json");
        let settings = Settings {
            max_logs: Some(50),
            ..Default::default()
        };

        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }
}
