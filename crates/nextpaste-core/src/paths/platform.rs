//! Platform-specific data root resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "NEXTPASTE_DATA_DIR";

/// Get the root directory for application data (settings, `.env`).
///
/// Resolution order:
/// 1. `NEXTPASTE_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/nextpaste`)
///
/// The directory is created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => dirs::data_dir()
            .ok_or(PathError::NoDataDir)?
            .join("nextpaste"),
    };

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::tempdir;

    #[test]
    fn test_env_override_is_created() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let target = temp.path().join("nested").join("data");
        let _env = EnvVarGuard::set(DATA_DIR_ENV, target.to_string_lossy().as_ref());

        let root = data_root().unwrap();
        assert_eq!(root, target);
        assert!(root.is_dir());
    }
}
