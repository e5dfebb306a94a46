//! Locating the adb executable.

use std::path::{Path, PathBuf};

use android_mcp_core::{Error, Result};
use tracing::debug;

/// Executable name searched on `PATH`.
pub const BRIDGE_NAME: &str = if cfg!(windows) { "adb.exe" } else { "adb" };

/// SDK root variables checked after `PATH`, in order.
pub const SDK_ROOT_VARS: [&str; 2] = ["ANDROID_HOME", "ANDROID_SDK_ROOT"];

/// Locate the bridge executable using the process environment.
///
/// See [`locate_bridge_with`].
pub fn locate_bridge(configured: Option<&str>) -> Result<PathBuf> {
    locate_bridge_with(configured, |var| std::env::var(var).ok())
}

/// Locate the bridge executable.
///
/// A configured value containing a path separator must name an existing file;
/// a bare name is looked up on `PATH`. Without a configured value the search
/// order is `PATH`, then `$ANDROID_HOME/platform-tools`, then
/// `$ANDROID_SDK_ROOT/platform-tools`.
pub fn locate_bridge_with<F>(configured: Option<&str>, env: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(configured) = configured {
        let path = Path::new(configured);
        if path.components().count() > 1 || path.is_absolute() {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(Error::ExecutableNotFound(format!(
                "configured adb path {configured} does not exist"
            )));
        }
        return which::which(configured).map_err(|e| {
            Error::ExecutableNotFound(format!("configured adb '{configured}' not on PATH: {e}"))
        });
    }

    if let Ok(path) = which::which(BRIDGE_NAME) {
        debug!(path = %path.display(), "Found adb on PATH");
        return Ok(path);
    }

    let mut searched = vec!["PATH".to_string()];
    for var in SDK_ROOT_VARS {
        let Some(root) = env(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let candidate = Path::new(&root).join("platform-tools").join(BRIDGE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), var, "Found adb in SDK");
            return Ok(candidate);
        }
        searched.push(candidate.display().to_string());
    }

    Err(Error::ExecutableNotFound(format!(
        "adb not found (searched {}). Install Android platform-tools, set ANDROID_HOME, or set ADB_PATH",
        searched.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn install_fake_adb(root: &Path) -> PathBuf {
        let tools = root.join("platform-tools");
        std::fs::create_dir_all(&tools).unwrap();
        let adb = tools.join(BRIDGE_NAME);
        std::fs::write(&adb, "#!/bin/sh\n").unwrap();
        adb
    }

    #[test]
    fn test_configured_path_must_exist() {
        let err = locate_bridge_with(Some("/nonexistent/platform-tools/adb"), |_| None)
            .unwrap_err();
        assert!(matches!(err, Error::ExecutableNotFound(_)));
    }

    #[test]
    fn test_configured_path_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let adb = install_fake_adb(dir.path());
        let found = locate_bridge_with(adb.to_str(), |_| None).unwrap();
        assert_eq!(found, adb);
    }

    #[test]
    fn test_sdk_root_fallback() {
        // Only meaningful where adb is not installed on PATH.
        if which::which(BRIDGE_NAME).is_ok() {
            return;
        }

        let home = tempfile::tempdir().unwrap();
        let sdk_root = tempfile::tempdir().unwrap();
        let adb = install_fake_adb(sdk_root.path());

        // ANDROID_HOME set but empty of platform-tools; ANDROID_SDK_ROOT has adb
        let env: HashMap<&str, String> = [
            ("ANDROID_HOME", home.path().display().to_string()),
            ("ANDROID_SDK_ROOT", sdk_root.path().display().to_string()),
        ]
        .into_iter()
        .collect();

        let found = locate_bridge_with(None, |var| env.get(var).cloned()).unwrap();
        assert_eq!(found, adb);
    }

    #[test]
    fn test_not_found_lists_search() {
        if which::which(BRIDGE_NAME).is_ok() {
            return;
        }

        let err = locate_bridge_with(None, |_| None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PATH"));
        assert!(message.contains("ADB_PATH"));
    }
}
