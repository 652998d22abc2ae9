use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the platform {kind} directory")]
    NoPlatformDir { kind: &'static str },

    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// `%APPDATA%` on Windows, the user's home elsewhere.
#[cfg(target_os = "windows")]
fn platform_home() -> Result<PathBuf, HomeDirError> {
    dirs::data_dir().ok_or(HomeDirError::NoPlatformDir { kind: "data" })
}

#[cfg(not(target_os = "windows"))]
fn platform_home() -> Result<PathBuf, HomeDirError> {
    dirs::home_dir().ok_or(HomeDirError::NoPlatformDir { kind: "home" })
}

/// Expand a leading `~` into the platform home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the service home directory into an absolute path.
///
/// - `None` (or blank) falls back to `<platform home>/<default_subdir>`.
/// - `~` prefixes are expanded, relative paths are joined onto the cwd.
/// - With `create = true` the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let mut path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => expand_tilde(raw)?,
        _ => platform_home()?.join(default_subdir),
    };

    if path.is_relative() {
        path = std::env::current_dir()
            .map_err(HomeDirError::CurrentDir)?
            .join(path);
    }

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested").join("home");

        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".unused", true)
                .unwrap();

        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("some/relative".into()), ".unused", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/relative"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn tilde_expands_to_user_home() {
        let home = dirs::home_dir().unwrap();
        let resolved = resolve_home_dir(Some("~/.users-test".into()), ".unused", false).unwrap();
        assert_eq!(resolved, home.join(".users-test"));
    }

    #[test]
    fn blank_value_uses_default_subdir() {
        let resolved = resolve_home_dir(Some("   ".into()), ".users-test", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".users-test"));
    }
}
