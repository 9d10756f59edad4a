//! Platform-specific helpers
//!
//! Home directory lookup, tilde and environment variable expansion for paths that
//! come from configuration files, and the forward-slash path form used whenever a
//! path is persisted in a record.
//!
//! | Feature | Windows | macOS / Linux |
//! |---------|---------|---------------|
//! | Tilde expansion | `~/` | `~/` |
//! | Environment variables | `%VAR%` and `$VAR` | `$VAR` |
//! | Git command | `git.exe` | `git` |

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Returns the git command name for the current platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() { "git.exe" } else { "git" }
}

/// Resolves a configured path, expanding `~/` and environment variables.
///
/// # Examples
///
/// ```rust,no_run
/// use cuco_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let registry = resolve_path("~/.cuco/registry")?;
/// let cache = resolve_path("$HOME/.cache/cuco")?;
/// # Ok(())
/// # }
/// ```
///
/// Only `~/` is supported for tilde expansion; `~user` forms are rejected.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = if let Some(stripped) = path.strip_prefix("~/") {
        get_home_dir()?.join(stripped)
    } else if path == "~" {
        get_home_dir()?
    } else if path.starts_with('~') {
        return Err(anyhow::anyhow!(
            "Invalid path: {path}\n\n\
            Tilde expansion only supports '~/' for the home directory.\n\
            Use '~/' followed by a relative path, like '~/.cuco/registry'"
        ));
    } else {
        PathBuf::from(path)
    };

    let path_str = expanded.to_string_lossy();

    let expanded_str = if is_windows() && path_str.contains('%') {
        let mut result = path_str.to_string();
        if let Ok(re) = Regex::new(r"%([^%]+)%") {
            for cap in re.captures_iter(&path_str) {
                if let Some(var_name) = cap.get(1)
                    && let Ok(value) = std::env::var(var_name.as_str())
                {
                    result = result.replace(&format!("%{}%", var_name.as_str()), &value);
                }
            }
        }
        match shellexpand::env(&result) {
            Ok(expanded) => expanded.into_owned(),
            Err(_) => result,
        }
    } else {
        shellexpand::env(&path_str)
            .with_context(|| {
                format!(
                    "Failed to expand environment variables in path: {path_str}\n\n\
                    Check for undefined variables (use $VAR or ${{VAR}})"
                )
            })?
            .into_owned()
    };

    Ok(PathBuf::from(expanded_str))
}

/// Normalizes a path for persistence: forward slashes, no extended-length prefix.
#[must_use]
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{stripped}")
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}

/// Checks whether a command is available in PATH.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
