//! User configuration loading for rustfmt-ls.
//!
//! User config location: $XDG_CONFIG_HOME/rustfmt-ls/rustfmt-ls.toml
//! Fallback: the platform config directory (`dirs::config_dir()`), e.g.
//! ~/.config/rustfmt-ls/rustfmt-ls.toml on Linux.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::CONFIG_FILE_NAME;
use super::settings::FormatterSettings;

const APP_DIR: &str = "rustfmt-ls";

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Returns the path to the user configuration file.
///
/// 1. If $XDG_CONFIG_HOME is set and non-empty: $XDG_CONFIG_HOME/rustfmt-ls/rustfmt-ls.toml
/// 2. Otherwise: `<platform config dir>/rustfmt-ls/rustfmt-ls.toml`
///
/// Returns None if neither can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)?;
    Some(base.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Load the user configuration file.
///
/// A missing file is `Ok(None)`; only unreadable or malformed files are errors.
pub fn load_user_config() -> UserConfigResult<Option<FormatterSettings>> {
    match user_config_path() {
        Some(path) => load_settings_file(&path),
        None => Ok(None),
    }
}

/// Load one settings file, treating a missing file as "no layer".
pub fn load_settings_file(path: &Path) -> UserConfigResult<Option<FormatterSettings>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(UserConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| UserConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
