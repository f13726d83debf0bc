//! User configuration loaded from `config.toml`

use crate::render::DiffFormat;
use anyhow::{Context, Result};
use fman_core::{TextEncoding, DEFAULT_MASK, DEFAULT_MAX_FILE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest command line the shell accepts, in characters
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files of this size or larger are refused by read, cat and diff
    pub max_file_size: u64,
    pub max_command_length: usize,
    /// Encoding used by `read` and `create` when none is given
    pub default_encoding: TextEncoding,
    /// Mask used by `mask`, `maskd` and `maskc` when none is given
    pub default_mask: String,
    pub color: bool,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    pub diff_format: DiffFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            default_encoding: TextEncoding::Utf8,
            default_mask: DEFAULT_MASK.to_string(),
            color: true,
            log_level: "warn".to_string(),
            diff_format: DiffFormat::Text,
        }
    }
}

impl Config {
    /// `<config dir>/fman/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fman").join("config.toml"))
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            max_file_size = 4096
            default_encoding = "latin-1"
            diff_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_file_size, 4096);
        assert_eq!(config.default_encoding, TextEncoding::Latin1);
        assert_eq!(config.diff_format, DiffFormat::Json);
        assert_eq!(config.max_command_length, DEFAULT_MAX_COMMAND_LENGTH);
        assert_eq!(config.default_mask, DEFAULT_MASK);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        assert!(Config::from_toml(r#"default_encoding = "ebcdic""#).is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("none.toml"))).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "color = false\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.color);
    }
}
