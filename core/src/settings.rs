use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mask::DEFAULT_MASK_WIDTH;
use crate::storage::write_private;

pub const DEFAULT_MINIMUM_PASSWORD_LENGTH: usize = 8;

/// User-editable preferences. Every field has a default so older or partial
/// files still load.
///
/// Path: `data_dir()/settings.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub minimum_password_length: usize,
    pub address_mask_width: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            minimum_password_length: DEFAULT_MINIMUM_PASSWORD_LENGTH,
            address_mask_width: DEFAULT_MASK_WIDTH,
        }
    }
}

impl UserSettings {
    /// Load settings from the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(&default_path()?)
    }

    /// Load settings from a specific file. A missing file yields defaults.
    pub fn open_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        write_private(path, json.as_bytes())
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

pub fn default_path() -> Result<PathBuf> {
    Ok(crate::data_dir()?.join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = UserSettings::open_at(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.minimum_password_length, 8);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"minimum_password_length": 12}"#).unwrap();

        let settings = UserSettings::open_at(&path).unwrap();
        assert_eq!(settings.minimum_password_length, 12);
        assert_eq!(settings.address_mask_width, DEFAULT_MASK_WIDTH);
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = UserSettings {
            minimum_password_length: 3,
            address_mask_width: 4,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(UserSettings::open_at(&path).unwrap(), settings);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(UserSettings::open_at(&path).is_err());
    }
}
