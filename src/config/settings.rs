use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::patterns::default_location_patterns;
use crate::error::{Result, TsError};
use crate::parse::SENTINEL_LINE;

/// File looked up in the working directory and its parents
pub const SETTINGS_FILE_NAME: &str = ".tscat.toml";

/// Settings loaded from `.tscat.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub check: CheckSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckSettings {
    /// Rule ids that are not run
    pub disabled: Vec<String>,
    /// Globs location filenames are expected to match
    pub location_patterns: Vec<String>,
    /// Line number that marks a location as stale
    pub sentinel_line: u64,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            location_patterns: default_location_patterns(),
            sentinel_line: SENTINEL_LINE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    /// Extra directory names skipped during search
    pub exclusions: Vec<String>,
}

impl Settings {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| TsError::config(path, e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TsError::config(path, format!("Failed to read file: {}", e)))?;
        Self::from_toml(&content, path)
    }

    /// Load `path` when given, otherwise the nearest `.tscat.toml` above
    /// `start_dir`, otherwise the defaults.
    pub fn discover(path: Option<&Path>, start_dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match find_settings_file(start_dir) {
            Some(found) => {
                debug!("using settings from {}", found.display());
                Self::load(&found)
            }
            None => Ok(Self::default()),
        }
    }
}

fn find_settings_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
