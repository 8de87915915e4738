//! Discovery and loading of `.declarative.json`

use super::options::{MapperOptions, Strictness};
use crate::document::BUILD_FILE_NAME;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up from the project directory upwards
pub const CONFIG_FILE_NAME: &str = ".declarative.json";

/// Environment variable overriding the `strict` setting
pub const STRICT_ENV: &str = "DECLARATIVE_STRICT";

/// Settings read from `.declarative.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarativeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file_name: Option<String>,
    /// Relative to the directory holding the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Directory the config was loaded from
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl DeclarativeConfig {
    /// Walk up from `start` and load the first config file found
    ///
    /// Returns the default configuration when no file exists up to the
    /// file-system root.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut check_path = if start.is_file() {
            start.parent().unwrap_or(start)
        } else {
            start
        };

        loop {
            if let Some(config) = Self::try_load(check_path)? {
                return Ok(config);
            }
            tracing::trace!("No {} at {:?}", CONFIG_FILE_NAME, check_path);

            match check_path.parent() {
                Some(parent) => check_path = parent,
                None => break,
            }
        }

        tracing::debug!("No {} found above {:?}, using defaults", CONFIG_FILE_NAME, start);
        Ok(Self::default())
    }

    /// Load the config file in `dir`, if there is one
    pub fn try_load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        tracing::debug!("Found config at {:?}", path);
        let contents = std::fs::read_to_string(&path)?;
        let mut config: Self = serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Failed to parse config from {:?}: {}", path, e);
            Error::Config(format!("{}: {}", path.display(), e))
        })?;
        config.source_dir = Some(dir.to_path_buf());
        Ok(Some(config))
    }

    pub fn build_file_name(&self) -> &str {
        self.build_file_name.as_deref().unwrap_or(BUILD_FILE_NAME)
    }

    /// Effective strictness: the environment wins over the file
    pub fn strictness(&self) -> Strictness {
        let env = std::env::var(STRICT_ENV).ok();
        match strict_from_env_value(env.as_deref()).or(self.strict) {
            Some(true) => Strictness::Strict,
            _ => Strictness::Lenient,
        }
    }

    /// Mapper options for a project, `fallback_root` unless the file names one
    pub fn to_options(&self, fallback_root: &Path) -> MapperOptions {
        let project_root = match (&self.project_root, &self.source_dir) {
            (Some(root), _) if root.is_absolute() => root.clone(),
            (Some(root), Some(dir)) => dir.join(root),
            (Some(root), None) => fallback_root.join(root),
            (None, _) => fallback_root.to_path_buf(),
        };
        MapperOptions::new(project_root).with_strictness(self.strictness())
    }
}

/// Interpret a `DECLARATIVE_STRICT` value; `None` when unset or unrecognized
pub fn strict_from_env_value(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
