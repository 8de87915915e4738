//! Options handed to every mapper invocation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the mapper treats declarations it cannot apply
///
/// Covers a member argument no overload can resolve, a `_dispatch_` method
/// no enclosing scope exposes, and a sub-table aimed at a field the host left
/// unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log a warning and skip the declaration
    #[default]
    Lenient,
    /// Fail the pass
    Strict,
}

/// Options shared by a configuration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperOptions {
    pub strictness: Strictness,
    /// Relative file paths in documents resolve against this directory
    pub project_root: PathBuf,
}

impl MapperOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            strictness: Strictness::Lenient,
            project_root: project_root.into(),
        }
    }

    /// Builder method for strictness
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lenient() {
        let options = MapperOptions::default();
        assert!(!options.is_strict());
        assert_eq!(options.project_root(), Path::new("."));
    }

    #[test]
    fn test_strictness_serde() {
        let strict: Strictness = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(strict, Strictness::Strict);
        assert!(MapperOptions::new("/p").with_strictness(strict).is_strict());
    }
}
