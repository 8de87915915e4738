//! Declarative document access
//!
//! A document is a parsed TOML table with key order preserved. The mapper only
//! consumes this tree; the helpers here load it from disk and describe values
//! in diagnostics.

use crate::error::{Error, Result};
use std::path::Path;

/// A parsed declarative document (or any nested table of one)
pub type Document = toml::Table;

/// A single value inside a [`Document`]
pub type DocValue = toml::Value;

/// Default name of the per-project declarative build file
pub const BUILD_FILE_NAME: &str = "build.gradle.toml";

/// Parse declarative text, reporting failures against `location`
pub fn parse_document(location: &str, text: &str) -> Result<Document> {
    text.parse::<Document>().map_err(|e| Error::Parse {
        location: location.to_string(),
        message: e.message().to_string(),
    })
}

/// Read and parse `file_name` inside `dir`
pub fn load_from_dir(dir: &Path, file_name: &str) -> Result<Document> {
    load_file(&dir.join(file_name))
}

/// Read and parse a declarative file
pub fn load_file(path: &Path) -> Result<Document> {
    tracing::debug!("Loading declarative file {:?}", path);
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    parse_document(&path.display().to_string(), &text)
}

/// Short name of a value's kind, used in error messages
pub fn kind_of(value: &DocValue) -> &'static str {
    match value {
        DocValue::String(_) => "string",
        DocValue::Integer(_) => "integer",
        DocValue::Float(_) => "float",
        DocValue::Boolean(_) => "boolean",
        DocValue::Datetime(_) => "datetime",
        DocValue::Array(_) => "array",
        DocValue::Table(_) => "table",
    }
}

/// Describe a value for diagnostics, e.g. `string "abc"`
pub fn describe(value: &DocValue) -> String {
    match value {
        DocValue::Table(_) | DocValue::Array(_) => kind_of(value).to_string(),
        other => format!("{} {}", kind_of(other), other),
    }
}
