use std::io;

/// Errors that can occur while replaying a declarative document
///
/// Every variant that originates inside a document carries the dotted key
/// path from the document root so users can locate the offending entry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Cannot find `{key}` in {type_name} at `{path}`, available: {}{}",
        .available.join(", "),
        on_next_line(.shape)
    )]
    UnknownDeclarationKey {
        path: String,
        key: String,
        type_name: String,
        available: Vec<String>,
        /// Shape dump of the type, empty when there is none
        shape: String,
    },

    #[error("Malformed _dispatch_ at `{path}`: {reason}")]
    MalformedDispatch { path: String, reason: String },

    #[error(
        "Invalid `{callback}` declaration at `{path}`: `{variant}` must be a table. \
         Use `[{path}.all]` to target all variants or `[{path}.VARIANT_NAME]` to target one variant"
    )]
    MalformedVariantSelector {
        path: String,
        callback: String,
        variant: String,
    },

    #[error("Cannot convert {found} to {target} at `{path}`")]
    UnsupportedCoercion {
        path: String,
        target: String,
        found: String,
    },

    #[error("No value provided for `{path}`")]
    MissingValue { path: String },

    #[error("Cannot assign `{field}` on {type_name} at `{path}`: {reason}")]
    UnassignableField {
        path: String,
        field: String,
        type_name: String,
        reason: String,
    },

    #[error("Cannot resolve a value for `{key}` at `{path}`")]
    UnresolvedArgument { path: String, key: String },

    #[error(
        "Cannot find extension `{name}`, has the plugin registering the extension been applied? \
         Registered extensions: {}",
        .available.join(", ")
    )]
    UnknownExtension { name: String, available: Vec<String> },

    #[error("Invalid declaration at `{path}`: {reason}")]
    InvalidDeclaration { path: String, reason: String },

    #[error("Parse error in {location}: {message}")]
    Parse { location: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Host(String),
}

fn on_next_line(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("\n{text}")
    }
}

/// Result type alias for declarative operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The document key path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::UnknownDeclarationKey { path, .. }
            | Error::MalformedDispatch { path, .. }
            | Error::MalformedVariantSelector { path, .. }
            | Error::UnsupportedCoercion { path, .. }
            | Error::MissingValue { path }
            | Error::UnassignableField { path, .. }
            | Error::UnresolvedArgument { path, .. }
            | Error::InvalidDeclaration { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_lists_alternatives() {
        let err = Error::UnknownDeclarationKey {
            path: "android.c".to_string(),
            key: "c".to_string(),
            type_name: "Sample".to_string(),
            available: vec!["a".to_string(), "b".to_string()],
            shape: String::new(),
        };
        insta::assert_snapshot!(err.to_string(), @"Cannot find `c` in Sample at `android.c`, available: a, b");
        assert_eq!(err.path(), Some("android.c"));
    }

    #[test]
    fn test_unknown_key_appends_shape_dump() {
        let err = Error::UnknownDeclarationKey {
            path: "android.c".to_string(),
            key: "c".to_string(),
            type_name: "Sample".to_string(),
            available: vec!["a".to_string()],
            shape: "type = Sample\nM : a: Int".to_string(),
        };
        insta::assert_snapshot!(err.to_string(), @r"
        Cannot find `c` in Sample at `android.c`, available: a
        type = Sample
        M : a: Int
        ");
    }

    #[test]
    fn test_unknown_extension_hints_at_plugins() {
        let err = Error::UnknownExtension {
            name: "android".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("has the plugin registering the extension been applied"));
        assert_eq!(err.path(), None);
    }
}
