//! Configuration management for declarative mapping

pub mod loader;
pub mod options;

// Re-export main types
pub use loader::{CONFIG_FILE_NAME, DeclarativeConfig};
pub use options::{MapperOptions, Strictness};
