//! declarative - Replay declarative build documents against live object graphs
//!
//! This crate provides functionality to:
//! - Describe the shape of host extension types once and cache it per pass
//! - Coerce document scalars into the exact types host fields declare
//! - Walk a document and an object graph in lock-step, setting fields,
//!   materializing named collections and invoking members
//! - Register variant callbacks that replay a document table later
pub mod android;
pub mod cache;
pub mod callbacks;
pub mod coerce;
pub mod config;
pub mod context;
pub mod document;
pub mod driver;
pub mod error;
pub mod live;
pub mod mapper;
pub mod shape;

#[doc(hidden)]
pub use serde;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use document::{BUILD_FILE_NAME, DocValue, Document};
pub use live::{FromLive, IntoLive, Live, ObjectRef, Shared, shared};
pub use shape::{Describe, ShapeBuilder, TypeRef, TypeShape, ValueType};

// Re-export main API components
pub use cache::ShapeCache;
pub use callbacks::{CallbackAdapter, ComponentsExtension, Selector};
pub use config::{DeclarativeConfig, MapperOptions, Strictness};
pub use driver::{Declarative, Extension, ExtensionRegistry, ProjectHost};
pub use mapper::DeclarativeMapper;
