//! Caching of introspected type shapes

pub mod shape_cache;

// Re-export the main cache type
pub use shape_cache::ShapeCache;
