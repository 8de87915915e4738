//! Umbrella package for the declarative workspace
//!
//! Re-exports [`declarative_core`] so integration tests and downstream users
//! can depend on a single crate.
pub use declarative_core::*;
