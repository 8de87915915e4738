//! Reference Android-style extension model
//!
//! A small application DSL used by the CLI and by tests: an `android`
//! extension configured directly and an `androidComponents` extension
//! configured through variant callbacks.

mod components;
mod dsl;
mod extension;
mod project;

pub use components::{ApplicationComponents, BEFORE_VARIANTS, ON_VARIANTS, Variant, VariantBuilder};
pub use dsl::{BuildType, ProductFlavor, SigningConfig};
pub use extension::{ApplicationExtension, CompileOptions, DefaultConfig};
pub use project::{ANDROID_EXTENSION, APPLICATION_PLUGIN_ID, AndroidProject, ProjectReport};

use crate::shape::TypeRef;

crate::dsl_enum! {
    /// Java language level accepted by `compileOptions`
    pub enum JavaVersion {
        Version1_8 => "VERSION_1_8",
        Version11 => "VERSION_11",
        Version17 => "VERSION_17",
        Version21 => "VERSION_21",
    }
}

/// Every type of the model, for shape dumps
pub fn model_types() -> Vec<TypeRef> {
    vec![
        TypeRef::of::<ApplicationExtension>(),
        TypeRef::of::<DefaultConfig>(),
        TypeRef::of::<BuildType>(),
        TypeRef::of::<ProductFlavor>(),
        TypeRef::of::<SigningConfig>(),
        TypeRef::of::<CompileOptions>(),
        TypeRef::of::<VariantBuilder>(),
        TypeRef::of::<Variant>(),
    ]
}

/// Look up a model type by its DSL name, ignoring case
pub fn model_type(name: &str) -> Option<TypeRef> {
    model_types()
        .into_iter()
        .find(|ty| ty.name().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_lookup() {
        assert_eq!(model_type("buildtype"), Some(TypeRef::of::<BuildType>()));
        assert_eq!(model_type("ApplicationExtension").map(|t| t.name()), Some("ApplicationExtension"));
        assert!(model_type("Unknown").is_none());
    }
}
