use super::JavaVersion;
use super::dsl::{BuildType, ProductFlavor, SigningConfig};
use crate::live::{FromLive, ListProperty, Live, MapProperty, NamedContainer, Shared, shared};
use crate::shape::{Describe, ShapeBuilder, ValueType};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The `android` extension of an application project
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationExtension {
    pub namespace: Option<String>,
    pub compile_sdk: Option<i32>,
    pub resource_prefix: Option<String>,
    pub default_config: Shared<DefaultConfig>,
    pub build_types: NamedContainer<BuildType>,
    pub product_flavors: NamedContainer<ProductFlavor>,
    pub signing_configs: NamedContainer<SigningConfig>,
    pub compile_options: Shared<CompileOptions>,
    pub flavor_dimensions: ListProperty<String>,
    #[serde(skip)]
    project_dir: PathBuf,
}

impl ApplicationExtension {
    /// A fresh extension with the `debug` and `release` build types
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let build_types = NamedContainer::new(BuildType::new);
        build_types.maybe_create_typed("debug").borrow_mut().debuggable = true;
        build_types.maybe_create_typed("release");
        Self {
            namespace: None,
            compile_sdk: None,
            resource_prefix: None,
            default_config: shared(DefaultConfig::default()),
            build_types,
            product_flavors: NamedContainer::new(ProductFlavor::new),
            signing_configs: NamedContainer::new(SigningConfig::new),
            compile_options: shared(CompileOptions::default()),
            flavor_dimensions: ListProperty::new(),
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Location of a proguard file shipped with the build tool
    pub fn default_proguard_file(&self, name: &str) -> PathBuf {
        self.project_dir
            .join("build/intermediates/default_proguard_files/global")
            .join(name)
    }
}

impl Describe for ApplicationExtension {
    const NAME: &'static str = "ApplicationExtension";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .settable(
                "namespace",
                ValueType::String,
                |a| a.namespace.clone(),
                |a, v| a.namespace = v,
            )
            .settable(
                "compileSdk",
                ValueType::Int,
                |a| a.compile_sdk,
                |a, v| a.compile_sdk = v,
            )
            .read_only("defaultConfig", ValueType::object::<DefaultConfig>(), |a| {
                a.default_config.clone()
            })
            .read_only("buildTypes", ValueType::named::<BuildType>(), |a| {
                a.build_types.clone()
            })
            .read_only("productFlavors", ValueType::named::<ProductFlavor>(), |a| {
                a.product_flavors.clone()
            })
            .read_only("signingConfigs", ValueType::named::<SigningConfig>(), |a| {
                a.signing_configs.clone()
            })
            .read_only("compileOptions", ValueType::object::<CompileOptions>(), |a| {
                a.compile_options.clone()
            })
            .read_only(
                "flavorDimensions",
                ValueType::list(ValueType::String),
                |a| a.flavor_dimensions.clone(),
            )
            .setter_member("resourcePrefix", ValueType::String, |a: &mut Self, v: String| {
                a.resource_prefix = Some(v);
            })
            .member("getDefaultProguardFile", vec![ValueType::String], |a, mut args| {
                let name = String::from_live(args.remove(0))?;
                Ok(Live::Path(a.default_proguard_file(&name)))
            });
    }
}

/// Settings shared by every variant
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultConfig {
    pub application_id: Option<String>,
    pub min_sdk: Option<i32>,
    pub target_sdk: Option<i32>,
    pub version_code: Option<i32>,
    pub version_name: Option<String>,
    pub test_instrumentation_runner: Option<String>,
    pub multi_dex_enabled: bool,
    pub manifest_placeholders: MapProperty<String>,
}

impl Describe for DefaultConfig {
    const NAME: &'static str = "DefaultConfig";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .settable(
                "applicationId",
                ValueType::String,
                |c| c.application_id.clone(),
                |c, v| c.application_id = v,
            )
            .settable("minSdk", ValueType::Int, |c| c.min_sdk, |c, v| c.min_sdk = v)
            .settable("targetSdk", ValueType::Int, |c| c.target_sdk, |c, v| c.target_sdk = v)
            .settable(
                "versionCode",
                ValueType::Int,
                |c| c.version_code,
                |c, v| c.version_code = v,
            )
            .settable(
                "versionName",
                ValueType::String,
                |c| c.version_name.clone(),
                |c, v| c.version_name = v,
            )
            .settable(
                "testInstrumentationRunner",
                ValueType::String,
                |c| c.test_instrumentation_runner.clone(),
                |c, v| c.test_instrumentation_runner = v,
            )
            .settable(
                "isMultiDexEnabled",
                ValueType::Bool,
                |c| c.multi_dex_enabled,
                |c, v| c.multi_dex_enabled = v,
            )
            .read_only(
                "manifestPlaceholders",
                ValueType::map(ValueType::String),
                |c| c.manifest_placeholders.clone(),
            );
    }
}

/// Java compilation settings
///
/// Language levels have no backing fields in the DSL; they are written
/// through their setters, usually as `{ valueOf = "VERSION_17" }`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    pub source_compatibility: Option<JavaVersion>,
    pub target_compatibility: Option<JavaVersion>,
    pub encoding: Option<String>,
}

impl Describe for CompileOptions {
    const NAME: &'static str = "CompileOptions";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .settable(
                "encoding",
                ValueType::String,
                |c| c.encoding.clone(),
                |c, v| c.encoding = v,
            )
            .setter_member(
                "setSourceCompatibility",
                ValueType::enumeration::<JavaVersion>(),
                |c: &mut Self, v: JavaVersion| c.source_compatibility = Some(v),
            )
            .setter_member(
                "setTargetCompatibility",
                ValueType::enumeration::<JavaVersion>(),
                |c: &mut Self, v: JavaVersion| c.target_compatibility = Some(v),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ShapeCache;

    #[test]
    fn test_default_build_types() {
        let android = ApplicationExtension::new("/project");
        assert_eq!(android.build_types.len(), 2);
        assert!(android.build_types.get("debug").unwrap().borrow().debuggable);
        assert!(!android.build_types.get("release").unwrap().borrow().debuggable);
    }

    #[test]
    fn test_default_proguard_file() {
        let android = ApplicationExtension::new("/project");
        assert_eq!(
            android.default_proguard_file("proguard-android.txt"),
            Path::new("/project/build/intermediates/default_proguard_files/global/proguard-android.txt")
        );
    }

    #[test]
    fn test_shape_classification() {
        let cache = ShapeCache::new();
        let shape = cache.shape_for::<ApplicationExtension>();
        assert!(shape.settable("compileSdk").is_some());
        assert!(shape.read_only("buildTypes").is_some());
        assert!(shape.members("resourcePrefix").is_some());

        let options = cache.shape_for::<CompileOptions>();
        assert!(options.field("sourceCompatibility").is_none());
        assert_eq!(options.members("setSourceCompatibility").unwrap()[0].arity(), 1);
    }
}
