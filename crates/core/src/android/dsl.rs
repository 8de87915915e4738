use crate::error::Error;
use crate::live::{FromLive, ListProperty, Live, MapProperty, Shared};
use crate::shape::{Describe, ShapeBuilder, ValueType};
use serde::Serialize;
use std::path::PathBuf;

/// One entry of `android.buildTypes`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    #[serde(skip)]
    pub name: String,
    pub minify_enabled: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
    /// Name of the signing config to sign with
    pub signing_config: Option<String>,
    pub proguard_files: ListProperty<PathBuf>,
    pub matching_fallbacks: ListProperty<String>,
    pub manifest_placeholders: MapProperty<String>,
}

impl BuildType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            minify_enabled: false,
            shrink_resources: false,
            debuggable: false,
            application_id_suffix: None,
            version_name_suffix: None,
            signing_config: None,
            proguard_files: ListProperty::new(),
            matching_fallbacks: ListProperty::new(),
            manifest_placeholders: MapProperty::new(),
        }
    }

    /// Copy every setting of `other` into this build type
    pub fn init_with(&mut self, other: &BuildType) {
        self.minify_enabled = other.minify_enabled;
        self.shrink_resources = other.shrink_resources;
        self.debuggable = other.debuggable;
        self.application_id_suffix = other.application_id_suffix.clone();
        self.version_name_suffix = other.version_name_suffix.clone();
        self.signing_config = other.signing_config.clone();
        for file in other.proguard_files.get() {
            self.proguard_files.push(file);
        }
        for fallback in other.matching_fallbacks.get() {
            self.matching_fallbacks.push(fallback);
        }
        for (key, value) in other.manifest_placeholders.entries() {
            self.manifest_placeholders.put(key, value);
        }
    }
}

impl Describe for BuildType {
    const NAME: &'static str = "BuildType";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .read_only("name", ValueType::String, |b| b.name.clone())
            .settable(
                "isMinifyEnabled",
                ValueType::Bool,
                |b| b.minify_enabled,
                |b, v| b.minify_enabled = v,
            )
            .settable(
                "isShrinkResources",
                ValueType::Bool,
                |b| b.shrink_resources,
                |b, v| b.shrink_resources = v,
            )
            .settable(
                "isDebuggable",
                ValueType::Bool,
                |b| b.debuggable,
                |b, v| b.debuggable = v,
            )
            .settable(
                "applicationIdSuffix",
                ValueType::String,
                |b| b.application_id_suffix.clone(),
                |b, v| b.application_id_suffix = v,
            )
            .settable(
                "versionNameSuffix",
                ValueType::String,
                |b| b.version_name_suffix.clone(),
                |b, v| b.version_name_suffix = v,
            )
            .settable(
                "signingConfig",
                ValueType::String,
                |b| b.signing_config.clone(),
                |b, v| b.signing_config = v,
            )
            .read_only("proguardFiles", ValueType::list(ValueType::Path), |b| {
                b.proguard_files.clone()
            })
            .read_only(
                "matchingFallbacks",
                ValueType::list(ValueType::String),
                |b| b.matching_fallbacks.clone(),
            )
            .read_only(
                "manifestPlaceholders",
                ValueType::map(ValueType::String),
                |b| b.manifest_placeholders.clone(),
            )
            .member("initWith", vec![ValueType::object::<BuildType>()], |b, mut args| {
                let other = Shared::<BuildType>::from_live(args.remove(0))?;
                let other = other.try_borrow().map_err(|_| {
                    Error::Host(format!("build type `{}` cannot be initialized with itself", b.name))
                })?;
                b.init_with(&other);
                Ok(Live::Unit)
            });
    }
}

/// One entry of `android.productFlavors`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFlavor {
    #[serde(skip)]
    pub name: String,
    pub dimension: Option<String>,
    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
    pub min_sdk: Option<i32>,
    pub manifest_placeholders: MapProperty<String>,
}

impl ProductFlavor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dimension: None,
            application_id_suffix: None,
            version_name_suffix: None,
            min_sdk: None,
            manifest_placeholders: MapProperty::new(),
        }
    }
}

impl Describe for ProductFlavor {
    const NAME: &'static str = "ProductFlavor";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .read_only("name", ValueType::String, |f| f.name.clone())
            .settable(
                "dimension",
                ValueType::String,
                |f| f.dimension.clone(),
                |f, v| f.dimension = v,
            )
            .settable(
                "applicationIdSuffix",
                ValueType::String,
                |f| f.application_id_suffix.clone(),
                |f, v| f.application_id_suffix = v,
            )
            .settable(
                "versionNameSuffix",
                ValueType::String,
                |f| f.version_name_suffix.clone(),
                |f, v| f.version_name_suffix = v,
            )
            .settable("minSdk", ValueType::Int, |f| f.min_sdk, |f, v| f.min_sdk = v)
            .read_only(
                "manifestPlaceholders",
                ValueType::map(ValueType::String),
                |f| f.manifest_placeholders.clone(),
            );
    }
}

/// One entry of `android.signingConfigs`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    #[serde(skip)]
    pub name: String,
    pub store_file: Option<PathBuf>,
    pub store_password: Option<String>,
    pub store_type: Option<String>,
    pub key_alias: Option<String>,
    pub key_password: Option<String>,
}

impl SigningConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            store_file: None,
            store_password: None,
            store_type: None,
            key_alias: None,
            key_password: None,
        }
    }
}

impl Describe for SigningConfig {
    const NAME: &'static str = "SigningConfig";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .read_only("name", ValueType::String, |s| s.name.clone())
            .settable(
                "storeFile",
                ValueType::Path,
                |s| s.store_file.clone(),
                |s, v| s.store_file = v,
            )
            .settable(
                "storePassword",
                ValueType::String,
                |s| s.store_password.clone(),
                |s, v| s.store_password = v,
            )
            .settable(
                "storeType",
                ValueType::String,
                |s| s.store_type.clone(),
                |s, v| s.store_type = v,
            )
            .settable(
                "keyAlias",
                ValueType::String,
                |s| s.key_alias.clone(),
                |s, v| s.key_alias = v,
            )
            .settable(
                "keyPassword",
                ValueType::String,
                |s| s.key_password.clone(),
                |s, v| s.key_password = v,
            );
    }
}
