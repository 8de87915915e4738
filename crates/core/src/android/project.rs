use super::{ApplicationComponents, ApplicationExtension, Variant};
use crate::document::DocValue;
use crate::driver::{ExtensionRegistry, ProjectHost};
use crate::error::{Error, Result};
use crate::live::{ObjectRef, Shared, shared};
use crate::mapper::capitalize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Plugin registering `android` and `androidComponents`
pub const APPLICATION_PLUGIN_ID: &str = "com.android.application";

/// Name the `android` extension is registered under
pub const ANDROID_EXTENSION: &str = "android";

/// Plugins accepted without registering any extension
const PASSIVE_PLUGIN_IDS: &[&str] = &["org.jetbrains.kotlin.android", "kotlin-android"];

/// An application project hosting the reference model
#[derive(Debug)]
pub struct AndroidProject {
    project_dir: PathBuf,
    registry: ExtensionRegistry,
    plugins: Vec<String>,
    android: Option<Shared<ApplicationExtension>>,
    components: Option<Rc<ApplicationComponents>>,
    dependencies: Option<DocValue>,
}

impl AndroidProject {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            registry: ExtensionRegistry::new(),
            plugins: Vec::new(),
            android: None,
            components: None,
            dependencies: None,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn android(&self) -> Option<&Shared<ApplicationExtension>> {
        self.android.as_ref()
    }

    pub fn components(&self) -> Option<&Rc<ApplicationComponents>> {
        self.components.as_ref()
    }

    pub fn dependencies_declaration(&self) -> Option<&DocValue> {
        self.dependencies.as_ref()
    }

    /// Variant names: every flavor combined with every build type
    pub fn variant_names(&self) -> Vec<String> {
        let Some(android) = &self.android else {
            return Vec::new();
        };
        let android = android.borrow();
        let build_types: Vec<String> = android
            .build_types
            .entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let flavors: Vec<String> = android
            .product_flavors
            .entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        if flavors.is_empty() {
            return build_types;
        }
        flavors
            .iter()
            .flat_map(|flavor| {
                build_types
                    .iter()
                    .map(move |build_type| format!("{flavor}{}", capitalize(build_type)))
            })
            .collect()
    }

    /// Fire variant callbacks once configuration is complete
    pub fn finish_configuration(&self) -> Result<Vec<Shared<Variant>>> {
        match &self.components {
            Some(components) => components.run_variants(&self.variant_names()),
            None => Ok(Vec::new()),
        }
    }

    /// Serializable view of the configured project
    pub fn report(&self, variants: Vec<Shared<Variant>>) -> ProjectReport {
        ProjectReport {
            plugins: self.plugins.clone(),
            android: self.android.clone(),
            variants,
            dependencies: self.dependencies.clone(),
        }
    }

    fn apply_application_plugin(&mut self) {
        let android = shared(ApplicationExtension::new(&self.project_dir));
        let components = Rc::new(ApplicationComponents::new());
        self.registry
            .register_object(ANDROID_EXTENSION, ObjectRef::from_shared(Rc::clone(&android)));
        self.registry
            .register_components("androidComponents", components.clone());
        self.android = Some(android);
        self.components = Some(components);
    }
}

impl ProjectHost for AndroidProject {
    fn extensions(&self) -> &ExtensionRegistry {
        &self.registry
    }

    fn apply_plugin(&mut self, id: &str) -> Result<()> {
        if self.plugins.iter().any(|applied| applied == id) {
            tracing::debug!("Plugin `{}` already applied", id);
            return Ok(());
        }
        match id {
            APPLICATION_PLUGIN_ID => self.apply_application_plugin(),
            passive if PASSIVE_PLUGIN_IDS.contains(&passive) => {}
            unknown => {
                return Err(Error::Host(format!("Plugin with id '{unknown}' not found")));
            }
        }
        self.plugins.push(id.to_string());
        Ok(())
    }

    fn dependencies(&mut self, declarations: &DocValue) -> Result<()> {
        tracing::debug!("Recording dependencies declaration");
        self.dependencies = Some(declarations.clone());
        Ok(())
    }

    /// Every `signingConfig` must name a declared signing config
    fn after_evaluate(&mut self) -> Result<()> {
        let Some(android) = &self.android else {
            return Ok(());
        };
        let android = android.borrow();
        let declared: Vec<String> = android
            .signing_configs
            .entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        for (name, build_type) in android.build_types.entries() {
            let build_type = build_type.borrow();
            let Some(signing) = build_type.signing_config.as_deref() else {
                continue;
            };
            if !declared.iter().any(|d| d == signing) {
                return Err(Error::InvalidDeclaration {
                    path: format!("{ANDROID_EXTENSION}.buildTypes.{name}.signingConfig"),
                    reason: format!(
                        "no signing config named `{signing}`, declared: {}",
                        declared.join(", ")
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Configured state of an [`AndroidProject`]
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<Shared<ApplicationExtension>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Shared<Variant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DocValue>,
}
