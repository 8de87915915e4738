use crate::callbacks::{Callback, CallbackPoint, ComponentsExtension, Selector};
use crate::error::Result;
use crate::live::{ListProperty, MapProperty, ObjectRef, Property, Shared, shared};
use crate::shape::{Describe, ShapeBuilder, TypeRef, ValueType};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Callback point fired with a [`VariantBuilder`] before variants are created
pub const BEFORE_VARIANTS: &str = "beforeVariants";

/// Callback point fired with each created [`Variant`]
pub const ON_VARIANTS: &str = "onVariants";

/// Payload of `beforeVariants`: decides whether and how a variant is created
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantBuilder {
    pub name: String,
    pub enable: bool,
    pub min_sdk: Option<i32>,
    pub enable_unit_test: bool,
    pub enable_android_test: bool,
}

impl VariantBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enable: true,
            min_sdk: None,
            enable_unit_test: true,
            enable_android_test: true,
        }
    }
}

impl Describe for VariantBuilder {
    const NAME: &'static str = "VariantBuilder";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .read_only("name", ValueType::String, |v| v.name.clone())
            .settable("enable", ValueType::Bool, |v| v.enable, |v, x| v.enable = x)
            .settable("minSdk", ValueType::Int, |v| v.min_sdk, |v, x| v.min_sdk = x)
            .settable(
                "enableUnitTest",
                ValueType::Bool,
                |v| v.enable_unit_test,
                |v, x| v.enable_unit_test = x,
            )
            .settable(
                "enableAndroidTest",
                ValueType::Bool,
                |v| v.enable_android_test,
                |v, x| v.enable_android_test = x,
            );
    }
}

/// Payload of `onVariants`: a created variant
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub application_id: Property<String>,
    pub manifest_placeholders: MapProperty<String>,
    pub proguard_files: ListProperty<PathBuf>,
    pub pseudo_locales_enabled: Property<bool>,
}

impl Variant {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            application_id: Property::new(),
            manifest_placeholders: MapProperty::new(),
            proguard_files: ListProperty::new(),
            pseudo_locales_enabled: Property::new(),
        }
    }
}

impl Describe for Variant {
    const NAME: &'static str = "Variant";

    fn describe(shape: &mut ShapeBuilder<Self>) {
        shape
            .read_only("name", ValueType::String, |v| v.name.clone())
            .read_only(
                "applicationId",
                ValueType::property(ValueType::String),
                |v| v.application_id.clone(),
            )
            .read_only(
                "manifestPlaceholders",
                ValueType::map(ValueType::String),
                |v| v.manifest_placeholders.clone(),
            )
            .read_only("proguardFiles", ValueType::list(ValueType::Path), |v| {
                v.proguard_files.clone()
            })
            .read_only(
                "pseudoLocalesEnabled",
                ValueType::property(ValueType::Bool),
                |v| v.pseudo_locales_enabled.clone(),
            );
    }
}

struct Registration {
    callback: String,
    selector: Selector,
    action: Callback,
}

/// The `androidComponents` extension
///
/// Holds registered callbacks until [`ApplicationComponents::run_variants`]
/// fires them, the way the build tool does once the DSL is locked.
#[derive(Default)]
pub struct ApplicationComponents {
    registrations: RefCell<Vec<Registration>>,
}

impl ApplicationComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Create one variant per name, firing `beforeVariants` then `onVariants`
    ///
    /// A variant disabled by `beforeVariants` is not created.
    pub fn run_variants(&self, names: &[String]) -> Result<Vec<Shared<Variant>>> {
        let mut variants = Vec::new();
        for name in names {
            let builder = shared(VariantBuilder::new(name));
            self.fire(BEFORE_VARIANTS, name, &ObjectRef::from_shared(Rc::clone(&builder)))?;
            if !builder.borrow().enable {
                tracing::debug!("Variant `{}` disabled by beforeVariants", name);
                continue;
            }

            let variant = shared(Variant::new(name));
            self.fire(ON_VARIANTS, name, &ObjectRef::from_shared(Rc::clone(&variant)))?;
            variants.push(variant);
        }
        Ok(variants)
    }

    fn fire(&self, callback: &str, name: &str, payload: &ObjectRef) -> Result<()> {
        let mut registrations = self.registrations.borrow_mut();
        for registration in registrations.iter_mut() {
            if registration.callback == callback && registration.selector.matches(name) {
                tracing::debug!("Firing {} {:?} for `{}`", callback, registration.selector, name);
                (registration.action)(payload)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ApplicationComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationComponents")
            .field("registered", &self.registered())
            .finish()
    }
}

impl ComponentsExtension for ApplicationComponents {
    fn type_name(&self) -> &'static str {
        "ApplicationAndroidComponentsExtension"
    }

    fn callback_points(&self) -> Vec<CallbackPoint> {
        vec![
            CallbackPoint::new(BEFORE_VARIANTS, TypeRef::of::<VariantBuilder>()),
            CallbackPoint::new(ON_VARIANTS, TypeRef::of::<Variant>()),
        ]
    }

    fn register(&self, callback: &str, selector: Selector, action: Callback) -> Result<()> {
        self.registrations.borrow_mut().push(Registration {
            callback: callback.to_string(),
            selector,
            action,
        });
        Ok(())
    }
}
