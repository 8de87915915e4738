//! Callback adapter for registration-style extensions
//!
//! Some extensions are not configured directly; they expose callback points
//! (`beforeVariants`, `onVariants`) that the host fires later with a fresh
//! payload object. Each child table under a callback point becomes one
//! registered callback that replays the table onto the payload.

use crate::cache::ShapeCache;
use crate::config::MapperOptions;
use crate::document::{DocValue, Document, describe};
use crate::error::{Error, Result};
use crate::live::ObjectRef;
use crate::mapper::DeclarativeMapper;
use crate::shape::TypeRef;
use std::sync::Arc;

/// Reserved selector key targeting every payload instance
pub const ALL_SELECTOR: &str = "all";

/// Which future payload instances a callback applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    Named(String),
}

impl Selector {
    pub fn all() -> Self {
        Selector::All
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Selector::Named(name.into())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Named(expected) => expected == name,
        }
    }
}

/// Callback fired by the host with a freshly available payload
pub type Callback = Box<dyn FnMut(&ObjectRef) -> Result<()>>;

/// A named callback point and the type of payload it is fired with
#[derive(Debug, Clone, Copy)]
pub struct CallbackPoint {
    pub name: &'static str,
    pub payload: TypeRef,
}

impl CallbackPoint {
    pub fn new(name: &'static str, payload: TypeRef) -> Self {
        Self { name, payload }
    }
}

/// Host extension exposing callback points
pub trait ComponentsExtension {
    /// Type name used in diagnostics
    fn type_name(&self) -> &'static str;

    fn callback_points(&self) -> Vec<CallbackPoint>;

    /// Register `action` to run for payloads of `callback` matching `selector`
    fn register(&self, callback: &str, selector: Selector, action: Callback) -> Result<()>;
}

/// Turns callback declarations into host registrations
#[derive(Debug, Clone)]
pub struct CallbackAdapter {
    cache: Arc<ShapeCache>,
    options: MapperOptions,
}

impl CallbackAdapter {
    pub fn new(cache: Arc<ShapeCache>, options: MapperOptions) -> Self {
        Self { cache, options }
    }

    /// Register every callback declared in `table` on `extension`
    ///
    /// `path` is the extension's key in the document, e.g. `androidComponents`.
    pub fn configure(
        &self,
        path: &str,
        table: &Document,
        extension: &dyn ComponentsExtension,
    ) -> Result<()> {
        let points = extension.callback_points();
        for (key, value) in table {
            let point = points
                .iter()
                .find(|point| point.name == key.as_str())
                .ok_or_else(|| Error::UnknownDeclarationKey {
                    path: format!("{path}.{key}"),
                    key: key.clone(),
                    type_name: extension.type_name().to_string(),
                    available: points.iter().map(|p| p.name.to_string()).collect(),
                    shape: String::new(),
                })?;
            self.register_callbacks(&format!("{path}.{key}"), value, point, |selector, action| {
                extension.register(point.name, selector, action)
            })?;
        }
        Ok(())
    }

    /// Register one callback per child table of a callback point
    pub fn register_callbacks(
        &self,
        path: &str,
        value: &DocValue,
        point: &CallbackPoint,
        mut register: impl FnMut(Selector, Callback) -> Result<()>,
    ) -> Result<()> {
        let DocValue::Table(variants) = value else {
            return Err(Error::InvalidDeclaration {
                path: path.to_string(),
                reason: format!(
                    "`{}` expects tables keyed by variant name, found {}",
                    point.name,
                    describe(value)
                ),
            });
        };

        for (variant, declaration) in variants {
            let DocValue::Table(body) = declaration else {
                return Err(Error::MalformedVariantSelector {
                    path: path.to_string(),
                    callback: point.name.to_string(),
                    variant: variant.clone(),
                });
            };
            let selector = if variant == ALL_SELECTOR {
                Selector::all()
            } else {
                Selector::with_name(variant.as_str())
            };
            tracing::debug!("Registering {} callback for {:?}", point.name, selector);
            register(selector, self.callback(format!("{path}.{variant}"), point.payload, body.clone()))?;
        }
        Ok(())
    }

    fn callback(&self, path: String, payload: TypeRef, body: Document) -> Callback {
        let cache = Arc::clone(&self.cache);
        let options = self.options.clone();
        Box::new(move |instance: &ObjectRef| {
            if instance.type_ref() != payload {
                return Err(Error::Host(format!(
                    "callback at `{}` expects {} but was fired with {}",
                    path,
                    payload.name(),
                    instance.type_ref().name()
                )));
            }
            tracing::debug!("Running callback `{}` on {:?}", path, instance);
            DeclarativeMapper::new(&cache, &options)
                .at(&path)
                .parse(&body, instance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::live::{Shared, shared};
    use crate::shape::{Describe, ShapeBuilder, ValueType};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Payload {
        name: String,
        min_sdk: i32,
        debuggable: bool,
    }

    impl Describe for Payload {
        const NAME: &'static str = "Payload";

        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape
                .read_only("name", ValueType::String, |p| p.name.clone())
                .settable("minSdk", ValueType::Int, |p| p.min_sdk, |p, v| p.min_sdk = v)
                .settable("isDebuggable", ValueType::Bool, |p| p.debuggable, |p, v| p.debuggable = v);
        }
    }

    #[derive(Default)]
    struct Components {
        registered: RefCell<Vec<(String, Selector, Callback)>>,
    }

    impl Components {
        fn fire(&self, callback: &str, name: &str) -> Shared<Payload> {
            let payload = shared(Payload {
                name: name.to_string(),
                ..Payload::default()
            });
            let instance = ObjectRef::from_shared(Rc::clone(&payload));
            for (point, selector, action) in self.registered.borrow_mut().iter_mut() {
                if point == callback && selector.matches(name) {
                    action(&instance).unwrap();
                }
            }
            payload
        }
    }

    impl ComponentsExtension for Components {
        fn type_name(&self) -> &'static str {
            "Components"
        }

        fn callback_points(&self) -> Vec<CallbackPoint> {
            vec![CallbackPoint::new("onVariants", TypeRef::of::<Payload>())]
        }

        fn register(&self, callback: &str, selector: Selector, action: Callback) -> Result<()> {
            self.registered
                .borrow_mut()
                .push((callback.to_string(), selector, action));
            Ok(())
        }
    }

    fn adapter() -> CallbackAdapter {
        CallbackAdapter::new(Arc::new(ShapeCache::new()), MapperOptions::default())
    }

    #[test]
    fn test_selector_matching() {
        assert!(Selector::all().matches("anything"));
        assert!(Selector::with_name("debug").matches("debug"));
        assert!(!Selector::with_name("debug").matches("release"));
    }

    #[test]
    fn test_all_and_named_selectors_both_apply() {
        let doc = parse_document(
            "test",
            r#"
            [onVariants.all]
            minSdk = 24
            [onVariants.debug]
            debuggable = true
            "#,
        )
        .unwrap();
        let components = Components::default();
        adapter().configure("androidComponents", &doc, &components).unwrap();
        assert_eq!(components.registered.borrow().len(), 2);

        let debug = components.fire("onVariants", "debug");
        assert_eq!(debug.borrow().min_sdk, 24);
        assert!(debug.borrow().debuggable);

        let release = components.fire("onVariants", "release");
        assert_eq!(release.borrow().min_sdk, 24);
        assert!(!release.borrow().debuggable);
    }

    #[test]
    fn test_leaf_under_callback_is_rejected() {
        let doc = parse_document("test", "[onVariants]\nminSdk = 24\n").unwrap();
        let err = adapter()
            .configure("androidComponents", &doc, &Components::default())
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Invalid `onVariants` declaration at `androidComponents.onVariants`: `minSdk` must be a table. Use `[androidComponents.onVariants.all]` to target all variants or `[androidComponents.onVariants.VARIANT_NAME]` to target one variant");
    }

    #[test]
    fn test_unknown_callback_point() {
        let doc = parse_document("test", "[beforeUnitTests.all]\nminSdk = 1\n").unwrap();
        let err = adapter()
            .configure("androidComponents", &doc, &Components::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownDeclarationKey { key, available, .. }
                if key == "beforeUnitTests" && available == vec!["onVariants".to_string()]
        ));
    }

    #[test]
    fn test_callback_errors_surface_when_fired() {
        let doc = parse_document("test", "[onVariants.all]\nunknown = 1\n").unwrap();
        let components = Components::default();
        adapter().configure("androidComponents", &doc, &components).unwrap();

        let instance = ObjectRef::new(Payload::default());
        let mut registered = components.registered.borrow_mut();
        let err = (registered[0].2)(&instance).unwrap_err();
        assert_eq!(err.path(), Some("androidComponents.onVariants.all.unknown"));
    }
}
