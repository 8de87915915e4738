//! Top-level driver: routes each document key to the extension it names

use crate::cache::ShapeCache;
use crate::callbacks::{CallbackAdapter, ComponentsExtension};
use crate::config::MapperOptions;
use crate::document::{DocValue, Document, describe};
use crate::error::{Error, Result};
use crate::live::ObjectRef;
use crate::mapper::DeclarativeMapper;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Top-level key listing plugins to apply before anything else
pub const PLUGINS_KEY: &str = "plugins";

/// Top-level key forwarded to the host after all extensions are configured
pub const DEPENDENCIES_KEY: &str = "dependencies";

/// An extension registered by a plugin
#[derive(Clone)]
pub enum Extension {
    /// Configured directly by the mapper
    Object(ObjectRef),
    /// Configured through callback registration
    Components(Rc<dyn ComponentsExtension>),
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::Object(instance) => write!(f, "Extension({:?})", instance),
            Extension::Components(components) => write!(f, "Components({})", components.type_name()),
        }
    }
}

/// Extensions by name, in registration order
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    entries: Vec<(String, Extension)>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_object(&mut self, name: impl Into<String>, instance: ObjectRef) {
        self.register(name.into(), Extension::Object(instance));
    }

    pub fn register_components(
        &mut self,
        name: impl Into<String>,
        components: Rc<dyn ComponentsExtension>,
    ) {
        self.register(name.into(), Extension::Components(components));
    }

    fn register(&mut self, name: String, extension: Extension) {
        tracing::debug!("Registering extension `{}`: {:?}", name, extension);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = extension,
            None => self.entries.push((name, extension)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The build host a document is applied to
pub trait ProjectHost {
    fn extensions(&self) -> &ExtensionRegistry;

    /// Apply the plugin `id`, registering the extensions it provides
    fn apply_plugin(&mut self, id: &str) -> Result<()>;

    /// Receive the `dependencies` declarations once extensions are configured
    fn dependencies(&mut self, declarations: &DocValue) -> Result<()> {
        tracing::debug!("Ignoring dependencies: {}", declarations);
        Ok(())
    }

    /// Validate cross-references once the whole document is applied
    fn after_evaluate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Applies whole documents to a [`ProjectHost`]
#[derive(Debug, Clone)]
pub struct Declarative {
    cache: Arc<ShapeCache>,
    options: MapperOptions,
}

impl Declarative {
    pub fn new(options: MapperOptions) -> Self {
        Self::with_cache(Arc::new(ShapeCache::new()), options)
    }

    /// Share a shape cache across several documents of one pass
    pub fn with_cache(cache: Arc<ShapeCache>, options: MapperOptions) -> Self {
        Self { cache, options }
    }

    pub fn cache(&self) -> &Arc<ShapeCache> {
        &self.cache
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Apply plugins, configure extensions, hand over dependencies, then let
    /// the host validate the result
    pub fn apply<H: ProjectHost + ?Sized>(&self, document: &Document, host: &mut H) -> Result<()> {
        if let Some(plugins) = document.get(PLUGINS_KEY) {
            for id in plugin_ids(plugins)? {
                tracing::debug!("Applying plugin `{}`", id);
                host.apply_plugin(&id)?;
            }
        }

        for (key, value) in document {
            if key == PLUGINS_KEY || key == DEPENDENCIES_KEY {
                continue;
            }
            let DocValue::Table(table) = value else {
                return Err(Error::InvalidDeclaration {
                    path: key.clone(),
                    reason: format!("{key} must be a table, found {}", describe(value)),
                });
            };
            let extension = host.extensions().get(key).cloned().ok_or_else(|| {
                Error::UnknownExtension {
                    name: key.clone(),
                    available: host.extensions().names(),
                }
            })?;
            self.configure(key, table, &extension)?;
        }

        if let Some(dependencies) = document.get(DEPENDENCIES_KEY) {
            host.dependencies(dependencies)?;
        }
        host.after_evaluate()
    }

    /// Configure one extension from its table
    pub fn configure(&self, name: &str, table: &Document, extension: &Extension) -> Result<()> {
        tracing::debug!("Configuring `{}` with {:?}", name, extension);
        match extension {
            Extension::Object(instance) => DeclarativeMapper::new(&self.cache, &self.options)
                .at(name)
                .parse(table, instance),
            Extension::Components(components) => {
                CallbackAdapter::new(Arc::clone(&self.cache), self.options.clone())
                    .configure(name, table, components.as_ref())
            }
        }
    }
}

/// Plugin ids from a `plugins` array of strings or `{ id = "..." }` tables
pub fn plugin_ids(plugins: &DocValue) -> Result<Vec<String>> {
    let DocValue::Array(entries) = plugins else {
        return Err(Error::InvalidDeclaration {
            path: PLUGINS_KEY.to_string(),
            reason: format!("expected an array, found {}", describe(plugins)),
        });
    };
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            DocValue::String(id) => Ok(id.clone()),
            DocValue::Table(table) => match table.get("id") {
                Some(DocValue::String(id)) => Ok(id.clone()),
                _ => Err(Error::InvalidDeclaration {
                    path: format!("{PLUGINS_KEY}[{index}]"),
                    reason: "plugin table needs an `id` string".to_string(),
                }),
            },
            other => Err(Error::InvalidDeclaration {
                path: format!("{PLUGINS_KEY}[{index}]"),
                reason: format!("expected a plugin id, found {}", describe(other)),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::live::{Shared, shared};
    use crate::shape::{Describe, ShapeBuilder, ValueType};

    #[derive(Debug, Default)]
    struct Java {
        release: i32,
    }

    impl Describe for Java {
        const NAME: &'static str = "JavaExtension";

        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape.settable("release", ValueType::Int, |j| j.release, |j, v| j.release = v);
        }
    }

    #[derive(Default)]
    struct Host {
        registry: ExtensionRegistry,
        java: Shared<Java>,
        applied: Vec<String>,
        dependencies: Option<DocValue>,
        evaluated_after_dependencies: Option<bool>,
    }

    impl ProjectHost for Host {
        fn extensions(&self) -> &ExtensionRegistry {
            &self.registry
        }

        fn apply_plugin(&mut self, id: &str) -> Result<()> {
            self.applied.push(id.to_string());
            if id == "java" {
                self.registry
                    .register_object("java", ObjectRef::from_shared(Rc::clone(&self.java)));
            }
            Ok(())
        }

        fn dependencies(&mut self, declarations: &DocValue) -> Result<()> {
            self.dependencies = Some(declarations.clone());
            Ok(())
        }

        fn after_evaluate(&mut self) -> Result<()> {
            self.evaluated_after_dependencies = Some(self.dependencies.is_some());
            Ok(())
        }
    }

    fn host() -> Host {
        Host {
            java: shared(Java::default()),
            ..Host::default()
        }
    }

    #[test]
    fn test_plugins_are_applied_before_extensions() {
        let doc = parse_document(
            "test",
            r#"
            [java]
            release = 17

            [[plugins]]
            id = "java"

            [dependencies]
            implementation = ["lib"]
            "#,
        )
        .unwrap();
        let mut host = host();
        Declarative::new(MapperOptions::default()).apply(&doc, &mut host).unwrap();

        assert_eq!(host.applied, vec!["java"]);
        assert_eq!(host.java.borrow().release, 17);
        assert_eq!(host.evaluated_after_dependencies, Some(true));
        assert!(host.dependencies.unwrap().is_table());
    }

    #[test]
    fn test_unknown_extension() {
        let doc = parse_document("test", "plugins = [\"java\"]\n[android]\nnamespace = \"x\"\n").unwrap();
        let err = Declarative::new(MapperOptions::default())
            .apply(&doc, &mut host())
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Cannot find extension `android`, has the plugin registering the extension been applied? Registered extensions: java");
    }

    #[test]
    fn test_top_level_scalar_is_invalid() {
        let doc = parse_document("test", "java = 17").unwrap();
        let err = Declarative::new(MapperOptions::default())
            .apply(&doc, &mut host())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { path, .. } if path == "java"));
    }

    #[test]
    fn test_plugin_entries() {
        let plugins = parse_document("test", "p = [\"a\", { id = \"b\" }]").unwrap();
        assert_eq!(plugin_ids(&plugins["p"]).unwrap(), vec!["a", "b"]);

        let bad = parse_document("test", "p = [\"a\", { version = \"1\" }]").unwrap();
        let err = plugin_ids(&bad["p"]).unwrap_err();
        assert_eq!(err.path(), Some("plugins[1]"));
    }

    #[test]
    fn test_registry_replaces_by_name() {
        let mut registry = ExtensionRegistry::new();
        registry.register_object("java", ObjectRef::new(Java::default()));
        registry.register_object("java", ObjectRef::new(Java { release: 11 }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["java"]);
        assert!(registry.contains("java"));
    }
}
