//! Resolution contexts searched for symbols and members
//!
//! The mapper pushes a context when it descends into an object or a named
//! collection element and pops it on the way out, so a lookup only ever sees
//! the scopes enclosing the key being processed.

use crate::cache::ShapeCache;
use crate::coerce::{Coercer, invoke_static_factory};
use crate::document::DocValue;
use crate::error::{Error, Result};
use crate::live::{Live, NamedCollection, ObjectRef};
use crate::shape::{MemberDescriptor, TypeRef, TypeShape, ValueType};
use std::rc::Rc;
use std::sync::Arc;

/// One resolution scope
#[derive(Clone)]
pub enum Context {
    /// An object currently being populated
    Extension {
        instance: ObjectRef,
        shape: Arc<TypeShape>,
    },
    /// A named collection whose element is currently being populated
    NamedCollection {
        container: Rc<dyn NamedCollection>,
        element: TypeRef,
    },
}

impl Context {
    /// Try to turn `raw` into a value of `expected`
    ///
    /// An extension context handles the `{ factory = "argument" }` form by
    /// calling a static factory of the expected type. A named-collection
    /// context handles a bare name referring to an existing element.
    pub fn resolve(
        &self,
        raw: &DocValue,
        expected: &ValueType,
        cache: &ShapeCache,
        path: &str,
    ) -> Result<Option<Live>> {
        match self {
            Context::Extension { .. } => match raw {
                DocValue::Table(table) if table.len() == 1 => match table.iter().next() {
                    Some((factory, DocValue::String(argument))) => {
                        invoke_static_factory(cache, expected, factory, argument, path)
                    }
                    _ => Ok(None),
                },
                _ => Ok(None),
            },
            Context::NamedCollection { container, element } => match (expected, raw) {
                (ValueType::Object(ty), DocValue::String(name)) if ty == element => {
                    let found = container.get_by_name(name);
                    if found.is_some() {
                        tracing::debug!("Resolved `{}` to {} `{}`", path, element.name(), name);
                    }
                    Ok(found.map(Live::Object))
                }
                _ => Ok(None),
            },
        }
    }

    /// Overloads of `name` taking `arity` parameters, in declaration order
    pub fn overloads(&self, name: &str, arity: usize) -> Vec<&MemberDescriptor> {
        match self {
            Context::Extension { shape, .. } => shape
                .members(name)
                .map(|members| members.iter().filter(|m| m.arity() == arity).collect())
                .unwrap_or_default(),
            Context::NamedCollection { .. } => Vec::new(),
        }
    }

    /// First overload of `name` taking `arity` parameters
    pub fn find_member(&self, name: &str, arity: usize) -> Option<&MemberDescriptor> {
        self.overloads(name, arity).into_iter().next()
    }

    /// Call `name` with positional document parameters
    ///
    /// Overloads whose arity matches `params` are tried in declaration order
    /// and the first whose parameters all coerce is invoked. Returns
    /// `Ok(None)` when this context has no such overload, and the first
    /// coercion error when none of them accepts `params`.
    pub fn call_member(
        &self,
        name: &str,
        params: &[DocValue],
        coercer: &Coercer<'_>,
        path: &str,
    ) -> Result<Option<Live>> {
        let Context::Extension { instance, .. } = self else {
            return Ok(None);
        };
        let mut mismatch = None;
        for member in self.overloads(name, params.len()) {
            let args = member
                .params()
                .iter()
                .enumerate()
                .map(|(index, ty)| coercer.coerce_array_element(params, index, ty, path))
                .collect::<Result<Vec<_>>>();
            match args {
                Ok(args) => {
                    tracing::debug!("Calling {:?} on {:?}", member, instance);
                    return member.invoke(instance, args).map(Some);
                }
                Err(err @ Error::UnsupportedCoercion { .. }) => {
                    tracing::debug!("{:?} eliminated: {}", member, err);
                    mismatch.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        match mismatch {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// Stack of resolution contexts, innermost last
#[derive(Default)]
pub struct ContextStack {
    frames: Vec<Context>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, context: Context) {
        self.frames.push(context);
    }

    pub fn pop(&mut self) -> Option<Context> {
        self.frames.pop()
    }

    /// Resolve `raw` against each context, innermost first
    pub fn resolve_symbol(
        &self,
        raw: &DocValue,
        expected: &ValueType,
        cache: &ShapeCache,
        path: &str,
    ) -> Result<Option<Live>> {
        for context in self.frames.iter().rev() {
            if let Some(value) = context.resolve(raw, expected, cache, path)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Innermost context exposing `name` with `arity` parameters
    ///
    /// A context whose overloads of `name` all take a different number of
    /// parameters does not hide the contexts enclosing it.
    pub fn find_member(&self, name: &str, arity: usize) -> Option<(&Context, &MemberDescriptor)> {
        self.frames.iter().rev().find_map(|context| {
            context
                .find_member(name, arity)
                .map(|member| (context, member))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::live::{FromLive, NamedContainer, Shared};
    use crate::shape::{Describe, ShapeBuilder};
    use std::path::{Path, PathBuf};

    #[derive(Debug, Default)]
    struct Host {
        files: Vec<PathBuf>,
    }

    impl Describe for Host {
        const NAME: &'static str = "Host";

        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape
                .member("defaultFile", vec![], |_, _| Ok(Live::Path(PathBuf::from("defaults/none"))))
                .member("defaultFile", vec![ValueType::Int], |_, mut args| {
                    let index = i32::from_live(args.remove(0))?;
                    Ok(Live::Path(PathBuf::from(format!("defaults/{index}"))))
                })
                .member("defaultFile", vec![ValueType::String], |_, mut args| {
                    let name = String::from_live(args.remove(0))?;
                    Ok(Live::Path(PathBuf::from("defaults").join(name)))
                })
                .setter_member("addFile", ValueType::Path, |h: &mut Host, p: PathBuf| {
                    h.files.push(p)
                });
        }
    }

    #[derive(Debug, Default)]
    struct Nested;

    impl Describe for Nested {
        const NAME: &'static str = "Nested";

        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape.member("defaultFile", vec![], |_, _| Ok(Live::Path(PathBuf::from("nested"))));
        }
    }

    #[derive(Debug)]
    struct Item {
        name: String,
    }

    impl Describe for Item {
        const NAME: &'static str = "Item";

        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape.read_only("name", ValueType::String, |i| i.name.clone());
        }
    }

    fn extension_context(cache: &ShapeCache) -> Context {
        Context::Extension {
            instance: ObjectRef::new(Host::default()),
            shape: cache.shape_for::<Host>(),
        }
    }

    fn items() -> NamedContainer<Item> {
        NamedContainer::new(|name: &str| Item {
            name: name.to_string(),
        })
    }

    fn value(text: &str) -> DocValue {
        parse_document("test", text).unwrap().remove("v").unwrap()
    }

    #[test]
    fn test_named_collection_resolves_existing_element() {
        let cache = ShapeCache::new();
        let container = items();
        container.maybe_create_typed("debug");
        let context = Context::NamedCollection {
            container: Rc::new(container.clone()),
            element: TypeRef::of::<Item>(),
        };

        let resolved = context
            .resolve(&value("v = \"debug\""), &ValueType::object::<Item>(), &cache, "v")
            .unwrap()
            .unwrap();
        let shared = Shared::<Item>::from_live(resolved).unwrap();
        assert_eq!(shared.borrow().name, "debug");

        let missing = context
            .resolve(&value("v = \"release\""), &ValueType::object::<Item>(), &cache, "v")
            .unwrap();
        assert!(missing.is_none());

        let wrong_type = context
            .resolve(&value("v = \"debug\""), &ValueType::object::<Host>(), &cache, "v")
            .unwrap();
        assert!(wrong_type.is_none());
    }

    #[test]
    fn test_extension_context_rejects_multi_entry_tables() {
        let cache = ShapeCache::new();
        let context = extension_context(&cache);
        let raw = value("v = { valueOf = \"A\", other = \"B\" }");
        assert!(context.resolve(&raw, &ValueType::Any, &cache, "v").unwrap().is_none());
    }

    #[test]
    fn test_innermost_context_wins() {
        let cache = ShapeCache::new();
        let outer = items();
        outer.maybe_create_typed("shared");
        let inner = items();
        inner.maybe_create_typed("shared");

        let mut stack = ContextStack::new();
        stack.push(Context::NamedCollection {
            container: Rc::new(outer.clone()),
            element: TypeRef::of::<Item>(),
        });
        stack.push(Context::NamedCollection {
            container: Rc::new(inner.clone()),
            element: TypeRef::of::<Item>(),
        });

        let resolved = stack
            .resolve_symbol(&value("v = \"shared\""), &ValueType::object::<Item>(), &cache, "v")
            .unwrap()
            .unwrap();
        let resolved = Shared::<Item>::from_live(resolved).unwrap();
        assert!(Rc::ptr_eq(&resolved, &inner.get("shared").unwrap()));

        stack.pop();
        let resolved = stack
            .resolve_symbol(&value("v = \"shared\""), &ValueType::object::<Item>(), &cache, "v")
            .unwrap()
            .unwrap();
        let resolved = Shared::<Item>::from_live(resolved).unwrap();
        assert!(Rc::ptr_eq(&resolved, &outer.get("shared").unwrap()));
    }

    #[test]
    fn test_call_member_coerces_params() {
        let cache = ShapeCache::new();
        let mut stack = ContextStack::new();
        stack.push(extension_context(&cache));
        stack.push(Context::NamedCollection {
            container: Rc::new(items()),
            element: TypeRef::of::<Item>(),
        });

        let (context, member) = stack.find_member("defaultFile", 1).unwrap();
        assert_eq!(member.arity(), 1);

        let params = vec![DocValue::String("rules.pro".into())];
        let coercer = Coercer::new(Path::new("/project"));
        let result = context
            .call_member("defaultFile", &params, &coercer, "dispatch")
            .unwrap()
            .unwrap();
        assert!(matches!(result, Live::Path(p) if p == Path::new("defaults/rules.pro")));
        assert!(stack.find_member("missing", 0).is_none());
    }

    #[test]
    fn test_call_member_picks_overload_by_arity_then_declaration_order() {
        let cache = ShapeCache::new();
        let context = extension_context(&cache);
        let coercer = Coercer::new(Path::new("/project"));
        let call = |params: Vec<DocValue>| context.call_member("defaultFile", &params, &coercer, "dispatch");

        let none = call(vec![]).unwrap().unwrap();
        assert!(matches!(none, Live::Path(p) if p == Path::new("defaults/none")));

        let by_index = call(vec![DocValue::Integer(2)]).unwrap().unwrap();
        assert!(matches!(by_index, Live::Path(p) if p == Path::new("defaults/2")));

        let by_name = call(vec![DocValue::String("x.txt".into())]).unwrap().unwrap();
        assert!(matches!(by_name, Live::Path(p) if p == Path::new("defaults/x.txt")));

        let extra = vec![DocValue::String("a".into()), DocValue::String("b".into())];
        assert!(call(extra).unwrap().is_none());

        let err = call(vec![DocValue::Boolean(true)]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCoercion { target, .. } if target == "Int"));
    }

    #[test]
    fn test_wrong_arity_does_not_hide_outer_member() {
        let cache = ShapeCache::new();
        let mut stack = ContextStack::new();
        stack.push(extension_context(&cache));
        stack.push(Context::Extension {
            instance: ObjectRef::new(Nested),
            shape: cache.shape_for::<Nested>(),
        });

        let (inner, _) = stack.find_member("defaultFile", 0).unwrap();
        assert!(matches!(inner, Context::Extension { shape, .. } if shape.type_name() == "Nested"));

        let (outer, member) = stack.find_member("defaultFile", 1).unwrap();
        assert!(matches!(outer, Context::Extension { shape, .. } if shape.type_name() == "Host"));
        assert_eq!(format!("{member:?}"), "defaultFile(Int)");
    }
}
