//! Recursive declarative mapper
//!
//! Walks one document table against one live object, translating each key
//! into a mutation on the object. Resolution order per key:
//!
//! 1. the reserved `_dispatch_` key
//! 2. a settable field named `key` or `is<Key>`
//! 3. a read-only field named `key`
//! 4. a member named `key` or `set<Key>` (or `put` on map-like types)
//!
//! Anything else fails with [`Error::UnknownDeclarationKey`].

use crate::cache::ShapeCache;
use crate::coerce::{Coercer, has_scalar_coercion, invoke_static_factory};
use crate::config::MapperOptions;
use crate::context::{Context, ContextStack};
use crate::document::{DocValue, Document, describe};
use crate::error::{Error, Result};
use crate::live::{Collection, Live, MapSink, NamedCollection, ObjectRef};
use crate::shape::{FieldDescriptor, MemberDescriptor, TypeShape, ValueType};
use std::rc::Rc;
use std::sync::Arc;

/// Reserved key holding a dispatch request at any table level
pub const DISPATCH_KEY: &str = "_dispatch_";

/// Applies declarative documents to live objects
///
/// One mapper drives one top-level `parse` call tree; its context stack never
/// outlives the call.
pub struct DeclarativeMapper<'a> {
    cache: &'a ShapeCache,
    options: &'a MapperOptions,
    coercer: Coercer<'a>,
    contexts: ContextStack,
    path: Vec<String>,
}

impl<'a> DeclarativeMapper<'a> {
    pub fn new(cache: &'a ShapeCache, options: &'a MapperOptions) -> Self {
        Self {
            cache,
            options,
            coercer: Coercer::new(options.project_root()),
            contexts: ContextStack::new(),
            path: Vec::new(),
        }
    }

    /// Prefix every reported key path with `prefix`, e.g. the extension name
    pub fn at(mut self, prefix: &str) -> Self {
        self.path = prefix
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Apply every key of `table` to `instance`, in document order
    pub fn parse(&mut self, table: &Document, instance: &ObjectRef) -> Result<()> {
        tracing::debug!(
            "Parsing {} keys into {} at `{}`",
            table.len(),
            instance.type_ref().name(),
            self.current_path()
        );
        self.parse_object(table, instance)
    }

    fn parse_object(&mut self, table: &Document, instance: &ObjectRef) -> Result<()> {
        let shape = self.cache.shape_of(instance.type_ref());
        self.contexts.push(Context::Extension {
            instance: instance.clone(),
            shape: Arc::clone(&shape),
        });
        let result = table.iter().try_for_each(|(key, value)| {
            self.at_key(key, |mapper| mapper.parse_key(&shape, instance, key, value))
        });
        self.contexts.pop();
        result
    }

    fn parse_key(
        &mut self,
        shape: &TypeShape,
        instance: &ObjectRef,
        key: &str,
        value: &DocValue,
    ) -> Result<()> {
        if key == DISPATCH_KEY {
            return self.dispatch(shape, instance, value);
        }

        let is_key = format!("is{}", capitalize(key));
        if let Some(field) = shape.settable(key).or_else(|| shape.settable(&is_key)) {
            tracing::debug!("F: `{}` = {} at {:?}", self.current_path(), value, field);
            return self.apply_settable(shape, instance, field, key, value);
        }

        if let Some(field) = shape.read_only(key) {
            tracing::debug!("P: `{}` = {} at {:?}", self.current_path(), value, field);
            return self.apply_read_only(shape, instance, field, value);
        }

        self.apply_member(shape, instance, key, value)
    }

    fn apply_settable(
        &mut self,
        shape: &TypeShape,
        instance: &ObjectRef,
        field: &FieldDescriptor,
        key: &str,
        value: &DocValue,
    ) -> Result<()> {
        match (field.value_type(), value) {
            (ValueType::Named(_), _) => {
                let live = field.get(instance)?;
                self.materialize(shape, field, live, value)
            }
            (ValueType::Property(inner), _) => match field.get(instance)? {
                Live::Property(cell) => {
                    let resolved = self.resolve_value(inner, value)?;
                    cell.set(resolved)
                }
                other => Err(self.unassignable(shape, field, format!("getter returned {}", other.kind()))),
            },
            (ValueType::List(element), DocValue::Array(items)) => match field.get(instance)? {
                Live::List(list) => self.append_all(list.as_ref(), element, items),
                other => Err(self.unassignable(shape, field, format!("getter returned {}", other.kind()))),
            },
            (_, DocValue::Table(table)) if !matches!(field.value_type(), ValueType::Map(_)) => {
                match field.get(instance)? {
                    Live::Object(nested) => self.parse_object(table, &nested),
                    Live::Unit if matches!(field.value_type(), ValueType::Object(_)) => {
                        self.unset_nested(shape, field)
                    }
                    _ => self.assign(shape, instance, field, key, value),
                }
            }
            (ValueType::Map(value_type), DocValue::Table(table)) => match field.get(instance)? {
                Live::Map(map) => self.insert_all(map.as_ref(), value_type, table),
                other => Err(self.unassignable(shape, field, format!("getter returned {}", other.kind()))),
            },
            _ => self.assign(shape, instance, field, key, value),
        }
    }

    fn apply_read_only(
        &mut self,
        shape: &TypeShape,
        instance: &ObjectRef,
        field: &FieldDescriptor,
        value: &DocValue,
    ) -> Result<()> {
        let live = field.get(instance)?;
        match (live, value) {
            (live @ Live::Named(_), _) => self.materialize(shape, field, live, value),
            (Live::Map(map), DocValue::Table(table)) => {
                let value_type = self.contained(shape, field)?;
                self.insert_all(map.as_ref(), &value_type, table)
            }
            (Live::Object(nested), DocValue::Table(table)) => self.parse_object(table, &nested),
            (Live::List(list), DocValue::Array(items)) => {
                let element = self.contained(shape, field)?;
                self.append_all(list.as_ref(), &element, items)
            }
            (Live::List(list), scalar) if !scalar.is_table() => {
                let element = self.contained(shape, field)?;
                let path = self.current_path();
                let item = self.coercer.coerce(Some(scalar), &element, &path)?;
                tracing::debug!("Adding {:?} to `{}`", item, path);
                list.append(item)
            }
            (Live::Property(cell), scalar) => {
                let inner = self.contained(shape, field)?;
                let resolved = self.resolve_value(&inner, scalar)?;
                cell.set(resolved)
            }
            (live, value) => Err(self.unassignable(
                shape,
                field,
                format!("read-only {} cannot take {}", live.kind(), describe(value)),
            )),
        }
    }

    /// Write a plain field, falling back to a `set<Key>` member without storage
    fn assign(
        &mut self,
        shape: &TypeShape,
        instance: &ObjectRef,
        field: &FieldDescriptor,
        key: &str,
        value: &DocValue,
    ) -> Result<()> {
        let resolved = self.resolve_value(field.value_type(), value)?;
        match field.set(instance, resolved.clone()) {
            Some(result) => result,
            None => {
                let setter_name = format!("set{}", capitalize(key));
                let setter = shape
                    .members(&setter_name)
                    .and_then(|overloads| overloads.iter().find(|m| m.arity() == 1));
                match setter {
                    Some(member) => {
                        tracing::debug!("`{}` has no storage, calling {:?}", field.name(), member);
                        member.invoke(instance, vec![resolved]).map(|_| ())
                    }
                    None => Err(self.unassignable(
                        shape,
                        field,
                        format!("no backing storage and no `{setter_name}` member"),
                    )),
                }
            }
        }
    }

    /// A sub-table aimed at an object field the host left unset
    fn unset_nested(&self, shape: &TypeShape, field: &FieldDescriptor) -> Result<()> {
        if self.options.is_strict() {
            return Err(self.unassignable(shape, field, "field is unset on the host".to_string()));
        }
        tracing::warn!(
            "Skipping `{}`: {} on {} is unset on the host",
            self.current_path(),
            field.name(),
            shape.type_name()
        );
        Ok(())
    }

    /// Get-or-create one element per child table, then populate it
    fn materialize(
        &mut self,
        shape: &TypeShape,
        field: &FieldDescriptor,
        live: Live,
        value: &DocValue,
    ) -> Result<()> {
        let container = match live {
            Live::Named(container) => container,
            other => {
                return Err(self.unassignable(
                    shape,
                    field,
                    format!("getter returned {}", other.kind()),
                ));
            }
        };
        let DocValue::Table(children) = value else {
            return Err(Error::InvalidDeclaration {
                path: self.current_path(),
                reason: format!("expected a table of named elements, found {}", describe(value)),
            });
        };

        tracing::debug!(
            "maybeCreating {} instances in `{}`",
            children.len(),
            self.current_path()
        );
        for (name, child) in children {
            self.at_key(name, |mapper| mapper.materialize_element(&container, name, child))?;
        }
        Ok(())
    }

    fn materialize_element(
        &mut self,
        container: &Rc<dyn NamedCollection>,
        name: &str,
        child: &DocValue,
    ) -> Result<()> {
        let DocValue::Table(body) = child else {
            return Err(Error::InvalidDeclaration {
                path: self.current_path(),
                reason: format!("expected a table for element `{name}`, found {}", describe(child)),
            });
        };
        let element = container.maybe_create(name)?;
        tracing::debug!("maybeCreated `{}` of type {}", name, element.type_ref().name());

        self.contexts.push(Context::NamedCollection {
            container: Rc::clone(container),
            element: container.element_type(),
        });
        let result = self.parse_object(body, &element);
        self.contexts.pop();
        result
    }

    fn append_all(
        &self,
        list: &dyn Collection,
        element: &ValueType,
        items: &[DocValue],
    ) -> Result<()> {
        let path = self.current_path();
        for index in 0..items.len() {
            let item = self.coercer.coerce_array_element(items, index, element, &path)?;
            tracing::debug!("Adding {:?} to `{}`", item, path);
            list.append(item)?;
        }
        Ok(())
    }

    fn insert_all(&self, map: &dyn MapSink, value_type: &ValueType, table: &Document) -> Result<()> {
        for (key, value) in table {
            let path = format!("{}.{}", self.current_path(), key);
            let coerced = self.coercer.coerce(Some(value), value_type, &path)?;
            tracing::debug!("Putting {} -> {:?} at `{}`", key, coerced, path);
            map.insert(key.clone(), coerced)?;
        }
        Ok(())
    }

    fn apply_member(
        &mut self,
        shape: &TypeShape,
        instance: &ObjectRef,
        key: &str,
        value: &DocValue,
    ) -> Result<()> {
        if shape.is_map_like() {
            if let Some(put) = shape.members("put") {
                tracing::debug!("Routing `{}` through put on {}", key, shape.type_name());
                return self.invoke_candidates(instance, put, key, value, Some(Live::Str(key.to_string())));
            }
        }

        let setter_name = format!("set{}", capitalize(key));
        match shape.members(key).or_else(|| shape.members(&setter_name)) {
            Some(candidates) => {
                tracing::debug!("Found {} potential candidates for `{}`", candidates.len(), key);
                self.invoke_candidates(instance, candidates, key, value, None)
            }
            None => Err(unknown_key(shape, self.current_path(), key)),
        }
    }

    /// Try each overload in declaration order; the first with a resolvable
    /// argument is invoked
    ///
    /// When every overload is rejected and at least one failed to coerce the
    /// value, the first coercion error is returned.
    fn invoke_candidates(
        &mut self,
        instance: &ObjectRef,
        candidates: &[MemberDescriptor],
        key: &str,
        value: &DocValue,
        leading: Option<Live>,
    ) -> Result<()> {
        let arity = if leading.is_some() { 2 } else { 1 };
        let mut mismatch = None;
        for candidate in candidates {
            if candidate.arity() != arity {
                tracing::debug!(
                    "{:?} eliminated, it has {} parameter(s)",
                    candidate,
                    candidate.arity()
                );
                continue;
            }
            let parameter = &candidate.params()[arity - 1];
            match self.resolve_argument(parameter, value) {
                Ok(Some(argument)) => {
                    let mut args: Vec<Live> = leading.iter().cloned().collect();
                    args.push(argument);
                    tracing::debug!("Invoking {:?} with {:?}", candidate, args);
                    candidate.invoke(instance, args)?;
                    return Ok(());
                }
                Ok(None) => {
                    tracing::debug!("{:?} eliminated, cannot resolve a {}", candidate, parameter)
                }
                Err(err @ Error::UnsupportedCoercion { .. }) => {
                    tracing::debug!("{:?} eliminated: {}", candidate, err);
                    mismatch.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        match mismatch {
            Some(err) => Err(err),
            None => self.unresolved(key),
        }
    }

    fn resolve_argument(&self, parameter: &ValueType, value: &DocValue) -> Result<Option<Live>> {
        let path = self.current_path();
        match value {
            DocValue::Table(table) if *parameter != ValueType::Any => {
                let mut entries = table.iter();
                match (entries.next(), entries.next()) {
                    (Some((factory, DocValue::String(argument))), None) => {
                        invoke_static_factory(self.cache, parameter, factory, argument, &path)
                    }
                    _ => {
                        tracing::debug!("Table at `{}` has {} entries, unsupported", path, table.len());
                        Ok(None)
                    }
                }
            }
            _ if has_scalar_coercion(parameter) => {
                self.coercer.coerce(Some(value), parameter, &path).map(Some)
            }
            _ => self.contexts.resolve_symbol(value, parameter, self.cache, &path),
        }
    }

    /// Coerce a value for a field, falling back to context resolution for
    /// tables and non-scalar types
    fn resolve_value(&self, target: &ValueType, value: &DocValue) -> Result<Live> {
        let path = self.current_path();
        let symbolic = match (target, value) {
            (ValueType::Any, _) => false,
            (_, DocValue::Table(_)) => true,
            _ => !has_scalar_coercion(target),
        };
        if !symbolic {
            return self.coercer.coerce(Some(value), target, &path);
        }
        self.contexts
            .resolve_symbol(value, target, self.cache, &path)?
            .ok_or_else(|| Error::UnsupportedCoercion {
                path,
                target: target.to_string(),
                found: describe(value),
            })
    }

    fn dispatch(&mut self, shape: &TypeShape, instance: &ObjectRef, value: &DocValue) -> Result<()> {
        let path = self.current_path();
        let malformed = |reason: String| Error::MalformedDispatch {
            path: path.clone(),
            reason,
        };
        let DocValue::Table(request) = value else {
            return Err(malformed(format!("expected a table, found {}", describe(value))));
        };
        let target = request
            .get("target")
            .and_then(DocValue::as_str)
            .ok_or_else(|| malformed("`target` must be a field name string".to_string()))?;
        let method = request
            .get("method")
            .and_then(DocValue::as_str)
            .ok_or_else(|| malformed("`method` must be a member name string".to_string()))?;
        let params: &[DocValue] = match request.get("params") {
            None => &[],
            Some(DocValue::Array(params)) => params,
            Some(other) => {
                return Err(malformed(format!("`params` must be an array, found {}", describe(other))));
            }
        };

        let field = shape
            .field(target)
            .ok_or_else(|| unknown_key(shape, path.clone(), target))?;
        let target_value = field.get(instance)?;
        tracing::debug!("Dispatch `{}` into {:?}", method, field);

        let Some((context, _)) = self.contexts.find_member(method, params.len()) else {
            return self.unresolved(method);
        };
        let Some(result) = context.call_member(method, params, &self.coercer, &path)? else {
            return self.unresolved(method);
        };
        match target_value {
            Live::List(list) => {
                tracing::debug!("Adding {:?} to `{}`", result, target);
                list.append(result)
            }
            other => {
                tracing::debug!("Discarding {:?}, `{}` is a {}", result, target, other.kind());
                Ok(())
            }
        }
    }

    fn unresolved(&self, key: &str) -> Result<()> {
        let path = self.current_path();
        if self.options.is_strict() {
            return Err(Error::UnresolvedArgument {
                path,
                key: key.to_string(),
            });
        }
        tracing::warn!("Skipping `{}` at `{}`: no value could be resolved", key, path);
        Ok(())
    }

    fn contained(&self, shape: &TypeShape, field: &FieldDescriptor) -> Result<ValueType> {
        field.value_type().contained().cloned().ok_or_else(|| {
            self.unassignable(
                shape,
                field,
                format!("declared type {} has no element type", field.value_type()),
            )
        })
    }

    fn unassignable(&self, shape: &TypeShape, field: &FieldDescriptor, reason: String) -> Error {
        Error::UnassignableField {
            path: self.current_path(),
            field: field.name().to_string(),
            type_name: shape.type_name().to_string(),
            reason,
        }
    }

    fn at_key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.path.push(key.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    fn current_path(&self) -> String {
        self.path.join(".")
    }
}

fn unknown_key(shape: &TypeShape, path: String, key: &str) -> Error {
    Error::UnknownDeclarationKey {
        path,
        key: key.to_string(),
        type_name: shape.type_name().to_string(),
        available: shape.available_names(),
        shape: shape.to_string().trim_end().to_string(),
    }
}

/// `enabled` to `Enabled`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
