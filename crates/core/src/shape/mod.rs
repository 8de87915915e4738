//! Type shapes: what the mapper knows about a host type
//!
//! A [`TypeShape`] lists the settable fields, read-only fields, callable
//! members and static factories of one host type. Shapes are authored once
//! per type through [`Describe`] and memoized by [`crate::cache::ShapeCache`].

mod builder;
mod value_type;

pub use builder::{Describe, ShapeBuilder};
pub use value_type::{EnumRef, TypeRef, ValueType};

use crate::error::Result;
use crate::live::{Live, ObjectRef};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub(crate) type Getter = Arc<dyn Fn(&ObjectRef) -> Result<Live> + Send + Sync>;
pub(crate) type Setter = Arc<dyn Fn(&ObjectRef, Live) -> Result<()> + Send + Sync>;
pub(crate) type Invoker = Arc<dyn Fn(&ObjectRef, Vec<Live>) -> Result<Live> + Send + Sync>;
pub(crate) type Factory = Arc<dyn Fn(&str) -> Result<Live> + Send + Sync>;

/// A field of a host type
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    value_type: ValueType,
    getter: Getter,
    setter: Option<Setter>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the field
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Read the field's current value from `instance`
    pub fn get(&self, instance: &ObjectRef) -> Result<Live> {
        (self.getter)(instance)
    }

    /// Write the field; `None` when the field has no backing storage
    pub fn set(&self, instance: &ObjectRef, value: Live) -> Option<Result<()>> {
        self.setter.as_ref().map(|setter| setter(instance, value))
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value_type)
    }
}

/// One overload of a callable member
#[derive(Clone)]
pub struct MemberDescriptor {
    name: String,
    params: Vec<ValueType>,
    invoker: Invoker,
}

impl MemberDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared positional parameter types
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Call the member on `instance` with already-converted arguments
    pub fn invoke(&self, instance: &ObjectRef, args: Vec<Live>) -> Result<Live> {
        (self.invoker)(instance, args)
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Class-level function building a value from one string argument
#[derive(Clone)]
pub struct StaticFactory {
    name: String,
    factory: Factory,
}

impl StaticFactory {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, argument: &str) -> Result<Live> {
        (self.factory)(argument)
    }
}

impl fmt::Debug for StaticFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "static {}(String)", self.name)
    }
}

/// Everything the mapper knows about one host type
///
/// A name with both a getter and a setter is always classified as settable;
/// a name with a getter only is read-only.
#[derive(Debug)]
pub struct TypeShape {
    type_ref: TypeRef,
    settable: BTreeMap<String, FieldDescriptor>,
    read_only: BTreeMap<String, FieldDescriptor>,
    members: BTreeMap<String, Vec<MemberDescriptor>>,
    statics: BTreeMap<String, StaticFactory>,
    map_like: bool,
}

impl TypeShape {
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    pub fn type_name(&self) -> &'static str {
        self.type_ref.name()
    }

    pub fn settable(&self, name: &str) -> Option<&FieldDescriptor> {
        self.settable.get(name)
    }

    pub fn read_only(&self, name: &str) -> Option<&FieldDescriptor> {
        self.read_only.get(name)
    }

    /// Settable or read-only field named `name`
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.settable(name).or_else(|| self.read_only(name))
    }

    /// All overloads of `name`, in declaration order
    pub fn members(&self, name: &str) -> Option<&[MemberDescriptor]> {
        self.members.get(name).map(|m| m.as_slice())
    }

    pub fn static_factory(&self, name: &str) -> Option<&StaticFactory> {
        self.statics.get(name)
    }

    /// Whether unmatched keys route through a two-argument `put`
    pub fn is_map_like(&self) -> bool {
        self.map_like
    }

    pub fn settable_names(&self) -> impl Iterator<Item = &str> {
        self.settable.keys().map(|k| k.as_str())
    }

    pub fn read_only_names(&self) -> impl Iterator<Item = &str> {
        self.read_only.keys().map(|k| k.as_str())
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(|k| k.as_str())
    }

    /// Every name a document key could bind to: fields first, then members
    pub fn available_names(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .settable_names()
            .chain(self.read_only_names())
            .map(str::to_string)
            .collect();
        fields.sort();
        let members: Vec<String> = self
            .member_names()
            .filter(|m| !fields.iter().any(|f| f == m))
            .map(str::to_string)
            .collect();
        fields.extend(members);
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.settable.is_empty() && self.read_only.is_empty() && self.members.is_empty()
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type = {}", self.type_name())?;
        for field in self.read_only.values() {
            writeln!(f, "P : {:?}", field)?;
        }
        for field in self.settable.values() {
            writeln!(f, "M : {:?}", field)?;
        }
        for overloads in self.members.values() {
            for member in overloads {
                writeln!(f, "F : {:?}", member)?;
            }
        }
        for factory in self.statics.values() {
            writeln!(f, "S : {:?}", factory)?;
        }
        Ok(())
    }
}
