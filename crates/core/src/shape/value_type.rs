use super::{Describe, TypeShape, builder};
use crate::live::DslEnum;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a describable host type
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    build: fn() -> TypeShape,
}

impl TypeRef {
    pub fn of<T: Describe>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
            build: builder::build_shape::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Introspect the type; callers should go through the shape cache
    pub fn build_shape(&self) -> TypeShape {
        (self.build)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a host enum and its constant names
#[derive(Clone, Copy)]
pub struct EnumRef {
    id: TypeId,
    name: &'static str,
    constants: &'static [&'static str],
}

impl EnumRef {
    pub fn of<E: DslEnum>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::NAME,
            constants: E::CONSTANTS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn constants(&self) -> &'static [&'static str] {
        self.constants
    }

    /// The `valueOf` lookup: constant name to the interned constant
    pub fn value_of(&self, constant: &str) -> Option<&'static str> {
        self.constants.iter().copied().find(|c| *c == constant)
    }
}

impl PartialEq for EnumRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EnumRef {}

impl fmt::Debug for EnumRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declared type of a field or parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    Double,
    String,
    Enum(EnumRef),
    /// File-system path, resolved against the project root
    Path,
    /// Raw document value, passed through unconverted
    Any,
    /// Nested object with its own shape
    Object(TypeRef),
    /// Named collection of objects with get-or-create by name
    Named(TypeRef),
    /// Single-value cell of the contained type
    Property(Box<ValueType>),
    /// Growable collection of the element type
    List(Box<ValueType>),
    /// String-keyed map with the given value type
    Map(Box<ValueType>),
}

impl ValueType {
    pub fn object<T: Describe>() -> Self {
        ValueType::Object(TypeRef::of::<T>())
    }

    pub fn named<T: Describe>() -> Self {
        ValueType::Named(TypeRef::of::<T>())
    }

    pub fn enumeration<E: DslEnum>() -> Self {
        ValueType::Enum(EnumRef::of::<E>())
    }

    pub fn property(inner: ValueType) -> Self {
        ValueType::Property(Box::new(inner))
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn map(value: ValueType) -> Self {
        ValueType::Map(Box::new(value))
    }

    /// Element type of a list, or value type of a map or property
    pub fn contained(&self) -> Option<&ValueType> {
        match self {
            ValueType::Property(inner) | ValueType::List(inner) | ValueType::Map(inner) => {
                Some(&**inner)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("Boolean"),
            ValueType::Int => f.write_str("Int"),
            ValueType::Long => f.write_str("Long"),
            ValueType::Double => f.write_str("Double"),
            ValueType::String => f.write_str("String"),
            ValueType::Enum(e) => f.write_str(e.name()),
            ValueType::Path => f.write_str("File"),
            ValueType::Any => f.write_str("Any"),
            ValueType::Object(t) => f.write_str(t.name()),
            ValueType::Named(t) => write!(f, "NamedDomainObjectContainer<{}>", t.name()),
            ValueType::Property(inner) => write!(f, "Property<{inner}>"),
            ValueType::List(inner) => write!(f, "MutableList<{inner}>"),
            ValueType::Map(inner) => write!(f, "MutableMap<String, {inner}>"),
        }
    }
}
