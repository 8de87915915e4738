//! Live values exchanged with host-owned extension objects
//!
//! The host owns its extension objects; the mapper only holds [`ObjectRef`]
//! handles to them and moves [`Live`] values in and out through descriptor
//! closures.

pub mod containers;

pub use containers::{
    Collection, ListProperty, MapProperty, MapSink, NamedCollection, NamedContainer, Property,
    PropertyCell,
};

use crate::error::{Error, Result};
use crate::shape::{Describe, EnumRef, TypeRef};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Shared, interior-mutable storage for a host object
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in [`Shared`] storage
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Type-erased handle to a live host object
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<dyn Any>,
    ty: TypeRef,
}

impl ObjectRef {
    /// Move a value into fresh shared storage and return a handle to it
    pub fn new<T: Describe>(value: T) -> Self {
        Self::from_shared(shared(value))
    }

    /// Handle to existing shared storage; clones write through to the same object
    pub fn from_shared<T: Describe>(value: Shared<T>) -> Self {
        Self {
            inner: value,
            ty: TypeRef::of::<T>(),
        }
    }

    /// Type identity of the object behind this handle
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    /// Borrow the object as `T`
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let cell = self.cell::<T>()?;
        let value = cell.try_borrow().map_err(|_| self.busy())?;
        Ok(f(&value))
    }

    /// Mutably borrow the object as `T`
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let cell = self.cell::<T>()?;
        let mut value = cell.try_borrow_mut().map_err(|_| self.busy())?;
        Ok(f(&mut value))
    }

    /// Recover the typed shared storage
    pub fn downcast<T: 'static>(&self) -> Option<Shared<T>> {
        self.inner.clone().downcast::<RefCell<T>>().ok()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn cell<T: 'static>(&self) -> Result<&RefCell<T>> {
        self.inner.downcast_ref::<RefCell<T>>().ok_or_else(|| {
            Error::Host(format!(
                "{} handle accessed as {}",
                self.ty.name(),
                std::any::type_name::<T>()
            ))
        })
    }

    fn busy(&self) -> Error {
        Error::Host(format!("{} is already borrowed", self.ty.name()))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.ty.name())
    }
}

/// A constant of a host enum, carried by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub ty: EnumRef,
    pub constant: &'static str,
}

impl EnumValue {
    pub fn of<E: DslEnum>(value: E) -> Self {
        Self {
            ty: EnumRef::of::<E>(),
            constant: value.constant(),
        }
    }
}

/// A runtime value produced by coercion or read from a host object
#[derive(Clone)]
pub enum Live {
    Unit,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
    Enum(EnumValue),
    Path(PathBuf),
    /// Raw document value handed through unconverted
    Raw(toml::Value),
    Object(ObjectRef),
    Named(Rc<dyn NamedCollection>),
    List(Rc<dyn Collection>),
    Map(Rc<dyn MapSink>),
    Property(Rc<dyn PropertyCell>),
}

impl Live {
    /// Short name of the value's kind
    pub fn kind(&self) -> &'static str {
        match self {
            Live::Unit => "nothing",
            Live::Bool(_) => "boolean",
            Live::Int(_) => "int",
            Live::Long(_) => "long",
            Live::Double(_) => "double",
            Live::Str(_) => "string",
            Live::Enum(_) => "enum constant",
            Live::Path(_) => "path",
            Live::Raw(_) => "raw value",
            Live::Object(_) => "object",
            Live::Named(_) => "named collection",
            Live::List(_) => "collection",
            Live::Map(_) => "map",
            Live::Property(_) => "property",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::Host(format!("expected {} but got {:?}", expected, self))
    }
}

impl fmt::Debug for Live {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Live::Unit => write!(f, "Unit"),
            Live::Bool(v) => write!(f, "Bool({v})"),
            Live::Int(v) => write!(f, "Int({v})"),
            Live::Long(v) => write!(f, "Long({v})"),
            Live::Double(v) => write!(f, "Double({v})"),
            Live::Str(v) => write!(f, "Str({v:?})"),
            Live::Enum(v) => write!(f, "Enum({}.{})", v.ty.name(), v.constant),
            Live::Path(v) => write!(f, "Path({v:?})"),
            Live::Raw(v) => write!(f, "Raw({v})"),
            Live::Object(v) => write!(f, "{v:?}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Conversion from a [`Live`] value into a host field type
pub trait FromLive: Sized {
    fn from_live(value: Live) -> Result<Self>;
}

/// Conversion from a host field value into a [`Live`] value
pub trait IntoLive {
    fn into_live(self) -> Live;
}

/// A host enum addressable by constant name
pub trait DslEnum: Copy + 'static {
    const NAME: &'static str;
    const CONSTANTS: &'static [&'static str];

    fn from_constant(constant: &str) -> Option<Self>;

    fn constant(&self) -> &'static str;
}

/// Shared [`FromLive`] body for [`DslEnum`] types
pub fn enum_from_live<E: DslEnum>(value: Live) -> Result<E> {
    match &value {
        Live::Enum(v) if v.ty == EnumRef::of::<E>() => E::from_constant(v.constant)
            .ok_or_else(|| value.mismatch(E::NAME)),
        Live::Str(s) => E::from_constant(s).ok_or_else(|| value.mismatch(E::NAME)),
        _ => Err(value.mismatch(E::NAME)),
    }
}

impl FromLive for Live {
    fn from_live(value: Live) -> Result<Self> {
        Ok(value)
    }
}

impl IntoLive for Live {
    fn into_live(self) -> Live {
        self
    }
}

impl FromLive for bool {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Bool(v) => Ok(v),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl FromLive for i32 {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Int(v) => Ok(v),
            Live::Long(v) => i32::try_from(v).map_err(|_| value.mismatch("int")),
            other => Err(other.mismatch("int")),
        }
    }
}

impl FromLive for i64 {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Long(v) => Ok(v),
            Live::Int(v) => Ok(i64::from(v)),
            other => Err(other.mismatch("long")),
        }
    }
}

impl FromLive for f64 {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Double(v) => Ok(v),
            other => Err(other.mismatch("double")),
        }
    }
}

impl FromLive for String {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Str(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }
}

impl FromLive for PathBuf {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Path(v) => Ok(v),
            other => Err(other.mismatch("path")),
        }
    }
}

impl FromLive for toml::Value {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Raw(v) => Ok(v),
            other => Err(other.mismatch("raw value")),
        }
    }
}

impl<T: Describe> FromLive for Shared<T> {
    fn from_live(value: Live) -> Result<Self> {
        match &value {
            Live::Object(obj) => obj.downcast::<T>().ok_or_else(|| value.mismatch(T::NAME)),
            _ => Err(value.mismatch(T::NAME)),
        }
    }
}

impl<T: FromLive> FromLive for Option<T> {
    fn from_live(value: Live) -> Result<Self> {
        match value {
            Live::Unit => Ok(None),
            other => T::from_live(other).map(Some),
        }
    }
}

impl IntoLive for () {
    fn into_live(self) -> Live {
        Live::Unit
    }
}

impl IntoLive for bool {
    fn into_live(self) -> Live {
        Live::Bool(self)
    }
}

impl IntoLive for i32 {
    fn into_live(self) -> Live {
        Live::Int(self)
    }
}

impl IntoLive for i64 {
    fn into_live(self) -> Live {
        Live::Long(self)
    }
}

impl IntoLive for f64 {
    fn into_live(self) -> Live {
        Live::Double(self)
    }
}

impl IntoLive for String {
    fn into_live(self) -> Live {
        Live::Str(self)
    }
}

impl IntoLive for PathBuf {
    fn into_live(self) -> Live {
        Live::Path(self)
    }
}

impl IntoLive for toml::Value {
    fn into_live(self) -> Live {
        Live::Raw(self)
    }
}

impl<T: Describe> IntoLive for Shared<T> {
    fn into_live(self) -> Live {
        Live::Object(ObjectRef::from_shared(self))
    }
}

impl<T: IntoLive> IntoLive for Option<T> {
    fn into_live(self) -> Live {
        match self {
            Some(v) => v.into_live(),
            None => Live::Unit,
        }
    }
}

/// Declare a host enum usable as a declarative value type
///
/// ```
/// declarative_core::dsl_enum! {
///     pub enum Level {
///         Low => "LOW",
///         High => "HIGH",
///     }
/// }
/// ```
#[macro_export]
macro_rules! dsl_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $constant:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::live::DslEnum for $name {
            const NAME: &'static str = stringify!($name);
            const CONSTANTS: &'static [&'static str] = &[$($constant),+];

            fn from_constant(constant: &str) -> Option<Self> {
                match constant {
                    $($constant => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn constant(&self) -> &'static str {
                match self {
                    $(Self::$variant => $constant),+
                }
            }
        }

        impl $crate::live::FromLive for $name {
            fn from_live(value: $crate::live::Live) -> $crate::Result<Self> {
                $crate::live::enum_from_live(value)
            }
        }

        impl $crate::live::IntoLive for $name {
            fn into_live(self) -> $crate::live::Live {
                $crate::live::Live::Enum($crate::live::EnumValue::of(self))
            }
        }

        impl $crate::serde::Serialize for $name {
            fn serialize<S: $crate::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::live::DslEnum::constant(self))
            }
        }
    };
}
