//! Container types host objects expose to the mapper
//!
//! Each container is a cheap handle: clones share storage, so a field getter
//! can hand the mapper a copy that writes through to the host object.

use super::{FromLive, IntoLive, Live, ObjectRef, Shared, shared};
use crate::error::Result;
use crate::shape::{Describe, TypeRef};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A container keyed by name supporting idempotent get-or-create
pub trait NamedCollection {
    /// Type of the elements the container creates
    fn element_type(&self) -> TypeRef;

    /// Return the element named `name`, creating it on first request
    fn maybe_create(&self, name: &str) -> Result<ObjectRef>;

    /// Return the element named `name` if it already exists
    fn get_by_name(&self, name: &str) -> Option<ObjectRef>;

    /// Names of all elements in creation order
    fn names(&self) -> Vec<String>;
}

/// A growable collection
pub trait Collection {
    fn append(&self, value: Live) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A string-keyed map accepting inserts
pub trait MapSink {
    fn insert(&self, key: String, value: Live) -> Result<()>;
}

/// A single-value cell
pub trait PropertyCell {
    fn set(&self, value: Live) -> Result<()>;
}

/// Named collection of host objects, in creation order
pub struct NamedContainer<T> {
    items: Rc<RefCell<Vec<(String, Shared<T>)>>>,
    factory: Rc<dyn Fn(&str) -> T>,
}

impl<T> Clone for NamedContainer<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<T> NamedContainer<T> {
    /// Create an empty container building new elements with `factory`
    pub fn new(factory: impl Fn(&str) -> T + 'static) -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
            factory: Rc::new(factory),
        }
    }

    /// Return the element named `name`, creating it on first request
    pub fn maybe_create_typed(&self, name: &str) -> Shared<T> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let created = shared((self.factory)(name));
        self.items
            .borrow_mut()
            .push((name.to_string(), Rc::clone(&created)));
        created
    }

    pub fn get(&self, name: &str) -> Option<Shared<T>> {
        self.items
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, item)| Rc::clone(item))
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Snapshot of all `(name, element)` pairs
    pub fn entries(&self) -> Vec<(String, Shared<T>)> {
        self.items.borrow().clone()
    }
}

impl<T: Describe> NamedCollection for NamedContainer<T> {
    fn element_type(&self) -> TypeRef {
        TypeRef::of::<T>()
    }

    fn maybe_create(&self, name: &str) -> Result<ObjectRef> {
        Ok(ObjectRef::from_shared(self.maybe_create_typed(name)))
    }

    fn get_by_name(&self, name: &str) -> Option<ObjectRef> {
        self.get(name).map(ObjectRef::from_shared)
    }

    fn names(&self) -> Vec<String> {
        self.items.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl<T: Describe> IntoLive for NamedContainer<T> {
    fn into_live(self) -> Live {
        Live::Named(Rc::new(self))
    }
}

impl<T> fmt::Debug for NamedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.items.borrow().iter().map(|(n, _)| n.clone()).collect();
        f.debug_struct("NamedContainer").field("names", &names).finish()
    }
}

impl<T: Serialize> Serialize for NamedContainer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let items = self.items.borrow();
        let mut map = serializer.serialize_map(Some(items.len()))?;
        for (name, item) in items.iter() {
            map.serialize_entry(name, &*item.borrow())?;
        }
        map.end()
    }
}

/// Growable list of values
pub struct ListProperty<T> {
    items: Shared<Vec<T>>,
}

impl<T> Clone for ListProperty<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> Default for ListProperty<T> {
    fn default() -> Self {
        Self {
            items: shared(Vec::new()),
        }
    }
}

impl<T: Clone> ListProperty<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: T) {
        self.items.borrow_mut().push(value);
    }

    /// Snapshot of the current contents
    pub fn get(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl<T: FromLive + 'static> Collection for ListProperty<T> {
    fn append(&self, value: Live) -> Result<()> {
        let value = T::from_live(value)?;
        self.items.borrow_mut().push(value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

impl<T: FromLive + 'static> IntoLive for ListProperty<T> {
    fn into_live(self) -> Live {
        Live::List(Rc::new(self))
    }
}

impl<T: fmt::Debug> fmt::Debug for ListProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

impl<T: Serialize> Serialize for ListProperty<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let items = self.items.borrow();
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items.iter() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// String-keyed map of values; the last insert for a key wins
pub struct MapProperty<V> {
    entries: Shared<BTreeMap<String, V>>,
}

impl<V> Clone for MapProperty<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<V> Default for MapProperty<V> {
    fn default() -> Self {
        Self {
            entries: shared(BTreeMap::new()),
        }
    }
}

impl<V: Clone> MapProperty<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, value: V) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    /// Snapshot of the current contents
    pub fn entries(&self) -> BTreeMap<String, V> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<V: FromLive + 'static> MapSink for MapProperty<V> {
    fn insert(&self, key: String, value: Live) -> Result<()> {
        let value = V::from_live(value)?;
        self.entries.borrow_mut().insert(key, value);
        Ok(())
    }
}

impl<V: FromLive + 'static> IntoLive for MapProperty<V> {
    fn into_live(self) -> Live {
        Live::Map(Rc::new(self))
    }
}

impl<V: fmt::Debug> fmt::Debug for MapProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.borrow().iter()).finish()
    }
}

impl<V: Serialize> Serialize for MapProperty<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.borrow().serialize(serializer)
    }
}

/// Lazily-set single value
pub struct Property<T> {
    value: Shared<Option<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self {
            value: shared(None),
        }
    }
}

impl<T: Clone> Property<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&self, value: T) {
        *self.value.borrow_mut() = Some(value);
    }

    pub fn get(&self) -> Option<T> {
        self.value.borrow().clone()
    }
}

impl<T: FromLive + 'static> PropertyCell for Property<T> {
    fn set(&self, value: Live) -> Result<()> {
        let value = T::from_live(value)?;
        *self.value.borrow_mut() = Some(value);
        Ok(())
    }
}

impl<T: FromLive + 'static> IntoLive for Property<T> {
    fn into_live(self) -> Live {
        Live::Property(Rc::new(self))
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({:?})", self.value.borrow())
    }
}

impl<T: Serialize> Serialize for Property<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value.borrow().serialize(serializer)
    }
}
