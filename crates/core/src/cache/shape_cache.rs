use crate::shape::{Describe, TypeRef, TypeShape};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Memoized [`TypeShape`]s keyed by type identity
///
/// Lives for one configuration pass and is handed by reference to every
/// mapper invocation. Reads are concurrent; a miss builds the shape under the
/// write lock so a type is never introspected twice.
#[derive(Debug, Default)]
pub struct ShapeCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeShape>>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape of `ty`, introspecting it on first request
    pub fn shape_of(&self, ty: TypeRef) -> Arc<TypeShape> {
        if let Some(shape) = self.entries.read().get(&ty.id()) {
            return Arc::clone(shape);
        }

        let mut entries = self.entries.write();
        let shape = entries.entry(ty.id()).or_insert_with(|| {
            tracing::debug!("Introspecting type {}", ty.name());
            Arc::new(ty.build_shape())
        });
        Arc::clone(shape)
    }

    /// Shape of `T`, introspecting it on first request
    pub fn shape_for<T: Describe>(&self) -> Arc<TypeShape> {
        self.shape_of(TypeRef::of::<T>())
    }

    pub fn contains(&self, ty: TypeRef) -> bool {
        self.entries.read().contains_key(&ty.id())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached shape, e.g. at the end of a configuration pass
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
