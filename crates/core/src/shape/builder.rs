use super::{
    FieldDescriptor, Getter, MemberDescriptor, Setter, StaticFactory, TypeRef, TypeShape,
    ValueType,
};
use crate::error::Result;
use crate::live::{FromLive, IntoLive, Live, ObjectRef};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// A host type that can describe its own shape
///
/// This is the introspection seam: instead of runtime reflection, every type
/// the mapper can populate lists its fields, members and factories once.
pub trait Describe: 'static {
    /// Type name used in diagnostics
    const NAME: &'static str;

    fn describe(shape: &mut ShapeBuilder<Self>)
    where
        Self: Sized;
}

pub(super) fn build_shape<T: Describe>() -> TypeShape {
    let mut builder = ShapeBuilder::<T>::new();
    T::describe(&mut builder);
    tracing::trace!(
        "Introspected {}: {} settable, {} read-only, {} members",
        T::NAME,
        builder.settable.len(),
        builder.read_only.len(),
        builder.members.len()
    );
    builder.finish()
}

/// Typed registration of a host type's shape
pub struct ShapeBuilder<T> {
    settable: BTreeMap<String, FieldDescriptor>,
    read_only: BTreeMap<String, FieldDescriptor>,
    members: BTreeMap<String, Vec<MemberDescriptor>>,
    statics: BTreeMap<String, StaticFactory>,
    map_like: bool,
    _type: PhantomData<fn() -> T>,
}

impl<T: Describe> ShapeBuilder<T> {
    fn new() -> Self {
        Self {
            settable: BTreeMap::new(),
            read_only: BTreeMap::new(),
            members: BTreeMap::new(),
            statics: BTreeMap::new(),
            map_like: false,
            _type: PhantomData,
        }
    }

    /// A field with a getter and a setter
    pub fn settable<V, G, S>(&mut self, name: &str, value_type: ValueType, get: G, set: S) -> &mut Self
    where
        V: IntoLive + FromLive + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |instance: &ObjectRef, value: Live| {
            let value = V::from_live(value)?;
            instance.with_mut::<T, _>(|t| set(t, value))
        });
        self.insert_settable(name, value_type, Self::getter(get), Some(setter))
    }

    /// A settable field without backing storage
    ///
    /// Writes must go through a `set<Name>` member; the mapper falls back to it.
    pub fn computed<V, G>(&mut self, name: &str, value_type: ValueType, get: G) -> &mut Self
    where
        V: IntoLive + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.insert_settable(name, value_type, Self::getter(get), None)
    }

    /// A field with a getter only
    ///
    /// Ignored when the name is already registered as settable.
    pub fn read_only<V, G>(&mut self, name: &str, value_type: ValueType, get: G) -> &mut Self
    where
        V: IntoLive + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        if !self.settable.contains_key(name) {
            let field = FieldDescriptor {
                name: name.to_string(),
                value_type,
                getter: Self::getter(get),
                setter: None,
            };
            self.read_only.insert(name.to_string(), field);
        }
        self
    }

    /// One overload of a callable member; overloads keep declaration order
    pub fn member<F>(&mut self, name: &str, params: Vec<ValueType>, call: F) -> &mut Self
    where
        F: Fn(&mut T, Vec<Live>) -> Result<Live> + Send + Sync + 'static,
    {
        let member = MemberDescriptor {
            name: name.to_string(),
            params,
            invoker: Arc::new(move |instance: &ObjectRef, args: Vec<Live>| {
                instance.with_mut::<T, _>(|t| call(t, args))?
            }),
        };
        self.members.entry(name.to_string()).or_default().push(member);
        self
    }

    /// One-argument member converting its argument with [`FromLive`]
    pub fn setter_member<A, F>(&mut self, name: &str, param: ValueType, call: F) -> &mut Self
    where
        A: FromLive + 'static,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        self.member(name, vec![param], move |t, mut args| {
            let arg = A::from_live(args.pop().unwrap_or(Live::Unit))?;
            call(t, arg);
            Ok(Live::Unit)
        })
    }

    /// Class-level function building a value from one string
    pub fn static_factory<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Live> + Send + Sync + 'static,
    {
        let factory = StaticFactory {
            name: name.to_string(),
            factory: Arc::new(factory),
        };
        self.statics.insert(name.to_string(), factory);
        self
    }

    /// Route unmatched keys through a two-argument `put(key, value)` member
    pub fn map_like(&mut self) -> &mut Self {
        self.map_like = true;
        self
    }

    fn getter<V, G>(get: G) -> Getter
    where
        V: IntoLive + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Arc::new(move |instance: &ObjectRef| instance.with::<T, _>(|t| get(t).into_live()))
    }

    fn insert_settable(
        &mut self,
        name: &str,
        value_type: ValueType,
        getter: Getter,
        setter: Option<Setter>,
    ) -> &mut Self {
        self.read_only.remove(name);
        let field = FieldDescriptor {
            name: name.to_string(),
            value_type,
            getter,
            setter,
        };
        self.settable.insert(name.to_string(), field);
        self
    }

    fn finish(self) -> TypeShape {
        TypeShape {
            type_ref: TypeRef::of::<T>(),
            settable: self.settable,
            read_only: self.read_only,
            members: self.members,
            statics: self.statics,
            map_like: self.map_like,
        }
    }
}
