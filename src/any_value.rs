use crate::reified::ReifiedType;
use indexmap::Equivalent;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A shared, type-erased value stored in a map slot.
///
/// Families read values back with [`AnyValue::downcast_ref`]; everything else
/// about the slot is internal to the map.
#[derive(Clone)]
pub struct AnyValue {
    value: Arc<dyn Any + Send + Sync>,
}

impl AnyValue {
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Get a reference to the contained value if it is of type T
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnyValue(..)")
    }
}

/// Object-safe view of a key value: equality, hashing and formatting without
/// knowing the concrete key type.
pub(crate) trait DynKey: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<K> DynKey for K
where
    K: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A type-erased map key: the key value together with the reified type
/// parameter it was inserted under.
#[derive(Clone)]
pub(crate) struct AnyKey {
    ty: ReifiedType,
    key: Arc<dyn DynKey>,
}

impl AnyKey {
    pub(crate) fn new<K>(ty: ReifiedType, key: K) -> Self
    where
        K: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            ty,
            key: Arc::new(key),
        }
    }

    pub(crate) fn ty(&self) -> ReifiedType {
        self.ty
    }

    pub(crate) fn downcast_ref<K: 'static>(&self) -> Option<&K> {
        self.key.as_any().downcast_ref::<K>()
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.key.dyn_eq(other.key.as_ref())
    }
}

impl Eq for AnyKey {}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        self.key.dyn_hash(state);
    }
}

impl fmt::Debug for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.dyn_fmt(f)
    }
}

/// Borrowed lookup key, hashed and compared exactly like [`AnyKey`] so lookups
/// need no allocation.
pub(crate) struct KeyProbe<'a> {
    ty: ReifiedType,
    key: &'a dyn DynKey,
}

impl<'a> KeyProbe<'a> {
    pub(crate) fn new(ty: ReifiedType, key: &'a dyn DynKey) -> Self {
        Self { ty, key }
    }
}

impl Hash for KeyProbe<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        self.key.dyn_hash(state);
    }
}

impl Equivalent<AnyKey> for KeyProbe<'_> {
    fn equivalent(&self, key: &AnyKey) -> bool {
        self.ty == key.ty && self.key.dyn_eq(key.key.as_ref())
    }
}
