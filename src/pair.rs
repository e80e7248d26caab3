//! Views of map entries whose type parameter is known only at runtime.
//!
//! Iteration yields [`Pair`]s. A pair carries the [`ReifiedType`] shared by its
//! key and value; naming the type with `downcast` recovers the typed key and
//! value.

use crate::any_value::AnyKey;
use crate::bound::Stored;
use crate::family::{Family, KeyFamily, Member};
use crate::reified::{ReifiedType, Reify};
use std::fmt;
use std::marker::PhantomData;

/// One entry of a map: a key and a value sharing a type parameter within the
/// map's bound.
pub struct Pair<'a, B, K, V> {
    key: &'a AnyKey,
    stored: &'a Stored,
    _marker: PhantomData<fn() -> (B, K, V)>,
}

impl<'a, B, K, V> Pair<'a, B, K, V> {
    pub(crate) fn new(key: &'a AnyKey, stored: &'a Stored) -> Self {
        Self {
            key,
            stored,
            _marker: PhantomData,
        }
    }

    /// The type parameter of the entry
    pub fn ty(&self) -> ReifiedType {
        self.key.ty()
    }

    /// Returns true if the entry's type parameter is `T` or one of its subtypes
    pub fn is_subtype_of<T: ?Sized + Reify>(&self) -> bool {
        self.ty().is_subtype_of(&ReifiedType::of::<T>())
    }

    /// The key half of the entry
    pub fn key(&self) -> KeyRef<'a, B, K> {
        KeyRef::new(self.key)
    }

    /// The value half of the entry
    pub fn value(&self) -> ValueRef<'a, B, V> {
        ValueRef::new(self.key.ty(), self.stored)
    }
}

impl<'a, B, K: KeyFamily, V: Family> Pair<'a, B, K, V> {
    /// The typed key and value, if the entry's type parameter is exactly `T`
    pub fn downcast<T: ?Sized + Member>(&self) -> Option<(K::Of<T>, V::Of<T>)> {
        let key = self.key().downcast::<T>()?.clone();
        let value = self.value().downcast::<T>()?;
        Some((key, value))
    }
}

impl<B, K, V> Clone for Pair<'_, B, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, K, V> Copy for Pair<'_, B, K, V> {}

impl<B, K, V> fmt::Debug for Pair<'_, B, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("ty", &self.key.ty())
            .field("key", self.key)
            .finish_non_exhaustive()
    }
}

/// The key of an entry
pub struct KeyRef<'a, B, K> {
    key: &'a AnyKey,
    _marker: PhantomData<fn() -> (B, K)>,
}

impl<'a, B, K> KeyRef<'a, B, K> {
    pub(crate) fn new(key: &'a AnyKey) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    /// The type parameter of the entry
    pub fn ty(&self) -> ReifiedType {
        self.key.ty()
    }
}

impl<'a, B, K: KeyFamily> KeyRef<'a, B, K> {
    /// The typed key, if the entry's type parameter is exactly `T`
    pub fn downcast<T: ?Sized + Member>(&self) -> Option<&'a K::Of<T>> {
        if !self.key.ty().is::<T>() {
            return None;
        }
        self.key.downcast_ref::<K::Of<T>>()
    }
}

impl<B, K> Clone for KeyRef<'_, B, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, K> Copy for KeyRef<'_, B, K> {}

impl<B, K> fmt::Debug for KeyRef<'_, B, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.key, self.key.ty())
    }
}

/// The value of an entry
pub struct ValueRef<'a, B, V> {
    ty: ReifiedType,
    stored: &'a Stored,
    _marker: PhantomData<fn() -> (B, V)>,
}

impl<'a, B, V> ValueRef<'a, B, V> {
    pub(crate) fn new(ty: ReifiedType, stored: &'a Stored) -> Self {
        Self {
            ty,
            stored,
            _marker: PhantomData,
        }
    }

    /// The type parameter of the entry
    pub fn ty(&self) -> ReifiedType {
        self.ty
    }
}

impl<B, V: Family> ValueRef<'_, B, V> {
    /// The typed value, if the entry's type parameter is exactly `T`
    pub fn downcast<T: ?Sized + Member>(&self) -> Option<V::Of<T>> {
        if !self.ty.is::<T>() {
            return None;
        }
        V::load::<T>(&self.stored.value)
    }
}

impl<B, V> Clone for ValueRef<'_, B, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, V> Copy for ValueRef<'_, B, V> {}

impl<B, V> fmt::Debug for ValueRef<'_, B, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueRef<{}>", self.ty)
    }
}

/// Iterator over the entries of a map, in insertion order
pub struct Iter<'a, B, K, V> {
    inner: indexmap::map::Iter<'a, AnyKey, Stored>,
    _marker: PhantomData<fn() -> (B, K, V)>,
}

impl<'a, B, K, V> Iter<'a, B, K, V> {
    pub(crate) fn new(inner: indexmap::map::Iter<'a, AnyKey, Stored>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<'a, B, K, V> Iterator for Iter<'a, B, K, V> {
    type Item = Pair<'a, B, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, stored)| Pair::new(key, stored))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<B, K, V> DoubleEndedIterator for Iter<'_, B, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|(key, stored)| Pair::new(key, stored))
    }
}

impl<B, K, V> ExactSizeIterator for Iter<'_, B, K, V> {}

impl<B, K, V> Clone for Iter<'_, B, K, V> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}
