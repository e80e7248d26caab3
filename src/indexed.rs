use crate::bound::TypeBoundMap;
use crate::error::MapError;
use crate::family::{Family, Instance, Member, Reified, TypeKey};
use crate::hierarchy::{TypeBound, Within};
use crate::pair::{Iter, Pair, ValueRef};
use crate::reified::ReifiedType;
use crate::transform::{Identity, Mapped, Transform};
use crate::variance::Admits;
use std::fmt;

/// An immutable map from types to values of family `V` at those types.
///
/// Each entry is keyed by a type `T` within the bound `B` and holds a
/// `V::Of<T>`. Insertion accepts any value whose type parameter conforms to
/// `T` under `V`'s variance, so a covariant map stores an `Arc<Hound>` under
/// `dyn Dog`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sovran_typebound::{Shared, TypeIndexedMap, TypeKey, Unbounded};
///
/// let map = TypeIndexedMap::<Unbounded, Shared>::new()
///     .insert(TypeKey::<String>::new(), Arc::new("Alice".to_string()))
///     .insert_inferred(Arc::new(42u32));
///
/// assert_eq!(map.get::<String>().as_deref().map(String::as_str), Some("Alice"));
/// assert_eq!(map.get::<u32>().as_deref(), Some(&42));
/// assert!(map.get::<u64>().is_none());
/// assert!(map.fetch::<u64>().is_err());
/// ```
pub struct TypeIndexedMap<B, V> {
    inner: TypeBoundMap<B, Reified, V>,
}

impl<B: TypeBound, V: Family> TypeIndexedMap<B, V> {
    /// Creates an empty map
    pub fn new() -> Self {
        Self {
            inner: TypeBoundMap::new(),
        }
    }

    /// Gets the value stored under `T`, if any. Lookup is by exact type.
    pub fn get<T>(&self) -> Option<V::Of<T>>
    where
        T: ?Sized + Member + Within<B>,
    {
        self.inner.get(&TypeKey::<T>::new())
    }

    /// Gets the value stored under `T`, failing with [`MapError::KeyNotFound`]
    /// when there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_typebound::{MapError, Shared, TypeIndexedMap, Unbounded};
    ///
    /// let map = TypeIndexedMap::<Unbounded, Shared>::new();
    /// assert_eq!(map.fetch::<u8>(), Err(MapError::KeyNotFound("u8".to_string())));
    /// ```
    pub fn fetch<T>(&self) -> Result<V::Of<T>, MapError>
    where
        T: ?Sized + Member + Within<B>,
    {
        self.get::<T>()
            .ok_or_else(|| MapError::KeyNotFound(ReifiedType::of::<T>().to_string()))
    }

    /// Gets the value stored under `T`, or the result of `default` if there is
    /// none. `default` runs only when `T` is absent.
    pub fn get_or_else<T, D>(&self, default: D) -> V::Of<T>
    where
        T: ?Sized + Member + Within<B>,
        D: FnOnce() -> V::Of<T>,
    {
        self.inner.get_or_else(&TypeKey::<T>::new(), default)
    }

    /// Gets the value stored under the type parameter of `value`
    pub fn get_like<X>(&self, _value: &X) -> Option<V::Of<X::Param>>
    where
        X: Instance<V>,
        X::Param: Within<B>,
    {
        self.get::<X::Param>()
    }

    /// Returns true if an entry is stored under `T`
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Member + Within<B>,
    {
        self.inner.contains(&TypeKey::<T>::new())
    }

    /// Returns a map with `value` stored under `T`.
    ///
    /// The value's type parameter must conform to `T` under `V`'s variance.
    pub fn insert<T, X>(&self, key: TypeKey<T>, value: X) -> Self
    where
        T: ?Sized + Member + Within<B>,
        X: Instance<V>,
        V::Variance: Admits<V, X::Param, T>,
    {
        Self {
            inner: self.inner.insert(key, value),
        }
    }

    /// Returns a map with `value` stored under its own type parameter.
    ///
    /// For a contravariant family this is the parameter the value was built
    /// at, which is the widest key it conforms to.
    pub fn insert_inferred<X>(&self, value: X) -> Self
    where
        X: Instance<V>,
        X::Param: Within<B>,
    {
        Self {
            inner: self
                .inner
                .put(&TypeKey::<X::Param>::new(), value.into_value()),
        }
    }

    /// Returns a map holding the entries of both maps; entries of `other` win
    pub fn union(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.union(&other.inner),
        }
    }

    /// Returns a map of the entries for which `predicate` returns true
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: FnMut(Pair<'_, B, Reified, V>) -> bool,
    {
        Self {
            inner: self.inner.filter(predicate),
        }
    }

    /// Returns a map of the entries for which `predicate` returns false
    pub fn filter_not<P>(&self, predicate: P) -> Self
    where
        P: FnMut(Pair<'_, B, Reified, V>) -> bool,
    {
        Self {
            inner: self.inner.filter_not(predicate),
        }
    }

    /// Returns a map of the entries whose type satisfies `predicate`
    pub fn filter_keys<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&ReifiedType) -> bool,
    {
        Self {
            inner: self.inner.filter_keys(|key| predicate(&key.ty())),
        }
    }

    /// Returns a map of the entries whose value satisfies `predicate`
    pub fn filter_values<P>(&self, predicate: P) -> Self
    where
        P: FnMut(ValueRef<'_, B, V>) -> bool,
    {
        Self {
            inner: self.inner.filter_values(predicate),
        }
    }

    /// Applies `transform` to every value, keeping types, order and bound
    pub fn map_values<F>(&self, transform: F) -> TypeIndexedMap<B, Mapped<V, F>>
    where
        F: Transform<V>,
    {
        TypeIndexedMap {
            inner: self.inner.map_values(transform),
        }
    }

    /// Returns the entries whose type is within the bound `B2`, as a map with
    /// that bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sovran_typebound::{subtypes, Below, Reify, Shared, TypeIndexedMap, Unbounded};
    ///
    /// trait Pet: Send + Sync {}
    /// struct Cat;
    /// impl Pet for Cat {}
    ///
    /// impl Reify for dyn Pet {}
    /// subtypes! { Cat: dyn Pet; }
    ///
    /// let everything = TypeIndexedMap::<Unbounded, Shared>::new()
    ///     .insert_inferred(Arc::new(Cat))
    ///     .insert_inferred(Arc::new(7u8));
    ///
    /// let pets: TypeIndexedMap<Below<dyn Pet>, Shared> = everything.restrict_bound();
    /// assert_eq!(pets.len(), 1);
    /// assert!(pets.contains::<Cat>());
    /// ```
    pub fn restrict_bound<B2: TypeBound>(&self) -> TypeIndexedMap<B2, V> {
        TypeIndexedMap {
            inner: self.inner.restrict_bound(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Types of the entries, in insertion order
    pub fn keys(&self) -> impl ExactSizeIterator<Item = ReifiedType> + Clone + '_ {
        self.inner.keys().map(|key| key.ty())
    }

    /// Values in insertion order
    pub fn values(&self) -> impl ExactSizeIterator<Item = ValueRef<'_, B, V>> + Clone + '_ {
        self.inner.values()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> Iter<'_, B, Reified, V> {
        self.inner.iter()
    }

    /// The map as a [`TypeBoundMap`] keyed by [`TypeKey`]s
    pub fn as_bound_map(&self) -> &TypeBoundMap<B, Reified, V> {
        &self.inner
    }

    /// Converts into the underlying [`TypeBoundMap`]
    pub fn into_bound_map(self) -> TypeBoundMap<B, Reified, V> {
        self.inner
    }
}

impl<B: TypeBound, V: Family> Default for TypeIndexedMap<B, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, V> Clone for TypeIndexedMap<B, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B, V> PartialEq for TypeIndexedMap<B, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<B, V: Family> PartialEq<TypeIndexedMap<B, V>> for TypeIndexedMap<B, Mapped<V, Identity>> {
    fn eq(&self, other: &TypeIndexedMap<B, V>) -> bool {
        self.inner == other.inner
    }
}

impl<B, V: Family> PartialEq<TypeIndexedMap<B, Mapped<V, Identity>>> for TypeIndexedMap<B, V> {
    fn eq(&self, other: &TypeIndexedMap<B, Mapped<V, Identity>>) -> bool {
        self.inner == other.inner
    }
}

impl<B: TypeBound, V: Family> fmt::Debug for TypeIndexedMap<B, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<B, V> From<TypeBoundMap<B, Reified, V>> for TypeIndexedMap<B, V> {
    fn from(inner: TypeBoundMap<B, Reified, V>) -> Self {
        Self { inner }
    }
}

impl<B, V> From<TypeIndexedMap<B, V>> for TypeBoundMap<B, Reified, V> {
    fn from(map: TypeIndexedMap<B, V>) -> Self {
        map.inner
    }
}

impl<'a, B: TypeBound, V: Family> IntoIterator for &'a TypeIndexedMap<B, V> {
    type Item = Pair<'a, B, Reified, V>;
    type IntoIter = Iter<'a, B, Reified, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
