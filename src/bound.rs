use crate::any_value::{AnyKey, AnyValue, KeyProbe};
use crate::error::MapError;
use crate::family::{Family, Instance, KeyFamily, KeyInstance, Member};
use crate::hierarchy::{TypeBound, Within};
use crate::pair::{Iter, KeyRef, Pair, ValueRef};
use crate::reified::ReifiedType;
use crate::transform::{same_unmapped, Deferred, Identity, Mapped, Transform};
use crate::variance::Admits;
use indexmap::IndexMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// A stored value together with the equality of its family at the entry's type.
#[derive(Clone)]
pub(crate) struct Stored {
    pub(crate) value: AnyValue,
    same: fn(&AnyValue, &AnyValue) -> bool,
}

impl Stored {
    pub(crate) fn new<V: Family, T: ?Sized + Member>(value: V::Of<T>) -> Self {
        Self::from_parts(AnyValue::new(value), same_value::<V, T>)
    }

    pub(crate) fn from_parts(value: AnyValue, same: fn(&AnyValue, &AnyValue) -> bool) -> Self {
        Self { value, same }
    }

    /// Value equality, true only when both entries agree.
    pub(crate) fn same_as(&self, other: &Stored) -> bool {
        (self.same)(&self.value, &other.value) && (other.same)(&other.value, &self.value)
    }
}

fn same_value<V: Family, T: ?Sized + Member>(a: &AnyValue, b: &AnyValue) -> bool {
    match (V::load::<T>(a), V::load::<T>(b)) {
        (Some(a), Some(b)) => V::same::<T>(&a, &b),
        _ => false,
    }
}

/// An immutable map from keys of family `K` to values of family `V`, where each
/// entry's key and value share one type parameter drawn from the bound `B`.
///
/// All entries live in a single insertion-ordered map of type-erased slots;
/// types are checked at the boundary. Every operation leaves the receiver
/// unchanged and returns a new map.
///
/// A value of `V::Of<U>` may be stored under a key of `K::Of<T>` when `V`'s
/// variance admits `U` for `T`. See [`variance`](crate::variance).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sovran_typebound::{Name, Named, Shared, TypeBoundMap, Unbounded};
///
/// type Settings = TypeBoundMap<Unbounded, Named<&'static str>, Shared>;
///
/// let settings = Settings::new()
///     .insert(Name::<_, u16>::new("port"), Arc::new(8080u16))
///     .insert(Name::<_, str>::new("host"), Arc::<str>::from("localhost"))
///     .insert(Name::<_, str>::new("port"), Arc::<str>::from("http"));
///
/// // A name holds one entry per type parameter.
/// assert_eq!(settings.len(), 3);
/// assert_eq!(settings.get(&Name::<_, u16>::new("port")).as_deref(), Some(&8080));
/// assert_eq!(settings.get(&Name::<_, str>::new("port")).as_deref(), Some("http"));
/// assert!(settings.get(&Name::<_, u32>::new("port")).is_none());
/// ```
pub struct TypeBoundMap<B, K, V> {
    entries: IndexMap<AnyKey, Stored>,
    _marker: PhantomData<fn() -> (B, K, V)>,
}

impl<B: TypeBound, K: KeyFamily, V: Family> TypeBoundMap<B, K, V> {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::from_entries(IndexMap::new())
    }

    fn from_entries(entries: IndexMap<AnyKey, Stored>) -> Self {
        Self {
            entries,
            _marker: PhantomData,
        }
    }

    /// Gets the value stored under `key`, if any.
    ///
    /// Lookup is by exact key and type parameter; entries stored under a
    /// subtype or supertype of `Q::Param` do not match.
    pub fn get<Q>(&self, key: &Q) -> Option<V::Of<Q::Param>>
    where
        Q: KeyInstance<K>,
        Q::Param: Within<B>,
    {
        let stored = self.lookup(key)?;
        V::load::<Q::Param>(&stored.value)
    }

    /// Gets the value stored under `key`, failing with
    /// [`MapError::KeyNotFound`] when there is none.
    pub fn fetch<Q>(&self, key: &Q) -> Result<V::Of<Q::Param>, MapError>
    where
        Q: KeyInstance<K>,
        Q::Param: Within<B>,
    {
        self.get(key)
            .ok_or_else(|| MapError::KeyNotFound(format!("{:?}", key.as_key())))
    }

    /// Gets the value stored under `key`, or the result of `default` if there is
    /// none. `default` runs only when the key is absent.
    pub fn get_or_else<Q, D>(&self, key: &Q, default: D) -> V::Of<Q::Param>
    where
        Q: KeyInstance<K>,
        Q::Param: Within<B>,
        D: FnOnce() -> V::Of<Q::Param>,
    {
        self.get(key).unwrap_or_else(default)
    }

    /// Returns true if an entry is stored under `key`
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: KeyInstance<K>,
        Q::Param: Within<B>,
    {
        self.lookup(key).is_some()
    }

    fn lookup<Q: KeyInstance<K>>(&self, key: &Q) -> Option<&Stored> {
        let probe = KeyProbe::new(ReifiedType::of::<Q::Param>(), key.as_key());
        self.entries.get(&probe)
    }

    /// Returns a map with `value` stored under `key`.
    ///
    /// The value's type parameter must conform to the key's under `V`'s
    /// variance; the value is converted to the key's type parameter on the way
    /// in. An existing entry under the same key is replaced and keeps its
    /// position.
    pub fn insert<Q, X>(&self, key: Q, value: X) -> Self
    where
        Q: KeyInstance<K>,
        Q::Param: Within<B>,
        X: Instance<V>,
        V::Variance: Admits<V, X::Param, Q::Param>,
    {
        let value = <V::Variance as Admits<V, X::Param, Q::Param>>::conform(value.into_value());
        self.put(&key, value)
    }

    /// Stores a value already at the key's type parameter.
    pub(crate) fn put<Q>(&self, key: &Q, value: V::Of<Q::Param>) -> Self
    where
        Q: KeyInstance<K>,
    {
        let ty = ReifiedType::of::<Q::Param>();

        let mut entries = self.entries.clone();
        let replaced = entries.insert(
            AnyKey::new(ty, key.as_key().clone()),
            Stored::new::<V, Q::Param>(value),
        );
        if replaced.is_some() {
            trace!(key = ?key.as_key(), ty = %ty, "Replaced existing entry");
        }
        Self::from_entries(entries)
    }

    /// Returns a map holding the entries of both maps. On a key collision the
    /// entry of `other` wins and keeps the position it had in `self`.
    pub fn union(&self, other: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (key, stored) in &other.entries {
            if entries.insert(key.clone(), stored.clone()).is_some() {
                trace!(key = ?key, ty = %key.ty(), "Union replaced entry");
            }
        }
        Self::from_entries(entries)
    }

    /// Returns a map of the entries for which `predicate` returns true
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(Pair<'_, B, K, V>) -> bool,
    {
        self.retain(|key, stored| predicate(Pair::new(key, stored)))
    }

    /// Returns a map of the entries for which `predicate` returns false
    pub fn filter_not<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(Pair<'_, B, K, V>) -> bool,
    {
        self.filter(|pair| !predicate(pair))
    }

    /// Returns a map of the entries whose key satisfies `predicate`
    pub fn filter_keys<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(KeyRef<'_, B, K>) -> bool,
    {
        self.retain(|key, _| predicate(KeyRef::new(key)))
    }

    /// Returns a map of the entries whose value satisfies `predicate`
    pub fn filter_values<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(ValueRef<'_, B, V>) -> bool,
    {
        self.retain(|key, stored| predicate(ValueRef::new(key.ty(), stored)))
    }

    fn retain<P>(&self, mut keep: P) -> Self
    where
        P: FnMut(&AnyKey, &Stored) -> bool,
    {
        let entries = self
            .entries
            .iter()
            .filter(|&(key, stored)| keep(key, stored))
            .map(|(key, stored)| (key.clone(), stored.clone()))
            .collect();
        Self::from_entries(entries)
    }

    /// Applies `transform` to every value, keeping keys, order and bound.
    ///
    /// The transform is generic over the type parameter, so it runs when a value
    /// is read back at its type rather than here.
    pub fn map_values<F>(&self, transform: F) -> TypeBoundMap<B, K, Mapped<V, F>>
    where
        F: Transform<V>,
    {
        trace!(entries = self.entries.len(), "Mapping values");
        let transform = Arc::new(transform);
        let entries = self
            .entries
            .iter()
            .map(|(key, stored)| (key.clone(), Deferred::<V, F>::stored(stored, &transform)))
            .collect();
        TypeBoundMap::from_entries(entries)
    }

    /// Returns the entries whose type parameter is within the bound `B2`, as a
    /// map with that bound.
    pub fn restrict_bound<B2: TypeBound>(&self) -> TypeBoundMap<B2, K, V> {
        let entries: IndexMap<AnyKey, Stored> = self
            .entries
            .iter()
            .filter(|(key, _)| B2::admits(&key.ty()))
            .map(|(key, stored)| (key.clone(), stored.clone()))
            .collect();
        let dropped = self.entries.len() - entries.len();
        if dropped > 0 {
            trace!(dropped, "Restricting bound dropped entries");
        }
        TypeBoundMap::from_entries(entries)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl ExactSizeIterator<Item = KeyRef<'_, B, K>> + Clone + '_ {
        self.entries.keys().map(KeyRef::new)
    }

    /// Values in insertion order
    pub fn values(&self) -> impl ExactSizeIterator<Item = ValueRef<'_, B, V>> + Clone + '_ {
        self.entries
            .iter()
            .map(|(key, stored)| ValueRef::new(key.ty(), stored))
    }

    /// Entries in insertion order
    pub fn iter(&self) -> Iter<'_, B, K, V> {
        Iter::new(self.entries.iter())
    }
}

impl<B: TypeBound, K: KeyFamily, V: Family> Default for TypeBoundMap<B, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, K, V> Clone for TypeBoundMap<B, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            _marker: PhantomData,
        }
    }
}

/// Two maps are equal when each holds every entry of the other, with values
/// compared by their family's equality.
impl<B, K, V> PartialEq for TypeBoundMap<B, K, V> {
    fn eq(&self, other: &Self) -> bool {
        same_entries(&self.entries, &other.entries, Stored::same_as)
    }
}

/// A map produced by `map_values(Identity)` equals its source map.
impl<B, K, V: Family> PartialEq<TypeBoundMap<B, K, V>> for TypeBoundMap<B, K, Mapped<V, Identity>> {
    fn eq(&self, other: &TypeBoundMap<B, K, V>) -> bool {
        same_entries(&self.entries, &other.entries, same_unmapped::<V>)
    }
}

impl<B, K, V: Family> PartialEq<TypeBoundMap<B, K, Mapped<V, Identity>>> for TypeBoundMap<B, K, V> {
    fn eq(&self, other: &TypeBoundMap<B, K, Mapped<V, Identity>>) -> bool {
        other == self
    }
}

fn same_entries<S>(ours: &IndexMap<AnyKey, Stored>, theirs: &IndexMap<AnyKey, Stored>, same: S) -> bool
where
    S: Fn(&Stored, &Stored) -> bool,
{
    ours.len() == theirs.len()
        && ours
            .iter()
            .all(|(key, stored)| theirs.get(key).is_some_and(|other| same(stored, other)))
}

impl<B, K, V> fmt::Debug for TypeBoundMap<B, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(key, stored)| (KeyRef::<B, K>::new(key), &stored.value)),
            )
            .finish()
    }
}

impl<'a, B: TypeBound, K: KeyFamily, V: Family> IntoIterator for &'a TypeBoundMap<B, K, V> {
    type Item = Pair<'a, B, K, V>;
    type IntoIter = Iter<'a, B, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
