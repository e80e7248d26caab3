//! Value transforms that are polymorphic over the type parameter.
//!
//! A map holds many instantiations of its value family at once, so
//! [`map_values`](crate::TypeBoundMap::map_values) takes a [`Transform`] whose
//! `apply` is generic over `T`. The transform is shared by every entry and runs
//! when a value is read back at its type.

use crate::any_value::AnyValue;
use crate::bound::Stored;
use crate::family::{Family, Instance, Member, Narrow, Widen};
use crate::hierarchy::Subtype;
use std::marker::PhantomData;
use std::sync::Arc;

/// A transform from `V::Of<T>` to `Output::Of<T>` for every `T`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sovran_typebound::{Member, Shared, SharedList, Transform, TypeIndexedMap, TypeKey, Unbounded};
///
/// #[derive(PartialEq)]
/// struct Singleton;
///
/// impl Transform<Shared> for Singleton {
///     type Output = SharedList;
///
///     fn apply<T: ?Sized + Member>(&self, value: Arc<T>) -> Vec<Arc<T>> {
///         vec![value]
///     }
/// }
///
/// let map = TypeIndexedMap::<Unbounded, Shared>::new()
///     .insert(TypeKey::<u32>::new(), Arc::new(3u32))
///     .insert(TypeKey::<str>::new(), Arc::<str>::from("three"));
///
/// let lists = map.map_values(Singleton);
/// assert_eq!(lists.get::<u32>().map(|list| list.len()), Some(1));
/// assert_eq!(lists.get::<str>().map(|list| list[0].to_string()), Some("three".to_string()));
/// ```
pub trait Transform<V: Family>: PartialEq + Send + Sync + 'static {
    /// The family values are transformed into
    type Output: Family;

    /// Transforms one value, keeping its type parameter
    fn apply<T: ?Sized + Member>(&self, value: V::Of<T>) -> <Self::Output as Family>::Of<T>;
}

/// The transform that returns every value unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity;

impl<V: Family> Transform<V> for Identity {
    type Output = V;

    fn apply<T: ?Sized + Member>(&self, value: V::Of<T>) -> V::Of<T> {
        value
    }
}

/// The value family of a map produced by `map_values`: `F`'s output family,
/// with entries carried over from the source map transformed on read.
pub struct Mapped<V, F>(PhantomData<fn() -> (V, F)>);

impl<V: Family, F: Transform<V>> Family for Mapped<V, F> {
    type Variance = <F::Output as Family>::Variance;
    type Of<T: ?Sized + Member> = <F::Output as Family>::Of<T>;

    fn same<T: ?Sized + Member>(a: &Self::Of<T>, b: &Self::Of<T>) -> bool {
        <F::Output as Family>::same::<T>(a, b)
    }

    fn load<T: ?Sized + Member>(value: &AnyValue) -> Option<Self::Of<T>> {
        match value.downcast_ref::<Deferred<V, F>>() {
            Some(deferred) => {
                V::load::<T>(&deferred.source.value).map(|source| deferred.transform.apply::<T>(source))
            }
            None => <F::Output as Family>::load::<T>(value),
        }
    }
}

impl<V, F> Widen for Mapped<V, F>
where
    V: Family,
    F: Transform<V>,
    F::Output: Widen,
{
    fn widen<U, T>(value: Self::Of<U>) -> Self::Of<T>
    where
        U: ?Sized + Member + Subtype<T>,
        T: ?Sized + Member,
    {
        <F::Output as Widen>::widen::<U, T>(value)
    }
}

impl<V, F> Narrow for Mapped<V, F>
where
    V: Family,
    F: Transform<V>,
    F::Output: Narrow,
{
    fn narrow<U, T>(value: Self::Of<U>) -> Self::Of<T>
    where
        U: ?Sized + Member,
        T: ?Sized + Member + Subtype<U>,
    {
        <F::Output as Narrow>::narrow::<U, T>(value)
    }
}

impl<V, F, X> Instance<Mapped<V, F>> for X
where
    V: Family,
    F: Transform<V>,
    X: Instance<F::Output>,
{
    type Param = <X as Instance<F::Output>>::Param;

    fn into_value(self) -> <F::Output as Family>::Of<Self::Param> {
        <X as Instance<F::Output>>::into_value(self)
    }
}

/// A source entry waiting for its transform.
pub(crate) struct Deferred<V, F> {
    source: Stored,
    transform: Arc<F>,
    _family: PhantomData<fn() -> V>,
}

impl<V: Family, F: Transform<V>> Deferred<V, F> {
    /// Wraps a source entry, keeping the source's value equality.
    pub(crate) fn stored(source: &Stored, transform: &Arc<F>) -> Stored {
        let deferred = Self {
            source: source.clone(),
            transform: Arc::clone(transform),
            _family: PhantomData,
        };
        Stored::from_parts(AnyValue::new(deferred), same_deferred::<V, F>)
    }
}

fn same_deferred<V: Family, F: Transform<V>>(a: &AnyValue, b: &AnyValue) -> bool {
    match (
        a.downcast_ref::<Deferred<V, F>>(),
        b.downcast_ref::<Deferred<V, F>>(),
    ) {
        (Some(a), Some(b)) => a.transform == b.transform && a.source.same_as(&b.source),
        // A direct entry of the mapped family; its own comparator loads both slots.
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Compares an entry of a map mapped through [`Identity`] with an entry of a
/// map of the source family.
pub(crate) fn same_unmapped<V: Family>(mapped: &Stored, source: &Stored) -> bool {
    match mapped.value.downcast_ref::<Deferred<V, Identity>>() {
        Some(deferred) => deferred.source.same_as(source),
        None => mapped.same_as(source),
    }
}
