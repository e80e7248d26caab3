//! Type families: the value and key shapes a map is parameterised over.
//!
//! A family is a type constructor with one argument. `Shared` maps `T` to
//! `Arc<T>`, `Consumer<R>` maps `T` to a callback over `&T`, and so on. Maps
//! store one family instantiation per entry, each at a different `T`.

use crate::any_value::AnyValue;
use crate::hierarchy::Subtype;
use crate::reified::Reify;
use crate::variance::{Contravariant, Covariant, Invariant, Variance};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Types that can be the type parameter of a map entry.
pub trait Member: Reify + Send + Sync {}

impl<T: ?Sized + Reify + Send + Sync> Member for T {}

/// A value family: the shape `Of<T>` every stored value takes.
pub trait Family: 'static {
    /// How `Of<T>` relates to `Of<U>` when `T` and `U` are related
    type Variance: Variance;

    /// The family applied to `T`
    type Of<T: ?Sized + Member>: Clone + Send + Sync + 'static;

    /// Value equality used by map equality
    fn same<T: ?Sized + Member>(a: &Self::Of<T>, b: &Self::Of<T>) -> bool;

    /// Reads a stored slot back at `T`.
    #[doc(hidden)]
    fn load<T: ?Sized + Member>(value: &AnyValue) -> Option<Self::Of<T>> {
        value.downcast_ref::<Self::Of<T>>().cloned()
    }
}

/// A covariant family: `Of<U>` converts into `Of<T>` whenever `U: Subtype<T>`.
pub trait Widen: Family {
    /// Converts a value at `U` into the same value at the supertype `T`
    fn widen<U, T>(value: Self::Of<U>) -> Self::Of<T>
    where
        U: ?Sized + Member + Subtype<T>,
        T: ?Sized + Member;
}

/// A contravariant family: `Of<U>` converts into `Of<T>` whenever `T: Subtype<U>`.
pub trait Narrow: Family {
    /// Converts a value at `U` into the same value at the subtype `T`
    fn narrow<U, T>(value: Self::Of<U>) -> Self::Of<T>
    where
        U: ?Sized + Member,
        T: ?Sized + Member + Subtype<U>;
}

/// A key family: the shape `Of<T>` every key takes.
pub trait KeyFamily: 'static {
    /// The family applied to `T`
    type Of<T: ?Sized + Member>: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
}

/// A concrete value of family `F`, exposing the type parameter it was built at.
///
/// `Arc<Hound>` is an instance of [`Shared`] with `Param = Hound`. Insertion uses
/// the parameter to check conformance against the key, and
/// [`insert_inferred`](crate::TypeIndexedMap::insert_inferred) uses it as the key.
pub trait Instance<F: Family>: Sized {
    /// The type parameter the value was built at
    type Param: ?Sized + Member;

    /// The value as a member of `F`
    fn into_value(self) -> F::Of<Self::Param>;
}

/// A concrete key of family `K`, exposing the type parameter it stands for.
pub trait KeyInstance<K: KeyFamily> {
    /// The type parameter the key stands for
    type Param: ?Sized + Member;

    /// The key as a member of `K`
    fn as_key(&self) -> &K::Of<Self::Param>;
}

/// Covariant family of shared handles: `Of<T> = Arc<T>`.
///
/// An `Arc<Hound>` may be stored under the `dyn Dog` key; it is widened to
/// `Arc<dyn Dog>` on the way in.
pub enum Shared {}

impl Family for Shared {
    type Variance = Covariant;
    type Of<T: ?Sized + Member> = Arc<T>;

    fn same<T: ?Sized + Member>(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl Widen for Shared {
    fn widen<U, T>(value: Arc<U>) -> Arc<T>
    where
        U: ?Sized + Member + Subtype<T>,
        T: ?Sized + Member,
    {
        <U as Subtype<T>>::upcast_arc(value)
    }
}

impl<T: ?Sized + Member> Instance<Shared> for Arc<T> {
    type Param = T;

    fn into_value(self) -> Arc<T> {
        self
    }
}

/// Invariant family of shared handles: `Of<T> = Arc<T>`, stored only under
/// exactly `T`.
pub enum Exact {}

impl Family for Exact {
    type Variance = Invariant;
    type Of<T: ?Sized + Member> = Arc<T>;

    fn same<T: ?Sized + Member>(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl<T: ?Sized + Member> Instance<Exact> for Arc<T> {
    type Param = T;

    fn into_value(self) -> Arc<T> {
        self
    }
}

/// Covariant family of shared lists: `Of<T> = Vec<Arc<T>>`.
pub enum SharedList {}

impl Family for SharedList {
    type Variance = Covariant;
    type Of<T: ?Sized + Member> = Vec<Arc<T>>;

    fn same<T: ?Sized + Member>(a: &Vec<Arc<T>>, b: &Vec<Arc<T>>) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl Widen for SharedList {
    fn widen<U, T>(value: Vec<Arc<U>>) -> Vec<Arc<T>>
    where
        U: ?Sized + Member + Subtype<T>,
        T: ?Sized + Member,
    {
        value
            .into_iter()
            .map(<U as Subtype<T>>::upcast_arc)
            .collect()
    }
}

impl<T: ?Sized + Member> Instance<SharedList> for Vec<Arc<T>> {
    type Param = T;

    fn into_value(self) -> Vec<Arc<T>> {
        self
    }
}

/// Contravariant family of callbacks: `Of<T> = Arc<dyn Fn(&T) -> R>`.
///
/// A callback accepting any `dyn Pet` may be stored under the `Hound` key,
/// because it accepts every `Hound`. The reverse is rejected.
///
/// Build values with [`Consumer::wrap`], which fixes the callback's signature
/// at the intended parameter type:
///
/// ```
/// use sovran_typebound::Consumer;
///
/// let shout = Consumer::<String>::wrap::<str, _>(|text| text.to_uppercase());
/// assert_eq!(shout("woof"), "WOOF");
/// ```
pub struct Consumer<R>(PhantomData<fn() -> R>);

impl<R: 'static> Consumer<R> {
    /// Wraps a callback over `&T` as a value of this family
    pub fn wrap<T, C>(callback: C) -> Arc<dyn Fn(&T) -> R + Send + Sync>
    where
        T: ?Sized + Member,
        C: Fn(&T) -> R + Send + Sync + 'static,
    {
        Arc::new(callback)
    }
}

impl<R: 'static> Family for Consumer<R> {
    type Variance = Contravariant;
    type Of<T: ?Sized + Member> = Arc<dyn Fn(&T) -> R + Send + Sync>;

    fn same<T: ?Sized + Member>(a: &Self::Of<T>, b: &Self::Of<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl<R: 'static> Narrow for Consumer<R> {
    fn narrow<U, T>(value: Self::Of<U>) -> Self::Of<T>
    where
        U: ?Sized + Member,
        T: ?Sized + Member + Subtype<U>,
    {
        Arc::new(move |item: &T| (*value)(<T as Subtype<U>>::upcast_ref(item)))
    }
}

impl<T: ?Sized + Member, R: 'static> Instance<Consumer<R>> for Arc<dyn Fn(&T) -> R + Send + Sync> {
    type Param = T;

    fn into_value(self) -> Self {
        self
    }
}

/// Key family of maps keyed by names of type `N`.
///
/// Every type parameter shares the same name space, so a map may hold a
/// `u16` and a `str` both named `"port"`.
pub struct Named<N>(PhantomData<fn() -> N>);

impl<N> KeyFamily for Named<N>
where
    N: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    type Of<T: ?Sized + Member> = N;
}

/// A name standing for an entry of type `T`
pub struct Name<N, T: ?Sized> {
    name: N,
    _ty: PhantomData<fn() -> Box<T>>,
}

impl<N, T: ?Sized> Name<N, T> {
    pub fn new(name: N) -> Self {
        Self {
            name,
            _ty: PhantomData,
        }
    }

    pub fn name(&self) -> &N {
        &self.name
    }
}

impl<N: Clone, T: ?Sized> Clone for Name<N, T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<N: fmt::Debug, T: ?Sized> fmt::Debug for Name<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name<{}>({:?})", std::any::type_name::<T>(), self.name)
    }
}

impl<N, T> KeyInstance<Named<N>> for Name<N, T>
where
    N: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    T: ?Sized + Member,
{
    type Param = T;

    fn as_key(&self) -> &N {
        &self.name
    }
}

/// The key family of type-indexed maps: a key is the type itself.
pub enum Reified {}

impl KeyFamily for Reified {
    type Of<T: ?Sized + Member> = TypeKey<T>;
}

/// A zero-sized key standing for the type `T`.
///
/// All `TypeKey<T>` values are equal; keys for different types never are.
pub struct TypeKey<T: ?Sized>(PhantomData<fn() -> Box<T>>);

impl<T: ?Sized> TypeKey<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: ?Sized> Default for TypeKey<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for TypeKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TypeKey<T> {}

impl<T: ?Sized> PartialEq for TypeKey<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: ?Sized> Eq for TypeKey<T> {}

impl<T: ?Sized> Hash for TypeKey<T> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl<T: ?Sized> fmt::Debug for TypeKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey<{}>", std::any::type_name::<T>())
    }
}

impl<T: ?Sized + Member> KeyInstance<Reified> for TypeKey<T> {
    type Param = T;

    fn as_key(&self) -> &TypeKey<T> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Animal: Send + Sync {
        fn noise(&self) -> &'static str;
    }

    struct Goose;

    impl Animal for Goose {
        fn noise(&self) -> &'static str {
            "honk"
        }
    }

    impl Reify for dyn Animal {}
    crate::subtypes! {
        Goose: dyn Animal;
    }

    #[test]
    fn test_shared_widens_to_supertype() {
        let goose: Arc<Goose> = Arc::new(Goose);
        let animal: Arc<dyn Animal> = Shared::widen::<Goose, dyn Animal>(goose);
        assert_eq!(animal.noise(), "honk");
    }

    #[test]
    fn test_shared_list_widens_every_element() {
        let geese = vec![Arc::new(Goose), Arc::new(Goose)];
        let animals = SharedList::widen::<Goose, dyn Animal>(geese);
        assert_eq!(animals.len(), 2);
        assert!(animals.iter().all(|animal| animal.noise() == "honk"));
    }

    #[test]
    fn test_consumer_narrows_to_subtype() {
        let describe =
            Consumer::<String>::wrap::<dyn Animal, _>(|animal| format!("it says {}", animal.noise()));
        let for_geese = Consumer::<String>::narrow::<dyn Animal, Goose>(describe);
        assert_eq!(for_geese(&Goose), "it says honk");
    }

    #[test]
    fn test_same_is_identity_for_shared_handles() {
        let a = Arc::new(5u32);
        let b = Arc::new(5u32);
        assert!(Shared::same::<u32>(&a, &Arc::clone(&a)));
        assert!(!Shared::same::<u32>(&a, &b));
        assert!(SharedList::same::<u32>(&vec![Arc::clone(&a)], &vec![a]));
        assert!(!SharedList::same::<u32>(&vec![], &vec![b]));
    }

    #[test]
    fn test_type_keys() {
        assert_eq!(TypeKey::<str>::new(), TypeKey::<str>::default());
        assert_eq!(format!("{:?}", TypeKey::<u8>::new()), "TypeKey<u8>");
    }

    #[test]
    fn test_names_expose_their_key() {
        let port = Name::<_, u16>::new("port");
        assert_eq!(*port.name(), "port");
        assert_eq!(KeyInstance::<Named<&str>>::as_key(&port), &"port");
        assert_eq!(format!("{:?}", port.clone()), "Name<u16>(\"port\")");
    }

    #[test]
    fn test_load_reads_back_stored_value() {
        let slot = AnyValue::new(Arc::new(9u8));
        assert_eq!(Exact::load::<u8>(&slot).as_deref(), Some(&9));
        assert!(Exact::load::<u16>(&slot).is_none());
    }
}
