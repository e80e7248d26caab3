use crate::reified::{ReifiedType, Reify};
use std::marker::PhantomData;
use std::sync::Arc;

/// Static subtype relation: `Self` may stand wherever `Super` is expected.
///
/// Every type is a subtype of itself. Other relations are declared, usually with
/// [`subtypes!`](crate::subtypes), and carry the coercions that move a value from
/// the subtype to the supertype.
pub trait Subtype<Super: ?Sized>: 'static {
    /// Views `self` as the supertype
    fn upcast_ref(&self) -> &Super;

    /// Converts a shared handle into a handle to the supertype
    fn upcast_arc(self: Arc<Self>) -> Arc<Super>;
}

impl<T: ?Sized + 'static> Subtype<T> for T {
    fn upcast_ref(&self) -> &T {
        self
    }

    fn upcast_arc(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares subtype relations for trait-object hierarchies.
///
/// Each clause `Sub: SuperA, SuperB` implements [`Reify`](crate::Reify) for `Sub`
/// with the listed direct supertypes and implements
/// [`Subtype`](crate::Subtype) for every listed supertype. Both the runtime
/// descriptor and the static relation come from the same clause, so the two
/// always agree.
///
/// Supertypes are written as trait objects (`dyn Trait`) the subtype coerces
/// to, by unsizing or by trait upcasting.
///
/// Relations between structs have no built-in coercion and are implemented by
/// hand. Such a relation must both list the supertype in
/// [`Reify::supertypes`](crate::Reify::supertypes) and implement
/// [`Subtype`](crate::Subtype): insertion checks the static impl, while
/// [`restrict_bound`](crate::TypeBoundMap::restrict_bound) and
/// [`ReifiedType::is_subtype_of`](crate::ReifiedType::is_subtype_of) read the
/// descriptor, and the two disagree when only one is written.
///
/// # Examples
///
/// ```
/// use sovran_typebound::{subtypes, Reify, ReifiedType, Subtype};
///
/// trait Pet: Send + Sync {
///     fn name(&self) -> String;
/// }
/// trait Dog: Pet {}
///
/// struct Hound;
/// impl Pet for Hound {
///     fn name(&self) -> String {
///         "Rex".to_string()
///     }
/// }
/// impl Dog for Hound {}
///
/// impl Reify for dyn Pet {}
/// subtypes! {
///     dyn Dog: dyn Pet;
///     Hound: dyn Dog, dyn Pet;
/// }
///
/// let pet: &dyn Pet = <Hound as Subtype<dyn Pet>>::upcast_ref(&Hound);
/// assert_eq!(pet.name(), "Rex");
/// assert!(ReifiedType::of::<Hound>().is_subtype_of(&ReifiedType::of::<dyn Pet>()));
/// ```
#[macro_export]
macro_rules! subtypes {
    (@clause $sub:ty : $(dyn $sup:path),+) => {
        impl $crate::Reify for $sub {
            fn supertypes() -> ::std::vec::Vec<$crate::ReifiedType> {
                ::std::vec![$($crate::ReifiedType::of::<dyn $sup>()),+]
            }
        }

        $(
            impl $crate::Subtype<dyn $sup> for $sub {
                fn upcast_ref(&self) -> &(dyn $sup + 'static) {
                    self
                }

                fn upcast_arc(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<dyn $sup> {
                    self
                }
            }
        )+
    };
    ($($sub:ty : $(dyn $sup:path),+);+ $(;)?) => {
        $(
            $crate::subtypes!(@clause $sub : $(dyn $sup),+);
        )+
    };
}

/// An upper bound on the type parameters a map accepts.
pub trait TypeBound: 'static {
    /// Runtime membership test
    fn admits(ty: &ReifiedType) -> bool;
}

/// The bound every type satisfies
pub enum Unbounded {}

impl TypeBound for Unbounded {
    fn admits(_ty: &ReifiedType) -> bool {
        true
    }
}

/// The bound satisfied by `S` and its declared subtypes
pub struct Below<S: ?Sized>(PhantomData<fn() -> Box<S>>);

impl<S: ?Sized + Reify> TypeBound for Below<S> {
    fn admits(ty: &ReifiedType) -> bool {
        ty.is_subtype_of(&ReifiedType::of::<S>())
    }
}

/// Static membership test: `Self` satisfies the bound `B`
pub trait Within<B: TypeBound> {}

impl<T: ?Sized> Within<Unbounded> for T {}

impl<T, S> Within<Below<S>> for T
where
    T: ?Sized + Subtype<S>,
    S: ?Sized + Reify,
{
}
