//! Variance markers and the insertion conformance check.
//!
//! A map with value family `V` accepts a value of `V::Of<U>` under a key for `T`
//! when `V::Variance: Admits<V, U, T>`:
//!
//! | variance        | admitted when      |
//! |-----------------|--------------------|
//! | `Invariant`     | `U == T`           |
//! | `Covariant`     | `U: Subtype<T>`    |
//! | `Contravariant` | `T: Subtype<U>`    |
//!
//! The check is a trait bound, so a non-conforming insertion does not compile.
//! The examples below share this hierarchy:
//!
//! ```
//! use std::sync::Arc;
//! use sovran_typebound::{subtypes, Below, Consumer, Exact, Reify, Shared, TypeIndexedMap, TypeKey};
//!
//! trait Pet: Send + Sync {}
//! trait Dog: Pet {}
//! struct Hound;
//! impl Pet for Hound {}
//! impl Dog for Hound {}
//!
//! impl Reify for dyn Pet {}
//! subtypes! {
//!     dyn Dog: dyn Pet;
//!     Hound: dyn Dog, dyn Pet;
//! }
//!
//! // Covariant: a Hound may stand in for a Dog.
//! let dogs = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
//!     .insert(TypeKey::<dyn Dog>::new(), Arc::new(Hound));
//! assert!(dogs.contains::<dyn Dog>());
//!
//! // Invariant: a Hound is stored under exactly Hound.
//! let exact = TypeIndexedMap::<Below<dyn Pet>, Exact>::new()
//!     .insert(TypeKey::<Hound>::new(), Arc::new(Hound));
//! assert!(exact.contains::<Hound>());
//!
//! // Contravariant: a callback over any Pet may stand in for a callback over Hounds.
//! let any_pet = Consumer::<u32>::wrap::<dyn Pet, _>(|_| 1);
//! let handlers = TypeIndexedMap::<Below<dyn Pet>, Consumer<u32>>::new()
//!     .insert(TypeKey::<Hound>::new(), any_pet);
//! assert_eq!(handlers.get::<Hound>().map(|handle| handle(&Hound)), Some(1));
//! ```
//!
//! Invariant families reject a subtype value:
//!
//! ```compile_fail
//! # use std::sync::Arc;
//! # use sovran_typebound::{subtypes, Below, Exact, Reify, TypeIndexedMap, TypeKey};
//! # trait Pet: Send + Sync {}
//! # trait Dog: Pet {}
//! # struct Hound;
//! # impl Pet for Hound {}
//! # impl Dog for Hound {}
//! # impl Reify for dyn Pet {}
//! # subtypes! { dyn Dog: dyn Pet; Hound: dyn Dog, dyn Pet; }
//! let _ = TypeIndexedMap::<Below<dyn Pet>, Exact>::new()
//!     .insert(TypeKey::<dyn Dog>::new(), Arc::new(Hound));
//! ```
//!
//! Covariant families reject a supertype value under a narrower key:
//!
//! ```compile_fail
//! # use std::sync::Arc;
//! # use sovran_typebound::{subtypes, Below, Shared, Reify, TypeIndexedMap, TypeKey};
//! # trait Pet: Send + Sync {}
//! # trait Dog: Pet {}
//! # struct Hound;
//! # impl Pet for Hound {}
//! # impl Dog for Hound {}
//! # impl Reify for dyn Pet {}
//! # subtypes! { dyn Dog: dyn Pet; Hound: dyn Dog, dyn Pet; }
//! let pet: Arc<dyn Pet> = Arc::new(Hound);
//! let _ = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
//!     .insert(TypeKey::<Hound>::new(), pet);
//! ```
//!
//! Contravariant families reject a narrower callback under a wider key:
//!
//! ```compile_fail
//! # use std::sync::Arc;
//! # use sovran_typebound::{subtypes, Below, Consumer, Reify, TypeIndexedMap, TypeKey};
//! # trait Pet: Send + Sync {}
//! # trait Dog: Pet {}
//! # struct Hound;
//! # impl Pet for Hound {}
//! # impl Dog for Hound {}
//! # impl Reify for dyn Pet {}
//! # subtypes! { dyn Dog: dyn Pet; Hound: dyn Dog, dyn Pet; }
//! let hounds_only = Consumer::<u32>::wrap::<Hound, _>(|_| 1);
//! let _ = TypeIndexedMap::<Below<dyn Pet>, Consumer<u32>>::new()
//!     .insert(TypeKey::<dyn Pet>::new(), hounds_only);
//! ```
//!
//! Keys outside the map's bound are rejected whatever the variance:
//!
//! ```compile_fail
//! # use std::sync::Arc;
//! # use sovran_typebound::{subtypes, Below, Shared, Reify, TypeIndexedMap, TypeKey};
//! # trait Pet: Send + Sync {}
//! # trait Dog: Pet {}
//! # impl Reify for dyn Pet {}
//! # subtypes! { dyn Dog: dyn Pet; }
//! let _ = TypeIndexedMap::<Below<dyn Dog>, Shared>::new()
//!     .insert(TypeKey::<String>::new(), Arc::new(String::new()));
//! ```

use crate::family::{Family, Member, Narrow, Widen};
use crate::hierarchy::Subtype;

/// Marker for the three variance kinds
pub trait Variance: 'static {}

/// `Of<U>` conforms to `Of<T>` only when `U == T`
pub enum Invariant {}

/// `Of<U>` conforms to `Of<T>` when `U` is a subtype of `T`
pub enum Covariant {}

/// `Of<U>` conforms to `Of<T>` when `T` is a subtype of `U`
pub enum Contravariant {}

impl Variance for Invariant {}
impl Variance for Covariant {}
impl Variance for Contravariant {}

/// The conformance check: under this variance, a value of `F::Of<U>` may be
/// stored where an `F::Of<T>` is expected.
pub trait Admits<F: Family, U: ?Sized + Member, T: ?Sized + Member>: Variance {
    /// Converts the value to the key's type parameter
    fn conform(value: F::Of<U>) -> F::Of<T>;
}

impl<F: Family, T: ?Sized + Member> Admits<F, T, T> for Invariant {
    fn conform(value: F::Of<T>) -> F::Of<T> {
        value
    }
}

impl<F, U, T> Admits<F, U, T> for Covariant
where
    F: Widen,
    U: ?Sized + Member + Subtype<T>,
    T: ?Sized + Member,
{
    fn conform(value: F::Of<U>) -> F::Of<T> {
        F::widen::<U, T>(value)
    }
}

impl<F, U, T> Admits<F, U, T> for Contravariant
where
    F: Narrow,
    U: ?Sized + Member,
    T: ?Sized + Member + Subtype<U>,
{
    fn conform(value: F::Of<U>) -> F::Of<T> {
        F::narrow::<U, T>(value)
    }
}
