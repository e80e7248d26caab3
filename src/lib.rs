//! # sovran-typebound
//!
//! Immutable, type-indexed heterogeneous maps with variance-checked insertion.
//!
//! `sovran-typebound` stores values of many different types in a single map
//! keyed by type. Each entry's value is an instance of a *value family* (such as
//! `Arc<T>` or `Vec<Arc<T>>`) applied to the entry's own type, and insertion is
//! checked at compile time against the family's variance, so a map can never
//! hold a value that does not fit its key.
//!
//! ## Key Features
//!
//! - **Type-indexed**: `map.get::<T>()` returns the value stored for `T`
//! - **Variance-checked**: covariant, contravariant and invariant families, with
//!   non-conforming insertions rejected by the compiler
//! - **Bounded**: a map may only hold types below a declared bound
//! - **Immutable**: every operation returns a new map and leaves the original untouched
//! - **Generalised keys**: [`TypeBoundMap`] accepts any key family, not just types
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sovran_typebound::{MapError, Shared, TypeIndexedMap, TypeKey, Unbounded};
//!
//! fn main() -> Result<(), MapError> {
//!     // Create an empty map of shared values of any type
//!     let map = TypeIndexedMap::<Unbounded, Shared>::new()
//!         .insert(TypeKey::<u32>::new(), Arc::new(42u32))
//!         .insert(TypeKey::<String>::new(), Arc::new("Hello, world!".to_string()));
//!
//!     // Retrieve values by type
//!     let number = map.fetch::<u32>()?;
//!     let text = map.fetch::<String>()?;
//!
//!     println!("Number: {}", number);
//!     println!("Text: {}", text);
//!
//!     // Handle missing types
//!     match map.fetch::<bool>() {
//!         Ok(value) => println!("Value: {}", value),
//!         Err(MapError::KeyNotFound(ty)) => println!("No entry for {}", ty),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Trait-Object Hierarchies
//!
//! ```rust
//! use std::sync::Arc;
//! use sovran_typebound::{subtypes, Below, Reify, Shared, TypeIndexedMap, TypeKey};
//!
//! trait Pet: Send + Sync {
//!     fn name(&self) -> String;
//! }
//! trait Dog: Pet {
//!     fn bark(&self) -> String;
//! }
//!
//! struct Hound;
//!
//! impl Pet for Hound {
//!     fn name(&self) -> String {
//!         "Rex".to_string()
//!     }
//! }
//!
//! impl Dog for Hound {
//!     fn bark(&self) -> String {
//!         "Woof".to_string()
//!     }
//! }
//!
//! // Declare the hierarchy once; both the static relation and the runtime
//! // descriptor come from it
//! impl Reify for dyn Pet {}
//! subtypes! {
//!     dyn Dog: dyn Pet;
//!     Hound: dyn Dog, dyn Pet;
//! }
//!
//! let pets = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
//!     .insert(TypeKey::<dyn Dog>::new(), Arc::new(Hound))
//!     .insert(TypeKey::<dyn Pet>::new(), Arc::new(Hound));
//!
//! assert_eq!(pets.get::<dyn Dog>().map(|dog| dog.bark()), Some("Woof".to_string()));
//! assert_eq!(pets.get::<dyn Pet>().map(|pet| pet.name()), Some("Rex".to_string()));
//!
//! // Lookup is by exact type
//! assert!(pets.get::<Hound>().is_none());
//! ```
//!
//! ### Combining and Filtering
//!
//! ```rust
//! use std::sync::Arc;
//! use sovran_typebound::{Shared, TypeIndexedMap, TypeKey, Unbounded};
//!
//! let defaults = TypeIndexedMap::<Unbounded, Shared>::new()
//!     .insert(TypeKey::<u16>::new(), Arc::new(8080u16))
//!     .insert(TypeKey::<String>::new(), Arc::new("localhost".to_string()));
//!
//! let overrides = TypeIndexedMap::<Unbounded, Shared>::new()
//!     .insert(TypeKey::<u16>::new(), Arc::new(9090u16));
//!
//! // Entries of the argument win
//! let config = defaults.union(&overrides);
//! assert_eq!(config.get::<u16>().as_deref(), Some(&9090));
//! assert_eq!(config.len(), 2);
//!
//! // The original maps are unchanged
//! assert_eq!(defaults.get::<u16>().as_deref(), Some(&8080));
//!
//! let numbers_only = config.filter_keys(|ty| ty.is::<u16>());
//! assert_eq!(numbers_only.len(), 1);
//! ```
//!
//! ### Iterating Without Knowing the Types
//!
//! ```rust
//! use std::sync::Arc;
//! use sovran_typebound::{Shared, TypeIndexedMap, Unbounded};
//!
//! let map = TypeIndexedMap::<Unbounded, Shared>::new()
//!     .insert_inferred(Arc::new(1u8))
//!     .insert_inferred(Arc::new("two".to_string()));
//!
//! for pair in &map {
//!     match pair.downcast::<u8>() {
//!         Some((_, value)) => println!("u8: {}", value),
//!         None => println!("something else: {}", pair.ty()),
//!     }
//! }
//! ```

mod any_value;
mod bound;
mod error;
mod family;
mod hierarchy;
mod indexed;
mod pair;
mod reified;
mod transform;
pub mod variance;

pub use any_value::AnyValue;
pub use bound::TypeBoundMap;
pub use error::MapError;
pub use family::{
    Consumer, Exact, Family, Instance, KeyFamily, KeyInstance, Member, Name, Named, Narrow,
    Reified, Shared, SharedList, TypeKey, Widen,
};
pub use hierarchy::{Below, Subtype, TypeBound, Unbounded, Within};
pub use indexed::TypeIndexedMap;
pub use pair::{Iter, KeyRef, Pair, ValueRef};
pub use reified::{ReifiedType, Reify};
pub use transform::{Identity, Mapped, Transform};
pub use variance::{Admits, Contravariant, Covariant, Invariant, Variance};
