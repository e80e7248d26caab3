//! Demonstrates bounded, variance-checked maps over a small pet hierarchy.
//!
//! - A covariant map stores concrete pets under the interfaces they implement
//! - A contravariant map stores handlers that accept at least the keyed type
//! - Bounds, filters and transforms all produce new maps
//!
//! Run with: cargo run --example pets

use sovran_typebound::{
    subtypes, Below, Consumer, MapError, Member, Reify, Shared, SharedList, Transform,
    TypeIndexedMap, TypeKey, Unbounded,
};
use std::sync::Arc;

trait Pet: Send + Sync {
    fn name(&self) -> String;
}

trait Dog: Pet {
    fn bark(&self) -> String;
}

trait Cat: Pet {
    fn purr(&self) -> String;
}

struct Beagle {
    name: String,
}

struct Siamese {
    name: String,
}

impl Pet for Beagle {
    fn name(&self) -> String {
        self.name.clone()
    }
}

impl Dog for Beagle {
    fn bark(&self) -> String {
        format!("{}: Woof!", self.name)
    }
}

impl Pet for Siamese {
    fn name(&self) -> String {
        self.name.clone()
    }
}

impl Cat for Siamese {
    fn purr(&self) -> String {
        format!("{}: Prrr...", self.name)
    }
}

impl Reify for dyn Pet {}
subtypes! {
    dyn Dog: dyn Pet;
    dyn Cat: dyn Pet;
    Beagle: dyn Dog, dyn Pet;
    Siamese: dyn Cat, dyn Pet;
}

/// Wraps every value in a one-element list
#[derive(PartialEq)]
struct Litter;

impl Transform<Shared> for Litter {
    type Output = SharedList;

    fn apply<T: ?Sized + Member>(&self, value: Arc<T>) -> Vec<Arc<T>> {
        vec![value]
    }
}

fn main() -> Result<(), MapError> {
    // Concrete pets stored under their interfaces
    let pets = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
        .insert(TypeKey::<dyn Dog>::new(), Arc::new(Beagle { name: "Snoopy".to_string() }))
        .insert(TypeKey::<dyn Cat>::new(), Arc::new(Siamese { name: "Luna".to_string() }))
        .insert(TypeKey::<Beagle>::new(), Arc::new(Beagle { name: "Odie".to_string() }));

    println!("{}", pets.fetch::<dyn Dog>()?.bark());
    println!("{}", pets.fetch::<dyn Cat>()?.purr());
    println!("{}", pets.fetch::<Beagle>()?.bark());

    // Walk the entries without naming their types up front
    println!("\nAll entries:");
    for pair in &pets {
        let kind = if pair.is_subtype_of::<dyn Dog>() { "dog" } else { "other" };
        println!("  {} ({})", pair.ty(), kind);
    }

    // Handlers: one that greets any pet serves every more specific key
    let greet = Consumer::<String>::wrap::<dyn Pet, _>(|pet| format!("Hello, {}", pet.name()));
    let handlers = TypeIndexedMap::<Below<dyn Pet>, Consumer<String>>::new()
        .insert(TypeKey::<Beagle>::new(), Arc::clone(&greet))
        .insert(TypeKey::<dyn Cat>::new(), greet);

    let luna = Siamese { name: "Luna".to_string() };
    if let Some(handler) = handlers.get::<dyn Cat>() {
        println!("\n{}", handler(&luna));
    }

    // Narrow the bound to dogs only
    let dogs: TypeIndexedMap<Below<dyn Dog>, Shared> = pets.restrict_bound();
    println!("\nDogs only: {} of {} entries", dogs.len(), pets.len());

    // Turn every pet into a litter of one
    let litters = pets.map_values(Litter);
    let dog_litter = litters.fetch::<dyn Dog>()?;
    println!("Litter of {} under dyn Dog", dog_litter.len());

    // An unbounded map accepts any reified type
    let anything = TypeIndexedMap::<Unbounded, Shared>::new().insert_inferred(Arc::new(3u8));
    println!("Unbounded map holds {} entry", anything.len());

    Ok(())
}
