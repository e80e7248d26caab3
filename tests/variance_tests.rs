use sovran_typebound::{
    subtypes, Admits, Below, Consumer, Covariant, Exact, Family, Instance, Member, Reify, Shared,
    SharedList, Subtype, Transform, TypeIndexedMap, TypeKey, Widen,
};
use std::sync::Arc;

trait Pet: Send + Sync {
    fn name(&self) -> String;
}

trait Dog: Pet {
    fn fetch_stick(&self) -> String {
        format!("{} fetches", self.name())
    }
}

struct Hound;

impl Pet for Hound {
    fn name(&self) -> String {
        "Rex".to_string()
    }
}

impl Dog for Hound {}

impl Reify for dyn Pet {}
subtypes! {
    dyn Dog: dyn Pet;
    Hound: dyn Dog, dyn Pet;
}

/// Compiles only when `F` admits a value at `U` under a key at `T`
fn admits<F, U, T>()
where
    F: Family,
    U: ?Sized + Member,
    T: ?Sized + Member,
    F::Variance: Admits<F, U, T>,
{
}

/// A covariant family defined outside the crate: a value with a label
enum Labelled {}

impl Family for Labelled {
    type Variance = Covariant;
    type Of<T: ?Sized + Member> = (String, Arc<T>);

    fn same<T: ?Sized + Member>(a: &(String, Arc<T>), b: &(String, Arc<T>)) -> bool {
        a.0 == b.0 && Arc::ptr_eq(&a.1, &b.1)
    }
}

impl Widen for Labelled {
    fn widen<U, T>(value: (String, Arc<U>)) -> (String, Arc<T>)
    where
        U: ?Sized + Member + Subtype<T>,
        T: ?Sized + Member,
    {
        (value.0, <U as Subtype<T>>::upcast_arc(value.1))
    }
}

impl<T: ?Sized + Member> Instance<Labelled> for (String, Arc<T>) {
    type Param = T;

    fn into_value(self) -> (String, Arc<T>) {
        self
    }
}

#[derive(PartialEq)]
struct Listify;

impl Transform<Shared> for Listify {
    type Output = SharedList;

    fn apply<T: ?Sized + Member>(&self, value: Arc<T>) -> Vec<Arc<T>> {
        vec![value]
    }
}

fn same_allocation<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[test]
fn test_invariant_admits_only_equal_types() {
    admits::<Exact, Hound, Hound>();
    admits::<Exact, dyn Dog, dyn Dog>();
    admits::<Exact, dyn Pet, dyn Pet>();
}

#[test]
fn test_covariant_admits_subtypes() {
    admits::<Shared, Hound, Hound>();
    admits::<Shared, Hound, dyn Dog>();
    admits::<Shared, Hound, dyn Pet>();
    admits::<Shared, dyn Dog, dyn Pet>();
    admits::<SharedList, Hound, dyn Pet>();
    admits::<Labelled, Hound, dyn Dog>();
    admits::<sovran_typebound::Mapped<Shared, Listify>, Hound, dyn Dog>();
}

#[test]
fn test_contravariant_admits_supertypes() {
    admits::<Consumer<u8>, Hound, Hound>();
    admits::<Consumer<u8>, dyn Pet, Hound>();
    admits::<Consumer<u8>, dyn Pet, dyn Dog>();
    admits::<Consumer<u8>, dyn Dog, Hound>();
}

#[test]
fn test_covariant_insert_widens_same_allocation() {
    let hound = Arc::new(Hound);
    let pets = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
        .insert(TypeKey::<dyn Pet>::new(), Arc::clone(&hound))
        .insert(TypeKey::<dyn Dog>::new(), Arc::clone(&hound));

    let as_pet = pets.fetch::<dyn Pet>().unwrap();
    let as_dog = pets.fetch::<dyn Dog>().unwrap();

    assert!(same_allocation(&as_pet, &hound));
    assert!(same_allocation(&as_dog, &hound));
    assert_eq!(as_dog.fetch_stick(), "Rex fetches");
}

#[test]
fn test_contravariant_insert_narrows_callback() {
    let describe = Consumer::<String>::wrap::<dyn Pet, _>(|pet| format!("a pet named {}", pet.name()));
    let handlers = TypeIndexedMap::<Below<dyn Pet>, Consumer<String>>::new()
        .insert(TypeKey::<Hound>::new(), Arc::clone(&describe))
        .insert(TypeKey::<dyn Dog>::new(), describe);

    let for_hounds = handlers.fetch::<Hound>().unwrap();
    let for_dogs = handlers.fetch::<dyn Dog>().unwrap();

    assert_eq!(for_hounds(&Hound), "a pet named Rex");
    assert_eq!(for_dogs(&Hound), "a pet named Rex");
}

#[test]
fn test_inferred_contravariant_key_is_declared_parameter() {
    let describe = Consumer::<String>::wrap::<dyn Pet, _>(|pet| pet.name());
    let handlers =
        TypeIndexedMap::<Below<dyn Pet>, Consumer<String>>::new().insert_inferred(describe);

    // Stored under the type the callback was built for, not its subtypes
    assert!(handlers.contains::<dyn Pet>());
    assert!(!handlers.contains::<Hound>());
    assert_eq!(handlers.fetch::<dyn Pet>().map(|handler| handler(&Hound)), Ok("Rex".to_string()));
}

#[test]
fn test_custom_covariant_family() {
    let hound = Arc::new(Hound);
    let labelled = TypeIndexedMap::<Below<dyn Pet>, Labelled>::new()
        .insert(TypeKey::<dyn Pet>::new(), ("best".to_string(), Arc::clone(&hound)));

    let (label, pet) = labelled.fetch::<dyn Pet>().unwrap();
    assert_eq!(label, "best");
    assert_eq!(pet.name(), "Rex");
    assert!(same_allocation(&pet, &hound));

    // Equality uses the family's own notion of sameness
    let again = TypeIndexedMap::<Below<dyn Pet>, Labelled>::new()
        .insert(TypeKey::<dyn Pet>::new(), ("best".to_string(), Arc::clone(&hound)));
    let renamed = TypeIndexedMap::<Below<dyn Pet>, Labelled>::new()
        .insert(TypeKey::<dyn Pet>::new(), ("worst".to_string(), hound));
    assert_eq!(labelled, again);
    assert_ne!(labelled, renamed);
}

#[test]
fn test_mapped_family_keeps_output_variance() {
    let lists = TypeIndexedMap::<Below<dyn Pet>, Shared>::new()
        .insert(TypeKey::<dyn Pet>::new(), Arc::new(Hound))
        .map_values(Listify)
        .insert(TypeKey::<dyn Dog>::new(), vec![Arc::new(Hound), Arc::new(Hound)]);

    assert_eq!(lists.fetch::<dyn Pet>().map(|pets| pets.len()), Ok(1));
    assert_eq!(lists.fetch::<dyn Dog>().map(|dogs| dogs.len()), Ok(2));
}
