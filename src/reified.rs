use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// Runtime descriptor for a type that can be reified.
///
/// Rust has no runtime subtype information, so a type opts in by naming its
/// direct supertypes. Identity always comes from [`TypeId`]; the descriptor only
/// feeds [`ReifiedType::is_subtype_of`].
///
/// Most implementations are generated by [`subtypes!`](crate::subtypes), which
/// also declares the matching [`Subtype`](crate::Subtype) impls. Root types
/// implement the trait with an empty body:
///
/// ```
/// use sovran_typebound::{Reify, ReifiedType};
///
/// trait Pet: Send + Sync {}
/// impl Reify for dyn Pet {}
///
/// assert!(ReifiedType::of::<dyn Pet>().supertypes().is_empty());
/// ```
pub trait Reify: 'static {
    /// Direct supertypes of `Self`, excluding `Self`.
    fn supertypes() -> Vec<ReifiedType> {
        Vec::new()
    }
}

/// An opaque runtime token standing for a concrete type.
///
/// Two tokens are equal exactly when they denote the same type, however that
/// type was spelled: aliases and alpha-equivalent higher-ranked types share a
/// token because both resolve to the same [`TypeId`].
///
/// # Examples
///
/// ```
/// use sovran_typebound::ReifiedType;
///
/// type Count = u64;
///
/// assert_eq!(ReifiedType::of::<u64>(), ReifiedType::of::<Count>());
/// assert_ne!(ReifiedType::of::<u64>(), ReifiedType::of::<i64>());
/// assert_eq!(ReifiedType::of_val(&7u64), ReifiedType::of::<u64>());
/// ```
#[derive(Clone, Copy)]
pub struct ReifiedType {
    id: TypeId,
    name: &'static str,
    supertypes: fn() -> Vec<ReifiedType>,
}

impl ReifiedType {
    /// Reifies `T`
    pub fn of<T: ?Sized + Reify>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            supertypes: T::supertypes,
        }
    }

    /// Reifies the static type of `value`
    pub fn of_val<T: ?Sized + Reify>(_value: &T) -> Self {
        Self::of::<T>()
    }

    /// The underlying [`TypeId`]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this token stands for `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Declared direct supertypes
    pub fn supertypes(&self) -> Vec<ReifiedType> {
        (self.supertypes)()
    }

    /// Returns true if `self` is `other` or one of its declared descendants.
    ///
    /// The relation is reflexive and transitive. Cycles in the declared
    /// hierarchy are tolerated.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_typebound::{subtypes, Reify, ReifiedType};
    ///
    /// trait Pet: Send + Sync {}
    /// trait Dog: Pet {}
    /// struct Hound;
    /// impl Pet for Hound {}
    /// impl Dog for Hound {}
    ///
    /// impl Reify for dyn Pet {}
    /// subtypes! {
    ///     dyn Dog: dyn Pet;
    ///     Hound: dyn Dog;
    /// }
    ///
    /// let hound = ReifiedType::of::<Hound>();
    /// assert!(hound.is_subtype_of(&ReifiedType::of::<dyn Pet>()));
    /// assert!(hound.is_subtype_of(&hound));
    /// assert!(!ReifiedType::of::<dyn Pet>().is_subtype_of(&hound));
    /// ```
    pub fn is_subtype_of(&self, other: &ReifiedType) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![*self];
        while let Some(ty) = pending.pop() {
            if ty == *other {
                return true;
            }
            if seen.insert(ty.id) {
                pending.extend(ty.supertypes());
            }
        }
        false
    }
}

impl PartialEq for ReifiedType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReifiedType {}

impl Hash for ReifiedType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ReifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReifiedType({})", self.name)
    }
}

impl fmt::Display for ReifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

macro_rules! reify_leaf {
    ($($ty:ty),* $(,)?) => {
        $(impl Reify for $ty {})*
    };
}

reify_leaf!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    &'static str,
    String,
    dyn Any,
    dyn Any + Send + Sync,
);

impl<T: 'static> Reify for Vec<T> {}
impl<T: 'static> Reify for Option<T> {}
impl<T: ?Sized + 'static> Reify for Box<T> {}
impl<T: ?Sized + 'static> Reify for Arc<T> {}
impl<T: ?Sized + 'static> Reify for Rc<T> {}
impl<K: 'static, V: 'static, S: 'static> Reify for HashMap<K, V, S> {}
impl<A: 'static, B: 'static> Reify for (A, B) {}
impl<A: 'static, B: 'static, C: 'static> Reify for (A, B, C) {}
impl<A: 'static, B: 'static, C: 'static, D: 'static> Reify for (A, B, C, D) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    struct Leaf;
    struct Middle;
    struct Top;
    struct Loop;

    impl Reify for Top {}
    impl Reify for Middle {
        fn supertypes() -> Vec<ReifiedType> {
            vec![ReifiedType::of::<Top>()]
        }
    }
    impl Reify for Leaf {
        fn supertypes() -> Vec<ReifiedType> {
            vec![ReifiedType::of::<Middle>()]
        }
    }
    impl Reify for Loop {
        fn supertypes() -> Vec<ReifiedType> {
            vec![ReifiedType::of::<Loop>(), ReifiedType::of::<Top>()]
        }
    }

    impl Reify for for<'a> fn(&'a str) -> usize {}

    fn hash_of(ty: &ReifiedType) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_is_by_identity() {
        type Alias = Vec<String>;

        assert_eq!(ReifiedType::of::<Vec<String>>(), ReifiedType::of::<Alias>());
        assert_eq!(
            hash_of(&ReifiedType::of::<Vec<String>>()),
            hash_of(&ReifiedType::of::<Alias>())
        );
        assert_ne!(ReifiedType::of::<Vec<String>>(), ReifiedType::of::<Vec<&'static str>>());
    }

    #[test]
    fn test_alpha_equivalent_types_are_equal() {
        let a = ReifiedType::of::<for<'a> fn(&'a str) -> usize>();
        let b = ReifiedType::of::<for<'b> fn(&'b str) -> usize>();
        let elided = ReifiedType::of::<fn(&str) -> usize>();

        assert_eq!(a, b);
        assert_eq!(a, elided);
    }

    #[test]
    fn test_subtyping_is_transitive() {
        let leaf = ReifiedType::of::<Leaf>();
        let middle = ReifiedType::of::<Middle>();
        let top = ReifiedType::of::<Top>();

        assert!(leaf.is_subtype_of(&middle));
        assert!(leaf.is_subtype_of(&top));
        assert!(middle.is_subtype_of(&top));
        assert!(!top.is_subtype_of(&leaf));
        assert!(!middle.is_subtype_of(&leaf));
    }

    #[test]
    fn test_subtyping_survives_cycles() {
        let looped = ReifiedType::of::<Loop>();

        assert!(looped.is_subtype_of(&looped));
        assert!(looped.is_subtype_of(&ReifiedType::of::<Top>()));
        assert!(!looped.is_subtype_of(&ReifiedType::of::<Leaf>()));
    }

    #[test]
    fn test_leaf_descriptors_have_no_supertypes() {
        assert!(ReifiedType::of::<i32>().supertypes().is_empty());
        assert!(!ReifiedType::of::<i32>().is_subtype_of(&ReifiedType::of::<i64>()));
        assert!(ReifiedType::of::<Arc<str>>().is::<Arc<str>>());
    }

    #[test]
    fn test_display_uses_type_name() {
        let ty = ReifiedType::of::<String>();
        assert_eq!(ty.to_string(), std::any::type_name::<String>());
        assert!(format!("{:?}", ty).starts_with("ReifiedType("));
    }
}
