//! Property-based tests for type-indexed maps.
//!
//! Uses proptest to generate random insertion sequences and verify the map laws hold.

use proptest::prelude::*;
use sovran_typebound::{Identity, Mapped, ReifiedType, Shared, TypeIndexedMap, Unbounded};
use std::sync::Arc;

type AnyMap = TypeIndexedMap<Unbounded, Shared>;

/// One insertion, at one of a fixed set of types
#[derive(Debug, Clone)]
enum Op {
    Byte(u8),
    Short(u16),
    Word(u32),
    Text(String),
    Flag(bool),
}

impl Op {
    fn ty(&self) -> ReifiedType {
        match self {
            Op::Byte(_) => ReifiedType::of::<u8>(),
            Op::Short(_) => ReifiedType::of::<u16>(),
            Op::Word(_) => ReifiedType::of::<u32>(),
            Op::Text(_) => ReifiedType::of::<String>(),
            Op::Flag(_) => ReifiedType::of::<bool>(),
        }
    }

    fn apply(&self, map: AnyMap) -> AnyMap {
        match self {
            Op::Byte(v) => map.insert_inferred(Arc::new(*v)),
            Op::Short(v) => map.insert_inferred(Arc::new(*v)),
            Op::Word(v) => map.insert_inferred(Arc::new(*v)),
            Op::Text(v) => map.insert_inferred(Arc::new(v.clone())),
            Op::Flag(v) => map.insert_inferred(Arc::new(*v)),
        }
    }
}

/// The value readable at every type, in a comparable form
type Snapshot = (Option<u8>, Option<u16>, Option<u32>, Option<String>, Option<bool>);

fn snapshot(map: &AnyMap) -> Snapshot {
    (
        map.get::<u8>().map(|v| *v),
        map.get::<u16>().map(|v| *v),
        map.get::<u32>().map(|v| *v),
        map.get::<String>().map(|v| v.to_string()),
        map.get::<bool>().map(|v| *v),
    )
}

/// Last written value per type
fn model(ops: &[Op]) -> Snapshot {
    let mut expected: Snapshot = (None, None, None, None, None);
    for op in ops {
        match op {
            Op::Byte(v) => expected.0 = Some(*v),
            Op::Short(v) => expected.1 = Some(*v),
            Op::Word(v) => expected.2 = Some(*v),
            Op::Text(v) => expected.3 = Some(v.clone()),
            Op::Flag(v) => expected.4 = Some(*v),
        }
    }
    expected
}

fn build(ops: &[Op]) -> AnyMap {
    ops.iter().fold(AnyMap::new(), |map, op| op.apply(map))
}

/// Strategy for generating single insertions
fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::Byte),
        any::<u16>().prop_map(Op::Short),
        any::<u32>().prop_map(Op::Word),
        "[a-z]{0,8}".prop_map(Op::Text),
        any::<bool>().prop_map(Op::Flag),
    ]
}

/// Strategy for generating insertion sequences
fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..24)
}

proptest! {
    /// Reads see the last value written at each type
    #[test]
    fn last_write_wins(ops in ops()) {
        let map = build(&ops);
        prop_assert_eq!(snapshot(&map), model(&ops));
    }

    /// One entry per distinct type, ordered by first insertion
    #[test]
    fn keys_follow_first_insertion(ops in ops()) {
        let map = build(&ops);
        let mut expected: Vec<ReifiedType> = Vec::new();
        for op in &ops {
            if !expected.contains(&op.ty()) {
                expected.push(op.ty());
            }
        }
        prop_assert_eq!(map.len(), expected.len());
        prop_assert_eq!(map.keys().collect::<Vec<_>>(), expected);
    }

    /// Union prefers the right-hand map and falls back to the left
    #[test]
    fn union_prefers_other(left in ops(), right in ops()) {
        let a = build(&left);
        let b = build(&right);
        let both = a.union(&b);

        let mut combined = left.clone();
        combined.extend(right.iter().cloned());
        prop_assert_eq!(snapshot(&both), model(&combined));
        prop_assert!(both.len() >= a.len().max(b.len()));
        prop_assert!(both.len() <= a.len() + b.len());
    }

    /// Filtering with constant predicates keeps everything or nothing
    #[test]
    fn filter_round_trip(ops in ops()) {
        let map = build(&ops);
        prop_assert_eq!(map.filter(|_| true), map.clone());
        prop_assert!(map.filter(|_| false).is_empty());
        prop_assert_eq!(map.filter_not(|_| false), map.clone());
    }

    /// A filter and its negation partition the map
    #[test]
    fn filter_partitions(ops in ops(), pick in any::<u8>()) {
        let map = build(&ops);
        let chosen = |ty: &ReifiedType| ty.name().len() % 2 == usize::from(pick % 2);

        let kept = map.filter_keys(chosen);
        let dropped = map.filter(|pair| !chosen(&pair.ty()));
        prop_assert_eq!(kept.len() + dropped.len(), map.len());
        prop_assert_eq!(kept.union(&dropped), map);
    }

    /// Mapping with the identity keeps every key and value
    #[test]
    fn map_values_identity(ops in ops()) {
        let map = build(&ops);
        let same = map.map_values(Identity);

        prop_assert_eq!(&same, &map);
        prop_assert_eq!(&map, &same);
        prop_assert_eq!(same.keys().collect::<Vec<_>>(), map.keys().collect::<Vec<_>>());
        prop_assert_eq!(
            same.get::<String>().map(|v| v.to_string()),
            map.get::<String>().map(|v| v.to_string())
        );
        if let (Some(a), Some(b)) = (same.get::<u32>(), map.get::<u32>()) {
            prop_assert!(Arc::ptr_eq(&a, &b));
        }
        prop_assert_eq!(same.clone(), same);
    }

    /// Values carried over by `map_values` equal the same values inserted directly
    #[test]
    fn map_values_matches_direct_insertion(ops in ops()) {
        let map = build(&ops);
        let mapped = map.map_values(Identity);
        let direct = map
            .iter()
            .fold(TypeIndexedMap::<Unbounded, Mapped<Shared, Identity>>::new(), |acc, pair| {
                match (pair.downcast::<u8>(), pair.downcast::<String>()) {
                    (Some((_, v)), _) => acc.insert_inferred(v),
                    (_, Some((_, v))) => acc.insert_inferred(v),
                    _ => acc,
                }
            });
        let carried = mapped.filter_keys(|ty| ty.is::<u8>() || ty.is::<String>());

        prop_assert_eq!(&carried, &direct);
        prop_assert_eq!(&direct, &carried);
    }

    /// Restricting to the unbounded bound is a no-op
    #[test]
    fn restrict_to_unbounded(ops in ops()) {
        let map = build(&ops);
        let same: AnyMap = map.restrict_bound();
        prop_assert_eq!(same, map);
    }

    /// Insertion never changes the receiver
    #[test]
    fn insert_is_persistent(ops in ops(), extra in op()) {
        let map = build(&ops);
        let before = snapshot(&map);
        let _after = extra.apply(map.clone());
        prop_assert_eq!(snapshot(&map), before);
    }
}
