use super::{AvlTreeSet, Error, Position};

use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
enum Op {
    Insert(i16),
    Remove(i16),
    Erase(i16),
    EraseRange(i16, i16),
    Find(i16),
    PopFirst,
    PopLast,
}

// Small key space so that duplicates and erasures of present keys are common.
fn key_strategy() -> impl Strategy<Value = i16> + Clone {
    -64i16..64
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => key.clone().prop_map(Op::Insert),
        15 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Erase),
        3 => (key.clone(), key.clone()).prop_map(|(a, b)| Op::EraseRange(a, b)),
        20 => key.clone().prop_map(Op::Find),
        3 => Just(Op::PopFirst),
        4 => Just(Op::PopLast),
    ];
    prop::collection::vec(op, 0..=500)
}

fn validate_against(set: &AvlTreeSet<i16>, oracle: &BTreeSet<i16>) {
    set.check_consistency();
    assert_eq!(set.len(), oracle.len());
    assert_eq!(set.is_empty(), oracle.is_empty());
    assert!(set.iter().eq(oracle.iter()));
    assert!(set.iter().rev().eq(oracle.iter().rev()));
    assert_eq!(set.first(), oracle.iter().next());
    assert_eq!(set.last(), oracle.iter().next_back());

    // AVL height bound: h < 1.4405 * log2(n + 2) - 0.3277
    let bound = 1.4405 * ((set.len() + 2) as f64).log2() - 0.3277;
    assert!((set.height() as f64) < bound.max(1.0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_btreeset(ops in ops_strategy()) {
        let mut set = AvlTreeSet::new();
        let mut oracle = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    let (pos, inserted) = set.insert(k);
                    prop_assert_eq!(inserted, oracle.insert(k));
                    prop_assert_eq!(set.key_at(pos), Some(&k));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(set.remove(&k), oracle.remove(&k));
                }
                Op::Erase(k) => {
                    let pos = set.find(&k);
                    if oracle.remove(&k) {
                        let rebalanced_from = set.erase(pos);
                        prop_assert!(rebalanced_from.is_end() || set.is_valid(rebalanced_from));
                    } else {
                        prop_assert!(pos.is_end());
                        prop_assert_eq!(set.try_erase(pos), Err(Error::EndPosition));
                    }
                }
                Op::EraseRange(a, b) => {
                    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                    let first = set.find(&lo);
                    if !first.is_end() {
                        let last = set.find(&hi);
                        let returned = set.erase_range(first, last);
                        if last.is_end() {
                            oracle.retain(|&k| k < lo);
                            prop_assert!(returned.is_end());
                        } else {
                            oracle.retain(|&k| k < lo || k >= hi);
                            prop_assert_eq!(set.key_at(returned), Some(&hi));
                        }
                    }
                }
                Op::Find(k) => {
                    let pos = set.find(&k);
                    prop_assert_eq!(set.key_at(pos), oracle.get(&k));
                    prop_assert_eq!(set.get(&k), oracle.get(&k));
                }
                Op::PopFirst => {
                    prop_assert_eq!(set.pop_first(), oracle.pop_first());
                }
                Op::PopLast => {
                    prop_assert_eq!(set.pop_last(), oracle.pop_last());
                }
            }
            validate_against(&set, &oracle);
        }
    }

    #[test]
    fn prop_erase_keeps_other_positions(
        keys in prop::collection::btree_set(key_strategy(), 1..100),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut set: AvlTreeSet<i16> = keys.iter().copied().collect();
        let positions: Vec<(i16, Position)> =
            keys.iter().map(|&k| (k, set.find(&k))).collect();

        let erased = *pick.get(&keys.iter().copied().collect::<Vec<_>>());
        let erased_pos = set.find(&erased);
        let next = keys.range(erased + 1..).next().copied();
        set.erase(erased_pos);
        set.check_consistency();

        // Either the position was erased, or the next value moved into it
        match set.key_at(erased_pos) {
            None => {}
            Some(&moved) => prop_assert_eq!(Some(moved), next),
        }

        for (key, pos) in positions {
            if key == erased {
                continue;
            }
            if set.is_valid(pos) {
                prop_assert_eq!(set.key_at(pos), Some(&key));
            } else {
                // Only the value that moved loses its position
                prop_assert_eq!(Some(key), next);
                prop_assert_eq!(set.find(&key), erased_pos);
            }
        }
    }

    #[test]
    fn prop_positions_walk_both_ways(keys in prop::collection::vec(key_strategy(), 0..200)) {
        let set: AvlTreeSet<i16> = keys.iter().copied().collect();
        let sorted: Vec<i16> = keys.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        let mut forward = Vec::new();
        let mut pos = set.begin();
        while !pos.is_end() {
            forward.push(*set.key_at(pos).unwrap());
            pos = set.successor(pos);
        }
        prop_assert_eq!(&forward, &sorted);

        let mut cursor = set.cursor_at(set.end()).unwrap();
        let mut backward = Vec::new();
        cursor.move_prev();
        while let Some(&key) = cursor.get() {
            backward.push(key);
            cursor.move_prev();
        }
        backward.reverse();
        prop_assert_eq!(&backward, &sorted);
    }
}
