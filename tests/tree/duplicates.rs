//! Integration tests for duplicate keys
//!
//! Tests randomized duplicate placement and exact-key removal among
//! comparator ties.

use std::cmp::Ordering;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cassette_tree::RbTree;

fn natural(a: i32, b: i32) -> Ordering {
    a.cmp(&b)
}

/// Groups keys by tens so distinct keys can compare equal.
fn tens(a: i32, b: i32) -> Ordering {
    (a / 10).cmp(&(b / 10))
}

#[test]
fn duplicate_runs_stay_contiguous() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut tree = RbTree::new();
    for k in [30, 10, 30, 20, 30, 10] {
        tree.insert_with_dups(k, (), &mut rng, natural);
    }
    let keys: Vec<i32> = tree.iter().map(|(k, ())| k).collect();
    assert_eq!(keys, vec![10, 10, 20, 30, 30, 30]);
}

#[test]
fn exact_key_removal_spares_its_ties() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut tree = RbTree::new();
    // 11, 14, 17 are comparator-equal under `tens`.
    for k in [11, 14, 17, 25] {
        tree.insert_with_dups(k, (), &mut rng, tens);
    }
    assert!(tree.remove(14, tens).is_some());
    let keys: Vec<i32> = tree.iter().map(|(k, ())| k).collect();
    assert_eq!(keys, vec![11, 17, 25]);

    // A comparator-equal but unknown exact key removes nothing.
    assert!(tree.remove(13, tens).is_none());
    assert_eq!(tree.len(), 3);
}

#[test]
fn removal_down_to_empty_and_reuse() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut tree = RbTree::new();
    for k in 0..50 {
        tree.insert_with_dups(k % 10, k, &mut rng, natural);
    }
    for k in 0..50 {
        assert!(tree.remove(k % 10, natural).is_some());
    }
    assert!(tree.is_empty());
    assert!(tree.first().is_nil());

    // The arena keeps working after total drain.
    tree.insert_with_dups(3, 99, &mut rng, natural);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.key(tree.first()), 3);
}
