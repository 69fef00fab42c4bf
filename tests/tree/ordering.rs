//! Integration tests for tree ordering
//!
//! Tests in-order traversal, navigation, and the nearest-following search
//! under external comparators.

use std::cmp::Ordering;

use cassette_tree::RbTree;

fn natural(a: i32, b: i32) -> Ordering {
    a.cmp(&b)
}

#[test]
fn scrambled_inserts_iterate_sorted() {
    let mut tree = RbTree::new();
    let keys = [41, 7, 99, 0, 23, 58, 12, 85, 3, 66];
    for k in keys {
        tree.insert(k, (), natural);
    }
    let sorted: Vec<i32> = tree.iter().map(|(k, ())| k).collect();
    let mut expected = keys.to_vec();
    expected.sort_unstable();
    assert_eq!(sorted, expected);
}

#[test]
fn navigation_walks_both_directions() {
    let mut tree = RbTree::new();
    for k in [5, 1, 9, 3, 7] {
        tree.insert(k, (), natural);
    }
    let mut n = tree.first();
    let mut fwd = Vec::new();
    while !n.is_nil() {
        fwd.push(tree.key(n));
        n = tree.next_node(n);
    }
    assert_eq!(fwd, vec![1, 3, 5, 7, 9]);

    let mut n = tree.last();
    let mut bwd = Vec::new();
    while !n.is_nil() {
        bwd.push(tree.key(n));
        n = tree.prev_node(n);
    }
    assert_eq!(bwd, vec![9, 7, 5, 3, 1]);
}

#[test]
fn insertion_point_is_the_nearest_following() {
    let mut tree = RbTree::new();
    for k in [10, 20, 30] {
        tree.insert(k, (), natural);
    }
    assert_eq!(tree.key(tree.find_insertion_point(15, natural)), 20);
    assert_eq!(tree.key(tree.find_insertion_point(20, natural)), 20);
    assert_eq!(tree.key(tree.find_insertion_point(-5, natural)), 10);
    assert!(tree.find_insertion_point(31, natural).is_nil());
}

#[test]
fn reversed_comparator_reverses_the_tree() {
    let mut tree = RbTree::new();
    let rev = |a: i32, b: i32| b.cmp(&a);
    for k in [1, 2, 3, 4] {
        tree.insert(k, (), rev);
    }
    let order: Vec<i32> = tree.iter().map(|(k, ())| k).collect();
    assert_eq!(order, vec![4, 3, 2, 1]);
}

#[test]
fn payload_replacement_keeps_the_first_key() {
    // Comparator groups keys by tens; the stored key is the first seen.
    let tens = |a: i32, b: i32| (a / 10).cmp(&(b / 10));
    let mut tree = RbTree::new();
    assert_eq!(tree.insert(11, "a", tens), None);
    assert_eq!(tree.insert(15, "b", tens), Some("a"));
    assert_eq!(tree.len(), 1);
    let n = tree.find_first_eq(19, tens);
    assert_eq!(tree.key(n), 11);
    assert_eq!(*tree.value(n), "b");
}
