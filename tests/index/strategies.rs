//! Integration tests for index strategies
//!
//! Tests bag multiplicity, set deduplication, and deletion down to empty
//! across all three strategies.

use std::sync::Arc;

use cassette_index::{
    ANNOTATION_INDEX, Cas, IndexComparator, IndexDefinition, IndexStrategy, SortDirection,
};
use cassette_typesystem::{FeatureId, TypeId, TypeSystem};

fn store() -> Cas {
    let mut ts = TypeSystem::new();
    ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.commit();
    let mut cas = Cas::new(Arc::new(ts), 17).unwrap();
    cas.register_index(IndexDefinition::new(
        "bag",
        TypeId::ANNOTATION,
        IndexStrategy::Bag,
        IndexComparator::new(),
    ))
    .unwrap();
    cas.register_index(IndexDefinition::new(
        "set",
        TypeId::ANNOTATION,
        IndexStrategy::Set,
        IndexComparator::new()
            .key(FeatureId::BEGIN, SortDirection::Standard)
            .key(FeatureId::END, SortDirection::Standard),
    ))
    .unwrap();
    cas.commit_indexes();
    cas
}

fn token(cas: &Cas) -> TypeId {
    cas.type_system().get_type("text.Token").unwrap()
}

// =============================================================================
// Bag
// =============================================================================

#[test]
fn bag_counts_every_insertion() {
    let mut cas = store();
    let t = token(&cas);
    let fs = cas.create_annotation(t, 0, 4).unwrap();
    for _ in 0..3 {
        cas.add_fs(fs).unwrap();
    }
    assert_eq!(cas.index_size("bag", None).unwrap(), 3);
    // The sorted index keeps all three as well.
    assert_eq!(cas.index_size(ANNOTATION_INDEX, None).unwrap(), 3);
}

// =============================================================================
// Set
// =============================================================================

#[test]
fn set_keeps_the_first_of_equals() {
    let mut cas = store();
    let t = token(&cas);
    let first = cas.create_annotation(t, 0, 4).unwrap();
    let twin = cas.create_annotation(t, 0, 4).unwrap();
    let other = cas.create_annotation(t, 5, 9).unwrap();
    cas.add_fs(first).unwrap();
    cas.add_fs(twin).unwrap();
    cas.add_fs(other).unwrap();

    assert_eq!(cas.index_size("set", None).unwrap(), 2);
    assert_eq!(cas.find("set", None, twin).unwrap(), Some(first));
    assert_eq!(cas.find("set", None, other).unwrap(), Some(other));

    // The sorted and bag views keep the twin.
    assert_eq!(cas.index_size(ANNOTATION_INDEX, None).unwrap(), 3);
    assert_eq!(cas.index_size("bag", None).unwrap(), 3);
}

#[test]
fn find_misses_cleanly() {
    let mut cas = store();
    let t = token(&cas);
    let indexed = cas.create_annotation(t, 0, 4).unwrap();
    cas.add_fs(indexed).unwrap();
    let probe = cas.create_annotation(t, 50, 60).unwrap();
    assert_eq!(cas.find("set", None, probe).unwrap(), None);
}

// =============================================================================
// Deletion to empty
// =============================================================================

#[test]
fn every_strategy_drains_to_empty() {
    let mut cas = store();
    let t = token(&cas);
    let mut refs = Vec::new();
    for i in 0..10 {
        let fs = cas.create_annotation(t, i, i + 2).unwrap();
        cas.add_fs(fs).unwrap();
        refs.push(fs);
    }
    for fs in refs {
        cas.remove_fs(fs).unwrap();
    }
    for label in [ANNOTATION_INDEX, "bag", "set"] {
        assert_eq!(cas.index_size(label, None).unwrap(), 0, "{label}");
        let cursor = cas.cursor(label, None).unwrap();
        assert!(!cursor.is_valid(), "{label}");
    }
    // Still usable afterwards.
    let fs = cas.create_annotation(t, 1, 3).unwrap();
    cas.add_fs(fs).unwrap();
    assert_eq!(cas.index_size("bag", None).unwrap(), 1);
}
