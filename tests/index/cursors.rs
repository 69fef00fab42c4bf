//! Integration tests for index cursors
//!
//! Tests order fidelity under interleaved population and fail-fast
//! detection with recovery.

use std::sync::Arc;

use cassette_foundation::{ErrorKind, FsRef};
use cassette_index::{ANNOTATION_INDEX, Cas};
use cassette_typesystem::{TypeId, TypeSystem};

fn store() -> Cas {
    let mut ts = TypeSystem::new();
    ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.add_type("text.Sentence", TypeId::ANNOTATION).unwrap();
    ts.commit();
    let mut cas = Cas::new(Arc::new(ts), 23).unwrap();
    cas.commit_indexes();
    cas
}

fn collect_spans(cas: &Cas) -> Vec<(i32, i32)> {
    let mut cursor = cas.cursor(ANNOTATION_INDEX, None).unwrap();
    let mut out = Vec::new();
    while cursor.is_valid() {
        let fs = cursor.get(cas).unwrap();
        out.push((cas.heap().begin(fs).unwrap(), cas.heap().end(fs).unwrap()));
        cursor.move_to_next(cas).unwrap();
    }
    out
}

// =============================================================================
// Order fidelity
// =============================================================================

#[test]
fn two_pass_population_iterates_fully_sorted() {
    let mut cas = store();
    let token = cas.type_system().get_type("text.Token").unwrap();
    let sentence = cas.type_system().get_type("text.Sentence").unwrap();

    // Pass one: tokens at scattered offsets.
    for &(b, e) in &[(30, 35), (0, 5), (20, 25), (10, 15), (20, 22)] {
        let fs = cas.create_annotation(token, b, e).unwrap();
        cas.add_fs(fs).unwrap();
    }
    // Pass two: sentences interleaving the same region.
    for &(b, e) in &[(20, 40), (0, 20), (10, 30)] {
        let fs = cas.create_annotation(sentence, b, e).unwrap();
        cas.add_fs(fs).unwrap();
    }

    let spans = collect_spans(&cas);
    assert_eq!(spans.len(), 8);
    // begin ascending, end descending on begin ties.
    for pair in spans.windows(2) {
        let (b1, e1) = pair[0];
        let (b2, e2) = pair[1];
        assert!(b1 < b2 || (b1 == b2 && e1 >= e2), "{pair:?} out of order");
    }

    // Backward traversal is the exact reverse.
    let mut cursor = cas.cursor(ANNOTATION_INDEX, None).unwrap();
    cursor.move_to_last(&cas);
    let mut reversed = Vec::new();
    while cursor.is_valid() {
        let fs = cursor.get(&cas).unwrap();
        reversed.push((cas.heap().begin(fs).unwrap(), cas.heap().end(fs).unwrap()));
        cursor.move_to_previous(&cas).unwrap();
    }
    reversed.reverse();
    assert_eq!(reversed, spans);
}

#[test]
fn subtype_scope_sees_only_its_records() {
    let mut cas = store();
    let token = cas.type_system().get_type("text.Token").unwrap();
    let sentence = cas.type_system().get_type("text.Sentence").unwrap();
    let t = cas.create_annotation(token, 0, 5).unwrap();
    let s = cas.create_annotation(sentence, 0, 20).unwrap();
    cas.add_fs(t).unwrap();
    cas.add_fs(s).unwrap();

    let mut cursor = cas.cursor(ANNOTATION_INDEX, Some(token)).unwrap();
    assert_eq!(cursor.get(&cas).unwrap(), t);
    cursor.move_to_next(&cas).unwrap();
    assert!(!cursor.is_valid());

    assert_eq!(cas.index_size(ANNOTATION_INDEX, Some(sentence)).unwrap(), 1);
    assert_eq!(cas.index_size(ANNOTATION_INDEX, None).unwrap(), 2);
}

// =============================================================================
// Fail-fast detection
// =============================================================================

#[test]
fn remove_and_re_add_trips_cursors_until_repositioned() {
    let mut cas = store();
    let token = cas.type_system().get_type("text.Token").unwrap();
    let mut refs = Vec::new();
    for i in 0..4 {
        let fs = cas.create_annotation(token, i * 10, i * 10 + 5).unwrap();
        cas.add_fs(fs).unwrap();
        refs.push(fs);
    }
    let mut cursor = cas.cursor(ANNOTATION_INDEX, None).unwrap();
    cursor.move_to_next(&cas).unwrap();

    cas.remove_fs(refs[3]).unwrap();
    cas.add_fs(refs[3]).unwrap();

    for result in [
        cursor.get(&cas).map(|_| ()),
        cursor.move_to_next(&cas),
        cursor.move_to_previous(&cas),
    ] {
        assert!(matches!(
            result.unwrap_err().kind,
            ErrorKind::ConcurrentModification
        ));
    }

    // move_to re-snapshots and recovers.
    cursor.move_to(&cas, refs[2]).unwrap();
    assert_eq!(cursor.get(&cas).unwrap(), refs[2]);
    cursor.move_to_next(&cas).unwrap();
    assert_eq!(cursor.get(&cas).unwrap(), refs[3]);
}

#[test]
fn untouched_scopes_do_not_trip() {
    let mut cas = store();
    let token = cas.type_system().get_type("text.Token").unwrap();
    let sentence = cas.type_system().get_type("text.Sentence").unwrap();
    let t = cas.create_annotation(token, 0, 5).unwrap();
    cas.add_fs(t).unwrap();

    let token_cursor = cas.cursor(ANNOTATION_INDEX, Some(token)).unwrap();

    // A sentence touches the annotation scope but not the token scope.
    let s = cas.create_annotation(sentence, 0, 20).unwrap();
    cas.add_fs(s).unwrap();

    assert_eq!(token_cursor.get(&cas).unwrap(), t);
}

#[test]
fn dead_probes_are_rejected() {
    let cas = store();
    let mut cursor = cas.cursor(ANNOTATION_INDEX, None).unwrap();
    let err = cursor.move_to(&cas, FsRef::NULL).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidHandle(_)));
}
