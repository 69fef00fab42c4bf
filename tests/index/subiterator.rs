//! Integration tests for span-bounded iteration
//!
//! A token/sentence document exercises every ambiguous/strict
//! combination, forward and backward.

use std::sync::Arc;

use cassette_index::Cas;
use cassette_typesystem::{TypeId, TypeSystem};

const TEXT_LEN: i32 = 60;

/// Tokens of length 5 at every offset, sentences of length 10 every 5.
fn document() -> Cas {
    let mut ts = TypeSystem::new();
    ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.add_type("text.Sentence", TypeId::ANNOTATION).unwrap();
    ts.commit();
    let mut cas = Cas::new(Arc::new(ts), 31).unwrap();
    cas.commit_indexes();

    let token = cas.type_system().get_type("text.Token").unwrap();
    let sentence = cas.type_system().get_type("text.Sentence").unwrap();
    for i in 0..=(TEXT_LEN - 5) {
        let fs = cas.create_annotation(token, i, i + 5).unwrap();
        cas.add_fs(fs).unwrap();
    }
    let mut i = 0;
    while i + 10 <= TEXT_LEN {
        let fs = cas.create_annotation(sentence, i, i + 10).unwrap();
        cas.add_fs(fs).unwrap();
        i += 5;
    }
    cas
}

#[test]
fn spanned_counts_forward() {
    let mut cas = document();
    let b = {
        let ann = TypeId::ANNOTATION;
        cas.create_annotation(ann, 10, 41).unwrap()
    };

    let count = |cas: &Cas, ambiguous: bool, strict: bool| -> usize {
        let mut sub = cas.subiterator(b, ambiguous, strict).unwrap();
        let mut n = 0;
        while sub.is_valid() {
            sub.get(cas).unwrap();
            n += 1;
            sub.move_to_next(cas).unwrap();
        }
        n
    };

    assert_eq!(count(&cas, true, true), 32);
    assert_eq!(count(&cas, false, true), 3);
    assert_eq!(count(&cas, true, false), 39);
    assert_eq!(count(&cas, false, false), 4);
}

#[test]
fn spanned_counts_backward() {
    let mut cas = document();
    let b = cas.create_annotation(TypeId::ANNOTATION, 10, 41).unwrap();

    let count = |cas: &Cas, ambiguous: bool, strict: bool| -> usize {
        let mut sub = cas.subiterator(b, ambiguous, strict).unwrap();
        sub.move_to_last(cas).unwrap();
        let mut n = 0;
        while sub.is_valid() {
            sub.get(cas).unwrap();
            n += 1;
            sub.move_to_previous(cas).unwrap();
        }
        n
    };

    assert_eq!(count(&cas, true, true), 32);
    assert_eq!(count(&cas, false, true), 3);
    assert_eq!(count(&cas, true, false), 39);
    assert_eq!(count(&cas, false, false), 4);
}

#[test]
fn unambiguous_strict_yields_the_tiling_sentences() {
    let mut cas = document();
    let b = cas.create_annotation(TypeId::ANNOTATION, 10, 41).unwrap();

    let mut sub = cas.subiterator(b, false, true).unwrap();
    let mut spans = Vec::new();
    while sub.is_valid() {
        let fs = sub.get(&cas).unwrap();
        spans.push((cas.heap().begin(fs).unwrap(), cas.heap().end(fs).unwrap()));
        sub.move_to_next(&cas).unwrap();
    }
    assert_eq!(spans, vec![(10, 20), (20, 30), (30, 40)]);
}

#[test]
fn results_restart_identically() {
    let mut cas = document();
    let b = cas.create_annotation(TypeId::ANNOTATION, 10, 41).unwrap();

    let mut sub = cas.subiterator(b, true, true).unwrap();
    let first_pass: Vec<_> = {
        let mut v = Vec::new();
        while sub.is_valid() {
            v.push(sub.get(&cas).unwrap());
            sub.move_to_next(&cas).unwrap();
        }
        v
    };
    sub.move_to_first(&cas).unwrap();
    let second_pass: Vec<_> = {
        let mut v = Vec::new();
        while sub.is_valid() {
            v.push(sub.get(&cas).unwrap());
            sub.move_to_next(&cas).unwrap();
        }
        v
    };
    assert_eq!(first_pass, second_pass);
    assert_eq!(first_pass.len(), 32);
}
