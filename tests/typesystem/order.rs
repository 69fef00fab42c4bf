//! Integration tests for linear type orders
//!
//! Tests the record-then-resolve round trip of the order builder.

use cassette_foundation::ErrorKind;
use cassette_typesystem::{LinearTypeOrderBuilder, TypeId, TypeSystem};

#[test]
fn order_round_trip() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let sentence = ts.add_type("text.Sentence", TypeId::ANNOTATION).unwrap();
    ts.commit();

    let mut builder = LinearTypeOrderBuilder::new();
    builder.add(&["text.Token", "text.Sentence", "cas.text.Annotation"]);
    let order = builder.build(&ts).unwrap();

    assert!(!order.less_than(token, token).unwrap());
    assert!(order.less_than(token, sentence).unwrap());
    assert!(order.less_than(token, TypeId::ANNOTATION).unwrap());
    assert!(order.less_than(sentence, TypeId::ANNOTATION).unwrap());
    assert!(!order.less_than(TypeId::ANNOTATION, token).unwrap());
}

#[test]
fn unknown_names_surface_at_build_not_add() {
    let mut ts = TypeSystem::new();
    ts.commit();

    let mut builder = LinearTypeOrderBuilder::new();
    // Recording never fails, even for undefined names.
    builder.add(&["ghost.Type", "cas.Top"]);
    let err = builder.build(&ts).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownType { .. }));
}

#[test]
fn order_covers_unmentioned_types() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.commit();

    // No chain mentions Token; it still gets a deterministic rank.
    let order = LinearTypeOrderBuilder::new().build(&ts).unwrap();
    let before = order.less_than(TypeId::TOP, token).unwrap();
    let after = order.less_than(token, TypeId::TOP).unwrap();
    assert!(before != after);
}
