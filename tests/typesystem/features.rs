//! Integration tests for feature declarations
//!
//! Tests feature naming, duplicate handling, and inheritance.

use cassette_foundation::ErrorKind;
use cassette_typesystem::{TypeId, TypeSystem};

#[test]
fn full_names_are_domain_qualified() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let pos = ts.add_feature("pos", token, TypeId::INTEGER).unwrap();

    assert_eq!(ts.feature_full_name(pos), "text.Token:pos");
    assert_eq!(ts.feature_short_name(pos), "pos");
    assert_eq!(ts.get_feature_by_full_name("text.Token:pos"), Some(pos));
    assert_eq!(ts.feature_domain(pos), token);
    assert_eq!(ts.feature_range(pos), TypeId::INTEGER);
}

#[test]
fn same_name_same_range_is_a_silent_success() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let pos = ts.add_feature("pos", token, TypeId::INTEGER).unwrap();
    assert_eq!(ts.add_feature("pos", token, TypeId::INTEGER).unwrap(), pos);
}

#[test]
fn same_name_different_range_is_a_duplicate() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.add_feature("pos", token, TypeId::INTEGER).unwrap();
    let err = ts.add_feature("pos", token, TypeId::STRING).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateFeature { .. }));
}

#[test]
fn ancestor_features_conflict_too() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    // `begin` lives on cas.text.Annotation with Integer range.
    let err = ts.add_feature("begin", token, TypeId::STRING).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateFeature { .. }));
}

#[test]
fn feature_final_types_reject_new_features() {
    let mut ts = TypeSystem::new();
    let err = ts
        .add_feature("extra", TypeId::INTEGER, TypeId::INTEGER)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeFeatureFinal { .. }));
}

#[test]
fn features_of_lists_inherited_first() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let pos = ts.add_feature("pos", token, TypeId::INTEGER).unwrap();
    ts.commit();

    let feats = ts.features_of(token);
    assert_eq!(feats.len(), 3);
    assert_eq!(feats[2], pos);
    assert!(ts.type_has_feature(token, pos));
    assert!(!ts.type_has_feature(TypeId::ANNOTATION, pos));
}
