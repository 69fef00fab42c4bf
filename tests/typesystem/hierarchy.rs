//! Integration tests for the type hierarchy
//!
//! Tests type declaration, subsumption, finality, and commit.

use cassette_foundation::ErrorKind;
use cassette_typesystem::{FeatureId, TypeId, TypeSystem};

// =============================================================================
// Declaration
// =============================================================================

#[test]
fn builtins_are_present_from_the_start() {
    let ts = TypeSystem::new();
    assert_eq!(ts.get_type("cas.Top"), Some(TypeId::TOP));
    assert_eq!(ts.get_type("cas.text.Annotation"), Some(TypeId::ANNOTATION));
    assert_eq!(ts.get_type("cas.Integer[]"), Some(TypeId::INTEGER_ARRAY));
    assert!(ts.is_annotation_type(TypeId::ANNOTATION));
    assert!(!ts.is_annotation_type(TypeId::TOP));
}

#[test]
fn declared_types_hang_off_their_parent() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let word = ts.add_type("text.Word", token).unwrap();

    assert_eq!(ts.parent(word), Some(token));
    assert!(ts.subsumes(TypeId::ANNOTATION, word));
    assert!(ts.subsumes(token, word));
    assert!(!ts.subsumes(word, token));
    assert!(ts.is_annotation_type(word));
}

#[test]
fn redefinition_is_a_syntax_error() {
    let mut ts = TypeSystem::new();
    ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let err = ts.add_type("text.Token", TypeId::TOP).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BadTypeSyntax { .. }));
}

#[test]
fn malformed_names_are_rejected() {
    let mut ts = TypeSystem::new();
    for bad in ["", "with-dash", "two..dots", "_lead", "9start", "a._b"] {
        let err = ts.add_type(bad, TypeId::TOP).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::BadTypeSyntax { .. }),
            "accepted {bad:?}"
        );
    }
}

#[test]
fn primitive_types_are_inheritance_final() {
    let mut ts = TypeSystem::new();
    let err = ts.add_type("my.Int", TypeId::INTEGER).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeInheritanceFinal { .. }));
}

// =============================================================================
// Commit
// =============================================================================

#[test]
fn commit_freezes_declarations() {
    let mut ts = TypeSystem::new();
    ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    ts.commit();
    assert!(ts.is_committed());

    let err = ts.add_type("text.Late", TypeId::TOP).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AlreadyCommitted));

    // Idempotent.
    ts.commit();
    assert!(ts.is_committed());
}

#[test]
fn inherited_features_keep_their_offsets() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let pos = ts.add_feature("pos", token, TypeId::INTEGER).unwrap();
    ts.commit();

    assert_eq!(ts.feature_offset(FeatureId::BEGIN), 0);
    assert_eq!(ts.feature_offset(FeatureId::END), 1);
    assert_eq!(ts.feature_offset(pos), 2);
    assert_eq!(ts.arity(token), 3);
    assert_eq!(ts.arity(TypeId::ANNOTATION), 2);
}

#[test]
fn array_types_synthesize_on_demand() {
    let mut ts = TypeSystem::new();
    let token = ts.add_type("text.Token", TypeId::ANNOTATION).unwrap();
    let arr = ts.array_type_of(token).unwrap();
    assert_eq!(ts.type_name(arr), "text.Token[]");
    assert!(ts.is_array_type(arr));
    assert_eq!(ts.component_type(arr), Some(token));
    // Idempotent.
    assert_eq!(ts.array_type_of(token).unwrap(), arr);
    // The built-in integer array is already there.
    assert_eq!(ts.array_type_of(TypeId::INTEGER).unwrap(), TypeId::INTEGER_ARRAY);
}
