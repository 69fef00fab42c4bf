//! Error types for the Cassette system.
//!
//! Uses `thiserror` for ergonomic error definition. Errors fall into two
//! families: schema-build errors, which are fatal to the build and surface
//! to the immediate caller, and iteration errors, which the caller can
//! recover from by repositioning the cursor.

use thiserror::Error;

use crate::handle::FsRef;

/// Convenience result type for Cassette operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Cassette operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a bad-type-syntax error.
    #[must_use]
    pub fn bad_type_syntax(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadTypeSyntax { name: name.into() })
    }

    /// Creates a bad-feature-syntax error.
    #[must_use]
    pub fn bad_feature_syntax(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadFeatureSyntax { name: name.into() })
    }

    /// Creates an inheritance-final violation error.
    #[must_use]
    pub fn inheritance_final(type_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeInheritanceFinal {
            type_name: type_name.into(),
        })
    }

    /// Creates a feature-final violation error.
    #[must_use]
    pub fn feature_final(type_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeFeatureFinal {
            type_name: type_name.into(),
        })
    }

    /// Creates a duplicate-feature error.
    #[must_use]
    pub fn duplicate_feature(feature: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateFeature {
            feature: feature.into(),
            type_name: type_name.into(),
        })
    }

    /// Creates an unknown-type error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType { name: name.into() })
    }

    /// Creates an invalid-handle error.
    #[must_use]
    pub fn invalid_handle(fs: FsRef) -> Self {
        Self::new(ErrorKind::InvalidHandle(fs))
    }

    /// Creates a no-such-element iteration error.
    #[must_use]
    pub fn no_such_element() -> Self {
        Self::new(ErrorKind::NoSuchElement)
    }

    /// Creates a concurrent-modification iteration error.
    #[must_use]
    pub fn concurrent_modification() -> Self {
        Self::new(ErrorKind::ConcurrentModification)
    }

    /// Returns true if this is an iteration error (recoverable by
    /// repositioning), as opposed to a schema-build error.
    #[must_use]
    pub fn is_iteration_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NoSuchElement | ErrorKind::ConcurrentModification
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    // =========================================================================
    // Schema-build errors
    // =========================================================================
    /// Type name is syntactically invalid or redefines an existing type.
    #[error("invalid type name: {name}")]
    BadTypeSyntax {
        /// The offending name.
        name: String,
    },

    /// Feature short name is syntactically invalid.
    #[error("invalid feature name: {name}")]
    BadFeatureSyntax {
        /// The offending name.
        name: String,
    },

    /// Attempted to add a subtype to an inheritance-final type.
    #[error("type is inheritance-final: {type_name}")]
    TypeInheritanceFinal {
        /// The final type.
        type_name: String,
    },

    /// Attempted to add a feature to a feature-final type.
    #[error("type is feature-final: {type_name}")]
    TypeFeatureFinal {
        /// The final type.
        type_name: String,
    },

    /// Feature already exists on the type (or an ancestor) with a
    /// different range.
    #[error("duplicate feature {feature} on type {type_name}")]
    DuplicateFeature {
        /// The feature short name.
        feature: String,
        /// The type carrying the conflicting definition.
        type_name: String,
    },

    /// Mutation attempted after commit.
    #[error("already committed")]
    AlreadyCommitted,

    /// Operation requires a committed type system or repository.
    #[error("not committed")]
    NotCommitted,

    /// Type name referenced by a type-order builder is not defined.
    #[error("unknown type: {name}")]
    UnknownType {
        /// The unresolved name.
        name: String,
    },

    /// The recorded type-order constraints contain a cycle.
    #[error("cycle in type order involving {name}")]
    TypeOrderCycle {
        /// A type on the cycle.
        name: String,
    },

    /// Type id queried against a linear order it is not part of.
    #[error("type id {0} is not covered by this type order")]
    TypeNotOrdered(u32),

    /// Comparator key references a feature whose range is not Integer.
    #[error("comparator key {feature} does not have an integer range")]
    BadComparatorKey {
        /// The feature full name.
        feature: String,
    },

    /// SET and SORTED index definitions require at least one key.
    #[error("index {label} requires a non-empty comparator")]
    MissingComparator {
        /// The index label.
        label: String,
    },

    /// An index definition with this label already exists.
    #[error("index label already in use: {label}")]
    DuplicateIndexLabel {
        /// The index label.
        label: String,
    },

    /// No index definition with this label exists.
    #[error("no index registered under label: {label}")]
    UnknownIndexLabel {
        /// The index label.
        label: String,
    },

    /// Index requested with a scope type its base type does not subsume.
    #[error("incorrect index type: {scope} is not subsumed by base {base}")]
    IncorrectIndexType {
        /// The requested scope type name.
        scope: String,
        /// The index's base type name.
        base: String,
    },

    /// Annotation operation attempted on a non-annotation type.
    #[error("not an annotation type: {type_name}")]
    NotAnAnnotationType {
        /// The offending type.
        type_name: String,
    },

    /// Handle does not address a live record.
    #[error("invalid record handle: {0:?}")]
    InvalidHandle(FsRef),

    /// Feature is not defined on the record's type.
    #[error("feature {feature} is not defined on type {type_name}")]
    NotAFeatureOfType {
        /// The feature full name.
        feature: String,
        /// The record's type.
        type_name: String,
    },

    // =========================================================================
    // Iteration errors
    // =========================================================================
    /// Dereference or step on an invalid cursor.
    #[error("no such element")]
    NoSuchElement,

    /// Cursor snapshot is stale; the underlying index was modified.
    /// Recoverable by repositioning the cursor.
    #[error("index modified while iterating")]
    ConcurrentModification,
}
