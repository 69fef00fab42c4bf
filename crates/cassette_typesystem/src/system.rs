//! The type system: a single-rooted tree of types with features.
//!
//! Built incrementally at schema time, then frozen with [`TypeSystem::commit`].
//! After commit the system is immutable and every feature has a fixed slot
//! offset, which is what lets the store address record fields by plain
//! integer arithmetic.

use std::collections::HashMap;
use std::fmt;

use cassette_foundation::{Error, ErrorKind, Result};
use cassette_tree::IntIntMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Separator between a feature's domain type and its short name.
pub const FEATURE_SEPARATOR: char = ':';

/// Dense type identifier.
///
/// Built-in types occupy fixed low indices, interned at construction the
/// same way every time.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeId(u32);

impl TypeId {
    /// Returns the raw index of this type.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }

    // =========================================================================
    // Reserved built-in types
    // =========================================================================
    // Always present with fixed indices; see `TypeSystem::new`.

    /// The root type `cas.Top`.
    pub const TOP: TypeId = TypeId(0);

    /// The primitive integer type `cas.Integer`.
    pub const INTEGER: TypeId = TypeId(1);

    /// The primitive float type `cas.Float`.
    pub const FLOAT: TypeId = TypeId(2);

    /// The primitive string type `cas.String`.
    pub const STRING: TypeId = TypeId(3);

    /// The primitive boolean type `cas.Boolean`.
    pub const BOOLEAN: TypeId = TypeId(4);

    /// The annotation base type `cas.text.Annotation`, carrying `begin`
    /// and `end` offsets into the document text.
    pub const ANNOTATION: TypeId = TypeId(5);

    /// The built-in integer array type `cas.Integer[]`.
    pub const INTEGER_ARRAY: TypeId = TypeId(6);
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Dense feature identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureId(u32);

impl FeatureId {
    /// Returns the raw index of this feature.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// The `begin` feature of `cas.text.Annotation`.
    pub const BEGIN: FeatureId = FeatureId(0);

    /// The `end` feature of `cas.text.Annotation`.
    pub const END: FeatureId = FeatureId(1);
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

struct TypeDef {
    name: String,
    parent: Option<TypeId>,
    children: Vec<TypeId>,
    declared: Vec<FeatureId>,
    feature_final: bool,
    inheritance_final: bool,
    /// `Some` iff this is an array type.
    component: Option<TypeId>,
    /// Total feature count including inherited; valid after commit.
    arity: u32,
}

struct FeatureDef {
    short_name: String,
    full_name: String,
    domain: TypeId,
    range: TypeId,
    /// Slot offset within a record; valid after commit.
    offset: u32,
}

/// Single-rooted type tree with features, subsumption, and finality checks.
///
/// All built-in types are instance state created by [`TypeSystem::new`];
/// there are no process-wide tables.
pub struct TypeSystem {
    types: Vec<TypeDef>,
    features: Vec<FeatureDef>,
    types_by_name: HashMap<String, TypeId>,
    features_by_full_name: HashMap<String, FeatureId>,
    /// Component type id -> synthesized array type id.
    array_types: IntIntMap,
    committed: bool,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem {
    /// Creates a type system holding only the built-in types.
    ///
    /// # Panics
    ///
    /// Panics if the built-in tables fail to register (internal bug).
    #[must_use]
    pub fn new() -> Self {
        let mut ts = Self {
            types: Vec::new(),
            features: Vec::new(),
            types_by_name: HashMap::new(),
            features_by_full_name: HashMap::new(),
            array_types: IntIntMap::new(),
            committed: false,
        };

        let top = ts.intern_type("cas.Top", None, false, false, None);
        debug_assert_eq!(top, TypeId::TOP);
        for (name, expect) in [
            ("cas.Integer", TypeId::INTEGER),
            ("cas.Float", TypeId::FLOAT),
            ("cas.String", TypeId::STRING),
            ("cas.Boolean", TypeId::BOOLEAN),
        ] {
            let id = ts.intern_type(name, Some(TypeId::TOP), true, true, None);
            debug_assert_eq!(id, expect);
        }
        let annot = ts.intern_type("cas.text.Annotation", Some(TypeId::TOP), false, false, None);
        debug_assert_eq!(annot, TypeId::ANNOTATION);
        let begin = ts
            .intern_feature("begin", TypeId::ANNOTATION, TypeId::INTEGER)
            .expect("failed to register built-in begin feature");
        debug_assert_eq!(begin, FeatureId::BEGIN);
        let end = ts
            .intern_feature("end", TypeId::ANNOTATION, TypeId::INTEGER)
            .expect("failed to register built-in end feature");
        debug_assert_eq!(end, FeatureId::END);
        let int_array = ts.intern_array(TypeId::INTEGER);
        debug_assert_eq!(int_array, TypeId::INTEGER_ARRAY);

        ts
    }

    /// Returns true once [`TypeSystem::commit`] has been called.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns the number of defined types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Iterates all type ids in definition order (stable).
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..u32::try_from(self.types.len()).expect("type table exceeds u32")).map(TypeId)
    }

    /// Iterates all feature ids in definition order (stable).
    pub fn features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        (0..u32::try_from(self.features.len()).expect("feature table exceeds u32")).map(FeatureId)
    }

    // =========================================================================
    // Schema building
    // =========================================================================

    /// Defines a new type under `parent`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::AlreadyCommitted`] after commit
    /// - [`ErrorKind::BadTypeSyntax`] for an ill-formed or already-defined
    ///   name
    /// - [`ErrorKind::TypeInheritanceFinal`] if `parent` admits no subtypes
    pub fn add_type(&mut self, name: &str, parent: TypeId) -> Result<TypeId> {
        if self.committed {
            return Err(Error::new(ErrorKind::AlreadyCommitted));
        }
        if !is_type_name(name) || self.types_by_name.contains_key(name) {
            return Err(Error::bad_type_syntax(name));
        }
        if self.type_def(parent).inheritance_final {
            return Err(Error::inheritance_final(self.type_name(parent)));
        }
        Ok(self.intern_type(name, Some(parent), false, false, None))
    }

    /// Defines a feature `short_name` on `domain` with range `range`.
    ///
    /// Redeclaring a feature the domain already offers (own or inherited)
    /// with the same range is a silent success returning the existing id.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::AlreadyCommitted`] after commit
    /// - [`ErrorKind::BadFeatureSyntax`] for an ill-formed short name
    /// - [`ErrorKind::TypeFeatureFinal`] if `domain` admits no features
    /// - [`ErrorKind::DuplicateFeature`] if the name exists with a
    ///   different range
    pub fn add_feature(&mut self, short_name: &str, domain: TypeId, range: TypeId) -> Result<FeatureId> {
        if self.committed {
            return Err(Error::new(ErrorKind::AlreadyCommitted));
        }
        if !is_identifier(short_name) {
            return Err(Error::bad_feature_syntax(short_name));
        }
        if let Some(existing) = self.lookup_feature(domain, short_name) {
            if self.features[existing.0 as usize].range == range {
                return Ok(existing);
            }
            return Err(Error::duplicate_feature(short_name, self.type_name(domain)));
        }
        if self.type_def(domain).feature_final {
            return Err(Error::feature_final(self.type_name(domain)));
        }
        self.intern_feature(short_name, domain, range)
    }

    /// Returns the array type over `component`, synthesizing it on demand.
    ///
    /// Array types are feature- and inheritance-final and parented at the
    /// root. Synthesis is only possible before commit; already-synthesized
    /// array types (including the built-in integer array) remain available
    /// afterwards.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::AlreadyCommitted`] if the array type does not exist yet
    /// and the system is committed.
    pub fn array_type_of(&mut self, component: TypeId) -> Result<TypeId> {
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        if let Some(id) = self.array_types.get(component.0 as i32) {
            return Ok(TypeId(id as u32));
        }
        if self.committed {
            return Err(Error::new(ErrorKind::AlreadyCommitted));
        }
        Ok(self.intern_array(component))
    }

    /// Freezes the type system and computes per-type arities and
    /// per-feature slot offsets. Idempotent.
    pub fn commit(&mut self) {
        if self.committed {
            return;
        }
        // Parents always precede children in the id order, so one pass
        // suffices.
        for t in 0..self.types.len() {
            let base = match self.types[t].parent {
                Some(p) => self.types[p.0 as usize].arity,
                None => 0,
            };
            let declared = self.types[t].declared.clone();
            for (i, f) in declared.iter().enumerate() {
                self.features[f.0 as usize].offset =
                    base + u32::try_from(i).expect("feature count exceeds u32");
            }
            self.types[t].arity = base + u32::try_from(declared.len()).expect("feature count exceeds u32");
        }
        self.committed = true;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Looks up a type by its fully qualified name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<TypeId> {
        self.types_by_name.get(name).copied()
    }

    /// Returns the type id at `index`, if one is defined.
    ///
    /// Stored type codes round-trip through this to recover validated ids.
    #[must_use]
    pub fn type_at(&self, index: u32) -> Option<TypeId> {
        if (index as usize) < self.types.len() {
            Some(TypeId::from_index(index))
        } else {
            None
        }
    }

    /// Returns the fully qualified name of `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is not an id issued by this type system.
    #[must_use]
    pub fn type_name(&self, t: TypeId) -> &str {
        &self.type_def(t).name
    }

    /// Returns the parent of `t`, or `None` for the root.
    #[must_use]
    pub fn parent(&self, t: TypeId) -> Option<TypeId> {
        self.type_def(t).parent
    }

    /// Returns the direct subtypes of `t` in definition order.
    #[must_use]
    pub fn direct_subtypes(&self, t: TypeId) -> &[TypeId] {
        &self.type_def(t).children
    }

    /// Returns true iff `b` is `a` or a (transitive) subtype of `a`.
    #[must_use]
    pub fn subsumes(&self, a: TypeId, b: TypeId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.type_def(cur).parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Returns true if `t` is the annotation base type or a subtype of it.
    #[must_use]
    pub fn is_annotation_type(&self, t: TypeId) -> bool {
        self.subsumes(TypeId::ANNOTATION, t)
    }

    /// Returns true if `t` is an array type.
    #[must_use]
    pub fn is_array_type(&self, t: TypeId) -> bool {
        self.type_def(t).component.is_some()
    }

    /// Returns the component type of an array type.
    #[must_use]
    pub fn component_type(&self, t: TypeId) -> Option<TypeId> {
        self.type_def(t).component
    }

    /// Returns true if `t` rejects new features.
    #[must_use]
    pub fn is_feature_final(&self, t: TypeId) -> bool {
        self.type_def(t).feature_final
    }

    /// Returns true if `t` rejects new subtypes.
    #[must_use]
    pub fn is_inheritance_final(&self, t: TypeId) -> bool {
        self.type_def(t).inheritance_final
    }

    /// Looks up a feature by its full `domain:short` name.
    #[must_use]
    pub fn get_feature_by_full_name(&self, full_name: &str) -> Option<FeatureId> {
        self.features_by_full_name.get(full_name).copied()
    }

    /// Returns the features of `t`, inherited first, in a stable order.
    #[must_use]
    pub fn features_of(&self, t: TypeId) -> Vec<FeatureId> {
        let mut chain = Vec::new();
        let mut cur = Some(t);
        while let Some(c) = cur {
            chain.push(c);
            cur = self.type_def(c).parent;
        }
        let mut out = Vec::new();
        for c in chain.into_iter().rev() {
            out.extend_from_slice(&self.type_def(c).declared);
        }
        out
    }

    /// Returns the short name of `f`.
    #[must_use]
    pub fn feature_short_name(&self, f: FeatureId) -> &str {
        &self.features[f.0 as usize].short_name
    }

    /// Returns the full `domain:short` name of `f`.
    #[must_use]
    pub fn feature_full_name(&self, f: FeatureId) -> &str {
        &self.features[f.0 as usize].full_name
    }

    /// Returns the type that introduced `f`.
    #[must_use]
    pub fn feature_domain(&self, f: FeatureId) -> TypeId {
        self.features[f.0 as usize].domain
    }

    /// Returns the range (value type) of `f`.
    #[must_use]
    pub fn feature_range(&self, f: FeatureId) -> TypeId {
        self.features[f.0 as usize].range
    }

    /// Returns the record slot offset of `f`. Valid after commit.
    #[must_use]
    pub fn feature_offset(&self, f: FeatureId) -> u32 {
        self.features[f.0 as usize].offset
    }

    /// Returns the total feature count of `t` (inherited included).
    /// Valid after commit.
    #[must_use]
    pub fn arity(&self, t: TypeId) -> u32 {
        self.type_def(t).arity
    }

    /// Returns true if `t` declares or inherits `f`.
    #[must_use]
    pub fn type_has_feature(&self, t: TypeId, f: FeatureId) -> bool {
        self.subsumes(self.feature_domain(f), t)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn type_def(&self, t: TypeId) -> &TypeDef {
        &self.types[t.0 as usize]
    }

    fn intern_type(
        &mut self,
        name: &str,
        parent: Option<TypeId>,
        feature_final: bool,
        inheritance_final: bool,
        component: Option<TypeId>,
    ) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).expect("type table exceeds u32"));
        self.types.push(TypeDef {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            declared: Vec::new(),
            feature_final,
            inheritance_final,
            component,
            arity: 0,
        });
        self.types_by_name.insert(name.to_string(), id);
        if let Some(p) = parent {
            self.types[p.0 as usize].children.push(id);
        }
        id
    }

    fn intern_feature(&mut self, short_name: &str, domain: TypeId, range: TypeId) -> Result<FeatureId> {
        let full_name = format!(
            "{}{}{}",
            self.type_name(domain),
            FEATURE_SEPARATOR,
            short_name
        );
        let id = FeatureId(u32::try_from(self.features.len()).expect("feature table exceeds u32"));
        self.features.push(FeatureDef {
            short_name: short_name.to_string(),
            full_name: full_name.clone(),
            domain,
            range,
            offset: 0,
        });
        self.features_by_full_name.insert(full_name, id);
        self.types[domain.0 as usize].declared.push(id);
        Ok(id)
    }

    fn intern_array(&mut self, component: TypeId) -> TypeId {
        let name = format!("{}[]", self.type_name(component));
        let id = self.intern_type(&name, Some(TypeId::TOP), true, true, Some(component));
        #[allow(clippy::cast_possible_wrap)]
        self.array_types.insert(component.0 as i32, id.0 as i32);
        id
    }

    /// Finds `short_name` on `domain` or any ancestor.
    fn lookup_feature(&self, domain: TypeId, short_name: &str) -> Option<FeatureId> {
        let mut cur = Some(domain);
        while let Some(t) = cur {
            for &f in &self.type_def(t).declared {
                if self.features[f.0 as usize].short_name == short_name {
                    return Some(f);
                }
            }
            cur = self.type_def(t).parent;
        }
        None
    }
}

/// Validates a dotted type name: every segment must be a plain identifier.
fn is_type_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

/// Validates a single name segment: leading ASCII letter, then letters,
/// digits, or underscore.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
