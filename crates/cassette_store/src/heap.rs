//! The feature-structure heap.

use std::fmt;
use std::sync::Arc;

use cassette_foundation::{Error, ErrorKind, FsRef, Result};
use cassette_typesystem::{FeatureId, TypeId, TypeSystem};

/// Append-only record storage over a committed type system.
///
/// Every record occupies a contiguous run of `i32` cells: the type code,
/// then one slot per feature (in offset order). Integer arrays store their
/// length after the type code, then the elements. Cell 0 is reserved so
/// that offset 0 remains the null handle.
///
/// String-ranged feature slots hold 1-based indices into a side table of
/// interned strings; 0 means unset.
pub struct FsHeap {
    ts: Arc<TypeSystem>,
    heap: Vec<i32>,
    strings: Vec<String>,
    // Record start offsets in ascending order, for handle validation.
    starts: Vec<u32>,
}

impl FsHeap {
    /// Creates an empty heap over `ts`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotCommitted`] if `ts` has not been committed;
    /// feature slot offsets only exist after commit.
    pub fn new(ts: Arc<TypeSystem>) -> Result<Self> {
        if !ts.is_committed() {
            return Err(Error::new(ErrorKind::NotCommitted));
        }
        Ok(Self {
            ts,
            heap: vec![0],
            strings: Vec::new(),
            starts: Vec::new(),
        })
    }

    /// Returns the type system this heap stores records of.
    #[must_use]
    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    /// Returns the number of records created so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.starts.len()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates a record of type `t` with all feature slots zeroed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn create_fs(&mut self, t: TypeId) -> FsRef {
        let addr = self.heap.len() as u32;
        self.heap.push(t.index() as i32);
        self.heap
            .extend(std::iter::repeat(0).take(self.ts.arity(t) as usize));
        self.starts.push(addr);
        FsRef::new(addr)
    }

    /// Creates an annotation record of type `t` spanning `[begin, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotAnAnnotationType`] if `t` is not
    /// `cas.text.Annotation` or a subtype of it.
    pub fn create_annotation(&mut self, t: TypeId, begin: i32, end: i32) -> Result<FsRef> {
        if !self.ts.is_annotation_type(t) {
            return Err(Error::new(ErrorKind::NotAnAnnotationType {
                type_name: self.ts.type_name(t).to_string(),
            }));
        }
        let fs = self.create_fs(t);
        let addr = fs.address() as usize;
        self.heap[addr + 1 + self.ts.feature_offset(FeatureId::BEGIN) as usize] = begin;
        self.heap[addr + 1 + self.ts.feature_offset(FeatureId::END) as usize] = end;
        Ok(fs)
    }

    /// Creates a `cas.Integer[]` record of `len` zeroed elements.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn create_int_array(&mut self, len: u32) -> FsRef {
        let addr = self.heap.len() as u32;
        self.heap.push(TypeId::INTEGER_ARRAY.index() as i32);
        self.heap.push(len as i32);
        self.heap.extend(std::iter::repeat(0).take(len as usize));
        self.starts.push(addr);
        FsRef::new(addr)
    }

    // =========================================================================
    // Checked accessors
    // =========================================================================

    /// Returns the type of the record at `fs`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] if `fs` does not address a
    /// record start.
    pub fn type_of(&self, fs: FsRef) -> Result<TypeId> {
        let addr = self.record_start(fs)?;
        self.type_code_at(addr).ok_or_else(|| Error::invalid_handle(fs))
    }

    /// Reads an integer-ranged feature slot.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] for a dead handle and
    /// [`ErrorKind::NotAFeatureOfType`] if `f` is not an integer-ranged
    /// feature of the record's type.
    pub fn get_int_value(&self, fs: FsRef, f: FeatureId) -> Result<i32> {
        let slot = self.slot_of(fs, f, TypeId::INTEGER)?;
        Ok(self.heap[slot])
    }

    /// Writes an integer-ranged feature slot.
    ///
    /// # Errors
    ///
    /// Same conditions as [`get_int_value`](Self::get_int_value).
    pub fn set_int_value(&mut self, fs: FsRef, f: FeatureId, value: i32) -> Result<()> {
        let slot = self.slot_of(fs, f, TypeId::INTEGER)?;
        self.heap[slot] = value;
        Ok(())
    }

    /// Reads a string-ranged feature slot; `None` if never set.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] for a dead handle and
    /// [`ErrorKind::NotAFeatureOfType`] if `f` is not a string-ranged
    /// feature of the record's type.
    #[allow(clippy::cast_sign_loss)]
    pub fn get_string_value(&self, fs: FsRef, f: FeatureId) -> Result<Option<&str>> {
        let slot = self.slot_of(fs, f, TypeId::STRING)?;
        let idx = self.heap[slot];
        if idx == 0 {
            Ok(None)
        } else {
            Ok(Some(&self.strings[idx as usize - 1]))
        }
    }

    /// Writes a string-ranged feature slot.
    ///
    /// # Errors
    ///
    /// Same conditions as [`get_string_value`](Self::get_string_value).
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn set_string_value(
        &mut self,
        fs: FsRef,
        f: FeatureId,
        value: impl Into<String>,
    ) -> Result<()> {
        let slot = self.slot_of(fs, f, TypeId::STRING)?;
        self.strings.push(value.into());
        self.heap[slot] = self.strings.len() as i32;
        Ok(())
    }

    /// Returns the `begin` offset of an annotation record.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] for a dead handle and
    /// [`ErrorKind::NotAnAnnotationType`] for a non-annotation record.
    pub fn begin(&self, fs: FsRef) -> Result<i32> {
        self.annotation_slot(fs, FeatureId::BEGIN)
    }

    /// Returns the `end` offset of an annotation record.
    ///
    /// # Errors
    ///
    /// Same conditions as [`begin`](Self::begin).
    pub fn end(&self, fs: FsRef) -> Result<i32> {
        self.annotation_slot(fs, FeatureId::END)
    }

    /// Returns the length of an integer array record.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] if `fs` is not a live
    /// `cas.Integer[]` record.
    #[allow(clippy::cast_sign_loss)]
    pub fn int_array_len(&self, fs: FsRef) -> Result<u32> {
        let addr = self.int_array_start(fs)?;
        Ok(self.heap[addr + 1] as u32)
    }

    /// Reads element `i` of an integer array record.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidHandle`] if `fs` is not a live
    /// `cas.Integer[]` record, and [`ErrorKind::NoSuchElement`] if `i` is
    /// out of range.
    pub fn get_int_array_element(&self, fs: FsRef, i: u32) -> Result<i32> {
        let slot = self.int_array_slot(fs, i)?;
        Ok(self.heap[slot])
    }

    /// Writes element `i` of an integer array record.
    ///
    /// # Errors
    ///
    /// Same conditions as
    /// [`get_int_array_element`](Self::get_int_array_element).
    pub fn set_int_array_element(&mut self, fs: FsRef, i: u32, value: i32) -> Result<()> {
        let slot = self.int_array_slot(fs, i)?;
        self.heap[slot] = value;
        Ok(())
    }

    // =========================================================================
    // Comparator hot path
    // =========================================================================

    /// Reads the raw slot for feature `f` of the record at `fs`, without
    /// handle or feature validation.
    ///
    /// Index comparators call this once per key per comparison; callers
    /// guarantee `fs` came out of this heap and `f` is a feature of its
    /// type (index insertion validates both).
    ///
    /// # Panics
    ///
    /// Panics if the computed slot is outside the heap.
    #[must_use]
    pub fn feature_slot(&self, fs: FsRef, f: FeatureId) -> i32 {
        let addr = fs.address() as usize;
        self.heap[addr + 1 + self.ts.feature_offset(f) as usize]
    }

    /// Reads the type of the record at `fs`, without handle validation.
    ///
    /// Comparator companion to [`feature_slot`](Self::feature_slot).
    ///
    /// # Panics
    ///
    /// Panics if `fs` is not a live record handle.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn type_code(&self, fs: FsRef) -> TypeId {
        self.ts
            .type_at(self.heap[fs.address() as usize] as u32)
            .expect("record cell holds a defined type code")
    }

    /// Returns true if `fs` addresses a live record start.
    #[must_use]
    pub fn is_valid_ref(&self, fs: FsRef) -> bool {
        !fs.is_null() && self.starts.binary_search(&fs.address()).is_ok()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn record_start(&self, fs: FsRef) -> Result<usize> {
        if self.is_valid_ref(fs) {
            Ok(fs.address() as usize)
        } else {
            Err(Error::invalid_handle(fs))
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn type_code_at(&self, addr: usize) -> Option<TypeId> {
        self.ts.type_at(self.heap[addr] as u32)
    }

    fn slot_of(&self, fs: FsRef, f: FeatureId, range: TypeId) -> Result<usize> {
        let addr = self.record_start(fs)?;
        let t = self.type_code_at(addr).ok_or_else(|| Error::invalid_handle(fs))?;
        if !self.ts.type_has_feature(t, f) || self.ts.feature_range(f) != range {
            return Err(Error::new(ErrorKind::NotAFeatureOfType {
                feature: self.ts.feature_full_name(f).to_string(),
                type_name: self.ts.type_name(t).to_string(),
            }));
        }
        Ok(addr + 1 + self.ts.feature_offset(f) as usize)
    }

    fn annotation_slot(&self, fs: FsRef, f: FeatureId) -> Result<i32> {
        let addr = self.record_start(fs)?;
        let t = self.type_code_at(addr).ok_or_else(|| Error::invalid_handle(fs))?;
        if !self.ts.is_annotation_type(t) {
            return Err(Error::new(ErrorKind::NotAnAnnotationType {
                type_name: self.ts.type_name(t).to_string(),
            }));
        }
        Ok(self.heap[addr + 1 + self.ts.feature_offset(f) as usize])
    }

    fn int_array_start(&self, fs: FsRef) -> Result<usize> {
        let addr = self.record_start(fs)?;
        match self.type_code_at(addr) {
            Some(t) if t == TypeId::INTEGER_ARRAY => Ok(addr),
            _ => Err(Error::invalid_handle(fs)),
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn int_array_slot(&self, fs: FsRef, i: u32) -> Result<usize> {
        let addr = self.int_array_start(fs)?;
        let len = self.heap[addr + 1] as u32;
        if i >= len {
            return Err(Error::no_such_element());
        }
        Ok(addr + 2 + i as usize)
    }
}

// Manual impl: the type system holds no useful Debug state, so report
// sizes only.
impl fmt::Debug for FsHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsHeap")
            .field("records", &self.starts.len())
            .field("cells", &self.heap.len())
            .field("strings", &self.strings.len())
            .finish_non_exhaustive()
    }
}
