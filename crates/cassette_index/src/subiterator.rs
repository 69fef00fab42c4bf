//! Span-bounded iteration over the sorted annotation index.

use std::cmp::Ordering;

use cassette_foundation::{Error, FsRef, Result};

use crate::cas::Cas;
use crate::comparator::IndexComparator;
use crate::cursor::FsCursor;

/// Iterates the annotations inside the span of a bounding annotation.
///
/// The window starts at the nearest-following position for the bound;
/// the bound and every record comparator-equal to it are excluded. A
/// position stays valid while its annotation's `begin` does not exceed
/// the bound's `end`.
///
/// Two knobs restrict the yield further:
/// - `strict`: annotations whose `end` exceeds the bound's `end` are
///   skipped.
/// - `!ambiguous` (unambiguous): after an annotation is yielded, every
///   annotation beginning before its `end` is skipped. Unambiguous
///   backward motion, `move_to_last`, and `move_to` first materialize
///   the remaining yield as a frozen list; positions become list
///   indices from then on.
#[derive(Debug)]
pub struct Subiterator {
    cursor: FsCursor,
    bound: FsRef,
    bound_end: i32,
    ambiguous: bool,
    strict: bool,
    // End of the most recently accepted annotation, unambiguous mode.
    prev_end: i32,
    // First record of the window; backward motion stops here.
    start: FsRef,
    // Frozen list form with its position, once materialized.
    list: Option<Vec<FsRef>>,
    pos: Option<usize>,
}

impl Subiterator {
    pub(crate) fn new(
        cas: &Cas,
        label: &str,
        bound: FsRef,
        ambiguous: bool,
        strict: bool,
    ) -> Result<Self> {
        let (d, scope) = cas.repository().resolve(label, None)?;
        let bound_end = cas.heap().end(bound)?;
        let mut sub = Self {
            cursor: FsCursor::detached(d, scope),
            bound,
            bound_end,
            ambiguous,
            strict,
            prev_end: 0,
            start: FsRef::NULL,
            list: None,
            pos: None,
        };
        sub.move_to_first(cas)?;
        Ok(sub)
    }

    /// Returns true if positioned on an annotation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.list.is_some() {
            self.pos.is_some()
        } else {
            self.cursor.is_valid()
        }
    }

    /// Returns the annotation at the current position.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` if invalid; `ConcurrentModification` if the index
    /// changed underneath a non-list position.
    pub fn get(&self, cas: &Cas) -> Result<FsRef> {
        if let Some(list) = &self.list {
            return self
                .pos
                .map(|i| list[i])
                .ok_or_else(Error::no_such_element);
        }
        self.cursor.get(cas)
    }

    /// Repositions at the first annotation of the window.
    ///
    /// # Errors
    ///
    /// Propagates `ConcurrentModification` from the underlying cursor.
    pub fn move_to_first(&mut self, cas: &Cas) -> Result<()> {
        if let Some(list) = &self.list {
            self.pos = if list.is_empty() { None } else { Some(0) };
            return Ok(());
        }
        self.cursor.move_to(cas, self.bound)?;
        // The bound and its comparator-ties are not part of the window.
        while self.cursor.is_valid() && self.compares_equal_to_bound(cas)? {
            self.cursor.move_to_next(cas)?;
        }
        self.adjust_forward(cas)?;
        if self.cursor.is_valid() {
            self.start = self.cursor.get(cas)?;
            if !self.ambiguous {
                self.prev_end = cas.heap().end(self.start)?;
            }
        } else {
            self.start = FsRef::NULL;
        }
        Ok(())
    }

    /// Repositions at the last annotation of the window.
    ///
    /// # Errors
    ///
    /// Propagates `ConcurrentModification` from the underlying cursor.
    pub fn move_to_last(&mut self, cas: &Cas) -> Result<()> {
        if !self.ambiguous && self.list.is_none() {
            self.convert_to_list(cas)?;
        }
        if let Some(list) = &self.list {
            self.pos = list.len().checked_sub(1);
            return Ok(());
        }
        // Walk forward to the last acceptable position.
        self.move_to_first(cas)?;
        if !self.cursor.is_valid() {
            return Ok(());
        }
        loop {
            let here = self.cursor;
            self.move_to_next(cas)?;
            if !self.cursor.is_valid() {
                self.cursor = here;
                return Ok(());
            }
        }
    }

    /// Steps forward; stepping past the window silently invalidates.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` if already invalid; `ConcurrentModification` from
    /// the underlying cursor.
    pub fn move_to_next(&mut self, cas: &Cas) -> Result<()> {
        if let Some(list) = &self.list {
            self.pos = match self.pos {
                None => return Err(Error::no_such_element()),
                Some(i) if i + 1 < list.len() => Some(i + 1),
                Some(_) => None,
            };
            return Ok(());
        }
        if !self.cursor.is_valid() {
            return Err(Error::no_such_element());
        }
        self.cursor.move_to_next(cas)?;
        if !self.ambiguous {
            // Skip overlaps with the annotation just yielded.
            while self.cursor.is_valid() {
                let fs = self.cursor.get(cas)?;
                if cas.heap().begin(fs)? >= self.prev_end {
                    break;
                }
                self.cursor.move_to_next(cas)?;
            }
        }
        self.adjust_forward(cas)?;
        if !self.ambiguous && self.cursor.is_valid() {
            self.prev_end = cas.heap().end(self.cursor.get(cas)?)?;
        }
        Ok(())
    }

    /// Steps backward; stepping before the window start silently
    /// invalidates. In unambiguous mode this materializes the list form.
    ///
    /// # Errors
    ///
    /// `NoSuchElement` if already invalid; `ConcurrentModification` from
    /// the underlying cursor.
    pub fn move_to_previous(&mut self, cas: &Cas) -> Result<()> {
        if !self.ambiguous && self.list.is_none() {
            self.convert_to_list(cas)?;
        }
        if self.list.is_some() {
            self.pos = match self.pos {
                None => return Err(Error::no_such_element()),
                Some(0) => None,
                Some(i) => Some(i - 1),
            };
            return Ok(());
        }
        if !self.cursor.is_valid() {
            return Err(Error::no_such_element());
        }
        if self.cursor.get(cas)? == self.start {
            self.cursor.invalidate();
            return Ok(());
        }
        self.cursor.move_to_previous(cas)?;
        if self.strict {
            while self.cursor.is_valid() {
                let fs = self.cursor.get(cas)?;
                if cas.heap().end(fs)? <= self.bound_end {
                    break;
                }
                self.cursor.move_to_previous(cas)?;
            }
        }
        Ok(())
    }

    /// Repositions at the leftmost in-window annotation comparing
    /// greater than or equal to the record at `fs`. In unambiguous mode
    /// this materializes the list form.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for a dead probe; `ConcurrentModification` from
    /// the underlying cursor.
    pub fn move_to(&mut self, cas: &Cas, fs: FsRef) -> Result<()> {
        if !self.ambiguous && self.list.is_none() {
            self.convert_to_list(cas)?;
        }
        if let Some(list) = &self.list {
            if !cas.heap().is_valid_ref(fs) {
                return Err(Error::invalid_handle(fs));
            }
            let cmp = self.comparator(cas);
            self.pos = list
                .iter()
                .position(|&x| cmp.compare(cas.heap(), x, fs) != Ordering::Less);
            return Ok(());
        }
        self.cursor.move_to(cas, fs)?;
        self.adjust_forward(cas)?;
        if self.cursor.is_valid() {
            let cur = self.cursor.get(cas)?;
            if self.comparator(cas).compare(cas.heap(), cur, self.bound) == Ordering::Less {
                self.cursor.invalidate();
            }
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Skips strict violations forward and clamps to the window.
    fn adjust_forward(&mut self, cas: &Cas) -> Result<()> {
        while self.cursor.is_valid() {
            let fs = self.cursor.get(cas)?;
            if cas.heap().begin(fs)? > self.bound_end {
                self.cursor.invalidate();
                return Ok(());
            }
            if self.strict && cas.heap().end(fs)? > self.bound_end {
                self.cursor.move_to_next(cas)?;
                continue;
            }
            return Ok(());
        }
        Ok(())
    }

    /// One forward pass over the remaining yield, preserving the current
    /// position as a list index.
    fn convert_to_list(&mut self, cas: &Cas) -> Result<()> {
        let current = if self.cursor.is_valid() {
            Some(self.cursor.get(cas)?)
        } else {
            None
        };
        let mut items = Vec::new();
        self.move_to_first(cas)?;
        while self.cursor.is_valid() {
            items.push(self.cursor.get(cas)?);
            self.move_to_next(cas)?;
        }
        self.pos = current.and_then(|fs| items.iter().position(|&x| x == fs));
        self.list = Some(items);
        Ok(())
    }

    fn compares_equal_to_bound(&self, cas: &Cas) -> Result<bool> {
        let fs = self.cursor.get(cas)?;
        Ok(self.comparator(cas).compare(cas.heap(), fs, self.bound) == Ordering::Equal)
    }

    fn comparator<'a>(&self, cas: &'a Cas) -> &'a IndexComparator {
        cas.repository().definition(self.cursor.def).comparator()
    }
}
