//! Linear type orders.
//!
//! A [`LinearTypeOrderBuilder`] records partial-order chains by type name.
//! Building against a committed [`TypeSystem`] resolves the chains to a
//! total order over every type in the system, filling in unconstrained
//! types deterministically by id. The resulting [`LinearTypeOrder`] is a
//! plain rank table usable as a comparator tie-breaker.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use cassette_foundation::{Error, ErrorKind, Result};

use crate::system::{TypeId, TypeSystem};

/// Accumulates partial-order chains over type names.
///
/// Recording is name-based and infallible; names are resolved only at
/// [`build`](Self::build) time, so chains may be recorded before the
/// types they mention exist.
#[derive(Debug, Default)]
pub struct LinearTypeOrderBuilder {
    chains: Vec<Vec<String>>,
}

impl LinearTypeOrderBuilder {
    /// Creates a builder with no recorded constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a chain: each listed type orders before the next.
    ///
    /// A chain of fewer than two names constrains nothing but is still
    /// accepted.
    pub fn add(&mut self, types: &[&str]) {
        self.chains
            .push(types.iter().map(ToString::to_string).collect());
    }

    /// Resolves the recorded chains against `ts` into a total order over
    /// every type in the system.
    ///
    /// Unconstrained types are placed in id order among whatever positions
    /// the constraints leave open, so the result is deterministic for a
    /// given type system and chain set.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotCommitted`] if `ts` is not committed,
    /// [`ErrorKind::UnknownType`] if a chain names an undefined type, and
    /// [`ErrorKind::TypeOrderCycle`] if the chains contradict each other.
    pub fn build(&self, ts: &TypeSystem) -> Result<LinearTypeOrder> {
        if !ts.is_committed() {
            return Err(Error::new(ErrorKind::NotCommitted));
        }
        let n = ts.type_count();
        let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree: Vec<u32> = vec![0; n];
        for chain in &self.chains {
            let mut ids = Vec::with_capacity(chain.len());
            for name in chain {
                let t = ts
                    .get_type(name)
                    .ok_or_else(|| Error::unknown_type(name.clone()))?;
                ids.push(t.index() as usize);
            }
            for pair in ids.windows(2) {
                succ[pair[0]].push(pair[1]);
                indegree[pair[1]] += 1;
            }
        }

        // Kahn's algorithm, popping the smallest ready id first.
        let mut ready: BinaryHeap<Reverse<usize>> = indegree
            .iter()
            .enumerate()
            .filter(|&(_, d)| *d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        let mut rank = vec![u32::MAX; n];
        let mut next_rank = 0u32;
        while let Some(Reverse(i)) = ready.pop() {
            rank[i] = next_rank;
            next_rank += 1;
            for &j in &succ[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    ready.push(Reverse(j));
                }
            }
        }
        if (next_rank as usize) < n {
            // Some type never became ready; name the smallest one stuck
            // on the cycle.
            let stuck = rank
                .iter()
                .position(|&r| r == u32::MAX)
                .map(|i| ts.type_name(TypeId::from_index(i as u32)))
                .unwrap_or_default();
            return Err(Error::new(ErrorKind::TypeOrderCycle {
                name: stuck.to_string(),
            }));
        }
        Ok(LinearTypeOrder { rank })
    }
}

/// A total order over the types of one committed type system.
#[derive(Clone, Debug)]
pub struct LinearTypeOrder {
    rank: Vec<u32>,
}

impl LinearTypeOrder {
    /// Returns true if `a` orders strictly before `b`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TypeNotOrdered`] if either id is not covered
    /// by this order.
    pub fn less_than(&self, a: TypeId, b: TypeId) -> Result<bool> {
        Ok(self.rank_of(a)? < self.rank_of(b)?)
    }

    /// Compares two types by rank.
    ///
    /// Ids not covered by this order compare equal to everything, so this
    /// is safe to use as a comparator tie-breaker without re-validating.
    #[must_use]
    pub fn compare(&self, a: TypeId, b: TypeId) -> Ordering {
        match (
            self.rank.get(a.index() as usize),
            self.rank.get(b.index() as usize),
        ) {
            (Some(ra), Some(rb)) => ra.cmp(rb),
            _ => Ordering::Equal,
        }
    }

    fn rank_of(&self, t: TypeId) -> Result<u32> {
        self.rank
            .get(t.index() as usize)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::TypeNotOrdered(t.index())))
    }
}
