//! Factor graph primitives
//!
//! A factor graph is a vector of factor slots. Each slot holds a shared
//! handle to an externally-owned factor, or nothing if the factor was
//! removed. Slot positions are the factor identifiers used by the
//! [`VariableIndex`] and the elimination forest.

pub mod io;
mod key;
mod ordering;
mod variable_index;

pub use key::{default_formatter, symbol_formatter, Symbol};
pub use ordering::Ordering;
pub use variable_index::{IndexError, VariableIndex};

use std::collections::BTreeSet;
use std::sync::Arc;

/// Variable identifier (totally ordered, opaque)
pub type Key = u64;

/// Callback used to render keys in printed output
pub type KeyFormatter<'a> = &'a dyn Fn(Key) -> String;

/// Shared handle to a factor slot
///
/// `None` marks an empty (removed) slot.
pub type FactorSlot<F> = Option<Arc<F>>;

/// A probabilistic constraint over a small set of variables
///
/// The elimination core only reads the keys; everything else is the
/// concern of the elimination policy that consumes the factors.
pub trait Factor {
    /// Variables this factor touches
    fn keys(&self) -> &[Key];

    /// Equality up to a numerical tolerance
    fn equals(&self, other: &Self, tol: f64) -> bool;

    /// One-line description used by forest printing
    fn describe(&self, formatter: KeyFormatter<'_>) -> String {
        let keys: Vec<String> = self.keys().iter().map(|&k| formatter(k)).collect();
        format!("f({})", keys.join(", "))
    }
}

/// Ordered collection of factor slots
#[derive(Debug)]
pub struct FactorGraph<F> {
    slots: Vec<FactorSlot<F>>,
}

impl<F> FactorGraph<F> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Create an empty graph with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Append a factor, returning its slot position
    pub fn push(&mut self, factor: F) -> usize {
        self.push_shared(Arc::new(factor))
    }

    /// Append an already-shared factor without copying it
    pub fn push_shared(&mut self, factor: Arc<F>) -> usize {
        self.push_slot(Some(factor))
    }

    /// Append a raw slot (possibly empty)
    pub fn push_slot(&mut self, slot: FactorSlot<F>) -> usize {
        self.slots.push(slot);
        self.slots.len() - 1
    }

    /// Empty the slot at `position`, returning the factor it held
    ///
    /// Positions of the other factors do not change.
    pub fn remove(&mut self, position: usize) -> FactorSlot<F> {
        self.slots.get_mut(position).and_then(Option::take)
    }

    /// Factor at `position`, if the slot exists and is occupied
    pub fn get(&self, position: usize) -> Option<&Arc<F>> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Raw slot at `position`
    pub fn slot(&self, position: usize) -> Option<&FactorSlot<F>> {
        self.slots.get(position)
    }

    /// Number of slots, including empty ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the graph has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots
    pub fn num_factors(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate over all slots in position order
    pub fn slots(&self) -> impl Iterator<Item = &FactorSlot<F>> {
        self.slots.iter()
    }

    /// Iterate over occupied slots in position order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<F>> {
        self.slots.iter().flatten()
    }
}

impl<F: Factor> FactorGraph<F> {
    /// Every variable referenced by an occupied slot, ascending
    pub fn keys(&self) -> BTreeSet<Key> {
        self.iter()
            .flat_map(|factor| factor.keys().iter().copied())
            .collect()
    }
}

impl<F> Default for FactorGraph<F> {
    fn default() -> Self {
        Self::new()
    }
}

// Cloning shares the factors; it never copies factor payloads.
impl<F> Clone for FactorGraph<F> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<F> FromIterator<F> for FactorGraph<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(|f| Some(Arc::new(f))).collect(),
        }
    }
}

impl<F> Extend<Arc<F>> for FactorGraph<F> {
    fn extend<I: IntoIterator<Item = Arc<F>>>(&mut self, iter: I) {
        self.slots.extend(iter.into_iter().map(Some));
    }
}
