//! Variable index: for each variable, the factor slots that reference it
//!
//! Entries for a variable keep the order in which factors were indexed,
//! which is the order the forest builder visits them.

use super::{Factor, FactorGraph, Key};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by index lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The variable is not referenced by any indexed factor
    #[error("variable {0} is not present in the variable index")]
    UnknownVariable(Key),
}

/// Adjacency index from variable key to factor positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableIndex {
    index: BTreeMap<Key, Vec<usize>>,
    /// Number of factor slots covered (one past the highest indexed position)
    num_factors: usize,
    /// Total number of (variable, factor) entries
    num_entries: usize,
}

impl VariableIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every occupied slot of `graph`
    pub fn from_graph<F: Factor>(graph: &FactorGraph<F>) -> Self {
        let mut index = Self::new();
        index.augment(graph);
        index
    }

    /// Index slots appended to `graph` since the last call
    ///
    /// Slots below [`VariableIndex::num_factors`] are assumed indexed already,
    /// so one index can follow a graph that only grows.
    pub fn augment<F: Factor>(&mut self, graph: &FactorGraph<F>) {
        let start = self.num_factors;
        for (offset, slot) in graph.slots().enumerate().skip(start) {
            if let Some(factor) = slot {
                for &key in factor.keys() {
                    self.insert(key, offset);
                }
            }
        }
        self.num_factors = self.num_factors.max(graph.len());
    }

    /// Record that `factor` references `key`
    pub fn insert(&mut self, key: Key, factor: usize) {
        self.index.entry(key).or_default().push(factor);
        self.num_factors = self.num_factors.max(factor + 1);
        self.num_entries += 1;
    }

    /// Factor positions referencing `key`
    pub fn try_factors(&self, key: Key) -> Result<&[usize], IndexError> {
        self.factors(key).ok_or(IndexError::UnknownVariable(key))
    }

    /// Factor positions referencing `key`, if indexed
    pub fn factors(&self, key: Key) -> Option<&[usize]> {
        self.index.get(&key).map(Vec::as_slice)
    }

    /// Whether `key` is indexed
    pub fn contains(&self, key: Key) -> bool {
        self.index.contains_key(&key)
    }

    /// Indexed variables, ascending
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.index.keys().copied()
    }

    /// Number of indexed variables
    pub fn num_variables(&self) -> usize {
        self.index.len()
    }

    /// Number of factor slots covered
    pub fn num_factors(&self) -> usize {
        self.num_factors
    }

    /// Total number of (variable, factor) entries
    pub fn num_entries(&self) -> usize {
        self.num_entries
    }
}
