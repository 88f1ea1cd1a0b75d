//! Symbolic elimination
//!
//! Factors carry only their keys. Eliminating a set of frontal keys from
//! a group of factors yields a conditional on the frontal keys given the
//! rest of the union, and a separator factor over that rest.

use crate::eliminate::EliminationPolicy;
use crate::graph::{Factor, Key, KeyFormatter};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by [`eliminate_symbolic`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolicError {
    /// No keys were requested for elimination
    #[error("no frontal keys requested for elimination")]
    NoFrontalKeys,

    /// A requested key does not appear in any gathered factor
    #[error("requested to eliminate variable {0}, which no gathered factor involves")]
    KeyNotInvolved(Key),
}

/// Factor that records only which variables it touches
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct SymbolicFactor {
    keys: Vec<Key>,
}

impl SymbolicFactor {
    /// Create a factor over `keys`, kept in the given order
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}

impl Factor for SymbolicFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn equals(&self, other: &Self, _tol: f64) -> bool {
        self.keys == other.keys
    }
}

/// P(frontals | parents) with only the structure recorded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct SymbolicConditional {
    frontals: Vec<Key>,
    parents: Vec<Key>,
}

impl SymbolicConditional {
    /// Create a conditional
    pub fn new(frontals: Vec<Key>, parents: Vec<Key>) -> Self {
        Self { frontals, parents }
    }

    /// Eliminated keys
    pub fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    /// Keys the frontals are conditioned on, ascending
    pub fn parents(&self) -> &[Key] {
        &self.parents
    }

    /// Frontals followed by parents
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.frontals.iter().chain(self.parents.iter()).copied()
    }

    /// Render as `P(x0 | x1 x2)`
    pub fn describe(&self, formatter: KeyFormatter<'_>) -> String {
        let join = |keys: &[Key]| {
            keys.iter()
                .map(|&k| formatter(k))
                .collect::<Vec<_>>()
                .join(" ")
        };
        if self.parents.is_empty() {
            format!("P({})", join(&self.frontals))
        } else {
            format!("P({} | {})", join(&self.frontals), join(&self.parents))
        }
    }
}

impl fmt::Display for SymbolicConditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(&crate::graph::default_formatter))
    }
}

/// Eliminate `keys` from `factors`
///
/// Parents are the union of all gathered keys minus the frontals, in
/// ascending order. No separator is produced when nothing remains.
pub fn eliminate_symbolic(
    factors: &[Arc<SymbolicFactor>],
    keys: &[Key],
) -> Result<(SymbolicConditional, Option<SymbolicFactor>), SymbolicError> {
    if keys.is_empty() {
        return Err(SymbolicError::NoFrontalKeys);
    }

    let mut union: BTreeSet<Key> = factors
        .iter()
        .flat_map(|factor| factor.keys().iter().copied())
        .collect();
    for &key in keys {
        if !union.remove(&key) {
            return Err(SymbolicError::KeyNotInvolved(key));
        }
    }

    let parents: Vec<Key> = union.into_iter().collect();
    let separator = (!parents.is_empty()).then(|| SymbolicFactor::new(parents.clone()));
    Ok((SymbolicConditional::new(keys.to_vec(), parents), separator))
}

/// [`EliminationPolicy`] running [`eliminate_symbolic`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicPolicy;

impl EliminationPolicy<SymbolicFactor> for SymbolicPolicy {
    type Conditional = SymbolicConditional;
    type Error = SymbolicError;

    fn eliminate(
        &self,
        factors: &[Arc<SymbolicFactor>],
        keys: &[Key],
    ) -> Result<(SymbolicConditional, Option<SymbolicFactor>), SymbolicError> {
        eliminate_symbolic(factors, keys)
    }
}
