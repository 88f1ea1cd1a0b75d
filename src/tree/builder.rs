//! Forest construction
//!
//! Single pass over ordering positions ("columns") j = 0..n:
//!   - a factor not yet seen is owned by column j
//!   - a factor last seen at column k links the root of k's subtree under j
//!
//! This is the classical sparse-matrix elimination tree. `parents` is
//! only needed during the pass and is dropped afterwards.

use super::{EliminationForest, Node, NodeId};
use crate::graph::{Factor, FactorGraph, Key, Ordering, VariableIndex};
use bitvec::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors that abort forest construction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The ordering names a variable the factor graph does not involve
    #[error(
        "ordering contains variable {key} at position {position} that is not involved in the factor graph"
    )]
    InvalidOrdering {
        /// Offending key
        key: Key,
        /// Position in the ordering
        position: usize,
    },

    /// The ordering names the same variable twice
    #[error("ordering contains variable {key} twice (positions {first} and {second})")]
    DuplicateVariable {
        /// Repeated key
        key: Key,
        /// First position
        first: usize,
        /// Second position
        second: usize,
    },

    /// The variable index refers to a slot past the end of the graph
    #[error("variable {key} refers to factor {factor}, but the graph has {num_factors} slots")]
    FactorOutOfRange {
        /// Variable whose index entry is bad
        key: Key,
        /// Referenced slot
        factor: usize,
        /// Number of slots in the graph
        num_factors: usize,
    },
}

impl<F: Factor> EliminationForest<F> {
    /// Build the forest for `ordering` using a precomputed variable index
    pub fn build(
        graph: &FactorGraph<F>,
        structure: &VariableIndex,
        ordering: &Ordering,
    ) -> Result<Self, BuildError> {
        // Number of slots and ordered variables; n may be fewer than the
        // graph's variables when eliminating partially.
        let m = graph.len();
        let n = ordering.len();
        let _span = tracing::debug_span!("build_forest", factors = m, variables = n).entered();

        let mut nodes: Vec<Node<F>> = Vec::with_capacity(n);
        let mut parents: Vec<Option<usize>> = vec![None; n];
        let mut prev_col: Vec<Option<usize>> = vec![None; m];
        let mut factor_used = bitvec![0; m];
        let mut positions: HashMap<Key, usize> = HashMap::with_capacity(n);

        for (j, &key) in ordering.iter().enumerate() {
            if let Some(&first) = positions.get(&key) {
                return Err(BuildError::DuplicateVariable {
                    key,
                    first,
                    second: j,
                });
            }
            positions.insert(key, j);

            let factors = structure
                .try_factors(key)
                .map_err(|_| BuildError::InvalidOrdering { key, position: j })?;

            let mut node = Node::new(key);
            for &i in factors {
                let slot = graph.slot(i).ok_or(BuildError::FactorOutOfRange {
                    key,
                    factor: i,
                    num_factors: m,
                })?;

                match prev_col[i] {
                    Some(k) => {
                        // Variables eliminated earlier in this factor depend on
                        // the later ones: hang k's whole subtree under j.
                        let mut r = k;
                        while let Some(p) = parents[r] {
                            r = p;
                        }
                        if r != j {
                            parents[r] = Some(j);
                            node.children.push(NodeId(r));
                        }
                    }
                    None => {
                        node.factors.push(slot.clone());
                        factor_used.set(i, true);
                    }
                }
                prev_col[i] = Some(j);
            }
            nodes.push(node);
        }

        // Nothing comes after the last column, so nothing can adopt it.
        assert!(
            parents.last().map_or(true, Option::is_none),
            "elimination forest invariant violated: last ordered variable is not a root"
        );

        let roots: Vec<NodeId> = parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(j, _)| NodeId(j))
            .collect();

        let remaining_factors: Vec<_> = graph
            .slots()
            .enumerate()
            .filter(|(i, _)| !factor_used[*i])
            .filter_map(|(_, slot)| slot.clone())
            .collect();

        debug!(
            nodes = nodes.len(),
            roots = roots.len(),
            remaining = remaining_factors.len(),
            "built elimination forest"
        );

        Ok(Self::from_parts(nodes, roots, remaining_factors))
    }

    /// Build the forest, deriving a throwaway variable index from `graph`
    ///
    /// Callers eliminating the same graph repeatedly should keep a
    /// [`VariableIndex`] and call [`EliminationForest::build`].
    pub fn from_graph(graph: &FactorGraph<F>, ordering: &Ordering) -> Result<Self, BuildError> {
        let structure = VariableIndex::from_graph(graph);
        Self::build(graph, &structure, ordering)
    }
}
