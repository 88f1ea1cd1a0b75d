//! Elimination forest
//!
//! A forest of variables derived from factor sparsity: a child subtree
//! must be eliminated before its parent, because a shared factor links
//! them. Post-order over the forest is a valid elimination sequence.
//!
//! Representation: an arena of [`Node`]s addressed by [`NodeId`], the
//! ids of the roots, and the factors no ordered variable touches.

mod builder;
mod node;
mod stats;
pub mod traversal;

pub use builder::BuildError;
pub use node::{Node, NodeId};
pub use stats::ForestStats;
pub use traversal::ChildOrder;

use crate::graph::{default_formatter, Factor, Key};
use std::fmt;
use std::sync::Arc;

/// Roots, node arena and untouched factors of one elimination problem
#[derive(Debug)]
pub struct EliminationForest<F> {
    /// Node arena
    nodes: Vec<Node<F>>,

    /// Roots in ascending ordering position
    roots: Vec<NodeId>,

    /// Factors referencing none of the ordered variables
    remaining_factors: Vec<Arc<F>>,
}

impl<F> EliminationForest<F> {
    pub(crate) fn from_parts(
        nodes: Vec<Node<F>>,
        roots: Vec<NodeId>,
        remaining_factors: Vec<Arc<F>>,
    ) -> Self {
        Self {
            nodes,
            roots,
            remaining_factors,
        }
    }

    /// Create a forest with no nodes and no remaining factors
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), Vec::new())
    }

    /// Root nodes
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id
    ///
    /// Panics if `id` does not belong to this forest.
    pub fn node(&self, id: NodeId) -> &Node<F> {
        &self.nodes[id.0]
    }

    /// Node by id, if it belongs to this forest
    pub fn get(&self, id: NodeId) -> Option<&Node<F>> {
        self.nodes.get(id.0)
    }

    /// Iterate over every node with its id, in arena order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<F>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Id of the node eliminating `key`
    pub fn find(&self, key: Key) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.key == key)
            .map(NodeId)
    }

    /// Factors untouched by the ordering
    pub fn remaining_factors(&self) -> &[Arc<F>] {
        &self.remaining_factors
    }

    /// Number of nodes (ordered variables)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exchange contents with `other`
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<F: Factor> EliminationForest<F> {
    /// Structural equality up to `tol`; see [`traversal::equals`]
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        traversal::equals(self, other, tol)
    }

    /// Depth-first dump with children sorted by key
    pub fn render(&self, name: &str, formatter: crate::graph::KeyFormatter<'_>) -> String {
        traversal::render(self, name, formatter)
    }

    /// blake3 hash of the canonical render
    pub fn fingerprint(&self) -> blake3::Hash {
        blake3::hash(self.render("", &default_formatter).as_bytes())
    }
}

impl<F> Default for EliminationForest<F> {
    fn default() -> Self {
        Self::empty()
    }
}

// Deep copy of the tree structure; factor handles stay shared.
impl<F> Clone for EliminationForest<F> {
    fn clone(&self) -> Self {
        traversal::clone_forest(self)
    }
}

impl<F: Factor> fmt::Display for EliminationForest<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("", &default_formatter))
    }
}
