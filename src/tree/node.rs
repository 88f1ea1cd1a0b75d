//! Elimination tree node
//!
//! Nodes live in an arena owned by the forest and refer to their
//! children by [`NodeId`]. Factor handles are shared, never copied.

use crate::graph::{FactorSlot, Key};
use std::fmt;

/// Position of a node in its forest's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena position
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One eliminated variable
#[derive(Debug)]
pub struct Node<F> {
    /// Variable eliminated at this node
    pub(crate) key: Key,

    /// Factors whose earliest ordered variable is `key`
    pub(crate) factors: Vec<FactorSlot<F>>,

    /// Subtrees that must be eliminated before this node
    pub(crate) children: Vec<NodeId>,
}

impl<F> Node<F> {
    /// Create a node with no factors or children
    pub fn new(key: Key) -> Self {
        Self {
            key,
            factors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Variable eliminated here
    #[inline]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Factors first encountered at this variable
    pub fn factors(&self) -> &[FactorSlot<F>] {
        &self.factors
    }

    /// Child subtrees in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node has no children
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<F> Clone for Node<F> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            factors: self.factors.clone(),
            children: self.children.clone(),
        }
    }
}
