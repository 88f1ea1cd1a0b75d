//! # Elimination trees for sparse factor graphs
//!
//! Given factors over named variables and a fixed elimination ordering,
//! this crate builds the elimination forest of the problem and eliminates
//! it with a caller-supplied policy, producing a Bayes net over the
//! ordered variables and the reduced factors over everything else.
//!
//! ## Core Algorithm
//!
//! 1. **Forest construction**: one pass over the ordering; a factor is
//!    owned by its earliest ordered variable, and a factor seen again hangs
//!    the previous subtree under the current variable
//! 2. **Tree elimination**: post-order walk; each node eliminates its own
//!    factors plus its children's separators
//! 3. **Result assembly**: conditionals in post-order, untouched factors
//!    followed by root separators
//!
//! Traversals use explicit stacks: forests as deep as the variable count
//! are fine.
//!
//! ## Usage Example
//!
//! ```
//! use elimtree::graph::{FactorGraph, Ordering};
//! use elimtree::symbolic::{SymbolicFactor, SymbolicPolicy};
//! use elimtree::EliminationForest;
//!
//! let graph: FactorGraph<SymbolicFactor> = vec![
//!     SymbolicFactor::new(vec![0, 1]),
//!     SymbolicFactor::new(vec![1, 2]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let forest = EliminationForest::from_graph(&graph, &Ordering::new(vec![0, 1, 2]))?;
//! let result = forest.eliminate(&SymbolicPolicy)?;
//! assert_eq!(result.bayes_net.len(), 3);
//! assert!(result.remaining.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules
pub mod graph;      // Factors, factor graphs, variable index, ordering
pub mod tree;       // Elimination forest and its traversals
pub mod eliminate;  // Tree-based elimination and Bayes nets
pub mod symbolic;   // Structure-only factors and elimination

// Re-exports for convenience
pub use eliminate::{policy_fn, BayesNet, EliminationPolicy, EliminationResult};
pub use graph::{Factor, FactorGraph, Key, Ordering, VariableIndex};
pub use tree::{BuildError, EliminationForest, ForestStats, Node, NodeId};

/// How the forest is traversed during elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Single-threaded post-order walk
    #[default]
    Sequential,

    /// Height-ordered waves on the rayon pool (feature `parallel`)
    Parallel,
}

/// Configuration parameters for elimination
#[derive(Debug, Clone)]
pub struct EliminationConfig {
    /// Traversal strategy
    pub strategy: Strategy,

    /// Forests with fewer nodes are eliminated sequentially regardless
    /// of `strategy`
    pub parallel_threshold: usize,
}

impl EliminationConfig {
    /// Default threshold below which parallel scheduling is not worth it
    pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

    /// Sequential elimination
    pub fn sequential() -> Self {
        Self {
            strategy: Strategy::Sequential,
            parallel_threshold: Self::DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Parallel elimination for forests above the threshold
    pub fn parallel() -> Self {
        Self {
            strategy: Strategy::Parallel,
            ..Self::sequential()
        }
    }

    /// Set the minimum forest size for parallel elimination
    pub fn with_parallel_threshold(mut self, nodes: usize) -> Self {
        self.parallel_threshold = nodes;
        self
    }

    /// Whether a forest of `nodes` nodes should be eliminated in parallel
    pub fn use_parallel(&self, nodes: usize) -> bool {
        self.strategy == Strategy::Parallel && nodes >= self.parallel_threshold
    }
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

/// Elimination orchestrator
///
/// Bundles a policy with its configuration so callers can eliminate many
/// forests the same way.
#[derive(Debug, Clone)]
pub struct Eliminator<P> {
    policy: P,
    config: EliminationConfig,
}

impl<P> Eliminator<P> {
    /// Create an eliminator for `policy`
    pub fn new(policy: P, config: EliminationConfig) -> Self {
        Self { policy, config }
    }

    /// Access the policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Access configuration
    pub fn config(&self) -> &EliminationConfig {
        &self.config
    }

    /// Mutable access to configuration (for tuning)
    pub fn config_mut(&mut self) -> &mut EliminationConfig {
        &mut self.config
    }

    /// Eliminate `forest` according to the configuration
    #[cfg(not(feature = "parallel"))]
    pub fn run<F>(
        &self,
        forest: &EliminationForest<F>,
    ) -> Result<EliminationResult<F, P::Conditional>, P::Error>
    where
        F: Factor,
        P: EliminationPolicy<F>,
    {
        if self.config.use_parallel(forest.len()) {
            tracing::warn!(
                nodes = forest.len(),
                "parallel elimination requested without the `parallel` feature; running sequentially"
            );
        }
        forest.eliminate(&self.policy)
    }

    /// Eliminate `forest` according to the configuration
    #[cfg(feature = "parallel")]
    pub fn run<F>(
        &self,
        forest: &EliminationForest<F>,
    ) -> Result<EliminationResult<F, P::Conditional>, P::Error>
    where
        F: Factor + Send + Sync,
        P: EliminationPolicy<F> + Sync,
        P::Conditional: Send,
        P::Error: Send,
    {
        if self.config.use_parallel(forest.len()) {
            forest.eliminate_parallel(&self.policy)
        } else {
            forest.eliminate(&self.policy)
        }
    }
}
