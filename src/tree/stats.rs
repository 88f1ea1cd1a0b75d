//! Forest shape summary

use super::traversal::{depth_first_forest, ChildOrder};
use super::EliminationForest;

/// Shape statistics of an elimination forest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct ForestStats {
    /// Number of nodes (ordered variables)
    pub nodes: usize,
    /// Number of roots (independent components)
    pub roots: usize,
    /// Longest root-to-leaf path, counted in nodes
    pub max_depth: usize,
    /// Largest number of children under one node
    pub max_children: usize,
    /// Occupied factor slots owned by nodes
    pub owned_factors: usize,
    /// Factors untouched by the ordering
    pub remaining_factors: usize,
}

impl ForestStats {
    /// Collect statistics for `forest`
    pub fn of<F>(forest: &EliminationForest<F>) -> Self {
        let mut stats = Self {
            nodes: forest.len(),
            roots: forest.roots().len(),
            remaining_factors: forest.remaining_factors().len(),
            ..Self::default()
        };

        depth_first_forest(
            forest,
            &0usize,
            ChildOrder::Stored,
            |_, node, parent_depth| {
                let depth = parent_depth + 1;
                stats.max_depth = stats.max_depth.max(depth);
                stats.max_children = stats.max_children.max(node.children().len());
                stats.owned_factors += node.factors().iter().flatten().count();
                depth
            },
            |_, _, _| {},
        );

        stats
    }

    /// Human-readable summary
    pub fn report(&self) -> String {
        format!(
            "Nodes: {}\nRoots: {}\nMax depth: {}\nMax children: {}\nFactors:\n  Owned: {}\n  Remaining: {}",
            self.nodes,
            self.roots,
            self.max_depth,
            self.max_children,
            self.owned_factors,
            self.remaining_factors
        )
    }
}

impl<F> EliminationForest<F> {
    /// Shape statistics; see [`ForestStats`]
    pub fn stats(&self) -> ForestStats {
        ForestStats::of(self)
    }
}
