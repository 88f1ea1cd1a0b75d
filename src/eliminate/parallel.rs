//! Parallel elimination of independent subtrees
//!
//! Nodes are grouped into waves by subtree height (leaves = 0). Every
//! child sits in an earlier wave than its parent, so a wave only reads
//! separators that are already final and its nodes can run on rayon
//! concurrently.
//!
//! ## Determinism
//!
//! Gathered factors are assembled in child order from a per-node slot
//! table, and the Bayes net is emitted in the same post-order as the
//! sequential eliminator, so both produce identical output.

use rayon::prelude::*;

use super::{gather, BayesNet, EliminationPolicy, EliminationResult};
use crate::graph::{Factor, FactorSlot};
use crate::tree::{traversal, EliminationForest, NodeId};
use std::sync::Arc;
use tracing::debug;

impl<F> EliminationForest<F>
where
    F: Factor + Send + Sync,
{
    /// Eliminate the forest wave by wave on the rayon thread pool
    ///
    /// Produces the same result as [`EliminationForest::eliminate`]. If
    /// several nodes of one wave fail, one of their errors is returned.
    pub fn eliminate_parallel<P>(
        &self,
        policy: &P,
    ) -> Result<EliminationResult<F, P::Conditional>, P::Error>
    where
        P: EliminationPolicy<F> + Sync,
        P::Conditional: Send,
        P::Error: Send,
    {
        let _span = tracing::debug_span!(
            "eliminate_forest_parallel",
            nodes = self.len(),
            roots = self.roots().len()
        )
        .entered();

        let order = traversal::post_order(self);
        let waves = self.waves(&order);
        debug!(waves = waves.len(), "scheduled elimination waves");

        let mut separators: Vec<FactorSlot<F>> = vec![None; self.len()];
        let mut conditionals: Vec<Option<P::Conditional>> =
            std::iter::repeat_with(|| None).take(self.len()).collect();

        for wave in &waves {
            let results = wave
                .par_iter()
                .map(|&id| {
                    let node = self.node(id);
                    let gathered = gather(node, |child| separators[child.index()].clone());
                    policy
                        .eliminate(&gathered, &[node.key()])
                        .map(|(conditional, separator)| (id, conditional, separator.map(Arc::new)))
                })
                .collect::<Result<Vec<_>, _>>()?;

            for (id, conditional, separator) in results {
                for &child in self.node(id).children() {
                    separators[child.index()] = None;
                }
                conditionals[id.index()] = Some(conditional);
                separators[id.index()] = separator;
            }
        }

        let bayes_net: BayesNet<P::Conditional> = order
            .iter()
            .filter_map(|id| conditionals[id.index()].take())
            .collect();
        let remaining = self.assemble_remaining(&mut separators);
        debug!(
            conditionals = bayes_net.len(),
            remaining = remaining.len(),
            "eliminated forest"
        );
        Ok(EliminationResult {
            bayes_net,
            remaining,
        })
    }

    /// Node ids grouped by subtree height, lowest first
    fn waves(&self, post_order: &[NodeId]) -> Vec<Vec<NodeId>> {
        let mut height = vec![0usize; self.len()];
        let mut waves: Vec<Vec<NodeId>> = Vec::new();

        for &id in post_order {
            let h = self
                .node(id)
                .children()
                .iter()
                .map(|child| height[child.index()] + 1)
                .max()
                .unwrap_or(0);
            height[id.index()] = h;
            if waves.len() <= h {
                waves.resize_with(h + 1, Vec::new);
            }
            waves[h].push(id);
        }
        waves
    }
}
