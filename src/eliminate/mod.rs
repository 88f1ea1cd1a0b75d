//! Tree-based elimination
//!
//! Post-order walk of the forest. At each node the owned factors and the
//! separators of its children (in child order) are handed to the caller's
//! [`EliminationPolicy`]; the conditional goes to the Bayes net and the
//! separator moves up to the parent. Root separators join the factors the
//! ordering never touched.

mod bayes_net;
#[cfg(feature = "parallel")]
mod parallel;

pub use bayes_net::BayesNet;

use crate::graph::{Factor, FactorGraph, FactorSlot, Key};
use crate::tree::{traversal, EliminationForest, Node};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

/// Caller-supplied elimination of one variable
///
/// Treated as a pure function: its only effect is the returned value.
/// Errors are returned to the caller of the eliminator unchanged.
pub trait EliminationPolicy<F> {
    /// Conditional produced for the eliminated key
    type Conditional;
    /// Failure reported by the policy (e.g. a singular system)
    type Error;

    /// Eliminate `keys` (one key for tree elimination) from `factors`,
    /// returning the conditional and the separator over what remains
    fn eliminate(
        &self,
        factors: &[Arc<F>],
        keys: &[Key],
    ) -> Result<(Self::Conditional, Option<F>), Self::Error>;
}

/// Adapter turning a closure into an [`EliminationPolicy`]
pub struct PolicyFn<Func, C, E> {
    function: Func,
    _marker: PhantomData<fn() -> (C, E)>,
}

/// Wrap a closure as an [`EliminationPolicy`]
pub fn policy_fn<F, C, E, Func>(function: Func) -> PolicyFn<Func, C, E>
where
    Func: Fn(&[Arc<F>], &[Key]) -> Result<(C, Option<F>), E>,
{
    PolicyFn {
        function,
        _marker: PhantomData,
    }
}

impl<F, C, E, Func> EliminationPolicy<F> for PolicyFn<Func, C, E>
where
    Func: Fn(&[Arc<F>], &[Key]) -> Result<(C, Option<F>), E>,
{
    type Conditional = C;
    type Error = E;

    fn eliminate(&self, factors: &[Arc<F>], keys: &[Key]) -> Result<(C, Option<F>), E> {
        (self.function)(factors, keys)
    }
}

impl<Func, C, E> fmt::Debug for PolicyFn<Func, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyFn").finish_non_exhaustive()
    }
}

/// Output of eliminating a forest
#[derive(Debug)]
pub struct EliminationResult<F, C> {
    /// Conditionals in post-order
    pub bayes_net: BayesNet<C>,
    /// Untouched factors followed by root separators
    pub remaining: FactorGraph<F>,
}

impl<F: Factor> EliminationForest<F> {
    /// Eliminate every node, children before parents
    ///
    /// The forest is not modified. The first policy error aborts the
    /// whole elimination and is returned as-is.
    pub fn eliminate<P>(&self, policy: &P) -> Result<EliminationResult<F, P::Conditional>, P::Error>
    where
        P: EliminationPolicy<F>,
    {
        let _span = tracing::debug_span!(
            "eliminate_forest",
            nodes = self.len(),
            roots = self.roots().len()
        )
        .entered();

        let order = traversal::post_order(self);
        let mut separators: Vec<FactorSlot<F>> = vec![None; self.len()];
        let mut bayes_net = BayesNet::with_capacity(order.len());

        for id in order {
            let node = self.node(id);
            let gathered = gather(node, |child| separators[child.index()].take());

            let (conditional, separator) = policy.eliminate(&gathered, &[node.key()])?;
            trace!(
                key = node.key(),
                gathered = gathered.len(),
                separator = separator.is_some(),
                "eliminated variable"
            );

            bayes_net.push(conditional);
            separators[id.index()] = separator.map(Arc::new);
        }

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

    /// Untouched factors first, then root separators in root order
    pub(crate) fn assemble_remaining(&self, separators: &mut [FactorSlot<F>]) -> FactorGraph<F> {
        let mut remaining = FactorGraph::with_capacity(self.remaining_factors().len() + self.roots().len());
        remaining.extend(self.remaining_factors().iter().cloned());
        remaining.extend(
            self.roots()
                .iter()
                .filter_map(|root| separators[root.index()].take()),
        );
        remaining
    }
}

/// Owned factors (empty slots skipped) followed by child separators
pub(crate) fn gather<F>(
    node: &Node<F>,
    mut separator_of: impl FnMut(crate::tree::NodeId) -> FactorSlot<F>,
) -> Vec<Arc<F>> {
    let mut gathered = Vec::with_capacity(node.factors().len() + node.children().len());
    gathered.extend(node.factors().iter().flatten().cloned());
    gathered.extend(node.children().iter().filter_map(|&child| separator_of(child)));
    gathered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Ordering;
    use crate::symbolic::{SymbolicConditional, SymbolicFactor, SymbolicPolicy};
    use std::cell::RefCell;

    fn graph(factors: &[&[Key]]) -> FactorGraph<SymbolicFactor> {
        factors
            .iter()
            .map(|keys| SymbolicFactor::new(keys.to_vec()))
            .collect()
    }

    #[test]
    fn test_chain_bayes_net_order() {
        let g = graph(&[&[0, 1], &[1, 2], &[0]]);
        let forest = EliminationForest::from_graph(&g, &Ordering::new(vec![0, 1, 2]))
            .expect("forest builds");
        let result = forest.eliminate(&SymbolicPolicy).expect("eliminates");

        let expected = vec![
            SymbolicConditional::new(vec![0], vec![1]),
            SymbolicConditional::new(vec![1], vec![2]),
            SymbolicConditional::new(vec![2], vec![]),
        ];
        assert_eq!(result.bayes_net.as_slice(), expected.as_slice());
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn test_gathered_factors_are_owned_then_children_in_order() {
        // Root 3 owns {3, 2} and has children 0 and 1 in stored order.
        let g = graph(&[&[0, 3], &[1, 3], &[3, 2]]);
        let forest = EliminationForest::from_graph(&g, &Ordering::new(vec![0, 1, 3]))
            .expect("forest builds");

        let seen: RefCell<Vec<(Key, Vec<Vec<Key>>)>> = RefCell::new(Vec::new());
        let policy = policy_fn(|factors: &[Arc<SymbolicFactor>], keys: &[Key]| {
            seen.borrow_mut().push((
                keys[0],
                factors.iter().map(|f| f.keys().to_vec()).collect(),
            ));
            crate::symbolic::eliminate_symbolic(factors, keys)
        });
        let result = forest.eliminate(&policy).expect("eliminates");

        let seen = seen.take();
        assert_eq!(seen[2].0, 3);
        assert_eq!(seen[2].1, vec![vec![3, 2], vec![3], vec![3]]);
        // Partial elimination: the separator on {2} is handed back.
        let remaining: Vec<Vec<Key>> = result.remaining.iter().map(|f| f.keys().to_vec()).collect();
        assert_eq!(remaining, vec![vec![2]]);
    }

    #[test]
    fn test_remaining_lists_untouched_factors_first() {
        let g = graph(&[&[0, 1], &[5, 6]]);
        let forest = EliminationForest::from_graph(&g, &Ordering::new(vec![0]))
            .expect("forest builds");
        let result = forest.eliminate(&SymbolicPolicy).expect("eliminates");

        let remaining: Vec<Vec<Key>> = result.remaining.iter().map(|f| f.keys().to_vec()).collect();
        assert_eq!(remaining, vec![vec![5, 6], vec![1]]);
    }

    #[test]
    fn test_policy_error_is_returned_unchanged() {
        #[derive(Debug, PartialEq)]
        struct Singular(Key);

        let g = graph(&[&[0, 1], &[1, 2]]);
        let forest = EliminationForest::from_graph(&g, &Ordering::new(vec![0, 1, 2]))
            .expect("forest builds");
        let calls = RefCell::new(0);
        let policy = policy_fn(|factors: &[Arc<SymbolicFactor>], keys: &[Key]| {
            *calls.borrow_mut() += 1;
            if keys[0] == 1 {
                return Err(Singular(1));
            }
            crate::symbolic::eliminate_symbolic(factors, keys).map_err(|_| Singular(keys[0]))
        });

        let err = forest.eliminate(&policy).expect_err("variable 1 is singular");
        assert_eq!(err, Singular(1));
        assert_eq!(*calls.borrow(), 2, "elimination stops at the first failure");
    }

    #[test]
    fn test_empty_forest_returns_all_factors() {
        let g = graph(&[&[0, 1], &[2]]);
        let forest = EliminationForest::from_graph(&g, &Ordering::default())
            .expect("forest builds");
        let result = forest.eliminate(&SymbolicPolicy).expect("eliminates");

        assert!(result.bayes_net.is_empty());
        assert_eq!(result.remaining.len(), 2);
    }
}
