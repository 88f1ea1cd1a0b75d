//! Explicit-stack forest traversal
//!
//! Forest depth grows with problem size, so nothing here recurses.
//! Auxiliary memory is one stack entry per pending node.
//!
//! Built on the traversal:
//!   - [`clone_forest`]: deep copy of structure, factor handles shared
//!   - [`render`]: deterministic dump with children sorted by key
//!   - [`equals`]: structural equality, key-sorted on both sides

use super::{EliminationForest, Node, NodeId};
use crate::graph::{Factor, KeyFormatter};

/// Order in which siblings are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrder {
    /// Order children were attached during construction
    #[default]
    Stored,

    /// Ascending variable key
    ByKey,
}

/// Pending or expanded stack entry
///
/// `data` is `None` until the pre-visitor has run for the node.
struct Frame<D> {
    id: NodeId,
    parent: Option<usize>,
    data: Option<D>,
}

/// Depth-first traversal of every tree in the forest
///
/// `pre` runs when a node is first reached and receives its parent's data
/// (`root_data` for roots); its return value is handed to the node's
/// children and finally to `post`, which runs once the whole subtree is done.
pub fn depth_first_forest<F, D, Pre, Post>(
    forest: &EliminationForest<F>,
    root_data: &D,
    order: ChildOrder,
    mut pre: Pre,
    mut post: Post,
) where
    Pre: FnMut(NodeId, &Node<F>, &D) -> D,
    Post: FnMut(NodeId, &Node<F>, D),
{
    let mut stack: Vec<Frame<D>> = Vec::new();
    for &root in ordered(forest, forest.roots(), order).iter().rev() {
        stack.push(Frame {
            id: root,
            parent: None,
            data: None,
        });
    }

    while let Some(frame) = stack.pop() {
        let node = forest.node(frame.id);
        match frame.data {
            Some(data) => post(frame.id, node, data),
            None => {
                let parent_data = frame
                    .parent
                    .and_then(|p| stack.get(p))
                    .and_then(|f| f.data.as_ref())
                    .unwrap_or(root_data);
                let data = pre(frame.id, node, parent_data);

                let position = stack.len();
                stack.push(Frame {
                    id: frame.id,
                    parent: frame.parent,
                    data: Some(data),
                });
                for &child in ordered(forest, node.children(), order).iter().rev() {
                    stack.push(Frame {
                        id: child,
                        parent: Some(position),
                        data: None,
                    });
                }
            }
        }
    }
}

/// Nodes in post-order: children (in stored order) before parents,
/// roots in stored order
pub fn post_order<F>(forest: &EliminationForest<F>) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(forest.len());
    let mut stack: Vec<(NodeId, bool)> = forest.roots().iter().rev().map(|&r| (r, false)).collect();

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        stack.push((id, true));
        for &child in forest.node(id).children().iter().rev() {
            stack.push((child, false));
        }
    }
    order
}

/// Copy the tree structure into a fresh, compact arena
///
/// Children keep their stored order; factor handles are shared with
/// `forest`, as is the remaining-factor list.
pub fn clone_forest<F>(forest: &EliminationForest<F>) -> EliminationForest<F> {
    let mut nodes: Vec<Node<F>> = Vec::with_capacity(forest.len());
    let mut roots = Vec::with_capacity(forest.roots().len());

    depth_first_forest(
        forest,
        &None,
        ChildOrder::Stored,
        |_, node, parent: &Option<NodeId>| {
            let id = NodeId(nodes.len());
            nodes.push(Node {
                key: node.key,
                factors: node.factors.clone(),
                children: Vec::with_capacity(node.children.len()),
            });
            match parent {
                Some(p) => nodes[p.0].children.push(id),
                None => roots.push(id),
            }
            Some(id)
        },
        |_, _, _| {},
    );

    EliminationForest::from_parts(nodes, roots, forest.remaining_factors().to_vec())
}

/// Dump keys and owned factors, children sorted by key
///
/// Each node prints as `<prefix>-(<key>)` followed by one `| ` line per
/// factor; deeper levels add `| ` to the prefix.
pub fn render<F: Factor>(
    forest: &EliminationForest<F>,
    name: &str,
    formatter: KeyFormatter<'_>,
) -> String {
    let mut out = String::new();
    depth_first_forest(
        forest,
        &name.to_string(),
        ChildOrder::ByKey,
        |_, node, parent: &String| {
            let prefix = format!("{parent}-");
            out.push_str(&format!("{prefix}({})\n", formatter(node.key())));
            if node.factors().is_empty() {
                out.push_str(&format!("{prefix}| (no factors)\n"));
            }
            for slot in node.factors() {
                match slot {
                    Some(factor) => {
                        out.push_str(&format!("{prefix}| {}\n", factor.describe(formatter)))
                    }
                    None => out.push_str(&format!("{prefix}| null factor\n")),
                }
            }
            format!("{parent}| ")
        },
        |_, _, _| {},
    );
    out
}

/// Structural equality of two forests
///
/// Both forests are walked in lockstep with roots and children sorted by
/// key. Visited nodes must agree on key, factor count and each factor pair
/// (both empty, or equal within `tol`). A leftover entry on either stack
/// means the node counts differ.
pub fn equals<F: Factor>(a: &EliminationForest<F>, b: &EliminationForest<F>, tol: f64) -> bool {
    let mut stack_a = ordered(a, a.roots(), ChildOrder::ByKey);
    let mut stack_b = ordered(b, b.roots(), ChildOrder::ByKey);

    while !stack_a.is_empty() && !stack_b.is_empty() {
        let (Some(id_a), Some(id_b)) = (stack_a.pop(), stack_b.pop()) else {
            break;
        };
        let (node_a, node_b) = (a.node(id_a), b.node(id_b));

        if node_a.key() != node_b.key() || node_a.factors().len() != node_b.factors().len() {
            return false;
        }
        let factors_match = node_a
            .factors()
            .iter()
            .zip(node_b.factors())
            .all(|pair| match pair {
                (Some(fa), Some(fb)) => fa.equals(fb, tol),
                (None, None) => true,
                _ => false,
            });
        if !factors_match {
            return false;
        }

        stack_a.extend(ordered(a, node_a.children(), ChildOrder::ByKey));
        stack_b.extend(ordered(b, node_b.children(), ChildOrder::ByKey));
    }

    stack_a.is_empty() && stack_b.is_empty()
}

fn ordered<F>(forest: &EliminationForest<F>, ids: &[NodeId], order: ChildOrder) -> Vec<NodeId> {
    let mut ids = ids.to_vec();
    if order == ChildOrder::ByKey {
        ids.sort_by_key(|&id| forest.node(id).key());
    }
    ids
}
