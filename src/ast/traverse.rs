//! Depth-first traversal over the DAG.

use crate::ast::dag::Dag;
use crate::ast::expr::NodeId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Parents before children.
    TopDown,
    /// Children before parents.
    BottomUp,
}

/// Lazy depth-first walk.
///
/// In top-down order a yielded node's children are expanded on the next call
/// to `next()`, so [`Traversal::prune`] and [`Traversal::hide`] issued right
/// after a node is yielded affect the rest of the walk.
pub struct Traversal<'a> {
    dag: &'a Dag,
    order: Order,
    unique: bool,
    stack: Vec<(NodeId, bool)>,
    seen: HashSet<NodeId>,
    pruned: HashSet<NodeId>,
    hidden: HashSet<(NodeId, NodeId)>,
    pending: Option<NodeId>,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(dag: &'a Dag, root: NodeId, order: Order, unique: bool) -> Self {
        Self {
            dag,
            order,
            unique,
            stack: vec![(root, false)],
            seen: HashSet::new(),
            pruned: HashSet::new(),
            hidden: HashSet::new(),
            pending: None,
        }
    }

    /// Do not descend into the children of `id`.
    pub fn prune(&mut self, id: NodeId) {
        self.pruned.insert(id);
    }

    /// Skip the edge `parent -> child`.
    pub fn hide(&mut self, parent: NodeId, child: NodeId) {
        self.hidden.insert((parent, child));
    }

    fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        if self.pruned.contains(&id) {
            return Vec::new();
        }
        self.dag
            .children(id)
            .into_iter()
            .filter(|c| !self.hidden.contains(&(id, *c)))
            .collect()
    }

    fn next_top_down(&mut self) -> Option<NodeId> {
        if let Some(last) = self.pending.take() {
            for child in self.visible_children(last).into_iter().rev() {
                self.stack.push((child, false));
            }
        }
        while let Some((id, _)) = self.stack.pop() {
            if self.unique && !self.seen.insert(id) {
                continue;
            }
            self.pending = Some(id);
            return Some(id);
        }
        None
    }

    fn next_bottom_up(&mut self) -> Option<NodeId> {
        while let Some((id, expanded)) = self.stack.pop() {
            if expanded {
                return Some(id);
            }
            if self.unique && !self.seen.insert(id) {
                continue;
            }
            self.stack.push((id, true));
            for child in self.visible_children(id).into_iter().rev() {
                if !(self.unique && self.seen.contains(&child)) {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

impl Iterator for Traversal<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self.order {
            Order::TopDown => self.next_top_down(),
            Order::BottomUp => self.next_bottom_up(),
        }
    }
}

impl Dag {
    pub fn traverse(&self, root: NodeId, order: Order, unique: bool) -> Traversal<'_> {
        Traversal::new(self, root, order, unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::types::{DataType, Schema};

    /// `(a + b) * (a + b)` over one source, returning (dag, source, a, sum, product).
    fn diamond() -> (Dag, NodeId, NodeId, NodeId, NodeId) {
        let mut dag = Dag::new();
        let schema =
            Schema::from_pairs([("a", DataType::Int64), ("b", DataType::Int64)]).unwrap();
        let t = dag.source("p", "t", schema);
        let a = dag.column(t, "a").unwrap();
        let b = dag.column(t, "b").unwrap();
        let sum = dag.binary(BinaryOp::Add, a, b).unwrap();
        let product = dag.binary(BinaryOp::Mul, sum, sum).unwrap();
        (dag, t, a, sum, product)
    }

    #[test]
    fn test_bottom_up_unique_visits_children_first() {
        let (dag, t, a, sum, product) = diamond();
        let order: Vec<_> = dag.traverse(product, Order::BottomUp, true).collect();
        assert_eq!(order.len(), 5);
        assert_eq!(order.last(), Some(&product));
        let pos = |id| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(t) < pos(a));
        assert!(pos(a) < pos(sum));
    }

    #[test]
    fn test_non_unique_repeats_shared_nodes() {
        let (dag, _, _, sum, product) = diamond();
        let order: Vec<_> = dag.traverse(product, Order::TopDown, false).collect();
        assert_eq!(order.iter().filter(|id| **id == sum).count(), 2);
    }

    #[test]
    fn test_prune_skips_children() {
        let (dag, t, _, sum, product) = diamond();
        let mut walk = dag.traverse(product, Order::TopDown, true);
        assert_eq!(walk.next(), Some(product));
        assert_eq!(walk.next(), Some(sum));
        walk.prune(sum);
        let rest: Vec<_> = walk.collect();
        assert!(rest.is_empty());
        assert!(dag.traverse(product, Order::TopDown, true).any(|id| id == t));
    }

    #[test]
    fn test_hide_edge() {
        let (dag, _, a, sum, product) = diamond();
        let mut walk = dag.traverse(product, Order::TopDown, true);
        walk.hide(sum, a);
        let order: Vec<_> = walk.collect();
        assert!(!order.contains(&a));
        assert!(order.contains(&sum));
    }
}
