//! Append-only node arena.

use crate::ast::expr::{Node, NodeId, NodeKind, Shape, Udf, UdfId};
use crate::error::{DfqlError, DfqlResult};
use serde::{Deserialize, Serialize};

/// Expression DAG. A node only refers to nodes appended before it, so the
/// graph is acyclic by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dag {
    nodes: Vec<Node>,
    #[serde(default)]
    udfs: Vec<Udf>,
}

/// A DAG with the collection (or value) to compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub dag: Dag,
    pub root: NodeId,
}

impl Plan {
    pub fn from_json(json: &str) -> DfqlResult<Self> {
        let plan: Plan = serde_json::from_str(json)
            .map_err(|e| DfqlError::schema(format!("invalid plan: {}", e)))?;
        plan.dag.validate()?;
        plan.dag.get(plan.root)?;
        Ok(plan)
    }

    pub fn to_json(&self) -> DfqlResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DfqlError::inconsistent(e.to_string()))
    }
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, kind: NodeKind, shape: Shape) -> NodeId {
        self.nodes.push(Node { kind, shape });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn push_udf(&mut self, udf: Udf) -> UdfId {
        if let Some(pos) = self.udfs.iter().position(|u| *u == udf) {
            return UdfId(pos);
        }
        self.udfs.push(udf);
        UdfId(self.udfs.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> DfqlResult<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| DfqlError::inconsistent(format!("node {} does not exist", id)))
    }

    pub fn udf(&self, id: UdfId) -> DfqlResult<&Udf> {
        self.udfs
            .get(id.0)
            .ok_or_else(|| DfqlError::inconsistent(format!("udf {} does not exist", id.0)))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Child ids in slot order. Unknown ids have no children.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| n.kind.args().into_iter().map(|(_, c)| c).collect())
            .unwrap_or_default()
    }

    pub fn is_collection(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(Node::is_collection)
    }

    /// First collection a value expression reads from.
    pub fn owning_collection(&self, id: NodeId) -> DfqlResult<NodeId> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.get(current)?;
            if node.is_collection() {
                return Ok(current);
            }
            for child in self.children(current).into_iter().rev() {
                stack.push(child);
            }
        }
        Err(DfqlError::inconsistent(format!(
            "expression {} does not read from any collection",
            id
        )))
    }

    /// Re-check structural invariants of a deserialized DAG.
    pub fn validate(&self) -> DfqlResult<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            for (slot, child) in node.kind.args() {
                if child.0 >= index {
                    return Err(DfqlError::inconsistent(format!(
                        "node #{} refers to #{} in slot '{}' (children must precede parents)",
                        index, child.0, slot
                    )));
                }
            }
            match (&node.kind, &node.shape) {
                (NodeKind::Source { table }, Shape::Collection { schema }) => {
                    table.schema.validate()?;
                    schema.validate()?;
                }
                (_, Shape::Collection { schema }) => schema.validate()?,
                (NodeKind::UserMap { udf, .. }, _) => {
                    self.udf(*udf)?;
                }
                _ => {}
            }
            if matches!(node.kind, NodeKind::Column { .. }) {
                let Some(typed) = node.typed() else {
                    return Err(DfqlError::inconsistent(format!(
                        "column #{} has no value shape",
                        index
                    )));
                };
                if typed.source_name.is_none() {
                    return Err(DfqlError::schema(format!("column #{} has no field name", index)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::Typed;
    use crate::types::DataType;

    #[test]
    fn test_validate_rejects_forward_references() {
        let mut dag = Dag::new();
        dag.push(
            NodeKind::Cast { input: NodeId(1) },
            Shape::Scalar(Typed::new(DataType::Int64, None)),
        );
        dag.push(
            NodeKind::Literal { value: 1.into() },
            Shape::Scalar(Typed::new(DataType::Int64, None)),
        );
        assert!(matches!(
            dag.validate(),
            Err(DfqlError::InternalInconsistency(_))
        ));
    }

    #[test]
    fn test_missing_node() {
        let dag = Dag::new();
        assert!(dag.get(NodeId(3)).is_err());
        assert!(dag.children(NodeId(3)).is_empty());
    }
}
