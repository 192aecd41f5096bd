//! String accessors.

use crate::ast::dag::Dag;
use crate::ast::expr::{NodeId, NodeKind, StringOp, Typed};
use crate::error::{DfqlError, DfqlResult};
use crate::types::DataType;

impl Dag {
    pub fn str_op(&mut self, input: NodeId, op: StringOp) -> DfqlResult<NodeId> {
        let typed = self.typed_of(input)?.clone();
        if typed.dtype != DataType::String {
            return Err(DfqlError::cast(typed.dtype, DataType::String));
        }
        let dtype = match op {
            StringOp::Contains { .. } | StringOp::Endswith { .. } | StringOp::Startswith { .. } => {
                DataType::Boolean
            }
            StringOp::Count { .. } | StringOp::Find { .. } | StringOp::Len => DataType::Int64,
            _ => DataType::String,
        };
        let shape = self.value_shape(&[input], Typed::new(dtype, typed.name));
        Ok(self.push(NodeKind::Str { input, op }, shape))
    }

    /// Plain substring test.
    pub fn contains(&mut self, input: NodeId, pat: &str) -> DfqlResult<NodeId> {
        self.str_op(
            input,
            StringOp::Contains {
                pat: pat.to_string(),
                case: true,
                regex: false,
                flags: 0,
            },
        )
    }
}
