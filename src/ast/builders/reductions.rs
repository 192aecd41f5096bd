//! Aggregate builders.

use crate::ast::dag::Dag;
use crate::ast::expr::{NodeId, NodeKind, Shape, Typed};
use crate::ast::operators::ReductionFunc;
use crate::error::{DfqlError, DfqlResult};
use crate::types::DataType;

impl Dag {
    /// Aggregate with the default `ddof` of 0.
    pub fn reduce(&mut self, func: ReductionFunc, input: NodeId) -> DfqlResult<NodeId> {
        self.reduce_ddof(func, input, 0)
    }

    /// Aggregate with an explicit delta degrees of freedom for `var`/`std`.
    pub fn reduce_ddof(&mut self, func: ReductionFunc, input: NodeId, ddof: i64) -> DfqlResult<NodeId> {
        let node = self.get(input)?;
        if node.is_collection() {
            if func != ReductionFunc::Count {
                return Err(DfqlError::unsupported(format!(
                    "{} over a whole collection",
                    func.name()
                )));
            }
            let typed = Typed::new(DataType::Int64, Some("count".to_string()));
            return Ok(self.push(NodeKind::Reduction { func, input, ddof }, Shape::Scalar(typed)));
        }

        let input_type = self.dtype_of(input)?;
        let numeric = input_type.is_number() || input_type == DataType::Boolean;
        let dtype = match func {
            ReductionFunc::Count | ReductionFunc::NUnique => DataType::Int64,
            ReductionFunc::Any | ReductionFunc::All => {
                self.expect_boolean(input)?;
                DataType::Boolean
            }
            ReductionFunc::Max | ReductionFunc::Min => input_type,
            ReductionFunc::Sum => match input_type {
                DataType::Boolean => DataType::Int64,
                DataType::String => DataType::String,
                t if t.is_number() => t,
                t => return Err(DfqlError::cast(t, DataType::Float64)),
            },
            ReductionFunc::Mean | ReductionFunc::Median | ReductionFunc::Var | ReductionFunc::Std => {
                if !numeric {
                    return Err(DfqlError::cast(input_type, DataType::Float64));
                }
                if input_type == DataType::Decimal {
                    DataType::Decimal
                } else {
                    DataType::Float64
                }
            }
        };
        let name = self.first_name(&[input]);
        Ok(self.push(
            NodeKind::Reduction { func, input, ddof },
            Shape::Scalar(Typed::new(dtype, name)),
        ))
    }
}
