//! Window builders.

use crate::ast::dag::Dag;
use crate::ast::expr::{NodeId, NodeKind, Shape, Typed, WindowOp, WindowSpec};
use crate::ast::operators::{CumulativeFunc, RankFunc, ShiftFunc};
use crate::ast::values::Value;
use crate::error::{DfqlError, DfqlResult};
use crate::types::{DataType, highest_precedence};

impl Dag {
    fn check_window_spec(&self, spec: &WindowSpec) -> DfqlResult<()> {
        for id in &spec.partition_by {
            self.typed_of(*id)?;
        }
        for key in &spec.order_by {
            self.typed_of(key.expr)?;
        }
        Ok(())
    }

    fn push_window(&mut self, op: WindowOp, typed: Typed) -> NodeId {
        self.push(NodeKind::Window(op), Shape::Sequence(typed))
    }

    pub fn cumulative(
        &mut self,
        func: CumulativeFunc,
        input: NodeId,
        spec: WindowSpec,
        distinct: bool,
    ) -> DfqlResult<NodeId> {
        self.check_window_spec(&spec)?;
        let typed = self.typed_of(input)?.clone();
        let numeric = typed.dtype.is_number() || typed.dtype == DataType::Boolean;
        let dtype = match func {
            CumulativeFunc::Count => DataType::Int64,
            CumulativeFunc::Max | CumulativeFunc::Min => typed.dtype,
            CumulativeFunc::Sum if typed.dtype == DataType::Boolean => DataType::Int64,
            CumulativeFunc::Sum if numeric => typed.dtype,
            CumulativeFunc::Mean | CumulativeFunc::Median | CumulativeFunc::Std if numeric => {
                if typed.dtype == DataType::Decimal {
                    DataType::Decimal
                } else {
                    DataType::Float64
                }
            }
            _ => return Err(DfqlError::cast(typed.dtype, DataType::Float64)),
        };
        let op = WindowOp::Cumulative {
            func,
            input,
            distinct,
            spec,
        };
        Ok(self.push_window(op, Typed::new(dtype, typed.name)))
    }

    pub fn rank(&mut self, func: RankFunc, spec: WindowSpec) -> DfqlResult<NodeId> {
        self.check_window_spec(&spec)?;
        if spec.order_by.is_empty() && func != RankFunc::RowNumber {
            return Err(DfqlError::inconsistent(format!(
                "{} needs at least one order key",
                func.name()
            )));
        }
        let dtype = match func {
            RankFunc::PercentRank => DataType::Float64,
            _ => DataType::Int64,
        };
        let typed = Typed::new(dtype, Some(func.name().to_string()));
        Ok(self.push_window(WindowOp::Rank { func, spec }, typed))
    }

    /// `LAG`/`LEAD` by `offset` rows with an optional fill value.
    pub fn shift(
        &mut self,
        func: ShiftFunc,
        input: NodeId,
        offset: i64,
        default: Option<Value>,
        spec: WindowSpec,
    ) -> DfqlResult<NodeId> {
        self.check_window_spec(&spec)?;
        let typed = self.typed_of(input)?.clone();
        if let Some(t) = default.as_ref().and_then(Value::dtype) {
            highest_precedence(&[typed.dtype, t])?;
        }
        let op = WindowOp::Shift {
            func,
            input,
            offset,
            default,
            spec,
        };
        Ok(self.push_window(op, Typed::new(typed.dtype, typed.name)))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_window_types() {
        let mut dag = Dag::new();
        let schema = Schema::from_pairs([("id", DataType::Int64), ("flag", DataType::Boolean)]).unwrap();
        let t = dag.source("proj", "T", schema);
        let id = dag.column(t, "id").unwrap();
        let flag = dag.column(t, "flag").unwrap();

        let spec = WindowSpec {
            partition_by: vec![flag],
            order_by: vec![SortKey::asc(id)],
            frame: None,
        };
        let total = dag.cumulative(CumulativeFunc::Sum, flag, spec.clone(), false).unwrap();
        assert_eq!(dag.get(total).unwrap().dtype(), Some(DataType::Int64));
        let rank = dag.rank(RankFunc::PercentRank, spec.clone()).unwrap();
        assert_eq!(dag.get(rank).unwrap().dtype(), Some(DataType::Float64));
        assert_eq!(dag.get(rank).unwrap().name(), Some("percent_rank"));

        assert!(dag.rank(RankFunc::Rank, WindowSpec::default()).is_err());
        assert!(dag
            .shift(ShiftFunc::Lag, id, 1, Some(Value::from("x")), spec)
            .is_err());
    }
}
