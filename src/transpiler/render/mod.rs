//! Per-kind rendering of DAG nodes.
//!
//! # Modules
//!
//! - `literals` - Constants and column references
//! - `arithmetic` - Operators, math, casts and user functions
//! - `elements` - Null checks, membership, conditionals, bucketing
//! - `strings` - String and datetime accessors
//! - `reductions` - Aggregates
//! - `windows` - `OVER (...)` functions

mod arithmetic;
mod elements;
mod literals;
mod reductions;
mod strings;
mod windows;

pub use literals::render_value;

use crate::ast::*;
use crate::error::DfqlResult;
use crate::transpiler::compiler::SqlCompiler;
use crate::types::DataType;

/// Convert `text` of type `from` to `to`. Integers become datetimes as epoch
/// seconds.
pub fn cast_text(text: &str, from: DataType, to: DataType) -> String {
    if from == to {
        text.to_string()
    } else if from.is_integer() && to == DataType::Datetime {
        format!("FROM_UNIXTIME({})", text)
    } else {
        format!("CAST({} AS {})", text, to.sql_name())
    }
}

impl SqlCompiler<'_> {
    /// Fragment of `id`, parenthesized when it is used as an operand and
    /// renders as an infix or keyword expression.
    pub(crate) fn operand(&self, id: NodeId) -> DfqlResult<String> {
        let text = self.fragment(id)?;
        let node = self.dag.get(id)?;
        let wrap = match &node.kind {
            NodeKind::Binary { .. } => true,
            NodeKind::Element(op) => !matches!(
                op,
                ElementOp::FillNa { .. } | ElementOp::IfElse { .. }
            ),
            NodeKind::Math { func, .. } => *func == MathFunc::Expm1,
            NodeKind::Str { op, .. } => matches!(
                op,
                StringOp::Contains { .. }
                    | StringOp::Endswith { .. }
                    | StringOp::Startswith { .. }
                    | StringOp::Find { .. }
            ),
            NodeKind::Reduction { func, input, .. } => match func {
                ReductionFunc::Any | ReductionFunc::All => true,
                ReductionFunc::Max | ReductionFunc::Min => {
                    self.dag.get(*input)?.dtype() == Some(DataType::Boolean)
                }
                _ => false,
            },
            _ => false,
        };
        Ok(if wrap { format!("({})", text) } else { text })
    }
}

impl Visitor for SqlCompiler<'_> {
    fn visit_source_collection(&mut self, id: NodeId, table: &TableRef) -> DfqlResult<()> {
        self.compile_source(id, table)
    }

    fn visit_project_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        fields: &[NodeId],
    ) -> DfqlResult<()> {
        self.compile_project(id, input, fields)
    }

    fn visit_filter_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        predicate: NodeId,
    ) -> DfqlResult<()> {
        self.compile_filter(id, input, predicate)
    }

    fn visit_groupby(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        aggs: &[NodeId],
        having: Option<NodeId>,
    ) -> DfqlResult<()> {
        self.compile_groupby(id, input, by, aggs, having)
    }

    fn visit_mutate(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        mutates: &[NodeId],
    ) -> DfqlResult<()> {
        self.compile_mutate(id, input, by, mutates)
    }

    fn visit_sort(&mut self, id: NodeId, input: NodeId, keys: &[SortKey]) -> DfqlResult<()> {
        self.compile_sort(id, input, keys)
    }

    fn visit_distinct(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()> {
        self.compile_distinct(id, input, fields)
    }

    fn visit_slice_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> DfqlResult<()> {
        self.compile_slice(id, input, start, stop, step)
    }

    fn visit_summary(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()> {
        self.compile_summary(id, input, fields)
    }

    fn visit_join(
        &mut self,
        id: NodeId,
        _left: NodeId,
        _right: NodeId,
        _predicate: Option<NodeId>,
        _how: JoinKind,
    ) -> DfqlResult<()> {
        self.compile_join(id)
    }

    fn visit_union(
        &mut self,
        id: NodeId,
        _left: NodeId,
        _right: NodeId,
        _distinct: bool,
    ) -> DfqlResult<()> {
        self.compile_union(id)
    }

    fn visit_element_op(&mut self, id: NodeId, op: &ElementOp) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_element(id, op)?;
        self.emit(id, text)
    }

    fn visit_binary_op(
        &mut self,
        id: NodeId,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_binary(id, op, lhs, rhs)?;
        self.emit(id, text)
    }

    fn visit_unary_op(&mut self, id: NodeId, op: UnaryOp, input: NodeId) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_unary(op, input)?;
        self.emit(id, text)
    }

    fn visit_math(&mut self, id: NodeId, func: MathFunc, input: NodeId) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_math(func, input)?;
        self.emit(id, text)
    }

    fn visit_string_op(&mut self, id: NodeId, input: NodeId, op: &StringOp) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_string(input, op)?;
        self.emit(id, text)
    }

    fn visit_datetime_op(
        &mut self,
        id: NodeId,
        input: NodeId,
        field: DatetimeField,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_datetime(input, field)?;
        self.emit(id, text)
    }

    fn visit_reduction(
        &mut self,
        id: NodeId,
        func: ReductionFunc,
        input: NodeId,
        ddof: i64,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_reduction(func, input, ddof)?;
        self.emit(id, text)
    }

    fn visit_cum_window(
        &mut self,
        id: NodeId,
        func: CumulativeFunc,
        input: NodeId,
        distinct: bool,
        spec: &WindowSpec,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_cumulative(func, input, distinct, spec)?;
        self.emit(id, text)
    }

    fn visit_rank_window(
        &mut self,
        id: NodeId,
        func: RankFunc,
        spec: &WindowSpec,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_rank(func, spec)?;
        self.emit(id, text)
    }

    fn visit_shift_window(
        &mut self,
        id: NodeId,
        func: ShiftFunc,
        input: NodeId,
        offset: i64,
        default: Option<&Value>,
        spec: &WindowSpec,
    ) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_shift(func, input, offset, default, spec)?;
        self.emit(id, text)
    }

    fn visit_cast(&mut self, id: NodeId, input: NodeId) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_cast(id, input)?;
        self.emit(id, text)
    }

    fn visit_column(&mut self, id: NodeId, collection: NodeId) -> DfqlResult<()> {
        let text = self.render_column(id, collection)?;
        self.emit(id, text)
    }

    fn visit_literal(&mut self, id: NodeId, value: &Value) -> DfqlResult<()> {
        let text = self.render_literal(id, value)?;
        self.emit(id, text)
    }

    fn visit_map(&mut self, id: NodeId, input: NodeId, udf: UdfId) -> DfqlResult<()> {
        self.visit_args(id)?;
        let text = self.render_map(input, udf)?;
        self.emit(id, text)
    }
}
