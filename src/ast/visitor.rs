//! Double dispatch over node kinds.

use crate::ast::dag::Dag;
use crate::ast::expr::*;
use crate::ast::operators::*;
use crate::ast::values::Value;
use crate::error::DfqlResult;

/// One method per node kind. [`Dag::accept`] destructures the node and calls
/// the matching method.
pub trait Visitor {
    fn visit_source_collection(&mut self, id: NodeId, table: &TableRef) -> DfqlResult<()>;
    fn visit_project_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        fields: &[NodeId],
    ) -> DfqlResult<()>;
    fn visit_filter_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        predicate: NodeId,
    ) -> DfqlResult<()>;
    fn visit_groupby(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        aggs: &[NodeId],
        having: Option<NodeId>,
    ) -> DfqlResult<()>;
    fn visit_mutate(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        mutates: &[NodeId],
    ) -> DfqlResult<()>;
    fn visit_sort(&mut self, id: NodeId, input: NodeId, keys: &[SortKey]) -> DfqlResult<()>;
    fn visit_distinct(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()>;
    fn visit_slice_collection(
        &mut self,
        id: NodeId,
        input: NodeId,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> DfqlResult<()>;
    fn visit_summary(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()>;
    fn visit_join(
        &mut self,
        id: NodeId,
        left: NodeId,
        right: NodeId,
        predicate: Option<NodeId>,
        how: JoinKind,
    ) -> DfqlResult<()>;
    fn visit_union(
        &mut self,
        id: NodeId,
        left: NodeId,
        right: NodeId,
        distinct: bool,
    ) -> DfqlResult<()>;

    fn visit_element_op(&mut self, id: NodeId, op: &ElementOp) -> DfqlResult<()>;
    fn visit_binary_op(
        &mut self,
        id: NodeId,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    ) -> DfqlResult<()>;
    fn visit_unary_op(&mut self, id: NodeId, op: UnaryOp, input: NodeId) -> DfqlResult<()>;
    fn visit_math(&mut self, id: NodeId, func: MathFunc, input: NodeId) -> DfqlResult<()>;
    fn visit_string_op(&mut self, id: NodeId, input: NodeId, op: &StringOp) -> DfqlResult<()>;
    fn visit_datetime_op(
        &mut self,
        id: NodeId,
        input: NodeId,
        field: DatetimeField,
    ) -> DfqlResult<()>;
    fn visit_reduction(
        &mut self,
        id: NodeId,
        func: ReductionFunc,
        input: NodeId,
        ddof: i64,
    ) -> DfqlResult<()>;
    fn visit_cum_window(
        &mut self,
        id: NodeId,
        func: CumulativeFunc,
        input: NodeId,
        distinct: bool,
        spec: &WindowSpec,
    ) -> DfqlResult<()>;
    fn visit_rank_window(&mut self, id: NodeId, func: RankFunc, spec: &WindowSpec)
    -> DfqlResult<()>;
    fn visit_shift_window(
        &mut self,
        id: NodeId,
        func: ShiftFunc,
        input: NodeId,
        offset: i64,
        default: Option<&Value>,
        spec: &WindowSpec,
    ) -> DfqlResult<()>;
    fn visit_cast(&mut self, id: NodeId, input: NodeId) -> DfqlResult<()>;
    fn visit_column(&mut self, id: NodeId, collection: NodeId) -> DfqlResult<()>;
    fn visit_literal(&mut self, id: NodeId, value: &Value) -> DfqlResult<()>;
    fn visit_map(&mut self, id: NodeId, input: NodeId, udf: UdfId) -> DfqlResult<()>;
}

impl Dag {
    /// Dispatch `id` to the visitor method for its kind.
    pub fn accept<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) -> DfqlResult<()> {
        let node = self.get(id)?;
        match &node.kind {
            NodeKind::Source { table } => visitor.visit_source_collection(id, table),
            NodeKind::Project { input, fields } => {
                visitor.visit_project_collection(id, *input, fields)
            }
            NodeKind::Filter { input, predicate } => {
                visitor.visit_filter_collection(id, *input, *predicate)
            }
            NodeKind::GroupBy {
                input,
                by,
                aggs,
                having,
            } => visitor.visit_groupby(id, *input, by, aggs, *having),
            NodeKind::Mutate { input, by, mutates } => {
                visitor.visit_mutate(id, *input, by, mutates)
            }
            NodeKind::Sort { input, keys } => visitor.visit_sort(id, *input, keys),
            NodeKind::Distinct { input, fields } => visitor.visit_distinct(id, *input, fields),
            NodeKind::Slice {
                input,
                start,
                stop,
                step,
            } => visitor.visit_slice_collection(id, *input, *start, *stop, *step),
            NodeKind::Summary { input, fields } => visitor.visit_summary(id, *input, fields),
            NodeKind::Join {
                left,
                right,
                predicate,
                how,
                ..
            } => visitor.visit_join(id, *left, *right, *predicate, *how),
            NodeKind::Union {
                left,
                right,
                distinct,
            } => visitor.visit_union(id, *left, *right, *distinct),
            NodeKind::Element(op) => visitor.visit_element_op(id, op),
            NodeKind::Binary { op, lhs, rhs } => visitor.visit_binary_op(id, *op, *lhs, *rhs),
            NodeKind::Unary { op, input } => visitor.visit_unary_op(id, *op, *input),
            NodeKind::Math { func, input } => visitor.visit_math(id, *func, *input),
            NodeKind::Str { input, op } => visitor.visit_string_op(id, *input, op),
            NodeKind::Datetime { input, field } => visitor.visit_datetime_op(id, *input, *field),
            NodeKind::Reduction { func, input, ddof } => {
                visitor.visit_reduction(id, *func, *input, *ddof)
            }
            NodeKind::Window(WindowOp::Cumulative {
                func,
                input,
                distinct,
                spec,
            }) => visitor.visit_cum_window(id, *func, *input, *distinct, spec),
            NodeKind::Window(WindowOp::Rank { func, spec }) => {
                visitor.visit_rank_window(id, *func, spec)
            }
            NodeKind::Window(WindowOp::Shift {
                func,
                input,
                offset,
                default,
                spec,
            }) => visitor.visit_shift_window(id, *func, *input, *offset, default.as_ref(), spec),
            NodeKind::Cast { input } => visitor.visit_cast(id, *input),
            NodeKind::Column { collection } => visitor.visit_column(id, *collection),
            NodeKind::Literal { value } => visitor.visit_literal(id, value),
            NodeKind::UserMap { input, udf } => visitor.visit_map(id, *input, *udf),
        }
    }
}
