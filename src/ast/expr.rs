//! Node kinds of the expression DAG.

use crate::ast::operators::*;
use crate::ast::values::Value;
use crate::types::{DataType, Schema};
use serde::{Deserialize, Serialize};

/// Index of a node in its [`Dag`](crate::ast::Dag). Identity, not structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a user function registered in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UdfId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Udf {
    pub name: String,
    pub output: DataType,
}

/// External table bound to a leaf collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub namespace: String,
    pub name: String,
    pub schema: Schema,
}

/// Type and naming of a sequence or scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typed {
    pub dtype: DataType,
    /// Type before any cast.
    pub source_dtype: DataType,
    pub name: Option<String>,
    /// Name before any rename.
    pub source_name: Option<String>,
}

impl Typed {
    pub fn new(dtype: DataType, name: Option<String>) -> Self {
        Self {
            dtype,
            source_dtype: dtype,
            source_name: name.clone(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Collection { schema: Schema },
    Sequence(Typed),
    Scalar(Typed),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub expr: NodeId,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(expr: NodeId) -> Self {
        Self { expr, ascending: true }
    }

    pub fn desc(expr: NodeId) -> Self {
        Self { expr, ascending: false }
    }
}

/// Output field of a join and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinField {
    pub name: String,
    pub dtype: DataType,
    pub side: JoinSide,
    /// Field name on the side collection.
    pub source: String,
}

/// Right-hand side of a membership test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Literals(Vec<NodeId>),
    /// A sequence compiled as its own `SELECT`.
    Subquery(NodeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ElementOp {
    IsNull {
        input: NodeId,
    },
    NotNull {
        input: NodeId,
    },
    FillNa {
        input: NodeId,
        value: NodeId,
    },
    IsIn {
        input: NodeId,
        values: Membership,
    },
    NotIn {
        input: NodeId,
        values: Membership,
    },
    Between {
        input: NodeId,
        left: Option<NodeId>,
        right: Option<NodeId>,
        inclusive: bool,
    },
    IfElse {
        condition: NodeId,
        then: NodeId,
        otherwise: NodeId,
    },
    Switch {
        case: Option<NodeId>,
        conditions: Vec<NodeId>,
        thens: Vec<NodeId>,
        default: Option<NodeId>,
    },
    Cut {
        input: NodeId,
        bins: Vec<Value>,
        /// Intervals closed on the right.
        right: bool,
        labels: Vec<Value>,
        include_lowest: bool,
        include_under: bool,
        include_over: bool,
    },
}

/// String operations; parameters are constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StringOp {
    Capitalize,
    Contains {
        pat: String,
        case: bool,
        regex: bool,
        flags: i32,
    },
    Count {
        pat: String,
        flags: i32,
    },
    Endswith {
        pat: String,
    },
    Startswith {
        pat: String,
    },
    Extract {
        pat: String,
        flags: i32,
        group: i64,
    },
    Find {
        sub: String,
        start: i64,
        end: Option<i64>,
    },
    Replace {
        pat: String,
        repl: String,
        n: i64,
        case: bool,
        flags: i32,
        regex: bool,
    },
    Get {
        index: i64,
    },
    Len,
    Lower,
    Upper,
    Lstrip {
        to_strip: Option<String>,
    },
    Rstrip {
        to_strip: Option<String>,
    },
    Strip {
        to_strip: Option<String>,
    },
    Repeat {
        repeats: i64,
    },
    Substr {
        start: i64,
        length: Option<i64>,
    },
}

impl StringOp {
    pub fn name(&self) -> &'static str {
        match self {
            StringOp::Capitalize => "capitalize",
            StringOp::Contains { .. } => "contains",
            StringOp::Count { .. } => "count",
            StringOp::Endswith { .. } => "endswith",
            StringOp::Startswith { .. } => "startswith",
            StringOp::Extract { .. } => "extract",
            StringOp::Find { .. } => "find",
            StringOp::Replace { .. } => "replace",
            StringOp::Get { .. } => "get",
            StringOp::Len => "len",
            StringOp::Lower => "lower",
            StringOp::Upper => "upper",
            StringOp::Lstrip { .. } => "lstrip",
            StringOp::Rstrip { .. } => "rstrip",
            StringOp::Strip { .. } => "strip",
            StringOp::Repeat { .. } => "repeat",
            StringOp::Substr { .. } => "substr",
        }
    }
}

/// Row frame of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFrame {
    Preceding(u64),
    Following(u64),
    Between { preceding: u64, following: u64 },
    PrecedingRange(u64, u64),
    FollowingRange(u64, u64),
}

/// Partitioning and ordering shared by all window kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowSpec {
    pub partition_by: Vec<NodeId>,
    pub order_by: Vec<SortKey>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "window", rename_all = "snake_case")]
pub enum WindowOp {
    Cumulative {
        func: CumulativeFunc,
        input: NodeId,
        distinct: bool,
        spec: WindowSpec,
    },
    Rank {
        func: RankFunc,
        spec: WindowSpec,
    },
    Shift {
        func: ShiftFunc,
        input: NodeId,
        offset: i64,
        default: Option<Value>,
        spec: WindowSpec,
    },
}

impl WindowOp {
    pub fn spec(&self) -> &WindowSpec {
        match self {
            WindowOp::Cumulative { spec, .. }
            | WindowOp::Rank { spec, .. }
            | WindowOp::Shift { spec, .. } => spec,
        }
    }
}

/// Closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    // Collections
    Source {
        table: TableRef,
    },
    Project {
        input: NodeId,
        fields: Vec<NodeId>,
    },
    Filter {
        input: NodeId,
        predicate: NodeId,
    },
    GroupBy {
        input: NodeId,
        by: Vec<NodeId>,
        aggs: Vec<NodeId>,
        having: Option<NodeId>,
    },
    Mutate {
        input: NodeId,
        by: Vec<NodeId>,
        mutates: Vec<NodeId>,
    },
    Sort {
        input: NodeId,
        keys: Vec<SortKey>,
    },
    Distinct {
        input: NodeId,
        fields: Vec<NodeId>,
    },
    Slice {
        input: NodeId,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    Summary {
        input: NodeId,
        fields: Vec<NodeId>,
    },
    Join {
        left: NodeId,
        right: NodeId,
        predicate: Option<NodeId>,
        how: JoinKind,
        fields: Vec<JoinField>,
    },
    Union {
        left: NodeId,
        right: NodeId,
        distinct: bool,
    },

    // Values
    Element(ElementOp),
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        input: NodeId,
    },
    Math {
        func: MathFunc,
        input: NodeId,
    },
    Str {
        input: NodeId,
        op: StringOp,
    },
    Datetime {
        input: NodeId,
        field: DatetimeField,
    },
    Reduction {
        func: ReductionFunc,
        input: NodeId,
        ddof: i64,
    },
    Window(WindowOp),
    Cast {
        input: NodeId,
    },
    Column {
        collection: NodeId,
    },
    Literal {
        value: Value,
    },
    UserMap {
        input: NodeId,
        udf: UdfId,
    },
}

impl NodeKind {
    /// Short kind name used in diagnostics and `explain` output.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Source { .. } => "source",
            NodeKind::Project { .. } => "project",
            NodeKind::Filter { .. } => "filter",
            NodeKind::GroupBy { .. } => "groupby",
            NodeKind::Mutate { .. } => "mutate",
            NodeKind::Sort { .. } => "sort",
            NodeKind::Distinct { .. } => "distinct",
            NodeKind::Slice { .. } => "slice",
            NodeKind::Summary { .. } => "summary",
            NodeKind::Join { .. } => "join",
            NodeKind::Union { .. } => "union",
            NodeKind::Element(op) => match op {
                ElementOp::IsNull { .. } => "isnull",
                ElementOp::NotNull { .. } => "notnull",
                ElementOp::FillNa { .. } => "fillna",
                ElementOp::IsIn { .. } => "isin",
                ElementOp::NotIn { .. } => "notin",
                ElementOp::Between { .. } => "between",
                ElementOp::IfElse { .. } => "ifelse",
                ElementOp::Switch { .. } => "switch",
                ElementOp::Cut { .. } => "cut",
            },
            NodeKind::Binary { .. } => "binary",
            NodeKind::Unary { .. } => "unary",
            NodeKind::Math { .. } => "math",
            NodeKind::Str { .. } => "string",
            NodeKind::Datetime { .. } => "datetime",
            NodeKind::Reduction { .. } => "reduction",
            NodeKind::Window(op) => match op {
                WindowOp::Cumulative { .. } => "cumulative",
                WindowOp::Rank { .. } => "rank",
                WindowOp::Shift { .. } => "shift",
            },
            NodeKind::Cast { .. } => "cast",
            NodeKind::Column { .. } => "column",
            NodeKind::Literal { .. } => "literal",
            NodeKind::UserMap { .. } => "map",
        }
    }

    /// Filter, slice and sort keep their input's rows addressable.
    pub fn pass_through_input(&self) -> Option<NodeId> {
        match self {
            NodeKind::Filter { input, .. }
            | NodeKind::Slice { input, .. }
            | NodeKind::Sort { input, .. } => Some(*input),
            _ => None,
        }
    }

    /// Ordered, named child slots.
    pub fn args(&self) -> Vec<(&'static str, NodeId)> {
        let mut args = Vec::new();
        let many = |args: &mut Vec<(&'static str, NodeId)>, slot, ids: &[NodeId]| {
            args.extend(ids.iter().map(|id| (slot, *id)));
        };
        let window = |args: &mut Vec<(&'static str, NodeId)>, spec: &WindowSpec| {
            args.extend(spec.partition_by.iter().map(|id| ("partition_by", *id)));
            args.extend(spec.order_by.iter().map(|k| ("order_by", k.expr)));
        };
        match self {
            NodeKind::Source { .. } | NodeKind::Literal { .. } => {}
            NodeKind::Project { input, fields }
            | NodeKind::Distinct { input, fields }
            | NodeKind::Summary { input, fields } => {
                args.push(("input", *input));
                many(&mut args, "fields", fields);
            }
            NodeKind::Filter { input, predicate } => {
                args.push(("input", *input));
                args.push(("predicate", *predicate));
            }
            NodeKind::GroupBy {
                input,
                by,
                aggs,
                having,
            } => {
                args.push(("input", *input));
                many(&mut args, "by", by);
                many(&mut args, "aggs", aggs);
                if let Some(h) = having {
                    args.push(("having", *h));
                }
            }
            NodeKind::Mutate { input, by, mutates } => {
                args.push(("input", *input));
                many(&mut args, "by", by);
                many(&mut args, "mutates", mutates);
            }
            NodeKind::Sort { input, keys } => {
                args.push(("input", *input));
                args.extend(keys.iter().map(|k| ("keys", k.expr)));
            }
            NodeKind::Slice { input, .. }
            | NodeKind::Unary { input, .. }
            | NodeKind::Math { input, .. }
            | NodeKind::Str { input, .. }
            | NodeKind::Datetime { input, .. }
            | NodeKind::Reduction { input, .. }
            | NodeKind::Cast { input }
            | NodeKind::UserMap { input, .. } => args.push(("input", *input)),
            NodeKind::Join {
                left,
                right,
                predicate,
                ..
            } => {
                args.push(("left", *left));
                args.push(("right", *right));
                if let Some(p) = predicate {
                    args.push(("predicate", *p));
                }
            }
            NodeKind::Union { left, right, .. } => {
                args.push(("left", *left));
                args.push(("right", *right));
            }
            NodeKind::Binary { lhs, rhs, .. } => {
                args.push(("lhs", *lhs));
                args.push(("rhs", *rhs));
            }
            NodeKind::Column { collection } => args.push(("collection", *collection)),
            NodeKind::Element(op) => match op {
                ElementOp::IsNull { input }
                | ElementOp::NotNull { input }
                | ElementOp::Cut { input, .. } => args.push(("input", *input)),
                ElementOp::FillNa { input, value } => {
                    args.push(("input", *input));
                    args.push(("value", *value));
                }
                ElementOp::IsIn { input, values } | ElementOp::NotIn { input, values } => {
                    args.push(("input", *input));
                    match values {
                        Membership::Literals(ids) => many(&mut args, "values", ids),
                        Membership::Subquery(id) => args.push(("subquery", *id)),
                    }
                }
                ElementOp::Between {
                    input, left, right, ..
                } => {
                    args.push(("input", *input));
                    if let Some(l) = left {
                        args.push(("left", *l));
                    }
                    if let Some(r) = right {
                        args.push(("right", *r));
                    }
                }
                ElementOp::IfElse {
                    condition,
                    then,
                    otherwise,
                } => {
                    args.push(("condition", *condition));
                    args.push(("then", *then));
                    args.push(("otherwise", *otherwise));
                }
                ElementOp::Switch {
                    case,
                    conditions,
                    thens,
                    default,
                } => {
                    if let Some(c) = case {
                        args.push(("case", *c));
                    }
                    many(&mut args, "conditions", conditions);
                    many(&mut args, "thens", thens);
                    if let Some(d) = default {
                        args.push(("default", *d));
                    }
                }
            },
            NodeKind::Window(op) => {
                match op {
                    WindowOp::Cumulative { input, .. } | WindowOp::Shift { input, .. } => {
                        args.push(("input", *input))
                    }
                    WindowOp::Rank { .. } => {}
                }
                window(&mut args, op.spec());
            }
        }
        args
    }
}

/// Arena entry: a kind plus its resolved shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Node {
    pub fn is_collection(&self) -> bool {
        matches!(self.shape, Shape::Collection { .. })
    }

    pub fn schema(&self) -> Option<&Schema> {
        match &self.shape {
            Shape::Collection { schema } => Some(schema),
            _ => None,
        }
    }

    pub fn typed(&self) -> Option<&Typed> {
        match &self.shape {
            Shape::Sequence(t) | Shape::Scalar(t) => Some(t),
            Shape::Collection { .. } => None,
        }
    }

    pub fn dtype(&self) -> Option<DataType> {
        self.typed().map(|t| t.dtype)
    }

    pub fn name(&self) -> Option<&str> {
        self.typed().and_then(|t| t.name.as_deref())
    }
}
