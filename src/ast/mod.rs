pub mod builders;
pub mod dag;
pub mod expr;
pub mod operators;
pub mod traverse;
pub mod values;
pub mod visitor;

pub use self::builders::CutOptions;
pub use self::dag::{Dag, Plan};
pub use self::expr::{
    ElementOp, JoinField, Membership, Node, NodeId, NodeKind, Shape, SortKey, StringOp,
    TableRef, Typed, Udf, UdfId, WindowFrame, WindowOp, WindowSpec,
};
pub use self::operators::{
    BinaryOp, CumulativeFunc, DatetimeField, JoinKind, JoinSide, MathFunc, RankFunc,
    ReductionFunc, ShiftFunc, UnaryOp,
};
pub use self::traverse::{Order, Traversal};
pub use self::values::Value;
pub use self::visitor::Visitor;
