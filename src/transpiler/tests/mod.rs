//! Compiler tests.
//!
//! Expected SQL is compared verbatim; alias numbering and clause layout are
//! part of the output contract.

mod errors;
mod promotion;
mod selects;

use crate::prelude::*;

/// `proj.<name>` with one column of each commonly used type.
pub(super) fn table(dag: &mut Dag, name: &str) -> NodeId {
    let schema = Schema::from_pairs([
        ("id", DataType::Int64),
        ("name", DataType::String),
        ("score", DataType::Float64),
        ("flag", DataType::Boolean),
        ("ts", DataType::Datetime),
    ])
    .unwrap();
    dag.source("proj", name, schema)
}

pub(super) fn col(dag: &mut Dag, collection: NodeId, name: &str) -> NodeId {
    dag.column(collection, name).unwrap()
}

/// Compile `root` with default options.
pub(super) fn sql(dag: &Dag, root: NodeId) -> String {
    Compiler::default().compile(dag, root).unwrap()
}

/// Compile `value` as the single field of a projection over `t`.
pub(super) fn select_sql(dag: &mut Dag, t: NodeId, value: NodeId) -> String {
    let root = dag.project(t, &[value]).unwrap();
    sql(dag, root)
}
