//! Constructs without a SQL form and broken plans.

use super::{col, sql, table};
use crate::prelude::*;
use pretty_assertions::assert_eq;

fn compile_err(dag: &Dag, root: NodeId) -> DfqlError {
    Compiler::default().compile(dag, root).unwrap_err()
}

#[test]
fn test_slice_offsets_are_unsupported() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let offset = dag.slice(t, Some(5), Some(10), None).unwrap();
    let stepped = dag.slice(t, None, Some(10), Some(2)).unwrap();

    assert!(matches!(compile_err(&dag, offset), DfqlError::Unsupported(_)));
    assert!(matches!(compile_err(&dag, stepped), DfqlError::Unsupported(_)));
}

#[test]
fn test_slice_zero_start_is_a_limit() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let root = dag.slice(t, Some(0), Some(3), Some(1)).unwrap();
    assert_eq!(sql(&dag, root), "SELECT *\nFROM proj.`T` t1\nLIMIT 3");
}

#[test]
fn test_negative_or_missing_stop() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let negative = dag.slice(t, None, Some(-1), None).unwrap();
    let open = dag.slice(t, None, None, None).unwrap();

    assert!(matches!(
        compile_err(&dag, negative),
        DfqlError::InternalInconsistency(_)
    ));
    assert!(matches!(
        compile_err(&dag, open),
        DfqlError::InternalInconsistency(_)
    ));
}

#[test]
fn test_integer_invert_is_unsupported() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let inverted = dag.unary(UnaryOp::Invert, id).unwrap();
    let root = dag.project(t, &[inverted]).unwrap();

    assert_eq!(
        compile_err(&dag, root).to_string(),
        "Unsupported construct: bitwise invert of int64"
    );
}

#[test]
fn test_unsupported_datetime_field() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let ts = col(&mut dag, t, "ts");
    let micros = dag.datetime_field(ts, DatetimeField::Microsecond).unwrap();
    let root = dag.project(t, &[micros]).unwrap();

    assert!(matches!(compile_err(&dag, root), DfqlError::Unsupported(_)));
}

#[test]
fn test_variance_with_ddof() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let score = col(&mut dag, t, "score");
    let var = dag.reduce_ddof(ReductionFunc::Var, score, 1).unwrap();
    let root = dag.summary(t, &[var]).unwrap();

    assert_eq!(
        compile_err(&dag, root).to_string(),
        "Unsupported construct: var with ddof=1"
    );

    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let score = col(&mut dag, t, "score");
    let var = dag.reduce(ReductionFunc::Var, score).unwrap();
    let root = dag.summary(t, &[var]).unwrap();
    assert_eq!(sql(&dag, root), "SELECT VARIANCE(t1.`score`) AS `score`\nFROM proj.`T` t1");
}

#[test]
fn test_missing_root() {
    let dag = Dag::new();
    assert!(matches!(
        compile_err(&dag, NodeId(7)),
        DfqlError::InternalInconsistency(_)
    ));
}

#[test]
fn test_unknown_column_is_a_schema_error() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    assert!(matches!(dag.column(t, "nope"), Err(DfqlError::Schema(_))));
}

#[test]
fn test_failed_compile_leaves_no_state() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let inverted = dag.unary(UnaryOp::Invert, id).unwrap();
    let broken = dag.project(t, &[inverted]).unwrap();

    let mut compiler = Compiler::default();
    assert!(compiler.compile(&dag, broken).is_err());
    assert!(!compiler.context().has_alias(t));
    assert_eq!(compiler.compile(&dag, t).unwrap(), "SELECT *\nFROM proj.`T` t1");
}
