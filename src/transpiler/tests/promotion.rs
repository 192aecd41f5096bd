//! Levels wrapped as derived tables.

use super::{col, sql, table};
use crate::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_filter_after_projection_nests() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let score = col(&mut dag, t, "score");
    let projected = dag.project(t, &[id, score]).unwrap();
    let pscore = col(&mut dag, projected, "score");
    let half = dag.literal(0.5).unwrap();
    let high = dag.binary(BinaryOp::Gt, pscore, half).unwrap();
    let root = dag.filter(projected, high).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT t1.`id`, t1.`score`\n  FROM proj.`T` t1\n) t2\nWHERE t2.`score` > 0.5"
    );
}

#[test]
fn test_second_group_by_nests() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let score = col(&mut dag, t, "score");
    let total = dag.reduce(ReductionFunc::Sum, score).unwrap();
    let grouped = dag.group_by(t, &[id], &[total]).unwrap();

    let gscore = col(&mut dag, grouped, "score");
    let gid = col(&mut dag, grouped, "id");
    let n = dag.reduce(ReductionFunc::Count, gid).unwrap();
    let n = dag.rename(n, "n").unwrap();
    let root = dag.group_by(grouped, &[gscore], &[n]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t2.`score`, COUNT(t2.`id`) AS `n`\nFROM (\n  SELECT t1.`id`, SUM(t1.`score`) AS `score`\n  FROM proj.`T` t1\n  GROUP BY t1.`id`\n) t2\nGROUP BY t2.`score`"
    );
}

#[test]
fn test_sort_after_projection_nests() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let name = col(&mut dag, t, "name");
    let projected = dag.project(t, &[id, name]).unwrap();
    let pid = col(&mut dag, projected, "id");
    let root = dag.sort(projected, vec![SortKey::asc(pid)]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT t1.`id`, t1.`name`\n  FROM proj.`T` t1\n) t2\nORDER BY t2.`id`\nLIMIT 10000"
    );
}

#[test]
fn test_filter_after_limit_nests() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let limited = dag.limit(t, 5).unwrap();
    let id = col(&mut dag, limited, "id");
    let zero = dag.literal(0).unwrap();
    let positive = dag.binary(BinaryOp::Gt, id, zero).unwrap();
    let root = dag.filter(limited, positive).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT *\n  FROM proj.`T` t1\n  LIMIT 5\n) t2\nWHERE t2.`id` > 0"
    );
}

#[test]
fn test_second_filter_nests() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let flag = col(&mut dag, t, "flag");
    let first = dag.filter(t, flag).unwrap();
    let id = col(&mut dag, first, "id");
    let zero = dag.literal(0).unwrap();
    let positive = dag.binary(BinaryOp::Gt, id, zero).unwrap();
    let root = dag.filter(first, positive).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT *\n  FROM proj.`T` t1\n  WHERE t1.`flag`\n) t2\nWHERE t2.`id` > 0"
    );
}

#[test]
fn test_three_levels() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let first = dag.project(t, &[id]).unwrap();
    let fid = col(&mut dag, first, "id");
    let second = dag.project(first, &[fid]).unwrap();
    let sid = col(&mut dag, second, "id");
    let root = dag.project(second, &[sid]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t3.`id`\nFROM (\n  SELECT t2.`id`\n  FROM (\n    SELECT t1.`id`\n    FROM proj.`T` t1\n  ) t2\n) t3"
    );
}

#[test]
fn test_wider_indent() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let projected = dag.project(t, &[id]).unwrap();
    let limited = dag.limit(projected, 3).unwrap();
    let lid = col(&mut dag, limited, "id");
    let zero = dag.literal(0).unwrap();
    let nonzero = dag.binary(BinaryOp::Ne, lid, zero).unwrap();
    let root = dag.filter(limited, nonzero).unwrap();

    let options = CompilerOptions {
        indent_size: 4,
        ..CompilerOptions::default()
    };
    assert_eq!(
        Compiler::new(options).compile(&dag, root).unwrap(),
        "SELECT *\nFROM (\n    SELECT t1.`id`\n    FROM proj.`T` t1\n    LIMIT 3\n) t2\nWHERE t2.`id` != 0"
    );
}

#[test]
fn test_second_filter_on_source_columns() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let flag = col(&mut dag, t, "flag");
    let first = dag.filter(t, flag).unwrap();
    let id = col(&mut dag, t, "id");
    let zero = dag.literal(0).unwrap();
    let positive = dag.binary(BinaryOp::Gt, id, zero).unwrap();
    let both = dag.binary(BinaryOp::And, flag, positive).unwrap();
    let root = dag.filter(first, both).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT *\n  FROM proj.`T` t1\n  WHERE t1.`flag`\n) t2\nWHERE t2.`flag` AND (t2.`id` > 0)"
    );
}

#[test]
fn test_sort_over_limited_filter_reads_source_columns() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let flag = col(&mut dag, t, "flag");
    let filtered = dag.filter(t, flag).unwrap();
    let limited = dag.limit(filtered, 5).unwrap();
    let score = col(&mut dag, t, "score");
    let root = dag.sort(limited, vec![SortKey::desc(score)]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM (\n  SELECT *\n  FROM proj.`T` t1\n  WHERE t1.`flag`\n  LIMIT 5\n) t2\nORDER BY t2.`score` DESC\nLIMIT 10000"
    );
}

#[test]
fn test_column_hidden_by_projection_is_rejected() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let projected = dag.project(t, &[id]).unwrap();
    let flag = col(&mut dag, t, "flag");
    let root = dag.filter(projected, flag).unwrap();

    assert!(matches!(
        Compiler::default().compile(&dag, root),
        Err(DfqlError::Schema(_))
    ));
}
