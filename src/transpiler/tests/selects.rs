//! Single-level statements.

use super::{col, sql, table};
use crate::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_source_only() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    assert_eq!(sql(&dag, t), "SELECT *\nFROM proj.`T` t1");
}

#[test]
fn test_empty_namespace() {
    let mut dag = Dag::new();
    let schema = Schema::from_pairs([("id", DataType::Int64)]).unwrap();
    let t = dag.source("", "T", schema);
    assert_eq!(sql(&dag, t), "SELECT *\nFROM `T` t1");
}

#[test]
fn test_filtered_projection() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let zero = dag.literal(0).unwrap();
    let positive = dag.binary(BinaryOp::Gt, id, zero).unwrap();
    let filtered = dag.filter(t, positive).unwrap();
    let fid = col(&mut dag, filtered, "id");
    let fname = col(&mut dag, filtered, "name");
    let root = dag.project(filtered, &[fid, fname]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`id`, t1.`name`\nFROM proj.`T` t1\nWHERE t1.`id` > 0"
    );
}

#[test]
fn test_renamed_and_cast_columns_get_aliases() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let key = dag.rename(id, "key").unwrap();
    let name = col(&mut dag, t, "name");
    let score = col(&mut dag, t, "score");
    let text = dag.astype(score, DataType::String).unwrap();
    let root = dag.project(t, &[key, name, text]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`id` AS `key`, t1.`name`, CAST(t1.`score` AS STRING) AS `score`\nFROM proj.`T` t1"
    );
}

#[test]
fn test_group_by_count() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let name = col(&mut dag, t, "name");
    let count = dag.reduce(ReductionFunc::Count, name).unwrap();
    let c = dag.rename(count, "c").unwrap();
    let root = dag.group_by(t, &[id], &[c]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`id`, COUNT(t1.`name`) AS `c`\nFROM proj.`T` t1\nGROUP BY t1.`id`"
    );
}

#[test]
fn test_group_by_row_count_with_having() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let name = col(&mut dag, t, "name");
    let rows = dag.reduce(ReductionFunc::Count, t).unwrap();
    let one = dag.literal(1).unwrap();
    let having = dag.binary(BinaryOp::Gt, rows, one).unwrap();
    let root = dag.group_by_having(t, &[name], &[rows], having).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`name`, COUNT(1) AS `count`\nFROM proj.`T` t1\nGROUP BY t1.`name`\nHAVING COUNT(1) > 1"
    );
}

#[test]
fn test_sort_and_limit() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let score = col(&mut dag, t, "score");
    let sorted = dag.sort(t, vec![SortKey::desc(score)]).unwrap();
    let root = dag.limit(sorted, 10).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM proj.`T` t1\nORDER BY t1.`score` DESC\nLIMIT 10"
    );
}

#[test]
fn test_sort_gets_default_limit() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let name = col(&mut dag, t, "name");
    let root = dag.sort(t, vec![SortKey::asc(id), SortKey::desc(name)]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT *\nFROM proj.`T` t1\nORDER BY t1.`id`, t1.`name` DESC\nLIMIT 10000"
    );

    let options = CompilerOptions {
        default_sort_limit: 50,
        ..CompilerOptions::default()
    };
    let out = Compiler::new(options).compile(&dag, root).unwrap();
    assert!(out.ends_with("LIMIT 50"));
}

#[test]
fn test_filter_sort_project_stay_flat() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let flag = col(&mut dag, t, "flag");
    let filtered = dag.filter(t, flag).unwrap();
    let score = col(&mut dag, filtered, "score");
    let sorted = dag.sort(filtered, vec![SortKey::asc(score)]).unwrap();
    let id = col(&mut dag, sorted, "id");
    let root = dag.project(sorted, &[id]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`id`\nFROM proj.`T` t1\nWHERE t1.`flag`\nORDER BY t1.`score`\nLIMIT 10000"
    );
}

#[test]
fn test_distinct() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let name = col(&mut dag, t, "name");
    let root = dag.distinct(t, &[name]).unwrap();

    assert_eq!(sql(&dag, root), "SELECT DISTINCT t1.`name`\nFROM proj.`T` t1");
}

#[test]
fn test_summary() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let score = col(&mut dag, t, "score");
    let total = dag.reduce(ReductionFunc::Sum, score).unwrap();
    let id = col(&mut dag, t, "id");
    let ids = dag.reduce(ReductionFunc::NUnique, id).unwrap();
    let root = dag.summary(t, &[total, ids]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT SUM(t1.`score`) AS `score`, COUNT(DISTINCT t1.`id`) AS `id`\nFROM proj.`T` t1"
    );
}

#[test]
fn test_value_root_compiles_as_projection() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let score = col(&mut dag, t, "score");
    let mean = dag.reduce(ReductionFunc::Mean, score).unwrap();

    assert_eq!(sql(&dag, mean), "SELECT AVG(t1.`score`) AS `score`\nFROM proj.`T` t1");
    assert_eq!(sql(&dag, score), "SELECT t1.`score`\nFROM proj.`T` t1");
}

#[test]
fn test_mutate_with_window() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let name = col(&mut dag, t, "name");
    let score = col(&mut dag, t, "score");
    let spec = WindowSpec {
        partition_by: vec![name],
        order_by: vec![SortKey::asc(id)],
        frame: None,
    };
    let running = dag.cumulative(CumulativeFunc::Sum, score, spec, false).unwrap();
    let running = dag.rename(running, "running").unwrap();
    let root = dag.mutate(t, &[id], &[running]).unwrap();

    assert_eq!(
        sql(&dag, root),
        "SELECT t1.`id`, SUM(t1.`score`) OVER (PARTITION BY t1.`name` ORDER BY t1.`id`) AS `running`\nFROM proj.`T` t1"
    );
}

#[test]
fn test_user_function_registration() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let name = col(&mut dag, t, "name");
    let agent = dag.map(name, "parse_ua", DataType::String).unwrap();
    let root = dag.project(t, &[agent]).unwrap();

    let mut compiler = Compiler::default();
    assert_eq!(
        compiler.compile(&dag, root).unwrap(),
        "SELECT dfql_udf_1(t1.`name`) AS `name`\nFROM proj.`T` t1"
    );
    let udfs: Vec<_> = compiler.context().udfs().collect();
    assert_eq!(udfs, vec![("parse_ua", "dfql_udf_1")]);
}

#[test]
fn test_beautified_projection() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let score = col(&mut dag, t, "score");
    let one = dag.literal(1).unwrap();
    let bumped = dag.binary(BinaryOp::Add, score, one).unwrap();
    let bumped = dag.rename(bumped, "bumped").unwrap();
    let root = dag.project(t, &[id, bumped]).unwrap();

    let options = CompilerOptions {
        beautify: true,
        ..CompilerOptions::default()
    };
    assert_eq!(
        Compiler::new(options).compile(&dag, root).unwrap(),
        "SELECT\n  t1.`id`,\n  t1.`score` + 1 AS `bumped`\nFROM proj.`T` t1"
    );
}

#[test]
fn test_compile_is_deterministic() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let id = col(&mut dag, t, "id");
    let name = col(&mut dag, t, "name");
    let root = dag.project(t, &[name, id]).unwrap();

    let mut compiler = Compiler::default();
    let first = compiler.compile(&dag, root).unwrap();
    let second = compiler.compile(&dag, root).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "SELECT t1.`name`, t1.`id`\nFROM proj.`T` t1");
}

#[test]
fn test_plan_to_sql() {
    let mut dag = Dag::new();
    let t = table(&mut dag, "T");
    let plan = Plan { dag, root: t };
    assert_eq!(plan.to_sql().unwrap(), "SELECT *\nFROM proj.`T` t1");
}
