use dfql::prelude::*;

fn orders(dag: &mut Dag) -> NodeId {
    let schema = Schema::from_pairs([
        ("user_id", DataType::Int64),
        ("amount", DataType::Decimal),
        ("city", DataType::String),
    ])
    .expect("valid schema");
    dag.source("sales", "orders", schema)
}

/// Revenue per city, largest first.
fn revenue_plan() -> Plan {
    let mut dag = Dag::new();
    let t = orders(&mut dag);
    let city = dag.column(t, "city").unwrap();
    let amount = dag.column(t, "amount").unwrap();
    let total = dag.reduce(ReductionFunc::Sum, amount).unwrap();
    let total = dag.rename(total, "revenue").unwrap();
    let grouped = dag.group_by(t, &[city], &[total]).unwrap();
    let revenue = dag.column(grouped, "revenue").unwrap();
    let root = dag.sort(grouped, vec![SortKey::desc(revenue)]).unwrap();
    Plan { dag, root }
}

#[test]
fn test_sorted_aggregate() {
    let plan = revenue_plan();
    let sql = dfql::compile(&plan.dag, plan.root).expect("Failed to compile plan");
    assert_eq!(
        sql,
        "SELECT *\n\
         FROM (\n  \
           SELECT t1.`city`, SUM(t1.`amount`) AS `revenue`\n  \
           FROM sales.`orders` t1\n  \
           GROUP BY t1.`city`\n\
         ) t2\n\
         ORDER BY t2.`revenue` DESC\n\
         LIMIT 10000"
    );
}

#[test]
fn test_plan_survives_json() {
    let plan = revenue_plan();
    let json = plan.to_json().expect("Failed to serialize plan");
    let loaded = Plan::from_json(&json).expect("Failed to load plan");
    assert_eq!(loaded, plan);
    assert_eq!(loaded.to_sql().unwrap(), plan.to_sql().unwrap());
}

#[test]
fn test_invalid_plan_json() {
    assert!(Plan::from_json("{\"dag\": {\"nodes\": []}, \"root\": 0}").is_err());
    assert!(Plan::from_json("not json").is_err());
}

#[test]
fn test_options_from_toml() {
    let options = CompilerOptions::from_toml_str(
        r#"
        indent_size = 4
        default_sort_limit = 100
        "#,
    )
    .expect("Failed to parse options");
    assert_eq!(options.indent_size, 4);
    assert!(!options.beautify);

    let sql = revenue_plan().to_sql_with(&options).unwrap();
    assert!(sql.contains("\n    SELECT t1.`city`"));
    assert!(sql.ends_with("LIMIT 100"));

    assert!(CompilerOptions::from_toml_str("udf_prefix = \"\"").is_err());
}

#[test]
fn test_one_compiler_many_statements() {
    let plan = revenue_plan();
    let mut compiler = Compiler::default();
    let first = compiler.compile(&plan.dag, plan.root).unwrap();
    let second = compiler.compile(&plan.dag, plan.root).unwrap();
    assert_eq!(first, second);
}
