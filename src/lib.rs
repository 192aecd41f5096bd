//! # dfql — DataFrame expressions to SQL
//!
//! dfql compiles a typed expression DAG built with dataframe-style
//! operations into one SQL statement for the ODPS dialect.
//!
//! ## Quick Example
//!
//! ```
//! use dfql::prelude::*;
//!
//! let mut dag = Dag::new();
//! let schema = Schema::from_pairs([("id", DataType::Int64), ("name", DataType::String)])?;
//! let t = dag.source("proj", "T", schema);
//! let id = dag.column(t, "id")?;
//! let zero = dag.literal(0)?;
//! let positive = dag.binary(BinaryOp::Gt, id, zero)?;
//! let filtered = dag.filter(t, positive)?;
//! let fid = dag.column(filtered, "id")?;
//! let fname = dag.column(filtered, "name")?;
//! let root = dag.project(filtered, &[fid, fname])?;
//!
//! let sql = dfql::compile(&dag, root)?;
//! assert_eq!(
//!     sql,
//!     "SELECT t1.`id`, t1.`name`\nFROM proj.`T` t1\nWHERE t1.`id` > 0"
//! );
//! # Ok::<(), DfqlError>(())
//! ```
//!
//! ## Shape of the output
//!
//! | Operator        | Clause                   |
//! |-----------------|--------------------------|
//! | `project`       | `SELECT`                 |
//! | `filter`        | `WHERE`                  |
//! | `group_by`      | `GROUP BY` / `HAVING`    |
//! | `sort`          | `ORDER BY` (+ `LIMIT`)   |
//! | `limit`         | `LIMIT`                  |
//! | `join`          | `FROM .. JOIN .. ON`     |
//! | `union`         | `UNION ALL` derived table |
//!
//! An operator whose clause is already taken at the current level wraps the
//! level as a derived table and continues on top of it.

pub mod ast;
pub mod config;
pub mod error;
pub mod transpiler;
pub mod types;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::CompilerOptions;
    pub use crate::error::*;
    pub use crate::transpiler::{Compiler, ToSql};
    pub use crate::types::*;
}

/// Compile `root` of `dag` with default options.
pub fn compile(dag: &ast::Dag, root: ast::NodeId) -> error::DfqlResult<String> {
    transpiler::Compiler::default().compile(dag, root)
}
