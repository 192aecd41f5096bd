//! SQL transpiler for expression DAGs.
//!
//! Converts a DAG root into one ODPS SQL statement.
//!
//! # Modules
//!
//! - `traits` - Quoting and text helpers
//! - `context` - Aliases, rendered fragments and function registry
//! - `clauses` - Clause slots of one query level
//! - `compiler` - Level building, promotion and pre-compiled branches
//! - `render` - Per-kind node rendering

pub mod clauses;
pub mod compiler;
pub mod context;
pub mod render;
pub mod traits;

#[cfg(test)]
mod tests;

pub use clauses::{Clause, Clauses, SelectItem};
pub use compiler::Compiler;
pub use context::CompileContext;
pub use traits::*;

use crate::ast::Plan;
use crate::config::CompilerOptions;
use crate::error::DfqlResult;

/// Trait for converting plans to SQL.
pub trait ToSql {
    /// Convert to SQL with default options.
    fn to_sql(&self) -> DfqlResult<String> {
        self.to_sql_with(&CompilerOptions::default())
    }

    /// Convert to SQL with explicit options.
    fn to_sql_with(&self, options: &CompilerOptions) -> DfqlResult<String>;
}

impl ToSql for Plan {
    fn to_sql_with(&self, options: &CompilerOptions) -> DfqlResult<String> {
        Compiler::new(options.clone()).compile(&self.dag, self.root)
    }
}
