//! Typed constructors for DAG nodes.
//!
//! Every constructor resolves the node's shape and type up front and rejects
//! ill-typed input, so the compiler can rely on declared types.
//!
//! # Modules
//!
//! - `collections` - Sources and relational operators
//! - `arithmetic` - Literals, operators, math, casts and renames
//! - `elements` - Null checks, membership, conditionals, bucketing
//! - `strings` - String and datetime accessors
//! - `reductions` - Aggregates
//! - `windows` - Cumulative, rank and shift windows
//!
//! # Example
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
//! # Ok::<(), DfqlError>(())
//! ```

pub mod arithmetic;
pub mod collections;
pub mod elements;
pub mod reductions;
pub mod strings;
pub mod windows;

pub use elements::CutOptions;

use crate::ast::dag::Dag;
use crate::ast::expr::{NodeId, Shape, Typed};
use crate::error::{DfqlError, DfqlResult};
use crate::types::{DataType, Field, Schema};

impl Dag {
    pub(crate) fn typed_of(&self, id: NodeId) -> DfqlResult<&Typed> {
        self.get(id)?.typed().ok_or_else(|| {
            DfqlError::inconsistent(format!("expected a sequence or scalar, got collection {}", id))
        })
    }

    pub(crate) fn dtype_of(&self, id: NodeId) -> DfqlResult<DataType> {
        Ok(self.typed_of(id)?.dtype)
    }

    pub(crate) fn schema_of(&self, id: NodeId) -> DfqlResult<&Schema> {
        self.get(id)?
            .schema()
            .ok_or_else(|| DfqlError::inconsistent(format!("expected a collection, got {}", id)))
    }

    /// Sequence when any operand is a sequence, scalar otherwise.
    pub(crate) fn value_shape(&self, operands: &[NodeId], typed: Typed) -> Shape {
        let is_sequence = operands
            .iter()
            .any(|id| matches!(self.get(*id).map(|n| &n.shape), Ok(Shape::Sequence(_))));
        if is_sequence {
            Shape::Sequence(typed)
        } else {
            Shape::Scalar(typed)
        }
    }

    /// Name of the first named operand.
    pub(crate) fn first_name(&self, operands: &[NodeId]) -> Option<String> {
        operands
            .iter()
            .find_map(|id| self.get(*id).ok().and_then(|n| n.name().map(str::to_string)))
    }

    pub(crate) fn expect_boolean(&self, id: NodeId) -> DfqlResult<()> {
        let dtype = self.dtype_of(id)?;
        if dtype != DataType::Boolean {
            return Err(DfqlError::cast(dtype, DataType::Boolean));
        }
        Ok(())
    }

    /// Output schema for a list of named value fields.
    pub(crate) fn field_schema(&self, fields: &[NodeId]) -> DfqlResult<Schema> {
        let mut out = Vec::with_capacity(fields.len());
        for id in fields {
            let typed = self.typed_of(*id)?;
            let name = typed.name.clone().ok_or_else(|| {
                DfqlError::schema(format!("field {} has no name; rename it first", id))
            })?;
            out.push(Field::new(name, typed.dtype));
        }
        Schema::new(out)
    }
}
