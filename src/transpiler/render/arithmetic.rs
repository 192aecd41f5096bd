//! Operators, math functions, casts and user functions.

use crate::ast::{BinaryOp, MathFunc, NodeId, UdfId, UnaryOp};
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::compiler::SqlCompiler;
use crate::transpiler::render::cast_text;
use crate::transpiler::traits::format_float;
use crate::types::DataType;

impl SqlCompiler<'_> {
    pub(crate) fn render_binary(
        &self,
        id: NodeId,
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    ) -> DfqlResult<String> {
        let dtype = self.dtype(id)?;
        match op {
            BinaryOp::Add if dtype == DataType::String => Ok(format!(
                "CONCAT({}, {})",
                self.fragment(lhs)?,
                self.fragment(rhs)?
            )),
            BinaryOp::Power => {
                let pow = format!("POW({}, {})", self.fragment(lhs)?, self.fragment(rhs)?);
                if dtype.is_float() {
                    Ok(pow)
                } else {
                    Ok(cast_text(&pow, DataType::Float64, dtype))
                }
            }
            _ => Ok(format!(
                "{} {} {}",
                self.operand(lhs)?,
                op.symbol(),
                self.operand(rhs)?
            )),
        }
    }

    pub(crate) fn render_unary(&self, op: UnaryOp, input: NodeId) -> DfqlResult<String> {
        let dtype = self.dtype(input)?;
        match op {
            UnaryOp::Negate | UnaryOp::Invert if dtype == DataType::Boolean => {
                Ok(format!("NOT {}", self.operand(input)?))
            }
            UnaryOp::Negate => Ok(format!("-{}", self.operand(input)?)),
            UnaryOp::Invert => Err(DfqlError::unsupported(format!(
                "bitwise invert of {}",
                dtype
            ))),
            UnaryOp::Abs => Ok(format!("ABS({})", self.fragment(input)?)),
        }
    }

    pub(crate) fn render_math(&self, func: MathFunc, input: NodeId) -> DfqlResult<String> {
        let x = self.fragment(input)?;
        let plain = match func {
            MathFunc::Abs => "ABS",
            MathFunc::Sqrt => "SQRT",
            MathFunc::Sin => "SIN",
            MathFunc::Sinh => "SINH",
            MathFunc::Cos => "COS",
            MathFunc::Cosh => "COSH",
            MathFunc::Tan => "TAN",
            MathFunc::Tanh => "TANH",
            MathFunc::Exp => "EXP",
            MathFunc::Arccos => "ACOS",
            MathFunc::Arcsin => "ASIN",
            MathFunc::Arctan => "ATAN",
            MathFunc::Ceil => "CEIL",
            MathFunc::Floor => "FLOOR",
            MathFunc::Expm1 => return Ok(format!("EXP({}) - 1", x)),
            MathFunc::Log { base: None } => return Ok(format!("LN({})", x)),
            MathFunc::Log { base: Some(b) } => {
                return Ok(format!("LOG({}, {})", format_float(b), x));
            }
            MathFunc::Log2 => return Ok(format!("LOG(2, {})", x)),
            MathFunc::Log10 => return Ok(format!("LOG(10, {})", x)),
            MathFunc::Log1p => return Ok(format!("LN(1 + {})", x)),
            MathFunc::Trunc { decimals: None } => return Ok(format!("TRUNC({})", x)),
            MathFunc::Trunc { decimals: Some(d) } => return Ok(format!("TRUNC({}, {})", x, d)),
            MathFunc::Arccosh
            | MathFunc::Arcsinh
            | MathFunc::Arctanh
            | MathFunc::Radians
            | MathFunc::Degrees => {
                return Err(DfqlError::unsupported(format!("math function {}", func.name())));
            }
        };
        Ok(format!("{}({})", plain, x))
    }

    pub(crate) fn render_cast(&self, id: NodeId, input: NodeId) -> DfqlResult<String> {
        Ok(cast_text(&self.fragment(input)?, self.dtype(input)?, self.dtype(id)?))
    }

    /// Call of a user function under its generated name.
    pub(crate) fn render_map(&mut self, input: NodeId, udf: UdfId) -> DfqlResult<String> {
        let function = self.dag.udf(udf)?.name.clone();
        let name = self.ctx.register_udf(&function, &self.options.udf_prefix);
        Ok(format!("{}({})", name, self.fragment(input)?))
    }
}
