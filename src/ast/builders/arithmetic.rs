//! Literals, operators, math functions, casts and renames.

use crate::ast::dag::Dag;
use crate::ast::expr::{NodeId, NodeKind, Shape, Typed, Udf};
use crate::ast::operators::{BinaryOp, DatetimeField, MathFunc, UnaryOp};
use crate::ast::values::Value;
use crate::error::{DfqlError, DfqlResult};
use crate::types::{DataType, highest_precedence};

impl Dag {
    /// Scalar constant. Use [`Dag::null`] for typed nulls.
    pub fn literal(&mut self, value: impl Into<Value>) -> DfqlResult<NodeId> {
        let value = value.into();
        let dtype = value
            .dtype()
            .ok_or_else(|| DfqlError::inconsistent("null literal needs an explicit type"))?;
        Ok(self.push(NodeKind::Literal { value }, Shape::Scalar(Typed::new(dtype, None))))
    }

    pub fn null(&mut self, dtype: DataType) -> NodeId {
        self.push(
            NodeKind::Literal { value: Value::Null },
            Shape::Scalar(Typed::new(dtype, None)),
        )
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> DfqlResult<NodeId> {
        let l = self.dtype_of(lhs)?;
        let r = self.dtype_of(rhs)?;
        let dtype = binary_type(op, l, r)?;
        let typed = Typed::new(dtype, self.first_name(&[lhs, rhs]));
        let shape = self.value_shape(&[lhs, rhs], typed);
        Ok(self.push(NodeKind::Binary { op, lhs, rhs }, shape))
    }

    pub fn unary(&mut self, op: UnaryOp, input: NodeId) -> DfqlResult<NodeId> {
        let dtype = self.dtype_of(input)?;
        let allowed = match op {
            UnaryOp::Negate => dtype.is_number() || dtype == DataType::Boolean,
            UnaryOp::Invert => dtype.is_integer() || dtype == DataType::Boolean,
            UnaryOp::Abs => dtype.is_number(),
        };
        if !allowed {
            return Err(DfqlError::unsupported(format!("{:?} on {}", op, dtype)));
        }
        let typed = Typed::new(dtype, self.first_name(&[input]));
        let shape = self.value_shape(&[input], typed);
        Ok(self.push(NodeKind::Unary { op, input }, shape))
    }

    pub fn math(&mut self, func: MathFunc, input: NodeId) -> DfqlResult<NodeId> {
        let input_type = self.dtype_of(input)?;
        if !input_type.is_number() {
            return Err(DfqlError::cast(input_type, DataType::Float64));
        }
        let dtype = match func {
            MathFunc::Abs => input_type,
            MathFunc::Ceil | MathFunc::Floor if input_type.is_integer() => input_type,
            _ if input_type == DataType::Decimal => DataType::Decimal,
            _ => DataType::Float64,
        };
        let typed = Typed::new(dtype, self.first_name(&[input]));
        let shape = self.value_shape(&[input], typed);
        Ok(self.push(NodeKind::Math { func, input }, shape))
    }

    pub fn datetime_field(&mut self, input: NodeId, field: DatetimeField) -> DfqlResult<NodeId> {
        let input_type = self.dtype_of(input)?;
        if input_type != DataType::Datetime {
            return Err(DfqlError::cast(input_type, DataType::Datetime));
        }
        let typed = Typed::new(DataType::Int64, self.first_name(&[input]));
        let shape = self.value_shape(&[input], typed);
        Ok(self.push(NodeKind::Datetime { input, field }, shape))
    }

    /// Change the type of a value. Other values get a `Cast` node.
    ///
    /// A cast column stays a `Column` node: its `source_dtype` keeps the
    /// stored type and the reference renders as `CAST(.. AS ..)`.
    pub fn astype(&mut self, input: NodeId, dtype: DataType) -> DfqlResult<NodeId> {
        let node = self.get(input)?.clone();
        let typed = self.typed_of(input)?.clone();
        if typed.dtype == dtype {
            return Ok(input);
        }
        let epoch = typed.dtype.is_integer() && dtype == DataType::Datetime;
        if !epoch {
            dtype.check_explicit_cast(typed.dtype)?;
        }

        if let NodeKind::Column { .. } = node.kind {
            let mut cast = typed;
            cast.dtype = dtype;
            let shape = self.value_shape(&[input], cast);
            return Ok(self.push(node.kind, shape));
        }
        let cast = Typed {
            dtype,
            source_dtype: typed.dtype,
            name: typed.name.clone(),
            source_name: typed.name,
        };
        let shape = self.value_shape(&[input], cast);
        Ok(self.push(NodeKind::Cast { input }, shape))
    }

    /// Copy of `input` under a new name; the source name is kept.
    pub fn rename(&mut self, input: NodeId, name: &str) -> DfqlResult<NodeId> {
        if name.is_empty() {
            return Err(DfqlError::schema("field name cannot be empty"));
        }
        let node = self.get(input)?.clone();
        let shape = match node.shape {
            Shape::Sequence(mut t) => {
                t.name = Some(name.to_string());
                Shape::Sequence(t)
            }
            Shape::Scalar(mut t) => {
                t.name = Some(name.to_string());
                Shape::Scalar(t)
            }
            Shape::Collection { .. } => {
                return Err(DfqlError::inconsistent("collections cannot be renamed"));
            }
        };
        Ok(self.push(node.kind, shape))
    }

    /// Apply a user function deployed under a generated name.
    pub fn map(&mut self, input: NodeId, function: &str, output: DataType) -> DfqlResult<NodeId> {
        self.typed_of(input)?;
        let udf = self.push_udf(Udf {
            name: function.to_string(),
            output,
        });
        let typed = Typed::new(output, self.first_name(&[input]));
        let shape = self.value_shape(&[input], typed);
        Ok(self.push(NodeKind::UserMap { input, udf }, shape))
    }
}

fn binary_type(op: BinaryOp, l: DataType, r: DataType) -> DfqlResult<DataType> {
    if op.is_logical() {
        for t in [l, r] {
            if t != DataType::Boolean {
                return Err(DfqlError::cast(t, DataType::Boolean));
            }
        }
        return Ok(DataType::Boolean);
    }
    let highest = highest_precedence(&[l, r])?;
    if op.is_comparison() {
        return Ok(DataType::Boolean);
    }
    if op == BinaryOp::Add && highest == DataType::String {
        return Ok(DataType::String);
    }
    if !highest.is_number() {
        return Err(DfqlError::unsupported(format!(
            "operator '{}' on {}",
            op.symbol(),
            highest
        )));
    }
    Ok(match op {
        BinaryOp::Div if highest.is_integer() => DataType::Float64,
        _ => highest,
    })
}
