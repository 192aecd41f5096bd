//! Null checks, membership tests, conditionals and bucketing.

use crate::ast::dag::Dag;
use crate::ast::expr::{ElementOp, Membership, NodeId, NodeKind, Typed};
use crate::ast::values::Value;
use crate::error::{DfqlError, DfqlResult};
use crate::types::{DataType, highest_precedence};

/// Interval options for [`Dag::cut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutOptions {
    /// Intervals are closed on the right.
    pub right: bool,
    /// Close the first interval on the left as well.
    pub include_lowest: bool,
    /// Extra bucket below the first bin.
    pub include_under: bool,
    /// Extra bucket above the last bin.
    pub include_over: bool,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            right: true,
            include_lowest: false,
            include_under: false,
            include_over: false,
        }
    }
}

impl Dag {
    fn push_element(&mut self, op: ElementOp, operands: &[NodeId], typed: Typed) -> NodeId {
        let shape = self.value_shape(operands, typed);
        self.push(NodeKind::Element(op), shape)
    }

    pub fn is_null(&mut self, input: NodeId) -> DfqlResult<NodeId> {
        let typed = Typed::new(DataType::Boolean, self.typed_of(input)?.name.clone());
        Ok(self.push_element(ElementOp::IsNull { input }, &[input], typed))
    }

    pub fn not_null(&mut self, input: NodeId) -> DfqlResult<NodeId> {
        let typed = Typed::new(DataType::Boolean, self.typed_of(input)?.name.clone());
        Ok(self.push_element(ElementOp::NotNull { input }, &[input], typed))
    }

    /// Replace nulls with `value`.
    pub fn fillna(&mut self, input: NodeId, value: NodeId) -> DfqlResult<NodeId> {
        let input_type = self.typed_of(input)?.clone();
        let value_type = self.dtype_of(value)?;
        if !input_type.dtype.can_implicit_cast(value_type) {
            return Err(DfqlError::cast(value_type, input_type.dtype));
        }
        let typed = Typed::new(input_type.dtype, input_type.name);
        Ok(self.push_element(ElementOp::FillNa { input, value }, &[input, value], typed))
    }

    pub fn isin(&mut self, input: NodeId, values: Vec<Value>) -> DfqlResult<NodeId> {
        let values = self.membership_literals(input, values)?;
        self.membership(input, values, false)
    }

    pub fn notin(&mut self, input: NodeId, values: Vec<Value>) -> DfqlResult<NodeId> {
        let values = self.membership_literals(input, values)?;
        self.membership(input, values, true)
    }

    /// Membership in the values of another collection's sequence.
    pub fn isin_subquery(&mut self, input: NodeId, sequence: NodeId) -> DfqlResult<NodeId> {
        self.membership(input, Membership::Subquery(sequence), false)
    }

    pub fn notin_subquery(&mut self, input: NodeId, sequence: NodeId) -> DfqlResult<NodeId> {
        self.membership(input, Membership::Subquery(sequence), true)
    }

    fn membership_literals(&mut self, input: NodeId, values: Vec<Value>) -> DfqlResult<Membership> {
        if values.is_empty() {
            return Err(DfqlError::inconsistent("membership test needs at least one value"));
        }
        let dtype = self.dtype_of(input)?;
        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            let id = match value.dtype() {
                None => self.null(dtype),
                Some(_) => self.literal(value)?,
            };
            ids.push(id);
        }
        Ok(Membership::Literals(ids))
    }

    fn membership(&mut self, input: NodeId, values: Membership, negate: bool) -> DfqlResult<NodeId> {
        let typed = self.typed_of(input)?.clone();
        let operands: Vec<NodeId> = match &values {
            Membership::Literals(ids) => ids.clone(),
            Membership::Subquery(seq) => vec![*seq],
        };
        for id in &operands {
            highest_precedence(&[typed.dtype, self.dtype_of(*id)?])?;
        }
        if let Membership::Subquery(seq) = &values {
            self.owning_collection(*seq)?;
        }
        let op = if negate {
            ElementOp::NotIn { input, values }
        } else {
            ElementOp::IsIn { input, values }
        };
        Ok(self.push_element(op, &[input], Typed::new(DataType::Boolean, typed.name)))
    }

    /// `left <= input <= right`; either bound may be open.
    pub fn between(
        &mut self,
        input: NodeId,
        left: Option<NodeId>,
        right: Option<NodeId>,
        inclusive: bool,
    ) -> DfqlResult<NodeId> {
        if left.is_none() && right.is_none() {
            return Err(DfqlError::inconsistent("between needs at least one bound"));
        }
        let typed = self.typed_of(input)?.clone();
        let mut operands = vec![input];
        for bound in left.iter().chain(right.iter()) {
            highest_precedence(&[typed.dtype, self.dtype_of(*bound)?])?;
            operands.push(*bound);
        }
        let op = ElementOp::Between {
            input,
            left,
            right,
            inclusive,
        };
        Ok(self.push_element(op, &operands, Typed::new(DataType::Boolean, typed.name)))
    }

    pub fn if_else(&mut self, condition: NodeId, then: NodeId, otherwise: NodeId) -> DfqlResult<NodeId> {
        self.expect_boolean(condition)?;
        let dtype = highest_precedence(&[self.dtype_of(then)?, self.dtype_of(otherwise)?])?;
        let typed = Typed::new(dtype, self.first_name(&[condition, then, otherwise]));
        let op = ElementOp::IfElse {
            condition,
            then,
            otherwise,
        };
        Ok(self.push_element(op, &[condition, then, otherwise], typed))
    }

    /// `CASE [case] WHEN .. THEN .. [ELSE default] END`. With a `case`
    /// operand the conditions are values compared against it.
    pub fn switch(
        &mut self,
        case: Option<NodeId>,
        conditions: &[NodeId],
        thens: &[NodeId],
        default: Option<NodeId>,
    ) -> DfqlResult<NodeId> {
        if conditions.is_empty() || conditions.len() != thens.len() {
            return Err(DfqlError::inconsistent(
                "switch needs one result per condition and at least one branch",
            ));
        }
        for c in conditions {
            match case {
                Some(case) => {
                    highest_precedence(&[self.dtype_of(case)?, self.dtype_of(*c)?])?;
                }
                None => self.expect_boolean(*c)?,
            }
        }
        let mut result_types = Vec::with_capacity(thens.len() + 1);
        for id in thens.iter().chain(default.iter()) {
            result_types.push(self.dtype_of(*id)?);
        }
        let dtype = highest_precedence(&result_types)?;

        let mut operands: Vec<NodeId> = case.into_iter().collect();
        operands.extend_from_slice(conditions);
        operands.extend_from_slice(thens);
        operands.extend(default);
        let typed = Typed::new(dtype, self.first_name(&operands));
        let op = ElementOp::Switch {
            case,
            conditions: conditions.to_vec(),
            thens: thens.to_vec(),
            default,
        };
        Ok(self.push_element(op, &operands, typed))
    }

    /// Bucket `input` by `bins`. Labels default to `0..n`.
    pub fn cut(
        &mut self,
        input: NodeId,
        bins: Vec<Value>,
        labels: Option<Vec<Value>>,
        options: CutOptions,
    ) -> DfqlResult<NodeId> {
        let typed = self.typed_of(input)?.clone();
        if bins.len() < 2 {
            return Err(DfqlError::inconsistent("cut needs at least two bins"));
        }
        let buckets = bins.len() - 1
            + usize::from(options.include_under)
            + usize::from(options.include_over);
        let labels = labels.unwrap_or_else(|| (0..buckets as i64).map(Value::Integer).collect());
        if labels.len() != buckets {
            return Err(DfqlError::inconsistent(format!(
                "cut produces {} buckets but {} labels were given",
                buckets,
                labels.len()
            )));
        }
        for bin in &bins {
            let Some(t) = bin.dtype() else {
                return Err(DfqlError::inconsistent("cut bins cannot be null"));
            };
            highest_precedence(&[typed.dtype, t])?;
        }
        let label_types: Vec<DataType> = labels.iter().filter_map(Value::dtype).collect();
        let dtype = if label_types.is_empty() {
            DataType::Int64
        } else {
            highest_precedence(&label_types)?
        };
        let op = ElementOp::Cut {
            input,
            bins,
            right: options.right,
            labels,
            include_lowest: options.include_lowest,
            include_under: options.include_under,
            include_over: options.include_over,
        };
        Ok(self.push_element(op, &[input], Typed::new(dtype, typed.name)))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn setup() -> (Dag, NodeId) {
        let mut dag = Dag::new();
        let schema = Schema::from_pairs([("id", DataType::Int64), ("name", DataType::String)]).unwrap();
        let t = dag.source("proj", "T", schema);
        (dag, t)
    }

    #[test]
    fn test_if_else_resolves_branch_type() {
        let (mut dag, t) = setup();
        let id = dag.column(t, "id").unwrap();
        let cond = dag.is_null(id).unwrap();
        let zero = dag.literal(0.5).unwrap();
        let out = dag.if_else(cond, zero, id).unwrap();
        assert_eq!(dag.get(out).unwrap().dtype(), Some(DataType::Float64));
    }

    #[test]
    fn test_switch_branch_mismatch() {
        let (mut dag, t) = setup();
        let id = dag.column(t, "id").unwrap();
        let name = dag.column(t, "name").unwrap();
        let one = dag.literal(1).unwrap();
        assert!(dag.switch(Some(id), &[one], &[name], Some(one)).is_err());
        assert!(dag.switch(None, &[id], &[one], None).is_err());
    }

    #[test]
    fn test_cut_label_count() {
        let (mut dag, t) = setup();
        let id = dag.column(t, "id").unwrap();
        let bins = vec![Value::Integer(0), Value::Integer(10), Value::Integer(20)];
        let cut = dag.cut(id, bins.clone(), None, CutOptions::default()).unwrap();
        assert_eq!(dag.get(cut).unwrap().dtype(), Some(DataType::Int64));

        let labels = vec![Value::from("low")];
        assert!(dag.cut(id, bins, Some(labels), CutOptions::default()).is_err());
    }

    #[test]
    fn test_isin_rejects_incompatible_values() {
        let (mut dag, t) = setup();
        let id = dag.column(t, "id").unwrap();
        assert!(dag.isin(id, vec![Value::from("a")]).is_err());
        assert!(dag.isin(id, vec![]).is_err());
        assert!(dag.isin(id, vec![Value::Integer(1), Value::Null]).is_ok());
    }
}
