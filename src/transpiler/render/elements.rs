//! Null checks, membership tests, conditionals and bucketing.

use crate::ast::{ElementOp, Membership, NodeId, Value};
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::compiler::SqlCompiler;
use crate::transpiler::render::render_value;
use crate::transpiler::traits::indent_lines;

impl SqlCompiler<'_> {
    pub(crate) fn render_element(&mut self, id: NodeId, op: &ElementOp) -> DfqlResult<String> {
        match op {
            ElementOp::IsNull { input } => Ok(format!("{} IS NULL", self.operand(*input)?)),
            ElementOp::NotNull { input } => Ok(format!("{} IS NOT NULL", self.operand(*input)?)),
            ElementOp::FillNa { input, value } => {
                let x = self.fragment(*input)?;
                Ok(format!("IF({} IS NULL, {}, {})", x, self.fragment(*value)?, x))
            }
            ElementOp::IsIn { input, values } => self.render_membership(id, *input, values, "IN"),
            ElementOp::NotIn { input, values } => {
                self.render_membership(id, *input, values, "NOT IN")
            }
            ElementOp::Between {
                input,
                left,
                right,
                inclusive,
            } => self.render_between(*input, *left, *right, *inclusive),
            ElementOp::IfElse {
                condition,
                then,
                otherwise,
            } => Ok(format!(
                "IF({}, {}, {})",
                self.fragment(*condition)?,
                self.fragment(*then)?,
                self.fragment(*otherwise)?
            )),
            ElementOp::Switch {
                case,
                conditions,
                thens,
                default,
            } => self.render_switch(*case, conditions, thens, *default),
            ElementOp::Cut {
                input,
                bins,
                right,
                labels,
                include_lowest,
                include_under,
                include_over,
            } => {
                let cut = Cut {
                    bins,
                    labels,
                    right: *right,
                    include_lowest: *include_lowest,
                    include_under: *include_under,
                    include_over: *include_over,
                };
                self.render_cut(*input, &cut)
            }
        }
    }

    fn render_membership(
        &mut self,
        id: NodeId,
        input: NodeId,
        values: &Membership,
        keyword: &str,
    ) -> DfqlResult<String> {
        let list = match values {
            Membership::Literals(ids) => ids
                .iter()
                .map(|v| self.fragment(*v))
                .collect::<DfqlResult<Vec<_>>>()?
                .join(", "),
            Membership::Subquery(_) => self.subquery(id)?,
        };
        Ok(format!("{} {} ({})", self.fragment(input)?, keyword, list))
    }

    fn render_between(
        &self,
        input: NodeId,
        left: Option<NodeId>,
        right: Option<NodeId>,
        inclusive: bool,
    ) -> DfqlResult<String> {
        let x = self.operand(input)?;
        if let (Some(l), Some(r), true) = (left, right, inclusive) {
            return Ok(format!(
                "{} BETWEEN {} AND {}",
                x,
                self.operand(l)?,
                self.operand(r)?
            ));
        }
        let (lower, upper) = if inclusive { (">=", "<=") } else { (">", "<") };
        let mut parts = Vec::with_capacity(2);
        if let Some(l) = left {
            parts.push(format!("{} {} {}", x, lower, self.operand(l)?));
        }
        if let Some(r) = right {
            parts.push(format!("{} {} {}", x, upper, self.operand(r)?));
        }
        if parts.is_empty() {
            return Err(DfqlError::inconsistent("between needs at least one bound"));
        }
        Ok(parts.join(" AND "))
    }

    fn render_switch(
        &self,
        case: Option<NodeId>,
        conditions: &[NodeId],
        thens: &[NodeId],
        default: Option<NodeId>,
    ) -> DfqlResult<String> {
        let head = match case {
            Some(c) => format!("CASE {}", self.fragment(c)?),
            None => "CASE".to_string(),
        };
        let mut branches = Vec::with_capacity(conditions.len() + 1);
        for (c, t) in conditions.iter().zip(thens) {
            branches.push(format!("WHEN {} THEN {}", self.fragment(*c)?, self.fragment(*t)?));
        }
        if let Some(d) = default {
            branches.push(format!("ELSE {}", self.fragment(d)?));
        }

        if self.options.beautify {
            let indent = self.options.indent();
            let body: Vec<String> = branches.iter().map(|b| indent_lines(b, &indent)).collect();
            Ok(format!("{}\n{}\nEND", head, body.join("\n")))
        } else {
            Ok(format!("{} {} END", head, branches.join(" ")))
        }
    }

    fn render_cut(&self, input: NodeId, cut: &Cut<'_>) -> DfqlResult<String> {
        if cut.bins.len() < 2 {
            return Err(DfqlError::inconsistent("cut needs at least two bins"));
        }
        let x = self.fragment(input)?;
        let bins: Vec<String> = cut.bins.iter().map(render_value).collect();
        let mut labels = cut.labels.iter().map(render_value);
        let mut label = || {
            labels
                .next()
                .ok_or_else(|| DfqlError::inconsistent("cut has fewer labels than buckets"))
        };

        let mut branches = Vec::new();
        if cut.include_under {
            let op = if cut.right && !cut.include_lowest { "<=" } else { "<" };
            branches.push(format!("WHEN {} {} {} THEN {}", x, op, bins[0], label()?));
        }
        let last = bins.len() - 1;
        for i in 0..last {
            let (low, high) = if cut.right {
                let low = if i == 0 && cut.include_lowest { "<=" } else { "<" };
                (low, "<=")
            } else {
                let high = if i + 1 == last && cut.include_lowest { "<=" } else { "<" };
                ("<=", high)
            };
            branches.push(format!(
                "WHEN {} {} {} AND {} {} {} THEN {}",
                bins[i],
                low,
                x,
                x,
                high,
                bins[i + 1],
                label()?
            ));
        }
        if cut.include_over {
            let op = if !cut.right && !cut.include_lowest { ">=" } else { ">" };
            branches.push(format!("WHEN {} {} {} THEN {}", x, op, bins[last], label()?));
        }

        if self.options.beautify {
            let indent = self.options.indent();
            let body: Vec<String> = branches.iter().map(|b| indent_lines(b, &indent)).collect();
            Ok(format!("CASE\n{}\nEND", body.join("\n")))
        } else {
            Ok(format!("CASE {} END", branches.join(" ")))
        }
    }
}

struct Cut<'a> {
    bins: &'a [Value],
    labels: &'a [Value],
    right: bool,
    include_lowest: bool,
    include_under: bool,
    include_over: bool,
}
