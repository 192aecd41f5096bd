//! Window functions.

use crate::ast::{CumulativeFunc, NodeId, RankFunc, ShiftFunc, Value, WindowFrame, WindowSpec};
use crate::error::DfqlResult;
use crate::transpiler::compiler::SqlCompiler;
use crate::transpiler::render::render_value;
use crate::types::DataType;

fn frame_clause(frame: WindowFrame) -> String {
    match frame {
        WindowFrame::Preceding(n) => format!("ROWS {} PRECEDING", n),
        WindowFrame::Following(n) => format!("ROWS {} FOLLOWING", n),
        WindowFrame::Between {
            preceding,
            following,
        } => format!("ROWS BETWEEN {} PRECEDING AND {} FOLLOWING", preceding, following),
        WindowFrame::PrecedingRange(a, b) => {
            format!("ROWS BETWEEN {} PRECEDING AND {} PRECEDING", a, b)
        }
        WindowFrame::FollowingRange(a, b) => {
            format!("ROWS BETWEEN {} FOLLOWING AND {} FOLLOWING", a, b)
        }
    }
}

impl SqlCompiler<'_> {
    /// `OVER (PARTITION BY .. [ORDER BY ..] [frame])`. An empty partition
    /// list partitions by the constant `1`.
    fn over_clause(&mut self, spec: &WindowSpec) -> DfqlResult<String> {
        let partition = if spec.partition_by.is_empty() {
            "1".to_string()
        } else {
            spec.partition_by
                .iter()
                .map(|id| self.fragment(*id))
                .collect::<DfqlResult<Vec<_>>>()?
                .join(", ")
        };
        let mut parts = vec![format!("PARTITION BY {}", partition)];
        if !spec.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.sort_keys(&spec.order_by)?.join(", ")));
        }
        if let Some(frame) = spec.frame {
            parts.push(frame_clause(frame));
        }
        Ok(format!("OVER ({})", parts.join(" ")))
    }

    pub(crate) fn render_cumulative(
        &mut self,
        func: CumulativeFunc,
        input: NodeId,
        distinct: bool,
        spec: &WindowSpec,
    ) -> DfqlResult<String> {
        let mut arg = self.fragment(input)?;
        if func == CumulativeFunc::Sum && self.dtype(input)? == DataType::Boolean {
            arg = format!("IF({}, 1, 0)", arg);
        }
        if distinct {
            arg = format!("DISTINCT {}", arg);
        }
        let over = self.over_clause(spec)?;
        Ok(format!("{}({}) {}", func.sql_name(), arg, over))
    }

    pub(crate) fn render_rank(&mut self, func: RankFunc, spec: &WindowSpec) -> DfqlResult<String> {
        let over = self.over_clause(spec)?;
        Ok(format!("{}() {}", func.sql_name(), over))
    }

    pub(crate) fn render_shift(
        &mut self,
        func: ShiftFunc,
        input: NodeId,
        offset: i64,
        default: Option<&Value>,
        spec: &WindowSpec,
    ) -> DfqlResult<String> {
        let mut args = vec![self.fragment(input)?, offset.to_string()];
        if let Some(value) = default.filter(|v| !v.is_null()) {
            args.push(render_value(value));
        }
        let over = self.over_clause(spec)?;
        Ok(format!("{}({}) {}", func.sql_name(), args.join(", "), over))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clause() {
        assert_eq!(frame_clause(WindowFrame::Preceding(3)), "ROWS 3 PRECEDING");
        assert_eq!(
            frame_clause(WindowFrame::Between {
                preceding: 2,
                following: 1
            }),
            "ROWS BETWEEN 2 PRECEDING AND 1 FOLLOWING"
        );
        assert_eq!(
            frame_clause(WindowFrame::FollowingRange(1, 4)),
            "ROWS BETWEEN 1 FOLLOWING AND 4 FOLLOWING"
        );
    }
}
