//! Aggregates.

use crate::ast::{NodeId, ReductionFunc};
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::compiler::SqlCompiler;
use crate::types::DataType;

impl SqlCompiler<'_> {
    pub(crate) fn render_reduction(
        &self,
        func: ReductionFunc,
        input: NodeId,
        ddof: i64,
    ) -> DfqlResult<String> {
        if self.dag.is_collection(input) {
            return match func {
                ReductionFunc::Count => Ok("COUNT(1)".to_string()),
                _ => Err(DfqlError::unsupported(format!(
                    "{} over a whole collection",
                    func.name()
                ))),
            };
        }

        let x = self.fragment(input)?;
        let dtype = self.dtype(input)?;
        let text = match func {
            ReductionFunc::Var | ReductionFunc::Std if ddof != 0 => {
                return Err(DfqlError::unsupported(format!(
                    "{} with ddof={}",
                    func.name(),
                    ddof
                )));
            }
            ReductionFunc::Count => format!("COUNT({})", x),
            ReductionFunc::NUnique => format!("COUNT(DISTINCT {})", x),
            ReductionFunc::Sum => match dtype {
                DataType::Boolean => format!("SUM(IF({}, 1, 0))", x),
                DataType::String => format!("WM_CONCAT('', {})", x),
                _ => format!("SUM({})", x),
            },
            ReductionFunc::Mean => format!("AVG({})", x),
            ReductionFunc::Median => format!("MEDIAN({})", x),
            ReductionFunc::Var => format!("VARIANCE({})", x),
            ReductionFunc::Std => format!("STDDEV({})", x),
            ReductionFunc::Max | ReductionFunc::Any if dtype == DataType::Boolean => {
                format!("MAX(IF({}, 1, 0)) == 1", x)
            }
            ReductionFunc::Min | ReductionFunc::All if dtype == DataType::Boolean => {
                format!("MIN(IF({}, 1, 0)) == 1", x)
            }
            ReductionFunc::Max => format!("MAX({})", x),
            ReductionFunc::Min => format!("MIN({})", x),
            ReductionFunc::Any | ReductionFunc::All => {
                return Err(DfqlError::cast(dtype, DataType::Boolean));
            }
        };
        Ok(text)
    }
}
