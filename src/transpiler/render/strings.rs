//! String and datetime accessors.

use crate::ast::{DatetimeField, NodeId, StringOp};
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::compiler::SqlCompiler;
use crate::transpiler::traits::{escape_regex, quote_string};

impl SqlCompiler<'_> {
    pub(crate) fn render_string(&self, input: NodeId, op: &StringOp) -> DfqlResult<String> {
        let x = self.fragment(input)?;
        let unsupported = |detail: &str| -> DfqlResult<String> {
            Err(DfqlError::unsupported(format!("str.{} {}", op.name(), detail)))
        };

        match op {
            StringOp::Capitalize => Ok(format!(
                "CONCAT(TOUPPER(SUBSTR({x}, 1, 1)), TOLOWER(SUBSTR({x}, 2)))"
            )),
            StringOp::Contains {
                pat,
                case,
                regex,
                flags,
            } => {
                if !*case || *flags != 0 {
                    return unsupported("with case-insensitive or flagged matching");
                }
                let func = if *regex { "REGEXP_INSTR" } else { "INSTR" };
                Ok(format!("{}({}, {}) > 0", func, x, quote_string(pat)))
            }
            StringOp::Count { pat, flags } => {
                if *flags != 0 {
                    return unsupported("with regex flags");
                }
                Ok(format!("REGEXP_COUNT({}, {})", x, quote_string(pat)))
            }
            StringOp::Endswith { pat } => Ok(format!(
                "INSTR(REVERSE({}), REVERSE({})) == 1",
                x,
                quote_string(pat)
            )),
            StringOp::Startswith { pat } => Ok(format!("INSTR({}, {}) == 1", x, quote_string(pat))),
            StringOp::Extract { pat, flags, group } => {
                if *flags != 0 {
                    return unsupported("with regex flags");
                }
                Ok(format!("REGEXP_EXTRACT({}, {}, {})", x, quote_string(pat), group))
            }
            StringOp::Find { sub, start, end } => {
                if end.is_some() {
                    return unsupported("with an end offset");
                }
                let start = if *start >= 0 { start + 1 } else { *start };
                Ok(format!("INSTR({}, {}, {}) - 1", x, quote_string(sub), start))
            }
            StringOp::Replace {
                pat,
                repl,
                n,
                case,
                flags,
                regex,
            } => {
                if !*case || *flags != 0 {
                    return unsupported("with case-insensitive or flagged matching");
                }
                let pat = if *regex { pat.clone() } else { escape_regex(pat) };
                Ok(format!(
                    "REGEXP_REPLACE({}, {}, {}, {})",
                    x,
                    quote_string(&pat),
                    quote_string(repl),
                    if *n < 0 { 0 } else { *n }
                ))
            }
            StringOp::Get { index } => Ok(format!("SUBSTR({}, {}, 1)", x, index + 1)),
            StringOp::Len => Ok(format!("LENGTH({})", x)),
            StringOp::Lower => Ok(format!("TOLOWER({})", x)),
            StringOp::Upper => Ok(format!("TOUPPER({})", x)),
            StringOp::Lstrip { to_strip }
            | StringOp::Rstrip { to_strip }
            | StringOp::Strip { to_strip } => {
                let func = match op {
                    StringOp::Lstrip { .. } => "LTRIM",
                    StringOp::Rstrip { .. } => "RTRIM",
                    _ => "TRIM",
                };
                match to_strip.as_deref() {
                    None | Some(" ") => Ok(format!("{}({})", func, x)),
                    Some(_) => unsupported("of characters other than spaces"),
                }
            }
            StringOp::Repeat { repeats } => Ok(format!("REPEAT({}, {})", x, repeats)),
            StringOp::Substr {
                start,
                length: Some(length),
            } => Ok(format!("SUBSTR({}, {}, {})", x, start + 1, length)),
            StringOp::Substr { start, length: None } => {
                Ok(format!("SUBSTR({}, {})", x, start + 1))
            }
        }
    }

    pub(crate) fn render_datetime(&self, input: NodeId, field: DatetimeField) -> DfqlResult<String> {
        let x = self.fragment(input)?;
        let part = match field {
            DatetimeField::Year => "yyyy",
            DatetimeField::Month => "mm",
            DatetimeField::Day => "dd",
            DatetimeField::Hour => "hh",
            DatetimeField::Minute => "mi",
            DatetimeField::Second => "ss",
            DatetimeField::WeekOfYear => return Ok(format!("WEEKOFYEAR({})", x)),
            DatetimeField::WeekDay => return Ok(format!("WEEKDAY({})", x)),
            DatetimeField::Microsecond | DatetimeField::DayOfYear => {
                return Err(DfqlError::unsupported(format!("datetime field {:?}", field)));
            }
        };
        Ok(format!("DATEPART({}, '{}')", x, part))
    }
}
