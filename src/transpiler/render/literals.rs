//! Constants and column references.

use crate::ast::{NodeId, Value};
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::compiler::SqlCompiler;
use crate::transpiler::render::cast_text;
use crate::transpiler::traits::{format_float, quote_identifier, quote_string};

/// SQL text of a constant. Datetimes are taken as UTC.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(true) => "true".to_string(),
        Value::Boolean(false) => "false".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Decimal(d) => format!("CAST('{}' AS DECIMAL)", d),
        Value::String(s) => quote_string(s),
        Value::Datetime(dt) => format!("FROM_UNIXTIME({})", dt.and_utc().timestamp()),
    }
}

impl SqlCompiler<'_> {
    pub(crate) fn render_literal(&self, id: NodeId, value: &Value) -> DfqlResult<String> {
        let text = render_value(value);
        match value.dtype() {
            Some(natural) => Ok(cast_text(&text, natural, self.dtype(id)?)),
            None => Ok(text),
        }
    }

    pub(crate) fn render_column(&self, id: NodeId, collection: NodeId) -> DfqlResult<String> {
        let typed = self.dag.get(id)?.typed().ok_or_else(|| {
            DfqlError::inconsistent(format!("column {} has no value shape", id))
        })?;
        let source = typed
            .source_name
            .as_deref()
            .ok_or_else(|| DfqlError::schema(format!("column {} has no field name", id)))?;
        let (alias, field) = self.column_ref(collection, source)?;
        let text = format!("{}.{}", alias, quote_identifier(&field));
        Ok(cast_text(&text, typed.source_dtype, typed.dtype))
    }
}
