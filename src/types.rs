//! Primitive data types, coercion rules and schemas.
//!
//! The lattice is closed: every typed node carries one of the [`DataType`]
//! variants, fixed at construction. Multi-branch constructs resolve their
//! output type with [`highest_precedence`].

use crate::error::{DfqlError, DfqlResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A primitive column or value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Datetime,
}

/// All types, lowest precedence first.
pub const PRECEDENCE: [DataType; 10] = [
    DataType::Boolean,
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
    DataType::Decimal,
    DataType::Float32,
    DataType::Float64,
    DataType::Datetime,
    DataType::String,
];

impl DataType {
    /// Position in the implicit-coercion order.
    pub fn precedence(self) -> usize {
        PRECEDENCE
            .iter()
            .position(|t| *t == self)
            .unwrap_or_default()
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    /// Integers, floats and decimal.
    pub fn is_number(self) -> bool {
        self.is_integer() || self.is_float() || self == DataType::Decimal
    }

    fn int_width(self) -> u8 {
        match self {
            DataType::Int8 => 8,
            DataType::Int16 => 16,
            DataType::Int32 => 32,
            DataType::Int64 => 64,
            _ => 0,
        }
    }

    /// Whether a value of type `from` may be used where `self` is expected
    /// without an explicit cast.
    pub fn can_implicit_cast(self, from: DataType) -> bool {
        if self == from {
            return true;
        }
        match self {
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
                from.is_integer() && from.int_width() <= self.int_width()
            }
            DataType::Decimal => from.is_integer(),
            DataType::Float32 => from.is_integer() || from == DataType::Decimal,
            DataType::Float64 => from.is_number(),
            _ => false,
        }
    }

    /// Whether `CAST(<from> AS <self>)` is permitted.
    pub fn can_explicit_cast(self, from: DataType) -> bool {
        if self == from || self == DataType::String || from == DataType::String {
            return true;
        }
        let numeric = |t: DataType| t.is_number() || t == DataType::Boolean;
        numeric(self) && numeric(from)
    }

    /// Type name in the target SQL dialect.
    pub fn sql_name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int8 => "TINYINT",
            DataType::Int16 => "SMALLINT",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float32 => "FLOAT",
            DataType::Float64 => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::String => "STRING",
            DataType::Datetime => "DATETIME",
        }
    }

    /// Fails with `IllegalCast` unless the explicit cast is allowed.
    pub fn check_explicit_cast(self, from: DataType) -> DfqlResult<()> {
        if self.can_explicit_cast(from) {
            Ok(())
        } else {
            Err(DfqlError::cast(from, self))
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Decimal => "decimal",
            DataType::String => "string",
            DataType::Datetime => "datetime",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DataType {
    type Err = DfqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Ok(DataType::Boolean),
            "int8" | "tinyint" => Ok(DataType::Int8),
            "int16" | "smallint" => Ok(DataType::Int16),
            "int32" | "int" => Ok(DataType::Int32),
            "int64" | "bigint" => Ok(DataType::Int64),
            "float32" | "float" => Ok(DataType::Float32),
            "float64" | "double" => Ok(DataType::Float64),
            "decimal" => Ok(DataType::Decimal),
            "string" | "str" => Ok(DataType::String),
            "datetime" => Ok(DataType::Datetime),
            other => Err(DfqlError::schema(format!("unknown data type '{}'", other))),
        }
    }
}

/// Resolve the output type of a multi-branch construct.
///
/// The result is the highest-precedence operand type; every operand must
/// implicitly cast to it.
pub fn highest_precedence(types: &[DataType]) -> DfqlResult<DataType> {
    let Some(highest) = types.iter().copied().max_by_key(|t| t.precedence()) else {
        return Err(DfqlError::inconsistent(
            "cannot resolve the type of an empty operand list",
        ));
    };
    for t in types {
        if !highest.can_implicit_cast(*t) {
            return Err(DfqlError::cast(*t, highest));
        }
    }
    Ok(highest)
}

/// A named, typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dtype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Ordered field list with unique, non-empty names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> DfqlResult<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    /// Build from `(name, type)` pairs.
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, DataType)>,
    ) -> DfqlResult<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, dtype)| Field::new(name, dtype))
                .collect(),
        )
    }

    /// Check name rules; deserialized schemas bypass [`Schema::new`].
    pub fn validate(&self) -> DfqlResult<()> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(DfqlError::schema("field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DfqlError::schema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field lookup that fails with a schema error.
    pub fn field(&self, name: &str) -> DfqlResult<&Field> {
        self.get(name)
            .ok_or_else(|| DfqlError::schema(format!("field '{}' does not exist", name)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_precedence_numbers() {
        let t = highest_precedence(&[DataType::Int8, DataType::Int64, DataType::Int32]).unwrap();
        assert_eq!(t, DataType::Int64);

        let t = highest_precedence(&[DataType::Int64, DataType::Float32]).unwrap();
        assert_eq!(t, DataType::Float32);

        let t = highest_precedence(&[DataType::Decimal, DataType::Float64]).unwrap();
        assert_eq!(t, DataType::Float64);
    }

    #[test]
    fn test_highest_precedence_rejects_mixed_families() {
        let err = highest_precedence(&[DataType::Int64, DataType::String]).unwrap_err();
        assert!(matches!(
            err,
            DfqlError::IllegalCast {
                from: DataType::Int64,
                to: DataType::String
            }
        ));
        assert!(highest_precedence(&[]).is_err());
    }

    #[test]
    fn test_implicit_casts() {
        assert!(DataType::Int64.can_implicit_cast(DataType::Int8));
        assert!(!DataType::Int8.can_implicit_cast(DataType::Int64));
        assert!(DataType::Float64.can_implicit_cast(DataType::Decimal));
        assert!(!DataType::Boolean.can_implicit_cast(DataType::Int8));
        assert!(!DataType::Datetime.can_implicit_cast(DataType::Int64));
    }

    #[test]
    fn test_explicit_casts() {
        assert!(DataType::Int64.can_explicit_cast(DataType::Float64));
        assert!(DataType::Int64.can_explicit_cast(DataType::Boolean));
        assert!(DataType::String.can_explicit_cast(DataType::Datetime));
        assert!(DataType::Datetime.can_explicit_cast(DataType::String));
        assert!(!DataType::Datetime.can_explicit_cast(DataType::Float64));
        assert!(!DataType::Boolean.can_explicit_cast(DataType::Datetime));
    }

    #[test]
    fn test_parse_type_names() {
        assert_eq!("bigint".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!("Float64".parse::<DataType>().unwrap(), DataType::Float64);
        assert!("varchar".parse::<DataType>().is_err());
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = Schema::from_pairs([("id", DataType::Int64), ("id", DataType::String)]);
        assert!(matches!(err, Err(DfqlError::Schema(_))));

        let err = Schema::from_pairs([("", DataType::Int64)]);
        assert!(matches!(err, Err(DfqlError::Schema(_))));
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::from_pairs([("id", DataType::Int64), ("name", DataType::String)]).unwrap();
        assert_eq!(schema.field("name").unwrap().dtype, DataType::String);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert!(schema.field("missing").is_err());
    }
}
