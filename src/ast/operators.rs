use serde::{Deserialize, Serialize};

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// SQL spelling of the operator. `Power` has no infix form.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Power => "POW",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Negate,
    Invert,
    Abs,
}

/// Element-wise math functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathFunc {
    Abs,
    Sqrt,
    Sin,
    Sinh,
    Cos,
    Cosh,
    Tan,
    Tanh,
    Exp,
    Expm1,
    /// Natural log, or `LOG(base, x)` when a base is given.
    Log { base: Option<f64> },
    Log2,
    Log10,
    Log1p,
    Arccos,
    Arcsin,
    Arctan,
    Arccosh,
    Arcsinh,
    Arctanh,
    Radians,
    Degrees,
    Ceil,
    Floor,
    Trunc { decimals: Option<i32> },
}

impl MathFunc {
    pub fn name(self) -> &'static str {
        match self {
            MathFunc::Abs => "abs",
            MathFunc::Sqrt => "sqrt",
            MathFunc::Sin => "sin",
            MathFunc::Sinh => "sinh",
            MathFunc::Cos => "cos",
            MathFunc::Cosh => "cosh",
            MathFunc::Tan => "tan",
            MathFunc::Tanh => "tanh",
            MathFunc::Exp => "exp",
            MathFunc::Expm1 => "expm1",
            MathFunc::Log { .. } => "log",
            MathFunc::Log2 => "log2",
            MathFunc::Log10 => "log10",
            MathFunc::Log1p => "log1p",
            MathFunc::Arccos => "arccos",
            MathFunc::Arcsin => "arcsin",
            MathFunc::Arctan => "arctan",
            MathFunc::Arccosh => "arccosh",
            MathFunc::Arcsinh => "arcsinh",
            MathFunc::Arctanh => "arctanh",
            MathFunc::Radians => "radians",
            MathFunc::Degrees => "degrees",
            MathFunc::Ceil => "ceil",
            MathFunc::Floor => "floor",
            MathFunc::Trunc { .. } => "trunc",
        }
    }
}

/// Components extracted from a datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatetimeField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Microsecond,
    WeekOfYear,
    WeekDay,
    DayOfYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionFunc {
    Count,
    NUnique,
    Sum,
    Mean,
    Median,
    Max,
    Min,
    Var,
    Std,
    Any,
    All,
}

impl ReductionFunc {
    pub fn name(self) -> &'static str {
        match self {
            ReductionFunc::Count => "count",
            ReductionFunc::NUnique => "nunique",
            ReductionFunc::Sum => "sum",
            ReductionFunc::Mean => "mean",
            ReductionFunc::Median => "median",
            ReductionFunc::Max => "max",
            ReductionFunc::Min => "min",
            ReductionFunc::Var => "var",
            ReductionFunc::Std => "std",
            ReductionFunc::Any => "any",
            ReductionFunc::All => "all",
        }
    }
}

/// Running aggregates evaluated over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CumulativeFunc {
    Sum,
    Max,
    Min,
    Mean,
    Median,
    Count,
    Std,
}

impl CumulativeFunc {
    pub fn sql_name(self) -> &'static str {
        match self {
            CumulativeFunc::Sum => "SUM",
            CumulativeFunc::Max => "MAX",
            CumulativeFunc::Min => "MIN",
            CumulativeFunc::Mean => "AVG",
            CumulativeFunc::Median => "MEDIAN",
            CumulativeFunc::Count => "COUNT",
            CumulativeFunc::Std => "STDDEV",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankFunc {
    Rank,
    DenseRank,
    PercentRank,
    RowNumber,
}

impl RankFunc {
    pub fn sql_name(self) -> &'static str {
        match self {
            RankFunc::Rank => "RANK",
            RankFunc::DenseRank => "DENSE_RANK",
            RankFunc::PercentRank => "PERCENT_RANK",
            RankFunc::RowNumber => "ROW_NUMBER",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RankFunc::Rank => "rank",
            RankFunc::DenseRank => "dense_rank",
            RankFunc::PercentRank => "percent_rank",
            RankFunc::RowNumber => "row_number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftFunc {
    Lag,
    Lead,
}

impl ShiftFunc {
    pub fn sql_name(self) -> &'static str {
        match self {
            ShiftFunc::Lag => "LAG",
            ShiftFunc::Lead => "LEAD",
        }
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER"),
            JoinKind::Left => write!(f, "LEFT OUTER"),
            JoinKind::Right => write!(f, "RIGHT OUTER"),
            JoinKind::Outer => write!(f, "FULL OUTER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    Left,
    Right,
}
