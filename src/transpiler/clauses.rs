//! Clause slots of one query nesting level.

use crate::config::CompilerOptions;
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::traits::{indent_lines, quote_identifier};

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: String,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            expr: expr.into(),
            alias,
        }
    }
}

/// Slot that a relational operator wants to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Where,
    GroupBy,
    OrderBy,
    Limit,
}

/// Accumulated clauses of the level being built. Each slot is written at
/// most once; the compiler promotes the level before a conflicting write.
#[derive(Debug, Default)]
pub struct Clauses {
    select: Option<Vec<SelectItem>>,
    distinct: bool,
    from: Option<String>,
    join_predicate: Option<String>,
    where_clause: Option<String>,
    group_by: Option<Vec<String>>,
    having: Option<String>,
    order_by: Option<Vec<String>>,
    limit: Option<u64>,
}

fn occupied(slot: &str) -> DfqlError {
    DfqlError::inconsistent(format!("{} clause is already set at this level", slot))
}

impl Clauses {
    pub fn has_select(&self) -> bool {
        self.select.is_some()
    }

    pub fn has_from(&self) -> bool {
        self.from.is_some()
    }

    pub fn has_where(&self) -> bool {
        self.where_clause.is_some()
    }

    pub fn has_group_by(&self) -> bool {
        self.group_by.is_some()
    }

    pub fn has_order_by(&self) -> bool {
        self.order_by.is_some()
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// Whether filling `clause` now would conflict with the slots already set.
    pub fn conflicts(&self, clause: Clause) -> bool {
        match clause {
            Clause::Select => self.has_select() || self.has_limit(),
            Clause::Where => {
                self.has_where() || self.has_group_by() || self.has_select() || self.has_limit()
            }
            Clause::GroupBy => {
                self.has_select() || self.has_group_by() || self.has_order_by() || self.has_limit()
            }
            Clause::OrderBy => self.has_order_by() || self.has_limit(),
            Clause::Limit => self.has_limit(),
        }
    }

    pub fn set_select(&mut self, items: Vec<SelectItem>, distinct: bool) -> DfqlResult<()> {
        if self.select.is_some() {
            return Err(occupied("SELECT"));
        }
        self.select = Some(items);
        self.distinct = distinct;
        Ok(())
    }

    pub fn set_from(&mut self, from: String) -> DfqlResult<()> {
        if self.from.is_some() {
            return Err(occupied("FROM"));
        }
        self.from = Some(from);
        Ok(())
    }

    pub fn set_join_predicate(&mut self, predicate: String) -> DfqlResult<()> {
        if self.join_predicate.is_some() {
            return Err(occupied("ON"));
        }
        self.join_predicate = Some(predicate);
        Ok(())
    }

    pub fn set_where(&mut self, predicate: String) -> DfqlResult<()> {
        if self.where_clause.is_some() {
            return Err(occupied("WHERE"));
        }
        self.where_clause = Some(predicate);
        Ok(())
    }

    pub fn set_group_by(&mut self, keys: Vec<String>) -> DfqlResult<()> {
        if self.group_by.is_some() {
            return Err(occupied("GROUP BY"));
        }
        self.group_by = Some(keys);
        Ok(())
    }

    /// Setting an equal predicate twice is a no-op.
    pub fn set_having(&mut self, predicate: String) -> DfqlResult<()> {
        match &self.having {
            Some(existing) if *existing == predicate => Ok(()),
            Some(existing) => Err(DfqlError::inconsistent(format!(
                "conflicting HAVING clauses: '{}' vs '{}'",
                existing, predicate
            ))),
            None => {
                self.having = Some(predicate);
                Ok(())
            }
        }
    }

    pub fn set_order_by(&mut self, keys: Vec<String>) -> DfqlResult<()> {
        if self.order_by.is_some() {
            return Err(occupied("ORDER BY"));
        }
        self.order_by = Some(keys);
        Ok(())
    }

    pub fn set_limit(&mut self, limit: u64) -> DfqlResult<()> {
        if self.limit.is_some() {
            return Err(occupied("LIMIT"));
        }
        self.limit = Some(limit);
        Ok(())
    }

    /// Render the level and clear every slot.
    pub fn render(&mut self, options: &CompilerOptions) -> DfqlResult<String> {
        let clauses = std::mem::take(self);
        let from = clauses
            .from
            .ok_or_else(|| DfqlError::inconsistent("query level has no FROM clause"))?;

        let mut lines = vec![render_select(
            clauses.select.as_deref(),
            clauses.distinct,
            options,
        )];
        lines.push(format!("FROM {}", from));
        if let Some(predicate) = clauses.join_predicate {
            lines.push(format!("ON {}", predicate));
        }
        if let Some(predicate) = clauses.where_clause {
            lines.push(format!("WHERE {}", predicate));
        }
        if let Some(keys) = clauses.group_by {
            lines.push(format!("GROUP BY {}", keys.join(", ")));
        }
        if let Some(predicate) = clauses.having {
            lines.push(format!("HAVING {}", predicate));
        }
        let limit = match (&clauses.order_by, clauses.limit) {
            (_, Some(n)) => Some(n),
            (Some(_), None) => Some(options.default_sort_limit),
            (None, None) => None,
        };
        if let Some(keys) = clauses.order_by {
            lines.push(format!("ORDER BY {}", keys.join(", ")));
        }
        if let Some(n) = limit {
            lines.push(format!("LIMIT {}", n));
        }
        Ok(lines.join("\n"))
    }
}

fn render_select(items: Option<&[SelectItem]>, distinct: bool, options: &CompilerOptions) -> String {
    let keyword = if distinct { "SELECT DISTINCT" } else { "SELECT" };
    let Some(items) = items else {
        return format!("{} *", keyword);
    };

    if !options.beautify {
        let fields: Vec<String> = items
            .iter()
            .map(|item| match &item.alias {
                Some(alias) => format!("{} AS {}", item.expr, quote_identifier(alias)),
                None => item.expr.clone(),
            })
            .collect();
        return format!("{} {}", keyword, fields.join(", "));
    }

    let width = items
        .iter()
        .filter(|item| item.alias.is_some() && !item.expr.contains('\n'))
        .map(|item| item.expr.chars().count())
        .max()
        .unwrap_or(0);
    let indent = options.indent();
    let fields: Vec<String> = items
        .iter()
        .map(|item| {
            let text = match &item.alias {
                Some(alias) if !item.expr.contains('\n') => {
                    format!("{:<width$} AS {}", item.expr, quote_identifier(alias), width = width)
                }
                Some(alias) => format!("{} AS {}", item.expr, quote_identifier(alias)),
                None => item.expr.clone(),
            };
            indent_lines(&text, &indent)
        })
        .collect();
    format!("{}\n{}", keyword, fields.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_and_reset() {
        let options = CompilerOptions::default();
        let mut clauses = Clauses::default();
        clauses.set_limit(5).unwrap();
        clauses.set_order_by(vec!["t1.`id` DESC".to_string()]).unwrap();
        clauses.set_where("t1.`id` > 0".to_string()).unwrap();
        clauses.set_from("p.`T` t1".to_string()).unwrap();
        let sql = clauses.render(&options).unwrap();
        assert_eq!(
            sql,
            "SELECT *\nFROM p.`T` t1\nWHERE t1.`id` > 0\nORDER BY t1.`id` DESC\nLIMIT 5"
        );
        assert!(!clauses.has_from());
        assert!(!clauses.has_limit());
    }

    #[test]
    fn test_default_sort_limit() {
        let options = CompilerOptions {
            default_sort_limit: 100,
            ..CompilerOptions::default()
        };
        let mut clauses = Clauses::default();
        clauses.set_from("p.`T` t1".to_string()).unwrap();
        clauses.set_order_by(vec!["t1.`id`".to_string()]).unwrap();
        assert!(clauses.render(&options).unwrap().ends_with("ORDER BY t1.`id`\nLIMIT 100"));
    }

    #[test]
    fn test_having_is_idempotent() {
        let mut clauses = Clauses::default();
        clauses.set_having("COUNT(1) > 1".to_string()).unwrap();
        clauses.set_having("COUNT(1) > 1".to_string()).unwrap();
        assert!(matches!(
            clauses.set_having("COUNT(1) > 2".to_string()),
            Err(DfqlError::InternalInconsistency(_))
        ));
    }

    #[test]
    fn test_conflicts() {
        let mut clauses = Clauses::default();
        assert!(!clauses.conflicts(Clause::Where));
        clauses.set_select(vec![SelectItem::new("t1.`id`", None)], false).unwrap();
        assert!(clauses.conflicts(Clause::Where));
        assert!(clauses.conflicts(Clause::Select));
        assert!(!clauses.conflicts(Clause::OrderBy));
        assert!(clauses.set_select(vec![], false).is_err());
    }

    #[test]
    fn test_missing_from() {
        let mut clauses = Clauses::default();
        assert!(clauses.render(&CompilerOptions::default()).is_err());
    }

    #[test]
    fn test_beautified_select() {
        let options = CompilerOptions {
            beautify: true,
            ..CompilerOptions::default()
        };
        let mut clauses = Clauses::default();
        clauses
            .set_select(
                vec![
                    SelectItem::new("t1.`id`", None),
                    SelectItem::new("COUNT(1)", Some("n".to_string())),
                    SelectItem::new("t1.`score` + 1", Some("s".to_string())),
                ],
                false,
            )
            .unwrap();
        clauses.set_from("p.`T` t1".to_string()).unwrap();
        assert_eq!(
            clauses.render(&options).unwrap(),
            "SELECT\n  t1.`id`,\n  COUNT(1)       AS `n`,\n  t1.`score` + 1 AS `s`\nFROM p.`T` t1"
        );
    }
}
