//! DAG to SQL compilation.
//!
//! A query level is built by walking the DAG from a root collection. Each
//! relational operator asks for one clause slot of the current level; when
//! the slot cannot be filled without changing the meaning of what is already
//! there, the level is rendered and wrapped as a derived table, and the
//! operator continues on a fresh level.
//!
//! Joins, unions and membership subqueries are compiled ahead of the main
//! walk. Their text is kept in a side table keyed by node id; the DAG itself
//! is never modified.
//!
//! Each level sees only the aliases in its own FROM clause. Once a level is
//! wrapped, every collection on the wrapped input's filter/slice/sort chain
//! is addressed through the derived table's alias.

use crate::ast::{
    Dag, ElementOp, JoinKind, JoinSide, Membership, NodeId, NodeKind, Order, SortKey, TableRef,
};
use crate::config::CompilerOptions;
use crate::error::{DfqlError, DfqlResult};
use crate::transpiler::clauses::{Clause, Clauses, SelectItem};
use crate::transpiler::context::CompileContext;
use crate::transpiler::traits::{collapse_lines, indent_lines, quote_identifier};
use crate::types::DataType;
use std::collections::{HashMap, HashSet};

/// Compiles DAG roots to SQL text.
///
/// Aliases and fragments live for a single [`Compiler::compile`] call.
/// Generated user function names are kept across calls so that every
/// statement produced by one compiler agrees on them.
#[derive(Debug, Default)]
pub struct Compiler {
    options: CompilerOptions,
    ctx: CompileContext,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            ctx: CompileContext::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn context(&self) -> &CompileContext {
        &self.ctx
    }

    /// Compile the collection or value `root` of `dag` to one statement.
    pub fn compile(&mut self, dag: &Dag, root: NodeId) -> DfqlResult<String> {
        self.ctx.reset();
        let result = SqlCompiler::new(dag, &self.options, &mut self.ctx).compile_level(root);
        self.ctx.reset();
        match &result {
            Ok(sql) => tracing::debug!(%root, lines = sql.lines().count(), "compiled"),
            Err(e) => tracing::debug!(%root, error = %e, "compilation failed"),
        }
        result
    }
}

/// Text compiled ahead of the main walk.
#[derive(Debug, Clone)]
enum Folded {
    Join {
        from: String,
        predicate: Option<String>,
        /// Aliases the join brings into scope.
        visible: Vec<(NodeId, String)>,
    },
    /// `UNION ALL` wrapped as an aliased derived table.
    Union { text: String, alias: String },
    /// Single-line `SELECT` of a membership test.
    Subquery(String),
}

/// State of one `compile()` call.
pub(crate) struct SqlCompiler<'a> {
    pub(crate) dag: &'a Dag,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) ctx: &'a mut CompileContext,
    clauses: Clauses,
    visited: HashSet<NodeId>,
    /// Collections addressable at this level, with their aliases.
    visible: HashMap<NodeId, String>,
    folded: HashMap<NodeId, Folded>,
}

impl<'a> SqlCompiler<'a> {
    pub(crate) fn new(
        dag: &'a Dag,
        options: &'a CompilerOptions,
        ctx: &'a mut CompileContext,
    ) -> Self {
        Self {
            dag,
            options,
            ctx,
            clauses: Clauses::default(),
            visited: HashSet::new(),
            visible: HashMap::new(),
            folded: HashMap::new(),
        }
    }

    /// Build `root` as a complete statement on its own level. The enclosing
    /// level, if any, is restored afterwards.
    pub(crate) fn compile_level(&mut self, root: NodeId) -> DfqlResult<String> {
        let clauses = std::mem::take(&mut self.clauses);
        let visited = std::mem::take(&mut self.visited);
        let visible = std::mem::take(&mut self.visible);
        let fragments = self.ctx.take_fragments();
        let result = self.build_level(root);
        self.clauses = clauses;
        self.visited = visited;
        self.visible = visible;
        self.ctx.restore_fragments(fragments);
        result
    }

    fn build_level(&mut self, root: NodeId) -> DfqlResult<String> {
        self.discover(root)?;
        if self.dag.is_collection(root) {
            self.visit(root)?;
        } else {
            self.project_value(root)?;
        }
        self.clauses.render(self.options)
    }

    /// Compile joins, unions and membership subqueries reachable from `root`
    /// before anything else. Their children are skipped by the rest of the
    /// walk.
    fn discover(&mut self, root: NodeId) -> DfqlResult<()> {
        let dag = self.dag;
        let mut walk = dag.traverse(root, Order::TopDown, true);
        while let Some(id) = walk.next() {
            if self.folded.contains_key(&id) {
                walk.prune(id);
                continue;
            }
            match &dag.get(id)?.kind {
                NodeKind::Join { .. } | NodeKind::Union { .. } => {
                    self.fold(id)?;
                    walk.prune(id);
                }
                NodeKind::Element(
                    ElementOp::IsIn {
                        values: Membership::Subquery(seq),
                        ..
                    }
                    | ElementOp::NotIn {
                        values: Membership::Subquery(seq),
                        ..
                    },
                ) => {
                    self.fold(id)?;
                    walk.hide(id, *seq);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn fold(&mut self, id: NodeId) -> DfqlResult<()> {
        if self.folded.contains_key(&id) {
            return Ok(());
        }
        let dag = self.dag;
        let folded = match &dag.get(id)?.kind {
            NodeKind::Join {
                left,
                right,
                predicate,
                how,
                ..
            } => self.fold_join(id, *left, *right, *predicate, *how)?,
            NodeKind::Union {
                left,
                right,
                distinct,
            } => self.fold_union(id, *left, *right, *distinct)?,
            NodeKind::Element(
                ElementOp::IsIn {
                    values: Membership::Subquery(seq),
                    ..
                }
                | ElementOp::NotIn {
                    values: Membership::Subquery(seq),
                    ..
                },
            ) => {
                tracing::debug!(node = %id, subquery = %seq, "compiling membership subquery");
                Folded::Subquery(collapse_lines(&self.compile_level(*seq)?))
            }
            other => {
                return Err(DfqlError::inconsistent(format!(
                    "{} node {} cannot be compiled ahead of its parent",
                    other.name(),
                    id
                )));
            }
        };
        self.folded.insert(id, folded);
        Ok(())
    }

    fn fold_join(
        &mut self,
        id: NodeId,
        left: NodeId,
        right: NodeId,
        predicate: Option<NodeId>,
        how: JoinKind,
    ) -> DfqlResult<Folded> {
        tracing::debug!(node = %id, %left, %right, "compiling join sides");
        let mut visible = Vec::new();
        let left_text = self.join_side(left, &mut visible)?;
        let right_text = self.join_side(right, &mut visible)?;
        self.visible.extend(visible.iter().cloned());
        let predicate = match predicate {
            Some(p) => {
                self.visit(p)?;
                Some(self.fragment(p)?)
            }
            None => None,
        };
        let from = format!(
            "{}\n{} JOIN\n{}",
            left_text,
            how,
            indent_lines(&right_text, &self.options.indent())
        );
        Ok(Folded::Join {
            from,
            predicate,
            visible,
        })
    }

    /// FROM text of one join side. Anything but a table, a join or a union
    /// becomes a derived table whose alias is assigned after its body.
    /// The aliases the side brings into scope are appended to `visible`.
    fn join_side(
        &mut self,
        side: NodeId,
        visible: &mut Vec<(NodeId, String)>,
    ) -> DfqlResult<String> {
        let dag = self.dag;
        match &dag.get(side)?.kind {
            NodeKind::Source { table } => {
                let from = self.source_fragment(side, table);
                visible.push((side, self.ctx.register_collection(side)));
                Ok(from)
            }
            NodeKind::Join { .. } | NodeKind::Union { .. } => {
                self.fold(side)?;
                match self.folded.get(&side) {
                    Some(Folded::Join {
                        from,
                        predicate,
                        visible: inner,
                    }) => {
                        visible.extend(inner.iter().cloned());
                        Ok(match predicate {
                            Some(p) => format!("{}\nON {}", from, p),
                            None => from.clone(),
                        })
                    }
                    Some(Folded::Union { text, alias }) => {
                        visible.push((side, alias.clone()));
                        Ok(text.clone())
                    }
                    _ => Err(DfqlError::inconsistent(format!(
                        "join side {} was not compiled",
                        side
                    ))),
                }
            }
            _ => {
                let sql = self.compile_level(side)?;
                let alias = self.derived_alias(side);
                visible.push((side, alias.clone()));
                Ok(format!(
                    "(\n{}\n) {}",
                    indent_lines(&sql, &self.options.indent()),
                    alias
                ))
            }
        }
    }

    fn fold_union(
        &mut self,
        id: NodeId,
        left: NodeId,
        right: NodeId,
        distinct: bool,
    ) -> DfqlResult<Folded> {
        if distinct {
            return Err(DfqlError::unsupported(
                "distinct union; only UNION ALL can be generated",
            ));
        }
        tracing::debug!(node = %id, %left, %right, "compiling union sides");
        let left_sql = self.compile_level(left)?;
        let right_sql = self.compile_level(right)?;
        let alias = self.derived_alias(id);
        let body = format!("{}\nUNION ALL\n{}", left_sql, right_sql);
        let text = format!(
            "(\n{}\n) {}",
            indent_lines(&body, &self.options.indent()),
            alias
        );
        Ok(Folded::Union { text, alias })
    }

    pub(crate) fn subquery(&mut self, id: NodeId) -> DfqlResult<String> {
        self.fold(id)?;
        match self.folded.get(&id) {
            Some(Folded::Subquery(sql)) => Ok(sql.clone()),
            _ => Err(DfqlError::inconsistent(format!(
                "node {} has no compiled subquery",
                id
            ))),
        }
    }

    /// Render `id` once per level.
    pub(crate) fn visit(&mut self, id: NodeId) -> DfqlResult<()> {
        if self.visited.contains(&id) {
            return Ok(());
        }
        if !self.dag.is_collection(id) && self.ctx.has_fragment(id) {
            self.visited.insert(id);
            return Ok(());
        }
        let dag = self.dag;
        dag.accept(id, self)?;
        self.visited.insert(id);
        Ok(())
    }

    /// Visit the value children of `id`. Collections and subqueries are
    /// handled by their owners.
    pub(crate) fn visit_args(&mut self, id: NodeId) -> DfqlResult<()> {
        let dag = self.dag;
        for (slot, child) in dag.get(id)?.kind.args() {
            if slot == "subquery" || dag.is_collection(child) {
                continue;
            }
            self.visit(child)?;
        }
        Ok(())
    }

    pub(crate) fn emit(&mut self, id: NodeId, text: String) -> DfqlResult<()> {
        self.ctx.add_fragment(id, text)
    }

    pub(crate) fn fragment(&self, id: NodeId) -> DfqlResult<String> {
        self.ctx.fragment(id).map(str::to_string)
    }

    pub(crate) fn dtype(&self, id: NodeId) -> DfqlResult<DataType> {
        self.dag.get(id)?.dtype().ok_or_else(|| {
            DfqlError::inconsistent(format!("node {} is a collection, not a value", id))
        })
    }

    pub(crate) fn source_fragment(&mut self, id: NodeId, table: &TableRef) -> String {
        let alias = self.ctx.register_collection(id);
        self.visible.insert(id, alias.clone());
        if table.namespace.is_empty() {
            format!("{} {}", quote_identifier(&table.name), alias)
        } else {
            format!(
                "{}.{} {}",
                table.namespace,
                quote_identifier(&table.name),
                alias
            )
        }
    }

    /// Promote the current level when `clause` conflicts with it, or when
    /// `op` reads columns of an input that is not visible at this level.
    pub(crate) fn prepare(
        &mut self,
        op: NodeId,
        input: NodeId,
        clause: Clause,
        reads_input: bool,
    ) -> DfqlResult<()> {
        if self.clauses.conflicts(clause) || (reads_input && !self.addressable(input)?) {
            self.promote(op, input, clause)?;
        }
        Ok(())
    }

    /// Whether columns of `collection` can be referenced at this level.
    fn addressable(&self, collection: NodeId) -> DfqlResult<bool> {
        if self.visible.contains_key(&collection) {
            return Ok(true);
        }
        let kind = &self.dag.get(collection)?.kind;
        if let NodeKind::Join { left, right, .. } = kind {
            return Ok(self.addressable(*left)? && self.addressable(*right)?);
        }
        match kind.pass_through_input() {
            Some(input) => self.addressable(input),
            None => Ok(false),
        }
    }

    /// Alias of a derived table standing for `collection`. A collection
    /// already named elsewhere in the statement gets a fresh alias.
    fn derived_alias(&mut self, collection: NodeId) -> String {
        if self.ctx.has_alias(collection) {
            self.ctx.fresh_alias()
        } else {
            self.ctx.register_collection(collection)
        }
    }

    /// First collection below `collection` that is not a filter, slice or
    /// sort.
    fn lift(&self, mut collection: NodeId) -> DfqlResult<NodeId> {
        while let Some(input) = self.dag.get(collection)?.kind.pass_through_input() {
            collection = input;
        }
        Ok(collection)
    }

    /// Wrap the current level as a derived table standing for `input`.
    /// Columns of `input` and of its filter/slice/sort chain resolve to the
    /// new alias from here on; nothing rendered before is visible.
    fn promote(&mut self, op: NodeId, input: NodeId, clause: Clause) -> DfqlResult<()> {
        let sql = self.clauses.render(self.options)?;
        let alias = self.derived_alias(input);
        let lifted = self.lift(input)?;
        tracing::debug!(node = %op, %input, %lifted, %alias, ?clause, "promoting level to a derived table");
        self.visible.clear();
        self.visible.insert(lifted, alias.clone());
        let dag = self.dag;
        self.visited.retain(|id| dag.is_collection(*id));
        self.ctx.clear_fragments();
        self.clauses.set_from(format!(
            "(\n{}\n) {}",
            indent_lines(&sql, &self.options.indent()),
            alias
        ))
    }

    /// Resolve `field` of `collection` to the alias and field name that
    /// address it at this level.
    pub(crate) fn column_ref(&self, collection: NodeId, field: &str) -> DfqlResult<(String, String)> {
        if let Some(alias) = self.visible.get(&collection) {
            return Ok((alias.clone(), field.to_string()));
        }
        let kind = &self.dag.get(collection)?.kind;
        if let NodeKind::Join {
            left,
            right,
            fields,
            ..
        } = kind
        {
            let joined = fields.iter().find(|f| f.name == field).ok_or_else(|| {
                DfqlError::schema(format!("join {} has no field '{}'", collection, field))
            })?;
            let side = match joined.side {
                JoinSide::Left => *left,
                JoinSide::Right => *right,
            };
            return self.column_ref(side, &joined.source);
        }
        match kind.pass_through_input() {
            Some(input) => self.column_ref(input, field),
            None => Err(DfqlError::schema(format!(
                "collection {} is not in scope of the operator that reads it",
                collection
            ))),
        }
    }

    /// Render `fields` as select items. Columns that keep their type and
    /// name need no alias.
    fn select_items(&mut self, fields: &[NodeId]) -> DfqlResult<Vec<SelectItem>> {
        let dag = self.dag;
        let mut items = Vec::with_capacity(fields.len());
        for &field in fields {
            self.visit(field)?;
            let node = dag.get(field)?;
            let typed = node.typed().ok_or_else(|| {
                DfqlError::inconsistent(format!("collection {} used as a select field", field))
            })?;
            let alias = match (&node.kind, &typed.source_name) {
                (NodeKind::Column { collection }, Some(source)) if typed.dtype == typed.source_dtype => {
                    let (_, rendered) = self.column_ref(*collection, source)?;
                    match &typed.name {
                        Some(name) if *name != rendered => Some(name.clone()),
                        _ => None,
                    }
                }
                _ => typed.name.clone(),
            };
            items.push(SelectItem::new(self.fragment(field)?, alias));
        }
        Ok(items)
    }

    /// A value root compiles as a one-field projection over the collection
    /// it reads from.
    fn project_value(&mut self, value: NodeId) -> DfqlResult<()> {
        let collection = self.dag.owning_collection(value)?;
        self.visit(collection)?;
        self.prepare(value, collection, Clause::Select, true)?;
        let items = self.select_items(&[value])?;
        self.clauses.set_select(items, false)
    }

    fn fragments(&mut self, ids: &[NodeId]) -> DfqlResult<Vec<String>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            self.visit(id)?;
            out.push(self.fragment(id)?);
        }
        Ok(out)
    }

    // Relational operators. Each visits its input first, then claims its
    // clause, then renders its own values.

    pub(crate) fn compile_source(&mut self, id: NodeId, table: &TableRef) -> DfqlResult<()> {
        let from = self.source_fragment(id, table);
        self.clauses.set_from(from)
    }

    pub(crate) fn compile_project(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::Select, true)?;
        let items = self.select_items(fields)?;
        self.clauses.set_select(items, false)
    }

    pub(crate) fn compile_filter(&mut self, id: NodeId, input: NodeId, predicate: NodeId) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::Where, true)?;
        self.visit(predicate)?;
        let predicate = self.fragment(predicate)?;
        self.clauses.set_where(predicate)
    }

    pub(crate) fn compile_groupby(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        aggs: &[NodeId],
        having: Option<NodeId>,
    ) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::GroupBy, true)?;
        let keys = self.fragments(by)?;
        let fields: Vec<NodeId> = by.iter().chain(aggs).copied().collect();
        let items = self.select_items(&fields)?;
        self.clauses.set_select(items, false)?;
        self.clauses.set_group_by(keys)?;
        if let Some(having) = having {
            self.visit(having)?;
            let predicate = self.fragment(having)?;
            self.clauses.set_having(predicate)?;
        }
        Ok(())
    }

    pub(crate) fn compile_mutate(
        &mut self,
        id: NodeId,
        input: NodeId,
        by: &[NodeId],
        mutates: &[NodeId],
    ) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::Select, true)?;
        let fields: Vec<NodeId> = by.iter().chain(mutates).copied().collect();
        let items = self.select_items(&fields)?;
        self.clauses.set_select(items, false)
    }

    pub(crate) fn compile_sort(&mut self, id: NodeId, input: NodeId, keys: &[SortKey]) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::OrderBy, true)?;
        let keys = self.sort_keys(keys)?;
        self.clauses.set_order_by(keys)
    }

    pub(crate) fn sort_keys(&mut self, keys: &[SortKey]) -> DfqlResult<Vec<String>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            self.visit(key.expr)?;
            let text = self.fragment(key.expr)?;
            out.push(if key.ascending {
                text
            } else {
                format!("{} DESC", text)
            });
        }
        Ok(out)
    }

    pub(crate) fn compile_distinct(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::GroupBy, true)?;
        let items = self.select_items(fields)?;
        self.clauses.set_select(items, true)
    }

    pub(crate) fn compile_slice(
        &mut self,
        id: NodeId,
        input: NodeId,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> DfqlResult<()> {
        if start.is_some_and(|s| s != 0) {
            return Err(DfqlError::unsupported("slice with a start offset"));
        }
        if step.is_some_and(|s| s != 1) {
            return Err(DfqlError::unsupported("slice with a step"));
        }
        let limit = match stop {
            Some(n) if n >= 0 => n as u64,
            Some(n) => {
                return Err(DfqlError::inconsistent(format!(
                    "slice stop must not be negative, got {}",
                    n
                )));
            }
            None => return Err(DfqlError::inconsistent("slice without a stop")),
        };
        self.visit(input)?;
        self.prepare(id, input, Clause::Limit, false)?;
        self.clauses.set_limit(limit)
    }

    pub(crate) fn compile_summary(&mut self, id: NodeId, input: NodeId, fields: &[NodeId]) -> DfqlResult<()> {
        self.visit(input)?;
        self.prepare(id, input, Clause::GroupBy, true)?;
        let items = self.select_items(fields)?;
        self.clauses.set_select(items, false)
    }

    pub(crate) fn compile_join(&mut self, id: NodeId) -> DfqlResult<()> {
        self.fold(id)?;
        let Some(Folded::Join {
            from,
            predicate,
            visible,
        }) = self.folded.get(&id).cloned()
        else {
            return Err(DfqlError::inconsistent(format!("join {} was not compiled", id)));
        };
        self.visible.extend(visible);
        self.clauses.set_from(from)?;
        if let Some(predicate) = predicate {
            self.clauses.set_join_predicate(predicate)?;
        }
        Ok(())
    }

    pub(crate) fn compile_union(&mut self, id: NodeId) -> DfqlResult<()> {
        self.fold(id)?;
        let Some(Folded::Union { text, alias }) = self.folded.get(&id).cloned() else {
            return Err(DfqlError::inconsistent(format!("union {} was not compiled", id)));
        };
        self.visible.insert(id, alias);
        self.clauses.set_from(text)
    }
}
