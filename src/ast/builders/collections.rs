//! Sources and relational operators.

use crate::ast::dag::Dag;
use crate::ast::expr::{JoinField, NodeId, NodeKind, Shape, SortKey, TableRef, Typed};
use crate::ast::operators::{JoinKind, JoinSide};
use crate::error::{DfqlError, DfqlResult};
use crate::types::{Field, Schema};

impl Dag {
    /// Leaf collection bound to `namespace.name`.
    pub fn source(&mut self, namespace: &str, name: &str, schema: Schema) -> NodeId {
        let table = TableRef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            schema: schema.clone(),
        };
        self.push(NodeKind::Source { table }, Shape::Collection { schema })
    }

    /// Reference to field `name` of `collection`.
    pub fn column(&mut self, collection: NodeId, name: &str) -> DfqlResult<NodeId> {
        let dtype = self.schema_of(collection)?.field(name)?.dtype;
        Ok(self.push(
            NodeKind::Column { collection },
            Shape::Sequence(Typed::new(dtype, Some(name.to_string()))),
        ))
    }

    /// Columns for every field of `collection`, in schema order.
    pub fn columns(&mut self, collection: NodeId) -> DfqlResult<Vec<NodeId>> {
        let names: Vec<String> = self
            .schema_of(collection)?
            .names()
            .map(str::to_string)
            .collect();
        names.iter().map(|n| self.column(collection, n)).collect()
    }

    pub fn project(&mut self, input: NodeId, fields: &[NodeId]) -> DfqlResult<NodeId> {
        self.schema_of(input)?;
        if fields.is_empty() {
            return Err(DfqlError::schema("projection needs at least one field"));
        }
        let schema = self.field_schema(fields)?;
        Ok(self.push(
            NodeKind::Project {
                input,
                fields: fields.to_vec(),
            },
            Shape::Collection { schema },
        ))
    }

    pub fn filter(&mut self, input: NodeId, predicate: NodeId) -> DfqlResult<NodeId> {
        let schema = self.schema_of(input)?.clone();
        self.expect_boolean(predicate)?;
        Ok(self.push(NodeKind::Filter { input, predicate }, Shape::Collection { schema }))
    }

    pub fn group_by(&mut self, input: NodeId, by: &[NodeId], aggs: &[NodeId]) -> DfqlResult<NodeId> {
        self.group_by_inner(input, by, aggs, None)
    }

    /// Group-by whose groups are filtered by an aggregate predicate.
    pub fn group_by_having(
        &mut self,
        input: NodeId,
        by: &[NodeId],
        aggs: &[NodeId],
        having: NodeId,
    ) -> DfqlResult<NodeId> {
        self.expect_boolean(having)?;
        self.group_by_inner(input, by, aggs, Some(having))
    }

    fn group_by_inner(
        &mut self,
        input: NodeId,
        by: &[NodeId],
        aggs: &[NodeId],
        having: Option<NodeId>,
    ) -> DfqlResult<NodeId> {
        self.schema_of(input)?;
        if by.is_empty() {
            return Err(DfqlError::schema("group-by needs at least one key"));
        }
        let fields: Vec<NodeId> = by.iter().chain(aggs).copied().collect();
        let schema = self.field_schema(&fields)?;
        Ok(self.push(
            NodeKind::GroupBy {
                input,
                by: by.to_vec(),
                aggs: aggs.to_vec(),
                having,
            },
            Shape::Collection { schema },
        ))
    }

    /// Window columns evaluated next to the group keys.
    pub fn mutate(&mut self, input: NodeId, by: &[NodeId], mutates: &[NodeId]) -> DfqlResult<NodeId> {
        self.schema_of(input)?;
        let fields: Vec<NodeId> = by.iter().chain(mutates).copied().collect();
        let schema = self.field_schema(&fields)?;
        Ok(self.push(
            NodeKind::Mutate {
                input,
                by: by.to_vec(),
                mutates: mutates.to_vec(),
            },
            Shape::Collection { schema },
        ))
    }

    pub fn sort(&mut self, input: NodeId, keys: Vec<SortKey>) -> DfqlResult<NodeId> {
        let schema = self.schema_of(input)?.clone();
        if keys.is_empty() {
            return Err(DfqlError::schema("sort needs at least one key"));
        }
        for key in &keys {
            self.typed_of(key.expr)?;
        }
        Ok(self.push(NodeKind::Sort { input, keys }, Shape::Collection { schema }))
    }

    pub fn distinct(&mut self, input: NodeId, fields: &[NodeId]) -> DfqlResult<NodeId> {
        let fields = if fields.is_empty() {
            self.columns(input)?
        } else {
            fields.to_vec()
        };
        let schema = self.field_schema(&fields)?;
        Ok(self.push(NodeKind::Distinct { input, fields }, Shape::Collection { schema }))
    }

    pub fn slice(
        &mut self,
        input: NodeId,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> DfqlResult<NodeId> {
        let schema = self.schema_of(input)?.clone();
        Ok(self.push(
            NodeKind::Slice {
                input,
                start,
                stop,
                step,
            },
            Shape::Collection { schema },
        ))
    }

    /// First `n` rows.
    pub fn limit(&mut self, input: NodeId, n: i64) -> DfqlResult<NodeId> {
        self.slice(input, None, Some(n), None)
    }

    /// Aggregates over the whole collection.
    pub fn summary(&mut self, input: NodeId, fields: &[NodeId]) -> DfqlResult<NodeId> {
        self.schema_of(input)?;
        if fields.is_empty() {
            return Err(DfqlError::schema("summary needs at least one field"));
        }
        let schema = self.field_schema(fields)?;
        Ok(self.push(
            NodeKind::Summary {
                input,
                fields: fields.to_vec(),
            },
            Shape::Collection { schema },
        ))
    }

    /// Join two collections. Field names present on both sides get `_x` and
    /// `_y` suffixes.
    pub fn join(
        &mut self,
        left: NodeId,
        right: NodeId,
        predicate: Option<NodeId>,
        how: JoinKind,
    ) -> DfqlResult<NodeId> {
        if left == right {
            return Err(DfqlError::schema(
                "cannot join a collection with itself; derive one side first",
            ));
        }
        let left_schema = self.schema_of(left)?.clone();
        let right_schema = self.schema_of(right)?.clone();
        if let Some(p) = predicate {
            self.expect_boolean(p)?;
        }

        let mut fields = Vec::with_capacity(left_schema.len() + right_schema.len());
        for (schema, other, side, suffix) in [
            (&left_schema, &right_schema, JoinSide::Left, "_x"),
            (&right_schema, &left_schema, JoinSide::Right, "_y"),
        ] {
            for field in schema.fields() {
                let name = if other.get(&field.name).is_some() {
                    format!("{}{}", field.name, suffix)
                } else {
                    field.name.clone()
                };
                fields.push(JoinField {
                    name,
                    dtype: field.dtype,
                    side,
                    source: field.name.clone(),
                });
            }
        }
        let schema = Schema::new(fields.iter().map(|f| Field::new(f.name.clone(), f.dtype)).collect())?;
        Ok(self.push(
            NodeKind::Join {
                left,
                right,
                predicate,
                how,
                fields,
            },
            Shape::Collection { schema },
        ))
    }

    pub fn union(&mut self, left: NodeId, right: NodeId, distinct: bool) -> DfqlResult<NodeId> {
        let schema = self.schema_of(left)?.clone();
        if *self.schema_of(right)? != schema {
            return Err(DfqlError::schema("union sides must have identical schemas"));
        }
        Ok(self.push(
            NodeKind::Union {
                left,
                right,
                distinct,
            },
            Shape::Collection { schema },
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn table(dag: &mut Dag, name: &str) -> NodeId {
        let schema = Schema::from_pairs([("id", DataType::Int64), ("name", DataType::String)]).unwrap();
        dag.source("proj", name, schema)
    }

    #[test]
    fn test_project_schema() {
        let mut dag = Dag::new();
        let t = table(&mut dag, "T");
        let name = dag.column(t, "name").unwrap();
        let id = dag.column(t, "id").unwrap();
        let p = dag.project(t, &[name, id]).unwrap();
        let schema = dag.get(p).unwrap().schema().unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["name", "id"]);
    }

    #[test]
    fn test_project_rejects_duplicate_names() {
        let mut dag = Dag::new();
        let t = table(&mut dag, "T");
        let a = dag.column(t, "id").unwrap();
        let b = dag.column(t, "id").unwrap();
        assert!(matches!(dag.project(t, &[a, b]), Err(DfqlError::Schema(_))));
    }

    #[test]
    fn test_filter_requires_boolean() {
        let mut dag = Dag::new();
        let t = table(&mut dag, "T");
        let id = dag.column(t, "id").unwrap();
        assert!(matches!(dag.filter(t, id), Err(DfqlError::IllegalCast { .. })));
    }

    #[test]
    fn test_join_suffixes_collisions() {
        let mut dag = Dag::new();
        let a = table(&mut dag, "A");
        let b = table(&mut dag, "B");
        let j = dag.join(a, b, None, JoinKind::Inner).unwrap();
        let names: Vec<_> = dag.get(j).unwrap().schema().unwrap().names().map(str::to_string).collect();
        assert_eq!(names, vec!["id_x", "name_x", "id_y", "name_y"]);
    }

    #[test]
    fn test_self_join_rejected() {
        let mut dag = Dag::new();
        let a = table(&mut dag, "A");
        assert!(matches!(dag.join(a, a, None, JoinKind::Inner), Err(DfqlError::Schema(_))));
    }

    #[test]
    fn test_union_schema_mismatch() {
        let mut dag = Dag::new();
        let a = table(&mut dag, "A");
        let id = dag.column(a, "id").unwrap();
        let p = dag.project(a, &[id]).unwrap();
        assert!(matches!(dag.union(a, p, false), Err(DfqlError::Schema(_))));
    }
}
