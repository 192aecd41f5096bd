//! Per-compile state: aliases, rendered fragments and registered functions.

use crate::ast::NodeId;
use crate::error::{DfqlError, DfqlResult};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct CompileContext {
    aliases: HashMap<NodeId, String>,
    next_alias: usize,
    fragments: HashMap<NodeId, String>,
    udfs: BTreeMap<String, String>,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop aliases and fragments. Registered functions survive.
    pub fn reset(&mut self) {
        self.aliases.clear();
        self.fragments.clear();
        self.next_alias = 0;
    }

    /// Alias of `collection`, assigning the next `tN` on first use.
    pub fn register_collection(&mut self, collection: NodeId) -> String {
        if let Some(alias) = self.aliases.get(&collection) {
            return alias.clone();
        }
        let alias = self.fresh_alias();
        tracing::debug!(%collection, %alias, "assigned alias");
        self.aliases.insert(collection, alias.clone());
        alias
    }

    /// Next `tN`, bound to no collection.
    pub fn fresh_alias(&mut self) -> String {
        self.next_alias += 1;
        format!("t{}", self.next_alias)
    }

    pub fn alias(&self, collection: NodeId) -> Option<&str> {
        self.aliases.get(&collection).map(String::as_str)
    }

    pub fn has_alias(&self, collection: NodeId) -> bool {
        self.aliases.contains_key(&collection)
    }

    /// Store the text of `node`. Fragments are write-once; storing the same
    /// text again is a no-op.
    pub fn add_fragment(&mut self, node: NodeId, text: String) -> DfqlResult<()> {
        match self.fragments.get(&node) {
            Some(existing) if *existing == text => Ok(()),
            Some(existing) => Err(DfqlError::inconsistent(format!(
                "node {} rendered twice with different text: '{}' vs '{}'",
                node, existing, text
            ))),
            None => {
                tracing::trace!(%node, fragment = %text, "rendered");
                self.fragments.insert(node, text);
                Ok(())
            }
        }
    }

    pub fn fragment(&self, node: NodeId) -> DfqlResult<&str> {
        self.fragments
            .get(&node)
            .map(String::as_str)
            .ok_or_else(|| DfqlError::inconsistent(format!("node {} has not been compiled", node)))
    }

    pub fn has_fragment(&self, node: NodeId) -> bool {
        self.fragments.contains_key(&node)
    }

    /// Detach the fragments of the enclosing level; a nested level starts
    /// with none.
    pub(crate) fn take_fragments(&mut self) -> HashMap<NodeId, String> {
        std::mem::take(&mut self.fragments)
    }

    pub(crate) fn restore_fragments(&mut self, fragments: HashMap<NodeId, String>) {
        self.fragments = fragments;
    }

    /// Forget the fragments of a level that has been wrapped as a derived
    /// table.
    pub(crate) fn clear_fragments(&mut self) {
        self.fragments.clear();
    }

    /// Generated external name of a user function; stable across compiles.
    pub fn register_udf(&mut self, function: &str, prefix: &str) -> String {
        let next = self.udfs.len() + 1;
        self.udfs
            .entry(function.to_string())
            .or_insert_with(|| format!("{}_{}", prefix, next))
            .clone()
    }

    /// `(function, generated name)` pairs the produced SQL expects to be
    /// deployed.
    pub fn udfs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.udfs.iter().map(|(f, name)| (f.as_str(), name.as_str()))
    }
}
