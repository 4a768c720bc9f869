//! The associated-form cache.
//!
//! Every form owns one [`AssociatedFormCache`]. It maps a relation name to a
//! sparse index of slots, each pointing at a materialized sub-form, so any
//! `usize` index can be materialized without allocating the positions before
//! it. Entries are created on first access through
//! [`get_or_create`](AssociatedFormCache::get_or_create) and never pruned, so
//! a given `(relation, index)` always yields the same sub-form instance for
//! the life of the parent.
//!
//! Sub-forms are also kept in materialization order, which is the order
//! validation visits them and saves write them.

use std::collections::{BTreeMap, HashMap};

use formwork_core::FormworkResult;

use crate::form::FormNode;

/// Identity-stable storage for a form's associated sub-forms.
#[derive(Default)]
pub struct AssociatedFormCache {
    /// Materialized sub-forms, in first-access order.
    nodes: Vec<Box<dyn FormNode>>,
    /// Relation name -> index -> position in `nodes`.
    slots: HashMap<String, BTreeMap<usize, usize>>,
}

impl AssociatedFormCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of materialized sub-forms.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no sub-form was materialized yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, name: &str, index: usize) -> Option<usize> {
        self.slots.get(name)?.get(&index).copied()
    }

    /// Returns `true` if `(name, index)` is materialized.
    pub fn contains(&self, name: &str, index: usize) -> bool {
        self.position(name, index).is_some()
    }

    /// Returns the sub-form at `(name, index)` if it was materialized.
    pub fn get_mut(&mut self, name: &str, index: usize) -> Option<&mut dyn FormNode> {
        let position = self.position(name, index)?;
        Some(self.nodes[position].as_mut())
    }

    /// Returns the sub-form at `(name, index)`, creating it with `create` on
    /// first access.
    ///
    /// # Errors
    ///
    /// Propagates the error of `create`; nothing is cached in that case.
    pub fn get_or_create<C>(
        &mut self,
        name: &str,
        index: usize,
        create: C,
    ) -> FormworkResult<&mut dyn FormNode>
    where
        C: FnOnce() -> FormworkResult<Box<dyn FormNode>>,
    {
        let position = match self.position(name, index) {
            Some(position) => position,
            None => {
                let node = create()?;
                tracing::debug!(
                    association = name,
                    index,
                    form = node.node_name(),
                    "materialized associated form"
                );
                self.nodes.push(node);
                let position = self.nodes.len() - 1;

                self.slots
                    .entry(name.to_string())
                    .or_default()
                    .insert(index, position);
                position
            }
        };
        Ok(self.nodes[position].as_mut())
    }

    /// Iterates over the materialized sub-forms in materialization order.
    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn FormNode>> {
        self.nodes.iter()
    }

    /// Mutably iterates over the materialized sub-forms in materialization order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn FormNode>> {
        self.nodes.iter_mut()
    }

    /// Returns the relation names with at least one materialized sub-form.
    pub fn relation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for AssociatedFormCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociatedFormCache")
            .field(
                "forms",
                &self.nodes.iter().map(|n| n.node_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
