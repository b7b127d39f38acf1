#![forbid(unsafe_code)]

//! Arena-backed entity tree.
//!
//! Nodes live in a flat persistent map keyed by id. Each node stores its
//! parent id and an ordered list of child ids; root order is kept in a
//! separate list. Cloning a [`Collection`] is O(1) and an update copies only
//! the touched path, so history snapshots share almost everything.
//!
//! # Invariants
//!
//! 1. Every id appears in exactly one child list (or the root list).
//! 2. `node.parent` names the node whose list holds it (`None` for roots).
//! 3. Ids are unique across the whole tree.
//! 4. A node is never moved into its own subtree.

use std::fmt;

use im::{HashMap, OrdSet, Vector};
use serde_json::{Map, Value};

use super::entity::{Entity, EntityTree};
use crate::id::ItemId;

/// Structural failure of a tree operation. Reducers turn these into no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An inserted id is already present.
    DuplicateId(ItemId),
    /// A referenced id is absent.
    NotFound(ItemId),
    /// A move would place a node inside itself.
    IntoOwnSubtree(ItemId),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate id {id:?}"),
            Self::NotFound(id) => write!(f, "no item {id:?}"),
            Self::IntoOwnSubtree(id) => write!(f, "cannot move {id:?} into its own subtree"),
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    entity: Entity,
    parent: Option<ItemId>,
    children: Vector<ItemId>,
}

/// An ordered forest of entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    nodes: HashMap<ItemId, Node>,
    roots: Vector<ItemId>,
}

impl Collection {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from root trees, in order.
    pub fn from_trees(trees: impl IntoIterator<Item = EntityTree>) -> Result<Self, TreeError> {
        let mut collection = Self::new();
        for tree in trees {
            collection.insert(tree, None, None)?;
        }
        Ok(collection)
    }

    /// Build a flat collection.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self, TreeError> {
        Self::from_trees(entities.into_iter().map(EntityTree::leaf))
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Number of entities at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is anywhere in the tree.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Entity by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Entity> {
        self.nodes.get(id).map(|n| &n.entity)
    }

    /// Parent of `id`. `None` for roots and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: &ItemId) -> Option<&ItemId> {
        self.nodes.get(id).and_then(|n| n.parent.as_ref())
    }

    /// Root ids in order.
    #[must_use]
    pub fn roots(&self) -> &Vector<ItemId> {
        &self.roots
    }

    /// Children of `id`, or of the root when `None`.
    #[must_use]
    pub fn children_of(&self, id: Option<&ItemId>) -> Option<&Vector<ItemId>> {
        match id {
            None => Some(&self.roots),
            Some(id) => self.nodes.get(id).map(|n| &n.children),
        }
    }

    /// Whether `id` has children.
    #[must_use]
    pub fn has_children(&self, id: &ItemId) -> bool {
        self.nodes.get(id).is_some_and(|n| !n.children.is_empty())
    }

    /// The list containing `id` and its index there.
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<(Option<&ItemId>, usize)> {
        let parent = self.nodes.get(id)?.parent.as_ref();
        let index = self.children_of(parent)?.index_of(id)?;
        Some((parent, index))
    }

    /// Whether `id` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, id: &ItemId, ancestor: &ItemId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    /// One-based depth of `id`.
    #[must_use]
    pub fn depth(&self, id: &ItemId) -> Option<usize> {
        self.contains(id).then(|| {
            let mut depth = 1;
            let mut cursor = self.parent_of(id);
            while let Some(parent) = cursor {
                depth += 1;
                cursor = self.parent_of(parent);
            }
            depth
        })
    }

    /// All ids, depth first.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect(&self.roots, &mut |_| true, &mut out);
        out
    }

    /// Ids whose ancestors are all expanded, depth first.
    #[must_use]
    pub fn visible(&self, expanded: &OrdSet<ItemId>) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.collect(&self.roots, &mut |id| expanded.contains(id), &mut out);
        out
    }

    fn collect(&self, list: &Vector<ItemId>, descend: &mut impl FnMut(&ItemId) -> bool, out: &mut Vec<ItemId>) {
        for id in list {
            out.push(id.clone());
            if let Some(node) = self.nodes.get(id)
                && !node.children.is_empty()
                && descend(id)
            {
                self.collect(&node.children, &mut *descend, out);
            }
        }
    }

    /// Detached copy of `id` and its descendants.
    #[must_use]
    pub fn subtree(&self, id: &ItemId) -> Option<EntityTree> {
        let node = self.nodes.get(id)?;
        Some(EntityTree {
            entity: node.entity.clone(),
            children: node.children.iter().filter_map(|c| self.subtree(c)).collect(),
        })
    }

    /// The whole collection as root trees.
    #[must_use]
    pub fn to_trees(&self) -> Vec<EntityTree> {
        self.roots.iter().filter_map(|id| self.subtree(id)).collect()
    }

    // ====================================================================
    // Mutation
    // ====================================================================

    /// Insert `tree` under `parent` (root when `None`) at `index` (end when
    /// `None`, clamped to the list length).
    pub fn insert(&mut self, tree: EntityTree, parent: Option<&ItemId>, index: Option<usize>) -> Result<(), TreeError> {
        if let Some(parent) = parent
            && !self.contains(parent)
        {
            return Err(TreeError::NotFound(parent.clone()));
        }
        let mut seen = std::collections::HashSet::new();
        for id in tree.ids() {
            if self.contains(&id) || !seen.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id));
            }
        }

        let root = tree.entity.id.clone();
        self.attach(tree, parent.cloned());
        let list = self.list_mut(parent).ok_or_else(|| TreeError::NotFound(root.clone()))?;
        let index = index.unwrap_or(list.len()).min(list.len());
        list.insert(index, root);
        Ok(())
    }

    /// Remove `id` and its descendants.
    pub fn remove(&mut self, id: &ItemId) -> Option<EntityTree> {
        let parent = self.nodes.get(id)?.parent.clone();
        if let Some(list) = self.list_mut(parent.as_ref())
            && let Some(pos) = list.index_of(id)
        {
            list.remove(pos);
        }
        self.detach(id)
    }

    /// Merge fields into an entity. Returns whether anything changed.
    pub fn update(&mut self, id: &ItemId, fields: &Map<String, Value>) -> bool {
        self.nodes.get_mut(id).is_some_and(|n| n.entity.merge(fields))
    }

    /// Move `id` under `parent` at `index` (clamped after detaching).
    pub fn move_to(&mut self, id: &ItemId, parent: Option<&ItemId>, index: usize) -> Result<(), TreeError> {
        if !self.contains(id) {
            return Err(TreeError::NotFound(id.clone()));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(TreeError::NotFound(parent.clone()));
            }
            if self.is_within(parent, id) {
                return Err(TreeError::IntoOwnSubtree(id.clone()));
            }
        }

        let old_parent = self.parent_of(id).cloned();
        if let Some(list) = self.list_mut(old_parent.as_ref())
            && let Some(pos) = list.index_of(id)
        {
            list.remove(pos);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent.cloned();
        }
        let list = self.list_mut(parent).ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let index = index.min(list.len());
        list.insert(index, id.clone());
        Ok(())
    }

    /// Swap `id` with the sibling `offset` places away. `false` at a boundary.
    pub fn swap_sibling(&mut self, id: &ItemId, offset: isize) -> bool {
        let Some((parent, pos)) = self.position(id) else {
            return false;
        };
        let parent = parent.cloned();
        let Some(target) = pos.checked_add_signed(offset) else {
            return false;
        };
        match self.list_mut(parent.as_ref()) {
            Some(list) if target < list.len() => {
                list.swap(pos, target);
                true
            }
            _ => false,
        }
    }

    fn list_mut(&mut self, parent: Option<&ItemId>) -> Option<&mut Vector<ItemId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => self.nodes.get_mut(id).map(|n| &mut n.children),
        }
    }

    fn attach(&mut self, tree: EntityTree, parent: Option<ItemId>) {
        let id = tree.entity.id.clone();
        let children: Vector<ItemId> = tree.children.iter().map(|c| c.entity.id.clone()).collect();
        self.nodes.insert(
            id.clone(),
            Node {
                entity: tree.entity,
                parent,
                children,
            },
        );
        for child in tree.children {
            self.attach(child, Some(id.clone()));
        }
    }

    fn detach(&mut self, id: &ItemId) -> Option<EntityTree> {
        let node = self.nodes.remove(id)?;
        Some(EntityTree {
            entity: node.entity,
            children: node.children.iter().filter_map(|c| self.detach(c)).collect(),
        })
    }
}
