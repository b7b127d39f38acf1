#![forbid(unsafe_code)]

//! Collection commands: CRUD, reordering, and clipboard.
//!
//! [`reduce_collection`] reads the zone's [`Collection`] out of the
//! application data, applies one [`CollectionAction`], and returns the new
//! data plus zone follow-ups (focus recovery, selection of pasted items) and
//! clipboard side effects. Every structural failure degrades to
//! [`CollectionOutcome::unchanged`].
//!
//! # Targets
//!
//! Actions taking `Option<Vec<ItemId>>` default to the zone's selection, or
//! the focused item when nothing is selected. Targets nested inside another
//! target are dropped, since the outer one already carries them.
//!
//! # Focus recovery
//!
//! When a removal takes the focused item, focus moves to the next sibling
//! of the outermost removed ancestor, then the previous sibling, then the
//! parent, skipping everything being removed. With no candidate, focus is
//! cleared by the trailing reconcile.
//!
//! # Paste placement
//!
//! Each pasted item the target accepts as a child is appended inside it
//! (and the target expands). The rest go after the target within the
//! target's own parent, or at the end of the root list without a target.
//! Both groups chain so their order is kept.

use std::collections::HashSet;

use serde_json::{Map, Value};
use zonekit_runtime::{Effect, Rejection};

use super::clipboard::ClipboardEntry;
use super::entity::{Entity, EntityTree};
use super::tree::Collection;
use super::{CollectionConfig, CollectionRegistry, CollectionStore};
use crate::command::{ZoneAction, ZoneCommand, unknown_zone};
use crate::id::{ItemId, ZoneId};
use crate::state::{FocusZoneState, GlobalFocusState};

/// Where [`CollectionAction::Insert`] places its tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertAt {
    /// End of the root list.
    #[default]
    End,
    /// Right after an item, in the same parent.
    After(ItemId),
    /// Inside a parent at `index` (end when `None`).
    Child {
        /// New parent.
        parent: ItemId,
        /// Position among its children.
        index: Option<usize>,
    },
}

/// What to do to a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction {
    /// Add a tree. Colliding ids are replaced with fresh ones.
    Insert {
        /// Entity and descendants.
        tree: EntityTree,
        /// Placement.
        at: InsertAt,
    },
    /// Merge domain fields into an entity.
    Update {
        /// Target entity.
        id: ItemId,
        /// Fields to set.
        fields: Map<String, Value>,
    },
    /// Remove items and their descendants.
    Remove(Option<Vec<ItemId>>),
    /// Swap with the previous shown sibling.
    MoveUp(Option<ItemId>),
    /// Swap with the next shown sibling.
    MoveDown(Option<ItemId>),
    /// Reparent and reposition in one step.
    Move {
        /// Item to move.
        id: ItemId,
        /// New parent, root when `None`.
        parent: Option<ItemId>,
        /// Position in the new parent.
        index: usize,
    },
    /// Deep-clone right after the original.
    Duplicate(Option<ItemId>),
    /// Put items on the clipboard.
    Copy(Option<Vec<ItemId>>),
    /// Put items on the clipboard and remove them.
    Cut(Option<Vec<ItemId>>),
    /// Insert clipboard items relative to a target (the focused item when `None`).
    Paste(Option<ItemId>),
}

impl CollectionAction {
    /// Stable command kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "collection.insert",
            Self::Update { .. } => "collection.update",
            Self::Remove(_) => "collection.remove",
            Self::MoveUp(_) => "collection.move_up",
            Self::MoveDown(_) => "collection.move_down",
            Self::Move { .. } => "collection.move",
            Self::Duplicate(_) => "collection.duplicate",
            Self::Copy(_) => "collection.copy",
            Self::Cut(_) => "collection.cut",
            Self::Paste(_) => "collection.paste",
        }
    }
}

/// A collection action aimed at a collection zone, or the active zone.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCommand {
    /// Target zone.
    pub zone: Option<ZoneId>,
    /// Action.
    pub action: CollectionAction,
}

impl CollectionCommand {
    /// Act on the active zone.
    #[must_use]
    pub fn active(action: CollectionAction) -> Self {
        Self { zone: None, action }
    }

    /// Act on a specific zone.
    #[must_use]
    pub fn in_zone(zone: impl Into<ZoneId>, action: CollectionAction) -> Self {
        Self {
            zone: Some(zone.into()),
            action,
        }
    }

    /// Stable command kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.action.kind()
    }
}

/// Result of [`reduce_collection`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOutcome<D> {
    /// Next application data, `None` when unchanged.
    pub data: Option<D>,
    /// New clipboard slot content, `None` when untouched.
    pub clipboard: Option<ClipboardEntry>,
    /// Host side effects.
    pub effects: Vec<Effect>,
    /// Zone follow-ups.
    pub dispatch: Vec<ZoneCommand>,
}

impl<D> CollectionOutcome<D> {
    /// Nothing changed.
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            data: None,
            clipboard: None,
            effects: Vec::new(),
            dispatch: Vec::new(),
        }
    }

    /// Whether the outcome does nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.data.is_none() && self.clipboard.is_none() && self.effects.is_empty() && self.dispatch.is_empty()
    }
}

/// Inputs that live outside the application data.
#[derive(Debug, Clone, Copy)]
pub struct CollectionEnv<'a> {
    /// Live focus state.
    pub focus: &'a GlobalFocusState,
    /// Clipboard slot.
    pub clipboard: Option<&'a ClipboardEntry>,
    /// Collection configs.
    pub registry: &'a CollectionRegistry,
    /// Emit host clipboard writes on copy and cut.
    pub mirror: bool,
    /// Items the target zone currently shows. `None` treats every item as shown.
    pub visible: Option<&'a [ItemId]>,
}

/// Fold a collection command into the application data.
pub fn reduce_collection<D: CollectionStore>(
    data: &D,
    env: CollectionEnv<'_>,
    command: &CollectionCommand,
) -> Result<CollectionOutcome<D>, Rejection> {
    let zone = match (&command.zone, &env.focus.active_zone) {
        (Some(zone), _) => {
            if env.registry.get(zone).is_none() {
                return Err(unknown_zone(zone));
            }
            zone.clone()
        }
        (None, Some(active)) if env.registry.get(active).is_some() => active.clone(),
        (None, active) => {
            tracing::trace!(target: "zonekit.collection", zone = ?active, action = command.kind(), "active zone has no collection");
            return Ok(CollectionOutcome::unchanged());
        }
    };
    let (Some(config), Some(collection)) = (env.registry.get(&zone), data.collection(&zone)) else {
        return Ok(CollectionOutcome::unchanged());
    };

    let reducer = CollectionReducer {
        zone: &zone,
        config,
        collection,
        state: env.focus.zone_or_default(&zone),
        clipboard: env.clipboard,
        mirror: env.mirror,
        visible: env.visible,
    };
    let result = reducer.reduce(&command.action);
    let outcome = CollectionOutcome {
        data: result.collection.map(|c| data.with_collection(&zone, c)),
        clipboard: result.clipboard,
        effects: result.effects,
        dispatch: result.dispatch,
    };
    if !outcome.is_noop() {
        tracing::debug!(
            target: "zonekit.collection",
            %zone,
            action = command.kind(),
            data_changed = outcome.data.is_some(),
            follow_ups = outcome.dispatch.len(),
            "collection command applied"
        );
    }
    Ok(outcome)
}

#[derive(Default)]
struct Reduced {
    collection: Option<Collection>,
    clipboard: Option<ClipboardEntry>,
    effects: Vec<Effect>,
    dispatch: Vec<ZoneCommand>,
}

impl Reduced {
    fn data(collection: Collection) -> Self {
        Self {
            collection: Some(collection),
            ..Self::default()
        }
    }
}

struct CollectionReducer<'a> {
    zone: &'a ZoneId,
    config: &'a CollectionConfig,
    collection: &'a Collection,
    state: FocusZoneState,
    clipboard: Option<&'a ClipboardEntry>,
    mirror: bool,
    visible: Option<&'a [ItemId]>,
}

impl CollectionReducer<'_> {
    fn reduce(&self, action: &CollectionAction) -> Reduced {
        match action {
            CollectionAction::Insert { tree, at } => self.insert(tree, at),
            CollectionAction::Update { id, fields } => {
                let mut next = self.collection.clone();
                if next.update(id, fields) {
                    Reduced::data(next)
                } else {
                    Reduced::default()
                }
            }
            CollectionAction::Remove(ids) => self.remove(&self.targets(ids.as_deref())),
            CollectionAction::MoveUp(id) => self.swap(id.as_ref(), -1),
            CollectionAction::MoveDown(id) => self.swap(id.as_ref(), 1),
            CollectionAction::Move { id, parent, index } => self.move_to(id, parent.as_ref(), *index),
            CollectionAction::Duplicate(id) => self.duplicate(id.as_ref()),
            CollectionAction::Copy(ids) => self.copy(&self.targets(ids.as_deref()), false),
            CollectionAction::Cut(ids) => self.copy(&self.targets(ids.as_deref()), true),
            CollectionAction::Paste(target) => self.paste(target.as_ref()),
        }
    }

    // ====================================================================
    // Actions
    // ====================================================================

    fn insert(&self, tree: &EntityTree, at: &InsertAt) -> Reduced {
        let (parent, index) = match at {
            InsertAt::End => (None, None),
            InsertAt::After(sibling) => match self.collection.position(sibling) {
                Some((parent, pos)) => (parent.cloned(), Some(pos + 1)),
                None => (None, None),
            },
            InsertAt::Child { parent, index } => {
                if !self.collection.contains(parent) {
                    return Reduced::default();
                }
                (Some(parent.clone()), *index)
            }
        };

        let mut next = self.collection.clone();
        let mut taken = HashSet::new();
        let tree = self.with_fresh_ids(tree.clone(), &next, &mut taken);
        let id = tree.id().clone();
        if let Err(err) = next.insert(tree, parent.as_ref(), index) {
            tracing::debug!(target: "zonekit.collection", %err, "insert skipped");
            return Reduced::default();
        }
        let mut out = Reduced::data(next);
        if let Some(parent) = parent {
            out.dispatch.push(self.zone_cmd(ZoneAction::Expand(Some(parent))));
        }
        out.dispatch.push(self.zone_cmd(ZoneAction::Focus(id)));
        out
    }

    fn remove(&self, targets: &[ItemId]) -> Reduced {
        if targets.is_empty() {
            return Reduced::default();
        }
        let recovery = self.recovery_target(targets);
        let mut next = self.collection.clone();
        for id in targets {
            next.remove(id);
        }
        let mut out = Reduced::data(next);
        if let Some(target) = recovery {
            out.dispatch.push(self.zone_cmd(ZoneAction::Focus(target)));
        }
        out.dispatch.push(self.zone_cmd(ZoneAction::Reconcile));
        out
    }

    /// Swap with the nearest shown sibling in the direction of `step`.
    fn swap(&self, id: Option<&ItemId>, step: isize) -> Reduced {
        let Some(id) = id.or(self.state.focused.as_ref()) else {
            return Reduced::default();
        };
        let Some((parent, pos)) = self.collection.position(id) else {
            return Reduced::default();
        };
        let Some(siblings) = self.collection.children_of(parent) else {
            return Reduced::default();
        };
        let shown = |i: &usize| self.visible.is_none_or(|v| v.contains(&siblings[*i]));
        let neighbor = if step < 0 {
            (0..pos).rev().find(shown)
        } else {
            (pos + 1..siblings.len()).find(shown)
        };
        let Some(neighbor) = neighbor else {
            return Reduced::default();
        };
        let mut next = self.collection.clone();
        if next.swap_sibling(id, neighbor as isize - pos as isize) {
            Reduced::data(next)
        } else {
            Reduced::default()
        }
    }

    fn move_to(&self, id: &ItemId, parent: Option<&ItemId>, index: usize) -> Reduced {
        let Some(entity) = self.collection.get(id) else {
            return Reduced::default();
        };
        if let Some(parent) = parent {
            let accepted = self
                .collection
                .get(parent)
                .is_some_and(|p| self.config.nests(p, entity));
            if !accepted {
                tracing::debug!(target: "zonekit.collection", item = %id, %parent, "move refused by destination");
                return Reduced::default();
            }
        }
        let mut next = self.collection.clone();
        match next.move_to(id, parent, index) {
            Ok(()) if next != *self.collection => Reduced::data(next),
            Ok(()) => Reduced::default(),
            Err(err) => {
                tracing::debug!(target: "zonekit.collection", %err, "move skipped");
                Reduced::default()
            }
        }
    }

    fn duplicate(&self, id: Option<&ItemId>) -> Reduced {
        let Some(id) = id.or(self.state.focused.as_ref()) else {
            return Reduced::default();
        };
        let (Some(tree), Some((parent, pos))) = (self.collection.subtree(id), self.collection.position(id)) else {
            return Reduced::default();
        };
        let mut next = self.collection.clone();
        let mut taken = HashSet::new();
        let copy = self.with_fresh_ids(tree, &next, &mut taken);
        let new_id = copy.id().clone();
        if next.insert(copy, parent, Some(pos + 1)).is_err() {
            return Reduced::default();
        }
        let mut out = Reduced::data(next);
        out.dispatch.push(self.zone_cmd(ZoneAction::Focus(new_id)));
        out
    }

    fn copy(&self, targets: &[ItemId], cut: bool) -> Reduced {
        let items: Vec<EntityTree> = targets.iter().filter_map(|id| self.collection.subtree(id)).collect();
        if items.is_empty() {
            return Reduced::default();
        }
        let entry = if cut {
            ClipboardEntry::cut(self.zone.clone(), items)
        } else {
            ClipboardEntry::copied(self.zone.clone(), items)
        };

        let mut out = if cut { self.remove(targets) } else { Reduced::default() };
        if self.mirror {
            let text = entry.to_text(|e| self.config.text_of(e));
            let json = entry
                .to_json()
                .map_err(|err| tracing::warn!(target: "zonekit.collection", %err, "clipboard json encoding failed"))
                .ok();
            out.effects.push(Effect::clipboard(text, json));
        }
        out.clipboard = Some(entry);
        out
    }

    fn paste(&self, target: Option<&ItemId>) -> Reduced {
        let Some(entry) = self.clipboard else {
            return Reduced::default();
        };
        let items: Vec<EntityTree> = if entry.is_from(self.zone) {
            entry.items.clone()
        } else {
            entry.items.iter().filter_map(|tree| self.config.adapt(tree)).collect()
        };
        let items: Vec<EntityTree> = items.into_iter().map(|t| self.config.pasted(t)).collect();
        if items.is_empty() {
            tracing::debug!(target: "zonekit.collection", zone = %self.zone, source = ?entry.source, "paste rejected");
            return Reduced::default();
        }

        let target = target
            .or(self.state.focused.as_ref())
            .filter(|t| self.collection.contains(t));
        // Each item nests into the target when the target accepts it and
        // otherwise lands after the target among its siblings.
        let node = target.and_then(|t| self.collection.get(t));
        let (sibling_parent, mut sibling_index) = match target.and_then(|t| self.collection.position(t)) {
            Some((parent, pos)) => (parent.cloned(), pos + 1),
            None => (None, self.collection.roots().len()),
        };
        let mut child_index = target.and_then(|t| self.collection.children_of(Some(t))).map_or(0, |c| c.len());

        let mut next = self.collection.clone();
        let mut taken = HashSet::new();
        let mut pasted = Vec::with_capacity(items.len());
        let mut nested = false;
        for item in items {
            let into = node.is_some_and(|node| self.config.nests(node, &item.entity));
            let item = self.with_fresh_ids(item, &next, &mut taken);
            let id = item.id().clone();
            let (parent, index) = if into {
                (target, &mut child_index)
            } else {
                (sibling_parent.as_ref(), &mut sibling_index)
            };
            if next.insert(item, parent, Some(*index)).is_ok() {
                pasted.push(id);
                *index += 1;
                nested |= into;
            }
        }
        let Some(last) = pasted.last().cloned() else {
            return Reduced::default();
        };

        let mut out = Reduced::data(next);
        if nested && let Some(parent) = target {
            out.dispatch.push(self.zone_cmd(ZoneAction::Expand(Some(parent.clone()))));
        }
        out.dispatch.push(self.zone_cmd(ZoneAction::Focus(last)));
        out.dispatch.push(self.zone_cmd(ZoneAction::SetSelection(pasted)));
        if entry.is_cut {
            // A cut pastes once as a move; later pastes are copies.
            out.clipboard = Some(ClipboardEntry {
                is_cut: false,
                ..entry.clone()
            });
        }
        out
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    fn zone_cmd(&self, action: ZoneAction) -> ZoneCommand {
        ZoneCommand::in_zone(self.zone.clone(), action)
    }

    /// Explicit ids, else the selection, else the focused item; existing
    /// only, outermost only, in document order.
    fn targets(&self, ids: Option<&[ItemId]>) -> Vec<ItemId> {
        let requested: HashSet<ItemId> = match ids {
            Some(ids) => ids.iter().cloned().collect(),
            None if !self.state.selection.is_empty() => self.state.selection.iter().cloned().collect(),
            None => self.state.focused.iter().cloned().collect(),
        };
        self.collection
            .ids()
            .into_iter()
            .filter(|id| requested.contains(id))
            .filter(|id| {
                !self
                    .collection
                    .parent_of(id)
                    .is_some_and(|p| requested.iter().any(|r| self.collection.is_within(p, r)))
            })
            .collect()
    }

    fn recovery_target(&self, targets: &[ItemId]) -> Option<ItemId> {
        let focused = self.state.focused.as_ref()?;
        let pivot = targets.iter().find(|t| self.collection.is_within(focused, t))?;
        let removed = |id: &ItemId| targets.iter().any(|t| self.collection.is_within(id, t));
        let (parent, pos) = self.collection.position(pivot)?;
        let siblings = self.collection.children_of(parent)?;
        siblings
            .iter()
            .skip(pos + 1)
            .find(|id| !removed(id))
            .or_else(|| siblings.iter().take(pos).rev().find(|id| !removed(id)))
            .or(parent)
            .cloned()
    }

    /// Clone every node of `tree` whose id is already used in `collection`
    /// or `taken` under a fresh id.
    fn with_fresh_ids(&self, tree: EntityTree, collection: &Collection, taken: &mut HashSet<ItemId>) -> EntityTree {
        tree.map(&mut |entity: Entity| {
            let clash = collection.contains(&entity.id) || taken.contains(&entity.id);
            let entity = if clash {
                self.config.clone_entity(&entity, &|id| collection.contains(id) || taken.contains(id))
            } else {
                entity
            };
            taken.insert(entity.id.clone());
            entity
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type Store = im::HashMap<ZoneId, Collection>;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    fn task(i: &str) -> EntityTree {
        EntityTree::leaf(Entity::new(i, "task").with_field("title", i.to_uppercase()))
    }

    fn zone() -> ZoneId {
        ZoneId::from("todos")
    }

    struct Fixture {
        data: Store,
        focus: GlobalFocusState,
        clipboard: Option<ClipboardEntry>,
        registry: CollectionRegistry,
        visible: Option<Vec<ItemId>>,
    }

    impl Fixture {
        fn flat(ids: &[&str]) -> Self {
            let todos = Collection::from_trees(ids.iter().map(|i| task(i))).unwrap();
            let mut registry = CollectionRegistry::new();
            registry.register(CollectionConfig::new("todos"));
            registry.register(
                CollectionConfig::new("outline")
                    .accept_kinds(["task"])
                    .accepts_child(|parent, _| parent.kind == "group"),
            );
            let outline = Collection::from_trees([EntityTree::leaf(Entity::new("g", "group"))
                .with_child(Entity::new("g1", "note"))])
            .unwrap();
            Self {
                data: Store::new().update(zone(), todos).update(ZoneId::from("outline"), outline),
                focus: GlobalFocusState::new().with_active(Some(zone())),
                clipboard: None,
                registry,
                visible: None,
            }
        }

        fn focus(mut self, item: &str) -> Self {
            self.focus = self
                .focus
                .with_zone(zone(), FocusZoneState::default().with_focus(Some(id(item))));
            self
        }

        fn run(&mut self, action: CollectionAction) -> CollectionOutcome<Store> {
            self.run_in(zone(), action)
        }

        fn run_in(&mut self, zone: ZoneId, action: CollectionAction) -> CollectionOutcome<Store> {
            let env = CollectionEnv {
                focus: &self.focus,
                clipboard: self.clipboard.as_ref(),
                registry: &self.registry,
                mirror: true,
                visible: self.visible.as_deref(),
            };
            let out = reduce_collection(&self.data, env, &CollectionCommand::in_zone(zone, action)).unwrap();
            if let Some(data) = &out.data {
                self.data = data.clone();
            }
            if let Some(entry) = &out.clipboard {
                self.clipboard = Some(entry.clone());
            }
            out
        }

        fn ids(&self, zone: &str) -> Vec<String> {
            self.data
                .collection(&ZoneId::from(zone))
                .map(|c| c.ids().into_iter().map(String::from).collect())
                .unwrap_or_default()
        }
    }

    fn focus_cmd(item: &str) -> ZoneCommand {
        ZoneCommand::in_zone("todos", ZoneAction::Focus(id(item)))
    }

    #[test]
    fn remove_recovers_to_next_then_previous() {
        let mut f = Fixture::flat(&["a", "b", "c"]).focus("b");
        let out = f.run(CollectionAction::Remove(None));
        assert_eq!(f.ids("todos"), ["a", "c"]);
        assert_eq!(out.dispatch[0], focus_cmd("c"));
        assert_eq!(out.dispatch[1].action, ZoneAction::Reconcile);

        let mut f = Fixture::flat(&["a", "b", "c"]).focus("c");
        let out = f.run(CollectionAction::Remove(None));
        assert_eq!(out.dispatch[0], focus_cmd("b"));
    }

    #[test]
    fn remove_skips_removed_neighbors() {
        let mut f = Fixture::flat(&["a", "b", "c", "d"]).focus("b");
        let out = f.run(CollectionAction::Remove(Some(vec![id("b"), id("c")])));
        assert_eq!(f.ids("todos"), ["a", "d"]);
        assert_eq!(out.dispatch[0], focus_cmd("d"));
    }

    #[test]
    fn removing_everything_leaves_no_focus_target() {
        let mut f = Fixture::flat(&["a"]).focus("a");
        let out = f.run(CollectionAction::Remove(None));
        assert!(f.ids("todos").is_empty());
        assert_eq!(out.dispatch.len(), 1);
        assert_eq!(out.dispatch[0].action, ZoneAction::Reconcile);
    }

    #[test]
    fn remove_of_missing_id_is_noop() {
        let mut f = Fixture::flat(&["a"]);
        assert!(f.run(CollectionAction::Remove(Some(vec![id("zz")]))).is_noop());
    }

    #[test]
    fn move_up_and_down_clamp() {
        let mut f = Fixture::flat(&["a", "b"]).focus("a");
        assert!(f.run(CollectionAction::MoveUp(None)).is_noop());
        assert!(f.run(CollectionAction::MoveDown(None)).data.is_some());
        assert_eq!(f.ids("todos"), ["b", "a"]);
    }

    #[test]
    fn moves_skip_hidden_siblings() {
        let mut f = Fixture::flat(&["a", "b", "c"]).focus("c");
        f.visible = Some(vec![id("a"), id("c")]);
        assert!(f.run(CollectionAction::MoveUp(None)).data.is_some());
        assert_eq!(f.ids("todos"), ["c", "b", "a"]);
        // c is first among shown items now.
        assert!(f.run(CollectionAction::MoveUp(None)).is_noop());
        assert!(f.run(CollectionAction::MoveDown(Some(id("a")))).is_noop());
    }

    #[test]
    fn duplicate_inserts_fresh_copy_after_original() {
        let mut f = Fixture::flat(&["a", "b"]).focus("a");
        let out = f.run(CollectionAction::Duplicate(None));
        assert_eq!(f.ids("todos"), ["a", "a-1", "b"]);
        assert_eq!(out.dispatch, vec![focus_cmd("a-1")]);
        let copy = f.data.collection(&zone()).unwrap().get(&id("a-1")).unwrap();
        assert_eq!(copy.str_field("title"), Some("A"));
    }

    #[test]
    fn copy_mirrors_to_host_without_touching_data() {
        let mut f = Fixture::flat(&["a", "b"]).focus("b");
        let out = f.run(CollectionAction::Copy(None));
        assert!(out.data.is_none());
        assert_eq!(out.effects.len(), 1);
        let Effect::ClipboardWrite { text, json } = &out.effects[0];
        assert_eq!(text, "B");
        assert!(json.as_deref().is_some_and(|j| j.contains("\"id\":\"b\"")));
        assert!(!f.clipboard.as_ref().unwrap().is_cut);
    }

    #[test]
    fn cut_then_paste_restores_length_and_fields() {
        let mut f = Fixture::flat(&["a", "b", "c"]).focus("b");
        f.run(CollectionAction::Cut(None));
        assert_eq!(f.ids("todos"), ["a", "c"]);
        let mut f = f.focus("c");
        let out = f.run(CollectionAction::Paste(None));
        assert_eq!(f.ids("todos"), ["a", "c", "b"]);
        assert_eq!(
            out.dispatch.last().map(|c| &c.action),
            Some(&ZoneAction::SetSelection(vec![id("b")]))
        );
        // The next paste is a copy.
        assert!(!f.clipboard.as_ref().unwrap().is_cut);
        f.run(CollectionAction::Paste(Some(id("b"))));
        assert_eq!(f.ids("todos"), ["a", "c", "b", "b-1"]);
    }

    #[test]
    fn paste_with_empty_clipboard_is_noop() {
        let mut f = Fixture::flat(&["a"]).focus("a");
        assert!(f.run(CollectionAction::Paste(None)).is_noop());
    }

    #[test]
    fn foreign_paste_needs_accept() {
        let mut f = Fixture::flat(&["a", "b"]).focus("a");
        f.run(CollectionAction::Copy(Some(vec![id("a"), id("b")])));

        // Nested into a group that accepts children, order kept.
        let out = f.run_in(ZoneId::from("outline"), CollectionAction::Paste(Some(id("g"))));
        assert_eq!(f.ids("outline"), ["g", "g1", "a", "b"]);
        assert_eq!(out.dispatch[0].action, ZoneAction::Expand(Some(id("g"))));

        // Onto a nested note: sibling within the note's parent.
        f.run_in(ZoneId::from("outline"), CollectionAction::Paste(Some(id("g1"))));
        assert_eq!(f.ids("outline"), ["g", "g1", "a-1", "b-1", "a", "b"]);

        // A collection without an adapter refuses foreign items.
        f.clipboard = Some(ClipboardEntry::copied(ZoneId::from("outline"), vec![task("x")]));
        assert!(f.run(CollectionAction::Paste(None)).is_noop());
    }

    #[test]
    fn paste_places_each_item_by_acceptance() {
        let mut f = Fixture::flat(&[]);
        let board = ZoneId::from("board");
        f.registry.register(
            CollectionConfig::new("board").accepts_child(|parent, child| parent.kind == "group" && child.kind == "task"),
        );
        let groups = Collection::from_trees([EntityTree::leaf(Entity::new("g", "group"))]).unwrap();
        f.data = f.data.update(board.clone(), groups);
        f.clipboard = Some(ClipboardEntry::copied(
            board.clone(),
            vec![EntityTree::leaf(Entity::new("n", "note")), task("t"), task("u")],
        ));

        let out = f.run_in(board.clone(), CollectionAction::Paste(Some(id("g"))));
        let pasted = f.data.collection(&board).unwrap();
        assert_eq!(pasted.position(&id("t")), Some((Some(&id("g")), 0)));
        assert_eq!(pasted.position(&id("u")), Some((Some(&id("g")), 1)));
        assert_eq!(pasted.position(&id("n")), Some((None, 1)));
        assert_eq!(out.dispatch[0].action, ZoneAction::Expand(Some(id("g"))));
    }

    #[test]
    fn move_checks_destination_acceptance() {
        let mut f = Fixture::flat(&[]);
        let outline = ZoneId::from("outline");
        f.run_in(outline.clone(), CollectionAction::Insert { tree: task("t"), at: InsertAt::End });
        let refused = f.run_in(
            outline.clone(),
            CollectionAction::Move { id: id("g"), parent: Some(id("t")), index: 0 },
        );
        assert!(refused.is_noop());
        let moved = f.run_in(outline, CollectionAction::Move { id: id("t"), parent: Some(id("g")), index: 0 });
        assert!(moved.data.is_some());
        assert_eq!(f.ids("outline"), ["g", "t", "g1"]);
    }

    #[test]
    fn insert_and_update() {
        let mut f = Fixture::flat(&["a", "b"]);
        let out = f.run(CollectionAction::Insert { tree: task("a"), at: InsertAt::After(id("a")) });
        assert_eq!(f.ids("todos"), ["a", "a-1", "b"]);
        assert_eq!(out.dispatch, vec![focus_cmd("a-1")]);

        let mut fields = Map::new();
        fields.insert("done".into(), json!(true));
        assert!(f.run(CollectionAction::Update { id: id("b"), fields: fields.clone() }).data.is_some());
        assert!(f.run(CollectionAction::Update { id: id("b"), fields }).is_noop());
    }

    #[test]
    fn targets_prefer_selection_and_drop_nested() {
        let mut f = Fixture::flat(&[]);
        let outline = ZoneId::from("outline");
        let mut state = FocusZoneState::default().with_focus(Some(id("g")));
        state.selection = [id("g"), id("g1")].into_iter().collect();
        f.focus = f.focus.with_zone(outline.clone(), state);
        let out = f.run_in(outline, CollectionAction::Copy(None));
        let entry = out.clipboard.unwrap();
        assert_eq!(entry.items.len(), 1);
        assert_eq!(entry.items[0].count(), 2);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "unknown zone"))]
    fn explicit_unknown_zone_is_loud() {
        let f = Fixture::flat(&["a"]);
        let env = CollectionEnv {
            focus: &f.focus,
            clipboard: None,
            registry: &f.registry,
            mirror: true,
            visible: None,
        };
        let result = reduce_collection(
            &f.data,
            env,
            &CollectionCommand::in_zone("nope", CollectionAction::Paste(None)),
        );
        assert!(matches!(result, Err(Rejection::UnknownZone(zone)) if zone == "nope"));
    }

    #[test]
    fn active_zone_without_collection_is_ignored() {
        let mut f = Fixture::flat(&["a"]);
        f.focus = f.focus.with_active(Some(ZoneId::from("toolbar")));
        let env = CollectionEnv {
            focus: &f.focus,
            clipboard: None,
            registry: &f.registry,
            mirror: true,
            visible: None,
        };
        let out = reduce_collection(&f.data, env, &CollectionCommand::active(CollectionAction::Copy(None)));
        assert!(out.unwrap().is_noop());
    }
}
