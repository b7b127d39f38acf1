#![forbid(unsafe_code)]

//! Zone configuration and the zone registry.
//!
//! A [`ZoneConfig`] describes one focus zone: its role, the live item list
//! (an accessor over application data `D`), and the hooks that turn
//! activation or dismissal into commands of type `C`. Configs are owned by a
//! [`ZoneRegistry`] that the interaction layer passes to reducers explicitly.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::id::{ItemId, ZoneId};
use crate::role::{Entry, Orientation, Role, SelectConfig};
use crate::state::FocusZoneState;

type ItemsFn<D> = dyn Fn(&D, &FocusZoneState) -> Vec<ItemId> + Send + Sync;
type ItemPredicate<D> = dyn Fn(&D, &ItemId) -> bool + Send + Sync;
type LabelFn<D> = dyn Fn(&D, &ItemId) -> Option<String> + Send + Sync;
type ActivateFn<D, C> = dyn Fn(&D, &ItemId) -> Option<C> + Send + Sync;
type DismissFn<D, C> = dyn Fn(&D) -> Option<C> + Send + Sync;

/// Parent/child structure over the items of a tree zone.
pub trait Hierarchy<D>: Send + Sync {
    /// Parent of `item`, `None` for roots.
    fn parent(&self, data: &D, item: &ItemId) -> Option<ItemId>;

    /// Ordered children of `item`.
    fn children(&self, data: &D, item: &ItemId) -> Vec<ItemId>;

    /// Whether `item` can be expanded.
    fn has_children(&self, data: &D, item: &ItemId) -> bool {
        !self.children(data, item).is_empty()
    }

    /// One-based depth of `item`.
    fn level(&self, data: &D, item: &ItemId) -> usize {
        let mut level = 1;
        let mut cursor = self.parent(data, item);
        while let Some(parent) = cursor {
            level += 1;
            cursor = self.parent(data, &parent);
        }
        level
    }
}

/// Description of one focus zone.
pub struct ZoneConfig<D, C> {
    /// Zone identifier.
    pub id: ZoneId,
    /// ARIA pattern.
    pub role: Role,
    /// Arrow keys that move focus.
    pub orientation: Orientation,
    /// Wrap past either end.
    pub looping: bool,
    /// Where focus lands on entry.
    pub entry: Entry,
    /// Selection behavior.
    pub select: SelectConfig,
    /// Escape returns to `parent`.
    pub dismissable: bool,
    /// Row width for grids. Vertical moves step by this many items.
    pub columns: Option<usize>,
    /// Zone that regains activity when this one is dismissed.
    pub parent: Option<ZoneId>,
    items: Arc<ItemsFn<D>>,
    exists: Option<Arc<ItemPredicate<D>>>,
    filter: Option<Arc<ItemPredicate<D>>>,
    disabled: Option<Arc<ItemPredicate<D>>>,
    label: Option<Arc<LabelFn<D>>>,
    hierarchy: Option<Arc<dyn Hierarchy<D>>>,
    on_activate: Option<Arc<ActivateFn<D, C>>>,
    on_dismiss: Option<Arc<DismissFn<D, C>>>,
}

impl<D, C> Clone for ZoneConfig<D, C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            role: self.role,
            orientation: self.orientation,
            looping: self.looping,
            entry: self.entry,
            select: self.select,
            dismissable: self.dismissable,
            columns: self.columns,
            parent: self.parent.clone(),
            items: Arc::clone(&self.items),
            exists: self.exists.clone(),
            filter: self.filter.clone(),
            disabled: self.disabled.clone(),
            label: self.label.clone(),
            hierarchy: self.hierarchy.clone(),
            on_activate: self.on_activate.clone(),
            on_dismiss: self.on_dismiss.clone(),
        }
    }
}

impl<D, C> fmt::Debug for ZoneConfig<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneConfig")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("orientation", &self.orientation)
            .field("looping", &self.looping)
            .field("select", &self.select)
            .field("columns", &self.columns)
            .field("parent", &self.parent)
            .field("hierarchy", &self.hierarchy.is_some())
            .finish_non_exhaustive()
    }
}

impl<D, C> ZoneConfig<D, C> {
    /// Zone with the role's preset behavior and a live item accessor.
    pub fn new(
        id: impl Into<ZoneId>,
        role: Role,
        items: impl Fn(&D, &FocusZoneState) -> Vec<ItemId> + Send + Sync + 'static,
    ) -> Self {
        let preset = role.preset();
        Self {
            id: id.into(),
            role,
            orientation: preset.orientation,
            looping: preset.looping,
            entry: preset.entry,
            select: preset.select,
            dismissable: preset.dismissable,
            columns: None,
            parent: None,
            items: Arc::new(items),
            exists: None,
            filter: None,
            disabled: None,
            label: None,
            hierarchy: None,
            on_activate: None,
            on_dismiss: None,
        }
    }

    /// Zone over a fixed list of items.
    pub fn fixed<I, S>(id: impl Into<ZoneId>, role: Role, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<ItemId> = items.into_iter().map(ItemId::new).collect();
        Self::new(id, role, move |_, _| items.clone())
    }

    // ====================================================================
    // Builder
    // ====================================================================

    /// Override orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Override looping.
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Override the entry item.
    #[must_use]
    pub fn entry(mut self, entry: Entry) -> Self {
        self.entry = entry;
        self
    }

    /// Override selection behavior.
    #[must_use]
    pub fn select(mut self, select: SelectConfig) -> Self {
        self.select = select;
        self
    }

    /// Override dismissability.
    #[must_use]
    pub fn dismissable(mut self, dismissable: bool) -> Self {
        self.dismissable = dismissable;
        self
    }

    /// Lay items out in rows of `columns`.
    #[must_use]
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns.max(1));
        self
    }

    /// Zone to return to on dismissal.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<ZoneId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Membership test for items not currently visible (collapsed subtrees).
    #[must_use]
    pub fn exists(mut self, exists: impl Fn(&D, &ItemId) -> bool + Send + Sync + 'static) -> Self {
        self.exists = Some(Arc::new(exists));
        self
    }

    /// Hide items for which `keep` is false.
    #[must_use]
    pub fn filter(mut self, keep: impl Fn(&D, &ItemId) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(keep));
        self
    }

    /// Mark items as disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: impl Fn(&D, &ItemId) -> bool + Send + Sync + 'static) -> Self {
        self.disabled = Some(Arc::new(disabled));
        self
    }

    /// Text used by typeahead.
    #[must_use]
    pub fn label(mut self, label: impl Fn(&D, &ItemId) -> Option<String> + Send + Sync + 'static) -> Self {
        self.label = Some(Arc::new(label));
        self
    }

    /// Parent/child structure.
    #[must_use]
    pub fn hierarchy(mut self, hierarchy: impl Hierarchy<D> + 'static) -> Self {
        self.hierarchy = Some(Arc::new(hierarchy));
        self
    }

    /// Command produced when an item is activated.
    #[must_use]
    pub fn on_activate(mut self, f: impl Fn(&D, &ItemId) -> Option<C> + Send + Sync + 'static) -> Self {
        self.on_activate = Some(Arc::new(f));
        self
    }

    /// Command produced when the zone is dismissed.
    #[must_use]
    pub fn on_dismiss(mut self, f: impl Fn(&D) -> Option<C> + Send + Sync + 'static) -> Self {
        self.on_dismiss = Some(Arc::new(f));
        self
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Items in display order after filtering.
    pub fn visible_items(&self, data: &D, state: &FocusZoneState) -> Vec<ItemId> {
        let mut items = (self.items)(data, state);
        if let Some(keep) = &self.filter {
            items.retain(|id| keep(data, id));
        }
        items
    }

    /// Whether `item` belongs to the zone, visible or not.
    pub fn contains(&self, data: &D, state: &FocusZoneState, item: &ItemId) -> bool {
        match &self.exists {
            Some(exists) => exists(data, item),
            None => self.visible_items(data, state).contains(item),
        }
    }

    /// Whether `item` is disabled.
    pub fn is_disabled(&self, data: &D, item: &ItemId) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(data, item))
    }

    /// Typeahead text of `item`. Zones without a label accessor have none.
    pub fn label_of(&self, data: &D, item: &ItemId) -> Option<String> {
        self.label.as_ref().and_then(|f| f(data, item))
    }

    /// Parent/child structure, if any.
    #[must_use]
    pub fn hierarchy_ref(&self) -> Option<&dyn Hierarchy<D>> {
        self.hierarchy.as_deref()
    }

    /// Whether `item` has children.
    pub fn has_children(&self, data: &D, item: &ItemId) -> bool {
        self.hierarchy.as_ref().is_some_and(|h| h.has_children(data, item))
    }

    /// Command for activating `item`.
    pub fn activate(&self, data: &D, item: &ItemId) -> Option<C> {
        self.on_activate.as_ref().and_then(|f| f(data, item))
    }

    /// Command for dismissing the zone.
    pub fn dismiss(&self, data: &D) -> Option<C> {
        self.on_dismiss.as_ref().and_then(|f| f(data))
    }

    /// The item focused on entry: first or last enabled visible item.
    pub fn entry_item(&self, data: &D, state: &FocusZoneState) -> Option<ItemId> {
        let items = self.visible_items(data, state);
        let enabled = |id: &&ItemId| !self.is_disabled(data, id);
        match self.entry {
            Entry::First => items.iter().find(enabled).cloned(),
            Entry::Last => items.iter().rev().find(enabled).cloned(),
        }
    }
}

/// Registered zones in registration order.
pub struct ZoneRegistry<D, C> {
    zones: AHashMap<ZoneId, ZoneConfig<D, C>>,
    order: Vec<ZoneId>,
}

impl<D, C> Default for ZoneRegistry<D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, C> fmt::Debug for ZoneRegistry<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneRegistry").field("zones", &self.order).finish()
    }
}

impl<D, C> ZoneRegistry<D, C> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zones: AHashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a zone, replacing any config with the same id.
    pub fn register(&mut self, config: ZoneConfig<D, C>) -> Option<ZoneConfig<D, C>> {
        let id = config.id.clone();
        tracing::debug!(target: "zonekit.zone", zone = %id, role = ?config.role, "zone registered");
        let previous = self.zones.insert(id.clone(), config);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Remove a zone.
    pub fn unregister(&mut self, id: &ZoneId) -> Option<ZoneConfig<D, C>> {
        let removed = self.zones.remove(id)?;
        self.order.retain(|z| z != id);
        tracing::debug!(target: "zonekit.zone", zone = %id, "zone unregistered");
        Some(removed)
    }

    /// Look up a zone.
    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<&ZoneConfig<D, C>> {
        self.zones.get(id)
    }

    /// Whether a zone is registered.
    #[must_use]
    pub fn contains(&self, id: &ZoneId) -> bool {
        self.zones.contains_key(id)
    }

    /// Zone ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.order.iter()
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no zones are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove every zone.
    pub fn reset(&mut self) {
        self.zones.clear();
        self.order.clear();
    }
}
