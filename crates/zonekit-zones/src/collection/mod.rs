#![forbid(unsafe_code)]

//! Tree-aware collections bound to zones.
//!
//! A collection zone pairs a [`ZoneConfig`] whose items come from a
//! [`Collection`] with a [`CollectionConfig`] describing how its entities are
//! rendered as text, cloned, identified, and accepted from other zones.
//! [`ops::reduce_collection`] implements the CRUD and clipboard commands.
//!
//! Application data only has to expose its collections through
//! [`CollectionStore`]; `im::HashMap<ZoneId, Collection>` already does.

pub mod clipboard;
pub mod entity;
pub mod ops;
pub mod tree;

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

pub use clipboard::{ClipboardEntry, ClipboardSource};
pub use entity::{Entity, EntityTree};
pub use ops::{CollectionAction, CollectionCommand, CollectionEnv, CollectionOutcome, InsertAt, reduce_collection};
pub use tree::{Collection, TreeError};

use crate::id::{ItemId, ZoneId};
use crate::role::Role;
use crate::zone::{Hierarchy, ZoneConfig};

/// Application data that holds collections keyed by zone.
pub trait CollectionStore: Clone {
    /// The collection shown by `zone`.
    fn collection(&self, zone: &ZoneId) -> Option<&Collection>;

    /// Copy of `self` with the collection of `zone` replaced.
    #[must_use]
    fn with_collection(&self, zone: &ZoneId, collection: Collection) -> Self;
}

impl CollectionStore for im::HashMap<ZoneId, Collection> {
    fn collection(&self, zone: &ZoneId) -> Option<&Collection> {
        self.get(zone)
    }

    fn with_collection(&self, zone: &ZoneId, collection: Collection) -> Self {
        self.update(zone.clone(), collection)
    }
}

type TextFn = dyn Fn(&Entity) -> String + Send + Sync;
type AcceptFn = dyn Fn(&EntityTree) -> Option<EntityTree> + Send + Sync;
type AcceptsChildFn = dyn Fn(&Entity, &Entity) -> bool + Send + Sync;
type CloneFn = dyn Fn(&Entity, ItemId) -> Entity + Send + Sync;
type PasteFn = dyn Fn(EntityTree) -> EntityTree + Send + Sync;
type IdFn = dyn Fn(&Entity) -> ItemId + Send + Sync;

/// Behavior of one collection.
#[derive(Clone)]
pub struct CollectionConfig {
    /// The zone (and collection) id.
    pub id: ZoneId,
    text: Arc<TextFn>,
    accept: Option<Arc<AcceptFn>>,
    accepts_child: Option<Arc<AcceptsChildFn>>,
    on_clone: Option<Arc<CloneFn>>,
    on_paste: Option<Arc<PasteFn>>,
    generate_id: Option<Arc<IdFn>>,
}

impl fmt::Debug for CollectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionConfig")
            .field("id", &self.id)
            .field("accepts_foreign", &self.accept.is_some())
            .field("nests", &self.accepts_child.is_some())
            .finish_non_exhaustive()
    }
}

/// Default text: the first of `text`, `title`, `label`, `name`, else the id.
pub fn default_text(entity: &Entity) -> String {
    ["text", "title", "label", "name"]
        .iter()
        .find_map(|name| entity.str_field(name))
        .map_or_else(|| entity.id.to_string(), str::to_string)
}

impl CollectionConfig {
    /// Collection with default text and no foreign-paste support.
    pub fn new(id: impl Into<ZoneId>) -> Self {
        Self {
            id: id.into(),
            text: Arc::new(default_text),
            accept: None,
            accepts_child: None,
            on_clone: None,
            on_paste: None,
            generate_id: None,
        }
    }

    /// Plain-text rendering of an entity.
    #[must_use]
    pub fn text(mut self, f: impl Fn(&Entity) -> String + Send + Sync + 'static) -> Self {
        self.text = Arc::new(f);
        self
    }

    /// Adapter for items pasted from other sources. `None` drops the item.
    #[must_use]
    pub fn accept(mut self, f: impl Fn(&EntityTree) -> Option<EntityTree> + Send + Sync + 'static) -> Self {
        self.accept = Some(Arc::new(f));
        self
    }

    /// Accept foreign items whose type is one of `kinds`, unchanged.
    #[must_use]
    pub fn accept_kinds<I, S>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let kinds: Vec<String> = kinds.into_iter().map(Into::into).collect();
        self.accept(move |tree| kinds.contains(&tree.entity.kind).then(|| tree.clone()))
    }

    /// Which entities accept which others as children.
    #[must_use]
    pub fn accepts_child(mut self, f: impl Fn(&Entity, &Entity) -> bool + Send + Sync + 'static) -> Self {
        self.accepts_child = Some(Arc::new(f));
        self
    }

    /// Clone hook used whenever an entity is copied under a fresh id.
    #[must_use]
    pub fn on_clone(mut self, f: impl Fn(&Entity, ItemId) -> Entity + Send + Sync + 'static) -> Self {
        self.on_clone = Some(Arc::new(f));
        self
    }

    /// Transform applied to every pasted item.
    #[must_use]
    pub fn on_paste(mut self, f: impl Fn(EntityTree) -> EntityTree + Send + Sync + 'static) -> Self {
        self.on_paste = Some(Arc::new(f));
        self
    }

    /// Id generator for clones. Taken ids fall back to `<id>-<n>`.
    #[must_use]
    pub fn generate_id(mut self, f: impl Fn(&Entity) -> ItemId + Send + Sync + 'static) -> Self {
        self.generate_id = Some(Arc::new(f));
        self
    }

    // ====================================================================
    // Hooks
    // ====================================================================

    /// Plain text of an entity.
    #[must_use]
    pub fn text_of(&self, entity: &Entity) -> String {
        (self.text)(entity)
    }

    /// Adapt a foreign item.
    #[must_use]
    pub fn adapt(&self, tree: &EntityTree) -> Option<EntityTree> {
        self.accept.as_ref().and_then(|f| f(tree))
    }

    /// Whether `parent` takes `child` as a child.
    #[must_use]
    pub fn nests(&self, parent: &Entity, child: &Entity) -> bool {
        self.accepts_child.as_ref().is_some_and(|f| f(parent, child))
    }

    pub(crate) fn pasted(&self, tree: EntityTree) -> EntityTree {
        match &self.on_paste {
            Some(f) => f(tree),
            None => tree,
        }
    }

    /// Copy of `entity` under a fresh id not rejected by `taken`.
    pub(crate) fn clone_entity(&self, entity: &Entity, taken: &dyn Fn(&ItemId) -> bool) -> Entity {
        let id = self
            .generate_id
            .as_ref()
            .map(|f| f(entity))
            .filter(|id| !taken(id))
            .unwrap_or_else(|| {
                (1usize..)
                    .map(|n| ItemId::from(format!("{}-{n}", entity.id)))
                    .find(|id| !taken(id))
                    .unwrap_or_else(|| entity.id.clone())
            });
        match &self.on_clone {
            Some(f) => f(entity, id),
            None => entity.with_id(id),
        }
    }

    /// Zone over this collection: visible items follow tree expansion,
    /// labels come from the text hook.
    pub fn zone<D, C>(&self, role: Role) -> ZoneConfig<D, C>
    where
        D: CollectionStore,
    {
        let items_zone = self.id.clone();
        let exists_zone = self.id.clone();
        let label_zone = self.id.clone();
        let text = Arc::clone(&self.text);
        ZoneConfig::new(self.id.clone(), role, move |data: &D, state| {
            data.collection(&items_zone)
                .map(|c| c.visible(&state.expanded))
                .unwrap_or_default()
        })
        .exists(move |data: &D, id| data.collection(&exists_zone).is_some_and(|c| c.contains(id)))
        .label(move |data: &D, id| {
            data.collection(&label_zone)
                .and_then(|c| c.get(id))
                .map(|e| text(e))
        })
        .hierarchy(CollectionHierarchy {
            zone: self.id.clone(),
        })
    }
}

/// [`Hierarchy`] backed by the zone's collection.
#[derive(Debug, Clone)]
pub struct CollectionHierarchy {
    zone: ZoneId,
}

impl<D: CollectionStore> Hierarchy<D> for CollectionHierarchy {
    fn parent(&self, data: &D, item: &ItemId) -> Option<ItemId> {
        data.collection(&self.zone)?.parent_of(item).cloned()
    }

    fn children(&self, data: &D, item: &ItemId) -> Vec<ItemId> {
        data.collection(&self.zone)
            .and_then(|c| c.children_of(Some(item)))
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn has_children(&self, data: &D, item: &ItemId) -> bool {
        data.collection(&self.zone).is_some_and(|c| c.has_children(item))
    }

    fn level(&self, data: &D, item: &ItemId) -> usize {
        data.collection(&self.zone)
            .and_then(|c| c.depth(item))
            .unwrap_or(1)
    }
}

/// Registered collection configs.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    configs: AHashMap<ZoneId, CollectionConfig>,
}

impl CollectionRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a collection config.
    pub fn register(&mut self, config: CollectionConfig) -> Option<CollectionConfig> {
        tracing::debug!(target: "zonekit.collection", zone = %config.id, "collection registered");
        self.configs.insert(config.id.clone(), config)
    }

    /// Remove a collection config.
    pub fn unregister(&mut self, zone: &ZoneId) -> Option<CollectionConfig> {
        self.configs.remove(zone)
    }

    /// Look up a config.
    #[must_use]
    pub fn get(&self, zone: &ZoneId) -> Option<&CollectionConfig> {
        self.configs.get(zone)
    }

    /// Number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether no collections are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Remove every config.
    pub fn reset(&mut self) {
        self.configs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FocusZoneState;

    type Store = im::HashMap<ZoneId, Collection>;

    fn store() -> Store {
        let files = Collection::from_trees([
            EntityTree::leaf(Entity::new("src", "dir").with_field("name", "src"))
                .with_child(Entity::new("main", "file").with_field("name", "main.rs")),
            EntityTree::leaf(Entity::new("readme", "file").with_field("name", "README")),
        ])
        .unwrap();
        Store::new().update(ZoneId::from("files"), files)
    }

    #[test]
    fn default_text_prefers_known_fields() {
        assert_eq!(default_text(&Entity::new("x", "t").with_field("title", "Hello")), "Hello");
        assert_eq!(default_text(&Entity::new("x", "t")), "x");
    }

    #[test]
    fn collection_zone_reads_live_data() {
        let config = CollectionConfig::new("files");
        let zone: ZoneConfig<Store, ()> = config.zone(Role::Tree);
        let data = store();
        let mut state = FocusZoneState::default();
        let ids = |s: &FocusZoneState| -> Vec<String> {
            zone.visible_items(&data, s).into_iter().map(String::from).collect()
        };
        assert_eq!(ids(&state), ["src", "readme"]);
        state.expanded.insert(ItemId::from("src"));
        assert_eq!(ids(&state), ["src", "main", "readme"]);
        assert!(zone.contains(&data, &FocusZoneState::default(), &ItemId::from("main")));
        assert_eq!(zone.label_of(&data, &ItemId::from("main")).as_deref(), Some("main.rs"));
        assert!(zone.has_children(&data, &ItemId::from("src")));
        let tree = zone.hierarchy_ref().unwrap();
        assert_eq!(tree.level(&data, &ItemId::from("main")), 2);
    }

    #[test]
    fn clone_entity_picks_a_free_id() {
        let config = CollectionConfig::new("files");
        let e = Entity::new("a", "t");
        let clone = config.clone_entity(&e, &|id| id == "a" || id == "a-1");
        assert_eq!(clone.id, "a-2");

        let custom = CollectionConfig::new("files").generate_id(|_| ItemId::from("fixed"));
        assert_eq!(custom.clone_entity(&e, &|_| false).id, "fixed");
        assert_eq!(custom.clone_entity(&e, &|id| id == "fixed").id, "a-1");
    }

    #[test]
    fn accept_kinds_filters_foreign_items() {
        let config = CollectionConfig::new("files").accept_kinds(["file"]);
        assert!(config.adapt(&EntityTree::leaf(Entity::new("x", "file"))).is_some());
        assert!(config.adapt(&EntityTree::leaf(Entity::new("x", "task"))).is_none());
        assert!(CollectionConfig::new("plain").adapt(&EntityTree::leaf(Entity::new("x", "file"))).is_none());
    }

    #[test]
    fn registry_reset() {
        let mut reg = CollectionRegistry::new();
        reg.register(CollectionConfig::new("a"));
        assert_eq!(reg.len(), 1);
        assert!(reg.get(&ZoneId::from("a")).is_some());
        reg.reset();
        assert!(reg.is_empty());
    }
}
