#![forbid(unsafe_code)]

//! Zones: focus groups, navigation, selection, projection, and collections.
//!
//! # Role in zonekit
//! `zonekit-zones` is the state model. A *zone* is a group of items that
//! shares one roving focus and one selection (a listbox, grid, toolbar, tree,
//! or dialog). This crate owns the per-zone state machine and the pure
//! reducers that move it, plus the collection layer that edits the data
//! behind collection-backed zones.
//!
//! # Primary responsibilities
//! - **Zone registry**: [`ZoneConfig`] with role presets and live item accessors.
//! - **State**: [`GlobalFocusState`] / [`FocusZoneState`] on persistent maps.
//! - **Engines**: [`navigate`](navigate::navigate) and
//!   [`apply_selection`](selection::apply_selection).
//! - **Commands**: [`ZoneCommand`] and [`reduce_zone`].
//! - **Projection**: ARIA and `data-*` attributes for renderers.
//! - **Collections**: arena trees, clipboard slot, CRUD and paste commands.
//!
//! # How it fits in the system
//! Reducers here are plain functions; the facade (`zonekit`) registers them
//! as kernel handlers from `zonekit-runtime` and feeds them commands that
//! `zonekit-core` resolved from key presses.

pub mod collection;
pub mod command;
pub mod id;
pub mod navigate;
pub mod projection;
pub mod role;
pub mod selection;
pub mod state;
pub mod zone;

pub use collection::{
    ClipboardEntry, ClipboardSource, Collection, CollectionAction, CollectionCommand, CollectionConfig, CollectionEnv,
    CollectionOutcome, CollectionRegistry, CollectionStore, Entity, EntityTree, InsertAt, TreeError,
    reduce_collection,
};
pub use command::{ZoneAction, ZoneCommand, ZoneOptions, ZoneOutcome, reduce_zone};
pub use id::{ItemId, ZoneId, item_ids};
pub use navigate::{Direction, NavTarget};
pub use projection::{Attrs, ItemProps, ItemState, compute_container_props, compute_item};
pub use role::{Entry, Orientation, Role, SelectConfig, SelectMode};
pub use selection::{SelectEvent, SelectOp};
pub use state::{FocusZoneState, GlobalFocusState};
pub use zone::{Hierarchy, ZoneConfig, ZoneRegistry};
