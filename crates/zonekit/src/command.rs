#![forbid(unsafe_code)]

//! The command union the kernel dispatches.
//!
//! Every command has a constructor and a stable kind string. Zone and
//! collection commands carry their target zone; `None` means the active zone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zonekit_runtime::{HistoryOp, KernelCommand};
use zonekit_zones::{
    CollectionAction, CollectionCommand, Direction, EntityTree, InsertAt, ItemId, SelectOp, ZoneAction, ZoneCommand, ZoneId,
};

/// Kinds handled by the zone reducer.
pub const ZONE_KINDS: &[&str] = &[
    "zone.focus",
    "zone.navigate",
    "zone.select",
    "zone.set_selection",
    "zone.select_all",
    "zone.clear_selection",
    "zone.activate",
    "zone.expand",
    "zone.collapse",
    "zone.toggle_expand",
    "zone.start_edit",
    "zone.commit_edit",
    "zone.cancel_edit",
    "zone.escape",
    "zone.typeahead",
    "zone.activate_zone",
    "zone.reconcile",
];

/// Kinds handled by the collection reducer.
pub const COLLECTION_KINDS: &[&str] = &[
    "collection.insert",
    "collection.update",
    "collection.remove",
    "collection.move_up",
    "collection.move_down",
    "collection.move",
    "collection.duplicate",
    "collection.copy",
    "collection.cut",
    "collection.paste",
];

/// An application-defined command routed to a handler registered by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCommand {
    /// Handler kind, e.g. `"app.open"`.
    pub kind: String,
    /// Arbitrary payload.
    #[serde(default)]
    pub payload: Value,
}

/// Everything the kernel can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Focus, navigation, selection, expansion, editing.
    Zone(ZoneCommand),
    /// CRUD and clipboard on a collection zone.
    Collection(CollectionCommand),
    /// Step back through history.
    Undo,
    /// Step forward through history.
    Redo,
    /// Application handler.
    Custom(CustomCommand),
}

impl KernelCommand for Command {
    fn kind(&self) -> &str {
        match self {
            Self::Zone(cmd) => cmd.kind(),
            Self::Collection(cmd) => cmd.kind(),
            Self::Undo => "history.undo",
            Self::Redo => "history.redo",
            Self::Custom(cmd) => cmd.kind.as_str(),
        }
    }

    fn history_op(&self) -> Option<HistoryOp> {
        match self {
            Self::Undo => Some(HistoryOp::Undo),
            Self::Redo => Some(HistoryOp::Redo),
            _ => None,
        }
    }
}

impl From<ZoneCommand> for Command {
    fn from(cmd: ZoneCommand) -> Self {
        Self::Zone(cmd)
    }
}

impl From<CollectionCommand> for Command {
    fn from(cmd: CollectionCommand) -> Self {
        Self::Collection(cmd)
    }
}

impl From<CustomCommand> for Command {
    fn from(cmd: CustomCommand) -> Self {
        Self::Custom(cmd)
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl Command {
    /// A zone action on the active zone.
    #[must_use]
    pub fn zone(action: ZoneAction) -> Self {
        Self::Zone(ZoneCommand::active(action))
    }

    /// A zone action on a specific zone.
    #[must_use]
    pub fn zone_in(zone: impl Into<ZoneId>, action: ZoneAction) -> Self {
        Self::Zone(ZoneCommand::in_zone(zone, action))
    }

    /// A collection action on the active zone.
    #[must_use]
    pub fn collection(action: CollectionAction) -> Self {
        Self::Collection(CollectionCommand::active(action))
    }

    /// A collection action on a specific zone.
    #[must_use]
    pub fn collection_in(zone: impl Into<ZoneId>, action: CollectionAction) -> Self {
        Self::Collection(CollectionCommand::in_zone(zone, action))
    }

    /// An application command.
    #[must_use]
    pub fn custom(kind: impl Into<String>, payload: Value) -> Self {
        Self::Custom(CustomCommand {
            kind: kind.into(),
            payload,
        })
    }

    #[must_use]
    pub fn focus(item: impl Into<ItemId>) -> Self {
        Self::zone(ZoneAction::Focus(item.into()))
    }

    #[must_use]
    pub fn navigate(direction: Direction) -> Self {
        Self::Zone(ZoneCommand::navigate(direction))
    }

    /// Navigate and grow the range selection.
    #[must_use]
    pub fn extend(direction: Direction) -> Self {
        Self::Zone(ZoneCommand::extend(direction))
    }

    #[must_use]
    pub fn select(item: Option<ItemId>, op: SelectOp) -> Self {
        Self::zone(ZoneAction::Select { item, op })
    }

    #[must_use]
    pub fn select_all() -> Self {
        Self::zone(ZoneAction::SelectAll)
    }

    #[must_use]
    pub fn clear_selection() -> Self {
        Self::zone(ZoneAction::ClearSelection)
    }

    #[must_use]
    pub fn activate() -> Self {
        Self::zone(ZoneAction::Activate(None))
    }

    #[must_use]
    pub fn escape() -> Self {
        Self::zone(ZoneAction::Escape)
    }

    #[must_use]
    pub fn start_edit() -> Self {
        Self::zone(ZoneAction::StartEdit(None))
    }

    #[must_use]
    pub fn commit_edit() -> Self {
        Self::zone(ZoneAction::CommitEdit)
    }

    #[must_use]
    pub fn cancel_edit() -> Self {
        Self::zone(ZoneAction::CancelEdit)
    }

    #[must_use]
    pub fn toggle_expand() -> Self {
        Self::zone(ZoneAction::ToggleExpand(None))
    }

    #[must_use]
    pub fn typeahead(query: impl Into<String>) -> Self {
        Self::zone(ZoneAction::Typeahead(query.into()))
    }

    /// Make `zone` the active zone, seeding its focus.
    #[must_use]
    pub fn activate_zone(zone: impl Into<ZoneId>) -> Self {
        Self::zone_in(zone, ZoneAction::ActivateZone)
    }

    /// Drop focus, selection, and expansion entries that no longer exist.
    #[must_use]
    pub fn reconcile() -> Self {
        Self::zone(ZoneAction::Reconcile)
    }

    #[must_use]
    pub fn insert(tree: impl Into<EntityTree>, at: InsertAt) -> Self {
        Self::collection(CollectionAction::Insert { tree: tree.into(), at })
    }

    #[must_use]
    pub fn update(id: impl Into<ItemId>, fields: serde_json::Map<String, Value>) -> Self {
        Self::collection(CollectionAction::Update { id: id.into(), fields })
    }

    /// Remove the selection, or the focused item.
    #[must_use]
    pub fn remove() -> Self {
        Self::collection(CollectionAction::Remove(None))
    }

    #[must_use]
    pub fn remove_items(ids: Vec<ItemId>) -> Self {
        Self::collection(CollectionAction::Remove(Some(ids)))
    }

    #[must_use]
    pub fn move_up() -> Self {
        Self::collection(CollectionAction::MoveUp(None))
    }

    #[must_use]
    pub fn move_down() -> Self {
        Self::collection(CollectionAction::MoveDown(None))
    }

    /// Reparent `id` under `parent` (root when `None`) at `index`.
    #[must_use]
    pub fn move_to(id: impl Into<ItemId>, parent: Option<ItemId>, index: usize) -> Self {
        Self::collection(CollectionAction::Move {
            id: id.into(),
            parent,
            index,
        })
    }

    #[must_use]
    pub fn duplicate() -> Self {
        Self::collection(CollectionAction::Duplicate(None))
    }

    #[must_use]
    pub fn copy() -> Self {
        Self::collection(CollectionAction::Copy(None))
    }

    #[must_use]
    pub fn cut() -> Self {
        Self::collection(CollectionAction::Cut(None))
    }

    #[must_use]
    pub fn paste() -> Self {
        Self::collection(CollectionAction::Paste(None))
    }
}
