#![forbid(unsafe_code)]

//! Application state owned by the kernel.

use zonekit_runtime::Snapshot;
use zonekit_zones::{ClipboardEntry, Collection, GlobalFocusState, ZoneId};

/// Collections keyed by the zone that shows them.
pub type Collections = im::HashMap<ZoneId, Collection>;

/// The single state object the kernel reduces.
///
/// Only `data` is undoable. Focus and the clipboard slot live outside the
/// history so undo never moves focus or forgets a copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Collection contents.
    pub data: Collections,
    /// Focus, selection, expansion, and the active zone.
    pub focus: GlobalFocusState,
    /// The process-wide clipboard slot.
    pub clipboard: Option<ClipboardEntry>,
}

impl AppState {
    /// Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection shown by `zone`.
    #[must_use]
    pub fn collection(&self, zone: &ZoneId) -> Option<&Collection> {
        self.data.get(zone)
    }

    /// Copy with `zone`'s collection replaced.
    #[must_use]
    pub fn with_collection(&self, zone: ZoneId, collection: Collection) -> Self {
        Self {
            data: self.data.update(zone, collection),
            ..self.clone()
        }
    }
}

impl Snapshot for AppState {
    type Slice = Collections;

    fn snapshot(&self) -> Collections {
        self.data.clone()
    }

    fn restore(&mut self, slice: Collections) {
        self.data = slice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_zones::{Entity, ItemId};

    #[test]
    fn snapshot_covers_data_only() {
        let zone = ZoneId::from("list");
        let list = Collection::from_entities([Entity::new("a", "row")]).unwrap();
        let mut state = AppState::new().with_collection(zone.clone(), list);
        let before = state.snapshot();

        state.focus = state.focus.with_active(Some(zone.clone()));
        state.data = state.data.without(&zone);
        state.restore(before);

        assert!(state.collection(&zone).is_some_and(|c| c.contains(&ItemId::from("a"))));
        assert!(state.focus.is_active(&zone));
    }
}
