#![forbid(unsafe_code)]

//! Focus and selection state.
//!
//! [`GlobalFocusState`] is a persistent value: every mutator returns a new
//! state and shares structure with the old one through `im`, so reducers can
//! build the next state without cloning whole maps.

use im::{HashMap, OrdSet};

use crate::id::{ItemId, ZoneId};

/// Per-zone interaction state. Created lazily on first activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusZoneState {
    /// The focused item.
    pub focused: Option<ItemId>,
    /// The item focused before the current one.
    pub last_focused: Option<ItemId>,
    /// Item currently in inline edit.
    pub editing: Option<ItemId>,
    /// Selected items.
    pub selection: OrdSet<ItemId>,
    /// Fixed end of range selections.
    pub anchor: Option<ItemId>,
    /// Expanded tree nodes.
    pub expanded: OrdSet<ItemId>,
}

impl FocusZoneState {
    /// Whether `item` is focused.
    #[must_use]
    pub fn is_focused(&self, item: &ItemId) -> bool {
        self.focused.as_ref() == Some(item)
    }

    /// Whether `item` is selected.
    #[must_use]
    pub fn is_selected(&self, item: &ItemId) -> bool {
        self.selection.contains(item)
    }

    /// Whether `item` is expanded.
    #[must_use]
    pub fn is_expanded(&self, item: &ItemId) -> bool {
        self.expanded.contains(item)
    }

    /// Whether `item` is being edited.
    #[must_use]
    pub fn is_editing(&self, item: &ItemId) -> bool {
        self.editing.as_ref() == Some(item)
    }

    /// Move focus to `item`, remembering the previous item.
    ///
    /// Editing ends when focus leaves the edited item.
    #[must_use]
    pub fn with_focus(&self, item: Option<ItemId>) -> Self {
        if self.focused == item {
            return self.clone();
        }
        let mut next = self.clone();
        next.last_focused = next.focused.take().or(self.last_focused.clone());
        if next.editing.is_some() && next.editing != item {
            next.editing = None;
        }
        next.focused = item;
        next
    }

    /// Drop every reference to an item for which `exists` is false.
    #[must_use]
    pub fn pruned(&self, exists: impl Fn(&ItemId) -> bool) -> Self {
        let keep = |id: &Option<ItemId>| id.clone().filter(|id| exists(id));
        Self {
            focused: keep(&self.focused),
            last_focused: keep(&self.last_focused),
            editing: keep(&self.editing),
            selection: self.selection.iter().filter(|id| exists(id)).cloned().collect(),
            anchor: keep(&self.anchor),
            expanded: self.expanded.iter().filter(|id| exists(id)).cloned().collect(),
        }
    }
}

/// Focus state for every zone plus the active zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalFocusState {
    /// Zone receiving keyboard input.
    pub active_zone: Option<ZoneId>,
    zones: HashMap<ZoneId, FocusZoneState>,
}

impl GlobalFocusState {
    /// Empty state with no active zone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a zone that has been activated at least once.
    #[must_use]
    pub fn zone(&self, zone: &ZoneId) -> Option<&FocusZoneState> {
        self.zones.get(zone)
    }

    /// State of a zone, or a fresh one if it was never activated.
    #[must_use]
    pub fn zone_or_default(&self, zone: &ZoneId) -> FocusZoneState {
        self.zones.get(zone).cloned().unwrap_or_default()
    }

    /// Whether `zone` is the active zone.
    #[must_use]
    pub fn is_active(&self, zone: &ZoneId) -> bool {
        self.active_zone.as_ref() == Some(zone)
    }

    /// State of the active zone.
    #[must_use]
    pub fn active(&self) -> Option<(&ZoneId, Option<&FocusZoneState>)> {
        let zone = self.active_zone.as_ref()?;
        Some((zone, self.zones.get(zone)))
    }

    /// Replace the state of one zone.
    #[must_use]
    pub fn with_zone(&self, zone: ZoneId, state: FocusZoneState) -> Self {
        Self {
            active_zone: self.active_zone.clone(),
            zones: self.zones.update(zone, state),
        }
    }

    /// Change the active zone.
    #[must_use]
    pub fn with_active(&self, zone: Option<ZoneId>) -> Self {
        Self {
            active_zone: zone,
            zones: self.zones.clone(),
        }
    }

    /// Drop the state of a zone, deactivating it if it was active.
    #[must_use]
    pub fn without_zone(&self, zone: &ZoneId) -> Self {
        Self {
            active_zone: self.active_zone.clone().filter(|z| z != zone),
            zones: self.zones.without(zone),
        }
    }

    /// Zones with state, in unspecified order.
    pub fn zones(&self) -> impl Iterator<Item = (&ZoneId, &FocusZoneState)> {
        self.zones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    #[test]
    fn with_focus_tracks_previous_item() {
        let s = FocusZoneState::default().with_focus(Some(id("a")));
        let s = s.with_focus(Some(id("b")));
        assert_eq!(s.focused, Some(id("b")));
        assert_eq!(s.last_focused, Some(id("a")));
    }

    #[test]
    fn leaving_edited_item_ends_edit() {
        let mut s = FocusZoneState::default().with_focus(Some(id("a")));
        s.editing = Some(id("a"));
        assert_eq!(s.with_focus(Some(id("a"))).editing, Some(id("a")));
        assert_eq!(s.with_focus(Some(id("b"))).editing, None);
    }

    #[test]
    fn pruned_drops_stale_ids() {
        let mut s = FocusZoneState::default().with_focus(Some(id("b")));
        s.selection = [id("a"), id("b")].into_iter().collect();
        s.anchor = Some(id("a"));
        let p = s.pruned(|i| i != "a");
        assert_eq!(p.focused, Some(id("b")));
        assert_eq!(p.anchor, None);
        assert_eq!(p.selection.len(), 1);
    }

    #[test]
    fn global_state_is_persistent() {
        let zone = ZoneId::from("list");
        let g0 = GlobalFocusState::new();
        let g1 = g0
            .with_zone(zone.clone(), FocusZoneState::default().with_focus(Some(id("a"))))
            .with_active(Some(zone.clone()));
        assert!(g0.zone(&zone).is_none());
        assert!(g1.is_active(&zone));
        assert_eq!(g1.zone_or_default(&zone).focused, Some(id("a")));
        let g2 = g1.without_zone(&zone);
        assert!(g2.active_zone.is_none());
        assert!(g1.zone(&zone).is_some());
    }
}
