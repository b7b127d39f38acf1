#![forbid(unsafe_code)]

//! Selection engine.
//!
//! [`apply_selection`] folds a [`SelectOp`] into a zone's selection and
//! anchor. A `None` result means the operation is a no-op for this zone
//! (not selectable, disabled target, constraint violated, or nothing would
//! change).
//!
//! # Invariants
//!
//! 1. Single-select zones never hold more than one item.
//! 2. Zones with `disallow_empty` never transition to an empty selection.
//! 3. Range selection spans the anchor..target items in visible order and
//!    skips disabled items.
//! 4. Toggling never moves the anchor.

use im::OrdSet;
use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::role::SelectMode;
use crate::state::FocusZoneState;
use crate::zone::ZoneConfig;

/// How a pick affects the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectOp {
    /// Select only the target and anchor there.
    #[default]
    Replace,
    /// Flip membership of the target.
    Toggle,
    /// Select anchor..target.
    Range,
}

/// Selection operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    /// Explicit pick of an item.
    Pick(ItemId, SelectOp),
    /// Focus moved to an item; applies only with follow-focus.
    FollowFocus(ItemId),
    /// Select every enabled visible item.
    All,
    /// Deselect everything.
    Clear,
}

/// New selection and anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPatch {
    /// Selected items.
    pub selection: OrdSet<ItemId>,
    /// Range anchor.
    pub anchor: Option<ItemId>,
}

impl SelectionPatch {
    /// Write the patch into a zone state.
    #[must_use]
    pub fn apply(self, state: &FocusZoneState) -> FocusZoneState {
        FocusZoneState {
            selection: self.selection,
            anchor: self.anchor,
            ..state.clone()
        }
    }
}

/// Compute the selection after `event`, or `None` if nothing changes.
pub fn apply_selection<D, C>(
    data: &D,
    zone: &ZoneConfig<D, C>,
    state: &FocusZoneState,
    event: &SelectEvent,
) -> Option<SelectionPatch> {
    let config = zone.select;
    if !config.is_selectable() {
        return None;
    }

    let patch = match event {
        SelectEvent::Pick(item, op) => {
            if zone.is_disabled(data, item) {
                return None;
            }
            match op {
                SelectOp::Replace => replace(item),
                SelectOp::Toggle if config.toggle => toggle(state, item, config.mode),
                SelectOp::Range if config.allows_range() => range(data, zone, state, item)?,
                // Falls back to the plain pick.
                SelectOp::Toggle | SelectOp::Range => replace(item),
            }
        }
        SelectEvent::FollowFocus(item) => {
            if !config.follow_focus || zone.is_disabled(data, item) {
                return None;
            }
            replace(item)
        }
        SelectEvent::All => {
            if config.mode != SelectMode::Multiple {
                return None;
            }
            SelectionPatch {
                selection: zone
                    .visible_items(data, state)
                    .into_iter()
                    .filter(|id| !zone.is_disabled(data, id))
                    .collect(),
                anchor: state.anchor.clone(),
            }
        }
        SelectEvent::Clear => SelectionPatch {
            selection: OrdSet::new(),
            anchor: None,
        },
    };

    if config.disallow_empty && patch.selection.is_empty() {
        tracing::trace!(target: "zonekit.zone", zone = %zone.id, "empty selection refused");
        return None;
    }
    if patch.selection == state.selection && patch.anchor == state.anchor {
        return None;
    }
    Some(patch)
}

fn replace(item: &ItemId) -> SelectionPatch {
    SelectionPatch {
        selection: OrdSet::unit(item.clone()),
        anchor: Some(item.clone()),
    }
}

fn toggle(state: &FocusZoneState, item: &ItemId, mode: SelectMode) -> SelectionPatch {
    let selection = if state.is_selected(item) {
        state.selection.without(item)
    } else if mode == SelectMode::Single {
        OrdSet::unit(item.clone())
    } else {
        state.selection.update(item.clone())
    };
    SelectionPatch {
        selection,
        anchor: state.anchor.clone(),
    }
}

fn range<D, C>(
    data: &D,
    zone: &ZoneConfig<D, C>,
    state: &FocusZoneState,
    target: &ItemId,
) -> Option<SelectionPatch> {
    let items = zone.visible_items(data, state);
    let to = items.iter().position(|i| i == target)?;
    let anchor = state
        .anchor
        .as_ref()
        .or(state.focused.as_ref())
        .filter(|a| items.contains(a))
        .unwrap_or(target)
        .clone();
    let from = items.iter().position(|i| *i == anchor).unwrap_or(to);
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    Some(SelectionPatch {
        selection: items[lo..=hi]
            .iter()
            .filter(|id| !zone.is_disabled(data, id))
            .cloned()
            .collect(),
        anchor: Some(anchor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{Role, SelectConfig};

    type Zone = ZoneConfig<(), ()>;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    fn set(ids: &[&str]) -> OrdSet<ItemId> {
        ids.iter().map(|s| id(s)).collect()
    }

    fn multi() -> Zone {
        Zone::fixed("l", Role::Listbox, ["a", "b", "c", "d", "e"]).select(SelectConfig::multiple())
    }

    fn pick(state: &FocusZoneState, zone: &Zone, item: &str, op: SelectOp) -> FocusZoneState {
        let patch = apply_selection(&(), zone, state, &SelectEvent::Pick(id(item), op)).unwrap();
        patch.apply(state)
    }

    #[test]
    fn replace_sets_anchor() {
        let s = pick(&FocusZoneState::default(), &multi(), "b", SelectOp::Replace);
        assert_eq!(s.selection, set(&["b"]));
        assert_eq!(s.anchor, Some(id("b")));
    }

    #[test]
    fn range_extends_from_anchor_in_both_directions() {
        let z = multi();
        let s = pick(&FocusZoneState::default(), &z, "b", SelectOp::Replace);
        let s = pick(&s, &z, "d", SelectOp::Range);
        assert_eq!(s.selection, set(&["b", "c", "d"]));
        let s = pick(&s, &z, "a", SelectOp::Range);
        assert_eq!(s.selection, set(&["a", "b"]));
        assert_eq!(s.anchor, Some(id("b")));
    }

    #[test]
    fn range_skips_disabled() {
        let z = multi().disabled(|_, i| i == "c");
        let s = pick(&FocusZoneState::default(), &z, "a", SelectOp::Replace);
        let s = pick(&s, &z, "e", SelectOp::Range);
        assert_eq!(s.selection, set(&["a", "b", "d", "e"]));
    }

    #[test]
    fn range_without_anchor_uses_focus() {
        let z = multi();
        let s = FocusZoneState::default().with_focus(Some(id("c")));
        let s = pick(&s, &z, "e", SelectOp::Range);
        assert_eq!(s.selection, set(&["c", "d", "e"]));
        assert_eq!(s.anchor, Some(id("c")));
    }

    #[test]
    fn toggle_keeps_anchor() {
        let z = multi();
        let s = pick(&FocusZoneState::default(), &z, "a", SelectOp::Replace);
        let s = pick(&s, &z, "c", SelectOp::Toggle);
        assert_eq!(s.selection, set(&["a", "c"]));
        assert_eq!(s.anchor, Some(id("a")));
        let s = pick(&s, &z, "a", SelectOp::Toggle);
        assert_eq!(s.selection, set(&["c"]));
        assert_eq!(s.anchor, Some(id("a")));
    }

    #[test]
    fn single_mode_never_holds_two() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b"]).select(SelectConfig::single());
        let s = pick(&FocusZoneState::default(), &z, "a", SelectOp::Replace);
        let s = pick(&s, &z, "b", SelectOp::Toggle);
        assert_eq!(s.selection, set(&["b"]));
        let s = pick(&s, &z, "a", SelectOp::Range);
        assert_eq!(s.selection, set(&["a"]));
    }

    #[test]
    fn disallow_empty_refuses_last_deselect() {
        let z = Zone::fixed("r", Role::Radiogroup, ["a", "b"]);
        let s = pick(&FocusZoneState::default(), &z, "a", SelectOp::Replace);
        assert!(apply_selection(&(), &z, &s, &SelectEvent::Pick(id("a"), SelectOp::Toggle)).is_none());
        assert!(apply_selection(&(), &z, &s, &SelectEvent::Clear).is_none());
    }

    #[test]
    fn follow_focus_only_when_configured() {
        let follow = Zone::fixed("l", Role::Listbox, ["a", "b"]);
        let s = FocusZoneState::default();
        assert!(apply_selection(&(), &follow, &s, &SelectEvent::FollowFocus(id("a"))).is_some());
        assert!(apply_selection(&(), &multi(), &s, &SelectEvent::FollowFocus(id("a"))).is_none());
    }

    #[test]
    fn select_all_and_clear() {
        let z = multi().disabled(|_, i| i == "e");
        let s = FocusZoneState::default();
        let s = apply_selection(&(), &z, &s, &SelectEvent::All).unwrap().apply(&s);
        assert_eq!(s.selection, set(&["a", "b", "c", "d"]));
        let s = apply_selection(&(), &z, &s, &SelectEvent::Clear).unwrap().apply(&s);
        assert!(s.selection.is_empty());
        assert!(apply_selection(&(), &z, &s, &SelectEvent::Clear).is_none());
    }

    #[test]
    fn non_selectable_and_disabled_are_noops() {
        let tools = Zone::fixed("t", Role::Toolbar, ["a"]);
        let s = FocusZoneState::default();
        assert!(apply_selection(&(), &tools, &s, &SelectEvent::Pick(id("a"), SelectOp::Replace)).is_none());
        let z = multi().disabled(|_, i| i == "a");
        assert!(apply_selection(&(), &z, &s, &SelectEvent::Pick(id("a"), SelectOp::Replace)).is_none());
    }
}
