#![forbid(unsafe_code)]

//! Directional navigation within a zone.
//!
//! [`navigate`] maps a [`Direction`] to a [`NavTarget`] given the zone's
//! configuration and current state. It never mutates anything; the zone
//! reducer turns the target into a new [`FocusZoneState`].
//!
//! # Algorithm
//!
//! 1. Resolve the visible item list. Empty lists never move.
//! 2. Trees consume Left/Right for expand, collapse, and parent/child moves.
//! 3. Home/End jump to the first/last enabled item.
//! 4. Arrow keys the orientation ignores do nothing. Vertical moves in a grid
//!    step by `columns`.
//! 5. With nothing focused, any move lands on the entry item.
//! 6. Otherwise step, skipping disabled items. Past either end, a looping
//!    zone wraps and a clamped zone stays put.
//!
//! # Invariants
//!
//! 1. The target is always a visible, enabled item.
//! 2. A clamped move at a boundary returns [`NavTarget::Stay`], so the
//!    reducer can report the dispatch as unchanged.

use crate::id::ItemId;
use crate::role::Orientation;
use crate::state::FocusZoneState;
use crate::zone::ZoneConfig;

/// Navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Previous column, or collapse/parent in a tree.
    Left,
    /// Next column, or expand/child in a tree.
    Right,
    /// First item.
    Home,
    /// Last item.
    End,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Nothing to do.
    Stay,
    /// Move focus.
    Focus(ItemId),
    /// Expand a tree node in place.
    Expand(ItemId),
    /// Collapse a tree node in place.
    Collapse(ItemId),
}

/// Compute where `direction` leads from the zone's focused item.
pub fn navigate<D, C>(
    data: &D,
    zone: &ZoneConfig<D, C>,
    state: &FocusZoneState,
    direction: Direction,
) -> NavTarget {
    let items = zone.visible_items(data, state);
    if items.is_empty() {
        return NavTarget::Stay;
    }
    let current = state
        .focused
        .as_ref()
        .and_then(|f| items.iter().position(|i| i == f));
    let enabled = |id: &ItemId| !zone.is_disabled(data, id);

    if zone.hierarchy_ref().is_some()
        && zone.orientation == Orientation::Vertical
        && matches!(direction, Direction::Left | Direction::Right)
    {
        return match current {
            Some(idx) => tree_horizontal(data, zone, state, &items[idx], direction),
            None => seed(data, zone, state),
        };
    }

    let target = match direction {
        Direction::Home => items.iter().position(|i| enabled(i)),
        Direction::End => items.iter().rposition(|i| enabled(i)),
        _ => {
            let Some(step) = step_for(zone, direction) else {
                return NavTarget::Stay;
            };
            let Some(idx) = current else {
                return seed(data, zone, state);
            };
            step_from(&items, idx, step, zone.looping, &enabled)
        }
    };

    match target {
        Some(idx) if Some(idx) != current => NavTarget::Focus(items[idx].clone()),
        _ => {
            tracing::trace!(target: "zonekit.zone", zone = %zone.id, ?direction, "navigation clamped");
            NavTarget::Stay
        }
    }
}

/// Next item whose label starts with `query`, searching after the focused
/// item and wrapping. Matching is case-insensitive and skips disabled and
/// unlabeled items.
pub fn typeahead<D, C>(
    data: &D,
    zone: &ZoneConfig<D, C>,
    state: &FocusZoneState,
    query: &str,
) -> Option<ItemId> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return None;
    }
    let items = zone.visible_items(data, state);
    let start = state
        .focused
        .as_ref()
        .and_then(|f| items.iter().position(|i| i == f))
        .map_or(0, |idx| idx + 1);
    (0..items.len())
        .map(|offset| &items[(start + offset) % items.len()])
        .find(|id| {
            !zone.is_disabled(data, id)
                && zone
                    .label_of(data, id)
                    .is_some_and(|label| label.to_lowercase().starts_with(&query))
        })
        .cloned()
}

fn seed<D, C>(data: &D, zone: &ZoneConfig<D, C>, state: &FocusZoneState) -> NavTarget {
    zone.entry_item(data, state)
        .map_or(NavTarget::Stay, NavTarget::Focus)
}

fn step_for<D, C>(zone: &ZoneConfig<D, C>, direction: Direction) -> Option<isize> {
    let vertical = match zone.orientation {
        Orientation::Both => zone.columns.unwrap_or(1).max(1) as isize,
        _ => 1,
    };
    let allows_vertical = zone.orientation != Orientation::Horizontal;
    let allows_horizontal = zone.orientation != Orientation::Vertical;
    match direction {
        Direction::Up if allows_vertical => Some(-vertical),
        Direction::Down if allows_vertical => Some(vertical),
        Direction::Left if allows_horizontal => Some(-1),
        Direction::Right if allows_horizontal => Some(1),
        _ => None,
    }
}

fn step_from(
    items: &[ItemId],
    idx: usize,
    step: isize,
    looping: bool,
    enabled: &dyn Fn(&ItemId) -> bool,
) -> Option<usize> {
    let len = items.len() as isize;
    let mut pos = idx as isize;
    for _ in 0..items.len() {
        let mut next = pos + step;
        if !(0..len).contains(&next) {
            if !looping {
                return None;
            }
            next = next.rem_euclid(len);
        }
        if next as usize == idx {
            return None;
        }
        if enabled(&items[next as usize]) {
            return Some(next as usize);
        }
        pos = next;
    }
    None
}

fn tree_horizontal<D, C>(
    data: &D,
    zone: &ZoneConfig<D, C>,
    state: &FocusZoneState,
    item: &ItemId,
    direction: Direction,
) -> NavTarget {
    let Some(tree) = zone.hierarchy_ref() else {
        return NavTarget::Stay;
    };
    let has_children = tree.has_children(data, item);
    let expanded = state.is_expanded(item);
    match direction {
        Direction::Right if has_children && !expanded => NavTarget::Expand(item.clone()),
        Direction::Right if has_children => tree
            .children(data, item)
            .into_iter()
            .find(|c| !zone.is_disabled(data, c))
            .map_or(NavTarget::Stay, NavTarget::Focus),
        Direction::Left if has_children && expanded => NavTarget::Collapse(item.clone()),
        Direction::Left => tree
            .parent(data, item)
            .filter(|p| !zone.is_disabled(data, p))
            .map_or(NavTarget::Stay, NavTarget::Focus),
        _ => NavTarget::Stay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::zone::Hierarchy;

    type Zone = ZoneConfig<(), ()>;

    fn focused(id: &str) -> FocusZoneState {
        FocusZoneState::default().with_focus(Some(ItemId::from(id)))
    }

    fn focus(id: &str) -> NavTarget {
        NavTarget::Focus(ItemId::from(id))
    }

    #[test]
    fn typeahead_skips_unlabeled_items() {
        let z = Zone::fixed("l", Role::Listbox, ["apple"]);
        assert_eq!(typeahead(&(), &z, &FocusZoneState::default(), "a"), None);
    }

    #[test]
    fn clamp_at_end_is_stay() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b", "c"]);
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::Down), NavTarget::Stay);
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Up), NavTarget::Stay);
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Down), focus("b"));
    }

    #[test]
    fn loop_wraps_both_ways() {
        let z = Zone::fixed("t", Role::Toolbar, ["a", "b", "c"]);
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::Right), focus("a"));
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Left), focus("c"));
    }

    #[test]
    fn orientation_ignores_cross_axis() {
        let z = Zone::fixed("t", Role::Toolbar, ["a", "b"]);
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Down), NavTarget::Stay);
        let l = Zone::fixed("l", Role::Listbox, ["a", "b"]);
        assert_eq!(navigate(&(), &l, &focused("a"), Direction::Right), NavTarget::Stay);
    }

    #[test]
    fn disabled_items_are_skipped() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b", "c"]).disabled(|_, id| id == "b");
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Down), focus("c"));
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::Up), focus("a"));
    }

    #[test]
    fn all_other_items_disabled_stays() {
        let z = Zone::fixed("t", Role::Toolbar, ["a", "b", "c"]).disabled(|_, id| id != "a");
        assert_eq!(navigate(&(), &z, &focused("a"), Direction::Right), NavTarget::Stay);
    }

    #[test]
    fn home_end_skip_disabled() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b", "c", "d"]).disabled(|_, id| id == "a" || id == "d");
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::Home), focus("b"));
        assert_eq!(navigate(&(), &z, &focused("b"), Direction::End), focus("c"));
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::End), NavTarget::Stay);
    }

    #[test]
    fn unfocused_zone_seeds_entry() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b"]);
        assert_eq!(navigate(&(), &z, &FocusZoneState::default(), Direction::Down), focus("a"));
    }

    #[test]
    fn empty_zone_never_moves() {
        let z = Zone::new("l", Role::Listbox, |_, _| Vec::new());
        assert_eq!(navigate(&(), &z, &FocusZoneState::default(), Direction::Down), NavTarget::Stay);
    }

    #[test]
    fn grid_steps_by_columns() {
        let z = Zone::fixed("g", Role::Grid, ["a", "b", "c", "d", "e", "f"]).columns(3);
        assert_eq!(navigate(&(), &z, &focused("b"), Direction::Down), focus("e"));
        assert_eq!(navigate(&(), &z, &focused("e"), Direction::Up), focus("b"));
        assert_eq!(navigate(&(), &z, &focused("e"), Direction::Down), NavTarget::Stay);
        assert_eq!(navigate(&(), &z, &focused("c"), Direction::Right), focus("d"));
    }

    struct Pairs;

    // a -> [a1, a2], b leaf
    impl Hierarchy<()> for Pairs {
        fn parent(&self, _: &(), item: &ItemId) -> Option<ItemId> {
            (item != "a" && item.as_str().starts_with('a')).then(|| ItemId::from("a"))
        }

        fn children(&self, _: &(), item: &ItemId) -> Vec<ItemId> {
            if item == "a" {
                vec![ItemId::from("a1"), ItemId::from("a2")]
            } else {
                Vec::new()
            }
        }
    }

    fn tree() -> Zone {
        Zone::new("tree", Role::Tree, |_, state| {
            let mut items = vec![ItemId::from("a")];
            if state.is_expanded(&ItemId::from("a")) {
                items.push(ItemId::from("a1"));
                items.push(ItemId::from("a2"));
            }
            items.push(ItemId::from("b"));
            items
        })
        .hierarchy(Pairs)
    }

    #[test]
    fn tree_right_expands_then_enters() {
        let z = tree();
        let s = focused("a");
        assert_eq!(navigate(&(), &z, &s, Direction::Right), NavTarget::Expand(ItemId::from("a")));
        let mut s = s;
        s.expanded.insert(ItemId::from("a"));
        assert_eq!(navigate(&(), &z, &s, Direction::Right), focus("a1"));
        assert_eq!(navigate(&(), &z, &s, Direction::Down), focus("a1"));
    }

    #[test]
    fn tree_left_collapses_then_climbs() {
        let z = tree();
        let mut s = focused("a2");
        s.expanded.insert(ItemId::from("a"));
        assert_eq!(navigate(&(), &z, &s, Direction::Left), focus("a"));
        let s = s.with_focus(Some(ItemId::from("a")));
        assert_eq!(navigate(&(), &z, &s, Direction::Left), NavTarget::Collapse(ItemId::from("a")));
        assert_eq!(navigate(&(), &z, &focused("b"), Direction::Left), NavTarget::Stay);
    }

    #[test]
    fn typeahead_searches_after_focus_and_wraps() {
        let z = Zone::fixed("l", Role::Listbox, ["apple", "banana", "avocado", "cherry"])
            .label(|_, id| Some(id.to_string()));
        assert_eq!(typeahead(&(), &z, &focused("apple"), "a"), Some(ItemId::from("avocado")));
        assert_eq!(typeahead(&(), &z, &focused("avocado"), "A"), Some(ItemId::from("apple")));
        assert_eq!(typeahead(&(), &z, &focused("apple"), "z"), None);
        assert_eq!(typeahead(&(), &z, &FocusZoneState::default(), "c"), Some(ItemId::from("cherry")));
    }
}
