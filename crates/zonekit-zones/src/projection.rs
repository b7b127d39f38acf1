#![forbid(unsafe_code)]

//! ARIA and data-attribute projection.
//!
//! Renderers ask for the attributes of a container or an item and spread
//! them onto their elements. Projection is read-only: it never mutates the
//! focus state, and every attribute is derived from the zone config plus
//! the current [`GlobalFocusState`].
//!
//! Focus uses a roving tabindex: exactly one item per zone carries
//! `tabindex="0"` (the focused item, or the entry item when nothing is
//! focused); all others carry `"-1"`.

use std::collections::BTreeMap;

use crate::id::{ItemId, ZoneId};
use crate::role::Role;
use crate::state::{FocusZoneState, GlobalFocusState};
use crate::zone::ZoneConfig;

/// Attribute name to value.
pub type Attrs = BTreeMap<&'static str, String>;

/// Interaction flags of one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemState {
    /// Focus cursor of its zone.
    pub focused: bool,
    /// In its zone's selection.
    pub selected: bool,
    /// Skipped by navigation and not selectable.
    pub disabled: bool,
    /// Being edited in place.
    pub editing: bool,
    /// Fixed end of the range selection.
    pub anchor: bool,
    /// `None` for leaves.
    pub expanded: Option<bool>,
    /// One-based depth in a tree zone.
    pub level: Option<usize>,
    /// Focused item of the active zone.
    pub active: bool,
    /// Carries the zone's roving tabindex.
    pub tabbable: bool,
}

/// Attributes plus the flags they were derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProps {
    /// Accessibility and data attributes for the rendered element.
    pub attrs: Attrs,
    /// Flags the attributes were derived from.
    pub state: ItemState,
}

/// Element id of an item, unique across zones.
#[must_use]
pub fn dom_id(zone: &ZoneId, item: &ItemId) -> String {
    format!("{zone}--{item}")
}

/// Flags for one item.
pub fn item_state<D, C>(data: &D, zone: &ZoneConfig<D, C>, focus: &GlobalFocusState, item: &ItemId) -> ItemState {
    let state = focus.zone_or_default(&zone.id);
    let focused = state.is_focused(item);
    let expanded = zone
        .has_children(data, item)
        .then(|| state.is_expanded(item));
    ItemState {
        focused,
        selected: state.is_selected(item),
        disabled: zone.is_disabled(data, item),
        editing: state.is_editing(item),
        anchor: state.anchor.as_ref() == Some(item),
        expanded,
        level: zone.hierarchy_ref().map(|h| h.level(data, item)),
        active: focused && focus.is_active(&zone.id),
        tabbable: tab_stop(data, zone, &state).as_ref() == Some(item),
    }
}

/// Attributes for one item element.
pub fn compute_item<D, C>(data: &D, zone: &ZoneConfig<D, C>, focus: &GlobalFocusState, item: &ItemId) -> ItemProps {
    let flags = item_state(data, zone, focus, item);
    let mut attrs = Attrs::new();
    attrs.insert("id", dom_id(&zone.id, item));
    if let Some(role) = zone.role.item_role() {
        attrs.insert("role", role.to_string());
    }
    attrs.insert("tabindex", if flags.tabbable { "0" } else { "-1" }.to_string());

    if zone.select.is_selectable() {
        let name = if zone.role.uses_checked() { "aria-checked" } else { "aria-selected" };
        attrs.insert(name, flags.selected.to_string());
    }
    if let Some(expanded) = flags.expanded {
        attrs.insert("aria-expanded", expanded.to_string());
    }
    if let Some(level) = flags.level {
        attrs.insert("aria-level", level.to_string());
    }
    if flags.disabled {
        attrs.insert("aria-disabled", "true".to_string());
    }
    if flags.focused && zone.select.follow_focus && matches!(zone.role, Role::Toolbar | Role::Tablist) {
        attrs.insert("aria-current", "true".to_string());
    }

    for (name, on) in [
        ("data-focused", flags.focused),
        ("data-active", flags.active),
        ("data-selected", flags.selected),
        ("data-anchor", flags.anchor),
        ("data-editing", flags.editing),
    ] {
        if on {
            attrs.insert(name, "true".to_string());
        }
    }
    ItemProps { attrs, state: flags }
}

/// Attributes for the zone's container element.
pub fn compute_container_props<D, C>(zone: &ZoneConfig<D, C>, focus: &GlobalFocusState) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("id", zone.id.to_string());
    attrs.insert("role", zone.role.container_role().to_string());
    if let Some(orientation) = zone.orientation.aria() {
        attrs.insert("aria-orientation", orientation.to_string());
    }
    if zone.select.mode == crate::role::SelectMode::Multiple {
        attrs.insert("aria-multiselectable", "true".to_string());
    }
    if zone.role == Role::Dialog {
        attrs.insert("aria-modal", "true".to_string());
    }
    if let Some(focused) = focus.zone(&zone.id).and_then(|s| s.focused.as_ref()) {
        attrs.insert("aria-activedescendant", dom_id(&zone.id, focused));
    }
    if focus.is_active(&zone.id) {
        attrs.insert("data-active-zone", "true".to_string());
    }
    attrs
}

fn tab_stop<D, C>(data: &D, zone: &ZoneConfig<D, C>, state: &FocusZoneState) -> Option<ItemId> {
    state
        .focused
        .clone()
        .or_else(|| zone.entry_item(data, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::SelectConfig;

    type Zone = ZoneConfig<(), ()>;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    fn focus_on(zone: &str, item: &str) -> GlobalFocusState {
        let z = ZoneId::from(zone);
        let mut s = FocusZoneState::default().with_focus(Some(id(item)));
        s.selection.insert(id(item));
        GlobalFocusState::new().with_zone(z.clone(), s).with_active(Some(z))
    }

    #[test]
    fn roving_tabindex_without_focus_marks_entry() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b"]);
        let g = GlobalFocusState::new();
        assert_eq!(compute_item(&(), &z, &g, &id("a")).attrs["tabindex"], "0");
        assert_eq!(compute_item(&(), &z, &g, &id("b")).attrs["tabindex"], "-1");
    }

    #[test]
    fn focused_selected_item() {
        let z = Zone::fixed("l", Role::Listbox, ["a", "b"]).select(SelectConfig::multiple());
        let g = focus_on("l", "b");
        let props = compute_item(&(), &z, &g, &id("b"));
        assert_eq!(props.attrs["role"], "option");
        assert_eq!(props.attrs["tabindex"], "0");
        assert_eq!(props.attrs["aria-selected"], "true");
        assert_eq!(props.attrs["data-active"], "true");
        assert!(props.state.focused);

        let other = compute_item(&(), &z, &g, &id("a"));
        assert_eq!(other.attrs["aria-selected"], "false");
        assert!(!other.attrs.contains_key("data-focused"));
    }

    #[test]
    fn radiogroup_uses_checked() {
        let z = Zone::fixed("r", Role::Radiogroup, ["x", "y"]);
        let props = compute_item(&(), &z, &focus_on("r", "x"), &id("x"));
        assert_eq!(props.attrs["aria-checked"], "true");
        assert!(!props.attrs.contains_key("aria-selected"));
    }

    #[test]
    fn tablist_marks_current() {
        let z = Zone::fixed("tabs", Role::Tablist, ["one", "two"]);
        let props = compute_item(&(), &z, &focus_on("tabs", "one"), &id("one"));
        assert_eq!(props.attrs["aria-current"], "true");
    }

    #[test]
    fn disabled_and_unselectable() {
        let z = Zone::fixed("t", Role::Toolbar, ["a"]).disabled(|_, _| true);
        let props = compute_item(&(), &z, &GlobalFocusState::new(), &id("a"));
        assert_eq!(props.attrs["aria-disabled"], "true");
        assert!(!props.attrs.contains_key("aria-selected"));
        assert_eq!(props.attrs["role"], "button");
        assert_eq!(props.attrs["tabindex"], "-1");
    }

    #[test]
    fn container_props() {
        let z = Zone::fixed("l", Role::Listbox, ["a"]).select(SelectConfig::multiple());
        let attrs = compute_container_props(&z, &focus_on("l", "a"));
        assert_eq!(attrs["role"], "listbox");
        assert_eq!(attrs["aria-orientation"], "vertical");
        assert_eq!(attrs["aria-multiselectable"], "true");
        assert_eq!(attrs["aria-activedescendant"], "l--a");
        assert_eq!(attrs["data-active-zone"], "true");

        let d = Zone::fixed("d", Role::Dialog, ["ok"]);
        let attrs = compute_container_props(&d, &GlobalFocusState::new());
        assert_eq!(attrs["aria-modal"], "true");
        assert!(!attrs.contains_key("aria-orientation"));
    }
}
