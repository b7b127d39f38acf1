#![forbid(unsafe_code)]

//! Zone commands and their reducer.
//!
//! A [`ZoneCommand`] names a zone (or the active zone) and a [`ZoneAction`].
//! [`reduce_zone`] folds it into the [`GlobalFocusState`] and returns the
//! next state plus any commands produced by zone hooks (`on_activate`,
//! `on_dismiss`). Zone commands never touch application data, so they never
//! create undo entries.

use zonekit_runtime::Rejection;

use crate::id::{ItemId, ZoneId};
use crate::navigate::{Direction, NavTarget, navigate, typeahead};
use crate::role::SelectMode;
use crate::selection::{SelectEvent, SelectOp, SelectionPatch, apply_selection};
use crate::state::{FocusZoneState, GlobalFocusState};
use crate::zone::{ZoneConfig, ZoneRegistry};

/// What to do inside a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneAction {
    /// Focus an item.
    Focus(ItemId),
    /// Move focus; `extend` grows a range selection.
    Navigate {
        /// Direction to move.
        direction: Direction,
        /// Shift-extension.
        extend: bool,
    },
    /// Focus and pick an item (the focused item when `None`).
    Select {
        /// Target item.
        item: Option<ItemId>,
        /// How the pick affects the selection.
        op: SelectOp,
    },
    /// Replace the selection with the given items.
    SetSelection(Vec<ItemId>),
    /// Select every enabled item.
    SelectAll,
    /// Deselect everything.
    ClearSelection,
    /// Activate an item (the focused item when `None`).
    Activate(Option<ItemId>),
    /// Expand a tree node.
    Expand(Option<ItemId>),
    /// Collapse a tree node.
    Collapse(Option<ItemId>),
    /// Flip a tree node.
    ToggleExpand(Option<ItemId>),
    /// Enter inline edit.
    StartEdit(Option<ItemId>),
    /// Leave inline edit, keeping the value.
    CommitEdit,
    /// Leave inline edit, discarding the value.
    CancelEdit,
    /// Cancel edit, dismiss, or clear selection, whichever applies first.
    Escape,
    /// Jump to the next item whose label starts with the text.
    Typeahead(String),
    /// Make the zone active, seeding focus if needed.
    ActivateZone,
    /// Drop references to items that no longer exist.
    Reconcile,
}

impl ZoneAction {
    /// Stable command kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Focus(_) => "zone.focus",
            Self::Navigate { .. } => "zone.navigate",
            Self::Select { .. } => "zone.select",
            Self::SetSelection(_) => "zone.set_selection",
            Self::SelectAll => "zone.select_all",
            Self::ClearSelection => "zone.clear_selection",
            Self::Activate(_) => "zone.activate",
            Self::Expand(_) => "zone.expand",
            Self::Collapse(_) => "zone.collapse",
            Self::ToggleExpand(_) => "zone.toggle_expand",
            Self::StartEdit(_) => "zone.start_edit",
            Self::CommitEdit => "zone.commit_edit",
            Self::CancelEdit => "zone.cancel_edit",
            Self::Escape => "zone.escape",
            Self::Typeahead(_) => "zone.typeahead",
            Self::ActivateZone => "zone.activate_zone",
            Self::Reconcile => "zone.reconcile",
        }
    }
}

/// A zone action aimed at a zone, or at the active zone when `zone` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCommand {
    /// Target zone.
    pub zone: Option<ZoneId>,
    /// Action.
    pub action: ZoneAction,
}

impl ZoneCommand {
    /// Act on the active zone.
    #[must_use]
    pub fn active(action: ZoneAction) -> Self {
        Self { zone: None, action }
    }

    /// Act on a specific zone.
    #[must_use]
    pub fn in_zone(zone: impl Into<ZoneId>, action: ZoneAction) -> Self {
        Self {
            zone: Some(zone.into()),
            action,
        }
    }

    /// Move focus in the active zone.
    #[must_use]
    pub fn navigate(direction: Direction) -> Self {
        Self::active(ZoneAction::Navigate {
            direction,
            extend: false,
        })
    }

    /// Move focus in the active zone, growing the range selection.
    #[must_use]
    pub fn extend(direction: Direction) -> Self {
        Self::active(ZoneAction::Navigate {
            direction,
            extend: true,
        })
    }

    /// Stable command kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.action.kind()
    }
}

/// Reducer options taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOptions {
    /// Escape clears a multi-selection when nothing else applies.
    pub escape_clears_selection: bool,
}

impl Default for ZoneOptions {
    fn default() -> Self {
        Self {
            escape_clears_selection: true,
        }
    }
}

/// Result of [`reduce_zone`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOutcome<C> {
    /// Next focus state, `None` when unchanged.
    pub focus: Option<GlobalFocusState>,
    /// Commands produced by zone hooks, to dispatch as follow-ups.
    pub dispatch: Vec<C>,
}

impl<C> ZoneOutcome<C> {
    /// Nothing changed.
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            focus: None,
            dispatch: Vec::new(),
        }
    }

    fn with(focus: Option<GlobalFocusState>) -> Self {
        Self {
            focus,
            dispatch: Vec::new(),
        }
    }

    fn then(mut self, command: Option<C>) -> Self {
        self.dispatch.extend(command);
        self
    }
}

/// Rejection for a command aimed at an unregistered zone.
///
/// Referencing an unknown zone is a host bug: it is logged at error level
/// and panics in debug builds.
pub fn unknown_zone(zone: &ZoneId) -> Rejection {
    tracing::error!(target: "zonekit.zone", %zone, "command references an unregistered zone");
    if cfg!(debug_assertions) {
        panic!("unknown zone {zone:?}");
    }
    Rejection::UnknownZone(zone.to_string())
}

/// Fold a zone command into the focus state.
pub fn reduce_zone<D, C>(
    data: &D,
    focus: &GlobalFocusState,
    zones: &ZoneRegistry<D, C>,
    command: &ZoneCommand,
    options: ZoneOptions,
) -> Result<ZoneOutcome<C>, Rejection> {
    if command.action == ZoneAction::Reconcile && command.zone.is_none() {
        return Ok(reconcile_all(data, focus, zones));
    }

    let zone_id = match command.zone.as_ref().or(focus.active_zone.as_ref()) {
        Some(id) => id.clone(),
        None => {
            tracing::trace!(target: "zonekit.zone", action = command.kind(), "no active zone");
            return Ok(ZoneOutcome::unchanged());
        }
    };
    let Some(zone) = zones.get(&zone_id) else {
        return Err(unknown_zone(&zone_id));
    };

    let reducer = ZoneReducer {
        data,
        focus,
        zone,
        state: focus.zone_or_default(&zone_id),
    };
    let outcome = reducer.reduce(&command.action, options);
    if outcome.focus.is_some() {
        tracing::debug!(target: "zonekit.zone", zone = %zone_id, action = command.kind(), "zone state updated");
    }
    Ok(outcome)
}

fn reconcile_all<D, C>(
    data: &D,
    focus: &GlobalFocusState,
    zones: &ZoneRegistry<D, C>,
) -> ZoneOutcome<C> {
    let mut next = focus.clone();
    for (id, state) in focus.zones() {
        if let Some(zone) = zones.get(id) {
            next = next.with_zone(id.clone(), prune(data, zone, state));
        }
    }
    ZoneOutcome::with((next != *focus).then_some(next))
}

fn prune<D, C>(data: &D, zone: &ZoneConfig<D, C>, state: &FocusZoneState) -> FocusZoneState {
    state.pruned(|id| zone.contains(data, state, id))
}

struct ZoneReducer<'a, D, C> {
    data: &'a D,
    focus: &'a GlobalFocusState,
    zone: &'a ZoneConfig<D, C>,
    state: FocusZoneState,
}

impl<D, C> ZoneReducer<'_, D, C> {
    fn reduce(&self, action: &ZoneAction, options: ZoneOptions) -> ZoneOutcome<C> {
        let state = &self.state;
        match action {
            ZoneAction::Focus(item) => match self.focusable(Some(item)) {
                Some(item) => self.commit(state.with_focus(Some(item))),
                None => ZoneOutcome::unchanged(),
            },
            ZoneAction::Navigate { direction, extend } => self.navigate(*direction, *extend),
            ZoneAction::Select { item, op } => {
                let Some(item) = self.focusable(item.as_ref().or(state.focused.as_ref())) else {
                    return ZoneOutcome::unchanged();
                };
                let patch = apply_selection(self.data, self.zone, state, &SelectEvent::Pick(item.clone(), *op));
                self.commit(self.patched(state.with_focus(Some(item)), patch))
            }
            ZoneAction::SetSelection(items) => self.set_selection(items),
            ZoneAction::SelectAll => self.select(&SelectEvent::All),
            ZoneAction::ClearSelection => self.select(&SelectEvent::Clear),
            ZoneAction::Activate(item) => {
                let Some(item) = self.focusable(item.as_ref().or(state.focused.as_ref())) else {
                    return ZoneOutcome::unchanged();
                };
                match self.zone.activate(self.data, &item) {
                    Some(cmd) => ZoneOutcome::unchanged().then(Some(cmd)),
                    None if self.zone.has_children(self.data, &item) => self.set_expanded(&item, None),
                    None => ZoneOutcome::unchanged(),
                }
            }
            ZoneAction::Expand(item) => self.with_target(item, |t| self.set_expanded(t, Some(true))),
            ZoneAction::Collapse(item) => self.with_target(item, |t| self.set_expanded(t, Some(false))),
            ZoneAction::ToggleExpand(item) => self.with_target(item, |t| self.set_expanded(t, None)),
            ZoneAction::StartEdit(item) => {
                let Some(item) = self.focusable(item.as_ref().or(state.focused.as_ref())) else {
                    return ZoneOutcome::unchanged();
                };
                let mut next = state.with_focus(Some(item.clone()));
                next.editing = Some(item);
                self.commit(next)
            }
            ZoneAction::CommitEdit | ZoneAction::CancelEdit => self.end_edit(),
            ZoneAction::Escape => self.escape(options),
            ZoneAction::Typeahead(query) => match typeahead(self.data, self.zone, state, query) {
                Some(item) => self.move_focus(item, false),
                None => ZoneOutcome::unchanged(),
            },
            ZoneAction::ActivateZone => self.activate_zone(),
            ZoneAction::Reconcile => {
                let next = prune(self.data, self.zone, state);
                ZoneOutcome::with(self.install(next, false))
            }
        }
    }

    // ====================================================================
    // Actions
    // ====================================================================

    fn navigate(&self, direction: Direction, extend: bool) -> ZoneOutcome<C> {
        match navigate(self.data, self.zone, &self.state, direction) {
            NavTarget::Stay => ZoneOutcome::unchanged(),
            NavTarget::Focus(item) => self.move_focus(item, extend),
            NavTarget::Expand(item) => self.set_expanded(&item, Some(true)),
            NavTarget::Collapse(item) => self.set_expanded(&item, Some(false)),
        }
    }

    fn move_focus(&self, item: ItemId, extend: bool) -> ZoneOutcome<C> {
        let event = if extend && self.zone.select.allows_range() {
            SelectEvent::Pick(item.clone(), SelectOp::Range)
        } else {
            SelectEvent::FollowFocus(item.clone())
        };
        let patch = apply_selection(self.data, self.zone, &self.state, &event);
        self.commit(self.patched(self.state.with_focus(Some(item)), patch))
    }

    fn select(&self, event: &SelectEvent) -> ZoneOutcome<C> {
        let patch = apply_selection(self.data, self.zone, &self.state, event);
        self.commit(self.patched(self.state.clone(), patch))
    }

    fn set_selection(&self, items: &[ItemId]) -> ZoneOutcome<C> {
        let select = self.zone.select;
        let mut picked: Vec<ItemId> = items
            .iter()
            .filter(|id| {
                self.zone.contains(self.data, &self.state, id) && !self.zone.is_disabled(self.data, id)
            })
            .cloned()
            .collect();
        if select.mode == SelectMode::Single {
            picked = picked.pop().into_iter().collect();
        }
        if !select.is_selectable() || (select.disallow_empty && picked.is_empty()) {
            return ZoneOutcome::unchanged();
        }
        let patch = SelectionPatch {
            anchor: picked.first().cloned(),
            selection: picked.into_iter().collect(),
        };
        self.commit(patch.apply(&self.state))
    }

    fn set_expanded(&self, item: &ItemId, expand: Option<bool>) -> ZoneOutcome<C> {
        if !self.zone.has_children(self.data, item) {
            return ZoneOutcome::unchanged();
        }
        let expand = expand.unwrap_or(!self.state.is_expanded(item));
        let mut next = self.state.clone();
        if expand {
            next.expanded.insert(item.clone());
        } else {
            next.expanded.remove(item);
            // Focus hidden inside the collapsed subtree moves to the node.
            let visible = self.zone.visible_items(self.data, &next);
            if next.focused.as_ref().is_some_and(|f| !visible.contains(f)) {
                next = next.with_focus(Some(item.clone()));
            }
        }
        self.commit(next)
    }

    fn end_edit(&self) -> ZoneOutcome<C> {
        if self.state.editing.is_none() {
            return ZoneOutcome::unchanged();
        }
        let mut next = self.state.clone();
        next.editing = None;
        self.commit(next)
    }

    fn escape(&self, options: ZoneOptions) -> ZoneOutcome<C> {
        if self.state.editing.is_some() {
            return self.end_edit();
        }
        if self.zone.dismissable {
            tracing::debug!(target: "zonekit.zone", zone = %self.zone.id, parent = ?self.zone.parent, "zone dismissed");
            let next = self.focus.with_active(self.zone.parent.clone());
            return ZoneOutcome::with((next != *self.focus).then_some(next))
                .then(self.zone.dismiss(self.data));
        }
        if options.escape_clears_selection && self.zone.select.mode == SelectMode::Multiple {
            return self.select(&SelectEvent::Clear);
        }
        ZoneOutcome::unchanged()
    }

    fn activate_zone(&self) -> ZoneOutcome<C> {
        let mut next = self.state.clone();
        if self.focusable(next.focused.as_ref()).is_none() {
            let visible = self.zone.visible_items(self.data, &next);
            let seed = next
                .selection
                .iter()
                .find(|id| visible.contains(id) && !self.zone.is_disabled(self.data, id))
                .cloned()
                .or_else(|| self.zone.entry_item(self.data, &next));
            next = next.with_focus(seed);
        }
        ZoneOutcome::with(self.install(next, true))
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    /// `item` if it belongs to the zone and is enabled.
    fn focusable(&self, item: Option<&ItemId>) -> Option<ItemId> {
        item.filter(|id| {
            self.zone.contains(self.data, &self.state, id) && !self.zone.is_disabled(self.data, id)
        })
        .cloned()
    }

    fn with_target(&self, item: &Option<ItemId>, f: impl FnOnce(&ItemId) -> ZoneOutcome<C>) -> ZoneOutcome<C> {
        match item.as_ref().or(self.state.focused.as_ref()) {
            Some(target) => f(target),
            None => ZoneOutcome::unchanged(),
        }
    }

    fn patched(&self, next: FocusZoneState, patch: Option<SelectionPatch>) -> FocusZoneState {
        match patch {
            Some(patch) => patch.apply(&next),
            None => next,
        }
    }

    fn commit(&self, next: FocusZoneState) -> ZoneOutcome<C> {
        ZoneOutcome::with(self.install(next, true))
    }

    fn install(&self, next: FocusZoneState, activate: bool) -> Option<GlobalFocusState> {
        let mut global = self.focus.with_zone(self.zone.id.clone(), next);
        if activate {
            global = global.with_active(Some(self.zone.id.clone()));
        }
        (global != *self.focus).then_some(global)
    }
}
