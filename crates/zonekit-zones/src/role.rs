#![forbid(unsafe_code)]

//! Zone roles and their behavioral presets.
//!
//! A [`Role`] names the ARIA pattern a zone implements. Each role carries a
//! [`RolePreset`] (orientation, looping, entry point, selection defaults)
//! that [`ZoneConfig::new`](crate::ZoneConfig::new) starts from; the builder
//! can then override any field.

use serde::{Deserialize, Serialize};

/// ARIA composite pattern implemented by a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Vertical list of options.
    Listbox,
    /// Two-dimensional cells laid out in rows of `columns`.
    Grid,
    /// Horizontal row of controls.
    Toolbar,
    /// Hierarchical list with expandable parents.
    Tree,
    /// Modal surface whose items are its focusable controls.
    Dialog,
    /// Vertical menu of commands.
    Menu,
    /// Exclusive choice.
    Radiogroup,
    /// Horizontal tab strip.
    Tablist,
}

impl Role {
    /// ARIA role of the container element.
    #[must_use]
    pub const fn container_role(self) -> &'static str {
        match self {
            Self::Listbox => "listbox",
            Self::Grid => "grid",
            Self::Toolbar => "toolbar",
            Self::Tree => "tree",
            Self::Dialog => "dialog",
            Self::Menu => "menu",
            Self::Radiogroup => "radiogroup",
            Self::Tablist => "tablist",
        }
    }

    /// ARIA role of each item element, if the pattern prescribes one.
    #[must_use]
    pub const fn item_role(self) -> Option<&'static str> {
        match self {
            Self::Listbox => Some("option"),
            Self::Grid => Some("gridcell"),
            Self::Toolbar => Some("button"),
            Self::Dialog => None,
            Self::Tree => Some("treeitem"),
            Self::Menu => Some("menuitem"),
            Self::Radiogroup => Some("radio"),
            Self::Tablist => Some("tab"),
        }
    }

    /// Selection is announced with `aria-checked` instead of `aria-selected`.
    #[must_use]
    pub const fn uses_checked(self) -> bool {
        matches!(self, Self::Radiogroup)
    }

    /// Behavioral defaults for this role.
    #[must_use]
    pub const fn preset(self) -> RolePreset {
        let none = SelectConfig::none();
        match self {
            Self::Listbox => RolePreset {
                orientation: Orientation::Vertical,
                looping: false,
                entry: Entry::First,
                select: SelectConfig::single().follow_focus(true),
                dismissable: false,
            },
            Self::Grid => RolePreset {
                orientation: Orientation::Both,
                looping: false,
                entry: Entry::First,
                select: SelectConfig::multiple(),
                dismissable: false,
            },
            Self::Toolbar => RolePreset {
                orientation: Orientation::Horizontal,
                looping: true,
                entry: Entry::First,
                select: none,
                dismissable: false,
            },
            Self::Tree => RolePreset {
                orientation: Orientation::Vertical,
                looping: false,
                entry: Entry::First,
                select: SelectConfig::single().follow_focus(true),
                dismissable: false,
            },
            Self::Dialog => RolePreset {
                orientation: Orientation::Both,
                looping: true,
                entry: Entry::First,
                select: none,
                dismissable: true,
            },
            Self::Menu => RolePreset {
                orientation: Orientation::Vertical,
                looping: true,
                entry: Entry::First,
                select: none,
                dismissable: true,
            },
            Self::Radiogroup => RolePreset {
                orientation: Orientation::Both,
                looping: true,
                entry: Entry::First,
                select: SelectConfig::single().follow_focus(true).disallow_empty(true),
                dismissable: false,
            },
            Self::Tablist => RolePreset {
                orientation: Orientation::Horizontal,
                looping: true,
                entry: Entry::First,
                select: SelectConfig::single().follow_focus(true).disallow_empty(true),
                dismissable: false,
            },
        }
    }
}

/// Which arrow keys move focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Up/Down.
    #[default]
    Vertical,
    /// Left/Right.
    Horizontal,
    /// All four.
    Both,
}

impl Orientation {
    /// Value for `aria-orientation`, omitted for two-dimensional zones.
    #[must_use]
    pub const fn aria(self) -> Option<&'static str> {
        match self {
            Self::Vertical => Some("vertical"),
            Self::Horizontal => Some("horizontal"),
            Self::Both => None,
        }
    }
}

/// Item that receives focus when a zone is entered with nothing focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entry {
    /// First enabled item.
    #[default]
    First,
    /// Last enabled item.
    Last,
}

/// Selection cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    /// Items are not selectable.
    #[default]
    None,
    /// At most one selected item.
    Single,
    /// Any subset.
    Multiple,
}

/// Selection behavior of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectConfig {
    /// Cardinality.
    pub mode: SelectMode,
    /// Moving focus replaces the selection with the focused item.
    pub follow_focus: bool,
    /// Shift-extension selects the anchor..target span.
    pub range: bool,
    /// Ctrl/Cmd toggles membership.
    pub toggle: bool,
    /// Refuse any operation that would leave the selection empty.
    pub disallow_empty: bool,
}

impl SelectConfig {
    /// Not selectable.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            mode: SelectMode::None,
            follow_focus: false,
            range: false,
            toggle: false,
            disallow_empty: false,
        }
    }

    /// Single selection.
    #[must_use]
    pub const fn single() -> Self {
        Self {
            mode: SelectMode::Single,
            toggle: true,
            ..Self::none()
        }
    }

    /// Multiple selection with range and toggle enabled.
    #[must_use]
    pub const fn multiple() -> Self {
        Self {
            mode: SelectMode::Multiple,
            range: true,
            toggle: true,
            ..Self::none()
        }
    }

    /// Set follow-focus.
    #[must_use]
    pub const fn follow_focus(mut self, on: bool) -> Self {
        self.follow_focus = on;
        self
    }

    /// Set range extension.
    #[must_use]
    pub const fn range(mut self, on: bool) -> Self {
        self.range = on;
        self
    }

    /// Set toggling.
    #[must_use]
    pub const fn toggle(mut self, on: bool) -> Self {
        self.toggle = on;
        self
    }

    /// Set the non-empty constraint.
    #[must_use]
    pub const fn disallow_empty(mut self, on: bool) -> Self {
        self.disallow_empty = on;
        self
    }

    /// Whether anything is selectable.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        !matches!(self.mode, SelectMode::None)
    }

    /// Whether range extension applies.
    #[must_use]
    pub const fn allows_range(&self) -> bool {
        self.range && matches!(self.mode, SelectMode::Multiple)
    }
}

/// Behavioral defaults attached to a [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePreset {
    /// Arrow keys that move focus.
    pub orientation: Orientation,
    /// Moving past either end wraps around.
    pub looping: bool,
    /// Where focus lands on entry.
    pub entry: Entry,
    /// Selection defaults.
    pub select: SelectConfig,
    /// Escape dismisses the zone back to its parent.
    pub dismissable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_loops_horizontally_without_selection() {
        let p = Role::Toolbar.preset();
        assert_eq!(p.orientation, Orientation::Horizontal);
        assert!(p.looping);
        assert!(!p.select.is_selectable());
    }

    #[test]
    fn radiogroup_keeps_a_choice() {
        let p = Role::Radiogroup.preset();
        assert!(p.select.disallow_empty);
        assert!(p.select.follow_focus);
        assert!(Role::Radiogroup.uses_checked());
    }

    #[test]
    fn grid_allows_ranges() {
        assert!(Role::Grid.preset().select.allows_range());
        assert!(!Role::Listbox.preset().select.allows_range());
    }

    #[test]
    fn aria_roles() {
        assert_eq!(Role::Tree.container_role(), "tree");
        assert_eq!(Role::Tree.item_role(), Some("treeitem"));
        assert_eq!(Role::Dialog.item_role(), None);
        assert_eq!(Orientation::Both.aria(), None);
    }
}
