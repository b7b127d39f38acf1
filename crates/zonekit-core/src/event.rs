#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! These are host-independent descriptions of what the user physically did:
//! a key went down, an item was clicked, or the host fired a native
//! clipboard/select-all action. All events derive `Clone`, `PartialEq`, and
//! `Eq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; only presses are ever routed.
//! - `Modifiers` use bitflags for easy combination.
//! - The space bar is `KeyCode::Char(' ')`; its canonical name is `Space`.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer interaction resolved to a zone item by the host.
    Pointer(PointerEvent),

    /// A native host action (clipboard or select-all).
    Native(NativeAction),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Meta/Cmd modifier is held.
    #[must_use]
    pub const fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// True when Ctrl or Meta is held (the "command" modifiers).
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.modifiers.intersects(Modifiers::CTRL.union(Modifiers::META))
    }

    /// The character this key would type, if any.
    ///
    /// Keys held with Ctrl, Alt, or Meta never produce text.
    #[must_use]
    pub fn text_char(&self) -> Option<char> {
        if self
            .modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META)
        {
            return None;
        }
        match self.code {
            KeyCode::Char(c) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key (space bar is `Char(' ')`).
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Function key (F1-F24).
    F(u8),
}

impl KeyCode {
    /// Whether this is one of the four arrow keys.
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }

    /// Whether this is a vertical arrow key.
    #[must_use]
    pub const fn is_vertical_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Whether this is a horizontal arrow key.
    #[must_use]
    pub const fn is_horizontal_arrow(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command/Super key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer interaction on a zone item.
///
/// Hit testing is the host's job; by the time an event reaches the kernel it
/// already names the zone and item under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    /// The kind of interaction.
    pub kind: PointerKind,

    /// Zone identifier of the hit item.
    pub zone: String,

    /// Item identifier that was hit.
    pub item: String,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a plain click on an item.
    #[must_use]
    pub fn click(zone: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::Click,
            zone: zone.into(),
            item: item.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a double click on an item.
    #[must_use]
    pub fn double_click(zone: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            kind: PointerKind::DoubleClick,
            ..Self::click(zone, item)
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Pointer interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Single primary click.
    Click,

    /// Double primary click.
    DoubleClick,
}

/// Native host actions that bypass key classification.
///
/// Hosts translate their clipboard events (and the select-all command) into
/// these so the kernel can decide between native handling inside fields and
/// collection commands everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAction {
    /// Copy the current selection.
    Copy,

    /// Cut the current selection.
    Cut,

    /// Paste from the clipboard.
    Paste,

    /// Select everything.
    SelectAll,
}
