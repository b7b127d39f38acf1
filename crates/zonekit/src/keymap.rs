#![forbid(unsafe_code)]

//! The default OS-style keymap.
//!
//! | Key | Context | Command |
//! |-----|---------|---------|
//! | Arrows, Home, End | navigating | `zone.navigate` |
//! | Shift + Arrows, Home, End | navigating | `zone.navigate` (extend) |
//! | Space | navigating | `zone.select` (toggle) |
//! | Enter | navigating | `zone.activate` |
//! | Enter | editing | `zone.commit_edit` |
//! | Escape | any | `zone.escape` |
//! | F2 | navigating | `zone.start_edit` |
//! | Delete | navigating | `collection.remove` |
//! | Mod+D | navigating | `collection.duplicate` |
//! | Alt+ArrowUp / Alt+ArrowDown | navigating | `collection.move_up` / `move_down` |
//! | Mod+Z / Mod+Shift+Z | any | `history.undo` / `history.redo` |
//!
//! Mod+C, Mod+X, Mod+V, and Mod+A are reserved for the host's native
//! clipboard events and arrive through [`Interaction::handle_native`](crate::Interaction::handle_native).

use zonekit_core::{Binding, BindingContext, BindingGroup, KeyChord, KeyParseError, Keymap, Platform};
use zonekit_zones::{Direction, SelectOp};

use crate::command::Command;

const ARROWS: [(&str, Direction); 6] = [
    ("ArrowUp", Direction::Up),
    ("ArrowDown", Direction::Down),
    ("ArrowLeft", Direction::Left),
    ("ArrowRight", Direction::Right),
    ("Home", Direction::Home),
    ("End", Direction::End),
];

/// The default bindings for `platform`.
pub fn default_bindings(platform: Platform) -> Result<Vec<Binding<Command>>, KeyParseError> {
    let chord = |key: &str| KeyChord::parse(key, platform);
    let nav = |key: &str, command: Command| -> Result<Binding<Command>, KeyParseError> {
        Ok(Binding::new(chord(key)?, command).when(BindingContext::Navigating))
    };

    let mut bindings = Vec::with_capacity(24);
    for (key, direction) in ARROWS {
        bindings.push(nav(key, Command::navigate(direction))?);
        bindings.push(nav(format!("Shift+{key}").as_str(), Command::extend(direction))?);
    }
    bindings.extend([
        nav("Space", Command::select(None, SelectOp::Toggle))?.labeled("Toggle selection"),
        nav("Enter", Command::activate())?.labeled("Activate"),
        Binding::new(chord("Enter")?, Command::commit_edit())
            .when(BindingContext::Editing)
            .labeled("Commit edit"),
        Binding::new(chord("Escape")?, Command::escape()).labeled("Escape"),
        nav("F2", Command::start_edit())?.labeled("Rename"),
        nav("Delete", Command::remove())?.labeled("Delete"),
        nav("Mod+D", Command::duplicate())?.labeled("Duplicate"),
        nav("Alt+ArrowUp", Command::move_up())?.labeled("Move up"),
        nav("Alt+ArrowDown", Command::move_down())?.labeled("Move down"),
        Binding::new(chord("Mod+Z")?, Command::Undo).labeled("Undo"),
        Binding::new(chord("Mod+Shift+Z")?, Command::Redo).labeled("Redo"),
    ]);
    Ok(bindings)
}

/// Register the default bindings, returning a handle that removes them.
pub fn install_default_keymap(keymap: &mut Keymap<Command>) -> Result<BindingGroup, KeyParseError> {
    let bindings = default_bindings(keymap.platform())?;
    Ok(keymap.register_all(bindings))
}
