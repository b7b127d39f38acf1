#![forbid(unsafe_code)]

//! Classify stage: decide who owns a key press.
//!
//! # Priority Order
//!
//! Rules are evaluated top to bottom; the first match wins.
//!
//! | Priority | Condition | Result |
//! |----------|-----------|--------|
//! | 0 | key release | PASSTHRU |
//! | 1 | IME composition inside a field | FIELD (trap) |
//! | 1 | IME composition elsewhere | PASSTHRU |
//! | 2 | registered field claims the key | FIELD |
//! | 2 | unregistered field would claim the key | PASSTHRU (native input) |
//! | 3 | Ctrl/Meta + C, V, X, A | PASSTHRU (native clipboard) |
//! | 4 | a binding or fallback resolves the chord | COMMAND |
//! | 5 | otherwise | PASSTHRU |
//!
//! # Field claims
//!
//! | Key | Editing, single-line | Editing, multiline | Deferred, idle |
//! |-----|----------------------|--------------------|----------------|
//! | Enter | commit | newline (Mod+Enter commits) | start edit |
//! | Escape | cancel | cancel | released |
//! | Left / Right | cursor | cursor | released |
//! | Up / Down | released | cursor | released |
//! | Home / End | cursor | cursor | released |
//! | Backspace / Delete | delete | delete | released |
//! | printable | insert | insert | released |

use crate::event::{KeyCode, KeyEventKind, Modifiers};
use crate::field::{CursorMove, FieldAction, FieldMode, FieldRegistry};
use crate::intent::Intent;

/// Outcome of classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The focused field owns the key.
    Field(FieldAction),
    /// Resolve through the keymap and dispatch.
    Command,
    /// Leave the key to the host's default handling.
    PassThru,
}

impl Classification {
    /// Whether the host's default handling should be suppressed.
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::PassThru)
    }
}

/// The parts of a field that decide which keys it claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProfile {
    /// Editing mode.
    pub mode: FieldMode,
    /// Multiline field.
    pub multiline: bool,
    /// Currently consuming editing keys.
    pub editing: bool,
}

impl FieldProfile {
    /// Profile assumed for focus targets that are fields the registry does not know.
    pub const NATIVE_INPUT: Self = Self {
        mode: FieldMode::Immediate,
        multiline: false,
        editing: true,
    };
}

/// Whether the chord is one of the reserved native clipboard combinations.
#[must_use]
pub fn is_reserved_clipboard(intent: &Intent) -> bool {
    let event = &intent.event;
    if !event.has_command_modifier() || event.alt() {
        return false;
    }
    matches!(event.code, KeyCode::Char(c) if matches!(c.to_ascii_lowercase(), 'c' | 'v' | 'x' | 'a'))
}

/// The action a field with `profile` would take for this key, if it claims it.
#[must_use]
pub fn field_claim(intent: &Intent, profile: FieldProfile) -> Option<FieldAction> {
    let event = &intent.event;

    if !profile.editing {
        // Idle deferred field: only a plain Enter is taken, to open a session.
        return (event.code == KeyCode::Enter && event.modifiers == Modifiers::NONE)
            .then_some(FieldAction::StartEdit);
    }

    let command_mod = event.has_command_modifier();
    match event.code {
        KeyCode::Enter => {
            if profile.multiline && !command_mod {
                Some(FieldAction::InsertNewline)
            } else {
                Some(FieldAction::Commit)
            }
        }
        KeyCode::Escape if event.modifiers == Modifiers::NONE => Some(FieldAction::Cancel),
        KeyCode::Backspace => Some(FieldAction::DeleteBackward),
        KeyCode::Delete => Some(FieldAction::DeleteForward),
        KeyCode::Left if command_mod => Some(FieldAction::Cursor(CursorMove::Home)),
        KeyCode::Right if command_mod => Some(FieldAction::Cursor(CursorMove::End)),
        KeyCode::Left => Some(FieldAction::Cursor(CursorMove::Left)),
        KeyCode::Right => Some(FieldAction::Cursor(CursorMove::Right)),
        KeyCode::Home => Some(FieldAction::Cursor(CursorMove::Home)),
        KeyCode::End => Some(FieldAction::Cursor(CursorMove::End)),
        KeyCode::Up if profile.multiline && !command_mod => Some(FieldAction::Cursor(CursorMove::Up)),
        KeyCode::Down if profile.multiline && !command_mod => {
            Some(FieldAction::Cursor(CursorMove::Down))
        }
        _ => event.text_char().map(FieldAction::Insert),
    }
}

/// Profile of the intent's field, if the registry knows it.
#[must_use]
pub fn field_profile<C>(intent: &Intent, fields: &FieldRegistry<C>) -> Option<FieldProfile> {
    let id = intent.field.as_ref()?;
    let state = fields.get(id)?;
    Some(FieldProfile {
        mode: state.config().mode,
        multiline: state.config().multiline,
        editing: state.is_editing(),
    })
}

/// Classify a sensed key press.
///
/// `is_bound` answers rule 4: whether the keymap (or a fallback) resolves
/// the chord in the current context.
pub fn classify<C>(
    intent: &Intent,
    fields: &FieldRegistry<C>,
    is_bound: impl FnOnce(&Intent) -> bool,
) -> Classification {
    let class = classify_inner(intent, fields, is_bound);
    tracing::trace!(
        target: "zonekit.keyboard",
        chord = %intent.chord,
        field = intent.field.as_ref().map(|f| f.as_str()),
        ?class,
        "key classified"
    );
    class
}

fn classify_inner<C>(
    intent: &Intent,
    fields: &FieldRegistry<C>,
    is_bound: impl FnOnce(&Intent) -> bool,
) -> Classification {
    if intent.event.kind == KeyEventKind::Release {
        return Classification::PassThru;
    }

    if intent.is_composing {
        return if intent.is_from_field() {
            Classification::Field(FieldAction::Trap)
        } else {
            Classification::PassThru
        };
    }

    if intent.is_from_field() {
        match field_profile(intent, fields) {
            Some(profile) => {
                if let Some(action) = field_claim(intent, profile) {
                    return Classification::Field(action);
                }
            }
            None => {
                if field_claim(intent, FieldProfile::NATIVE_INPUT).is_some() {
                    return Classification::PassThru;
                }
            }
        }
    }

    if is_reserved_clipboard(intent) {
        return Classification::PassThru;
    }

    if is_bound(intent) {
        return Classification::Command;
    }

    Classification::PassThru
}
