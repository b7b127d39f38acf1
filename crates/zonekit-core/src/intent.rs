#![forbid(unsafe_code)]

//! Sense stage: turn a raw key event plus focus metadata into an [`Intent`].

use crate::event::KeyEvent;
use crate::field::FieldId;
use crate::key::KeyChord;

/// Where keyboard focus physically is when a key arrives.
///
/// Hosts fill this from their own focus tracking: which zone owns focus,
/// whether the focused element is an editable field, and whether an IME
/// composition is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTarget {
    /// Zone containing the focused element.
    pub zone: Option<String>,
    /// Field id if the focused element is an editable field.
    pub field: Option<FieldId>,
    /// IME composition is active.
    pub composing: bool,
}

impl FocusTarget {
    /// Focus inside a zone (not in a field).
    #[must_use]
    pub fn zone(zone: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Self::default()
        }
    }

    /// Focus inside a field, optionally within a zone.
    #[must_use]
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(FieldId::new(field)),
            ..Self::default()
        }
    }

    /// Attach the containing zone.
    #[must_use]
    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Mark an IME composition as active.
    #[must_use]
    pub fn composing(mut self) -> Self {
        self.composing = true;
        self
    }
}

/// A sensed key press, independent of any host event object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    /// Canonical chord used for keymap lookups.
    pub chord: KeyChord,
    /// The original event.
    pub event: KeyEvent,
    /// Field the key was typed into, if any.
    pub field: Option<FieldId>,
    /// Zone containing the focus target.
    pub zone: Option<String>,
    /// IME composition is active.
    pub is_composing: bool,
}

impl Intent {
    /// Whether the key originated inside a field.
    #[must_use]
    pub fn is_from_field(&self) -> bool {
        self.field.is_some()
    }
}

/// Build an [`Intent`] from an event and its focus target.
#[must_use]
pub fn sense(event: &KeyEvent, target: &FocusTarget) -> Intent {
    Intent {
        chord: KeyChord::from_event(event),
        event: *event,
        field: target.field.clone(),
        zone: target.zone.clone(),
        is_composing: target.composing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, Modifiers};

    #[test]
    fn sense_canonicalizes_and_copies_target() {
        let event = KeyEvent::new(KeyCode::Char('A')).with_modifiers(Modifiers::CTRL);
        let target = FocusTarget::field("rename").in_zone("files").composing();
        let intent = sense(&event, &target);

        assert_eq!(intent.chord.canonical(), "Ctrl+A");
        assert!(intent.is_from_field());
        assert_eq!(intent.zone.as_deref(), Some("files"));
        assert!(intent.is_composing);
    }

    #[test]
    fn zone_target_is_not_a_field() {
        let intent = sense(&KeyEvent::new(KeyCode::Down), &FocusTarget::zone("list"));
        assert!(!intent.is_from_field());
        assert!(!intent.is_composing);
    }
}
