//! Property-based invariant tests for canonical key chords.
//!
//! 1. Canonical strings parse back to the same chord
//! 2. Parsing ignores modifier order and case
//! 3. Events and their canonical strings agree
//! 4. Canonical strings list modifiers in fixed order

use proptest::prelude::*;
use zonekit_core::event::{KeyCode, KeyEvent, Modifiers};
use zonekit_core::key::{KeyChord, Platform};

// ── Strategies ──────────────────────────────────────────────────────────

fn code_strategy() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        proptest::char::range('a', 'z').prop_map(KeyCode::Char),
        proptest::char::range('0', '9').prop_map(KeyCode::Char),
        prop::sample::select(vec![' ', '?', '+', '-', '/', '['])
            .prop_map(KeyCode::Char),
        prop::sample::select(vec![
            KeyCode::Enter,
            KeyCode::Escape,
            KeyCode::Backspace,
            KeyCode::Tab,
            KeyCode::Delete,
            KeyCode::Insert,
            KeyCode::Home,
            KeyCode::End,
            KeyCode::PageUp,
            KeyCode::PageDown,
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
        ]),
        (1u8..=24).prop_map(KeyCode::F),
    ]
}

fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (0u8..16).prop_map(Modifiers::from_bits_truncate)
}

fn chord_strategy() -> impl Strategy<Value = KeyChord> {
    (code_strategy(), modifiers_strategy()).prop_map(|(c, m)| KeyChord::with_modifiers(c, m))
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Canonical form round-trips
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn canonical_string_parses_to_same_chord(chord in chord_strategy()) {
        let parsed = KeyChord::parse(&chord.canonical(), Platform::Other).unwrap();
        prop_assert_eq!(parsed, chord);
    }

    #[test]
    fn parsing_ignores_case(chord in chord_strategy()) {
        let lower = chord.canonical().to_ascii_lowercase();
        let parsed = KeyChord::parse(&lower, Platform::Mac).unwrap();
        prop_assert_eq!(parsed.canonical(), chord.canonical());
    }

    #[test]
    fn event_and_canonical_string_agree(code in code_strategy(), mods in modifiers_strategy()) {
        let event = KeyEvent::new(code).with_modifiers(mods);
        let chord = KeyChord::from_event(&event);
        let reparsed = KeyChord::parse(&chord.canonical(), Platform::Other).unwrap();
        prop_assert_eq!(reparsed, chord);
    }

// ═══════════════════════════════════════════════════════════════════════
// 2. Fixed modifier order
// ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn modifiers_render_in_fixed_order(chord in chord_strategy()) {
        let canonical = chord.canonical();
        let order = ["Meta+", "Ctrl+", "Alt+", "Shift+"];
        let positions: Vec<usize> = order
            .iter()
            .filter_map(|m| canonical.find(m))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }

    #[test]
    fn mod_resolves_per_platform(code in code_strategy()) {
        let chord = KeyChord::new(code).canonical();
        let mac = KeyChord::parse(&format!("Mod+{chord}"), Platform::Mac).unwrap();
        let other = KeyChord::parse(&format!("Mod+{chord}"), Platform::Other).unwrap();
        prop_assert!(mac.modifiers.contains(Modifiers::META));
        prop_assert!(other.modifiers.contains(Modifiers::CTRL));
    }
}
