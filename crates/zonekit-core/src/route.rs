#![forbid(unsafe_code)]

//! Route stage: sense, classify, then hand the key to a field or a command.
//!
//! [`Pipeline`] owns the [`Keymap`], the [`FieldRegistry`], and an ordered list
//! of [`KeyFallback`] middleware. Fallbacks only run when the primary keymap
//! lookup misses, so a specific binding always beats a normalized synonym.
//!
//! ```text
//! KeyEvent ──sense──▶ Intent ──classify──▶ FIELD ──▶ FieldRegistry::apply
//!                                     ├──▶ COMMAND ─▶ Keymap::resolve ─▶ fallbacks
//!                                     └──▶ PASSTHRU
//! ```

use std::fmt;

use crate::classify::{Classification, classify, field_claim, field_profile};
use crate::event::{KeyCode, KeyEvent, Modifiers};
use crate::field::{FieldAction, FieldId, FieldMode, FieldOutcome, FieldRegistry};
use crate::intent::{FocusTarget, Intent, sense};
use crate::key::{KeyChord, Platform};
use crate::keymap::{KeyMode, Keymap, ResolveContext};

/// Middleware consulted when the primary keymap lookup misses.
pub trait KeyFallback<C>: Send + Sync {
    /// Produce a command for an unbound chord, or `None` to pass.
    fn fallback(&self, intent: &Intent, keymap: &Keymap<C>, ctx: &ResolveContext) -> Option<C>;
}

/// Remaps platform synonyms to the chords the keymap is written against.
///
/// | Platform | Pressed | Resolved as |
/// |----------|---------|-------------|
/// | mac | `Meta+ArrowUp` | `Home` |
/// | mac | `Meta+ArrowDown` | `End` |
/// | mac | `Meta+Shift+ArrowUp` | `Shift+Home` |
/// | mac | `Meta+Shift+ArrowDown` | `Shift+End` |
/// | mac | `Meta+Backspace` | `Delete` |
/// | any | `Ctrl+Y` (not mac) | `Ctrl+Shift+Z` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformKeyFallback {
    platform: Platform,
}

impl PlatformKeyFallback {
    /// Fallback for a platform.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// The chord `chord` is a synonym for, if any.
    #[must_use]
    pub fn synonym(&self, chord: KeyChord) -> Option<KeyChord> {
        let mods = chord.modifiers;
        match self.platform {
            Platform::Mac => {
                if !mods.contains(Modifiers::META) || mods.intersects(Modifiers::CTRL | Modifiers::ALT) {
                    return None;
                }
                let rest = mods - Modifiers::META;
                match chord.code {
                    KeyCode::Up => Some(chord.remapped(KeyCode::Home, rest)),
                    KeyCode::Down => Some(chord.remapped(KeyCode::End, rest)),
                    KeyCode::Backspace if rest.is_empty() => {
                        Some(chord.remapped(KeyCode::Delete, Modifiers::NONE))
                    }
                    _ => None,
                }
            }
            Platform::Other => {
                (chord.code == KeyCode::Char('y') && mods == Modifiers::CTRL)
                    .then(|| chord.remapped(KeyCode::Char('z'), Modifiers::CTRL | Modifiers::SHIFT))
            }
        }
    }
}

impl<C> KeyFallback<C> for PlatformKeyFallback {
    fn fallback(&self, intent: &Intent, keymap: &Keymap<C>, ctx: &ResolveContext) -> Option<C> {
        let synonym = self.synonym(intent.chord)?;
        let binding = keymap.resolve(&synonym, ctx)?;
        tracing::debug!(
            target: "zonekit.keyboard",
            pressed = %intent.chord,
            resolved = %synonym,
            "platform fallback"
        );
        Some(binding.command())
    }
}

/// What the pipeline did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed<C> {
    /// A field consumed the key.
    Field {
        /// The field.
        field: FieldId,
        /// Action applied.
        action: FieldAction,
        /// Result of applying it.
        outcome: FieldOutcome<C>,
    },
    /// A binding (or fallback) produced a command to dispatch.
    Command {
        /// The command.
        command: C,
        /// Chord that was pressed.
        chord: KeyChord,
        /// Resolved through fallback middleware rather than a direct binding.
        via_fallback: bool,
    },
    /// Leave the key to the host.
    PassThru,
}

impl<C> Routed<C> {
    /// Whether the host's default handling should be suppressed.
    #[must_use]
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::PassThru)
    }

    /// The command, if one was resolved.
    #[must_use]
    pub fn into_command(self) -> Option<C> {
        match self {
            Self::Command { command, .. } => Some(command),
            Self::Field {
                outcome: FieldOutcome::Committed { command, .. },
                ..
            } => command,
            _ => None,
        }
    }
}

/// Keyboard pipeline: keymap, fields, and fallback middleware.
pub struct Pipeline<C> {
    keymap: Keymap<C>,
    fields: FieldRegistry<C>,
    fallbacks: Vec<Box<dyn KeyFallback<C>>>,
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("keymap", &self.keymap)
            .field("fields", &self.fields)
            .field("fallbacks", &self.fallbacks.len())
            .finish()
    }
}

impl<C: Clone + 'static> Pipeline<C> {
    /// Pipeline for a platform with its [`PlatformKeyFallback`] installed.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        let mut pipeline = Self::bare(platform);
        pipeline.push_fallback(PlatformKeyFallback::new(platform));
        pipeline
    }
}

impl<C: Clone> Pipeline<C> {
    /// Pipeline without any fallback middleware.
    #[must_use]
    pub fn bare(platform: Platform) -> Self {
        Self {
            keymap: Keymap::new(platform),
            fields: FieldRegistry::new(),
            fallbacks: Vec::new(),
        }
    }

    /// Append a fallback; earlier fallbacks are consulted first.
    pub fn push_fallback(&mut self, fallback: impl KeyFallback<C> + 'static) {
        self.fallbacks.push(Box::new(fallback));
    }

    /// Keymap.
    #[must_use]
    pub fn keymap(&self) -> &Keymap<C> {
        &self.keymap
    }

    /// Keymap, mutably.
    pub fn keymap_mut(&mut self) -> &mut Keymap<C> {
        &mut self.keymap
    }

    /// Field registry.
    #[must_use]
    pub fn fields(&self) -> &FieldRegistry<C> {
        &self.fields
    }

    /// Field registry, mutably.
    pub fn fields_mut(&mut self) -> &mut FieldRegistry<C> {
        &mut self.fields
    }

    /// Clear bindings and fields. Fallback middleware is kept.
    pub fn reset(&mut self) {
        self.keymap.reset();
        self.fields.reset();
    }

    /// Complete the caller's context with what only the field registry knows.
    ///
    /// A deferred field in an active session switches the mode to editing;
    /// `field_consumes` is set when the focused field claims the key.
    #[must_use]
    pub fn resolve_context(&self, intent: &Intent, mut ctx: ResolveContext) -> ResolveContext {
        if let Some(profile) = field_profile(intent, &self.fields) {
            if profile.mode == FieldMode::Deferred && profile.editing {
                ctx.mode = KeyMode::Editing;
            }
            ctx.field_consumes = field_claim(intent, profile).is_some();
        }
        ctx
    }

    /// Resolve a chord through the keymap, then the fallbacks.
    ///
    /// Returns the command and whether a fallback produced it.
    #[must_use]
    pub fn resolve(&self, intent: &Intent, ctx: &ResolveContext) -> Option<(C, bool)> {
        if let Some(binding) = self.keymap.resolve(&intent.chord, ctx) {
            return Some((binding.command(), false));
        }
        self.fallbacks
            .iter()
            .find_map(|fb| fb.fallback(intent, &self.keymap, ctx))
            .map(|command| (command, true))
    }

    /// Run a key event through sense, classify, and route.
    ///
    /// `ctx` carries the focus path and whether an item edit is active.
    pub fn route(&mut self, event: &KeyEvent, target: &FocusTarget, ctx: ResolveContext) -> Routed<C> {
        let intent = sense(event, target);
        let ctx = self.resolve_context(&intent, ctx);

        let mut resolved = None;
        let class = {
            let keymap_side = &*self;
            classify(&intent, &self.fields, |intent| {
                resolved = keymap_side.resolve(intent, &ctx);
                resolved.is_some()
            })
        };

        match class {
            Classification::Field(action) => {
                // Classification only yields FIELD for registered fields.
                let Some(field) = intent.field else {
                    return Routed::PassThru;
                };
                let outcome = self.fields.apply(&field, &action);
                tracing::debug!(target: "zonekit.keyboard", field = %field, ?action, "routed to field");
                Routed::Field {
                    field,
                    action,
                    outcome,
                }
            }
            Classification::Command => match resolved {
                Some((command, via_fallback)) => {
                    tracing::debug!(
                        target: "zonekit.keyboard",
                        chord = %intent.chord,
                        via_fallback,
                        "routed to command"
                    );
                    Routed::Command {
                        command,
                        chord: intent.chord,
                        via_fallback,
                    }
                }
                None => Routed::PassThru,
            },
            Classification::PassThru => Routed::PassThru,
        }
    }
}
