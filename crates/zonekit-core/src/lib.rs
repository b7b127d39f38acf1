#![forbid(unsafe_code)]

//! Core: key events, canonical chords, editable fields, and the keyboard pipeline.
//!
//! # Role in zonekit
//! `zonekit-core` is the input layer. It turns host key presses into
//! normalized [`event::KeyEvent`]s, decides who owns each press, and resolves
//! command presses through a context-aware keymap. It knows nothing about
//! zones or state; the command type is a generic parameter.
//!
//! # Primary responsibilities
//! - **Events**: keys, pointer clicks, and native clipboard actions.
//! - **Chords**: canonical `Meta+Ctrl+Alt+Shift+Key` lookup keys with platform `Mod`.
//! - **Fields**: edit sessions and grapheme-aware text buffers.
//! - **Pipeline**: sense, classify (FIELD / COMMAND / PASSTHRU), route.
//! - **Keymap**: context-guarded bindings with register/unregister handles.
//!
//! # How it fits in the system
//! The runtime (`zonekit-runtime`) dispatches the commands this crate
//! resolves; the zone model (`zonekit-zones`) reduces them into focus and
//! selection state. The facade (`zonekit`) wires all three together.

pub mod classify;
pub mod event;
pub mod field;
pub mod intent;
pub mod key;
pub mod keymap;
pub mod route;

pub use classify::Classification;
pub use event::{InputEvent, KeyCode, KeyEvent, KeyEventKind, Modifiers, NativeAction, PointerEvent, PointerKind};
pub use field::{FieldAction, FieldConfig, FieldId, FieldMode, FieldOutcome, FieldRegistry};
pub use intent::{FocusTarget, Intent};
pub use key::{KeyChord, KeyParseError, Platform};
pub use keymap::{Binding, BindingContext, BindingGroup, BindingId, KeyMode, Keymap, ResolveContext};
pub use route::{KeyFallback, Pipeline, PlatformKeyFallback, Routed};
