#![forbid(unsafe_code)]

//! Runtime: the command kernel, undo/redo history, effects, and configuration.
//!
//! # Role in zonekit
//! `zonekit-runtime` is the dispatch layer. It is generic over the state,
//! command, and environment types, so the zone model and the application
//! plug their reducers in as [`kernel::Handler`]s keyed by command kind.
//!
//! # Primary responsibilities
//! - **Kernel**: synchronous dispatch with guards, follow-ups, and rejections.
//! - **Undo**: snapshot history over the state's undoable slice.
//! - **Effects**: fire-and-forget side channels such as the clipboard mirror.
//! - **Config**: `KernelConfig` from TOML, JSON, or the environment.

pub mod config;
pub mod effect;
pub mod kernel;
pub mod undo;

pub use config::{ConfigError, KernelConfig, PlatformSetting};
pub use effect::{ClipboardError, ClipboardHost, Effect, EffectOutcome, EffectRunner, MemoryClipboard, NoClipboard};
pub use kernel::{Ctx, DispatchResult, Handler, HistoryOp, Kernel, KernelCommand, Rejection, Transition};
pub use undo::{History, HistoryConfig, HistoryEntry, Snapshot};
