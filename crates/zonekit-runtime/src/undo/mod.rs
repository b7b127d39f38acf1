#![forbid(unsafe_code)]

//! Snapshot-based undo/redo.
//!
//! The kernel does not diff commands or store inverse operations. Instead the
//! state type exposes an undoable *slice* through [`Snapshot`]; the kernel
//! captures it before each forward dispatch and records a [`HistoryEntry`]
//! for every one that is applied. Recording clears the redo stack.
//!
//! # Design Notes
//!
//! ## What goes in the slice
//!
//! Only data the user would expect undo to revert: collection contents.
//! Live focus, selection, and the clipboard slot stay out, so undoing a
//! delete never yanks focus somewhere the user did not put it.
//!
//! ## Cost
//!
//! Slices are cloned on every dispatch. Back them with persistent
//! collections (`im::HashMap`, `im::Vector`) so a clone is a pointer copy and
//! equality checks short-circuit on shared structure.

pub mod history;

pub use history::{History, HistoryConfig, HistoryEntry};

/// State with an undoable slice.
pub trait Snapshot {
    /// The part of the state undo/redo restores.
    type Slice: Clone + PartialEq;

    /// Capture the current slice.
    fn snapshot(&self) -> Self::Slice;

    /// Replace the slice, leaving everything else untouched.
    fn restore(&mut self, slice: Self::Slice);
}
