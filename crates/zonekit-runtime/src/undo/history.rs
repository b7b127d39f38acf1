#![forbid(unsafe_code)]

//! Bounded snapshot history for undo/redo.
//!
//! [`History`] keeps two stacks of [`HistoryEntry`] values. A past entry holds
//! the slice as it was *before* its command ran; a future entry holds the
//! slice as it was *before the undo* that produced it. Undo and redo are
//! therefore the same swap in opposite directions.
//!
//! ```text
//! record(c3, s2)
//! ┌───────────────────────────────────────────────┐
//! │ Past:   [(c1,s0), (c2,s1), (c3,s2)]           │
//! │ Future: []                                    │
//! │ Live:   s3                                    │
//! └───────────────────────────────────────────────┘
//!
//! undo(s3) x2
//! ┌───────────────────────────────────────────────┐
//! │ Past:   [(c1,s0)]                             │
//! │ Future: [(c3,s3), (c2,s2)]                    │
//! │ Live:   s1                                    │
//! └───────────────────────────────────────────────┘
//!
//! record(c4, s1)  <-- new branch, clears future
//! ┌───────────────────────────────────────────────┐
//! │ Past:   [(c1,s0), (c4,s1)]                    │
//! │ Future: []                                    │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() <= config.max_depth` after any operation.
//! 2. The future stack is cleared on every `record`.
//! 3. `undo` followed by `redo` returns the live slice passed to `undo`.
//!
//! Slices are expected to be persistent structures (`im::HashMap`,
//! `im::Vector`) so that keeping a hundred of them costs little more than one.

use std::collections::VecDeque;
use std::fmt;

use web_time::SystemTime;

/// Configuration for [`History`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of past entries retained. Oldest are evicted first.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    /// Create a configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// One undoable step.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<C, T> {
    /// The command that produced the step.
    pub command: C,
    /// Wall-clock time the entry was pushed.
    pub timestamp: SystemTime,
    /// Slice to restore when this entry is popped.
    pub snapshot: T,
}

impl<C, T> HistoryEntry<C, T> {
    fn now(command: C, snapshot: T) -> Self {
        Self {
            command,
            timestamp: SystemTime::now(),
            snapshot,
        }
    }
}

/// Dual-stack snapshot history.
pub struct History<C, T> {
    past: VecDeque<HistoryEntry<C, T>>,
    future: Vec<HistoryEntry<C, T>>,
    config: HistoryConfig,
}

impl<C, T> fmt::Debug for History<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<C, T> Default for History<C, T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<C, T> History<C, T> {
    /// Create an empty history.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            config,
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record a forward step. `before` is the slice prior to `command`.
    pub fn record(&mut self, command: C, before: T) {
        self.future.clear();
        self.past.push_back(HistoryEntry::now(command, before));
        self.enforce_depth();
    }

    /// Pop the newest past entry, parking `live` on the future stack.
    ///
    /// Returns the slice to restore, or `None` (with `live` dropped) if there
    /// is nothing to undo.
    pub fn undo(&mut self, live: T) -> Option<T> {
        let entry = self.past.pop_back()?;
        self.future.push(HistoryEntry::now(entry.command, live));
        Some(entry.snapshot)
    }

    /// Pop the newest future entry, parking `live` on the past stack.
    pub fn redo(&mut self, live: T) -> Option<T> {
        let entry = self.future.pop()?;
        self.past.push_back(HistoryEntry::now(entry.command, live));
        self.enforce_depth();
        Some(entry.snapshot)
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of past entries.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of future entries.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Newest past entry.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry<C, T>> {
        self.past.back()
    }

    /// Past entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<C, T>> {
        self.past.iter()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Rewrite every held slice, past and future, in place.
    pub fn rewrite_snapshots(&mut self, mut f: impl FnMut(&mut T)) {
        for entry in self.past.iter_mut().chain(self.future.iter_mut()) {
            f(&mut entry.snapshot);
        }
    }

    fn enforce_depth(&mut self) {
        while self.past.len() > self.config.max_depth {
            self.past.pop_front();
            tracing::trace!(target: "zonekit.history", "evicted oldest history entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_is_empty() {
        let h = History::<&str, i32>::default();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.undo_depth(), 0);
        assert!(h.last().is_none());
    }

    #[test]
    fn undo_returns_pre_command_slice() {
        let mut h = History::default();
        h.record("inc", 0);
        h.record("inc", 1);
        assert_eq!(h.undo(2), Some(1));
        assert_eq!(h.undo(1), Some(0));
        assert_eq!(h.undo(0), None);
        assert_eq!(h.redo_depth(), 2);
    }

    #[test]
    fn redo_returns_live_slice_given_to_undo() {
        let mut h = History::default();
        h.record("set", 10);
        let restored = h.undo(20).unwrap();
        assert_eq!(restored, 10);
        assert_eq!(h.redo(restored), Some(20));
        assert!(h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.last().unwrap().command, "set");
    }

    #[test]
    fn record_clears_future() {
        let mut h = History::default();
        h.record("a", 0);
        h.undo(1);
        assert!(h.can_redo());
        h.record("b", 0);
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut h = History::new(HistoryConfig::new(3));
        for i in 0..5 {
            h.record(i, i);
        }
        assert_eq!(h.undo_depth(), 3);
        let commands: Vec<_> = h.entries().map(|e| e.command).collect();
        assert_eq!(commands, vec![2, 3, 4]);
    }

    #[test]
    fn zero_depth_is_clamped_to_one() {
        assert_eq!(HistoryConfig::new(0).max_depth, 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut h = History::default();
        h.record("a", 0);
        h.undo(1);
        h.record("b", 0);
        h.clear();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn rewrite_touches_both_stacks() {
        let mut h = History::default();
        h.record("a", 1);
        h.record("b", 2);
        h.undo(3);
        h.rewrite_snapshots(|n| *n *= 10);
        assert_eq!(h.redo(0), Some(30));
        assert_eq!(h.undo(0), Some(0));
        assert_eq!(h.undo(0), Some(10));
    }
}
