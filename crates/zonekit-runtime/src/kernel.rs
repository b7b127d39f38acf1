#![forbid(unsafe_code)]

//! The command kernel: a single-threaded reducer/dispatcher.
//!
//! A [`Kernel`] owns the application state and a table of [`Handler`]s keyed
//! by command kind. [`Kernel::dispatch`] looks up the handler for a command,
//! evaluates its guard, runs it, installs the resulting state, queues its
//! effects, and then applies any follow-up commands the handler returned,
//! all within the same call.
//!
//! # Dispatch
//!
//! ```text
//! dispatch(cmd)
//!   ├─ history op? ──▶ swap undoable slice with History ──▶ restore hook
//!   └─ handler[cmd.kind()]
//!        ├─ guard false ──▶ Rejected(GuardFailed)
//!        ├─ Err(r) ───────▶ Rejected(r)
//!        └─ Transition { state, dispatch, effects }
//!             ├─ install state, queue effects
//!             ├─ apply follow-ups in order (depth-limited)
//!             └─ applied ──▶ History::record(cmd, before)
//! ```
//!
//! # Invariants
//!
//! 1. Handlers never see a partially applied transition.
//! 2. Every applied forward dispatch records one history entry and clears
//!    the redo stack. Rejected dispatches and undo/redo never record.
//! 3. Follow-ups of one dispatch form a single undo step.
//! 4. A rejected dispatch leaves state, history, and effects untouched.
//!
//! Registries are passed in as an explicit environment `E` on every dispatch
//! rather than reached through globals.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::KernelConfig;
use crate::effect::Effect;
use crate::undo::{History, HistoryConfig, Snapshot};

// ---------------------------------------------------------------------------
// Monotonic counters
// ---------------------------------------------------------------------------

static DISPATCH_TOTAL: AtomicU64 = AtomicU64::new(0);
static REJECTED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total top-level dispatches across all kernels (monotonic counter).
#[must_use]
pub fn dispatches_total() -> u64 {
    DISPATCH_TOTAL.load(Ordering::Relaxed)
}

/// Total rejected top-level dispatches across all kernels (monotonic counter).
#[must_use]
pub fn rejections_total() -> u64 {
    REJECTED_TOTAL.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Commands and results
// ---------------------------------------------------------------------------

/// History navigation handled by the kernel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryOp {
    /// Step back.
    Undo,
    /// Step forward.
    Redo,
}

/// A dispatchable command.
pub trait KernelCommand: Clone + fmt::Debug {
    /// Stable kind string used to find the handler (`"zone.navigate"`).
    fn kind(&self) -> &str;

    /// Whether this command is undo or redo.
    fn history_op(&self) -> Option<HistoryOp> {
        None
    }
}

/// Why a dispatch did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The handler's guard returned false.
    GuardFailed {
        /// Command kind.
        kind: String,
    },
    /// No handler is registered for the kind.
    Unhandled {
        /// Command kind.
        kind: String,
    },
    /// The command referenced a zone that is not registered.
    UnknownZone(String),
    /// Undo with an empty past.
    NothingToUndo,
    /// Redo with an empty future.
    NothingToRedo,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuardFailed { kind } => write!(f, "guard rejected {kind}"),
            Self::Unhandled { kind } => write!(f, "no handler for {kind}"),
            Self::UnknownZone(zone) => write!(f, "unknown zone {zone:?}"),
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Result of [`Kernel::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// The handler ran.
    Applied {
        /// A new state was installed (by the command or a follow-up).
        changed: bool,
        /// Follow-up commands applied.
        follow_ups: usize,
    },
    /// Nothing happened.
    Rejected(Rejection),
}

impl DispatchResult {
    /// The handler ran.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The dispatch was refused.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Whether state was replaced.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Applied { changed: true, .. })
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            Self::Applied { .. } => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Applied { changed: true, .. } => "changed",
            Self::Applied { changed: false, .. } => "unchanged",
            Self::Rejected(_) => "rejected",
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// What a handler sees.
pub struct Ctx<'a, S, E> {
    /// Current state.
    pub state: &'a S,
    /// Registries and other read-only collaborators.
    pub env: &'a E,
}

/// Output of a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, C> {
    /// Next state, or `None` to keep the current one.
    pub state: Option<S>,
    /// Follow-up commands applied after this transition, in order.
    pub dispatch: Vec<C>,
    /// Side effects to run after the state has committed.
    pub effects: Vec<Effect>,
}

impl<S, C> Default for Transition<S, C> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<S, C> Transition<S, C> {
    /// Keep the current state.
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            state: None,
            dispatch: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Install `state`.
    #[must_use]
    pub fn to(state: S) -> Self {
        Self {
            state: Some(state),
            ..Self::unchanged()
        }
    }

    /// Append a follow-up command.
    #[must_use]
    pub fn then(mut self, command: C) -> Self {
        self.dispatch.push(command);
        self
    }

    /// Append a side effect.
    #[must_use]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Nothing to install, dispatch, or run.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.state.is_none() && self.dispatch.is_empty() && self.effects.is_empty()
    }
}

type RunFn<S, C, E> = dyn Fn(&Ctx<'_, S, E>, &C) -> Result<Transition<S, C>, Rejection> + Send + Sync;
type GuardFn<S, C, E> = dyn Fn(&Ctx<'_, S, E>, &C) -> bool + Send + Sync;
type RestoreHook<S, C, E> = dyn Fn(&Ctx<'_, S, E>) -> Vec<C> + Send + Sync;

/// A registered reducer plus its optional `when` guard.
pub struct Handler<S, C, E> {
    run: Arc<RunFn<S, C, E>>,
    guard: Option<Arc<GuardFn<S, C, E>>>,
}

impl<S, C, E> Clone for Handler<S, C, E> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            guard: self.guard.clone(),
        }
    }
}

impl<S, C, E> fmt::Debug for Handler<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

impl<S, C, E> Handler<S, C, E> {
    /// A handler that may reject.
    pub fn new(
        run: impl Fn(&Ctx<'_, S, E>, &C) -> Result<Transition<S, C>, Rejection> + Send + Sync + 'static,
    ) -> Self {
        Self {
            run: Arc::new(run),
            guard: None,
        }
    }

    /// A handler that always produces a transition.
    pub fn infallible(
        run: impl Fn(&Ctx<'_, S, E>, &C) -> Transition<S, C> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |ctx, cmd| Ok(run(ctx, cmd)))
    }

    /// Attach a `when` guard evaluated before the handler runs.
    #[must_use]
    pub fn when(mut self, guard: impl Fn(&Ctx<'_, S, E>, &C) -> bool + Send + Sync + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Single-threaded reducer/dispatcher with snapshot history.
pub struct Kernel<S: Snapshot, C, E> {
    state: S,
    handlers: HashMap<String, Handler<S, C, E>>,
    history: History<C, S::Slice>,
    effects: Vec<Effect>,
    restore_hook: Option<Arc<RestoreHook<S, C, E>>>,
    max_follow_up_depth: usize,
}

impl<S: Snapshot + fmt::Debug, C, E> fmt::Debug for Kernel<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("state", &self.state)
            .field("handlers", &self.handlers.len())
            .field("history", &self.history)
            .field("pending_effects", &self.effects.len())
            .finish()
    }
}

impl<S: Snapshot, C: KernelCommand, E> Kernel<S, C, E> {
    /// Kernel with default configuration.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self::with_config(state, &KernelConfig::default())
    }

    /// Kernel configured from a [`KernelConfig`].
    #[must_use]
    pub fn with_config(state: S, config: &KernelConfig) -> Self {
        Self {
            state,
            handlers: HashMap::new(),
            history: History::new(config.to_history_config()),
            effects: Vec::new(),
            restore_hook: None,
            max_follow_up_depth: config.dispatch.max_follow_up_depth.max(1),
        }
    }

    // ====================================================================
    // Registration
    // ====================================================================

    /// Register (or replace) the handler for a kind.
    pub fn register(&mut self, kind: impl Into<String>, handler: Handler<S, C, E>) {
        let kind = kind.into();
        tracing::debug!(target: "zonekit.kernel", %kind, guarded = handler.guard.is_some(), "handler registered");
        if self.handlers.insert(kind.clone(), handler).is_some() {
            tracing::debug!(target: "zonekit.kernel", %kind, "handler replaced");
        }
    }

    /// Remove the handler for a kind.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.handlers.remove(kind).is_some()
    }

    /// Whether a handler exists for a kind.
    #[must_use]
    pub fn has_handler(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Commands to apply after every undo/redo (e.g. focus repair).
    pub fn on_restore(&mut self, hook: impl Fn(&Ctx<'_, S, E>) -> Vec<C> + Send + Sync + 'static) {
        self.restore_hook = Some(Arc::new(hook));
    }

    // ====================================================================
    // State
    // ====================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Install `state` directly, bypassing handlers and history.
    ///
    /// For host-driven loads such as registering a collection. Recorded
    /// history keeps its slices.
    pub fn replace_state(&mut self, state: S) {
        self.state = state;
    }

    /// Rewrite every slice held by history.
    ///
    /// For host-driven removals that must not come back through undo.
    pub fn rewrite_history(&mut self, f: impl FnMut(&mut S::Slice)) {
        self.history.rewrite_snapshots(f);
    }

    /// Replace state and drop history and pending effects.
    pub fn reset(&mut self, state: S) {
        self.state = state;
        self.history.clear();
        self.effects.clear();
    }

    /// Undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History<C, S::Slice> {
        &self.history
    }

    /// Replace the history window.
    pub fn set_history_config(&mut self, config: HistoryConfig) {
        self.history = History::new(config);
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain effects queued by past dispatches.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    /// Dispatch a command synchronously.
    pub fn dispatch(&mut self, env: &E, command: C) -> DispatchResult {
        DISPATCH_TOTAL.fetch_add(1, Ordering::Relaxed);

        let span = tracing::debug_span!(
            "kernel.dispatch",
            command = command.kind(),
            outcome = tracing::field::Empty,
            follow_ups = tracing::field::Empty,
        );
        let _guard = span.enter();

        let result = match command.history_op() {
            Some(op) => self.travel(env, op),
            None => self.forward(env, command),
        };

        span.record("outcome", result.label());
        if let DispatchResult::Applied { follow_ups, .. } = &result {
            span.record("follow_ups", *follow_ups as u64);
        }
        if let DispatchResult::Rejected(reason) = &result {
            REJECTED_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "zonekit.kernel", %reason, "dispatch rejected");
        }
        result
    }

    fn forward(&mut self, env: &E, command: C) -> DispatchResult {
        let before = self.state.snapshot();
        let effects_before = self.effects.len();
        let mut follow_ups = 0;
        let result = self.apply(env, &command, 0, &mut follow_ups);

        match &result {
            DispatchResult::Applied { changed, .. } => {
                // Every applied forward step is a history entry and closes the redo branch.
                tracing::debug!(
                    target: "zonekit.history",
                    command = command.kind(),
                    changed = *changed,
                    "history entry recorded"
                );
                self.history.record(command, before);
            }
            DispatchResult::Rejected(_) => self.effects.truncate(effects_before),
        }
        result
    }

    fn apply(&mut self, env: &E, command: &C, depth: usize, follow_ups: &mut usize) -> DispatchResult {
        let kind = command.kind();
        let Some(handler) = self.handlers.get(kind).cloned() else {
            return DispatchResult::Rejected(Rejection::Unhandled {
                kind: kind.to_string(),
            });
        };

        let ctx = Ctx {
            state: &self.state,
            env,
        };
        if let Some(guard) = &handler.guard
            && !guard(&ctx, command)
        {
            return DispatchResult::Rejected(Rejection::GuardFailed {
                kind: kind.to_string(),
            });
        }

        let transition = match (handler.run)(&ctx, command) {
            Ok(t) => t,
            Err(rejection) => return DispatchResult::Rejected(rejection),
        };

        let Transition {
            state,
            dispatch,
            effects,
        } = transition;
        let mut changed = false;
        if let Some(next) = state {
            self.state = next;
            changed = true;
        }
        self.effects.extend(effects);

        for follow in dispatch {
            if depth + 1 > self.max_follow_up_depth {
                tracing::warn!(
                    target: "zonekit.kernel",
                    command = follow.kind(),
                    depth = depth + 1,
                    "follow-up depth exceeded, dropping"
                );
                break;
            }
            *follow_ups += 1;
            match self.apply(env, &follow, depth + 1, follow_ups) {
                DispatchResult::Applied { changed: c, .. } => changed |= c,
                DispatchResult::Rejected(reason) => {
                    tracing::debug!(target: "zonekit.kernel", command = follow.kind(), %reason, "follow-up rejected");
                }
            }
        }

        tracing::debug!(target: "zonekit.kernel", command = kind, changed, depth, "command applied");
        DispatchResult::Applied {
            changed,
            follow_ups: *follow_ups,
        }
    }

    fn travel(&mut self, env: &E, op: HistoryOp) -> DispatchResult {
        let live = self.state.snapshot();
        let restored = match op {
            HistoryOp::Undo => self.history.undo(live),
            HistoryOp::Redo => self.history.redo(live),
        };
        let Some(slice) = restored else {
            return DispatchResult::Rejected(match op {
                HistoryOp::Undo => Rejection::NothingToUndo,
                HistoryOp::Redo => Rejection::NothingToRedo,
            });
        };
        self.state.restore(slice);
        tracing::debug!(
            target: "zonekit.history",
            ?op,
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "history restored"
        );

        let mut follow_ups = 0;
        if let Some(hook) = self.restore_hook.clone() {
            let repairs = hook(&Ctx {
                state: &self.state,
                env,
            });
            for repair in repairs {
                follow_ups += 1;
                self.apply(env, &repair, 1, &mut follow_ups);
            }
        }
        DispatchResult::Applied {
            changed: true,
            follow_ups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        items: Vec<i32>,
        cursor: usize,
    }

    impl Snapshot for Doc {
        type Slice = Vec<i32>;

        fn snapshot(&self) -> Vec<i32> {
            self.items.clone()
        }

        fn restore(&mut self, slice: Vec<i32>) {
            self.items = slice;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Push(i32),
        PushTwice(i32),
        Move(usize),
        Locked,
        Loop,
        Unknown,
        Undo,
        Redo,
    }

    impl KernelCommand for Cmd {
        fn kind(&self) -> &str {
            match self {
                Self::Push(_) => "push",
                Self::PushTwice(_) => "push_twice",
                Self::Move(_) => "move",
                Self::Locked => "locked",
                Self::Loop => "loop",
                Self::Unknown => "unknown",
                Self::Undo => "history.undo",
                Self::Redo => "history.redo",
            }
        }

        fn history_op(&self) -> Option<HistoryOp> {
            match self {
                Self::Undo => Some(HistoryOp::Undo),
                Self::Redo => Some(HistoryOp::Redo),
                _ => None,
            }
        }
    }

    struct Env {
        locked: bool,
    }

    fn kernel() -> Kernel<Doc, Cmd, Env> {
        let mut k = Kernel::new(Doc {
            items: vec![],
            cursor: 0,
        });
        k.register(
            "push",
            Handler::infallible(|ctx: &Ctx<'_, Doc, Env>, cmd: &Cmd| {
                let Cmd::Push(n) = cmd else {
                    return Transition::unchanged();
                };
                let mut next = ctx.state.clone();
                next.items.push(*n);
                Transition::to(next).effect(Effect::clipboard(n.to_string(), None))
            }),
        );
        k.register(
            "push_twice",
            Handler::infallible(|_: &Ctx<'_, Doc, Env>, cmd: &Cmd| {
                let Cmd::PushTwice(n) = cmd else {
                    return Transition::unchanged();
                };
                Transition::unchanged().then(Cmd::Push(*n)).then(Cmd::Push(*n + 1))
            }),
        );
        k.register(
            "move",
            Handler::infallible(|ctx: &Ctx<'_, Doc, Env>, cmd: &Cmd| {
                let Cmd::Move(to) = cmd else {
                    return Transition::unchanged();
                };
                Transition::to(Doc {
                    cursor: *to,
                    ..ctx.state.clone()
                })
            }),
        );
        k.register(
            "locked",
            Handler::infallible(|_: &Ctx<'_, Doc, Env>, _: &Cmd| Transition::unchanged())
                .when(|ctx, _| !ctx.env.locked),
        );
        k.register(
            "loop",
            Handler::infallible(|_: &Ctx<'_, Doc, Env>, _: &Cmd| Transition::unchanged().then(Cmd::Loop)),
        );
        k
    }

    const ENV: Env = Env { locked: false };

    #[test]
    fn guard_rejection_is_observable() {
        let mut k = kernel();
        let result = k.dispatch(&Env { locked: true }, Cmd::Locked);
        assert_eq!(
            result,
            DispatchResult::Rejected(Rejection::GuardFailed {
                kind: "locked".into()
            })
        );
        assert!(k.dispatch(&ENV, Cmd::Locked).is_applied());
    }

    #[test]
    fn unhandled_kind_is_rejected() {
        let mut k = kernel();
        let result = k.dispatch(&ENV, Cmd::Unknown);
        assert!(matches!(
            result.rejection(),
            Some(Rejection::Unhandled { kind }) if kind == "unknown"
        ));
    }

    #[test]
    fn follow_ups_apply_in_order_as_one_step() {
        let mut k = kernel();
        let result = k.dispatch(&ENV, Cmd::PushTwice(1));
        assert_eq!(
            result,
            DispatchResult::Applied {
                changed: true,
                follow_ups: 2
            }
        );
        assert_eq!(k.state().items, vec![1, 2]);
        assert_eq!(k.history().undo_depth(), 1);
        assert_eq!(k.take_effects().len(), 2);
        assert!(k.take_effects().is_empty());

        k.dispatch(&ENV, Cmd::Undo);
        assert!(k.state().items.is_empty());
    }

    #[test]
    fn follow_up_depth_is_capped() {
        let mut k = kernel();
        let result = k.dispatch(&ENV, Cmd::Loop);
        assert_eq!(
            result,
            DispatchResult::Applied {
                changed: false,
                follow_ups: 16
            }
        );
    }

    #[test]
    fn every_forward_dispatch_clears_redo() {
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Push(7));
        k.dispatch(&ENV, Cmd::Undo);
        assert!(k.can_redo());

        // Cursor lives outside the slice but the step still lands in history.
        assert!(k.dispatch(&ENV, Cmd::Move(3)).changed());
        assert_eq!(k.history().undo_depth(), 1);
        assert!(!k.can_redo());
    }

    #[test]
    fn unchanged_dispatch_is_still_a_step() {
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Push(1));
        k.dispatch(&ENV, Cmd::Undo);
        assert!(!k.dispatch(&ENV, Cmd::Locked).changed());
        assert!(!k.can_redo());
        assert_eq!(k.history().undo_depth(), 1);
    }

    #[test]
    fn rejected_dispatch_leaves_history_alone() {
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Push(1));
        k.dispatch(&ENV, Cmd::Undo);
        assert!(k.dispatch(&ENV, Cmd::Unknown).is_rejected());
        assert!(k.can_redo());
    }

    #[test]
    fn undo_redo_round_trip_restores_slice_only() {
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Push(1));
        k.dispatch(&ENV, Cmd::Move(5));
        let after = k.state().clone();

        // Undoing the cursor move restores the same slice; the cursor stays.
        assert!(k.dispatch(&ENV, Cmd::Undo).changed());
        assert_eq!(k.state(), &after);
        assert!(k.dispatch(&ENV, Cmd::Undo).changed());
        assert!(k.state().items.is_empty());
        assert_eq!(k.state().cursor, 5);

        k.dispatch(&ENV, Cmd::Redo);
        assert!(k.dispatch(&ENV, Cmd::Redo).changed());
        assert_eq!(k.state(), &after);
    }

    #[test]
    fn empty_history_rejects() {
        let mut k = kernel();
        assert_eq!(
            k.dispatch(&ENV, Cmd::Undo),
            DispatchResult::Rejected(Rejection::NothingToUndo)
        );
        assert_eq!(
            k.dispatch(&ENV, Cmd::Redo),
            DispatchResult::Rejected(Rejection::NothingToRedo)
        );
    }

    #[test]
    fn restore_hook_runs_after_travel() {
        let mut k = kernel();
        k.on_restore(|_| vec![Cmd::Move(0)]);
        k.dispatch(&ENV, Cmd::Move(9));
        k.dispatch(&ENV, Cmd::Push(1));
        let result = k.dispatch(&ENV, Cmd::Undo);
        assert_eq!(
            result,
            DispatchResult::Applied {
                changed: true,
                follow_ups: 1
            }
        );
        assert_eq!(k.state().cursor, 0);
        // Repairs are not history steps.
        assert!(k.can_redo());
    }

    #[test]
    fn history_depth_follows_config() {
        let mut config = KernelConfig::default();
        config.history.max_depth = 2;
        let mut k = kernel();
        k.set_history_config(config.to_history_config());
        for n in 0..5 {
            k.dispatch(&ENV, Cmd::Push(n));
        }
        assert_eq!(k.history().undo_depth(), 2);
    }

    #[test]
    fn reset_clears_history_and_effects() {
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Push(1));
        k.reset(Doc {
            items: vec![42],
            cursor: 0,
        });
        assert!(!k.can_undo());
        assert!(k.take_effects().is_empty());
        assert_eq!(k.state().items, vec![42]);
    }

    #[test]
    fn counters_are_monotonic() {
        let before = dispatches_total();
        let rejected = rejections_total();
        let mut k = kernel();
        k.dispatch(&ENV, Cmd::Unknown);
        assert!(dispatches_total() > before);
        assert!(rejections_total() > rejected);
    }
}
