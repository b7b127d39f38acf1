#![forbid(unsafe_code)]

//! Effect descriptions and the effect runner.
//!
//! Reducers stay pure: anything that touches the outside world is described
//! as an [`Effect`] on the transition and executed after the state change has
//! committed. A failing effect never rolls the state back.
//!
//! - **Clipboard bridge**: [`Effect::ClipboardWrite`] mirrors copied items to
//!   the host clipboard. [`EffectRunner`] narrows on failure: rich write,
//!   then plain text, then a logged drop.
//! - **Tracing spans**: `effect.run` with `kind`, `outcome`, `duration_us`.
//! - **Metrics counters**: [`effects_executed_total`] and
//!   [`effects_dropped_total`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::Instant;

// ---------------------------------------------------------------------------
// Monotonic counters
// ---------------------------------------------------------------------------

static EFFECTS_EXECUTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static EFFECTS_DROPPED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total effects handed to a runner (monotonic counter).
#[must_use]
pub fn effects_executed_total() -> u64 {
    EFFECTS_EXECUTED_TOTAL.load(Ordering::Relaxed)
}

/// Total effects that failed every fallback (monotonic counter).
#[must_use]
pub fn effects_dropped_total() -> u64 {
    EFFECTS_DROPPED_TOTAL.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Effect descriptions
// ---------------------------------------------------------------------------

/// A side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Mirror content to the host clipboard.
    ClipboardWrite {
        /// Plain-text representation.
        text: String,
        /// Structured representation, if the host supports rich writes.
        json: Option<String>,
    },
}

impl Effect {
    /// A clipboard write.
    #[must_use]
    pub fn clipboard(text: impl Into<String>, json: Option<String>) -> Self {
        Self::ClipboardWrite {
            text: text.into(),
            json,
        }
    }

    /// Stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClipboardWrite { .. } => "clipboard.write",
        }
    }
}

/// Failure reported by a clipboard host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The host has no clipboard, or not this format.
    Unsupported,
    /// The host refused access.
    Denied,
    /// Any other host failure.
    Host(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "clipboard format not supported"),
            Self::Denied => write!(f, "clipboard access denied"),
            Self::Host(msg) => write!(f, "clipboard host error: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// The host's clipboard.
pub trait ClipboardHost {
    /// Write text plus a JSON representation.
    fn write_rich(&mut self, text: &str, json: &str) -> Result<(), ClipboardError>;

    /// Write plain text only.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// A host without a clipboard. Every write is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl ClipboardHost for NoClipboard {
    fn write_rich(&mut self, _text: &str, _json: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unsupported)
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}

/// In-memory clipboard for headless use and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    /// Last plain text written.
    pub text: Option<String>,
    /// Last JSON written.
    pub json: Option<String>,
    /// Reject rich writes.
    pub reject_rich: bool,
    /// Reject plain-text writes.
    pub reject_text: bool,
}

impl MemoryClipboard {
    /// Clipboard that only accepts plain text.
    #[must_use]
    pub fn text_only() -> Self {
        Self {
            reject_rich: true,
            ..Self::default()
        }
    }

    /// Clipboard that rejects every write.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            reject_rich: true,
            reject_text: true,
            ..Self::default()
        }
    }
}

impl ClipboardHost for MemoryClipboard {
    fn write_rich(&mut self, text: &str, json: &str) -> Result<(), ClipboardError> {
        if self.reject_rich {
            return Err(ClipboardError::Unsupported);
        }
        self.text = Some(text.to_string());
        self.json = Some(json.to_string());
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.reject_text {
            return Err(ClipboardError::Denied);
        }
        self.text = Some(text.to_string());
        self.json = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// What happened to one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectOutcome {
    /// Executed in full.
    Delivered,
    /// Executed through a narrower fallback (plain text instead of rich).
    Degraded,
    /// Every path failed; the effect was dropped.
    Dropped,
    /// Disabled by configuration.
    Skipped,
}

impl EffectOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Degraded => "degraded",
            Self::Dropped => "dropped",
            Self::Skipped => "skipped",
        }
    }
}

/// Executes effects against a host, owning the fallback policy.
#[derive(Debug)]
pub struct EffectRunner<H> {
    host: H,
    mirror_clipboard: bool,
}

impl<H: ClipboardHost> EffectRunner<H> {
    /// Runner that mirrors clipboard writes to `host`.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            host,
            mirror_clipboard: true,
        }
    }

    /// Enable or disable the host clipboard mirror.
    #[must_use]
    pub fn with_clipboard_mirror(mut self, enabled: bool) -> Self {
        self.mirror_clipboard = enabled;
        self
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Run every effect in order.
    pub fn run_all(&mut self, effects: impl IntoIterator<Item = Effect>) -> Vec<EffectOutcome> {
        effects.into_iter().map(|e| self.run(&e)).collect()
    }

    /// Run one effect. Never fails; failures are logged and counted.
    pub fn run(&mut self, effect: &Effect) -> EffectOutcome {
        EFFECTS_EXECUTED_TOTAL.fetch_add(1, Ordering::Relaxed);

        let start = Instant::now();
        let span = tracing::debug_span!(
            "effect.run",
            kind = effect.kind(),
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        let _guard = span.enter();

        let outcome = match effect {
            Effect::ClipboardWrite { text, json } => self.write_clipboard(text, json.as_deref()),
        };

        if outcome == EffectOutcome::Dropped {
            EFFECTS_DROPPED_TOTAL.fetch_add(1, Ordering::Relaxed);
        }
        let duration_us = start.elapsed().as_micros() as u64;
        span.record("outcome", outcome.as_str());
        span.record("duration_us", duration_us);
        tracing::debug!(
            target: "zonekit.effect",
            kind = effect.kind(),
            outcome = outcome.as_str(),
            duration_us,
            "effect completed"
        );
        outcome
    }

    fn write_clipboard(&mut self, text: &str, json: Option<&str>) -> EffectOutcome {
        if !self.mirror_clipboard {
            return EffectOutcome::Skipped;
        }

        if let Some(json) = json {
            match self.host.write_rich(text, json) {
                Ok(()) => return EffectOutcome::Delivered,
                Err(err) => {
                    tracing::debug!(target: "zonekit.effect", %err, "rich clipboard write failed, trying text");
                }
            }
        }

        match self.host.write_text(text) {
            Ok(()) if json.is_some() => EffectOutcome::Degraded,
            Ok(()) => EffectOutcome::Delivered,
            Err(err) => {
                tracing::warn!(target: "zonekit.effect", %err, "clipboard write dropped");
                EffectOutcome::Dropped
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
