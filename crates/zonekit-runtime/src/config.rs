#![forbid(unsafe_code)]

//! Kernel configuration as data.
//!
//! Captures the tunable behavior of the kernel and keyboard layer as a single
//! [`KernelConfig`] that can be loaded from TOML, JSON, or the environment.
//!
//! # Loading
//!
//! ```toml
//! # zonekit.toml
//! [history]
//! max_depth = 250
//!
//! [keyboard]
//! platform = "mac"
//! escape_clears_selection = false
//! ```
//!
//! ```rust,ignore
//! let config = KernelConfig::from_toml_file("zonekit.toml")?.validated();
//! let config = KernelConfig::default().with_env()?;
//! ```
//!
//! # Environment
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ZONEKIT_HISTORY_DEPTH` | `history.max_depth` |
//! | `ZONEKIT_PLATFORM` | `keyboard.platform` |
//! | `ZONEKIT_ESC_CLEARS_SELECTION` | `keyboard.escape_clears_selection` |
//! | `ZONEKIT_CLIPBOARD_MIRROR` | `clipboard.mirror_to_host` |

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use zonekit_core::key::Platform;

use crate::undo::HistoryConfig;

/// Accepted range for `history.max_depth`.
pub const HISTORY_DEPTH_RANGE: std::ops::RangeInclusive<usize> = 1..=10_000;
/// Accepted range for `dispatch.max_follow_up_depth`.
pub const FOLLOW_UP_DEPTH_RANGE: std::ops::RangeInclusive<usize> = 1..=64;

// ---------------------------------------------------------------------------
// Top-level KernelConfig
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct KernelConfig {
    /// Undo/redo window.
    pub history: HistorySection,
    /// Keyboard behavior.
    pub keyboard: KeyboardSection,
    /// Host clipboard bridge.
    pub clipboard: ClipboardSection,
    /// Dispatch limits.
    pub dispatch: DispatchSection,
}

/// `[history]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistorySection {
    /// Past entries retained.
    pub max_depth: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Platform selection for `Mod` and key synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum PlatformSetting {
    /// Detect from the compile target.
    #[default]
    Auto,
    /// Apple platforms.
    Mac,
    /// Everything else.
    Other,
}

impl PlatformSetting {
    /// Resolve to a concrete platform.
    #[must_use]
    pub const fn resolve(self) -> Platform {
        match self {
            Self::Auto => Platform::detect(),
            Self::Mac => Platform::Mac,
            Self::Other => Platform::Other,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            other => Platform::from_str_opt(other).map(|p| match p {
                Platform::Mac => Self::Mac,
                Platform::Other => Self::Other,
            }),
        }
    }
}

/// `[keyboard]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct KeyboardSection {
    /// Platform for `Mod` resolution and fallback remaps.
    pub platform: PlatformSetting,
    /// Escape clears a multi-selection when there is nothing to cancel or dismiss.
    pub escape_clears_selection: bool,
}

impl Default for KeyboardSection {
    fn default() -> Self {
        Self {
            platform: PlatformSetting::Auto,
            escape_clears_selection: true,
        }
    }
}

/// `[clipboard]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ClipboardSection {
    /// Copy and cut emit a host clipboard write.
    pub mirror_to_host: bool,
}

impl Default for ClipboardSection {
    fn default() -> Self {
        Self {
            mirror_to_host: true,
        }
    }
}

/// `[dispatch]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DispatchSection {
    /// Maximum nesting of follow-up commands.
    pub max_follow_up_depth: usize,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            max_follow_up_depth: 16,
        }
    }
}

impl KernelConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        if let Some(v) = lookup("ZONEKIT_HISTORY_DEPTH") {
            match v.trim().parse::<usize>() {
                Ok(depth) => self.history.max_depth = depth,
                Err(_) => errors.push(format!("ZONEKIT_HISTORY_DEPTH is not a number: {v:?}")),
            }
        }
        if let Some(v) = lookup("ZONEKIT_PLATFORM") {
            match PlatformSetting::parse(&v) {
                Some(p) => self.keyboard.platform = p,
                None => errors.push(format!("ZONEKIT_PLATFORM must be auto, mac or other: {v:?}")),
            }
        }
        if let Some(v) = lookup("ZONEKIT_ESC_CLEARS_SELECTION") {
            match parse_bool(&v) {
                Some(b) => self.keyboard.escape_clears_selection = b,
                None => errors.push(format!("ZONEKIT_ESC_CLEARS_SELECTION is not a boolean: {v:?}")),
            }
        }
        if let Some(v) = lookup("ZONEKIT_CLIPBOARD_MIRROR") {
            match parse_bool(&v) {
                Some(b) => self.clipboard.mirror_to_host = b,
                None => errors.push(format!("ZONEKIT_CLIPBOARD_MIRROR is not a boolean: {v:?}")),
            }
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Check every parameter is in range.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !HISTORY_DEPTH_RANGE.contains(&self.history.max_depth) {
            errors.push(format!(
                "history.max_depth must be in {HISTORY_DEPTH_RANGE:?}, got {}",
                self.history.max_depth
            ));
        }
        if !FOLLOW_UP_DEPTH_RANGE.contains(&self.dispatch.max_follow_up_depth) {
            errors.push(format!(
                "dispatch.max_follow_up_depth must be in {FOLLOW_UP_DEPTH_RANGE:?}, got {}",
                self.dispatch.max_follow_up_depth
            ));
        }
        errors
    }

    /// Clamp out-of-range parameters, logging each adjustment.
    #[must_use]
    pub fn validated(mut self) -> Self {
        for problem in self.validate() {
            tracing::warn!(target: "zonekit.kernel", %problem, "config value clamped");
        }
        self.history.max_depth = self
            .history
            .max_depth
            .clamp(*HISTORY_DEPTH_RANGE.start(), *HISTORY_DEPTH_RANGE.end());
        self.dispatch.max_follow_up_depth = self
            .dispatch
            .max_follow_up_depth
            .clamp(*FOLLOW_UP_DEPTH_RANGE.start(), *FOLLOW_UP_DEPTH_RANGE.end());
        self
    }

    /// Build a [`HistoryConfig`].
    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history.max_depth)
    }

    /// Resolved platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.keyboard.platform.resolve()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Values that could not be applied.
    Invalid(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid configuration: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
