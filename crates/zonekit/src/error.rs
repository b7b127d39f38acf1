#![forbid(unsafe_code)]

//! Unified error type for the facade.
//!
//! Reducers never fail: no-op conditions come back as unchanged state and
//! guard failures as [`DispatchResult::Rejected`](zonekit_runtime::DispatchResult).
//! What remains are setup-time failures (config, key strings, seed data) and
//! callers that want to turn a rejection into `?`.

use std::fmt;

use zonekit_core::KeyParseError;
use zonekit_runtime::{ClipboardError, ConfigError, Rejection};
use zonekit_zones::TreeError;

/// Top-level error type for zonekit hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// A binding string did not parse.
    KeyParse(KeyParseError),
    /// Seed data or a structural edit violated the tree invariants.
    Tree(TreeError),
    /// The host clipboard refused a write.
    Clipboard(ClipboardError),
    /// A dispatch was rejected.
    Rejected(Rejection),
    /// Clipboard or payload JSON failed to (de)serialize.
    Json(serde_json::Error),
}

/// Standard result type for zonekit APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::KeyParse(_) => "key_parse",
            Self::Tree(_) => "tree",
            Self::Clipboard(_) => "clipboard",
            Self::Rejected(_) => "rejected",
            Self::Json(_) => "json",
        }
    }

    /// Whether the host can keep going.
    ///
    /// Only configuration and binding failures are fatal; they happen at
    /// startup and mean the host is misconfigured.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::KeyParse(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::KeyParse(err) => write!(f, "key binding: {err}"),
            Self::Tree(err) => write!(f, "collection: {err}"),
            Self::Clipboard(err) => write!(f, "clipboard: {err}"),
            Self::Rejected(reason) => write!(f, "dispatch rejected: {reason}"),
            Self::Json(err) => write!(f, "json: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::KeyParse(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Clipboard(err) => Some(err),
            Self::Rejected(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<KeyParseError> for Error {
    fn from(err: KeyParseError) -> Self {
        Self::KeyParse(err)
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<ClipboardError> for Error {
    fn from(err: ClipboardError) -> Self {
        Self::Clipboard(err)
    }
}

impl From<Rejection> for Error {
    fn from(reason: Rejection) -> Self {
        Self::Rejected(reason)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn key_parse_is_fatal() {
        let err = Error::from(KeyParseError::Empty);
        assert_eq!(err.error_type(), "key_parse");
        assert!(!err.is_recoverable());
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn rejection_is_recoverable() {
        let err = Error::from(Rejection::NothingToUndo);
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "dispatch rejected: nothing to undo");
    }

    #[test]
    fn config_errors_wrap() {
        let err = Error::from(ConfigError::Invalid(vec!["bad".into()]));
        assert_eq!(err.error_type(), "config");
        assert!(err.to_string().starts_with("config:"));
    }

    #[test]
    fn tree_errors_convert_with_question_mark() {
        fn seed() -> Result<()> {
            Err(TreeError::NotFound(zonekit_zones::ItemId::from("x")))?;
            Ok(())
        }
        assert_eq!(seed().unwrap_err().error_type(), "tree");
    }
}
