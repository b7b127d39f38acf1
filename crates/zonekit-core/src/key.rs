#![forbid(unsafe_code)]

//! Canonical key chords.
//!
//! A [`KeyChord`] is the normalized `modifiers + key` pair used as the lookup
//! key of the keymap. Its string form always lists modifiers in the fixed order
//! `Meta+Ctrl+Alt+Shift+Key`, so `"shift+cmd+up"` and `"Meta+Shift+ArrowUp"`
//! name the same chord.
//!
//! # Normalization
//!
//! | Input | Canonical |
//! |-------|-----------|
//! | `Char('z')` / `Char('Z')` | `Z` (Shift kept only if it was held) |
//! | `Shift` + `Char('?')` | `?` (Shift implied by the symbol) |
//! | `Char(' ')` | `Space` |
//! | `Up` | `ArrowUp` |
//!
//! `Mod` in a binding string resolves per [`Platform`]: `Meta` on mac,
//! `Ctrl` everywhere else.

use std::fmt;
use std::str::FromStr;

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Host platform, used to resolve `Mod` and platform key synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// Apple platforms: `Mod` is Meta (Cmd).
    Mac,

    /// Everything else: `Mod` is Ctrl.
    #[default]
    Other,
}

impl Platform {
    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Mac
        } else {
            Self::Other
        }
    }

    /// The modifier `Mod` stands for on this platform.
    #[must_use]
    pub const fn command_modifier(self) -> Modifiers {
        match self {
            Self::Mac => Modifiers::META,
            Self::Other => Modifiers::CTRL,
        }
    }

    /// Parse from a config/env string (`mac`, `other`, `auto`).
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Some(Self::Mac),
            "other" | "linux" | "windows" | "win" | "pc" => Some(Self::Other),
            "auto" | "" => Some(Self::detect()),
            _ => None,
        }
    }
}

/// A normalized modifier + key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// Normalized key code.
    pub code: KeyCode,
}

impl KeyChord {
    /// Create an unmodified chord.
    #[must_use]
    pub fn new(code: KeyCode) -> Self {
        Self::with_modifiers(code, Modifiers::NONE)
    }

    /// Create a chord with modifiers, normalizing the key.
    #[must_use]
    pub fn with_modifiers(code: KeyCode, modifiers: Modifiers) -> Self {
        let (code, modifiers) = normalize(code, modifiers);
        Self { modifiers, code }
    }

    /// Canonical chord for a key event.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Self {
        Self::with_modifiers(event.code, event.modifiers)
    }

    /// Parse a binding string, resolving `Mod` for `platform`.
    pub fn parse(s: &str, platform: Platform) -> Result<Self, KeyParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let (mods_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(head) = s.strip_suffix("++") {
            (head, "+")
        } else {
            match s.rfind('+') {
                Some(idx) => (&s[..idx], &s[idx + 1..]),
                None => ("", s),
            }
        };

        let mut modifiers = Modifiers::NONE;
        if !mods_part.is_empty() {
            for token in mods_part.split('+') {
                modifiers |= parse_modifier(token, platform)?;
            }
        }

        let code = parse_key(key_part)?;
        Ok(Self::with_modifiers(code, modifiers))
    }

    /// The canonical string form (`Meta+Ctrl+Alt+Shift+Key`).
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Return the same key with different modifiers.
    #[must_use]
    pub fn remapped(self, code: KeyCode, modifiers: Modifiers) -> Self {
        Self::with_modifiers(code, modifiers)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ORDER: [(Modifiers, &str); 4] = [
            (Modifiers::META, "Meta"),
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
        ];
        for (flag, name) in ORDER {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        f.write_str(&key_name(self.code))
    }
}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, Platform::detect())
    }
}

/// Errors from parsing a binding string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The string (or its key part) was empty.
    Empty,
    /// A modifier token was not recognized.
    UnknownModifier(String),
    /// The key name was not recognized.
    UnknownKey(String),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key binding"),
            Self::UnknownModifier(m) => write!(f, "unknown modifier: {m}"),
            Self::UnknownKey(k) => write!(f, "unknown key: {k}"),
        }
    }
}

impl std::error::Error for KeyParseError {}

fn normalize(code: KeyCode, modifiers: Modifiers) -> (KeyCode, Modifiers) {
    match code {
        KeyCode::Char(c) if c.is_alphabetic() => {
            let lower = c.to_lowercase().next().unwrap_or(c);
            (KeyCode::Char(lower), modifiers)
        }
        KeyCode::Char(' ') => (code, modifiers),
        // Shifted symbols carry the shift in the character itself.
        KeyCode::Char(c) if !c.is_alphanumeric() => (code, modifiers - Modifiers::SHIFT),
        _ => (code, modifiers),
    }
}

fn parse_modifier(token: &str, platform: Platform) -> Result<Modifiers, KeyParseError> {
    match token.trim().to_ascii_lowercase().as_str() {
        "meta" | "cmd" | "command" | "super" | "win" => Ok(Modifiers::META),
        "ctrl" | "control" => Ok(Modifiers::CTRL),
        "alt" | "option" | "opt" => Ok(Modifiers::ALT),
        "shift" => Ok(Modifiers::SHIFT),
        "mod" => Ok(platform.command_modifier()),
        "" => Err(KeyParseError::Empty),
        other => Err(KeyParseError::UnknownModifier(other.to_string())),
    }
}

fn parse_key(name: &str) -> Result<KeyCode, KeyParseError> {
    if name.is_empty() {
        return Err(KeyParseError::Empty);
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "arrowup" | "up" => KeyCode::Up,
        "arrowdown" | "down" => KeyCode::Down,
        "arrowleft" | "left" => KeyCode::Left,
        "arrowright" | "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "enter" | "return" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Escape,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "space" | "spacebar" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        lower => {
            if let Some(n) = lower.strip_prefix('f')
                && let Ok(n) = n.parse::<u8>()
                && (1..=24).contains(&n)
            {
                KeyCode::F(n)
            } else {
                return Err(KeyParseError::UnknownKey(name.to_string()));
            }
        }
    };
    Ok(code)
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().collect(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Escape => "Escape".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::F(n) => format!("F{n}"),
    }
}
