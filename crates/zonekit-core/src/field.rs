#![forbid(unsafe_code)]

//! Editable fields: registration, edit sessions, and grapheme-aware buffers.
//!
//! A field is any focus target that edits text (an inline rename box, a
//! search input, a multiline note). Fields decide which keys they consume,
//! so the classifier asks the [`FieldRegistry`] before it ever looks at the
//! keymap.
//!
//! # Modes
//!
//! | Mode | Editing while focused | Enter | Escape |
//! |------|-----------------------|-------|--------|
//! | [`FieldMode::Immediate`] | always | commit (stays editing) | revert to last commit |
//! | [`FieldMode::Deferred`] | only inside a session | starts a session, then commits | revert and end session |
//!
//! # Invariants
//!
//! - The buffer cursor is always a byte offset on a grapheme boundary.
//! - A deferred field has an active session iff `session_origin` is `Some`.
//! - Cancel restores exactly the text the session started with.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Identifier of a registered field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub String);

impl FieldId {
    /// Create a field id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When a field consumes editing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldMode {
    /// Consume editing keys whenever focused.
    #[default]
    Immediate,
    /// Consume editing keys only during an explicit edit session.
    Deferred,
}

/// Cursor movements a field traps without dispatching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMove {
    /// One grapheme left.
    Left,
    /// One grapheme right.
    Right,
    /// Start of the current line.
    Home,
    /// End of the current line.
    End,
    /// Same column on the previous line (multiline only).
    Up,
    /// Same column on the next line (multiline only).
    Down,
}

/// What a classified FIELD intent asks the field router to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    /// Begin a deferred edit session.
    StartEdit,
    /// Commit the current value.
    Commit,
    /// Revert and leave the session.
    Cancel,
    /// Insert typed text.
    Insert(char),
    /// Insert a line break (multiline fields).
    InsertNewline,
    /// Delete the grapheme before the cursor.
    DeleteBackward,
    /// Delete the grapheme after the cursor.
    DeleteForward,
    /// Move the cursor.
    Cursor(CursorMove),
    /// Swallow the key without touching the buffer (IME composition).
    Trap,
}

/// Factory producing the command a commit dispatches.
pub type CommitFactory<C> = Arc<dyn Fn(&FieldId, &str) -> C + Send + Sync>;

/// Static configuration of a field.
pub struct FieldConfig<C> {
    /// Editing mode.
    pub mode: FieldMode,
    /// Whether Enter inserts newlines and vertical arrows move the cursor.
    pub multiline: bool,
    /// Command dispatched when the field commits.
    pub on_commit: Option<CommitFactory<C>>,
}

impl<C> Clone for FieldConfig<C> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            multiline: self.multiline,
            on_commit: self.on_commit.clone(),
        }
    }
}

impl<C> fmt::Debug for FieldConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("mode", &self.mode)
            .field("multiline", &self.multiline)
            .field("on_commit", &self.on_commit.is_some())
            .finish()
    }
}

impl<C> Default for FieldConfig<C> {
    fn default() -> Self {
        Self {
            mode: FieldMode::Immediate,
            multiline: false,
            on_commit: None,
        }
    }
}

impl<C> FieldConfig<C> {
    /// An immediate-mode single-line field.
    #[must_use]
    pub fn immediate() -> Self {
        Self::default()
    }

    /// A deferred-mode single-line field.
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            mode: FieldMode::Deferred,
            ..Self::default()
        }
    }

    /// Make the field multiline.
    #[must_use]
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Set the commit command factory.
    #[must_use]
    pub fn on_commit(mut self, f: impl Fn(&FieldId, &str) -> C + Send + Sync + 'static) -> Self {
        self.on_commit = Some(Arc::new(f));
        self
    }
}

/// Text buffer with a grapheme-aligned cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBuffer {
    text: String,
    cursor: usize,
}

impl FieldBuffer {
    /// Create a buffer with the cursor at the end.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor byte offset.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Insert text at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the grapheme before the cursor. Returns false at the start.
    pub fn delete_backward(&mut self) -> bool {
        let Some(len) = self.prev_grapheme_len() else {
            return false;
        };
        let start = self.cursor - len;
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Delete the grapheme after the cursor. Returns false at the end.
    pub fn delete_forward(&mut self) -> bool {
        let Some(len) = self.next_grapheme_len() else {
            return false;
        };
        self.text.replace_range(self.cursor..self.cursor + len, "");
        true
    }

    /// Move the cursor. Returns false when it could not move.
    pub fn move_cursor(&mut self, movement: CursorMove) -> bool {
        let before = self.cursor;
        match movement {
            CursorMove::Left => {
                if let Some(len) = self.prev_grapheme_len() {
                    self.cursor -= len;
                }
            }
            CursorMove::Right => {
                if let Some(len) = self.next_grapheme_len() {
                    self.cursor += len;
                }
            }
            CursorMove::Home => self.cursor = self.line_start(self.cursor),
            CursorMove::End => self.cursor = self.line_end(self.cursor),
            CursorMove::Up => self.move_vertical(false),
            CursorMove::Down => self.move_vertical(true),
        }
        self.cursor != before
    }

    fn prev_grapheme_len(&self) -> Option<usize> {
        self.text[..self.cursor]
            .graphemes(true)
            .next_back()
            .map(str::len)
    }

    fn next_grapheme_len(&self) -> Option<usize> {
        self.text[self.cursor..].graphemes(true).next().map(str::len)
    }

    fn line_start(&self, at: usize) -> usize {
        self.text[..at].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, at: usize) -> usize {
        self.text[at..].find('\n').map_or(self.text.len(), |i| at + i)
    }

    fn move_vertical(&mut self, down: bool) {
        let start = self.line_start(self.cursor);
        let column = self.text[start..self.cursor].graphemes(true).count();
        let target_start = if down {
            let end = self.line_end(self.cursor);
            if end >= self.text.len() {
                return;
            }
            end + 1
        } else {
            if start == 0 {
                return;
            }
            self.line_start(start - 1)
        };
        let target_end = self.line_end(target_start);
        let offset: usize = self.text[target_start..target_end]
            .graphemes(true)
            .take(column)
            .map(str::len)
            .sum();
        self.cursor = target_start + offset;
    }
}

/// A registered field: its config, buffer, and session state.
pub struct FieldState<C> {
    config: FieldConfig<C>,
    buffer: FieldBuffer,
    committed: String,
    session_origin: Option<String>,
}

impl<C> fmt::Debug for FieldState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("config", &self.config)
            .field("buffer", &self.buffer)
            .field("editing", &self.is_editing())
            .finish()
    }
}

impl<C> FieldState<C> {
    fn new(config: FieldConfig<C>, initial: String) -> Self {
        Self {
            config,
            buffer: FieldBuffer::new(initial.clone()),
            committed: initial,
            session_origin: None,
        }
    }

    /// Field configuration.
    #[must_use]
    pub fn config(&self) -> &FieldConfig<C> {
        &self.config
    }

    /// Current buffer.
    #[must_use]
    pub fn buffer(&self) -> &FieldBuffer {
        &self.buffer
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> &str {
        self.buffer.text()
    }

    /// Whether the field currently consumes editing keys.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        match self.config.mode {
            FieldMode::Immediate => true,
            FieldMode::Deferred => self.session_origin.is_some(),
        }
    }
}

/// Result of applying a [`FieldAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome<C> {
    /// A deferred session began.
    Started,
    /// The value was committed; `command` is the field's commit command.
    Committed {
        /// Committed text.
        value: String,
        /// Command to dispatch, if the field declares one.
        command: Option<C>,
    },
    /// The edit was reverted.
    Cancelled,
    /// The buffer text changed.
    Edited,
    /// The cursor moved (or was held at a boundary).
    CursorMoved,
    /// The key was swallowed with no effect.
    Trapped,
    /// The field is not registered.
    Unknown,
}

/// Registry of editable fields.
pub struct FieldRegistry<C> {
    fields: AHashMap<FieldId, FieldState<C>>,
}

impl<C> fmt::Debug for FieldRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl<C> Default for FieldRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FieldRegistry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: AHashMap::new(),
        }
    }

    /// Register (or replace) a field with an initial value.
    pub fn register(&mut self, id: FieldId, config: FieldConfig<C>, initial: impl Into<String>) {
        tracing::debug!(target: "zonekit.keyboard", field = %id, mode = ?config.mode, "field registered");
        self.fields.insert(id, FieldState::new(config, initial.into()));
    }

    /// Remove a field. Returns true if it existed.
    pub fn unregister(&mut self, id: &FieldId) -> bool {
        self.fields.remove(id).is_some()
    }

    /// Drop every field.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, id: &FieldId) -> Option<&FieldState<C>> {
        self.fields.get(id)
    }

    /// Number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the field exists and is consuming editing keys.
    #[must_use]
    pub fn is_editing(&self, id: &FieldId) -> bool {
        self.fields.get(id).is_some_and(FieldState::is_editing)
    }

    /// Replace a field's value from outside (e.g. after an undo).
    pub fn set_value(&mut self, id: &FieldId, value: impl Into<String>) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        let value = value.into();
        field.buffer.set_text(value.clone());
        field.committed = value;
        true
    }
}

impl<C: Clone> FieldRegistry<C> {
    /// Apply an action to a field.
    pub fn apply(&mut self, id: &FieldId, action: &FieldAction) -> FieldOutcome<C> {
        let Some(field) = self.fields.get_mut(id) else {
            return FieldOutcome::Unknown;
        };

        let outcome = match action {
            FieldAction::StartEdit => {
                if field.session_origin.is_none() {
                    field.session_origin = Some(field.buffer.text().to_string());
                    field.buffer.move_cursor(CursorMove::End);
                }
                FieldOutcome::Started
            }
            FieldAction::Commit => {
                let value = field.buffer.text().to_string();
                field.committed = value.clone();
                field.session_origin = None;
                let command = field.config.on_commit.as_ref().map(|f| f(id, &value));
                FieldOutcome::Committed { value, command }
            }
            FieldAction::Cancel => {
                let restore = field
                    .session_origin
                    .take()
                    .unwrap_or_else(|| field.committed.clone());
                field.buffer.set_text(restore);
                FieldOutcome::Cancelled
            }
            FieldAction::Insert(c) => {
                let mut tmp = [0u8; 4];
                field.buffer.insert_str(c.encode_utf8(&mut tmp));
                FieldOutcome::Edited
            }
            FieldAction::InsertNewline => {
                field.buffer.insert_str("\n");
                FieldOutcome::Edited
            }
            FieldAction::DeleteBackward => {
                if field.buffer.delete_backward() {
                    FieldOutcome::Edited
                } else {
                    FieldOutcome::Trapped
                }
            }
            FieldAction::DeleteForward => {
                if field.buffer.delete_forward() {
                    FieldOutcome::Edited
                } else {
                    FieldOutcome::Trapped
                }
            }
            FieldAction::Cursor(movement) => {
                field.buffer.move_cursor(*movement);
                FieldOutcome::CursorMoved
            }
            FieldAction::Trap => FieldOutcome::Trapped,
        };

        tracing::trace!(target: "zonekit.keyboard", field = %id, ?action, "field action applied");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_backspace_removes_whole_grapheme() {
        // "e" + combining acute accent is one grapheme.
        let mut buf = FieldBuffer::new("cafe\u{301}");
        assert!(buf.delete_backward());
        assert_eq!(buf.text(), "caf");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn buffer_cursor_moves_stop_at_edges() {
        let mut buf = FieldBuffer::new("ab");
        assert!(!buf.move_cursor(CursorMove::Right));
        assert!(buf.move_cursor(CursorMove::Home));
        assert_eq!(buf.cursor(), 0);
        assert!(!buf.move_cursor(CursorMove::Left));
        assert!(!buf.delete_backward());
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "b");
    }

    #[test]
    fn buffer_vertical_moves_keep_column() {
        let mut buf = FieldBuffer::new("abcd\nxy\nlonger");
        // cursor at end of "longer" (column 6)
        assert!(buf.move_cursor(CursorMove::Up));
        // "xy" only has 2 columns
        assert_eq!(buf.cursor(), "abcd\nxy".len());
        assert!(buf.move_cursor(CursorMove::Up));
        assert_eq!(buf.cursor(), 2);
        assert!(!buf.move_cursor(CursorMove::Up));
        assert!(buf.move_cursor(CursorMove::Down));
        assert_eq!(buf.cursor(), "abcd\nxy".len());
    }

    #[test]
    fn deferred_session_cancel_restores_origin() {
        let mut reg: FieldRegistry<String> = FieldRegistry::new();
        let id = FieldId::from("title");
        reg.register(id.clone(), FieldConfig::deferred(), "draft");

        assert!(!reg.is_editing(&id));
        assert_eq!(reg.apply(&id, &FieldAction::StartEdit), FieldOutcome::Started);
        assert!(reg.is_editing(&id));

        reg.apply(&id, &FieldAction::Insert('!'));
        assert_eq!(reg.get(&id).unwrap().value(), "draft!");

        assert_eq!(reg.apply(&id, &FieldAction::Cancel), FieldOutcome::Cancelled);
        assert_eq!(reg.get(&id).unwrap().value(), "draft");
        assert!(!reg.is_editing(&id));
    }

    #[test]
    fn commit_invokes_factory() {
        let mut reg: FieldRegistry<String> = FieldRegistry::new();
        let id = FieldId::from("search");
        reg.register(
            id.clone(),
            FieldConfig::immediate().on_commit(|id, value| format!("{id}={value}")),
            "",
        );
        reg.apply(&id, &FieldAction::Insert('h'));
        reg.apply(&id, &FieldAction::Insert('i'));

        let outcome = reg.apply(&id, &FieldAction::Commit);
        assert_eq!(
            outcome,
            FieldOutcome::Committed {
                value: "hi".to_string(),
                command: Some("search=hi".to_string()),
            }
        );
        // Immediate fields keep editing after commit.
        assert!(reg.is_editing(&id));
    }

    #[test]
    fn immediate_cancel_reverts_to_last_commit() {
        let mut reg: FieldRegistry<()> = FieldRegistry::new();
        let id = FieldId::from("q");
        reg.register(id.clone(), FieldConfig::immediate(), "one");
        reg.apply(&id, &FieldAction::Insert('!'));
        reg.apply(&id, &FieldAction::Cancel);
        assert_eq!(reg.get(&id).unwrap().value(), "one");
    }

    #[test]
    fn unknown_field() {
        let mut reg: FieldRegistry<()> = FieldRegistry::new();
        assert_eq!(
            reg.apply(&FieldId::from("nope"), &FieldAction::Commit),
            FieldOutcome::Unknown
        );
    }

    #[test]
    fn reset_and_set_value() {
        let mut reg: FieldRegistry<()> = FieldRegistry::new();
        let id = FieldId::from("a");
        reg.register(id.clone(), FieldConfig::deferred(), "x");
        assert!(reg.set_value(&id, "y"));
        assert_eq!(reg.get(&id).unwrap().value(), "y");
        reg.reset();
        assert!(reg.is_empty());
        assert!(!reg.set_value(&id, "z"));
    }
}
