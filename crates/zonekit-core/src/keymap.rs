#![forbid(unsafe_code)]

//! Keybinding registry.
//!
//! A flat `chord -> [binding]` table. Several bindings may share a chord; the
//! resolver picks one based on the current [`ResolveContext`].
//!
//! # Resolution Order
//!
//! | Priority | Candidate |
//! |----------|-----------|
//! | 1 | first-registered binding whose `when` matches the current mode |
//! | 2 | first-registered unconditional binding |
//!
//! Candidates whose `scope` zone is not on the focus path are ignored.
//! `Navigating` bindings are also ignored while the focused field actively
//! consumes the key, which is how inline fields release specific keys to
//! zone navigation without leaking others.
//!
//! # Lifecycle
//!
//! [`Keymap::register`] returns a [`BindingId`]; pass it to
//! [`Keymap::unregister`] to remove exactly that binding. Groups registered
//! together come back as a [`BindingGroup`] that can be removed at once,
//! which lets applications layer shortcuts over the defaults and peel them
//! off again on unmount.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::key::{KeyChord, KeyParseError, Platform};

/// Which input mode a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingContext {
    /// Only while nothing is being edited.
    Navigating,
    /// Only while a field or item edit is active.
    Editing,
}

/// Current input mode, as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyMode {
    /// Moving between items.
    #[default]
    Navigating,
    /// Editing a field or an item.
    Editing,
}

impl KeyMode {
    const fn matches(self, ctx: BindingContext) -> bool {
        matches!(
            (self, ctx),
            (Self::Navigating, BindingContext::Navigating) | (Self::Editing, BindingContext::Editing)
        )
    }
}

/// Context the resolver evaluates bindings against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// Navigating or editing.
    pub mode: KeyMode,
    /// The focused field actively consumes this key.
    pub field_consumes: bool,
    /// Active zone followed by its ancestors.
    pub focus_path: Vec<String>,
}

impl ResolveContext {
    /// A navigating context inside `zone`.
    #[must_use]
    pub fn navigating() -> Self {
        Self::default()
    }

    /// An editing context.
    #[must_use]
    pub fn editing() -> Self {
        Self {
            mode: KeyMode::Editing,
            ..Self::default()
        }
    }

    /// Set the focus path (active zone first).
    #[must_use]
    pub fn with_focus_path(mut self, path: Vec<String>) -> Self {
        self.focus_path = path;
        self
    }

    /// The active zone, if any.
    #[must_use]
    pub fn active_zone(&self) -> Option<&str> {
        self.focus_path.first().map(String::as_str)
    }
}

/// Produces the command a binding dispatches.
pub type CommandFactory<C> = Arc<dyn Fn() -> C + Send + Sync>;

/// A single key binding.
pub struct Binding<C> {
    /// Canonical chord.
    pub chord: KeyChord,
    /// Optional mode guard.
    pub when: Option<BindingContext>,
    /// Optional zone scope.
    pub scope: Option<String>,
    /// Human-readable label for help overlays.
    pub label: Option<String>,
    factory: CommandFactory<C>,
}

impl<C> Clone for Binding<C> {
    fn clone(&self) -> Self {
        Self {
            chord: self.chord,
            when: self.when,
            scope: self.scope.clone(),
            label: self.label.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<C> fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("chord", &self.chord.canonical())
            .field("when", &self.when)
            .field("scope", &self.scope)
            .field("label", &self.label)
            .finish()
    }
}

impl<C> Binding<C> {
    /// Bind a chord to a factory closure.
    pub fn with_factory(chord: KeyChord, factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self {
            chord,
            when: None,
            scope: None,
            label: None,
            factory: Arc::new(factory),
        }
    }

    /// Bind a chord to a factory plus static arguments captured now.
    pub fn with_args<A>(chord: KeyChord, args: A, factory: fn(&A) -> C) -> Self
    where
        A: Send + Sync + 'static,
        C: 'static,
    {
        Self::with_factory(chord, move || factory(&args))
    }

    /// Restrict to a mode.
    #[must_use]
    pub fn when(mut self, ctx: BindingContext) -> Self {
        self.when = Some(ctx);
        self
    }

    /// Restrict to a zone (and its descendants on the focus path).
    #[must_use]
    pub fn scoped(mut self, zone: impl Into<String>) -> Self {
        self.scope = Some(zone.into());
        self
    }

    /// Attach a label.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Produce the bound command.
    #[must_use]
    pub fn command(&self) -> C {
        (self.factory)()
    }

    fn in_scope(&self, ctx: &ResolveContext) -> bool {
        self.scope
            .as_ref()
            .is_none_or(|scope| ctx.focus_path.iter().any(|z| z == scope))
    }
}

impl<C: Clone + Send + Sync + 'static> Binding<C> {
    /// Bind a chord to a fixed command.
    pub fn new(chord: KeyChord, command: C) -> Self {
        Self::with_factory(chord, move || command.clone())
    }
}

/// Handle for one registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

/// Handles for bindings registered together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingGroup(Vec<BindingId>);

impl BindingGroup {
    /// Ids in registration order.
    #[must_use]
    pub fn ids(&self) -> &[BindingId] {
        &self.0
    }

    /// Number of bindings in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Entry<C> {
    id: BindingId,
    binding: Binding<C>,
}

/// The keybinding registry.
pub struct Keymap<C> {
    table: AHashMap<KeyChord, Vec<Entry<C>>>,
    next_id: u64,
    platform: Platform,
}

impl<C> fmt::Debug for Keymap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keymap")
            .field("chords", &self.table.len())
            .field("bindings", &self.len())
            .field("platform", &self.platform)
            .finish()
    }
}

impl<C> Default for Keymap<C> {
    fn default() -> Self {
        Self::new(Platform::detect())
    }
}

impl<C> Keymap<C> {
    /// Create an empty keymap for a platform.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            table: AHashMap::new(),
            next_id: 1,
            platform,
        }
    }

    /// Platform used to parse `Mod` in binding strings.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Parse a binding string with this keymap's platform.
    pub fn chord(&self, key: &str) -> Result<KeyChord, KeyParseError> {
        KeyChord::parse(key, self.platform)
    }

    /// Register a binding.
    pub fn register(&mut self, binding: Binding<C>) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            target: "zonekit.keyboard",
            chord = %binding.chord,
            when = ?binding.when,
            scope = binding.scope.as_deref(),
            id = id.0,
            "binding registered"
        );
        self.table
            .entry(binding.chord)
            .or_default()
            .push(Entry { id, binding });
        id
    }

    /// Register several bindings at once.
    pub fn register_all(&mut self, bindings: impl IntoIterator<Item = Binding<C>>) -> BindingGroup {
        BindingGroup(bindings.into_iter().map(|b| self.register(b)).collect())
    }

    /// Remove one binding. Returns false if it was already gone.
    pub fn unregister(&mut self, id: BindingId) -> bool {
        let mut removed = false;
        self.table.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|e| e.id != id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });
        removed
    }

    /// Remove every binding in a group. Returns how many were removed.
    pub fn unregister_all(&mut self, group: &BindingGroup) -> usize {
        group.ids().iter().filter(|id| self.unregister(**id)).count()
    }

    /// Drop all bindings.
    pub fn reset(&mut self) {
        self.table.clear();
    }

    /// Total bindings registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Whether no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether any binding exists for the chord (regardless of context).
    #[must_use]
    pub fn has_bindings(&self, chord: &KeyChord) -> bool {
        self.table.contains_key(chord)
    }

    /// All bindings for a chord in registration order.
    pub fn bindings_for(&self, chord: &KeyChord) -> impl Iterator<Item = &Binding<C>> {
        self.table
            .get(chord)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|e| &e.binding))
    }

    /// Resolve a chord in a context.
    #[must_use]
    pub fn resolve(&self, chord: &KeyChord, ctx: &ResolveContext) -> Option<&Binding<C>> {
        let entries = self.table.get(chord)?;
        let mut fallback = None;
        for entry in entries {
            let binding = &entry.binding;
            if !binding.in_scope(ctx) {
                continue;
            }
            match binding.when {
                Some(BindingContext::Navigating) if ctx.field_consumes => {}
                Some(when) if ctx.mode.matches(when) => return Some(binding),
                Some(_) => {}
                None => {
                    if fallback.is_none() {
                        fallback = Some(binding);
                    }
                }
            }
        }
        fallback
    }
}
