#![forbid(unsafe_code)]

//! The interaction facade: registries, kernel, keyboard pipeline, and effects.
//!
//! # Flow
//!
//! ```text
//! KeyEvent ─▶ Pipeline::route ─▶ Command ─┐
//! PointerEvent ─▶ select / activate ──────┼─▶ Kernel::dispatch ─▶ AppState
//! NativeAction ─▶ copy / cut / paste ─────┘          │
//!                                                    └─▶ effects ─▶ EffectRunner ─▶ host clipboard
//! ```
//!
//! [`Interaction`] owns everything explicitly: no registry is global, and
//! [`Interaction::reset`] restores a clean fixture for tests.

use zonekit_core::{
    Binding, BindingId, FieldConfig, FieldId, FieldOutcome, FocusTarget, KeyEvent, KeyEventKind, KeyMode, Modifiers,
    NativeAction, Pipeline, Platform, PointerEvent, PointerKind, ResolveContext, Routed,
};
use zonekit_runtime::{
    ClipboardHost, Ctx, DispatchResult, EffectOutcome, EffectRunner, Handler, Kernel, KernelCommand, KernelConfig,
    MemoryClipboard, Rejection, Transition,
};
use zonekit_zones::{
    Attrs, ClipboardEntry, Collection, CollectionConfig, CollectionEnv, CollectionOutcome, CollectionRegistry,
    FocusZoneState, ItemId, ItemProps, Role, SelectOp, ZoneAction, ZoneCommand, ZoneConfig, ZoneId, ZoneOptions,
    ZoneRegistry, compute_container_props, compute_item, reduce_collection, reduce_zone,
};

use crate::command::{COLLECTION_KINDS, Command, ZONE_KINDS};
use crate::error::Result;
use crate::keymap::install_default_keymap;
use crate::state::{AppState, Collections};

/// Zone config over the facade's data and command types.
pub type AppZone = ZoneConfig<Collections, Command>;

/// Application handler over the facade's types.
pub type AppHandler = Handler<AppState, Command, Env>;

/// Read-only collaborators handed to every handler.
#[derive(Debug, Default)]
pub struct Env {
    /// Registered zones.
    pub zones: ZoneRegistry<Collections, Command>,
    /// Collection behavior per collection zone.
    pub collections: CollectionRegistry,
    /// Zone reducer options.
    pub options: ZoneOptions,
    /// Copy and cut emit host clipboard writes.
    pub mirror: bool,
}

/// What happened to a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host should suppress its default handling.
    pub prevent_default: bool,
    /// Result of the dispatch the key caused, if any.
    pub dispatched: Option<DispatchResult>,
}

impl KeyOutcome {
    fn pass() -> Self {
        Self {
            prevent_default: false,
            dispatched: None,
        }
    }
}

/// Headless interaction kernel for one UI.
pub struct Interaction<H = MemoryClipboard> {
    kernel: Kernel<AppState, Command, Env>,
    env: Env,
    pipeline: Pipeline<Command>,
    effects: EffectRunner<H>,
}

impl<H> std::fmt::Debug for Interaction<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("kernel", &self.kernel)
            .field("env", &self.env)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl Interaction<MemoryClipboard> {
    /// Default configuration with an in-memory clipboard.
    pub fn headless() -> Result<Self> {
        Self::with_config(&KernelConfig::default(), MemoryClipboard::default())
    }
}

impl<H: ClipboardHost> Interaction<H> {
    /// Default configuration.
    pub fn new(host: H) -> Result<Self> {
        Self::with_config(&KernelConfig::default(), host)
    }

    /// Build from a configuration, installing the default keymap.
    pub fn with_config(config: &KernelConfig, host: H) -> Result<Self> {
        let platform = config.platform();
        let mut kernel = Kernel::with_config(AppState::new(), config);
        install_core_handlers(&mut kernel);

        let mut pipeline = Pipeline::new(platform);
        install_default_keymap(pipeline.keymap_mut())?;

        tracing::debug!(
            target: "zonekit.kernel",
            ?platform,
            history_depth = config.history.max_depth,
            mirror = config.clipboard.mirror_to_host,
            "interaction created"
        );
        Ok(Self {
            kernel,
            env: Env {
                zones: ZoneRegistry::new(),
                collections: CollectionRegistry::new(),
                options: ZoneOptions {
                    escape_clears_selection: config.keyboard.escape_clears_selection,
                },
                mirror: config.clipboard.mirror_to_host,
            },
            pipeline,
            effects: EffectRunner::new(host).with_clipboard_mirror(config.clipboard.mirror_to_host),
        })
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn state(&self) -> &AppState {
        self.kernel.state()
    }

    /// Focus state of one zone (default when never touched).
    #[must_use]
    pub fn zone_state(&self, zone: &ZoneId) -> FocusZoneState {
        self.kernel.state().focus.zone_or_default(zone)
    }

    /// The active zone.
    #[must_use]
    pub fn active_zone(&self) -> Option<&ZoneId> {
        self.kernel.state().focus.active_zone.as_ref()
    }

    #[must_use]
    pub fn collection(&self, zone: &ZoneId) -> Option<&Collection> {
        self.kernel.state().collection(zone)
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.kernel.state().clipboard.as_ref()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.kernel.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.kernel.can_redo()
    }

    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    #[must_use]
    pub fn kernel(&self) -> &Kernel<AppState, Command, Env> {
        &self.kernel
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline<Command> {
        &self.pipeline
    }

    /// Keymap and field registry, for custom bindings.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline<Command> {
        &mut self.pipeline
    }

    /// The clipboard host.
    #[must_use]
    pub fn host(&self) -> &H {
        self.effects.host()
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.pipeline.keymap().platform()
    }

    // ====================================================================
    // Registration
    // ====================================================================

    /// Register a zone. Replaces (and returns) a zone with the same id.
    pub fn register_zone(&mut self, zone: AppZone) -> Option<AppZone> {
        self.env.zones.register(zone)
    }

    /// Unregister a zone and drop its focus state and collection, including
    /// the copies held by undo history.
    pub fn unregister_zone(&mut self, zone: &ZoneId) -> bool {
        let removed = self.env.zones.unregister(zone).is_some();
        self.env.collections.unregister(zone);
        let state = self.kernel.state();
        let next = AppState {
            data: state.data.without(zone),
            focus: state.focus.without_zone(zone),
            clipboard: state.clipboard.clone(),
        };
        self.kernel.replace_state(next);
        self.kernel.rewrite_history(|slice| {
            slice.remove(zone);
        });
        removed
    }

    /// Register a collection zone with the role's preset behavior.
    pub fn register_collection(&mut self, config: CollectionConfig, role: Role, collection: Collection) {
        let zone = config.zone(role);
        self.register_collection_zone(config, zone, collection);
    }

    /// Register a collection with a customized zone (built from [`CollectionConfig::zone`]).
    pub fn register_collection_zone(&mut self, config: CollectionConfig, zone: AppZone, collection: Collection) {
        let id = config.id.clone();
        debug_assert_eq!(zone.id, id, "collection and zone ids differ");
        tracing::debug!(target: "zonekit.collection", zone = %id, items = collection.len(), "collection registered");
        self.env.zones.register(zone);
        self.env.collections.register(config);
        let next = self.kernel.state().with_collection(id, collection);
        self.kernel.replace_state(next);
    }

    /// Register an editable field.
    pub fn register_field(&mut self, id: impl Into<String>, config: FieldConfig<Command>, initial: impl Into<String>) {
        self.pipeline
            .fields_mut()
            .register(FieldId::new(id), config, initial);
    }

    /// Register a key binding.
    pub fn register_binding(&mut self, binding: Binding<Command>) -> BindingId {
        self.pipeline.keymap_mut().register(binding)
    }

    /// Remove a key binding.
    pub fn unregister_binding(&mut self, id: BindingId) -> bool {
        self.pipeline.keymap_mut().unregister(id)
    }

    /// Register a handler for a [`Command::Custom`] kind.
    pub fn register_handler(&mut self, kind: impl Into<String>, handler: AppHandler) {
        self.kernel.register(kind, handler);
    }

    /// Replace the clipboard slot with host text, one entity per line.
    pub fn load_clipboard_text(&mut self, text: &str) {
        let mut next = self.kernel.state().clone();
        next.clipboard = Some(ClipboardEntry::from_text(text));
        self.kernel.replace_state(next);
    }

    /// Clear every registry and the state; reinstall the default keymap.
    pub fn reset(&mut self) -> Result<()> {
        self.kernel.reset(AppState::new());
        self.env.zones.reset();
        self.env.collections.reset();
        self.pipeline.reset();
        install_default_keymap(self.pipeline.keymap_mut())?;
        Ok(())
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    /// Dispatch a command and run the effects it queued.
    pub fn dispatch(&mut self, command: impl Into<Command>) -> DispatchResult {
        let result = self.kernel.dispatch(&self.env, command.into());
        self.run_effects();
        result
    }

    /// Run queued effects. Failures never reach the caller.
    pub fn run_effects(&mut self) -> Vec<EffectOutcome> {
        let effects = self.kernel.take_effects();
        self.effects.run_all(effects)
    }

    /// Make `zone` active, seeding its focus.
    pub fn focus_zone(&mut self, zone: impl Into<ZoneId>) -> DispatchResult {
        let zone = zone.into();
        if !self.env.zones.contains(&zone) {
            return self.reject_unknown(&zone);
        }
        self.dispatch(Command::activate_zone(zone))
    }

    // ====================================================================
    // Input
    // ====================================================================

    /// Route a key press from `target` and dispatch what it resolves to.
    pub fn handle_key(&mut self, event: &KeyEvent, target: &FocusTarget) -> KeyOutcome {
        if let Some(zone) = target.zone.as_deref().map(ZoneId::from)
            && self.env.zones.contains(&zone)
            && !self.kernel.state().focus.is_active(&zone)
        {
            self.dispatch(Command::activate_zone(zone));
        }

        let ctx = self.resolve_context();
        match self.pipeline.route(event, target, ctx.clone()) {
            Routed::Field {
                outcome: FieldOutcome::Committed {
                    command: Some(command),
                    ..
                },
                ..
            } => KeyOutcome {
                prevent_default: true,
                dispatched: Some(self.dispatch(command)),
            },
            Routed::Field { .. } => KeyOutcome {
                prevent_default: true,
                dispatched: None,
            },
            Routed::Command { command, .. } => {
                let command = self.refine(command);
                KeyOutcome {
                    prevent_default: true,
                    dispatched: Some(self.dispatch(command)),
                }
            }
            Routed::PassThru => self.typeahead(event, target, &ctx),
        }
    }

    /// Click selects (Shift extends, Mod toggles); double-click activates.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> DispatchResult {
        let zone = ZoneId::from(event.zone.as_str());
        if !self.env.zones.contains(&zone) {
            return self.reject_unknown(&zone);
        }
        let item = ItemId::from(event.item.as_str());
        let action = match event.kind {
            PointerKind::Click => {
                let op = if event.modifiers.contains(Modifiers::SHIFT) {
                    SelectOp::Range
                } else if event.modifiers.intersects(self.platform().command_modifier()) {
                    SelectOp::Toggle
                } else {
                    SelectOp::Replace
                };
                ZoneAction::Select { item: Some(item), op }
            }
            PointerKind::DoubleClick => ZoneAction::Activate(Some(item)),
        };
        self.dispatch(Command::zone_in(zone, action))
    }

    /// Handle a host clipboard or select-all event.
    ///
    /// Returns `None` when the host should run its native behavior: the
    /// target is a field that is editing (or unknown to the registry), or an
    /// item edit is in progress.
    pub fn handle_native(&mut self, action: NativeAction, target: &FocusTarget) -> Option<DispatchResult> {
        if self.is_native_target(target) {
            tracing::trace!(target: "zonekit.keyboard", ?action, "native action left to host");
            return None;
        }
        let command = match action {
            NativeAction::Copy => Command::copy(),
            NativeAction::Cut => Command::cut(),
            NativeAction::Paste => Command::paste(),
            NativeAction::SelectAll => Command::select_all(),
        };
        Some(self.dispatch(command))
    }

    // ====================================================================
    // Projection
    // ====================================================================

    /// ARIA attributes and flags for an item.
    #[must_use]
    pub fn compute_item(&self, zone: &ZoneId, item: &ItemId) -> Option<ItemProps> {
        let config = self.env.zones.get(zone)?;
        let state = self.kernel.state();
        Some(compute_item(&state.data, config, &state.focus, item))
    }

    /// ARIA attributes for a zone container.
    #[must_use]
    pub fn compute_container_props(&self, zone: &ZoneId) -> Option<Attrs> {
        let config = self.env.zones.get(zone)?;
        Some(compute_container_props(config, &self.kernel.state().focus))
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    /// Mode and focus path (active zone, then its ancestors).
    fn resolve_context(&self) -> ResolveContext {
        let focus = &self.kernel.state().focus;
        let Some(active) = focus.active_zone.clone() else {
            return ResolveContext::navigating();
        };
        let mode = if focus.zone(&active).is_some_and(|s| s.editing.is_some()) {
            KeyMode::Editing
        } else {
            KeyMode::Navigating
        };

        let mut path = vec![active.to_string()];
        let mut next = self.env.zones.get(&active).and_then(|z| z.parent.clone());
        while let Some(parent) = next {
            if path.len() > self.env.zones.len() {
                break;
            }
            next = self.env.zones.get(&parent).and_then(|z| z.parent.clone());
            path.push(parent.to_string());
        }
        ResolveContext {
            mode,
            ..ResolveContext::default()
        }
        .with_focus_path(path)
    }

    /// Space in a zone without selection activates instead.
    fn refine(&self, command: Command) -> Command {
        if let Command::Zone(ZoneCommand {
            zone,
            action: ZoneAction::Select { item: None, op: SelectOp::Toggle },
        }) = &command
        {
            let target = zone.as_ref().or(self.active_zone());
            if target
                .and_then(|z| self.env.zones.get(z))
                .is_some_and(|z| !z.select.is_selectable())
            {
                return Command::Zone(ZoneCommand {
                    zone: zone.clone(),
                    action: ZoneAction::Activate(None),
                });
            }
        }
        command
    }

    /// Unbound printable keys jump to the next matching label.
    fn typeahead(&mut self, event: &KeyEvent, target: &FocusTarget, ctx: &ResolveContext) -> KeyOutcome {
        if target.field.is_some()
            || target.composing
            || ctx.mode == KeyMode::Editing
            || event.kind == KeyEventKind::Release
            || self.active_zone().is_none()
        {
            return KeyOutcome::pass();
        }
        let Some(c) = event.text_char().filter(|c| !c.is_whitespace()) else {
            return KeyOutcome::pass();
        };
        let result = self.dispatch(Command::typeahead(c.to_string()));
        KeyOutcome {
            prevent_default: result.changed(),
            dispatched: Some(result),
        }
    }

    fn is_native_target(&self, target: &FocusTarget) -> bool {
        if let Some(field) = &target.field {
            return self
                .pipeline
                .fields()
                .get(field)
                .is_none_or(|state| state.is_editing());
        }
        self.active_zone()
            .and_then(|zone| self.kernel.state().focus.zone(zone))
            .is_some_and(|state| state.editing.is_some())
    }

    fn reject_unknown(&self, zone: &ZoneId) -> DispatchResult {
        tracing::warn!(target: "zonekit.zone", %zone, "input for unregistered zone ignored");
        DispatchResult::Rejected(Rejection::UnknownZone(zone.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Core handlers
// ---------------------------------------------------------------------------

fn install_core_handlers(kernel: &mut Kernel<AppState, Command, Env>) {
    let zone = zone_handler();
    for kind in ZONE_KINDS {
        kernel.register(*kind, zone.clone());
    }
    let collection = collection_handler();
    for kind in COLLECTION_KINDS {
        kernel.register(*kind, collection.clone());
    }
    // Undo and redo can restore data under live focus; prune what vanished.
    kernel.on_restore(|_| vec![Command::reconcile()]);
}

fn zone_handler() -> AppHandler {
    Handler::new(|ctx: &Ctx<'_, AppState, Env>, command: &Command| {
        let Command::Zone(command) = command else {
            return Err(Rejection::Unhandled {
                kind: command.kind().to_string(),
            });
        };
        let state = ctx.state;
        let outcome = reduce_zone(&state.data, &state.focus, &ctx.env.zones, command, ctx.env.options)?;
        let mut transition = match outcome.focus {
            Some(focus) => Transition::to(AppState {
                focus,
                ..state.clone()
            }),
            None => Transition::unchanged(),
        };
        transition.dispatch = outcome.dispatch;
        Ok(transition)
    })
}

fn collection_handler() -> AppHandler {
    Handler::new(|ctx: &Ctx<'_, AppState, Env>, command: &Command| {
        let Command::Collection(command) = command else {
            return Err(Rejection::Unhandled {
                kind: command.kind().to_string(),
            });
        };
        let state = ctx.state;
        let visible = command
            .zone
            .as_ref()
            .or(state.focus.active_zone.as_ref())
            .and_then(|zone| {
                let config = ctx.env.zones.get(zone)?;
                Some(config.visible_items(&state.data, &state.focus.zone_or_default(zone)))
            });
        let env = CollectionEnv {
            focus: &state.focus,
            clipboard: state.clipboard.as_ref(),
            registry: &ctx.env.collections,
            mirror: ctx.env.mirror,
            visible: visible.as_deref(),
        };
        let CollectionOutcome {
            data,
            clipboard,
            effects,
            dispatch,
        } = reduce_collection(&state.data, env, command)?;

        let next = if data.is_none() && clipboard.is_none() {
            None
        } else {
            Some(AppState {
                data: data.unwrap_or_else(|| state.data.clone()),
                focus: state.focus.clone(),
                clipboard: clipboard.or_else(|| state.clipboard.clone()),
            })
        };
        Ok(Transition {
            state: next,
            dispatch: dispatch.into_iter().map(Command::Zone).collect(),
            effects,
        })
    })
}
