#![forbid(unsafe_code)]

//! The panel controller: composition root wiring input, layout, animation,
//! and persistence together.
//!
//! `PanelController` is the only stateful object an embedding UI talks to.
//! Data flows one direction per user action: input event → controller →
//! {geometry engine | layout machine} → state snapshot → persistence
//! (write-through) → [`PanelUiState`] notification.
//!
//! # Invariants
//!
//! 1. Every committed mutation emits exactly one `state_changed`
//!    notification; rejected commands (transition lock held, idempotent
//!    no-ops) emit none.
//! 2. Persistence writes are issued synchronously, in commit order, before
//!    the notification for that commit — the stores never run ahead of or
//!    reorder against displayed state.
//! 3. Close and Escape are honored unconditionally, including while the
//!    transition lock is held.
//! 4. The controller converges to a valid clamped state even when the
//!    surface is detached and every storage write fails.

use std::time::Duration;

use tracing::{debug, warn};
use web_time::Instant;

use dockwell_anim::{
    PanelSurface, TransitionCoordinator, TransitionError, TransitionProgress, ease_out,
};
use dockwell_core::event::{KeyEvent, PointerEvent, PointerKind};
use dockwell_core::geometry::{PanelRect, Point, Viewport};
use dockwell_core::keybinding::{KeyState, PanelAction, map_key};
use dockwell_core::layout::{
    Interaction, LayoutMachine, LayoutVariant, PanelConfig, VariantRequest,
};
use dockwell_store::{
    ChatMessage, LayoutSnapshot, PersistenceStore, PreferencesUpdate, UserPreferences, now_ms,
};

use crate::grab::{CaptureFlag, PointerGrab};
use crate::session::SessionTranscript;

/// Identifier handed out by [`PanelController::subscribe`].
pub type SubscriptionId = u64;

/// Snapshot of everything an embedding UI renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelUiState {
    /// Active layout variant.
    pub variant: LayoutVariant,
    /// Whether the panel is open.
    pub is_open: bool,
    /// Whether the transition lock is held.
    pub is_transitioning: bool,
    /// Geometry currently displayed.
    pub geometry: PanelRect,
    /// Current user preferences.
    pub preferences: UserPreferences,
    /// Transcript entries, oldest first (includes a live typing indicator).
    pub messages: Vec<ChatMessage>,
}

type Listener = Box<dyn FnMut(&PanelUiState)>;

/// The multi-state assistant panel controller.
///
/// Constructed once per conversation context, hydrated from the persistence
/// store, mutated in place by commands, and discarded when the owning UI
/// unmounts. The only background obligation is [`tick`](Self::tick), which
/// the host calls from its frame loop while a transition is in flight.
pub struct PanelController<S: PanelSurface> {
    conversation_id: String,
    viewport: Viewport,
    machine: LayoutMachine,
    coordinator: TransitionCoordinator,
    store: PersistenceStore,
    preferences: UserPreferences,
    transcript: SessionTranscript,
    surface: S,
    grab: Option<PointerGrab>,
    capture_flag: CaptureFlag,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener: SubscriptionId,
}

impl<S: PanelSurface> std::fmt::Debug for PanelController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelController")
            .field("conversation_id", &self.conversation_id)
            .field("variant", &self.machine.variant())
            .field("is_open", &self.machine.is_open())
            .field("interaction", self.machine.interaction())
            .finish_non_exhaustive()
    }
}

impl<S: PanelSurface> PanelController<S> {
    /// Create a controller for one conversation, hydrating preferences,
    /// layout, and transcript from the store.
    ///
    /// The layout snapshot is only restored when `remember_layout` is set;
    /// otherwise the panel starts at the preferred default variant. The
    /// session read is stale-session-guarded by `conversation_id`.
    pub fn new(
        conversation_id: impl Into<String>,
        viewport: Viewport,
        mut surface: S,
        store: PersistenceStore,
    ) -> Self {
        let conversation_id = conversation_id.into();
        let cfg = PanelConfig::default();
        let preferences = store.load_preferences();

        let machine = match store.load_layout() {
            Some(snapshot) if preferences.remember_layout => {
                LayoutMachine::restore(cfg, viewport, snapshot.variant, snapshot.floating)
            }
            _ => LayoutMachine::restore(
                cfg,
                viewport,
                preferences.default_layout,
                cfg.default_floating(viewport),
            ),
        };

        let transcript = SessionTranscript::from_messages(store.load_session(&conversation_id));

        if surface.is_attached() {
            surface.apply_geometry(machine.current_geometry(viewport));
        }

        Self {
            conversation_id,
            viewport,
            machine,
            coordinator: TransitionCoordinator::new(),
            store,
            preferences,
            transcript,
            surface,
            grab: None,
            capture_flag: CaptureFlag::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // -- observation --------------------------------------------------------

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> PanelUiState {
        PanelUiState {
            variant: self.machine.variant(),
            is_open: self.machine.is_open(),
            is_transitioning: self.machine.is_transitioning(),
            geometry: self.machine.current_geometry(self.viewport),
            preferences: self.preferences.clone(),
            messages: self.transcript.messages().to_vec(),
        }
    }

    /// Register a listener called after every committed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&PanelUiState) + 'static) -> SubscriptionId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Host-observable pointer capture flag (set while a drag or resize
    /// session is active, cleared on every exit path).
    #[must_use]
    pub fn capture_flag(&self) -> CaptureFlag {
        self.capture_flag.clone()
    }

    /// The conversation this controller is bound to.
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// The animated host surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the host surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn emit(&mut self) {
        let snapshot = self.state();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    // -- open / close -------------------------------------------------------

    /// Open the panel. Always honored.
    pub fn open(&mut self) {
        if !self.machine.is_open() {
            self.machine.set_open(true);
            self.emit();
        }
    }

    /// Close the panel. Always honored, even mid-transition — an in-flight
    /// animation still commits on its own schedule, invisibly.
    pub fn close(&mut self) {
        if self.machine.is_open() {
            self.machine.set_open(false);
            self.emit();
        }
    }

    /// Flip the open flag. Always honored.
    pub fn toggle_open(&mut self) {
        self.machine.toggle_open();
        self.emit();
    }

    // -- layout -------------------------------------------------------------

    /// Request a layout variant change.
    ///
    /// Idempotent no-op (no notification) when the target is already active
    /// or the transition lock is held. With animations enabled and an
    /// attached surface the change animates and commits from
    /// [`tick`](Self::tick); otherwise it commits instantly.
    pub fn request_variant(&mut self, target: LayoutVariant) {
        match self.machine.request_variant(target, self.viewport) {
            VariantRequest::Unchanged => {}
            VariantRequest::Begin { from, to, target } => {
                let cfg = self.machine.config();
                if self.preferences.animations && self.surface.is_attached() {
                    self.coordinator.begin(
                        from,
                        to,
                        Duration::from_millis(cfg.transition_ms),
                        ease_out,
                        cfg.transition_ceiling_factor,
                        Instant::now(),
                    );
                    // Lock acquired; the commit lands in tick().
                    self.emit();
                } else {
                    debug!(?target, "instant variant commit (no animation path)");
                    self.commit_pending(Some(to));
                }
            }
        }
    }

    /// Advance an in-flight transition.
    ///
    /// `dt` is frame time, `now` is wall-clock time checked against the
    /// hard ceiling. Commits the pending variant on completion, on ceiling
    /// timeout (force-commit), and on surface detach (fallback) — the state
    /// machine converges regardless of presentation-layer failure.
    pub fn tick(&mut self, dt: Duration, now: Instant) {
        if !self.coordinator.is_active() {
            if self.machine.is_transitioning() {
                // Lock held with no animation driving it; converge now.
                self.commit_pending(None);
            }
            return;
        }

        let target = self.coordinator.target();
        match self.coordinator.tick(dt, now, &mut self.surface) {
            Ok(TransitionProgress::Idle | TransitionProgress::Animating) => {}
            Ok(TransitionProgress::Completed) => self.commit_pending(None),
            Ok(TransitionProgress::ForceCommit) => {
                warn!("transition exceeded hard ceiling; force-committing");
                self.commit_pending(target);
            }
            Err(TransitionError::Detached) => {
                debug!("surface detached mid-transition; committing without animation");
                self.commit_pending(None);
            }
        }
    }

    /// Commit the pending variant, optionally snapping the surface to the
    /// target rect first (non-animated paths).
    fn commit_pending(&mut self, snap_to: Option<PanelRect>) {
        if let Some(rect) = snap_to
            && self.surface.is_attached()
        {
            self.surface.apply_geometry(rect);
        }
        if self.machine.commit_variant(self.viewport).is_some() {
            self.persist_layout();
            self.emit();
        }
    }

    /// Update the host viewport, re-clamping the floating rect.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.machine.reclamp(viewport);
        if self.surface.is_attached() {
            self.surface
                .apply_geometry(self.machine.current_geometry(viewport));
        }
        self.persist_layout();
        self.emit();
    }

    // -- drag / resize ------------------------------------------------------

    /// Begin a drag at `pointer`. Rejected unless the panel is floating,
    /// open, and idle. Acquires pointer capture on success.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.machine.begin_drag(pointer, self.viewport) {
            return false;
        }
        self.grab = Some(PointerGrab::acquire(&self.capture_flag));
        self.surface.set_pointer_capture(true);
        self.emit();
        true
    }

    /// Move an in-flight drag; the committed origin is always clamped.
    pub fn update_drag(&mut self, pointer: Point) {
        if self.machine.update_drag(pointer, self.viewport) {
            self.reflect_geometry();
            self.emit();
        }
    }

    /// End a drag, releasing pointer capture and persisting the geometry.
    pub fn end_drag(&mut self) {
        if self.machine.end_drag() {
            self.release_grab();
            self.persist_layout();
            self.emit();
        }
    }

    /// Begin a resize at `pointer`. Same gating and capture as drag.
    pub fn begin_resize(&mut self, pointer: Point) -> bool {
        if !self.machine.begin_resize(pointer) {
            return false;
        }
        self.grab = Some(PointerGrab::acquire(&self.capture_flag));
        self.surface.set_pointer_capture(true);
        self.emit();
        true
    }

    /// Update an in-flight resize; size bounds hold after every call.
    pub fn update_resize(&mut self, pointer: Point) {
        if self.machine.update_resize(pointer, self.viewport) {
            self.reflect_geometry();
            self.emit();
        }
    }

    /// End a resize, releasing pointer capture and persisting the geometry.
    pub fn end_resize(&mut self) {
        if self.machine.end_resize() {
            self.release_grab();
            self.persist_layout();
            self.emit();
        }
    }

    /// Route a raw pointer event to the active session, if any.
    ///
    /// `Down` is ambiguous between drag and resize (a hit-region decision
    /// the host makes), so only `Move`, `Up`, and `Leave` are routed here.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        match (event.kind, *self.machine.interaction()) {
            (PointerKind::Move, Interaction::Dragging(_)) => self.update_drag(event.position),
            (PointerKind::Move, Interaction::Resizing(_)) => self.update_resize(event.position),
            (PointerKind::Up | PointerKind::Leave, Interaction::Dragging(_)) => self.end_drag(),
            (PointerKind::Up | PointerKind::Leave, Interaction::Resizing(_)) => self.end_resize(),
            _ => {}
        }
    }

    fn reflect_geometry(&mut self) {
        if self.surface.is_attached() {
            self.surface
                .apply_geometry(self.machine.current_geometry(self.viewport));
        }
    }

    fn release_grab(&mut self) {
        self.grab = None;
        self.surface.set_pointer_capture(false);
    }

    // -- keyboard -----------------------------------------------------------

    /// Handle a key event per the keyboard surface: Escape closes always;
    /// Ctrl/Cmd+1/2/3 switch variants while open and unlocked.
    ///
    /// Returns the action taken, if any.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<PanelAction> {
        let state = KeyState {
            is_open: self.machine.is_open(),
            is_transitioning: self.machine.is_transitioning(),
        };
        let action = map_key(event, &state)?;
        match action {
            PanelAction::Close => self.close(),
            PanelAction::SetVariant(variant) => self.request_variant(variant),
        }
        Some(action)
    }

    // -- transcript ---------------------------------------------------------

    /// Append a message to the transcript and write the session through.
    ///
    /// An assistant message replaces any live typing indicator first.
    pub fn append_message(&mut self, message: ChatMessage) {
        if self.transcript.append(message) {
            self.persist_session();
            self.emit();
        }
    }

    /// Remove a message by id.
    pub fn remove_message(&mut self, id: &str) {
        if self.transcript.remove(id) {
            self.persist_session();
            self.emit();
        }
    }

    /// Show or hide the typing indicator. The indicator is presentation
    /// state and is never persisted.
    pub fn set_loading(&mut self, loading: bool) {
        if self.transcript.set_loading(loading, now_ms()) {
            self.emit();
        }
    }

    // -- preferences / reset ------------------------------------------------

    /// Merge a partial preferences update and persist the result wholesale.
    pub fn update_preferences(&mut self, update: &PreferencesUpdate) {
        self.preferences = self.preferences.merged(update);
        self.store.save_preferences(&self.preferences);
        self.emit();
    }

    /// Clear all persisted state and return to hard-coded defaults.
    pub fn reset_all(&mut self) {
        self.store.reset();
        self.coordinator.cancel();
        if self.grab.is_some() {
            self.release_grab();
        }
        self.preferences = UserPreferences::default();
        let cfg = *self.machine.config();
        self.machine = LayoutMachine::restore(
            cfg,
            self.viewport,
            self.preferences.default_layout,
            cfg.default_floating(self.viewport),
        );
        self.transcript.clear();
        self.reflect_geometry();
        self.emit();
    }

    // -- persistence --------------------------------------------------------

    fn persist_layout(&mut self) {
        if !self.preferences.remember_layout {
            return;
        }
        self.store.save_layout(&LayoutSnapshot {
            variant: self.machine.variant(),
            floating: self.machine.floating(),
        });
    }

    fn persist_session(&mut self) {
        let messages: Vec<ChatMessage> = self.transcript.persistable().cloned().collect();
        self.store.save_session(&self.conversation_id, &messages);
    }
}

impl<S: PanelSurface> Drop for PanelController<S> {
    fn drop(&mut self) {
        // Unmount-mid-drag: the grab guard clears the shared flag on its own
        // drop, but the surface must also be told to release capture.
        if self.grab.is_some() {
            self.surface.set_pointer_capture(false);
        }
    }
}
