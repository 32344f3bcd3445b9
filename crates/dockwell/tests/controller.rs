#![forbid(unsafe_code)]

//! End-to-end scenarios against the full controller stack: layout machine,
//! transition coordinator, persistence store, and pointer capture wired
//! together, driven through the public command surface only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

use dockwell::{
    ChatMessage, ChatRole, KeyCode, KeyEvent, LayoutVariant, Modifiers, PanelController,
    PanelRect, PanelSurface, PanelUiState, PersistenceStore, Point, PointerEvent, PointerKind,
    PreferencesUpdate, StorageBackend, StorageResult, TYPING_MESSAGE_ID, Viewport,
};

const VP: Viewport = Viewport::new(1920.0, 1080.0);

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// In-memory backend with shared interior, so two controllers (or two store
/// namespaces) can observe each other's writes within one test.
#[derive(Debug, Clone, Default)]
struct SharedStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl SharedStorage {
    fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for SharedStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Surface that records every geometry frame and capture toggle, with an
/// externally drivable attached flag for detach scenarios.
#[derive(Debug, Clone, Default)]
struct RecordingSurface {
    inner: Rc<RefCell<SurfaceLog>>,
}

#[derive(Debug, Default)]
struct SurfaceLog {
    detached: bool,
    frames: Vec<PanelRect>,
    captures: Vec<bool>,
}

impl RecordingSurface {
    fn new() -> Self {
        Self::default()
    }

    fn detach(&self) {
        self.inner.borrow_mut().detached = true;
    }

    fn last_frame(&self) -> Option<PanelRect> {
        self.inner.borrow().frames.last().copied()
    }

    fn captures(&self) -> Vec<bool> {
        self.inner.borrow().captures.clone()
    }
}

impl PanelSurface for RecordingSurface {
    fn is_attached(&self) -> bool {
        !self.inner.borrow().detached
    }

    fn apply_geometry(&mut self, rect: PanelRect) {
        self.inner.borrow_mut().frames.push(rect);
    }

    fn set_pointer_capture(&mut self, active: bool) {
        self.inner.borrow_mut().captures.push(active);
    }
}

fn store_over(durable: SharedStorage, ephemeral: SharedStorage) -> PersistenceStore {
    PersistenceStore::new(Box::new(durable), Box::new(ephemeral))
}

fn fresh_controller() -> (PanelController<RecordingSurface>, RecordingSurface) {
    let surface = RecordingSurface::new();
    let store = store_over(SharedStorage::new(), SharedStorage::new());
    let panel = PanelController::new("conv-1", VP, surface.clone(), store);
    (panel, surface)
}

fn message(id: &str, role: ChatRole, content: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_owned(),
        role,
        content: content.to_owned(),
        timestamp_ms: 1_000,
    }
}

/// Drive an armed transition to its natural completion.
fn settle(panel: &mut PanelController<RecordingSurface>) {
    let step = Duration::from_millis(100);
    for _ in 0..20 {
        if !panel.state().is_transitioning {
            return;
        }
        panel.tick(step, Instant::now());
    }
    panic!("transition did not settle");
}

// ---------------------------------------------------------------------------
// Layout commands
// ---------------------------------------------------------------------------

#[test]
fn variant_change_animates_and_commits_once() {
    let (mut panel, surface) = fresh_controller();
    panel.open();

    let commits: Rc<RefCell<Vec<PanelUiState>>> = Rc::default();
    let log = commits.clone();
    panel.subscribe(move |state| log.borrow_mut().push(state.clone()));

    panel.request_variant(LayoutVariant::Sidebar);
    assert!(panel.state().is_transitioning);

    settle(&mut panel);

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Sidebar);
    assert!(!state.is_transitioning);

    // One notification for the lock, one for the commit.
    let variants: Vec<_> = commits
        .borrow()
        .iter()
        .map(|s| (s.variant, s.is_transitioning))
        .collect();
    assert_eq!(
        variants,
        vec![
            (LayoutVariant::Floating, true),
            (LayoutVariant::Sidebar, false),
        ]
    );

    // The final frame pushed at the surface is the sidebar rect.
    assert_eq!(surface.last_frame(), Some(state.geometry));
}

#[test]
fn second_request_during_transition_is_ignored() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    panel.request_variant(LayoutVariant::Sidebar);
    panel.request_variant(LayoutVariant::Fullpage);
    settle(&mut panel);

    assert_eq!(panel.state().variant, LayoutVariant::Sidebar);
}

#[test]
fn request_for_current_variant_is_a_no_op() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    let count = Rc::new(RefCell::new(0u32));
    let seen = count.clone();
    panel.subscribe(move |_| *seen.borrow_mut() += 1);

    panel.request_variant(LayoutVariant::Floating);
    assert!(!panel.state().is_transitioning);
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn animations_off_commits_instantly() {
    let (mut panel, surface) = fresh_controller();
    panel.open();
    panel.update_preferences(&PreferencesUpdate {
        animations: Some(false),
        ..PreferencesUpdate::default()
    });

    panel.request_variant(LayoutVariant::Fullpage);

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Fullpage);
    assert!(!state.is_transitioning);
    assert_eq!(surface.last_frame(), Some(state.geometry));
}

#[test]
fn detached_surface_commits_instantly() {
    let (mut panel, surface) = fresh_controller();
    panel.open();
    surface.detach();

    panel.request_variant(LayoutVariant::Sidebar);

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Sidebar);
    assert!(!state.is_transitioning);
}

#[test]
fn detach_mid_transition_falls_back_to_commit() {
    let (mut panel, surface) = fresh_controller();
    panel.open();

    panel.request_variant(LayoutVariant::Sidebar);
    panel.tick(Duration::from_millis(50), Instant::now());
    surface.detach();
    panel.tick(Duration::from_millis(50), Instant::now());

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Sidebar);
    assert!(!state.is_transitioning);
}

#[test]
fn wall_clock_ceiling_forces_the_commit() {
    let (mut panel, surface) = fresh_controller();
    panel.open();

    panel.request_variant(LayoutVariant::Fullpage);
    let target = panel.state();
    assert!(target.is_transitioning);

    // Frame time stalls at zero but the wall clock blows past the ceiling
    // (500 ms nominal x2).
    panel.tick(Duration::ZERO, Instant::now() + Duration::from_secs(2));

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Fullpage);
    assert!(!state.is_transitioning);
    // The force path snaps the surface to the target rect.
    assert_eq!(surface.last_frame(), Some(state.geometry));
}

#[test]
fn close_is_honored_mid_transition() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    panel.request_variant(LayoutVariant::Sidebar);
    panel.close();
    assert!(!panel.state().is_open);

    // The in-flight transition still commits on its own schedule.
    settle(&mut panel);
    assert_eq!(panel.state().variant, LayoutVariant::Sidebar);
}

#[test]
fn toggle_open_flips_cleanly() {
    let (mut panel, _surface) = fresh_controller();
    assert!(!panel.state().is_open);
    panel.toggle_open();
    assert!(panel.state().is_open);
    panel.toggle_open();
    assert!(!panel.state().is_open);
}

// ---------------------------------------------------------------------------
// Drag, resize, pointer capture
// ---------------------------------------------------------------------------

#[test]
fn drag_to_the_right_edge_clamps_the_origin() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    let origin = panel.state().geometry.origin;
    let grab = Point::new(origin.x + 4.0, origin.y + 4.0);
    assert!(panel.begin_drag(grab));

    // Pointer far past the right edge: desired x would be 1900 for a
    // 400-wide panel on a 1920 viewport; committed x clamps to 1520.
    panel.update_drag(Point::new(1904.0, grab.y));
    panel.end_drag();

    let rect = panel.state().geometry;
    assert_eq!(rect.origin.x, 1520.0);
    assert_eq!(rect.origin.y, origin.y);
}

#[test]
fn capture_follows_the_drag_session() {
    let (mut panel, surface) = fresh_controller();
    panel.open();

    let flag = panel.capture_flag();
    assert!(!flag.is_active());

    let origin = panel.state().geometry.origin;
    assert!(panel.begin_drag(origin));
    assert!(flag.is_active());

    panel.end_drag();
    assert!(!flag.is_active());
    assert_eq!(surface.captures(), vec![true, false]);
}

#[test]
fn drag_is_rejected_while_closed_or_non_floating() {
    let (mut panel, _surface) = fresh_controller();
    let origin = panel.state().geometry.origin;
    assert!(!panel.begin_drag(origin));

    panel.open();
    panel.request_variant(LayoutVariant::Sidebar);
    settle(&mut panel);
    assert!(!panel.begin_drag(Point::new(1600.0, 300.0)));
}

#[test]
fn pointer_events_route_to_the_active_session() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    let origin = panel.state().geometry.origin;
    assert!(panel.begin_drag(origin));

    panel.handle_pointer(&PointerEvent::new(
        PointerKind::Move,
        Point::new(origin.x - 60.0, origin.y - 10.0),
    ));
    panel.handle_pointer(&PointerEvent::new(PointerKind::Up, Point::new(0.0, 0.0)));

    let rect = panel.state().geometry;
    assert_eq!(rect.origin, Point::new(origin.x - 60.0, origin.y - 10.0));
    assert!(!panel.capture_flag().is_active());
}

#[test]
fn pointer_leave_ends_a_resize() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    let rect = panel.state().geometry;
    let corner = Point::new(rect.origin.x + rect.size.width, rect.origin.y + rect.size.height);
    assert!(panel.begin_resize(corner));

    panel.handle_pointer(&PointerEvent::new(
        PointerKind::Move,
        Point::new(corner.x + 50.0, corner.y + 40.0),
    ));
    panel.handle_pointer(&PointerEvent::new(PointerKind::Leave, corner));

    let resized = panel.state().geometry;
    assert_eq!(resized.size.width, rect.size.width + 50.0);
    assert_eq!(resized.size.height, rect.size.height + 40.0);
    assert!(!panel.capture_flag().is_active());
}

#[test]
fn dropping_the_controller_releases_capture() {
    let (mut panel, surface) = fresh_controller();
    panel.open();

    let flag = panel.capture_flag();
    let origin = panel.state().geometry.origin;
    assert!(panel.begin_drag(origin));
    assert!(flag.is_active());

    drop(panel);
    assert!(!flag.is_active());
    assert_eq!(surface.captures(), vec![true, false]);
}

#[test]
fn viewport_shrink_reclamps_the_floating_rect() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    panel.set_viewport(Viewport::new(1000.0, 800.0));

    let rect = panel.state().geometry;
    assert!(rect.origin.x + rect.size.width <= 1000.0);
    assert!(rect.origin.y + rect.size.height <= 800.0);
}

// ---------------------------------------------------------------------------
// Keyboard surface
// ---------------------------------------------------------------------------

#[test]
fn escape_closes_even_mid_transition() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();
    panel.request_variant(LayoutVariant::Sidebar);

    let handled = panel.handle_key(&KeyEvent::new(KeyCode::Escape));
    assert!(handled.is_some());
    assert!(!panel.state().is_open);
}

#[test]
fn variant_shortcuts_are_gated_by_the_lock() {
    let (mut panel, _surface) = fresh_controller();
    panel.open();

    let ctrl_3 = KeyEvent::new(KeyCode::Char('3')).with_modifiers(Modifiers::CTRL);
    panel.request_variant(LayoutVariant::Sidebar);
    assert!(panel.handle_key(&ctrl_3).is_none());
    settle(&mut panel);

    assert!(panel.handle_key(&ctrl_3).is_some());
    settle(&mut panel);
    assert_eq!(panel.state().variant, LayoutVariant::Fullpage);
}

#[test]
fn variant_shortcuts_require_an_open_panel() {
    let (mut panel, _surface) = fresh_controller();
    let ctrl_2 = KeyEvent::new(KeyCode::Char('2')).with_modifiers(Modifiers::CTRL);
    assert!(panel.handle_key(&ctrl_2).is_none());
    assert_eq!(panel.state().variant, LayoutVariant::Floating);
}

// ---------------------------------------------------------------------------
// Persistence round-trips
// ---------------------------------------------------------------------------

#[test]
fn layout_survives_a_restart() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let surface = RecordingSurface::new();
    let mut panel = PanelController::new(
        "conv-1",
        VP,
        surface,
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.open();
    panel.request_variant(LayoutVariant::Sidebar);
    settle(&mut panel);
    drop(panel);

    let revived = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable, ephemeral),
    );
    assert_eq!(revived.state().variant, LayoutVariant::Sidebar);
    // Open state is per-mount, never persisted.
    assert!(!revived.state().is_open);
}

#[test]
fn remember_layout_off_ignores_the_snapshot() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let mut panel = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.open();
    panel.request_variant(LayoutVariant::Fullpage);
    settle(&mut panel);
    panel.update_preferences(&PreferencesUpdate {
        remember_layout: Some(false),
        ..PreferencesUpdate::default()
    });
    drop(panel);

    let revived = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable, ephemeral),
    );
    assert_eq!(revived.state().variant, LayoutVariant::Floating);
}

#[test]
fn preferences_survive_a_restart() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let mut panel = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.update_preferences(&PreferencesUpdate {
        default_layout: Some(LayoutVariant::Sidebar),
        auto_resize: Some(true),
        ..PreferencesUpdate::default()
    });
    drop(panel);

    let revived = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable, ephemeral),
    );
    let prefs = revived.state().preferences;
    assert_eq!(prefs.default_layout, LayoutVariant::Sidebar);
    assert!(prefs.auto_resize);
    // Untouched fields keep their defaults through the merge.
    assert!(prefs.animations);
}

#[test]
fn session_is_bound_to_its_conversation() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let mut panel = PanelController::new(
        "conv-a",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.append_message(message("m1", ChatRole::User, "hello"));
    drop(panel);

    // Same tab, different conversation: the stale record reads as empty.
    let other = PanelController::new(
        "conv-b",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    assert!(other.state().messages.is_empty());
    drop(other);

    let back = PanelController::new(
        "conv-a",
        VP,
        RecordingSurface::new(),
        store_over(durable, ephemeral),
    );
    assert_eq!(back.state().messages.len(), 1);
    assert_eq!(back.state().messages[0].id, "m1");
}

#[test]
fn typing_indicator_shows_live_but_never_persists() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let mut panel = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.append_message(message("m1", ChatRole::User, "hi"));
    panel.set_loading(true);
    assert!(
        panel
            .state()
            .messages
            .iter()
            .any(ChatMessage::is_typing_indicator)
    );

    // The assistant reply replaces the indicator in one step.
    panel.append_message(message("m2", ChatRole::Assistant, "hello"));
    let ids: Vec<_> = panel.state().messages.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    drop(panel);

    let revived = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    assert!(
        revived
            .state()
            .messages
            .iter()
            .all(|m| m.id != TYPING_MESSAGE_ID)
    );
}

#[test]
fn reset_restores_defaults_and_clears_storage() {
    let durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();

    let mut panel = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable.clone(), ephemeral.clone()),
    );
    panel.open();
    panel.append_message(message("m1", ChatRole::User, "hi"));
    panel.request_variant(LayoutVariant::Fullpage);
    settle(&mut panel);

    panel.reset_all();

    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Floating);
    assert!(state.messages.is_empty());
    assert!(durable.entries.borrow().is_empty());
    assert!(ephemeral.entries.borrow().is_empty());
}

#[test]
fn corrupt_stored_values_fall_back_to_defaults() {
    let mut durable = SharedStorage::new();
    let ephemeral = SharedStorage::new();
    durable
        .set("app.chat.preferences", "{not json")
        .expect("shared storage never fails");
    durable
        .set("app.chat.layout", "42")
        .expect("shared storage never fails");

    let panel = PanelController::new(
        "conv-1",
        VP,
        RecordingSurface::new(),
        store_over(durable, ephemeral),
    );
    let state = panel.state();
    assert_eq!(state.variant, LayoutVariant::Floating);
    assert!(state.preferences.animations);
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[test]
fn unsubscribed_listeners_stop_receiving() {
    let (mut panel, _surface) = fresh_controller();

    let count = Rc::new(RefCell::new(0u32));
    let seen = count.clone();
    let id = panel.subscribe(move |_| *seen.borrow_mut() += 1);

    panel.open();
    assert_eq!(*count.borrow(), 1);

    assert!(panel.unsubscribe(id));
    panel.close();
    assert_eq!(*count.borrow(), 1);
    assert!(!panel.unsubscribe(id));
}
