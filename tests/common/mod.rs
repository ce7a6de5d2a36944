//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `StatesPlugin` drives the pause phase.
//! - we then call `portal_arena::plugins::configure_headless` to install gameplay plugins.
#![allow(dead_code)]

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use portal_arena::game::events::SimEvent;
use portal_arena::game::session::Session;

/// Headless app around a prepared session. Runs startup once.
pub fn app_with_session(session: Session) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(session);
    portal_arena::plugins::configure_headless(&mut app);
    app.update();
    app
}

/// Run the fixed-step schedule `n` times, independent of wall-clock time.
pub fn step(app: &mut App, n: usize) {
    for _ in 0..n {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

pub fn press(app: &mut App, key: KeyCode) {
    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keys.release_all();
    keys.clear();
    keys.press(key);
}

pub fn release_all(app: &mut App) {
    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keys.release_all();
    keys.clear();
}

/// Every SimEvent message published so far that has not been drained yet.
pub fn drain_messages(app: &mut App) -> Vec<SimEvent> {
    app.world_mut().resource_mut::<Messages<SimEvent>>().drain().collect()
}

pub fn session(app: &App) -> &Session {
    app.world().resource::<Session>()
}

pub fn session_mut(app: &mut App) -> Mut<'_, Session> {
    app.world_mut().resource_mut::<Session>()
}
