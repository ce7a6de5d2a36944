use std::sync::Arc;

use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    components::*,
    events::SimEvent,
    intent::{PlayerInput, UiAction},
    session::Session,
};
use crate::plugins::storage_plugin::SaveBackend;
use crate::storage::memory::MemoryStore;

// ── SystemSets (strict ordering) ────────────────────────────────────

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixedGameSet {
    /// The session step itself.
    SimulateSet,
    /// Forward what the step produced as messages.
    PublishSet,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Keyboard → intent and UI actions.
    InputSet,
    /// UI actions applied to the session.
    ActionSet,
    /// Visuals and UI read the session.
    ReflectSet,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SimEvent>();
        app.add_message::<UiAction>();
        app.init_resource::<PlayerInput>();
        app.init_resource::<UiPanels>();
        app.init_state::<GamePhase>();

        app.configure_sets(
            FixedUpdate,
            (
                FixedGameSet::SimulateSet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::PublishSet,
            )
                .chain(),
        );
        app.configure_sets(
            Update,
            (FrameSet::InputSet, FrameSet::ActionSet, FrameSet::ReflectSet).chain(),
        );

        app.add_systems(Startup, setup_session);

        app.add_systems(FixedUpdate, advance_session.in_set(FixedGameSet::SimulateSet));
        app.add_systems(FixedUpdate, publish_events.in_set(FixedGameSet::PublishSet));

        // UI actions run every frame so a paused game can still be resumed.
        app.add_systems(
            Update,
            (apply_ui_actions, publish_events, sync_phase)
                .chain()
                .in_set(FrameSet::ActionSet),
        );

        // ── Always-on ───────────────────────────────────────────────────
        app.add_systems(Update, tuning_reload_input.in_set(FrameSet::InputSet));
    }
}

// ── Startup ─────────────────────────────────────────────────────────

/// Build the session unless one was inserted up front.
fn setup_session(
    mut commands: Commands,
    tuning: Option<Res<Tuning>>,
    backend: Option<Res<SaveBackend>>,
    existing: Option<Res<Session>>,
) {
    if existing.is_some() {
        return;
    }
    let tuning = tuning.map(|t| t.clone()).unwrap_or_default();
    let store = backend.map(|b| b.0.clone()).unwrap_or_else(|| Arc::new(MemoryStore::default()));
    info!("starting session");
    commands.insert_resource(Session::new(tuning, store));
}

// ── Fixed step ──────────────────────────────────────────────────────

fn advance_session(session: Option<ResMut<Session>>, mut input: ResMut<PlayerInput>) {
    let Some(mut session) = session else {
        return;
    };
    let dt = session.tuning.dt;
    session.tick(dt, &mut input);
}

/// Drain the session's event list into Bevy messages.
fn publish_events(session: Option<ResMut<Session>>, mut writer: MessageWriter<SimEvent>) {
    let Some(mut session) = session else {
        return;
    };
    for event in session.drain_events() {
        writer.write(event);
    }
}

// ── Frame systems ───────────────────────────────────────────────────

fn apply_ui_actions(mut actions: MessageReader<UiAction>, session: Option<ResMut<Session>>) {
    let Some(mut session) = session else {
        actions.clear();
        return;
    };
    for action in actions.read() {
        match *action {
            UiAction::Buy(upgrade) => {
                session.buy_upgrade(upgrade);
            }
            UiAction::Equip(index) => {
                session.equip_item(index);
            }
            UiAction::TogglePause => session.toggle_pause(),
            UiAction::RestartWave => session.restart_wave(),
        }
    }
}

/// Mirror the session's pause flag into the phase state.
fn sync_phase(
    session: Option<Res<Session>>,
    phase: Res<State<GamePhase>>,
    mut next_phase: ResMut<NextState<GamePhase>>,
) {
    let Some(session) = session else {
        return;
    };
    let wanted = if session.paused {
        GamePhase::Paused
    } else {
        GamePhase::Playing
    };
    if *phase.get() != wanted {
        next_phase.set(wanted);
    }
}

/// Reload tuning with F5.
fn tuning_reload_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    tuning: Option<ResMut<Tuning>>,
    session: Option<ResMut<Session>>,
    mut fixed: ResMut<Time<Fixed>>,
) {
    if !keyboard.just_pressed(KeyCode::F5) {
        return;
    }
    let Some(mut tuning) = tuning else {
        return;
    };
    tuning.reload();
    fixed.set_timestep_seconds(tuning.dt as f64);
    if let Some(mut session) = session {
        session.apply_tuning(tuning.clone());
    }
}
