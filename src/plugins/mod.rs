pub mod controls_plugin;
pub mod game_plugin;
pub mod presentation_plugin;
pub mod storage_plugin;
pub mod ui_plugin;

use bevy::prelude::*;

/// Install the simulation and input plugins without rendering, windowing or
/// the SQLite store. Used by integration tests on top of `MinimalPlugins`.
pub fn configure_headless(app: &mut App) {
    app.init_resource::<ButtonInput<KeyCode>>();
    app.add_plugins((game_plugin::GamePlugin, controls_plugin::ControlsPlugin));
}
