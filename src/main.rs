use bevy::prelude::*;

use portal_arena::config::tuning::Tuning;
use portal_arena::plugins::{
    controls_plugin::ControlsPlugin, game_plugin::GamePlugin, presentation_plugin::PresentationPlugin,
    storage_plugin::StoragePlugin, ui_plugin::UiPlugin,
};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Portal Arena".into(),
                resolution: (tuning.window_width, tuning.window_height).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Time::<Fixed>::from_seconds(tuning.dt as f64))
        .insert_resource(tuning)
        .add_plugins(StoragePlugin)
        .add_plugins(GamePlugin)
        .add_plugins(ControlsPlugin)
        .add_plugins(PresentationPlugin)
        .add_plugins(UiPlugin)
        .run();
}
