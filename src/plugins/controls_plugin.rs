use bevy::prelude::*;

use crate::game::{
    components::UiPanels,
    economy::UpgradeKind,
    intent::{PlayerInput, UiAction},
};
use crate::plugins::game_plugin::FrameSet;

const DIGIT_KEYS: [(KeyCode, char); 9] = [
    (KeyCode::Digit1, '1'),
    (KeyCode::Digit2, '2'),
    (KeyCode::Digit3, '3'),
    (KeyCode::Digit4, '4'),
    (KeyCode::Digit5, '5'),
    (KeyCode::Digit6, '6'),
    (KeyCode::Digit7, '7'),
    (KeyCode::Digit8, '8'),
    (KeyCode::Digit9, '9'),
];

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (read_player_input, read_ui_keys).in_set(FrameSet::InputSet),
        );
    }
}

/// WASD / arrows move, Space attacks, Q latches the helm ability.
fn read_player_input(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut dir = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    input.move_dir = dir;
    input.attack = keyboard.pressed(KeyCode::Space);
    // Latched until the next fixed step consumes it.
    if keyboard.just_pressed(KeyCode::KeyQ) {
        input.ability = true;
    }
}

fn read_ui_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut panels: ResMut<UiPanels>,
    mut actions: MessageWriter<UiAction>,
) {
    if keyboard.just_pressed(KeyCode::KeyI) {
        panels.inventory_open = !panels.inventory_open;
    }
    if keyboard.just_pressed(KeyCode::KeyP) || keyboard.just_pressed(KeyCode::Escape) {
        actions.write(UiAction::TogglePause);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        actions.write(UiAction::RestartWave);
    }

    for (slot, (key, hotkey)) in DIGIT_KEYS.into_iter().enumerate() {
        if !keyboard.just_pressed(key) {
            continue;
        }
        if panels.inventory_open {
            actions.write(UiAction::Equip(slot));
        } else if let Some(upgrade) = UpgradeKind::from_hotkey(hotkey) {
            actions.write(UiAction::Buy(upgrade));
        }
    }
}
