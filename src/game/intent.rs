use bevy::prelude::*;

use super::economy::UpgradeKind;

/// Input intent: written in Update, consumed in FixedUpdate.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Desired movement direction (any length; normalized by the session).
    pub move_dir: Vec2,
    /// Attack button held.
    pub attack: bool,
    /// Ability key pressed since the last fixed step.
    pub ability: bool,
}

impl PlayerInput {
    /// Consume the latched ability press.
    pub fn take_ability(&mut self) -> bool {
        std::mem::take(&mut self.ability)
    }
}

/// Discrete UI actions, applied outside the fixed step.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Buy(UpgradeKind),
    Equip(usize),
    TogglePause,
    RestartWave,
}
