use bevy::prelude::*;

use super::enemy::EnemyKind;
use super::session::Session;
use super::stats::types::Seconds;

pub const WAVE_DURATION: f32 = 10.0;
pub const ENEMIES_PER_WAVE: u32 = 5;
pub const TRICKLE_INTERVAL: f32 = 0.5;

/// Wave progression. `number` only goes up inside a run.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveState {
    pub number: u32,
    pub timer: Seconds,
    /// Normals still owed by the trickle spawner this wave.
    pub enemies_to_spawn: u32,
    pub spawn_timer: Seconds,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            number: 0,
            timer: Seconds::ZERO,
            enemies_to_spawn: 0,
            spawn_timer: Seconds::ZERO,
        }
    }
}

impl WaveState {
    /// Move to the next wave and return its number.
    pub fn advance(&mut self) -> u32 {
        self.number += 1;
        self.timer = Seconds(WAVE_DURATION);
        self.enemies_to_spawn = self.number * ENEMIES_PER_WAVE;
        self.spawn_timer = Seconds(TRICKLE_INTERVAL);
        self.number
    }

    pub fn is_spawning(&self) -> bool {
        self.enemies_to_spawn > 0
    }
}

impl Session {
    /// Trickle spawner plus the wave-clear check.
    pub(crate) fn update_wave(&mut self, dt: f32) {
        self.wave.timer = self.wave.timer.dec(dt);

        if self.wave.is_spawning() && !self.registry.portals.is_empty() {
            self.wave.spawn_timer = self.wave.spawn_timer.dec(dt);
            if self.wave.spawn_timer.is_expired() {
                self.wave.spawn_timer = Seconds(TRICKLE_INTERVAL);
                if self.spawn_enemy(EnemyKind::Normal, false).is_some() {
                    self.wave.enemies_to_spawn -= 1;
                }
            }
        }

        if self.wave_cleared() {
            debug!("wave {} cleared", self.wave.number);
            self.spawn_wave();
        }
    }

    pub fn wave_cleared(&self) -> bool {
        self.wave.timer.is_expired() && !self.wave.is_spawning() && self.registry.hostile_count() == 0
    }
}
