use std::sync::Arc;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::achievements::{Achievements, Leaderboard};
use super::ambient::DayNight;
use super::entities::Registry;
use super::events::SimEvent;
use super::intent::PlayerInput;
use super::inventory::{Equipped, Inventory};
use super::player::{PlayerStats, clamp_to_arena};
use super::stats::base::BaseStats;
use super::stats::modifier::ModifierSet;
use super::stats::types::{HitPoints, Seconds, Tick};
use super::wave::{WAVE_DURATION, WaveState};
use crate::config::tuning::Tuning;
use crate::storage::memory::MemoryStore;
use crate::storage::repo::SaveStore;

/// One play session: every piece of run state plus the persistent progress it
/// reports into. All mutation goes through `tick` or the explicit actions.
#[derive(Resource)]
pub struct Session {
    pub tuning: Tuning,
    pub base: BaseStats,
    pub player: PlayerStats,
    pub registry: Registry,
    pub wave: WaveState,
    pub inventory: Inventory,
    pub equipped: Equipped,
    pub achievements: Achievements,
    pub leaderboard: Leaderboard,
    pub day_night: DayNight,
    pub hard_mode: bool,
    pub paused: bool,
    pub tick: Tick,
    pub(crate) rng: ChaCha8Rng,
    events: Vec<SimEvent>,
    pub(crate) store: Arc<dyn SaveStore>,
}

impl Session {
    /// A fresh session with portals open and wave 1 running.
    pub fn new(tuning: Tuning, store: Arc<dyn SaveStore>) -> Self {
        let mut session = Self::blank(tuning, store);
        session.load_progress();
        session.open_initial_portals();
        session.spawn_wave();
        session
    }

    /// Deterministic session backed by an in-memory store.
    pub fn seeded(seed: u64) -> Self {
        let tuning = Tuning {
            seed: Some(seed),
            ..Tuning::default()
        };
        Self::new(tuning, Arc::new(MemoryStore::default()))
    }

    /// Deterministic session at wave 1 with portals open but nothing spawned and
    /// nothing queued. Scripted scenarios start from here.
    pub fn quiet(seed: u64) -> Self {
        let tuning = Tuning {
            seed: Some(seed),
            ..Tuning::default()
        };
        let mut session = Self::blank(tuning, Arc::new(MemoryStore::default()));
        session.open_initial_portals();
        session.wave.number = 1;
        session.wave.timer = Seconds(WAVE_DURATION);
        session
    }

    fn blank(tuning: Tuning, store: Arc<dyn SaveStore>) -> Self {
        let seed = tuning.seed.unwrap_or_else(rand::random);
        info!("session seed {seed}");
        let base = BaseStats::default();
        let effective = ModifierSet::new().compute_effective(&base);
        Self {
            day_night: DayNight::new(tuning.day_length_secs),
            tuning,
            base,
            player: PlayerStats::new(&effective),
            registry: Registry::default(),
            wave: WaveState::default(),
            inventory: Inventory::default(),
            equipped: Equipped::default(),
            achievements: Achievements::default(),
            leaderboard: Leaderboard::default(),
            hard_mode: false,
            paused: false,
            tick: Tick::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
            store,
        }
    }

    /// Swap the save store and reload progress from it.
    pub fn with_store(mut self, store: Arc<dyn SaveStore>) -> Self {
        self.attach_store(store);
        self
    }

    pub fn attach_store(&mut self, store: Arc<dyn SaveStore>) {
        self.store = store;
        self.load_progress();
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the simulation by one fixed step.
    pub fn tick(&mut self, dt: f32, input: &mut PlayerInput) {
        if self.paused {
            return;
        }
        self.tick = self.tick.next();

        self.update_player(dt, input);
        if self.end_run_if_dead() {
            return;
        }

        self.update_enemies(dt);
        self.update_projectiles();
        self.update_traps(dt);
        if self.end_run_if_dead() {
            return;
        }

        // Ally kills can detonate explosives next to the player.
        self.update_allies(dt);
        if self.end_run_if_dead() {
            return;
        }
        self.update_ambient(dt);
        self.update_portals(dt);
        self.update_wave(dt);
    }

    fn update_player(&mut self, dt: f32, input: &mut PlayerInput) {
        self.player.tick_timers(dt);
        self.player.tick_regen(dt);

        if !self.player.is_stunned() {
            let dir = input.move_dir.normalize_or_zero();
            let half = self.tuning.arena_half_extent;
            self.player.position = clamp_to_arena(self.player.position + dir * self.player.speed, half);
        }
        if input.attack {
            self.try_player_attack();
        }
        if input.take_ability() {
            self.use_ability();
        }
        self.collect_pickups();
    }

    fn end_run_if_dead(&mut self) -> bool {
        if !self.player.is_dead() {
            return false;
        }
        self.game_over();
        true
    }

    /// Record the score, then start a new run from wave 1.
    pub fn game_over(&mut self) {
        let score = self.player.kills;
        info!("game over at wave {} with {score} kills", self.wave.number);
        self.save_score(score);
        self.check_achievements();
        self.push_event(SimEvent::GameOver { score });
        self.reset_run();
    }

    /// Clear the field and run counters. Inventory, equipment, hard mode and
    /// persistent progress carry over.
    pub fn reset_run(&mut self) {
        for id in self.registry.clear() {
            self.push_event(SimEvent::Removed { id });
        }
        let effective = ModifierSet::new().compute_effective(&self.base);
        self.player.reset_for_new_run(&effective);
        self.recompute_stats();
        self.player.health = HitPoints::new(self.player.max_health);
        self.wave = WaveState::default();

        self.open_initial_portals();
        self.spawn_wave();
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            info!("{}", if paused { "paused" } else { "resumed" });
            self.push_event(SimEvent::PauseChanged { paused });
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Drop the enemies on the field and start the current wave over.
    pub fn restart_wave(&mut self) {
        let enemies: Vec<_> = self.registry.enemies.drain(..).map(|e| e.id).collect();
        let shots: Vec<_> = self.registry.projectiles.drain(..).map(|p| p.id).collect();
        for id in enemies.into_iter().chain(shots) {
            self.push_event(SimEvent::Removed { id });
        }
        self.close_golden_portal();
        self.wave.number = self.wave.number.saturating_sub(1);
        self.spawn_wave();
    }

    pub fn health_fraction(&self) -> f32 {
        self.player.health.display_fraction(self.player.max_health)
    }

    /// Hot-swap tuning. Only knobs that are safe mid-run take effect.
    pub fn apply_tuning(&mut self, tuning: Tuning) {
        let half = tuning.arena_half_extent;
        self.player.position = clamp_to_arena(self.player.position, half);
        if tuning.day_length_secs != self.tuning.day_length_secs {
            self.day_night = DayNight::new(tuning.day_length_secs);
        }
        self.tuning = tuning;
    }
}
