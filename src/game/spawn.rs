use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use super::enemy::{Behavior, Enemy, EnemyKind};
use super::entities::{EntityId, EntityKind, Portal, PortalKind};
use super::events::SimEvent;
use super::session::Session;
use super::stats::types::{HitPoints, Seconds};
use super::tables::{ChanceRule, roll, roll_rules};

pub const BOSS_WAVE: u32 = 5;
pub const BOSS_PORTAL_LIFETIME: f32 = 60.0;
pub const GOLDEN_PORTAL_CHANCE: f64 = 0.25;
/// Waves past this add 5% hit points each.
pub const HP_SCALING_START_WAVE: u32 = 10;
pub const HP_SCALING_PER_WAVE: f32 = 0.05;
pub const HARD_MODE_HP_MULT: f32 = 2.0;
pub const HARD_MODE_SPEED_MULT: f32 = 1.2;
pub const HARD_MODE_DAMAGE_MULT: f32 = 2.0;
pub const NIGHT_SPEED_MULT: f32 = 1.1;

/// Extra enemies rolled at the start of every wave.
const SPECIAL_SPAWNS: [ChanceRule<EnemyKind>; 8] = [
    ChanceRule::on_even_waves(EnemyKind::Fast),
    ChanceRule::always(EnemyKind::White, 0.3),
    ChanceRule::always(EnemyKind::Magician, 0.2),
    ChanceRule::always(EnemyKind::Baby, 0.4),
    ChanceRule::after(EnemyKind::Stealth, 0.2, 5),
    ChanceRule::after(EnemyKind::Explosive, 0.15, 7),
    ChanceRule::after(EnemyKind::Knight, 0.2, 3),
    ChanceRule::after(EnemyKind::Bodyguard, 0.25, 4),
];

/// Stats a fresh enemy gets after wave, hard-mode and night scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledStats {
    pub hit_points: f32,
    pub speed: f32,
    pub damage: f32,
}

/// Apply spawn-time scaling in a fixed order: wave, then hard mode, then night.
pub fn scaled_stats(kind: EnemyKind, wave: u32, hard_mode: bool, night: bool) -> ScaledStats {
    let profile = kind.profile();
    let mut stats = ScaledStats {
        hit_points: profile.hit_points,
        speed: profile.speed,
        damage: profile.damage,
    };
    if wave > HP_SCALING_START_WAVE {
        stats.hit_points *= 1.0 + (wave - HP_SCALING_START_WAVE) as f32 * HP_SCALING_PER_WAVE;
    }
    if hard_mode {
        stats.hit_points *= HARD_MODE_HP_MULT;
        stats.speed *= HARD_MODE_SPEED_MULT;
        stats.damage *= HARD_MODE_DAMAGE_MULT;
    }
    if night {
        stats.speed *= NIGHT_SPEED_MULT;
    }
    stats
}

impl Session {
    pub(crate) fn random_arena_point(&mut self) -> Vec2 {
        let half = self.tuning.arena_half_extent;
        Vec2::new(self.rng.gen_range(-half..=half), self.rng.gen_range(-half..=half))
    }

    pub(crate) fn open_portal(&mut self, kind: PortalKind, position: Vec2) -> EntityId {
        let id = self.registry.alloc_id();
        let countdown = (kind == PortalKind::Boss).then_some(Seconds(BOSS_PORTAL_LIFETIME));
        self.registry.portals.push(Portal {
            id,
            kind,
            position,
            countdown,
        });
        self.push_event(SimEvent::Spawned {
            id,
            kind: EntityKind::Portal(kind),
        });
        id
    }

    pub(crate) fn close_portal(&mut self, id: EntityId) {
        if self.registry.take_portal(id).is_some() {
            self.push_event(SimEvent::Removed { id });
        }
    }

    pub(crate) fn open_initial_portals(&mut self) {
        for _ in 0..self.tuning.initial_portals {
            let at = self.random_arena_point();
            self.open_portal(PortalKind::Normal, at);
        }
    }

    /// Pick the portal a new enemy of `kind` comes out of.
    fn source_portal(&mut self, kind: EnemyKind, from_boss: bool) -> Option<(EntityId, Vec2)> {
        let pick = |p: &Portal| (p.id, p.position);
        if kind == EnemyKind::Golden {
            return self.registry.first_portal(PortalKind::Golden).map(pick);
        }
        if kind.requires_boss_portal() || from_boss {
            if let Some(boss) = self.registry.first_portal(PortalKind::Boss) {
                return Some(pick(boss));
            }
            if kind.requires_boss_portal() {
                return None;
            }
        }
        let candidates: Vec<_> = self
            .registry
            .portals
            .iter()
            .filter(|p| p.kind != PortalKind::Golden)
            .map(pick)
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Spawn one enemy at a portal. Returns `None` (and changes nothing) when no
    /// eligible portal exists, or for a second golden cube.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, from_boss: bool) -> Option<EntityId> {
        if kind == EnemyKind::Golden && self.registry.count_enemies(EnemyKind::Golden) > 0 {
            return None;
        }
        let (portal, position) = self.source_portal(kind, from_boss)?;

        let profile = kind.profile();
        let stats = scaled_stats(kind, self.wave.number, self.hard_mode, self.day_night.is_night());
        let id = self.registry.alloc_id();
        self.registry.enemies.push(Enemy {
            id,
            kind,
            position,
            hp: HitPoints::new(stats.hit_points),
            max_hp: stats.hit_points,
            base_speed: stats.speed,
            speed: stats.speed,
            damage: stats.damage,
            size: profile.size,
            stealth: profile.stealth,
            explosive: profile.explosive,
            portal: Some(portal),
            behavior: Behavior::for_kind(kind),
        });
        self.push_event(SimEvent::Spawned {
            id,
            kind: EntityKind::Enemy(kind),
        });
        Some(id)
    }

    /// Make sure a boss portal is open, then spawn `kind` from it.
    pub(crate) fn summon_boss(&mut self, kind: EnemyKind) -> Option<EntityId> {
        if self.registry.first_portal(PortalKind::Boss).is_none() {
            let at = self.random_arena_point();
            self.open_portal(PortalKind::Boss, at);
        }
        self.spawn_enemy(kind, true)
    }

    /// Open a golden portal and release the golden cube from it, unless a pair
    /// already exists.
    pub(crate) fn spawn_golden_pair(&mut self) -> Option<EntityId> {
        if self.registry.first_portal(PortalKind::Golden).is_some()
            || self.registry.count_enemies(EnemyKind::Golden) > 0
        {
            return None;
        }
        let at = self.random_arena_point();
        self.open_portal(PortalKind::Golden, at);
        self.spawn_enemy(EnemyKind::Golden, false)
    }

    pub(crate) fn close_golden_portal(&mut self) {
        if let Some(id) = self.registry.first_portal(PortalKind::Golden).map(|p| p.id) {
            self.close_portal(id);
        }
    }

    /// Start the next wave: quota, timer, special enemies and encounters.
    pub fn spawn_wave(&mut self) {
        let wave = self.wave.advance();
        info!("wave {wave} started ({} enemies queued)", self.wave.enemies_to_spawn);
        self.push_event(SimEvent::WaveStarted { wave });

        for kind in roll_rules(&SPECIAL_SPAWNS, wave, &mut self.rng) {
            self.spawn_enemy(kind, false);
        }
        if wave == BOSS_WAVE {
            self.summon_boss(EnemyKind::Boss);
        }
        if roll(&mut self.rng, GOLDEN_PORTAL_CHANCE) {
            self.spawn_golden_pair();
        }
        self.check_achievements();
    }

    /// Boss portals close when their countdown runs out.
    pub(crate) fn update_portals(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for portal in &mut self.registry.portals {
            if let Some(countdown) = portal.countdown.as_mut() {
                *countdown = countdown.dec(dt);
                if countdown.is_expired() {
                    expired.push(portal.id);
                }
            }
        }
        for id in expired {
            debug!("portal {id:?} expired");
            self.close_portal(id);
        }
    }
}
