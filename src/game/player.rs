use bevy::math::Vec2;

use super::stats::effective::EffectiveStats;
use super::stats::types::{ControlEffect, HitPoints, Seconds};

pub const ATTACK_COOLDOWN: f32 = 0.3;
pub const ABILITY_COOLDOWN: f32 = 5.0;
pub const SPEED_BOOST_MULT: f32 = 2.0;
pub const REGEN_INTERVAL: f32 = 10.0;
pub const REGEN_AMOUNT: f32 = 5.0;
/// Damage floor for any mitigated hit.
pub const MIN_DAMAGE_TAKEN: f32 = 0.1;

/// The player avatar. Mutated every tick; partially reset on death.
#[derive(Debug, Clone)]
pub struct PlayerStats {
    pub position: Vec2,
    pub health: HitPoints,
    pub max_health: f32,
    pub coins: u32,
    pub kills: u32,
    pub base_speed: f32,
    pub speed: f32,
    pub damage: f32,
    pub armor: f32,
    /// Permanent max-health bonus from the health upgrade; survives re-equipping.
    pub bonus_max_health: f32,

    pub attack_timer: Seconds,
    pub stun_timer: Seconds,
    pub speed_boost: Seconds,
    pub armor_boost: Seconds,
    pub weapon_boost: Seconds,
    pub regen_timer: Seconds,
    pub regen_active: bool,
    pub ability_timer: Seconds,

    pub golden_kills: u32,
    pub white_kills: u32,
    pub radar: bool,
}

impl PlayerStats {
    pub fn new(stats: &EffectiveStats) -> Self {
        Self {
            position: Vec2::ZERO,
            health: stats.max_health,
            max_health: stats.max_health.0,
            coins: 0,
            kills: 0,
            base_speed: stats.speed,
            speed: stats.speed,
            damage: stats.damage,
            armor: stats.armor,
            bonus_max_health: 0.0,
            attack_timer: Seconds::ZERO,
            stun_timer: Seconds::ZERO,
            speed_boost: Seconds::ZERO,
            armor_boost: Seconds::ZERO,
            weapon_boost: Seconds::ZERO,
            regen_timer: Seconds::ZERO,
            regen_active: false,
            ability_timer: Seconds::ZERO,
            golden_kills: 0,
            white_kills: 0,
            radar: false,
        }
    }

    /// Copy derived stats in. Current health is clamped to the new maximum.
    pub fn apply_effective(&mut self, stats: &EffectiveStats) {
        self.max_health = stats.max_health.0;
        self.health = HitPoints::new(self.health.0.min(self.max_health));
        self.base_speed = stats.speed;
        self.damage = stats.damage;
        self.armor = stats.armor;
        self.refresh_speed();
    }

    pub fn refresh_speed(&mut self) {
        self.speed = if self.speed_boost.is_active() {
            self.base_speed * SPEED_BOOST_MULT
        } else {
            self.base_speed
        };
    }

    pub fn tick_timers(&mut self, dt: f32) {
        self.attack_timer = self.attack_timer.dec(dt);
        self.stun_timer = self.stun_timer.dec(dt);
        self.speed_boost = self.speed_boost.dec(dt);
        self.armor_boost = self.armor_boost.dec(dt);
        self.weapon_boost = self.weapon_boost.dec(dt);
        self.ability_timer = self.ability_timer.dec(dt);
        self.refresh_speed();
    }

    /// Advance the regen cycle; heals once per completed cycle.
    pub fn tick_regen(&mut self, dt: f32) -> bool {
        if !self.regen_active || self.is_dead() {
            return false;
        }
        self.regen_timer = self.regen_timer.dec(dt);
        if self.regen_timer.is_expired() {
            self.health = self.health.add_clamped(REGEN_AMOUNT, self.max_health);
            self.regen_timer = Seconds(REGEN_INTERVAL);
            return true;
        }
        false
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer.is_active()
    }

    pub fn is_dead(&self) -> bool {
        !self.health.is_alive()
    }

    pub fn armor_reduction(&self) -> f32 {
        let per_point = if self.armor_boost.is_active() { 0.2 } else { 0.1 };
        self.armor * per_point
    }

    /// Damage after armor, never below `MIN_DAMAGE_TAKEN`.
    pub fn mitigate(&self, raw: f32) -> f32 {
        (raw - self.armor_reduction()).max(MIN_DAMAGE_TAKEN)
    }

    /// Subtract raw damage and return the amount actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health.0;
        self.health = self.health.sub_clamped(amount.max(0.0));
        before - self.health.0
    }

    pub fn apply_control(&mut self, control: ControlEffect, away_from: Vec2, half_extent: f32) {
        match control {
            ControlEffect::Stun { duration } => {
                if duration.0 > self.stun_timer.0 {
                    self.stun_timer = duration;
                }
            }
            ControlEffect::Knockback { distance } => {
                let dir = (self.position - away_from).normalize_or_zero();
                let dir = if dir == Vec2::ZERO { Vec2::X } else { dir };
                self.position = clamp_to_arena(self.position + dir * distance, half_extent);
            }
        }
    }

    /// Damage to use for melee right now.
    pub fn attack_damage(&self) -> f32 {
        if self.weapon_boost.is_active() {
            self.damage.max(super::economy::WEAPON_BOOST_DAMAGE)
        } else {
            self.damage
        }
    }

    pub fn attack_range(&self) -> f32 {
        if self.weapon_boost.is_active() {
            super::combat::BOOSTED_MELEE_RANGE
        } else {
            super::combat::MELEE_RANGE
        }
    }

    /// Death reset: run counters, timers and purchased effects go; equipment stays.
    pub fn reset_for_new_run(&mut self, stats: &EffectiveStats) {
        *self = Self::new(stats);
    }
}

pub fn clamp_to_arena(p: Vec2, half_extent: f32) -> Vec2 {
    p.clamp(Vec2::splat(-half_extent), Vec2::splat(half_extent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerStats {
        PlayerStats::new(&EffectiveStats::default())
    }

    #[test]
    fn regen_does_not_revive_a_dead_player() {
        let mut p = player();
        p.regen_active = true;
        p.regen_timer = Seconds(0.01);
        p.health = HitPoints(0.0);
        assert!(!p.tick_regen(0.016));
        assert!(p.is_dead());
    }

    #[test]
    fn mitigation_uses_boost_rate_and_floor() {
        let mut p = player();
        p.armor = 5.0;
        assert!((p.mitigate(1.0) - 0.5).abs() < 1e-6);
        p.armor_boost = Seconds(17.0);
        assert!((p.mitigate(1.0) - MIN_DAMAGE_TAKEN).abs() < 1e-6);
        assert!((p.mitigate(10.0) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn speed_boost_doubles_until_expiry() {
        let mut p = player();
        p.speed_boost = Seconds(0.02);
        p.refresh_speed();
        assert!((p.speed - 0.2).abs() < 1e-6);
        p.tick_timers(0.016);
        p.tick_timers(0.016);
        assert!((p.speed - 0.1).abs() < 1e-6);
    }

    #[test]
    fn regen_heals_once_per_cycle() {
        let mut p = player();
        p.health = HitPoints(50.0);
        p.regen_active = true;
        p.regen_timer = Seconds(REGEN_INTERVAL);
        let mut heals = 0;
        for _ in 0..1300 {
            if p.tick_regen(0.016) {
                heals += 1;
            }
        }
        assert_eq!(heals, 2);
        assert_eq!(p.health.0, 60.0);
    }

    #[test]
    fn knockback_stays_inside_arena() {
        let mut p = player();
        p.position = Vec2::new(19.5, 0.0);
        p.apply_control(ControlEffect::Knockback { distance: 3.0 }, Vec2::new(18.0, 0.0), 20.0);
        assert_eq!(p.position, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn longer_stun_wins() {
        let mut p = player();
        p.apply_control(ControlEffect::Stun { duration: Seconds(2.0) }, Vec2::ZERO, 20.0);
        p.apply_control(ControlEffect::Stun { duration: Seconds(1.0) }, Vec2::ZERO, 20.0);
        assert_eq!(p.stun_timer, Seconds(2.0));
    }

    #[test]
    fn damage_floors_health_at_zero() {
        let mut p = player();
        let taken = p.take_damage(250.0);
        assert_eq!(taken, 100.0);
        assert!(p.is_dead());
    }
}
