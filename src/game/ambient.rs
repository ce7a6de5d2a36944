use bevy::math::Vec2;
use rand::Rng;

use super::entities::{EntityKind, Particle, ParticleTint};
use super::events::SimEvent;
use super::session::Session;
use super::stats::types::Seconds;

pub const PARTICLE_LIFETIME: f32 = 0.5;
/// World units per tick.
const PARTICLE_MAX_SPEED: f32 = 0.1;

/// Day-night cycle. Phase runs 0 → 1 over `length` seconds, then wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct DayNight {
    elapsed: f32,
    length: f32,
}

impl DayNight {
    pub fn new(length: f32) -> Self {
        Self {
            elapsed: 0.0,
            length: length.max(f32::EPSILON),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt) % self.length;
    }

    pub fn phase(&self) -> f32 {
        self.elapsed / self.length
    }

    /// Second half of the cycle. Enemies spawned at night move faster.
    pub fn is_night(&self) -> bool {
        self.phase() > 0.5
    }

    /// Ambient light level for the presentation layer, 1 at noon and 0.35 at midnight.
    pub fn light_level(&self) -> f32 {
        let day = (self.phase() * std::f32::consts::TAU).cos() * 0.5 + 0.5;
        0.35 + 0.65 * day
    }
}

impl Session {
    pub(crate) fn emit_particles(&mut self, position: Vec2, tint: ParticleTint, count: usize) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(0.02..PARTICLE_MAX_SPEED);
            let id = self.registry.alloc_id();
            self.registry.particles.push(Particle {
                id,
                tint,
                position,
                velocity: Vec2::from_angle(angle) * speed,
                remaining: Seconds(PARTICLE_LIFETIME),
            });
            self.push_event(SimEvent::Spawned {
                id,
                kind: EntityKind::Particle(tint),
            });
        }
    }

    /// Day-night clock and particle drift.
    pub(crate) fn update_ambient(&mut self, dt: f32) {
        self.day_night.tick(dt);

        for p in &mut self.registry.particles {
            p.position += p.velocity;
            p.remaining = p.remaining.dec(dt);
        }
        let expired: Vec<_> = self
            .registry
            .particles
            .iter()
            .filter(|p| p.remaining.is_expired())
            .map(|p| p.id)
            .collect();
        self.registry.particles.retain(|p| p.remaining.is_active());
        for id in expired {
            self.push_event(SimEvent::Removed { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_wraps_and_night_is_second_half() {
        let mut dn = DayNight::new(120.0);
        assert!(!dn.is_night());
        dn.tick(61.0);
        assert!(dn.is_night());
        dn.tick(60.0);
        assert!(dn.phase() < 0.05);
        assert!(!dn.is_night());
    }

    #[test]
    fn light_is_brightest_at_phase_zero() {
        let mut dn = DayNight::new(100.0);
        let noon = dn.light_level();
        dn.tick(50.0);
        assert!((noon - 1.0).abs() < 1e-5);
        assert!((dn.light_level() - 0.35).abs() < 1e-5);
    }

    #[test]
    fn particles_fade_out() {
        let mut s = Session::quiet(1);
        s.emit_particles(Vec2::ZERO, ParticleTint::Blood, 4);
        assert_eq!(s.registry.particles.len(), 4);
        for _ in 0..40 {
            s.update_ambient(0.016);
        }
        assert!(s.registry.particles.is_empty());
    }
}
