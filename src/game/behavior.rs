use bevy::prelude::*;
use rand::Rng;

use super::enemy::{
    BODYGUARD_SHOT_INTERVAL, BOSS_SHOCKWAVE_INTERVAL, BOSS_SUMMON_INTERVAL, BOSS_SWING_INTERVAL, Behavior,
    CASTER_BOLT_INTERVAL, EnemyKind, GOLDEN_TURN_INTERVAL, KNIGHT_CHARGE_COOLDOWN, MINI_BOSS_SWING_INTERVAL,
    PHILIP_SWING_INTERVAL, WIZARD_BURST_INTERVAL,
};
use super::entities::{EntityId, EntityKind, Projectile};
use super::events::SimEvent;
use super::player::clamp_to_arena;
use super::session::Session;
use super::stats::types::{ControlEffect, DamageSource, Seconds};
use super::tables::roll;

pub const CONTACT_RADIUS: f32 = 1.0;
pub const CONTACT_STUN: f32 = 2.0;
pub const BOSS_SWING_RANGE: f32 = 3.0;
pub const BOSS_SHOCKWAVE_RANGE: f32 = 5.0;
pub const BOSS_SHOCKWAVE_STUN: f32 = 1.0;
pub const BOSS_MINIONS: usize = 3;
pub const MINI_BOSS_RANGE: f32 = 3.0;
pub const MINI_BOSS_STUN: f32 = 0.5;
pub const WIZARD_BURST_COUNT: usize = 5;
pub const KNIGHT_CHARGE_RANGE: f32 = 5.0;
pub const KNIGHT_CHARGE_SPEED: f32 = 0.3;
pub const KNIGHT_KNOCKBACK: f32 = 3.0;
pub const PHILIP_RANGE: f32 = 1.5;
pub const PHILIP_STUN_CHANCE: f64 = 0.3;
pub const PHILIP_STUN: f32 = 1.0;
pub const PROJECTILE_SPEED: f32 = 0.2;
pub const PROJECTILE_HIT_RADIUS: f32 = 1.0;
pub const PROJECTILE_MAX_RANGE: f32 = 30.0;
pub const TRAP_RADIUS: f32 = 1.0;
pub const TRAP_SLOW: f32 = 0.5;
/// Trap damage per tick, not per second.
pub const TRAP_CHIP: f32 = 0.016;
/// A golden cube this close to its portal has made it home.
pub const GOLDEN_HOME_RADIUS: f32 = 0.5;

/// Side effects an enemy queues during its update. Applied once every enemy has
/// moved, so the enemy list is never borrowed twice.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    HitPlayer { raw: f32 },
    Control { control: ControlEffect, from: Vec2 },
    Shoot { from: Vec2, direction: Vec2, damage: f32 },
    Summon { kind: EnemyKind, count: usize },
    GoldenHome { enemy: EntityId, portal: Option<EntityId> },
    Prune { enemy: EntityId },
}

impl Session {
    /// Move every enemy, run its sub-behavior and resolve what it did.
    pub(crate) fn update_enemies(&mut self, dt: f32) {
        let player = self.player.position;
        let half = self.tuning.arena_half_extent;
        let mut actions = Vec::new();
        let mut trap_kills = Vec::new();

        for enemy in &mut self.registry.enemies {
            if !enemy.is_valid() {
                actions.push(Action::Prune { enemy: enemy.id });
                continue;
            }
            enemy.behavior.tick(dt);
            let to_player = player - enemy.position;
            let dist = to_player.length();

            // Speed for this tick: base, knight charge, then trap slow.
            let mut speed = enemy.base_speed;
            if let Behavior::Knight { charge } = enemy.behavior {
                if charge.is_expired() && dist <= KNIGHT_CHARGE_RANGE {
                    speed = KNIGHT_CHARGE_SPEED;
                }
            }
            let trapped = self
                .registry
                .traps
                .iter()
                .any(|t| t.position.distance(enemy.position) <= TRAP_RADIUS);
            if trapped {
                speed *= TRAP_SLOW;
                enemy.hp = enemy.hp.sub_clamped(TRAP_CHIP);
                if !enemy.hp.is_alive() {
                    trap_kills.push((enemy.id, DamageSource::Trap));
                    continue;
                }
            }
            enemy.speed = speed;

            match &mut enemy.behavior {
                Behavior::Golden { lifetime, turn, heading } => {
                    if lifetime.is_active() {
                        if turn.is_expired() {
                            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                            *heading = Vec2::from_angle(angle);
                            *turn = Seconds(GOLDEN_TURN_INTERVAL);
                        }
                        enemy.position = clamp_to_arena(enemy.position + *heading * speed, half);
                    } else {
                        let home = enemy.portal.and_then(|id| self.registry.portals.iter().find(|p| p.id == id));
                        match home {
                            Some(portal) if portal.position.distance(enemy.position) > GOLDEN_HOME_RADIUS.max(speed) => {
                                let step = (portal.position - enemy.position).normalize_or_zero() * speed;
                                enemy.position += step;
                            }
                            _ => actions.push(Action::GoldenHome {
                                enemy: enemy.id,
                                portal: enemy.portal,
                            }),
                        }
                    }
                    continue;
                }
                _ => {
                    enemy.position += to_player.normalize_or_zero() * speed;
                    if enemy.kind == EnemyKind::Baby {
                        enemy.position = clamp_to_arena(enemy.position, half);
                    }
                }
            }

            let dist = enemy.position.distance(player);
            if enemy.kind.deals_contact_damage() && dist <= CONTACT_RADIUS {
                actions.push(Action::HitPlayer { raw: enemy.damage });
                if enemy.kind.contact_stuns() {
                    actions.push(Action::Control {
                        control: ControlEffect::Stun {
                            duration: Seconds(CONTACT_STUN),
                        },
                        from: enemy.position,
                    });
                }
            }

            let aim = (player - enemy.position).normalize_or_zero();
            match &mut enemy.behavior {
                Behavior::Boss { swing, summon, shockwave } => {
                    if swing.is_expired() && dist <= BOSS_SWING_RANGE {
                        actions.push(Action::HitPlayer { raw: enemy.damage });
                        *swing = Seconds(BOSS_SWING_INTERVAL);
                    }
                    if summon.is_expired() {
                        actions.push(Action::Summon {
                            kind: EnemyKind::Minion,
                            count: BOSS_MINIONS,
                        });
                        *summon = Seconds(BOSS_SUMMON_INTERVAL);
                    }
                    if shockwave.is_expired() && dist <= BOSS_SHOCKWAVE_RANGE {
                        actions.push(Action::Control {
                            control: ControlEffect::Stun {
                                duration: Seconds(BOSS_SHOCKWAVE_STUN),
                            },
                            from: enemy.position,
                        });
                        *shockwave = Seconds(BOSS_SHOCKWAVE_INTERVAL);
                    }
                }
                Behavior::MiniBoss { swing } => {
                    if swing.is_expired() && dist <= MINI_BOSS_RANGE {
                        actions.push(Action::HitPlayer { raw: enemy.damage });
                        actions.push(Action::Control {
                            control: ControlEffect::Stun {
                                duration: Seconds(MINI_BOSS_STUN),
                            },
                            from: enemy.position,
                        });
                        *swing = Seconds(MINI_BOSS_SWING_INTERVAL);
                    }
                }
                Behavior::Caster { bolt, burst } => {
                    if bolt.is_expired() {
                        actions.push(Action::Shoot {
                            from: enemy.position,
                            direction: aim,
                            damage: enemy.damage,
                        });
                        *bolt = Seconds(CASTER_BOLT_INTERVAL);
                    }
                    if let Some(burst) = burst {
                        if burst.is_expired() {
                            for _ in 0..WIZARD_BURST_COUNT {
                                let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                                actions.push(Action::Shoot {
                                    from: enemy.position,
                                    direction: Vec2::from_angle(angle),
                                    damage: enemy.damage,
                                });
                            }
                            *burst = Seconds(WIZARD_BURST_INTERVAL);
                        }
                    }
                }
                Behavior::Knight { charge } => {
                    if charge.is_expired() && dist <= CONTACT_RADIUS {
                        actions.push(Action::HitPlayer { raw: enemy.damage });
                        actions.push(Action::Control {
                            control: ControlEffect::Knockback {
                                distance: KNIGHT_KNOCKBACK,
                            },
                            from: enemy.position,
                        });
                        *charge = Seconds(KNIGHT_CHARGE_COOLDOWN);
                        enemy.speed = enemy.base_speed;
                    }
                }
                Behavior::Bodyguard { shot } => {
                    if shot.is_expired() {
                        actions.push(Action::Shoot {
                            from: enemy.position,
                            direction: aim,
                            damage: enemy.damage,
                        });
                        *shot = Seconds(BODYGUARD_SHOT_INTERVAL);
                    }
                }
                Behavior::Philip { swing } => {
                    if swing.is_expired() && dist <= PHILIP_RANGE {
                        actions.push(Action::HitPlayer { raw: enemy.damage });
                        if roll(&mut self.rng, PHILIP_STUN_CHANCE) {
                            actions.push(Action::Control {
                                control: ControlEffect::Stun {
                                    duration: Seconds(PHILIP_STUN),
                                },
                                from: enemy.position,
                            });
                        }
                        *swing = Seconds(PHILIP_SWING_INTERVAL);
                    }
                }
                Behavior::Plain | Behavior::Golden { .. } => {}
            }
        }

        for action in actions {
            self.apply_action(action);
        }
        if !trap_kills.is_empty() {
            self.resolve_kills(trap_kills);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::HitPlayer { raw } => self.hurt_player(raw),
            Action::Control { control, from } => {
                let half = self.tuning.arena_half_extent;
                self.player.apply_control(control, from, half);
            }
            Action::Shoot { from, direction, damage } => {
                if direction == Vec2::ZERO {
                    return;
                }
                let id = self.registry.alloc_id();
                self.registry.projectiles.push(Projectile {
                    id,
                    position: from,
                    direction,
                    speed: PROJECTILE_SPEED,
                    damage,
                    travelled: 0.0,
                });
                self.push_event(SimEvent::Spawned {
                    id,
                    kind: EntityKind::Projectile,
                });
            }
            Action::Summon { kind, count } => {
                for _ in 0..count {
                    self.spawn_enemy(kind, true);
                }
            }
            Action::GoldenHome { enemy, portal } => {
                if self.registry.take_enemy(enemy).is_some() {
                    self.push_event(SimEvent::Removed { id: enemy });
                }
                if let Some(portal) = portal {
                    self.close_portal(portal);
                }
            }
            Action::Prune { enemy } => {
                warn!("pruning enemy {enemy:?} with invalid state");
                if self.registry.take_enemy(enemy).is_some() {
                    self.push_event(SimEvent::Removed { id: enemy });
                }
            }
        }
    }

    /// Armor-mitigated hit on the player.
    pub(crate) fn hurt_player(&mut self, raw: f32) {
        let amount = self.player.mitigate(raw);
        let taken = self.player.take_damage(amount);
        if taken > 0.0 {
            self.push_event(SimEvent::PlayerDamaged { amount: taken });
        }
    }

    /// Fly projectiles; they stop at the player or after their maximum range.
    pub(crate) fn update_projectiles(&mut self) {
        let player = self.player.position;
        let mut hits = Vec::new();
        let mut gone = Vec::new();
        for p in &mut self.registry.projectiles {
            p.position += p.direction * p.speed;
            p.travelled += p.speed;
            if p.position.distance(player) <= PROJECTILE_HIT_RADIUS {
                hits.push(p.damage);
                gone.push(p.id);
            } else if p.travelled >= PROJECTILE_MAX_RANGE {
                gone.push(p.id);
            }
        }
        self.registry.projectiles.retain(|p| !gone.contains(&p.id));
        for id in gone {
            self.push_event(SimEvent::Removed { id });
        }
        for raw in hits {
            self.hurt_player(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{PortalKind, Trap};
    use crate::game::stats::types::HitPoints;

    fn place(s: &mut Session, kind: EnemyKind, at: Vec2) -> EntityId {
        let id = if kind.requires_boss_portal() {
            s.summon_boss(kind)
        } else {
            s.spawn_enemy(kind, false)
        }
        .unwrap();
        s.registry.enemy_mut(id).unwrap().position = at;
        id
    }

    #[test]
    fn enemies_walk_toward_the_player() {
        let mut s = Session::quiet(1);
        let id = place(&mut s, EnemyKind::Normal, Vec2::new(10.0, 0.0));
        s.update_enemies(0.016);
        let e = s.registry.enemy(id).unwrap();
        assert!((e.position.x - (10.0 - 0.03)).abs() < 1e-5);
        assert_eq!(e.position.y, 0.0);
    }

    #[test]
    fn contact_damage_is_mitigated_per_tick() {
        let mut s = Session::quiet(2);
        s.player.armor = 5.0;
        place(&mut s, EnemyKind::Normal, Vec2::new(0.5, 0.0));
        s.update_enemies(0.016);
        assert!((s.player.health.0 - 99.5).abs() < 1e-4);

        s.player.armor_boost = Seconds(17.0);
        s.update_enemies(0.016);
        assert!((s.player.health.0 - 99.4).abs() < 1e-4);
    }

    #[test]
    fn golden_cube_never_hurts() {
        let mut s = Session::quiet(3);
        let id = s.spawn_golden_pair().unwrap();
        s.registry.enemy_mut(id).unwrap().position = Vec2::ZERO;
        for _ in 0..10 {
            s.update_enemies(0.016);
        }
        assert_eq!(s.player.health.0, 100.0);
    }

    #[test]
    fn golden_cube_returns_home_without_reward() {
        let mut s = Session::quiet(4);
        let id = s.spawn_golden_pair().unwrap();
        s.player.position = Vec2::new(100.0, 100.0);
        // Ten seconds of wander, then the walk home.
        for _ in 0..4000 {
            s.update_enemies(0.016);
            if s.registry.enemy(id).is_none() {
                break;
            }
        }
        assert!(s.registry.enemy(id).is_none());
        assert!(s.registry.first_portal(PortalKind::Golden).is_none());
        assert_eq!(s.player.kills, 0);
        assert!(s.registry.coins.is_empty());
    }

    #[test]
    fn boss_contact_stuns_and_swings() {
        let mut s = Session::quiet(5);
        place(&mut s, EnemyKind::Boss, Vec2::new(0.5, 0.0));
        s.update_enemies(0.016);
        assert!(s.player.is_stunned());
        // Contact (2) plus the sword swing (2).
        assert!((s.player.health.0 - 96.0).abs() < 1e-4);
    }

    #[test]
    fn boss_summons_minions_on_cooldown() {
        let mut s = Session::quiet(6);
        let boss = place(&mut s, EnemyKind::Boss, Vec2::new(15.0, 15.0));
        s.player.position = Vec2::new(-15.0, -15.0);
        if let Behavior::Boss { summon, .. } = &mut s.registry.enemy_mut(boss).unwrap().behavior {
            *summon = Seconds(0.01);
        }
        s.update_enemies(0.016);
        assert_eq!(s.registry.count_enemies(EnemyKind::Minion), BOSS_MINIONS);
    }

    #[test]
    fn magician_fires_and_projectile_hits() {
        let mut s = Session::quiet(7);
        let id = place(&mut s, EnemyKind::Magician, Vec2::new(5.0, 0.0));
        if let Behavior::Caster { bolt, .. } = &mut s.registry.enemy_mut(id).unwrap().behavior {
            *bolt = Seconds::ZERO;
        }
        s.update_enemies(0.016);
        assert_eq!(s.registry.projectiles.len(), 1);
        s.registry.enemies.clear();

        for _ in 0..40 {
            s.update_projectiles();
        }
        assert!(s.registry.projectiles.is_empty());
        assert!((s.player.health.0 - 99.0).abs() < 1e-4);
    }

    #[test]
    fn stray_projectiles_expire() {
        let mut s = Session::quiet(8);
        s.apply_action(Action::Shoot {
            from: Vec2::new(5.0, 0.0),
            direction: Vec2::X,
            damage: 1.0,
        });
        for _ in 0..200 {
            s.update_projectiles();
        }
        assert!(s.registry.projectiles.is_empty());
        assert_eq!(s.player.health.0, 100.0);
    }

    #[test]
    fn wizard_king_bursts_five() {
        let mut s = Session::quiet(9);
        let id = place(&mut s, EnemyKind::WizardKing, Vec2::new(10.0, 0.0));
        if let Behavior::Caster { burst, .. } = &mut s.registry.enemy_mut(id).unwrap().behavior {
            *burst = Some(Seconds::ZERO);
        }
        s.update_enemies(0.016);
        assert_eq!(s.registry.projectiles.len(), WIZARD_BURST_COUNT);
    }

    #[test]
    fn knight_charges_then_knocks_back() {
        let mut s = Session::quiet(10);
        let id = place(&mut s, EnemyKind::Knight, Vec2::new(4.0, 0.0));
        s.update_enemies(0.016);
        assert_eq!(s.registry.enemy(id).unwrap().speed, KNIGHT_CHARGE_SPEED);

        s.registry.enemy_mut(id).unwrap().position = Vec2::new(0.8, 0.0);
        s.update_enemies(0.016);
        assert!((s.player.health.0 - 90.0).abs() < 1e-4);
        assert!(s.player.position.x < -2.0);
        let knight = s.registry.enemy(id).unwrap();
        assert_eq!(knight.speed, knight.base_speed);
        assert!(matches!(knight.behavior, Behavior::Knight { charge } if charge.is_active()));
    }

    #[test]
    fn bodyguard_only_shoots() {
        let mut s = Session::quiet(11);
        let id = place(&mut s, EnemyKind::Bodyguard, Vec2::new(0.5, 0.0));
        s.update_enemies(0.016);
        assert_eq!(s.player.health.0, 100.0);
        if let Behavior::Bodyguard { shot } = &mut s.registry.enemy_mut(id).unwrap().behavior {
            *shot = Seconds::ZERO;
        }
        s.update_enemies(0.016);
        assert_eq!(s.registry.projectiles.len(), 1);
    }

    #[test]
    fn baby_stays_inside_the_arena() {
        let mut s = Session::quiet(12);
        let id = place(&mut s, EnemyKind::Baby, Vec2::new(25.0, 0.0));
        s.player.position = Vec2::new(30.0, 0.0);
        s.update_enemies(0.016);
        assert!(s.registry.enemy(id).unwrap().position.x <= s.tuning.arena_half_extent);
    }

    #[test]
    fn traps_slow_and_eventually_kill() {
        let mut s = Session::quiet(13);
        let id = place(&mut s, EnemyKind::Normal, Vec2::new(10.0, 0.0));
        s.player.position = Vec2::new(-15.0, 0.0);
        s.registry.enemy_mut(id).unwrap().base_speed = 0.0;
        let trap = s.registry.alloc_id();
        s.registry.traps.push(Trap {
            id: trap,
            position: Vec2::new(10.0, 0.0),
            remaining: Seconds(10.0),
        });

        s.update_enemies(0.016);
        assert!((s.registry.enemy(id).unwrap().hp.0 - (1.0 - TRAP_CHIP)).abs() < 1e-6);
        for _ in 0..100 {
            s.update_enemies(0.016);
        }
        assert!(s.registry.enemy(id).is_none());
        assert_eq!(s.player.kills, 1);
        assert_eq!(s.registry.coins.len(), 1);
    }

    #[test]
    fn invalid_enemies_are_pruned() {
        let mut s = Session::quiet(14);
        let id = place(&mut s, EnemyKind::Normal, Vec2::new(3.0, 3.0));
        s.registry.enemy_mut(id).unwrap().position = Vec2::new(f32::NAN, 0.0);
        s.update_enemies(0.016);
        assert!(s.registry.enemy(id).is_none());
        assert_eq!(s.player.kills, 0);
    }

    #[test]
    fn health_bar_fraction_floors_at_zero() {
        let mut s = Session::quiet(15);
        let id = place(&mut s, EnemyKind::Strong, Vec2::new(10.0, 0.0));
        s.registry.enemy_mut(id).unwrap().hp = HitPoints(3.5);
        assert_eq!(s.registry.enemy(id).unwrap().health_fraction(), 0.5);
    }

    #[test]
    fn boss_shockwave_stuns_at_range() {
        let mut s = Session::quiet(16);
        let id = place(&mut s, EnemyKind::Boss, Vec2::new(4.0, 0.0));
        if let Behavior::Boss { shockwave, .. } = &mut s.registry.enemy_mut(id).unwrap().behavior {
            *shockwave = Seconds::ZERO;
        }
        s.update_enemies(0.016);
        // Out of sword and contact range: stun only.
        assert_eq!(s.player.health.0, 100.0);
        assert_eq!(s.player.stun_timer, Seconds(BOSS_SHOCKWAVE_STUN));
        assert!(matches!(
            s.registry.enemy(id).unwrap().behavior,
            Behavior::Boss { shockwave, .. } if shockwave == Seconds(BOSS_SHOCKWAVE_INTERVAL)
        ));

        s.player.stun_timer = Seconds::ZERO;
        s.update_enemies(0.016);
        assert!(!s.player.is_stunned());
    }

    #[test]
    fn mini_boss_swings_and_stuns_on_cooldown() {
        let mut s = Session::quiet(17);
        let id = place(&mut s, EnemyKind::WhiteMiniBoss, Vec2::new(2.0, 0.0));
        // Parked outside contact range so only the swing lands.
        s.registry.enemy_mut(id).unwrap().base_speed = 0.0;
        s.update_enemies(0.016);
        assert!((s.player.health.0 - 98.0).abs() < 1e-4);
        assert_eq!(s.player.stun_timer, Seconds(MINI_BOSS_STUN));

        // Still cooling down on the next tick.
        s.update_enemies(0.016);
        assert!((s.player.health.0 - 98.0).abs() < 1e-4);

        for _ in 0..31 {
            s.update_enemies(0.016);
        }
        assert!((s.player.health.0 - 96.0).abs() < 1e-4);
    }

    #[test]
    fn philip_swings_and_sometimes_stuns() {
        let mut stunned = 0;
        for seed in 0..60 {
            let mut s = Session::quiet(seed);
            let id = place(&mut s, EnemyKind::Philip, Vec2::new(1.2, 0.0));
            s.update_enemies(0.016);
            assert!((s.player.health.0 - 93.0).abs() < 1e-4);
            assert!(matches!(
                s.registry.enemy(id).unwrap().behavior,
                Behavior::Philip { swing } if swing == Seconds(PHILIP_SWING_INTERVAL)
            ));
            if s.player.is_stunned() {
                assert_eq!(s.player.stun_timer, Seconds(PHILIP_STUN));
                stunned += 1;
            }
        }
        assert!((5..=35).contains(&stunned), "{stunned}");
    }

    #[test]
    fn philip_out_of_reach_does_nothing() {
        let mut s = Session::quiet(18);
        place(&mut s, EnemyKind::Philip, Vec2::new(3.0, 0.0));
        s.update_enemies(0.016);
        assert_eq!(s.player.health.0, 100.0);
        assert!(!s.player.is_stunned());
    }
}
