use bevy::math::Vec2;
use rand::Rng;

use super::enemy::EnemyKind;
use super::entities::{Ally, AllyVariant, Coin, EntityId, EntityKind, ParticleTint};
use super::events::SimEvent;
use super::inventory::{KING_CROWN, LOOT_DROP_CHANCE, WIZARD_HAT, roll_named};
use super::player::ATTACK_COOLDOWN;
use super::session::Session;
use super::stats::types::{DamageSource, Seconds};
use super::tables::roll;

pub const MELEE_RANGE: f32 = 3.0;
pub const BOOSTED_MELEE_RANGE: f32 = 4.0;
pub const STEALTH_REVEAL_RADIUS: f32 = 5.0;
pub const COIN_MIN: u32 = 1;
pub const COIN_MAX: u32 = 5;
pub const HARD_MODE_COIN_MULT: f32 = 1.5;
pub const EXPLOSION_RADIUS: f32 = 3.0;
pub const EXPLOSION_DAMAGE: f32 = 5.0;
pub const HAT_DROP_CHANCE: f64 = 0.2;
pub const CROWN_DROP_CHANCE: f64 = 0.2;
pub const PHILIP_SPAWN_CHANCE: f64 = 0.05;
pub const BOSS_KILL_INTERVAL: u32 = 50;
pub const BOSS_KILL_MIN_WAVE: u32 = 5;
pub const WIZARD_KING_KILL_INTERVAL: u32 = 75;
pub const STRONG_KILL_INTERVAL: u32 = 10;
pub const WHITE_KILLS_PER_MINI_BOSS: u32 = 5;

const ALLY_SPEED: f32 = 0.08;
const ALLY_RANGE: f32 = 2.0;

struct AllyProfile {
    lifetime: f32,
    attack_interval: f32,
    damage: f32,
}

fn ally_profile(variant: AllyVariant) -> AllyProfile {
    match variant {
        AllyVariant::Normal => AllyProfile {
            lifetime: 30.0,
            attack_interval: 1.0,
            damage: 1.0,
        },
        AllyVariant::Orange => AllyProfile {
            lifetime: 20.0,
            attack_interval: 0.5,
            damage: 2.0,
        },
    }
}

impl Session {
    /// Player melee swing. Every live enemy in range takes the current attack
    /// damage; returns how many were hit.
    pub fn attack(&mut self) -> usize {
        let at = self.player.position;
        let range = self.player.attack_range();
        let damage = self.player.attack_damage();

        let targets: Vec<EntityId> = self
            .registry
            .enemies
            .iter()
            .filter(|e| e.hp.is_alive() && e.position.distance(at) <= range)
            .map(|e| e.id)
            .collect();

        for &id in &targets {
            self.damage_enemy(id, damage, DamageSource::Player);
        }
        targets.len()
    }

    /// Attack only if the swing cooldown allows it.
    pub(crate) fn try_player_attack(&mut self) {
        if self.player.attack_timer.is_active() || self.player.is_stunned() {
            return;
        }
        self.attack();
        self.player.attack_timer = Seconds(ATTACK_COOLDOWN);
    }

    /// Apply damage to one enemy and resolve its death (and any chain reaction).
    /// Returns true when the enemy died.
    pub fn damage_enemy(&mut self, id: EntityId, amount: f32, source: DamageSource) -> bool {
        let Some(enemy) = self.registry.enemy_mut(id) else {
            return false;
        };
        enemy.hp = enemy.hp.sub_clamped(amount);
        if enemy.hp.is_alive() {
            return false;
        }
        self.resolve_kills(vec![(id, source)]);
        true
    }

    /// Remove dead enemies and pay out rewards. Explosive deaths can queue more
    /// deaths; every one of them goes through the same path.
    pub(crate) fn resolve_kills(&mut self, mut pending: Vec<(EntityId, DamageSource)>) {
        while let Some((id, source)) = pending.pop() {
            let Some(enemy) = self.registry.take_enemy(id) else {
                continue;
            };
            self.push_event(SimEvent::Removed { id });
            self.push_event(SimEvent::EnemyKilled {
                id,
                kind: enemy.kind,
                source,
            });

            self.player.kills += 1;
            self.spawn_coin(enemy.position);
            let tint = if enemy.kind == EnemyKind::Golden {
                ParticleTint::Gold
            } else {
                ParticleTint::Blood
            };
            self.emit_particles(enemy.position, tint, 6);

            if roll(&mut self.rng, LOOT_DROP_CHANCE) {
                self.drop_loot(enemy.position);
            }
            self.kind_rewards(enemy.kind);

            if enemy.explosive {
                self.emit_particles(enemy.position, ParticleTint::Blast, 12);
                if self.player.position.distance(enemy.position) <= EXPLOSION_RADIUS {
                    let taken = self.player.take_damage(EXPLOSION_DAMAGE);
                    self.push_event(SimEvent::PlayerDamaged { amount: taken });
                }
                for other in &mut self.registry.enemies {
                    if other.position.distance(enemy.position) > EXPLOSION_RADIUS {
                        continue;
                    }
                    let was_alive = other.hp.is_alive();
                    other.hp = other.hp.sub_clamped(EXPLOSION_DAMAGE);
                    if was_alive && !other.hp.is_alive() {
                        pending.push((other.id, DamageSource::Explosion));
                    }
                }
            }

            self.kill_milestones();
        }
    }

    fn spawn_coin(&mut self, position: Vec2) {
        let mut value = self.rng.gen_range(COIN_MIN..=COIN_MAX);
        if self.hard_mode {
            value = (value as f32 * HARD_MODE_COIN_MULT).floor() as u32;
        }
        let id = self.registry.alloc_id();
        self.registry.coins.push(Coin { id, position, value });
        self.push_event(SimEvent::Spawned {
            id,
            kind: EntityKind::Coin,
        });
    }

    fn kind_rewards(&mut self, kind: EnemyKind) {
        match kind {
            EnemyKind::Magician => {
                if roll(&mut self.rng, HAT_DROP_CHANCE) {
                    if let Some(hat) = roll_named(&mut self.rng, WIZARD_HAT) {
                        self.grant_item(hat);
                    }
                }
            }
            EnemyKind::WizardKing => {
                if roll(&mut self.rng, CROWN_DROP_CHANCE) {
                    if let Some(crown) = roll_named(&mut self.rng, KING_CROWN) {
                        self.grant_item(crown);
                    }
                }
            }
            EnemyKind::Bodyguard => {
                if roll(&mut self.rng, PHILIP_SPAWN_CHANCE) {
                    self.spawn_enemy(EnemyKind::Philip, false);
                }
            }
            EnemyKind::Golden => {
                self.close_golden_portal();
                self.record_golden_kill();
            }
            EnemyKind::White => {
                self.player.white_kills += 1;
                if self.player.white_kills % WHITE_KILLS_PER_MINI_BOSS == 0 {
                    self.spawn_enemy(EnemyKind::WhiteMiniBoss, false);
                }
            }
            _ => {}
        }
    }

    fn kill_milestones(&mut self) {
        let kills = self.player.kills;
        if kills % BOSS_KILL_INTERVAL == 0 && self.wave.number >= BOSS_KILL_MIN_WAVE {
            self.summon_boss(EnemyKind::Boss);
        } else if kills % WIZARD_KING_KILL_INTERVAL == 0 {
            self.summon_boss(EnemyKind::WizardKing);
        } else if kills % STRONG_KILL_INTERVAL == 0 {
            self.spawn_enemy(EnemyKind::Strong, false);
        }
    }

    // ── Allies ──────────────────────────────────────────────────────

    pub fn spawn_ally(&mut self, variant: AllyVariant, position: Vec2) -> EntityId {
        let profile = ally_profile(variant);
        let id = self.registry.alloc_id();
        self.registry.allies.push(Ally {
            id,
            variant,
            position,
            lifetime: Seconds(profile.lifetime),
            attack_cooldown: Seconds::ZERO,
            attack_interval: profile.attack_interval,
            damage: profile.damage,
        });
        self.push_event(SimEvent::Spawned {
            id,
            kind: EntityKind::Ally(variant),
        });
        id
    }

    /// Allies expire, chase their nearest enemy and strike it on cooldown.
    pub(crate) fn update_allies(&mut self, dt: f32) {
        let mut strikes = Vec::new();
        for ally in &mut self.registry.allies {
            ally.lifetime = ally.lifetime.dec(dt);
            ally.attack_cooldown = ally.attack_cooldown.dec(dt);
            if ally.lifetime.is_expired() {
                continue;
            }

            let nearest = self
                .registry
                .enemies
                .iter()
                .filter(|e| e.hp.is_alive())
                .map(|e| (e.id, e.position, e.position.distance(ally.position)))
                .min_by(|a, b| a.2.total_cmp(&b.2));
            let Some((target, target_pos, dist)) = nearest else {
                continue;
            };

            if dist > ALLY_RANGE * 0.75 {
                let step = (target_pos - ally.position).normalize_or_zero() * ALLY_SPEED;
                ally.position += step;
            }
            if dist <= ALLY_RANGE && ally.attack_cooldown.is_expired() {
                ally.attack_cooldown = Seconds(ally.attack_interval);
                strikes.push((target, ally.damage));
            }
        }

        let expired: Vec<_> = self
            .registry
            .allies
            .iter()
            .filter(|a| a.lifetime.is_expired())
            .map(|a| a.id)
            .collect();
        self.registry.allies.retain(|a| a.lifetime.is_active());
        for id in expired {
            self.push_event(SimEvent::Removed { id });
        }

        for (target, damage) in strikes {
            self.damage_enemy(target, damage, DamageSource::Ally);
        }
    }
}
