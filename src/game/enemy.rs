use bevy::math::Vec2;
use bevy::prelude::Color;

use super::entities::EntityId;
use super::stats::types::{HitPoints, Seconds};

// ── Behavior intervals ──────────────────────────────────────────────

pub const GOLDEN_LIFETIME: f32 = 10.0;
pub const GOLDEN_TURN_INTERVAL: f32 = 1.0;
pub const BOSS_SWING_INTERVAL: f32 = 0.5;
pub const BOSS_SUMMON_INTERVAL: f32 = 20.0;
pub const BOSS_SHOCKWAVE_INTERVAL: f32 = 10.0;
pub const MINI_BOSS_SWING_INTERVAL: f32 = 0.5;
pub const CASTER_BOLT_INTERVAL: f32 = 1.0;
pub const WIZARD_BURST_INTERVAL: f32 = 15.0;
pub const KNIGHT_CHARGE_COOLDOWN: f32 = 6.0;
pub const BODYGUARD_SHOT_INTERVAL: f32 = 1.3;
pub const PHILIP_SWING_INTERVAL: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Normal,
    Fast,
    Strong,
    White,
    WhiteMiniBoss,
    Golden,
    Boss,
    Minion,
    Magician,
    Baby,
    Stealth,
    Explosive,
    WizardKing,
    Knight,
    Bodyguard,
    Philip,
}

/// Fixed base profile per kind, before wave / hard-mode / night scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub size: f32,
    pub color: Color,
    pub hit_points: f32,
    /// World units per tick.
    pub speed: f32,
    pub damage: f32,
    pub stealth: bool,
    pub explosive: bool,
}

impl EnemyKind {
    pub const ALL: [Self; 16] = [
        Self::Normal,
        Self::Fast,
        Self::Strong,
        Self::White,
        Self::WhiteMiniBoss,
        Self::Golden,
        Self::Boss,
        Self::Minion,
        Self::Magician,
        Self::Baby,
        Self::Stealth,
        Self::Explosive,
        Self::WizardKing,
        Self::Knight,
        Self::Bodyguard,
        Self::Philip,
    ];

    pub fn profile(self) -> EnemyProfile {
        let (size, color, hit_points, speed, damage) = match self {
            Self::Normal => (1.0, Color::srgb(1.0, 0.0, 0.0), 1.0, 0.03, 1.0),
            Self::Fast => (0.8, Color::srgb(0.53, 0.81, 0.92), 3.0, 0.08, 0.3),
            Self::Strong => (1.5, Color::srgb(0.0, 0.0, 1.0), 7.0, 0.03, 1.0),
            Self::White => (1.2, Color::srgb(1.0, 1.0, 1.0), 15.0, 0.05, 1.5),
            Self::WhiteMiniBoss => (1.5, Color::srgb(1.0, 1.0, 1.0), 30.0, 0.04, 2.0),
            Self::Golden => (1.0, Color::srgb(1.0, 0.84, 0.0), 10.0, 0.12, 0.0),
            Self::Boss => (2.0, Color::srgb(0.5, 0.0, 0.5), 25.0, 0.03, 2.0),
            Self::Minion => (0.7, Color::srgb(0.5, 0.0, 0.5), 5.0, 0.04, 0.5),
            Self::Magician => (1.5, Color::srgb(0.0, 0.0, 0.0), 15.0, 0.04, 1.0),
            Self::Baby => (0.5, Color::srgb(1.0, 0.75, 0.8), 3.0, 0.15, 0.5),
            Self::Stealth => (1.0, Color::srgb(0.5, 0.5, 0.5), 5.0, 0.06, 1.0),
            Self::Explosive => (1.2, Color::srgb(1.0, 0.27, 0.0), 10.0, 0.04, 1.0),
            Self::WizardKing => (2.0, Color::srgb(0.29, 0.0, 0.51), 15.0, 0.03, 2.0),
            Self::Knight => (1.2, Color::srgb(0.5, 0.5, 0.5), 7.0, 0.1, 10.0),
            Self::Bodyguard => (1.0, Color::srgb(0.66, 0.66, 0.66), 3.0, 0.03, 5.0),
            Self::Philip => (1.2, Color::srgb(0.65, 0.16, 0.16), 10.0, 0.05, 7.0),
        };
        EnemyProfile {
            size,
            color,
            hit_points,
            speed,
            damage,
            stealth: self == Self::Stealth,
            explosive: self == Self::Explosive,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::Strong => "Strong",
            Self::White => "White",
            Self::WhiteMiniBoss => "White Mini Boss",
            Self::Golden => "Golden Cube",
            Self::Boss => "Boss",
            Self::Minion => "Minion",
            Self::Magician => "Magician",
            Self::Baby => "Baby",
            Self::Stealth => "Stealth",
            Self::Explosive => "Explosive",
            Self::WizardKing => "Wizard King",
            Self::Knight => "Knight",
            Self::Bodyguard => "Bodyguard",
            Self::Philip => "Philip",
        }
    }

    /// Kills worth announcing to the player.
    pub fn is_notable(self) -> bool {
        matches!(
            self,
            Self::Boss | Self::WizardKing | Self::WhiteMiniBoss | Self::Golden | Self::Philip
        )
    }

    /// Kinds that only spawn out of a boss portal.
    pub fn requires_boss_portal(self) -> bool {
        matches!(self, Self::Boss | Self::WizardKing)
    }

    /// Kinds that hurt the player by touching it. The rest attack through their
    /// own sub-behavior (or not at all, for the golden cube).
    pub fn deals_contact_damage(self) -> bool {
        !matches!(self, Self::Golden | Self::Knight | Self::Bodyguard | Self::Philip)
    }

    /// Contact with these also stuns the player.
    pub fn contact_stuns(self) -> bool {
        matches!(self, Self::Boss | Self::WhiteMiniBoss)
    }
}

/// Per-kind state that only some enemies carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Plain,
    Golden {
        lifetime: Seconds,
        turn: Seconds,
        heading: Vec2,
    },
    Boss {
        swing: Seconds,
        summon: Seconds,
        shockwave: Seconds,
    },
    MiniBoss {
        swing: Seconds,
    },
    Caster {
        bolt: Seconds,
        /// Only the wizard king bursts.
        burst: Option<Seconds>,
    },
    Knight {
        charge: Seconds,
    },
    Bodyguard {
        shot: Seconds,
    },
    Philip {
        swing: Seconds,
    },
}

impl Behavior {
    /// Fresh behavior state for a newly spawned enemy. Summons and bursts start on
    /// cooldown, melee is ready immediately.
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Golden => Self::Golden {
                lifetime: Seconds(GOLDEN_LIFETIME),
                turn: Seconds::ZERO,
                heading: Vec2::ZERO,
            },
            EnemyKind::Boss => Self::Boss {
                swing: Seconds::ZERO,
                summon: Seconds(BOSS_SUMMON_INTERVAL),
                shockwave: Seconds(BOSS_SHOCKWAVE_INTERVAL),
            },
            EnemyKind::WhiteMiniBoss => Self::MiniBoss { swing: Seconds::ZERO },
            EnemyKind::Magician => Self::Caster {
                bolt: Seconds(CASTER_BOLT_INTERVAL),
                burst: None,
            },
            EnemyKind::WizardKing => Self::Caster {
                bolt: Seconds(CASTER_BOLT_INTERVAL),
                burst: Some(Seconds(WIZARD_BURST_INTERVAL)),
            },
            EnemyKind::Knight => Self::Knight { charge: Seconds::ZERO },
            EnemyKind::Bodyguard => Self::Bodyguard {
                shot: Seconds(BODYGUARD_SHOT_INTERVAL),
            },
            EnemyKind::Philip => Self::Philip { swing: Seconds::ZERO },
            _ => Self::Plain,
        }
    }

    /// Count every cooldown down by `dt`.
    pub fn tick(&mut self, dt: f32) {
        match self {
            Self::Plain => {}
            Self::Golden { lifetime, turn, .. } => {
                *lifetime = lifetime.dec(dt);
                *turn = turn.dec(dt);
            }
            Self::Boss { swing, summon, shockwave } => {
                *swing = swing.dec(dt);
                *summon = summon.dec(dt);
                *shockwave = shockwave.dec(dt);
            }
            Self::MiniBoss { swing } | Self::Philip { swing } => *swing = swing.dec(dt),
            Self::Caster { bolt, burst } => {
                *bolt = bolt.dec(dt);
                if let Some(burst) = burst {
                    *burst = burst.dec(dt);
                }
            }
            Self::Knight { charge } => *charge = charge.dec(dt),
            Self::Bodyguard { shot } => *shot = shot.dec(dt),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub position: Vec2,
    pub hp: HitPoints,
    pub max_hp: f32,
    /// Speed after spawn-time scaling. Knights move between this and their charge speed.
    pub base_speed: f32,
    pub speed: f32,
    pub damage: f32,
    pub size: f32,
    pub stealth: bool,
    pub explosive: bool,
    pub portal: Option<EntityId>,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn health_fraction(&self) -> f32 {
        self.hp.display_fraction(self.max_hp)
    }

    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.hp.0.is_finite() && self.speed.is_finite()
    }

    /// Whether the presentation layer should draw this enemy.
    pub fn is_visible(&self, player: Vec2, radar: bool) -> bool {
        !self.stealth || radar || self.position.distance(player) <= super::combat::STEALTH_REVEAL_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_flags_follow_kind() {
        for kind in EnemyKind::ALL {
            let p = kind.profile();
            assert_eq!(p.stealth, kind == EnemyKind::Stealth);
            assert_eq!(p.explosive, kind == EnemyKind::Explosive);
            assert!(p.hit_points > 0.0 && p.speed > 0.0 && p.size > 0.0);
        }
    }

    #[test]
    fn canonical_profiles() {
        let normal = EnemyKind::Normal.profile();
        assert_eq!((normal.hit_points, normal.speed, normal.damage), (1.0, 0.03, 1.0));
        let boss = EnemyKind::Boss.profile();
        assert_eq!((boss.size, boss.hit_points, boss.damage), (2.0, 25.0, 2.0));
        assert_eq!(EnemyKind::WizardKing.profile().hit_points, 15.0);
        assert_eq!(EnemyKind::Golden.profile().damage, 0.0);
        assert_eq!(EnemyKind::Knight.profile().damage, 10.0);
    }

    #[test]
    fn labels_are_distinct_and_bosses_are_notable() {
        let labels: std::collections::HashSet<_> = EnemyKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), EnemyKind::ALL.len());
        assert!(EnemyKind::Boss.is_notable());
        assert!(EnemyKind::Golden.is_notable());
        assert!(!EnemyKind::Normal.is_notable());
    }

    #[test]
    fn behavior_cooldowns_floor_at_zero() {
        let mut b = Behavior::for_kind(EnemyKind::Boss);
        for _ in 0..10_000 {
            b.tick(0.016);
        }
        assert_eq!(
            b,
            Behavior::Boss {
                swing: Seconds::ZERO,
                summon: Seconds::ZERO,
                shockwave: Seconds::ZERO,
            }
        );
    }

    #[test]
    fn only_wizard_king_bursts() {
        assert!(matches!(
            Behavior::for_kind(EnemyKind::Magician),
            Behavior::Caster { burst: None, .. }
        ));
        assert!(matches!(
            Behavior::for_kind(EnemyKind::WizardKing),
            Behavior::Caster { burst: Some(_), .. }
        ));
    }
}
