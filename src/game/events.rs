use bevy::prelude::*;

use super::achievements::Achievement;
use super::economy::UpgradeKind;
use super::enemy::EnemyKind;
use super::entities::{EntityId, EntityKind};
use super::stats::types::DamageSource;

/// Everything the simulation reports to the outside world during a tick.
///
/// The session only appends; the driver drains the list once per fixed step and
/// forwards it as a Bevy message for presentation, UI and persistence to consume.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
    },
    Removed {
        id: EntityId,
    },
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        source: DamageSource,
    },
    PlayerDamaged {
        amount: f32,
    },
    PlayerTeleported {
        position: Vec2,
    },
    CoinCollected {
        value: u32,
    },
    ItemAcquired {
        name: String,
    },
    /// Inventory or equipment changed; visual attachments need a refresh.
    EquipmentChanged,
    UpgradePurchased {
        upgrade: UpgradeKind,
    },
    WaveStarted {
        wave: u32,
    },
    AchievementUnlocked {
        achievement: Achievement,
    },
    LeaderboardUpdated,
    GameOver {
        score: u32,
    },
    PauseChanged {
        paused: bool,
    },
}
