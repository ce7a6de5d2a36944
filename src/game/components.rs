use bevy::prelude::*;

use super::entities::EntityId;

// ── Marker components ───────────────────────────────────────────────

/// Visual for one simulated entity. The session owns the state; this only mirrors it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual {
    pub id: EntityId,
}

/// Health bar drawn above an enemy, tracked as its own entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthBar {
    pub owner: EntityId,
}

#[derive(Component)]
pub struct PlayerAvatar;

/// Marker for weapon visual child entities.
#[derive(Component)]
pub struct WeaponVisual;

#[derive(Component)]
pub struct HelmVisual;

#[derive(Component)]
pub struct ArmorVisual;

#[derive(Component)]
pub struct ArenaFloor;

/// Marker: tag all game-session entities.
#[derive(Component)]
pub struct InGame;

// ── Game phase state ────────────────────────────────────────────────

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Playing,
    Paused,
}

// ── UI state ────────────────────────────────────────────────────────

/// Which optional panels are open. Digits equip instead of buy while the
/// inventory is open.
#[derive(Resource, Debug, Default)]
pub struct UiPanels {
    pub inventory_open: bool,
}

/// Shared mesh handles for entity visuals (unit shapes scaled per entity).
#[derive(Resource)]
pub struct VisualAssets {
    pub quad: Handle<Mesh>,
    pub circle: Handle<Mesh>,
}
