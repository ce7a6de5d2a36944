use std::collections::HashMap;

use bevy::camera::ScalingMode;
use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    components::*,
    enemy::EnemyKind,
    entities::{AllyVariant, EntityId, EntityKind, ParticleTint, PortalKind},
    events::SimEvent,
    session::Session,
    stats::types::{ItemSlot, Rarity},
};
use crate::plugins::game_plugin::FrameSet;

const HEALTH_BAR_HEIGHT: f32 = 0.15;
const HEALTH_BAR_GAP: f32 = 0.3;
const BOOSTED_WEAPON_SCALE: f32 = 1.5;
const SHIELD_COLOR: Color = Color::srgba(0.4, 0.8, 1.0, 0.6);

/// Session id → visual entity, plus enemy id → health bar entity.
#[derive(Resource, Default)]
struct VisualIndex {
    visuals: HashMap<EntityId, Entity>,
    bars: HashMap<EntityId, Entity>,
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualIndex>();
        app.add_systems(Startup, setup_scene);
        app.add_systems(
            Update,
            (
                apply_visual_events,
                sync_visuals,
                sync_health_bars,
                sync_player,
                refresh_equipment_visuals,
                sync_armor_shield,
                day_night_tint,
            )
                .chain()
                .in_set(FrameSet::ReflectSet),
        );
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_scene(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let ppu = tuning.pixels_per_unit.max(1.0);

    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::WindowSize,
            // 1 world unit = ppu pixels
            scale: 1.0 / ppu,
            ..OrthographicProjection::default_2d()
        }),
    ));

    let quad = meshes.add(Rectangle::new(1.0, 1.0));
    let circle = meshes.add(Circle::new(0.5));

    let side = tuning.arena_half_extent * 2.0;
    commands.spawn((
        ArenaFloor,
        InGame,
        Mesh2d(quad.clone()),
        MeshMaterial2d(materials.add(Color::srgb(0.13, 0.16, 0.13))),
        Transform::from_translation(Vec3::new(0.0, 0.0, -1.0)).with_scale(Vec3::new(side, side, 1.0)),
    ));

    commands
        .spawn((
            PlayerAvatar,
            InGame,
            Mesh2d(circle.clone()),
            MeshMaterial2d(materials.add(Color::srgb(0.2, 0.6, 1.0))),
            Transform::from_translation(Vec3::new(0.0, 0.0, 2.0)),
        ))
        .with_children(|parent| {
            parent.spawn((
                ArmorVisual,
                Mesh2d(circle.clone()),
                MeshMaterial2d(materials.add(Color::srgb(0.6, 0.6, 0.6))),
                Transform::from_translation(Vec3::new(0.0, 0.0, -0.1)).with_scale(Vec3::splat(1.3)),
                Visibility::Hidden,
            ));
            parent.spawn((
                WeaponVisual,
                Mesh2d(quad.clone()),
                MeshMaterial2d(materials.add(Color::srgb(0.9, 0.9, 1.0))),
                Transform::from_translation(Vec3::new(0.9, 0.0, 0.1)).with_scale(Vec3::new(0.9, 0.15, 1.0)),
            ));
            parent.spawn((
                HelmVisual,
                Mesh2d(quad.clone()),
                MeshMaterial2d(materials.add(Color::srgb(0.8, 0.8, 0.8))),
                Transform::from_translation(Vec3::new(0.0, 0.45, 0.1)).with_scale(Vec3::new(0.7, 0.3, 1.0)),
                Visibility::Hidden,
            ));
        });

    commands.insert_resource(VisualAssets { quad, circle });
}

// ── Style table ─────────────────────────────────────────────────────

struct Style {
    size: f32,
    color: Color,
    round: bool,
    z: f32,
}

fn style_for(kind: EntityKind, session: &Session, id: EntityId) -> Style {
    match kind {
        EntityKind::Enemy(enemy) => {
            let profile = enemy.profile();
            let size = session.registry.enemy(id).map_or(profile.size, |e| e.size);
            Style {
                size,
                color: profile.color,
                round: false,
                z: 1.0,
            }
        }
        EntityKind::Ally(AllyVariant::Normal) => Style {
            size: 0.8,
            color: Color::srgb(0.3, 0.5, 1.0),
            round: true,
            z: 1.5,
        },
        EntityKind::Ally(AllyVariant::Orange) => Style {
            size: 0.8,
            color: Color::srgb(1.0, 0.55, 0.0),
            round: true,
            z: 1.5,
        },
        EntityKind::Portal(portal) => Style {
            size: 2.0,
            color: match portal {
                PortalKind::Normal => Color::srgb(0.45, 0.1, 0.6),
                PortalKind::Boss => Color::srgb(0.6, 0.0, 0.1),
                PortalKind::Golden => Color::srgb(1.0, 0.84, 0.0),
            },
            round: true,
            z: 0.1,
        },
        EntityKind::Projectile => Style {
            size: 0.3,
            color: Color::srgb(1.0, 1.0, 0.2),
            round: true,
            z: 1.8,
        },
        EntityKind::Coin => Style {
            size: 0.4,
            color: Color::srgb(1.0, 0.84, 0.0),
            round: true,
            z: 0.5,
        },
        EntityKind::Trap => Style {
            size: 1.0,
            color: Color::srgb(0.45, 0.3, 0.15),
            round: false,
            z: 0.3,
        },
        EntityKind::LootDrop => Style {
            size: 0.5,
            color: Color::srgb(0.2, 0.9, 0.9),
            round: false,
            z: 0.5,
        },
        EntityKind::Particle(tint) => Style {
            size: 0.15,
            color: match tint {
                ParticleTint::Blood => Color::srgb(0.7, 0.0, 0.0),
                ParticleTint::Gold => Color::srgb(1.0, 0.9, 0.3),
                ParticleTint::Blast => Color::srgb(1.0, 0.5, 0.1),
            },
            round: true,
            z: 2.5,
        },
    }
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Normal => Color::srgb(0.85, 0.85, 0.85),
        Rarity::Unique => Color::srgb(0.3, 0.55, 1.0),
        Rarity::Legendary => Color::srgb(1.0, 0.6, 0.1),
    }
}

// ── Frame systems ───────────────────────────────────────────────────

/// Create and remove visuals as the session reports spawns and removals.
fn apply_visual_events(
    mut commands: Commands,
    mut events: MessageReader<SimEvent>,
    mut index: ResMut<VisualIndex>,
    session: Option<Res<Session>>,
    assets: Option<Res<VisualAssets>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let (Some(session), Some(assets)) = (session, assets) else {
        events.clear();
        return;
    };

    for event in events.read() {
        match event {
            SimEvent::Spawned { id, kind } => {
                // Already gone again (short-lived particles, instant pickups).
                let Some(position) = session.registry.position_of(*id) else {
                    continue;
                };
                let style = style_for(*kind, &session, *id);
                let mesh = if style.round { assets.circle.clone() } else { assets.quad.clone() };
                let entity = commands
                    .spawn((
                        Visual { id: *id },
                        InGame,
                        Mesh2d(mesh),
                        MeshMaterial2d(materials.add(style.color)),
                        Transform::from_translation(position.extend(style.z)).with_scale(Vec3::splat(style.size)),
                    ))
                    .id();
                index.visuals.insert(*id, entity);

                if *kind == EntityKind::Enemy(EnemyKind::WizardKing) {
                    commands.entity(entity).with_children(|parent| {
                        parent.spawn((
                            Mesh2d(assets.quad.clone()),
                            MeshMaterial2d(materials.add(Color::srgb(1.0, 0.84, 0.0))),
                            Transform::from_translation(Vec3::new(0.0, 0.6, 0.1)).with_scale(Vec3::new(0.6, 0.2, 1.0)),
                        ));
                        parent.spawn((
                            Mesh2d(assets.circle.clone()),
                            MeshMaterial2d(materials.add(SHIELD_COLOR)),
                            Transform::from_translation(Vec3::new(-0.55, 0.0, 0.1)).with_scale(Vec3::new(0.25, 0.5, 1.0)),
                        ));
                    });
                }

                if let EntityKind::Enemy(_) = kind {
                    let bar = commands
                        .spawn((
                            HealthBar { owner: *id },
                            InGame,
                            Mesh2d(assets.quad.clone()),
                            MeshMaterial2d(materials.add(Color::srgb(0.1, 0.9, 0.2))),
                            Transform::from_translation(position.extend(3.0)),
                        ))
                        .id();
                    index.bars.insert(*id, bar);
                }
            }
            SimEvent::Removed { id } => {
                if let Some(entity) = index.visuals.remove(id) {
                    commands.entity(entity).despawn();
                }
                if let Some(bar) = index.bars.remove(id) {
                    commands.entity(bar).despawn();
                }
            }
            _ => {}
        }
    }
}

/// Follow the session's positions. Visuals whose entity vanished without a
/// removal event are despawned here.
fn sync_visuals(
    mut commands: Commands,
    session: Option<Res<Session>>,
    mut index: ResMut<VisualIndex>,
    mut visuals: Query<(Entity, &Visual, &mut Transform, &mut Visibility)>,
) {
    let Some(session) = session else {
        return;
    };
    let player = session.player.position;
    let radar = session.player.radar;

    for (entity, visual, mut transform, mut visibility) in &mut visuals {
        let Some(position) = session.registry.position_of(visual.id) else {
            commands.entity(entity).despawn();
            index.visuals.remove(&visual.id);
            if let Some(bar) = index.bars.remove(&visual.id) {
                commands.entity(bar).despawn();
            }
            continue;
        };
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if let Some(enemy) = session.registry.enemy(visual.id) {
            *visibility = if enemy.is_visible(player, radar) {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
}

/// Bar width is the enemy's remaining health fraction, anchored on the left.
fn sync_health_bars(session: Option<Res<Session>>, mut bars: Query<(&HealthBar, &mut Transform, &mut Visibility)>) {
    let Some(session) = session else {
        return;
    };
    let player = session.player.position;
    for (bar, mut transform, mut visibility) in &mut bars {
        let Some(enemy) = session.registry.enemy(bar.owner) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let fraction = enemy.health_fraction();
        let width = enemy.size;
        transform.scale = Vec3::new((width * fraction).max(0.001), HEALTH_BAR_HEIGHT, 1.0);
        transform.translation.x = enemy.position.x - width * 0.5 * (1.0 - fraction);
        transform.translation.y = enemy.position.y + enemy.size * 0.5 + HEALTH_BAR_GAP;
        *visibility = if enemy.is_visible(player, session.player.radar) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn sync_player(
    session: Option<Res<Session>>,
    mut avatar: Query<&mut Transform, (With<PlayerAvatar>, Without<WeaponVisual>)>,
    mut weapon: Query<&mut Transform, (With<WeaponVisual>, Without<PlayerAvatar>)>,
) {
    let Some(session) = session else {
        return;
    };
    for mut transform in &mut avatar {
        transform.translation.x = session.player.position.x;
        transform.translation.y = session.player.position.y;
    }
    let boost = if session.player.weapon_boost.is_active() {
        BOOSTED_WEAPON_SCALE
    } else {
        1.0
    };
    for mut transform in &mut weapon {
        transform.scale = Vec3::new(0.9 * boost, 0.15 * boost, 1.0);
    }
}

/// Rebuild the equipment attachments whenever the inventory changes.
#[allow(clippy::type_complexity)]
fn refresh_equipment_visuals(
    mut events: MessageReader<SimEvent>,
    session: Option<Res<Session>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut parts: Query<(
        &mut Visibility,
        &MeshMaterial2d<ColorMaterial>,
        Option<&WeaponVisual>,
        Option<&HelmVisual>,
        Option<&ArmorVisual>,
    )>,
) {
    let changed = events
        .read()
        .fold(false, |seen, e| seen || matches!(e, SimEvent::EquipmentChanged));
    let Some(session) = session else {
        return;
    };
    if !changed {
        return;
    }

    for (mut visibility, material, weapon, helm, armor) in &mut parts {
        let slot = match (weapon, helm, armor) {
            (Some(_), _, _) => ItemSlot::Weapon,
            (_, Some(_), _) => ItemSlot::Helm,
            (_, _, Some(_)) => ItemSlot::Armor,
            _ => continue,
        };
        let item = session.equipped.get(slot);
        // The bare-handed weapon stays visible; the armor layer also follows the boost.
        if slot != ItemSlot::Armor {
            *visibility = if item.is_some() || slot == ItemSlot::Weapon {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
        if let (Some(item), Some(mat)) = (item, materials.get_mut(&material.0)) {
            mat.color = rarity_color(item.rarity);
        }
    }
}

/// The armor layer shows for equipped armor or while the armor upgrade runs.
fn armor_layer_visible(session: &Session) -> bool {
    session.equipped.armor.is_some() || session.player.armor_boost.is_active()
}

fn sync_armor_shield(
    session: Option<Res<Session>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut layer: Query<(&mut Visibility, &MeshMaterial2d<ColorMaterial>), With<ArmorVisual>>,
) {
    let Some(session) = session else {
        return;
    };
    let visible = armor_layer_visible(&session);
    for (mut visibility, material) in &mut layer {
        let wanted = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
        if !visible {
            continue;
        }
        let color = match (&session.equipped.armor, session.player.armor_boost.is_active()) {
            (_, true) => SHIELD_COLOR,
            (Some(item), false) => rarity_color(item.rarity),
            (None, false) => continue,
        };
        if let Some(mat) = materials.get_mut(&material.0) {
            if mat.color != color {
                mat.color = color;
            }
        }
    }
}

/// Darken the backdrop with the day-night cycle.
fn day_night_tint(session: Option<Res<Session>>, mut clear: ResMut<ClearColor>) {
    let Some(session) = session else {
        return;
    };
    let light = session.day_night.light_level();
    clear.0 = Color::srgb(0.05 * light, 0.07 * light, 0.12 * light);
}
