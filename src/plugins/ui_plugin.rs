use bevy::prelude::*;

use crate::game::{components::*, events::SimEvent, session::Session};
use crate::plugins::game_plugin::FrameSet;

const NOTICE_SECS: f32 = 3.0;
const MAX_NOTICES: usize = 4;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Notices>();
        app.add_systems(Startup, setup_ui);
        app.add_systems(
            Update,
            (
                collect_notices,
                update_hud,
                update_shop,
                update_inventory,
                update_progress,
                update_notices,
            )
                .chain()
                .in_set(FrameSet::ReflectSet),
        );
    }
}

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct ShopText;

#[derive(Component)]
struct InventoryText;

#[derive(Component)]
struct ProgressText;

#[derive(Component)]
struct NoticeText;

/// Short-lived messages (unlocks, pickups, game over).
#[derive(Resource, Default)]
struct Notices {
    entries: Vec<(String, f32)>,
}

impl Notices {
    fn push(&mut self, text: String) {
        self.entries.push((text, NOTICE_SECS));
        if self.entries.len() > MAX_NOTICES {
            self.entries.remove(0);
        }
    }
}

fn text_bundle<M: Component>(marker: M, size: f32, color: Color) -> (M, Text, TextFont, TextColor) {
    (
        marker,
        Text::new(""),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn setup_ui(mut commands: Commands) {
    // Left column: HUD, shop, inventory.
    commands
        .spawn((
            InGame,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(text_bundle(HudText, 22.0, Color::WHITE));
            parent.spawn(text_bundle(ShopText, 16.0, Color::srgb(0.85, 0.85, 0.6)));
            parent.spawn(text_bundle(InventoryText, 16.0, Color::srgb(0.6, 0.9, 0.9)));
        });

    // Right column: achievements, leaderboard, notifications.
    commands
        .spawn((
            InGame,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(text_bundle(ProgressText, 16.0, Color::srgb(0.8, 0.8, 0.2)));
            parent.spawn(text_bundle(NoticeText, 18.0, Color::srgb(1.0, 0.6, 0.3)));
        });
}

fn collect_notices(mut events: MessageReader<SimEvent>, mut notices: ResMut<Notices>) {
    for event in events.read() {
        let text = match event {
            SimEvent::AchievementUnlocked { achievement } => format!("Achievement unlocked: {}", achievement.label()),
            SimEvent::ItemAcquired { name } => format!("Found {name}"),
            SimEvent::WaveStarted { wave } => format!("Wave {wave}"),
            SimEvent::EnemyKilled { kind, .. } if kind.is_notable() => format!("{} defeated", kind.label()),
            SimEvent::GameOver { score } => format!("Game over! {score} kills"),
            SimEvent::UpgradePurchased { upgrade } => format!("Bought {}", upgrade.label()),
            _ => continue,
        };
        notices.push(text);
    }
}

fn update_hud(session: Option<Res<Session>>, mut text: Query<&mut Text, With<HudText>>) {
    let Some(session) = session else {
        return;
    };
    let p = &session.player;
    let mut line = format!(
        "HP {:.0}/{:.0}  Coins {}  Kills {}  Wave {}",
        p.health.0, p.max_health, p.coins, p.kills, session.wave.number
    );
    if session.hard_mode {
        line.push_str("  [HARD]");
    }
    if session.paused {
        line.push_str("  PAUSED (P to resume, R to restart wave)");
    }
    for mut t in &mut text {
        **t = line.clone();
    }
}

fn update_shop(
    session: Option<Res<Session>>,
    panels: Res<UiPanels>,
    mut text: Query<&mut Text, With<ShopText>>,
) {
    let Some(session) = session else {
        return;
    };
    let body = if panels.inventory_open {
        String::new()
    } else {
        let mut lines = vec!["Shop".to_string()];
        for entry in session.shop_entries() {
            let mark = if entry.available { ' ' } else { 'x' };
            lines.push(format!("[{}]{mark} {} ({})", entry.hotkey, entry.label, entry.cost));
        }
        lines.join("\n")
    };
    for mut t in &mut text {
        **t = body.clone();
    }
}

fn update_inventory(
    session: Option<Res<Session>>,
    panels: Res<UiPanels>,
    mut text: Query<&mut Text, With<InventoryText>>,
) {
    let Some(session) = session else {
        return;
    };
    let body = if panels.inventory_open {
        let mut lines = vec!["Equipped".to_string()];
        for slot in crate::game::stats::types::ItemSlot::ALL {
            let item = session
                .equipped
                .get(slot)
                .map_or_else(|| "-".to_string(), |i| i.describe());
            lines.push(format!("  {}: {item}", slot.label()));
        }
        lines.push("Inventory (1-9 to equip, I to close)".into());
        if session.inventory.is_empty() {
            lines.push("  (empty)".into());
        }
        for (i, item) in session.inventory.items().iter().enumerate().take(9) {
            lines.push(format!("  [{}] {}", i + 1, item.describe()));
        }
        lines.join("\n")
    } else {
        format!("Inventory: {} items (I)", session.inventory.len())
    };
    for mut t in &mut text {
        **t = body.clone();
    }
}

fn update_progress(session: Option<Res<Session>>, mut text: Query<&mut Text, With<ProgressText>>) {
    let Some(session) = session else {
        return;
    };
    let mut lines = session.achievement_progress();
    lines.push("Top kills".into());
    if session.leaderboard.scores().is_empty() {
        lines.push("  -".into());
    }
    for (rank, score) in session.leaderboard.scores().iter().enumerate() {
        lines.push(format!("  {}. {score}", rank + 1));
    }
    let body = lines.join("\n");
    for mut t in &mut text {
        **t = body.clone();
    }
}

fn update_notices(time: Res<Time>, mut notices: ResMut<Notices>, mut text: Query<&mut Text, With<NoticeText>>) {
    let dt = time.delta_secs();
    for (_, remaining) in &mut notices.entries {
        *remaining -= dt;
    }
    notices.entries.retain(|(_, remaining)| *remaining > 0.0);
    let body = notices
        .entries
        .iter()
        .map(|(text, _)| text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    for mut t in &mut text {
        **t = body.clone();
    }
}
