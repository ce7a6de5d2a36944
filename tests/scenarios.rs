//! End-to-end gameplay scenarios driven through the public session API.

use std::sync::Arc;

use bevy::prelude::*;

use portal_arena::game::achievements::LEADERBOARD_KEY;
use portal_arena::game::economy::UpgradeKind;
use portal_arena::game::enemy::EnemyKind;
use portal_arena::game::entities::PortalKind;
use portal_arena::game::events::SimEvent;
use portal_arena::game::intent::PlayerInput;
use portal_arena::game::inventory::make_item;
use portal_arena::game::session::Session;
use portal_arena::game::stats::types::{HitPoints, Rarity};
use portal_arena::storage::memory::MemoryStore;
use portal_arena::storage::repo::SaveStore;

const DT: f32 = 1.0 / 60.0;

fn place_on_player(s: &mut Session, kind: EnemyKind) {
    let at = s.player.position;
    let id = s.spawn_enemy(kind, false).expect("portal open");
    s.registry.enemy_mut(id).expect("just spawned").position = at;
}

#[test]
fn wave_one_kill_drops_a_single_coin() {
    let mut s = Session::quiet(11);
    place_on_player(&mut s, EnemyKind::Normal);

    assert_eq!(s.attack(), 1);
    assert_eq!(s.player.kills, 1);
    assert!(s.registry.enemies.is_empty());
    assert_eq!(s.registry.coins.len(), 1);
    assert!((1..=5).contains(&s.registry.coins[0].value));
}

#[test]
fn armor_purchase_spends_exactly_its_cost() {
    let mut s = Session::quiet(12);
    s.player.coins = 50;
    assert!(s.buy_upgrade(UpgradeKind::Armor));
    assert_eq!(s.player.coins, 0);
    assert_eq!(s.player.armor_boost.0, 17.0);
    assert!(!s.buy_upgrade(UpgradeKind::Armor));

    s.player.coins = 49;
    assert!(!s.buy_upgrade(UpgradeKind::Health));
    assert_eq!(s.player.coins, 49);
}

#[test]
fn fifth_wave_brings_the_boss_through_a_timed_portal() {
    let mut s = Session::quiet(13);
    s.wave.number = 4;
    s.spawn_wave();

    assert_eq!(s.wave.number, 5);
    assert_eq!(s.registry.count_enemies(EnemyKind::Boss), 1);
    let boss = s.registry.enemies.iter().find(|e| e.kind == EnemyKind::Boss).expect("boss");
    assert_eq!(boss.hp.0, 25.0);
    let portal = s.registry.first_portal(PortalKind::Boss).expect("boss portal");
    assert_eq!(portal.countdown.map(|c| c.0), Some(60.0));
}

#[test]
fn death_records_score_and_restarts_at_wave_one() {
    let store = Arc::new(MemoryStore::default());
    let mut s = Session::quiet(14).with_store(store.clone());
    s.wave.number = 3;
    s.player.kills = 7;
    s.inventory.push(make_item("Chain Mail", Rarity::Normal).expect("known item"));
    s.player.health = HitPoints(0.0);

    s.tick(DT, &mut PlayerInput::default());

    assert_eq!(s.wave.number, 1);
    assert_eq!(s.player.kills, 0);
    assert_eq!(s.player.health.0, s.player.max_health);
    assert_eq!(s.leaderboard.scores(), &[7]);
    assert_eq!(s.inventory.len(), 1);
    assert!(s.drain_events().contains(&SimEvent::GameOver { score: 7 }));
    assert_eq!(store.load(LEADERBOARD_KEY).as_deref(), Some("[7]"));

    // A later session on the same store sees the score.
    let next = Session::quiet(15).with_store(store);
    assert_eq!(next.leaderboard.scores(), &[7]);
}

#[test]
fn hard_mode_toggle_scales_new_enemies_and_coins() {
    let mut s = Session::quiet(16);
    assert!(s.buy_upgrade(UpgradeKind::HardMode));
    assert!(s.hard_mode);

    place_on_player(&mut s, EnemyKind::Normal);
    let enemy = &s.registry.enemies[0];
    assert_eq!((enemy.hp.0, enemy.damage), (2.0, 2.0));

    s.attack();
    s.attack();
    assert_eq!(s.player.kills, 1);
    assert!([1, 3, 4, 6, 7].contains(&s.registry.coins[0].value));

    assert!(s.buy_upgrade(UpgradeKind::HardMode));
    assert!(!s.hard_mode);
}

#[test]
fn leaderboard_holds_five_best_scores() {
    let mut s = Session::quiet(17);
    for score in [3, 9, 1, 12, 5, 7, 2, 8] {
        s.save_score(score);
    }
    assert_eq!(s.leaderboard.scores(), &[12, 9, 8, 7, 5]);
}

#[test]
fn equipping_twice_matches_equipping_the_second_item() {
    let mut twice = Session::quiet(18);
    twice.inventory.push(make_item("Leather Vest", Rarity::Legendary).expect("known item"));
    twice.inventory.push(make_item("Plate Armor", Rarity::Normal).expect("known item"));
    assert!(twice.equip_item(0));
    assert!(twice.equip_item(0));

    let mut once = Session::quiet(18);
    once.inventory.push(make_item("Plate Armor", Rarity::Normal).expect("known item"));
    assert!(once.equip_item(0));

    assert_eq!(twice.player.armor, once.player.armor);
    assert_eq!(twice.player.damage, once.player.damage);
    assert_eq!(twice.player.max_health, once.player.max_health);
}

#[test]
fn golden_cube_and_portal_stay_unique_over_a_long_run() {
    let mut s = Session::seeded(19);
    let mut input = PlayerInput {
        attack: true,
        ..default()
    };
    for _ in 0..6_000 {
        s.player.health = HitPoints::new(s.player.max_health);
        s.tick(DT, &mut input);

        assert!(s.registry.count_enemies(EnemyKind::Golden) <= 1);
        let golden_portals = s
            .registry
            .portals
            .iter()
            .filter(|p| p.kind == PortalKind::Golden)
            .count();
        assert!(golden_portals <= 1);
        let half = s.tuning.arena_half_extent;
        assert!(s.player.position.abs().max_element() <= half);
    }
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut s = Session::seeded(seed);
        let mut input = PlayerInput {
            move_dir: Vec2::new(1.0, 0.5),
            attack: true,
            ..default()
        };
        for _ in 0..900 {
            s.tick(DT, &mut input);
        }
        let positions: Vec<Vec2> = s.registry.enemies.iter().map(|e| e.position).collect();
        (s.wave.number, s.player.kills, s.player.coins, positions)
    };
    assert_eq!(run(20), run(20));
}
