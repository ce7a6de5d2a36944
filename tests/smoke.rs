mod common;

use bevy::prelude::*;

use portal_arena::game::components::UiPanels;
use portal_arena::game::economy::UpgradeKind;
use portal_arena::game::events::SimEvent;
use portal_arena::game::intent::PlayerInput;
use portal_arena::game::inventory::make_item;
use portal_arena::game::session::Session;
use portal_arena::game::stats::types::Rarity;

#[test]
fn app_boots_with_a_running_session() {
    let mut app = common::app_with_session(Session::seeded(1));
    assert_eq!(common::session(&app).wave.number, 1);

    common::step(&mut app, 120);
    let s = common::session(&app);
    assert!(s.tick.0 >= 120);
    assert!(!s.registry.enemies.is_empty());
}

#[test]
fn headless_app_builds_its_own_session() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, bevy::state::app::StatesPlugin));
    portal_arena::plugins::configure_headless(&mut app);
    app.update();
    assert!(app.world().get_resource::<Session>().is_some());
}

#[test]
fn movement_keys_drive_the_player() {
    let mut app = common::app_with_session(Session::quiet(2));
    common::press(&mut app, KeyCode::KeyD);
    app.update();
    assert_eq!(app.world().resource::<PlayerInput>().move_dir, Vec2::X);

    let x0 = common::session(&app).player.position.x;
    common::step(&mut app, 10);
    let moved = common::session(&app).player.position.x - x0;
    assert!((moved - 1.0).abs() < 1e-4, "{moved}");
}

#[test]
fn digit_buys_from_the_shop() {
    let mut app = common::app_with_session(Session::quiet(3));
    common::session_mut(&mut app).player.coins = 50;

    common::press(&mut app, KeyCode::Digit1);
    app.update();
    common::release_all(&mut app);

    let s = common::session(&app);
    assert_eq!(s.player.coins, 0);
    assert!(s.player.armor_boost.is_active());
    assert!(
        common::drain_messages(&mut app)
            .iter()
            .any(|e| *e == SimEvent::UpgradePurchased { upgrade: UpgradeKind::Armor })
    );
}

#[test]
fn inventory_toggle_turns_digits_into_equip() {
    let mut session = Session::quiet(4);
    session.inventory.push(make_item("War Hammer", Rarity::Normal).unwrap());
    session.player.coins = 100;
    let mut app = common::app_with_session(session);

    common::press(&mut app, KeyCode::KeyI);
    app.update();
    assert!(app.world().resource::<UiPanels>().inventory_open);

    common::press(&mut app, KeyCode::Digit1);
    app.update();
    common::release_all(&mut app);

    let s = common::session(&app);
    assert_eq!(s.player.damage, 4.0);
    assert_eq!(s.player.coins, 100);
}

#[test]
fn pause_key_freezes_the_fixed_step() {
    let mut app = common::app_with_session(Session::seeded(5));
    common::press(&mut app, KeyCode::KeyP);
    app.update();
    common::release_all(&mut app);
    app.update();

    let before = common::session(&app).tick;
    common::step(&mut app, 50);
    assert_eq!(common::session(&app).tick, before);

    common::press(&mut app, KeyCode::Escape);
    app.update();
    common::release_all(&mut app);
    app.update();
    common::step(&mut app, 5);
    assert!(common::session(&app).tick > before);
}

#[test]
fn fixed_step_publishes_session_events() {
    let mut app = common::app_with_session(Session::quiet(6));
    common::drain_messages(&mut app);
    common::session_mut(&mut app).restart_wave();
    // Frame systems forward events produced by actions.
    app.update();
    let events = common::drain_messages(&mut app);
    assert!(events.iter().any(|e| matches!(e, SimEvent::WaveStarted { wave: 1 })));
}
