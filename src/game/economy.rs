use bevy::prelude::*;

use super::entities::{AllyVariant, EntityKind, Trap};
use super::events::SimEvent;
use super::player::REGEN_INTERVAL;
use super::session::Session;
use super::stats::types::{HitPoints, Seconds};

pub const ARMOR_BOOST_DURATION: f32 = 17.0;
pub const SPEED_BOOST_DURATION: f32 = 10.0;
pub const WEAPON_BOOST_DURATION: f32 = 15.0;
pub const WEAPON_BOOST_DAMAGE: f32 = 3.0;
pub const HEALTH_UPGRADE_BONUS: f32 = 20.0;
pub const TRAP_LIFETIME: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Armor,
    Health,
    Speed,
    Weapon,
    Ally,
    Trap,
    Regen,
    Radar,
    HardMode,
}

/// A shop row as shown to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopEntry {
    pub upgrade: UpgradeKind,
    pub cost: u32,
    pub label: &'static str,
    pub hotkey: char,
    pub available: bool,
}

impl UpgradeKind {
    pub const ALL: [Self; 9] = [
        Self::Armor,
        Self::Health,
        Self::Speed,
        Self::Weapon,
        Self::Ally,
        Self::Trap,
        Self::Regen,
        Self::Radar,
        Self::HardMode,
    ];

    pub fn cost(self) -> u32 {
        match self {
            Self::Armor => 50,
            Self::Health => 30,
            Self::Speed => 40,
            Self::Weapon => 60,
            Self::Ally => 30,
            Self::Trap => 40,
            Self::Regen => 100,
            Self::Radar => 70,
            Self::HardMode => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Armor => "Armor Boost",
            Self::Health => "Max Health +20",
            Self::Speed => "Speed Boost",
            Self::Weapon => "Weapon Boost",
            Self::Ally => "Hire Ally",
            Self::Trap => "Place Trap",
            Self::Regen => "Regeneration",
            Self::Radar => "Radar",
            Self::HardMode => "Toggle Hard Mode",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            Self::Armor => '1',
            Self::Health => '2',
            Self::Speed => '3',
            Self::Weapon => '4',
            Self::Ally => '5',
            Self::Trap => '6',
            Self::Regen => '7',
            Self::Radar => '8',
            Self::HardMode => '9',
        }
    }

    pub fn from_hotkey(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.hotkey() == key)
    }
}

impl Session {
    /// Whether `upgrade` is currently blocked by its own running effect.
    fn upgrade_locked(&self, upgrade: UpgradeKind) -> bool {
        let p = &self.player;
        match upgrade {
            UpgradeKind::Armor => p.armor_boost.is_active(),
            UpgradeKind::Speed => p.speed_boost.is_active(),
            UpgradeKind::Weapon => p.weapon_boost.is_active(),
            UpgradeKind::Regen => p.regen_active,
            UpgradeKind::Radar => p.radar,
            UpgradeKind::Health | UpgradeKind::Ally | UpgradeKind::Trap | UpgradeKind::HardMode => false,
        }
    }

    pub fn can_buy(&self, upgrade: UpgradeKind) -> bool {
        self.player.coins >= upgrade.cost() && !self.upgrade_locked(upgrade)
    }

    /// Spend coins on an upgrade. Rejected purchases change nothing.
    pub fn buy_upgrade(&mut self, upgrade: UpgradeKind) -> bool {
        if !self.can_buy(upgrade) {
            debug!(
                "purchase of {:?} rejected (coins {}, cost {})",
                upgrade,
                self.player.coins,
                upgrade.cost()
            );
            return false;
        }
        self.player.coins -= upgrade.cost();

        match upgrade {
            UpgradeKind::Armor => self.player.armor_boost = Seconds(ARMOR_BOOST_DURATION),
            UpgradeKind::Health => {
                self.player.bonus_max_health += HEALTH_UPGRADE_BONUS;
                self.recompute_stats();
                self.player.health = HitPoints::new(self.player.max_health);
            }
            UpgradeKind::Speed => {
                self.player.speed_boost = Seconds(SPEED_BOOST_DURATION);
                self.player.refresh_speed();
            }
            UpgradeKind::Weapon => self.player.weapon_boost = Seconds(WEAPON_BOOST_DURATION),
            UpgradeKind::Ally => {
                let at = self.player.position;
                self.spawn_ally(AllyVariant::Normal, at);
            }
            UpgradeKind::Trap => {
                let id = self.registry.alloc_id();
                self.registry.traps.push(Trap {
                    id,
                    position: self.player.position,
                    remaining: Seconds(TRAP_LIFETIME),
                });
                self.push_event(SimEvent::Spawned {
                    id,
                    kind: EntityKind::Trap,
                });
            }
            UpgradeKind::Regen => {
                self.player.regen_active = true;
                self.player.regen_timer = Seconds(REGEN_INTERVAL);
            }
            UpgradeKind::Radar => self.player.radar = true,
            UpgradeKind::HardMode => {
                self.hard_mode = !self.hard_mode;
                info!("hard mode {}", if self.hard_mode { "on" } else { "off" });
            }
        }

        self.push_event(SimEvent::UpgradePurchased { upgrade });
        true
    }

    pub fn shop_entries(&self) -> Vec<ShopEntry> {
        UpgradeKind::ALL
            .into_iter()
            .map(|upgrade| ShopEntry {
                upgrade,
                cost: upgrade.cost(),
                label: upgrade.label(),
                hotkey: upgrade.hotkey(),
                available: self.can_buy(upgrade),
            })
            .collect()
    }

    /// Count traps down and remove expired ones.
    pub(crate) fn update_traps(&mut self, dt: f32) {
        for trap in &mut self.registry.traps {
            trap.remaining = trap.remaining.dec(dt);
        }
        let expired: Vec<_> = self
            .registry
            .traps
            .iter()
            .filter(|t| t.remaining.is_expired())
            .map(|t| t.id)
            .collect();
        self.registry.traps.retain(|t| t.remaining.is_active());
        for id in expired {
            self.push_event(SimEvent::Removed { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::Session;

    fn rich(seed: u64, coins: u32) -> Session {
        let mut s = Session::quiet(seed);
        s.player.coins = coins;
        s
    }

    #[test]
    fn armor_purchase_is_gated_by_its_timer() {
        let mut s = rich(1, 50);
        assert!(s.buy_upgrade(UpgradeKind::Armor));
        assert_eq!(s.player.coins, 0);
        assert_eq!(s.player.armor_boost, Seconds(17.0));

        s.player.coins = 80;
        assert!(!s.buy_upgrade(UpgradeKind::Armor));
        assert_eq!(s.player.coins, 80);
    }

    #[test]
    fn insufficient_funds_are_rejected_silently() {
        let mut s = rich(2, 29);
        for upgrade in UpgradeKind::ALL {
            if upgrade.cost() > 29 {
                assert!(!s.buy_upgrade(upgrade), "{upgrade:?}");
            }
        }
        assert_eq!(s.player.coins, 29);
        assert!(s.registry.allies.is_empty() && s.registry.traps.is_empty());
    }

    #[test]
    fn health_upgrade_is_permanent_and_heals() {
        let mut s = rich(3, 60);
        s.player.health = HitPoints(40.0);
        assert!(s.buy_upgrade(UpgradeKind::Health));
        assert_eq!(s.player.max_health, 120.0);
        assert_eq!(s.player.health.0, 120.0);

        // Re-deriving stats keeps the bonus.
        s.recompute_stats();
        assert_eq!(s.player.max_health, 120.0);
        assert!(s.buy_upgrade(UpgradeKind::Health));
        assert_eq!(s.player.max_health, 140.0);
    }

    #[test]
    fn speed_and_weapon_boosts() {
        let mut s = rich(4, 100);
        assert!(s.buy_upgrade(UpgradeKind::Speed));
        assert!((s.player.speed - s.player.base_speed * 2.0).abs() < 1e-6);
        assert!(s.buy_upgrade(UpgradeKind::Weapon));
        assert_eq!(s.player.attack_damage(), WEAPON_BOOST_DAMAGE);
        assert_eq!(s.player.attack_range(), crate::game::combat::BOOSTED_MELEE_RANGE);
        assert_eq!(s.player.coins, 0);
    }

    #[test]
    fn ally_and_trap_spawn_at_player() {
        let mut s = rich(5, 70);
        s.player.position = Vec2::new(3.0, 4.0);
        assert!(s.buy_upgrade(UpgradeKind::Ally));
        assert!(s.buy_upgrade(UpgradeKind::Trap));
        assert_eq!(s.registry.allies.len(), 1);
        assert_eq!(s.registry.traps[0].position, Vec2::new(3.0, 4.0));
        assert_eq!(s.player.coins, 0);
    }

    #[test]
    fn regen_and_radar_are_one_shot() {
        let mut s = rich(6, 400);
        assert!(s.buy_upgrade(UpgradeKind::Regen));
        assert!(!s.buy_upgrade(UpgradeKind::Regen));
        assert!(s.buy_upgrade(UpgradeKind::Radar));
        assert!(!s.buy_upgrade(UpgradeKind::Radar));
        assert_eq!(s.player.coins, 400 - 100 - 70);
    }

    #[test]
    fn hard_mode_is_a_free_toggle() {
        let mut s = rich(7, 0);
        assert!(s.buy_upgrade(UpgradeKind::HardMode));
        assert!(s.hard_mode);
        assert!(s.buy_upgrade(UpgradeKind::HardMode));
        assert!(!s.hard_mode);
    }

    #[test]
    fn shop_lists_nine_entries_with_unique_hotkeys() {
        let s = rich(8, 45);
        let entries = s.shop_entries();
        assert_eq!(entries.len(), 9);
        let mut keys: Vec<char> = entries.iter().map(|e| e.hotkey).collect();
        keys.dedup();
        assert_eq!(keys.len(), 9);
        let affordable: Vec<_> = entries.iter().filter(|e| e.available).map(|e| e.upgrade).collect();
        assert_eq!(
            affordable,
            vec![UpgradeKind::Health, UpgradeKind::Speed, UpgradeKind::Ally, UpgradeKind::Trap, UpgradeKind::HardMode]
        );
        assert_eq!(UpgradeKind::from_hotkey('7'), Some(UpgradeKind::Regen));
    }

    #[test]
    fn traps_expire() {
        let mut s = rich(9, 40);
        s.buy_upgrade(UpgradeKind::Trap);
        for _ in 0..700 {
            s.update_traps(0.016);
        }
        assert!(s.registry.traps.is_empty());
    }
}
