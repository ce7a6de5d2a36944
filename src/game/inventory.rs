use std::sync::LazyLock;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{AllyVariant, EntityKind, LootDrop};
use super::events::SimEvent;
use super::player::{ABILITY_COOLDOWN, clamp_to_arena};
use super::session::Session;
use super::stats::modifier::{ModifierSet, StatModifier};
use super::stats::types::{HelmSpecial, ItemSlot, Rarity, Seconds};
use super::tables::WeightedTable;

pub const PICKUP_RADIUS: f32 = 1.5;
pub const LOOT_DROP_CHANCE: f64 = 0.10;
pub const WIZARD_HAT: &str = "Wizard Hat";
pub const KING_CROWN: &str = "King Crown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon { damage: f32 },
    Helm { bonus: f32, special: Option<HelmSpecial> },
    Armor { armor: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
}

impl Item {
    pub fn slot(&self) -> ItemSlot {
        match self.kind {
            ItemKind::Weapon { .. } => ItemSlot::Weapon,
            ItemKind::Helm { .. } => ItemSlot::Helm,
            ItemKind::Armor { .. } => ItemSlot::Armor,
        }
    }

    pub fn special(&self) -> Option<HelmSpecial> {
        match self.kind {
            ItemKind::Helm { special, .. } => special,
            _ => None,
        }
    }

    /// Contribution of this item to the derived player stats.
    pub fn to_modifiers(&self) -> ModifierSet {
        let mut mods = ModifierSet::new();
        match self.kind {
            ItemKind::Weapon { damage } => mods.damage = StatModifier::replacing(damage),
            ItemKind::Helm { bonus, .. } => mods.max_health = StatModifier::adding(bonus),
            ItemKind::Armor { armor } => mods.armor = StatModifier::replacing(armor),
        }
        mods
    }

    /// One-line description for the inventory panel.
    pub fn describe(&self) -> String {
        let detail = match &self.kind {
            ItemKind::Weapon { damage } => format!("dmg {damage:.1}"),
            ItemKind::Helm { bonus, special } => match special {
                Some(HelmSpecial::Teleport) => format!("+{bonus:.0} hp, teleport"),
                Some(HelmSpecial::Summon) => format!("+{bonus:.0} hp, summon"),
                None => format!("+{bonus:.0} hp"),
            },
            ItemKind::Armor { armor } => format!("armor {armor:.1}"),
        };
        format!("{} {} ({detail})", self.rarity.label(), self.name)
    }
}

// ── Loot table ──────────────────────────────────────────────────────

struct ItemTemplate {
    name: &'static str,
    slot: ItemSlot,
    base: f32,
    special: Option<HelmSpecial>,
}

const ITEM_TEMPLATES: [ItemTemplate; 9] = [
    ItemTemplate { name: "Short Sword", slot: ItemSlot::Weapon, base: 2.0, special: None },
    ItemTemplate { name: "Battle Axe", slot: ItemSlot::Weapon, base: 3.0, special: None },
    ItemTemplate { name: "War Hammer", slot: ItemSlot::Weapon, base: 4.0, special: None },
    ItemTemplate { name: "Iron Helm", slot: ItemSlot::Helm, base: 10.0, special: None },
    ItemTemplate { name: WIZARD_HAT, slot: ItemSlot::Helm, base: 15.0, special: Some(HelmSpecial::Teleport) },
    ItemTemplate { name: KING_CROWN, slot: ItemSlot::Helm, base: 20.0, special: Some(HelmSpecial::Summon) },
    ItemTemplate { name: "Leather Vest", slot: ItemSlot::Armor, base: 2.0, special: None },
    ItemTemplate { name: "Chain Mail", slot: ItemSlot::Armor, base: 3.0, special: None },
    ItemTemplate { name: "Plate Armor", slot: ItemSlot::Armor, base: 5.0, special: None },
];

static RARITY_TABLE: LazyLock<WeightedTable<Rarity>> = LazyLock::new(|| {
    WeightedTable::new(vec![
        (Rarity::Normal, 70),
        (Rarity::Unique, 25),
        (Rarity::Legendary, 5),
    ])
});

static ITEM_TABLE: LazyLock<WeightedTable<usize>> =
    LazyLock::new(|| WeightedTable::new((0..ITEM_TEMPLATES.len()).map(|i| (i, 1)).collect()));

fn build(template: &ItemTemplate, rarity: Rarity) -> Item {
    let magnitude = template.base * rarity.scale();
    let kind = match template.slot {
        ItemSlot::Weapon => ItemKind::Weapon { damage: magnitude },
        ItemSlot::Helm => ItemKind::Helm {
            bonus: magnitude,
            special: template.special,
        },
        ItemSlot::Armor => ItemKind::Armor { armor: magnitude },
    };
    Item {
        name: template.name.into(),
        rarity,
        kind,
    }
}

/// Build a named item from the table at a given rarity.
pub fn make_item(name: &str, rarity: Rarity) -> Option<Item> {
    ITEM_TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .map(|t| build(t, rarity))
}

fn roll_rarity<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
    RARITY_TABLE.sample(rng).copied().unwrap_or(Rarity::Normal)
}

/// Draw a random item with a random rarity.
pub fn roll_item<R: Rng + ?Sized>(rng: &mut R) -> Item {
    let idx = ITEM_TABLE.sample(rng).copied().unwrap_or(0);
    build(&ITEM_TEMPLATES[idx], roll_rarity(rng))
}

/// Draw a named item with a random rarity.
pub fn roll_named<R: Rng + ?Sized>(rng: &mut R, name: &str) -> Option<Item> {
    let rarity = roll_rarity(rng);
    make_item(name, rarity)
}

// ── Inventory / equipment ───────────────────────────────────────────

/// Unequipped items in pickup order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn take(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// At most one item per slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equipped {
    pub weapon: Option<Item>,
    pub helm: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipped {
    pub fn get(&self, slot: ItemSlot) -> Option<&Item> {
        match slot {
            ItemSlot::Weapon => self.weapon.as_ref(),
            ItemSlot::Helm => self.helm.as_ref(),
            ItemSlot::Armor => self.armor.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: ItemSlot) -> &mut Option<Item> {
        match slot {
            ItemSlot::Weapon => &mut self.weapon,
            ItemSlot::Helm => &mut self.helm,
            ItemSlot::Armor => &mut self.armor,
        }
    }

    /// Put `item` in its slot and hand back whatever was there.
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        self.slot_mut(item.slot()).replace(item)
    }

    /// Combine all equipped item modifiers into a single ModifierSet.
    pub fn combined_modifiers(&self) -> ModifierSet {
        let mut mods = ModifierSet::new();
        for item in ItemSlot::ALL.into_iter().filter_map(|slot| self.get(slot)) {
            mods.merge(&item.to_modifiers());
        }
        mods
    }

    pub fn helm_special(&self) -> Option<HelmSpecial> {
        self.helm.as_ref().and_then(Item::special)
    }
}

impl Session {
    /// Equip the inventory item at `index`. The item previously in that slot is
    /// discarded. Returns false for an out-of-range index.
    pub fn equip_item(&mut self, index: usize) -> bool {
        let Some(item) = self.inventory.take(index) else {
            return false;
        };
        let _discarded = self.equipped.equip(item);
        self.recompute_stats();
        self.push_event(SimEvent::EquipmentChanged);
        true
    }

    /// Re-derive damage, armor and max health from base stats, equipment and the
    /// permanent health bonus.
    pub fn recompute_stats(&mut self) {
        let mut mods = self.equipped.combined_modifiers();
        mods.merge(&ModifierSet {
            max_health: StatModifier::adding(self.player.bonus_max_health),
            ..ModifierSet::new()
        });
        let effective = mods.compute_effective(&self.base);
        self.player.apply_effective(&effective);
    }

    pub(crate) fn grant_item(&mut self, item: Item) {
        self.push_event(SimEvent::ItemAcquired {
            name: item.name.clone(),
        });
        self.inventory.push(item);
        self.push_event(SimEvent::EquipmentChanged);
    }

    pub(crate) fn drop_loot(&mut self, position: Vec2) {
        let item = roll_item(&mut self.rng);
        let id = self.registry.alloc_id();
        self.registry.loot.push(LootDrop { id, position, item });
        self.push_event(SimEvent::Spawned {
            id,
            kind: EntityKind::LootDrop,
        });
    }

    /// Collect coins and loot drops within reach of the player.
    pub(crate) fn collect_pickups(&mut self) {
        let at = self.player.position;

        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.registry.coins)
            .into_iter()
            .partition(|c| c.position.distance(at) <= PICKUP_RADIUS);
        self.registry.coins = kept;
        for coin in taken {
            self.player.coins += coin.value;
            self.push_event(SimEvent::CoinCollected { value: coin.value });
            self.push_event(SimEvent::Removed { id: coin.id });
        }

        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.registry.loot)
            .into_iter()
            .partition(|l| l.position.distance(at) <= PICKUP_RADIUS);
        self.registry.loot = kept;
        for drop in taken {
            self.push_event(SimEvent::Removed { id: drop.id });
            self.grant_item(drop.item);
        }
    }

    /// Trigger the equipped helm's special. False when no special is equipped,
    /// the ability is cooling down, or the player is stunned.
    pub fn use_ability(&mut self) -> bool {
        let Some(special) = self.equipped.helm_special() else {
            return false;
        };
        if self.player.ability_timer.is_active() || self.player.is_stunned() {
            return false;
        }
        match special {
            HelmSpecial::Teleport => {
                let half = self.tuning.arena_half_extent;
                let target = Vec2::new(
                    self.rng.gen_range(-half..=half),
                    self.rng.gen_range(-half..=half),
                );
                self.player.position = clamp_to_arena(target, half);
                self.push_event(SimEvent::PlayerTeleported { position: target });
            }
            HelmSpecial::Summon => {
                let at = self.player.position;
                self.spawn_ally(AllyVariant::Orange, at);
            }
        }
        self.player.ability_timer = Seconds(ABILITY_COOLDOWN);
        true
    }
}
