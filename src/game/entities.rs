use bevy::math::Vec2;

use super::enemy::{Enemy, EnemyKind};
use super::inventory::Item;
use super::stats::types::Seconds;

/// Session-unique handle for every simulated entity. Cross references between
/// entities (enemy → portal, visual → entity) go through this id, never a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalKind {
    Normal,
    Boss,
    Golden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllyVariant {
    Normal,
    /// Summoned by the King Crown helm.
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleTint {
    Blood,
    Gold,
    Blast,
}

/// What a visual should look like; carried by spawn events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Enemy(EnemyKind),
    Ally(AllyVariant),
    Portal(PortalKind),
    Projectile,
    Coin,
    Trap,
    LootDrop,
    Particle(ParticleTint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    pub id: EntityId,
    pub kind: PortalKind,
    pub position: Vec2,
    pub countdown: Option<Seconds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ally {
    pub id: EntityId,
    pub variant: AllyVariant,
    pub position: Vec2,
    pub lifetime: Seconds,
    pub attack_cooldown: Seconds,
    /// Seconds between blows.
    pub attack_interval: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
    /// World units per tick.
    pub speed: f32,
    pub damage: f32,
    pub travelled: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: EntityId,
    pub position: Vec2,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trap {
    pub id: EntityId,
    pub position: Vec2,
    pub remaining: Seconds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootDrop {
    pub id: EntityId,
    pub position: Vec2,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: EntityId,
    pub tint: ParticleTint,
    pub position: Vec2,
    pub velocity: Vec2,
    pub remaining: Seconds,
}

/// Owns every entity collection of a session.
#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    pub enemies: Vec<Enemy>,
    pub allies: Vec<Ally>,
    pub portals: Vec<Portal>,
    pub projectiles: Vec<Projectile>,
    pub coins: Vec<Coin>,
    pub traps: Vec<Trap>,
    pub loot: Vec<LootDrop>,
    pub particles: Vec<Particle>,
}

impl Registry {
    pub fn alloc_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn take_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    pub fn portal(&self, id: EntityId) -> Option<&Portal> {
        self.portals.iter().find(|p| p.id == id)
    }

    pub fn take_portal(&mut self, id: EntityId) -> Option<Portal> {
        let idx = self.portals.iter().position(|p| p.id == id)?;
        Some(self.portals.remove(idx))
    }

    pub fn first_portal(&self, kind: PortalKind) -> Option<&Portal> {
        self.portals.iter().find(|p| p.kind == kind)
    }

    pub fn count_enemies(&self, kind: EnemyKind) -> usize {
        self.enemies.iter().filter(|e| e.kind == kind).count()
    }

    /// Enemies that keep a wave open. The golden cube leaves on its own.
    pub fn hostile_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.kind != EnemyKind::Golden).count()
    }

    /// Position of any live entity, for presentation sync.
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.enemies
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.position)
            .or_else(|| self.allies.iter().find(|a| a.id == id).map(|a| a.position))
            .or_else(|| self.portals.iter().find(|p| p.id == id).map(|p| p.position))
            .or_else(|| self.projectiles.iter().find(|p| p.id == id).map(|p| p.position))
            .or_else(|| self.coins.iter().find(|c| c.id == id).map(|c| c.position))
            .or_else(|| self.traps.iter().find(|t| t.id == id).map(|t| t.position))
            .or_else(|| self.loot.iter().find(|l| l.id == id).map(|l| l.position))
            .or_else(|| self.particles.iter().find(|p| p.id == id).map(|p| p.position))
    }

    /// Empty every collection and return the ids that were removed.
    /// Ids keep increasing across clears.
    pub fn clear(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();
        removed.extend(self.enemies.drain(..).map(|e| e.id));
        removed.extend(self.allies.drain(..).map(|a| a.id));
        removed.extend(self.portals.drain(..).map(|p| p.id));
        removed.extend(self.projectiles.drain(..).map(|p| p.id));
        removed.extend(self.coins.drain(..).map(|c| c.id));
        removed.extend(self.traps.drain(..).map(|t| t.id));
        removed.extend(self.loot.drain(..).map(|l| l.id));
        removed.extend(self.particles.drain(..).map(|p| p.id));
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
            && self.allies.is_empty()
            && self.portals.is_empty()
            && self.projectiles.is_empty()
            && self.coins.is_empty()
            && self.traps.is_empty()
            && self.loot.is_empty()
            && self.particles.is_empty()
    }
}
