use serde::{Deserialize, Serialize};

// ── Newtypes ────────────────────────────────────────────────────────

/// Hit points. Never negative; `display_fraction` floors at zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct HitPoints(pub f32);

impl HitPoints {
    pub fn new(v: f32) -> Self {
        debug_assert!(v.is_finite(), "HitPoints must be finite");
        Self(v.max(0.0))
    }

    pub fn add_clamped(self, delta: f32, max: f32) -> Self {
        let v = (self.0 + delta).clamp(0.0, max.max(0.0));
        debug_assert!(v.is_finite());
        Self(v)
    }

    pub fn sub_clamped(self, delta: f32) -> Self {
        let v = (self.0 - delta).max(0.0);
        debug_assert!(v.is_finite());
        Self(v)
    }

    pub fn is_alive(self) -> bool {
        self.0 > 0.0
    }

    /// Fraction of `max` remaining, in [0, 1]. Used for health bars.
    pub fn display_fraction(self, max: f32) -> f32 {
        if max <= 0.0 {
            return 0.0;
        }
        (self.0 / max).clamp(0.0, 1.0)
    }
}

/// Duration in seconds. Always >= 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(pub f32);

impl Seconds {
    pub const ZERO: Self = Self(0.0);

    pub fn new(v: f32) -> Self {
        Self(v.max(0.0))
    }

    /// Decrement by dt, clamped to 0.
    pub fn dec(self, dt: f32) -> Self {
        Self((self.0 - dt).max(0.0))
    }

    pub fn is_expired(self) -> bool {
        self.0 <= 0.0
    }

    pub fn is_active(self) -> bool {
        self.0 > 0.0
    }
}

/// Discrete tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Tick(pub u64);

impl Tick {
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

// ── Enums ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemSlot {
    Weapon,
    Helm,
    Armor,
}

impl ItemSlot {
    pub const ALL: [Self; 3] = [Self::Weapon, Self::Helm, Self::Armor];

    pub fn label(self) -> &'static str {
        match self {
            Self::Weapon => "Weapon",
            Self::Helm => "Helm",
            Self::Armor => "Armor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Normal,
    Unique,
    Legendary,
}

impl Rarity {
    /// Magnitude multiplier applied to an item's base value.
    pub fn scale(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Unique => 1.5,
            Self::Legendary => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Unique => "Unique",
            Self::Legendary => "Legendary",
        }
    }
}

/// Ability bound to a helm, triggered by the ability key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelmSpecial {
    Teleport,
    Summon,
}

/// Who dealt a blow. Kill rewards are identical for every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageSource {
    Player,
    Ally,
    Explosion,
    Trap,
}

/// A one-shot control effect applied to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEffect {
    Stun { duration: Seconds },
    Knockback { distance: f32 },
}
