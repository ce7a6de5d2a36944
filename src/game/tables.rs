use rand::Rng;

/// Declarative weighted table. `sample` is the single draw routine every loot and
/// rarity roll goes through, so a seeded RNG reproduces a whole run.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T> WeightedTable<T> {
    pub fn new(entries: Vec<(T, u32)>) -> Self {
        let total = entries.iter().map(|(_, w)| *w).sum();
        Self { entries, total }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.total == 0 {
            return self.entries.first().map(|(v, _)| v);
        }
        let roll = rng.gen_range(0..self.total);
        let mut cumulative = 0;
        for (value, weight) in &self.entries {
            cumulative += weight;
            if roll < cumulative {
                return Some(value);
            }
        }
        self.entries.last().map(|(v, _)| v)
    }
}

/// A gate that fires with a fixed probability once the wave is past `after_wave`.
#[derive(Debug, Clone, Copy)]
pub struct ChanceRule<T> {
    pub value: T,
    pub chance: f64,
    /// Rule is live only when `wave > after_wave`.
    pub after_wave: u32,
    pub even_waves_only: bool,
}

impl<T: Copy> ChanceRule<T> {
    pub const fn always(value: T, chance: f64) -> Self {
        Self {
            value,
            chance,
            after_wave: 0,
            even_waves_only: false,
        }
    }

    pub const fn after(value: T, chance: f64, after_wave: u32) -> Self {
        Self {
            value,
            chance,
            after_wave,
            even_waves_only: false,
        }
    }

    pub const fn on_even_waves(value: T) -> Self {
        Self {
            value,
            chance: 1.0,
            after_wave: 0,
            even_waves_only: true,
        }
    }

    fn eligible(&self, wave: u32) -> bool {
        wave > self.after_wave && (!self.even_waves_only || wave % 2 == 0)
    }
}

/// Roll every rule independently and return the values that fired, in table order.
pub fn roll_rules<T: Copy, R: Rng + ?Sized>(rules: &[ChanceRule<T>], wave: u32, rng: &mut R) -> Vec<T> {
    rules
        .iter()
        .filter(|rule| rule.eligible(wave))
        .filter(|rule| roll(rng, rule.chance))
        .map(|rule| rule.value)
        .collect()
}

/// Bernoulli trial. `chance >= 1` always fires, `chance <= 0` never does.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    if chance >= 1.0 {
        return true;
    }
    if chance <= 0.0 {
        return false;
    }
    rng.gen_bool(chance)
}
