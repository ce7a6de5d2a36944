use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All tunable session parameters, loaded from tuning.ron.
///
/// Gameplay rule constants (costs, profiles, cooldowns) live next to the rules
/// that use them; this file only carries the knobs that shape a session.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fixed simulation step in seconds.
    pub dt: f32,
    pub pixels_per_unit: f32,
    /// The arena is the square [-half, half] on both axes.
    pub arena_half_extent: f32,
    /// Normal portals opened at session start and after every game-over.
    pub initial_portals: u32,
    /// Length of a full day-night cycle.
    pub day_length_secs: f32,
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dt: 0.016,
            pixels_per_unit: 16.0,
            arena_half_extent: 20.0,
            initial_portals: 3,
            day_length_secs: 120.0,
            seed: None,
            window_width: 1280,
            window_height: 800,
        }
    }
}

impl Tuning {
    /// Get the data directory for tuning and save files.
    pub fn data_dir() -> PathBuf {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("portal_arena")
    }

    /// Path to the tuning file.
    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    /// Load from file, or create default if not found.
    pub fn load_or_default() -> Self {
        let path = Self::file_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::from_ron(&contents) {
                    Ok(tuning) => return tuning,
                    Err(e) => {
                        warn!("Failed to parse tuning.ron: {e}, using defaults");
                    }
                },
                Err(e) => {
                    warn!("Failed to read tuning.ron: {e}, using defaults");
                }
            }
        }
        let tuning = Self::default();
        tuning.save();
        tuning
    }

    /// Parse a RON document. Missing fields take their default value.
    pub fn from_ron(contents: &str) -> Result<Self, String> {
        ron::from_str::<Self>(contents)
            .map(Self::sanitized)
            .map_err(|e| e.to_string())
    }

    /// Save current tuning to file.
    pub fn save(&self) {
        let path = Self::file_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let pretty = ron::ser::PrettyConfig::default();
        match ron::ser::to_string_pretty(self, pretty) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    warn!("Failed to write tuning.ron: {e}");
                }
            }
            Err(e) => {
                warn!("Failed to serialize tuning: {e}");
            }
        }
    }

    /// Reload from file (called by key press).
    pub fn reload(&mut self) {
        *self = Self::load_or_default();
        info!("Tuning reloaded");
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.dt.is_finite() && self.dt > 0.0) {
            self.dt = defaults.dt;
        }
        if !(self.arena_half_extent.is_finite() && self.arena_half_extent > 1.0) {
            self.arena_half_extent = defaults.arena_half_extent;
        }
        if !(self.day_length_secs.is_finite() && self.day_length_secs > 0.0) {
            self.day_length_secs = defaults.day_length_secs;
        }
        self.pixels_per_unit = self.pixels_per_unit.max(1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_fills_in_defaults() {
        let tuning = Tuning::from_ron("(arena_half_extent: 12.0, seed: Some(7))").unwrap();
        assert_eq!(tuning.arena_half_extent, 12.0);
        assert_eq!(tuning.seed, Some(7));
        assert_eq!(tuning.initial_portals, 3);
        assert!((tuning.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn nonsense_values_are_replaced() {
        let tuning = Tuning::from_ron("(dt: -1.0, arena_half_extent: 0.0)").unwrap();
        assert!(tuning.dt > 0.0);
        assert_eq!(tuning.arena_half_extent, 20.0);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(Tuning::from_ron("(dt: ").is_err());
    }
}
