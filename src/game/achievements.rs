use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::events::SimEvent;
use super::session::Session;

pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const LEADERBOARD_KEY: &str = "leaderboard";
pub const GOLDEN_SLAYER_KILLS: u32 = 10;
pub const WAVE_MASTER_WAVE: u32 = 20;
pub const LEADERBOARD_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    GoldenSlayer,
    WaveMaster,
}

impl Achievement {
    pub const ALL: [Self; 2] = [Self::GoldenSlayer, Self::WaveMaster];

    pub fn label(self) -> &'static str {
        match self {
            Self::GoldenSlayer => "Golden Slayer",
            Self::WaveMaster => "Wave Master",
        }
    }

    pub fn target(self) -> u32 {
        match self {
            Self::GoldenSlayer => GOLDEN_SLAYER_KILLS,
            Self::WaveMaster => WAVE_MASTER_WAVE,
        }
    }
}

/// Persistent milestone state. Counters carry across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievements {
    pub golden_slayer: bool,
    pub wave_master: bool,
    pub golden_kills: u32,
    pub best_wave: u32,
}

impl Achievements {
    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        match achievement {
            Achievement::GoldenSlayer => self.golden_slayer,
            Achievement::WaveMaster => self.wave_master,
        }
    }

    pub fn progress(&self, achievement: Achievement) -> u32 {
        match achievement {
            Achievement::GoldenSlayer => self.golden_kills,
            Achievement::WaveMaster => self.best_wave,
        }
    }

    /// Flip every flag whose condition now holds; returns the newly unlocked ones.
    pub fn evaluate(&mut self) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        if !self.golden_slayer && self.golden_kills >= GOLDEN_SLAYER_KILLS {
            self.golden_slayer = true;
            unlocked.push(Achievement::GoldenSlayer);
        }
        if !self.wave_master && self.best_wave >= WAVE_MASTER_WAVE {
            self.wave_master = true;
            unlocked.push(Achievement::WaveMaster);
        }
        unlocked
    }

    /// `Golden Slayer: 3/10`, with an `(unlocked)` suffix once earned.
    pub fn progress_line(&self, achievement: Achievement) -> String {
        let shown = self.progress(achievement).min(achievement.target());
        let mut line = format!("{}: {}/{}", achievement.label(), shown, achievement.target());
        if self.is_unlocked(achievement) {
            line.push_str(" (unlocked)");
        }
        line
    }
}

/// Top kill counts, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    scores: Vec<u32>,
}

impl Leaderboard {
    pub fn push(&mut self, score: u32) {
        self.scores.push(score);
        self.normalize();
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Restore the sort and length bounds, for data read back from disk.
    fn normalize(&mut self) {
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(LEADERBOARD_LEN);
    }
}

impl Session {
    pub(crate) fn record_golden_kill(&mut self) {
        self.player.golden_kills += 1;
        self.achievements.golden_kills += 1;
        self.check_achievements();
    }

    /// Fold the current wave into the record and fire any new unlocks.
    pub fn check_achievements(&mut self) {
        let wave = self.wave.number;
        let mut dirty = false;
        if wave > self.achievements.best_wave {
            self.achievements.best_wave = wave;
            dirty = true;
        }
        let unlocked = self.achievements.evaluate();
        for &achievement in &unlocked {
            info!("achievement unlocked: {}", achievement.label());
            self.push_event(SimEvent::AchievementUnlocked { achievement });
        }
        if dirty || !unlocked.is_empty() {
            self.persist_achievements();
        }
    }

    pub fn achievement_progress(&self) -> Vec<String> {
        Achievement::ALL
            .into_iter()
            .map(|a| self.achievements.progress_line(a))
            .collect()
    }

    /// Record a final score and persist the board.
    pub fn save_score(&mut self, score: u32) {
        self.leaderboard.push(score);
        self.push_event(SimEvent::LeaderboardUpdated);
        match serde_json::to_string(&self.leaderboard) {
            Ok(json) => {
                if let Err(e) = self.store.save(LEADERBOARD_KEY, &json) {
                    warn!("failed to save leaderboard: {e}");
                }
            }
            Err(e) => error!("failed to encode leaderboard: {e}"),
        }
    }

    fn persist_achievements(&self) {
        match serde_json::to_string(&self.achievements) {
            Ok(json) => {
                if let Err(e) = self.store.save(ACHIEVEMENTS_KEY, &json) {
                    warn!("failed to save achievements: {e}");
                }
            }
            Err(e) => error!("failed to encode achievements: {e}"),
        }
    }

    /// Read achievements and leaderboard from the attached store. Missing or
    /// undecodable entries load as empty.
    pub(crate) fn load_progress(&mut self) {
        self.achievements = self
            .store
            .load(ACHIEVEMENTS_KEY)
            .and_then(|json| decode(ACHIEVEMENTS_KEY, &json))
            .unwrap_or_default();
        let mut board: Leaderboard = self
            .store
            .load(LEADERBOARD_KEY)
            .and_then(|json| decode(LEADERBOARD_KEY, &json))
            .unwrap_or_default();
        board.normalize();
        self.leaderboard = board;
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, json: &str) -> Option<T> {
    serde_json::from_str(json)
        .map_err(|e| warn!("discarding unreadable {key} entry: {e}"))
        .ok()
}
