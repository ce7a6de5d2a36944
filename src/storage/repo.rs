/// Opaque key-value save interface used for achievements and the leaderboard.
///
/// Implementations swallow nothing: `save` reports failures, `load` returns
/// `None` both for a missing key and for a value that failed its integrity check.
pub trait SaveStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), String>;
}
