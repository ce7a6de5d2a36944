use bevy::prelude::*;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

use super::repo::SaveStore;

/// SQLite-backed save store. Owns the tokio runtime its blocking calls run on.
pub struct SqliteRepo {
    pool: SqlitePool,
    rt: tokio::runtime::Runtime,
}

fn checksum(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

impl SqliteRepo {
    /// Open (or create) the database file and run migrations.
    pub fn open(db_path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(&url, 5)
    }

    /// Private in-memory database; one connection so every query sees the same data.
    pub fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:", 1)
    }

    fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let rt = tokio::runtime::Runtime::new()?;
        let pool = rt.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Ok::<_, sqlx::Error>(pool)
        })?;
        Ok(Self { pool, rt })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn save_blob_async(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        sqlx::query(
            r#"INSERT OR REPLACE INTO save_blobs (key, value, hash, updated_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(key)
        .bind(value)
        .bind(checksum(value))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load a blob. A checksum mismatch is treated as a missing entry.
    pub async fn load_blob_async(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String, String)> = sqlx::query_as(r#"SELECT value, hash FROM save_blobs WHERE key = ?"#)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|(value, hash)| {
            if checksum(&value) != hash {
                warn!("save blob {key:?} failed its checksum, ignoring");
                return None;
            }
            Some(value)
        }))
    }
}

impl SaveStore for SqliteRepo {
    fn load(&self, key: &str) -> Option<String> {
        match self.rt.block_on(self.load_blob_async(key)) {
            Ok(value) => value,
            Err(e) => {
                error!("failed to load {key:?}: {e}");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        self.rt
            .block_on(self.save_blob_async(key, value))
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blobs_round_trip() {
        let repo = SqliteRepo::in_memory().unwrap();
        assert_eq!(repo.load("leaderboard"), None);
        repo.save("leaderboard", "[9,4]").unwrap();
        repo.save("leaderboard", "[12,9,4]").unwrap();
        assert_eq!(repo.load("leaderboard").as_deref(), Some("[12,9,4]"));
    }

    #[test]
    fn tampered_blob_loads_as_absent() {
        let repo = SqliteRepo::in_memory().unwrap();
        repo.save("achievements", "{}").unwrap();
        repo.rt
            .block_on(
                sqlx::query("UPDATE save_blobs SET value = ? WHERE key = ?")
                    .bind("{\"golden_slayer\":true}")
                    .bind("achievements")
                    .execute(repo.pool()),
            )
            .unwrap();
        assert_eq!(repo.load("achievements"), None);
    }
}
