use std::sync::Arc;

use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::session::Session;
use crate::storage::memory::MemoryStore;
use crate::storage::repo::SaveStore;
use crate::storage::sqlite_repo::SqliteRepo;

/// The save store sessions are built with.
#[derive(Resource, Clone)]
pub struct SaveBackend(pub Arc<dyn SaveStore>);

pub struct StoragePlugin;

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, init_storage);
    }
}

fn init_storage(mut commands: Commands, session: Option<ResMut<Session>>) {
    let db_path = Tuning::data_dir().join("portal_arena.db");
    info!("Initializing SQLite at {:?}", db_path);

    let store: Arc<dyn SaveStore> = match SqliteRepo::open(&db_path) {
        Ok(repo) => {
            info!("SQLite initialized successfully");
            Arc::new(repo)
        }
        Err(e) => {
            error!("Failed to initialize SQLite: {e}; progress will not survive a restart");
            Arc::new(MemoryStore::default())
        }
    };

    // A session inserted before startup gets the real store too.
    if let Some(mut session) = session {
        session.attach_store(store.clone());
    }
    commands.insert_resource(SaveBackend(store));
}
