pub mod achievements;
pub mod ambient;
pub mod behavior;
pub mod combat;
pub mod components;
pub mod economy;
pub mod enemy;
pub mod entities;
pub mod events;
pub mod intent;
pub mod inventory;
pub mod player;
pub mod session;
pub mod spawn;
pub mod stats;
pub mod tables;
pub mod wave;
