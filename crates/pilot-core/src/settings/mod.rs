//! Settings file: provider `env` plus the history of applied configurations.

pub mod backup;
pub mod migration;
pub mod schema;
pub mod store;

pub use backup::{backup_file, backup_path};
pub use migration::{Migration, MigrationOutcome, RawSettings, SettingsShape, migrate};
pub use schema::{ConfigEntry, SettingsDocument};
pub use store::SettingsStore;
