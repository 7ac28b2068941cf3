// Repository Layer
// Provides data access abstractions for SQLite database

pub mod settings_repo;

pub use settings_repo::SettingsRepository;
