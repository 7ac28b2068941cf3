// Session wiring: configuration, database, history store and Gemini client

use anyhow::{anyhow, Context, Result};
use nanobanana_lib::repositories::SettingsRepository;
use nanobanana_lib::services::media::{EntitlementHost, GeminiMediaClient, KeySelector};
use nanobanana_lib::services::{HistoryStore, WorkflowController};
use nanobanana_lib::utils::database::Database;
use nanobanana_lib::AppConfig;
use std::sync::Arc;

pub const KEY_SELECTION_HINT: &str =
    "Video generation needs a paid-tier Gemini API key. Enter `key <API_KEY>` to select one.";

pub fn load_config() -> Result<AppConfig> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    log::debug!(
        "Data dir {}, cache dir {}",
        config.data_dir.display(),
        config.cache_dir.display()
    );
    Ok(config)
}

pub fn open_history(config: &AppConfig) -> Result<HistoryStore> {
    let path = config.database_path();
    let db = Database::new(path.clone())
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to open {}", path.display()))?;
    log::debug!("History database at {}", db.path().display());
    Ok(HistoryStore::new(SettingsRepository::new(db)))
}

/// Key selector that prints the selection hint on every request
pub fn key_selector() -> Arc<KeySelector> {
    Arc::new(KeySelector::new().with_notifier(|| eprintln!("{}", KEY_SELECTION_HINT)))
}

pub fn open_controller(
    config: &AppConfig,
    host: Arc<KeySelector>,
) -> Result<WorkflowController<GeminiMediaClient>> {
    if config.api_key.is_none() {
        log::warn!("No Gemini API key configured; set GEMINI_API_KEY");
    }
    let history = open_history(config)?;
    let host: Arc<dyn EntitlementHost> = host;
    let client = GeminiMediaClient::new(config.gemini_config(), host.clone());
    Ok(WorkflowController::new(client, history, host))
}
