// Application Configuration
//
// Resolution order: built-in defaults, then `<data_dir>/config.toml`, then
// environment variables (a `.env` file is loaded first when present).
//
// | Env Var                   | Default                         |
// |---------------------------|---------------------------------|
// | `GEMINI_API_KEY`/`API_KEY`| none                            |
// | `NANO_BANANA_ENDPOINT`    | Gemini v1beta endpoint          |
// | `NANO_BANANA_TEXT_MODEL`  | `gemini-3-flash-preview`        |
// | `NANO_BANANA_IMAGE_MODEL` | `gemini-2.5-flash-image`        |
// | `NANO_BANANA_VIDEO_MODEL` | `veo-3.1-fast-generate-preview` |
// | `NANO_BANANA_POLL_SECS`   | `8`                             |
// | `NANO_BANANA_DATA_DIR`    | platform data dir               |

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::services::media::gemini::{
    GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_IMAGE_MODEL, DEFAULT_POLL_INTERVAL, DEFAULT_TEXT_MODEL,
    DEFAULT_VIDEO_MODEL,
};
use crate::utils::database::database_path_in;
use crate::utils::shared_store::{get_app_cache_dir, get_app_data_dir};

pub const CONFIG_FILE: &str = "config.toml";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot resolve directory: {0}")]
    Directory(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Optional settings read from `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_key: Option<String>,
    endpoint: Option<String>,
    text_model: Option<String>,
    image_model: Option<String>,
    video_model: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Holds the database and `config.toml`
    pub data_dir: PathBuf,
    /// Holds downloaded video payloads
    pub cache_dir: PathBuf,
}

impl AppConfig {
    /// Defaults rooted at the given directories
    pub fn with_dirs(data_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_dir,
            cache_dir,
        }
    }

    /// Load from `.env`, the config file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration with `lookup` standing in for the environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = match env("NANO_BANANA_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => get_app_data_dir().map_err(ConfigError::Directory)?,
        };
        let cache_dir = if env("NANO_BANANA_DATA_DIR").is_some() {
            data_dir.join("cache")
        } else {
            get_app_cache_dir().map_err(ConfigError::Directory)?
        };

        let file = data_dir.join(CONFIG_FILE);
        let mut config = Self::with_dirs(data_dir, cache_dir);
        config.apply_file(&file)?;

        if let Some(key) = env("GEMINI_API_KEY").or_else(|| env("API_KEY")) {
            config.api_key = Some(key);
        }
        if let Some(endpoint) = env("NANO_BANANA_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(model) = env("NANO_BANANA_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = env("NANO_BANANA_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(model) = env("NANO_BANANA_VIDEO_MODEL") {
            config.video_model = model;
        }
        if let Some(secs) = env("NANO_BANANA_POLL_SECS") {
            config.poll_interval = parse_secs("NANO_BANANA_POLL_SECS", &secs)?;
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Applying {}", path.display());

        if let Some(key) = file.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(model) = file.text_model {
            self.text_model = model;
        }
        if let Some(model) = file.image_model {
            self.image_model = model;
        }
        if let Some(model) = file.video_model {
            self.video_model = model;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = non_zero_secs("poll_interval_secs", secs)?;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = non_zero_secs("request_timeout_secs", secs)?;
        }
        if let Some(dir) = file.cache_dir {
            self.cache_dir = dir;
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        database_path_in(&self.data_dir)
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            video_model: self.video_model.clone(),
            poll_interval: self.poll_interval,
            request_timeout: self.request_timeout,
            cache_dir: self.cache_dir.clone(),
        }
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;
    non_zero_secs(name, secs)
}

fn non_zero_secs(name: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: "0".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name: &str| vars.get(name).cloned()
    }

    fn base_vars(dir: &Path) -> HashMap<&'static str, String> {
        HashMap::from([("NANO_BANANA_DATA_DIR", dir.display().to_string())])
    }

    #[test]
    fn test_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::from_lookup(lookup(base_vars(dir.path()))).unwrap();

        assert_eq!(config.api_key, None);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.text_model, "gemini-3-flash-preview");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.video_model, "veo-3.1-fast-generate-preview");
        assert_eq!(config.poll_interval, Duration::from_secs(8));
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.cache_dir, dir.path().join("cache"));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "api_key = \"from-file\"\ntext_model = \"file-model\"\npoll_interval_secs = 3\n",
        )
        .unwrap();

        let mut vars = base_vars(dir.path());
        vars.insert("API_KEY", "from-env".to_string());
        vars.insert("NANO_BANANA_IMAGE_MODEL", "env-image".to_string());
        let config = AppConfig::from_lookup(lookup(vars)).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.text_model, "file-model");
        assert_eq!(config.image_model, "env-image");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_gemini_key_preferred_over_api_key() {
        let dir = tempdir().unwrap();
        let mut vars = base_vars(dir.path());
        vars.insert("API_KEY", "generic".to_string());
        vars.insert("GEMINI_API_KEY", "gemini".to_string());
        let config = AppConfig::from_lookup(lookup(vars)).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_invalid_poll_secs() {
        let dir = tempdir().unwrap();
        let mut vars = base_vars(dir.path());
        vars.insert("NANO_BANANA_POLL_SECS", "soon".to_string());
        assert!(matches!(
            AppConfig::from_lookup(lookup(vars)),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut vars = base_vars(dir.path());
        vars.insert("NANO_BANANA_POLL_SECS", "0".to_string());
        assert!(AppConfig::from_lookup(lookup(vars)).is_err());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "endpoint = [").unwrap();
        assert!(matches!(
            AppConfig::from_lookup(lookup(base_vars(dir.path()))),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_gemini_config() {
        let dir = tempdir().unwrap();
        let mut vars = base_vars(dir.path());
        vars.insert("GEMINI_API_KEY", "k".to_string());
        vars.insert("NANO_BANANA_ENDPOINT", "http://127.0.0.1:9/v1beta".to_string());
        let gemini = AppConfig::from_lookup(lookup(vars)).unwrap().gemini_config();

        assert_eq!(gemini.api_key.as_deref(), Some("k"));
        assert_eq!(gemini.endpoint, "http://127.0.0.1:9/v1beta");
        assert_eq!(gemini.cache_dir, dir.path().join("cache"));
    }

    #[test]
    fn test_database_path_in_data_dir() {
        let config = AppConfig::with_dirs(PathBuf::from("/data"), PathBuf::from("/cache"));
        assert!(config.database_path().starts_with("/data"));
    }
}
