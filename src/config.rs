use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";
pub const LOCAL_DATA_DIR: &str = ".cinelist";
pub const LOCAL_STORE_FILE: &str = "cinelist.db";
pub const DEFAULT_POSTER_WORKERS: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

const API_KEY_ENV: &str = "CINELIST_OMDB_API_KEY";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    pub data_dir: Option<String>,
    pub poster_workers: usize,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            omdb_api_key: None,
            omdb_base_url: DEFAULT_OMDB_BASE_URL.to_string(),
            data_dir: None,
            poster_workers: DEFAULT_POSTER_WORKERS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Data directory for the store and the poster cache.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(LOCAL_DATA_DIR))
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join(LOCAL_STORE_FILE)
    }

    pub fn poster_dir(&self) -> PathBuf {
        self.data_dir().join("posters")
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_key")]
    omdb_api_key: Option<String>,
    omdb_base_url: Option<String>,
    data_dir: Option<String>,
    poster_workers: Option<usize>,
    request_timeout_secs: Option<u64>,
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from("config.json");

    let mut cfg = match fs::read_to_string(&cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                info!("Loaded config from {}", cfg_path.display());
                merge_config(parsed)
            }
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
                AppConfig::default()
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
            AppConfig::default()
        }
    };

    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            info!("Using OMDb API key from {API_KEY_ENV}");
            cfg.omdb_api_key = Some(key.trim().to_string());
        }
    }

    cfg
}

fn merge_config(parsed: RawConfig) -> AppConfig {
    let mut cfg = AppConfig::default();

    if let Some(key) = parsed.omdb_api_key {
        let key = key.trim();
        if !key.is_empty() {
            cfg.omdb_api_key = Some(key.to_string());
        }
    }
    if let Some(url) = parsed.omdb_base_url {
        if url.starts_with("http://") || url.starts_with("https://") {
            cfg.omdb_base_url = url;
        } else {
            warn!("Ignoring omdb_base_url `{url}` (must start with http:// or https://)");
        }
    }
    if parsed.data_dir.is_some() {
        cfg.data_dir = parsed.data_dir;
    }
    if let Some(n) = parsed.poster_workers {
        cfg.poster_workers = n.clamp(1, 32);
    }
    if let Some(secs) = parsed.request_timeout_secs {
        cfg.request_timeout_secs = secs.clamp(1, 120);
    }

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_defaults_for_missing_keys() {
        let parsed: RawConfig = serde_json::from_str(r#"{ "omdb_api_key": "abc123" }"#).unwrap();
        let cfg = merge_config(parsed);
        assert_eq!(cfg.omdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.omdb_base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(cfg.poster_workers, DEFAULT_POSTER_WORKERS);
        assert_eq!(cfg.store_path(), PathBuf::from(LOCAL_DATA_DIR).join(LOCAL_STORE_FILE));
    }

    #[test]
    fn merge_clamps_and_validates() {
        let parsed: RawConfig = serde_json::from_str(
            r#"{ "api_key": "  ", "omdb_base_url": "ftp://nope", "poster_workers": 500, "data_dir": "/tmp/cl" }"#,
        )
        .unwrap();
        let cfg = merge_config(parsed);
        assert_eq!(cfg.omdb_api_key, None);
        assert_eq!(cfg.omdb_base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(cfg.poster_workers, 32);
        assert_eq!(cfg.poster_dir(), PathBuf::from("/tmp/cl").join("posters"));
    }
}
