use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;
use tracing::{info, warn};

const CONFIG_FILE: &str = "config.json";

/// `DATA_DIR` when set, otherwise the working directory.
pub fn get_data_dir() -> Result<PathBuf, String> {
    if let Ok(env_path) = std::env::var("DATA_DIR") {
        if !env_path.trim().is_empty() {
            let data_dir = PathBuf::from(env_path.trim());
            if !data_dir.exists() {
                fs::create_dir_all(&data_dir)
                    .map_err(|e| format!("failed_to_create_data_dir: {}", e))?;
            }
            return Ok(data_dir);
        }
    }
    std::env::current_dir().map_err(|e| format!("failed_to_resolve_working_dir: {}", e))
}

/// Relative file names in the config are resolved against the data directory.
pub fn resolve_data_path(data_dir: &Path, file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        path
    } else {
        data_dir.join(path)
    }
}

pub fn load_app_config_from(data_dir: &Path) -> Result<AppConfig, String> {
    let config_path = data_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = AppConfig::new();
        if let Err(e) = save_app_config_to(data_dir, &config) {
            warn!("Could not write default config to {:?}: {}", config_path, e);
        }
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| format!("failed_to_read_config_file: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("failed_to_parse_config_file: {}", e))
}

pub fn save_app_config_to(data_dir: &Path, config: &AppConfig) -> Result<(), String> {
    let config_path = data_dir.join(CONFIG_FILE);
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("failed_to_serialize_config: {}", e))?;
    fs::write(&config_path, content).map_err(|e| format!("failed_to_save_config: {}", e))
}

pub fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {} value: {}", key, raw);
            None
        }
    }
}

pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(url) = env_string("QUEST_API_BASE_URL") {
        info!("Using API base URL from environment: {}", url);
        config.api_base_url = url;
    }
    if let Some(file) = env_string("TOKEN_FILE") {
        info!("Using token file from environment: {}", file);
        config.token_file = file;
    }
    if let Some(file) = env_string("PROXY_FILE") {
        info!("Using proxy file from environment: {}", file);
        config.proxy_file = file;
    }
    if let Some(limit) = env_number::<usize>("MAX_CONCURRENT_ACCOUNTS") {
        info!("Using account concurrency from environment: {}", limit);
        config.schedule.max_concurrent_accounts = limit;
    }
    if let Some(seconds) = env_number::<u64>("CYCLE_INTERVAL_SECONDS") {
        info!("Using cycle interval from environment: {}s", seconds);
        config.schedule.cycle_interval_seconds = seconds;
    }
    if let Some(seconds) = env_number::<u64>("PACING_DELAY_SECONDS") {
        info!("Using pacing delay from environment: {}s", seconds);
        config.schedule.pacing_delay_seconds = seconds;
    }
    if let Some(raw) = env_string("ROTATE_PROXY_ON_REVALIDATION_FAILURE") {
        match parse_env_bool(&raw) {
            Some(enabled) => config.rotate_proxy_on_revalidation_failure = enabled,
            None => warn!("Ignoring invalid ROTATE_PROXY_ON_REVALIDATION_FAILURE value: {}", raw),
        }
    }
}
