use crate::constants;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_token_file")]
    pub token_file: String,
    #[serde(default = "default_proxy_file")]
    pub proxy_file: String,
    #[serde(default = "default_public_proxy_list_url")]
    pub public_proxy_list_url: String,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub rotate_proxy_on_revalidation_failure: bool,
}

fn default_api_base_url() -> String {
    constants::DEFAULT_API_BASE_URL.to_string()
}

fn default_token_file() -> String {
    constants::DEFAULT_TOKEN_FILE.to_string()
}

fn default_proxy_file() -> String {
    constants::DEFAULT_PROXY_FILE.to_string()
}

fn default_public_proxy_list_url() -> String {
    constants::DEFAULT_PUBLIC_PROXY_LIST_URL.to_string()
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_file: default_token_file(),
            proxy_file: default_proxy_file(),
            public_proxy_list_url: default_public_proxy_list_url(),
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            schedule: ScheduleConfig::default(),
            rotate_proxy_on_revalidation_failure: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_request_timeout")]
    pub request_seconds: u64,
    #[serde(default = "default_list_timeout")]
    pub list_seconds: u64,
    #[serde(default = "default_proxy_list_timeout")]
    pub proxy_list_seconds: u64,
}

fn default_request_timeout() -> u64 {
    20
}

fn default_list_timeout() -> u64 {
    30
}

fn default_proxy_list_timeout() -> u64 {
    30
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_seconds)
    }

    pub fn list(&self) -> Duration {
        Duration::from_secs(self.list_seconds)
    }

    pub fn proxy_list(&self) -> Duration {
        Duration::from_secs(self.proxy_list_seconds)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_seconds: default_request_timeout(),
            list_seconds: default_list_timeout(),
            proxy_list_seconds: default_proxy_list_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_revalidate_attempts")]
    pub revalidate_attempts: usize,
    #[serde(default = "default_retry_delay")]
    pub delay_seconds: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_revalidate_attempts() -> usize {
    5
}

fn default_retry_delay() -> u64 {
    5
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            revalidate_attempts: default_revalidate_attempts(),
            delay_seconds: default_retry_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_seconds: u64,
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_seconds: u64,
    #[serde(default = "default_countdown_log_interval")]
    pub countdown_log_interval_seconds: u64,
    #[serde(default = "default_max_concurrent_accounts")]
    pub max_concurrent_accounts: usize,
}

fn default_pacing_delay() -> u64 {
    5
}

fn default_cycle_interval() -> u64 {
    12 * 60 * 60
}

fn default_countdown_log_interval() -> u64 {
    60 * 60
}

fn default_max_concurrent_accounts() -> usize {
    3
}

impl ScheduleConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs(self.pacing_delay_seconds)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_seconds)
    }

    pub fn countdown_log_interval(&self) -> Duration {
        Duration::from_secs(self.countdown_log_interval_seconds)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pacing_delay_seconds: default_pacing_delay(),
            cycle_interval_seconds: default_cycle_interval(),
            countdown_log_interval_seconds: default_countdown_log_interval(),
            max_concurrent_accounts: default_max_concurrent_accounts(),
        }
    }
}
