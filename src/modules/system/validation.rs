use crate::models::AppConfig;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub actual_value: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual_value {
            Some(val) => write!(f, "  • {}: {} (got: {})", self.field, self.message, val),
            None => write!(f, "  • {}: {}", self.field, self.message),
        }
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: None,
        }
    }

    fn with_value(field: impl Into<String>, message: impl Into<String>, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: Some(value.to_string()),
        }
    }
}

fn validate_http_url(field: &str, value: &str, errors: &mut Vec<ConfigError>) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ConfigError::with_value(
            field,
            "scheme must be http or https",
            parsed.scheme(),
        )),
        Err(e) => errors.push(ConfigError::with_value(field, format!("invalid URL: {}", e), value)),
    }
}

pub fn validate_app_config(config: &AppConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_http_url("api_base_url", &config.api_base_url, &mut errors);
    validate_http_url("public_proxy_list_url", &config.public_proxy_list_url, &mut errors);

    if config.token_file.trim().is_empty() {
        errors.push(ConfigError::new("token_file", "must not be empty"));
    }
    if config.proxy_file.trim().is_empty() {
        errors.push(ConfigError::new("proxy_file", "must not be empty"));
    }

    for (field, seconds) in [
        ("timeouts.request_seconds", config.timeouts.request_seconds),
        ("timeouts.list_seconds", config.timeouts.list_seconds),
        ("timeouts.proxy_list_seconds", config.timeouts.proxy_list_seconds),
    ] {
        if seconds == 0 {
            errors.push(ConfigError::with_value(field, "must be greater than 0", seconds));
        }
    }

    if config.retry.max_attempts == 0 {
        errors.push(ConfigError::with_value(
            "retry.max_attempts",
            "must be at least 1",
            config.retry.max_attempts,
        ));
    }
    if config.retry.revalidate_attempts == 0 {
        errors.push(ConfigError::with_value(
            "retry.revalidate_attempts",
            "must be at least 1",
            config.retry.revalidate_attempts,
        ));
    }

    let schedule = &config.schedule;
    if schedule.max_concurrent_accounts == 0 {
        errors.push(ConfigError::with_value(
            "schedule.max_concurrent_accounts",
            "must be at least 1",
            schedule.max_concurrent_accounts,
        ));
    }
    if schedule.cycle_interval_seconds == 0 {
        errors.push(ConfigError::with_value(
            "schedule.cycle_interval_seconds",
            "must be greater than 0",
            schedule.cycle_interval_seconds,
        ));
    }
    if schedule.countdown_log_interval_seconds == 0 {
        errors.push(ConfigError::with_value(
            "schedule.countdown_log_interval_seconds",
            "must be greater than 0",
            schedule.countdown_log_interval_seconds,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
