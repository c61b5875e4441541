use crate::modules::system::account_context;
use crate::modules::system::config::get_data_dir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "questpilot.log";
const LOG_RETENTION_DAYS: u64 = 7;

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.to_rfc3339())
    }
}

pub fn get_log_dir() -> Result<PathBuf, String> {
    let log_dir = get_data_dir()?.join("logs");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;
    }

    Ok(log_dir)
}

pub fn init_logger() {
    let _ = tracing_log::LogTracer::init();

    let log_dir = match get_log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to initialize log directory: {}", e);
            return;
        }
    };
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_timer(LocalTimer);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(LocalTimer);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    // The writer must outlive every task that logs, i.e. the whole process.
    std::mem::forget(_guard);

    info!("Log system initialized (Console + File persistence)");
    if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        warn!("Failed to cleanup old logs: {}", e);
    }
}

pub fn cleanup_old_logs(log_dir: &Path, days_to_keep: u64) -> Result<usize, String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    if !log_dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Failed to get system time: {}", e))?
        .as_secs();
    let cutoff_time = now.saturating_sub(days_to_keep * 24 * 60 * 60);

    let entries =
        fs::read_dir(log_dir).map_err(|e| format!("Failed to read log directory: {}", e))?;

    let mut deleted_count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        let modified_secs = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(now);

        if modified_secs < cutoff_time {
            match fs::remove_file(&path) {
                Ok(()) => {
                    deleted_count += 1;
                    info!("Deleted old log file (expired): {:?}", path.file_name());
                }
                Err(e) => warn!("Failed to delete old log file {:?}: {}", path, e),
            }
        }
    }

    if deleted_count > 0 {
        info!("Log cleanup completed: deleted {} files", deleted_count);
    }
    Ok(deleted_count)
}

pub fn log_info(message: &str) {
    match account_context::try_get() {
        Some(ctx) => info!(account = %ctx.username, "{}", message),
        None => info!("{}", message),
    }
}

pub fn log_warn(message: &str) {
    match account_context::try_get() {
        Some(ctx) => warn!(account = %ctx.username, "{}", message),
        None => warn!("{}", message),
    }
}

pub fn log_error(message: &str) {
    match account_context::try_get() {
        Some(ctx) => error!(account = %ctx.username, "{}", message),
        None => error!("{}", message),
    }
}
