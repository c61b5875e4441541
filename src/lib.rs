pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod proxy;

mod test_utils;

use modules::system::{config, logger, prompt, scheduler, validation};
use proxy::token::TokenStore;
use proxy::{ProxyPool, ProxySource};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

async fn load_proxy_pool(
    mode: proxy::ProxyMode,
    app_config: &models::AppConfig,
    data_dir: &std::path::Path,
) -> Option<Arc<ProxyPool>> {
    let proxy_file = config::resolve_data_path(data_dir, &app_config.proxy_file);
    let source = ProxySource::for_mode(mode, &app_config.public_proxy_list_url, proxy_file)?;
    let pool = ProxyPool::load(&source, app_config.timeouts.proxy_list()).await;
    Some(Arc::new(pool))
}

async fn start_runtime() -> Result<(), String> {
    let data_dir = config::get_data_dir()?;
    let mut app_config = config::load_app_config_from(&data_dir)
        .map_err(|e| format!("failed_to_load_config: {}", e))?;
    config::apply_env_overrides(&mut app_config);
    validation::validate_app_config(&app_config).map_err(|errors| {
        format!(
            "configuration_validation_failed:\n{}",
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        )
    })?;

    let token_path = config::resolve_data_path(&data_dir, &app_config.token_file);
    let store = match TokenStore::load(&token_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            // Nothing to automate; stop without retrying.
            error!("{}", e);
            return Ok(());
        }
    };

    let mode = tokio::task::spawn_blocking(prompt::choose_proxy_mode)
        .await
        .map_err(|e| format!("proxy_mode_prompt_failed: {}", e))?;
    let proxy_pool = load_proxy_pool(mode, &app_config, &data_dir).await;

    let runner = Arc::new(commands::QuestRunner::new(&app_config, store, proxy_pool));
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Stop requested, shutting down");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    info!(
        "Quest runner started against {} (every {}, up to {} accounts at once)",
        app_config.api_base_url,
        scheduler::format_seconds(app_config.schedule.cycle_interval_seconds),
        app_config.schedule.max_concurrent_accounts
    );
    scheduler::run_cycles(runner, app_config.schedule.clone(), cancel).await;
    info!("Quest runner stopped");
    Ok(())
}

pub fn run() {
    logger::init_logger();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        if let Err(e) = start_runtime().await {
            error!("{}", e);
            std::process::exit(1);
        }
    });
}
