use crate::error::{AppError, AppResult};
use crate::models::{Account, AccountReport, AppConfig};
use crate::modules::quest::{QuestApi, TaskEngine};
use crate::modules::system::account_context::{with_account_context, AccountContext};
use crate::modules::system::logger;
use crate::proxy::proxy_pool::ProxyPool;
use crate::proxy::token::{accounts_from_tokens, TokenLifecycle, TokenStatus, TokenStore};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub tokens_refreshed: usize,
    pub points_earned: f64,
    pub details: Vec<String>,
}

/// Everything a cycle needs. Built once per process; the token store is the
/// only part that changes between cycles.
pub struct QuestRunner {
    store: Arc<TokenStore>,
    proxy_pool: Option<Arc<ProxyPool>>,
    lifecycle: Arc<TokenLifecycle>,
    engine: Arc<TaskEngine>,
    max_concurrent: usize,
}

impl QuestRunner {
    pub fn new(config: &AppConfig, store: Arc<TokenStore>, proxy_pool: Option<Arc<ProxyPool>>) -> Self {
        let api = Arc::new(QuestApi::new(config));
        let lifecycle = TokenLifecycle::new(api.clone(), store.clone())
            .with_proxy_rotation(proxy_pool.clone(), config.rotate_proxy_on_revalidation_failure);
        let engine = TaskEngine::new(api, config.schedule.pacing_delay());

        Self {
            store,
            proxy_pool,
            lifecycle: Arc::new(lifecycle),
            engine: Arc::new(engine),
            max_concurrent: config.schedule.max_concurrent_accounts.max(1),
        }
    }

    fn bind_proxy(&self, account: Account) -> Account {
        let proxy = self
            .proxy_pool
            .as_ref()
            .and_then(|pool| pool.assign(&account.username));
        account.with_proxy(proxy)
    }

    /// One pass over every decodable token. Flows run concurrently up to the
    /// configured cap and never affect each other.
    pub async fn run_cycle(&self) -> CycleStats {
        let start = std::time::Instant::now();
        let tokens = self.store.snapshot().await;
        let accounts: Vec<Account> = accounts_from_tokens(&tokens)
            .into_iter()
            .map(|account| self.bind_proxy(account))
            .collect();

        logger::log_info(&format!(
            "Processing {} account(s) (max concurrent: {})",
            accounts.len(),
            self.max_concurrent
        ));

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let handles: Vec<_> = accounts
            .into_iter()
            .map(|account| {
                let permit = semaphore.clone();
                let lifecycle = self.lifecycle.clone();
                let engine = self.engine.clone();
                let username = account.username.clone();
                let context = AccountContext {
                    username: username.clone(),
                    proxy: account.proxy.clone(),
                };
                let flow = async move {
                    let _guard = match permit.acquire_owned().await {
                        Ok(guard) => guard,
                        Err(e) => {
                            return Err(AppError::Account(format!("concurrency limiter closed: {}", e)))
                        }
                    };
                    run_account(account, &lifecycle, &engine).await
                };
                let handle = tokio::spawn(with_account_context(context, flow));
                (username, handle)
            })
            .collect();

        let total = handles.len();
        let (names, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = join_all(handles).await;

        let mut stats = CycleStats {
            total,
            ..CycleStats::default()
        };
        for (username, result) in names.into_iter().zip(results) {
            match result {
                Ok(Ok(report)) => {
                    stats.success += 1;
                    stats.points_earned += report.points_earned;
                    if report.token_refreshed {
                        stats.tokens_refreshed += 1;
                    }
                }
                Ok(Err(e)) => {
                    stats.failed += 1;
                    stats.details.push(format!("Account {}: {}", username, e));
                }
                Err(e) => {
                    stats.failed += 1;
                    let msg = format!("Account {}: flow aborted - {}", username, e);
                    logger::log_error(&msg);
                    stats.details.push(msg);
                }
            }
        }

        logger::log_info(&format!(
            "Cycle completed: {} success, {} failed, {} token(s) refreshed, +{} points, took: {}ms",
            stats.success,
            stats.failed,
            stats.tokens_refreshed,
            stats.points_earned,
            start.elapsed().as_millis()
        ));
        stats
    }
}

/// Token check, then tasks and partners. Only a failed revalidation aborts.
pub async fn run_account(
    mut account: Account,
    lifecycle: &TokenLifecycle,
    engine: &TaskEngine,
) -> AppResult<AccountReport> {
    match &account.proxy {
        Some(proxy) => logger::log_info(&format!("Processing account via {}", proxy)),
        None => logger::log_info("Processing account without proxy"),
    }

    let mut report = AccountReport::new(&account.username);
    match lifecycle.ensure_valid(&mut account).await {
        Ok(TokenStatus::Valid) => {}
        Ok(TokenStatus::Refreshed) => report.token_refreshed = true,
        Err(e) => {
            logger::log_error(&format!("Token revalidation failed: {}", e));
            return Err(e);
        }
    }

    engine.run(&account, &mut report).await;
    logger::log_info(&format!(
        "Account done: balance {}, {} task(s) completed, {} partner reward(s) claimed, +{} points, {} failure(s)",
        report.balance,
        report.tasks_completed,
        report.partners_claimed,
        report.points_earned,
        report.failures
    ));
    Ok(report)
}
