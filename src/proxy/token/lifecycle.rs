use crate::error::{AppError, AppResult};
use crate::models::Account;
use crate::modules::quest::QuestApi;
use crate::proxy::proxy_pool::ProxyPool;
use crate::proxy::token::persistence::TokenStore;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Refreshed,
}

/// Validate, then revalidate and persist when the server rejects the token.
pub struct TokenLifecycle {
    api: Arc<QuestApi>,
    store: Arc<TokenStore>,
    proxy_pool: Option<Arc<ProxyPool>>,
    rotate_on_failure: bool,
}

impl TokenLifecycle {
    pub fn new(api: Arc<QuestApi>, store: Arc<TokenStore>) -> Self {
        Self {
            api,
            store,
            proxy_pool: None,
            rotate_on_failure: false,
        }
    }

    pub fn with_proxy_rotation(mut self, pool: Option<Arc<ProxyPool>>, rotate_on_failure: bool) -> Self {
        self.proxy_pool = pool;
        self.rotate_on_failure = rotate_on_failure;
        self
    }

    /// On success `account.token` holds a token the server accepts.
    pub async fn ensure_valid(&self, account: &mut Account) -> AppResult<TokenStatus> {
        if self.api.auth_check(account).await {
            return Ok(TokenStatus::Valid);
        }

        tracing::warn!("[{}] Token rejected, attempting revalidation", account.username);
        let new_token = match self.api.revalidate(account).await {
            Ok(token) => token,
            Err(failure) => {
                self.rotate_after_failure(account);
                return Err(AppError::Account(format!(
                    "token revalidation failed for {}: {}",
                    account.username, failure
                )));
            }
        };

        match self.store.replace(&account.token, &new_token).await {
            Ok(0) => tracing::warn!(
                "[{}] Refreshed token could not be matched in {:?}; it will not survive a restart",
                account.username,
                self.store.path()
            ),
            Ok(_) => {}
            Err(e) => tracing::error!(
                "[{}] Failed to persist refreshed token: {}",
                account.username,
                e
            ),
        }
        account.token = new_token;
        tracing::info!("[{}] Token revalidated", account.username);
        Ok(TokenStatus::Refreshed)
    }

    fn rotate_after_failure(&self, account: &Account) {
        if !self.rotate_on_failure {
            return;
        }
        if let Some(pool) = &self.proxy_pool {
            if let Some(next) = pool.rotate(&account.username) {
                tracing::info!(
                    "[{}] Next cycle will use proxy {}",
                    account.username,
                    next
                );
            }
        }
    }
}
