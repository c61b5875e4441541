use crate::proxy::config::ProxySource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const KNOWN_SCHEMES: [&str; 4] = ["http://", "https://", "socks4://", "socks5://"];

#[derive(Debug, Default)]
struct PoolState {
    cursor: usize,
    account_bindings: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemeSummary {
    pub http: usize,
    pub socks4: usize,
    pub socks5: usize,
}

/// Process-lifetime proxy list with sticky per-account round-robin bindings.
#[derive(Debug, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
    state: Mutex<PoolState>,
}

pub fn normalize_proxy(entry: &str) -> String {
    let entry = entry.trim();
    if KNOWN_SCHEMES.iter().any(|scheme| entry.starts_with(scheme)) {
        entry.to_string()
    } else {
        format!("http://{}", entry)
    }
}

fn parse_proxy_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize_proxy)
        .collect()
}

impl ProxyPool {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            proxies: entries.iter().map(|e| normalize_proxy(e)).collect(),
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the pool from `source`. Failures degrade to an empty pool.
    pub async fn load(source: &ProxySource, fetch_timeout: Duration) -> Self {
        let pool = match source {
            ProxySource::Remote { url, cache_file } => {
                match fetch_remote_list(url, fetch_timeout).await {
                    Ok(text) => {
                        if let Err(e) = tokio::fs::write(cache_file, &text).await {
                            tracing::warn!(
                                "[ProxyPool] Failed to cache proxy list to {:?}: {}",
                                cache_file,
                                e
                            );
                        }
                        Self::new(parse_proxy_lines(&text))
                    }
                    Err(e) => {
                        tracing::warn!(
                            "[ProxyPool] Failed to fetch proxy list from {}: {}, falling back to {:?}",
                            url,
                            e,
                            cache_file
                        );
                        Self::from_file(cache_file).await
                    }
                }
            }
            ProxySource::File(path) => Self::from_file(path).await,
        };

        if pool.is_empty() {
            tracing::warn!("[ProxyPool] No proxies loaded, accounts will connect directly");
        } else {
            let summary = pool.scheme_summary();
            tracing::info!(
                "[ProxyPool] Loaded {} proxies (http/https: {}, socks4: {}, socks5: {})",
                pool.len(),
                summary.http,
                summary.socks4,
                summary.socks5
            );
        }
        pool
    }

    async fn from_file(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::new(parse_proxy_lines(&text)),
            Err(e) => {
                tracing::warn!("[ProxyPool] Failed to read proxy file {:?}: {}", path, e);
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn scheme_summary(&self) -> SchemeSummary {
        let mut summary = SchemeSummary::default();
        for proxy in &self.proxies {
            if proxy.starts_with("socks4://") {
                summary.socks4 += 1;
            } else if proxy.starts_with("socks5://") {
                summary.socks5 += 1;
            } else {
                summary.http += 1;
            }
        }
        summary
    }

    fn next_proxy(&self, state: &mut PoolState) -> String {
        let proxy = self.proxies[state.cursor % self.proxies.len()].clone();
        state.cursor = (state.cursor + 1) % self.proxies.len();
        proxy
    }

    /// Returns the account's binding, creating it from the round-robin cursor on first use.
    pub fn assign(&self, account_id: &str) -> Option<String> {
        if self.proxies.is_empty() {
            return None;
        }
        let mut state = self.state.lock();
        if let Some(bound) = state.account_bindings.get(account_id) {
            return Some(bound.clone());
        }
        let proxy = self.next_proxy(&mut state);
        state
            .account_bindings
            .insert(account_id.to_string(), proxy.clone());
        tracing::debug!("[ProxyPool] Bound account {} to {}", account_id, proxy);
        Some(proxy)
    }

    /// Moves the account to the next proxy in round-robin order.
    pub fn rotate(&self, account_id: &str) -> Option<String> {
        if self.proxies.is_empty() {
            return None;
        }
        let mut state = self.state.lock();
        let proxy = self.next_proxy(&mut state);
        state
            .account_bindings
            .insert(account_id.to_string(), proxy.clone());
        tracing::info!("[ProxyPool] Rotated account {} to {}", account_id, proxy);
        Some(proxy)
    }

    pub fn get_account_binding(&self, account_id: &str) -> Option<String> {
        self.state.lock().account_bindings.get(account_id).cloned()
    }
}

async fn fetch_remote_list(url: &str, timeout: Duration) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(crate::constants::USER_AGENT.as_str())
        .no_proxy()
        .build()
        .map_err(|e| e.to_string())?;
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("status {}", response.status()));
    }
    response.text().await.map_err(|e| e.to_string())
}
