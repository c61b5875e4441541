use rand::seq::SliceRandom;
use std::sync::LazyLock;

pub const DEFAULT_API_BASE_URL: &str = "https://quest.redactedairways.com";
pub const DEFAULT_PUBLIC_PROXY_LIST_URL: &str =
    "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies/all.txt";
pub const DEFAULT_TOKEN_FILE: &str = "data.txt";
pub const DEFAULT_PROXY_FILE: &str = "proxy.txt";

const BROWSER_USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

fn pick_user_agent() -> &'static str {
    BROWSER_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_USER_AGENTS[0])
}

// Chosen once so every request from this process presents the same browser.
pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    let ua = pick_user_agent().to_string();
    tracing::debug!(user_agent = %ua, "User-Agent initialized");
    ua
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_user_agent_comes_from_browser_list() {
        for _ in 0..20 {
            assert!(BROWSER_USER_AGENTS.contains(&pick_user_agent()));
        }
    }

    #[test]
    fn test_user_agent_is_stable_for_process() {
        let first = USER_AGENT.clone();
        let second = USER_AGENT.clone();
        assert_eq!(first, second);
        assert!(first.starts_with("Mozilla/5.0"));
    }
}
