/// One automated account for the duration of a cycle.
///
/// `username` comes from the token payload and keys the proxy binding;
/// `token` is swapped in place when the server issues a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub token: String,
    pub proxy: Option<String>,
}

impl Account {
    pub fn new(username: String, token: String) -> Self {
        Self {
            username,
            token,
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// Per-account outcome of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    pub username: String,
    pub balance: super::quest::Balance,
    pub token_refreshed: bool,
    pub tasks_completed: usize,
    pub partners_claimed: usize,
    pub points_earned: f64,
    pub failures: usize,
}

impl AccountReport {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            balance: super::quest::Balance::Unavailable,
            token_refreshed: false,
            tasks_completed: 0,
            partners_claimed: 0,
            points_earned: 0.0,
            failures: 0,
        }
    }
}
