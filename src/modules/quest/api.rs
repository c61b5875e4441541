use crate::models::quest::parse_items;
use crate::models::{Account, AppConfig, Balance, PartnerOffer, Task, UserInfo};
use crate::proxy::upstream::header_policy::{build_quest_headers, HeaderScope, QuestHeaderContext};
use crate::proxy::upstream::{CallError, CallExecutor, CallFailure, CallRequest, RetryPolicy};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct QuestEndpoints {
    base_url: String,
}

impl QuestEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> String {
        format!("{}/api/v1/user/auth", self.base_url)
    }

    pub fn revalidate(&self) -> String {
        format!("{}/ecom-gateway/revalidate", self.base_url)
    }

    pub fn user_info(&self) -> String {
        format!("{}/api/v1/user/info", self.base_url)
    }

    pub fn task_list(&self) -> String {
        format!("{}/api/v1/task/list", self.base_url)
    }

    pub fn partners(&self) -> String {
        format!("{}/api/v1/partners", self.base_url)
    }

    pub fn claim_task(&self, task_id: &str) -> String {
        self.item_url("/api/v1/task/claim", task_id)
    }

    pub fn complete_task(&self, task_id: &str) -> String {
        self.item_url("/api/v1/task/complete", task_id)
    }

    pub fn claim_partner(&self, partner_id: &str) -> String {
        self.item_url("/api/v1/partners/claim", partner_id)
    }

    /// Appends a server-supplied id as one percent-encoded path segment.
    fn item_url(&self, path: &str, id: &str) -> String {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(_) => return format!("{}/{}", raw, id),
        };
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(id);
            }
            Err(()) => return format!("{}/{}", raw, id),
        }
        url.to_string()
    }
}

/// Result of a claim/complete call that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub success: bool,
    pub score: f64,
    pub message: Option<String>,
}

impl ActionOutcome {
    fn from_body(body: &Value) -> Self {
        Self {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(false),
            score: body
                .get("data")
                .and_then(|data| data.get("score"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

/// Typed access to the quest API for one account at a time.
#[derive(Debug, Clone)]
pub struct QuestApi {
    endpoints: QuestEndpoints,
    executor: CallExecutor,
    request_timeout: Duration,
    list_timeout: Duration,
    retry: RetryPolicy,
    revalidate_attempts: usize,
}

impl QuestApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            endpoints: QuestEndpoints::new(&config.api_base_url),
            executor: CallExecutor::new(),
            request_timeout: config.timeouts.request(),
            list_timeout: config.timeouts.list(),
            retry: RetryPolicy::from_config(&config.retry),
            revalidate_attempts: config.retry.revalidate_attempts,
        }
    }

    fn request(&self, method: Method, url: String, account: &Account, scope: HeaderScope) -> CallRequest {
        let headers = build_quest_headers(QuestHeaderContext {
            site_origin: self.endpoints.base_url(),
            bearer: Some(&account.token),
            scope,
        });
        CallRequest::new(method, url, self.request_timeout, self.retry)
            .headers(headers)
            .proxy(account.proxy.as_deref())
    }

    /// `true` only when the server explicitly reports the token as valid.
    pub async fn auth_check(&self, account: &Account) -> bool {
        let request = self.request(Method::GET, self.endpoints.auth(), account, HeaderScope::Read);
        match self.executor.execute(request).await {
            Ok(body) => body.get("success").and_then(Value::as_bool).unwrap_or(false),
            Err(e) => {
                tracing::debug!("[QuestApi] Auth check for {} failed: {}", account.username, e);
                false
            }
        }
    }

    /// Exchanges the current token for a fresh one.
    pub async fn revalidate(&self, account: &Account) -> Result<String, CallFailure> {
        let mut request = self.request(
            Method::POST,
            self.endpoints.revalidate(),
            account,
            HeaderScope::Revalidate,
        );
        request.retry = self.retry.with_attempts(self.revalidate_attempts);

        self.executor
            .execute_map(request, |body| {
                body.get("token")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| CallError::Decode("revalidate response has no token".to_string()))
            })
            .await
    }

    pub async fn balance(&self, account: &Account) -> Balance {
        let request = self.request(Method::GET, self.endpoints.user_info(), account, HeaderScope::Read);
        match self.executor.execute(request).await {
            Ok(body) => balance_from_body(&body),
            Err(e) => {
                tracing::debug!("[QuestApi] User info for {} failed: {}", account.username, e);
                Balance::Unavailable
            }
        }
    }

    pub async fn task_list(&self, account: &Account) -> Result<Vec<Task>, CallFailure> {
        let mut request = self.request(Method::GET, self.endpoints.task_list(), account, HeaderScope::Read);
        request.timeout = self.list_timeout;
        let body = self.executor.execute(request).await?;
        Ok(list_field(&body, "list").map(parse_items::<Task>).unwrap_or_default())
    }

    pub async fn partner_list(&self, account: &Account) -> Result<Vec<PartnerOffer>, CallFailure> {
        let mut request = self.request(Method::GET, self.endpoints.partners(), account, HeaderScope::Read);
        request.timeout = self.list_timeout;
        let body = self.executor.execute(request).await?;
        Ok(list_field(&body, "data").map(parse_items::<PartnerOffer>).unwrap_or_default())
    }

    pub async fn claim_task(&self, account: &Account, task_id: &str) -> Result<ActionOutcome, CallFailure> {
        self.action(account, self.endpoints.claim_task(task_id)).await
    }

    pub async fn complete_task(&self, account: &Account, task_id: &str) -> Result<ActionOutcome, CallFailure> {
        self.action(account, self.endpoints.complete_task(task_id)).await
    }

    pub async fn claim_partner(&self, account: &Account, partner_id: &str) -> Result<ActionOutcome, CallFailure> {
        self.action(account, self.endpoints.claim_partner(partner_id)).await
    }

    async fn action(&self, account: &Account, url: String) -> Result<ActionOutcome, CallFailure> {
        let request = self.request(Method::POST, url, account, HeaderScope::Mutation);
        let body = self.executor.execute(request).await?;
        Ok(ActionOutcome::from_body(&body))
    }
}

fn list_field<'a>(body: &'a Value, key: &str) -> Option<&'a [Value]> {
    body.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// A missing or empty `data` object means the balance is unknown; a present
/// object without a score counts as zero.
fn balance_from_body(body: &Value) -> Balance {
    match body.get("data") {
        Some(data) if data.as_object().is_some_and(|obj| !obj.is_empty()) => {
            match serde_json::from_value::<UserInfo>(data.clone()) {
                Ok(info) => Balance::Points(info.overall_score),
                Err(_) => Balance::Points(0.0),
            }
        }
        _ => Balance::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockQuestServer;
    use axum::http::StatusCode;
    use serde_json::json;

    fn api_for(server: &MockQuestServer) -> QuestApi {
        let mut config = AppConfig::default();
        config.api_base_url = server.base_url().to_string();
        config.retry.delay_seconds = 0;
        QuestApi::new(&config)
    }

    fn account() -> Account {
        Account::new("pilot".to_string(), "tok.en.one".to_string())
    }

    #[test]
    fn endpoints_join_base_without_double_slash() {
        let endpoints = QuestEndpoints::new("https://quest.example.com/");
        assert_eq!(endpoints.auth(), "https://quest.example.com/api/v1/user/auth");
        assert_eq!(
            endpoints.claim_partner("17"),
            "https://quest.example.com/api/v1/partners/claim/17"
        );
    }

    #[test]
    fn item_ids_are_encoded_as_a_single_segment() {
        let endpoints = QuestEndpoints::new("http://127.0.0.1:8080");
        assert_eq!(
            endpoints.claim_task("a/b?c#d"),
            "http://127.0.0.1:8080/api/v1/task/claim/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            endpoints.complete_task("../info"),
            "http://127.0.0.1:8080/api/v1/task/complete/..%2Finfo"
        );
    }

    #[test]
    fn balance_distinguishes_missing_from_zero() {
        assert_eq!(balance_from_body(&json!({})), Balance::Unavailable);
        assert_eq!(balance_from_body(&json!({"data": null})), Balance::Unavailable);
        assert_eq!(balance_from_body(&json!({"data": {}})), Balance::Unavailable);
        assert_eq!(balance_from_body(&json!({"data": {"name": "x"}})), Balance::Points(0.0));
        assert_eq!(
            balance_from_body(&json!({"data": {"overall_score": 1250}})),
            Balance::Points(1250.0)
        );
    }

    #[test]
    fn action_outcome_defaults_missing_fields() {
        let outcome = ActionOutcome::from_body(&json!({"success": true}));
        assert!(outcome.success);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.message_or_default(), "Unknown error");

        let scored = ActionOutcome::from_body(&json!({"success": true, "data": {"score": 25}}));
        assert_eq!(scored.score, 25.0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn auth_check_sends_bearer_and_reads_success() {
        let server = MockQuestServer::start().await;
        server
            .set_default("GET", "/api/v1/user/auth", StatusCode::OK, json!({"success": true}))
            .await;
        let api = api_for(&server);

        assert!(api.auth_check(&account()).await);
        let hits = server.hits().await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bearer.as_deref(), Some("tok.en.one"));
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn auth_check_is_false_after_exhausting_attempts() {
        let server = MockQuestServer::start().await;
        server
            .set_default("GET", "/api/v1/user/auth", StatusCode::UNAUTHORIZED, json!({}))
            .await;
        let api = api_for(&server);

        assert!(!api.auth_check(&account()).await);
        assert_eq!(server.hits_for("GET", "/api/v1/user/auth").await, 3);
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn revalidate_uses_its_own_attempt_budget() {
        let server = MockQuestServer::start().await;
        server
            .set_default("POST", "/ecom-gateway/revalidate", StatusCode::FORBIDDEN, json!({}))
            .await;
        let api = api_for(&server);

        let failure = api.revalidate(&account()).await.expect_err("never succeeds");
        assert_eq!(failure.attempts, 5);
        assert_eq!(server.hits_for("POST", "/ecom-gateway/revalidate").await, 5);
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn lists_parse_their_own_keys() {
        let server = MockQuestServer::start().await;
        server
            .enqueue(
                "GET",
                "/api/v1/task/list",
                StatusCode::OK,
                json!({"list": [{"id": 1, "title": "Follow", "status": "NOT_STARTED"}, null]}),
            )
            .await;
        server
            .enqueue(
                "GET",
                "/api/v1/partners",
                StatusCode::OK,
                json!({"data": [{"id": "p1", "name": "Partner", "status": "CLAIMED"}]}),
            )
            .await;
        let api = api_for(&server);

        let tasks = api.task_list(&account()).await.expect("tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Follow");
        let partners = api.partner_list(&account()).await.expect("partners");
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].id.as_str(), "p1");
        server.shutdown();
    }
}
