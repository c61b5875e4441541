use crate::models::{Account, AccountReport, PartnerOffer, PartnerStatus, Task, TaskStatus};
use crate::modules::quest::api::QuestApi;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Reached the terminal state during this run, with the score the server granted.
    Finished(f64),
    AlreadyDone,
    Failed,
    Skipped,
}

/// Drives tasks and partner offers through claim/complete for one account.
pub struct TaskEngine {
    api: Arc<QuestApi>,
    pacing: Duration,
}

impl TaskEngine {
    pub fn new(api: Arc<QuestApi>, pacing: Duration) -> Self {
        Self { api, pacing }
    }

    async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }

    /// Processes the balance, tasks and partners for an account whose token is
    /// already valid. Never fails; every problem lands in the report.
    pub async fn run(&self, account: &Account, report: &mut AccountReport) {
        report.balance = self.api.balance(account).await;
        tracing::info!("[{}] Current balance: {} points", account.username, report.balance);

        match self.api.task_list(account).await {
            Ok(tasks) => {
                tracing::info!("[{}] {} task(s) to check", account.username, tasks.len());
                for task in &tasks {
                    let outcome = self.process_task(account, task).await;
                    record(report, &outcome, false);
                    self.pace().await;
                }
            }
            Err(e) => {
                report.failures += 1;
                tracing::error!("[{}] No data available for tasks: {}", account.username, e);
            }
        }

        match self.api.partner_list(account).await {
            Ok(partners) => {
                tracing::info!("[{}] {} partner offer(s) to check", account.username, partners.len());
                for partner in &partners {
                    let outcome = self.process_partner(account, partner).await;
                    record(report, &outcome, true);
                    self.pace().await;
                }
            }
            Err(e) => {
                report.failures += 1;
                tracing::error!("[{}] No data available for partners: {}", account.username, e);
            }
        }
    }

    pub async fn process_task(&self, account: &Account, task: &Task) -> ItemOutcome {
        let id = task.id.as_str();
        match task.status {
            TaskStatus::NotStarted => {
                match self.api.claim_task(account, id).await {
                    Ok(outcome) if outcome.success => {
                        tracing::info!("[{}] Claimed task {}", account.username, id);
                    }
                    Ok(outcome) => {
                        tracing::warn!(
                            "[{}] Failed to claim task {}: {}",
                            account.username,
                            task.title,
                            outcome.message_or_default()
                        );
                        return ItemOutcome::Failed;
                    }
                    Err(e) => {
                        tracing::warn!("[{}] Failed to claim task {}: {}", account.username, task.title, e);
                        return ItemOutcome::Failed;
                    }
                }
                self.complete(account, task).await
            }
            TaskStatus::Claimed => self.complete(account, task).await,
            TaskStatus::Completed => {
                tracing::info!("[{}] Task already completed: {}", account.username, task.title);
                ItemOutcome::AlreadyDone
            }
            TaskStatus::Unknown => {
                tracing::debug!("[{}] Skipping task {} with unrecognized status", account.username, id);
                ItemOutcome::Skipped
            }
        }
    }

    async fn complete(&self, account: &Account, task: &Task) -> ItemOutcome {
        match self.api.complete_task(account, task.id.as_str()).await {
            Ok(outcome) if outcome.success => {
                tracing::info!(
                    "[{}] Completed task: {} (+{} points)",
                    account.username,
                    task.title,
                    outcome.score
                );
                ItemOutcome::Finished(outcome.score)
            }
            Ok(outcome) => {
                tracing::warn!(
                    "[{}] Failed to complete task {}: {}",
                    account.username,
                    task.title,
                    outcome.message_or_default()
                );
                ItemOutcome::Failed
            }
            Err(e) => {
                tracing::warn!("[{}] Failed to complete task {}: {}", account.username, task.title, e);
                ItemOutcome::Failed
            }
        }
    }

    pub async fn process_partner(&self, account: &Account, partner: &PartnerOffer) -> ItemOutcome {
        match partner.status {
            PartnerStatus::NotClaimed => match self.api.claim_partner(account, partner.id.as_str()).await {
                Ok(outcome) if outcome.success => {
                    tracing::info!(
                        "[{}] Claimed partner reward: {} (+{} points)",
                        account.username,
                        partner.name,
                        outcome.score
                    );
                    ItemOutcome::Finished(outcome.score)
                }
                Ok(outcome) => {
                    tracing::warn!(
                        "[{}] Failed to claim partner reward {}: {}",
                        account.username,
                        partner.name,
                        outcome.message_or_default()
                    );
                    ItemOutcome::Failed
                }
                Err(e) => {
                    tracing::warn!(
                        "[{}] Failed to claim partner reward {}: {}",
                        account.username,
                        partner.name,
                        e
                    );
                    ItemOutcome::Failed
                }
            },
            PartnerStatus::Claimed => {
                tracing::info!("[{}] Partner reward already claimed: {}", account.username, partner.name);
                ItemOutcome::AlreadyDone
            }
            PartnerStatus::Unknown => {
                tracing::debug!(
                    "[{}] Skipping partner {} with unrecognized status",
                    account.username,
                    partner.id
                );
                ItemOutcome::Skipped
            }
        }
    }
}

fn record(report: &mut AccountReport, outcome: &ItemOutcome, partner: bool) {
    match outcome {
        ItemOutcome::Finished(score) => {
            report.points_earned += score;
            if partner {
                report.partners_claimed += 1;
            } else {
                report.tasks_completed += 1;
            }
        }
        ItemOutcome::Failed => report.failures += 1,
        ItemOutcome::AlreadyDone | ItemOutcome::Skipped => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, Balance};
    use crate::test_utils::MockQuestServer;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn engine_for(server: &MockQuestServer) -> TaskEngine {
        let mut config = AppConfig::default();
        config.api_base_url = server.base_url().to_string();
        config.retry.delay_seconds = 0;
        TaskEngine::new(Arc::new(QuestApi::new(&config)), Duration::ZERO)
    }

    fn account() -> Account {
        Account::new("pilot".to_string(), "tok".to_string())
    }

    fn task(value: Value) -> Task {
        serde_json::from_value(value).expect("task")
    }

    fn request_paths(hits: &[crate::test_utils::Hit]) -> Vec<String> {
        hits.iter().map(|h| format!("{} {}", h.method, h.path)).collect()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn not_started_task_is_claimed_then_completed() {
        let server = MockQuestServer::start().await;
        server
            .enqueue("POST", "/api/v1/task/claim/7", StatusCode::OK, json!({"success": true}))
            .await;
        server
            .enqueue(
                "POST",
                "/api/v1/task/complete/7",
                StatusCode::OK,
                json!({"success": true, "data": {"score": 30}}),
            )
            .await;
        let engine = engine_for(&server);

        let outcome = engine
            .process_task(&account(), &task(json!({"id": 7, "title": "Retweet", "status": "NOT_STARTED", "expected_score": 10})))
            .await;

        assert_eq!(outcome, ItemOutcome::Finished(30.0));
        assert_eq!(
            request_paths(&server.hits().await),
            vec!["POST /api/v1/task/claim/7", "POST /api/v1/task/complete/7"]
        );
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn completed_and_unknown_tasks_make_no_calls() {
        let server = MockQuestServer::start().await;
        let engine = engine_for(&server);

        let done = engine
            .process_task(&account(), &task(json!({"id": 1, "status": "COMPLETED"})))
            .await;
        let odd = engine
            .process_task(&account(), &task(json!({"id": 2, "status": "ARCHIVED"})))
            .await;

        assert_eq!(done, ItemOutcome::AlreadyDone);
        assert_eq!(odd, ItemOutcome::Skipped);
        assert!(server.hits().await.is_empty());
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejected_claim_skips_completion() {
        let server = MockQuestServer::start().await;
        server
            .enqueue(
                "POST",
                "/api/v1/task/claim/3",
                StatusCode::OK,
                json!({"success": false, "message": "not eligible"}),
            )
            .await;
        let engine = engine_for(&server);

        let outcome = engine
            .process_task(&account(), &task(json!({"id": 3, "status": "NOT_STARTED"})))
            .await;
        assert_eq!(outcome, ItemOutcome::Failed);
        assert_eq!(server.hits_for("POST", "/api/v1/task/complete/3").await, 0);
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn claimed_task_goes_straight_to_completion() {
        let server = MockQuestServer::start().await;
        server
            .enqueue("POST", "/api/v1/task/complete/9", StatusCode::OK, json!({"success": true}))
            .await;
        let engine = engine_for(&server);

        let outcome = engine
            .process_task(&account(), &task(json!({"id": 9, "status": "CLAIMED"})))
            .await;
        assert_eq!(outcome, ItemOutcome::Finished(0.0));
        assert_eq!(request_paths(&server.hits().await), vec!["POST /api/v1/task/complete/9"]);
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_task_list_still_processes_partners() {
        let server = MockQuestServer::start().await;
        server
            .set_default("GET", "/api/v1/user/info", StatusCode::OK, json!({"data": {"overall_score": 500}}))
            .await;
        server
            .set_default("GET", "/api/v1/task/list", StatusCode::INTERNAL_SERVER_ERROR, json!({}))
            .await;
        server
            .enqueue(
                "GET",
                "/api/v1/partners",
                StatusCode::OK,
                json!({"data": [
                    {"id": 11, "name": "Alpha", "status": "NOT_CLAIMED"},
                    {"id": 12, "name": "Beta", "status": "CLAIMED"}
                ]}),
            )
            .await;
        server
            .enqueue(
                "POST",
                "/api/v1/partners/claim/11",
                StatusCode::OK,
                json!({"success": true, "data": {"score": 50}}),
            )
            .await;
        let engine = engine_for(&server);

        let mut report = AccountReport::new("pilot");
        engine.run(&account(), &mut report).await;

        assert_eq!(report.balance, Balance::Points(500.0));
        assert_eq!(report.partners_claimed, 1);
        assert_eq!(report.tasks_completed, 0);
        assert_eq!(report.points_earned, 50.0);
        assert_eq!(report.failures, 1);
        assert_eq!(server.hits_for("GET", "/api/v1/task/list").await, 3);
        assert_eq!(server.hits_for("POST", "/api/v1/partners/claim/12").await, 0);
        server.shutdown();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn pacing_delay_follows_every_item() {
        let server = MockQuestServer::start().await;
        server
            .enqueue(
                "GET",
                "/api/v1/task/list",
                StatusCode::OK,
                json!({"list": [{"id": 1, "status": "COMPLETED"}, {"id": 2, "status": "COMPLETED"}]}),
            )
            .await;
        server
            .enqueue("GET", "/api/v1/partners", StatusCode::OK, json!({"data": [{"id": 3, "status": "CLAIMED"}]}))
            .await;
        let mut config = AppConfig::default();
        config.api_base_url = server.base_url().to_string();
        config.retry.delay_seconds = 0;
        let engine = TaskEngine::new(Arc::new(QuestApi::new(&config)), Duration::from_millis(40));

        let started = std::time::Instant::now();
        let mut report = AccountReport::new("pilot");
        engine.run(&account(), &mut report).await;

        assert!(started.elapsed() >= Duration::from_millis(120));
        assert_eq!(report.balance, Balance::Unavailable);
        assert_eq!(report.failures, 0);
        server.shutdown();
    }
}
