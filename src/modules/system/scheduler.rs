use crate::commands::runner::QuestRunner;
use crate::models::ScheduleConfig;
use crate::modules::system::logger;
use std::sync::Arc;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;

pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Waits `total`, logging the time left every `log_every`. Returns `false` when
/// cancelled before the wait finished.
pub async fn countdown(total: Duration, log_every: Duration, cancel: &CancellationToken) -> bool {
    let deadline = Instant::now() + total;
    let step = if log_every.is_zero() { total } else { log_every };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        logger::log_info(&format!(
            "[Scheduler] Next run in: {}",
            format_seconds(remaining.as_secs())
        ));

        tokio::select! {
            _ = cancel.cancelled() => {
                logger::log_info("[Scheduler] Countdown interrupted");
                return false;
            }
            _ = time::sleep(step.min(remaining)) => {}
        }
    }
}

/// Runs a cycle, idles for the configured interval, repeats until cancelled.
pub async fn run_cycles(runner: Arc<QuestRunner>, schedule: ScheduleConfig, cancel: CancellationToken) {
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        logger::log_info(&format!("[Scheduler] Starting cycle #{}", cycle));

        tokio::select! {
            _ = cancel.cancelled() => {
                logger::log_warn("[Scheduler] Cycle abandoned on shutdown");
                return;
            }
            stats = runner.run_cycle() => {
                for detail in &stats.details {
                    logger::log_warn(&format!("[Scheduler] {}", detail));
                }
            }
        }

        logger::log_info("[Scheduler] All accounts processed. Starting countdown...");
        if !countdown(schedule.cycle_interval(), schedule.countdown_log_interval(), &cancel).await {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_seconds(0), "00:00:00");
        assert_eq!(format_seconds(3661), "01:01:01");
        assert_eq!(format_seconds(43_200), "12:00:00");
        assert_eq!(format_seconds(100 * 3600), "100:00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_to_completion() {
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let finished = countdown(Duration::from_secs(7200), Duration::from_secs(3600), &cancel).await;
        assert!(finished);
        assert_eq!(started.elapsed(), Duration::from_secs(7200));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(90)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let finished = countdown(Duration::from_secs(43_200), Duration::from_secs(60), &cancel).await;
        assert!(!finished);
        assert!(started.elapsed() < Duration::from_secs(43_200));
    }
}
