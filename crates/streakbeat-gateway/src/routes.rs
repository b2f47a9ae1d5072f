//! Route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::server::AppState;

/// `POST /api/v1/cron/notifications` — one pipeline pass per invocation.
/// The external cron caller owns the repetition.
pub async fn cron_tick(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.pipeline.run_tick(Utc::now()).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "emailsSent": summary.emails_sent,
                "emailsSkipped": summary.emails_skipped,
                "errors": summary.errors,
                "totalProcessed": summary.total_processed,
            })),
        ),
        Err(e) => {
            tracing::error!("Cron-triggered tick failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

/// `GET /api/v1/scheduler/status` — in-process driver state, if one exists.
pub async fn scheduler_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    match &state.scheduler {
        Some(scheduler) => {
            let status = scheduler.status();
            Json(json!({
                "running": status.running,
                "ticksCompleted": status.ticks_completed,
                "lastSummary": status.last_summary,
            }))
        }
        None => Json(json!({"running": false, "driver": "external-cron"})),
    }
}

/// `GET /health` — public liveness probe.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    use streakbeat_core::error::{Result, StreakbeatError};
    use streakbeat_core::traits::{ChallengeStore, MailTransport};
    use streakbeat_core::types::{EligibleChallenge, NotificationLog};
    use streakbeat_scheduler::Pipeline;

    /// Empty store; flips to failing for the 500 path.
    struct StubStore {
        fail: bool,
    }

    #[async_trait]
    impl ChallengeStore for StubStore {
        async fn eligible_challenges(&self, _now: DateTime<Utc>) -> Result<Vec<EligibleChallenge>> {
            if self.fail {
                Err(StreakbeatError::Database("no route to host".into()))
            } else {
                Ok(vec![])
            }
        }
        async fn has_upload_between(
            &self,
            _challenge_id: Uuid,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<bool> {
            Ok(false)
        }
        async fn count_uploads(&self, _challenge_id: Uuid) -> Result<i64> {
            Ok(0)
        }
        async fn mark_interval_email_sent(
            &self,
            _challenge_id: Uuid,
            _at: DateTime<Utc>,
        ) -> Result<()> {
            Ok(())
        }
        async fn record_notification(&self, _log: &NotificationLog) -> Result<()> {
            Ok(())
        }
    }

    struct StubMailer {
        sent: Mutex<u32>,
    }

    #[async_trait]
    impl MailTransport for StubMailer {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<()> {
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn state(fail: bool) -> Arc<AppState> {
        let pipeline = Pipeline::new(
            Arc::new(StubStore { fail }),
            Arc::new(StubMailer {
                sent: Mutex::new(0),
            }),
            "http://localhost:3000",
        );
        Arc::new(AppState {
            pipeline: Arc::new(pipeline),
            scheduler: None,
            cron_secret: Some("s3cret".into()),
            start_time: std::time::Instant::now(),
        })
    }

    #[tokio::test]
    async fn test_cron_tick_reports_counters() {
        let (status, Json(body)) = cron_tick(State(state(false))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["emailsSent"], 0);
        assert_eq!(body["emailsSkipped"], 0);
        assert_eq!(body["errors"], 0);
        assert_eq!(body["totalProcessed"], 0);
    }

    #[tokio::test]
    async fn test_cron_tick_surfaces_tick_failure_as_500() {
        let (status, Json(body)) = cron_tick(State(state(true))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("no route to host"));
    }

    #[tokio::test]
    async fn test_status_without_in_process_scheduler() {
        let Json(body) = scheduler_status(State(state(false))).await;
        assert_eq!(body["running"], false);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health_check(State(state(false))).await;
        assert_eq!(body["ok"], true);
    }
}
