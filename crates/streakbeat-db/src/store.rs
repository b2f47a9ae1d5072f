//! Postgres-backed implementation of the `ChallengeStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use streakbeat_core::error::{Result, StreakbeatError};
use streakbeat_core::traits::ChallengeStore;
use streakbeat_core::types::{Challenge, ChallengeStatus, EligibleChallenge, NotificationLog};

/// Idempotent schema — applied on startup.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT UNIQUE NOT NULL,
        display_name TEXT NOT NULL DEFAULT '',
        notifications_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS user_challenges (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id),
        title TEXT NOT NULL DEFAULT '',
        started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        duration_days INTEGER,
        duration_months INTEGER,
        cadence TEXT NOT NULL DEFAULT 'daily',
        video_type TEXT NOT NULL DEFAULT 'video',
        points INTEGER NOT NULL DEFAULT 0,
        current_streak INTEGER NOT NULL DEFAULT 0,
        longest_streak INTEGER NOT NULL DEFAULT 0,
        missed_days INTEGER NOT NULL DEFAULT 0,
        completion_pct DOUBLE PRECISION NOT NULL DEFAULT 0,
        next_deadline TIMESTAMPTZ,
        notification_interval_minutes INTEGER,
        last_interval_email_sent TIMESTAMPTZ,
        notifications_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        status TEXT NOT NULL DEFAULT 'active'
    );

    CREATE TABLE IF NOT EXISTS challenge_uploads (
        id UUID PRIMARY KEY,
        challenge_id UUID NOT NULL REFERENCES user_challenges(id),
        uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE TABLE IF NOT EXISTS challenge_notifications (
        id UUID PRIMARY KEY,
        challenge_id UUID NOT NULL,
        user_id UUID NOT NULL,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        subject TEXT NOT NULL DEFAULT '',
        detail TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    );

    CREATE INDEX IF NOT EXISTS idx_challenges_status
        ON user_challenges(status);
    CREATE INDEX IF NOT EXISTS idx_uploads_challenge_time
        ON challenge_uploads(challenge_id, uploaded_at);
";

/// Shared SELECT column list for eligibility queries — single source of truth.
const ELIGIBLE_SELECT: &str = "
    SELECT c.id, c.user_id, c.title, c.started_at, c.duration_days,
           c.duration_months, c.cadence, c.video_type, c.points,
           c.current_streak, c.longest_streak, c.missed_days,
           c.completion_pct, c.next_deadline,
           COALESCE(c.notification_interval_minutes, $2) AS notification_interval_minutes,
           c.last_interval_email_sent, c.notifications_enabled, c.status,
           u.email AS user_email, u.display_name AS user_name
    FROM user_challenges c
    JOIN users u ON u.id = c.user_id
    WHERE c.status = 'active'
      AND c.notifications_enabled
      AND u.notifications_enabled
      AND (c.last_interval_email_sent IS NULL
           OR c.last_interval_email_sent
              + make_interval(mins => COALESCE(c.notification_interval_minutes, $2)) <= $1)
";

/// Flat row shape for the eligibility join.
#[derive(Debug, FromRow)]
struct EligibleRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    started_at: DateTime<Utc>,
    duration_days: Option<i32>,
    duration_months: Option<i32>,
    cadence: String,
    video_type: String,
    points: i32,
    current_streak: i32,
    longest_streak: i32,
    missed_days: i32,
    completion_pct: f64,
    next_deadline: Option<DateTime<Utc>>,
    notification_interval_minutes: i32,
    last_interval_email_sent: Option<DateTime<Utc>>,
    notifications_enabled: bool,
    status: String,
    user_email: String,
    user_name: String,
}

impl From<EligibleRow> for EligibleChallenge {
    fn from(row: EligibleRow) -> Self {
        EligibleChallenge {
            challenge: Challenge {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                started_at: row.started_at,
                duration_days: row.duration_days,
                duration_months: row.duration_months,
                cadence: row.cadence,
                video_type: row.video_type,
                points: row.points,
                current_streak: row.current_streak,
                longest_streak: row.longest_streak,
                missed_days: row.missed_days,
                completion_pct: row.completion_pct,
                next_deadline: row.next_deadline,
                notification_interval_minutes: row.notification_interval_minutes,
                last_interval_email_sent: row.last_interval_email_sent,
                notifications_enabled: row.notifications_enabled,
                status: ChallengeStatus::parse(&row.status),
            },
            user_email: row.user_email,
            user_name: row.user_name,
        }
    }
}

/// Postgres challenge store.
pub struct PgStore {
    pool: PgPool,
    /// Fallback when a challenge row carries no interval of its own.
    default_interval_minutes: i32,
}

impl PgStore {
    /// Connect a small pool and verify the server answers.
    pub async fn connect(url: &str, max_connections: u32, default_interval_minutes: i64) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StreakbeatError::Database(format!("Connect: {e}")))?;
        Ok(Self {
            pool,
            default_interval_minutes: default_interval_minutes as i32,
        })
    }

    /// Apply the idempotent schema.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StreakbeatError::Database(format!("Migration: {e}")))?;
        tracing::info!("💾 Database schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChallengeStore for PgStore {
    async fn eligible_challenges(&self, now: DateTime<Utc>) -> Result<Vec<EligibleChallenge>> {
        let rows: Vec<EligibleRow> = sqlx::query_as(ELIGIBLE_SELECT)
            .bind(now)
            .bind(self.default_interval_minutes)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StreakbeatError::Database(format!("Eligibility query: {e}")))?;
        Ok(rows.into_iter().map(EligibleChallenge::from).collect())
    }

    async fn has_upload_between(
        &self,
        challenge_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM challenge_uploads
                WHERE challenge_id = $1 AND uploaded_at >= $2 AND uploaded_at < $3
            )",
        )
        .bind(challenge_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StreakbeatError::Database(format!("Upload lookup: {e}")))
    }

    async fn count_uploads(&self, challenge_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM challenge_uploads WHERE challenge_id = $1")
            .bind(challenge_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StreakbeatError::Database(format!("Upload count: {e}")))
    }

    async fn mark_interval_email_sent(&self, challenge_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE user_challenges SET last_interval_email_sent = $1 WHERE id = $2")
            .bind(at)
            .bind(challenge_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StreakbeatError::Database(format!("Mark sent: {e}")))?;
        Ok(())
    }

    async fn record_notification(&self, log: &NotificationLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO challenge_notifications
                 (id, challenge_id, user_id, kind, status, subject, detail, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(log.id)
        .bind(log.challenge_id)
        .bind(log.user_id)
        .bind(log.kind.as_str())
        .bind(log.status.as_str())
        .bind(&log.subject)
        .bind(&log.detail)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StreakbeatError::Database(format!("Record notification: {e}")))?;
        Ok(())
    }
}
