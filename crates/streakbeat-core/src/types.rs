//! Domain types — challenges, uploads, and the notification audit log.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Challenge lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Failed,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the database representation; unknown values map to Failed
    /// so a corrupt row can never re-enter the active pipeline.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::Failed,
        }
    }
}

/// A user's commitment to upload videos on a cadence over a duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub started_at: DateTime<Utc>,
    /// Explicit day count; wins over `duration_months` when both are set.
    pub duration_days: Option<i32>,
    pub duration_months: Option<i32>,
    /// Upload cadence, e.g. "daily".
    pub cadence: String,
    pub video_type: String,
    pub points: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub missed_days: i32,
    pub completion_pct: f64,
    pub next_deadline: Option<DateTime<Utc>>,
    /// Minimum gap between interval emails for this challenge.
    pub notification_interval_minutes: i32,
    /// Duplicate-send guard: advanced after every processed tick, even on
    /// send failure.
    pub last_interval_email_sent: Option<DateTime<Utc>>,
    pub notifications_enabled: bool,
    pub status: ChallengeStatus,
}

/// Duration fields may be absent; two months is the fallback.
const DEFAULT_DURATION_MONTHS: i64 = 2;
const DAYS_PER_MONTH: i64 = 30;

impl Challenge {
    /// Total challenge length in days: explicit day count, else months × 30,
    /// else the two-month default.
    pub fn total_days(&self) -> i64 {
        if let Some(days) = self.duration_days {
            return i64::from(days);
        }
        let months = self
            .duration_months
            .map(i64::from)
            .unwrap_or(DEFAULT_DURATION_MONTHS);
        months * DAYS_PER_MONTH
    }

    /// The instant the challenge's configured duration elapses.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.started_at + Duration::days(self.total_days())
    }

    /// Past the configured duration. Expired challenges are filtered out of
    /// the pipeline; marking them failed is someone else's job.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date()
    }

    /// Whole days until the end date, clamped at zero.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date() - now).num_days().max(0)
    }

    /// Progress stats embedded in outgoing emails. Assumes one expected
    /// upload per challenge day.
    pub fn progress(&self, uploads: i64, now: DateTime<Utc>) -> ChallengeProgress {
        ChallengeProgress {
            videos_uploaded: uploads,
            videos_remaining: (self.total_days() - uploads).max(0),
            days_remaining: self.days_remaining(now),
            current_streak: self.current_streak,
            points: self.points,
        }
    }
}

/// A challenge joined with its owner, as returned by the eligibility query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleChallenge {
    pub challenge: Challenge,
    pub user_email: String,
    pub user_name: String,
}

/// One tracked video upload. Read-only from the scheduler's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Which email template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    UploadReminder,
    StreakMilestone,
    ChallengeCompleted,
    UploadConfirmation,
    MissedUpload,
    MorningReminder,
    /// The recurring motivational email driven by the scheduler.
    IntervalMotivation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::UploadReminder => "upload_reminder",
            Self::StreakMilestone => "streak_milestone",
            Self::ChallengeCompleted => "challenge_completed",
            Self::UploadConfirmation => "upload_confirmation",
            Self::MissedUpload => "missed_upload",
            Self::MorningReminder => "morning_reminder",
            Self::IntervalMotivation => "interval_motivation",
        }
    }
}

/// Outcome of an attempted send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// Append-only audit row for an attempted send. Write-once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub status: NotificationStatus,
    pub subject: String,
    /// Rendered-content summary on success, best-effort error message on
    /// failure.
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationLog {
    pub fn sent(challenge: &Challenge, kind: NotificationKind, subject: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            challenge_id: challenge.id,
            user_id: challenge.user_id,
            kind,
            status: NotificationStatus::Sent,
            subject: subject.to_string(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(challenge: &Challenge, kind: NotificationKind, subject: &str, error: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            challenge_id: challenge.id,
            user_id: challenge.user_id,
            kind,
            status: NotificationStatus::Failed,
            subject: subject.to_string(),
            detail: Some(error.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Numbers embedded in outgoing emails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub videos_uploaded: i64,
    pub videos_remaining: i64,
    pub days_remaining: i64,
    pub current_streak: i32,
    pub points: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "60 shorts in 60 days".into(),
            started_at: Utc::now(),
            duration_days: None,
            duration_months: None,
            cadence: "daily".into(),
            video_type: "short".into(),
            points: 120,
            current_streak: 4,
            longest_streak: 9,
            missed_days: 1,
            completion_pct: 20.0,
            next_deadline: None,
            notification_interval_minutes: 60,
            last_interval_email_sent: None,
            notifications_enabled: true,
            status: ChallengeStatus::Active,
        }
    }

    #[test]
    fn test_duration_defaults_to_two_months() {
        let c = challenge();
        assert_eq!(c.total_days(), 60);
    }

    #[test]
    fn test_explicit_days_win_over_months() {
        let mut c = challenge();
        c.duration_days = Some(14);
        c.duration_months = Some(3);
        assert_eq!(c.total_days(), 14);
    }

    #[test]
    fn test_months_times_thirty() {
        let mut c = challenge();
        c.duration_months = Some(3);
        assert_eq!(c.total_days(), 90);
    }

    #[test]
    fn test_expiry() {
        let mut c = challenge();
        c.started_at = Utc::now() - Duration::days(90);
        c.duration_months = Some(2); // 60 days
        assert!(c.is_expired(Utc::now()));

        c.started_at = Utc::now() - Duration::days(10);
        assert!(!c.is_expired(Utc::now()));
    }

    #[test]
    fn test_progress_clamps_remaining() {
        let mut c = challenge();
        c.duration_days = Some(10);
        let p = c.progress(15, Utc::now());
        assert_eq!(p.videos_uploaded, 15);
        assert_eq!(p.videos_remaining, 0);
    }

    #[test]
    fn test_status_parse_round_trip() {
        for s in [
            ChallengeStatus::Active,
            ChallengeStatus::Completed,
            ChallengeStatus::Failed,
        ] {
            assert_eq!(ChallengeStatus::parse(s.as_str()), s);
        }
        assert_eq!(ChallengeStatus::parse("garbage"), ChallengeStatus::Failed);
    }
}
