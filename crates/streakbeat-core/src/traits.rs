//! Seams between the notification pipeline and its collaborators.
//!
//! Both drivers (the long-lived timer and the HTTP trigger) run the same
//! pipeline against these traits, and the tests swap in in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::types::{EligibleChallenge, NotificationLog};

/// Read/write access to challenge state.
///
/// The pipeline only ever reads challenges, uploads, and users; its sole
/// writes are the interval-email timestamp and the append-only audit log.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Active challenges with notifications enabled at both the challenge
    /// and user level, whose interval window has elapsed as of `now`, joined
    /// with the owner's email and display name.
    async fn eligible_challenges(&self, now: DateTime<Utc>) -> Result<Vec<EligibleChallenge>>;

    /// Whether the challenge has an upload timestamped inside
    /// `[start, end)`.
    async fn has_upload_between(
        &self,
        challenge_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool>;

    /// Total uploads recorded for the challenge so far.
    async fn count_uploads(&self, challenge_id: Uuid) -> Result<i64>;

    /// Advance the duplicate-send guard. Called after every processed
    /// challenge — sent, skipped, or failed.
    async fn mark_interval_email_sent(&self, challenge_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Append one audit row.
    async fn record_notification(&self, log: &NotificationLog) -> Result<()>;
}

/// Outbound email transport. One call, one message, resolved or rejected.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}
