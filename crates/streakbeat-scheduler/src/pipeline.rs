//! The shared notification pipeline.
//!
//! One `run_tick` call is one logical unit of work. Challenges are processed
//! sequentially; a per-challenge failure is isolated and audited, while an
//! eligibility-query failure aborts the whole tick with no side effects.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use streakbeat_core::error::Result;
use streakbeat_core::traits::{ChallengeStore, MailTransport};
use streakbeat_core::types::{EligibleChallenge, NotificationKind, NotificationLog};
use streakbeat_mailer::templates::{self, EmailContext, MotivationPicker};

/// Counters for one pipeline pass. Serialized camelCase for the HTTP
/// trigger's response body.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    pub emails_sent: u32,
    pub emails_skipped: u32,
    pub errors: u32,
    pub total_processed: u32,
}

/// What happened to one challenge within a tick.
enum Outcome {
    Sent,
    Skipped,
    Failed,
}

/// The eligibility/filter/guard/dispatch/update sequence with its
/// collaborators injected. Both drivers hold the same instance.
pub struct Pipeline {
    store: Arc<dyn ChallengeStore>,
    mailer: Arc<dyn MailTransport>,
    picker: MotivationPicker,
    public_url: String,
    /// Serializes overlapping tick invocations (slow pass + impatient cron
    /// caller); passes queue instead of interleaving.
    tick_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ChallengeStore>,
        mailer: Arc<dyn MailTransport>,
        public_url: &str,
    ) -> Self {
        Self::with_picker(store, mailer, public_url, templates::random_picker())
    }

    /// Same pipeline with a pinned message picker (used by tests).
    pub fn with_picker(
        store: Arc<dyn ChallengeStore>,
        mailer: Arc<dyn MailTransport>,
        public_url: &str,
        picker: MotivationPicker,
    ) -> Self {
        Self {
            store,
            mailer,
            picker,
            public_url: public_url.to_string(),
            tick_lock: Mutex::new(()),
        }
    }

    /// One full pass over every eligible challenge.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickSummary> {
        let _guard = self.tick_lock.lock().await;

        let candidates = self.store.eligible_challenges(now).await?;
        let mut summary = TickSummary::default();

        for candidate in candidates {
            // Past the configured duration: excluded from the batch, nothing
            // mutated. Marking the challenge failed is a separate concern.
            if candidate.challenge.is_expired(now) {
                tracing::debug!(
                    challenge = %candidate.challenge.id,
                    "challenge expired, excluded from batch"
                );
                continue;
            }

            summary.total_processed += 1;
            match self.process_challenge(&candidate, now).await {
                Ok(Outcome::Sent) => summary.emails_sent += 1,
                Ok(Outcome::Skipped) => summary.emails_skipped += 1,
                Ok(Outcome::Failed) => summary.errors += 1,
                Err(e) => {
                    // Isolated: one bad challenge must not stop the batch.
                    summary.errors += 1;
                    tracing::warn!(
                        challenge = %candidate.challenge.id,
                        "challenge processing failed: {e}"
                    );
                }
            }
        }

        tracing::info!(
            sent = summary.emails_sent,
            skipped = summary.emails_skipped,
            errors = summary.errors,
            "🔔 Tick complete ({} challenge(s) processed)",
            summary.total_processed
        );
        Ok(summary)
    }

    async fn process_challenge(
        &self,
        candidate: &EligibleChallenge,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let challenge = &candidate.challenge;
        let (day_start, day_end) = utc_day_bounds(now);

        // Duplicate-send guard: a user who already uploaded today gets no
        // nag, but the window still resets so the row isn't re-queried every
        // tick until its interval elapses.
        if self
            .store
            .has_upload_between(challenge.id, day_start, day_end)
            .await?
        {
            self.store.mark_interval_email_sent(challenge.id, now).await?;
            tracing::debug!(challenge = %challenge.id, "uploaded today, skipping email");
            return Ok(Outcome::Skipped);
        }

        let uploads = self.store.count_uploads(challenge.id).await?;
        let progress = challenge.progress(uploads, now);
        let motivation = templates::pick_motivation(&self.picker);
        let email = templates::render(
            NotificationKind::IntervalMotivation,
            &EmailContext {
                user_name: &candidate.user_name,
                challenge_title: &challenge.title,
                progress,
                public_url: &self.public_url,
                motivation,
            },
        );

        let send_result = self
            .mailer
            .send(&candidate.user_email, &email.subject, &email.html)
            .await;

        // The timestamp advances on success AND failure — this is the
        // at-most-one-per-window invariant and the tight-retry-loop brake.
        self.store.mark_interval_email_sent(challenge.id, now).await?;

        match send_result {
            Ok(()) => {
                let log = NotificationLog::sent(
                    challenge,
                    NotificationKind::IntervalMotivation,
                    &email.subject,
                );
                self.store.record_notification(&log).await?;
                Ok(Outcome::Sent)
            }
            Err(e) => {
                let log = NotificationLog::failed(
                    challenge,
                    NotificationKind::IntervalMotivation,
                    &email.subject,
                    &e.to_string(),
                );
                self.store.record_notification(&log).await?;
                tracing::warn!(challenge = %challenge.id, "send failed: {e}");
                Ok(Outcome::Failed)
            }
        }
    }
}

/// The current UTC calendar day as a half-open range. The day boundary is
/// deliberately explicit rather than server-local.
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bounds_cover_exactly_one_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let (start, end) = utc_day_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert!(start <= now && now < end);
    }

    #[test]
    fn test_day_bounds_just_before_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        let (start, end) = utc_day_bounds(now);
        assert_eq!(start.date_naive(), now.date_naive());
        assert!(now < end);
    }
}
