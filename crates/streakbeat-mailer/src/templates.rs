//! HTML email templates, one per notification kind.
//!
//! Every template renders a complete standalone HTML document with inline
//! styles (email clients strip stylesheets). The scheduler only dispatches
//! `IntervalMotivation`; the sibling kinds are rendered by other application
//! flows through the same `render` entry point.

use std::sync::Arc;

use rand::Rng;

use streakbeat_core::types::{ChallengeProgress, NotificationKind};

/// A subject line plus a complete HTML document.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Everything a template can reference.
#[derive(Debug, Clone)]
pub struct EmailContext<'a> {
    pub user_name: &'a str,
    pub challenge_title: &'a str,
    pub progress: ChallengeProgress,
    /// Base URL for the dashboard CTA link.
    pub public_url: &'a str,
    /// Motivational variant, already picked. Ignored by non-motivational
    /// kinds.
    pub motivation: &'a str,
}

/// Picks which motivational variant to use, given the variant count.
/// Injectable so tests can pin a fixed index.
pub type MotivationPicker = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Default picker — uniform random variant.
pub fn random_picker() -> MotivationPicker {
    Arc::new(|n| rand::thread_rng().gen_range(0..n))
}

/// Fixed motivational message variants for the recurring interval email.
const MOTIVATION_MESSAGES: &[&str] = &[
    "Every upload is a brick in the channel you're building. Lay one today.",
    "Your streak is watching you. Don't let it down.",
    "Consistency beats talent when talent doesn't show up. Show up.",
    "One video today keeps the algorithm in play.",
    "The hardest part is pressing record. The rest is momentum.",
    "Small daily wins compound into channels people subscribe to.",
];

/// Pick today's motivational variant through the injected strategy.
pub fn pick_motivation(picker: &MotivationPicker) -> &'static str {
    let idx = (**picker)(MOTIVATION_MESSAGES.len()) % MOTIVATION_MESSAGES.len();
    MOTIVATION_MESSAGES[idx]
}

/// Render the template for a notification kind.
pub fn render(kind: NotificationKind, ctx: &EmailContext<'_>) -> RenderedEmail {
    match kind {
        NotificationKind::Welcome => welcome(ctx),
        NotificationKind::UploadReminder => upload_reminder(ctx),
        NotificationKind::StreakMilestone => streak_milestone(ctx),
        NotificationKind::ChallengeCompleted => challenge_completed(ctx),
        NotificationKind::UploadConfirmation => upload_confirmation(ctx),
        NotificationKind::MissedUpload => missed_upload(ctx),
        NotificationKind::MorningReminder => morning_reminder(ctx),
        NotificationKind::IntervalMotivation => interval_motivation(ctx),
    }
}

/// Shared document frame.
fn layout(heading: &str, body: &str, public_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f4f4f7;font-family:Helvetica,Arial,sans-serif;">
  <div style="max-width:560px;margin:0 auto;padding:24px;">
    <div style="background:#ffffff;border-radius:8px;padding:32px;">
      <h1 style="margin:0 0 16px;font-size:22px;color:#1a1a2e;">{heading}</h1>
      {body}
      <div style="margin-top:24px;">
        <a href="{public_url}/dashboard" style="display:inline-block;background:#e63946;color:#ffffff;text-decoration:none;padding:12px 24px;border-radius:6px;font-weight:bold;">Open your dashboard</a>
      </div>
    </div>
    <p style="text-align:center;color:#8a8a9e;font-size:12px;margin-top:16px;">Streakbeat — keep the uploads coming.</p>
  </div>
</body>
</html>"#
    )
}

/// Stats block shared by the progress-bearing templates.
fn stats_table(progress: &ChallengeProgress) -> String {
    format!(
        r#"<table style="width:100%;border-collapse:collapse;margin:16px 0;">
        <tr><td style="padding:6px 0;color:#555;">Videos uploaded</td><td style="text-align:right;font-weight:bold;">{}</td></tr>
        <tr><td style="padding:6px 0;color:#555;">Videos remaining</td><td style="text-align:right;font-weight:bold;">{}</td></tr>
        <tr><td style="padding:6px 0;color:#555;">Days remaining</td><td style="text-align:right;font-weight:bold;">{}</td></tr>
        <tr><td style="padding:6px 0;color:#555;">Current streak</td><td style="text-align:right;font-weight:bold;">{} 🔥</td></tr>
        <tr><td style="padding:6px 0;color:#555;">Points</td><td style="text-align:right;font-weight:bold;">{}</td></tr>
      </table>"#,
        progress.videos_uploaded,
        progress.videos_remaining,
        progress.days_remaining,
        progress.current_streak,
        progress.points,
    )
}

fn welcome(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p>Your challenge <strong>{title}</strong> is live. Upload on schedule,
        keep the streak alive, and we'll track the rest.</p>"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
    );
    RenderedEmail {
        subject: format!("Welcome to your challenge: {}", ctx.challenge_title),
        html: layout("Challenge started 🚀", &body, ctx.public_url),
    }
}

fn upload_reminder(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p>No upload yet today for <strong>{title}</strong>. There's still time
        to keep the streak going.</p>{stats}"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!("⏰ Upload reminder — {}", ctx.challenge_title),
        html: layout("Today's upload is waiting", &body, ctx.public_url),
    }
}

fn streak_milestone(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p>You just hit a <strong>{streak}-day streak</strong> on
        <strong>{title}</strong>. That's real consistency.</p>{stats}"#,
        user = ctx.user_name,
        streak = ctx.progress.current_streak,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!(
            "🔥 {}-day streak on {}",
            ctx.progress.current_streak, ctx.challenge_title
        ),
        html: layout("Streak milestone!", &body, ctx.public_url),
    }
}

fn challenge_completed(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p><strong>{title}</strong> is complete. {uploaded} videos, {points}
        points. Take the win.</p>"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
        uploaded = ctx.progress.videos_uploaded,
        points = ctx.progress.points,
    );
    RenderedEmail {
        subject: format!("🏆 Challenge complete: {}", ctx.challenge_title),
        html: layout("You did it", &body, ctx.public_url),
    }
}

fn upload_confirmation(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p>Upload recorded for <strong>{title}</strong>. Streak safe for
        another day.</p>{stats}"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!("✅ Upload counted — {}", ctx.challenge_title),
        html: layout("Upload confirmed", &body, ctx.public_url),
    }
}

fn missed_upload(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p>Yesterday slipped by without an upload for
        <strong>{title}</strong>. Your streak reset, but the challenge hasn't —
        today is a clean start.</p>{stats}"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!("Missed a day on {}", ctx.challenge_title),
        html: layout("Streak reset", &body, ctx.public_url),
    }
}

fn morning_reminder(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Good morning {user},</p>
        <p>Today's deadline for <strong>{title}</strong> is coming up. Plan
        the upload before the day gets away from you.</p>{stats}"#,
        user = ctx.user_name,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!("🌅 Today's deadline — {}", ctx.challenge_title),
        html: layout("Deadline today", &body, ctx.public_url),
    }
}

fn interval_motivation(ctx: &EmailContext<'_>) -> RenderedEmail {
    let body = format!(
        r#"<p>Hi {user},</p>
        <p style="font-size:16px;font-style:italic;color:#1a1a2e;">"{motivation}"</p>
        <p>Here's where <strong>{title}</strong> stands right now:</p>{stats}"#,
        user = ctx.user_name,
        motivation = ctx.motivation,
        title = ctx.challenge_title,
        stats = stats_table(&ctx.progress),
    );
    RenderedEmail {
        subject: format!("Keep going — {}", ctx.challenge_title),
        html: layout("Your challenge check-in", &body, ctx.public_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EmailContext<'static> {
        EmailContext {
            user_name: "Ada",
            challenge_title: "60 shorts in 60 days",
            progress: ChallengeProgress {
                videos_uploaded: 12,
                videos_remaining: 48,
                days_remaining: 47,
                current_streak: 5,
                points: 240,
            },
            public_url: "https://app.example.com",
            motivation: "Show up.",
        }
    }

    #[test]
    fn test_interval_motivation_embeds_stats_and_message() {
        let email = render(NotificationKind::IntervalMotivation, &ctx());
        assert!(email.subject.contains("60 shorts in 60 days"));
        assert!(email.html.contains("Show up."));
        assert!(email.html.contains(">12<"));
        assert!(email.html.contains(">48<"));
        assert!(email.html.contains(">47<"));
        assert!(email.html.contains("240"));
    }

    #[test]
    fn test_every_kind_renders_a_full_document() {
        let kinds = [
            NotificationKind::Welcome,
            NotificationKind::UploadReminder,
            NotificationKind::StreakMilestone,
            NotificationKind::ChallengeCompleted,
            NotificationKind::UploadConfirmation,
            NotificationKind::MissedUpload,
            NotificationKind::MorningReminder,
            NotificationKind::IntervalMotivation,
        ];
        let c = ctx();
        for kind in kinds {
            let email = render(kind, &c);
            assert!(email.html.starts_with("<!DOCTYPE html>"), "{kind:?}");
            assert!(email.html.contains("</html>"), "{kind:?}");
            assert!(email.html.contains("Ada"), "{kind:?}");
            assert!(
                email.html.contains("https://app.example.com/dashboard"),
                "{kind:?}"
            );
            assert!(!email.subject.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn test_pinned_picker_is_deterministic() {
        let picker: MotivationPicker = Arc::new(|_| 2);
        assert_eq!(pick_motivation(&picker), MOTIVATION_MESSAGES[2]);
        assert_eq!(pick_motivation(&picker), MOTIVATION_MESSAGES[2]);
    }

    #[test]
    fn test_random_picker_stays_in_range() {
        let picker = random_picker();
        for _ in 0..100 {
            let msg = pick_motivation(&picker);
            assert!(MOTIVATION_MESSAGES.contains(&msg));
        }
    }
}
