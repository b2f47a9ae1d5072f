//! # Streakbeat Core
//!
//! Shared foundation for all streakbeat crates: domain types (challenges,
//! uploads, notification audit log), the configuration system, the error
//! type, and the traits that seam the notification pipeline off from its
//! collaborators (database, SMTP transport).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::StreakbeatConfig;
pub use error::{Result, StreakbeatError};
pub use traits::{ChallengeStore, MailTransport};
pub use types::{
    Challenge, ChallengeProgress, ChallengeStatus, EligibleChallenge, NotificationKind,
    NotificationLog, NotificationStatus, UploadRecord,
};
