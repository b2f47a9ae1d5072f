//! # Streakbeat DB
//!
//! Postgres persistence via sqlx. The scheduler reads `user_challenges`,
//! `challenge_uploads`, and `users`; its only writes are
//! `user_challenges.last_interval_email_sent` and inserts into
//! `challenge_notifications`.

pub mod store;

pub use store::PgStore;
