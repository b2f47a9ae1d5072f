//! # Streakbeat Mailer
//!
//! Outbound email: an async SMTP transport (lettre, STARTTLS) and the HTML
//! template set for every notification kind the service sends. The
//! motivational-message variant picker is injectable so tests stay
//! deterministic.

pub mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;
pub use templates::{
    pick_motivation, random_picker, render, EmailContext, MotivationPicker, RenderedEmail,
};
