//! # Streakbeat Gateway
//!
//! The stateless driver for platforms without long-running processes: an
//! external cron caller POSTs to the trigger endpoint and the gateway runs
//! exactly one pass of the same pipeline the in-process timer uses.

pub mod routes;
pub mod server;

pub use server::{build_router, start, AppState};
