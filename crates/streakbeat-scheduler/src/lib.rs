//! # Streakbeat Scheduler
//!
//! The notification pipeline and its drivers. One shared `Pipeline` runs the
//! eligibility → expiry → duplicate-guard → dispatch → state-update sequence;
//! the long-lived `Scheduler` ticks it on a timer and the HTTP gateway
//! triggers the very same object once per request, so the two drivers cannot
//! drift apart.
//!
//! ```text
//! tick (timer or HTTP POST)
//!   ├── eligibility query        (active, notifications on, interval elapsed)
//!   ├── expiry filter            (past end date → silently excluded)
//!   ├── duplicate-send guard     (uploaded today → skip, still advance guard)
//!   ├── dispatch                 (motivational template → SMTP)
//!   └── state update             (timestamp + audit row, even on failure)
//! ```

pub mod driver;
pub mod pipeline;

pub use driver::{Scheduler, SchedulerStatus};
pub use pipeline::{Pipeline, TickSummary};
