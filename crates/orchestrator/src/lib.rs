//! Orchestrator - probe scheduling and ordered result collection

mod orchestrator;
mod progress;
mod rate_limiter;
mod slots;

pub use orchestrator::Orchestrator;
pub use progress::ProgressTracker;
pub use rate_limiter::Pacer;
pub use slots::{ResultSlots, ABORTED_PROBE};
