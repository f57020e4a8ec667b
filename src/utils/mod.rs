//! Utility types shared by the pipeline stages.
//!
//! This module provides:
//! - The per-request time budget (deadline + cancellation)
//! - Duration helpers for report metadata
//! - Regex compilation for static patterns
//! - Panic payload messages

mod budget;
mod panic;
mod patterns;
mod timing;

pub use budget::{RequestBudget, WaitOutcome};
pub use panic::panic_message;
pub(crate) use patterns::compile_regex_unsafe;
pub use timing::{duration_to_ms, epoch_millis};
