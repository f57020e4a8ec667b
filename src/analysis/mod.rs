//! Evidence evaluation and the end-to-end analysis pipeline.
//!
//! The reputation verdict and the security score are computed independently
//! from the same evidence and are not reconciled with each other.

mod assemble;
mod pipeline;
mod recommendations;
mod reputation;
mod scoring;

pub use assemble::{assemble_report, sources_used, Findings};
pub use pipeline::{Analyzer, Collaborators};
pub use recommendations::build_recommendations;
pub use reputation::build_reputation;
pub use scoring::{calculate_score, classify_risk};

/// `count * each`, but never more than `cap`.
fn capped_penalty(count: usize, each: u32, cap: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(each)
        .min(cap)
}
