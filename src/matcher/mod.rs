//! Commercial-break matching over classified silent intervals.
//!
//! Two strategies share the same divider classifier:
//! - [`match_structures`] walks a caller-supplied list of expected block compositions.
//! - [`search_runs`] finds bursts of ad-length gaps without knowing the block layout.

mod free;
mod guided;

use serde::Serialize;

pub use free::{FREE_SEARCH_MARGIN_SEC, search_runs};
pub use guided::{GuidedMatcher, match_structures};

pub use crate::silent_interval::BandPolicy;

/// A commercial span on the broadcast timeline, with any filler scene already cut out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommercialInterval {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl From<(f64, f64)> for CommercialInterval {
    fn from((start_sec, end_sec): (f64, f64)) -> Self {
        Self { start_sec, end_sec }
    }
}

/// What the guided matcher does with its candidate buffer after overshooting a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OvershootPolicy {
    /// Drop every accumulated candidate.
    #[default]
    Clear,

    /// Keep the most recent candidate as the anchor of the next attempt.
    RetainLast,
}

/// Boundary policies for the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchPolicy {
    pub band: BandPolicy,
    pub overshoot: OvershootPolicy,
}
