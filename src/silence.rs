//! Silence extraction over a loudness timeseries.

use crate::loudness::Loudness;
use crate::silent_interval::SilentInterval;
use crate::{Error, Result};

/// Scan `loudness` once and collect runs of zero-magnitude frames.
///
/// A run only counts when it is strictly longer than `silence_frame_threshold` frames and is
/// closed by a non-zero frame. A run still open when the audio ends is dropped: the recording
/// stopping mid-silence is not a boundary.
pub fn extract_silent_intervals(
    loudness: &Loudness,
    silence_frame_threshold: usize,
    frame_rate: f64,
) -> Result<Vec<SilentInterval>> {
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        return Err(Error::config(format!(
            "frame rate must be positive: {frame_rate}"
        )));
    }

    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;

    for (frame, value) in loudness.values().iter().enumerate() {
        if *value == 0.0 {
            run_start.get_or_insert(frame);
            continue;
        }

        if let Some(start) = run_start.take() {
            if frame - start > silence_frame_threshold {
                intervals.push(SilentInterval::new(start, frame, frame_rate)?);
            }
        }
    }

    if let Some(start) = run_start {
        tracing::trace!(
            start_frame = start,
            frames = loudness.len() - start,
            "ignoring trailing silence that runs to the end of the recording"
        );
    }

    Ok(intervals)
}
