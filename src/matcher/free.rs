use tracing::debug;

use super::{BandPolicy, CommercialInterval};
use crate::duration_units::DurationUnitSet;
use crate::silent_interval::SilentInterval;

/// Tolerance used when no block structure is known.
pub const FREE_SEARCH_MARGIN_SEC: f64 = 1.0;

/// Find commercial spans as runs of consecutive divider candidates.
///
/// A run closes at the first non-candidate once it holds at least two candidates, and spans from
/// the end of its first candidate to the start of its last. A lone candidate does not close a run;
/// it stays buffered and becomes the head of the next one. A run still open at the end of the
/// scan is closed the same way.
pub fn search_runs(
    intervals: &[SilentInterval],
    units: &DurationUnitSet,
    band: BandPolicy,
) -> Vec<CommercialInterval> {
    let mut found = Vec::new();
    let mut candidates: Vec<&SilentInterval> = Vec::new();
    let mut continuity = false;

    for (index, interval) in intervals.iter().enumerate() {
        let following = &intervals[index + 1..];
        if interval.is_divider_candidate_with(following, units, FREE_SEARCH_MARGIN_SEC, band) {
            candidates.push(interval);
            continuity = true;
            continue;
        }

        if continuity && candidates.len() >= 2 {
            found.push(close_run(&candidates));
            candidates.clear();
            continuity = false;
        }
    }

    if candidates.len() >= 2 {
        found.push(close_run(&candidates));
    }

    found
}

fn close_run(candidates: &[&SilentInterval]) -> CommercialInterval {
    let first = candidates[0];
    let last = candidates[candidates.len() - 1];
    let span = CommercialInterval {
        start_sec: first.end_sec(),
        end_sec: last.start_sec(),
    };
    debug!(
        start_sec = span.start_sec,
        end_sec = span.end_sec,
        dividers = candidates.len(),
        "closed commercial run"
    );
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(start: f64, end: f64) -> SilentInterval {
        SilentInterval::new((start * 100.0) as usize, (end * 100.0) as usize, 100.0)
            .expect("valid interval")
    }

    fn spans(found: &[CommercialInterval]) -> Vec<(f64, f64)> {
        found.iter().map(|c| (c.start_sec, c.end_sec)).collect()
    }

    #[test]
    fn closes_a_run_at_the_first_non_candidate() {
        let intervals = [
            secs(40.0, 40.25),
            secs(100.0, 100.25),
            secs(115.25, 115.5),
            secs(130.5, 130.75),
            secs(160.75, 161.0),
            secs(250.0, 250.25),
        ];
        let found = search_runs(&intervals, &DurationUnitSet::default(), BandPolicy::default());
        assert_eq!(spans(&found), vec![(100.25, 130.5)]);
    }

    #[test]
    fn last_interval_closes_the_run() {
        // Every interval but the last is a candidate; the last one has nothing after it.
        let intervals = [secs(0.0, 0.25), secs(15.25, 15.5), secs(30.5, 30.75)];
        let found = search_runs(&intervals, &DurationUnitSet::default(), BandPolicy::default());
        assert_eq!(spans(&found), vec![(0.25, 15.25)]);
    }

    #[test]
    fn a_single_candidate_never_forms_a_run() {
        let intervals = [secs(0.0, 0.25), secs(15.25, 15.5), secs(200.0, 200.25)];
        let found = search_runs(&intervals, &DurationUnitSet::default(), BandPolicy::default());
        assert!(found.is_empty());
    }

    #[test]
    fn stray_candidate_is_carried_into_the_next_run() {
        // 0.0 is a candidate (via 15.25), 15.25 is not, so the stray stays buffered and the run
        // that starts at 100.0 is reported from the stray's end.
        let intervals = [
            secs(0.0, 0.25),
            secs(15.25, 15.5),
            secs(100.0, 100.25),
            secs(115.25, 115.5),
            secs(200.0, 200.25),
        ];
        let found = search_runs(&intervals, &DurationUnitSet::default(), BandPolicy::default());
        assert_eq!(spans(&found), vec![(0.25, 100.0)]);
    }
}
