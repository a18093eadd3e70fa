use serde::Serialize;

use crate::duration_units::DurationUnitSet;
use crate::{Error, Result};

/// A run of zero-magnitude frames long enough to be a possible commercial boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilentInterval {
    start_sec: f64,
    end_sec: f64,
    frame_rate: f64,
}

/// How the classifier treats the edges of the `(unit, unit + margin)` band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandPolicy {
    /// `unit < gap <= unit + margin`.
    #[default]
    UpperInclusive,

    /// `unit < gap < unit + margin`.
    Exclusive,
}

impl BandPolicy {
    fn contains(self, unit: f64, margin_sec: f64, gap: f64) -> bool {
        match self {
            BandPolicy::UpperInclusive => unit < gap && gap <= unit + margin_sec,
            BandPolicy::Exclusive => unit < gap && gap < unit + margin_sec,
        }
    }
}

impl SilentInterval {
    /// Build an interval from frame indices.
    ///
    /// `end_frame` is exclusive: the first non-silent frame after the run.
    pub fn new(start_frame: usize, end_frame: usize, frame_rate: f64) -> Result<Self> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(Error::config(format!(
                "frame rate must be positive: {frame_rate}"
            )));
        }
        if start_frame >= end_frame {
            return Err(Error::input(format!(
                "start frame must be before end frame: {start_frame} {end_frame}"
            )));
        }

        Ok(Self {
            start_sec: start_frame as f64 / frame_rate,
            end_sec: end_frame as f64 / frame_rate,
            frame_rate,
        })
    }

    pub fn start_sec(&self) -> f64 {
        self.start_sec
    }

    pub fn end_sec(&self) -> f64 {
        self.end_sec
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn center_sec(&self) -> f64 {
        (self.start_sec + self.end_sec) / 2.0
    }

    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Whether some later silence sits one known ad-slot length away from this one.
    ///
    /// `following` must be the intervals after `self`, in order. The gap to each is measured
    /// from this interval's start to the other's end; scanning stops once the gap reaches
    /// `units.max() + margin_sec`, since gaps only grow from there.
    pub fn is_divider_candidate(
        &self,
        following: &[SilentInterval],
        units: &DurationUnitSet,
        margin_sec: f64,
    ) -> bool {
        self.is_divider_candidate_with(following, units, margin_sec, BandPolicy::default())
    }

    /// [`is_divider_candidate`](Self::is_divider_candidate) with an explicit band policy.
    pub fn is_divider_candidate_with(
        &self,
        following: &[SilentInterval],
        units: &DurationUnitSet,
        margin_sec: f64,
        band: BandPolicy,
    ) -> bool {
        let horizon = units.max() + margin_sec;

        for other in following {
            let gap = other.end_sec - self.start_sec;
            if gap >= horizon {
                break;
            }
            if units.iter().any(|unit| band.contains(unit, margin_sec, gap)) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(start: f64, end: f64) -> SilentInterval {
        // 100 frames per second keeps quarter seconds exact.
        SilentInterval::new((start * 100.0) as usize, (end * 100.0) as usize, 100.0)
            .expect("valid interval")
    }

    #[test]
    fn converts_frames_to_seconds() -> anyhow::Result<()> {
        let interval = SilentInterval::new(0, 16000, 8000.0)?;
        assert_eq!(interval.start_sec(), 0.0);
        assert_eq!(interval.end_sec(), 2.0);
        assert_eq!(interval.duration_sec(), 2.0);
        assert_eq!(interval.center_sec(), 1.0);
        Ok(())
    }

    #[test]
    fn rejects_bad_frames_and_rates() {
        assert!(SilentInterval::new(10, 10, 8000.0).unwrap_err().is_input());
        assert!(SilentInterval::new(11, 10, 8000.0).unwrap_err().is_input());
        let err = SilentInterval::new(0, 10, -1.0).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("frame rate must be positive"));
    }

    #[test]
    fn matches_when_a_later_silence_is_one_unit_away() -> anyhow::Result<()> {
        let target = secs(0.0, 0.25);
        let following = [secs(1.0, 1.05), secs(2.0, 2.05)];

        let units = DurationUnitSet::new(&[1.0, 2.0])?;
        assert!(target.is_divider_candidate(&following, &units, 0.1));

        let units = DurationUnitSet::new(&[0.5])?;
        assert!(!target.is_divider_candidate(&following, &units, 0.1));
        Ok(())
    }

    #[test]
    fn upper_band_edge_depends_on_policy() -> anyhow::Result<()> {
        // gap == unit + margin exactly: 15.0 + 1.0 == 16.0
        let target = secs(100.0, 100.25);
        let following = [secs(115.75, 116.0)];
        let units = DurationUnitSet::default();

        assert!(target.is_divider_candidate_with(
            &following,
            &units,
            1.0,
            BandPolicy::UpperInclusive
        ));
        assert!(!target.is_divider_candidate_with(&following, &units, 1.0, BandPolicy::Exclusive));
        Ok(())
    }

    #[test]
    fn lower_band_edge_is_exclusive_under_both_policies() {
        // gap == unit exactly: 15.0
        let target = secs(100.0, 100.25);
        let following = [secs(114.75, 115.0)];
        let units = DurationUnitSet::default();

        for band in [BandPolicy::UpperInclusive, BandPolicy::Exclusive] {
            assert!(!target.is_divider_candidate_with(&following, &units, 1.0, band));
        }
    }

    #[test]
    fn stops_scanning_past_the_largest_unit() {
        // The first follower is already beyond 30 + 1, so the matching one after it is never seen.
        let target = secs(0.0, 0.25);
        let following = [secs(40.0, 40.25), secs(15.25, 15.5)];
        assert!(!target.is_divider_candidate(&following, &DurationUnitSet::default(), 1.0));
    }
}
