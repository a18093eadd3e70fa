//! Library of expected commercial gap durations.

use crate::{Error, Result};

/// Ad-slot lengths (seconds) every unit set starts from.
pub const BASELINE_DURATION_UNITS: [f64; 2] = [15.0, 30.0];

/// Sorted, deduplicated set of strictly positive durations in seconds.
///
/// The set is never mutated in place: [`with`](Self::with) and [`without`](Self::without)
/// return new sets.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationUnitSet {
    durations_sec: Vec<f64>,
}

impl DurationUnitSet {
    /// Seed the baseline units and merge `additional` into them.
    pub fn new(additional: &[f64]) -> Result<Self> {
        let mut set = Self::default();
        for value in additional {
            set = set.with(*value)?;
        }
        Ok(set)
    }

    /// Return a new set that also contains `duration_sec`.
    ///
    /// Adding a value that is already present returns an equal set.
    pub fn with(&self, duration_sec: f64) -> Result<Self> {
        validate_duration(duration_sec)?;

        let mut durations_sec = self.durations_sec.clone();
        if !durations_sec.contains(&duration_sec) {
            durations_sec.push(duration_sec);
            durations_sec.sort_by(f64::total_cmp);
        }
        Ok(Self { durations_sec })
    }

    /// Return a new set without `duration_sec`.
    ///
    /// Fails when removing the value would leave the set empty.
    pub fn without(&self, duration_sec: f64) -> Result<Self> {
        let durations_sec: Vec<f64> = self
            .durations_sec
            .iter()
            .copied()
            .filter(|d| *d != duration_sec)
            .collect();
        if durations_sec.is_empty() {
            return Err(Error::config("duration unit set must not be empty"));
        }
        Ok(Self { durations_sec })
    }

    pub fn contains(&self, duration_sec: f64) -> bool {
        self.durations_sec.contains(&duration_sec)
    }

    /// Largest unit. Bounds the classifier's forward search window.
    pub fn max(&self) -> f64 {
        // Non-empty by construction.
        self.durations_sec.last().copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.durations_sec.iter().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.durations_sec
    }

    pub fn len(&self) -> usize {
        self.durations_sec.len()
    }

    /// Always `false`; every set keeps at least one unit.
    pub fn is_empty(&self) -> bool {
        self.durations_sec.is_empty()
    }
}

impl Default for DurationUnitSet {
    fn default() -> Self {
        Self {
            durations_sec: BASELINE_DURATION_UNITS.to_vec(),
        }
    }
}

fn validate_duration(duration_sec: f64) -> Result<()> {
    if !duration_sec.is_finite() || duration_sec <= 0.0 {
        return Err(Error::config(format!(
            "duration units must be positive numbers: {duration_sec}"
        )));
    }
    Ok(())
}
