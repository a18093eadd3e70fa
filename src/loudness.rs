//! Per-frame loudness timeseries of a recording.
//!
//! A frame's loudness is its absolute sample magnitude. Only exact zeros count as silence
//! downstream, so producers must not smooth or resample the signal.

use crate::{Error, Result};

/// Validated, non-empty sequence of non-negative per-frame magnitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct Loudness {
    values: Vec<f32>,
    frame_rate: f64,
}

impl Loudness {
    /// Build a timeseries from raw magnitudes sampled at `frame_rate` frames per second.
    ///
    /// Fails with an input error when `values` is empty or holds a negative or non-finite
    /// sample, and with a configuration error when `frame_rate` is not positive.
    pub fn new(values: Vec<f32>, frame_rate: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::input("loudness sequence is empty"));
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(Error::config(format!(
                "frame rate must be positive: {frame_rate}"
            )));
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(Error::input(format!(
                "loudness must be a non-negative number, got {value} at frame {index}"
            )));
        }

        Ok(Self { values, frame_rate })
    }

    /// Build a timeseries from signed PCM samples by taking their magnitude.
    pub fn from_pcm_i16(samples: &[i16], frame_rate: f64) -> Result<Self> {
        let values = samples
            .iter()
            .map(|s| (*s as i32).unsigned_abs() as f32)
            .collect();
        Self::new(values, frame_rate)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length of the recording in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.values.len() as f64 / self.frame_rate
    }
}
