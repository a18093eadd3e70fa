use std::io::{Read, Seek};

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec};

/// Read WAV audio and return per-frame magnitudes plus the WAV spec.
///
/// What we return:
/// - one magnitude per frame: the peak `|sample|` across channels, in the file's own units
///   (integer PCM is not normalized, so a zero stays an exact zero)
/// - the `WavSpec`, whose `sample_rate` is the frame rate of the magnitudes
pub fn magnitudes_from_wav_reader<R>(reader: R) -> Result<(Vec<f32>, WavSpec)>
where
    R: Read + Seek,
{
    let mut reader = WavReader::new(reader).context("failed to read WAV data from reader")?;
    let spec = reader.spec();

    if spec.channels == 0 {
        bail!("WAV header declares zero channels");
    }
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v.unsigned_abs() as f32))
            .collect::<std::result::Result<_, _>>()
            .context("failed to decode integer WAV samples")?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f32::abs))
            .collect::<std::result::Result<_, _>>()
            .context("failed to decode float WAV samples")?,
    };

    Ok((peak_per_frame(&samples, channels), spec))
}

/// Collapse interleaved magnitudes to one value per frame.
///
/// Policy: peak across channels, so a frame is silent only when every channel is silent.
/// A trailing partial frame is dropped.
pub(crate) fn peak_per_frame(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().copied().fold(0.0, f32::max))
        .collect()
}
