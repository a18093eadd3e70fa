//! Decode media (audio/video containers) into per-frame magnitudes with Symphonia.
//!
//! Unlike a transcription front-end we never resample or normalize: silence detection looks for
//! runs of exact zeros, and interpolation would smear them away. Samples are converted to `i16`
//! and reduced to the peak magnitude across channels, at the source sample rate.
//!
//! Error policy:
//! - corrupt frames (`DecodeError`) are skipped
//! - IO errors while reading or decoding are treated as end of stream
//! - anything else aborts with context

use std::fs::File;
use std::io::Read;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::wav::peak_per_frame;

/// Consumer of decoded per-frame magnitudes.
///
/// Returning `Ok(false)` stops decoding early.
pub trait MagnitudeSink {
    fn on_magnitudes(&mut self, magnitudes: &[f32], sample_rate: u32) -> Result<bool>;
}

/// Decode configuration.
#[derive(Debug, Clone, Default)]
pub struct DecodeOpts {
    /// Optional container hint (e.g. "ts", "mp4", "mkv", "wav").
    /// Improves probing, especially for unseekable streams.
    pub hint_extension: Option<String>,
}

/// Fully decoded magnitudes of one input.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMagnitudes {
    pub values: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode an unseekable stream (stdin, sockets) into magnitudes.
///
/// Containers that keep their index at the end (some MP4/MOV files) need
/// [`decode_magnitudes_from_file`] instead.
pub fn decode_magnitudes_from_read<R>(reader: R, opts: &DecodeOpts) -> Result<DecodedMagnitudes>
where
    R: Read + Send + 'static,
{
    let source = ReadOnlySource::new(SyncRead(Mutex::new(reader)));
    collect(Box::new(source), opts)
}

/// Decode a seekable file into magnitudes.
pub fn decode_magnitudes_from_file(file: File, opts: &DecodeOpts) -> Result<DecodedMagnitudes> {
    collect(Box::new(file), opts)
}

/// Decode `source`, handing magnitudes to `sink` packet by packet.
pub fn decode_to_sink(
    source: Box<dyn MediaSource>,
    opts: &DecodeOpts,
    sink: &mut dyn MagnitudeSink,
) -> Result<()> {
    let (mut format, track) = open_default_track(source, opts.hint_extension.as_deref())?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")?;
    let mut scratch: Option<SampleBuffer<i16>> = None;

    while let Some(packet) = read_packet(&mut format)? {
        if packet.track_id() != track.id {
            continue;
        }

        let Some(decoded) = decode_packet(&mut decoder, &packet)? else {
            continue;
        };

        let sample_rate = decoded.spec().rate;
        let magnitudes = frame_magnitudes(decoded, &mut scratch)?;
        if !sink.on_magnitudes(&magnitudes, sample_rate)? {
            break;
        }
    }

    Ok(())
}

fn collect(source: Box<dyn MediaSource>, opts: &DecodeOpts) -> Result<DecodedMagnitudes> {
    let mut sink = CollectingSink::default();
    decode_to_sink(source, opts, &mut sink)?;

    let Some(sample_rate) = sink.sample_rate else {
        bail!("no audio frames decoded");
    };
    Ok(DecodedMagnitudes {
        values: sink.values,
        sample_rate,
    })
}

/// Probe the container and pick the first decodable track with a known sample rate.
fn open_default_track(
    source: Box<dyn MediaSource>,
    hint_extension: Option<&str>,
) -> Result<(Box<dyn FormatReader>, Track)> {
    // Power-of-two buffer above 32 KiB, as Symphonia's prober expects.
    let stream = MediaSourceStream::new(
        source,
        MediaSourceStreamOptions {
            buffer_len: 256 * 1024,
        },
    );

    let mut hint = Hint::new();
    if let Some(ext) = hint_extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .context("failed to probe media stream")?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    Ok((format, track))
}

fn read_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}

fn decode_packet<'d>(
    decoder: &'d mut Box<dyn Decoder>,
    packet: &Packet,
) -> Result<Option<AudioBufferRef<'d>>> {
    match decoder.decode(packet) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(SymphoniaError::DecodeError(_)) | Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("decoder failure"),
    }
}

/// Convert a decoded buffer into one magnitude per frame.
fn frame_magnitudes(
    decoded: AudioBufferRef<'_>,
    scratch: &mut Option<SampleBuffer<i16>>,
) -> Result<Vec<f32>> {
    let spec = *decoded.spec();
    let channels = spec.channels.count();
    if channels == 0 {
        bail!("decoded audio had zero channels");
    }

    let needed = decoded.capacity() * channels;
    if scratch.as_ref().is_none_or(|buf| buf.capacity() < needed) {
        *scratch = Some(SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
    }
    let buf = scratch
        .as_mut()
        .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
    buf.copy_interleaved_ref(decoded);

    let magnitudes: Vec<f32> = buf
        .samples()
        .iter()
        .map(|s| (*s as i32).unsigned_abs() as f32)
        .collect();
    Ok(peak_per_frame(&magnitudes, channels))
}

#[derive(Default)]
struct CollectingSink {
    values: Vec<f32>,
    sample_rate: Option<u32>,
}

impl MagnitudeSink for CollectingSink {
    fn on_magnitudes(&mut self, magnitudes: &[f32], sample_rate: u32) -> Result<bool> {
        match self.sample_rate {
            None => self.sample_rate = Some(sample_rate),
            Some(rate) if rate != sample_rate => {
                bail!("sample rate changed mid-stream: {rate} Hz -> {sample_rate} Hz")
            }
            Some(_) => {}
        }
        self.values.extend_from_slice(magnitudes);
        Ok(true)
    }
}

/// Lets a `Read + Send` input satisfy Symphonia's `Sync` bound. The reader is only ever used by
/// the decoding thread.
struct SyncRead<R>(Mutex<R>);

impl<R: Read> Read for SyncRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0
            .get_mut()
            .map_err(|_| std::io::Error::other("decoder input mutex poisoned"))?
            .read(buf)
    }
}
