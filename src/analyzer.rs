//! High-level entry points: decode a recording, find its program scenes, encode the result.
//!
//! Each call owns all of its state, so separate recordings can be analyzed on separate threads
//! without coordination.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::Result;
use crate::decoder::{DecodeOpts, decode_magnitudes_from_file};
use crate::ffmpeg_encoder::FfmpegScriptEncoder;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::loudness::Loudness;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::scene_encoder::SceneEncoder;
use crate::scenes::ProgramScenes;
use crate::wav::magnitudes_from_wav_reader;

/// Decode the audio at `path` into a loudness timeseries.
///
/// `.wav` files are read directly with `hound`; anything else goes through Symphonia.
pub fn load_loudness(path: impl AsRef<Path>) -> Result<Loudness> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let (values, sample_rate) = if extension.as_deref() == Some("wav") {
        let (values, spec) = magnitudes_from_wav_reader(BufReader::new(file))
            .with_context(|| format!("failed to read {}", path.display()))?;
        (values, spec.sample_rate)
    } else {
        let opts = DecodeOpts {
            hint_extension: extension,
        };
        let decoded = decode_magnitudes_from_file(file, &opts)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        (decoded.values, decoded.sample_rate)
    };

    Loudness::new(values, sample_rate as f64)
}

/// Analyze the recording at `path` and return its program scenes.
pub fn analyze_file(path: impl AsRef<Path>, opts: &Opts) -> Result<ProgramScenes> {
    let path = path.as_ref();
    let loudness = load_loudness(path)?;
    let program = ProgramScenes::construct(&loudness, opts)?;

    info!(
        input = %path.display(),
        recording_sec = loudness.duration_sec(),
        commercials = program.commercials.len(),
        scenes = program.scenes.len(),
        program_sec = program.total_duration_sec(),
        "analyzed recording"
    );
    Ok(program)
}

/// Write `program` to `w` in the format selected by `opts.output_type`.
///
/// `video` is the source video the ffmpeg script cuts from; it is ignored for JSON output.
pub fn write_scenes<W: Write>(
    program: &ProgramScenes,
    w: W,
    opts: &Opts,
    video: &Path,
) -> Result<()> {
    let writer = BufWriter::new(w);

    match opts.output_type {
        OutputType::Json => {
            let mut encoder = JsonArrayEncoder::new(writer);
            let run_res = encode_all(program, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Ffmpeg => {
            let mut encoder = FfmpegScriptEncoder::new(writer, video)?;
            let run_res = encode_all(program, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

fn encode_all<E: SceneEncoder>(program: &ProgramScenes, encoder: &mut E) -> Result<()> {
    for scene in &program.scenes {
        encoder.write_scene(scene)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(crate::Error::msg(format!(
            "{err} (and closing the encoder failed: {close_err})"
        ))),
    }
}
