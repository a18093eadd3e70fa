use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::error;

use cmcut::{
    BandPolicy, Opts, OutputType, OvershootPolicy, ProgramProperty, ProgramScenes, SearchMode,
    analyze_file, init_logging, write_scenes,
};

fn main() -> Result<()> {
    init_logging();
    let params = Params::parse();
    let opts = params.to_opts()?;

    // Recordings share nothing, so each one gets its own thread.
    let results: Vec<(PathBuf, cmcut::Result<ProgramScenes>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = params
            .inputs
            .iter()
            .map(|input| {
                let opts = &opts;
                scope.spawn(move || analyze_file(input, opts))
            })
            .collect();

        params
            .inputs
            .iter()
            .cloned()
            .zip(handles)
            .map(|(input, handle)| {
                let res = handle
                    .join()
                    .unwrap_or_else(|_| {
                        Err(cmcut::Error::Message("analysis thread panicked".into()))
                    });
                (input, res)
            })
            .collect()
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for (input, res) in results {
        match res {
            Ok(program) => {
                if params.inputs.len() > 1 && params.output_type == OutputType::Ffmpeg {
                    writeln!(out, "# {}", input.display())?;
                }
                let video = params.video_for(&input);
                write_scenes(&program, &mut out, &opts, &video)
                    .with_context(|| format!("failed to write scenes for {}", input.display()))?;
            }
            Err(err) => {
                error!(input = %input.display(), error = %err, "analysis failed");
                eprintln!("{}: {err}", input.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} recordings failed", params.inputs.len());
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "cmcut")]
#[command(about = "Find commercial breaks in recorded broadcasts and list the program scenes")]
struct Params {
    /// Audio extracted from the recordings (WAV, or anything Symphonia can decode).
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Program property JSON describing the expected commercial blocks.
    #[arg(short = 'p', long = "property", conflicts_with = "free")]
    property: Option<PathBuf>,

    /// Search for commercial runs without expected block structures.
    #[arg(long = "free", default_value_t = false)]
    free: bool,

    /// Minimum run of zero frames (exclusive) that counts as silence.
    #[arg(short = 's', long = "silence-frames")]
    silence_frames: Option<usize>,

    /// Frames per second of the loudness timeseries (defaults to the audio sample rate).
    #[arg(short = 'r', long = "frame-rate")]
    frame_rate: Option<f64>,

    /// Tolerance in seconds around every expected block length (overrides the property file).
    #[arg(short = 'm', long = "margin", conflicts_with = "free")]
    margin: Option<f64>,

    /// Extra ad-slot durations in seconds, added to the 15 s and 30 s baseline.
    #[arg(short = 'u', long = "unit", num_args = 1..)]
    units: Vec<f64>,

    /// Length of the closing program scene in seconds (0 = end at the last silence).
    #[arg(short = 't', long = "trailing")]
    trailing: Option<f64>,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Json
    )]
    output_type: OutputType,

    /// Source video the ffmpeg script cuts from (defaults to each input with a `.ts` extension).
    /// Only valid with a single input.
    #[arg(long = "video")]
    video: Option<PathBuf>,

    /// Reject gaps that land exactly on the upper edge of a unit's margin.
    #[arg(long = "exclusive-band", default_value_t = false)]
    exclusive_band: bool,

    /// After overshooting a block, keep the latest divider as the new anchor.
    #[arg(long = "retain-anchor", default_value_t = false)]
    retain_anchor: bool,
}

impl Params {
    fn to_opts(&self) -> Result<Opts> {
        if self.video.is_some() && self.inputs.len() > 1 {
            bail!("--video can only be used with a single input");
        }

        let mut opts = if self.free {
            Opts::free()
        } else {
            let mut property = match &self.property {
                Some(path) => ProgramProperty::from_path(path)?,
                None => ProgramProperty::default(),
            };
            if let Some(margin) = self.margin {
                property.margin_sec = margin;
            }
            property.into_opts()?
        };

        if let Some(frames) = self.silence_frames {
            opts.silence_frame_threshold = frames;
        }
        if let Some(rate) = self.frame_rate {
            if !(rate.is_finite() && rate > 0.0) {
                bail!("--frame-rate must be positive: {rate}");
            }
            opts.frame_rate = Some(rate);
        }
        for unit in &self.units {
            opts.duration_units = opts.duration_units.with(*unit)?;
        }
        if let Some(trailing) = self.trailing {
            match &mut opts.mode {
                SearchMode::Guided(guided) => {
                    if !(trailing.is_finite() && trailing >= 0.0) {
                        bail!("--trailing must be zero or positive: {trailing}");
                    }
                    guided.trailing_scene_duration_sec = trailing;
                }
                SearchMode::Free => bail!("--trailing only applies to structure-guided matching"),
            }
        }
        if self.exclusive_band {
            opts.policy.band = BandPolicy::Exclusive;
        }
        if self.retain_anchor {
            opts.policy.overshoot = OvershootPolicy::RetainLast;
        }
        opts.output_type = self.output_type;
        Ok(opts)
    }

    fn video_for(&self, input: &Path) -> PathBuf {
        self.video
            .clone()
            .unwrap_or_else(|| input.with_extension("ts"))
    }
}
