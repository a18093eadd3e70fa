use crate::composition::BlockComposition;
use crate::duration_units::DurationUnitSet;
use crate::matcher::MatchPolicy;
use crate::output_type::OutputType;
use crate::{Error, Result};

/// Silence threshold (frames) used when matching against known block structures.
pub const DEFAULT_GUIDED_SILENCE_FRAMES: usize = 4000;

/// Silence threshold (frames) used by the structure-free search.
pub const DEFAULT_FREE_SILENCE_FRAMES: usize = 5000;

/// Margin applied to every block composition unless configured otherwise.
pub const DEFAULT_MARGIN_SEC: f64 = 3.5;

/// Length of the closing program scene, in seconds.
pub const DEFAULT_END_SCENE_DURATION_SEC: f64 = 15.0;

/// Length of each of the default expected commercial blocks.
pub const DEFAULT_BLOCK_DURATION_SEC: f64 = 60.0;

/// Number of default expected commercial blocks.
pub const DEFAULT_BLOCK_COUNT: usize = 3;

/// Options that control how a recording is analyzed.
///
/// This is library-level configuration, not CLI flags. Frontends (the CLI, property files,
/// tests) map their input into this type.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Minimum number of consecutive zero frames that make a silence (exclusive).
    pub silence_frame_threshold: usize,

    /// Frames per second of the loudness timeseries.
    ///
    /// When `None`, the rate reported by the decoder is used.
    pub frame_rate: Option<f64>,

    /// Expected gap durations between dividers.
    pub duration_units: DurationUnitSet,

    /// Structure-guided or structure-free matching.
    pub mode: SearchMode,

    /// Boundary policies of the matcher.
    pub policy: MatchPolicy,

    /// The desired output format for the scene list.
    pub output_type: OutputType,
}

#[derive(Debug, Clone)]
pub enum SearchMode {
    /// Match against an ordered list of expected commercial blocks.
    Guided(GuidedOpts),

    /// Treat every burst of ad-length gaps as a commercial break.
    Free,
}

#[derive(Debug, Clone)]
pub struct GuidedOpts {
    /// Expected commercial blocks, in broadcast order.
    pub structures: Vec<BlockComposition>,

    /// Length of the closing program scene. `0.0` means "unknown, end at the last silence".
    pub trailing_scene_duration_sec: f64,

    /// Whether a block may be matched from a single divider.
    pub monolithic: bool,
}

impl GuidedOpts {
    /// Three 60 s ad blocks, a 15 s closing scene.
    pub fn broadcast_defaults() -> Result<Self> {
        let block = BlockComposition::ads(DEFAULT_BLOCK_DURATION_SEC, DEFAULT_MARGIN_SEC)?;
        Ok(Self {
            structures: vec![block; DEFAULT_BLOCK_COUNT],
            trailing_scene_duration_sec: DEFAULT_END_SCENE_DURATION_SEC,
            monolithic: false,
        })
    }
}

impl Opts {
    /// Options for matching against `guided` structures.
    pub fn guided(guided: GuidedOpts) -> Self {
        Self {
            silence_frame_threshold: DEFAULT_GUIDED_SILENCE_FRAMES,
            frame_rate: None,
            duration_units: DurationUnitSet::default(),
            mode: SearchMode::Guided(guided),
            policy: MatchPolicy::default(),
            output_type: OutputType::Json,
        }
    }

    /// Options for the structure-free search.
    pub fn free() -> Self {
        Self {
            silence_frame_threshold: DEFAULT_FREE_SILENCE_FRAMES,
            frame_rate: None,
            duration_units: DurationUnitSet::default(),
            mode: SearchMode::Free,
            policy: MatchPolicy::default(),
            output_type: OutputType::Json,
        }
    }

    /// Frame rate to analyze with: the override if set, else `decoded_rate`.
    pub fn effective_frame_rate(&self, decoded_rate: f64) -> Result<f64> {
        let rate = self.frame_rate.unwrap_or(decoded_rate);
        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::config(format!("frame rate must be positive: {rate}")));
        }
        Ok(rate)
    }
}
