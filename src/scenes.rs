//! Program scenes: the complement of the matched commercial spans.

use serde::Serialize;
use tracing::{debug, warn};

use crate::Result;
use crate::loudness::Loudness;
use crate::matcher::{CommercialInterval, match_structures, search_runs};
use crate::opts::{Opts, SearchMode};
use crate::silence::extract_silent_intervals;

/// A leading silence that starts before this many seconds marks the program start.
pub const START_MARGIN_SEC: f64 = 5.0;

/// Padding added after a closing scene of known length, for fade-outs.
pub const END_MARGIN_SEC: f64 = 1.0;

/// One contiguous program segment of the recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scene {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl Scene {
    pub fn duration_sec(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Build the scene list around `commercials`.
///
/// The first scene starts at 0, or at `first_silence_start_sec` when that silence begins within
/// [`START_MARGIN_SEC`]. Each commercial closes the current scene and the next one resumes at
/// its end. The closing scene lasts `trailing_scene_duration_sec` plus [`END_MARGIN_SEC`], or
/// runs to `last_silence_end_sec` when the duration is `0.0`.
pub fn generate_scenes(
    first_silence_start_sec: f64,
    last_silence_end_sec: f64,
    commercials: &[CommercialInterval],
    trailing_scene_duration_sec: f64,
) -> Vec<Scene> {
    let mut scenes = Vec::with_capacity(commercials.len() + 1);
    let mut cursor = if first_silence_start_sec < START_MARGIN_SEC {
        first_silence_start_sec
    } else {
        0.0
    };

    for commercial in commercials {
        scenes.push(Scene {
            start_seconds: cursor,
            end_seconds: commercial.start_sec,
        });
        cursor = commercial.end_sec;
    }

    let end_seconds = if trailing_scene_duration_sec != 0.0 {
        cursor + trailing_scene_duration_sec + END_MARGIN_SEC
    } else {
        last_silence_end_sec
    };
    scenes.push(Scene {
        start_seconds: cursor,
        end_seconds,
    });

    scenes
}

/// The program scenes of one recording, in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramScenes {
    pub scenes: Vec<Scene>,
    pub commercials: Vec<CommercialInterval>,
}

impl ProgramScenes {
    /// Run silence extraction, commercial matching and scene generation over `loudness`.
    ///
    /// A recording without any silent interval is returned as a single scene covering it.
    pub fn construct(loudness: &Loudness, opts: &Opts) -> Result<Self> {
        let frame_rate = opts.effective_frame_rate(loudness.frame_rate())?;
        let intervals =
            extract_silent_intervals(loudness, opts.silence_frame_threshold, frame_rate)?;

        let (Some(first), Some(last)) = (intervals.first(), intervals.last()) else {
            warn!(
                frames = loudness.len(),
                threshold = opts.silence_frame_threshold,
                "no silent intervals detected; keeping the whole recording"
            );
            return Ok(Self {
                scenes: vec![Scene {
                    start_seconds: 0.0,
                    end_seconds: loudness.len() as f64 / frame_rate,
                }],
                commercials: Vec::new(),
            });
        };

        let (commercials, trailing_scene_duration_sec) = match &opts.mode {
            SearchMode::Guided(guided) => (
                match_structures(
                    &intervals,
                    &opts.duration_units,
                    &guided.structures,
                    guided.monolithic,
                    opts.policy,
                )?,
                guided.trailing_scene_duration_sec,
            ),
            SearchMode::Free => (
                search_runs(&intervals, &opts.duration_units, opts.policy.band),
                0.0,
            ),
        };

        debug!(
            silent_intervals = intervals.len(),
            commercials = commercials.len(),
            "matched commercials"
        );

        let scenes = generate_scenes(
            first.start_sec(),
            last.end_sec(),
            &commercials,
            trailing_scene_duration_sec,
        );
        Ok(Self {
            scenes,
            commercials,
        })
    }

    /// Total program time kept, in seconds.
    pub fn total_duration_sec(&self) -> f64 {
        self.scenes.iter().map(Scene::duration_sec).sum()
    }
}
