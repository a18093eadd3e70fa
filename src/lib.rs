//! `cmcut`: find the commercial breaks in a recorded broadcast from its silence gaps.
//!
//! This crate provides:
//! - Silence extraction over a per-frame loudness timeseries
//! - Divider classification against a library of ad-slot durations
//! - Structure-guided and structure-free commercial matching
//! - Program scene generation, the complement of the matched commercials
//! - Audio decoding front-ends (WAV via `hound`, other containers via Symphonia)
//! - Pluggable output encoders (JSON, ffmpeg cut script)
//!
//! The analysis core is a deterministic batch computation: the same loudness and options
//! always yield the same scenes.

// High-level API (most consumers should start here).
pub mod analyzer;
pub mod opts;
pub mod property;
pub mod scenes;

// Analysis core.
pub mod composition;
pub mod duration_units;
pub mod loudness;
pub mod matcher;
pub mod silence;
pub mod silent_interval;

// Audio decoding.
pub mod decoder;
pub mod wav;

// Output selection and encoder interfaces.
pub mod ffmpeg_encoder;
pub mod json_array_encoder;
pub mod output_type;
pub mod scene_encoder;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use analyzer::{analyze_file, load_loudness, write_scenes};
pub use composition::{BlockComposition, Component, ComponentKind};
pub use duration_units::DurationUnitSet;
pub use error::{Error, Result};
pub use loudness::Loudness;
pub use matcher::{BandPolicy, CommercialInterval, MatchPolicy, OvershootPolicy};
pub use opts::{GuidedOpts, Opts, SearchMode};
pub use output_type::OutputType;
pub use property::ProgramProperty;
pub use scenes::{ProgramScenes, Scene, generate_scenes};
pub use silent_interval::SilentInterval;

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
