//! Program property files: per-show configuration of the structure-guided matcher.
//!
//! ```json
//! {
//!   "cm_structures": [{"cm": 60}, {"scene": 30, "cm": 60}, {"monolithic_cm": 120}],
//!   "end_scene_duration": 15,
//!   "has_monolithic_cm": false,
//!   "margin_sec": 3.5,
//!   "duration_threshold": 4000,
//!   "additional_duration_units": [5, 60]
//! }
//! ```
//!
//! Every key is optional. Values are validated here, at the boundary, so the matcher only ever
//! sees well-formed configuration.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::composition::RawComposition;
use crate::duration_units::DurationUnitSet;
use crate::opts::{
    DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_DURATION_SEC, DEFAULT_END_SCENE_DURATION_SEC,
    DEFAULT_GUIDED_SILENCE_FRAMES, DEFAULT_MARGIN_SEC, GuidedOpts, Opts,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramProperty {
    #[serde(default = "default_structures", alias = "block_compositions")]
    pub cm_structures: Vec<RawComposition>,

    #[serde(default = "default_end_scene_duration", alias = "trailing_scene_duration")]
    pub end_scene_duration: f64,

    #[serde(default, alias = "monolithic")]
    pub has_monolithic_cm: bool,

    #[serde(default = "default_margin_sec")]
    pub margin_sec: f64,

    #[serde(default = "default_duration_threshold", alias = "silence_frame_threshold")]
    pub duration_threshold: usize,

    #[serde(default, alias = "duration_units")]
    pub additional_duration_units: Vec<f64>,
}

impl Default for ProgramProperty {
    fn default() -> Self {
        Self {
            cm_structures: default_structures(),
            end_scene_duration: default_end_scene_duration(),
            has_monolithic_cm: false,
            margin_sec: default_margin_sec(),
            duration_threshold: default_duration_threshold(),
            additional_duration_units: Vec::new(),
        }
    }
}

impl ProgramProperty {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::config(format!("cannot open property file {}: {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Validate the property and turn it into structure-guided [`Opts`].
    pub fn into_opts(self) -> Result<Opts> {
        if !self.end_scene_duration.is_finite() || self.end_scene_duration < 0.0 {
            return Err(Error::config(format!(
                "end_scene_duration must be zero or positive: {}",
                self.end_scene_duration
            )));
        }

        let structures = self
            .cm_structures
            .into_iter()
            .map(|raw| raw.into_composition(self.margin_sec))
            .collect::<Result<Vec<_>>>()?;

        let mut opts = Opts::guided(GuidedOpts {
            structures,
            trailing_scene_duration_sec: self.end_scene_duration,
            monolithic: self.has_monolithic_cm,
        });
        opts.silence_frame_threshold = self.duration_threshold;
        opts.duration_units = DurationUnitSet::new(&self.additional_duration_units)?;
        Ok(opts)
    }
}

fn default_structures() -> Vec<RawComposition> {
    vec![RawComposition(vec![("cm".to_owned(), DEFAULT_BLOCK_DURATION_SEC)]); DEFAULT_BLOCK_COUNT]
}

fn default_end_scene_duration() -> f64 {
    DEFAULT_END_SCENE_DURATION_SEC
}

fn default_margin_sec() -> f64 {
    DEFAULT_MARGIN_SEC
}

fn default_duration_threshold() -> usize {
    DEFAULT_GUIDED_SILENCE_FRAMES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::ComponentKind;
    use crate::opts::SearchMode;

    fn guided(opts: &Opts) -> &GuidedOpts {
        match &opts.mode {
            SearchMode::Guided(g) => g,
            SearchMode::Free => panic!("expected guided mode"),
        }
    }

    #[test]
    fn empty_object_uses_defaults() -> anyhow::Result<()> {
        let opts = ProgramProperty::from_reader(&b"{}"[..])?.into_opts()?;
        let g = guided(&opts);
        assert_eq!(g.structures.len(), 3);
        assert_eq!(g.trailing_scene_duration_sec, 15.0);
        assert!(!g.monolithic);
        assert_eq!(opts.silence_frame_threshold, 4000);
        assert_eq!(opts.duration_units.as_slice(), &[15.0, 30.0]);
        Ok(())
    }

    #[test]
    fn reads_structures_in_declared_order() -> anyhow::Result<()> {
        let json = r#"{
            "cm_structures": [{"scene": 30, "cm": 60}, {"monolithic_cm": 120}],
            "end_scene_duration": 0,
            "has_monolithic_cm": true,
            "margin_sec": 2.5,
            "duration_threshold": 3000,
            "additional_duration_units": [60, 5]
        }"#;
        let opts = ProgramProperty::from_reader(json.as_bytes())?.into_opts()?;
        let g = guided(&opts);

        assert_eq!(g.structures[0].components()[0].kind, ComponentKind::FillerScene);
        assert_eq!(g.structures[0].nominal_duration_sec(), 90.0);
        assert_eq!(g.structures[0].margin_sec(), 2.5);
        assert!(g.structures[1].is_monolithic());
        assert_eq!(g.trailing_scene_duration_sec, 0.0);
        assert!(g.monolithic);
        assert_eq!(opts.silence_frame_threshold, 3000);
        assert_eq!(opts.duration_units.as_slice(), &[5.0, 15.0, 30.0, 60.0]);
        Ok(())
    }

    #[test]
    fn invalid_values_are_configuration_errors() -> anyhow::Result<()> {
        for json in [
            r#"{"margin_sec": 0}"#,
            r#"{"cm_structures": [{"scene": 30}]}"#,
            r#"{"additional_duration_units": [-1]}"#,
            r#"{"end_scene_duration": -5}"#,
        ] {
            let err = ProgramProperty::from_reader(json.as_bytes())?
                .into_opts()
                .unwrap_err();
            assert!(err.is_configuration(), "{json} should fail");
        }
        Ok(())
    }

    #[test]
    fn non_numeric_values_fail_to_parse() {
        assert!(ProgramProperty::from_reader(&br#"{"margin_sec": "wide"}"#[..]).is_err());
        assert!(ProgramProperty::from_reader(&br#"{"unknown_key": 1}"#[..]).is_err());
    }
}
