//! Expected makeup of one commercial block.
//!
//! A block is one or two named components in declaration order, e.g. `{"cm": 60}`,
//! `{"scene": 30, "cm": 60}` or `{"monolithic_cm": 120}`. A short program scene that cannot be
//! told apart from the ads is cut out of the matched span by [`BlockComposition::resolve`].

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Regular ad slots, separated by silences.
    Ad,

    /// Program recap that sits before or after the ads without a silence between.
    FillerScene,

    /// Several back-to-back ads with no silence between them.
    MonolithicAd,
}

impl ComponentKind {
    /// Parse a composition key. Accepts both the broadcast-tool spellings and the long names.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "cm" | "ad" => Some(Self::Ad),
            "scene" | "filler_scene" => Some(Self::FillerScene),
            "monolithic_cm" | "monolithic_ad" => Some(Self::MonolithicAd),
            _ => None,
        }
    }

    pub fn is_ad_bearing(self) -> bool {
        !matches!(self, Self::FillerScene)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub duration_sec: f64,
}

/// One expected commercial block plus the tolerance used to match it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockComposition {
    components: Vec<Component>,
    nominal_duration_sec: f64,
    margin_sec: f64,
}

impl BlockComposition {
    /// Validate and build a composition from components in declaration order.
    pub fn new(components: Vec<Component>, margin_sec: f64) -> Result<Self> {
        match components.len() {
            0 => return Err(Error::config("block composition is empty")),
            1 | 2 => {}
            n => {
                return Err(Error::config(format!(
                    "block composition has {n} components, at most 2 are allowed"
                )));
            }
        }
        if let [a, b] = components.as_slice() {
            if a.kind == b.kind {
                return Err(Error::config(format!(
                    "block composition repeats component {:?}",
                    a.kind
                )));
            }
        }
        if !components.iter().any(|c| c.kind.is_ad_bearing()) {
            return Err(Error::config(
                "block composition must include an ad component",
            ));
        }
        for c in &components {
            if !c.duration_sec.is_finite() || c.duration_sec <= 0.0 {
                return Err(Error::config(format!(
                    "component durations must be positive: {:?} = {}",
                    c.kind, c.duration_sec
                )));
            }
        }
        if !margin_sec.is_finite() || margin_sec <= 0.0 {
            return Err(Error::config(format!(
                "margin_sec must be positive: {margin_sec}"
            )));
        }

        let nominal_duration_sec = components.iter().map(|c| c.duration_sec).sum();
        Ok(Self {
            components,
            nominal_duration_sec,
            margin_sec,
        })
    }

    /// Build a composition from `(key, seconds)` pairs such as `("cm", 60.0)`.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, f64)>,
        margin_sec: f64,
    ) -> Result<Self> {
        let components = pairs
            .into_iter()
            .map(|(key, duration_sec)| {
                ComponentKind::from_key(key)
                    .map(|kind| Component { kind, duration_sec })
                    .ok_or_else(|| {
                        Error::config(format!(
                            "unknown composition key '{key}', expected cm, scene or monolithic_cm"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(components, margin_sec)
    }

    /// A block made of plain ad slots only.
    pub fn ads(duration_sec: f64, margin_sec: f64) -> Result<Self> {
        Self::new(
            vec![Component {
                kind: ComponentKind::Ad,
                duration_sec,
            }],
            margin_sec,
        )
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn nominal_duration_sec(&self) -> f64 {
        self.nominal_duration_sec
    }

    pub fn margin_sec(&self) -> f64 {
        self.margin_sec
    }

    /// Duration of the monolithic component, when this block has one.
    pub fn monolithic_duration_sec(&self) -> Option<f64> {
        self.duration_of(ComponentKind::MonolithicAd)
    }

    pub fn is_monolithic(&self) -> bool {
        self.monolithic_duration_sec().is_some()
    }

    fn duration_of(&self, kind: ComponentKind) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.duration_sec)
    }

    /// Turn the span between two matched dividers into the true ad span.
    ///
    /// A filler scene declared first is cut from the left edge, one declared second from the
    /// right edge. Blocks without a filler scene keep the full span.
    pub fn resolve(&self, left_edge_sec: f64, right_edge_sec: f64) -> (f64, f64) {
        match self.components.as_slice() {
            [
                Component {
                    kind: ComponentKind::FillerScene,
                    duration_sec,
                },
                _,
            ] => (left_edge_sec + duration_sec, right_edge_sec),
            [
                _,
                Component {
                    kind: ComponentKind::FillerScene,
                    duration_sec,
                },
            ] => (left_edge_sec, right_edge_sec - duration_sec),
            _ => (left_edge_sec, right_edge_sec),
        }
    }
}

/// Composition as written in a property file: an ordered `{key: seconds}` object.
///
/// Key order is significant, so this keeps entries in document order instead of going through a
/// map type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawComposition(pub Vec<(String, f64)>);

impl RawComposition {
    pub fn into_composition(self, margin_sec: f64) -> Result<BlockComposition> {
        BlockComposition::from_pairs(self.0.iter().map(|(k, v)| (k.as_str(), *v)), margin_sec)
    }
}

impl<'de> Deserialize<'de> for RawComposition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedEntries;

        impl<'de> Visitor<'de> for OrderedEntries {
            type Value = RawComposition;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping composition keys to seconds")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(2));
                while let Some((key, value)) = map.next_entry::<String, f64>()? {
                    if entries.iter().any(|(k, _): &(String, f64)| *k == key) {
                        return Err(de::Error::custom(format!(
                            "duplicate composition key '{key}'"
                        )));
                    }
                    entries.push((key, value));
                }
                Ok(RawComposition(entries))
            }
        }

        deserializer.deserialize_map(OrderedEntries)
    }
}
