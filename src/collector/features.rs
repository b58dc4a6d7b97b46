//! The closed set of audio features that can be flattened onto a track and
//! used as a sort key.

use crate::catalog_api::AudioFeatures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid audio feature")]
pub struct InvalidFeature(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFeature {
    Danceability,
    Energy,
    Key,
    Loudness,
    Mode,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

/// Allow-listed feature values of a track, keyed by feature.
pub type FeatureValues = BTreeMap<AudioFeature, f64>;

impl AudioFeature {
    pub const ALL: [AudioFeature; 11] = [
        AudioFeature::Danceability,
        AudioFeature::Energy,
        AudioFeature::Key,
        AudioFeature::Loudness,
        AudioFeature::Mode,
        AudioFeature::Speechiness,
        AudioFeature::Acousticness,
        AudioFeature::Instrumentalness,
        AudioFeature::Liveness,
        AudioFeature::Valence,
        AudioFeature::Tempo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFeature::Danceability => "danceability",
            AudioFeature::Energy => "energy",
            AudioFeature::Key => "key",
            AudioFeature::Loudness => "loudness",
            AudioFeature::Mode => "mode",
            AudioFeature::Speechiness => "speechiness",
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Instrumentalness => "instrumentalness",
            AudioFeature::Liveness => "liveness",
            AudioFeature::Valence => "valence",
            AudioFeature::Tempo => "tempo",
        }
    }

    /// Reads this feature out of a provider analysis.
    pub fn value_in(&self, features: &AudioFeatures) -> f64 {
        match self {
            AudioFeature::Danceability => features.danceability,
            AudioFeature::Energy => features.energy,
            AudioFeature::Key => f64::from(features.key),
            AudioFeature::Loudness => features.loudness,
            AudioFeature::Mode => f64::from(features.mode),
            AudioFeature::Speechiness => features.speechiness,
            AudioFeature::Acousticness => features.acousticness,
            AudioFeature::Instrumentalness => features.instrumentalness,
            AudioFeature::Liveness => features.liveness,
            AudioFeature::Valence => features.valence,
            AudioFeature::Tempo => features.tempo,
        }
    }

    /// Projects every allow-listed feature of an analysis.
    pub fn values_of(features: &AudioFeatures) -> FeatureValues {
        Self::ALL
            .iter()
            .map(|feature| (*feature, feature.value_in(features)))
            .collect()
    }
}

impl fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFeature {
    type Err = InvalidFeature;

    /// Names are matched exactly, as they appear in provider payloads.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|feature| feature.as_str() == s)
            .copied()
            .ok_or_else(|| InvalidFeature(s.to_string()))
    }
}
