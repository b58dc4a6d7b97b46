//! Persisted forms of artists, albums and tracks.
//!
//! Each record is a flat projection of the transient collector types,
//! related to its owners by catalog id.

use crate::collector::{AudioFeature, FeatureSource, FeatureValues, Track};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogStoreError {
    #[error("{kind} with id '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("track '{0}' has no serialized audio features")]
    NotSerialized(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlbumRecord {
    pub id: String,
    pub artist_id: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackRecord {
    pub id: String,
    pub artist_id: String,
    pub album_id: String,
    pub name: String,
    pub uri: String,
    pub external_url: String,
    pub track_number: u32,
    pub duration_ms: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub explicit: bool,
    #[serde(flatten)]
    pub features: FeatureValues,
    pub time_signature: Option<i32>,
}

impl From<&Track> for ArtistRecord {
    fn from(track: &Track) -> Self {
        Self {
            id: track.artist.id.clone(),
            name: track.artist.name.clone(),
        }
    }
}

impl From<&Track> for AlbumRecord {
    fn from(track: &Track) -> Self {
        Self {
            id: track.album.id.clone(),
            artist_id: track.artist.id.clone(),
            name: track.album.name.clone(),
            image_url: track.album.image_url.clone(),
        }
    }
}

impl TryFrom<&Track> for TrackRecord {
    type Error = CatalogStoreError;

    /// Fails unless every allow-listed feature has been flattened onto the track.
    fn try_from(track: &Track) -> Result<Self, Self::Error> {
        if AudioFeature::ALL
            .iter()
            .any(|feature| !track.features.contains_key(feature))
        {
            return Err(CatalogStoreError::NotSerialized(track.id.clone()));
        }

        Ok(Self {
            id: track.id.clone(),
            artist_id: track.artist.id.clone(),
            album_id: track.album.id.clone(),
            name: track.name.clone(),
            uri: track.uri.clone(),
            external_url: track.external_url.clone(),
            track_number: track.track_number,
            duration_ms: track.duration_ms,
            kind: track.kind.clone(),
            explicit: track.explicit,
            features: track.features.clone(),
            time_signature: track.time_signature(),
        })
    }
}

impl FeatureSource for TrackRecord {
    fn track_id(&self) -> &str {
        &self.id
    }

    fn track_name(&self) -> &str {
        &self.name
    }

    fn feature_value(&self, feature: AudioFeature) -> Option<f64> {
        self.features.get(&feature).copied()
    }
}

/// Counts of rows created by one import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub artists_created: usize,
    pub albums_created: usize,
    pub tracks_created: usize,
}
