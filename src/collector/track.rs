use super::features::{AudioFeature, FeatureValues};
use super::CollectorError;
use crate::catalog_api::{ApiAlbum, ApiArtist, ApiTrack, AudioFeatures};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

impl From<&ApiArtist> for ArtistRef {
    fn from(artist: &ApiArtist) -> Self {
        Self {
            id: artist.id.clone(),
            name: artist.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    /// First image in the provider listing, the widest one.
    pub image_url: Option<String>,
    pub artist_ids: Vec<String>,
}

impl From<&ApiAlbum> for AlbumRef {
    fn from(album: &ApiAlbum) -> Self {
        Self {
            id: album.id.clone(),
            name: album.name.clone(),
            image_url: album.images.first().map(|image| image.url.clone()),
            artist_ids: album.artists.iter().map(|a| a.id.clone()).collect(),
        }
    }
}

/// A track enriched with its owning artist and album and its audio analysis.
///
/// Serializes with the artist under `artists` and the flattened feature
/// values at the top level, next to the nested `audio_features` block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub external_url: String,
    #[serde(rename = "artists")]
    pub artist: ArtistRef,
    pub album: AlbumRef,
    pub audio_features: Option<AudioFeatures>,
    #[serde(flatten)]
    pub features: FeatureValues,
}

impl Track {
    /// Builds an enriched track out of a raw listing entry. Disc number,
    /// markets and preview URL are left behind.
    pub fn enrich(
        track: ApiTrack,
        artist: &ArtistRef,
        album: &AlbumRef,
        audio_features: Option<AudioFeatures>,
    ) -> Result<Self, CollectorError> {
        let external_url = track
            .external_urls
            .get("spotify")
            .cloned()
            .ok_or_else(|| CollectorError::MissingField {
                entity: "track",
                id: track.id.clone(),
                field: "external_urls.spotify",
            })?;

        Ok(Self {
            id: track.id,
            name: track.name,
            uri: track.uri,
            track_number: track.track_number,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            kind: track.kind,
            external_url,
            artist: artist.clone(),
            album: album.clone(),
            audio_features,
            features: FeatureValues::new(),
        })
    }

    /// Copies the allow-listed values of the nested analysis to the top level.
    pub fn serialize_features(&mut self) {
        if let Some(audio_features) = &self.audio_features {
            self.features.extend(AudioFeature::values_of(audio_features));
        }
    }

    pub fn time_signature(&self) -> Option<i32> {
        self.audio_features.as_ref().map(|f| f.time_signature)
    }
}

/// Anything that exposes flattened feature values and can be ranked.
pub trait FeatureSource {
    fn track_id(&self) -> &str;
    fn track_name(&self) -> &str;
    fn feature_value(&self, feature: AudioFeature) -> Option<f64>;
}

impl FeatureSource for Track {
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
