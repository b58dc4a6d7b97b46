//! Wire models for the catalog API responses.
//!
//! Only the fields the collector consumes are modelled, everything else in
//! the provider payloads is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of a paginated listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
            total: 0,
        }
    }
}

/// Result categories of a search call. Each category is only present when
/// it was requested.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResults {
    pub albums: Option<Page<ApiAlbum>>,
    pub tracks: Option<Page<ApiTrack>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchType {
    Album,
    Track,
}

impl SearchType {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Track => "track",
        }
    }
}

/// Release group filter for an artist's album listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlbumGroup {
    Album,
    Single,
}

impl AlbumGroup {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            AlbumGroup::Album => "album",
            AlbumGroup::Single => "single",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiArtist {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    /// Ordered by the provider from the widest variant down.
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

/// A track as listed by the provider, before enrichment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    pub track_number: u32,
    pub disc_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub preview_url: Option<String>,
}

/// Acoustic analysis of a single track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i32,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub analysis_url: Option<String>,
    #[serde(default)]
    pub track_href: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioFeaturesBatch {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}
