//! Catalog API collaborator.
//!
//! The collector only talks to the catalog through the [`CatalogApi`] trait.
//! [`SpotifyClient`] is the HTTP implementation, it owns authentication,
//! pagination and rate limiting so that callers never see them.

mod models;
mod spotify;

pub use models::*;
pub use spotify::{SpotifyClient, SpotifySettings, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL};

use anyhow::Result;
use thiserror::Error;

/// Errors raised by catalog clients that callers may want to match on.
#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("catalog client ID was not provided")]
    MissingClientId,

    #[error("catalog client secret was not provided")]
    MissingClientSecret,

    #[error("catalog authentication failed: {0}")]
    Auth(String),

    #[error("catalog request to {endpoint} failed with status {status}")]
    Status { endpoint: String, status: u16 },
}

/// Read operations consumed from the music catalog.
pub trait CatalogApi: Send + Sync {
    /// Free-text search restricted to one result category.
    fn search(&self, query: &str, search_type: SearchType, limit: u32) -> Result<SearchResults>;

    /// All albums of an artist in the given release group.
    fn artist_albums(&self, artist_id: &str, group: AlbumGroup) -> Result<Vec<ApiAlbum>>;

    /// All tracks of an album, in album order.
    fn album_tracks(&self, album_id: &str) -> Result<Vec<ApiTrack>>;

    /// Audio analysis of a single track, `None` when the provider has none.
    fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>>;

    /// Audio analysis for several tracks, positionally aligned with `track_ids`.
    ///
    /// The default issues one request per track. Implementations backed by
    /// an API with a batch endpoint should override it.
    fn audio_features_batch(&self, track_ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        track_ids
            .iter()
            .map(|id| self.audio_features(id))
            .collect()
    }
}
