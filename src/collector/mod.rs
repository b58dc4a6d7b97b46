//! Track collection and enrichment.
//!
//! ## Pipeline for an artist query
//!
//! ```text
//! track search (top hit) → matched artist → album listing (studio group)
//!     → sanitize → album tracks → audio features → enriched tracks
//! ```
//!
//! Every call is a single synchronous pass. Nothing is retried and any
//! failure discards the work done so far.

mod features;
mod ranking;
mod track;

pub use features::{AudioFeature, FeatureValues, InvalidFeature};
pub use ranking::{
    serialize_tracks, sort_tracks_by_audio_feature, sort_tracks_by_feature, FeatureRanking,
};
pub use track::{AlbumRef, ArtistRef, FeatureSource, Track};

use crate::catalog_api::{AlbumGroup, ApiAlbum, ApiArtist, ApiTrack, CatalogApi, SearchType};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("no {kind} found for query '{query}'")]
    LookupEmpty { kind: &'static str, query: String },

    #[error("artist name '{found}' does not match queried name '{query}'")]
    NameMismatch { query: String, found: String },

    #[error(transparent)]
    InvalidFeature(#[from] InvalidFeature),

    #[error("track '{track}' has no value for feature {feature}")]
    MissingFeature { track: String, feature: AudioFeature },

    #[error("{entity} '{id}' is missing field {field}")]
    MissingField {
        entity: &'static str,
        id: String,
        field: &'static str,
    },

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

/// Words that mark an album as a live or holiday release.
const NON_STUDIO_MARKERS: [&str; 2] = ["live", "christmas"];

/// Whether an album survives sanitizing: a single contributing artist and
/// no live or christmas marker in its name (case-insensitive substring).
pub fn is_studio_album(album: &ApiAlbum) -> bool {
    if album.artists.len() > 1 {
        return false;
    }
    let name = album.name.to_lowercase();
    !NON_STUDIO_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

pub struct TrackCollector {
    catalog: Arc<dyn CatalogApi>,
}

impl TrackCollector {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Raw track listing of the top album hit for `query`.
    pub fn tracks_by_album(&self, query: &str) -> Result<Vec<ApiTrack>, CollectorError> {
        let results = self.catalog.search(query, SearchType::Album, 1)?;
        let album = results
            .albums
            .and_then(|page| page.items.into_iter().next())
            .ok_or_else(|| CollectorError::LookupEmpty {
                kind: "album",
                query: query.to_string(),
            })?;

        info!("Fetching tracks of album '{}' ({})", album.name, album.id);
        Ok(self.catalog.album_tracks(&album.id)?)
    }

    /// Every track of the artist matching `query`, enriched with artist,
    /// album and audio-feature data, in album-then-track order.
    ///
    /// With `sanitize` set, albums with several artists or with a live or
    /// christmas marker in their name are skipped.
    pub fn tracks_by_artist(
        &self,
        query: &str,
        sanitize: bool,
    ) -> Result<Vec<Track>, CollectorError> {
        let artist = self.resolve_artist(query)?;
        let albums = self.catalog.artist_albums(&artist.id, AlbumGroup::Album)?;
        info!(
            "Artist '{}' ({}) has {} albums",
            artist.name,
            artist.id,
            albums.len()
        );

        let mut tracks = Vec::new();
        for album in &albums {
            if sanitize && !is_studio_album(album) {
                debug!("Skipping non-studio album '{}'", album.name);
                continue;
            }
            tracks.extend(self.enrich_album(album)?);
        }

        info!("Collected {} tracks for '{}'", tracks.len(), artist.name);
        Ok(tracks)
    }

    /// First artist of the top track hit, which must carry the queried name.
    fn resolve_artist(&self, query: &str) -> Result<ApiArtist, CollectorError> {
        let results = self.catalog.search(query, SearchType::Track, 1)?;
        let artist = results
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .and_then(|track| track.artists.into_iter().next())
            .ok_or_else(|| CollectorError::LookupEmpty {
                kind: "artist",
                query: query.to_string(),
            })?;

        if artist.name.to_lowercase() != query.to_lowercase() {
            return Err(CollectorError::NameMismatch {
                query: query.to_string(),
                found: artist.name,
            });
        }
        Ok(artist)
    }

    fn enrich_album(&self, album: &ApiAlbum) -> Result<Vec<Track>, CollectorError> {
        let artist = album
            .artists
            .first()
            .map(ArtistRef::from)
            .ok_or_else(|| CollectorError::MissingField {
                entity: "album",
                id: album.id.clone(),
                field: "artists",
            })?;
        let album_ref = AlbumRef::from(album);

        let album_tracks = self.catalog.album_tracks(&album.id)?;
        let track_ids: Vec<String> = album_tracks.iter().map(|t| t.id.clone()).collect();
        let features = self.catalog.audio_features_batch(&track_ids)?;
        if features.len() != album_tracks.len() {
            return Err(anyhow::anyhow!(
                "Catalog returned {} audio features for {} tracks of album {}",
                features.len(),
                album_tracks.len(),
                album.id
            )
            .into());
        }
        debug!(
            "Enriching {} tracks of album '{}'",
            album_tracks.len(),
            album.name
        );

        album_tracks
            .into_iter()
            .zip(features)
            .map(|(track, features)| Track::enrich(track, &artist, &album_ref, features))
            .collect()
    }
}
