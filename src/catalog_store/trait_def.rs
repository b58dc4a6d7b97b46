//! CatalogStore trait definition.

use super::models::{AlbumRecord, ArtistRecord, ImportSummary, TrackRecord};
use crate::collector::Track;
use anyhow::Result;

/// Storage backend for collected artists, albums and tracks.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Fails with `CatalogStoreError::AlreadyExists` when the id is taken.
    fn insert_artist(&self, artist: &ArtistRecord) -> Result<()>;

    /// The owning artist must already be stored.
    fn insert_album(&self, album: &AlbumRecord) -> Result<()>;

    /// The owning artist and album must already be stored.
    fn insert_track(&self, track: &TrackRecord) -> Result<()>;

    /// Persists serialized tracks with their artists and albums in one
    /// transaction. Artists and albums already stored are reused.
    fn save_tracks(&self, tracks: &[Track]) -> Result<ImportSummary>;

    /// Removes the artist together with its albums and tracks.
    /// Returns false when no such artist exists.
    fn delete_artist(&self, id: &str) -> Result<bool>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn get_artist(&self, id: &str) -> Result<Option<ArtistRecord>>;

    fn get_album(&self, id: &str) -> Result<Option<AlbumRecord>>;

    fn get_track(&self, id: &str) -> Result<Option<TrackRecord>>;

    /// Case-insensitive exact match on the artist name.
    fn find_artist_by_name(&self, name: &str) -> Result<Option<ArtistRecord>>;

    /// Tracks of an artist, by album insertion order and then track number.
    fn get_artist_tracks(&self, artist_id: &str) -> Result<Vec<TrackRecord>>;

    // =========================================================================
    // Counts
    // =========================================================================

    fn get_artists_count(&self) -> usize;

    fn get_albums_count(&self) -> usize;

    fn get_tracks_count(&self) -> usize;
}
