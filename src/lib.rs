//! Track Collector Library
//!
//! Collects an artist's studio-album tracks from the music catalog API,
//! enriches them with audio analysis, ranks them by a single feature and
//! keeps them in a local SQLite catalog.

pub mod catalog_api;
pub mod catalog_store;
pub mod collector;
pub mod config;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_api::{CatalogApi, SpotifyClient};
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use collector::{
    serialize_tracks, sort_tracks_by_audio_feature, AudioFeature, FeatureRanking, Track,
    TrackCollector,
};
