//! In-process stand-in for the catalog API.

use super::constants::*;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use track_collector::catalog_api::{
    AlbumGroup, ApiAlbum, ApiArtist, ApiImage, ApiTrack, AudioFeatures, CatalogApi, Page,
    SearchResults, SearchType,
};

/// Serves a fixed discography and counts the calls it receives.
pub struct FakeCatalog {
    albums: Vec<(AlbumGroup, ApiAlbum)>,
    tracks: HashMap<String, Vec<ApiTrack>>,
    features: HashMap<String, AudioFeatures>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

fn artist(id: &str, name: &str) -> ApiArtist {
    ApiArtist {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn album(id: &str, name: &str, artists: Vec<ApiArtist>) -> ApiAlbum {
    ApiAlbum {
        id: id.to_string(),
        name: name.to_string(),
        artists,
        images: vec![ApiImage {
            url: format!("https://i.scdn.co/image/{}", id),
            width: Some(640),
            height: Some(640),
        }],
    }
}

fn track(album_id: &str, number: u32, artists: Vec<ApiArtist>) -> ApiTrack {
    let id = format!("{}-t{}", album_id, number);
    ApiTrack {
        name: format!("{} #{}", album_id, number),
        uri: format!("spotify:track:{}", id),
        artists,
        track_number: number,
        disc_number: 1,
        duration_ms: 150_000 + u64::from(number) * 1_000,
        explicit: number % 2 == 0,
        kind: "track".to_string(),
        external_urls: HashMap::from([(
            "spotify".to_string(),
            format!("https://open.spotify.com/track/{}", id),
        )]),
        available_markets: vec!["US".to_string(), "IT".to_string()],
        preview_url: Some(format!("https://p.scdn.co/mp3-preview/{}", id)),
        id,
    }
}

fn analysis(id: &str, seed: usize) -> AudioFeatures {
    let step = seed as f64;
    AudioFeatures {
        id: id.to_string(),
        danceability: 0.9 - step * 0.07,
        energy: 0.4 + step * 0.03,
        key: (seed % 12) as i32,
        loudness: -12.0 + step,
        mode: (seed % 2) as i32,
        speechiness: 0.03,
        acousticness: 0.5 - step * 0.04,
        instrumentalness: 0.002 * step,
        liveness: 0.11,
        valence: 0.2 + step * 0.05,
        // descending in catalog order so a ranking reorders the list
        tempo: 180.0 - step * 9.5,
        time_signature: 4,
        duration_ms: None,
        analysis_url: None,
        track_href: None,
        uri: None,
    }
}

impl FakeCatalog {
    /// Thundercat with two studio albums, one live album, one christmas
    /// album, one collaboration and a single.
    pub fn thundercat() -> Self {
        let main = artist(ARTIST_ID, ARTIST_NAME);
        let guest = artist(GUEST_ARTIST_ID, GUEST_ARTIST_NAME);

        let listing: Vec<(AlbumGroup, ApiAlbum, u32)> = vec![
            (
                AlbumGroup::Album,
                album(DRUNK_ALBUM_ID, DRUNK_ALBUM_NAME, vec![main.clone()]),
                3,
            ),
            (
                AlbumGroup::Album,
                album(LIVE_ALBUM_ID, LIVE_ALBUM_NAME, vec![main.clone()]),
                2,
            ),
            (
                AlbumGroup::Album,
                album(IT_IS_ALBUM_ID, IT_IS_ALBUM_NAME, vec![main.clone()]),
                2,
            ),
            (
                AlbumGroup::Album,
                album(CHRISTMAS_ALBUM_ID, CHRISTMAS_ALBUM_NAME, vec![main.clone()]),
                1,
            ),
            (
                AlbumGroup::Album,
                album(
                    COLLAB_ALBUM_ID,
                    COLLAB_ALBUM_NAME,
                    vec![main.clone(), guest.clone()],
                ),
                1,
            ),
            (
                AlbumGroup::Single,
                album(SINGLE_ALBUM_ID, "Dragonball Durag", vec![main.clone()]),
                1,
            ),
        ];

        let mut albums = Vec::new();
        let mut tracks = HashMap::new();
        let mut features = HashMap::new();
        for (group, album, count) in listing {
            let album_tracks: Vec<ApiTrack> = (1..=count)
                .map(|n| track(&album.id, n, album.artists.clone()))
                .collect();
            for t in &album_tracks {
                let seed = features.len();
                features.insert(t.id.clone(), analysis(&t.id, seed));
            }
            tracks.insert(album.id.clone(), album_tracks);
            albums.push((group, album));
        }

        Self {
            albums,
            tracks,
            features,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Drops the audio analysis of the given tracks.
    pub fn without_features(mut self, track_ids: &[&str]) -> Self {
        let missing: HashSet<&str> = track_ids.iter().copied().collect();
        self.features.retain(|id, _| !missing.contains(id.as_str()));
        self
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn top_track_for(&self, query: &str) -> Option<ApiTrack> {
        let query = query.to_lowercase();
        self.albums
            .iter()
            .filter(|(_, album)| {
                album
                    .artists
                    .iter()
                    .any(|a| a.name.to_lowercase().contains(&query))
            })
            .find_map(|(_, album)| self.tracks.get(&album.id)?.first().cloned())
    }
}

impl CatalogApi for FakeCatalog {
    fn search(&self, query: &str, search_type: SearchType, limit: u32) -> Result<SearchResults> {
        self.record("search");
        let limit = limit as usize;
        let mut results = SearchResults::default();
        match search_type {
            SearchType::Track => {
                let items: Vec<ApiTrack> = self.top_track_for(query).into_iter().collect();
                results.tracks = Some(Page {
                    total: items.len() as u32,
                    items: items.into_iter().take(limit).collect(),
                    next: None,
                });
            }
            SearchType::Album => {
                let query = query.to_lowercase();
                let items: Vec<ApiAlbum> = self
                    .albums
                    .iter()
                    .map(|(_, album)| album)
                    .filter(|album| album.name.to_lowercase().contains(&query))
                    .take(limit)
                    .cloned()
                    .collect();
                results.albums = Some(Page {
                    total: items.len() as u32,
                    items,
                    next: None,
                });
            }
        }
        Ok(results)
    }

    fn artist_albums(&self, artist_id: &str, group: AlbumGroup) -> Result<Vec<ApiAlbum>> {
        self.record("artist_albums");
        Ok(self
            .albums
            .iter()
            .filter(|(g, album)| *g == group && album.artists.iter().any(|a| a.id == artist_id))
            .map(|(_, album)| album.clone())
            .collect())
    }

    fn album_tracks(&self, album_id: &str) -> Result<Vec<ApiTrack>> {
        self.record("album_tracks");
        Ok(self.tracks.get(album_id).cloned().unwrap_or_default())
    }

    fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>> {
        self.record("audio_features");
        Ok(self.features.get(track_id).cloned())
    }

    fn audio_features_batch(&self, track_ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        self.record("audio_features_batch");
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }
}
