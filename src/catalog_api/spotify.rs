//! Spotify Web API client.
//!
//! Authenticates with the client-credentials grant, follows `next` links on
//! paginated listings and spaces requests by a minimum interval.

use super::models::{
    AlbumGroup, ApiAlbum, ApiTrack, AudioFeatures, AudioFeaturesBatch, Page, SearchResults,
    SearchType,
};
use super::{CatalogApi, CatalogApiError};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// Tokens are refreshed this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const AUDIO_FEATURES_BATCH_SIZE: usize = 100;
const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub auth_url: String,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
    /// ISO 3166-1 alpha-2 market forwarded to listing calls.
    pub market: Option<String>,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(100),
            market: None,
        }
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    api_base_url: String,
    auth_url: String,
    market: Option<String>,
    min_request_interval: Duration,
    token: Mutex<Option<AccessToken>>,
    last_request: Mutex<Option<Instant>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Result<Self> {
        let client_id = non_empty(settings.client_id).ok_or(CatalogApiError::MissingClientId)?;
        let client_secret =
            non_empty(settings.client_secret).ok_or(CatalogApiError::MissingClientSecret)?;

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            auth_url: settings.auth_url,
            market: non_empty(settings.market),
            min_request_interval: settings.min_request_interval,
            token: Mutex::new(None),
            last_request: Mutex::new(None),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn rate_limit(&self) {
        let mut last = self.last_request.lock().unwrap();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_request_interval {
                std::thread::sleep(self.min_request_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().unwrap();
        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(current.value.clone());
            }
        }

        self.rate_limit();
        debug!("Requesting catalog access token");
        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .context("Failed to connect to catalog accounts service")?;

        if !response.status().is_success() {
            return Err(CatalogApiError::Auth(format!(
                "token endpoint returned status {}",
                response.status()
            ))
            .into());
        }

        let body: TokenResponse = response
            .json()
            .context("Failed to parse catalog token response")?;
        info!("Obtained catalog access token, valid for {}s", body.expires_in);

        let value = body.access_token.clone();
        *token = Some(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        });
        Ok(value)
    }

    fn send_get(&self, url: &str) -> Result<Response> {
        let token = self.access_token()?;
        self.rate_limit();
        debug!("GET {}", url);
        self.client
            .get(url)
            .bearer_auth(token)
            .send()
            .with_context(|| format!("Failed to connect to catalog API at {}", url))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send_get(url)?;
        if !response.status().is_success() {
            return Err(CatalogApiError::Status {
                endpoint: url.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }
        response
            .json()
            .with_context(|| format!("Failed to parse catalog response from {}", url))
    }

    fn collect_pages<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url)?;
            items.extend(page.items);
            next = page.next;
        }
        Ok(items)
    }

    fn market_param(&self) -> String {
        match &self.market {
            Some(market) => format!("&market={}", urlencoding::encode(market)),
            None => String::new(),
        }
    }

    fn search_url(&self, query: &str, search_type: SearchType, limit: u32) -> String {
        format!(
            "{}/search?q={}&type={}&limit={}{}",
            self.api_base_url,
            urlencoding::encode(query),
            search_type.as_query_value(),
            limit,
            self.market_param()
        )
    }

    fn artist_albums_url(&self, artist_id: &str, group: AlbumGroup) -> String {
        format!(
            "{}/artists/{}/albums?include_groups={}&limit={}{}",
            self.api_base_url,
            urlencoding::encode(artist_id),
            group.as_query_value(),
            PAGE_LIMIT,
            self.market_param()
        )
    }

    fn album_tracks_url(&self, album_id: &str) -> String {
        format!(
            "{}/albums/{}/tracks?limit={}{}",
            self.api_base_url,
            urlencoding::encode(album_id),
            PAGE_LIMIT,
            self.market_param()
        )
    }

    fn audio_features_url(&self, track_ids: &[String]) -> String {
        format!(
            "{}/audio-features?ids={}",
            self.api_base_url,
            urlencoding::encode(&track_ids.join(","))
        )
    }
}

impl CatalogApi for SpotifyClient {
    fn search(&self, query: &str, search_type: SearchType, limit: u32) -> Result<SearchResults> {
        self.get_json(&self.search_url(query, search_type, limit))
    }

    fn artist_albums(&self, artist_id: &str, group: AlbumGroup) -> Result<Vec<ApiAlbum>> {
        self.collect_pages(self.artist_albums_url(artist_id, group))
    }

    fn album_tracks(&self, album_id: &str) -> Result<Vec<ApiTrack>> {
        self.collect_pages(self.album_tracks_url(album_id))
    }

    fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>> {
        let url = format!(
            "{}/audio-features/{}",
            self.api_base_url,
            urlencoding::encode(track_id)
        );
        let response = self.send_get(&url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CatalogApiError::Status {
                endpoint: url,
                status: response.status().as_u16(),
            }
            .into());
        }
        let features = response
            .json()
            .with_context(|| format!("Failed to parse audio features of track {}", track_id))?;
        Ok(Some(features))
    }

    fn audio_features_batch(&self, track_ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        let mut features = Vec::with_capacity(track_ids.len());
        for chunk in track_ids.chunks(AUDIO_FEATURES_BATCH_SIZE) {
            let batch: AudioFeaturesBatch = self.get_json(&self.audio_features_url(chunk))?;
            if batch.audio_features.len() != chunk.len() {
                anyhow::bail!(
                    "Catalog returned {} audio features for {} tracks",
                    batch.audio_features.len(),
                    chunk.len()
                );
            }
            features.extend(batch.audio_features);
        }
        Ok(features)
    }
}
