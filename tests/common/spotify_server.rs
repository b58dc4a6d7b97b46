//! Loopback stand-in for the Spotify Web API
//!
//! Each test spawns its own server on a random local port. The server runs
//! on a dedicated thread with its own tokio runtime, so the blocking client
//! under test is never driven from inside a runtime. When dropped, the
//! server shuts down gracefully and the thread is joined.

use super::constants::*;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpListener;
use track_collector::catalog_api::SpotifySettings;
use track_collector::SpotifyClient;

#[derive(Clone)]
struct ServerState {
    base_url: String,
    token_lifetime_secs: u64,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ServerState {
    fn record(&self, uri: &Uri) {
        self.requests.lock().unwrap().push(uri.to_string());
    }
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value == format!("Bearer {}", SERVER_ACCESS_TOKEN))
}

fn track_json(id: &str, number: u32) -> Value {
    json!({
        "id": id,
        "name": format!("Track {}", id),
        "uri": format!("spotify:track:{}", id),
        "artists": [{"id": ARTIST_ID, "name": ARTIST_NAME}],
        "track_number": number,
        "disc_number": 1,
        "duration_ms": 200000,
        "explicit": false,
        "type": "track",
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
        "preview_url": null
    })
}

fn features_json(id: &str) -> Value {
    json!({
        "id": id,
        "danceability": 0.64,
        "energy": 0.52,
        "key": 9,
        "loudness": -8.1,
        "mode": 1,
        "speechiness": 0.04,
        "acousticness": 0.31,
        "instrumentalness": 0.02,
        "liveness": 0.12,
        "valence": 0.58,
        "tempo": 118.0,
        "time_signature": 4,
        "type": "audio_features"
    })
}

async fn token(State(state): State<ServerState>, uri: Uri, headers: HeaderMap) -> Response {
    state.record(&uri);
    let has_basic_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("Basic "));
    if !has_basic_auth {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "access_token": SERVER_ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": state.token_lifetime_secs
    }))
    .into_response()
}

async fn token_denied(State(state): State<ServerState>, uri: Uri) -> StatusCode {
    state.record(&uri);
    StatusCode::UNAUTHORIZED
}

async fn search(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match params.get("type").map(String::as_str) {
        Some("track") => Json(json!({
            "tracks": {
                "items": [track_json("top-hit", 1)],
                "next": null,
                "total": 1
            }
        }))
        .into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn artist_albums(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Path(artist_id): Path<String>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if artist_id != ARTIST_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "items": [{
            "id": DRUNK_ALBUM_ID,
            "name": DRUNK_ALBUM_NAME,
            "artists": [{"id": ARTIST_ID, "name": ARTIST_NAME}],
            "images": [{"url": "https://i.scdn.co/image/drunk", "width": 640, "height": 640}]
        }],
        "next": null,
        "total": 1
    }))
    .into_response()
}

/// Two pages of one track each. The first page links to the second.
async fn album_tracks(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Path(album_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if album_id == BROKEN_ALBUM_ID {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let page = if params.contains_key("offset") {
        json!({
            "items": [track_json(&format!("{}-2", album_id), 2)],
            "next": null,
            "total": 2
        })
    } else {
        json!({
            "items": [track_json(&format!("{}-1", album_id), 1)],
            "next": format!("{}/v1/albums/{}/tracks?offset=1", state.base_url, album_id),
            "total": 2
        })
    };
    Json(page).into_response()
}

async fn audio_features(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Path(track_id): Path<String>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if track_id == MISSING_TRACK_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(features_json(&track_id)).into_response()
}

/// One entry per requested id, except that a batch containing
/// `SHORT_BATCH_TRACK_ID` comes back one entry short.
async fn audio_features_batch(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let ids: Vec<&str> = params
        .get("ids")
        .map(|ids| ids.split(',').collect())
        .unwrap_or_default();
    let mut features: Vec<Value> = ids.iter().map(|id| features_json(id)).collect();
    if ids.contains(&SHORT_BATCH_TRACK_ID) {
        features.pop();
    }
    Json(json!({ "audio_features": features })).into_response()
}

fn make_router(state: ServerState) -> Router {
    Router::new()
        .route("/token", post(token))
        .route("/token-denied", post(token_denied))
        .route("/v1/search", get(search))
        .route("/v1/artists/{id}/albums", get(artist_albums))
        .route("/v1/albums/{id}/tracks", get(album_tracks))
        .route("/v1/audio-features", get(audio_features_batch))
        .route("/v1/audio-features/{id}", get(audio_features))
        .with_state(state)
}

/// Fake Spotify server bound to 127.0.0.1 on a random port.
pub struct FakeSpotifyServer {
    /// Base URL without the `/v1` prefix (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FakeSpotifyServer {
    /// Spawns a server that issues long-lived tokens.
    pub fn spawn() -> Self {
        Self::spawn_with_token_lifetime(SERVER_TOKEN_LIFETIME_SECS)
    }

    /// Spawns a server whose tokens expire `token_lifetime_secs` after issue.
    ///
    /// # Panics
    ///
    /// Panics if the runtime cannot be built, the port cannot be bound or
    /// the server does not report its address within the ready timeout.
    pub fn spawn_with_token_lifetime(token_lifetime_secs: u64) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let server_requests = requests.clone();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<String>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build server runtime");

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind to random port");
                let port = listener
                    .local_addr()
                    .expect("Failed to get local address")
                    .port();
                let base_url = format!("http://127.0.0.1:{}", port);

                let state = ServerState {
                    base_url: base_url.clone(),
                    token_lifetime_secs,
                    requests: server_requests,
                };
                // already listening, connections queue until serve starts
                ready_tx.send(base_url).expect("Test thread went away");

                axum::serve(listener, make_router(state))
                    .with_graceful_shutdown(async {
                        shutdown_rx.await.ok();
                    })
                    .await
                    .expect("Server failed");
            });
        });

        let base_url = ready_rx
            .recv_timeout(Duration::from_millis(SERVER_READY_TIMEOUT_MS))
            .expect("Server did not report its address in time");

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Client settings pointing at this server, without request spacing.
    pub fn settings(&self) -> SpotifySettings {
        SpotifySettings {
            client_id: Some("test-client-id".to_string()),
            client_secret: Some("test-client-secret".to_string()),
            api_base_url: format!("{}/v1", self.base_url),
            auth_url: format!("{}/token", self.base_url),
            request_timeout: Duration::from_secs(5),
            min_request_interval: Duration::ZERO,
            market: None,
        }
    }

    pub fn client(&self) -> SpotifyClient {
        SpotifyClient::new(self.settings()).expect("Failed to build client")
    }

    /// Path and query of every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received on `path`, whatever their query.
    pub fn request_count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|uri| uri.split('?').next() == Some(path))
            .count()
    }
}

impl Drop for FakeSpotifyServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
