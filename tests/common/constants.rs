//! Ids and names shared by `FakeCatalog` and `FakeSpotifyServer`.

pub const ARTIST_ID: &str = "tc-0001";
pub const ARTIST_NAME: &str = "Thundercat";

pub const GUEST_ARTIST_ID: &str = "fl-0002";
pub const GUEST_ARTIST_NAME: &str = "Flying Lotus";

pub const DRUNK_ALBUM_ID: &str = "alb-drunk";
pub const DRUNK_ALBUM_NAME: &str = "Drunk";
pub const IT_IS_ALBUM_ID: &str = "alb-itis";
pub const IT_IS_ALBUM_NAME: &str = "It Is What It Is";
pub const LIVE_ALBUM_ID: &str = "alb-live";
pub const LIVE_ALBUM_NAME: &str = "Live in Paris";
pub const CHRISTMAS_ALBUM_ID: &str = "alb-xmas";
pub const CHRISTMAS_ALBUM_NAME: &str = "A Thundercat Christmas";
pub const COLLAB_ALBUM_ID: &str = "alb-collab";
pub const COLLAB_ALBUM_NAME: &str = "Brainfeeder Sessions";
pub const SINGLE_ALBUM_ID: &str = "alb-single";

/// Albums kept when sanitizing, in catalog order.
pub const STUDIO_ALBUM_IDS: &[&str] = &[DRUNK_ALBUM_ID, IT_IS_ALBUM_ID];

pub const STUDIO_TRACK_COUNT: usize = 5;
pub const ALL_ALBUM_TRACK_COUNT: usize = 9;

// Fake Spotify server
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_ACCESS_TOKEN: &str = "test-access-token";
pub const SERVER_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Album whose track listing fails with a server error.
pub const BROKEN_ALBUM_ID: &str = "alb-broken";
/// Track without an audio analysis.
pub const MISSING_TRACK_ID: &str = "trk-missing";
/// Track whose presence makes a feature batch come back one entry short.
pub const SHORT_BATCH_TRACK_ID: &str = "trk-short";
