//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.

#![allow(dead_code, unused_imports)]

mod constants;
mod fake_catalog;
mod fixtures;
mod spotify_server;

pub use constants::*;
pub use fake_catalog::FakeCatalog;
pub use fixtures::create_test_store;
pub use spotify_server::FakeSpotifyServer;
