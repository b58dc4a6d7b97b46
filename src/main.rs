use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use track_collector::catalog_store::{CatalogStore, SqliteCatalogStore};
use track_collector::collector::{
    serialize_tracks, sort_tracks_by_audio_feature, AudioFeature, TrackCollector,
};
use track_collector::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_MIN_REQUEST_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_SEC,
};
use track_collector::SpotifyClient;

#[derive(Parser, Debug)]
#[clap(version, about = "Collects and ranks an artist's studio-album tracks")]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite catalog database file.
    #[clap(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[clap(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    #[clap(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Market (ISO 3166-1 alpha-2) used to filter catalog listings.
    #[clap(long, global = true)]
    pub market: Option<String>,

    /// Timeout in seconds for catalog API requests.
    #[clap(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Minimum delay in milliseconds between two catalog API requests.
    #[clap(long, global = true, default_value_t = DEFAULT_MIN_REQUEST_INTERVAL_MS)]
    pub min_request_interval_ms: u64,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the raw tracks of the first album matching the query.
    Album { query: String },

    /// Collect the tracks of an artist's albums, enriched with audio features.
    Artist {
        query: String,

        /// Keep live, christmas and multi-artist albums.
        #[clap(long)]
        no_sanitize: bool,

        /// Store the collected tracks in the catalog database.
        #[clap(long)]
        save: bool,

        /// Print a ranking by this feature instead of the tracks.
        #[clap(long)]
        sort_by: Option<String>,
    },

    /// Rank the stored tracks of an artist.
    Stored {
        artist_name: String,

        #[clap(long)]
        sort_by: String,
    },

    /// List the feature names tracks can be ranked by.
    Features,
}

impl CliArgs {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            db_path: self.db_path.clone(),
            market: self.market.clone(),
            request_timeout_sec: self.request_timeout_sec,
            min_request_interval_ms: self.min_request_interval_ms,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn collector(config: &AppConfig) -> Result<TrackCollector> {
    let client = SpotifyClient::new(config.spotify_settings())?;
    info!("Using catalog API at {}", client.api_base_url());
    Ok(TrackCollector::new(Arc::new(client)))
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.cli_config(), file_config)?;

    match cli_args.command {
        Command::Album { query } => {
            let tracks = collector(&config)?.tracks_by_album(&query)?;
            print_json(&tracks)
        }
        Command::Artist {
            query,
            no_sanitize,
            save,
            sort_by,
        } => {
            // fail before any request is made
            if let Some(feature_name) = &sort_by {
                feature_name.parse::<AudioFeature>()?;
            }

            let mut tracks = collector(&config)?.tracks_by_artist(&query, !no_sanitize)?;
            serialize_tracks(&mut tracks);

            if save {
                let store = SqliteCatalogStore::new(&config.db_path)?;
                let summary = store.save_tracks(&tracks)?;
                info!(
                    "Stored {} tracks in {:?}",
                    summary.tracks_created, config.db_path
                );
            }

            match sort_by {
                Some(feature_name) => {
                    print_json(&sort_tracks_by_audio_feature(&feature_name, &tracks)?)
                }
                None => print_json(&tracks),
            }
        }
        Command::Stored {
            artist_name,
            sort_by,
        } => {
            let store = SqliteCatalogStore::open_existing(&config.db_path)?;
            let artist = store
                .find_artist_by_name(&artist_name)?
                .with_context(|| format!("No stored artist named '{}'", artist_name))?;
            let tracks = store.get_artist_tracks(&artist.id)?;
            print_json(&sort_tracks_by_audio_feature(&sort_by, &tracks)?)
        }
        Command::Features => {
            for feature in AudioFeature::ALL {
                println!("{}", feature);
            }
            Ok(())
        }
    }
}
