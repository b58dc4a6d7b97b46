//! SQLite-backed catalog store.
//!
//! A single write connection guarded by a mutex. Every write runs inside
//! `BEGIN IMMEDIATE` and is rolled back on the first error.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::collector::{AudioFeature, FeatureValues, Track};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const TRACK_BASE_COLUMNS: &[&str] = &[
    "id",
    "artist_rowid",
    "album_rowid",
    "name",
    "uri",
    "external_url",
    "track_number",
    "duration_ms",
    "kind",
    "explicit",
];

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

/// Creates the schema on an empty database, otherwise checks that the
/// existing one is ours and matches the current version.
fn create_or_validate_schema(conn: &Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and was not created by this tool",
            db_version
        );
    }

    let current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version != latest_version {
        bail!(
            "Database schema version {} does not match the supported version {}",
            current_version,
            latest_version
        );
    }

    latest_schema.validate(conn)
}

fn track_select_sql(filter: &str) -> String {
    let features: Vec<String> = AudioFeature::ALL
        .iter()
        .map(|feature| format!("t.{0} AS {0}", feature.as_str()))
        .collect();
    format!(
        "SELECT t.id AS id, ar.id AS artist_id, al.id AS album_id, t.name AS name, t.uri AS uri, \
         t.external_url AS external_url, t.track_number AS track_number, \
         t.duration_ms AS duration_ms, t.kind AS kind, t.explicit AS explicit, {}, \
         t.time_signature AS time_signature \
         FROM tracks t \
         JOIN artists ar ON ar.rowid = t.artist_rowid \
         JOIN albums al ON al.rowid = t.album_rowid {}",
        features.join(", "),
        filter
    )
}

fn track_insert_sql() -> String {
    let columns: Vec<&str> = TRACK_BASE_COLUMNS
        .iter()
        .copied()
        .chain(AudioFeature::ALL.iter().map(|feature| feature.as_str()))
        .chain(std::iter::once("time_signature"))
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO tracks ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn artist_from_row(row: &Row) -> rusqlite::Result<ArtistRecord> {
    Ok(ArtistRecord {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn album_from_row(row: &Row) -> rusqlite::Result<AlbumRecord> {
    Ok(AlbumRecord {
        id: row.get("id")?,
        artist_id: row.get("artist_id")?,
        name: row.get("name")?,
        image_url: row.get("image_url")?,
    })
}

fn track_from_row(row: &Row) -> rusqlite::Result<TrackRecord> {
    let mut features = FeatureValues::new();
    for feature in AudioFeature::ALL {
        features.insert(feature, row.get(feature.as_str())?);
    }
    let duration_ms: i64 = row.get("duration_ms")?;

    Ok(TrackRecord {
        id: row.get("id")?,
        artist_id: row.get("artist_id")?,
        album_id: row.get("album_id")?,
        name: row.get("name")?,
        uri: row.get("uri")?,
        external_url: row.get("external_url")?,
        track_number: row.get("track_number")?,
        duration_ms: duration_ms.max(0) as u64,
        kind: row.get("kind")?,
        explicit: row.get("explicit")?,
        features,
        time_signature: row.get("time_signature")?,
    })
}

fn rowid_of(conn: &Connection, table: &str, id: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            &format!("SELECT rowid FROM {} WHERE id = ?1", table),
            params![id],
            |r| r.get(0),
        )
        .optional()?)
}

fn insert_artist_row(conn: &Connection, artist: &ArtistRecord) -> Result<i64> {
    if rowid_of(conn, "artists", &artist.id)?.is_some() {
        return Err(CatalogStoreError::AlreadyExists {
            kind: "artist",
            id: artist.id.clone(),
        }
        .into());
    }
    conn.execute(
        "INSERT INTO artists (id, name, name_key) VALUES (?1, ?2, ?3)",
        params![&artist.id, &artist.name, artist.name.to_lowercase()],
    )?;
    debug!("Inserted artist {} ({})", artist.name, artist.id);
    Ok(conn.last_insert_rowid())
}

fn insert_album_row(conn: &Connection, album: &AlbumRecord) -> Result<i64> {
    if rowid_of(conn, "albums", &album.id)?.is_some() {
        return Err(CatalogStoreError::AlreadyExists {
            kind: "album",
            id: album.id.clone(),
        }
        .into());
    }
    let artist_rowid =
        rowid_of(conn, "artists", &album.artist_id)?.ok_or_else(|| CatalogStoreError::NotFound {
            kind: "artist",
            id: album.artist_id.clone(),
        })?;
    conn.execute(
        "INSERT INTO albums (id, artist_rowid, name, image_url) VALUES (?1, ?2, ?3, ?4)",
        params![&album.id, artist_rowid, &album.name, &album.image_url],
    )?;
    debug!("Inserted album {} ({})", album.name, album.id);
    Ok(conn.last_insert_rowid())
}

fn insert_track_row(conn: &Connection, track: &TrackRecord) -> Result<()> {
    if rowid_of(conn, "tracks", &track.id)?.is_some() {
        return Err(CatalogStoreError::AlreadyExists {
            kind: "track",
            id: track.id.clone(),
        }
        .into());
    }
    let artist_rowid =
        rowid_of(conn, "artists", &track.artist_id)?.ok_or_else(|| CatalogStoreError::NotFound {
            kind: "artist",
            id: track.artist_id.clone(),
        })?;
    let album_rowid =
        rowid_of(conn, "albums", &track.album_id)?.ok_or_else(|| CatalogStoreError::NotFound {
            kind: "album",
            id: track.album_id.clone(),
        })?;

    let mut values: Vec<Value> = vec![
        Value::from(track.id.clone()),
        Value::from(artist_rowid),
        Value::from(album_rowid),
        Value::from(track.name.clone()),
        Value::from(track.uri.clone()),
        Value::from(track.external_url.clone()),
        Value::from(i64::from(track.track_number)),
        Value::from(track.duration_ms as i64),
        Value::from(track.kind.clone()),
        Value::from(track.explicit),
    ];
    for feature in AudioFeature::ALL {
        let value = track
            .features
            .get(&feature)
            .copied()
            .ok_or_else(|| CatalogStoreError::NotSerialized(track.id.clone()))?;
        values.push(Value::Real(value));
    }
    values.push(
        track
            .time_signature
            .map_or(Value::Null, |ts| Value::Integer(i64::from(ts))),
    );

    conn.execute(&track_insert_sql(), params_from_iter(values))?;
    Ok(())
}

impl SqliteCatalogStore {
    /// Opens (or creates) the catalog database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;
        Self::from_connection(conn, db_path)
    }

    /// Opens the catalog database at `db_path`, failing when it does not exist.
    pub fn open_existing<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if !db_path.is_file() {
            bail!("Catalog database does not exist: {:?}", db_path);
        }
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;
        Self::from_connection(conn, db_path)
    }

    fn from_connection(conn: Connection, db_path: &Path) -> Result<Self> {
        create_or_validate_schema(&conn)?;
        // not persisted, has to be set on every connection
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let store = SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        info!(
            "Opened catalog {:?}: {} artists, {} albums, {} tracks",
            db_path,
            store.get_artists_count(),
            store.get_albums_count(),
            store.get_tracks_count()
        );
        Ok(store)
    }

    fn with_write_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        match f(&conn) {
            Ok(value) => {
                conn.execute("COMMIT", [])?;
                Ok(value)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn count(&self, table: &str) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .unwrap_or(0)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn insert_artist(&self, artist: &ArtistRecord) -> Result<()> {
        self.with_write_transaction(|conn| insert_artist_row(conn, artist).map(|_| ()))
    }

    fn insert_album(&self, album: &AlbumRecord) -> Result<()> {
        self.with_write_transaction(|conn| insert_album_row(conn, album).map(|_| ()))
    }

    fn insert_track(&self, track: &TrackRecord) -> Result<()> {
        self.with_write_transaction(|conn| insert_track_row(conn, track))
    }

    fn save_tracks(&self, tracks: &[Track]) -> Result<ImportSummary> {
        let records = tracks
            .iter()
            .map(TrackRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let summary = self.with_write_transaction(|conn| {
            let mut summary = ImportSummary::default();
            for (track, record) in tracks.iter().zip(&records) {
                if rowid_of(conn, "artists", &record.artist_id)?.is_none() {
                    insert_artist_row(conn, &ArtistRecord::from(track))?;
                    summary.artists_created += 1;
                }
                if rowid_of(conn, "albums", &record.album_id)?.is_none() {
                    insert_album_row(conn, &AlbumRecord::from(track))?;
                    summary.albums_created += 1;
                }
                insert_track_row(conn, record)?;
                summary.tracks_created += 1;
            }
            Ok(summary)
        })?;

        info!(
            "Saved {} tracks ({} new artists, {} new albums)",
            summary.tracks_created, summary.artists_created, summary.albums_created
        );
        Ok(summary)
    }

    fn delete_artist(&self, id: &str) -> Result<bool> {
        let deleted = self.with_write_transaction(|conn| {
            Ok(conn.execute("DELETE FROM artists WHERE id = ?1", params![id])?)
        })?;
        if deleted > 0 {
            info!("Deleted artist {} with its albums and tracks", id);
        }
        Ok(deleted > 0)
    }

    fn get_artist(&self, id: &str) -> Result<Option<ArtistRecord>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name FROM artists WHERE id = ?1",
                params![id],
                artist_from_row,
            )
            .optional()?)
    }

    fn get_album(&self, id: &str) -> Result<Option<AlbumRecord>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT al.id AS id, ar.id AS artist_id, al.name AS name, al.image_url AS image_url
                 FROM albums al JOIN artists ar ON ar.rowid = al.artist_rowid
                 WHERE al.id = ?1",
                params![id],
                album_from_row,
            )
            .optional()?)
    }

    fn get_track(&self, id: &str) -> Result<Option<TrackRecord>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &track_select_sql("WHERE t.id = ?1"),
                params![id],
                track_from_row,
            )
            .optional()?)
    }

    fn find_artist_by_name(&self, name: &str) -> Result<Option<ArtistRecord>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name FROM artists WHERE name_key = ?1 ORDER BY rowid LIMIT 1",
                params![name.to_lowercase()],
                artist_from_row,
            )
            .optional()?)
    }

    fn get_artist_tracks(&self, artist_id: &str) -> Result<Vec<TrackRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&track_select_sql(
            "WHERE ar.id = ?1 ORDER BY al.rowid, t.track_number, t.rowid",
        ))?;
        let tracks = stmt
            .query_map(params![artist_id], track_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    fn get_artists_count(&self) -> usize {
        self.count("artists")
    }

    fn get_albums_count(&self) -> usize {
        self.count("albums")
    }

    fn get_tracks_count(&self) -> usize {
        self.count("tracks")
    }
}
