use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;
use track_collector::catalog_store::SqliteCatalogStore;

/// Creates an empty catalog database inside a fresh temporary directory.
/// Returns (temp_dir, db_path, store); the directory is removed on drop.
pub fn create_test_store() -> Result<(TempDir, PathBuf, SqliteCatalogStore)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::new(&db_path)?;
    Ok((dir, db_path, store))
}
