// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Opening database images.

use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use tracing::debug;

use crate::error::{RecoverError, RecoverResult};

/// Every SQLite database file starts with this header.
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Size of the SQLite file header.
const SQLITE_HEADER_LEN: usize = 100;

/// A read-only, in-memory copy of one database from the backup.
pub struct LoadedDatabase {
    conn: Mutex<Connection>,
    size: usize,
}

impl LoadedDatabase {
    /// Opens `bytes`, staging them in the system temp directory.
    pub fn open(bytes: &[u8]) -> RecoverResult<Self> {
        open_database(bytes, None)
    }

    /// Size of the image this database was opened from.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `f` against the connection. Queries on one database are serialized.
    pub fn with_connection<T, F>(&self, f: F) -> RecoverResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        Ok(f(&conn)?)
    }

    /// Returns true if the schema has a table called `name`.
    pub fn has_table(&self, name: &str) -> RecoverResult<bool> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [name],
                |row| row.get(0),
            )
        })
    }
}

impl std::fmt::Debug for LoadedDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedDatabase")
            .field("size", &self.size)
            .finish()
    }
}

/// Parses `bytes` as a database image.
///
/// The image is written to a private scratch directory (inside
/// `scratch_dir` when given), copied into an in-memory connection with the
/// online backup API, and the scratch copy is removed before returning.
/// The resulting connection refuses writes.
pub fn open_database(bytes: &[u8], scratch_dir: Option<&Path>) -> RecoverResult<LoadedDatabase> {
    if bytes.len() < SQLITE_HEADER_LEN || !bytes.starts_with(SQLITE_HEADER) {
        return Err(RecoverError::CorruptDatabase(
            "missing SQLite header (wrong file or encrypted backup)".to_string(),
        ));
    }

    let staging = match scratch_dir {
        Some(dir) => tempfile::Builder::new().prefix("recover-").tempdir_in(dir),
        None => tempfile::Builder::new().prefix("recover-").tempdir(),
    }
    .map_err(|e| RecoverError::from_io(&e, "scratch directory"))?;

    let image = staging.path().join("image.db");
    fs::write(&image, bytes).map_err(|e| RecoverError::from_io(&e, "staged image"))?;

    let mut conn = Connection::open_in_memory()?;
    conn.restore(DatabaseName::Main, &image, None::<fn(Progress)>)
        .map_err(|e| RecoverError::CorruptDatabase(e.to_string()))?;

    let tables: i64 = conn
        .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get(0))
        .map_err(|e| RecoverError::CorruptDatabase(e.to_string()))?;
    conn.execute_batch("PRAGMA query_only = ON")?;

    debug!(bytes = bytes.len(), tables, "opened database image");

    Ok(LoadedDatabase {
        conn: Mutex::new(conn),
        size: bytes.len(),
    })
}
