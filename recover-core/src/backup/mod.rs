// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup Store
//!
//! Locates the address book, message and voicemail databases inside a
//! device backup folder and keeps each one open for the rest of the
//! session. Every database is read from disk at most once per session.

mod hash;
mod source;

pub use hash::{resolve, LogicalFile, ObfuscatedName, HOME_DOMAIN};
pub use source::{DirectoryHandle, FsDirectory, MockDirectory};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::SessionCache;
use crate::error::{RecoverError, RecoverResult};
use crate::query::{open_database, LoadedDatabase};

/// The databases this library knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatabaseKind {
    AddressBook,
    Sms,
    Voicemails,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 3] = [
        DatabaseKind::AddressBook,
        DatabaseKind::Sms,
        DatabaseKind::Voicemails,
    ];

    /// Logical name, e.g. `ADDRESS_BOOK`.
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseKind::AddressBook => "ADDRESS_BOOK",
            DatabaseKind::Sms => "SMS",
            DatabaseKind::Voicemails => "VOICEMAILS",
        }
    }

    /// Path of the database on the device.
    pub fn logical_path(&self) -> &'static str {
        match self {
            DatabaseKind::AddressBook => "Library/AddressBook/AddressBook.sqlitedb",
            DatabaseKind::Sms => "Library/SMS/sms.db",
            DatabaseKind::Voicemails => "Library/Voicemail/voicemail.db",
        }
    }

    pub fn logical_file(&self) -> LogicalFile {
        LogicalFile::new(self.logical_path())
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseKind {
    type Err = RecoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatabaseKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RecoverError::NotFound(format!("unknown database: {}", s)))
    }
}

/// Loads and caches backup databases for one session.
///
/// Safe to share between threads. Concurrent loads of the same database
/// wait for the first one and share its outcome.
pub struct BackupStore {
    root: Mutex<Option<Arc<dyn DirectoryHandle>>>,
    databases: SessionCache<DatabaseKind, Arc<LoadedDatabase>>,
    scratch_dir: Option<PathBuf>,
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStore {
    /// Creates a store with no directory granted yet.
    pub fn new() -> Self {
        BackupStore {
            root: Mutex::new(None),
            databases: SessionCache::new(),
            scratch_dir: None,
        }
    }

    /// Creates a store reading from `root`.
    pub fn with_root(root: Arc<dyn DirectoryHandle>) -> Self {
        let store = Self::new();
        store.initialize(root);
        store
    }

    /// Stages database images in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Records the granted backup folder. No I/O happens here.
    ///
    /// Databases loaded from a previous folder are dropped.
    pub fn initialize(&self, root: Arc<dyn DirectoryHandle>) {
        *self.root.lock() = Some(root);
        self.databases.reset();
    }

    /// Drops the granted folder and every loaded database.
    pub fn reset(&self) {
        *self.root.lock() = None;
        self.databases.reset();
    }

    /// Returns true if a folder has been granted.
    pub fn has_root(&self) -> bool {
        self.root.lock().is_some()
    }

    /// Returns true if `kind` is loaded and cached.
    pub fn is_loaded(&self, kind: DatabaseKind) -> bool {
        self.databases.contains(&kind)
    }

    /// Returns the database for `kind`, reading it on first use.
    ///
    /// # Errors
    /// - `NoDirectory` before [`initialize`](Self::initialize)
    /// - `NotFound` if the backup lacks the database
    /// - `AccessDenied` if the grant was revoked
    /// - `CorruptDatabase` if the file is not a readable database
    pub fn load(&self, kind: DatabaseKind) -> RecoverResult<Arc<LoadedDatabase>> {
        self.databases.get_or_try_insert_with(kind, || {
            let root = self.root.lock().clone().ok_or(RecoverError::NoDirectory)?;
            let bytes = read_backup_file(root.as_ref(), &kind.logical_file())?;
            let name = kind.logical_file().obfuscated_name();
            info!(database = %kind, file = %name, bytes = bytes.len(), "loaded backup database");
            let db = open_database(&bytes, self.scratch_dir.as_deref())?;
            Ok(Arc::new(db))
        })
    }
}

/// Reads `file` from a backup folder laid out as `<prefix>/<name>`.
pub fn read_backup_file(root: &dyn DirectoryHandle, file: &LogicalFile) -> RecoverResult<Vec<u8>> {
    let name = file.obfuscated_name();
    let dir = root.get_directory(name.prefix())?;
    dir.read_file(name.as_str())
}
