// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! Unified error type for backup access, queries and exports.

use std::io;

use thiserror::Error;

/// Unified error type for Recover operations.
///
/// Errors are `Clone` so that every caller waiting on the same in-flight
/// load or lookup observes the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoverError {
    /// A file or subdirectory is missing from the selected folder.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission to the backup directory was revoked or never granted.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The bytes are not a readable database image (wrong file, encrypted backup).
    #[error("corrupt database: {0}")]
    CorruptDatabase(String),

    /// The database engine rejected a query.
    #[error("query error: {0}")]
    Query(String),

    /// Any other I/O failure while reading the backup.
    #[error("io error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No backup directory has been granted yet.
    #[error("no backup directory selected")]
    NoDirectory,

    /// Messages were requested with no conversation open.
    #[error("no conversation selected")]
    NoConversationSelected,
}

impl RecoverError {
    /// Maps an I/O error by kind, keeping `context` (usually a path) in the message.
    pub fn from_io(err: &io::Error, context: &str) -> Self {
        let message = format!("{}: {}", context, err);
        match err.kind() {
            io::ErrorKind::NotFound => RecoverError::NotFound(message),
            io::ErrorKind::PermissionDenied => RecoverError::AccessDenied(message),
            _ => RecoverError::Io(message),
        }
    }

    /// Returns true if the session stays usable after this error.
    ///
    /// Query errors indicate a defect rather than a property of the backup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RecoverError::Query(_))
    }
}

impl From<rusqlite::Error> for RecoverError {
    fn from(err: rusqlite::Error) -> Self {
        RecoverError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for RecoverError {
    fn from(err: serde_json::Error) -> Self {
        RecoverError::Serialization(err.to_string())
    }
}

/// Result type for Recover operations.
pub type RecoverResult<T> = Result<T, RecoverError>;
