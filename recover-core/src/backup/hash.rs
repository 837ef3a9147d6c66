// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup file name resolution
//!
//! Device backups store every file under the SHA-1 of `"{domain}-{path}"`,
//! inside a subdirectory named after the first two hex characters.

use std::fmt;

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use serde::{Deserialize, Serialize};

/// Domain used for files in the user's home directory on the device.
pub const HOME_DOMAIN: &str = "HomeDomain";

/// A file inside the backup, identified by its path on the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalFile {
    path: String,
    domain: String,
}

impl LogicalFile {
    /// Creates a logical file in [`HOME_DOMAIN`].
    pub fn new(path: &str) -> Self {
        Self::with_domain(path, HOME_DOMAIN)
    }

    /// Creates a logical file in an explicit domain.
    pub fn with_domain(path: &str, domain: &str) -> Self {
        LogicalFile {
            path: path.to_string(),
            domain: domain.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Name of this file on disk inside the backup folder.
    pub fn obfuscated_name(&self) -> ObfuscatedName {
        resolve(&self.path, &self.domain)
    }
}

/// 40-character lowercase hex SHA-1 naming a file inside the backup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObfuscatedName(String);

impl ObfuscatedName {
    /// Subdirectory holding the file (first two hex characters).
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObfuscatedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the on-disk name of `logical_path` in `domain`.
///
/// # Example
/// ```
/// use recover_core::backup::{resolve, HOME_DOMAIN};
///
/// let name = resolve("Library/SMS/sms.db", HOME_DOMAIN);
/// assert_eq!(name.as_str(), "3d0d7e5fb2ce288813306e4d4636395e047a3d28");
/// assert_eq!(name.prefix(), "3d");
/// ```
pub fn resolve(logical_path: &str, domain: &str) -> ObfuscatedName {
    let input = format!("{}-{}", domain, logical_path);
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, input.as_bytes());
    ObfuscatedName(hex::encode(hash.as_ref()))
}
