// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Directory Handle Trait
//!
//! Read-only abstraction over the folder the user granted access to.
//! Hosts without a plain filesystem (sandboxed pickers, archives) implement
//! [`DirectoryHandle`]; [`FsDirectory`] covers a local path and
//! [`MockDirectory`] serves files from memory for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::hash::LogicalFile;
use crate::error::{RecoverError, RecoverResult};

/// A directory the user granted read access to.
///
/// Operations block until complete. Implementations report a missing entry
/// as [`RecoverError::NotFound`] and a revoked grant as
/// [`RecoverError::AccessDenied`].
pub trait DirectoryHandle: Send + Sync {
    /// Name of this directory (last path component).
    fn name(&self) -> &str;

    /// Opens the child directory `name`.
    fn get_directory(&self, name: &str) -> RecoverResult<Arc<dyn DirectoryHandle>>;

    /// Reads the full contents of the child file `name`.
    fn read_file(&self, name: &str) -> RecoverResult<Vec<u8>>;
}

/// Entry names are single path components; anything else cannot exist.
fn check_entry_name(name: &str) -> RecoverResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(RecoverError::NotFound(format!("invalid entry name: {:?}", name)));
    }
    Ok(())
}

// =============================================================================
// Filesystem
// =============================================================================

/// Directory handle backed by a local path.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
    name: String,
}

impl FsDirectory {
    /// Opens `path` as a directory handle.
    pub fn open<P: AsRef<Path>>(path: P) -> RecoverResult<Self> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();
        let metadata = fs::metadata(&path).map_err(|e| RecoverError::from_io(&e, &display))?;
        if !metadata.is_dir() {
            return Err(RecoverError::NotFound(format!("not a directory: {}", display)));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FsDirectory { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryHandle for FsDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_directory(&self, name: &str) -> RecoverResult<Arc<dyn DirectoryHandle>> {
        check_entry_name(name)?;
        Ok(Arc::new(FsDirectory::open(self.path.join(name))?))
    }

    fn read_file(&self, name: &str) -> RecoverResult<Vec<u8>> {
        check_entry_name(name)?;
        let path = self.path.join(name);
        fs::read(&path).map_err(|e| RecoverError::from_io(&e, &path.display().to_string()))
    }
}

// =============================================================================
// In-memory mock
// =============================================================================

#[derive(Default)]
struct MockTree {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    directories: Mutex<BTreeSet<String>>,
    reads: AtomicUsize,
    revoked: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

/// In-memory directory handle for tests.
///
/// Counts file reads and can simulate a revoked grant or slow storage.
/// Clones share the same tree.
#[derive(Clone, Default)]
pub struct MockDirectory {
    tree: Arc<MockTree>,
    path: String,
    name: String,
}

impl MockDirectory {
    /// Creates an empty root directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` at a slash-separated path relative to the root,
    /// creating intermediate directories.
    pub fn insert_file(&self, path: &str, bytes: Vec<u8>) {
        let full = join(&self.path, path);
        let mut directories = self.tree.directories.lock();
        let mut parent = full.as_str();
        while let Some((dir, _)) = parent.rsplit_once('/') {
            directories.insert(dir.to_string());
            parent = dir;
        }
        self.tree.files.lock().insert(full, bytes);
    }

    /// Stores `bytes` where a device backup keeps `file`.
    pub fn insert_backup_file(&self, file: &LogicalFile, bytes: Vec<u8>) {
        let name = file.obfuscated_name();
        self.insert_file(&format!("{}/{}", name.prefix(), name), bytes);
    }

    /// Creates an empty subdirectory.
    pub fn insert_directory(&self, path: &str) {
        self.tree.directories.lock().insert(join(&self.path, path));
    }

    /// Number of successful file reads across all handles of this tree.
    pub fn read_count(&self) -> usize {
        self.tree.reads.load(Ordering::SeqCst)
    }

    /// Makes every further operation fail with `AccessDenied`.
    pub fn revoke(&self) {
        self.tree.revoked.store(true, Ordering::SeqCst);
    }

    /// Restores access after [`revoke`](Self::revoke).
    pub fn regrant(&self) {
        self.tree.revoked.store(false, Ordering::SeqCst);
    }

    /// Delays every file read, to widen race windows in tests.
    pub fn set_read_delay(&self, delay: Duration) {
        *self.tree.read_delay.lock() = Some(delay);
    }

    fn check_access(&self) -> RecoverResult<()> {
        if self.tree.revoked.load(Ordering::SeqCst) {
            return Err(RecoverError::AccessDenied(format!(
                "grant revoked for {:?}",
                self.path
            )));
        }
        Ok(())
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

impl DirectoryHandle for MockDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_directory(&self, name: &str) -> RecoverResult<Arc<dyn DirectoryHandle>> {
        self.check_access()?;
        check_entry_name(name)?;
        let path = join(&self.path, name);
        if !self.tree.directories.lock().contains(&path) {
            return Err(RecoverError::NotFound(format!("no directory {}", path)));
        }
        Ok(Arc::new(MockDirectory {
            tree: Arc::clone(&self.tree),
            path,
            name: name.to_string(),
        }))
    }

    fn read_file(&self, name: &str) -> RecoverResult<Vec<u8>> {
        self.check_access()?;
        check_entry_name(name)?;
        let delay = *self.tree.read_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        let path = join(&self.path, name);
        let bytes = self
            .tree
            .files
            .lock()
            .get(&path)
            .cloned()
            .ok_or_else(|| RecoverError::NotFound(format!("no file {}", path)))?;
        self.tree.reads.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }
}
