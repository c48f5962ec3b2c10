// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem with switchable failures.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    fail_writes: Arc<Mutex<bool>>,
    fail_removes: Arc<Mutex<bool>>,
    /// `(calls so far, first failing call)` for partial writes.
    partial_writes: Arc<Mutex<(usize, Option<usize>)>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        if let Some(parent) = path.parent() {
            ensure_dirs(&mut entries, parent);
        }
        entries.insert(path, MockEntry::File(content.into()));
    }

    /// Make every subsequent `write`/`create_dir_all` fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// From the `call`-th `write` on (1-based), create the file with a
    /// truncated body and then fail, like a disk that fills up mid-write.
    pub fn fail_writes_from(&self, call: usize) {
        let mut partial = self.partial_writes.lock().unwrap_or_else(|e| e.into_inner());
        *partial = (0, Some(call));
    }

    /// Make every subsequent `remove_file` fail.
    pub fn fail_removes(&self, fail: bool) {
        *self.fail_removes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// Paths of all files currently stored, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .lock()
            .iter()
            .filter(|(_, e)| matches!(e, MockEntry::File(_)))
            .map(|(p, _)| p.clone())
            .collect();
        files.sort();
        files
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn writes_fail(&self) -> bool {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Count one write; `true` if it should be cut short.
    fn write_is_partial(&self) -> bool {
        let mut partial = self.partial_writes.lock().unwrap_or_else(|e| e.into_inner());
        partial.0 += 1;
        partial.1.is_some_and(|from| partial.0 >= from)
    }

    fn removes_fail(&self) -> bool {
        *self.fail_removes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {path:?}"))
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.lock().get(path) {
            Some(MockEntry::File(content)) => String::from_utf8(content.clone())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Some(MockEntry::Dir) => Err(io::Error::other(format!("is a directory: {path:?}"))),
            None => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.writes_fail() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock: writes disabled",
            ));
        }
        ensure_dirs(&mut self.lock(), path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.writes_fail() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock: writes disabled",
            ));
        }
        let mut entries = self.lock();
        let parent_ok = path
            .parent()
            .map(|p| p.as_os_str().is_empty() || matches!(entries.get(p), Some(MockEntry::Dir)))
            .unwrap_or(true);
        if !parent_ok {
            return Err(not_found(path));
        }
        if self.write_is_partial() {
            let cut = contents.len() / 2;
            entries.insert(path.to_path_buf(), MockEntry::File(contents[..cut].to_vec()));
            return Err(io::Error::new(
                io::ErrorKind::StorageFull,
                "mock: no space left on device",
            ));
        }
        entries.insert(path.to_path_buf(), MockEntry::File(contents.to_vec()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.removes_fail() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock: removes disabled",
            ));
        }
        let mut entries = self.lock();
        match entries.get(path) {
            Some(MockEntry::File(_)) => {
                entries.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(io::Error::other(format!("is a directory: {path:?}"))),
            None => Err(not_found(path)),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir))
    }
}
