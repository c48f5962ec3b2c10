use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pgsh::fs::{FileSystem, RealFileSystem};

/// Real disk access with switchable failures, so scripts still run from the
/// files the store writes.
///
/// - `fail_writes_from(n)`: the n-th `write` (1-based) and later ones create
///   the file, write half the body, then fail.
/// - `fail_removes(true)`: every `remove_file` fails and leaves the file.
#[derive(Debug, Default)]
pub struct FlakyDisk {
    writes: AtomicUsize,
    fail_writes_from: AtomicUsize,
    fail_removes: AtomicBool,
}

impl FlakyDisk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_from(self, call: usize) -> Self {
        self.fail_writes_from.store(call, Ordering::SeqCst);
        self
    }

    pub fn fail_removes(self, fail: bool) -> Self {
        self.fail_removes.store(fail, Ordering::SeqCst);
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FileSystem for FlakyDisk {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        RealFileSystem.read_to_string(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        RealFileSystem.create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let call = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        let from = self.fail_writes_from.load(Ordering::SeqCst);
        if from == 0 || call < from {
            return RealFileSystem.write(path, contents);
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(&contents[..contents.len() / 2])?;
        Err(io::Error::new(
            io::ErrorKind::StorageFull,
            "flaky disk: no space left on device",
        ))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "flaky disk: removes disabled",
            ));
        }
        RealFileSystem.remove_file(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        RealFileSystem.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        RealFileSystem.is_dir(path)
    }
}

/// Names of the entries in `dir`; empty when `dir` doesn't exist.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
