//! Flat file storage backends.
//!
//! The catalog and saved pools only ever read, write, append to, and delete
//! whole named files in one private directory. [`Storage`] captures exactly
//! that; [`DirStorage`] is the real backend and [`MemoryStorage`] backs tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// Named files in a single private directory.
pub trait Storage {
    /// Contents of `file`, or `None` if it does not exist.
    fn read(&self, file: &str) -> StoreResult<Option<String>>;

    /// Create or overwrite `file`.
    fn write(&mut self, file: &str, contents: &str) -> StoreResult<()>;

    /// Append `line` and a newline to `file`, creating it if needed.
    fn append_line(&mut self, file: &str, line: &str) -> StoreResult<()>;

    /// Delete `file`. Deleting a missing file succeeds.
    fn remove(&mut self, file: &str) -> StoreResult<()>;

    /// True if `file` exists.
    fn exists(&self, file: &str) -> bool;
}

/// Files in a directory on disk.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Use `root`, creating it if it does not exist yet.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The backing directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

impl Storage for DirStorage {
    fn read(&self, file: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path(file)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, file: &str, contents: &str) -> StoreResult<()> {
        fs::write(self.path(file), contents)?;
        Ok(())
    }

    fn append_line(&mut self, file: &str, line: &str) -> StoreResult<()> {
        let mut handle = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(file))?;
        writeln!(handle, "{line}")?;
        Ok(())
    }

    fn remove(&mut self, file: &str) -> StoreResult<()> {
        match fs::remove_file(self.path(file)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn exists(&self, file: &str) -> bool {
        self.path(file).is_file()
    }
}

/// Files held in memory.
///
/// Individual files can be marked as failing, after which every access to
/// them returns an I/O error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<String, String>,
    failing: BTreeSet<String>,
    writes: usize,
}

impl MemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later access to `file` fail.
    pub fn fail_on(&mut self, file: impl Into<String>) {
        self.failing.insert(file.into());
    }

    /// Let `file` be accessed again.
    pub fn recover(&mut self, file: &str) {
        self.failing.remove(file);
    }

    /// Names of all stored files.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of successful writes, appends, and removals so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check(&self, file: &str) -> StoreResult<()> {
        if self.failing.contains(file) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{file} is not accessible"),
            )
            .into());
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn read(&self, file: &str) -> StoreResult<Option<String>> {
        self.check(file)?;
        Ok(self.files.get(file).cloned())
    }

    fn write(&mut self, file: &str, contents: &str) -> StoreResult<()> {
        self.check(file)?;
        self.files.insert(file.to_string(), contents.to_string());
        self.writes += 1;
        Ok(())
    }

    fn append_line(&mut self, file: &str, line: &str) -> StoreResult<()> {
        self.check(file)?;
        let text = self.files.entry(file.to_string()).or_default();
        text.push_str(line);
        text.push('\n');
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, file: &str) -> StoreResult<()> {
        self.check(file)?;
        self.files.remove(file);
        self.writes += 1;
        Ok(())
    }

    fn exists(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }
}
