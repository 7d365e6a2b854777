//! Durable storage for the serialized cart.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Where the cart document lives between runs.
///
/// Implementations store an opaque JSON string; the cart manager owns the
/// format.
pub trait CartStore: Send + Sync {
    /// Read the stored document, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the store exists but cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the document cannot be written.
    fn save(&self, contents: &str) -> io::Result<()>;
}

/// Cart persisted to a JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous cart intact.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

impl FileCartStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStore for FileCartStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &self.path)
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    contents: Mutex<Option<String>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// The currently stored document.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> io::Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_owned());
        Ok(())
    }
}
