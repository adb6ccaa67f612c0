//! Persisted fallback count window.
//!
//! One value, `{"startMs": .., "endMs": ..}`, written when a fallback window
//! is synthesized so a restart within the window keeps the same timeline.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use en_core::CountWindow;

use crate::canonical_json::write_canonical_file;
use crate::{IoError, IoResult};

/// Storage for the single fallback window key.
pub trait WindowStore {
    /// The stored window, or `None` when nothing has been stored yet.
    fn load(&self) -> IoResult<Option<CountWindow>>;
    fn save(&mut self, window: &CountWindow) -> IoResult<()>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileWindowStore {
    path: PathBuf,
}

impl FileWindowStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WindowStore for FileWindowStore {
    fn load(&self) -> IoResult<Option<CountWindow>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IoError::Path(format!("{}: {e}", self.path.display()))),
        };
        let w: CountWindow = serde_json::from_slice(&bytes)?;
        if !w.is_valid() {
            return Err(IoError::Invalid(format!(
                "stored window in {} has endMs <= startMs",
                self.path.display()
            )));
        }
        Ok(Some(w))
    }

    fn save(&mut self, window: &CountWindow) -> IoResult<()> {
        write_canonical_file(&self.path, &serde_json::to_value(window)?)
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryWindowStore {
    window: Option<CountWindow>,
}

impl MemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: CountWindow) -> Self {
        Self { window: Some(window) }
    }
}

impl WindowStore for MemoryWindowStore {
    fn load(&self) -> IoResult<Option<CountWindow>> {
        Ok(self.window)
    }

    fn save(&mut self, window: &CountWindow) -> IoResult<()> {
        self.window = Some(*window);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileWindowStore::new(dir.path().join("window.json"));
        assert_eq!(store.load().unwrap(), None);

        let w = CountWindow::new(1_000, 301_000).unwrap();
        store.save(&w).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, r#"{"endMs":301000,"startMs":1000}"#);
        assert_eq!(store.load().unwrap(), Some(w));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.json");
        std::fs::write(&path, r#"{"startMs": 5, "endMs": 5}"#).unwrap();
        assert!(matches!(FileWindowStore::new(&path).load(), Err(IoError::Invalid(_))));
        std::fs::write(&path, "nope").unwrap();
        assert!(matches!(FileWindowStore::new(&path).load(), Err(IoError::Json { .. })));
    }
}
