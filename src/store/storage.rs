use super::document::{Document, StoreError};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default directory for stored documents (~/.config/seoye-judge/)
pub fn default_store_dir() -> PathBuf {
    crate::config::get_config_dir()
}

/// Directory-backed store holding one JSON file per document kind.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding documents of type `D`
    pub fn path_for<D: Document>(&self) -> PathBuf {
        self.dir.join(format!("{}.json", D::KIND))
    }

    /// Load a document.
    ///
    /// If the file doesn't exist, returns `D::default()`.
    /// If the file exists but has an unsupported version, returns an error.
    pub fn load<D: Document>(&self) -> Result<D> {
        let path = self.path_for::<D>();
        if !path.exists() {
            tracing::debug!(kind = D::KIND, path = %path.display(), "no stored document, starting empty");
            return Ok(D::default());
        }

        let file = File::open(&path)
            .with_context(|| format!("Failed to open {} file at {}", D::KIND, path.display()))?;

        let mut doc: D = serde_json::from_reader(file)
            .with_context(|| format!("Failed to load {} from {}", D::KIND, path.display()))?;

        if doc.version() != D::VERSION {
            return Err(StoreError::UnsupportedVersion {
                kind: D::KIND,
                found: doc.version(),
                expected: D::VERSION,
            }
            .into());
        }

        doc.after_load()?;
        tracing::debug!(kind = D::KIND, path = %path.display(), "loaded document");
        Ok(doc)
    }

    /// Save a document atomically.
    ///
    /// The file is never left half-written. Creates the store directory if it doesn't exist.
    pub fn save<D: Document>(&self, doc: &D) -> Result<()> {
        crate::config::ensure_dir(&self.dir)?;

        let path = self.path_for::<D>();
        let mut file = AtomicWriteFile::open(&path)
            .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

        serde_json::to_writer_pretty(&mut file, doc)
            .with_context(|| format!("Failed to serialize {}", D::KIND))?;

        file.commit()
            .with_context(|| format!("Failed to save {} to {}", D::KIND, path.display()))?;

        tracing::debug!(kind = D::KIND, path = %path.display(), "saved document");
        Ok(())
    }
}

/// Empty store under the temp dir, unique per test name and process.
#[cfg(test)]
pub(crate) fn scratch_store(name: &str) -> RecordStore {
    let dir = std::env::temp_dir().join(format!("seoye_judge_test_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    RecordStore::new(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Notes {
        version: u32,
        lines: Vec<String>,
        #[serde(skip)]
        loaded: bool,
    }

    impl Default for Notes {
        fn default() -> Self {
            Self {
                version: 1,
                lines: Vec::new(),
                loaded: false,
            }
        }
    }

    impl Document for Notes {
        const KIND: &'static str = "notes";
        const VERSION: u32 = 1;

        fn version(&self) -> u32 {
            self.version
        }

        fn after_load(&mut self) -> Result<(), StoreError> {
            self.loaded = true;
            Ok(())
        }
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let store = scratch_store("missing");
        let notes: Notes = store.load().unwrap();
        assert_eq!(notes, Notes::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = scratch_store("roundtrip");
        let notes = Notes {
            version: 1,
            lines: vec!["해서".to_string(), "행서".to_string()],
            loaded: false,
        };

        store.save(&notes).unwrap();
        let loaded: Notes = store.load().unwrap();

        assert_eq!(loaded.lines, notes.lines);
        assert!(loaded.loaded, "after_load hook should run");
        assert!(store.path_for::<Notes>().ends_with("notes.json"));

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let store = scratch_store("version");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for::<Notes>(), r#"{"version": 2, "lines": []}"#).unwrap();

        let err = store.load::<Notes>().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::UnsupportedVersion { found: 2, expected: 1, .. })
        ));

        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let store = scratch_store("malformed");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for::<Notes>(), "{ not json").unwrap();

        let err = store.load::<Notes>().unwrap_err();
        assert!(err.to_string().contains("Failed to load notes"));

        let _ = fs::remove_dir_all(store.dir());
    }
}
