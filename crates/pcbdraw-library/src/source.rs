use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pcbdraw_core::FootprintId;

use crate::LibraryError;

/// A place footprint drawings can be read from.
pub trait FootprintLibrary: Send + Sync {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Raw SVG text for `id`, or `None` when this library has no such drawing.
    fn load(&self, id: &FootprintId) -> Result<Option<String>, LibraryError>;
}

/// Directory layout `<root>/<library>/<module>.svg`.
#[derive(Debug, Clone)]
pub struct DirLibrary {
    root: PathBuf,
    name: String,
}

impl DirLibrary {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(LibraryError::NotADirectory(root));
        }
        let name = root.display().to_string();
        Ok(Self { root, name })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, id: &FootprintId) -> Option<PathBuf> {
        let safe = |s: &str| !s.contains(['/', '\\']) && s != ".." && s != ".";
        if !safe(id.library()) || !safe(id.module()) {
            return None;
        }
        Some(
            self.root
                .join(id.library())
                .join(format!("{}.svg", id.module())),
        )
    }
}

impl FootprintLibrary for DirLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, id: &FootprintId) -> Result<Option<String>, LibraryError> {
        let Some(path) = self.file_for(id) else {
            tracing::debug!(%id, "footprint id is not a valid file name");
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LibraryError::Read {
                path,
                message: err.to_string(),
            }),
        }
    }
}

/// Drawings held in memory; handy for embedding and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    name: String,
    entries: IndexMap<FootprintId, String>,
}

impl MemoryLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, id: FootprintId, svg: impl Into<String>) -> Self {
        self.insert(id, svg);
        self
    }

    pub fn insert(&mut self, id: FootprintId, svg: impl Into<String>) {
        self.entries.insert(id, svg.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FootprintLibrary for MemoryLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, id: &FootprintId) -> Result<Option<String>, LibraryError> {
        Ok(self.entries.get(id).cloned())
    }
}
