use std::path::Path;

use pcbdraw_core::FootprintId;

use crate::cache::{DrawingCache, Lookup};
use crate::{DirLibrary, FootprintDrawing, FootprintLibrary, LibraryError};

/// Resolves footprint ids against an ordered list of libraries. The first library that
/// has a drawing wins; nothing is merged across libraries.
///
/// One resolver serves one run: its cache lives exactly as long as it does.
pub struct Resolver {
    libraries: Vec<Box<dyn FootprintLibrary>>,
    cache: DrawingCache,
}

impl Resolver {
    pub fn new(libraries: Vec<Box<dyn FootprintLibrary>>) -> Self {
        Self {
            libraries,
            cache: DrawingCache::new(),
        }
    }

    /// Directory libraries, searched in the given order.
    pub fn from_dirs<P: AsRef<Path>>(roots: &[P]) -> Result<Self, LibraryError> {
        let libraries = roots
            .iter()
            .map(|root| {
                DirLibrary::open(root.as_ref())
                    .map(|lib| Box::new(lib) as Box<dyn FootprintLibrary>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(libraries))
    }

    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.iter().map(|l| l.name())
    }

    /// `Ok(None)` is a miss; errors mean a drawing exists but could not be used.
    pub fn resolve(&self, id: &FootprintId) -> Lookup {
        self.cache.get_or_load(id, || self.search(id))
    }

    pub fn cache(&self) -> &DrawingCache {
        &self.cache
    }

    fn search(&self, id: &FootprintId) -> Result<Option<FootprintDrawing>, LibraryError> {
        for lib in &self.libraries {
            let Some(text) = lib.load(id)? else {
                continue;
            };
            tracing::debug!(%id, library = lib.name(), "footprint found");
            return FootprintDrawing::from_svg(id.clone(), lib.name(), &text)
                .map(Some)
                .map_err(|source| LibraryError::Drawing {
                    id: id.clone(),
                    library: lib.name().to_string(),
                    source,
                });
        }
        tracing::debug!(%id, "footprint not found in any library");
        Ok(None)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("libraries", &self.library_names().collect::<Vec<_>>())
            .field("cached", &self.cache.len())
            .finish()
    }
}
