use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use pcbdraw_core::FootprintId;

use crate::{FootprintDrawing, LibraryError};

pub type Lookup = Result<Option<Arc<FootprintDrawing>>, LibraryError>;

type Slot = Arc<OnceLock<Lookup>>;

/// Run-scoped memo of drawing lookups, misses included.
///
/// The map lock is only held long enough to fetch the per-id slot; the slot's `OnceLock`
/// then runs the loader at most once while concurrent callers for the same id wait.
#[derive(Debug, Default)]
pub struct DrawingCache {
    slots: Mutex<HashMap<FootprintId, Slot>>,
    loads: AtomicUsize,
}

impl DrawingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &self,
        id: &FootprintId,
        load: impl FnOnce() -> Result<Option<FootprintDrawing>, LibraryError>,
    ) -> Lookup {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id.clone()).or_default())
        };
        slot.get_or_init(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%id, "loading footprint drawing");
            load().map(|found| found.map(Arc::new))
        })
        .clone()
    }

    /// How many times a loader actually ran.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
