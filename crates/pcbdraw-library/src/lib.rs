//! Footprint drawing libraries: where drawings come from, how they are parsed and the
//! per-run cache that makes every drawing load at most once.

pub mod cache;
pub mod drawing;
pub mod error;
pub mod resolver;
pub mod source;

pub use cache::DrawingCache;
pub use drawing::{band_slot_id, FootprintDrawing, BAND_SLOT_PREFIX, MAX_BAND_SLOTS, ORIGIN_ID};
pub use error::{DrawingError, LibraryError};
pub use resolver::Resolver;
pub use source::{DirLibrary, FootprintLibrary, MemoryLibrary};
