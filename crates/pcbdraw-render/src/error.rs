use pcbdraw_core::{BoardError, WarningsAsErrors};
use pcbdraw_library::LibraryError;

use crate::StyleError;

/// Fatal conditions: no document is produced.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
    #[error("invalid style: {0}")]
    Style(#[from] StyleError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Strict(#[from] WarningsAsErrors),
}
