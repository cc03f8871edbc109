use std::path::PathBuf;

use pcbdraw_core::FootprintId;
use pcbdraw_svg::SvgError;

/// Problems with a single drawing's SVG.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DrawingError {
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error("viewBox has zero or negative size")]
    DegenerateViewBox,
}

/// Fatal library failures. A footprint that simply is not there is not an error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LibraryError {
    #[error("library root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
    #[error("footprint {id} from library {library}: {source}")]
    Drawing {
        id: FootprintId,
        library: String,
        #[source]
        source: DrawingError,
    },
}
