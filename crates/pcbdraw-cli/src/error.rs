use std::io;
use std::path::PathBuf;

use pcbdraw_library::LibraryError;
use pcbdraw_raster::RasterError;
use pcbdraw_render::{RenderError, StyleError};

/// Everything `pcbdraw render` can fail with. The exit status tells the caller whose
/// fault it was: 1 for the command line, 2 for the files it was given, 3 for the run itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("could not read {what} file {}: {source}", path.display())]
    Read {
        what: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid {what} file {}: {source}", path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid style: {0}")]
    Style(#[from] StyleError),
    /// Library roots are checked before rendering starts.
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("could not rasterize: {0}")]
    Raster(#[from] RasterError),
    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 1,
            Self::Read { .. } | Self::Parse { .. } | Self::Style(_) | Self::Library(_) => 2,
            Self::Render(RenderError::Board(_) | RenderError::Style(_)) => 2,
            Self::Render(_) | Self::Raster(_) | Self::Write { .. } => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcbdraw_core::{BoardError, DiagnosticKind, Diagnostics};

    #[test]
    fn bad_board_is_an_input_error() {
        let err: CliError = RenderError::from(BoardError::DuplicateReference("R1".into())).into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn strict_warnings_fail_the_run() {
        let mut warnings = Diagnostics::default();
        warnings.warn(DiagnosticKind::NotFound, Some("R1"), "Resistors:R_THT not found");
        let strict = warnings.ensure_clean().unwrap_err();
        let err: CliError = RenderError::from(strict).into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn files_and_flags_map_to_their_own_codes() {
        let missing = CliError::Read {
            what: "board",
            path: PathBuf::from("board.yaml"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.to_string().starts_with("could not read board file board.yaml"));
        assert_eq!(CliError::usage("--dpi must be positive").exit_code(), 1);
        assert_eq!(CliError::from(RasterError::InvalidDpi(0)).exit_code(), 3);
    }
}
