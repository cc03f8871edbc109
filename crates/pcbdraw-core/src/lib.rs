//! Board model, affine transforms and diagnostics shared by the pcbdraw crates.

pub mod affine;
pub mod board;
pub mod bounds;
pub mod diagnostics;

pub use affine::Affine;
pub use board::{
    BoardError, BoardModel, ComponentInstance, FootprintId, Hole, Layer, Pad, PadShape, Shape,
    Side, SubstrateGeometry, Via, normalize_rotation,
};
pub use bounds::Bounds;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, WarningsAsErrors};
