//! Board-to-image compositing: style theme, placement, component art, substrate layers
//! and document assembly.

pub mod assembler;
pub mod compositor;
pub mod config;
pub mod error;
pub mod placement;
pub mod plot;
pub mod resistor;
pub mod style;
pub mod substrate;

pub use assembler::assemble;
pub use compositor::{ComponentFragment, Compositor};
pub use config::{Placeholder, RemapTable, RenderConfig, ResistorOverride, SelectionPolicy};
pub use error::RenderError;
pub use placement::TransformEngine;
pub use plot::{Plot, Plotter};
pub use resistor::{ResistorBands, ResistorError};
pub use style::{BandColors, StyleError, StyleTheme};
pub use substrate::{render_substrate, Substrate, SubstrateFragment, Tier};
