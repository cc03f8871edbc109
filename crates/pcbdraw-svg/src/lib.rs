//! Minimal SVG object model: an owned element tree that can be read from footprint
//! drawings, edited, measured and written back out.

pub mod bounds;
pub mod color;
pub mod css;
pub mod document;
pub mod error;
pub mod node;
pub mod parse;
pub mod path;
pub mod shape;
pub mod transform;
pub mod units;

pub use bounds::{document_bounds, element_bounds, local_transform};
pub use color::{Color, ColorError};
pub use document::Document;
pub use error::SvgError;
pub use node::{Element, Node};
pub use parse::parse_svg;
pub use path::{arc_to_cubics, PathData, PathError, Segment};
pub use shape::{element_path, parse_points};
pub use transform::{format_transform, parse_transform, TransformError};
pub use units::length_to_mm;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Format a coordinate for SVG output: shortest round-trip text, no trailing `.0`, no `-0`.
pub fn fmt_num(v: f64) -> String {
    // Values are millimetres; anything below a nanometre is noise.
    let v = (v * 1e6).round() / 1e6;
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let mut buf = ryu::Buffer::new();
    let s = buf.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}
