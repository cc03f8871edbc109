//! Geometric bounds of rendered content, transforms and `<use>` references resolved.

use pcbdraw_core::{Affine, Bounds};

use crate::document::Document;
use crate::node::Element;
use crate::shape::{element_path, num_attr};
use crate::transform::parse_transform;

/// `<use>` chains deeper than this are treated as cycles.
const MAX_USE_DEPTH: usize = 16;

/// Elements whose children are never rendered in place.
const NON_RENDERED: &[&str] = &[
    "defs",
    "mask",
    "clipPath",
    "symbol",
    "pattern",
    "marker",
    "linearGradient",
    "radialGradient",
    "filter",
    "style",
    "text",
];

/// Bounds of `el` drawn under `tf`. `lookup` resolves `<use>` targets. Stroke widths are
/// not included.
pub fn element_bounds<'a>(
    el: &'a Element,
    tf: &Affine,
    lookup: &dyn Fn(&str) -> Option<&'a Element>,
) -> Bounds {
    let mut bounds = Bounds::empty();
    accumulate(el, tf, lookup, 0, &mut bounds);
    bounds
}

/// Bounds of everything in the document body.
pub fn document_bounds(doc: &Document) -> Bounds {
    let lookup = |id: &str| doc.find_by_id(id);
    let mut bounds = Bounds::empty();
    for el in &doc.body {
        bounds.include(&element_bounds(el, &Affine::IDENTITY, &lookup));
    }
    bounds
}

/// The element's own `transform`; malformed lists count as identity.
pub fn local_transform(el: &Element) -> Affine {
    match el.attr("transform").map(parse_transform) {
        Some(Ok(tf)) => tf,
        Some(Err(err)) => {
            tracing::debug!(%err, element = %el.name, "ignoring malformed transform");
            Affine::IDENTITY
        }
        None => Affine::IDENTITY,
    }
}

fn accumulate<'a>(
    el: &'a Element,
    parent: &Affine,
    lookup: &dyn Fn(&str) -> Option<&'a Element>,
    depth: usize,
    out: &mut Bounds,
) {
    if NON_RENDERED.contains(&el.name.as_str())
        || el.property("display").as_deref() == Some("none")
    {
        return;
    }
    let tf = *parent * local_transform(el);

    if el.name == "use" {
        if depth >= MAX_USE_DEPTH {
            tracing::debug!("<use> nesting too deep, skipping");
            return;
        }
        let Some(target) = el
            .attr("href")
            .and_then(|h| h.strip_prefix('#'))
            .and_then(lookup)
        else {
            return;
        };
        let placed = tf * Affine::translate(num_attr(el, "x"), num_attr(el, "y"));
        if target.name == "symbol" {
            for child in target.elements() {
                accumulate(child, &placed, lookup, depth + 1, out);
            }
        } else {
            accumulate(target, &placed, lookup, depth + 1, out);
        }
        return;
    }

    if let Some(path) = element_path(el) {
        for sub in path.flatten(&tf) {
            for p in sub {
                out.include_point(p);
            }
        }
        return;
    }

    if el.name == "image" {
        let (x, y) = (num_attr(el, "x"), num_attr(el, "y"));
        let (w, h) = (num_attr(el, "width"), num_attr(el, "height"));
        for p in [[x, y], [x + w, y], [x + w, y + h], [x, y + h]] {
            out.include_point(tf.apply(p));
        }
        return;
    }

    for child in el.elements() {
        accumulate(child, &tf, lookup, depth, out);
    }
}
