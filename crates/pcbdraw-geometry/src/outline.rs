//! Turn loose board-edge primitives into outline polylines.

use pcbdraw_core::Shape;

use crate::primitives::{circle, polygon};
use crate::{PlineVertex, Polyline};

/// Endpoints closer than this are treated as connected.
pub const STITCH_TOLERANCE: f64 = 1e-3;

/// One open outline piece; `bulge` is non-zero for arcs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub bulge: f64,
}

impl Edge {
    #[must_use]
    pub fn reversed(&self) -> Edge {
        Edge {
            start: self.end,
            end: self.start,
            bulge: -self.bulge,
        }
    }
}

fn same(a: [f64; 2], b: [f64; 2], tol: f64) -> bool {
    (a[0] - b[0]).hypot(a[1] - b[1]) <= tol
}

fn arc_point(center: [f64; 2], radius: f64, deg: f64) -> [f64; 2] {
    let (s, c) = deg.to_radians().sin_cos();
    [center[0] + radius * c, center[1] + radius * s]
}

/// Split edge-layer shapes into open edges (segments, arcs) and already-closed loops
/// (circles, rectangles, polygons, full-turn arcs).
pub fn split_shapes(shapes: &[Shape]) -> (Vec<Edge>, Vec<Polyline<f64>>) {
    let mut edges = Vec::new();
    let mut loops = Vec::new();
    for shape in shapes {
        match shape {
            Shape::Segment { start, end, .. } => {
                if !same(*start, *end, f64::EPSILON) {
                    edges.push(Edge {
                        start: *start,
                        end: *end,
                        bulge: 0.0,
                    });
                }
            }
            Shape::Arc {
                center,
                radius,
                start_angle,
                angle,
                ..
            } => {
                if angle.abs() >= 360.0 {
                    loops.push(circle((center[0], center[1]), *radius));
                } else if angle.abs() > f64::EPSILON {
                    edges.push(Edge {
                        start: arc_point(*center, *radius, *start_angle),
                        end: arc_point(*center, *radius, start_angle + angle),
                        bulge: (angle.to_radians() / 4.0).tan(),
                    });
                }
            }
            Shape::Circle { center, radius, .. } => {
                loops.push(circle((center[0], center[1]), *radius));
            }
            Shape::Rect { start, end, .. } => {
                loops.push(polygon(&[
                    *start,
                    [end[0], start[1]],
                    *end,
                    [start[0], end[1]],
                ]));
            }
            Shape::Polygon { points, .. } => {
                if points.len() >= 2 {
                    loops.push(polygon(points));
                }
            }
        }
    }
    (edges, loops)
}

/// Chain edges end-to-end, flipping them as needed. Chains whose ends meet are returned
/// closed; the rest stay open so nothing drawn on the edge layer gets lost.
pub fn stitch(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Polyline<f64>> {
    let mut out = Vec::new();
    while !edges.is_empty() {
        let mut chain = vec![edges.remove(0)];
        loop {
            let head = chain[0].start;
            let tail = chain[chain.len() - 1].end;
            let found = edges.iter().enumerate().find_map(|(i, e)| {
                if same(tail, e.start, tolerance) {
                    Some((i, false, *e))
                } else if same(tail, e.end, tolerance) {
                    Some((i, false, e.reversed()))
                } else if same(head, e.end, tolerance) {
                    Some((i, true, *e))
                } else if same(head, e.start, tolerance) {
                    Some((i, true, e.reversed()))
                } else {
                    None
                }
            });
            let Some((i, at_head, edge)) = found else {
                break;
            };
            edges.remove(i);
            if at_head {
                chain.insert(0, edge);
            } else {
                chain.push(edge);
            }
        }
        out.push(chain_to_polyline(&chain, tolerance));
    }
    out
}

fn chain_to_polyline(chain: &[Edge], tolerance: f64) -> Polyline<f64> {
    let first = chain[0].start;
    let last = chain[chain.len() - 1].end;
    let is_closed = chain.len() > 1 && same(first, last, tolerance);

    let mut pl = if is_closed {
        Polyline::new_closed()
    } else {
        Polyline::new()
    };
    for e in chain {
        pl.vertex_data
            .push(PlineVertex::new(e.start[0], e.start[1], e.bulge));
    }
    if !is_closed {
        pl.vertex_data.push(PlineVertex::new(last[0], last[1], 0.0));
    }
    pl
}

/// Board outline polylines from the edge layer: stitched chains plus closed shapes.
pub fn board_outline(shapes: &[Shape]) -> Vec<Polyline<f64>> {
    let (edges, mut loops) = split_shapes(shapes);
    let mut chains = stitch(edges, STITCH_TOLERANCE);
    chains.append(&mut loops);
    chains
}
