//! 2D geometry on closed polylines: pad/hole primitives, board outline stitching and
//! boolean regions.

pub mod outline;
pub mod primitives;
pub mod region;

pub use cavalier_contours::polyline::{BooleanOp, BooleanResultInfo, PlineVertex, Polyline};

use cavalier_contours::polyline::{PlineSource, seg_bounding_box};
use pcbdraw_core::Bounds;

/// Exact bounds of a polyline, arc bulges included.
pub fn polyline_bounds(pl: &Polyline<f64>) -> Bounds {
    let mut bounds = Bounds::empty();
    let n = pl.vertex_count();
    if n == 0 {
        return bounds;
    }
    for i in 0..n {
        let v1 = pl.at(i);
        bounds.include_point([v1.x, v1.y]);
        let next = if i + 1 < n {
            i + 1
        } else if pl.is_closed() {
            0
        } else {
            break;
        };
        let v2 = pl.at(next);
        let aabb = seg_bounding_box(v1, v2);
        bounds.include_point([aabb.min_x, aabb.min_y]);
        bounds.include_point([aabb.max_x, aabb.max_y]);
    }
    bounds
}
