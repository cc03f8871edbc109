use std::f64::consts::PI;

use pcbdraw_core::{Affine, Hole, Pad, PadShape};

use crate::{PlineVertex, Polyline};

fn quarter_circle_bulge() -> f64 {
    (PI / 8.0).tan()
}

/// Build a closed polyline from `(x, y, bulge)` triples given around `center`, rotated by
/// `rotation_deg` (clockwise on the board).
fn closed(center: (f64, f64), rotation_deg: f64, pts: &[(f64, f64, f64)]) -> Polyline<f64> {
    let tf = Affine::rotate_about(rotation_deg, [center.0, center.1]);
    let mut pl = Polyline::new_closed();
    for &(x, y, bulge) in pts {
        let [x, y] = tf.apply([x, y]);
        pl.vertex_data.push(PlineVertex::new(x, y, bulge));
    }
    pl
}

pub fn circle(center: (f64, f64), radius: f64) -> Polyline<f64> {
    let (cx, cy) = center;
    let mut pl = Polyline::new_closed();

    // Two half-circle arcs.
    pl.vertex_data.push(PlineVertex::new(cx - radius, cy, 1.0));
    pl.vertex_data.push(PlineVertex::new(cx + radius, cy, 1.0));
    pl
}

pub fn rectangle(center: (f64, f64), size: (f64, f64), rotation_deg: f64) -> Polyline<f64> {
    let (cx, cy) = center;
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    closed(
        center,
        rotation_deg,
        &[
            (cx - hw, cy - hh, 0.0),
            (cx + hw, cy - hh, 0.0),
            (cx + hw, cy + hh, 0.0),
            (cx - hw, cy + hh, 0.0),
        ],
    )
}

pub fn rounded_rectangle(
    center: (f64, f64),
    size: (f64, f64),
    corner_radius: f64,
    rotation_deg: f64,
) -> Polyline<f64> {
    let (cx, cy) = center;
    let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
    let r = corner_radius.min(hw).min(hh).max(0.0);
    if r == 0.0 {
        return rectangle(center, size, rotation_deg);
    }

    let b = quarter_circle_bulge();
    // Edge, corner arc, edge, ... The bulge sits on the vertex that starts the arc.
    closed(
        center,
        rotation_deg,
        &[
            (cx + hw - r, cy - hh, b),
            (cx + hw, cy - hh + r, 0.0),
            (cx + hw, cy + hh - r, b),
            (cx + hw - r, cy + hh, 0.0),
            (cx - hw + r, cy + hh, b),
            (cx - hw, cy + hh - r, 0.0),
            (cx - hw, cy - hh + r, b),
            (cx - hw + r, cy - hh, 0.0),
        ],
    )
}

/// Stadium shape: a rectangle with semicircular caps on its short sides.
pub fn oblong(center: (f64, f64), size: (f64, f64), rotation_deg: f64) -> Polyline<f64> {
    let (w, h) = size;
    if h > w {
        return oblong(center, (h, w), rotation_deg + 90.0);
    }
    let r = h / 2.0;
    let a = (w - h) / 2.0;
    if a <= f64::EPSILON {
        return circle(center, r);
    }
    let (cx, cy) = center;
    closed(
        center,
        rotation_deg,
        &[
            (cx - a, cy - r, 0.0),
            (cx + a, cy - r, 1.0),
            (cx + a, cy + r, 0.0),
            (cx - a, cy + r, 1.0),
        ],
    )
}

pub fn polygon(vertices: &[[f64; 2]]) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for &[x, y] in vertices {
        pl.vertex_data.push(PlineVertex::new(x, y, 0.0));
    }
    pl
}

/// Copper outline of a pad.
pub fn pad_outline(pad: &Pad) -> Polyline<f64> {
    let center = (pad.at[0], pad.at[1]);
    let size = (pad.size[0], pad.size[1]);
    match pad.shape {
        PadShape::Rect => rectangle(center, size, pad.rotation),
        PadShape::Circle => circle(center, size.0.min(size.1) / 2.0),
        PadShape::Oval => oblong(center, size, pad.rotation),
        PadShape::RoundRect { ratio } => {
            rounded_rectangle(center, size, ratio * size.0.min(size.1), pad.rotation)
        }
    }
}

/// Drill aperture of a hole; slots are stadiums.
pub fn hole_outline(hole: &Hole) -> Polyline<f64> {
    oblong(
        (hole.position[0], hole.position[1]),
        (hole.size[0], hole.size[1]),
        hole.orientation,
    )
}

pub fn is_valid_closed_polyline(pl: &Polyline<f64>) -> bool {
    pl.is_closed && pl.vertex_data.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline_bounds;
    use approx::assert_abs_diff_eq;

    #[test]
    fn oblong_spans_its_size() {
        let b = polyline_bounds(&oblong((0.0, 0.0), (3.0, 1.0), 0.0));
        assert_abs_diff_eq!(b.min_x, -1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.max_x, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.min_y, -0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.max_y, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn tall_oblong_is_rotated_wide_one() {
        let b = polyline_bounds(&oblong((0.0, 0.0), (1.0, 3.0), 0.0));
        assert_abs_diff_eq!(b.min_y, -1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.max_x, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn round_hole_is_a_circle() {
        let hole = Hole {
            position: [5.0, 5.0],
            orientation: 0.0,
            size: [1.0, 1.0],
        };
        let pl = hole_outline(&hole);
        assert_eq!(pl.vertex_data.len(), 2);
        assert!(is_valid_closed_polyline(&pl));
    }

    #[test]
    fn rotated_rectangle_keeps_center() {
        let pl = rectangle((2.0, 3.0), (4.0, 2.0), 90.0);
        let b = polyline_bounds(&pl);
        assert_abs_diff_eq!(b.center()[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.width(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.height(), 4.0, epsilon = 1e-9);
    }
}
