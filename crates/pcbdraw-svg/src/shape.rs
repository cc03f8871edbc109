//! Basic shapes (`rect`, `circle`, `line`, ...) as path data.

use crate::node::Element;
use crate::path::{PathData, Segment};
use crate::units::{split_number, user_length};

/// Numeric attribute in user units; missing or malformed values read as 0.
pub fn num_attr(el: &Element, key: &str) -> f64 {
    el.attr(key).and_then(user_length).unwrap_or(0.0)
}

/// `points="x,y x,y ..."` pairs; a dangling odd coordinate is ignored.
pub fn parse_points(text: &str) -> Vec<[f64; 2]> {
    let mut nums = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        let Some((v, tail)) = split_number(rest) else {
            break;
        };
        nums.push(v);
        rest = tail;
    }
    nums.chunks_exact(2).map(|c| [c[0], c[1]]).collect()
}

fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> PathData {
    let arc = |to| Segment::ArcTo {
        radii: [rx, ry],
        x_rotation: 0.0,
        large_arc: false,
        sweep: true,
        to,
    };
    PathData {
        segments: vec![
            Segment::MoveTo([cx + rx, cy]),
            arc([cx - rx, cy]),
            arc([cx + rx, cy]),
            Segment::Close,
        ],
    }
}

fn rect(el: &Element) -> Option<PathData> {
    let (x, y) = (num_attr(el, "x"), num_attr(el, "y"));
    let (w, h) = (num_attr(el, "width"), num_attr(el, "height"));
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let rx_attr = el.attr("rx").and_then(user_length);
    let ry_attr = el.attr("ry").and_then(user_length);
    let rx = rx_attr.or(ry_attr).unwrap_or(0.0).clamp(0.0, w / 2.0);
    let ry = ry_attr.or(rx_attr).unwrap_or(0.0).clamp(0.0, h / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return Some(PathData {
            segments: vec![
                Segment::MoveTo([x, y]),
                Segment::LineTo([x + w, y]),
                Segment::LineTo([x + w, y + h]),
                Segment::LineTo([x, y + h]),
                Segment::Close,
            ],
        });
    }
    let corner = |to| Segment::ArcTo {
        radii: [rx, ry],
        x_rotation: 0.0,
        large_arc: false,
        sweep: true,
        to,
    };
    Some(PathData {
        segments: vec![
            Segment::MoveTo([x + rx, y]),
            Segment::LineTo([x + w - rx, y]),
            corner([x + w, y + ry]),
            Segment::LineTo([x + w, y + h - ry]),
            corner([x + w - rx, y + h]),
            Segment::LineTo([x + rx, y + h]),
            corner([x, y + h - ry]),
            Segment::LineTo([x, y + ry]),
            corner([x + rx, y]),
            Segment::Close,
        ],
    })
}

/// Geometry of a drawable element in its own coordinate system. `None` for containers,
/// non-geometric elements and shapes with nothing to draw.
pub fn element_path(el: &Element) -> Option<PathData> {
    match el.name.as_str() {
        "path" => {
            let d = el.attr("d")?;
            match PathData::parse(d) {
                Ok(p) => (!p.is_empty()).then_some(p),
                Err(err) => {
                    tracing::debug!(%err, "ignoring malformed path data");
                    None
                }
            }
        }
        "rect" => rect(el),
        "circle" => {
            let r = num_attr(el, "r");
            (r > 0.0).then(|| ellipse(num_attr(el, "cx"), num_attr(el, "cy"), r, r))
        }
        "ellipse" => {
            let (rx, ry) = (num_attr(el, "rx"), num_attr(el, "ry"));
            (rx > 0.0 && ry > 0.0)
                .then(|| ellipse(num_attr(el, "cx"), num_attr(el, "cy"), rx, ry))
        }
        "line" => Some(PathData {
            segments: vec![
                Segment::MoveTo([num_attr(el, "x1"), num_attr(el, "y1")]),
                Segment::LineTo([num_attr(el, "x2"), num_attr(el, "y2")]),
            ],
        }),
        "polyline" | "polygon" => {
            let pts = parse_points(el.attr("points")?);
            let (first, rest) = pts.split_first()?;
            let mut segments = vec![Segment::MoveTo(*first)];
            segments.extend(rest.iter().map(|p| Segment::LineTo(*p)));
            if el.name == "polygon" {
                segments.push(Segment::Close);
            }
            Some(PathData { segments })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_accept_mixed_separators() {
        assert_eq!(
            parse_points("0,0 1 2,3,4 5"),
            vec![[0.0, 0.0], [1.0, 2.0], [3.0, 4.0]]
        );
    }

    #[test]
    fn rect_without_size_draws_nothing() {
        let el = Element::new("rect").with_attr("width", "0").with_attr("height", "2");
        assert!(element_path(&el).is_none());
    }

    #[test]
    fn rounded_rect_has_corner_arcs() {
        let el = Element::new("rect")
            .with_attr("width", "4")
            .with_attr("height", "2")
            .with_attr("rx", "0.5");
        let p = element_path(&el).unwrap();
        let arcs = p
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::ArcTo { .. }))
            .count();
        assert_eq!(arcs, 4);
    }
}
