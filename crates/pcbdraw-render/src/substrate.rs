//! Bare-board layers: outline, clad, copper, pads, paste, silk, V-cuts and drill holes.

use pcbdraw_core::{Bounds, Hole, Layer, Shape, SubstrateGeometry};
use pcbdraw_geometry::outline::board_outline;
use pcbdraw_geometry::primitives::{hole_outline, pad_outline};
use pcbdraw_geometry::region::Region;
use pcbdraw_geometry::Polyline;
use pcbdraw_svg::{fmt_num, Color, Element, PathData, Segment};

use crate::placement::TransformEngine;
use crate::{RenderConfig, StyleTheme};

pub const CUT_OFF_ID: &str = "cut-off";
pub const HOLE_MASK_ID: &str = "hole-mask";
pub const SILK_MASK_ID: &str = "pads-mask-silkscreen";

/// Where a fragment goes relative to the components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Bottom,
    Top,
}

#[derive(Debug, Clone)]
pub struct SubstrateFragment {
    pub name: &'static str,
    pub tier: Tier,
    /// `substrate-<name>` group.
    pub element: Element,
}

/// Substrate fragments in z-order plus the definitions they reference.
#[derive(Debug, Clone, Default)]
pub struct Substrate {
    pub defs: Vec<Element>,
    pub fragments: Vec<SubstrateFragment>,
    /// A `cut-off` clip path exists.
    pub clipped: bool,
    /// A `hole-mask` exists.
    pub hole_mask: bool,
}

impl Substrate {
    pub fn fragment(&self, name: &str) -> Option<&SubstrateFragment> {
        self.fragments.iter().find(|f| f.name == name)
    }

    /// Fragments of one tier, in z-order.
    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &SubstrateFragment> {
        self.fragments.iter().filter(move |f| f.tier == tier)
    }
}

fn layer_group(name: &str, color: Color) -> Element {
    let c = color.to_hex();
    Element::new("g")
        .with_attr("id", format!("substrate-{name}"))
        .with_attr("style", format!("fill:{c}; stroke:{c};"))
}

fn point(center: [f64; 2], radius: f64, deg: f64) -> [f64; 2] {
    let (s, c) = deg.to_radians().sin_cos();
    [center[0] + radius * c, center[1] + radius * s]
}

fn stroke_style(width: f64, filled: bool) -> String {
    let fill = if filled { "" } else { "fill:none;" };
    if width > 0.0 {
        format!(
            "{fill}stroke-width:{};stroke-linecap:round;stroke-linejoin:round;",
            fmt_num(width)
        )
    } else {
        format!("{fill}stroke:none;")
    }
}

/// One board primitive as an SVG element, colored by its enclosing layer group.
pub fn shape_element(shape: &Shape) -> Element {
    match shape {
        Shape::Segment { start, end, width } => {
            let d = PathData {
                segments: vec![Segment::MoveTo(*start), Segment::LineTo(*end)],
            };
            Element::new("path")
                .with_attr("d", d.to_string())
                .with_attr("style", stroke_style(*width, false))
        }
        Shape::Arc {
            center,
            radius,
            start_angle,
            angle,
            width,
        } if angle.abs() < 360.0 => {
            let d = PathData {
                segments: vec![
                    Segment::MoveTo(point(*center, *radius, *start_angle)),
                    Segment::ArcTo {
                        radii: [radius.abs(), radius.abs()],
                        x_rotation: 0.0,
                        large_arc: angle.abs() > 180.0,
                        sweep: *angle > 0.0,
                        to: point(*center, *radius, start_angle + angle),
                    },
                ],
            };
            Element::new("path")
                .with_attr("d", d.to_string())
                .with_attr("style", stroke_style(*width, false))
        }
        Shape::Arc {
            center,
            radius,
            width,
            ..
        } => circle_element(*center, *radius, *width, false),
        Shape::Circle {
            center,
            radius,
            width,
            filled,
        } => circle_element(*center, *radius, *width, *filled),
        Shape::Rect {
            start,
            end,
            width,
            filled,
        } => {
            let b = Bounds::from_points([*start, *end]);
            Element::new("rect")
                .with_attr("x", fmt_num(b.min_x))
                .with_attr("y", fmt_num(b.min_y))
                .with_attr("width", fmt_num(b.width()))
                .with_attr("height", fmt_num(b.height()))
                .with_attr("style", stroke_style(*width, *filled))
        }
        Shape::Polygon {
            points,
            width,
            filled,
        } => {
            let pts: Vec<String> = points
                .iter()
                .map(|p| format!("{},{}", fmt_num(p[0]), fmt_num(p[1])))
                .collect();
            Element::new("polygon")
                .with_attr("points", pts.join(" "))
                .with_attr("style", stroke_style(*width, *filled))
        }
    }
}

fn circle_element(center: [f64; 2], radius: f64, width: f64, filled: bool) -> Element {
    Element::new("circle")
        .with_attr("cx", fmt_num(center[0]))
        .with_attr("cy", fmt_num(center[1]))
        .with_attr("r", fmt_num(radius.abs()))
        .with_attr("style", stroke_style(width, filled))
}

/// All polylines as a single even-odd path.
fn region_path<'a>(plines: impl IntoIterator<Item = &'a Polyline<f64>>) -> Option<Element> {
    let mut d = PathData::default();
    for pl in plines {
        d.segments.extend(PathData::from_polyline(pl).segments);
    }
    (!d.is_empty()).then(|| {
        Element::new("path")
            .with_attr("d", d.to_string())
            .with_attr("style", "fill-rule:evenodd;stroke:none;")
    })
}

fn layer_fragment(name: &'static str, tier: Tier, color: Color, shapes: &[Shape]) -> SubstrateFragment {
    let mut element = layer_group(name, color);
    for shape in shapes {
        element.push(shape_element(shape));
    }
    SubstrateFragment {
        name,
        tier,
        element,
    }
}

/// White everywhere except the given apertures, over `area`.
fn mask(id: &str, area: &Bounds, apertures: &[Polyline<f64>]) -> Element {
    let (x, y, w, h) = (
        fmt_num(area.min_x),
        fmt_num(area.min_y),
        fmt_num(area.width()),
        fmt_num(area.height()),
    );
    let mut mask = Element::new("mask")
        .with_attr("id", id)
        .with_attr("maskUnits", "userSpaceOnUse")
        .with_attr("x", x.clone())
        .with_attr("y", y.clone())
        .with_attr("width", w.clone())
        .with_attr("height", h.clone());
    mask.push(
        Element::new("rect")
            .with_attr("x", x)
            .with_attr("y", y)
            .with_attr("width", w)
            .with_attr("height", h)
            .with_attr("fill", "#ffffff"),
    );
    if let Some(mut holes) = region_path(apertures) {
        holes.set_attr("fill", "#000000");
        mask.push(holes);
    }
    mask
}

/// Render the substrate for the engine's side. The board transform is not applied here.
pub fn render_substrate(
    geometry: &SubstrateGeometry,
    style: &StyleTheme,
    engine: &TransformEngine,
    config: &RenderConfig,
) -> Substrate {
    let side = engine.side();
    let mut out = Substrate::default();
    let edges = geometry.layer(Layer::EdgeCuts);
    let holes: Vec<Hole> = geometry.holes();
    let hole_plines: Vec<Polyline<f64>> = holes.iter().map(hole_outline).collect();
    let pad_plines: Vec<Polyline<f64>> = geometry
        .pads
        .iter()
        .filter(|p| p.on(side))
        .map(pad_outline)
        .collect();
    // Masks must also cover the outline stroke, which straddles the edge.
    let mask_area = geometry.extent().expand(config.outline_width + 1.0);

    let outline = board_outline(edges);
    if let Some(board) = region_path(&outline) {
        out.defs.push(
            Element::new("clipPath")
                .with_attr("id", CUT_OFF_ID)
                .with_child(board.clone().with_attr("clip-rule", "evenodd")),
        );
        out.clipped = true;
        let mut element = layer_group("board", style.board);
        element.push(board);
        out.fragments.push(SubstrateFragment {
            name: "board",
            tier: Tier::Bottom,
            element,
        });
    }

    out.fragments.push(layer_fragment(
        "clad",
        Tier::Bottom,
        style.clad,
        geometry.layer(side.mask()),
    ));
    out.fragments.push(layer_fragment(
        "copper",
        Tier::Bottom,
        style.copper,
        geometry.layer(side.copper()),
    ));

    let mut pads = Region::union_all(pad_plines.clone());
    if config.drill_holes {
        pads.subtract_all(&hole_plines);
    }
    let mut element = layer_group("pads", style.pads);
    if let Some(path) = region_path(pads.polylines()) {
        element.push(path);
    }
    out.fragments.push(SubstrateFragment {
        name: "pads",
        tier: Tier::Bottom,
        element,
    });

    if config.paste {
        out.fragments.push(layer_fragment(
            "paste",
            Tier::Bottom,
            style.paste,
            geometry.layer(side.paste()),
        ));
    }

    if config.outline_width > 0.0 {
        let mut element = layer_group("outline", style.outline);
        element.set_style("stroke-width", &fmt_num(config.outline_width));
        for shape in edges {
            let mut e = shape_element(shape);
            // Edge strokes use the configured width, not the drawn one.
            e.set_style("stroke-width", &fmt_num(config.outline_width));
            e.set_style("stroke", &style.outline.to_hex());
            e.set_style("fill", "none");
            element.push(e);
        }
        out.fragments.push(SubstrateFragment {
            name: "outline",
            tier: Tier::Bottom,
            element,
        });
    }

    if config.drill_holes {
        if !hole_plines.is_empty() {
            out.defs.push(mask(HOLE_MASK_ID, &mask_area, &hole_plines));
            out.hole_mask = true;
        }
    } else {
        let mut element = layer_group("holes", style.outline);
        if let Some(path) = region_path(&hole_plines) {
            element.push(path);
        }
        out.fragments.push(SubstrateFragment {
            name: "holes",
            tier: Tier::Bottom,
            element,
        });
    }

    let mut silk = layer_fragment("silk", Tier::Top, style.silk, geometry.layer(side.silk()));
    if !pad_plines.is_empty() && !silk.element.children.is_empty() {
        out.defs.push(mask(SILK_MASK_ID, &mask_area, &pad_plines));
        silk.element.set_attr("mask", format!("url(#{SILK_MASK_ID})"));
    }
    out.fragments.push(silk);

    if let Some(layer) = config.vcuts {
        out.fragments.push(layer_fragment(
            "vcuts",
            Tier::Top,
            style.vcut,
            geometry.layer(layer),
        ));
    }

    tracing::debug!(
        fragments = out.fragments.len(),
        holes = holes.len(),
        outline_loops = outline.len(),
        "substrate rendered"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcbdraw_core::{Pad, PadShape, Side, Via};

    fn board() -> SubstrateGeometry {
        let mut g = SubstrateGeometry::default();
        for (s, e) in [
            ([0.0, 0.0], [30.0, 0.0]),
            ([30.0, 20.0], [30.0, 0.0]),
            ([30.0, 20.0], [0.0, 20.0]),
            ([0.0, 0.0], [0.0, 20.0]),
        ] {
            g.push(
                Layer::EdgeCuts,
                Shape::Segment {
                    start: s,
                    end: e,
                    width: 0.1,
                },
            );
        }
        g.push(
            Layer::FSilkS,
            Shape::Segment {
                start: [2.0, 2.0],
                end: [8.0, 2.0],
                width: 0.15,
            },
        );
        g.push(
            Layer::BSilkS,
            Shape::Circle {
                center: [5.0, 5.0],
                radius: 1.0,
                width: 0.1,
                filled: false,
            },
        );
        g.pads.push(Pad {
            at: [10.0, 10.0],
            size: [2.0, 2.0],
            rotation: 0.0,
            shape: PadShape::Circle,
            layers: vec![Layer::FCu, Layer::BCu],
            drill: Some([1.0, 1.0]),
        });
        g.vias.push(Via {
            at: [20.0, 10.0],
            diameter: 0.6,
            drill: 0.3,
        });
        g
    }

    fn render(config: &RenderConfig) -> Substrate {
        let geometry = board();
        let engine = TransformEngine::new(&geometry.extent(), config);
        render_substrate(&geometry, &StyleTheme::default(), &engine, config)
    }

    fn names(s: &Substrate, tier: Tier) -> Vec<&str> {
        s.tier(tier).map(|f| f.name).collect()
    }

    #[test]
    fn fragments_follow_the_fixed_order() {
        let s = render(&RenderConfig::default());
        assert_eq!(
            names(&s, Tier::Bottom),
            ["board", "clad", "copper", "pads", "outline"]
        );
        assert_eq!(names(&s, Tier::Top), ["silk"]);
        assert!(s.clipped && s.hole_mask);
    }

    #[test]
    fn layer_groups_carry_theme_colors() {
        let s = render(&RenderConfig::default());
        let board = &s.fragment("board").unwrap().element;
        assert_eq!(board.id(), Some("substrate-board"));
        assert_eq!(board.style("fill").as_deref(), Some("#4ca06c"));
        assert_eq!(board.style("stroke").as_deref(), Some("#4ca06c"));
    }

    #[test]
    fn optional_layers_are_omitted_entirely() {
        let s = render(&RenderConfig {
            outline_width: 0.0,
            ..RenderConfig::default()
        });
        assert!(s.fragment("outline").is_none());
        assert!(s.fragment("paste").is_none());
        assert!(s.fragment("vcuts").is_none());

        let s = render(&RenderConfig {
            paste: true,
            vcuts: Some(Layer::CmtsUser),
            ..RenderConfig::default()
        });
        assert!(s.fragment("paste").is_some());
        assert_eq!(names(&s, Tier::Top), ["silk", "vcuts"]);
    }

    #[test]
    fn holes_are_painted_when_not_cut() {
        let s = render(&RenderConfig {
            drill_holes: false,
            ..RenderConfig::default()
        });
        assert!(!s.hole_mask);
        let holes = s.fragment("holes").unwrap();
        assert_eq!(holes.element.style("fill").as_deref(), Some("#000000"));
        assert_eq!(holes.element.children.len(), 1);
    }

    #[test]
    fn hole_mask_has_an_aperture_per_hole() {
        let s = render(&RenderConfig::default());
        let mask = s.defs.iter().find(|d| d.id() == Some(HOLE_MASK_ID)).unwrap();
        let path = mask.elements().nth(1).unwrap();
        assert_eq!(path.attr("fill"), Some("#000000"));
        let moves = path.attr("d").unwrap().matches('M').count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn back_side_uses_back_layers() {
        let s = render(&RenderConfig {
            side: Side::Back,
            ..RenderConfig::default()
        });
        let silk = &s.fragment("silk").unwrap().element;
        assert_eq!(silk.elements().next().unwrap().name, "circle");
        assert_eq!(silk.attr("mask"), Some("url(#pads-mask-silkscreen)"));
    }

    #[test]
    fn arcs_become_svg_arcs() {
        let e = shape_element(&Shape::Arc {
            center: [0.0, 0.0],
            radius: 1.0,
            start_angle: 0.0,
            angle: 90.0,
            width: 0.2,
        });
        assert_eq!(e.attr("d"), Some("M 1 0 A 1 1 0 0 1 0 1"));
        let full = shape_element(&Shape::Arc {
            center: [0.0, 0.0],
            radius: 1.0,
            start_angle: 0.0,
            angle: -360.0,
            width: 0.2,
        });
        assert_eq!(full.name, "circle");
    }
}
