//! Walks a document tree and paints it onto a pixmap.

use pcbdraw_core::Affine;
use pcbdraw_svg::shape::num_attr;
use pcbdraw_svg::units::user_length;
use pcbdraw_svg::{element_path, local_transform, Color, Document, Element, PathData, Segment};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, MaskType, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

const MAX_USE_DEPTH: usize = 16;

/// Elements that are only drawn through a reference, or not at all.
const SKIPPED: &[&str] = &[
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
    "image",
];

/// Inherited presentation properties.
#[derive(Debug, Clone)]
struct Presentation {
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: f64,
    fill_opacity: f64,
    stroke_opacity: f64,
    fill_rule: FillRule,
    clip_rule: FillRule,
    line_cap: LineCap,
    line_join: LineJoin,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            fill: Some(Color::BLACK),
            stroke: None,
            stroke_width: 1.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            fill_rule: FillRule::Winding,
            clip_rule: FillRule::Winding,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
        }
    }
}

fn paint_value(value: &str, inherited: Option<Color>) -> Option<Color> {
    match value.trim() {
        "none" => None,
        "inherit" => inherited,
        "currentColor" => Some(Color::BLACK),
        v if v.starts_with("url(") => {
            tracing::debug!(paint = v, "paint servers are not rasterized");
            None
        }
        v => v.parse().ok().or(inherited),
    }
}

fn fraction(value: &str) -> Option<f64> {
    let v = value.trim();
    let parsed = match v.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => v.parse().ok()?,
    };
    Some(parsed.clamp(0.0, 1.0))
}

fn rule(value: &str, inherited: FillRule) -> FillRule {
    match value.trim() {
        "evenodd" => FillRule::EvenOdd,
        "nonzero" => FillRule::Winding,
        _ => inherited,
    }
}

impl Presentation {
    fn inherit(&self, el: &Element) -> Self {
        let mut next = self.clone();
        if let Some(v) = el.property("fill") {
            next.fill = paint_value(&v, self.fill);
        }
        if let Some(v) = el.property("stroke") {
            next.stroke = paint_value(&v, self.stroke);
        }
        if let Some(w) = el.property("stroke-width").as_deref().and_then(user_length) {
            next.stroke_width = w.max(0.0);
        }
        if let Some(o) = el.property("fill-opacity").as_deref().and_then(fraction) {
            next.fill_opacity = o;
        }
        if let Some(o) = el.property("stroke-opacity").as_deref().and_then(fraction) {
            next.stroke_opacity = o;
        }
        if let Some(v) = el.property("fill-rule") {
            next.fill_rule = rule(&v, self.fill_rule);
        }
        if let Some(v) = el.property("clip-rule") {
            next.clip_rule = rule(&v, self.clip_rule);
        }
        match el.property("stroke-linecap").as_deref().map(str::trim) {
            Some("round") => next.line_cap = LineCap::Round,
            Some("square") => next.line_cap = LineCap::Square,
            Some("butt") => next.line_cap = LineCap::Butt,
            _ => {}
        }
        match el.property("stroke-linejoin").as_deref().map(str::trim) {
            Some("round") => next.line_join = LineJoin::Round,
            Some("bevel") => next.line_join = LineJoin::Bevel,
            Some("miter") => next.line_join = LineJoin::Miter,
            _ => {}
        }
        next
    }
}

fn to_transform(tf: &Affine) -> Transform {
    Transform::from_row(
        tf.a as f32,
        tf.b as f32,
        tf.c as f32,
        tf.d as f32,
        tf.e as f32,
        tf.f as f32,
    )
}

fn to_path(data: &PathData) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for seg in data.to_curves().segments {
        match seg {
            Segment::MoveTo([x, y]) => pb.move_to(x as f32, y as f32),
            Segment::LineTo([x, y]) => pb.line_to(x as f32, y as f32),
            Segment::CubicTo([x1, y1], [x2, y2], [x, y]) => pb.cubic_to(
                x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
            ),
            Segment::QuadTo([x1, y1], [x, y]) => {
                pb.quad_to(x1 as f32, y1 as f32, x as f32, y as f32)
            }
            // `to_curves` leaves no arcs behind.
            Segment::ArcTo { to: [x, y], .. } => pb.line_to(x as f32, y as f32),
            Segment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn color_paint(color: Color, opacity: f64) -> Paint<'static> {
    let alpha = (f64::from(color.a) * opacity).round().clamp(0.0, 255.0) as u8;
    let mut paint = Paint::default();
    paint.set_color(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, alpha));
    paint.anti_alias = true;
    paint
}

fn url_target(value: &str) -> Option<&str> {
    value
        .trim()
        .strip_prefix("url(")?
        .strip_suffix(')')?
        .trim()
        .strip_prefix('#')
}

/// Multiply `other` into `into`.
fn intersect(into: &mut Mask, other: &Mask) {
    for (a, b) in into.data_mut().iter_mut().zip(other.data()) {
        *a = ((u16::from(*a) * u16::from(*b) + 127) / 255) as u8;
    }
}

pub(crate) struct Canvas<'d> {
    doc: &'d Document,
    width: u32,
    height: u32,
}

impl<'d> Canvas<'d> {
    pub(crate) fn new(doc: &'d Document, width: u32, height: u32) -> Self {
        Self { doc, width, height }
    }

    pub(crate) fn paint(&self, pixmap: &mut Pixmap, root: &Affine) {
        let style = Presentation::default();
        for el in &self.doc.body {
            self.draw(pixmap, el, root, &style, 0);
        }
    }

    fn lookup(&self, reference: &str) -> Option<&'d Element> {
        self.doc.find_by_id(reference)
    }

    fn draw(&self, pixmap: &mut Pixmap, el: &Element, parent: &Affine, inherited: &Presentation, depth: usize) {
        if SKIPPED.contains(&el.name.as_str())
            || el.property("display").as_deref() == Some("none")
        {
            return;
        }
        let ctm = *parent * local_transform(el);
        let style = inherited.inherit(el);
        let opacity = el.property("opacity").as_deref().and_then(fraction).unwrap_or(1.0);
        let clip = el.attr("clip-path").and_then(url_target).and_then(|id| self.lookup(id));
        let mask = el.attr("mask").and_then(url_target).and_then(|id| self.lookup(id));

        let is_leaf = !matches!(el.name.as_str(), "g" | "svg" | "a" | "switch" | "use");
        if clip.is_none() && mask.is_none() && (opacity >= 1.0 || is_leaf) {
            let mut style = style;
            style.fill_opacity *= opacity;
            style.stroke_opacity *= opacity;
            self.draw_content(pixmap, el, &ctm, &style, depth);
            return;
        }

        let Some(mut layer) = Pixmap::new(self.width, self.height) else {
            return;
        };
        self.draw_content(&mut layer, el, &ctm, &style, depth);
        let mut coverage = clip.and_then(|c| self.clip_mask(c, &ctm));
        if let Some(luminance) = mask.and_then(|m| self.luminance_mask(m, &ctm, depth)) {
            match coverage.as_mut() {
                Some(c) => intersect(c, &luminance),
                None => coverage = Some(luminance),
            }
        }
        let paint = PixmapPaint {
            opacity: opacity as f32,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), coverage.as_ref());
    }

    fn draw_content(&self, pixmap: &mut Pixmap, el: &Element, ctm: &Affine, style: &Presentation, depth: usize) {
        match el.name.as_str() {
            "g" | "svg" | "a" | "switch" => {
                for child in el.elements() {
                    self.draw(pixmap, child, ctm, style, depth);
                }
            }
            "use" => self.draw_use(pixmap, el, ctm, style, depth),
            _ => {
                if let Some(data) = element_path(el) {
                    draw_shape(pixmap, &data, ctm, style);
                }
            }
        }
    }

    fn draw_use(&self, pixmap: &mut Pixmap, el: &Element, ctm: &Affine, style: &Presentation, depth: usize) {
        if depth >= MAX_USE_DEPTH {
            tracing::debug!("use chain too deep, skipping");
            return;
        }
        let Some(target) = el
            .attr("href")
            .or_else(|| el.attr("xlink:href"))
            .and_then(|h| h.strip_prefix('#'))
            .and_then(|id| self.lookup(id))
        else {
            return;
        };
        let ctm = *ctm * Affine::translate(num_attr(el, "x"), num_attr(el, "y"));
        if target.name == "symbol" {
            let style = style.inherit(target);
            for child in target.elements() {
                self.draw(pixmap, child, &ctm, &style, depth + 1);
            }
        } else {
            self.draw(pixmap, target, &ctm, style, depth + 1);
        }
    }

    /// Coverage of a `clipPath`, drawn in the user space of the element it clips.
    fn clip_mask(&self, clip: &Element, ctm: &Affine) -> Option<Mask> {
        let mut mask = Mask::new(self.width, self.height)?;
        let base = Presentation::default().inherit(clip);
        for child in clip.elements() {
            if child.property("display").as_deref() == Some("none") {
                continue;
            }
            let Some(path) = element_path(child).and_then(|d| to_path(&d)) else {
                continue;
            };
            let style = base.inherit(child);
            let tf = *ctm * local_transform(child);
            mask.fill_path(&path, style.clip_rule, true, to_transform(&tf));
        }
        Some(mask)
    }

    /// Luminance of a `mask`'s content, drawn in the user space of the masked element.
    fn luminance_mask(&self, mask: &Element, ctm: &Affine, depth: usize) -> Option<Mask> {
        let mut content = Pixmap::new(self.width, self.height)?;
        let style = Presentation::default().inherit(mask);
        for child in mask.elements() {
            self.draw(&mut content, child, ctm, &style, depth + 1);
        }
        Some(Mask::from_pixmap(content.as_ref(), MaskType::Luminance))
    }
}

fn draw_shape(pixmap: &mut Pixmap, data: &PathData, ctm: &Affine, style: &Presentation) {
    let Some(path) = to_path(data) else {
        return;
    };
    let ts = to_transform(ctm);
    if let Some(fill) = style.fill {
        let paint = color_paint(fill, style.fill_opacity);
        pixmap.fill_path(&path, &paint, style.fill_rule, ts, None);
    }
    if let Some(stroke_color) = style.stroke.filter(|_| style.stroke_width > 0.0) {
        let paint = color_paint(stroke_color, style.stroke_opacity);
        let stroke = Stroke {
            width: style.stroke_width as f32,
            line_cap: style.line_cap,
            line_join: style.line_join,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, ts, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_references() {
        assert_eq!(url_target("url(#hole-mask)"), Some("hole-mask"));
        assert_eq!(url_target(" url( #a ) "), Some("a"));
        assert_eq!(url_target("none"), None);
    }

    #[test]
    fn opacity_accepts_percentages() {
        assert_eq!(fraction("50%"), Some(0.5));
        assert_eq!(fraction("2"), Some(1.0));
        assert_eq!(fraction("x"), None);
    }

    #[test]
    fn inheritance_keeps_unset_properties() {
        let parent = Presentation::default().inherit(
            &Element::new("g").with_attr("style", "fill:#ff0000;stroke:#00ff00;stroke-width:0.5"),
        );
        let child = parent.inherit(&Element::new("path").with_attr("fill", "none"));
        assert_eq!(child.fill, None);
        assert_eq!(child.stroke, Some(Color::rgb(0, 255, 0)));
        assert_eq!(child.stroke_width, 0.5);
    }
}
