use pcbdraw_core::{Affine, Bounds, FootprintId};
use pcbdraw_svg::shape::num_attr;
use pcbdraw_svg::{length_to_mm, local_transform, parse_svg, Element, Node, SvgError};

use crate::DrawingError;

/// Id of the placement anchor inside a drawing.
pub const ORIGIN_ID: &str = "origin";
/// Resistor color band slots are `res_band1`, `res_band2`, ...
pub const BAND_SLOT_PREFIX: &str = "res_band";
pub const MAX_BAND_SLOTS: usize = 4;

const MM_PER_PX: f64 = 25.4 / 96.0;

/// One parsed footprint drawing, ready to be instantiated any number of times.
#[derive(Debug, Clone)]
pub struct FootprintDrawing {
    pub id: FootprintId,
    /// Name of the library that provided the drawing.
    pub library: String,
    /// Children of the drawing's root `<svg>`, origin anchor removed.
    pub content: Vec<Element>,
    /// Drawing user space.
    pub view_box: Bounds,
    /// Physical size from `width`/`height`.
    pub size_mm: [f64; 2],
    /// Millimetres per drawing unit along x and y.
    pub scale: [f64; 2],
    /// Anchor in drawing units; `None` when the drawing has no `origin` element.
    pub origin: Option<[f64; 2]>,
    /// Number of consecutive `res_band<N>` slots, starting at 1.
    pub band_slots: usize,
}

fn required_length(root: &Element, attr: &'static str) -> Result<f64, SvgError> {
    let raw = root.attr(attr).ok_or(SvgError::MissingAttribute {
        element: "svg",
        attr,
    })?;
    length_to_mm(raw)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| SvgError::InvalidLength {
            attr,
            value: raw.to_string(),
        })
}

fn parse_view_box(raw: &str) -> Result<Bounds, SvgError> {
    let nums: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| SvgError::InvalidViewBox(raw.to_string()))?;
    match nums[..] {
        [x, y, w, h] => Ok(Bounds {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }),
        _ => Err(SvgError::InvalidViewBox(raw.to_string())),
    }
}

/// Anchor position in root user space; the element's own transform and those of its
/// ancestors apply.
fn anchor_position(root: &Element, path: &[usize]) -> Option<[f64; 2]> {
    let mut tf = Affine::IDENTITY;
    let mut node = root;
    for &i in path {
        node = match node.children.get(i)? {
            Node::Element(e) => e,
            Node::Text(_) => return None,
        };
        tf = tf * local_transform(node);
    }
    let local = if node.attr("x").is_some() || node.attr("y").is_some() {
        [num_attr(node, "x"), num_attr(node, "y")]
    } else {
        [num_attr(node, "cx"), num_attr(node, "cy")]
    };
    Some(tf.apply(local))
}

impl FootprintDrawing {
    pub fn from_svg(
        id: FootprintId,
        library: impl Into<String>,
        text: &str,
    ) -> Result<Self, DrawingError> {
        let mut root = parse_svg(text)?;
        let width = required_length(&root, "width")?;
        let height = required_length(&root, "height")?;
        let view_box = match root.attr("viewBox") {
            Some(raw) => parse_view_box(raw)?,
            None => Bounds::new(0.0, 0.0, width / MM_PER_PX, height / MM_PER_PX),
        };
        if view_box.width() <= 0.0 || view_box.height() <= 0.0 {
            return Err(DrawingError::DegenerateViewBox);
        }

        let origin = root
            .path_to(ORIGIN_ID)
            .and_then(|path| anchor_position(&root, &path));
        root.remove_by_id(ORIGIN_ID);

        let band_slots = (1..=MAX_BAND_SLOTS)
            .take_while(|k| root.find_by_id(&band_slot_id(*k)).is_some())
            .count();

        let content = root
            .children
            .into_iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            })
            .collect();

        Ok(Self {
            id,
            library: library.into(),
            content,
            view_box,
            size_mm: [width, height],
            scale: [width / view_box.width(), height / view_box.height()],
            origin,
            band_slots,
        })
    }

    /// Anchor, falling back to the drawing's `(0, 0)`.
    pub fn origin_or_zero(&self) -> [f64; 2] {
        self.origin.unwrap_or([0.0, 0.0])
    }

    /// A fresh copy of the art as one `<g>`, every id prefixed with `prefix`.
    pub fn instantiate(&self, prefix: &str) -> Element {
        let mut group = Element::new("g");
        for e in &self.content {
            group.push(e.clone());
        }
        group.prefix_ids(prefix);
        group
    }
}

/// Id of band slot `k` (1-based) before prefixing.
pub fn band_slot_id(k: usize) -> String {
    format!("{BAND_SLOT_PREFIX}{k}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RESISTOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="2.5mm" viewBox="0 0 1000 250">
  <g transform="translate(100 25)">
    <rect id="origin" x="0" y="100" width="1" height="1"/>
  </g>
  <rect id="body" x="100" y="0" width="800" height="250" style="fill:#d2b48c"/>
  <rect id="res_band1" x="200" y="0" width="50" height="250" style="fill:#000;display:none"/>
  <rect id="res_band2" x="300" y="0" width="50" height="250" style="fill:#000;display:none"/>
  <rect id="res_band3" x="400" y="0" width="50" height="250" style="fill:#000;display:none"/>
</svg>"#;

    fn id() -> FootprintId {
        FootprintId::new("Resistors", "R_THT")
    }

    #[test]
    fn reads_scale_origin_and_band_slots() {
        let d = FootprintDrawing::from_svg(id(), "lib", RESISTOR).unwrap();
        assert_abs_diff_eq!(d.scale[0], 0.01);
        assert_abs_diff_eq!(d.scale[1], 0.01);
        assert_eq!(d.origin, Some([100.0, 125.0]));
        assert_eq!(d.band_slots, 3);
        assert_eq!(d.size_mm, [10.0, 2.5]);
    }

    #[test]
    fn origin_anchor_is_removed_from_the_art() {
        let d = FootprintDrawing::from_svg(id(), "lib", RESISTOR).unwrap();
        let g = d.instantiate("x_");
        assert!(g.find_by_id("origin").is_none());
        assert!(g.find_by_id("x_origin").is_none());
        assert!(g.find_by_id("x_res_band1").is_some());
    }

    #[test]
    fn missing_origin_is_reported_as_none() {
        let svg = r#"<svg width="1mm" height="1mm" viewBox="0 0 1 1"><circle r="0.5"/></svg>"#;
        let d = FootprintDrawing::from_svg(id(), "lib", svg).unwrap();
        assert_eq!(d.origin, None);
        assert_eq!(d.origin_or_zero(), [0.0, 0.0]);
        assert_eq!(d.band_slots, 0);
    }

    #[test]
    fn circle_origin_uses_its_center() {
        let svg = r#"<svg width="2mm" height="2mm" viewBox="0 0 2 2"><circle id="origin" cx="1" cy="1.5" r="0.1"/></svg>"#;
        let d = FootprintDrawing::from_svg(id(), "lib", svg).unwrap();
        assert_eq!(d.origin, Some([1.0, 1.5]));
    }

    #[test]
    fn missing_view_box_means_pixels() {
        let svg = r#"<svg width="96" height="48"><g/></svg>"#;
        let d = FootprintDrawing::from_svg(id(), "lib", svg).unwrap();
        assert_abs_diff_eq!(d.size_mm[0], 25.4, epsilon = 1e-9);
        assert_abs_diff_eq!(d.scale[0], 25.4 / 96.0, epsilon = 1e-12);
    }

    #[test]
    fn size_is_required() {
        let err = FootprintDrawing::from_svg(id(), "lib", "<svg viewBox=\"0 0 1 1\"/>").unwrap_err();
        assert!(matches!(
            err,
            DrawingError::Svg(SvgError::MissingAttribute { attr: "width", .. })
        ));
        let err =
            FootprintDrawing::from_svg(id(), "lib", r#"<svg width="1mm" height="1mm" viewBox="0 0 0 1"/>"#)
                .unwrap_err();
        assert!(matches!(err, DrawingError::DegenerateViewBox));
    }
}
