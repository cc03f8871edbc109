use pcbdraw_core::Bounds;

use crate::node::Element;
use crate::{fmt_num, SVG_NS};

/// A self-contained vector document. One user unit is one millimetre.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub view_box: Bounds,
    pub defs: Vec<Element>,
    pub body: Vec<Element>,
}

impl Document {
    pub fn new(view_box: Bounds) -> Self {
        Self {
            view_box,
            defs: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn width_mm(&self) -> f64 {
        self.view_box.width()
    }

    pub fn height_mm(&self) -> f64 {
        self.view_box.height()
    }

    /// Look an id up in `<defs>` first, then in the body.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.defs
            .iter()
            .chain(self.body.iter())
            .find_map(|e| e.find_by_id(id))
    }

    pub fn prune_empty_groups(&mut self) {
        for e in &mut self.body {
            e.prune_empty_groups();
        }
        self.body.retain(|e| !e.is_empty_group());
    }

    /// The `<svg>` root element.
    pub fn to_element(&self) -> Element {
        let vb = &self.view_box;
        let mut svg = Element::new("svg")
            .with_attr("xmlns", SVG_NS)
            .with_attr("xmlns:xlink", "http://www.w3.org/1999/xlink")
            .with_attr("width", format!("{}mm", fmt_num(vb.width())))
            .with_attr("height", format!("{}mm", fmt_num(vb.height())))
            .with_attr(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    fmt_num(vb.min_x),
                    fmt_num(vb.min_y),
                    fmt_num(vb.width()),
                    fmt_num(vb.height())
                ),
            );
        if !self.defs.is_empty() {
            let mut defs = Element::new("defs");
            for d in &self.defs {
                defs.push(d.clone());
            }
            svg.push(defs);
        }
        for e in &self.body {
            svg.push(e.clone());
        }
        svg
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        self.to_element().write_xml(&mut out);
        out.push('\n');
        out
    }
}
