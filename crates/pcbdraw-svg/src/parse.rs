use roxmltree::{Document, ParsingOptions};

use crate::node::Element;
use crate::{SvgError, SVG_NS};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Elements that never contribute to the picture.
const DROPPED: &[&str] = &["title", "desc", "metadata", "namedview"];

/// Elements whose character data matters.
const TEXT_CARRIERS: &[&str] = &["text", "tspan", "textPath", "style"];

/// Read an SVG document into an owned element tree.
///
/// Foreign-namespace elements and attributes (editor annotations) are discarded and
/// `xlink:href` is normalized to `href`.
pub fn parse_svg(text: &str) -> Result<Element, SvgError> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, opts)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(SvgError::NotSvg(root.tag_name().name().to_string()));
    }
    Ok(convert(root).unwrap_or_else(|| Element::new("svg")))
}

fn convert(node: roxmltree::Node<'_, '_>) -> Option<Element> {
    let tag = node.tag_name();
    if tag.namespace().is_some_and(|ns| ns != SVG_NS) || DROPPED.contains(&tag.name()) {
        return None;
    }

    let mut el = Element::new(tag.name());
    for attr in node.attributes() {
        match attr.namespace() {
            None => el.set_attr(attr.name(), attr.value()),
            Some(XLINK_NS) if attr.name() == "href" => {
                if el.attr("href").is_none() {
                    el.set_attr("href", attr.value());
                }
            }
            Some(_) => {}
        }
    }

    let keeps_text = TEXT_CARRIERS.contains(&tag.name());
    for child in node.children() {
        if child.is_element() {
            if let Some(e) = convert(child) {
                el.push(e);
            }
        } else if keeps_text && child.is_text() {
            if let Some(t) = child.text().filter(|t| !t.trim().is_empty()) {
                el.push_text(t);
            }
        }
    }
    Some(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INKSCAPE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
     xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     width="10mm" height="5mm" viewBox="0 0 10 5">
  <title>R</title>
  <sodipodi:namedview id="nv" inkscape:zoom="4"/>
  <metadata><x/></metadata>
  <g id="body" inkscape:label="Body">
    <rect x="0" y="0" width="10" height="5"/>
    <use xlink:href="#body"/>
    <text>R1</text>
  </g>
</svg>"##;

    #[test]
    fn strips_editor_noise() {
        let svg = parse_svg(INKSCAPE).unwrap();
        assert_eq!(svg.attr("width"), Some("10mm"));
        let names: Vec<_> = svg.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["g"]);
        let body = svg.find_by_id("body").unwrap();
        assert_eq!(body.attrs.len(), 1);
        let use_el = body.elements().nth(1).unwrap();
        assert_eq!(use_el.attr("href"), Some("#body"));
        let text = body.elements().nth(2).unwrap();
        assert_eq!(text.children.len(), 1);
    }

    #[test]
    fn rejects_non_svg_roots() {
        assert!(matches!(parse_svg("<html/>"), Err(SvgError::NotSvg(_))));
        assert!(matches!(parse_svg("<svg"), Err(SvgError::Xml(_))));
    }
}
