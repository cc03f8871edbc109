use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::css::{format_style, parse_style};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An owned SVG element. Attribute order is preserved for stable output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search, self included.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.elements().find_map(|e| e.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.elements_mut().find_map(|e| e.find_by_id_mut(id))
    }

    /// Path of child indices from `self` to the descendant with `id`.
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        for (i, child) in self.children.iter().enumerate() {
            if let Node::Element(e) = child {
                if e.id() == Some(id) {
                    return Some(vec![i]);
                }
                if let Some(mut rest) = e.path_to(id) {
                    rest.insert(0, i);
                    return Some(rest);
                }
            }
        }
        None
    }

    /// Detach the first descendant with `id`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        let idx = self.children.iter().position(|n| matches!(n, Node::Element(e) if e.id() == Some(id)));
        if let Some(i) = idx {
            return match self.children.remove(i) {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            };
        }
        self.elements_mut().find_map(|e| e.remove_by_id(id))
    }

    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for child in self.elements() {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.elements_mut() {
            child.walk_mut(f);
        }
    }

    /// Value of one property from the `style` attribute.
    pub fn style(&self, key: &str) -> Option<String> {
        self.attr("style")
            .and_then(|s| parse_style(s).get(key).cloned())
    }

    /// Property lookup the way a renderer resolves it: inline style over presentation attribute.
    pub fn property(&self, key: &str) -> Option<String> {
        self.style(key).or_else(|| self.attr(key).map(str::to_string))
    }

    pub fn set_style(&mut self, key: &str, value: &str) {
        let mut decls = self.attr("style").map(parse_style).unwrap_or_default();
        decls.insert(key.to_string(), value.to_string());
        self.set_attr("style", format_style(&decls));
    }

    /// A group with no element children and no text.
    pub fn is_empty_group(&self) -> bool {
        self.name == "g" && self.children.is_empty()
    }

    /// Remove empty `<g>` elements bottom-up.
    pub fn prune_empty_groups(&mut self) {
        for child in self.elements_mut() {
            child.prune_empty_groups();
        }
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is_empty_group()));
    }

    /// Prefix every `id` with `prefix` and rewrite local references to match, so copies of
    /// the same drawing can live in one document.
    pub fn prefix_ids(&mut self, prefix: &str) {
        let mut ids = Vec::new();
        self.walk(&mut |e| {
            if let Some(id) = e.id() {
                ids.push(id.to_string());
            }
        });
        if ids.is_empty() {
            return;
        }
        ids.sort();
        ids.dedup();

        self.walk_mut(&mut |e| {
            for (key, value) in e.attrs.iter_mut() {
                if key == "id" {
                    *value = format!("{prefix}{value}");
                } else if key == "href" {
                    if let Some(target) = value.strip_prefix('#') {
                        if ids.iter().any(|i| i == target) {
                            *value = format!("#{prefix}{target}");
                        }
                    }
                } else if value.contains("url(#") {
                    *value = rewrite_urls(value, prefix, &ids);
                }
            }
            if e.name == "style" {
                for child in e.children.iter_mut() {
                    if let Node::Text(css) = child {
                        *css = rewrite_stylesheet(css, prefix, &ids);
                    }
                }
            }
        });
    }

    /// Serialize without an XML declaration.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {k}=\"{}\"", escape(v, true));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_xml(out),
                Node::Text(t) => out.push_str(&escape(t, false)),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// `#id` selectors are only rewritten outside declaration blocks, where `#` starts a color.
fn rewrite_stylesheet(css: &str, prefix: &str, ids: &[String]) -> String {
    let mut out = String::with_capacity(css.len());
    let mut depth = 0usize;
    let mut rest = css;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        out.push(c);
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '#' if depth == 0 => {
                let end = rest
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '-' || ch == '_'))
                    .unwrap_or(rest.len());
                let name = &rest[..end];
                if ids.iter().any(|i| i == name) {
                    out.push_str(prefix);
                }
                out.push_str(name);
                rest = &rest[end..];
            }
            _ => {}
        }
    }
    if out.contains("url(#") {
        rewrite_urls(&out, prefix, ids)
    } else {
        out
    }
}

fn rewrite_urls(value: &str, prefix: &str, ids: &[String]) -> String {
    let mut out = String::with_capacity(value.len() + prefix.len());
    let mut rest = value;
    while let Some(pos) = rest.find("url(#") {
        out.push_str(&rest[..pos + 5]);
        rest = &rest[pos + 5..];
        let end = rest.find(')').unwrap_or(rest.len());
        let target = rest[..end].trim().trim_matches(['"', '\'']);
        if ids.iter().any(|i| i == target) {
            out.push_str(prefix);
        }
        out.push_str(&rest[..end]);
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("svg")
            .with_child(
                Element::new("defs").with_child(Element::new("linearGradient").with_attr("id", "grad")),
            )
            .with_child(
                Element::new("g")
                    .with_attr("id", "body")
                    .with_child(Element::new("rect").with_attr("style", "fill:url(#grad);stroke:none"))
                    .with_child(Element::new("use").with_attr("href", "#body"))
                    .with_child(Element::new("use").with_attr("href", "#elsewhere")),
            )
    }

    #[test]
    fn prefixing_rewrites_ids_and_references() {
        let mut svg = sample();
        svg.prefix_ids("p1_");
        assert!(svg.find_by_id("p1_grad").is_some());
        assert!(svg.find_by_id("grad").is_none());
        let body = svg.find_by_id("p1_body").unwrap();
        let rect = body.elements().next().unwrap();
        assert_eq!(rect.style("fill").as_deref(), Some("url(#p1_grad)"));
        let uses: Vec<_> = body.elements().skip(1).map(|e| e.attr("href").unwrap()).collect();
        assert_eq!(uses, vec!["#p1_body", "#elsewhere"]);
    }

    #[test]
    fn prefixing_rewrites_style_sheet_selectors() {
        let mut style = Element::new("style");
        style.push_text("#body, #elsewhere > rect { fill:#body; stroke:url(#grad) } #grad{}");
        let mut svg = sample().with_child(style);
        svg.prefix_ids("p1_");
        let style = svg.elements().last().unwrap();
        let Some(Node::Text(css)) = style.children.first() else {
            panic!("style text lost");
        };
        assert_eq!(
            css,
            "#p1_body, #elsewhere > rect { fill:#body; stroke:url(#p1_grad) } #p1_grad{}"
        );
    }

    #[test]
    fn remove_by_id_detaches_nested_element() {
        let mut svg = sample();
        let removed = svg.remove_by_id("grad").unwrap();
        assert_eq!(removed.name, "linearGradient");
        assert!(svg.find_by_id("grad").is_none());
    }

    #[test]
    fn set_style_keeps_other_declarations() {
        let mut e = Element::new("rect").with_attr("style", "fill:#000;display:none");
        e.set_style("display", "inline");
        e.set_style("fill", "#805500");
        assert_eq!(e.attr("style"), Some("fill:#805500;display:inline;"));
    }

    #[test]
    fn empty_groups_are_pruned_recursively() {
        let mut root = Element::new("svg")
            .with_child(Element::new("g").with_child(Element::new("g")))
            .with_child(Element::new("g").with_child(Element::new("path")));
        root.prune_empty_groups();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn writes_escaped_xml() {
        let mut e = Element::new("text").with_attr("data", "a\"b");
        e.push_text("1 < 2 & 3");
        let mut out = String::new();
        e.write_xml(&mut out);
        assert_eq!(out, "<text data=\"a&quot;b\">1 &lt; 2 &amp; 3</text>");
    }
}
