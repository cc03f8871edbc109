use std::collections::HashSet;

use indexmap::IndexMap;
use pcbdraw_core::{ComponentInstance, FootprintId, Layer, Side};
use serde::{Deserialize, Serialize};

/// Marker drawn where a footprint could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholder {
    /// Side length of the square, in mm.
    pub size: f64,
    pub style: String,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            size: 1.0,
            style: "fill:red;".to_string(),
        }
    }
}

/// Per-designator resistor settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistorOverride {
    /// Resistance text; the instance's own value is used when unset.
    pub value: Option<String>,
    /// Reverse the band order.
    pub flip: bool,
}

/// Inputs for one run. Nothing here is mutated while rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub side: Side,
    /// Mirror the whole document about the vertical axis through the board centre.
    pub mirror: bool,
    /// Cut drill holes out as transparent apertures instead of painting them.
    pub drill_holes: bool,
    /// Layer holding V-cut lines, if any should be drawn.
    pub vcuts: Option<Layer>,
    pub paste: bool,
    pub components: bool,
    pub placeholders: Option<Placeholder>,
    /// Stroke width of the board edge, in mm. Zero leaves the edge unstroked.
    pub outline_width: f64,
    /// Free space around the board, in mm.
    pub margin: f64,
    /// Fit the canvas to what was actually drawn rather than the substrate extent.
    pub shrink: bool,
    pub dpi: u32,
    pub resistors: IndexMap<String, ResistorOverride>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            side: Side::Front,
            mirror: false,
            drill_holes: true,
            vcuts: None,
            paste: false,
            components: true,
            placeholders: None,
            outline_width: 0.15,
            margin: 1.5,
            shrink: true,
            dpi: 300,
            resistors: IndexMap::new(),
        }
    }
}

impl RenderConfig {
    /// Resistance text for an instance: the override when set, else the part value.
    pub fn resistor_value<'a>(&'a self, instance: &'a ComponentInstance) -> Option<&'a str> {
        self.resistors
            .get(&instance.reference)
            .and_then(|o| o.value.as_deref())
            .or(Some(instance.value.as_str()))
            .filter(|v| !v.trim().is_empty())
    }

    pub fn resistor_flipped(&self, reference: &str) -> bool {
        self.resistors.get(reference).is_some_and(|o| o.flip)
    }
}

/// Which instances are drawn and which are highlighted. The two sets are independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionPolicy {
    /// `None` draws everything.
    pub filter: Option<HashSet<String>>,
    pub highlight: HashSet<String>,
}

impl SelectionPolicy {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_filter<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(refs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_highlight<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn includes(&self, reference: &str) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(reference))
    }

    pub fn highlights(&self, reference: &str) -> bool {
        self.highlight.contains(reference)
    }
}

/// Per-designator footprint substitutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapTable(IndexMap<String, FootprintId>);

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, footprint: FootprintId) {
        self.0.insert(reference.into(), footprint);
    }

    pub fn get(&self, reference: &str) -> Option<&FootprintId> {
        self.0.get(reference)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Footprint to look up for `instance` when rendering `side`. A replacement keeps the
    /// `.back` suffix of the footprint it replaces; back-side rendering always asks for
    /// the back art.
    pub fn effective(&self, instance: &ComponentInstance, side: Side) -> FootprintId {
        let base = match self.0.get(&instance.reference) {
            Some(replacement) if instance.footprint.is_back() => replacement.back(),
            Some(replacement) => replacement.clone(),
            None => instance.footprint.clone(),
        };
        match side {
            Side::Front => base,
            Side::Back => base.back(),
        }
    }
}

impl FromIterator<(String, FootprintId)> for RemapTable {
    fn from_iter<T: IntoIterator<Item = (String, FootprintId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
