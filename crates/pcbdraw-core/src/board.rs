use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Bounds;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoardError {
    #[error("invalid footprint id \"{0}\" (expected <library>:<module>)")]
    InvalidFootprintId(String),
    #[error("invalid board side \"{0}\" (expected front or back)")]
    InvalidSide(String),
    #[error("unknown layer \"{0}\"")]
    InvalidLayer(String),
    #[error("duplicate reference designator \"{0}\"")]
    DuplicateReference(String),
    #[error("{0} has a coordinate that is not a finite number")]
    NonFinite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    #[must_use]
    pub fn copper(self) -> Layer {
        match self {
            Side::Front => Layer::FCu,
            Side::Back => Layer::BCu,
        }
    }

    #[must_use]
    pub fn silk(self) -> Layer {
        match self {
            Side::Front => Layer::FSilkS,
            Side::Back => Layer::BSilkS,
        }
    }

    #[must_use]
    pub fn mask(self) -> Layer {
        match self {
            Side::Front => Layer::FMask,
            Side::Back => Layer::BMask,
        }
    }

    #[must_use]
    pub fn paste(self) -> Layer {
        match self {
            Side::Front => Layer::FPaste,
            Side::Back => Layer::BPaste,
        }
    }
}

impl FromStr for Side {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "top" | "f" => Ok(Side::Front),
            "back" | "bottom" | "b" => Ok(Side::Back),
            _ => Err(BoardError::InvalidSide(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => f.write_str("front"),
            Side::Back => f.write_str("back"),
        }
    }
}

const BACK_SUFFIX: &str = ".back";

/// `library:module` pair naming one footprint drawing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FootprintId {
    library: String,
    module: String,
}

impl FootprintId {
    #[must_use]
    pub fn new(library: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            module: module.into(),
        }
    }

    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn is_back(&self) -> bool {
        self.module.ends_with(BACK_SUFFIX)
    }

    /// The back-side art entry for this footprint (`module.back`). Idempotent.
    #[must_use]
    pub fn back(&self) -> Self {
        if self.is_back() {
            return self.clone();
        }
        Self::new(self.library.clone(), format!("{}{BACK_SUFFIX}", self.module))
    }
}

impl FromStr for FootprintId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (library, module) = s
            .split_once(':')
            .ok_or_else(|| BoardError::InvalidFootprintId(s.to_string()))?;
        let (library, module) = (library.trim(), module.trim());
        if library.is_empty() || module.is_empty() || module.contains(':') {
            return Err(BoardError::InvalidFootprintId(s.to_string()));
        }
        Ok(Self::new(library, module))
    }
}

impl TryFrom<String> for FootprintId {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FootprintId> for String {
    fn from(id: FootprintId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for FootprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.module)
    }
}

/// Normalize degrees into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

fn de_rotation<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(normalize_rotation(f64::deserialize(de)?))
}

/// One placed component. `rotation` is in degrees, clockwise-positive, always in `[0, 360)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub reference: String,
    pub footprint: FootprintId,
    pub position: [f64; 2],
    #[serde(default, deserialize_with = "de_rotation")]
    pub rotation: f64,
    #[serde(default)]
    pub side: Side,
    /// Part value as printed on the board (`10k`, `100n`, ...).
    #[serde(default)]
    pub value: String,
}

impl ComponentInstance {
    #[must_use]
    pub fn new(
        reference: impl Into<String>,
        footprint: FootprintId,
        position: [f64; 2],
        rotation: f64,
        side: Side,
    ) -> Self {
        Self {
            reference: reference.into(),
            footprint,
            position,
            rotation: normalize_rotation(rotation),
            side,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

macro_rules! layers {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Board layers, named as the board editor names them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Layer {
            $($variant),*
        }

        impl Layer {
            pub const ALL: &'static [Layer] = &[$(Layer::$variant),*];

            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Layer::$variant => $name),*
                }
            }
        }
    };
}

layers! {
    FCu => "F.Cu",
    BCu => "B.Cu",
    FAdhes => "F.Adhes",
    BAdhes => "B.Adhes",
    FPaste => "F.Paste",
    BPaste => "B.Paste",
    FSilkS => "F.SilkS",
    BSilkS => "B.SilkS",
    FMask => "F.Mask",
    BMask => "B.Mask",
    DwgsUser => "Dwgs.User",
    CmtsUser => "Cmts.User",
    Eco1User => "Eco1.User",
    Eco2User => "Eco2.User",
    EdgeCuts => "Edge.Cuts",
    Margin => "Margin",
    FCrtYd => "F.CrtYd",
    BCrtYd => "B.CrtYd",
    FFab => "F.Fab",
    BFab => "B.Fab",
}

impl FromStr for Layer {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', ".");
        Layer::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| BoardError::InvalidLayer(s.to_string()))
    }
}

impl TryFrom<String> for Layer {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Layer> for String {
    fn from(layer: Layer) -> Self {
        layer.name().to_string()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_true() -> bool {
    true
}

/// A drawn substrate primitive. Angles are degrees, positive sweeps turn clockwise on the
/// y-down board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Segment {
        start: [f64; 2],
        end: [f64; 2],
        #[serde(default)]
        width: f64,
    },
    Arc {
        center: [f64; 2],
        radius: f64,
        start_angle: f64,
        angle: f64,
        #[serde(default)]
        width: f64,
    },
    Circle {
        center: [f64; 2],
        radius: f64,
        #[serde(default)]
        width: f64,
        #[serde(default)]
        filled: bool,
    },
    Rect {
        start: [f64; 2],
        end: [f64; 2],
        #[serde(default)]
        width: f64,
        #[serde(default)]
        filled: bool,
    },
    Polygon {
        points: Vec<[f64; 2]>,
        #[serde(default)]
        width: f64,
        #[serde(default = "default_true")]
        filled: bool,
    },
}

impl Shape {
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        match self {
            Shape::Segment { width, .. }
            | Shape::Arc { width, .. }
            | Shape::Circle { width, .. }
            | Shape::Rect { width, .. }
            | Shape::Polygon { width, .. } => *width,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        let pt = |p: &[f64; 2]| p[0].is_finite() && p[1].is_finite();
        match self {
            Shape::Segment { start, end, width } | Shape::Rect { start, end, width, .. } => {
                pt(start) && pt(end) && width.is_finite()
            }
            Shape::Arc {
                center,
                radius,
                start_angle,
                angle,
                width,
            } => pt(center) && [*radius, *start_angle, *angle, *width].iter().all(|v| v.is_finite()),
            Shape::Circle {
                center,
                radius,
                width,
                ..
            } => pt(center) && radius.is_finite() && width.is_finite(),
            Shape::Polygon { points, width, .. } => points.iter().all(pt) && width.is_finite(),
        }
    }

    /// Bounds including half the stroke width.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::empty();
        match self {
            Shape::Segment { start, end, .. } => {
                b.include_point(*start);
                b.include_point(*end);
            }
            Shape::Arc {
                center,
                radius,
                start_angle,
                angle,
                ..
            } => {
                let point = |deg: f64| {
                    let (s, c) = deg.to_radians().sin_cos();
                    [center[0] + radius * c, center[1] + radius * s]
                };
                let (lo, hi) = if *angle >= 0.0 {
                    (*start_angle, start_angle + angle)
                } else {
                    (start_angle + angle, *start_angle)
                };
                b.include_point(point(lo));
                b.include_point(point(hi));
                if hi - lo >= 360.0 {
                    b.include_point([center[0] - radius.abs(), center[1] - radius.abs()]);
                    b.include_point([center[0] + radius.abs(), center[1] + radius.abs()]);
                } else if lo.is_finite() && hi.is_finite() {
                    let first = (lo / 90.0).ceil() * 90.0;
                    (0..4)
                        .map(|k| first + 90.0 * f64::from(k))
                        .take_while(|cardinal| *cardinal < hi)
                        .for_each(|cardinal| b.include_point(point(cardinal)));
                }
            }
            Shape::Circle { center, radius, .. } => {
                let r = radius.abs();
                b.include_point([center[0] - r, center[1] - r]);
                b.include_point([center[0] + r, center[1] + r]);
            }
            Shape::Rect { start, end, .. } => {
                b.include_point(*start);
                b.include_point(*end);
            }
            Shape::Polygon { points, .. } => {
                for p in points {
                    b.include_point(*p);
                }
            }
        }
        b.expand(self.stroke_width() / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadShape {
    #[default]
    Rect,
    Circle,
    Oval,
    #[serde(rename = "roundrect")]
    RoundRect { ratio: f64 },
}

fn default_pad_layers() -> Vec<Layer> {
    vec![Layer::FCu]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub at: [f64; 2],
    pub size: [f64; 2],
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub shape: PadShape,
    #[serde(default = "default_pad_layers")]
    pub layers: Vec<Layer>,
    /// Drill size `[w, h]`; unequal sizes are slots.
    #[serde(default)]
    pub drill: Option<[f64; 2]>,
}

impl Pad {
    #[must_use]
    pub fn on(&self, side: Side) -> bool {
        self.layers.contains(&side.copper())
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let r = self.size[0].hypot(self.size[1]) / 2.0;
        Bounds::new(self.at[0] - r, self.at[1] - r, self.at[0] + r, self.at[1] + r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub at: [f64; 2],
    pub diameter: f64,
    pub drill: f64,
}

/// A drilled opening (round or slotted) through the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub position: [f64; 2],
    /// Degrees, clockwise-positive.
    pub orientation: f64,
    pub size: [f64; 2],
}

/// Bare-board geometry grouped by layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstrateGeometry {
    #[serde(default)]
    pub layers: IndexMap<Layer, Vec<Shape>>,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub vias: Vec<Via>,
}

impl SubstrateGeometry {
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &[Shape] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, layer: Layer, shape: Shape) {
        self.layers.entry(layer).or_default().push(shape);
    }

    /// Drill holes of all pads and vias; zero-sized drills are skipped.
    #[must_use]
    pub fn holes(&self) -> Vec<Hole> {
        let pads = self.pads.iter().filter_map(|pad| {
            let size = pad.drill?;
            (size[0] > 0.0 && size[1] > 0.0).then_some(Hole {
                position: pad.at,
                orientation: pad.rotation,
                size,
            })
        });
        let vias = self.vias.iter().filter(|v| v.drill > 0.0).map(|v| Hole {
            position: v.at,
            orientation: 0.0,
            size: [v.drill, v.drill],
        });
        pads.chain(vias).collect()
    }

    /// Full substrate extent: the board edge when present, everything otherwise.
    #[must_use]
    pub fn extent(&self) -> Bounds {
        let mut edge = Bounds::empty();
        for shape in self.layer(Layer::EdgeCuts) {
            edge.include(&shape.bounds());
        }
        if !edge.is_empty() {
            return edge;
        }

        let mut all = Bounds::empty();
        for shape in self.layers.values().flatten() {
            all.include(&shape.bounds());
        }
        for pad in &self.pads {
            all.include(&pad.bounds());
        }
        for via in &self.vias {
            let r = via.diameter / 2.0;
            all.include(&Bounds::new(
                via.at[0] - r,
                via.at[1] - r,
                via.at[0] + r,
                via.at[1] + r,
            ));
        }
        all
    }
}

/// Everything the board-data provider hands to one compositing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardModel {
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    #[serde(default)]
    pub substrate: SubstrateGeometry,
}

impl BoardModel {
    /// Reference designators must be unique and all geometry finite.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for c in &self.components {
            if !seen.insert(c.reference.as_str()) {
                return Err(BoardError::DuplicateReference(c.reference.clone()));
            }
            if !(c.position.iter().all(|v| v.is_finite()) && c.rotation.is_finite()) {
                return Err(BoardError::NonFinite(format!("component {}", c.reference)));
            }
        }
        for (layer, shapes) in &self.substrate.layers {
            if let Some(k) = shapes.iter().position(|shape| !shape.is_finite()) {
                return Err(BoardError::NonFinite(format!("shape {k} on {layer}")));
            }
        }
        for (k, pad) in self.substrate.pads.iter().enumerate() {
            let numbers = [pad.at[0], pad.at[1], pad.size[0], pad.size[1]];
            if !numbers.iter().all(|v| v.is_finite()) {
                return Err(BoardError::NonFinite(format!("pad {k}")));
            }
        }
        Ok(())
    }
}
