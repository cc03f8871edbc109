//! Color theme for substrate, highlights and resistor bands.

use indexmap::IndexMap;
use pcbdraw_svg::css::parse_style;
use pcbdraw_svg::Color;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    #[error("style is not valid JSON: {0}")]
    Json(String),
    #[error("style must be a JSON object")]
    NotAnObject,
    #[error("invalid color {value:?} for style key \"{key}\"")]
    InvalidColor { key: String, value: String },
    #[error("style key \"{key}\" must be {expected}")]
    InvalidType { key: String, expected: &'static str },
}

pub const BAND_COLORS_KEY: &str = "tht-resistor-band-colors";

const DEFAULT_BANDS: &[(&str, &str)] = &[
    ("0", "#000000"),
    ("1", "#805500"),
    ("2", "#ff0000"),
    ("3", "#ff8000"),
    ("4", "#ffff00"),
    ("5", "#00cc11"),
    ("6", "#0000cc"),
    ("7", "#cc00cc"),
    ("8", "#666666"),
    ("9", "#cccccc"),
    ("-1", "#ffc800"),
    ("-2", "#d9d9d9"),
    ("1%", "#805500"),
    ("2%", "#ff0000"),
    ("0.5%", "#00cc11"),
    ("0.25%", "#0000cc"),
    ("0.1%", "#cc00cc"),
    ("0.05%", "#666666"),
    ("5%", "#ffc800"),
    ("10%", "#d9d9d9"),
];

/// Resistor color code table: digits `0`-`9`, gold/silver multipliers `-1`/`-2` and
/// tolerances keyed by their percentage text.
#[derive(Debug, Clone, PartialEq)]
pub struct BandColors {
    entries: IndexMap<String, Color>,
}

impl Default for BandColors {
    fn default() -> Self {
        let entries = DEFAULT_BANDS
            .iter()
            .filter_map(|(k, v)| v.parse().ok().map(|c| (k.to_string(), c)))
            .collect();
        Self { entries }
    }
}

impl BandColors {
    pub fn digit(&self, d: u8) -> Option<Color> {
        self.entries.get(d.to_string().as_str()).copied()
    }

    /// Color of a decade multiplier `10^exp`.
    pub fn multiplier(&self, exp: i32) -> Option<Color> {
        if !(-2..=9).contains(&exp) {
            return None;
        }
        self.entries.get(exp.to_string().as_str()).copied()
    }

    pub fn tolerance(&self, tolerance: &str) -> Option<Color> {
        if !tolerance.ends_with('%') {
            return None;
        }
        self.entries.get(tolerance).copied()
    }

    fn is_band_key(key: &str) -> bool {
        key.parse::<i32>().is_ok_and(|n| (-2..=9).contains(&n))
            || key
                .strip_suffix('%')
                .is_some_and(|p| p.parse::<f64>().is_ok())
    }
}

/// Validated theme. Every key has a value; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTheme {
    pub copper: Color,
    pub board: Color,
    pub silk: Color,
    pub pads: Color,
    pub outline: Color,
    pub clad: Color,
    pub vcut: Color,
    pub paste: Color,
    pub highlight_on_top: bool,
    /// Inline CSS applied to highlight rectangles.
    pub highlight_style: String,
    /// Millimetres added around the drawing on every side.
    pub highlight_padding: f64,
    /// Millimetres the highlight is shifted along both axes of the component frame.
    pub highlight_offset: f64,
    pub band_colors: BandColors,
}

impl Default for StyleTheme {
    fn default() -> Self {
        Self {
            copper: Color::rgb(0x41, 0x7e, 0x5a),
            board: Color::rgb(0x4c, 0xa0, 0x6c),
            silk: Color::rgb(0xf0, 0xf0, 0xf0),
            pads: Color::rgb(0xb5, 0xae, 0x30),
            outline: Color::rgb(0x00, 0x00, 0x00),
            clad: Color::rgb(0x9c, 0x6b, 0x28),
            vcut: Color::rgb(0xbf, 0x26, 0x00),
            paste: Color::rgb(0x8a, 0x8a, 0x8a),
            highlight_on_top: false,
            highlight_style: "stroke:none;fill:#ff0000;opacity:0.5;".to_string(),
            highlight_padding: 1.5,
            highlight_offset: 0.0,
            band_colors: BandColors::default(),
        }
    }
}

fn color(key: &str, value: &Value) -> Result<Color, StyleError> {
    let text = value.as_str().ok_or_else(|| StyleError::InvalidType {
        key: key.to_string(),
        expected: "a color string",
    })?;
    text.parse().map_err(|_| StyleError::InvalidColor {
        key: key.to_string(),
        value: text.to_string(),
    })
}

fn number(key: &str, value: &Value) -> Result<f64, StyleError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StyleError::InvalidType {
            key: key.to_string(),
            expected: "a number",
        })
}

/// Colors inside an inline style must parse too; `none` and paint servers are allowed.
fn validate_inline_style(key: &str, css: &str) -> Result<(), StyleError> {
    for (prop, value) in parse_style(css) {
        if !matches!(prop.as_str(), "fill" | "stroke" | "color" | "stop-color") {
            continue;
        }
        if value == "none" || value.starts_with("url(") || value.parse::<Color>().is_ok() {
            continue;
        }
        return Err(StyleError::InvalidColor {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}

impl StyleTheme {
    /// Parse a JSON theme, filling every unset key with its default. Unknown keys are
    /// ignored.
    pub fn from_json(text: &str) -> Result<Self, StyleError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| StyleError::Json(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(StyleError::NotAnObject);
        };
        Self::from_map(&map)
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, StyleError> {
        let mut theme = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "copper" => theme.copper = color(key, value)?,
                "board" => theme.board = color(key, value)?,
                "silk" => theme.silk = color(key, value)?,
                "pads" => theme.pads = color(key, value)?,
                "outline" => theme.outline = color(key, value)?,
                "clad" => theme.clad = color(key, value)?,
                "vcut" => theme.vcut = color(key, value)?,
                "paste" => theme.paste = color(key, value)?,
                "highlight-on-top" => {
                    theme.highlight_on_top =
                        value.as_bool().ok_or_else(|| StyleError::InvalidType {
                            key: key.clone(),
                            expected: "a boolean",
                        })?;
                }
                "highlight-style" => {
                    let css = value.as_str().ok_or_else(|| StyleError::InvalidType {
                        key: key.clone(),
                        expected: "a CSS declaration string",
                    })?;
                    validate_inline_style(key, css)?;
                    theme.highlight_style = css.to_string();
                }
                "highlight-padding" => theme.highlight_padding = number(key, value)?,
                "highlight-offset" => theme.highlight_offset = number(key, value)?,
                BAND_COLORS_KEY => {
                    let bands = value.as_object().ok_or_else(|| StyleError::InvalidType {
                        key: key.clone(),
                        expected: "an object",
                    })?;
                    for (band, c) in bands {
                        if !BandColors::is_band_key(band) {
                            tracing::debug!(band = %band, "ignoring unknown resistor band key");
                            continue;
                        }
                        let full_key = format!("{BAND_COLORS_KEY}.{band}");
                        theme
                            .band_colors
                            .entries
                            .insert(band.clone(), color(&full_key, c)?);
                    }
                }
                other => tracing::debug!(key = other, "ignoring unknown style key"),
            }
        }
        Ok(theme)
    }
}
