//! Resistor color code: resistance text to band colors.

use pcbdraw_svg::Color;

use crate::style::BandColors;

pub const DEFAULT_TOLERANCE: &str = "5%";

const OHM_SPELLINGS: &[&str] = &["Ohms", "ohms", "OHMS", "Ohm", "ohm", "OHM", "\u{3a9}", "\u{2126}"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResistorError {
    #[error("empty resistance value")]
    Empty,
    #[error("malformed resistance value \"{0}\"")]
    Malformed(String),
    #[error("resistance must be positive")]
    NotPositive,
    #[error("multiplier 10^{0} has no color band")]
    MultiplierOutOfRange(i32),
    #[error("tolerance \"{0}\" has no color band")]
    UnknownTolerance(String),
}

/// A resistance as `mantissa * 10^exponent`, mantissa without trailing zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resistance {
    mantissa: Vec<u8>,
    exponent: i32,
}

impl Resistance {
    /// First two significant digits, the second one `0` when there is only one.
    pub fn significant(&self) -> [u8; 2] {
        [self.mantissa[0], self.mantissa.get(1).copied().unwrap_or(0)]
    }

    /// Decade multiplier for the two significant digits.
    pub fn multiplier(&self) -> i32 {
        self.exponent + self.mantissa.len() as i32 - 2
    }

    pub fn ohms(&self) -> f64 {
        let m = self
            .mantissa
            .iter()
            .fold(0.0, |acc, d| acc * 10.0 + f64::from(*d));
        m * 10f64.powi(self.exponent)
    }
}

fn unit_exponent(c: char) -> Option<i32> {
    match c {
        'm' => Some(-3),
        'R' | 'r' => Some(0),
        'k' | 'K' => Some(3),
        'M' => Some(6),
        'G' => Some(9),
        _ => None,
    }
}

/// Parse the numeric part of a value (`4k7`, `0R47`, `470m`, `2.2M`, `100`).
pub fn parse_resistance(text: &str) -> Result<Resistance, ResistorError> {
    let mut s: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    for ohm in OHM_SPELLINGS {
        s = s.replace(ohm, "");
    }
    if s.is_empty() {
        return Err(ResistorError::Empty);
    }
    let malformed = || ResistorError::Malformed(text.trim().to_string());

    let mut units = s.char_indices().filter(|(_, c)| unit_exponent(*c).is_some());
    let (number, unit_exp) = match (units.next(), units.next()) {
        (None, _) => (s.clone(), 0),
        (Some((at, unit)), None) => {
            let (left, right) = (&s[..at], &s[at + unit.len_utf8()..]);
            let exp = unit_exponent(unit).ok_or_else(malformed)?;
            if right.is_empty() {
                (left.to_string(), exp)
            } else if left.contains('.') || right.contains('.') {
                return Err(malformed());
            } else {
                let left = if left.is_empty() { "0" } else { left };
                (format!("{left}.{right}"), exp)
            }
        }
        (Some(_), Some(_)) => return Err(malformed()),
    };

    let (int_part, frac_part) = number.split_once('.').unwrap_or((&number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(malformed());
    }
    let mut mantissa = Vec::with_capacity(int_part.len() + frac_part.len());
    for c in int_part.chars().chain(frac_part.chars()) {
        mantissa.push(c.to_digit(10).ok_or_else(malformed)? as u8);
    }
    let mut exponent = unit_exp - frac_part.len() as i32;

    let leading = mantissa.iter().take_while(|d| **d == 0).count();
    mantissa.drain(..leading);
    if mantissa.is_empty() {
        return Err(ResistorError::NotPositive);
    }
    while mantissa.last() == Some(&0) {
        mantissa.pop();
        exponent += 1;
    }
    Ok(Resistance { mantissa, exponent })
}

/// Colors for one resistor, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistorBands {
    /// First digit, second digit, multiplier.
    pub value: [Color; 3],
    pub tolerance: Color,
}

impl ResistorBands {
    /// Parse `value [tolerance]` text, e.g. `10k` or `4k7 1%`.
    pub fn from_text(text: &str, colors: &BandColors) -> Result<Self, ResistorError> {
        let trimmed = text.trim();
        let (value, tolerance) = match trimmed.rsplit_once(char::is_whitespace) {
            Some((v, t)) if t.ends_with('%') => (v, t.trim_start_matches('\u{b1}')),
            _ => (trimmed, DEFAULT_TOLERANCE),
        };
        let resistance = parse_resistance(value)?;
        let [d1, d2] = resistance.significant();
        let mult = resistance.multiplier();
        let digit = |d: u8| colors.digit(d).ok_or(ResistorError::MultiplierOutOfRange(mult));
        Ok(Self {
            value: [
                digit(d1)?,
                digit(d2)?,
                colors
                    .multiplier(mult)
                    .ok_or(ResistorError::MultiplierOutOfRange(mult))?,
            ],
            tolerance: colors
                .tolerance(tolerance)
                .ok_or_else(|| ResistorError::UnknownTolerance(tolerance.to_string()))?,
        })
    }

    /// Colors for a drawing with `slots` band slots: three value bands, plus the tolerance
    /// band when a fourth slot exists. `flip` reverses the sequence.
    pub fn sequence(&self, slots: usize, flip: bool) -> Vec<Color> {
        let mut bands = self.value.to_vec();
        if slots >= 4 {
            bands.push(self.tolerance);
        }
        if flip {
            bands.reverse();
        }
        bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hex(colors: &[Color]) -> Vec<String> {
        colors.iter().map(Color::to_hex).collect()
    }

    #[test]
    fn unit_letters_act_as_decimal_point() {
        for (text, ohms) in [
            ("10k", 10_000.0),
            ("4k7", 4_700.0),
            ("0R47", 0.47),
            ("470m", 0.47),
            ("2.2M", 2_200_000.0),
            ("1G", 1e9),
            ("100", 100.0),
            ("220 Ohm", 220.0),
            ("1k\u{3a9}", 1_000.0),
            ("R1", 0.1),
            (".5", 0.5),
        ] {
            let r = parse_resistance(text).unwrap();
            assert_relative_eq!(r.ohms(), ohms, max_relative = 1e-12);
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        for text in ["", "k", "4k7k", "1.2k3", "abc", "1..2", "1-2"] {
            assert!(parse_resistance(text).is_err(), "{text:?} should fail");
        }
        assert_eq!(parse_resistance("0R0"), Err(ResistorError::NotPositive));
    }

    #[test]
    fn ten_k_is_brown_black_orange() {
        let b = ResistorBands::from_text("10k", &BandColors::default()).unwrap();
        assert_eq!(hex(&b.value), ["#805500", "#000000", "#ff8000"]);
        assert_eq!(b.tolerance.to_hex(), "#ffc800");
    }

    #[test]
    fn digits_are_truncated_not_rounded() {
        let r = parse_resistance("4k79").unwrap();
        assert_eq!(r.significant(), [4, 7]);
        assert_eq!(r.multiplier(), 2);
    }

    #[test]
    fn small_values_use_gold_and_silver() {
        let colors = BandColors::default();
        let one = ResistorBands::from_text("1R", &colors).unwrap();
        assert_eq!(one.value[2].to_hex(), "#ffc800");
        let tiny = ResistorBands::from_text("0R47", &colors).unwrap();
        assert_eq!(tiny.value[2].to_hex(), "#d9d9d9");
        assert_eq!(
            ResistorBands::from_text("10m", &colors),
            Err(ResistorError::MultiplierOutOfRange(-3))
        );
        assert_eq!(
            ResistorBands::from_text("100G", &colors),
            Err(ResistorError::MultiplierOutOfRange(10))
        );
    }

    #[test]
    fn tolerance_follows_a_space() {
        let colors = BandColors::default();
        let b = ResistorBands::from_text("4k7 1%", &colors).unwrap();
        assert_eq!(b.tolerance.to_hex(), "#805500");
        assert_eq!(
            ResistorBands::from_text("4k7 3%", &colors),
            Err(ResistorError::UnknownTolerance("3%".into()))
        );
    }

    #[test]
    fn flip_reverses_the_applied_sequence() {
        let b = ResistorBands::from_text("10k", &BandColors::default()).unwrap();
        let mut forward = b.sequence(3, false);
        let backward = b.sequence(3, true);
        assert_eq!(forward.len(), 3);
        forward.reverse();
        assert_eq!(forward, backward);

        let four = b.sequence(4, true);
        assert_eq!(four[0], b.tolerance);
        assert_eq!(four[3], b.value[0]);
    }
}
