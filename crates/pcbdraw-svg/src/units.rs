//! SVG lengths to millimetres. Unitless values and `px` are CSS pixels at 96 dpi.

const MM_PER_PX: f64 = 25.4 / 96.0;

/// Leading number of `s` and the remaining text.
pub(crate) fn split_number(s: &str) -> Option<(f64, &str)> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > start {
            end = exp;
        }
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Convert a length such as `12.5mm`, `1in` or `96` to millimetres.
pub fn length_to_mm(s: &str) -> Option<f64> {
    let (value, unit) = split_number(s)?;
    let factor = match unit.trim() {
        "" | "px" => MM_PER_PX,
        "mm" => 1.0,
        "cm" => 10.0,
        "in" => 25.4,
        "pt" => 25.4 / 72.0,
        "pc" => 25.4 / 6.0,
        _ => return None,
    };
    Some(value * factor)
}

/// Plain number in user units; trailing `px` is tolerated.
pub fn user_length(s: &str) -> Option<f64> {
    let (value, unit) = split_number(s)?;
    matches!(unit.trim(), "" | "px").then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn converts_physical_units() {
        assert_abs_diff_eq!(length_to_mm("10mm").unwrap(), 10.0);
        assert_abs_diff_eq!(length_to_mm("1.5cm").unwrap(), 15.0);
        assert_abs_diff_eq!(length_to_mm("1in").unwrap(), 25.4);
        assert_abs_diff_eq!(length_to_mm("72pt").unwrap(), 25.4, epsilon = 1e-9);
        assert_abs_diff_eq!(length_to_mm("96").unwrap(), 25.4, epsilon = 1e-9);
        assert_abs_diff_eq!(length_to_mm("96px").unwrap(), 25.4, epsilon = 1e-9);
        assert_abs_diff_eq!(length_to_mm("1e1mm").unwrap(), 10.0);
    }

    #[test]
    fn rejects_relative_and_garbage() {
        assert!(length_to_mm("100%").is_none());
        assert!(length_to_mm("mm").is_none());
        assert!(length_to_mm("2em").is_none());
    }
}
