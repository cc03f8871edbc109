use pcbdraw_core::Affine;

use crate::fmt_num;
use crate::units::split_number;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("unknown transform function \"{0}\"")]
    UnknownFunction(String),
    #[error("{name}() takes {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },
    #[error("malformed transform list near \"{0}\"")]
    Syntax(String),
}

/// Parse a `transform` attribute. The list composes left to right, so the rightmost
/// function is applied to coordinates first.
pub fn parse_transform(text: &str) -> Result<Affine, TransformError> {
    let mut acc = Affine::IDENTITY;
    let mut rest = text.trim();
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| TransformError::Syntax(rest.to_string()))?;
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let close = rest[open..]
            .find(')')
            .map(|i| i + open)
            .ok_or_else(|| TransformError::Syntax(rest.to_string()))?;
        let args = parse_args(&rest[open + 1..close])
            .ok_or_else(|| TransformError::Syntax(rest[..=close].to_string()))?;
        acc = acc * function(name, &args)?;
        rest = rest[close + 1..].trim_start_matches([',', ' ', '\t', '\n', '\r']);
    }
    Ok(acc)
}

fn parse_args(text: &str) -> Option<Vec<f64>> {
    let mut out = Vec::new();
    let mut rest = text.trim_start_matches([',', ' ', '\t', '\n', '\r']);
    while !rest.is_empty() {
        let (v, tail) = split_number(rest)?;
        out.push(v);
        rest = tail.trim_start_matches([',', ' ', '\t', '\n', '\r']);
    }
    Some(out)
}

fn function(name: &str, args: &[f64]) -> Result<Affine, TransformError> {
    let arity = |expected: &'static str| TransformError::Arity {
        name: name.to_string(),
        expected,
        got: args.len(),
    };
    match name {
        "matrix" => match *args {
            [a, b, c, d, e, f] => Ok(Affine::new(a, b, c, d, e, f)),
            _ => Err(arity("6")),
        },
        "translate" => match *args {
            [tx] => Ok(Affine::translate(tx, 0.0)),
            [tx, ty] => Ok(Affine::translate(tx, ty)),
            _ => Err(arity("1 or 2")),
        },
        "scale" => match *args {
            [s] => Ok(Affine::scale(s, s)),
            [sx, sy] => Ok(Affine::scale(sx, sy)),
            _ => Err(arity("1 or 2")),
        },
        "rotate" => match *args {
            [a] => Ok(Affine::rotate(a)),
            [a, cx, cy] => Ok(Affine::rotate_about(a, [cx, cy])),
            _ => Err(arity("1 or 3")),
        },
        "skewX" => match *args {
            [a] => Ok(Affine::skew_x(a)),
            _ => Err(arity("1")),
        },
        "skewY" => match *args {
            [a] => Ok(Affine::skew_y(a)),
            _ => Err(arity("1")),
        },
        other => Err(TransformError::UnknownFunction(other.to_string())),
    }
}

/// Render as `matrix(a b c d e f)`, or `translate(x y)` when there is no linear part.
pub fn format_transform(tf: &Affine) -> String {
    let [a, b, c, d, e, f] = tf.as_array();
    if (a - 1.0).abs() < 1e-12 && b.abs() < 1e-12 && c.abs() < 1e-12 && (d - 1.0).abs() < 1e-12 {
        return format!("translate({} {})", fmt_num(e), fmt_num(f));
    }
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(a),
        fmt_num(b),
        fmt_num(c),
        fmt_num(d),
        fmt_num(e),
        fmt_num(f)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn list_applies_rightmost_first() {
        let tf = parse_transform("translate(10,0) scale(2)").unwrap();
        let p = tf.apply([1.0, 1.0]);
        assert_abs_diff_eq!(p[0], 12.0);
        assert_abs_diff_eq!(p[1], 2.0);
    }

    #[test]
    fn rotate_about_center() {
        let tf = parse_transform("rotate(90 1 1)").unwrap();
        let p = tf.apply([2.0, 1.0]);
        assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn accepts_compact_number_syntax() {
        let err = parse_transform("matrix(1,0,0,1,-5.5)").unwrap_err();
        assert!(matches!(err, TransformError::Arity { .. }));
        let tf = parse_transform("matrix(1 0 0 1 -5.5-3e0)").unwrap();
        assert_abs_diff_eq!(tf.apply([0.0, 0.0])[1], -3.0);
    }

    #[test]
    fn errors_name_the_problem() {
        assert_eq!(
            parse_transform("spin(3)"),
            Err(TransformError::UnknownFunction("spin".into()))
        );
        assert!(matches!(
            parse_transform("translate(1"),
            Err(TransformError::Syntax(_))
        ));
    }

    #[test]
    fn formats_pure_translation_compactly() {
        assert_eq!(format_transform(&Affine::translate(1.5, -2.0)), "translate(1.5 -2)");
        assert_eq!(
            format_transform(&Affine::scale(2.0, 2.0)),
            "matrix(2 0 0 2 0 0)"
        );
    }
}
