//! SVG path data: parsing to absolute segments, writing, arc conversion and flattening.

use std::f64::consts::PI;
use std::fmt;

use cavalier_contours::polyline::{seg_arc_radius_and_center, PlineSource, PlineVertex, Polyline};
use pcbdraw_core::Affine;

use crate::fmt_num;
use crate::units::split_number;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("unexpected character '{ch}' at offset {pos} in path data")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("expected a number at offset {pos} in path data")]
    ExpectedNumber { pos: usize },
    #[error("path data must start with a moveto")]
    MissingMoveTo,
}

/// One absolute path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo([f64; 2]),
    LineTo([f64; 2]),
    CubicTo([f64; 2], [f64; 2], [f64; 2]),
    QuadTo([f64; 2], [f64; 2]),
    ArcTo {
        radii: [f64; 2],
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: [f64; 2],
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub segments: Vec<Segment>,
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_separators(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len()
            && (bytes[self.pos].is_ascii_whitespace() || bytes[self.pos] == b',')
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_separators();
        self.text.as_bytes().get(self.pos).copied()
    }

    fn at_number(&mut self) -> bool {
        matches!(self.peek(), Some(b'0'..=b'9' | b'.' | b'-' | b'+'))
    }

    fn number(&mut self) -> Result<f64, PathError> {
        self.skip_separators();
        let rest = &self.text[self.pos..];
        let (value, tail) =
            split_number(rest).ok_or(PathError::ExpectedNumber { pos: self.pos })?;
        self.pos += rest.len() - tail.len();
        Ok(value)
    }

    fn point(&mut self) -> Result<[f64; 2], PathError> {
        Ok([self.number()?, self.number()?])
    }

    /// Arc flags may be packed without separators (`a1 1 0 00 1 1`).
    fn flag(&mut self) -> Result<bool, PathError> {
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(PathError::ExpectedNumber { pos: self.pos }),
        }
    }
}

fn add(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

fn reflect(control: [f64; 2], about: [f64; 2]) -> [f64; 2] {
    [2.0 * about[0] - control[0], 2.0 * about[1] - control[1]]
}

impl PathData {
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let mut cur = Cursor { text, pos: 0 };
        let mut segments = Vec::new();
        let mut current = [0.0, 0.0];
        let mut subpath_start = [0.0, 0.0];
        let mut last_cubic: Option<[f64; 2]> = None;
        let mut last_quad: Option<[f64; 2]> = None;

        while let Some(byte) = cur.peek() {
            if !byte.is_ascii_alphabetic() {
                return Err(PathError::UnexpectedChar {
                    ch: text[cur.pos..].chars().next().unwrap_or('?'),
                    pos: cur.pos,
                });
            }
            cur.pos += 1;
            let relative = byte.is_ascii_lowercase();
            let cmd = byte.to_ascii_uppercase();
            if segments.is_empty() && cmd != b'M' {
                return Err(PathError::MissingMoveTo);
            }
            let origin = |current: [f64; 2]| if relative { current } else { [0.0, 0.0] };

            let mut first = true;
            loop {
                if !first && (cmd == b'Z' || !cur.at_number()) {
                    break;
                }
                let mut cubic_ctrl = None;
                let mut quad_ctrl = None;
                match cmd {
                    b'M' => {
                        let p = add(origin(current), cur.point()?);
                        segments.push(if first {
                            subpath_start = p;
                            Segment::MoveTo(p)
                        } else {
                            Segment::LineTo(p)
                        });
                        current = p;
                    }
                    b'L' => {
                        current = add(origin(current), cur.point()?);
                        segments.push(Segment::LineTo(current));
                    }
                    b'H' => {
                        let x = cur.number()?;
                        current = [if relative { current[0] + x } else { x }, current[1]];
                        segments.push(Segment::LineTo(current));
                    }
                    b'V' => {
                        let y = cur.number()?;
                        current = [current[0], if relative { current[1] + y } else { y }];
                        segments.push(Segment::LineTo(current));
                    }
                    b'C' => {
                        let o = origin(current);
                        let c1 = add(o, cur.point()?);
                        let c2 = add(o, cur.point()?);
                        let p = add(o, cur.point()?);
                        segments.push(Segment::CubicTo(c1, c2, p));
                        cubic_ctrl = Some(c2);
                        current = p;
                    }
                    b'S' => {
                        let o = origin(current);
                        let c1 = last_cubic.map_or(current, |c| reflect(c, current));
                        let c2 = add(o, cur.point()?);
                        let p = add(o, cur.point()?);
                        segments.push(Segment::CubicTo(c1, c2, p));
                        cubic_ctrl = Some(c2);
                        current = p;
                    }
                    b'Q' => {
                        let o = origin(current);
                        let c = add(o, cur.point()?);
                        let p = add(o, cur.point()?);
                        segments.push(Segment::QuadTo(c, p));
                        quad_ctrl = Some(c);
                        current = p;
                    }
                    b'T' => {
                        let c = last_quad.map_or(current, |c| reflect(c, current));
                        let p = add(origin(current), cur.point()?);
                        segments.push(Segment::QuadTo(c, p));
                        quad_ctrl = Some(c);
                        current = p;
                    }
                    b'A' => {
                        let radii = [cur.number()?.abs(), cur.number()?.abs()];
                        let x_rotation = cur.number()?;
                        let large_arc = cur.flag()?;
                        let sweep = cur.flag()?;
                        let to = add(origin(current), cur.point()?);
                        segments.push(Segment::ArcTo {
                            radii,
                            x_rotation,
                            large_arc,
                            sweep,
                            to,
                        });
                        current = to;
                    }
                    b'Z' => {
                        segments.push(Segment::Close);
                        current = subpath_start;
                    }
                    _ => {
                        return Err(PathError::UnexpectedChar {
                            ch: byte as char,
                            pos: cur.pos - 1,
                        })
                    }
                }
                last_cubic = cubic_ctrl;
                last_quad = quad_ctrl;
                first = false;
            }
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of a cavalier polyline. Bulges become elliptical arcs; a positive bulge turns
    /// with increasing angle, which is SVG's `sweep-flag = 1`.
    pub fn from_polyline(pl: &Polyline<f64>) -> Self {
        let n = pl.vertex_count();
        let mut segments = Vec::with_capacity(n + 2);
        if n == 0 {
            return Self { segments };
        }
        let v0 = pl.at(0);
        segments.push(Segment::MoveTo([v0.x, v0.y]));
        for i in 0..n {
            let next = if i + 1 < n {
                i + 1
            } else if pl.is_closed() {
                0
            } else {
                break;
            };
            let v1 = pl.at(i);
            let v2 = pl.at(next);
            if v1.bulge.abs() < 1e-9 {
                segments.push(Segment::LineTo([v2.x, v2.y]));
                continue;
            }
            let (radius, _) = seg_arc_radius_and_center(
                PlineVertex::new(v1.x, v1.y, v1.bulge),
                PlineVertex::new(v2.x, v2.y, 0.0),
            );
            let r = radius.abs();
            segments.push(Segment::ArcTo {
                radii: [r, r],
                x_rotation: 0.0,
                large_arc: v1.bulge.abs() > 1.0,
                sweep: v1.bulge > 0.0,
                to: [v2.x, v2.y],
            });
        }
        if pl.is_closed() {
            segments.push(Segment::Close);
        }
        Self { segments }
    }

    /// Same path with every arc replaced by cubic Béziers.
    #[must_use]
    pub fn to_curves(&self) -> PathData {
        let mut out = Vec::with_capacity(self.segments.len());
        let mut current = [0.0, 0.0];
        let mut start = [0.0, 0.0];
        for seg in &self.segments {
            match *seg {
                Segment::MoveTo(p) => {
                    start = p;
                    current = p;
                    out.push(*seg);
                }
                Segment::LineTo(p) | Segment::CubicTo(_, _, p) | Segment::QuadTo(_, p) => {
                    current = p;
                    out.push(*seg);
                }
                Segment::ArcTo {
                    radii,
                    x_rotation,
                    large_arc,
                    sweep,
                    to,
                } => {
                    for (c1, c2, p) in arc_to_cubics(current, radii, x_rotation, large_arc, sweep, to)
                    {
                        out.push(Segment::CubicTo(c1, c2, p));
                    }
                    current = to;
                }
                Segment::Close => {
                    current = start;
                    out.push(*seg);
                }
            }
        }
        PathData { segments: out }
    }

    /// Polylines approximating each subpath after applying `tf`. Curves are sampled
    /// uniformly; control points transform exactly under an affine map.
    pub fn flatten(&self, tf: &Affine) -> Vec<Vec<[f64; 2]>> {
        const STEPS: usize = 16;
        let mut out: Vec<Vec<[f64; 2]>> = Vec::new();
        let mut current = [0.0, 0.0];
        let mut start = [0.0, 0.0];
        for seg in self.to_curves().segments {
            match seg {
                Segment::MoveTo(p) => {
                    let p = tf.apply(p);
                    out.push(vec![p]);
                    current = p;
                    start = p;
                }
                Segment::LineTo(p) => {
                    current = tf.apply(p);
                    push_point(&mut out, current);
                }
                Segment::CubicTo(c1, c2, p) => {
                    let (c1, c2, p) = (tf.apply(c1), tf.apply(c2), tf.apply(p));
                    let p0 = current;
                    for i in 1..=STEPS {
                        let t = i as f64 / STEPS as f64;
                        let u = 1.0 - t;
                        let w = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
                        push_point(
                            &mut out,
                            [
                                w[0] * p0[0] + w[1] * c1[0] + w[2] * c2[0] + w[3] * p[0],
                                w[0] * p0[1] + w[1] * c1[1] + w[2] * c2[1] + w[3] * p[1],
                            ],
                        );
                    }
                    current = p;
                }
                Segment::QuadTo(c, p) => {
                    let (c, p) = (tf.apply(c), tf.apply(p));
                    let p0 = current;
                    for i in 1..=STEPS {
                        let t = i as f64 / STEPS as f64;
                        let u = 1.0 - t;
                        let w = [u * u, 2.0 * u * t, t * t];
                        push_point(
                            &mut out,
                            [
                                w[0] * p0[0] + w[1] * c[0] + w[2] * p[0],
                                w[0] * p0[1] + w[1] * c[1] + w[2] * p[1],
                            ],
                        );
                    }
                    current = p;
                }
                Segment::Close => {
                    push_point(&mut out, start);
                    current = start;
                }
                Segment::ArcTo { .. } => {}
            }
        }
        out
    }
}

fn push_point(out: &mut Vec<Vec<[f64; 2]>>, p: [f64; 2]) {
    match out.last_mut() {
        Some(sub) => sub.push(p),
        None => out.push(vec![p]),
    }
}

/// Endpoint-parameterized elliptical arc to cubic Béziers, at most a quarter turn each.
pub fn arc_to_cubics(
    from: [f64; 2],
    radii: [f64; 2],
    x_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: [f64; 2],
) -> Vec<([f64; 2], [f64; 2], [f64; 2])> {
    if (from[0] - to[0]).abs() < 1e-12 && (from[1] - to[1]).abs() < 1e-12 {
        return Vec::new();
    }
    let (mut rx, mut ry) = (radii[0].abs(), radii[1].abs());
    if rx < 1e-12 || ry < 1e-12 {
        return vec![(from, to, to)];
    }

    let (sin_phi, cos_phi) = x_rotation.to_radians().sin_cos();
    let dx = (from[0] - to[0]) / 2.0;
    let dy = (from[1] - to[1]) / 2.0;
    let x1p = cos_phi * dx + sin_phi * dy;
    let y1p = -sin_phi * dx + cos_phi * dy;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let cx = cos_phi * cxp - sin_phi * cyp + (from[0] + to[0]) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from[1] + to[1]) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| {
        let dot = ux * vx + uy * vy;
        let len = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
        let a = (dot / len).clamp(-1.0, 1.0).acos();
        if ux * vy - uy * vx < 0.0 {
            -a
        } else {
            a
        }
    };
    let theta1 = angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && delta > 0.0 {
        delta -= 2.0 * PI;
    } else if sweep && delta < 0.0 {
        delta += 2.0 * PI;
    }

    let pieces = (delta.abs() / (PI / 2.0)).ceil().max(1.0) as usize;
    let step = delta / pieces as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    let point = |t: f64| {
        let (s, c) = t.sin_cos();
        [
            cx + rx * c * cos_phi - ry * s * sin_phi,
            cy + rx * c * sin_phi + ry * s * cos_phi,
        ]
    };
    let deriv = |t: f64| {
        let (s, c) = t.sin_cos();
        [
            -rx * s * cos_phi - ry * c * sin_phi,
            -rx * s * sin_phi + ry * c * cos_phi,
        ]
    };

    let mut out = Vec::with_capacity(pieces);
    let mut t0 = theta1;
    for i in 0..pieces {
        let t1 = t0 + step;
        let p0 = point(t0);
        let p1 = if i + 1 == pieces { to } else { point(t1) };
        let d0 = deriv(t0);
        let d1 = deriv(t1);
        out.push((
            [p0[0] + k * d0[0], p0[1] + k * d0[1]],
            [p1[0] - k * d1[0], p1[1] - k * d1[1]],
            p1,
        ));
        t0 = t1;
    }
    out
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pt = |p: [f64; 2]| format!("{} {}", fmt_num(p[0]), fmt_num(p[1]));
        let mut first = true;
        for seg in &self.segments {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match *seg {
                Segment::MoveTo(p) => write!(f, "M {}", pt(p))?,
                Segment::LineTo(p) => write!(f, "L {}", pt(p))?,
                Segment::CubicTo(c1, c2, p) => write!(f, "C {} {} {}", pt(c1), pt(c2), pt(p))?,
                Segment::QuadTo(c, p) => write!(f, "Q {} {}", pt(c), pt(p))?,
                Segment::ArcTo {
                    radii,
                    x_rotation,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    f,
                    "A {} {} {} {} {}",
                    pt(radii),
                    fmt_num(x_rotation),
                    u8::from(large_arc),
                    u8::from(sweep),
                    pt(to)
                )?,
                Segment::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}
