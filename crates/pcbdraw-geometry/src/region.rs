use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, Polyline,
};
use pcbdraw_core::Bounds;

use crate::polyline_bounds;

/// Filled area: counter-clockwise outer boundaries (`pos`) and clockwise holes (`neg`).
/// Render with the even-odd fill rule.
#[derive(Debug, Clone, Default)]
pub struct Region {
    pub pos: Vec<Polyline<f64>>,
    pub neg: Vec<Polyline<f64>>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Merge overlapping polylines; holes produced by the merge are kept.
    pub fn union_all(plines: Vec<Polyline<f64>>) -> Self {
        let (pos, neg) = merge_pairwise(prepare(plines), true);
        let (neg, _) = merge_pairwise(neg, false);
        Self {
            pos: with_winding(pos, PlineOrientation::CounterClockwise),
            neg: with_winding(neg, PlineOrientation::Clockwise),
        }
    }

    /// Cut every polyline of `cutters` out of the region.
    pub fn subtract_all(&mut self, cutters: &[Polyline<f64>]) {
        let mut new_pos: Vec<Polyline<f64>> = Vec::new();
        let mut new_neg: Vec<Polyline<f64>> = Vec::new();

        for outer in std::mem::take(&mut self.pos) {
            let mut cur_pos = vec![outer];
            for cutter in cutters {
                let mut next_pos = Vec::with_capacity(cur_pos.len());
                for p in cur_pos {
                    let res = p.boolean(cutter, BooleanOp::Not);
                    if matches!(res.result_info, BooleanResultInfo::InvalidInput) {
                        tracing::debug!("skipping degenerate cutter");
                        next_pos.push(p);
                        continue;
                    }
                    next_pos.extend(res.pos_plines.into_iter().map(|r| r.pline));
                    new_neg.extend(res.neg_plines.into_iter().map(|r| r.pline));
                }
                cur_pos = next_pos;
            }
            new_pos.extend(cur_pos);
        }

        let (pos, _) = merge_pairwise(prepare(new_pos), false);
        let (neg, _) = merge_pairwise(prepare(new_neg), false);
        self.pos = with_winding(pos, PlineOrientation::CounterClockwise);
        self.neg
            .extend(with_winding(neg, PlineOrientation::Clockwise));
    }

    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::empty();
        for pl in &self.pos {
            b.include(&polyline_bounds(pl));
        }
        b
    }

    /// Outer boundaries followed by holes.
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline<f64>> {
        self.pos.iter().chain(self.neg.iter())
    }
}

fn prepare(mut plines: Vec<Polyline<f64>>) -> Vec<Polyline<f64>> {
    plines.retain(|p| p.is_closed() && p.vertex_count() >= 2);
    plines.into_iter().map(simplify).collect()
}

/// Pairwise union until no two polylines overlap. Board-sized inputs are small, O(n^2) is fine.
fn merge_pairwise(
    mut plines: Vec<Polyline<f64>>,
    keep_holes: bool,
) -> (Vec<Polyline<f64>>, Vec<Polyline<f64>>) {
    let mut holes: Vec<Polyline<f64>> = Vec::new();

    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        for j in (i + 1)..plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            if matches!(
                res.result_info,
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput
            ) {
                continue;
            }
            let mut next: Vec<Polyline<f64>> =
                res.pos_plines.into_iter().map(|p| simplify(p.pline)).collect();
            if keep_holes {
                holes.extend(res.neg_plines.into_iter().map(|p| simplify(p.pline)));
            }
            plines.swap_remove(j);
            plines.swap_remove(i);
            plines.append(&mut next);
            merged = true;
            break;
        }
        i = if merged { 0 } else { i + 1 };
    }

    (plines, holes)
}

fn with_winding(plines: Vec<Polyline<f64>>, desired: PlineOrientation) -> Vec<Polyline<f64>> {
    plines
        .into_iter()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

fn simplify(p: Polyline<f64>) -> Polyline<f64> {
    p.remove_redundant(1e-6).unwrap_or(p)
}
