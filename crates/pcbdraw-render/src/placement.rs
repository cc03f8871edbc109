//! Placement of component drawings on the board and of the board in the document.

use pcbdraw_core::{Affine, Bounds, ComponentInstance, Side};
use pcbdraw_library::FootprintDrawing;

use crate::RenderConfig;

/// Board-level transform state for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformEngine {
    side: Side,
    board: Affine,
}

impl TransformEngine {
    /// `extent` is the full substrate extent; the mirror axis runs through its centre.
    /// The back is seen from below, so it comes out flipped unless `mirror` flips it back.
    pub fn new(extent: &Bounds, config: &RenderConfig) -> Self {
        let flip = (config.side == Side::Back) != config.mirror;
        let board = if flip {
            let axis = if extent.is_empty() { 0.0 } else { extent.center()[0] };
            Affine::mirror_x(axis)
        } else {
            Affine::IDENTITY
        };
        Self {
            side: config.side,
            board,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Applied last, to substrate and components alike.
    pub fn board(&self) -> Affine {
        self.board
    }

    /// Instances on the other side are never drawn.
    pub fn accepts(&self, instance: &ComponentInstance) -> bool {
        instance.side == self.side
    }

    /// Board frame of the instance: its position, then its rotation.
    pub fn frame(&self, instance: &ComponentInstance) -> Affine {
        Affine::translate(instance.position[0], instance.position[1])
            * Affine::rotate(instance.rotation)
    }

    /// Drawing units to board millimetres, the drawing's origin anchor landing on the
    /// instance position.
    pub fn placement(&self, instance: &ComponentInstance, drawing: &FootprintDrawing) -> Affine {
        let [ox, oy] = drawing.origin_or_zero();
        self.frame(instance)
            * Affine::scale(drawing.scale[0], drawing.scale[1])
            * Affine::translate(-ox, -oy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcbdraw_core::FootprintId;
    use proptest::prelude::*;

    fn drawing() -> FootprintDrawing {
        let svg = r#"<svg width="10mm" height="2mm" viewBox="0 0 100 20"><circle id="origin" cx="50" cy="10" r="1"/><rect width="100" height="20"/></svg>"#;
        FootprintDrawing::from_svg(FootprintId::new("L", "M"), "lib", svg).unwrap()
    }

    fn instance(pos: [f64; 2], rot: f64) -> ComponentInstance {
        ComponentInstance::new("U1", FootprintId::new("L", "M"), pos, rot, Side::Front)
    }

    #[test]
    fn origin_lands_on_position() {
        let engine = TransformEngine::new(&Bounds::empty(), &RenderConfig::default());
        for rot in [0.0, 90.0, 213.0] {
            let tf = engine.placement(&instance([10.0, 10.0], rot), &drawing());
            let p = tf.apply([50.0, 10.0]);
            assert_abs_diff_eq!(p[0], 10.0, epsilon = 1e-9);
            assert_abs_diff_eq!(p[1], 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotation_is_clockwise_on_screen() {
        let engine = TransformEngine::new(&Bounds::empty(), &RenderConfig::default());
        let tf = engine.placement(&instance([0.0, 0.0], 90.0), &drawing());
        // 5 mm to the right of the anchor ends up 5 mm below it.
        let p = tf.apply([100.0, 10.0]);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn side_filter_is_a_selection() {
        let cfg = RenderConfig {
            side: Side::Back,
            ..RenderConfig::default()
        };
        let engine = TransformEngine::new(&Bounds::empty(), &cfg);
        assert!(!engine.accepts(&instance([0.0, 0.0], 0.0)));
        let mut back = instance([0.0, 0.0], 0.0);
        back.side = Side::Back;
        assert!(engine.accepts(&back));
    }

    #[test]
    fn mirror_axis_is_the_extent_centre() {
        let cfg = RenderConfig {
            mirror: true,
            ..RenderConfig::default()
        };
        let engine = TransformEngine::new(&Bounds::new(0.0, 0.0, 40.0, 20.0), &cfg);
        assert_eq!(engine.board().apply([0.0, 3.0]), [40.0, 3.0]);
        assert!(engine.board().is_mirroring());
    }

    #[test]
    fn back_side_is_viewed_flipped() {
        let extent = Bounds::new(0.0, 0.0, 40.0, 20.0);
        let back = RenderConfig {
            side: Side::Back,
            ..RenderConfig::default()
        };
        let engine = TransformEngine::new(&extent, &back);
        assert!(engine.board().is_mirroring());
        assert_eq!(engine.board().apply([10.0, 5.0]), [30.0, 5.0]);

        let unflipped = RenderConfig {
            mirror: true,
            ..back
        };
        assert!(TransformEngine::new(&extent, &unflipped).board().is_identity());
    }

    proptest! {
        #[test]
        fn mirror_twice_restores_positions(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            rot in 0.0f64..360.0,
            min_x in -100.0f64..0.0,
            w in 1.0f64..300.0,
        ) {
            let cfg = RenderConfig { mirror: true, ..RenderConfig::default() };
            let engine = TransformEngine::new(&Bounds::new(min_x, 0.0, min_x + w, 10.0), &cfg);
            let placed = engine.placement(&instance([x, y], rot), &drawing());
            let twice = engine.board() * engine.board() * placed;
            prop_assert!(twice.approx_eq(&placed, 1e-9));
            let p = twice.apply([50.0, 10.0]);
            prop_assert!((p[0] - x).abs() < 1e-9 && (p[1] - y).abs() < 1e-9);
        }
    }
}
