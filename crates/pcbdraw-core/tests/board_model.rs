use pcbdraw_core::{Affine, BoardModel, Layer, PadShape, Shape, Side};
use proptest::prelude::*;

#[test]
fn board_model_deserializes_from_json() {
    let json = r#"{
        "components": [
            {"reference": "R1", "footprint": "Resistors:R_THT", "position": [10, 10],
             "rotation": -90, "side": "front", "value": "10k"},
            {"reference": "C1", "footprint": "Capacitors:C_0805", "position": [20, 5], "side": "back"}
        ],
        "substrate": {
            "layers": {
                "Edge.Cuts": [{"type": "rect", "start": [0, 0], "end": [40, 30], "width": 0.1}],
                "F_SilkS": [{"type": "segment", "start": [1, 1], "end": [5, 1], "width": 0.15}]
            },
            "pads": [{"at": [10, 10], "size": [1.6, 1.6], "shape": "circle",
                      "layers": ["F.Cu", "B.Cu"], "drill": [0.8, 0.8]},
                     {"at": [2, 2], "size": [1, 1], "shape": {"roundrect": {"ratio": 0.25}}}],
            "vias": [{"at": [30, 20], "diameter": 0.6, "drill": 0.3}]
        }
    }"#;

    let board: BoardModel = serde_json::from_str(json).expect("board parses");
    board.validate().expect("unique references");
    assert_eq!(board.components.len(), 2);
    assert_eq!(board.components[0].rotation, 270.0);
    assert_eq!(board.components[1].side, Side::Back);
    assert_eq!(board.components[1].value, "");
    assert_eq!(board.substrate.layer(Layer::FSilkS).len(), 1);
    assert!(matches!(
        board.substrate.layer(Layer::EdgeCuts)[0],
        Shape::Rect { filled: false, .. }
    ));
    assert_eq!(
        board.substrate.pads[1].shape,
        PadShape::RoundRect { ratio: 0.25 }
    );
    assert_eq!(board.substrate.pads[1].layers, vec![Layer::FCu]);
    assert_eq!(board.substrate.holes().len(), 2);
}

#[test]
fn invalid_footprint_id_is_a_parse_error() {
    let json = r#"{"components": [{"reference": "R1", "footprint": "R_THT", "position": [0, 0]}]}"#;
    let err = serde_json::from_str::<BoardModel>(json).unwrap_err();
    assert!(err.to_string().contains("invalid footprint id"));
}

proptest! {
    #[test]
    fn mirror_twice_restores_points(
        axis in -100.0f64..100.0,
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
    ) {
        let tf = Affine::mirror_x(axis) * Affine::mirror_x(axis);
        let p = tf.apply([x, y]);
        prop_assert!((p[0] - x).abs() < 1e-9);
        prop_assert!((p[1] - y).abs() < 1e-9);
    }

    #[test]
    fn normalized_rotation_stays_in_range(deg in -1.0e6f64..1.0e6) {
        let r = pcbdraw_core::normalize_rotation(deg);
        prop_assert!((0.0..360.0).contains(&r));
    }
}
