//! Stacks substrate and component fragments into the final document.

use pcbdraw_core::Bounds;
use pcbdraw_svg::{document_bounds, format_transform, Document, Element};

use crate::compositor::ComponentFragment;
use crate::placement::TransformEngine;
use crate::substrate::{Substrate, Tier, CUT_OFF_ID, HOLE_MASK_ID};
use crate::RenderConfig;

pub const BOARD_CONTAINER_ID: &str = "boardContainer";
pub const COMPONENT_CONTAINER_ID: &str = "componentContainer";
pub const BOARD_TOP_CONTAINER_ID: &str = "boardTopContainer";

fn container(id: &str, engine: &TransformEngine) -> Element {
    let mut g = Element::new("g").with_attr("id", id);
    let board = engine.board();
    if !board.is_identity() {
        g.set_attr("transform", format_transform(&board));
    }
    g
}

fn substrate_container(id: &str, substrate: &Substrate, tier: Tier, engine: &TransformEngine) -> Element {
    let mut g = container(id, engine);
    if substrate.clipped {
        g.set_attr("clip-path", format!("url(#{CUT_OFF_ID})"));
    }
    if substrate.hole_mask {
        g.set_attr("mask", format!("url(#{HOLE_MASK_ID})"));
    }
    for fragment in substrate.tier(tier) {
        g.push(fragment.element.clone());
    }
    g
}

/// Merge everything into one document: substrate bottom tier, components in board order,
/// substrate top tier. Bounds are the substrate extent or, with `shrink`, whatever was
/// drawn; either way grown by the margin.
pub fn assemble(
    substrate: &Substrate,
    components: Vec<ComponentFragment>,
    engine: &TransformEngine,
    extent: &Bounds,
    config: &RenderConfig,
) -> Document {
    let mut doc = Document::new(Bounds::empty());
    doc.defs = substrate.defs.clone();

    let board = substrate_container(BOARD_CONTAINER_ID, substrate, Tier::Bottom, engine);
    let mut parts = container(COMPONENT_CONTAINER_ID, engine);
    for fragment in components {
        parts.push(fragment.element);
    }
    let top = substrate_container(BOARD_TOP_CONTAINER_ID, substrate, Tier::Top, engine);
    doc.body = vec![board, parts, top];
    doc.prune_empty_groups();

    let drawn = if config.shrink {
        document_bounds(&doc)
    } else {
        Bounds::empty()
    };
    let bounds = if drawn.is_empty() {
        extent.transformed(&engine.board())
    } else {
        drawn
    };
    doc.view_box = if bounds.is_empty() {
        Bounds::new(0.0, 0.0, 0.0, 0.0).expand(config.margin)
    } else {
        bounds.expand(config.margin)
    };
    tracing::debug!(
        width = doc.width_mm(),
        height = doc.height_mm(),
        shrink = config.shrink,
        "document bounds fixed"
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcbdraw_core::{Layer, Shape, SubstrateGeometry};

    use crate::substrate::render_substrate;
    use crate::StyleTheme;

    fn geometry() -> SubstrateGeometry {
        let mut g = SubstrateGeometry::default();
        g.push(
            Layer::EdgeCuts,
            Shape::Rect {
                start: [0.0, 0.0],
                end: [40.0, 20.0],
                width: 0.1,
                filled: false,
            },
        );
        g.push(
            Layer::FSilkS,
            Shape::Segment {
                start: [5.0, 5.0],
                end: [10.0, 5.0],
                width: 0.2,
            },
        );
        g
    }

    fn run(config: &RenderConfig) -> Document {
        let g = geometry();
        let extent = g.extent();
        let engine = TransformEngine::new(&extent, config);
        let substrate = render_substrate(&g, &StyleTheme::default(), &engine, config);
        assemble(&substrate, Vec::new(), &engine, &extent, config)
    }

    #[test]
    fn containers_stack_in_order_and_empty_ones_go() {
        let doc = run(&RenderConfig::default());
        let ids: Vec<_> = doc.body.iter().filter_map(Element::id).collect();
        assert_eq!(ids, [BOARD_CONTAINER_ID, BOARD_TOP_CONTAINER_ID]);
        assert_eq!(doc.body[0].attr("clip-path"), Some("url(#cut-off)"));
        assert!(doc.find_by_id("substrate-copper").is_none());
        assert!(doc.find_by_id("substrate-silk").is_some());
    }

    #[test]
    fn extent_bounds_plus_margin() {
        let doc = run(&RenderConfig {
            shrink: false,
            margin: 2.0,
            ..RenderConfig::default()
        });
        assert_abs_diff_eq!(doc.view_box.min_x, -2.05, epsilon = 1e-9);
        assert_abs_diff_eq!(doc.width_mm(), 44.1, epsilon = 1e-9);
    }

    #[test]
    fn mirror_is_set_on_every_container() {
        let doc = run(&RenderConfig {
            mirror: true,
            ..RenderConfig::default()
        });
        for container in &doc.body {
            assert_eq!(container.attr("transform"), Some("matrix(-1 0 0 1 40 0)"));
        }
        let shrunk = run(&RenderConfig::default());
        assert_abs_diff_eq!(doc.width_mm(), shrunk.width_mm(), epsilon = 1e-6);
        assert_abs_diff_eq!(doc.view_box.min_x, shrunk.view_box.min_x, epsilon = 1e-6);
    }
}
