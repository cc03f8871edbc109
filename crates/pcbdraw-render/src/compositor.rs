//! Per-instance component art: selection, remap, resolution, placement, resistor bands and
//! highlights.

use std::collections::HashSet;

use pcbdraw_core::{Affine, Bounds, ComponentInstance, DiagnosticKind, Diagnostics};
use pcbdraw_library::{band_slot_id, FootprintDrawing, LibraryError, Resolver};
use pcbdraw_svg::{fmt_num, format_transform, Element};

use crate::placement::TransformEngine;
use crate::resistor::ResistorBands;
use crate::{Placeholder, RemapTable, RenderConfig, SelectionPolicy, StyleTheme};

/// Band slots needed before a drawing counts as a through-hole resistor.
const MIN_BAND_SLOTS: usize = 3;

/// One placed component, ready for the component container.
#[derive(Debug, Clone)]
pub struct ComponentFragment {
    pub reference: String,
    /// `component-<ref>` group in board millimetres.
    pub element: Element,
    /// Drawn as a stand-in because no library had the footprint.
    pub placeholder: bool,
    pub highlighted: bool,
}

/// Hands out document ids for designators. Designators that sanitize to the same
/// fragment (`U 3`, `U/3`) get `_2`, `_3`, ... appended in board order.
#[derive(Debug, Default)]
struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    fn claim(&mut self, reference: &str) -> String {
        let base = id_safe(reference);
        let mut id = base.clone();
        let mut n = 2;
        while !self.taken.insert(id.clone()) {
            id = format!("{base}_{n}");
            n += 1;
        }
        id
    }
}

/// `reference` as an XML name fragment.
pub fn id_safe(reference: &str) -> String {
    let mut out: String = reference
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        out.insert(0, '_');
    }
    out
}

pub struct Compositor<'a> {
    pub resolver: &'a Resolver,
    pub remap: &'a RemapTable,
    pub selection: &'a SelectionPolicy,
    pub style: &'a StyleTheme,
    pub engine: &'a TransformEngine,
    pub config: &'a RenderConfig,
}

impl Compositor<'_> {
    /// Fragments in board order. Misses and bad resistor values become diagnostics; only
    /// unusable library content is an error.
    pub fn composite(
        &self,
        instances: &[ComponentInstance],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<ComponentFragment>, LibraryError> {
        let mut fragments = Vec::new();
        let mut ids = IdAllocator::default();
        for instance in instances {
            if !self.selection.includes(&instance.reference) {
                tracing::debug!(reference = %instance.reference, "filtered out");
                continue;
            }
            if !self.engine.accepts(instance) {
                tracing::debug!(reference = %instance.reference, side = %instance.side, "other side");
                continue;
            }
            let id = self.remap.effective(instance, self.engine.side());
            match self.resolver.resolve(&id)? {
                Some(drawing) => {
                    let id = ids.claim(&instance.reference);
                    fragments.push(self.place(instance, &id, &drawing, diagnostics));
                }
                None => {
                    diagnostics.warn(
                        DiagnosticKind::NotFound,
                        Some(&instance.reference),
                        format!("no library provides footprint {id}"),
                    );
                    if let Some(placeholder) = &self.config.placeholders {
                        let id = ids.claim(&instance.reference);
                        fragments.push(self.placeholder(instance, &id, placeholder));
                    }
                }
            }
        }
        Ok(fragments)
    }

    fn place(
        &self,
        instance: &ComponentInstance,
        id: &str,
        drawing: &FootprintDrawing,
        diagnostics: &mut Diagnostics,
    ) -> ComponentFragment {
        let reference = instance.reference.as_str();
        if drawing.origin.is_none() {
            diagnostics.warn(
                DiagnosticKind::MissingOrigin,
                Some(reference),
                format!("footprint {} has no origin anchor, using (0, 0)", drawing.id),
            );
        }
        let prefix = format!("{id}_");
        let mut body = drawing.instantiate(&prefix);
        if drawing.band_slots >= MIN_BAND_SLOTS {
            self.paint_bands(instance, drawing, &prefix, &mut body, diagnostics);
        }

        let placement = self.engine.placement(instance, drawing);
        let highlighted = self.selection.highlights(reference);
        let mut group = component_group(id, &placement);
        let overlay =
            highlighted.then(|| self.highlight(&drawing.view_box, drawing.scale, &prefix));
        self.stack(&mut group, body, overlay);
        tracing::debug!(reference, footprint = %drawing.id, library = %drawing.library, "placed");
        ComponentFragment {
            reference: reference.to_string(),
            element: group,
            placeholder: false,
            highlighted,
        }
    }

    fn paint_bands(
        &self,
        instance: &ComponentInstance,
        drawing: &FootprintDrawing,
        prefix: &str,
        body: &mut Element,
        diagnostics: &mut Diagnostics,
    ) {
        let reference = instance.reference.as_str();
        let Some(value) = self.config.resistor_value(instance) else {
            return;
        };
        let bands = match ResistorBands::from_text(value, &self.style.band_colors) {
            Ok(bands) => bands,
            Err(err) => {
                diagnostics.warn(
                    DiagnosticKind::InvalidValue,
                    Some(reference),
                    format!("cannot color bands for \"{value}\": {err}"),
                );
                return;
            }
        };
        let flip = self.config.resistor_flipped(reference);
        for (k, color) in bands.sequence(drawing.band_slots, flip).iter().enumerate() {
            let slot = format!("{prefix}{}", band_slot_id(k + 1));
            if let Some(el) = body.find_by_id_mut(&slot) {
                el.set_style("fill", &color.to_hex());
                el.set_style("display", "inline");
            }
        }
    }

    fn stack(&self, group: &mut Element, body: Element, overlay: Option<Element>) {
        match overlay {
            Some(rect) if self.style.highlight_on_top => {
                group.push(body);
                group.push(rect);
            }
            Some(rect) => {
                group.push(rect);
                group.push(body);
            }
            None => group.push(body),
        }
    }

    /// Rectangle around `vb`, in drawing units, grown by the padding and shifted by the
    /// offset (both given in millimetres).
    fn highlight(&self, vb: &Bounds, scale: [f64; 2], prefix: &str) -> Element {
        let [sx, sy] = scale;
        let pad = self.style.highlight_padding;
        let offset = self.style.highlight_offset;
        Element::new("rect")
            .with_attr("id", format!("{prefix}highlight"))
            .with_attr("x", fmt_num(vb.min_x + (offset - pad) / sx))
            .with_attr("y", fmt_num(vb.min_y + (offset - pad) / sy))
            .with_attr("width", fmt_num(vb.width() + 2.0 * pad / sx))
            .with_attr("height", fmt_num(vb.height() + 2.0 * pad / sy))
            .with_attr("style", self.style.highlight_style.clone())
    }

    /// A square centred on the instance position, highlighted like any placed part.
    fn placeholder(
        &self,
        instance: &ComponentInstance,
        id: &str,
        placeholder: &Placeholder,
    ) -> ComponentFragment {
        let half = placeholder.size / 2.0;
        let rect = Element::new("rect")
            .with_attr("x", fmt_num(-half))
            .with_attr("y", fmt_num(-half))
            .with_attr("width", fmt_num(placeholder.size))
            .with_attr("height", fmt_num(placeholder.size))
            .with_attr("style", placeholder.style.clone());
        let highlighted = self.selection.highlights(&instance.reference);
        let mut group = component_group(id, &self.engine.frame(instance));
        group.set_attr("class", "placeholder");
        let square = Bounds::new(-half, -half, half, half);
        let overlay =
            highlighted.then(|| self.highlight(&square, [1.0, 1.0], &format!("{id}_")));
        self.stack(&mut group, rect, overlay);
        ComponentFragment {
            reference: instance.reference.clone(),
            element: group,
            placeholder: true,
            highlighted,
        }
    }
}

fn component_group(id: &str, transform: &Affine) -> Element {
    let mut group = Element::new("g").with_attr("id", format!("component-{id}"));
    if !transform.is_identity() {
        group.set_attr("transform", format_transform(transform));
    }
    group
}
