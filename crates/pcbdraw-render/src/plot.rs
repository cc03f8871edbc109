//! One compositing run from board model to document.

use pcbdraw_core::{BoardModel, Diagnostics};
use pcbdraw_library::Resolver;
use pcbdraw_svg::Document;

use crate::assembler::assemble;
use crate::compositor::Compositor;
use crate::placement::TransformEngine;
use crate::substrate::render_substrate;
use crate::{RemapTable, RenderConfig, RenderError, SelectionPolicy, StyleTheme};

/// Result of a run: the document and every warning raised while building it.
#[derive(Debug, Clone)]
pub struct Plot {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

impl Plot {
    /// Fail when any warning was raised.
    pub fn strict(self) -> Result<Self, RenderError> {
        self.diagnostics.ensure_clean()?;
        Ok(self)
    }
}

/// Inputs of one run. The board and the resolver are borrowed; the resolver's cache
/// should not outlive the run.
#[derive(Debug)]
pub struct Plotter<'a> {
    board: &'a BoardModel,
    resolver: &'a Resolver,
    style: StyleTheme,
    remap: RemapTable,
    selection: SelectionPolicy,
    config: RenderConfig,
}

impl<'a> Plotter<'a> {
    pub fn new(board: &'a BoardModel, resolver: &'a Resolver) -> Self {
        Self {
            board,
            resolver,
            style: StyleTheme::default(),
            remap: RemapTable::default(),
            selection: SelectionPolicy::default(),
            config: RenderConfig::default(),
        }
    }

    pub fn style(mut self, style: StyleTheme) -> Self {
        self.style = style;
        self
    }

    pub fn remap(mut self, remap: RemapTable) -> Self {
        self.remap = remap;
        self
    }

    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn plot(&self) -> Result<Plot, RenderError> {
        self.board.validate()?;
        let config = &self.config;
        let extent = self.board.substrate.extent();
        let engine = TransformEngine::new(&extent, config);
        let substrate = render_substrate(&self.board.substrate, &self.style, &engine, config);

        let mut diagnostics = Diagnostics::new();
        let components = if config.components {
            Compositor {
                resolver: self.resolver,
                remap: &self.remap,
                selection: &self.selection,
                style: &self.style,
                engine: &engine,
                config,
            }
            .composite(&self.board.components, &mut diagnostics)?
        } else {
            Vec::new()
        };
        let placed = components.len();

        let document = assemble(&substrate, components, &engine, &extent, config);
        tracing::info!(
            side = %config.side,
            components = placed,
            warnings = diagnostics.len(),
            width_mm = document.width_mm(),
            height_mm = document.height_mm(),
            "board plotted"
        );
        Ok(Plot {
            document,
            diagnostics,
        })
    }
}
