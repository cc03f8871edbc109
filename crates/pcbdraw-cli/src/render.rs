use std::path::Path;
use std::str::FromStr;

use pcbdraw_core::{BoardModel, Layer, Side};
use pcbdraw_library::Resolver;
use pcbdraw_raster::{Rasterizer, SkiaRasterizer};
use pcbdraw_render::{
    Placeholder, Plotter, RemapTable, RenderConfig, ResistorOverride, SelectionPolicy,
    StyleTheme,
};
use serde::de::DeserializeOwned;

use crate::error::CliError;
use crate::RenderArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Result<Self, CliError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png") => Ok(Self::Png),
            _ => Err(CliError::usage(format!(
                "cannot tell the output format of {}; use .svg or .png",
                path.display()
            ))),
        }
    }
}

pub fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let format = OutputFormat::from_path(&args.output)?;
    let config = render_config(&args)?;
    let selection = selection(&args);

    let board: BoardModel = read_structured(&args.board, "board")?;
    let style = match &args.style {
        Some(path) => {
            let text = read_text(path, "style")?;
            StyleTheme::from_json(&text)?
        }
        None => StyleTheme::default(),
    };
    let remap: RemapTable = match &args.remap {
        Some(path) => read_structured(path, "remap")?,
        None => RemapTable::new(),
    };
    let resolver = Resolver::from_dirs(&args.libs)?;
    tracing::debug!(
        libraries = ?resolver.library_names().collect::<Vec<_>>(),
        components = board.components.len(),
        "inputs loaded"
    );

    let mut plot = Plotter::new(&board, &resolver)
        .style(style)
        .remap(remap)
        .selection(selection)
        .config(config.clone())
        .plot()?;
    if args.werror {
        plot = plot.strict()?;
    }

    let bytes = match format {
        OutputFormat::Svg => plot.document.to_svg_string().into_bytes(),
        OutputFormat::Png => SkiaRasterizer.rasterize(&plot.document, config.dpi)?,
    };
    write_output(&args.output, &bytes)?;
    tracing::info!(
        output = %args.output.display(),
        warnings = plot.diagnostics.len(),
        bytes = bytes.len(),
        "output written"
    );
    Ok(())
}

fn render_config(args: &RenderArgs) -> Result<RenderConfig, CliError> {
    let defaults = RenderConfig::default();
    let side = Side::from_str(args.side.trim()).map_err(|e| CliError::usage(e.to_string()))?;
    let vcuts = args
        .vcuts
        .as_deref()
        .map(|l| Layer::from_str(l.trim()))
        .transpose()
        .map_err(|e| CliError::usage(e.to_string()))?;
    if args.dpi == Some(0) {
        return Err(CliError::usage("--dpi must be positive"));
    }
    for (flag, value) in [("--margin", args.margin), ("--outline-width", args.outline_width)] {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(CliError::usage(format!("{flag} must be a non-negative number")));
        }
    }

    Ok(RenderConfig {
        side,
        mirror: args.mirror,
        drill_holes: !args.no_drill_holes,
        vcuts,
        paste: args.paste,
        components: !args.no_components,
        placeholders: args.placeholders.then(Placeholder::default),
        outline_width: args.outline_width.unwrap_or(defaults.outline_width),
        margin: args.margin.unwrap_or(defaults.margin),
        shrink: !args.no_shrink,
        dpi: args.dpi.unwrap_or(defaults.dpi),
        resistors: resistor_overrides(&args.resistor_values, &args.resistor_flip)?,
    })
}

fn resistor_overrides(
    values: &[String],
    flips: &[String],
) -> Result<indexmap::IndexMap<String, ResistorOverride>, CliError> {
    let mut out: indexmap::IndexMap<String, ResistorOverride> = indexmap::IndexMap::new();
    for entry in values.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let (reference, value) = entry
            .split_once(':')
            .map(|(r, v)| (r.trim(), v.trim()))
            .filter(|(r, v)| !r.is_empty() && !v.is_empty())
            .ok_or_else(|| {
                CliError::usage(format!("resistor value `{entry}` is not REF:VALUE"))
            })?;
        out.entry(reference.to_string()).or_default().value = Some(value.to_string());
    }
    for reference in trimmed(flips) {
        out.entry(reference).or_default().flip = true;
    }
    Ok(out)
}

fn selection(args: &RenderArgs) -> SelectionPolicy {
    let mut policy = SelectionPolicy::all().with_highlight(trimmed(&args.highlight));
    if let Some(filter) = &args.filter {
        policy = policy.with_filter(trimmed(filter));
    }
    policy
}

fn trimmed(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_text(path: &Path, what: &'static str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// YAML or JSON; `serde_yaml` accepts both.
fn read_structured<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T, CliError> {
    let text = read_text(path, what)?;
    serde_yaml::from_str(&text).map_err(|source| CliError::Parse {
        what,
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let failed = |source: std::io::Error| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(failed)?;
    }
    std::fs::write(path, bytes).map_err(failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/board.SVG")).unwrap(),
            OutputFormat::Svg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("board.png")).unwrap(),
            OutputFormat::Png
        );
        let err = OutputFormat::from_path(Path::new("board.jpg")).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn resistor_flags_merge_per_designator() {
        let values = vec![" R1:10k ".to_string(), "R2: 4k7".to_string()];
        let flips = vec!["R1".to_string(), " R3".to_string(), String::new()];
        let table = resistor_overrides(&values, &flips).unwrap();
        assert_eq!(table["R1"].value.as_deref(), Some("10k"));
        assert!(table["R1"].flip);
        assert_eq!(table["R2"].value.as_deref(), Some("4k7"));
        assert!(!table["R2"].flip);
        assert_eq!(table["R3"].value, None);
        assert!(table["R3"].flip);
    }

    #[test]
    fn malformed_resistor_value_is_a_usage_error() {
        let err = resistor_overrides(&["R1".to_string()], &[]).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }
}
