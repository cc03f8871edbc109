use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod render;

use error::CliError;

#[derive(Parser)]
#[command(name = "pcbdraw", version, about = "Draw printed circuit boards as SVG or PNG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a board description to an image
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Board description (YAML or JSON)
    #[arg(value_name = "BOARD")]
    pub board: PathBuf,

    /// Output image; the extension picks the format (.svg or .png)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Style theme (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub style: Option<PathBuf>,

    /// Footprint library roots, searched in order
    #[arg(short, long, value_name = "DIR", value_delimiter = ',')]
    pub libs: Vec<PathBuf>,

    /// Draw a marker where a footprint is missing
    #[arg(long)]
    pub placeholders: bool,

    /// Designator to footprint remapping (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub remap: Option<PathBuf>,

    /// Paint drill holes instead of cutting them out
    #[arg(long)]
    pub no_drill_holes: bool,

    #[arg(long, value_name = "SIDE", default_value = "front")]
    pub side: String,

    /// Mirror the board about its vertical axis
    #[arg(short, long)]
    pub mirror: bool,

    /// Designators to highlight
    #[arg(long, value_name = "REFS", value_delimiter = ',')]
    pub highlight: Vec<String>,

    /// Only draw these designators
    #[arg(short, long, value_name = "REFS", value_delimiter = ',')]
    pub filter: Option<Vec<String>>,

    /// Layer holding V-cut lines
    #[arg(long, value_name = "LAYER")]
    pub vcuts: Option<String>,

    /// Resolution of PNG output
    #[arg(long, value_name = "N")]
    pub dpi: Option<u32>,

    /// Free space around the board, in mm
    #[arg(long, value_name = "MM")]
    pub margin: Option<f64>,

    /// Size the canvas to the board extent instead of the drawn content
    #[arg(long)]
    pub no_shrink: bool,

    /// Only report errors
    #[arg(long)]
    pub silent: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub werror: bool,

    /// Resistance overrides, e.g. R1:10k,R2:4k7
    #[arg(long, value_name = "REF:VALUE", value_delimiter = ',')]
    pub resistor_values: Vec<String>,

    /// Designators whose resistor bands are drawn reversed
    #[arg(long, value_name = "REFS", value_delimiter = ',')]
    pub resistor_flip: Vec<String>,

    /// Draw the solder paste layer
    #[arg(long)]
    pub paste: bool,

    /// Draw the bare board only
    #[arg(long)]
    pub no_components: bool,

    /// Stroke width of the board edge, in mm
    #[arg(long, value_name = "MM")]
    pub outline_width: Option<f64>,
}

fn init_logging(silent: bool) -> anyhow::Result<()> {
    let default = if silent { "error" } else { "warn" };
    let filter = if silent {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render(args) => {
            if let Err(err) = init_logging(args.silent) {
                eprintln!("warning: logging unavailable: {err}");
            }
            render::run_render(args)
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(CliError::usage(err.to_string()).exit_code()),
            };
        }
    };
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
