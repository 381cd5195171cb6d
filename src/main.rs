use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use giv::raster::open_image;
use giv::render::{ScaleMode, calculate_scale, render};
use giv::viewport::{FixedSize, PanOffset, TerminalSize, ViewportSize, ViewportSizeProvider};

#[derive(Parser)]
#[command(name = "giv", about = "Print images as truecolor half blocks")]
#[command(version)]
struct BatchArgs {
    /// Images to print
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Viewport width in cells (default: terminal width)
    #[arg(long, requires = "rows")]
    cols: Option<u16>,

    /// Viewport height in cells (default: terminal height)
    #[arg(long, requires = "cols")]
    rows: Option<u16>,

    /// Rows left free below the image for the shell prompt
    #[arg(long, default_value_t = 1)]
    reserve_rows: u16,

    /// Sampling mode
    #[arg(long, value_enum, default_value_t = Sampling::Block)]
    scale: Sampling,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sampling {
    /// Integer block size, grid aligned
    Block,
    /// Unrounded scale factor
    Continuous,
}

fn main() -> anyhow::Result<()> {
    let args = match BatchArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(args.verbose);

    let viewport = match (args.cols, args.rows) {
        (Some(cols), Some(rows)) => FixedSize(ViewportSize::new(cols, rows)).viewport_size(),
        _ => TerminalSize {
            reserved_rows: args.reserve_rows,
        }
        .viewport_size(),
    }
    .context("cannot determine viewport size")?;
    debug!(?viewport, "viewport");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in &args.paths {
        match print_file(path, viewport, args.scale) {
            Ok(text) => writeln!(out, "{text}")?,
            Err(err) => writeln!(out, "{}: {err}", path.display())?,
        }
    }
    out.flush()?;

    Ok(())
}

fn print_file(path: &Path, viewport: ViewportSize, sampling: Sampling) -> giv::Result<String> {
    let image = open_image(path)?;
    let mode = match sampling {
        Sampling::Block => ScaleMode::BlockAligned,
        Sampling::Continuous if viewport.is_empty() => ScaleMode::BlockAligned,
        Sampling::Continuous => ScaleMode::Continuous(
            calculate_scale(
                image.height(),
                image.width(),
                viewport.height,
                viewport.width,
            )
            .factor,
        ),
    };
    let frame = render(&image, viewport, mode, PanOffset::ZERO);
    info!(
        path = %path.display(),
        block_size = frame.block_size,
        factor = frame.factor,
        "rendered"
    );
    Ok(frame.text)
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
