use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wavediff_core::{
    DecoderService, DisplaySurface, FileLibrary, Pipeline, RenderConfig, RenderRequest, Selection,
    SvgRenderer, WaveDiffError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> wavediff_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let pipeline = Pipeline::new(DecoderService::wav(), config)?;

    match cli.command {
        Commands::Waveform { input, output } => run_waveform(&pipeline, &input, &output).await,
        Commands::Compare {
            first,
            second,
            out_dir,
        } => run_compare(&pipeline, &first, &second, &out_dir).await,
    }
}

async fn run_waveform(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
) -> wavediff_core::Result<()> {
    tracing::info!(?input, ?output, "rendering waveform");

    let mut library = FileLibrary::new();
    let id = library.add_path(input)?;
    let mut selection = Selection::new();
    selection.toggle(id);

    let mut failed = 0;
    for request in selection.waveform_requests(&library, &pipeline.config().colors) {
        failed += render_to_file(pipeline, &request, output).await?;
    }
    finish(failed)
}

async fn run_compare(
    pipeline: &Pipeline,
    first: &Path,
    second: &Path,
    out_dir: &Path,
) -> wavediff_core::Result<()> {
    tracing::info!(?first, ?second, ?out_dir, "rendering comparison");
    std::fs::create_dir_all(out_dir)?;

    let mut library = FileLibrary::new();
    let mut selection = Selection::new();
    for path in [first, second] {
        let id = library.add_path(path)?;
        selection.toggle(id);
    }

    let mut failed = 0;
    let waveforms = selection.waveform_requests(&library, &pipeline.config().colors);
    for (slot, request) in waveforms.iter().enumerate() {
        let output = out_dir.join(format!("waveform-{}.svg", slot + 1));
        failed += render_to_file(pipeline, request, &output).await?;
    }

    if let Some(request) = selection.difference_request(&library) {
        failed += render_to_file(pipeline, &request, &out_dir.join("difference.svg")).await?;
    }

    finish(failed)
}

/// Drives one surface and writes whatever it ended up showing. Returns the
/// number of failed renders (0 or 1).
async fn render_to_file(
    pipeline: &Pipeline,
    request: &RenderRequest,
    output: &Path,
) -> wavediff_core::Result<usize> {
    let mut surface = DisplaySurface::new(SvgRenderer::new(), pipeline.config().canvas_height);
    let failed = match pipeline.drive(&mut surface, request).await {
        Ok(_) => 0,
        Err(err) => {
            tracing::error!(%err, ?output, "render failed");
            1
        }
    };

    if let Some(document) = surface.into_renderer().document() {
        std::fs::write(output, document)?;
        tracing::info!(?output, "wrote svg");
    }
    Ok(failed)
}

fn finish(failed: usize) -> wavediff_core::Result<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(WaveDiffError::msg(format!("{failed} render(s) failed")))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Waveform and difference views for audio recordings", long_about = None)]
struct Cli {
    /// JSON file overriding chunk size, layout and colours.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the peak envelope of a single WAV file.
    Waveform {
        /// WAV file to render.
        input: PathBuf,
        /// Destination SVG file.
        output: PathBuf,
    },
    /// Render both envelopes and the difference view of two WAV files.
    Compare {
        first: PathBuf,
        second: PathBuf,
        /// Directory receiving `waveform-1.svg`, `waveform-2.svg` and `difference.svg`.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}
