//! `fabmap` - composite heightmap tiles into one 16-bit PNG.

use clap::{Parser, Subcommand};
use fabmap_cli::{run_job, Job};
use fabmap_png::{read_tile, write_preview};
use fabmap_raster::preview_rgba;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "fabmap", version, about = "Composite 16-bit heightmap tiles")]
struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the tiles of a YAML job onto its canvas
    Composite {
        /// Job file
        job: PathBuf,
        /// Output PNG (overrides the job file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write an 8-bit preview here
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Write an 8-bit RGBA preview of a heightmap
    Preview {
        /// 16-bit heightmap PNG
        input: PathBuf,
        /// Preview PNG to write
        output: PathBuf,
    },
    /// Print the size and bounds of a heightmap
    Info {
        /// Heightmap PNG
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Composite {
            job,
            output,
            preview,
        } => {
            let job = Job::load(&job)?;
            let report = run_job(&job, output.as_deref(), preview.as_deref())?;
            println!(
                "{}: {}x{} px, {} merged, {} skipped, {} outside",
                report.output.display(),
                report.width,
                report.height,
                report.merged,
                report.skipped,
                report.outside
            );
        }
        Command::Preview { input, output } => {
            // Files hold the top row first; the preview expects a canvas
            let mut tile = read_tile(&input)?;
            tile.flip_rows();
            write_preview(&output, &preview_rgba(&tile))?;
        }
        Command::Info { input } => {
            let tile = read_tile(&input)?;
            println!("{}: {}x{} px", input.display(), tile.width(), tile.height());
            match tile.bounds() {
                Some(b) => {
                    println!("  x: {} .. {} mm", b.xmin, b.xmax);
                    println!("  y: {} .. {} mm", b.ymin, b.ymax);
                    println!("  z: {} .. {} mm", b.zmin, b.zmax);
                }
                None => println!("  no bounds metadata"),
            }
            if let Some(max) = tile.max_sample() {
                println!("  max sample: {max}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
