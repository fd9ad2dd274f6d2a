//! `isurf` - generate isosurface meshes from GrADS volumes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use config::constants::DEFAULT_MIN_PARALLEL_CUBES;
use isosurface::ExtractionConfig;
use isosurface_cli::{run_batch, BatchOptions, BatchReport};
use mesh_export::MeshFormat;

#[derive(Parser, Debug)]
#[command(name = "isurf", version)]
#[command(about = "Extract isosurfaces from GrADS volumes with Marching Cubes", long_about = None)]
struct Cli {
    /// A .ctl descriptor, or a directory whose .ctl files are all processed
    input: PathBuf,

    /// Directory for the generated meshes (created if missing)
    output_dir: PathBuf,

    /// Isovalues to extract; one mesh file is written per value
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    isovalues: Vec<f32>,

    /// Output mesh format: obj or stl
    #[arg(long, default_value = "obj")]
    format: MeshFormat,

    /// Classify and extract on all cores
    #[arg(long)]
    parallel: bool,

    /// Smallest grid (in cubes) that takes the parallel path
    #[arg(long, default_value_t = DEFAULT_MIN_PARALLEL_CUBES)]
    min_parallel_cubes: usize,
}

fn run(cli: Cli) -> Result<BatchReport> {
    let options = BatchOptions {
        isovalues: cli.isovalues,
        format: cli.format,
        extraction: ExtractionConfig::new(cli.parallel, cli.min_parallel_cubes)?,
    };
    run_batch(&cli.input, &cli.output_dir, &options)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("isurf {}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            for (path, reason) in &report.failed {
                error!("failed: {} ({reason})", path.display());
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
