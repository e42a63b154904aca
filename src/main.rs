use clap::{Parser, Subcommand};
use poster_brand::imaging::{RustBackend, set_dpi, sniff_format};
use poster_brand::{config, output, render};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "poster-brand")]
#[command(about = "Place logos on a poster and export print-ready files")]
#[command(long_about = "\
Place logos on a poster and export print-ready files

A job file names a base poster, one to six logos and the exports to produce.
Logos are fitted into a container region of the poster, then rotated, faded,
clipped to rounded corners, blended and optionally bordered. Every export is
rendered from scratch at its own resolution and tagged with a physical DPI.

Job layout:

  job.toml                       # see 'poster-brand gen-config'
  poster.png                     # base image (PNG, JPEG or WebP)
  logo.svg                       # logos (PNG, JPEG, WebP or SVG)

Output files are named poster_<tag>_<width>x<height>.<png|jpg>.")]
#[command(version)]
struct Cli {
    /// Log debug detail (DPI pass-through decisions, output sizes)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every export listed in a job file
    Render {
        /// Job file
        #[arg(long, default_value = "job.toml")]
        config: PathBuf,
        /// Output directory (defaults to the job file's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Rewrite the DPI tag of an existing PNG or JPEG file
    SetDpi {
        input: PathBuf,
        #[arg(long)]
        dpi: u32,
        /// Write here instead of overwriting the input
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the format and DPI tag of a PNG or JPEG file
    Inspect {
        file: PathBuf,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock job file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render { config, out_dir } => {
            let job = config::load_config(&config)?;
            init_thread_pool(&job.processing);
            let job_dir = config.parent().unwrap_or(Path::new("."));
            let out_dir = out_dir.as_deref().unwrap_or(job_dir);
            let report = render::render_config(&RustBackend::new(), &job, job_dir, out_dir)?;
            output::print_render_report(&report);
            let failed = report.failed_count();
            if failed > 0 {
                return Err(format!("{failed} export(s) failed").into());
            }
        }
        Command::SetDpi {
            input,
            dpi,
            output: out,
        } => {
            let bytes = std::fs::read(&input)?;
            let format = sniff_format(&bytes)
                .ok_or_else(|| format!("{}: not a PNG or JPEG file", input.display()))?;
            let tagged = set_dpi(&bytes, format, dpi);
            let target = out.unwrap_or_else(|| input.clone());
            std::fs::write(&target, tagged)?;
            println!("{}", output::format_set_dpi(&input, &target, format, dpi));
        }
        Command::Inspect { file, json } => {
            let bytes = std::fs::read(&file)?;
            let path = file.display().to_string();
            let report = output::inspect_bytes(&RustBackend::new(), &path, &bytes);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_inspect(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
