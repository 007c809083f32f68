use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use confgraph::{ConfgraphOptions, GraphOptions, RenderOptions, run_main};

#[derive(Parser, Debug)]
#[command(
    name = "confgraph",
    about = "confgraph: render INI/YAML/TOML/JSON configuration files as Graphviz graphs",
    version
)]
pub struct Cli {
    /// Project root; relative paths below are resolved against it
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Directory scanned for configuration files
    #[arg(long = "config-dir", value_name = "DIR", default_value = "tests/fixtures")]
    config_dir: PathBuf,

    /// Project manifest processed after the configuration directory
    #[arg(long, value_name = "FILE", default_value = "Cargo.toml")]
    manifest: PathBuf,

    /// Individual files to process before the configuration directory (repeatable)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        num_args = 1..,
        action = clap::ArgAction::Append
    )]
    files: Vec<PathBuf>,

    /// Output directory for .dot and .png artifacts
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = "output_examples")]
    output_dir: PathBuf,

    #[command(flatten)]
    graph: GraphOptions,

    #[command(flatten)]
    render: RenderOptions,
}

pub fn run(args: Cli) -> ExitCode {
    let total_start = Instant::now();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opts = ConfgraphOptions::new(args.root)
        .with_config_dir(args.config_dir)
        .with_manifest(args.manifest)
        .with_files(args.files)
        .with_output_dir(args.output_dir)
        .with_graph(args.graph)
        .with_render(args.render);

    let code = match run_main(&opts) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            tracing::error!(error = %e, "execution failed");
            ExitCode::FAILURE
        }
    };

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(total_secs, "complete");
    code
}

pub fn main() -> ExitCode {
    let args = Cli::parse();
    run(args)
}
