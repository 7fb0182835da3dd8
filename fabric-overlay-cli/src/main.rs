use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fabric_overlay::{BatchOpts, JobReport, JobSpec, LayoutVariant};

#[derive(Parser, Debug)]
#[command(name = "fabric-overlay", version)]
struct Cli {
    /// Log per-pair layout details.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite every base with every fabric.
    Combine(CombineArgs),
    /// Run a job described by a JSON file.
    Job(JobArgs),
}

#[derive(Parser, Debug)]
struct CombineArgs {
    /// Base product photo (repeatable, order is preserved).
    #[arg(long = "base", required = true)]
    bases: Vec<PathBuf>,

    /// Fabric swatch (repeatable, order is preserved).
    #[arg(long = "fabric", required = true)]
    fabrics: Vec<PathBuf>,

    /// Layout: `stacked` or `side-by-side`.
    #[arg(long, default_value = "stacked")]
    variant: LayoutVariant,

    /// Directory receiving one PNG per composite.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Zip archive receiving every composite.
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Render pairs one after another instead of on a worker pool.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let report = match cli.cmd {
        Command::Combine(args) => cmd_combine(args),
        Command::Job(args) => cmd_job(args),
    }?;

    for path in &report.png_paths {
        eprintln!("wrote {}", path.display());
    }
    if let Some(path) = &report.archive_path {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_combine(args: CombineArgs) -> anyhow::Result<JobReport> {
    let job = JobSpec {
        bases: args.bases,
        fabrics: args.fabrics,
        variant: args.variant,
        out_dir: args.out_dir,
        archive: args.archive,
        batch: BatchOpts {
            parallel: !args.sequential,
            threads: args.threads,
        },
    };
    tracing::debug!(job = %serde_json::to_string(&job)?, "combine");
    Ok(fabric_overlay::run_job(&job)?)
}

fn cmd_job(args: JobArgs) -> anyhow::Result<JobReport> {
    let job = JobSpec::from_path(&args.in_path)
        .with_context(|| format!("load job '{}'", args.in_path.display()))?;
    Ok(fabric_overlay::run_job(&job)?)
}
