// main.rs - Batch maze generator: sample ratio-constrained mazes, render PNGs, write records

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use maze_generator::{LatticeConfig, MazeRecord, MazeTask, SamplerConfig};
use maze_renderer::error_handling::write_file;
use maze_renderer::{encode_png, generate_each, parse_tasks, render_maze};
use maze_renderer::{BatchOptions, BatchWriter, MazeExport, RenderStyle};
use std::path::PathBuf;
use std::time::Instant;

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON task list: an array of {width, height, desired_ratio, epsilon}
    #[arg(short, long)]
    pub tasks: Option<PathBuf>,

    /// Lattice width in cells (single-task mode)
    #[arg(short = 'W', long, default_value = "20")]
    pub width: usize,

    /// Lattice height in cells (single-task mode)
    #[arg(short = 'H', long, default_value = "20")]
    pub height: usize,

    /// Desired share of cells on the solution path (single-task mode)
    #[arg(short, long, default_value = "0.25")]
    pub ratio: f64,

    /// Tolerance half-width around the desired ratio (single-task mode)
    #[arg(short, long, default_value = "0.01")]
    pub epsilon: f64,

    /// Output directory for renders/, json/ and mazes.txt
    #[arg(short, long, default_value = "mazes")]
    pub output_dir: PathBuf,

    /// Cell size in pixels
    #[arg(long, default_value = "20")]
    pub cell_size: u32,

    /// Give up on a task after this many attempts (default: never)
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Base seed for reproducible runs (default: OS entropy)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Process tasks in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Also export each maze as JSON
    #[arg(long)]
    pub json: bool,

    /// Re-render a maze from a record line, e.g. "0 rect 40 40 17"
    #[arg(long, value_name = "RECORD")]
    pub regenerate: Option<String>,
}

impl Args {
    fn single_task(&self) -> MazeTask {
        MazeTask::rectangular(self.width, self.height, self.ratio, self.epsilon)
    }
}

/// Load the task list (file or single task from flags)
async fn load_tasks(args: &Args) -> Result<Vec<MazeTask>> {
    match &args.tasks {
        Some(path) => {
            let s = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_tasks(&s)
                .with_context(|| format!("Failed to parse tasks from {}", path.display()))
        }
        None => Ok(vec![args.single_task()]),
    }
}

/// Rebuild one maze from its record and write it next to the batch output.
async fn regenerate(line: &str, args: &Args, lattice: LatticeConfig) -> Result<()> {
    let record: MazeRecord = line.parse()?;
    let maze = record.regenerate(lattice)?;
    info!(
        "Regenerated {} (path ratio {:.4})",
        record,
        maze.path_ratio()
    );

    let png = encode_png(&render_maze(&maze, &RenderStyle::default()))?;
    let png_path = args
        .output_dir
        .join(format!("regenerated_{}.png", record.task_index));
    write_file(&png_path, &png).await?;
    info!("Saved image to {}", png_path.display());

    if args.json {
        let json_path = png_path.with_extension("json");
        write_file(&json_path, MazeExport::from_maze(&maze)?.to_json()?.as_bytes()).await?;
        info!("Saved JSON to {}", json_path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let lattice = LatticeConfig::square(args.cell_size);

    if let Some(line) = &args.regenerate {
        return regenerate(line, &args, lattice).await;
    }

    let tasks = load_tasks(&args).await?;
    let total = tasks.len();
    let options = BatchOptions {
        lattice,
        sampler: SamplerConfig {
            max_attempts: args.max_attempts,
            base_seed: args.seed,
            ..SamplerConfig::default()
        },
        style: RenderStyle::default(),
        parallel: args.parallel,
    };

    info!(
        "Generating {} maze(s){}",
        total,
        if options.parallel { " in parallel" } else { "" }
    );
    let start = Instant::now();
    let mut writer = BatchWriter::create(&args.output_dir, args.json).await?;

    // Each task's result is written as soon as the worker reports it.
    let (sender, mut results) = tokio::sync::mpsc::unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || {
        generate_each(&tasks, &options, |index, result| {
            // Only fails once the receiver is gone, and it outlives the worker.
            let _ = sender.send((index, result));
        })
    });

    let mut failed = Vec::new();
    let mut attempts = 0u64;
    while let Some((index, result)) = results.recv().await {
        let written = match result {
            Ok(outcome) => {
                attempts += outcome.accepted.stats.attempts;
                writer.write(&outcome).await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            error!("Task {index} failed: {err}");
            failed.push(index);
        }
    }
    worker.await.context("Generation worker panicked")?;

    info!(
        "Done: {} of {} maze(s), {} attempts in {:?}",
        writer.written(),
        total,
        attempts,
        start.elapsed()
    );
    info!("Saved records to {}", writer.records_path().display());

    failed.sort_unstable();
    anyhow::ensure!(
        failed.is_empty(),
        "{} of {} task(s) failed: {:?}",
        failed.len(),
        total,
        failed
    );
    Ok(())
}
