// batch.rs - Runs a task list: sample, render, then write images and records
//
// Tasks are independent and each one is written out as soon as it finishes.
// Sequential mode processes them in order; parallel mode hands them to rayon.
// With a base seed, each task derives its own seed stream from
// `base_seed + task_index`, so both modes produce the same mazes.

use std::path::{Path, PathBuf};

use maze_generator::{
    Accepted, AcceptanceSampler, LatticeConfig, Maze, MazeRecord, MazeTask, SamplerConfig,
};
use rayon::prelude::*;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error_handling::{ensure_parent_dir, write_file, RenderError, Result};
use crate::export::MazeExport;
use crate::render::{encode_png, render_maze, RenderStyle};

pub const RECORDS_FILE: &str = "mazes.txt";
pub const RENDERS_DIR: &str = "renders";
pub const JSON_DIR: &str = "json";

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub lattice: LatticeConfig,
    pub sampler: SamplerConfig,
    pub style: RenderStyle,
    pub parallel: bool,
}

/// One accepted maze and its encoded image.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub index: usize,
    pub task: MazeTask,
    pub accepted: Accepted<Maze>,
    pub record: MazeRecord,
    pub png: Vec<u8>,
}

/// Task list file: either a bare JSON array or `{ "tasks": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskFile {
    List(Vec<MazeTask>),
    Wrapped { tasks: Vec<MazeTask> },
}

pub fn parse_tasks(json: &str) -> Result<Vec<MazeTask>> {
    let tasks = match serde_json::from_str::<TaskFile>(json)? {
        TaskFile::List(tasks) | TaskFile::Wrapped { tasks } => tasks,
    };
    if tasks.is_empty() {
        return Err(RenderError::InvalidTasks {
            reason: "no tasks given".into(),
        });
    }
    Ok(tasks)
}

/// Sample and render every task, handing each result to `sink` as soon as
/// its task finishes. A failed task does not stop the others. In parallel
/// mode results arrive in completion order, not task order.
pub fn generate_each<F>(tasks: &[MazeTask], options: &BatchOptions, sink: F)
where
    F: Fn(usize, Result<BatchOutcome>) + Sync,
{
    let total = tasks.len();
    let run = |(index, task): (usize, &MazeTask)| {
        sink(index, generate_one(index, total, task, options));
    };
    if options.parallel {
        tasks.par_iter().enumerate().for_each(run);
    } else {
        tasks.iter().enumerate().for_each(run);
    }
}

fn generate_one(
    index: usize,
    total: usize,
    task: &MazeTask,
    options: &BatchOptions,
) -> Result<BatchOutcome> {
    let criteria = task.criteria()?;
    let lattice = task.build_lattice(options.lattice)?;
    let config = SamplerConfig {
        base_seed: options
            .sampler
            .base_seed
            .map(|seed| seed.wrapping_add(index as u64)),
        ..options.sampler
    };

    let label = format!("{index}/{total} ({})", task.caption());
    let accepted = AcceptanceSampler::new(criteria, config)
        .with_label(label)
        .sample_maze(lattice)?;
    let record = MazeRecord::from_maze(index, &accepted.candidate);
    let png = encode_png(&render_maze(&accepted.candidate, &options.style))?;

    Ok(BatchOutcome {
        index,
        task: *task,
        accepted,
        record,
        png,
    })
}

/// Writes each outcome as it arrives: `renders/{i}.png`, optional
/// `json/{i}.json`, and one appended line in the records file.
#[derive(Debug)]
pub struct BatchWriter {
    output_dir: PathBuf,
    export_json: bool,
    records_path: PathBuf,
    records: File,
    written: usize,
}

impl BatchWriter {
    /// Start a batch under `output_dir`, truncating any previous records file.
    pub async fn create(output_dir: impl Into<PathBuf>, export_json: bool) -> Result<Self> {
        let output_dir = output_dir.into();
        let records_path = output_dir.join(RECORDS_FILE);
        ensure_parent_dir(&records_path).await?;
        let records = File::create(&records_path)
            .await
            .map_err(|e| RenderError::io(&records_path, e))?;

        Ok(Self {
            output_dir,
            export_json,
            records_path,
            records,
            written: 0,
        })
    }

    pub async fn write(&mut self, outcome: &BatchOutcome) -> Result<()> {
        let png_path = self
            .output_dir
            .join(RENDERS_DIR)
            .join(format!("{}.png", outcome.index));
        write_file(&png_path, &outcome.png).await?;

        if self.export_json {
            let export = MazeExport::from_maze(&outcome.accepted.candidate)?;
            let json_path = self
                .output_dir
                .join(JSON_DIR)
                .join(format!("{}.json", outcome.index));
            write_file(&json_path, export.to_json()?.as_bytes()).await?;
        }

        let line = format!("{}\n", outcome.record);
        self.records
            .write_all(line.as_bytes())
            .await
            .map_err(|e| RenderError::io(&self.records_path, e))?;
        self.records
            .flush()
            .await
            .map_err(|e| RenderError::io(&self.records_path, e))?;
        self.written += 1;

        log::info!(
            "{}. path ratio = {:.4}, attempts = {}, saved {}",
            outcome.index,
            outcome.accepted.stats.last,
            outcome.accepted.stats.attempts,
            png_path.display()
        );
        Ok(())
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Number of outcomes written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_generator::MazeError;
    use std::sync::Mutex;

    fn options(parallel: bool) -> BatchOptions {
        BatchOptions {
            lattice: LatticeConfig::square(8),
            sampler: SamplerConfig {
                max_attempts: Some(10_000),
                base_seed: Some(2016),
                progress_interval: 0,
            },
            style: RenderStyle::default(),
            parallel,
        }
    }

    fn tasks() -> Vec<MazeTask> {
        vec![
            MazeTask::rectangular(3, 3, 0.5, 0.2),
            MazeTask::rectangular(2, 2, 0.75, 0.5),
            MazeTask::rectangular(8, 6, 0.4, 0.2),
        ]
    }

    /// Per-task results in task order.
    fn collect(tasks: &[MazeTask], options: &BatchOptions) -> Vec<(usize, Result<BatchOutcome>)> {
        let results = Mutex::new(Vec::new());
        generate_each(tasks, options, |index, result| {
            results.lock().unwrap().push((index, result));
        });
        let mut results = results.into_inner().unwrap();
        results.sort_by_key(|(index, _)| *index);
        results
    }

    fn accepted(tasks: &[MazeTask], options: &BatchOptions) -> Vec<BatchOutcome> {
        collect(tasks, options)
            .into_iter()
            .map(|(_, result)| result.unwrap())
            .collect()
    }

    async fn write_all(outcomes: &[BatchOutcome], dir: &Path) -> BatchWriter {
        let mut writer = BatchWriter::create(dir, true).await.unwrap();
        for outcome in outcomes {
            writer.write(outcome).await.unwrap();
        }
        writer
    }

    #[test]
    fn test_parse_tasks_both_shapes() {
        let bare = r#"[{"width": 4, "height": 4, "desired_ratio": 0.5, "epsilon": 0.1}]"#;
        let wrapped = r#"{"tasks": [
            {"kind": "rectangular", "width": 4, "height": 4, "desired_ratio": 0.5, "epsilon": 0.1}
        ]}"#;
        assert_eq!(parse_tasks(bare).unwrap(), parse_tasks(wrapped).unwrap());
        assert!(matches!(parse_tasks("[]"), Err(RenderError::InvalidTasks { .. })));
        assert!(matches!(parse_tasks("{"), Err(RenderError::SerializationError(_))));
    }

    #[test]
    fn test_every_outcome_inside_its_band() {
        let tasks = tasks();
        let outcomes = accepted(&tasks, &options(false));
        assert_eq!(outcomes.len(), tasks.len());
        for (outcome, task) in outcomes.iter().zip(&tasks) {
            let ratio = outcome.accepted.candidate.path_ratio();
            assert!(task.criteria().unwrap().accepts(ratio));
            assert_eq!(outcome.record.width, task.width);
            assert_eq!(outcome.record.seed, outcome.accepted.seed);
        }
    }

    #[test]
    fn test_sequential_results_arrive_in_task_order() {
        let order = Mutex::new(Vec::new());
        generate_each(&tasks(), &options(false), |index, _| {
            order.lock().unwrap().push(index);
        });
        assert_eq!(order.into_inner().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tasks = tasks();
        let sequential = accepted(&tasks, &options(false));
        let parallel = accepted(&tasks, &options(true));
        let records = |o: &[BatchOutcome]| o.iter().map(|o| o.record).collect::<Vec<_>>();
        assert_eq!(records(&sequential), records(&parallel));
    }

    #[test]
    fn test_invalid_task_reports_its_own_error() {
        let tasks = vec![MazeTask::rectangular(1, 3, 0.5, 0.2)];
        let results = collect(&tasks, &options(false));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].1, Err(RenderError::Maze(_))));
    }

    #[tokio::test]
    async fn test_unreachable_task_keeps_other_outcomes() {
        let dir = std::env::temp_dir()
            .join(format!("maze-renderer-partial-{}", std::process::id()));
        let mut options = options(false);
        options.sampler.max_attempts = Some(200);
        // A 10x10 solution path can cover at most 99 cells, so this band is empty.
        let tasks = vec![
            MazeTask::rectangular(2, 2, 0.75, 0.5),
            MazeTask::rectangular(10, 10, 1.0, 0.01),
            MazeTask::rectangular(3, 3, 0.5, 0.2),
        ];

        let mut outcomes = Vec::new();
        for (index, result) in collect(&tasks, &options) {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    assert_eq!(index, 1);
                    assert!(matches!(
                        err,
                        RenderError::Maze(MazeError::TargetUnreachable { attempts: 200, .. })
                    ));
                }
            }
        }
        assert_eq!(outcomes.len(), 2);

        let writer = write_all(&outcomes, &dir).await;
        assert_eq!(writer.written(), 2);
        let text = tokio::fs::read_to_string(writer.records_path()).await.unwrap();
        let records = maze_generator::parse_records(&text).unwrap();
        let indices: Vec<usize> = records.iter().map(|r| r.task_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(dir.join(RENDERS_DIR).join("0.png").exists());
        assert!(!dir.join(RENDERS_DIR).join("1.png").exists());
        assert!(dir.join(RENDERS_DIR).join("2.png").exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_writer_layout() {
        let dir = std::env::temp_dir().join(format!("maze-renderer-batch-{}", std::process::id()));
        let outcomes = accepted(&tasks(), &options(false));

        let writer = write_all(&outcomes, &dir).await;
        assert_eq!(writer.records_path(), dir.join(RECORDS_FILE));

        let text = tokio::fs::read_to_string(writer.records_path()).await.unwrap();
        let records = maze_generator::parse_records(&text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].task_index, 2);

        for index in 0..3 {
            let png = tokio::fs::read(dir.join(RENDERS_DIR).join(format!("{index}.png")))
                .await
                .unwrap();
            assert_eq!(&png[..4], b"\x89PNG");
            assert!(dir.join(JSON_DIR).join(format!("{index}.json")).exists());
        }

        // Replaying a record gives back the accepted maze.
        let replay = records[0].regenerate(LatticeConfig::square(8)).unwrap();
        assert_eq!(replay.tree(), outcomes[0].accepted.candidate.tree());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
