mod csv;
mod records;

pub use csv::CsvWriter;
pub use records::{JobRow, Record, RunRow, StepRow};

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;

pub const RUNS_FILE: &str = "actions_runs.csv";
pub const JOBS_FILE: &str = "actions_jobs.csv";
pub const STEPS_FILE: &str = "actions_steps.csv";

type FileWriter<R> = CsvWriter<BufWriter<File>, R>;

/// The three CSV outputs of one export, opened together and truncated.
///
/// Nothing is appended across invocations; re-running replaces the files.
pub struct OutputFiles {
    runs: FileWriter<RunRow>,
    jobs: FileWriter<JobRow>,
    steps: FileWriter<StepRow>,
    dir: PathBuf,
}

/// Row counts and locations of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub runs: usize,
    pub jobs: usize,
    pub steps: usize,
    pub runs_path: PathBuf,
    pub jobs_path: PathBuf,
    pub steps_path: PathBuf,
}

fn open<R: Record>(dir: &Path, name: &str) -> Result<FileWriter<R>> {
    let file = File::create(dir.join(name))?;
    CsvWriter::new(BufWriter::new(file))
}

impl OutputFiles {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        info!("Writing CSV files to: {}", dir.display());

        Ok(Self {
            runs: open(dir, RUNS_FILE)?,
            jobs: open(dir, JOBS_FILE)?,
            steps: open(dir, STEPS_FILE)?,
            dir: dir.to_path_buf(),
        })
    }

    pub fn write_run(&mut self, row: &RunRow) -> Result<()> {
        self.runs.write(row)
    }

    pub fn write_job(&mut self, row: &JobRow) -> Result<()> {
        self.jobs.write(row)
    }

    pub fn write_step(&mut self, row: &StepRow) -> Result<()> {
        self.steps.write(row)
    }

    pub fn finish(self) -> Result<ExportSummary> {
        let summary = ExportSummary {
            runs: self.runs.rows(),
            jobs: self.jobs.rows(),
            steps: self.steps.rows(),
            runs_path: self.dir.join(RUNS_FILE),
            jobs_path: self.dir.join(JOBS_FILE),
            steps_path: self.dir.join(STEPS_FILE),
        };

        self.runs.finish()?;
        self.jobs.finish()?;
        self.steps.finish()?;

        Ok(summary)
    }
}
