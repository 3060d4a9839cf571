use log::info;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::{ExportSummary, JobRow, OutputFiles, RunRow, StepRow};
use crate::github::{self, ApiClient};
use crate::output::RunProgress;
use crate::selector::select_runs;

/// Export run, job and step timings for the selected runs.
///
/// Runs are processed one at a time in selection order. For each run the
/// run detail and its jobs are fetched; steps come from the same jobs
/// response. Any error aborts immediately and files already written are
/// left as they are.
pub async fn run_export(
    client: &impl ApiClient,
    config: &ExportConfig,
    progress: &RunProgress,
) -> Result<ExportSummary> {
    let run_ids = select_runs(client, config).await?;
    let mut files = OutputFiles::create(&config.out_dir)?;

    progress.start(run_ids.len());
    for run_id in run_ids {
        progress.set_run(run_id);

        let run = github::fetch_run(client, &config.repository, run_id).await?;
        files.write_run(&RunRow::from(&run))?;

        let jobs = github::fetch_jobs(client, &config.repository, run.id).await?;
        for job in &jobs {
            files.write_job(&JobRow::new(run.id, job))?;
        }
        for row in jobs.iter().flat_map(|job| StepRow::for_job(run.id, job)) {
            files.write_step(&row)?;
        }

        progress.inc();
    }

    let summary = files.finish()?;
    progress.finish(summary.runs);
    info!(
        "Exported {} runs, {} jobs, {} steps",
        summary.runs, summary.jobs, summary.steps
    );

    Ok(summary)
}
