use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;

use crate::duration::{duration_secs, format_secs};
use crate::github::{JobStep, WorkflowJob, WorkflowRun};

/// One flattened CSV row with a fixed column set.
pub trait Record {
    const HEADER: &'static [&'static str];

    /// Field values in `HEADER` order. Absent values are empty strings.
    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub run_id: u64,
    pub run_number: u64,
    pub branch: String,
    pub event: String,
    pub status: String,
    pub conclusion: String,
    pub run_started_at: String,
    pub updated_at: String,
    pub duration_s: Option<f64>,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub run_id: u64,
    pub job_id: u64,
    pub job_name: String,
    pub status: String,
    pub conclusion: String,
    pub started: String,
    pub ended: String,
    pub duration_s: Option<f64>,
    pub html_url: String,
}

/// Step row; `job_name` is repeated on every row since steps have no id.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    pub run_id: u64,
    pub job_name: String,
    pub step_name: String,
    pub status: String,
    pub conclusion: String,
    pub started: String,
    pub ended: String,
    pub duration_s: Option<f64>,
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}

fn duration(value: Option<f64>) -> String {
    value.map(format_secs).unwrap_or_default()
}

fn checked_duration(
    what: &str,
    end: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
) -> Option<f64> {
    let secs = duration_secs(end, start);
    if let Some(secs) = secs.filter(|s| *s < 0.0) {
        warn!("{what} has a negative duration ({secs}s); exporting it unchanged");
    }
    secs
}

impl From<&WorkflowRun> for RunRow {
    fn from(run: &WorkflowRun) -> Self {
        Self {
            run_id: run.id,
            run_number: run.run_number,
            branch: text(run.head_branch.as_deref()),
            event: text(run.event.as_deref()),
            status: text(run.status.as_deref()),
            conclusion: text(run.conclusion.as_deref()),
            run_started_at: timestamp(run.run_started_at),
            updated_at: timestamp(run.updated_at),
            duration_s: checked_duration(
                &format!("Run {}", run.id),
                run.updated_at,
                run.run_started_at,
            ),
            html_url: text(run.html_url.as_deref()),
        }
    }
}

impl JobRow {
    pub fn new(run_id: u64, job: &WorkflowJob) -> Self {
        Self {
            run_id,
            job_id: job.id,
            job_name: job.name.clone(),
            status: text(job.status.as_deref()),
            conclusion: text(job.conclusion.as_deref()),
            started: timestamp(job.started_at),
            ended: timestamp(job.completed_at),
            duration_s: checked_duration(
                &format!("Job {} ({})", job.id, job.name),
                job.completed_at,
                job.started_at,
            ),
            html_url: text(job.html_url.as_deref()),
        }
    }
}

impl StepRow {
    pub fn new(run_id: u64, job_name: &str, step: &JobStep) -> Self {
        Self {
            run_id,
            job_name: job_name.to_owned(),
            step_name: step.name.clone(),
            status: text(step.status.as_deref()),
            conclusion: text(step.conclusion.as_deref()),
            started: timestamp(step.started_at),
            ended: timestamp(step.completed_at),
            duration_s: checked_duration(
                &format!("Step '{}' of job '{job_name}'", step.name),
                step.completed_at,
                step.started_at,
            ),
        }
    }

    /// Rows for every step of `job`, in the order the API declared them.
    pub fn for_job(run_id: u64, job: &WorkflowJob) -> Vec<Self> {
        job.steps
            .iter()
            .map(|step| Self::new(run_id, &job.name, step))
            .collect()
    }
}

impl Record for RunRow {
    const HEADER: &'static [&'static str] = &[
        "run_id",
        "run_number",
        "branch",
        "event",
        "status",
        "conclusion",
        "run_started_at",
        "updated_at",
        "duration_s",
        "html_url",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.run_id.to_string(),
            self.run_number.to_string(),
            self.branch.clone(),
            self.event.clone(),
            self.status.clone(),
            self.conclusion.clone(),
            self.run_started_at.clone(),
            self.updated_at.clone(),
            duration(self.duration_s),
            self.html_url.clone(),
        ]
    }
}

impl Record for JobRow {
    const HEADER: &'static [&'static str] = &[
        "run_id",
        "job_id",
        "job_name",
        "status",
        "conclusion",
        "started",
        "ended",
        "duration_s",
        "html_url",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.run_id.to_string(),
            self.job_id.to_string(),
            self.job_name.clone(),
            self.status.clone(),
            self.conclusion.clone(),
            self.started.clone(),
            self.ended.clone(),
            duration(self.duration_s),
            self.html_url.clone(),
        ]
    }
}

impl Record for StepRow {
    const HEADER: &'static [&'static str] = &[
        "run_id",
        "job_name",
        "step_name",
        "status",
        "conclusion",
        "started",
        "ended",
        "duration_s",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.run_id.to_string(),
            self.job_name.clone(),
            self.step_name.clone(),
            self.status.clone(),
            self.conclusion.clone(),
            self.started.clone(),
            self.ended.clone(),
            duration(self.duration_s),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_progress_run() -> WorkflowRun {
        serde_json::from_value(serde_json::json!({
            "id": 9,
            "run_number": 4,
            "head_branch": "main",
            "event": "workflow_dispatch",
            "status": "in_progress",
            "conclusion": null,
            "run_started_at": "2024-05-01T00:00:00Z",
            "updated_at": null,
            "html_url": "https://github.com/o/r/actions/runs/9"
        }))
        .unwrap()
    }

    fn job_with_steps() -> WorkflowJob {
        serde_json::from_value(serde_json::json!({
            "id": 100,
            "name": "build_zenn_cachetool_cachix-action_phase_use-cache",
            "status": "in_progress",
            "conclusion": null,
            "started_at": "2024-05-01T00:00:00Z",
            "completed_at": null,
            "html_url": "https://github.com/o/r/actions/runs/9/job/100",
            "steps": [
                {
                    "name": "Set up job",
                    "status": "completed",
                    "conclusion": "success",
                    "number": 1,
                    "started_at": "2024-05-01T00:00:00Z",
                    "completed_at": "2024-05-01T00:00:02Z"
                },
                {
                    "name": "Run nix build",
                    "status": "in_progress",
                    "conclusion": null,
                    "number": 2,
                    "started_at": "2024-05-01T00:00:02Z",
                    "completed_at": null
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_conclusion_is_empty_not_null() {
        let row = RunRow::from(&in_progress_run());
        let fields = row.fields();

        assert_eq!(fields[5], "");
        assert!(fields.iter().all(|f| f != "null"));
        assert_eq!(fields[8], "", "duration must be empty without updated_at");
    }

    #[test]
    fn test_run_fields_follow_header() {
        let row = RunRow::from(&in_progress_run());
        let fields = row.fields();

        assert_eq!(fields.len(), RunRow::HEADER.len());
        assert_eq!(fields[0], "9");
        assert_eq!(fields[1], "4");
        assert_eq!(fields[2], "main");
        assert_eq!(fields[6], "2024-05-01T00:00:00Z");
        assert_eq!(fields[9], "https://github.com/o/r/actions/runs/9");
    }

    #[test]
    fn test_step_rows_keep_declared_order_and_job_name() {
        let job = job_with_steps();
        let rows = StepRow::for_job(9, &job);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].step_name, "Set up job");
        assert_eq!(rows[1].step_name, "Run nix build");
        assert!(rows.iter().all(|r| r.job_name == job.name && r.run_id == 9));

        assert_eq!(rows[0].fields()[7], "2");
        let second = rows[1].fields();
        assert_eq!(second[4], "");
        assert_eq!(second[6], "");
        assert_eq!(second[7], "");
    }

    #[test]
    fn test_job_row_without_completion() {
        let row = JobRow::new(9, &job_with_steps());
        let fields = row.fields();

        assert_eq!(fields.len(), JobRow::HEADER.len());
        assert_eq!(fields[1], "100");
        assert_eq!(fields[4], "");
        assert_eq!(fields[6], "");
        assert_eq!(fields[7], "");
    }

    #[test]
    fn test_headers_match_downstream_format() {
        assert_eq!(
            RunRow::HEADER.join(","),
            "run_id,run_number,branch,event,status,conclusion,run_started_at,updated_at,duration_s,html_url"
        );
        assert_eq!(
            JobRow::HEADER.join(","),
            "run_id,job_id,job_name,status,conclusion,started,ended,duration_s,html_url"
        );
        assert_eq!(
            StepRow::HEADER.join(","),
            "run_id,job_name,step_name,status,conclusion,started,ended,duration_s"
        );
    }
}
