use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GitHub Actions workflow run as returned by `/actions/runs/{id}`.
///
/// Only the fields that end up in the runs CSV are kept; everything else in
/// the payload is ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    /// Unique identifier for the workflow run
    pub id: u64,
    /// Per-workflow sequence number
    pub run_number: u64,
    /// Head branch or tag name
    pub head_branch: Option<String>,
    /// Event that triggered the run
    pub event: Option<String>,
    /// Status of the run (queued, in_progress, completed, ...)
    pub status: Option<String>,
    /// Conclusion of the run, null until it completes
    pub conclusion: Option<String>,
    /// When the current attempt started
    pub run_started_at: Option<DateTime<Utc>>,
    /// When the run was last updated
    pub updated_at: Option<DateTime<Utc>>,
    /// Browser URL of the run
    pub html_url: Option<String>,
}

/// Job within a workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJob {
    pub id: u64,
    pub name: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
    /// Steps in declared order; absent for jobs that have not been picked up
    #[serde(default)]
    pub steps: Vec<JobStep>,
}

/// Step within a job. Steps carry no identifier of their own.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStep {
    pub name: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response body of `/actions/workflows/{workflow}/runs`.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunsPage {
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Response body of `/actions/runs/{id}/jobs`.
#[derive(Debug, Deserialize)]
pub struct JobsPage {
    pub total_count: Option<u64>,
    pub jobs: Vec<WorkflowJob>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_job_deserializes_with_nulls() {
        let job: WorkflowJob = serde_json::from_str(
            r#"{
                "id": 42,
                "run_id": 7,
                "name": "build_marp_cachetool_none_phase_use-cache",
                "status": "in_progress",
                "conclusion": null,
                "started_at": "2024-05-01T00:00:00Z",
                "completed_at": null,
                "labels": ["ubuntu-latest"]
            }"#,
        )
        .unwrap();

        assert_eq!(job.id, 42);
        assert!(job.conclusion.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.steps.is_empty());
    }

    #[test]
    fn test_run_without_run_number_is_rejected() {
        let result: Result<WorkflowRun, _> = serde_json::from_str(r#"{"id": 7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_ignores_unknown_fields() {
        let run: WorkflowRun = serde_json::from_str(
            r#"{
                "id": 7,
                "run_number": 12,
                "head_branch": "main",
                "head_sha": "abc",
                "event": "push",
                "status": "completed",
                "conclusion": "success",
                "run_started_at": "2024-05-01T00:00:00Z",
                "updated_at": "2024-05-01T00:00:10Z",
                "html_url": "https://github.com/o/r/actions/runs/7",
                "repository": {"id": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(run.run_number, 12);
        assert_eq!(run.head_branch.as_deref(), Some("main"));
        assert_eq!(run.conclusion.as_deref(), Some("success"));
    }
}
