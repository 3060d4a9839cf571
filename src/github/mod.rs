mod client;
mod types;

pub use client::{ApiClient, GitHubClient};
pub use types::{JobStep, WorkflowJob, WorkflowRun};
use types::{JobsPage, WorkflowRunsPage};

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ExportError, Result};

/// Largest page the Actions endpoints accept.
pub const MAX_PER_PAGE: usize = 100;

/// Owner/name pair addressing one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/repo` slug such as `GITHUB_REPOSITORY`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Some(Self::new(*owner, *name))
            }
            _ => None,
        }
    }

    fn actions_path(&self) -> String {
        format!("repos/{}/{}/actions", self.owner, self.name)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ExportError::Parse {
        endpoint: path.to_owned(),
        detail: e.to_string(),
    })
}

/// Fetch a single workflow run.
pub async fn fetch_run(
    client: &impl ApiClient,
    repo: &Repository,
    run_id: u64,
) -> Result<WorkflowRun> {
    let path = format!("{}/runs/{run_id}", repo.actions_path());
    let body = client.fetch(&path, &[]).await?;
    decode(&path, body)
}

/// Fetch one page of runs for `workflow` (file name or numeric id).
pub async fn fetch_workflow_runs(
    client: &impl ApiClient,
    repo: &Repository,
    workflow: &str,
    per_page: usize,
    branch: Option<&str>,
) -> Result<Vec<WorkflowRun>> {
    let path = format!("{}/workflows/{workflow}/runs", repo.actions_path());
    let mut params = vec![("per_page", per_page.min(MAX_PER_PAGE).to_string())];
    if let Some(branch) = branch {
        params.push(("branch", branch.to_owned()));
    }

    let body = client.fetch(&path, &params).await?;
    let page: WorkflowRunsPage = decode(&path, body)?;
    Ok(page.workflow_runs)
}

/// Fetch every job of a run, following pages until `total_count` is reached.
///
/// Job order (and step order inside each job) is kept exactly as the API
/// reports it.
pub async fn fetch_jobs(
    client: &impl ApiClient,
    repo: &Repository,
    run_id: u64,
) -> Result<Vec<WorkflowJob>> {
    let path = format!("{}/runs/{run_id}/jobs", repo.actions_path());
    let mut jobs = Vec::new();
    let mut page = 1usize;

    loop {
        let params = [
            ("per_page", MAX_PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        let body = client.fetch(&path, &params).await?;
        let batch: JobsPage = decode(&path, body)?;
        let fetched = batch.jobs.len();
        jobs.extend(batch.jobs);

        let total = batch.total_count.map_or(jobs.len(), |t| t as usize);
        debug!("Run {run_id}: fetched {} of {total} jobs", jobs.len());

        if fetched == 0 || jobs.len() >= total {
            break;
        }
        page += 1;
    }

    Ok(jobs)
}


#[cfg(test)]
mod tests {
    use super::stub::StubClient;
    use super::*;
    use serde_json::json;

    fn repo() -> Repository {
        Repository::new("owner", "repo")
    }

    #[test]
    fn test_repository_from_slug() {
        assert_eq!(
            Repository::from_slug("owner/repo"),
            Some(Repository::new("owner", "repo"))
        );
        assert_eq!(Repository::from_slug("invalid-path"), None);
        assert_eq!(Repository::from_slug("owner/repo/extra"), None);
        assert_eq!(Repository::from_slug("/repo"), None);
    }

    #[tokio::test]
    async fn test_fetch_jobs_follows_pages_in_order() {
        let client = StubClient::new()
            .with(
                "repos/owner/repo/actions/runs/7/jobs",
                json!({"total_count": 2, "jobs": [{"id": 1, "name": "first"}]}),
            )
            .with(
                "repos/owner/repo/actions/runs/7/jobs?page=2",
                json!({"total_count": 2, "jobs": [{"id": 2, "name": "second"}]}),
            );

        let jobs = fetch_jobs(&client, &repo(), 7).await.unwrap();

        let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_workflow_runs_sends_branch_and_page_size() {
        let client = StubClient::new().with(
            "repos/owner/repo/actions/workflows/build.yml/runs",
            json!({"workflow_runs": []}),
        );

        fetch_workflow_runs(&client, &repo(), "build.yml", 500, Some("main"))
            .await
            .unwrap();

        let pair = |k: &str, v: &str| (k.to_string(), v.to_string());
        assert_eq!(
            client.params(),
            vec![vec![pair("per_page", "100"), pair("branch", "main")]]
        );
    }

    #[tokio::test]
    async fn test_fetch_jobs_stops_on_empty_page() {
        let client = StubClient::new().with(
            "repos/owner/repo/actions/runs/7/jobs",
            json!({"total_count": 0, "jobs": []}),
        );

        let jobs = fetch_jobs(&client, &repo(), 7).await.unwrap();
        assert!(jobs.is_empty());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_parse_error() {
        let client = StubClient::new().with(
            "repos/owner/repo/actions/runs/7",
            json!({"id": 7, "status": "completed"}),
        );

        let err = fetch_run(&client, &repo(), 7).await.unwrap_err();
        match err {
            ExportError::Parse { endpoint, .. } => {
                assert_eq!(endpoint, "repos/owner/repo/actions/runs/7");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
