use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::config::{Config, SelectionMode};
use crate::error::ExportError;
use crate::github::GitHubClient;
use crate::output::{self, RunProgress};
use crate::pipeline::run_export;

#[derive(Parser)]
#[command(name = "gha-timings")]
#[command(
    author,
    version,
    about = "Export GitHub Actions run, job and step timings to CSV",
    long_about = None
)]
pub struct Cli {
    /// Repository owner
    #[arg(long, env = "OWNER")]
    owner: Option<String>,

    /// Repository name
    #[arg(long, env = "REPO")]
    repo: Option<String>,

    /// Repository as owner/repo, used when --owner or --repo is missing
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Workflow file name or id [default: build.yml]
    #[arg(short, long, env = "WORKFLOW")]
    workflow: Option<String>,

    /// Output directory for the CSV files [default: reports/actions_log]
    #[arg(short, long, env = "OUTDIR")]
    out_dir: Option<PathBuf>,

    /// Number of recent runs to discover [default: 50, max: 100]
    #[arg(short = 'n', long, env = "PER_PAGE")]
    per_page: Option<usize>,

    /// GitHub REST API base URL [default: https://api.github.com]
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// How runs are chosen [default: discover]
    #[arg(short, long, env = "SELECTION", value_enum)]
    selection: Option<SelectionMode>,

    /// Selection CSV for explicit mode [default: <out-dir>/selection.csv]
    #[arg(long, env = "SELECTION_CSV")]
    selection_csv: Option<PathBuf>,

    /// Only discover runs on this branch
    #[arg(short, long, env = "BRANCH")]
    branch: Option<String>,

    /// GitHub token; GITHUB_TOKEN is used when GH_TOKEN is unset
    #[arg(short, long, env = "GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "GHA_TIMINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

impl Cli {
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    fn overrides(&self) -> Config {
        Config {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            repository: self.repository.clone(),
            workflow: self.workflow.clone(),
            out_dir: self.out_dir.clone(),
            per_page: self.per_page,
            api_url: self.api_url.clone(),
            selection: self.selection,
            selection_csv: self.selection_csv.clone(),
            branch: self.branch.clone(),
            token: self
                .token
                .clone()
                .or_else(|| std::env::var("GITHUB_TOKEN").ok()),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let file = Config::load(self.config.as_deref())
            .map_err(|e| ExportError::Config(format!("{e:#}")))?;
        let config = file.merge(self.overrides()).resolve()?;

        info!(
            "Exporting timings for {} (workflow: {}, authenticated: {})",
            config.repository,
            config.workflow,
            config.token.is_some()
        );

        let client = GitHubClient::new(&config.api_url, config.token.as_ref())?;
        let progress = if self.quiet {
            RunProgress::hidden()
        } else {
            RunProgress::new()
        };

        let summary = run_export(&client, &config, &progress)
            .await
            .with_context(|| format!("Export for {} failed", config.repository))?;

        if !self.quiet {
            output::print_summary(&summary);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "gha-timings",
            "--owner",
            "octo",
            "--repo",
            "bench",
            "--selection",
            "explicit",
            "--per-page",
            "20",
            "--token",
            "ghp_cli",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.owner.as_deref(), Some("octo"));
        assert_eq!(overrides.selection, Some(SelectionMode::Explicit));
        assert_eq!(overrides.per_page, Some(20));
        assert_eq!(overrides.token.as_deref(), Some("ghp_cli"));
    }

    #[test]
    fn test_unknown_selection_is_rejected() {
        let result = Cli::try_parse_from(["gha-timings", "--selection", "latest"]);
        assert!(result.is_err());
    }
}
