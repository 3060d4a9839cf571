use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::error::ExportError;
use crate::github::{Repository, MAX_PER_PAGE};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WORKFLOW: &str = "build.yml";
pub const DEFAULT_OUT_DIR: &str = "reports/actions_log";
pub const DEFAULT_PER_PAGE: usize = 50;
pub const SELECTION_FILE: &str = "selection.csv";

/// How the set of runs to export is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Run ids listed in a selection CSV
    Explicit,
    /// Most recent runs of the workflow
    #[default]
    Discover,
}

/// Export settings as read from a config file or the command line.
///
/// Every field is optional so layers can be stacked: command line and
/// environment over config file over built-in defaults. `resolve` turns the
/// merged result into an `ExportConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Repository owner (user or organization)
    pub owner: Option<String>,

    /// Repository name
    pub repo: Option<String>,

    /// `owner/repo` slug, used when owner or repo is not set
    pub repository: Option<String>,

    /// Workflow file name or id
    pub workflow: Option<String>,

    /// Directory receiving the CSV files
    pub out_dir: Option<PathBuf>,

    /// Number of runs requested in discovery mode
    pub per_page: Option<usize>,

    /// REST API base URL
    pub api_url: Option<String>,

    /// Run selection policy
    pub selection: Option<SelectionMode>,

    /// Selection CSV for explicit mode
    pub selection_csv: Option<PathBuf>,

    /// Branch filter for discovery mode
    pub branch: Option<String>,

    /// GitHub token
    pub token: Option<String>,
}

/// Fully resolved configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub repository: Repository,
    pub workflow: String,
    pub out_dir: PathBuf,
    pub per_page: usize,
    pub api_url: String,
    pub selection: Selection,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Explicit { csv: PathBuf },
    Discover { branch: Option<String> },
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./gha-timings.toml
    /// 3. ./gha-timings.json
    /// 4. ./gha-timings.yaml
    /// 5. ./gha-timings.yml
    ///
    /// Returns an empty configuration if no file is found. A path given
    /// explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "gha-timings.toml",
            "gha-timings.json",
            "gha-timings.yaml",
            "gha-timings.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Config) -> Config {
        Config {
            owner: other.owner.or(self.owner),
            repo: other.repo.or(self.repo),
            repository: other.repository.or(self.repository),
            workflow: other.workflow.or(self.workflow),
            out_dir: other.out_dir.or(self.out_dir),
            per_page: other.per_page.or(self.per_page),
            api_url: other.api_url.or(self.api_url),
            selection: other.selection.or(self.selection),
            selection_csv: other.selection_csv.or(self.selection_csv),
            branch: other.branch.or(self.branch),
            token: other.token.or(self.token),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> crate::error::Result<ExportConfig> {
        let slug = match self.repository.as_deref() {
            Some(slug) => Some(Repository::from_slug(slug).ok_or_else(|| {
                ExportError::Config(format!(
                    "Repository must be in format 'owner/repo', got '{slug}'"
                ))
            })?),
            None => None,
        };

        let owner = non_empty(self.owner)
            .or_else(|| slug.as_ref().map(|r| r.owner.clone()))
            .ok_or_else(|| ExportError::Config("Repository owner is not set".into()))?;
        let name = non_empty(self.repo)
            .or_else(|| slug.as_ref().map(|r| r.name.clone()))
            .ok_or_else(|| ExportError::Config("Repository name is not set".into()))?;

        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 {
            return Err(ExportError::Config("per-page must be at least 1".into()));
        }

        let out_dir = self
            .out_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

        let selection = match self.selection.unwrap_or_default() {
            SelectionMode::Explicit => Selection::Explicit {
                csv: self
                    .selection_csv
                    .unwrap_or_else(|| out_dir.join(SELECTION_FILE)),
            },
            SelectionMode::Discover => Selection::Discover {
                branch: non_empty(self.branch),
            },
        };

        Ok(ExportConfig {
            repository: Repository::new(owner, name),
            workflow: non_empty(self.workflow).unwrap_or_else(|| DEFAULT_WORKFLOW.to_owned()),
            out_dir,
            per_page: per_page.min(MAX_PER_PAGE),
            api_url: non_empty(self.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            selection,
            token: non_empty(self.token).map(Token::from),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
