use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use log::{debug, info};

use crate::config::{ExportConfig, Selection};
use crate::error::{ExportError, Result};
use crate::github::{self, ApiClient};

/// Resolve the run ids to export, in processing order.
///
/// Explicit selection only touches the local file, so a bad selection fails
/// before any request is made. Discovery returns the workflow's most recent
/// runs, newest first.
pub async fn select_runs(client: &impl ApiClient, config: &ExportConfig) -> Result<Vec<u64>> {
    match &config.selection {
        Selection::Explicit { csv } => read_selection(csv),
        Selection::Discover { branch } => {
            discover_runs(
                client,
                &config.repository,
                &config.workflow,
                config.per_page,
                branch.as_deref(),
            )
            .await
        }
    }
}

/// Read run ids from the first column of a selection CSV.
///
/// The first record is a header. Blank ids are skipped, duplicates keep their
/// first position. An absent file or one without any id is an error.
pub fn read_selection(path: &Path) -> Result<Vec<u64>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!(
            "Cannot read selection file {}: {e}",
            path.display()
        ))
    })?;

    let ids = parse_selection(&contents)
        .map_err(|e| ExportError::Config(format!("{}: {e}", path.display())))?;

    if ids.is_empty() {
        return Err(ExportError::Config(format!(
            "No run ids found in selection file {}",
            path.display()
        )));
    }

    info!(
        "Selected {} runs from {}",
        ids.len(),
        path.display()
    );
    Ok(ids.into_iter().collect())
}

fn parse_selection(contents: &str) -> std::result::Result<IndexSet<u64>, String> {
    let mut ids = IndexSet::new();

    for (line, value) in first_fields(contents).into_iter().skip(1) {
        if value.is_empty() {
            continue;
        }

        let id = value
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| format!("line {line}: '{value}' is not a run id"))?;

        if !ids.insert(id) {
            debug!("Ignoring duplicate run id {id}");
        }
    }

    Ok(ids)
}

/// First field of every CSV record, with the line the record starts on.
///
/// Records are split on newlines outside quotes, so a quoted field in any
/// column may span lines. Quotes are removed, `""` inside quotes becomes
/// `"`, carriage returns are dropped and the value is trimmed.
fn first_fields(contents: &str) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut field = String::new();
    let mut column = 0usize;
    let mut in_quotes = false;
    let mut pending = false;
    let mut line = 1usize;
    let mut start_line = 1usize;

    let mut chars = contents.chars().peekable();
    while let Some(c) = chars.next() {
        pending = true;
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    if column == 0 {
                        field.push('"');
                    }
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            '\r' => {}
            '\n' if in_quotes => {
                line += 1;
                if column == 0 {
                    field.push('\n');
                }
            }
            '\n' => {
                records.push((start_line, field.trim().to_owned()));
                field.clear();
                column = 0;
                pending = false;
                line += 1;
                start_line = line;
            }
            ',' if !in_quotes => column += 1,
            _ if column == 0 => field.push(c),
            _ => {}
        }
    }

    if pending {
        records.push((start_line, field.trim().to_owned()));
    }
    records
}

async fn discover_runs(
    client: &impl ApiClient,
    repo: &github::Repository,
    workflow: &str,
    per_page: usize,
    branch: Option<&str>,
) -> Result<Vec<u64>> {
    let mut runs = github::fetch_workflow_runs(client, repo, workflow, per_page, branch).await?;
    runs.sort_by(|a, b| b.run_number.cmp(&a.run_number).then(b.id.cmp(&a.id)));

    info!(
        "Discovered {} runs of {workflow} in {repo}",
        runs.len()
    );

    let ids: IndexSet<u64> = runs.into_iter().map(|run| run.id).collect();
    Ok(ids.into_iter().collect())
}
