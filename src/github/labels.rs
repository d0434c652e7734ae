use std::sync::Arc;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde::Deserialize;

use crate::types::{CreateOutcome, IssueTypeInfo, IssueTypeSpec, LabelSpec, RepoLabel};

const PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Raw API response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawLabel {
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawLabel> for RepoLabel {
    fn from(raw: RawLabel) -> Self {
        RepoLabel {
            name: raw.name,
            color: raw.color,
            description: raw.description,
        }
    }
}

#[derive(Deserialize)]
struct RawIssueType {
    id: u64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// `true` for GitHub's 422 answer, which create endpoints return when the
/// name is already taken.
pub(crate) fn is_unprocessable(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code == http::StatusCode::UNPROCESSABLE_ENTITY
    )
}

// ---------------------------------------------------------------------------
// Repository labels
// ---------------------------------------------------------------------------

/// List every label of a repository, following pagination.
pub(crate) async fn list(octocrab: &Arc<Octocrab>, owner: &str, repo: &str) -> Result<Vec<RepoLabel>> {
    let mut labels = Vec::new();
    let mut page = 1u32;
    loop {
        let route = format!("/repos/{owner}/{repo}/labels?per_page={PAGE_SIZE}&page={page}");
        let batch: Vec<RawLabel> = octocrab
            .get(route, None::<&()>)
            .await
            .context("listing repository labels")?;
        let len = batch.len();
        labels.extend(batch.into_iter().map(RepoLabel::from));
        if len < PAGE_SIZE {
            break;
        }
        page += 1;
    }
    Ok(labels)
}

/// Create a repository label.
pub(crate) async fn create(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    label: &LabelSpec,
) -> Result<CreateOutcome> {
    let route = format!("/repos/{owner}/{repo}/labels");
    let payload = serde_json::json!({
        "name": label.name,
        "color": label.color,
        "description": label.description,
    });
    let response: Result<serde_json::Value, octocrab::Error> =
        octocrab.post(route, Some(&payload)).await;
    match response {
        Ok(_) => Ok(CreateOutcome::Created),
        Err(err) if is_unprocessable(&err) => {
            tracing::debug!(label = %label.name, "label already exists (422)");
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(err) => Err(err).with_context(|| format!("creating label \"{}\"", label.name)),
    }
}

/// Names of the labels attached to an issue or pull request.
pub(crate) async fn for_issue(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<String>> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}/labels?per_page={PAGE_SIZE}");
    let labels: Vec<RawLabel> = octocrab
        .get(route, None::<&()>)
        .await
        .context("listing issue labels")?;
    Ok(labels.into_iter().map(|l| l.name).collect())
}

/// Replace every label on an issue or pull request.
pub(crate) async fn set_for_issue(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
    labels: &[String],
) -> Result<()> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}/labels");
    let payload = serde_json::json!({ "labels": labels });
    let _: serde_json::Value = octocrab
        .put(route, Some(&payload))
        .await
        .context("setting issue labels")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Organization issue types
// ---------------------------------------------------------------------------

pub(crate) async fn list_issue_types(
    octocrab: &Arc<Octocrab>,
    org: &str,
) -> Result<Vec<IssueTypeInfo>> {
    let route = format!("/orgs/{org}/issue-types");
    let types: Vec<RawIssueType> = octocrab
        .get(route, None::<&()>)
        .await
        .context("listing organization issue types")?;
    Ok(types
        .into_iter()
        .map(|t| IssueTypeInfo {
            id: t.id,
            name: t.name,
            description: t.description,
            color: t.color,
        })
        .collect())
}

pub(crate) async fn create_issue_type(
    octocrab: &Arc<Octocrab>,
    org: &str,
    issue_type: &IssueTypeSpec,
) -> Result<CreateOutcome> {
    let route = format!("/orgs/{org}/issue-types");
    let payload = serde_json::json!({
        "name": issue_type.name,
        "is_enabled": true,
        "description": issue_type.description,
        "color": issue_type.color,
    });
    let response: Result<serde_json::Value, octocrab::Error> =
        octocrab.post(route, Some(&payload)).await;
    match response {
        Ok(_) => Ok(CreateOutcome::Created),
        Err(err) if is_unprocessable(&err) => {
            tracing::debug!(issue_type = %issue_type.name, "issue type already exists (422)");
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(err) => {
            Err(err).with_context(|| format!("creating issue type \"{}\"", issue_type.name))
        }
    }
}
