//! Label and issue-type reconciliation.
//!
//! Each `ensure_*` call compares one desired entry against the live list and
//! creates it only when no case-insensitive match exists. Batch variants run
//! entries one after another and keep going past individual failures.

use anyhow::Result;
use serde::Serialize;

use crate::color::LabelColor;
use crate::github::GitHubApi;
use crate::github::rate_limit::describe_error;
use crate::types::{CreateOutcome, IssueTypeSpec, LabelSpec, RepoRef};

/// Step between two progress labels, in percent.
pub const PROGRESS_STEP: u8 = 5;

/// Result of reconciling a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EnsureOutcome {
    pub created: bool,
    pub existed: bool,
}

impl EnsureOutcome {
    const NOOP: Self = Self {
        created: false,
        existed: false,
    };
    const CREATED: Self = Self {
        created: true,
        existed: false,
    };
    const EXISTED: Self = Self {
        created: false,
        existed: true,
    };

    fn from_create(outcome: CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::Created => Self::CREATED,
            CreateOutcome::AlreadyExists => Self::EXISTED,
        }
    }
}

/// Accumulated result of a batch reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnsureSummary {
    pub created: usize,
    pub existing: usize,
    pub errors: Vec<String>,
}

impl EnsureSummary {
    fn record(&mut self, outcome: EnsureOutcome) {
        if outcome.created {
            self.created += 1;
        } else if outcome.existed {
            self.existing += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Make sure `label` exists in the repository.
///
/// Whitespace-only names are a no-op and never reach the API.
pub async fn ensure_label(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    label: &LabelSpec,
) -> Result<EnsureOutcome> {
    let name = label.name.trim();
    if name.is_empty() {
        return Ok(EnsureOutcome::NOOP);
    }

    let existing = api.list_labels(repo).await?;
    if existing.iter().any(|l| l.name.eq_ignore_ascii_case(name)) {
        tracing::debug!(label = name, "label exists");
        return Ok(EnsureOutcome::EXISTED);
    }

    let spec = LabelSpec::new(name, &label.color, &label.description);
    let outcome = EnsureOutcome::from_create(api.create_label(repo, &spec).await?);
    if outcome.created {
        tracing::info!(label = name, "created label");
    }
    Ok(outcome)
}

/// Ensure every label in `labels`, in order, collecting errors.
pub async fn ensure_labels(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    labels: &[LabelSpec],
) -> EnsureSummary {
    let mut summary = EnsureSummary::default();
    for label in labels {
        match ensure_label(api, repo, label).await {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                tracing::warn!(label = %label.name, "could not ensure label: {err:#}");
                summary
                    .errors
                    .push(format!("label \"{}\": {}", label.name, describe_error(&err)));
            }
        }
    }
    summary
}

/// The `0%` … `100%` ladder in steps of [`PROGRESS_STEP`].
pub fn progress_label_specs() -> Vec<LabelSpec> {
    (0..=100u8)
        .step_by(usize::from(PROGRESS_STEP))
        .map(|pct| {
            LabelSpec::new(
                format!("{pct}%"),
                LabelColor::progress_gradient(pct).to_string(),
                format!("Progress: {pct}%"),
            )
        })
        .collect()
}

/// Ensure the whole `0%`..`100%` progress ladder exists.
pub async fn ensure_progress_labels(api: &dyn GitHubApi, repo: &RepoRef) -> EnsureSummary {
    ensure_labels(api, repo, &progress_label_specs()).await
}

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

/// Make sure the organization `org` defines `issue_type`.
pub async fn ensure_issue_type(
    api: &dyn GitHubApi,
    org: &str,
    issue_type: &IssueTypeSpec,
) -> Result<EnsureOutcome> {
    let name = issue_type.name.trim();
    if name.is_empty() {
        return Ok(EnsureOutcome::NOOP);
    }

    let existing = api.list_issue_types(org).await?;
    if existing.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
        tracing::debug!(issue_type = name, "issue type exists");
        return Ok(EnsureOutcome::EXISTED);
    }

    let spec = IssueTypeSpec::new(name, &issue_type.color, &issue_type.description);
    let outcome = EnsureOutcome::from_create(api.create_issue_type(org, &spec).await?);
    if outcome.created {
        tracing::info!(issue_type = name, "created issue type");
    }
    Ok(outcome)
}

/// Ensure each of `issue_types` in turn; one failure does not stop the rest.
pub async fn ensure_issue_types(
    api: &dyn GitHubApi,
    org: &str,
    issue_types: &[IssueTypeSpec],
) -> EnsureSummary {
    let mut summary = EnsureSummary::default();
    for issue_type in issue_types {
        match ensure_issue_type(api, org, issue_type).await {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                tracing::warn!(issue_type = %issue_type.name, "could not ensure issue type: {err:#}");
                summary.errors.push(format!(
                    "issue type \"{}\": {}",
                    issue_type.name,
                    describe_error(&err)
                ));
            }
        }
    }
    summary
}
