//! `setup`: prepare a repository for the bot.
//!
//! Stages run in a fixed order. Only the token check aborts the run; every
//! other stage records its errors and lets the next one proceed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::github::auth::validate_token;
use crate::github::rate_limit::describe_error;
use crate::types::{ActionResult, Execution};

use super::UseCase;
use super::ensure::{EnsureSummary, ensure_issue_types, ensure_labels, ensure_progress_labels};

/// Directories created under the repository root.
const DIRECTORIES: [&str; 3] = [".github", ".github/workflows", ".github/ISSUE_TEMPLATE"];

/// Files shipped inside the binary, keyed by their path below the root.
const BUNDLED: [(&str, &str); 6] = [
    (
        ".github/workflows/board-flow-issue.yml",
        include_str!("../../templates/workflows/board-flow-issue.yml"),
    ),
    (
        ".github/workflows/board-flow-pull-request.yml",
        include_str!("../../templates/workflows/board-flow-pull-request.yml"),
    ),
    (
        ".github/ISSUE_TEMPLATE/bug_report.md",
        include_str!("../../templates/ISSUE_TEMPLATE/bug_report.md"),
    ),
    (
        ".github/ISSUE_TEMPLATE/feature_request.md",
        include_str!("../../templates/ISSUE_TEMPLATE/feature_request.md"),
    ),
    (
        ".github/ISSUE_TEMPLATE/question.md",
        include_str!("../../templates/ISSUE_TEMPLATE/question.md"),
    ),
    (
        ".github/pull_request_template.md",
        include_str!("../../templates/pull_request_template.md"),
    ),
];

/// Counts reported by the template copy stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub copied: usize,
    pub skipped: usize,
}

/// Write every bundled template below `root`, leaving existing files alone.
///
/// Per-file failures are pushed onto `errors`.
pub fn copy_templates(root: &Path, errors: &mut Vec<String>) -> CopySummary {
    let mut summary = CopySummary::default();
    for (relative, content) in BUNDLED {
        let path = root.join(relative);
        match write_if_absent(&path, content) {
            Ok(true) => {
                tracing::info!(path = %path.display(), "template copied");
                summary.copied += 1;
            }
            Ok(false) => {
                tracing::debug!(path = %path.display(), "template exists, skipped");
                summary.skipped += 1;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "could not copy template: {err}");
                errors.push(format!("copying {relative}: {err}"));
            }
        }
    }
    summary
}

/// `Ok(false)` when the file already exists.
fn write_if_absent(path: &Path, content: &str) -> io::Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(content.as_bytes())?;
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}

fn record(what: &str, summary: EnsureSummary, steps: &mut Vec<String>, errors: &mut Vec<String>) {
    steps.push(format!(
        "{what}: {} created, {} already present.",
        summary.created, summary.existing
    ));
    errors.extend(summary.errors);
}

pub struct InitialSetup<'a> {
    api: &'a dyn GitHubApi,
    root: PathBuf,
}

impl<'a> InitialSetup<'a> {
    /// `root` is the working copy the `.github` tree is written into.
    pub fn new(api: &'a dyn GitHubApi, root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            root: root.into(),
        }
    }

    /// Check the token can reach the API and read the repository.
    ///
    /// Returns whether the owner is an organization, when that could be
    /// determined.
    async fn verify_access(
        &self,
        execution: &Execution,
        steps: &mut Vec<String>,
        errors: &mut Vec<String>,
    ) -> Option<bool> {
        match self.api.authenticated_login().await {
            Ok(login) => steps.push(format!("Authenticated as {login}.")),
            Err(err) => errors.push(format!("authentication: {}", describe_error(&err))),
        }
        match self.api.repository_full_name(&execution.repo).await {
            Ok(name) => steps.push(format!("Repository {name} is reachable.")),
            Err(err) => errors.push(format!("repository access: {}", describe_error(&err))),
        }
        match self.api.is_organization(&execution.repo.owner).await {
            Ok(is_org) => Some(is_org),
            Err(err) => {
                errors.push(format!("owner lookup: {}", describe_error(&err)));
                None
            }
        }
    }
}

#[async_trait]
impl UseCase for InitialSetup<'_> {
    fn id(&self) -> &'static str {
        "initial-setup"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let mut steps = Vec::new();
        let mut errors = Vec::new();

        tracing::info!(root = %self.root.display(), "preparing .github tree");
        for dir in DIRECTORIES {
            if let Err(err) = fs::create_dir_all(self.root.join(dir)) {
                errors.push(format!("creating {dir}: {err}"));
            }
        }

        let copied = copy_templates(&self.root, &mut errors);
        steps.push(format!(
            "Templates: {} copied, {} already present.",
            copied.copied, copied.skipped
        ));

        if let Err(err) = validate_token(Some(execution.token.as_str())) {
            tracing::error!("setup aborted: {err}");
            return vec![ActionResult::failure(self.id(), steps, vec![err.to_string()])];
        }

        let is_org = self.verify_access(execution, &mut steps, &mut errors).await;

        tracing::info!(repo = %execution.repo, "ensuring labels");
        let specs = execution.labels.config().specs();
        let summary = ensure_labels(self.api, &execution.repo, &specs).await;
        record("Labels", summary, &mut steps, &mut errors);

        let summary = ensure_progress_labels(self.api, &execution.repo).await;
        record("Progress labels", summary, &mut steps, &mut errors);

        match is_org {
            Some(true) => {
                tracing::info!(org = %execution.repo.owner, "ensuring issue types");
                let specs = execution.issue_types.config().specs();
                let summary = ensure_issue_types(self.api, &execution.repo.owner, &specs).await;
                record("Issue types", summary, &mut steps, &mut errors);
            }
            Some(false) => steps.push(
                "Issue types skipped: the repository is not owned by an organization.".to_owned(),
            ),
            None => steps.push("Issue types skipped: owner kind unknown.".to_owned()),
        }

        if errors.is_empty() {
            vec![ActionResult::success(self.id(), steps)]
        } else {
            vec![ActionResult::failure(self.id(), steps, errors)]
        }
    }
}
