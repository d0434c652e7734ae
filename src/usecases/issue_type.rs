use anyhow::Result;
use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution, IssueContext};

use super::UseCase;

/// Set the organization issue type that matches the issue's labels.
pub struct AssignIssueType<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> AssignIssueType<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }

    async fn apply(&self, execution: &Execution, issue: &IssueContext, desired: &str) -> Result<bool> {
        // Re-read: the context may predate an earlier step of the pipeline.
        let live = self.api.get_issue(&execution.repo, issue.number).await?;
        if live
            .issue_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(desired))
        {
            return Ok(false);
        }
        self.api
            .set_issue_type(&execution.repo, issue.number, desired)
            .await?;
        Ok(true)
    }
}

#[async_trait]
impl UseCase for AssignIssueType<'_> {
    fn id(&self) -> &'static str {
        "assign-issue-type"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(issue) = &execution.issue else {
            return vec![ActionResult::skipped_with(self.id(), "No issue to type.")];
        };
        if !execution.owner_is_organization {
            return vec![ActionResult::skipped_with(
                self.id(),
                "Issue types are only available to organizations.",
            )];
        }

        let desired = execution.issue_types.desired_for(&execution.labels);
        match self.apply(execution, issue, desired).await {
            Ok(true) => {
                tracing::info!(number = issue.number, issue_type = desired, "issue type set");
                vec![ActionResult::success(
                    self.id(),
                    vec![format!("Set the type of #{} to `{desired}`.", issue.number)],
                )]
            }
            Ok(false) => vec![ActionResult::skipped(self.id())],
            Err(err) => {
                tracing::warn!(number = issue.number, "could not set issue type: {err:#}");
                vec![ActionResult::failure(
                    self.id(),
                    vec![format!(
                        "Tried to set the type of #{} to `{desired}`, but there was a problem.",
                        issue.number
                    )],
                    vec![format!("{err:#}")],
                )]
            }
        }
    }
}
