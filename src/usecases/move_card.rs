use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution};

use super::UseCase;

/// Move the issue's card to the "in progress" column of every linked board.
///
/// A board where the card already sits in that column produces no result, so
/// callers must not expect one result per board.
pub struct MoveIssueToInProgress<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> MoveIssueToInProgress<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UseCase for MoveIssueToInProgress<'_> {
    fn id(&self) -> &'static str {
        "move-issue-to-in-progress"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(issue) = &execution.issue else {
            return vec![ActionResult::skipped_with(self.id(), "No issue to move.")];
        };
        move_everywhere(
            self.api,
            self.id(),
            execution,
            &issue.node_id,
            &execution.project_settings.in_progress_column,
            &format!("issue #{}", issue.number),
        )
        .await
    }
}

/// Move the pull request's card to the "in review" column of every linked
/// board. Same result contract as [`MoveIssueToInProgress`].
pub struct MovePullRequestToInReview<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> MovePullRequestToInReview<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UseCase for MovePullRequestToInReview<'_> {
    fn id(&self) -> &'static str {
        "move-pull-request-to-in-review"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(pr) = &execution.pull_request else {
            return vec![ActionResult::skipped_with(self.id(), "No pull request to move.")];
        };
        move_everywhere(
            self.api,
            self.id(),
            execution,
            &pr.node_id,
            &execution.project_settings.in_review_column,
            &format!("pull request #{}", pr.number),
        )
        .await
    }
}

async fn move_everywhere(
    api: &dyn GitHubApi,
    id: &'static str,
    execution: &Execution,
    content_id: &str,
    column: &str,
    what: &str,
) -> Vec<ActionResult> {
    let status_field = &execution.project_settings.status_field;
    let mut results = Vec::new();
    for project in &execution.projects {
        match api
            .move_to_column(project, content_id, status_field, column)
            .await
        {
            Ok(true) => {
                tracing::info!(project = %project.title, column, "card moved");
                results.push(ActionResult::success(
                    id,
                    vec![format!(
                        "Moved {what} to `{column}` in [{}]({}).",
                        project.title,
                        project.public_url()
                    )],
                ));
            }
            Ok(false) => {
                tracing::debug!(project = %project.title, column, "card already in column");
            }
            Err(err) => {
                tracing::warn!(project = %project.title, "could not move card: {err:#}");
                results.push(ActionResult::failure(
                    id,
                    vec![format!(
                        "Tried to move {what} to `{column}` in [{}]({}), but there was a problem.",
                        project.title,
                        project.public_url()
                    )],
                    vec![format!("{err:#}")],
                ));
            }
        }
    }
    results
}
