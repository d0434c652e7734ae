use anyhow::Result;
use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution, Priority};

use super::UseCase;

/// Mirror the issue's priority label into every linked project board.
pub struct CheckPriorityIssueSize<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> CheckPriorityIssueSize<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UseCase for CheckPriorityIssueSize<'_> {
    fn id(&self) -> &'static str {
        "check-priority-issue-size"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(issue) = &execution.issue else {
            return vec![ActionResult::skipped_with(self.id(), "No issue to prioritize.")];
        };
        run(self.api, self.id(), execution, &issue.node_id, "issue").await
    }
}

/// Mirror the pull request's priority label into every linked project board.
pub struct CheckPriorityPullRequestSize<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> CheckPriorityPullRequestSize<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UseCase for CheckPriorityPullRequestSize<'_> {
    fn id(&self) -> &'static str {
        "check-priority-pull-request-size"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(pr) = &execution.pull_request else {
            return vec![ActionResult::skipped_with(
                self.id(),
                "No pull request to prioritize.",
            )];
        };
        run(self.api, self.id(), execution, &pr.node_id, "pull request").await
    }
}

async fn run(
    api: &dyn GitHubApi,
    id: &'static str,
    execution: &Execution,
    content_id: &str,
    noun: &str,
) -> Vec<ActionResult> {
    let priority = match execution.labels.priority() {
        Some(p)
            if execution.priority_label_on_issue_processable()
                && !execution.projects.is_empty() =>
        {
            p
        }
        _ => return vec![ActionResult::skipped(id)],
    };

    match apply(api, id, execution, content_id, priority).await {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!(id, "priority update failed: {err:#}");
            vec![ActionResult::failure(
                id,
                vec![format!(
                    "Tried to set the priority of the {noun}, but there was a problem."
                )],
                vec![format!("{err:#}")],
            )]
        }
    }
}

async fn apply(
    api: &dyn GitHubApi,
    id: &'static str,
    execution: &Execution,
    content_id: &str,
    priority: Priority,
) -> Result<Vec<ActionResult>> {
    let field = &execution.project_settings.priority_field;
    let mut results = Vec::new();
    for project in &execution.projects {
        if api
            .set_task_priority(project, content_id, field, priority)
            .await?
        {
            tracing::info!(project = %project.title, %priority, "priority set");
            results.push(ActionResult::success(
                id,
                vec![format!(
                    "Priority set to {priority} in [{}]({}).",
                    project.title,
                    project.public_url()
                )],
            ));
        }
    }
    Ok(results)
}
