use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution};

use super::title::{FailureFlag, update_title_issue_format, update_title_pull_request_format};
use super::{
    AssignIssueType, CheckPriorityIssueSize, CheckPriorityPullRequestSize, CheckSizePullRequest,
    MoveIssueToInProgress, MovePullRequestToInReview, UseCase,
};

const TITLE_ID: &str = "update-title";

/// Turn the outcome of a title update into a result.
///
/// `errors` holds the reasons the flag picked up during the update.
fn title_result(new_title: Option<String>, errors: Vec<String>) -> ActionResult {
    match new_title {
        Some(title) => ActionResult::success(TITLE_ID, vec![format!("Title set to \"{title}\".")]),
        None if !errors.is_empty() => ActionResult::failure(
            TITLE_ID,
            vec!["Tried to update the title, but there was a problem.".to_owned()],
            errors,
        ),
        None => ActionResult::skipped(TITLE_ID),
    }
}

/// Reasons recorded on `flag` after the first `seen`.
fn new_reasons(flag: &FailureFlag, seen: usize) -> Vec<String> {
    flag.reasons().into_iter().skip(seen).collect()
}

/// Everything that runs when an issue is opened or edited.
pub struct IssuePipeline<'a> {
    api: &'a dyn GitHubApi,
    flag: &'a FailureFlag,
}

impl<'a> IssuePipeline<'a> {
    pub fn new(api: &'a dyn GitHubApi, flag: &'a FailureFlag) -> Self {
        Self { api, flag }
    }
}

#[async_trait]
impl UseCase for IssuePipeline<'_> {
    fn id(&self) -> &'static str {
        "issue"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let mut results = Vec::new();

        let seen = self.flag.reasons().len();
        let title = update_title_issue_format(self.api, execution, self.flag).await;
        results.push(title_result(title, new_reasons(self.flag, seen)));

        results.extend(AssignIssueType::new(self.api).invoke(execution).await);
        results.extend(CheckPriorityIssueSize::new(self.api).invoke(execution).await);

        if execution.labels.is_in_progress() || execution.labels.is_branched() {
            results.extend(MoveIssueToInProgress::new(self.api).invoke(execution).await);
        }
        results
    }
}

/// Everything that runs when a pull request is opened or updated.
pub struct PullRequestPipeline<'a> {
    api: &'a dyn GitHubApi,
    flag: &'a FailureFlag,
}

impl<'a> PullRequestPipeline<'a> {
    pub fn new(api: &'a dyn GitHubApi, flag: &'a FailureFlag) -> Self {
        Self { api, flag }
    }
}

#[async_trait]
impl UseCase for PullRequestPipeline<'_> {
    fn id(&self) -> &'static str {
        "pull-request"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let mut results = Vec::new();

        let seen = self.flag.reasons().len();
        let title = update_title_pull_request_format(self.api, execution, self.flag).await;
        results.push(title_result(title, new_reasons(self.flag, seen)));

        results.extend(
            CheckPriorityPullRequestSize::new(self.api)
                .invoke(execution)
                .await,
        );
        results.extend(CheckSizePullRequest::new(self.api).invoke(execution).await);
        results.extend(
            MovePullRequestToInReview::new(self.api)
                .invoke(execution)
                .await,
        );
        results
    }
}
