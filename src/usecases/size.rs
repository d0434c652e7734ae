use anyhow::Result;
use async_trait::async_trait;

use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution, PullRequestContext, SizeTier};

use super::UseCase;

/// Label a pull request with its size tier, computed from changed lines.
pub struct CheckSizePullRequest<'a> {
    api: &'a dyn GitHubApi,
}

impl<'a> CheckSizePullRequest<'a> {
    pub fn new(api: &'a dyn GitHubApi) -> Self {
        Self { api }
    }

    async fn apply(
        &self,
        execution: &Execution,
        pr: &PullRequestContext,
        tier: SizeTier,
    ) -> Result<bool> {
        let wanted = execution.labels.size_label(tier).to_owned();
        let current = self
            .api
            .get_issue_labels(&execution.repo, pr.number)
            .await?;

        let already = current
            .iter()
            .filter(|l| execution.labels.is_size_label(l))
            .collect::<Vec<_>>();
        if already.len() == 1 && already[0].eq_ignore_ascii_case(&wanted) {
            return Ok(false);
        }

        let mut labels: Vec<String> = current
            .into_iter()
            .filter(|l| !execution.labels.is_size_label(l))
            .collect();
        labels.push(wanted);
        self.api
            .set_issue_labels(&execution.repo, pr.number, &labels)
            .await?;
        Ok(true)
    }
}

#[async_trait]
impl UseCase for CheckSizePullRequest<'_> {
    fn id(&self) -> &'static str {
        "check-size-pull-request"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(pr) = &execution.pull_request else {
            return vec![ActionResult::skipped_with(self.id(), "No pull request to size.")];
        };

        let changed = pr.additions + pr.deletions;
        let tier = execution.size.tier_for(changed);
        let label = execution.labels.size_label(tier);

        match self.apply(execution, pr, tier).await {
            Ok(true) => {
                tracing::info!(number = pr.number, changed, label, "size label set");
                vec![ActionResult::success(
                    self.id(),
                    vec![format!(
                        "Labeled #{} as `{label}` ({changed} changed lines).",
                        pr.number
                    )],
                )]
            }
            Ok(false) => vec![ActionResult::skipped(self.id())],
            Err(err) => {
                tracing::warn!(number = pr.number, "size labeling failed: {err:#}");
                vec![ActionResult::failure(
                    self.id(),
                    vec![format!(
                        "Tried to label the size of #{}, but there was a problem.",
                        pr.number
                    )],
                    vec![format!("{err:#}")],
                )]
            }
        }
    }
}
