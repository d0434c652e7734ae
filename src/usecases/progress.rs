use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use crate::github::GitHubApi;
use crate::types::RepoRef;

static PROGRESS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+%$").expect("valid progress-label regex"));

/// `true` for labels of the `N%` progress ladder.
pub fn is_progress_label(name: &str) -> bool {
    PROGRESS_LABEL.is_match(name)
}

/// Replace any progress label on `number` with `{percent}%`.
///
/// The full label set is written in one call; concurrent writers race and the
/// last one wins.
pub async fn set_progress_label(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    number: u64,
    percent: u8,
) -> Result<()> {
    if percent > 100 {
        bail!("progress {percent}% is above 100%");
    }

    let mut labels: Vec<String> = api
        .get_issue_labels(repo, number)
        .await?
        .into_iter()
        .filter(|l| !is_progress_label(l))
        .collect();
    labels.push(format!("{percent}%"));

    tracing::debug!(number, percent, "writing progress label");
    api.set_issue_labels(repo, number, &labels).await
}
