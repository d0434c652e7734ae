//! Title decoration for issues and pull requests.
//!
//! A formatted title reads `[#N] {branched}{emoji} - {title}`, where the
//! linked-issue part only applies to pull requests and every part is
//! optional. Formatting first strips whatever prefix an earlier run applied,
//! so running it twice is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;

use crate::config::types::EmojiConfig;
use crate::github::GitHubApi;
use crate::types::{Category, Execution, Labels, RepoRef};
use crate::util::expand_emoji;

static ISSUE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[#\d+\]\s*").expect("valid issue-prefix regex"));
// Only emoji glyphs (with their joiners, selectors and modifiers) or raw
// shortcodes count as a prefix; other symbols are part of the user's title.
static EMOJI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\p{Extended_Pictographic}|\p{Regional_Indicator}|\p{Emoji_Modifier}|[\u{200D}\u{FE0F}\u{20E3}]|:[a-z0-9_+\-]+:)+ - ",
    )
    .expect("valid emoji-prefix regex")
});

/// Set when a best-effort operation failed, so the process can still exit
/// non-zero after reporting everything else.
#[derive(Debug, Default)]
pub struct FailureFlag {
    failed: AtomicBool,
    reasons: Mutex<Vec<String>>,
}

impl FailureFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.failed.store(true, Ordering::Relaxed);
    }

    /// Set the flag and keep `reason` for reporting.
    pub fn fail(&self, reason: impl Into<String>) {
        self.reasons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reason.into());
        self.set();
    }

    pub fn is_set(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// Every reason recorded so far, oldest first.
    pub fn reasons(&self) -> Vec<String> {
        self.reasons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Remove a previously applied `[#N] ` and emoji prefix.
pub fn strip_prefix(title: &str) -> &str {
    let title = title.trim_start();
    let rest = ISSUE_PREFIX
        .find(title)
        .map_or(title, |m| &title[m.end()..]);
    EMOJI_PREFIX.find(rest).map_or(rest, |m| &rest[m.end()..])
}

fn category_shortcode(emoji: &EmojiConfig, category: Category) -> &str {
    match category {
        Category::Hotfix => &emoji.hotfix,
        Category::Release => &emoji.release,
        Category::Docs => &emoji.docs,
        Category::Chore => &emoji.chore,
        Category::Bugfix => &emoji.bugfix,
        Category::Feature => &emoji.feature,
        Category::Help => &emoji.help,
        Category::Question => &emoji.question,
    }
}

/// Build the decorated title for `base` given the current labels.
pub fn format_title(
    base: &str,
    labels: &Labels,
    emoji: &EmojiConfig,
    branched: bool,
    linked_issue: Option<u64>,
) -> String {
    let base = strip_prefix(base).trim();
    let mut title = String::new();

    if emoji.linked_issue_prefix
        && let Some(n) = linked_issue
    {
        title = format!("[#{n}] ");
    }

    if emoji.enabled {
        let mut glyphs = String::new();
        if branched {
            glyphs.push_str(&expand_emoji(&emoji.branched));
        }
        if let Some(category) = labels.primary_category() {
            glyphs.push_str(&expand_emoji(category_shortcode(emoji, category)));
        }
        if !glyphs.is_empty() {
            title.push_str(&glyphs);
            title.push_str(" - ");
        }
    }

    title.push_str(base);
    title
}

async fn write_title(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    number: u64,
    current: &str,
    desired: String,
    flag: &FailureFlag,
) -> Option<String> {
    if desired == current {
        tracing::debug!(number, "title already formatted");
        return None;
    }
    match api.update_issue_title(repo, number, &desired).await {
        Ok(()) => {
            tracing::info!(number, title = %desired, "title updated");
            Some(desired)
        }
        Err(err) => {
            tracing::error!(number, "could not update title: {err:#}");
            flag.fail(format!("updating the title of #{number}: {err:#}"));
            None
        }
    }
}

/// Decorate the issue title; returns the new title when one was written.
///
/// A failed write sets `flag` and yields `None` instead of an error.
pub async fn update_title_issue_format(
    api: &dyn GitHubApi,
    execution: &Execution,
    flag: &FailureFlag,
) -> Option<String> {
    let issue = execution.issue.as_ref()?;
    let desired = format_title(
        &issue.title,
        &execution.labels,
        &execution.emoji,
        execution.labels.is_branched(),
        None,
    );
    write_title(
        api,
        &execution.repo,
        issue.number,
        &issue.title,
        desired,
        flag,
    )
    .await
}

/// Decorate the pull-request title, prefixing the linked issue when known.
pub async fn update_title_pull_request_format(
    api: &dyn GitHubApi,
    execution: &Execution,
    flag: &FailureFlag,
) -> Option<String> {
    let pr = execution.pull_request.as_ref()?;
    let desired = format_title(
        &pr.title,
        &execution.labels,
        &execution.emoji,
        false,
        pr.linked_issue,
    );
    write_title(api, &execution.repo, pr.number, &pr.title, desired, flag).await
}
