use anyhow::Result;
use chrono::Utc;

use crate::github::GitHubApi;
use crate::types::{Comment, RepoRef};
use crate::util::format_timestamp;

/// Kinds of comment the bot maintains, one of each per issue or PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Think,
    Progress,
    RecommendSteps,
    PotentialProblems,
}

impl CommentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentKind::Think => "think",
            CommentKind::Progress => "progress",
            CommentKind::RecommendSteps => "recommend-steps",
            CommentKind::PotentialProblems => "potential-problems",
        }
    }
}

/// Hidden HTML marker identifying a bot comment of `kind`.
pub fn marker(kind: CommentKind) -> String {
    format!("<!-- board-flow:{} -->", kind.as_str())
}

fn find_marked(comments: &[Comment], kind: CommentKind) -> Option<&Comment> {
    let marker = marker(kind);
    comments.iter().find(|c| c.body.contains(&marker))
}

/// Create or update the bot comment of `kind` on `number`.
///
/// Returns the id of the written comment.
pub async fn upsert_comment(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    number: u64,
    kind: CommentKind,
    text: &str,
) -> Result<u64> {
    let body = format!(
        "{}\n{}\n\n<sub>Updated by board-flow on {}.</sub>",
        marker(kind),
        text.trim(),
        format_timestamp(&Utc::now())
    );
    let comments = api.list_comments(repo, number).await?;
    if let Some(existing) = find_marked(&comments, kind) {
        tracing::debug!(number, kind = kind.as_str(), id = existing.id, "updating comment");
        api.update_comment(repo, existing.id, &body).await?;
        return Ok(existing.id);
    }
    tracing::debug!(number, kind = kind.as_str(), "adding comment");
    Ok(api.add_comment(repo, number, &body).await?.id)
}

/// Delete the bot comment of `kind` on `number`, if there is one.
///
/// Returns `true` when a comment was deleted.
pub(crate) async fn delete_marked_comment(
    api: &dyn GitHubApi,
    repo: &RepoRef,
    number: u64,
    kind: CommentKind,
) -> Result<bool> {
    let comments = api.list_comments(repo, number).await?;
    match find_marked(&comments, kind) {
        Some(existing) => {
            api.delete_comment(repo, existing.id).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
