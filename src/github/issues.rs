use std::sync::Arc;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde::Deserialize;

use crate::types::{Comment, IssueSnapshot, PullRequestSnapshot};

// ---------------------------------------------------------------------------
// Raw API response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawNamed {
    name: String,
}

#[derive(Deserialize)]
struct RawIssue {
    number: u64,
    node_id: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<RawNamed>,
    #[serde(default, rename = "type")]
    issue_type: Option<RawNamed>,
}

impl From<RawIssue> for IssueSnapshot {
    fn from(raw: RawIssue) -> Self {
        IssueSnapshot {
            number: raw.number,
            node_id: raw.node_id,
            title: raw.title,
            body: raw.body.unwrap_or_default(),
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            issue_type: raw.issue_type.map(|t| t.name),
        }
    }
}

#[derive(Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct RawPullRequest {
    number: u64,
    node_id: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<RawNamed>,
    head: RawRef,
    base: RawRef,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

impl From<RawPullRequest> for PullRequestSnapshot {
    fn from(raw: RawPullRequest) -> Self {
        PullRequestSnapshot {
            number: raw.number,
            node_id: raw.node_id,
            title: raw.title,
            body: raw.body.unwrap_or_default(),
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            head_ref: raw.head.name,
            base_ref: raw.base.name,
            additions: raw.additions,
            deletions: raw.deletions,
        }
    }
}

#[derive(Deserialize)]
struct RawComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment {
            id: raw.id,
            body: raw.body.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
    #[serde(default, rename = "type")]
    kind: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub(crate) async fn authenticated_login(octocrab: &Arc<Octocrab>) -> Result<String> {
    let user: RawUser = octocrab
        .get("/user", None::<&()>)
        .await
        .context("fetching the authenticated user")?;
    Ok(user.login)
}

pub(crate) async fn is_organization(octocrab: &Arc<Octocrab>, owner: &str) -> Result<bool> {
    let route = format!("/users/{owner}");
    let user: RawUser = octocrab
        .get(route, None::<&()>)
        .await
        .with_context(|| format!("fetching account {owner}"))?;
    Ok(user.kind == "Organization")
}

#[derive(Deserialize)]
struct RawRepository {
    full_name: String,
}

pub(crate) async fn repository_full_name(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
) -> Result<String> {
    let route = format!("/repos/{owner}/{repo}");
    let raw: RawRepository = octocrab
        .get(route, None::<&()>)
        .await
        .with_context(|| format!("reading repository {owner}/{repo}"))?;
    Ok(raw.full_name)
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

pub(crate) async fn get(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<IssueSnapshot> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}");
    let raw: RawIssue = octocrab
        .get(route, None::<&()>)
        .await
        .with_context(|| format!("fetching issue #{number}"))?;
    Ok(raw.into())
}

/// Patch arbitrary issue fields (`title`, `body`, `type`).
pub(crate) async fn update(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
    payload: &serde_json::Value,
) -> Result<()> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}");
    let _: serde_json::Value = octocrab
        .patch(route, Some(payload))
        .await
        .with_context(|| format!("updating issue #{number}"))?;
    Ok(())
}

pub(crate) async fn get_pull_request(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<PullRequestSnapshot> {
    let route = format!("/repos/{owner}/{repo}/pulls/{number}");
    let raw: RawPullRequest = octocrab
        .get(route, None::<&()>)
        .await
        .with_context(|| format!("fetching pull request #{number}"))?;
    Ok(raw.into())
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub(crate) async fn list_comments(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<Comment>> {
    let mut comments = Vec::new();
    let mut page = 1u32;
    loop {
        let route =
            format!("/repos/{owner}/{repo}/issues/{number}/comments?per_page=100&page={page}");
        let batch: Vec<RawComment> = octocrab
            .get(route, None::<&()>)
            .await
            .context("listing issue comments")?;
        let len = batch.len();
        comments.extend(batch.into_iter().map(Comment::from));
        if len < 100 {
            break;
        }
        page += 1;
    }
    Ok(comments)
}

pub(crate) async fn add_comment(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    number: u64,
    body: &str,
) -> Result<Comment> {
    let route = format!("/repos/{owner}/{repo}/issues/{number}/comments");
    let payload = serde_json::json!({ "body": body });
    let raw: RawComment = octocrab
        .post(route, Some(&payload))
        .await
        .context("adding comment to issue")?;
    Ok(raw.into())
}

pub(crate) async fn update_comment(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    comment_id: u64,
    body: &str,
) -> Result<()> {
    let route = format!("/repos/{owner}/{repo}/issues/comments/{comment_id}");
    let payload = serde_json::json!({ "body": body });
    let _: serde_json::Value = octocrab
        .patch(route, Some(&payload))
        .await
        .context("updating issue comment")?;
    Ok(())
}

pub(crate) async fn delete_comment(
    octocrab: &Arc<Octocrab>,
    owner: &str,
    repo: &str,
    comment_id: u64,
) -> Result<()> {
    octocrab
        .issues(owner, repo)
        .delete_comment(octocrab::models::CommentId(comment_id))
        .await
        .context("deleting issue comment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_with_null_body_and_type() {
        let json = r#"{
          "number": 12, "node_id": "I_kw12", "title": "Crash on save", "body": null,
          "labels": [{"name": "bugfix", "color": "d73a4a"}],
          "type": {"id": 4, "name": "Bug"}
        }"#;
        let issue: IssueSnapshot = serde_json::from_str::<RawIssue>(json).unwrap().into();
        assert_eq!(issue.body, "");
        assert_eq!(issue.labels, vec!["bugfix"]);
        assert_eq!(issue.issue_type.as_deref(), Some("Bug"));
    }

    #[test]
    fn pull_request_refs_and_counts() {
        let json = r#"{
          "number": 5, "node_id": "PR_kw5", "title": "Add login", "body": "closes #3",
          "labels": [], "head": {"ref": "feature/3-login"}, "base": {"ref": "develop"},
          "additions": 120, "deletions": 8
        }"#;
        let pr: PullRequestSnapshot = serde_json::from_str::<RawPullRequest>(json).unwrap().into();
        assert_eq!(pr.head_ref, "feature/3-login");
        assert_eq!(pr.base_ref, "develop");
        assert_eq!(pr.additions + pr.deletions, 128);
    }

    #[test]
    fn missing_required_field_fails() {
        let json = r#"{"number": 5, "title": "No node id"}"#;
        assert!(serde_json::from_str::<RawIssue>(json).is_err());
    }
}
