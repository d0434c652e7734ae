use anyhow::Result;
use async_trait::async_trait;

use crate::config::types::BoardRef;
use crate::types::{
    Comment, CreateOutcome, IssueSnapshot, IssueTypeInfo, IssueTypeSpec, LabelSpec, Priority,
    ProjectDetail, PullRequestSnapshot, RepoLabel, RepoRef,
};

/// Every GitHub operation the use cases rely on.
///
/// Implemented by [`super::GitHubClient`] over octocrab and by
/// [`super::stub::StubGitHub`] for tests.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Login of the authenticated user; fails when the token is rejected.
    async fn authenticated_login(&self) -> Result<String>;

    /// `true` when `owner` is an organization account.
    async fn is_organization(&self, owner: &str) -> Result<bool>;

    /// `owner/name` as GitHub spells it; fails when the token cannot read
    /// the repository.
    async fn repository_full_name(&self, repo: &RepoRef) -> Result<String>;

    // -----------------------------------------------------------------------
    // Issues and pull requests
    // -----------------------------------------------------------------------

    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<IssueSnapshot>;

    async fn update_issue_title(&self, repo: &RepoRef, number: u64, title: &str) -> Result<()>;

    async fn update_issue_body(&self, repo: &RepoRef, number: u64, body: &str) -> Result<()>;

    async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequestSnapshot>;

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<RepoLabel>>;

    /// Create a repository label; a 422 "already exists" answer maps to
    /// [`CreateOutcome::AlreadyExists`].
    async fn create_label(&self, repo: &RepoRef, label: &LabelSpec) -> Result<CreateOutcome>;

    async fn get_issue_labels(&self, repo: &RepoRef, number: u64) -> Result<Vec<String>>;

    /// Replace the full label set of an issue or pull request.
    async fn set_issue_labels(&self, repo: &RepoRef, number: u64, labels: &[String])
    -> Result<()>;

    // -----------------------------------------------------------------------
    // Issue types
    // -----------------------------------------------------------------------

    async fn list_issue_types(&self, org: &str) -> Result<Vec<IssueTypeInfo>>;

    /// Create an organization issue type; 422 maps to
    /// [`CreateOutcome::AlreadyExists`].
    async fn create_issue_type(&self, org: &str, issue_type: &IssueTypeSpec)
    -> Result<CreateOutcome>;

    async fn set_issue_type(&self, repo: &RepoRef, number: u64, type_name: &str) -> Result<()>;

    // -----------------------------------------------------------------------
    // Project boards
    // -----------------------------------------------------------------------

    async fn get_project(&self, board: &BoardRef) -> Result<ProjectDetail>;

    /// Move the card of `content_id` (issue or PR node id) to `column` of the
    /// board's status field, adding the card first if needed.
    ///
    /// Returns `false` when the card already sits in that column.
    async fn move_to_column(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        status_field: &str,
        column: &str,
    ) -> Result<bool>;

    /// Set the board's priority field for `content_id`.
    ///
    /// Returns `false` when the field already holds `priority`.
    async fn set_task_priority(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        priority_field: &str,
        priority: Priority,
    ) -> Result<bool>;

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    async fn list_comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>>;

    async fn add_comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<Comment>;

    async fn update_comment(&self, repo: &RepoRef, comment_id: u64, body: &str) -> Result<()>;

    async fn delete_comment(&self, repo: &RepoRef, comment_id: u64) -> Result<()>;
}
