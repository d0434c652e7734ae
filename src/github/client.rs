use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;

use crate::config::types::BoardRef;
use crate::github::interface::GitHubApi;
use crate::github::{issues, labels, projects};
use crate::types::{
    Comment, CreateOutcome, IssueSnapshot, IssueTypeInfo, IssueTypeSpec, LabelSpec, Priority,
    ProjectDetail, PullRequestSnapshot, RepoLabel, RepoRef,
};

/// [`GitHubApi`] over a single token-authenticated Octocrab instance.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Arc<Octocrab>,
}

impl GitHubClient {
    /// Client for github.com authenticated with a personal access token.
    pub fn new(token: &str) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(token.to_owned())
            .build()
            .context("building octocrab instance")?;
        Ok(Self {
            octocrab: Arc::new(instance),
        })
    }

    /// Client against an explicit API base URI (GitHub Enterprise, tests).
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(token.to_owned())
            .base_uri(base_uri)
            .context("setting API base URI")?
            .build()
            .context("building octocrab instance")?;
        Ok(Self {
            octocrab: Arc::new(instance),
        })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn authenticated_login(&self) -> Result<String> {
        issues::authenticated_login(&self.octocrab).await
    }

    async fn is_organization(&self, owner: &str) -> Result<bool> {
        issues::is_organization(&self.octocrab, owner).await
    }

    async fn repository_full_name(&self, repo: &RepoRef) -> Result<String> {
        issues::repository_full_name(&self.octocrab, &repo.owner, &repo.name).await
    }

    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<IssueSnapshot> {
        issues::get(&self.octocrab, &repo.owner, &repo.name, number).await
    }

    async fn update_issue_title(&self, repo: &RepoRef, number: u64, title: &str) -> Result<()> {
        let payload = serde_json::json!({ "title": title });
        issues::update(&self.octocrab, &repo.owner, &repo.name, number, &payload).await
    }

    async fn update_issue_body(&self, repo: &RepoRef, number: u64, body: &str) -> Result<()> {
        let payload = serde_json::json!({ "body": body });
        issues::update(&self.octocrab, &repo.owner, &repo.name, number, &payload).await
    }

    async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequestSnapshot> {
        issues::get_pull_request(&self.octocrab, &repo.owner, &repo.name, number).await
    }

    async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<RepoLabel>> {
        labels::list(&self.octocrab, &repo.owner, &repo.name).await
    }

    async fn create_label(&self, repo: &RepoRef, label: &LabelSpec) -> Result<CreateOutcome> {
        labels::create(&self.octocrab, &repo.owner, &repo.name, label).await
    }

    async fn get_issue_labels(&self, repo: &RepoRef, number: u64) -> Result<Vec<String>> {
        labels::for_issue(&self.octocrab, &repo.owner, &repo.name, number).await
    }

    async fn set_issue_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        names: &[String],
    ) -> Result<()> {
        labels::set_for_issue(&self.octocrab, &repo.owner, &repo.name, number, names).await
    }

    async fn list_issue_types(&self, org: &str) -> Result<Vec<IssueTypeInfo>> {
        labels::list_issue_types(&self.octocrab, org).await
    }

    async fn create_issue_type(
        &self,
        org: &str,
        issue_type: &IssueTypeSpec,
    ) -> Result<CreateOutcome> {
        labels::create_issue_type(&self.octocrab, org, issue_type).await
    }

    async fn set_issue_type(&self, repo: &RepoRef, number: u64, type_name: &str) -> Result<()> {
        let payload = serde_json::json!({ "type": type_name });
        issues::update(&self.octocrab, &repo.owner, &repo.name, number, &payload).await
    }

    async fn get_project(&self, board: &BoardRef) -> Result<ProjectDetail> {
        projects::fetch_project(&self.octocrab, board).await
    }

    async fn move_to_column(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        status_field: &str,
        column: &str,
    ) -> Result<bool> {
        projects::set_single_select(&self.octocrab, project, content_id, status_field, column).await
    }

    async fn set_task_priority(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        priority_field: &str,
        priority: Priority,
    ) -> Result<bool> {
        projects::set_single_select(
            &self.octocrab,
            project,
            content_id,
            priority_field,
            priority.as_str(),
        )
        .await
    }

    async fn list_comments(&self, repo: &RepoRef, number: u64) -> Result<Vec<Comment>> {
        issues::list_comments(&self.octocrab, &repo.owner, &repo.name, number).await
    }

    async fn add_comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<Comment> {
        issues::add_comment(&self.octocrab, &repo.owner, &repo.name, number, body).await
    }

    async fn update_comment(&self, repo: &RepoRef, comment_id: u64, body: &str) -> Result<()> {
        issues::update_comment(&self.octocrab, &repo.owner, &repo.name, comment_id, body).await
    }

    async fn delete_comment(&self, repo: &RepoRef, comment_id: u64) -> Result<()> {
        issues::delete_comment(&self.octocrab, &repo.owner, &repo.name, comment_id).await
    }
}
