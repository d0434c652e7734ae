use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::config::types::{BoardOwner, BoardRef};
use crate::types::{
    Comment, CreateOutcome, IssueSnapshot, IssueTypeInfo, IssueTypeSpec, LabelSpec, Priority,
    ProjectDetail, ProjectOwnerKind, PullRequestSnapshot, RepoLabel, RepoRef,
};

use super::interface::GitHubApi;

/// A write the stub received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    CreateLabel(String),
    SetIssueLabels { number: u64, labels: Vec<String> },
    CreateIssueType(String),
    SetIssueType { number: u64, name: String },
    UpdateTitle { number: u64, title: String },
    UpdateBody { number: u64, body: String },
    MoveToColumn { project: String, column: String },
    SetPriority { project: String, priority: Priority },
    AddComment { number: u64, body: String },
    UpdateComment { id: u64, body: String },
    DeleteComment { id: u64 },
}

/// Failure injection switches.
#[derive(Debug, Default)]
struct Failures {
    auth: bool,
    repository: bool,
    list_labels: bool,
    labels: HashSet<String>,
    issue_types: HashSet<String>,
    title_update: bool,
    priority: bool,
    move_projects: HashSet<String>,
    racing_labels: HashSet<String>,
}

#[derive(Debug, Default)]
struct StubState {
    login: String,
    organization: bool,
    labels: Vec<RepoLabel>,
    issue_types: Vec<IssueTypeInfo>,
    issues: HashMap<u64, IssueSnapshot>,
    pull_requests: HashMap<u64, PullRequestSnapshot>,
    comments: HashMap<u64, Vec<Comment>>,
    next_comment_id: u64,
    projects: Vec<ProjectDetail>,
    columns: HashMap<(String, String), String>,
    priorities: HashMap<(String, String), Priority>,
    failures: Failures,
    calls: Vec<StubCall>,
}

/// An in-memory GitHub that serves fixture data and records every write.
///
/// Useful for integration tests that must not require a token or network.
pub struct StubGitHub {
    state: Mutex<StubState>,
}

impl Default for StubGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StubGitHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                login: "board-flow-bot".to_owned(),
                organization: true,
                next_comment_id: 1,
                ..StubState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn edit(mut self, f: impl FnOnce(&mut StubState)) -> Self {
        f(self.state.get_mut().unwrap_or_else(PoisonError::into_inner));
        self
    }

    // -----------------------------------------------------------------------
    // Fixture builders
    // -----------------------------------------------------------------------

    pub fn with_labels(self, names: &[&str]) -> Self {
        self.edit(|s| {
            s.labels.extend(names.iter().map(|n| RepoLabel {
                name: (*n).to_owned(),
                color: "ededed".to_owned(),
                description: None,
            }));
        })
    }

    pub fn with_issue_types(self, names: &[&str]) -> Self {
        self.edit(|s| {
            for n in names {
                let id = s.issue_types.len() as u64 + 1;
                s.issue_types.push(IssueTypeInfo {
                    id,
                    name: (*n).to_owned(),
                    description: None,
                    color: None,
                });
            }
        })
    }

    pub fn with_issue(self, issue: IssueSnapshot) -> Self {
        self.edit(|s| {
            s.issues.insert(issue.number, issue);
        })
    }

    pub fn with_pull_request(self, pr: PullRequestSnapshot) -> Self {
        self.edit(|s| {
            s.pull_requests.insert(pr.number, pr);
        })
    }

    pub fn with_comment(self, number: u64, body: &str) -> Self {
        self.edit(|s| {
            let id = s.next_comment_id;
            s.next_comment_id += 1;
            s.comments.entry(number).or_default().push(Comment {
                id,
                body: body.to_owned(),
            });
        })
    }

    pub fn with_project(self, project: ProjectDetail) -> Self {
        self.edit(|s| s.projects.push(project))
    }

    /// Place the card of `content_id` in `column` of `project_id`.
    pub fn with_card_in(self, project_id: &str, content_id: &str, column: &str) -> Self {
        self.edit(|s| {
            s.columns.insert(
                (project_id.to_owned(), content_id.to_owned()),
                column.to_owned(),
            );
        })
    }

    pub fn with_user_owner(self) -> Self {
        self.edit(|s| s.organization = false)
    }

    // -----------------------------------------------------------------------
    // Failure injection
    // -----------------------------------------------------------------------

    pub fn failing_auth(self) -> Self {
        self.edit(|s| s.failures.auth = true)
    }

    pub fn failing_repository(self) -> Self {
        self.edit(|s| s.failures.repository = true)
    }

    pub fn failing_label_listing(self) -> Self {
        self.edit(|s| s.failures.list_labels = true)
    }

    /// Creating this label fails with a server error.
    pub fn failing_label(self, name: &str) -> Self {
        self.edit(|s| {
            s.failures.labels.insert(name.to_owned());
        })
    }

    /// Creating this label answers "already exists" although listing did
    /// not show it (someone created it in between).
    pub fn racing_label(self, name: &str) -> Self {
        self.edit(|s| {
            s.failures.racing_labels.insert(name.to_owned());
        })
    }

    pub fn failing_issue_type(self, name: &str) -> Self {
        self.edit(|s| {
            s.failures.issue_types.insert(name.to_owned());
        })
    }

    pub fn failing_title_update(self) -> Self {
        self.edit(|s| s.failures.title_update = true)
    }

    pub fn failing_priority(self) -> Self {
        self.edit(|s| s.failures.priority = true)
    }

    pub fn failing_move(self, project_id: &str) -> Self {
        self.edit(|s| {
            s.failures.move_projects.insert(project_id.to_owned());
        })
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Every write received so far.
    pub fn calls(&self) -> Vec<StubCall> {
        self.lock().calls.clone()
    }

    pub fn label_names(&self) -> Vec<String> {
        self.lock().labels.iter().map(|l| l.name.clone()).collect()
    }

    pub fn comments(&self, number: u64) -> Vec<Comment> {
        self.lock().comments.get(&number).cloned().unwrap_or_default()
    }

    pub fn issue(&self, number: u64) -> Option<IssueSnapshot> {
        self.lock().issues.get(&number).cloned()
    }

    pub fn column_of(&self, project_id: &str, content_id: &str) -> Option<String> {
        self.lock()
            .columns
            .get(&(project_id.to_owned(), content_id.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl GitHubApi for StubGitHub {
    async fn authenticated_login(&self) -> Result<String> {
        let s = self.lock();
        if s.failures.auth {
            bail!("401 Bad credentials");
        }
        Ok(s.login.clone())
    }

    async fn is_organization(&self, _owner: &str) -> Result<bool> {
        Ok(self.lock().organization)
    }

    async fn repository_full_name(&self, repo: &RepoRef) -> Result<String> {
        if self.lock().failures.repository {
            bail!("404 Not Found: {repo}");
        }
        Ok(repo.full_name())
    }

    async fn get_issue(&self, _repo: &RepoRef, number: u64) -> Result<IssueSnapshot> {
        self.lock()
            .issues
            .get(&number)
            .cloned()
            .ok_or_else(|| anyhow!("issue #{number} not found"))
    }

    async fn update_issue_title(&self, _repo: &RepoRef, number: u64, title: &str) -> Result<()> {
        let mut s = self.lock();
        if s.failures.title_update {
            bail!("500 Internal Server Error");
        }
        s.calls.push(StubCall::UpdateTitle {
            number,
            title: title.to_owned(),
        });
        if let Some(issue) = s.issues.get_mut(&number) {
            issue.title = title.to_owned();
        }
        if let Some(pr) = s.pull_requests.get_mut(&number) {
            pr.title = title.to_owned();
        }
        Ok(())
    }

    async fn update_issue_body(&self, _repo: &RepoRef, number: u64, body: &str) -> Result<()> {
        let mut s = self.lock();
        s.calls.push(StubCall::UpdateBody {
            number,
            body: body.to_owned(),
        });
        if let Some(pr) = s.pull_requests.get_mut(&number) {
            pr.body = body.to_owned();
        }
        Ok(())
    }

    async fn get_pull_request(&self, _repo: &RepoRef, number: u64) -> Result<PullRequestSnapshot> {
        self.lock()
            .pull_requests
            .get(&number)
            .cloned()
            .ok_or_else(|| anyhow!("pull request #{number} not found"))
    }

    async fn list_labels(&self, _repo: &RepoRef) -> Result<Vec<RepoLabel>> {
        let s = self.lock();
        if s.failures.list_labels {
            bail!("502 Bad Gateway");
        }
        Ok(s.labels.clone())
    }

    async fn create_label(&self, _repo: &RepoRef, label: &LabelSpec) -> Result<CreateOutcome> {
        let mut s = self.lock();
        s.calls.push(StubCall::CreateLabel(label.name.clone()));
        if s.failures.labels.contains(&label.name) {
            bail!("500 creating label \"{}\"", label.name);
        }
        if s.failures.racing_labels.contains(&label.name)
            || s.labels.iter().any(|l| l.name.eq_ignore_ascii_case(&label.name))
        {
            return Ok(CreateOutcome::AlreadyExists);
        }
        s.labels.push(RepoLabel {
            name: label.name.clone(),
            color: label.color.clone(),
            description: Some(label.description.clone()),
        });
        Ok(CreateOutcome::Created)
    }

    async fn get_issue_labels(&self, _repo: &RepoRef, number: u64) -> Result<Vec<String>> {
        let s = self.lock();
        if let Some(issue) = s.issues.get(&number) {
            return Ok(issue.labels.clone());
        }
        if let Some(pr) = s.pull_requests.get(&number) {
            return Ok(pr.labels.clone());
        }
        bail!("issue #{number} not found")
    }

    async fn set_issue_labels(
        &self,
        _repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        let mut s = self.lock();
        s.calls.push(StubCall::SetIssueLabels {
            number,
            labels: labels.to_vec(),
        });
        if let Some(issue) = s.issues.get_mut(&number) {
            issue.labels = labels.to_vec();
        }
        if let Some(pr) = s.pull_requests.get_mut(&number) {
            pr.labels = labels.to_vec();
        }
        Ok(())
    }

    async fn list_issue_types(&self, _org: &str) -> Result<Vec<IssueTypeInfo>> {
        Ok(self.lock().issue_types.clone())
    }

    async fn create_issue_type(
        &self,
        _org: &str,
        issue_type: &IssueTypeSpec,
    ) -> Result<CreateOutcome> {
        let mut s = self.lock();
        s.calls
            .push(StubCall::CreateIssueType(issue_type.name.clone()));
        if s.failures.issue_types.contains(&issue_type.name) {
            bail!("500 creating issue type \"{}\"", issue_type.name);
        }
        if s
            .issue_types
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&issue_type.name))
        {
            return Ok(CreateOutcome::AlreadyExists);
        }
        let id = s.issue_types.len() as u64 + 1;
        s.issue_types.push(IssueTypeInfo {
            id,
            name: issue_type.name.clone(),
            description: Some(issue_type.description.clone()),
            color: Some(issue_type.color.clone()),
        });
        Ok(CreateOutcome::Created)
    }

    async fn set_issue_type(&self, _repo: &RepoRef, number: u64, type_name: &str) -> Result<()> {
        let mut s = self.lock();
        s.calls.push(StubCall::SetIssueType {
            number,
            name: type_name.to_owned(),
        });
        if let Some(issue) = s.issues.get_mut(&number) {
            issue.issue_type = Some(type_name.to_owned());
        }
        Ok(())
    }

    async fn get_project(&self, board: &BoardRef) -> Result<ProjectDetail> {
        let kind = match board.kind {
            BoardOwner::Organization => ProjectOwnerKind::Organization,
            BoardOwner::User => ProjectOwnerKind::User,
        };
        self.lock()
            .projects
            .iter()
            .find(|p| p.owner == board.owner && p.number == board.number && p.kind == kind)
            .cloned()
            .ok_or_else(|| anyhow!("project {}#{} not found", board.owner, board.number))
    }

    async fn move_to_column(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        _status_field: &str,
        column: &str,
    ) -> Result<bool> {
        let mut s = self.lock();
        if s.failures.move_projects.contains(&project.id) {
            bail!("project {} is not accessible", project.title);
        }
        let key = (project.id.clone(), content_id.to_owned());
        if s.columns.get(&key).is_some_and(|c| c.eq_ignore_ascii_case(column)) {
            return Ok(false);
        }
        s.columns.insert(key, column.to_owned());
        s.calls.push(StubCall::MoveToColumn {
            project: project.id.clone(),
            column: column.to_owned(),
        });
        Ok(true)
    }

    async fn set_task_priority(
        &self,
        project: &ProjectDetail,
        content_id: &str,
        _priority_field: &str,
        priority: Priority,
    ) -> Result<bool> {
        let mut s = self.lock();
        if s.failures.priority {
            bail!("GraphQL errors: field \"Priority\" not found");
        }
        let key = (project.id.clone(), content_id.to_owned());
        if s.priorities.get(&key) == Some(&priority) {
            return Ok(false);
        }
        s.priorities.insert(key, priority);
        s.calls.push(StubCall::SetPriority {
            project: project.id.clone(),
            priority,
        });
        Ok(true)
    }

    async fn list_comments(&self, _repo: &RepoRef, number: u64) -> Result<Vec<Comment>> {
        Ok(self.comments(number))
    }

    async fn add_comment(&self, _repo: &RepoRef, number: u64, body: &str) -> Result<Comment> {
        let mut s = self.lock();
        let id = s.next_comment_id;
        s.next_comment_id += 1;
        let comment = Comment {
            id,
            body: body.to_owned(),
        };
        s.comments.entry(number).or_default().push(comment.clone());
        s.calls.push(StubCall::AddComment {
            number,
            body: body.to_owned(),
        });
        Ok(comment)
    }

    async fn update_comment(&self, _repo: &RepoRef, comment_id: u64, body: &str) -> Result<()> {
        let mut s = self.lock();
        let comment = s
            .comments
            .values_mut()
            .flatten()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| anyhow!("comment {comment_id} not found"))?;
        comment.body = body.to_owned();
        s.calls.push(StubCall::UpdateComment {
            id: comment_id,
            body: body.to_owned(),
        });
        Ok(())
    }

    async fn delete_comment(&self, _repo: &RepoRef, comment_id: u64) -> Result<()> {
        let mut s = self.lock();
        for list in s.comments.values_mut() {
            list.retain(|c| c.id != comment_id);
        }
        s.calls.push(StubCall::DeleteComment { id: comment_id });
        Ok(())
    }
}
