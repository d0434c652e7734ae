use std::sync::LazyLock;

use regex::Regex;

use crate::config::types::{AiConfig, AppConfig, EmojiConfig, ProjectsConfig, SizeConfig};

use super::common::{IssueSnapshot, PullRequestSnapshot, RepoRef};
use super::labels::{IssueTypes, Labels};
use super::project::ProjectDetail;

static BRANCH_ISSUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/]+/(\d+)(?:[-_/]|$)").expect("valid branch regex"));
static CLOSING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s+#(\d+)\b")
        .expect("valid closing-keyword regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueContext {
    pub number: u64,
    pub node_id: String,
    pub title: String,
    pub body: String,
    pub issue_type: Option<String>,
}

impl From<&IssueSnapshot> for IssueContext {
    fn from(issue: &IssueSnapshot) -> Self {
        Self {
            number: issue.number,
            node_id: issue.node_id.clone(),
            title: issue.title.clone(),
            body: issue.body.clone(),
            issue_type: issue.issue_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub number: u64,
    pub node_id: String,
    pub title: String,
    pub body: String,
    pub head_ref: String,
    pub base_ref: String,
    /// Issue this PR works on, from the branch name or a closing keyword.
    pub linked_issue: Option<u64>,
    pub additions: u64,
    pub deletions: u64,
}

impl From<&PullRequestSnapshot> for PullRequestContext {
    fn from(pr: &PullRequestSnapshot) -> Self {
        Self {
            number: pr.number,
            node_id: pr.node_id.clone(),
            title: pr.title.clone(),
            body: pr.body.clone(),
            head_ref: pr.head_ref.clone(),
            base_ref: pr.base_ref.clone(),
            linked_issue: linked_issue(&pr.head_ref, &pr.body),
            additions: pr.additions,
            deletions: pr.deletions,
        }
    }
}

/// Issue number referenced by a branch like `feature/123-title`, falling back
/// to the first `closes #N` style keyword in the body.
pub fn linked_issue(head_ref: &str, body: &str) -> Option<u64> {
    BRANCH_ISSUE
        .captures(head_ref)
        .or_else(|| CLOSING_KEYWORD.captures(body))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Everything a use case needs to know about the current run.
///
/// Built once by the CLI and handed to use cases by shared reference.
#[derive(Debug, Clone)]
pub struct Execution {
    pub repo: RepoRef,
    pub token: String,
    /// `true` when the repository belongs to an organization (issue types
    /// only exist for organizations).
    pub owner_is_organization: bool,
    pub labels: Labels,
    pub issue_types: IssueTypes,
    pub emoji: EmojiConfig,
    pub project_settings: ProjectsConfig,
    pub projects: Vec<ProjectDetail>,
    pub size: SizeConfig,
    pub ai: AiConfig,
    pub issue: Option<IssueContext>,
    pub pull_request: Option<PullRequestContext>,
}

impl Execution {
    pub fn new(repo: RepoRef, token: impl Into<String>, config: &AppConfig) -> Self {
        Self {
            repo,
            token: token.into(),
            owner_is_organization: true,
            labels: Labels::new(config.labels.clone(), Vec::new()),
            issue_types: IssueTypes::new(config.issue_types.clone()),
            emoji: config.emoji.clone(),
            project_settings: config.projects.clone(),
            projects: Vec::new(),
            size: config.size,
            ai: config.ai.clone(),
            issue: None,
            pull_request: None,
        }
    }

    pub fn with_projects(mut self, projects: Vec<ProjectDetail>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_owner_is_organization(mut self, is_org: bool) -> Self {
        self.owner_is_organization = is_org;
        self
    }

    /// Set the issue context; its labels become the current labels.
    pub fn with_issue(mut self, issue: &IssueSnapshot) -> Self {
        self.labels = Labels::new(self.labels.config().clone(), issue.labels.clone());
        self.issue = Some(IssueContext::from(issue));
        self
    }

    /// Set the pull-request context; its labels become the current labels.
    pub fn with_pull_request(mut self, pr: &PullRequestSnapshot) -> Self {
        self.labels = Labels::new(self.labels.config().clone(), pr.labels.clone());
        self.pull_request = Some(PullRequestContext::from(pr));
        self
    }

    pub fn priority_label_on_issue_processable(&self) -> bool {
        self.project_settings.priority_labels_enabled
    }

    /// Number of the issue or pull request being processed.
    pub fn target_number(&self) -> Option<u64> {
        self.issue
            .as_ref()
            .map(|i| i.number)
            .or_else(|| self.pull_request.as_ref().map(|p| p.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_issue_from_branch() {
        assert_eq!(linked_issue("feature/123-add-login", ""), Some(123));
        assert_eq!(linked_issue("bugfix/7", ""), Some(7));
        assert_eq!(linked_issue("main", ""), None);
        assert_eq!(linked_issue("feature/v2-login", ""), None);
    }

    #[test]
    fn linked_issue_from_body_keyword() {
        assert_eq!(linked_issue("topic", "This Closes #42."), Some(42));
        assert_eq!(linked_issue("topic", "fixes #9 and more"), Some(9));
        assert_eq!(linked_issue("topic", "see #9"), None);
    }

    #[test]
    fn branch_wins_over_body() {
        assert_eq!(linked_issue("feature/5-x", "closes #6"), Some(5));
    }

    #[test]
    fn with_issue_replaces_current_labels() {
        let exec = Execution::new(RepoRef::new("acme", "w"), "t", &AppConfig::default());
        let issue = IssueSnapshot {
            number: 3,
            node_id: "I_3".into(),
            title: "Login".into(),
            body: String::new(),
            labels: vec!["feature".into()],
            issue_type: None,
        };
        let exec = exec.with_issue(&issue);
        assert!(exec.labels.contains("FEATURE"));
        assert_eq!(exec.target_number(), Some(3));
    }
}
