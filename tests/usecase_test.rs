use board_flow::config::types::AppConfig;
use board_flow::github::{StubCall, StubGitHub};
use board_flow::types::{
    ActionResult, Execution, IssueSnapshot, Priority, ProjectDetail, ProjectOwnerKind,
    PullRequestSnapshot, RepoRef,
};
use board_flow::usecases::{
    AssignIssueType, CheckPriorityIssueSize, CheckPriorityPullRequestSize, CheckSizePullRequest,
    FailureFlag, IssuePipeline, MoveIssueToInProgress, MovePullRequestToInReview,
    PullRequestPipeline, UseCase, set_progress_label, update_title_issue_format,
    update_title_pull_request_format,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn repo() -> RepoRef {
    RepoRef::new("acme", "widgets")
}

fn issue(number: u64, title: &str, labels: &[&str]) -> IssueSnapshot {
    IssueSnapshot {
        number,
        node_id: format!("I_{number}"),
        title: title.to_owned(),
        body: String::new(),
        labels: labels.iter().map(|l| (*l).to_owned()).collect(),
        issue_type: None,
    }
}

fn pull_request(number: u64, title: &str, labels: &[&str], head: &str) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number,
        node_id: format!("PR_{number}"),
        title: title.to_owned(),
        body: String::new(),
        labels: labels.iter().map(|l| (*l).to_owned()).collect(),
        head_ref: head.to_owned(),
        base_ref: "main".to_owned(),
        additions: 30,
        deletions: 5,
    }
}

fn board(id: &str, number: u64) -> ProjectDetail {
    ProjectDetail {
        id: id.to_owned(),
        title: format!("Board {number}"),
        kind: ProjectOwnerKind::Organization,
        owner: "acme".to_owned(),
        url: String::new(),
        number,
    }
}

fn execution() -> Execution {
    Execution::new(repo(), "t", &AppConfig::default())
}

fn writes(stub: &StubGitHub) -> usize {
    stub.calls().len()
}

fn assert_single(results: &[ActionResult], success: bool, executed: bool) {
    assert_eq!(results.len(), 1, "{results:?}");
    assert_eq!(results[0].is_success(), success, "{results:?}");
    assert_eq!(results[0].is_executed(), executed, "{results:?}");
}

// ---------------------------------------------------------------------------
// Progress label
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_label_replaces_previous_one() {
    let stub = StubGitHub::new().with_issue(issue(7, "Login", &["50%", "feature"]));
    set_progress_label(&stub, &repo(), 7, 75).await.unwrap();
    assert_eq!(
        stub.calls(),
        [StubCall::SetIssueLabels {
            number: 7,
            labels: vec!["feature".into(), "75%".into()],
        }]
    );
}

#[tokio::test]
async fn progress_above_hundred_is_rejected() {
    let stub = StubGitHub::new().with_issue(issue(7, "Login", &[]));
    assert!(set_progress_label(&stub, &repo(), 7, 101).await.is_err());
    assert_eq!(writes(&stub), 0);
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[tokio::test]
async fn priority_without_projects_is_skipped() {
    let i = issue(1, "x", &["priority: high"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let exec = execution().with_issue(&i);
    let results = CheckPriorityIssueSize::new(&stub).invoke(&exec).await;
    assert_single(&results, true, false);
    assert_eq!(writes(&stub), 0);
}

#[tokio::test]
async fn priority_disabled_is_skipped() {
    let i = issue(1, "x", &["priority: high"]);
    let stub = StubGitHub::new();
    let mut exec = execution().with_issue(&i).with_projects(vec![board("P1", 1)]);
    exec.project_settings.priority_labels_enabled = false;
    let results = CheckPriorityIssueSize::new(&stub).invoke(&exec).await;
    assert_single(&results, true, false);
    assert_eq!(writes(&stub), 0);
}

#[tokio::test]
async fn priority_none_label_is_skipped() {
    let i = issue(1, "x", &["priority: none"]);
    let stub = StubGitHub::new();
    let exec = execution().with_issue(&i).with_projects(vec![board("P1", 1)]);
    let results = CheckPriorityIssueSize::new(&stub).invoke(&exec).await;
    assert_single(&results, true, false);
    assert_eq!(writes(&stub), 0);
}

#[tokio::test]
async fn priority_is_set_on_every_board() {
    let i = issue(1, "x", &["Priority: Medium"]);
    let stub = StubGitHub::new();
    let exec = execution()
        .with_issue(&i)
        .with_projects(vec![board("P1", 1), board("P2", 2)]);
    let results = CheckPriorityIssueSize::new(&stub).invoke(&exec).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_success() && r.is_executed()));
    assert!(results[0].steps()[0].contains("Board 1"));
    assert!(results[1].steps()[0].contains("https://github.com/orgs/acme/projects/2"));
    assert!(stub.calls().contains(&StubCall::SetPriority {
        project: "P2".into(),
        priority: Priority::P1,
    }));

    // Second run: nothing changes, nothing reported.
    let again = CheckPriorityIssueSize::new(&stub).invoke(&exec).await;
    assert!(again.is_empty());
}

#[tokio::test]
async fn priority_error_is_a_single_failure() {
    let pr = pull_request(4, "x", &["priority: low"], "feature/1-x");
    let stub = StubGitHub::new().failing_priority();
    let exec = execution()
        .with_pull_request(&pr)
        .with_projects(vec![board("P1", 1), board("P2", 2)]);
    let results = CheckPriorityPullRequestSize::new(&stub).invoke(&exec).await;
    assert_single(&results, false, true);
    assert!(results[0].steps()[0].contains("problem"));
}

// ---------------------------------------------------------------------------
// Card movement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn move_reports_only_changed_boards() {
    let i = issue(9, "x", &["in-progress"]);
    let stub = StubGitHub::new().with_card_in("P1", "I_9", "In Progress");
    let exec = execution()
        .with_issue(&i)
        .with_projects(vec![board("P1", 1), board("P2", 2)]);
    let results = MoveIssueToInProgress::new(&stub).invoke(&exec).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());
    assert!(results[0].steps()[0].contains("Board 2"));
    assert_eq!(stub.column_of("P2", "I_9").as_deref(), Some("In Progress"));
}

#[tokio::test]
async fn move_failure_does_not_stop_other_boards() {
    let pr = pull_request(5, "x", &[], "topic");
    let stub = StubGitHub::new().failing_move("P1");
    let exec = execution()
        .with_pull_request(&pr)
        .with_projects(vec![board("P1", 1), board("P2", 2)]);
    let results = MovePullRequestToInReview::new(&stub).invoke(&exec).await;
    assert_eq!(results.len(), 2);
    assert!(!results[0].is_success());
    assert!(results[1].is_success());
    assert_eq!(stub.column_of("P2", "PR_5").as_deref(), Some("In Review"));
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

#[tokio::test]
async fn size_label_replaces_stale_tier() {
    let pr = pull_request(5, "x", &["size: XS", "feature"], "topic");
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let exec = execution().with_pull_request(&pr);
    let results = CheckSizePullRequest::new(&stub).invoke(&exec).await;
    assert_single(&results, true, true);
    assert_eq!(
        stub.calls(),
        [StubCall::SetIssueLabels {
            number: 5,
            labels: vec!["feature".into(), "size: S".into()],
        }]
    );

    let again = CheckSizePullRequest::new(&stub).invoke(&exec).await;
    assert_single(&again, true, false);
    assert_eq!(writes(&stub), 1);
}

// ---------------------------------------------------------------------------
// Issue type
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_type_follows_labels() {
    let i = issue(3, "x", &["bugfix"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let exec = execution().with_issue(&i);
    let results = AssignIssueType::new(&stub).invoke(&exec).await;
    assert_single(&results, true, true);
    assert_eq!(stub.issue(3).unwrap().issue_type.as_deref(), Some("Bug"));

    let again = AssignIssueType::new(&stub).invoke(&exec).await;
    assert_single(&again, true, false);
}

#[tokio::test]
async fn issue_type_skipped_for_user_repositories() {
    let i = issue(3, "x", &["bugfix"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let exec = execution()
        .with_issue(&i)
        .with_owner_is_organization(false);
    let results = AssignIssueType::new(&stub).invoke(&exec).await;
    assert_single(&results, true, false);
    assert_eq!(writes(&stub), 0);
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_title_is_decorated_once() {
    let i = issue(2, "Add login", &["feature"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let flag = FailureFlag::new();

    let exec = execution().with_issue(&i);
    let title = update_title_issue_format(&stub, &exec, &flag).await;
    assert_eq!(title.as_deref(), Some("✨ - Add login"));

    let formatted = stub.issue(2).unwrap();
    let exec = execution().with_issue(&formatted);
    assert_eq!(update_title_issue_format(&stub, &exec, &flag).await, None);
    assert_eq!(writes(&stub), 1);
    assert!(!flag.is_set());
}

#[tokio::test]
async fn pull_request_title_carries_linked_issue() {
    let pr = pull_request(8, "Fix crash", &["bugfix"], "bugfix/12-crash");
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let flag = FailureFlag::new();
    let exec = execution().with_pull_request(&pr);
    let title = update_title_pull_request_format(&stub, &exec, &flag).await;
    assert_eq!(title.as_deref(), Some("[#12] 🐛 - Fix crash"));
}

#[tokio::test]
async fn title_write_failure_sets_flag() {
    let i = issue(2, "Add login", &["feature"]);
    let stub = StubGitHub::new().with_issue(i.clone()).failing_title_update();
    let flag = FailureFlag::new();
    let exec = execution().with_issue(&i);
    assert_eq!(update_title_issue_format(&stub, &exec, &flag).await, None);
    assert!(flag.is_set());
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_pipeline_moves_branched_issue() {
    let i = issue(6, "Search", &["feature", "branched", "priority: high"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let flag = FailureFlag::new();
    let exec = execution().with_issue(&i).with_projects(vec![board("P1", 1)]);

    let results = IssuePipeline::new(&stub, &flag).invoke(&exec).await;
    let ids: Vec<&str> = results.iter().map(ActionResult::id).collect();
    assert_eq!(
        ids,
        [
            "update-title",
            "assign-issue-type",
            "check-priority-issue-size",
            "move-issue-to-in-progress"
        ]
    );
    assert!(results.iter().all(ActionResult::is_success));
    assert_eq!(stub.issue(6).unwrap().title, "🌱✨ - Search");
    assert_eq!(stub.column_of("P1", "I_6").as_deref(), Some("In Progress"));
}

#[tokio::test]
async fn issue_pipeline_leaves_unstarted_issue_in_place() {
    let i = issue(6, "Search", &["feature"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let flag = FailureFlag::new();
    let exec = execution().with_issue(&i).with_projects(vec![board("P1", 1)]);

    let results = IssuePipeline::new(&stub, &flag).invoke(&exec).await;
    assert!(results.iter().all(|r| r.id() != "move-issue-to-in-progress"));
    assert_eq!(stub.column_of("P1", "I_6"), None);
}

#[tokio::test]
async fn pull_request_pipeline_runs_every_step() {
    let pr = pull_request(11, "Login form", &["feature"], "feature/6-login");
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let flag = FailureFlag::new();
    let exec = execution()
        .with_pull_request(&pr)
        .with_projects(vec![board("P1", 1)]);

    let results = PullRequestPipeline::new(&stub, &flag).invoke(&exec).await;
    assert!(results.iter().all(ActionResult::is_success), "{results:?}");
    assert!(stub.calls().contains(&StubCall::UpdateTitle {
        number: 11,
        title: "[#6] ✨ - Login form".into(),
    }));
    assert_eq!(stub.column_of("P1", "PR_11").as_deref(), Some("In Review"));
}

#[tokio::test]
async fn pipeline_reports_title_failure() {
    let i = issue(6, "Search", &["feature"]);
    let stub = StubGitHub::new().with_issue(i.clone()).failing_title_update();
    let flag = FailureFlag::new();
    let exec = execution().with_issue(&i);

    let results = IssuePipeline::new(&stub, &flag).invoke(&exec).await;
    assert!(!results[0].is_success());
    assert_eq!(results[0].errors().len(), 1);
    assert!(results[0].errors()[0].contains("#6"));
    assert!(results[0].errors()[0].contains("500"));
    assert!(flag.is_set());
}

#[tokio::test]
async fn pipeline_title_errors_exclude_earlier_failures() {
    let pr = pull_request(11, "Login form", &["feature"], "feature/6-login");
    let stub = StubGitHub::new().with_pull_request(pr.clone()).failing_title_update();
    let flag = FailureFlag::new();
    flag.fail("left over from an earlier step");
    let exec = execution().with_pull_request(&pr);

    let results = PullRequestPipeline::new(&stub, &flag).invoke(&exec).await;
    assert_eq!(results[0].id(), "update-title");
    assert_eq!(results[0].errors().len(), 1);
    assert!(results[0].errors()[0].contains("#11"));
}
