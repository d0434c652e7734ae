use board_flow::agent::StubAgent;
use board_flow::config::types::AppConfig;
use board_flow::github::{StubCall, StubGitHub};
use board_flow::types::{Execution, IssueSnapshot, PullRequestSnapshot, RepoRef};
use board_flow::usecases::{
    CheckProgress, CommentKind, DetectPotentialProblems, Do, RecommendSteps, Think,
    UpdatePullRequestDescription, UseCase, marker, upsert_comment,
};

fn repo() -> RepoRef {
    RepoRef::new("acme", "widgets")
}

fn issue(labels: &[&str]) -> IssueSnapshot {
    IssueSnapshot {
        number: 21,
        node_id: "I_21".into(),
        title: "Export to CSV".into(),
        body: "Users want a CSV export.".into(),
        labels: labels.iter().map(|l| (*l).to_owned()).collect(),
        issue_type: None,
    }
}

fn pull_request() -> PullRequestSnapshot {
    PullRequestSnapshot {
        number: 30,
        node_id: "PR_30".into(),
        title: "CSV export".into(),
        body: String::new(),
        labels: Vec::new(),
        head_ref: "feature/21-csv".into(),
        base_ref: "main".into(),
        additions: 120,
        deletions: 4,
    }
}

fn execution() -> Execution {
    Execution::new(repo(), "t", &AppConfig::default())
}

// ---------------------------------------------------------------------------
// Comment upsert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upsert_updates_the_marked_comment() {
    let stub = StubGitHub::new()
        .with_comment(21, "a human wrote this")
        .with_comment(21, &format!("{}\nold findings", marker(CommentKind::Progress)));

    let id = upsert_comment(&stub, &repo(), 21, CommentKind::Progress, "new findings")
        .await
        .unwrap();

    assert_eq!(id, 2);
    let comments = stub.comments(21);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].body, "a human wrote this");
    assert!(comments[1].body.contains("new findings"));
    assert!(!comments[1].body.contains("old findings"));
}

#[tokio::test]
async fn upsert_adds_when_no_marked_comment() {
    let stub = StubGitHub::new().with_comment(21, "a human wrote this");
    upsert_comment(&stub, &repo(), 21, CommentKind::Think, "hello")
        .await
        .unwrap();
    upsert_comment(&stub, &repo(), 21, CommentKind::Think, "hello again")
        .await
        .unwrap();

    let comments = stub.comments(21);
    assert_eq!(comments.len(), 2);
    assert!(comments[1].body.starts_with(&marker(CommentKind::Think)));
    assert!(comments[1].body.contains("hello again"));
}

// ---------------------------------------------------------------------------
// Think / Do
// ---------------------------------------------------------------------------

#[tokio::test]
async fn think_answers_on_the_issue() {
    let i = issue(&[]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let agent = StubAgent::new().replying("Use the csv crate.");
    let exec = execution().with_issue(&i);

    let results = Think::new(&stub, &agent, "Which crate?").invoke(&exec).await;

    assert!(results[0].is_success());
    assert_eq!(results[0].steps()[0], "Use the csv crate.");
    assert!(stub.comments(21)[0].body.contains("Use the csv crate."));
    let prompt = &agent.prompts()[0];
    assert!(prompt.contains("Export to CSV"));
    assert!(prompt.contains("Which crate?"));
}

#[tokio::test]
async fn think_without_issue_only_reports() {
    let stub = StubGitHub::new();
    let agent = StubAgent::new().replying("42");
    let results = Think::new(&stub, &agent, "Meaning?")
        .invoke(&execution())
        .await;
    assert!(results[0].is_success());
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn do_reports_session() {
    let agent = StubAgent::new().replying("done");
    let results = Do::new(&agent, "Run the tests")
        .with_session(Some("ses_1".into()))
        .invoke(&execution())
        .await;
    assert!(results[0].is_success());
    assert_eq!(results[0].steps(), ["done", "Session: ses_1"]);
}

#[tokio::test]
async fn agent_failure_is_reported_not_raised() {
    let agent = StubAgent::new().failing("connection refused");
    let results = Do::new(&agent, "Run the tests").invoke(&execution()).await;
    assert!(!results[0].is_success());
    assert!(results[0].errors()[0].contains("connection refused"));
}

// ---------------------------------------------------------------------------
// CheckProgress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn check_progress_labels_and_comments() {
    let i = issue(&["feature", "20%"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let agent = StubAgent::new()
        .replying("```json\n{\"progress\": 63, \"summary\": \"Parser done, writer missing.\"}\n```");
    let exec = execution().with_issue(&i);

    let results = CheckProgress::new(&stub, &agent).invoke(&exec).await;

    assert!(results[0].is_success(), "{results:?}");
    assert_eq!(
        stub.issue(21).unwrap().labels,
        ["feature".to_owned(), "65%".to_owned()]
    );
    let comments = stub.comments(21);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.contains("**Progress: 65%**"));
    assert!(comments[0].body.contains("writer missing"));
}

#[tokio::test]
async fn check_progress_rejects_verdict_without_progress() {
    let i = issue(&["20%"]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let agent = StubAgent::new().replying("{\"summary\": \"no idea\"}");
    let exec = execution().with_issue(&i);

    let results = CheckProgress::new(&stub, &agent).invoke(&exec).await;

    assert!(!results[0].is_success());
    assert!(results[0].steps()[0].contains("problem"));
    assert!(stub.calls().is_empty());
}

// ---------------------------------------------------------------------------
// RecommendSteps / DetectPotentialProblems
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recommend_steps_posts_once() {
    let i = issue(&[]);
    let stub = StubGitHub::new().with_issue(i.clone());
    let agent = StubAgent::new().replying("1. a").replying("1. b");
    let exec = execution().with_issue(&i);

    let use_case = RecommendSteps::new(&stub, &agent);
    use_case.invoke(&exec).await;
    use_case.invoke(&exec).await;

    let comments = stub.comments(21);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.contains("1. b"));
}

#[tokio::test]
async fn clean_review_removes_old_findings() {
    let pr = pull_request();
    let stub = StubGitHub::new().with_pull_request(pr.clone()).with_comment(
        30,
        &format!("{}\nnull deref", marker(CommentKind::PotentialProblems)),
    );
    let agent = StubAgent::new().replying(" NO_PROBLEMS\n");
    let exec = execution().with_pull_request(&pr);

    let results = DetectPotentialProblems::new(&stub, &agent)
        .invoke(&exec)
        .await;

    assert!(results[0].is_success());
    assert!(stub.comments(30).is_empty());
    assert!(stub.calls().contains(&StubCall::DeleteComment { id: 1 }));
}

#[tokio::test]
async fn findings_are_posted() {
    let pr = pull_request();
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let agent = StubAgent::new().replying("- src/csv.rs: unchecked unwrap");
    let exec = execution().with_pull_request(&pr);

    DetectPotentialProblems::new(&stub, &agent)
        .invoke(&exec)
        .await;

    let comments = stub.comments(30);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.contains("unchecked unwrap"));
}

// ---------------------------------------------------------------------------
// UpdatePullRequestDescription
// ---------------------------------------------------------------------------

#[tokio::test]
async fn description_is_written_and_links_issue() {
    let pr = pull_request();
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let agent = StubAgent::new().replying("## Summary\nAdds CSV export.\n\nCloses #21\n");
    let exec = execution().with_pull_request(&pr);

    let results = UpdatePullRequestDescription::new(&stub, &agent)
        .invoke(&exec)
        .await
        .unwrap();

    assert!(results[0].is_success());
    assert!(agent.prompts()[0].contains("Closes #21"));
    assert!(stub.calls().contains(&StubCall::UpdateBody {
        number: 30,
        body: "## Summary\nAdds CSV export.\n\nCloses #21".into(),
    }));
}

#[tokio::test]
async fn description_errors_propagate() {
    let pr = pull_request();
    let stub = StubGitHub::new().with_pull_request(pr.clone());
    let agent = StubAgent::new().failing("model overloaded");
    let exec = execution().with_pull_request(&pr);

    let err = UpdatePullRequestDescription::new(&stub, &agent)
        .invoke(&exec)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model overloaded"));
    assert!(stub.calls().is_empty());
}
