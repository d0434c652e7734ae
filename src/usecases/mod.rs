// usecases: one module per automation, all written against the GitHubApi
// and CodingAgent ports

pub mod ai;
mod comments;
pub mod ensure;
pub mod issue_type;
pub mod move_card;
pub mod pipeline;
pub mod priority;
pub mod progress;
pub mod setup;
pub mod size;
pub mod title;

use async_trait::async_trait;

use crate::types::{ActionResult, Execution};

pub use ai::{
    CheckProgress, DetectPotentialProblems, Do, ProgressVerdict, RecommendSteps, Think,
    UpdatePullRequestDescription,
};
pub use comments::{CommentKind, marker, upsert_comment};
pub use ensure::{
    EnsureOutcome, EnsureSummary, ensure_issue_type, ensure_issue_types, ensure_label,
    ensure_labels, ensure_progress_labels,
};
pub use issue_type::AssignIssueType;
pub use move_card::{MoveIssueToInProgress, MovePullRequestToInReview};
pub use pipeline::{IssuePipeline, PullRequestPipeline};
pub use priority::{CheckPriorityIssueSize, CheckPriorityPullRequestSize};
pub use progress::set_progress_label;
pub use setup::InitialSetup;
pub use size::CheckSizePullRequest;
pub use title::{FailureFlag, update_title_issue_format, update_title_pull_request_format};

/// An automation that runs against one [`Execution`].
///
/// Implementations never return errors: failures are reported as
/// [`ActionResult`]s so that one broken step does not abort a pipeline.
#[async_trait]
pub trait UseCase: Send + Sync {
    /// Stable identifier copied into every result.
    fn id(&self) -> &'static str;

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult>;
}
