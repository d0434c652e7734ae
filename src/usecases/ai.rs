//! Commands that delegate work to the coding agent.
//!
//! Each command builds a prompt from the current issue or pull request, asks
//! the agent, and publishes the answer as a marked bot comment (see
//! [`super::comments`]).

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::CodingAgent;
use crate::github::GitHubApi;
use crate::types::{ActionResult, Execution};

use super::UseCase;
use super::comments::{CommentKind, delete_marked_comment, upsert_comment};
use super::ensure::PROGRESS_STEP;
use super::progress::set_progress_label;

/// Token the agent answers with when a review finds nothing.
pub const NO_PROBLEMS: &str = "NO_PROBLEMS";

/// Repository and target description prepended to every prompt.
fn context_block(execution: &Execution) -> String {
    let mut out = format!("Repository: {}\n", execution.repo);
    if let Some(issue) = &execution.issue {
        out.push_str(&format!(
            "Issue #{}: {}\n\n{}\n",
            issue.number, issue.title, issue.body
        ));
    }
    if let Some(pr) = &execution.pull_request {
        out.push_str(&format!(
            "Pull request #{}: {} ({} -> {}, +{} -{})\n\n{}\n",
            pr.number, pr.title, pr.head_ref, pr.base_ref, pr.additions, pr.deletions, pr.body
        ));
    }
    out
}

fn failed(id: &str, what: &str, err: &anyhow::Error) -> Vec<ActionResult> {
    tracing::warn!(id, "{what} failed: {err:#}");
    vec![ActionResult::failure(
        id,
        vec![format!("Tried to {what}, but there was a problem.")],
        vec![format!("{err:#}")],
    )]
}

// ---------------------------------------------------------------------------
// Think
// ---------------------------------------------------------------------------

/// Answer a free-form question, commenting on the issue when there is one.
pub struct Think<'a> {
    api: &'a dyn GitHubApi,
    agent: &'a dyn CodingAgent,
    question: String,
}

impl<'a> Think<'a> {
    pub fn new(
        api: &'a dyn GitHubApi,
        agent: &'a dyn CodingAgent,
        question: impl Into<String>,
    ) -> Self {
        Self {
            api,
            agent,
            question: question.into(),
        }
    }

    async fn run(&self, execution: &Execution) -> Result<Vec<String>> {
        let prompt = format!(
            "{}\nAnswer the following question about this repository. \
             Reply in Markdown.\n\n{}",
            context_block(execution),
            self.question
        );
        let reply = self.agent.ask(&prompt, &execution.ai.model, None).await?;

        let mut steps = vec![reply.text.clone()];
        if let Some(number) = execution.target_number() {
            upsert_comment(self.api, &execution.repo, number, CommentKind::Think, &reply.text)
                .await?;
            steps.push(format!("Posted the answer on #{number}."));
        }
        Ok(steps)
    }
}

#[async_trait]
impl UseCase for Think<'_> {
    fn id(&self) -> &'static str {
        "think"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        if self.question.trim().is_empty() {
            return vec![ActionResult::skipped_with(self.id(), "No question asked.")];
        }
        match self.run(execution).await {
            Ok(steps) => vec![ActionResult::success(self.id(), steps)],
            Err(err) => failed(self.id(), "answer the question", &err),
        }
    }
}

// ---------------------------------------------------------------------------
// Do
// ---------------------------------------------------------------------------

/// Forward an instruction to the agent, optionally continuing a session.
pub struct Do<'a> {
    agent: &'a dyn CodingAgent,
    instruction: String,
    session: Option<String>,
}

impl<'a> Do<'a> {
    pub fn new(agent: &'a dyn CodingAgent, instruction: impl Into<String>) -> Self {
        Self {
            agent,
            instruction: instruction.into(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Option<String>) -> Self {
        self.session = session;
        self
    }
}

#[async_trait]
impl UseCase for Do<'_> {
    fn id(&self) -> &'static str {
        "do"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        if self.instruction.trim().is_empty() {
            return vec![ActionResult::skipped_with(self.id(), "No instruction given.")];
        }
        let prompt = format!("{}\n{}", context_block(execution), self.instruction);
        match self
            .agent
            .ask(&prompt, &execution.ai.model, self.session.as_deref())
            .await
        {
            Ok(reply) => vec![ActionResult::success(
                self.id(),
                vec![reply.text, format!("Session: {}", reply.session_id)],
            )],
            Err(err) => failed(self.id(), "run the instruction", &err),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckProgress
// ---------------------------------------------------------------------------

/// The agent's structured answer to "how far along is this issue?".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressVerdict {
    pub progress: f64,
    #[serde(default)]
    pub summary: String,
}

impl ProgressVerdict {
    /// Parse the first JSON object found in `text`.
    ///
    /// Agents often wrap JSON in prose or code fences. Reading stops at the
    /// end of the first object, so anything after it is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let start = text
            .find('{')
            .ok_or_else(|| anyhow!("agent reply contains no JSON object"))?;
        let verdict: Self = serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Self>()
            .next()
            .ok_or_else(|| anyhow!("agent reply contains no JSON object"))?
            .context("parsing the progress verdict")?;
        if !verdict.progress.is_finite() {
            bail!("progress must be a finite number");
        }
        Ok(verdict)
    }

    /// Progress clamped to 0–100 and rounded to the label ladder step.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        let step = f64::from(PROGRESS_STEP);
        ((self.progress.clamp(0.0, 100.0) / step).round() * step) as u8
    }
}

/// Estimate the progress of the issue and mirror it as a `N%` label plus a
/// summary comment.
pub struct CheckProgress<'a> {
    api: &'a dyn GitHubApi,
    agent: &'a dyn CodingAgent,
}

impl<'a> CheckProgress<'a> {
    pub fn new(api: &'a dyn GitHubApi, agent: &'a dyn CodingAgent) -> Self {
        Self { api, agent }
    }

    async fn run(&self, execution: &Execution, number: u64) -> Result<Vec<String>> {
        let prompt = format!(
            "{}\nEstimate how much of this work is done, looking at the code in the \
             repository. Reply with a single JSON object and nothing else: \
             {{\"progress\": <0-100>, \"summary\": \"<one paragraph>\"}}",
            context_block(execution)
        );
        let reply = self.agent.ask(&prompt, &execution.ai.model, None).await?;
        let verdict = ProgressVerdict::parse(&reply.text)?;
        let percent = verdict.percent();

        set_progress_label(self.api, &execution.repo, number, percent).await?;
        let body = format!("**Progress: {percent}%**\n\n{}", verdict.summary);
        upsert_comment(self.api, &execution.repo, number, CommentKind::Progress, &body).await?;

        tracing::info!(number, percent, "progress recorded");
        Ok(vec![
            format!("Progress of #{number} set to {percent}%."),
            verdict.summary,
        ])
    }
}

#[async_trait]
impl UseCase for CheckProgress<'_> {
    fn id(&self) -> &'static str {
        "check-progress"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(number) = execution.target_number() else {
            return vec![ActionResult::skipped_with(self.id(), "No issue to check.")];
        };
        match self.run(execution, number).await {
            Ok(steps) => vec![ActionResult::success(self.id(), steps)],
            Err(err) => failed(self.id(), &format!("check the progress of #{number}"), &err),
        }
    }
}

// ---------------------------------------------------------------------------
// RecommendSteps
// ---------------------------------------------------------------------------

pub struct RecommendSteps<'a> {
    api: &'a dyn GitHubApi,
    agent: &'a dyn CodingAgent,
}

impl<'a> RecommendSteps<'a> {
    pub fn new(api: &'a dyn GitHubApi, agent: &'a dyn CodingAgent) -> Self {
        Self { api, agent }
    }

    async fn run(&self, execution: &Execution, number: u64) -> Result<Vec<String>> {
        let prompt = format!(
            "{}\nPropose a numbered list of concrete implementation steps for this work, \
             naming the files that need to change. Reply in Markdown.",
            context_block(execution)
        );
        let reply = self.agent.ask(&prompt, &execution.ai.model, None).await?;
        upsert_comment(
            self.api,
            &execution.repo,
            number,
            CommentKind::RecommendSteps,
            &reply.text,
        )
        .await?;
        Ok(vec![format!("Posted recommended steps on #{number}.")])
    }
}

#[async_trait]
impl UseCase for RecommendSteps<'_> {
    fn id(&self) -> &'static str {
        "recommend-steps"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(number) = execution.target_number() else {
            return vec![ActionResult::skipped_with(self.id(), "No issue to plan.")];
        };
        match self.run(execution, number).await {
            Ok(steps) => vec![ActionResult::success(self.id(), steps)],
            Err(err) => failed(self.id(), &format!("recommend steps for #{number}"), &err),
        }
    }
}

// ---------------------------------------------------------------------------
// DetectPotentialProblems
// ---------------------------------------------------------------------------

/// `NO_PROBLEMS`, ignoring surrounding whitespace and punctuation.
fn is_no_problems(text: &str) -> bool {
    text.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .eq_ignore_ascii_case(NO_PROBLEMS)
}

/// Ask for a review; keep at most one findings comment, removing it once the
/// agent reports a clean bill.
pub struct DetectPotentialProblems<'a> {
    api: &'a dyn GitHubApi,
    agent: &'a dyn CodingAgent,
}

impl<'a> DetectPotentialProblems<'a> {
    pub fn new(api: &'a dyn GitHubApi, agent: &'a dyn CodingAgent) -> Self {
        Self { api, agent }
    }

    async fn run(&self, execution: &Execution, number: u64) -> Result<Vec<String>> {
        let prompt = format!(
            "{}\nReview this work for bugs, security issues and missing tests. \
             List each problem with the file it concerns. If you find nothing, \
             reply with exactly {NO_PROBLEMS}.",
            context_block(execution)
        );
        let reply = self.agent.ask(&prompt, &execution.ai.model, None).await?;

        if is_no_problems(&reply.text) {
            let deleted = delete_marked_comment(
                self.api,
                &execution.repo,
                number,
                CommentKind::PotentialProblems,
            )
            .await?;
            let mut steps = vec![format!("No potential problems found on #{number}.")];
            if deleted {
                steps.push("Removed the previous findings comment.".to_owned());
            }
            return Ok(steps);
        }

        upsert_comment(
            self.api,
            &execution.repo,
            number,
            CommentKind::PotentialProblems,
            &reply.text,
        )
        .await?;
        Ok(vec![format!("Posted potential problems on #{number}.")])
    }
}

#[async_trait]
impl UseCase for DetectPotentialProblems<'_> {
    fn id(&self) -> &'static str {
        "detect-potential-problems"
    }

    async fn invoke(&self, execution: &Execution) -> Vec<ActionResult> {
        let Some(number) = execution.target_number() else {
            return vec![ActionResult::skipped_with(self.id(), "Nothing to review.")];
        };
        match self.run(execution, number).await {
            Ok(steps) => vec![ActionResult::success(self.id(), steps)],
            Err(err) => failed(self.id(), &format!("review #{number}"), &err),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdatePullRequestDescription
// ---------------------------------------------------------------------------

/// Regenerate the pull-request body with the agent.
///
/// Unlike the other commands this one returns its errors to the caller.
pub struct UpdatePullRequestDescription<'a> {
    api: &'a dyn GitHubApi,
    agent: &'a dyn CodingAgent,
}

impl<'a> UpdatePullRequestDescription<'a> {
    pub const ID: &'static str = "update-pull-request-description";

    pub fn new(api: &'a dyn GitHubApi, agent: &'a dyn CodingAgent) -> Self {
        Self { api, agent }
    }

    pub async fn invoke(&self, execution: &Execution) -> Result<Vec<ActionResult>> {
        let pr = execution
            .pull_request
            .as_ref()
            .ok_or_else(|| anyhow!("no pull request to describe"))?;

        let mut prompt = format!(
            "{}\nWrite a pull request description in Markdown with a short summary \
             and a bullet list of changes. Reply with the description only.",
            context_block(execution)
        );
        if let Some(issue) = pr.linked_issue {
            prompt.push_str(&format!("\nEnd it with the line `Closes #{issue}`."));
        }

        let reply = self.agent.ask(&prompt, &execution.ai.model, None).await?;
        let body = reply.text.trim();
        self.api
            .update_issue_body(&execution.repo, pr.number, body)
            .await
            .with_context(|| format!("updating the description of #{}", pr.number))?;

        tracing::info!(number = pr.number, "pull request description updated");
        Ok(vec![ActionResult::success(
            Self::ID,
            vec![format!("Updated the description of #{}.", pr.number)],
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_inside_code_fence() {
        let text = "Here you go:\n```json\n{\"progress\": 42, \"summary\": \"halfway\"}\n```";
        let v = ProgressVerdict::parse(text).unwrap();
        assert_eq!(v.summary, "halfway");
        assert_eq!(v.percent(), 40);
    }

    #[test]
    fn verdict_followed_by_braced_prose() {
        let text = "```json\n{\"progress\": 50, \"summary\": \"ok\"}\n```\nNext: wire up {config}.";
        let v = ProgressVerdict::parse(text).unwrap();
        assert_eq!(v.summary, "ok");
        assert_eq!(v.percent(), 50);
    }

    #[test]
    fn no_problems_marker_tolerates_punctuation() {
        assert!(is_no_problems("NO_PROBLEMS."));
        assert!(is_no_problems(" `no_problems`!\n"));
        assert!(!is_no_problems("NO_PROBLEMS except the race in main.rs"));
    }

    #[test]
    fn verdict_requires_progress() {
        assert!(ProgressVerdict::parse("{\"summary\": \"x\"}").is_err());
        assert!(ProgressVerdict::parse("no json here").is_err());
    }

    #[test]
    fn percent_is_clamped_and_rounded() {
        let v = |p| ProgressVerdict {
            progress: p,
            summary: String::new(),
        };
        assert_eq!(v(-3.0).percent(), 0);
        assert_eq!(v(2.4).percent(), 0);
        assert_eq!(v(2.5).percent(), 5);
        assert_eq!(v(77.0).percent(), 75);
        assert_eq!(v(98.0).percent(), 100);
        assert_eq!(v(250.0).percent(), 100);
    }
}
