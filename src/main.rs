use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use board_flow::agent::OpenCodeClient;
use board_flow::config::ConfigError;
use board_flow::config::loader;
use board_flow::config::types::AppConfig;
use board_flow::github::auth::resolve_token;
use board_flow::github::{GitHubApi, GitHubClient};
use board_flow::types::{ActionResult, Execution, ProjectDetail, RepoRef, all_succeeded};
use board_flow::usecases::{
    CheckProgress, DetectPotentialProblems, Do, FailureFlag, InitialSetup, IssuePipeline,
    PullRequestPipeline, RecommendSteps, Think, UpdatePullRequestDescription, UseCase,
};

#[derive(Parser)]
#[command(name = "board-flow", version, about = "GitHub repository automation bot")]
struct Cli {
    /// Path to config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    debug_file: Option<PathBuf>,

    /// GitHub personal access token (overrides environment and config).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Repository as `owner/name` (defaults to the git remote).
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent a question, answering on the issue when one is given.
    Think {
        question: String,
        #[arg(long)]
        issue: Option<u64>,
    },
    /// Hand an instruction to the agent.
    Do {
        instruction: String,
        #[arg(long)]
        issue: Option<u64>,
        /// Continue an existing agent session.
        #[arg(long)]
        session: Option<String>,
    },
    /// Estimate the progress of an issue and label it.
    CheckProgress { issue: u64 },
    /// Post implementation steps on an issue.
    RecommendSteps { issue: u64 },
    /// Review an issue or pull request for likely problems.
    DetectPotentialProblems {
        number: u64,
        /// Treat `number` as a pull request.
        #[arg(long)]
        pull_request: bool,
    },
    /// Rewrite a pull request description with the agent.
    UpdatePullRequestDescription { number: u64 },
    /// Create labels, issue types and `.github` templates.
    Setup {
        /// Working copy to write `.github` into (defaults to the git root).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Run the issue automations.
    Issue { number: u64 },
    /// Run the pull-request automations.
    PullRequest { number: u64 },
}

fn init_tracing(debug: bool, debug_file: Option<&Path>) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if let Some(path) = debug_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
    Ok(())
}

/// `--repo`, then `[github] repo`, then the git remote of the working directory.
fn resolve_repo(cli_repo: Option<&str>, config: &AppConfig) -> Result<RepoRef, ConfigError> {
    if let Some(slug) = cli_repo.or(config.github.repo.as_deref()) {
        return RepoRef::from_full_name(slug).ok_or_else(|| ConfigError::InvalidRepo(slug.to_owned()));
    }
    std::env::current_dir()
        .ok()
        .as_deref()
        .and_then(board_flow::git::detect_repo)
        .ok_or(ConfigError::MissingRemote)
}

/// Resolve the configured boards, skipping the ones that cannot be read.
async fn resolve_projects(api: &dyn GitHubApi, config: &AppConfig) -> Vec<ProjectDetail> {
    let mut projects = Vec::new();
    for board in &config.projects.boards {
        match api.get_project(board).await {
            Ok(project) => projects.push(project),
            Err(err) => {
                tracing::warn!(owner = %board.owner, number = board.number, "skipping board: {err:#}");
            }
        }
    }
    projects
}

async fn owner_is_organization(api: &dyn GitHubApi, repo: &RepoRef) -> bool {
    api.is_organization(&repo.owner).await.unwrap_or_else(|err| {
        tracing::warn!(owner = %repo.owner, "could not look up owner kind: {err:#}");
        false
    })
}

async fn with_issue(api: &dyn GitHubApi, execution: Execution, number: u64) -> Result<Execution> {
    let issue = api.get_issue(&execution.repo, number).await?;
    Ok(execution.with_issue(&issue))
}

async fn with_pull_request(
    api: &dyn GitHubApi,
    execution: Execution,
    number: u64,
) -> Result<Execution> {
    let pr = api.get_pull_request(&execution.repo, number).await?;
    Ok(execution.with_pull_request(&pr))
}

fn print_results(results: &[ActionResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    for result in results {
        let mark = match (result.is_success(), result.is_executed()) {
            (false, _) => "✗",
            (true, true) => "✓",
            (true, false) => "-",
        };
        println!("{mark} {}", result.id());
        for step in result.steps() {
            for line in step.lines() {
                println!("    {line}");
            }
        }
        for error in result.errors() {
            println!("    error: {error}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.debug, cli.debug_file.as_deref())?;

    // Install the rustls CryptoProvider before any TLS client is constructed.
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("CryptoProvider already installed");
    }

    let config = loader::load_config(cli.config.as_deref())?;
    let repo = resolve_repo(cli.repo.as_deref(), &config)?;
    let token = resolve_token(cli.token.as_deref(), config.github.token.as_deref());

    // `setup` reports a missing token itself, every other command needs one
    // up front.
    let token = match (&cli.command, token) {
        (_, Some(token)) => token,
        (Commands::Setup { .. }, None) => String::new(),
        (_, None) => return Err(ConfigError::MissingToken.into()),
    };

    let api = GitHubClient::new(&token)?;
    let agent = OpenCodeClient::new(&config.ai.server_url);
    let flag = FailureFlag::new();
    let execution = Execution::new(repo, token, &config);

    tracing::info!(repo = %execution.repo, "board-flow starting");

    let results = match cli.command {
        Commands::Think { question, issue } => {
            let execution = match issue {
                Some(n) => with_issue(&api, execution, n).await?,
                None => execution,
            };
            Think::new(&api, &agent, question).invoke(&execution).await
        }
        Commands::Do {
            instruction,
            issue,
            session,
        } => {
            let execution = match issue {
                Some(n) => with_issue(&api, execution, n).await?,
                None => execution,
            };
            Do::new(&agent, instruction)
                .with_session(session)
                .invoke(&execution)
                .await
        }
        Commands::CheckProgress { issue } => {
            let execution = with_issue(&api, execution, issue).await?;
            CheckProgress::new(&api, &agent).invoke(&execution).await
        }
        Commands::RecommendSteps { issue } => {
            let execution = with_issue(&api, execution, issue).await?;
            RecommendSteps::new(&api, &agent).invoke(&execution).await
        }
        Commands::DetectPotentialProblems {
            number,
            pull_request,
        } => {
            let execution = if pull_request {
                with_pull_request(&api, execution, number).await?
            } else {
                with_issue(&api, execution, number).await?
            };
            DetectPotentialProblems::new(&api, &agent)
                .invoke(&execution)
                .await
        }
        Commands::UpdatePullRequestDescription { number } => {
            let execution = with_pull_request(&api, execution, number).await?;
            UpdatePullRequestDescription::new(&api, &agent)
                .invoke(&execution)
                .await?
        }
        Commands::Setup { path } => {
            let root = match path {
                Some(path) => path,
                None => {
                    let cwd = std::env::current_dir().context("reading current directory")?;
                    board_flow::git::repository_root(&cwd).unwrap_or(cwd)
                }
            };
            InitialSetup::new(&api, root).invoke(&execution).await
        }
        Commands::Issue { number } => {
            let is_org = owner_is_organization(&api, &execution.repo).await;
            let projects = resolve_projects(&api, &config).await;
            let execution = with_issue(&api, execution, number)
                .await?
                .with_owner_is_organization(is_org)
                .with_projects(projects);
            IssuePipeline::new(&api, &flag).invoke(&execution).await
        }
        Commands::PullRequest { number } => {
            let projects = resolve_projects(&api, &config).await;
            let execution = with_pull_request(&api, execution, number)
                .await?
                .with_projects(projects);
            PullRequestPipeline::new(&api, &flag).invoke(&execution).await
        }
    };

    print_results(&results, cli.json)?;

    if all_succeeded(&results) && !flag.is_set() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
