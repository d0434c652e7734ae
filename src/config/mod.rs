// config module: `.board-flow.toml` types, discovery, and token resolution

pub mod loader;
pub mod types;

use thiserror::Error;

/// Configuration problems that stop the bot before any use case runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no personal access token found. Pass --token, set PERSONAL_ACCESS_TOKEN \
         (a .env file works), or set [github] token in .board-flow.toml"
    )]
    MissingToken,

    #[error("the personal access token looks like a placeholder value")]
    PlaceholderToken,

    #[error("the personal access token is too short ({len} characters, need at least {min})")]
    TokenTooShort { len: usize, min: usize },

    #[error(
        "could not determine the repository. Pass --repo owner/name, set [github] repo, \
         or run inside a clone with a GitHub remote"
    )]
    MissingRemote,

    #[error("invalid repository \"{0}\", expected owner/name")]
    InvalidRepo(String),
}
