// github module: GitHub port, octocrab adapter, and test stub

pub mod auth;
mod client;
pub(crate) mod graphql;
mod interface;
mod issues;
mod labels;
mod projects;
pub mod rate_limit;
pub mod stub;

pub use client::GitHubClient;
pub use interface::GitHubApi;
pub use stub::{StubCall, StubGitHub};
