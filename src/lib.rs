// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod agent;
pub mod color;
pub mod config;
pub mod git;
pub mod github;
pub mod types;
pub mod usecases;
pub mod util;
