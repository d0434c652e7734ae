use std::path::{Path, PathBuf};
use std::process::Command;

use crate::types::RepoRef;

/// Run `git <args>` in `path` and return trimmed stdout, `None` on any failure
/// or empty output.
fn git_output(path: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let out = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    if out.is_empty() { None } else { Some(out) }
}

/// Detect `owner/repo` from the git remote of the directory at `path`.
///
/// `origin` wins; otherwise the first listed remote is used.
pub fn detect_repo(path: &Path) -> Option<RepoRef> {
    let url = git_output(path, &["remote", "get-url", "origin"]).or_else(|| {
        let remotes = git_output(path, &["remote"])?;
        let first = remotes.lines().next()?.trim().to_owned();
        git_output(path, &["remote", "get-url", &first])
    })?;
    parse_remote_url(&url)
}

/// Top-level directory of the working copy containing `path`.
pub fn repository_root(path: &Path) -> Option<PathBuf> {
    git_output(path, &["rev-parse", "--show-toplevel"]).map(PathBuf::from)
}

/// Parse `owner/repo` from an SSH, `ssh://` or HTTPS remote URL.
fn parse_remote_url(url: &str) -> Option<RepoRef> {
    let slug = if let Some(rest) = url.strip_prefix("git@") {
        // git@github.com:owner/repo.git
        rest.split_once(':')?.1
    } else if let Some((scheme, rest)) = url.split_once("://") {
        if !matches!(scheme, "https" | "http" | "ssh") {
            return None;
        }
        // host (possibly user@host:port) then the path
        rest.split_once('/')?.1
    } else {
        return None;
    };

    let slug = slug.trim_end_matches('/');
    let slug = slug.strip_suffix(".git").unwrap_or(slug);
    RepoRef::from_full_name(slug)
}
