//! Rate-limit detection for GitHub API errors.
//!
//! GitHub signals rate limits through:
//! - HTTP 403 with "API rate limit exceeded" in the body
//! - HTTP 429 (secondary rate limit)
//! - GraphQL errors containing "rate limit"

/// Check whether an error message indicates a GitHub rate limit.
pub(crate) fn is_rate_limited(error: &anyhow::Error) -> bool {
    let msg = format!("{error:#}").to_lowercase();
    msg.contains("rate limit")
        || msg.contains("api rate limit exceeded")
        || msg.contains("secondary rate limit")
        || msg.contains("status code: 429")
}

/// Render an error for an `errors` list, with a hint when it is a rate limit.
pub fn describe_error(error: &anyhow::Error) -> String {
    let msg = format!("{error:#}");
    if !is_rate_limited(error) {
        return msg;
    }
    if msg.to_lowercase().contains("secondary rate limit") {
        format!("{msg} (secondary rate limit hit; wait a moment before re-running)")
    } else {
        format!("{msg} (API rate limit exceeded; re-run after the limit resets)")
    }
}
