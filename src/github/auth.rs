use crate::config::ConfigError;

/// Shortest token accepted by `setup`.
pub const MIN_TOKEN_LENGTH: usize = 20;

/// Environment variables consulted for a token, in order.
const TOKEN_ENV_VARS: [&str; 3] = ["PERSONAL_ACCESS_TOKEN", "GH_TOKEN", "GITHUB_TOKEN"];

/// Fragments that only appear in template/example token values.
const PLACEHOLDER_MARKERS: [&str; 5] = ["your_", "your-", "placeholder", "<token", "changeme"];

/// Prefixes GitHub puts in front of the random part of a token.
const TOKEN_PREFIXES: [&str; 6] = ["github_pat_", "ghp_", "gho_", "ghu_", "ghs_", "ghr_"];

/// Resolve a GitHub personal access token.
///
/// Priority:
/// 1. explicit value (`--token`)
/// 2. `PERSONAL_ACCESS_TOKEN`, `GH_TOKEN`, `GITHUB_TOKEN` environment variables
///    (a `.env` file is loaded into the environment at startup)
/// 3. `[github] token` from the config file
pub fn resolve_token(explicit: Option<&str>, config_token: Option<&str>) -> Option<String> {
    resolve_token_with(explicit, config_token, |name| std::env::var(name).ok())
}

fn resolve_token_with(
    explicit: Option<&str>,
    config_token: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_empty = |s: &str| {
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_owned())
    };

    if let Some(token) = explicit.and_then(non_empty) {
        return Some(token);
    }
    for name in TOKEN_ENV_VARS {
        if let Some(token) = env(name).as_deref().and_then(non_empty) {
            tracing::debug!("using token from ${name}");
            return Some(token);
        }
    }
    config_token.and_then(non_empty)
}

/// A token whose random part is a single run of `x` or `X`, as in
/// `ghp_xxxxxxxx`.
fn is_masked(token: &str) -> bool {
    let rest = TOKEN_PREFIXES
        .iter()
        .find_map(|p| token.strip_prefix(p))
        .unwrap_or(token);
    !rest.is_empty() && (rest.bytes().all(|b| b == b'x') || rest.bytes().all(|b| b == b'X'))
}

/// Reject missing, placeholder, and too-short tokens.
pub fn validate_token(token: Option<&str>) -> Result<&str, ConfigError> {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let Some(token) = token else {
        return Err(ConfigError::MissingToken);
    };
    let lower = token.to_ascii_lowercase();
    if is_masked(token) || PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m)) {
        return Err(ConfigError::PlaceholderToken);
    }
    let len = token.chars().count();
    if len < MIN_TOKEN_LENGTH {
        return Err(ConfigError::TokenTooShort {
            len,
            min: MIN_TOKEN_LENGTH,
        });
    }
    Ok(token)
}
