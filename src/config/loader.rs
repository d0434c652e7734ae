use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

const LOCAL_CONFIG_NAME: &str = ".board-flow.toml";

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `.board-flow.toml` in the current Git repository (searched upwards)
/// 3. `$BOARD_FLOW_CONFIG` environment variable
/// 4. `$XDG_CONFIG_HOME/board-flow/config.toml`
/// 5. `~/.config/board-flow/config.toml`
///
/// If both a global and a repo-local config exist, the repo-local file wins
/// wholesale, except that a token set only in the global file is kept (tokens
/// rarely belong in a committed file).
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        return read_config(path);
    }

    let cwd = std::env::current_dir().context("reading current directory")?;
    let global_path = find_global_config();
    let local_path = find_repo_local_config(&cwd);

    match (global_path, local_path) {
        (Some(global), Some(local)) => {
            let global_cfg = read_config(&global)?;
            let local_cfg = read_config(&local)?;
            Ok(merge_configs(global_cfg, local_cfg))
        }
        (Some(path), None) | (None, Some(path)) => read_config(&path),
        (None, None) => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML from {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn merge_configs(global: AppConfig, mut local: AppConfig) -> AppConfig {
    if local.github.token.is_none() {
        local.github.token = global.github.token;
    }
    local
}

/// Walk up from `start` looking for `.board-flow.toml`, stopping at the git root.
pub(crate) fn find_repo_local_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(LOCAL_CONFIG_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn find_global_config() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BOARD_FLOW_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("board-flow/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let p = PathBuf::from(home).join(".config/board-flow/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_config_found_in_parent_below_git_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        std::fs::write(tmp.path().join(LOCAL_CONFIG_NAME), "").unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_repo_local_config(&nested).unwrap();
        assert_eq!(found, tmp.path().join(LOCAL_CONFIG_NAME));
    }

    #[test]
    fn search_stops_at_git_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(LOCAL_CONFIG_NAME), "").unwrap();
        let repo = tmp.path().join("repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(find_repo_local_config(&repo).is_none());
    }

    #[test]
    fn merge_keeps_global_token_when_local_has_none() {
        let mut global = AppConfig::default();
        global.github.token = Some("global-token".into());
        let mut local = AppConfig::default();
        local.github.repo = Some("acme/widgets".into());

        let merged = merge_configs(global, local);
        assert_eq!(merged.github.token.as_deref(), Some("global-token"));
        assert_eq!(merged.github.repo.as_deref(), Some("acme/widgets"));
    }
}
