use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_PATH: &str = "data.json";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables consulted for each setting.
pub const ENV_OWNER: &str = "DROPBOARD_GITHUB_OWNER";
pub const ENV_REPO: &str = "DROPBOARD_GITHUB_REPO";
pub const ENV_PATH: &str = "DROPBOARD_GITHUB_FILE_PATH";
pub const ENV_BRANCH: &str = "DROPBOARD_GITHUB_BRANCH";
pub const ENV_TOKEN: &str = "DROPBOARD_GITHUB_TOKEN";
pub const ENV_API_URL: &str = "DROPBOARD_GITHUB_API_URL";

/// Settings gathered from rc files, the environment, and the command line.
///
/// Every source produces one of these; [`ConfigFlags::union`] layers them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub api_url: Option<String>,
    /// Never written to rc files.
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub edit_in_place: bool,
    pub create_missing: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: options from `other` win, booleans accumulate.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            owner: other.owner.clone().or_else(|| self.owner.clone()),
            repo: other.repo.clone().or_else(|| self.repo.clone()),
            path: other.path.clone().or_else(|| self.path.clone()),
            branch: other.branch.clone().or_else(|| self.branch.clone()),
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            token: other.token.clone().or_else(|| self.token.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            edit_in_place: self.edit_in_place || other.edit_in_place,
            create_missing: self.create_missing || other.create_missing,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Read settings from environment variables through `lookup`.
    ///
    /// Empty values count as unset.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            owner: get(ENV_OWNER),
            repo: get(ENV_REPO),
            path: get(ENV_PATH),
            branch: get(ENV_BRANCH),
            api_url: get(ENV_API_URL),
            token: get(ENV_TOKEN),
            ..Self::default()
        }
    }
}

/// A required setting is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing {name}: pass --{flag} or set {env}")]
    Missing {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Fully resolved location of the remote document.
///
/// Built once at startup and handed to the store client.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub token: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Apply defaults and check required settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when owner, repo, or token is unset,
    /// and [`ConfigError::Invalid`] for malformed values.
    pub fn resolve(flags: &ConfigFlags) -> Result<Self, ConfigError> {
        let owner = required(flags.owner.as_ref(), "owner", "owner", ENV_OWNER)?;
        let repo = required(flags.repo.as_ref(), "repository", "repo", ENV_REPO)?;
        let token = required(flags.token.as_ref(), "access token", "token", ENV_TOKEN)?;

        for (name, value) in [("owner", &owner), ("repository", &repo)] {
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid {
                    name,
                    reason: format!("{value:?} must be a single name"),
                });
            }
        }

        let path = flags
            .path
            .clone()
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        if path.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid {
                name: "path",
                reason: "file path is empty".to_string(),
            });
        }

        let timeout_secs = flags.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            owner,
            repo,
            path,
            branch: flags
                .branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token,
            api_url: flags
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout_secs,
        })
    }

    /// `owner/repo:path@branch`, for display and logs.
    pub fn location(&self) -> String {
        format!("{}/{}:{}@{}", self.owner, self.repo, self.path, self.branch)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("location", &self.location())
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn required(
    value: Option<&String>,
    name: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { name, flag, env })
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("dropboard").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("dropboard")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("dropboard").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("dropboard")
                .join("config");
        }
    }

    PathBuf::from(".dropboardrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".dropboardrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    let mut flags = parse_flag_tokens(&tokens);
    // Tokens belong in the environment, not in a file that may be shared.
    flags.token = None;
    Ok(flags)
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# dropboard defaults (saved with --save)".to_string());
    let options = [
        ("--owner", &flags.owner),
        ("--repo", &flags.repo),
        ("--path", &flags.path),
        ("--branch", &flags.branch),
        ("--api-url", &flags.api_url),
    ];
    for (flag, value) in options {
        if let Some(value) = value {
            lines.push(format!("{flag} {value}"));
        }
    }
    if let Some(secs) = flags.timeout_secs {
        lines.push(format!("--timeout {secs}"));
    }
    if flags.edit_in_place {
        lines.push("--edit-in-place".to_string());
    }
    if flags.create_missing {
        lines.push("--create-missing".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list (command line or rc file).
///
/// Both `--flag value` and `--flag=value` forms are accepted; anything else
/// is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--edit-in-place" => flags.edit_in_place = true,
            "--create-missing" => flags.create_missing = true,
            _ => {
                let (name, inline) = match token.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (token, None),
                };
                if takes_value(name) {
                    let value = inline.or_else(|| {
                        let next = tokens.get(i + 1).cloned();
                        if next.is_some() {
                            i += 1;
                        }
                        next
                    });
                    if let Some(value) = value {
                        apply_value(&mut flags, name, value);
                    }
                }
            }
        }
        i += 1;
    }
    flags
}

fn takes_value(name: &str) -> bool {
    matches!(
        name,
        "--owner"
            | "--repo"
            | "--path"
            | "--branch"
            | "--api-url"
            | "--token"
            | "--timeout"
            | "--log-file"
    )
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: String) {
    match name {
        "--owner" => flags.owner = Some(value),
        "--repo" => flags.repo = Some(value),
        "--path" => flags.path = Some(value),
        "--branch" => flags.branch = Some(value),
        "--api-url" => flags.api_url = Some(value),
        "--token" => flags.token = Some(value),
        "--timeout" => match value.parse() {
            Ok(secs) => flags.timeout_secs = Some(secs),
            Err(err) => warn!(value = %value, error = %err, "ignoring invalid --timeout"),
        },
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}
