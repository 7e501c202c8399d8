use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".repo-keeper.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .repo-keeper.toml.
/// All fields are optional — the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub triage: TriageConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

/// Which tracker implementation talks to GitHub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// GitHub REST API over HTTPS
    #[default]
    Api,
    /// The `gh` command-line tool
    Gh,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// "owner/repo". If None, falls back to GITHUB_REPOSITORY env var.
    pub repository: Option<String>,
    /// REST endpoint root, override for GitHub Enterprise.
    pub api_url: Option<String>,
    #[serde(default)]
    pub backend: Backend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub complete_label: String,
    pub incomplete_label: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            complete_label: "ready for review".to_string(),
            incomplete_label: "needs more info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Changelog with `# <version> - <title>` headers
    pub notes: PathBuf,
    pub appcast: PathBuf,
    pub html_output: PathBuf,
    /// Directory holding the `title`, `latest_changes` and `new_version` files
    pub handoff_dir: PathBuf,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            notes: PathBuf::from("Release_Notes.md"),
            appcast: PathBuf::from("docs/Support/appcast.xml"),
            html_output: PathBuf::from("Release/latest_changes.html"),
            handoff_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or .repo-keeper.toml in the current
    /// directory. Returns default config if the file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }
        if config.github.repository.is_none() {
            if let Ok(repository) = std::env::var("GITHUB_REPOSITORY") {
                config.github.repository = Some(repository);
            }
        }

        Ok(config)
    }

    /// Load from a specific path without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }
}
