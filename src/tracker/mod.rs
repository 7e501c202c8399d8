pub mod dry_run;
pub mod gh;
pub mod github;
pub mod types;

pub use dry_run::DryRun;
pub use gh::GhCli;
pub use github::GitHubApi;
pub use types::Issue;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{Backend, Config};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("GitHub API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("`gh {args}` failed: {stderr}")]
    Command { args: String, stderr: String },

    #[error("Failed to decode tracker response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to run tracker command: {0}")]
    Io(#[from] std::io::Error),

    #[error("GitHub token not found in config or environment")]
    MissingToken,

    #[error("Repository not configured (set github.repository or GITHUB_REPOSITORY)")]
    MissingRepository,

    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    #[error("Invalid GitHub API URL: {0}")]
    InvalidApiUrl(String),
}

/// The operations triage needs from an issue tracker.
/// Implementations must be Send + Sync so they can live behind a `Box<dyn _>`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the current title, body and labels of an issue.
    async fn fetch(&self, number: u64) -> Result<Issue, TrackerError>;

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError>;

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError>;

    async fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError>;

    async fn close(&self, number: u64) -> Result<(), TrackerError>;
}

/// Lets a boxed tracker be wrapped, e.g. by [`DryRun`].
#[async_trait]
impl<T: IssueTracker + ?Sized> IssueTracker for Box<T> {
    async fn fetch(&self, number: u64) -> Result<Issue, TrackerError> {
        (**self).fetch(number).await
    }

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        (**self).add_label(number, label).await
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        (**self).remove_label(number, label).await
    }

    async fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        (**self).comment(number, body).await
    }

    async fn close(&self, number: u64) -> Result<(), TrackerError> {
        (**self).close(number).await
    }
}

/// Bring the issue's labels to the desired state: `wanted` present, `unwanted` absent.
///
/// Labels are re-fetched so only the calls that change something are issued.
#[instrument(skip(tracker))]
pub async fn reconcile_labels(
    tracker: &dyn IssueTracker,
    number: u64,
    wanted: &str,
    unwanted: &str,
) -> Result<(), TrackerError> {
    let current = tracker.fetch(number).await?;
    debug!(labels = ?current.labels, "current labels");

    if current.has_label(unwanted) {
        tracker.remove_label(number, unwanted).await?;
    }
    if !current.has_label(wanted) {
        tracker.add_label(number, wanted).await?;
    }
    Ok(())
}

/// Split "owner/repo" into its two parts.
pub fn parse_repository(repository: &str) -> Result<(String, String), TrackerError> {
    match repository.trim().split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(TrackerError::InvalidRepository(repository.to_string())),
    }
}

/// Build the tracker selected by `backend`, wrapped in [`DryRun`] when requested.
pub fn from_config(
    config: &Config,
    backend: Backend,
    dry_run: bool,
) -> Result<Box<dyn IssueTracker>, TrackerError> {
    let tracker: Box<dyn IssueTracker> = match backend {
        Backend::Api => Box::new(GitHubApi::from_config(config)?),
        Backend::Gh => Box::new(GhCli::new(config.github.repository.clone())),
    };
    if dry_run {
        Ok(Box::new(DryRun::new(tracker)))
    } else {
        Ok(tracker)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A mutation recorded by [`FakeTracker`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        AddLabel(String),
        RemoveLabel(String),
        Comment(String),
        Close,
    }

    /// In-memory tracker: applies label mutations to its issue and records every call.
    pub struct FakeTracker {
        pub issue: Mutex<Issue>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeTracker {
        pub fn new(title: &str, body: &str, labels: &[&str]) -> Self {
            Self {
                issue: Mutex::new(Issue {
                    number: 1,
                    title: title.to_string(),
                    body: body.to_string(),
                    labels: labels.iter().map(|l| l.to_string()).collect(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn labels(&self) -> Vec<String> {
            self.issue.lock().unwrap().labels.clone()
        }
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn fetch(&self, _number: u64) -> Result<Issue, TrackerError> {
            Ok(self.issue.lock().unwrap().clone())
        }

        async fn add_label(&self, _number: u64, label: &str) -> Result<(), TrackerError> {
            self.issue.lock().unwrap().labels.push(label.to_string());
            self.calls.lock().unwrap().push(Call::AddLabel(label.to_string()));
            Ok(())
        }

        async fn remove_label(&self, _number: u64, label: &str) -> Result<(), TrackerError> {
            self.issue.lock().unwrap().labels.retain(|l| l != label);
            self.calls.lock().unwrap().push(Call::RemoveLabel(label.to_string()));
            Ok(())
        }

        async fn comment(&self, _number: u64, body: &str) -> Result<(), TrackerError> {
            self.calls.lock().unwrap().push(Call::Comment(body.to_string()));
            Ok(())
        }

        async fn close(&self, _number: u64) -> Result<(), TrackerError> {
            self.calls.lock().unwrap().push(Call::Close);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reconcile_swaps_labels() {
        let tracker = FakeTracker::new("t", "", &["bug", "ready for review"]);
        reconcile_labels(&tracker, 1, "needs more info", "ready for review")
            .await
            .unwrap();
        assert_eq!(
            tracker.calls(),
            vec![
                Call::RemoveLabel("ready for review".to_string()),
                Call::AddLabel("needs more info".to_string()),
            ]
        );
        assert_eq!(tracker.labels(), vec!["bug", "needs more info"]);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let tracker = FakeTracker::new("t", "", &["needs more info"]);
        reconcile_labels(&tracker, 1, "needs more info", "ready for review")
            .await
            .unwrap();
        reconcile_labels(&tracker, 1, "needs more info", "ready for review")
            .await
            .unwrap();
        assert!(tracker.calls().is_empty());
    }

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("ejbills/DockDoor").unwrap(),
            ("ejbills".to_string(), "DockDoor".to_string())
        );
        assert!(parse_repository("DockDoor").is_err());
        assert!(parse_repository("/DockDoor").is_err());
        assert!(parse_repository("a/b/c").is_err());
    }

    #[test]
    fn test_from_config_api_requires_token() {
        let config = Config::default();
        let result = from_config(&config, Backend::Api, false);
        assert!(matches!(result, Err(TrackerError::MissingToken)));
    }

    #[test]
    fn test_from_config_gh_needs_nothing() {
        let config = Config::default();
        assert!(from_config(&config, Backend::Gh, true).is_ok());
    }
}
