use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::json;
use tracing::{debug, instrument};

use super::types::IssuePayload;
use super::{parse_repository, Issue, IssueTracker, TrackerError};
use crate::config::Config;

const USER_AGENT: &str = "repo-keeper";

/// Issue tracker backed by the GitHub REST API.
pub struct GitHubApi {
    client: Client,
    base: Url,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubApi {
    pub fn new(api_url: &str, owner: &str, repo: &str, token: &str) -> Result<Self, TrackerError> {
        let base = Url::parse(api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| TrackerError::InvalidApiUrl(api_url.to_string()))?;
        Ok(Self {
            client: Client::new(),
            base,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TrackerError> {
        let token = config
            .github
            .token
            .as_deref()
            .ok_or(TrackerError::MissingToken)?;
        let repository = config
            .github
            .repository
            .as_deref()
            .ok_or(TrackerError::MissingRepository)?;
        let (owner, repo) = parse_repository(repository)?;
        Self::new(config.api_url(), &owner, &repo, token)
    }

    /// `{base}/repos/{owner}/{repo}/issues/{number}/{extra...}`, each segment percent-encoded.
    fn issue_url(&self, number: u64, extra: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(["repos", self.owner.as_str(), self.repo.as_str(), "issues"]);
            segments.push(&number.to_string());
            segments.extend(extra);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, TrackerError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(TrackerError::Status { status, url, body })
    }
}

#[async_trait]
impl IssueTracker for GitHubApi {
    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn fetch(&self, number: u64) -> Result<Issue, TrackerError> {
        debug!("fetching issue from GitHub API");
        let url = self.issue_url(number, &[]);
        let payload = self
            .send(self.request(Method::GET, url))
            .await?
            .json::<IssuePayload>()
            .await?;
        let issue = payload.into_issue(number);
        debug!(title = %issue.title, labels = issue.labels.len(), "received issue");
        Ok(issue)
    }

    #[instrument(skip(self))]
    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let url = self.issue_url(number, &["labels"]);
        self.send(self.request(Method::POST, url).json(&json!({ "labels": [label] })))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        let url = self.issue_url(number, &["labels", label]);
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[instrument(skip(self, body))]
    async fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        let url = self.issue_url(number, &["comments"]);
        self.send(self.request(Method::POST, url).json(&json!({ "body": body })))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close(&self, number: u64) -> Result<(), TrackerError> {
        let url = self.issue_url(number, &[]);
        self.send(self.request(Method::PATCH, url).json(&json!({ "state": "closed" })))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> GitHubApi {
        GitHubApi::new("https://api.github.com", "ejbills", "DockDoor", "t0ken").unwrap()
    }

    #[test]
    fn test_issue_url() {
        assert_eq!(
            api().issue_url(42, &[]).as_str(),
            "https://api.github.com/repos/ejbills/DockDoor/issues/42"
        );
        assert_eq!(
            api().issue_url(42, &["comments"]).as_str(),
            "https://api.github.com/repos/ejbills/DockDoor/issues/42/comments"
        );
    }

    #[test]
    fn test_label_name_is_percent_encoded() {
        assert_eq!(
            api().issue_url(7, &["labels", "needs more info"]).as_str(),
            "https://api.github.com/repos/ejbills/DockDoor/issues/7/labels/needs%20more%20info"
        );
    }

    #[test]
    fn test_enterprise_base_keeps_prefix() {
        let api = GitHubApi::new("https://ghe.example.com/api/v3/", "o", "r", "t").unwrap();
        assert_eq!(
            api.issue_url(1, &[]).as_str(),
            "https://ghe.example.com/api/v3/repos/o/r/issues/1"
        );
    }

    #[test]
    fn test_rejects_non_base_api_url() {
        assert!(matches!(
            GitHubApi::new("mailto:octocat@github.com", "o", "r", "t"),
            Err(TrackerError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_from_config_requires_repository() {
        let mut config = Config::default();
        config.github.token = Some("t".to_string());
        assert!(matches!(
            GitHubApi::from_config(&config),
            Err(TrackerError::MissingRepository)
        ));
        config.github.repository = Some("nope".to_string());
        assert!(matches!(
            GitHubApi::from_config(&config),
            Err(TrackerError::InvalidRepository(_))
        ));
    }
}
