use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::types::IssuePayload;
use super::{Issue, IssueTracker, TrackerError};

/// Issue tracker that drives the GitHub CLI (`gh`).
///
/// Authentication is whatever `gh` is already logged in with (or `GH_TOKEN`).
pub struct GhCli {
    program: String,
    repository: Option<String>,
}

impl GhCli {
    pub fn new(repository: Option<String>) -> Self {
        Self {
            program: "gh".to_string(),
            repository,
        }
    }

    /// Full argument list for one `gh issue` invocation.
    fn args(&self, subcommand: &str, number: u64, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "issue".to_string(),
            subcommand.to_string(),
            number.to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        if let Some(repository) = &self.repository {
            args.push("--repo".to_string());
            args.push(repository.clone());
        }
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<String, TrackerError> {
        debug!(program = %self.program, args = ?args, "running tracker command");
        let output = Command::new(&self.program).args(&args).output().await?;
        if !output.status.success() {
            return Err(TrackerError::Command {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl IssueTracker for GhCli {
    #[instrument(skip(self))]
    async fn fetch(&self, number: u64) -> Result<Issue, TrackerError> {
        let stdout = self
            .run(self.args("view", number, &["--json", "title,body,labels"]))
            .await?;
        let payload: IssuePayload = serde_json::from_str(&stdout)?;
        Ok(payload.into_issue(number))
    }

    #[instrument(skip(self))]
    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        self.run(self.args("edit", number, &["--add-label", label]))
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        self.run(self.args("edit", number, &["--remove-label", label]))
            .await
            .map(drop)
    }

    #[instrument(skip(self, body))]
    async fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        self.run(self.args("comment", number, &["--body", body]))
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn close(&self, number: u64) -> Result<(), TrackerError> {
        self.run(self.args("close", number, &[])).await.map(drop)
    }
}
