use async_trait::async_trait;
use tracing::info;

use super::{Issue, IssueTracker, TrackerError};

/// Reads through to the wrapped tracker but only logs mutations.
pub struct DryRun<T> {
    inner: T,
}

impl<T> DryRun<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: IssueTracker> IssueTracker for DryRun<T> {
    async fn fetch(&self, number: u64) -> Result<Issue, TrackerError> {
        self.inner.fetch(number).await
    }

    async fn add_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        info!(issue = number, label, "dry run: would add label");
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TrackerError> {
        info!(issue = number, label, "dry run: would remove label");
        Ok(())
    }

    async fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        info!(issue = number, chars = body.len(), "dry run: would comment");
        Ok(())
    }

    async fn close(&self, number: u64) -> Result<(), TrackerError> {
        info!(issue = number, "dry run: would close");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::tests::FakeTracker;

    #[tokio::test]
    async fn test_dry_run_fetches_but_never_mutates() {
        let dry = DryRun::new(FakeTracker::new("[BUG] crash", "body", &["bug"]));
        let issue = dry.fetch(1).await.unwrap();
        assert_eq!(issue.title, "[BUG] crash");

        dry.add_label(1, "needs more info").await.unwrap();
        dry.remove_label(1, "bug").await.unwrap();
        dry.comment(1, "hello").await.unwrap();
        dry.close(1).await.unwrap();

        assert!(dry.inner.calls().is_empty());
        assert_eq!(dry.inner.labels(), vec!["bug"]);
    }
}
