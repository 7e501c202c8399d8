use serde::Deserialize;

/// An issue as seen by the triage pipeline.
/// Built from either the REST response or `gh issue view --json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue number (e.g., 42)
    pub number: u64,
    pub title: String,
    /// Markdown body; an issue created without a body has an empty string here
    pub body: String,
    /// Label names in the order the tracker returned them
    pub labels: Vec<String>,
}

impl Issue {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelPayload {
    pub name: String,
}

/// Wire shape shared by the REST issue endpoint and `gh issue view --json title,body,labels`.
#[derive(Debug, Deserialize)]
pub(crate) struct IssuePayload {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<LabelPayload>,
}

impl IssuePayload {
    pub fn into_issue(self, number: u64) -> Issue {
        Issue {
            number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}
