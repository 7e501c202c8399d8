pub mod rules;
pub mod sections;

pub use rules::{IssueType, TitleProblem, Verdict};

use tracing::{debug, info, instrument};

use crate::config::TriageConfig;
use crate::tracker::{reconcile_labels, IssueTracker, TrackerError};
use rules::{check_title, determine_issue_type, display_field, has_reviewed_existing_issues, missing_fields};
use sections::parse_sections;

/// Posted before closing an issue whose author didn't tick the duplicate-review box.
pub const DUPLICATE_REVIEW_COMMENT: &str = "Thanks for opening an issue! This issue is being closed because the \
\"I have reviewed existing issues\" checkbox was not checked.\n\n\
Please search the existing issues to make sure this hasn't already been reported, \
then open a new issue using the template and tick the checkbox.";

/// What triage concluded about an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Duplicate-review checkbox not ticked: comment and close.
    CloseAsDuplicate,
    /// Neither a bug report nor a feature request: leave untouched.
    UnknownType,
    /// Template applies: swap completeness labels per the verdict.
    Mark {
        issue_type: IssueType,
        title_problem: Option<TitleProblem>,
        verdict: Verdict,
    },
}

/// Classify an issue without touching the tracker.
///
/// Gates run in order: duplicate-review checkbox, issue type, title, then
/// required fields. A bad title makes the issue incomplete on its own and the
/// field check is skipped.
pub fn assess(title: &str, body: &str, labels: &[String]) -> Decision {
    if !has_reviewed_existing_issues(body) {
        return Decision::CloseAsDuplicate;
    }

    let issue_type = determine_issue_type(title, labels);
    if issue_type == IssueType::Unknown {
        return Decision::UnknownType;
    }

    if let Err(problem) = check_title(title) {
        return Decision::Mark {
            issue_type,
            title_problem: Some(problem),
            verdict: Verdict::from_missing(vec![display_field("Title")]),
        };
    }

    let sections = parse_sections(body);
    if sections.is_empty() {
        debug!("issue body has no headings");
    } else {
        debug!(count = sections.len(), headings = ?sections.headings().collect::<Vec<_>>(), "parsed issue body");
    }
    Decision::Mark {
        issue_type,
        title_problem: None,
        verdict: Verdict::from_missing(missing_fields(issue_type, &sections)),
    }
}

/// Fetch an issue, assess it, and apply the resulting side effects.
#[instrument(skip(tracker, labels))]
pub async fn run(
    tracker: &dyn IssueTracker,
    number: u64,
    labels: &TriageConfig,
) -> Result<Decision, TrackerError> {
    let issue = tracker.fetch(number).await?;
    let decision = assess(&issue.title, &issue.body, &issue.labels);

    match &decision {
        Decision::CloseAsDuplicate => {
            info!("duplicate-review checkbox not ticked, closing");
            tracker.comment(number, DUPLICATE_REVIEW_COMMENT).await?;
            tracker.close(number).await?;
        }
        Decision::UnknownType => {
            info!("could not determine issue type, leaving issue untouched");
        }
        Decision::Mark {
            issue_type,
            verdict,
            ..
        } => {
            info!(%issue_type, complete = verdict.complete, missing = verdict.missing_fields.len(), "validated issue");
            if verdict.complete {
                reconcile_labels(tracker, number, &labels.complete_label, &labels.incomplete_label).await?;
            } else {
                reconcile_labels(tracker, number, &labels.incomplete_label, &labels.complete_label).await?;
            }
        }
    }

    Ok(decision)
}
