use colored::Colorize;
use std::path::Path;

use crate::release::appcast::PruneOutcome;
use crate::release::notes::ChangelogEntry;
use crate::triage::Decision;

/// Plain-text summary of a triage decision, one line per entry.
pub fn triage_summary(decision: &Decision) -> Vec<String> {
    match decision {
        Decision::CloseAsDuplicate => vec![
            "Issue closed: the \"I have reviewed existing issues\" checkbox is not checked".to_string(),
        ],
        Decision::UnknownType => {
            vec!["Could not determine issue type (bug or feature request)".to_string()]
        }
        Decision::Mark {
            title_problem: Some(problem),
            ..
        } => vec![format!("Issue is incomplete - invalid title: {problem}")],
        Decision::Mark { verdict, .. } if verdict.complete => {
            vec!["Issue is complete".to_string()]
        }
        Decision::Mark { verdict, .. } => vec![format!(
            "Issue is incomplete - missing: {}",
            verdict.missing_fields.join(", ")
        )],
    }
}

/// Print the triage decision for issue `number` to stdout.
pub fn print_triage(number: u64, decision: &Decision) {
    let header = format!("Issue #{number}:").bold();
    for line in triage_summary(decision) {
        let line = match decision {
            Decision::CloseAsDuplicate => line.red(),
            Decision::UnknownType => line.dimmed(),
            Decision::Mark { verdict, .. } if verdict.complete => line.green(),
            Decision::Mark { .. } => line.yellow(),
        };
        println!("{header} {line}");
    }
}

/// Title, version and changes, one after another, for the CI log.
pub fn print_release_notes(entry: &ChangelogEntry) {
    println!("{}", entry.title);
    println!("{}", entry.version);
    println!("{}", entry.changes());
}

pub fn print_rendered(output: &Path) {
    println!("{} {}", "Wrote".green(), output.display());
}

pub fn prune_summary(outcome: &PruneOutcome) -> Vec<&'static str> {
    match outcome {
        PruneOutcome::Removed { .. } => vec![
            "Last item in appcast.xml contains new_version",
            "removed last item in appcast.xml",
        ],
        PruneOutcome::NotBeta => vec!["Last item in appcast.xml contains new_version"],
        PruneOutcome::VersionMismatch => vec!["last item is not new_version"],
    }
}

pub fn print_prune(outcome: &PruneOutcome) {
    for line in prune_summary(outcome) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triage::{IssueType, TitleProblem, Verdict};

    #[test]
    fn test_incomplete_summary_lists_fields() {
        let decision = Decision::Mark {
            issue_type: IssueType::Bug,
            title_problem: None,
            verdict: Verdict::from_missing(vec![
                "- **Steps to Reproduce**".to_string(),
                "- **Environment**".to_string(),
            ]),
        };
        assert_eq!(
            triage_summary(&decision),
            vec!["Issue is incomplete - missing: - **Steps to Reproduce**, - **Environment**"]
        );
    }

    #[test]
    fn test_title_problem_summary() {
        let decision = Decision::Mark {
            issue_type: IssueType::Feature,
            title_problem: Some(TitleProblem::BarePrefix),
            verdict: Verdict::from_missing(vec!["- **Title**".to_string()]),
        };
        assert_eq!(
            triage_summary(&decision),
            vec!["Issue is incomplete - invalid title: title is only the type prefix"]
        );
    }

    #[test]
    fn test_complete_and_terminal_summaries() {
        let complete = Decision::Mark {
            issue_type: IssueType::Bug,
            title_problem: None,
            verdict: Verdict::from_missing(vec![]),
        };
        assert_eq!(triage_summary(&complete), vec!["Issue is complete"]);
        assert!(triage_summary(&Decision::UnknownType)[0].starts_with("Could not determine"));
        assert!(triage_summary(&Decision::CloseAsDuplicate)[0].starts_with("Issue closed"));
    }

    #[test]
    fn test_prune_summaries() {
        assert_eq!(
            prune_summary(&PruneOutcome::Removed { feed: String::new() }).len(),
            2
        );
        assert_eq!(
            prune_summary(&PruneOutcome::VersionMismatch),
            vec!["last item is not new_version"]
        );
    }
}
