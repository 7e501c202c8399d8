use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::sections::{is_section_empty, SectionMap};

/// Headings a bug report must fill in, in display order.
pub const BUG_FIELDS: &[&str] = &[
    "Bug Description",
    "Steps to Reproduce",
    "Expected vs Actual Behavior",
    "Environment",
];

/// Headings a feature request must fill in, in display order.
pub const FEATURE_FIELDS: &[&str] = &["What problem does this solve?", "Proposed solution"];

/// Title remainder left in place when the author didn't replace the template text.
pub const TITLE_PLACEHOLDER: &str = "<title>";

/// Shortest title text accepted once the `[BUG]`/`[FR]` prefix is removed.
pub const MIN_TITLE_CHARS: usize = 5;

const TITLE_PREFIXES: &[&str] = &["[bug]", "[fr]"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    Bug,
    Feature,
    Unknown,
}

impl IssueType {
    /// Required template headings; `Unknown` has no template.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            IssueType::Bug => BUG_FIELDS,
            IssueType::Feature => FEATURE_FIELDS,
            IssueType::Unknown => &[],
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::Bug => write!(f, "bug report"),
            IssueType::Feature => write!(f, "feature request"),
            IssueType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify from the title tag first, then labels. Both checks ignore case.
pub fn determine_issue_type(title: &str, labels: &[String]) -> IssueType {
    let title = title.to_lowercase();
    let has_label = |name: &str| labels.iter().any(|l| l.eq_ignore_ascii_case(name));

    if title.contains("[bug]") || has_label("bug") {
        IssueType::Bug
    } else if title.contains("[fr]") || has_label("enhancement") {
        IssueType::Feature
    } else {
        IssueType::Unknown
    }
}

/// Why a title was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleProblem {
    /// Nothing but `[BUG]` or `[FR]`
    BarePrefix,
    /// The prefix followed by the untouched template placeholder
    Placeholder,
    /// Fewer than [`MIN_TITLE_CHARS`] characters after the prefix
    TooShort,
}

impl fmt::Display for TitleProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleProblem::BarePrefix => write!(f, "title is only the type prefix"),
            TitleProblem::Placeholder => write!(f, "title still contains the template placeholder"),
            TitleProblem::TooShort => write!(
                f,
                "title needs at least {MIN_TITLE_CHARS} characters after the prefix"
            ),
        }
    }
}

/// Title text with leading whitespace and a leading `[BUG]`/`[FR]` tag removed.
fn title_remainder(title: &str) -> &str {
    let title = title.trim_start();
    for prefix in TITLE_PREFIXES {
        if let Some(head) = title.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return title[prefix.len()..].trim_start();
            }
        }
    }
    title
}

pub fn check_title(title: &str) -> Result<(), TitleProblem> {
    let trimmed = title.trim();
    if TITLE_PREFIXES.iter().any(|p| trimmed.eq_ignore_ascii_case(p)) {
        return Err(TitleProblem::BarePrefix);
    }

    let remainder = title_remainder(title);
    if remainder.trim().eq_ignore_ascii_case(TITLE_PLACEHOLDER) {
        return Err(TitleProblem::Placeholder);
    }
    if remainder.chars().count() < MIN_TITLE_CHARS {
        return Err(TitleProblem::TooShort);
    }
    Ok(())
}

static REVIEWED_CHECKBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*[-*+][ \t]*\[\s*x\s*\].*I have reviewed existing issues")
        .expect("reviewed checkbox regex")
});

/// True when the body has a ticked `- [x] I have reviewed existing issues` item.
/// Whitespace inside the brackets is tolerated.
pub fn has_reviewed_existing_issues(body: &str) -> bool {
    REVIEWED_CHECKBOX.is_match(body)
}

/// Outcome of field validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub complete: bool,
    /// Display bullets such as `- **Environment**`, in template order
    pub missing_fields: Vec<String>,
}

impl Verdict {
    pub fn from_missing(missing_fields: Vec<String>) -> Self {
        Self {
            complete: missing_fields.is_empty(),
            missing_fields,
        }
    }
}

pub fn display_field(name: &str) -> String {
    format!("- **{name}**")
}

/// Required headings that are absent or hold only template scaffolding.
pub fn missing_fields(issue_type: IssueType, sections: &SectionMap) -> Vec<String> {
    issue_type
        .required_fields()
        .iter()
        .filter(|field| sections.get(field).map_or(true, is_section_empty))
        .map(|field| display_field(field))
        .collect()
}
