use std::path::Path;
use tracing::{debug, instrument};

use super::{read, write, ReleaseError, LATEST_CHANGES_FILE, NEW_VERSION_FILE, TITLE_FILE};

const HEADER_SEPARATOR: &str = " - ";

/// The newest entry at the head of the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub version: String,
    pub title: String,
    /// `*` lines under the header, trimmed
    pub bullets: Vec<String>,
    /// Version of the next header down, if the changelog has one
    pub previous_version: Option<String>,
}

impl ChangelogEntry {
    /// Bullet lines, each terminated by a newline.
    pub fn changes(&self) -> String {
        self.bullets.iter().map(|b| format!("{b}\n")).collect()
    }
}

/// Parse `# <version> - <title>`. The title keeps any later ` - `.
fn parse_header(line: &str) -> Result<(String, String), ReleaseError> {
    let header = line.trim();
    let rest = header
        .strip_prefix("# ")
        .ok_or_else(|| ReleaseError::MissingHeader(header.to_string()))?;
    let (version, title) = rest
        .split_once(HEADER_SEPARATOR)
        .ok_or_else(|| ReleaseError::MalformedHeader(header.to_string()))?;
    Ok((version.trim().to_string(), title.trim().to_string()))
}

/// Version part of a later header; lenient because nothing depends on it.
fn header_version(line: &str) -> String {
    let head = line.split(HEADER_SEPARATOR).next().unwrap_or(line);
    head.trim_start_matches('#').trim().to_string()
}

/// Extract the newest entry from a changelog.
///
/// Collects `*` bullets after the first header until the next `#` line;
/// anything else in between is skipped.
pub fn parse_changelog(text: &str) -> Result<ChangelogEntry, ReleaseError> {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    let (version, title) = parse_header(first)?;

    let mut bullets = Vec::new();
    let mut previous_version = None;
    for line in lines {
        let line = line.trim();
        if line.starts_with('*') {
            bullets.push(line.to_string());
        } else if line.starts_with('#') {
            previous_version = Some(header_version(line));
            break;
        }
    }

    Ok(ChangelogEntry {
        version,
        title,
        bullets,
        previous_version,
    })
}

/// Read the changelog at `notes` and write the three handoff files into `out_dir`.
#[instrument]
pub fn extract(notes: &Path, out_dir: &Path) -> Result<ChangelogEntry, ReleaseError> {
    let entry = parse_changelog(&read(notes)?)?;
    debug!(
        version = %entry.version,
        previous = ?entry.previous_version,
        bullets = entry.bullets.len(),
        "parsed changelog"
    );

    write(&out_dir.join(NEW_VERSION_FILE), &entry.version)?;
    write(&out_dir.join(LATEST_CHANGES_FILE), &entry.changes())?;
    write(&out_dir.join(TITLE_FILE), &entry.title)?;
    Ok(entry)
}
