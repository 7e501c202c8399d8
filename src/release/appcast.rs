use std::path::Path;
use tracing::{debug, info, instrument};

use super::{read, write, ReleaseError};

const ITEM_OPEN: &str = "<item>";
const ITEM_CLOSE: &str = "</item>";
const BETA_MARKER: &str = "beta";

/// What pruning did to the newest appcast item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneOutcome {
    /// The item was the new version's beta build and has been dropped.
    Removed { feed: String },
    /// The item is the new version but not a beta; kept.
    NotBeta,
    /// The item is some other version; kept.
    VersionMismatch,
}

/// Inclusive line range of the first `<item>` ... `</item>` block.
fn first_item(lines: &[&str]) -> Result<(usize, usize), ReleaseError> {
    let open = lines
        .iter()
        .position(|l| l.contains(ITEM_OPEN))
        .ok_or(ReleaseError::ItemNotFound)?;
    let close = lines
        .iter()
        .position(|l| l.contains(ITEM_CLOSE))
        .ok_or(ReleaseError::ItemNotFound)?;
    if close < open {
        return Err(ReleaseError::MalformedItem {
            open: open + 1,
            close: close + 1,
        });
    }
    Ok((open, close))
}

/// Whether `version` appears anywhere in the feed.
pub fn contains_version(feed: &str, version: &str) -> bool {
    feed.contains(version)
}

/// Drop the newest item if it is a beta build of `new_version`.
///
/// This is a text edit: every line outside the item is kept byte for byte.
pub fn prune_feed(feed: &str, new_version: &str) -> Result<PruneOutcome, ReleaseError> {
    if new_version.is_empty() {
        return Err(ReleaseError::EmptyVersion);
    }

    let lines: Vec<&str> = feed.split_inclusive('\n').collect();
    let (open, close) = first_item(&lines)?;
    let item = lines[open..=close].join(" ");

    if !item.contains(new_version) {
        return Ok(PruneOutcome::VersionMismatch);
    }
    if !item.contains(BETA_MARKER) {
        return Ok(PruneOutcome::NotBeta);
    }

    let feed = lines[..open]
        .iter()
        .chain(&lines[close + 1..])
        .copied()
        .collect();
    Ok(PruneOutcome::Removed { feed })
}

/// Read the version handoff file, trimmed.
pub fn read_version(path: &Path) -> Result<String, ReleaseError> {
    let version = read(path)?.trim().to_string();
    if version.is_empty() {
        return Err(ReleaseError::EmptyVersion);
    }
    Ok(version)
}

/// Prune the appcast at `appcast` against the version stored in `version_file`.
#[instrument]
pub fn prune_file(appcast: &Path, version_file: &Path) -> Result<PruneOutcome, ReleaseError> {
    let new_version = read_version(version_file)?;
    let feed = read(appcast)?;
    debug!(
        version = %new_version,
        anywhere = contains_version(&feed, &new_version),
        "checking newest appcast item"
    );

    let outcome = prune_feed(&feed, &new_version)?;
    if let PruneOutcome::Removed { feed } = &outcome {
        write(appcast, feed)?;
        info!(version = %new_version, "removed beta item from appcast");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPCAST: &str = include_str!("../../tests/fixtures/appcast.xml");

    #[test]
    fn test_beta_item_for_new_version_is_removed() {
        let PruneOutcome::Removed { feed } = prune_feed(APPCAST, "1.4.0").unwrap() else {
            panic!("expected the beta item to be removed");
        };
        assert!(!feed.contains("1.4.0"));
        assert!(feed.contains("<title>1.3.2</title>"));
        assert_eq!(feed.matches(ITEM_OPEN).count(), 1);
        assert!(feed.starts_with("<?xml"));
        assert!(feed.ends_with("</rss>\n"));
    }

    #[test]
    fn test_non_beta_item_is_kept() {
        let feed = APPCAST.replace("<sparkle:channel>beta</sparkle:channel>\n", "");
        assert_eq!(prune_feed(&feed, "1.4.0").unwrap(), PruneOutcome::NotBeta);
    }

    #[test]
    fn test_other_version_is_kept() {
        assert_eq!(
            prune_feed(APPCAST, "1.5.0").unwrap(),
            PruneOutcome::VersionMismatch
        );
        // only the newest item counts, even if an older one matches
        assert_eq!(
            prune_feed(APPCAST, "1.3.2").unwrap(),
            PruneOutcome::VersionMismatch
        );
    }

    #[test]
    fn test_empty_version_rejected() {
        assert!(matches!(
            prune_feed(APPCAST, ""),
            Err(ReleaseError::EmptyVersion)
        ));
    }

    #[test]
    fn test_missing_markers() {
        assert!(matches!(
            prune_feed("<rss></rss>\n", "1.0"),
            Err(ReleaseError::ItemNotFound)
        ));
        assert!(matches!(
            prune_feed("<item>\n<title>1.0</title>\n", "1.0"),
            Err(ReleaseError::ItemNotFound)
        ));
        assert!(matches!(
            prune_feed("</item>\n<item>\n", "1.0"),
            Err(ReleaseError::MalformedItem { open: 2, close: 1 })
        ));
    }

    #[test]
    fn test_version_split_across_item_lines_does_not_match() {
        // item lines are joined with a space, so "1.\n0" never reads as "1.0"
        let feed = "<item>\nbeta 1.\n0\n</item>\n";
        assert_eq!(prune_feed(feed, "1.0").unwrap(), PruneOutcome::VersionMismatch);
    }

    #[test]
    fn test_contains_version() {
        assert!(contains_version(APPCAST, "1.3.2"));
        assert!(!contains_version(APPCAST, "9.9.9"));
    }

    #[test]
    fn test_prune_file_rewrites_only_on_removal() {
        let dir = tempfile::tempdir().unwrap();
        let appcast = dir.path().join("appcast.xml");
        let version = dir.path().join("new_version");
        std::fs::write(&appcast, APPCAST).unwrap();

        std::fs::write(&version, "1.5.0\n").unwrap();
        assert_eq!(
            prune_file(&appcast, &version).unwrap(),
            PruneOutcome::VersionMismatch
        );
        assert_eq!(std::fs::read_to_string(&appcast).unwrap(), APPCAST);

        std::fs::write(&version, "1.4.0\n").unwrap();
        assert!(matches!(
            prune_file(&appcast, &version).unwrap(),
            PruneOutcome::Removed { .. }
        ));
        assert!(!std::fs::read_to_string(&appcast).unwrap().contains("1.4.0"));
    }

    #[test]
    fn test_blank_version_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("new_version");
        std::fs::write(&version, "  \n").unwrap();
        assert!(matches!(
            read_version(&version),
            Err(ReleaseError::EmptyVersion)
        ));
    }
}
