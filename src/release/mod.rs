pub mod appcast;
pub mod html;
pub mod notes;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Handoff file holding the version string of the newest changelog entry.
pub const NEW_VERSION_FILE: &str = "new_version";
/// Handoff file holding the newest entry's bullet lines.
pub const LATEST_CHANGES_FILE: &str = "latest_changes";
/// Handoff file holding the newest entry's title.
pub const TITLE_FILE: &str = "title";

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Changelog must start with '# <version> - <title>', found {0:?}")]
    MissingHeader(String),

    #[error("Changelog header {0:?} has no ' - ' between version and title")]
    MalformedHeader(String),

    #[error("No <item> ... </item> block found in appcast")]
    ItemNotFound,

    #[error("Appcast closes an item on line {close} before the first <item> on line {open}")]
    MalformedItem { open: usize, close: usize },

    #[error("New version is empty; refusing to match it against the appcast")]
    EmptyVersion,
}

pub(crate) fn read(path: &Path) -> Result<String, ReleaseError> {
    fs::read_to_string(path).map_err(|source| ReleaseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write(path: &Path, contents: &str) -> Result<(), ReleaseError> {
    fs::write(path, contents).map_err(|source| ReleaseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ReleaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ReleaseError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
