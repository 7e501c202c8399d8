use pulldown_cmark::{html, Parser};
use std::path::Path;
use tracing::{debug, instrument};

use super::{ensure_parent, read, write, ReleaseError, LATEST_CHANGES_FILE, TITLE_FILE};

/// Render the release title and its change list as one HTML fragment.
pub fn render(title: &str, changes: &str) -> String {
    let markdown = format!("# {title}\n\n{changes}");
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(&markdown));
    out
}

/// Read `title` and `latest_changes` from `handoff_dir`, write HTML to `output`.
#[instrument]
pub fn render_files(handoff_dir: &Path, output: &Path) -> Result<String, ReleaseError> {
    let title = read(&handoff_dir.join(TITLE_FILE))?;
    let changes = read(&handoff_dir.join(LATEST_CHANGES_FILE))?;

    let rendered = render(&title, &changes);
    debug!(bytes = rendered.len(), "rendered release notes");

    ensure_parent(output)?;
    write(output, &rendered)?;
    Ok(rendered)
}
