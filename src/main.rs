mod config;
mod release;
mod report;
mod tracker;
mod triage;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, Config};

/// Repository housekeeping: triage GitHub issues against their templates and
/// prepare release notes, HTML and appcast updates for a release.
#[derive(Parser, Debug)]
#[command(name = "repo-keeper", version, about)]
struct Cli {
    /// Config file (defaults to .repo-keeper.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an issue against the bug / feature request template and label it
    ValidateIssue {
        /// Issue number (42 or #42) or its GitHub URL (https://github.com/owner/repo/issues/42)
        issue: Option<String>,

        /// Fetch the issue but only log label, comment and close actions
        #[arg(long)]
        dry_run: bool,

        /// Talk to GitHub through the REST API or the `gh` CLI
        #[arg(long, value_enum)]
        backend: Option<Backend>,
    },

    /// Extract the newest entry of the changelog into handoff files
    ReleaseNotes {
        /// Changelog path
        #[arg(long)]
        notes: Option<PathBuf>,

        /// Directory to write new_version, latest_changes and title into
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Render the title and latest changes handoff files to HTML
    RenderHtml {
        /// Directory holding the title and latest_changes files
        #[arg(long)]
        dir: Option<PathBuf>,

        /// HTML output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the newest appcast item if it is a beta of the new version
    PruneAppcast {
        /// Appcast feed path
        #[arg(long)]
        appcast: Option<PathBuf>,

        /// File holding the new version (defaults to new_version in the handoff dir)
        #[arg(long)]
        version_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let load_config = || {
        info!("loading configuration");
        Config::load(cli.config.as_deref())
    };

    match cli.command {
        Command::ValidateIssue {
            issue,
            dry_run,
            backend,
        } => {
            let number = issue_number(issue.as_deref())?;
            let config = load_config()?;
            let _span = info_span!("validate_issue", issue = number).entered();

            let backend = backend.unwrap_or(config.github.backend);
            debug!(?backend, dry_run, "selected tracker");
            let tracker = tracker::from_config(&config, backend, dry_run)?;

            let decision = triage::run(tracker.as_ref(), number, &config.triage).await?;
            report::print_triage(number, &decision);
        }
        Command::ReleaseNotes { notes, out_dir } => {
            let config = load_config()?;
            let notes = notes.unwrap_or(config.release.notes);
            let out_dir = out_dir.unwrap_or(config.release.handoff_dir);
            info!(notes = %notes.display(), "extracting release notes");
            let entry = release::notes::extract(&notes, &out_dir)?;
            report::print_release_notes(&entry);
        }
        Command::RenderHtml { dir, output } => {
            let config = load_config()?;
            let dir = dir.unwrap_or(config.release.handoff_dir);
            let output = output.unwrap_or(config.release.html_output);
            info!(output = %output.display(), "rendering release notes html");
            release::html::render_files(&dir, &output)?;
            report::print_rendered(&output);
        }
        Command::PruneAppcast {
            appcast,
            version_file,
        } => {
            let config = load_config()?;
            let appcast = appcast.unwrap_or(config.release.appcast);
            let version_file = version_file.unwrap_or_else(|| {
                config
                    .release
                    .handoff_dir
                    .join(release::NEW_VERSION_FILE)
            });
            info!(appcast = %appcast.display(), "pruning appcast");
            let outcome = release::appcast::prune_file(&appcast, &version_file)?;
            report::print_prune(&outcome);
        }
    }

    info!("done");
    Ok(())
}

const VALIDATE_ISSUE_USAGE: &str = "Usage: repo-keeper validate-issue <issue_number>";

/// The `validate-issue` argument, or the usage line when it is missing.
fn issue_number(raw: Option<&str>) -> Result<u64, String> {
    raw.ok_or_else(|| VALIDATE_ISSUE_USAGE.to_string())
        .and_then(parse_issue_number)
}

/// Accept `42`, `#42`, or an issue URL ending in `/issues/42`.
fn parse_issue_number(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let number = match trimmed.rsplit_once("/issues/") {
        Some((_, tail)) => tail,
        None => trimmed.trim_start_matches('#'),
    };
    number
        .parse::<u64>()
        .map_err(|_| format!("Invalid issue number: {raw:?}"))
}
