//! `mdsync publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsync_config::{CliSettings, Config, NamespacePages, UnsupportedFiles};
use mdsync_confluence::{
    ConfluenceClient, DryRunDirectory, PageDirectory, PageStatus, PlannedWrite, PublishReport,
    Publisher,
};
use mdsync_renderer::ConfluenceRenderer;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to configuration file (default: auto-discover mdsync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Confluence server URL.
    #[arg(long)]
    confluence_url: Option<String>,

    /// Confluence space key.
    #[arg(long)]
    pub(crate) confluence_space: Option<String>,

    /// Username for basic authentication.
    #[arg(long, env = "CONFLUENCE_USERNAME", hide_env_values = true)]
    username: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "CONFLUENCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Personal access token (used instead of username and password).
    #[arg(long, env = "CONFLUENCE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository root.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Docs directory inside the root.
    #[arg(long)]
    path: Option<PathBuf>,

    /// Show what would be written without changing Confluence.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Skip unsupported files with a warning instead of aborting.
    #[arg(long, conflicts_with = "strict")]
    pub(crate) lenient: bool,

    /// Abort before publishing if the tree contains unsupported files.
    #[arg(long)]
    strict: bool,

    /// Create directory pages even for directories without documents.
    #[arg(long)]
    eager_namespaces: bool,

    /// Prefix prepended to every page title.
    #[arg(long)]
    title_prefix: Option<String>,

    /// Existing page that hosts the whole tree.
    #[arg(long)]
    parent_page: Option<String>,

    /// Repository web URL for the "generated from source" notice.
    #[arg(long, env = "CI_PROJECT_URL")]
    source_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the run halts, or any
    /// document fails to publish.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let renderer = ConfluenceRenderer::new();

        let report = if self.dry_run {
            dry_run(&config, &renderer, &output)?
        } else {
            let settings = config.require_confluence()?;
            let client = ConfluenceClient::new(&settings.base_url, &settings.auth);
            output.info(&format!(
                "Publishing {} to {} (space {})...",
                config.publish_resolved.source_dir().display(),
                settings.base_url,
                settings.space
            ));
            Publisher::new(&client, &renderer, &config.publish_resolved, &settings.space)
                .publish()?
        };

        print_report(&output, &report);

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::Incomplete(report.failures.len()))
        }
    }

    fn cli_settings(&self) -> CliSettings {
        let unsupported_files = if self.lenient {
            Some(UnsupportedFiles::Lenient)
        } else if self.strict {
            Some(UnsupportedFiles::Strict)
        } else {
            None
        };

        CliSettings {
            base_url: self.confluence_url.clone(),
            space: self.confluence_space.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            root: self.root.clone(),
            path: self.path.clone(),
            title_prefix: self.title_prefix.clone(),
            parent_page: self.parent_page.clone(),
            unsupported_files,
            namespace_pages: self.eager_namespaces.then_some(NamespacePages::Eager),
            source_url: self.source_url.clone(),
        }
    }
}

/// Plan the run against Confluence when reachable settings exist, offline otherwise.
fn dry_run(
    config: &Config,
    renderer: &ConfluenceRenderer,
    output: &Output,
) -> Result<PublishReport, CliError> {
    match config.require_confluence() {
        Ok(settings) => {
            let client = ConfluenceClient::new(&settings.base_url, &settings.auth);
            let directory = DryRunDirectory::new(&client);
            let report = plan(&directory, renderer, config, &settings.space)?;
            print_planned_writes(output, &directory.planned_writes());
            Ok(report)
        }
        Err(e) => {
            output.warning(&format!("{e}"));
            output.warning("Planning offline: every page is treated as new.");
            let directory = DryRunDirectory::offline();
            let space = config.confluence.space.as_deref().unwrap_or_default();
            let report = plan(&directory, renderer, config, space)?;
            print_planned_writes(output, &directory.planned_writes());
            Ok(report)
        }
    }
}

fn plan(
    directory: &dyn PageDirectory,
    renderer: &ConfluenceRenderer,
    config: &Config,
    space: &str,
) -> Result<PublishReport, CliError> {
    Ok(Publisher::new(directory, renderer, &config.publish_resolved, space).publish()?)
}

fn print_planned_writes(output: &Output, writes: &[PlannedWrite]) {
    output.highlight("\n[DRY RUN] No changes made.");
    if writes.is_empty() {
        output.success("Nothing to write, Confluence is up to date.");
        return;
    }

    output.info(&format!("\nPlanned writes ({}):", writes.len()));
    for write in writes {
        output.info(&format!("  -> {write}"));
        if let PlannedWrite::UpdatePage { body, .. } = write {
            output.separator();
            output.markup(body);
            output.separator();
        }
    }
}

fn print_report(output: &Output, report: &PublishReport) {
    output.info("");
    for outcome in &report.outcomes {
        let target = outcome.url.as_deref().unwrap_or(&outcome.page_id);
        let line = format!("{} -> {}", outcome.path.display(), target);
        match outcome.status {
            PageStatus::Created => output.success(&format!("  + {line} (created)")),
            PageStatus::Updated => output.success(&format!("  ~ {line} (updated)")),
            PageStatus::Unchanged => output.muted(&format!("  = {line} (unchanged)")),
        }
        if outcome.attachments.uploaded > 0 {
            output.info(&format!(
                "      attachments uploaded: {}",
                outcome.attachments.uploaded
            ));
        }
    }

    for path in &report.skipped {
        output.warning(&format!("  ! skipped {}", path.display()));
    }
    for failure in &report.failures {
        output.error(&format!("  x {}: {}", failure.path.display(), failure.error));
    }

    output.info(&format!(
        "\n{} created, {} updated, {} unchanged, {} failed; {} attachment(s) uploaded",
        report.count(PageStatus::Created),
        report.count(PageStatus::Updated),
        report.count(PageStatus::Unchanged),
        report.failures.len(),
        report.attachments_uploaded()
    ));
}
