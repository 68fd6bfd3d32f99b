//! Publisher implementation.

use std::path::Path;

use mdsync_config::{NamespacePages, PublishConfig};
use mdsync_renderer::ContentRenderer;
use tracing::{info, warn};

use super::assets::rewrite_assets;
use super::attachments::AttachmentSync;
use super::error::PublishError;
use super::resolver::PageResolver;
use super::result::{DocumentFailure, DocumentOutcome, PageStatus, PublishReport};
use super::scanner::{DocumentNode, ScanEntry, Scanner};
use crate::directory::{PageDirectory, PageUpdate, RemotePage};
use crate::fingerprint::ContentFingerprint;

/// Publishes a docs tree into one Confluence space.
pub struct Publisher<'a> {
    directory: &'a dyn PageDirectory,
    renderer: &'a dyn ContentRenderer,
    config: &'a PublishConfig,
    space: &'a str,
}

impl<'a> Publisher<'a> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(
        directory: &'a dyn PageDirectory,
        renderer: &'a dyn ContentRenderer,
        config: &'a PublishConfig,
        space: &'a str,
    ) -> Self {
        Self {
            directory,
            renderer,
            config,
            space,
        }
    }

    /// Publish every document under the configured docs directory.
    ///
    /// The tree is scanned completely before the first remote call. Documents
    /// are then published in scan order; a failing document is recorded in
    /// the report and the run continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails, or if the parent page or the
    /// first directory page of the run cannot be resolved. See
    /// [`PublishError::is_fatal`].
    pub fn publish(&self) -> Result<PublishReport, PublishError> {
        let source_dir = self.config.source_dir();
        let scan = Scanner::new(self.config).scan(&source_dir)?;
        info!(
            "Publishing {} documents from {} to space {}",
            scan.documents().count(),
            source_dir.display(),
            self.space
        );

        let mut resolver = PageResolver::new(self.directory, self.space)
            .with_root(self.config.parent_page.as_deref());
        let mut report = PublishReport {
            skipped: scan.skipped,
            ..PublishReport::default()
        };

        for entry in scan.entries {
            match entry {
                ScanEntry::Namespace(namespace) => {
                    if self.config.namespace_pages == NamespacePages::Eager {
                        match resolver.ensure_namespace(&namespace) {
                            Ok(_) => {}
                            Err(e) if e.is_fatal() => return Err(e),
                            Err(e) => warn!("{}", e),
                        }
                    }
                }
                ScanEntry::Document(doc) => match self.publish_document(&mut resolver, &doc) {
                    Ok(outcome) => report.outcomes.push(outcome),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!("Failed to publish {}: {}", doc.path.display(), e);
                        report.failures.push(DocumentFailure {
                            path: doc.relative_path.clone(),
                            error: e,
                        });
                    }
                },
            }
        }

        report.pages_created = resolver.created_count();
        Ok(report)
    }

    fn publish_document(
        &self,
        resolver: &mut PageResolver<'_>,
        doc: &DocumentNode,
    ) -> Result<DocumentOutcome, PublishError> {
        if let Some(first) = &doc.duplicate_of {
            return Err(PublishError::DuplicateTitle {
                title: doc.title.clone(),
                first: first.clone(),
                second: doc.relative_path.clone(),
            });
        }
        let body = doc.read_body()?;
        let rewritten = rewrite_assets(&body)?;
        let markdown = self.with_source_notice(doc, &rewritten.body);
        let markup = self.renderer.render(&markdown);
        let fingerprint = ContentFingerprint::of(&markup);

        let ancestor = match &doc.namespace {
            Some(namespace) => Some(resolver.ensure_namespace(namespace)?),
            None => None,
        };
        let (page, _) =
            resolver.get_or_create(&doc.title, ancestor.as_ref().map(|p| p.id.as_str()))?;

        let attachments =
            AttachmentSync::new(self.directory).sync(&page.id, doc.directory(), &rewritten.assets)?;

        let written = self.sync_page_body(resolver, &page, markup, &fingerprint)?;
        let status = match written {
            Some(_) if resolver.created_this_run(&page.id) => PageStatus::Created,
            Some(_) => PageStatus::Updated,
            None => PageStatus::Unchanged,
        };

        Ok(DocumentOutcome {
            path: doc.relative_path.clone(),
            title: doc.title.clone(),
            url: written.and_then(|p| p.web_url).or(page.web_url),
            page_id: page.id,
            status,
            attachments,
        })
    }

    /// Write `markup` unless the page already carries its fingerprint.
    ///
    /// Returns the updated page, or `None` when nothing was written.
    fn sync_page_body(
        &self,
        resolver: &mut PageResolver<'_>,
        page: &RemotePage,
        markup: String,
        fingerprint: &ContentFingerprint,
    ) -> Result<Option<RemotePage>, PublishError> {
        let current = self
            .directory
            .get_page(&page.id)
            .map_err(|source| PublishError::RemoteLookup {
                operation: format!("get page {}", page.id),
                source,
            })?;

        if fingerprint.matches(current.fingerprint.as_deref()) {
            info!("Skipping {} - no update needed", current.display_url());
            return Ok(None);
        }

        let update = PageUpdate {
            id: current.id.clone(),
            title: current.title.clone(),
            version: current.version + 1,
            body: markup,
            comment: fingerprint.to_string(),
        };
        match self.directory.update_page(&update) {
            Ok(updated) => {
                info!(
                    "Updated {} to version {}",
                    updated.display_url(),
                    updated.version
                );
                resolver.remember(updated.clone());
                Ok(Some(updated))
            }
            Err(e) if e.is_version_conflict() => Err(PublishError::StaleVersion {
                page_id: update.id,
                version: update.version,
            }),
            Err(source) => Err(PublishError::RemoteWrite {
                operation: format!("update page '{}'", update.title),
                source,
            }),
        }
    }

    /// Prepend a notice linking to the document's source, when configured.
    fn with_source_notice(&self, doc: &DocumentNode, body: &str) -> String {
        let Some(source_url) = &self.config.source_url else {
            return body.to_owned();
        };
        let link = format!(
            "{}/blob/{}/{}",
            source_url.trim_end_matches('/'),
            self.config.source_branch,
            url_path(&self.config.path.join(&doc.relative_path))
        );
        format!(
            "> Do not edit this page directly, it is generated from [source]({link}). \
             Submit a merge request instead!\n\n{body}"
        )
    }
}

/// Forward-slash path without `.` components.
fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
