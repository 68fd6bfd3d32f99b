//! Get-or-create page resolution with an in-run cache.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::error::PublishError;
use super::scanner::Namespace;
use crate::directory::{PageDirectory, RemotePage};

/// Where a resolved page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    /// Resolved earlier in this run.
    Cached,
    /// Already existed in the space.
    Found,
    /// Created by this call.
    Created,
}

/// Maps page titles to remote pages, creating missing ones.
///
/// Each title is looked up at most once per run. Nothing guards against a
/// concurrent run creating the same title between lookup and create.
pub struct PageResolver<'a> {
    directory: &'a dyn PageDirectory,
    space: &'a str,
    cache: HashMap<String, RemotePage>,
    created: HashSet<String>,
    root: Option<String>,
    namespace_resolved: bool,
}

impl<'a> PageResolver<'a> {
    /// Create a resolver with an empty cache.
    pub fn new(directory: &'a dyn PageDirectory, space: &'a str) -> Self {
        Self {
            directory,
            space,
            cache: HashMap::new(),
            created: HashSet::new(),
            root: None,
            namespace_resolved: false,
        }
    }

    /// Treat `title` as the page hosting the whole tree.
    #[must_use]
    pub fn with_root(mut self, title: Option<&str>) -> Self {
        self.root = title.map(str::to_owned);
        self
    }

    /// Resolve `title`, creating it under `ancestor_id` if it does not exist.
    ///
    /// An existing page is returned as found, even if it lives under a
    /// different ancestor.
    pub fn get_or_create(
        &mut self,
        title: &str,
        ancestor_id: Option<&str>,
    ) -> Result<(RemotePage, PageOrigin), PublishError> {
        if let Some(page) = self.cache.get(title) {
            debug!("Page '{}' resolved from cache ({})", title, page.id);
            return Ok((page.clone(), PageOrigin::Cached));
        }

        let found = self
            .directory
            .find_page(title, self.space)
            .map_err(|source| PublishError::RemoteLookup {
                operation: format!("find page '{title}'"),
                source,
            })?;

        let (page, origin) = if let Some(page) = found {
            (page, PageOrigin::Found)
        } else {
            let page = self
                .directory
                .create_page(title, self.space, ancestor_id)
                .map_err(|source| PublishError::RemoteWrite {
                    operation: format!("create page '{title}'"),
                    source,
                })?;
            info!("Created page '{}' ({})", title, page.id);
            self.created.insert(page.id.clone());
            (page, PageOrigin::Created)
        };

        self.cache.insert(title.to_owned(), page.clone());
        Ok((page, origin))
    }

    /// Resolve a namespace page and all of its ancestors, root-most first.
    ///
    /// # Errors
    ///
    /// A failure before any namespace page has been resolved in this run,
    /// or while resolving the root page, is wrapped in the fatal
    /// [`PublishError::Namespace`]. Later failures are wrapped in
    /// [`PublishError::NamespaceUnavailable`].
    pub fn ensure_namespace(&mut self, namespace: &Namespace) -> Result<RemotePage, PublishError> {
        let mut parent_id: Option<String> = None;
        for title in &namespace.ancestors {
            let (page, _) = self
                .get_or_create(title, parent_id.as_deref())
                .map_err(|source| self.namespace_error(namespace, title, source))?;
            parent_id = Some(page.id);
        }
        let (page, _) = self
            .get_or_create(&namespace.title, parent_id.as_deref())
            .map_err(|source| self.namespace_error(namespace, &namespace.title, source))?;
        self.namespace_resolved = true;
        Ok(page)
    }

    fn namespace_error(
        &self,
        namespace: &Namespace,
        failed: &str,
        source: PublishError,
    ) -> PublishError {
        let source = Box::new(source);
        let namespace = namespace.title.clone();
        if !self.namespace_resolved || self.root.as_deref() == Some(failed) {
            PublishError::Namespace { namespace, source }
        } else {
            PublishError::NamespaceUnavailable { namespace, source }
        }
    }

    /// Replace the cached copy of a page after it changed.
    pub fn remember(&mut self, page: RemotePage) {
        self.cache.insert(page.title.clone(), page);
    }

    /// Whether the page was created during this run.
    pub fn created_this_run(&self, page_id: &str) -> bool {
        self.created.contains(page_id)
    }

    /// Number of pages created during this run.
    pub fn created_count(&self) -> usize {
        self.created.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDirectory;
    use pretty_assertions::assert_eq;

    fn namespace(ancestors: &[&str], title: &str) -> Namespace {
        Namespace {
            title: title.to_owned(),
            ancestors: ancestors.iter().map(|&a| a.to_owned()).collect(),
        }
    }

    #[test]
    fn test_get_or_create_creates_once() {
        let directory = MockDirectory::new();
        let mut resolver = PageResolver::new(&directory, "DOCS");

        let (first, origin) = resolver.get_or_create("guide", None).unwrap();
        assert_eq!(origin, PageOrigin::Created);
        let (second, origin) = resolver.get_or_create("guide", None).unwrap();
        assert_eq!(origin, PageOrigin::Cached);
        assert_eq!(first, second);

        let calls = directory.calls();
        assert_eq!(calls.find, 1);
        assert_eq!(calls.create, 1);
        assert!(resolver.created_this_run(&first.id));
    }

    #[test]
    fn test_get_or_create_finds_existing() {
        let directory = MockDirectory::new().with_page("DOCS", "guide", 5, Some("fp"));
        let mut resolver = PageResolver::new(&directory, "DOCS");

        let (page, origin) = resolver.get_or_create("guide", None).unwrap();
        assert_eq!(origin, PageOrigin::Found);
        assert_eq!(page.version, 5);
        assert_eq!(directory.calls().create, 0);
        assert_eq!(resolver.created_count(), 0);
    }

    #[test]
    fn test_ensure_namespace_builds_chain() {
        let directory = MockDirectory::new();
        let mut resolver = PageResolver::new(&directory, "DOCS");

        let leaf = resolver
            .ensure_namespace(&namespace(&["guide"], "advanced"))
            .unwrap();
        let guide = directory.page("guide").unwrap().page;

        assert_eq!(leaf.title, "advanced");
        assert_eq!(leaf.ancestor_id, Some(guide.id.clone()));
        assert_eq!(guide.ancestor_id, None);

        resolver
            .ensure_namespace(&namespace(&["guide"], "advanced"))
            .unwrap();
        assert_eq!(directory.calls().create, 2);
        assert_eq!(directory.calls().find, 2);
    }

    #[test]
    fn test_namespace_failure_is_wrapped() {
        let directory = MockDirectory::new().with_failing_lookup("guide");
        let mut resolver = PageResolver::new(&directory, "DOCS");

        let err = resolver
            .ensure_namespace(&namespace(&[], "guide"))
            .unwrap_err();
        assert!(err.is_fatal());
        match err {
            PublishError::Namespace { namespace, source } => {
                assert_eq!(namespace, "guide");
                assert!(matches!(*source, PublishError::RemoteLookup { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_later_namespace_failure_is_not_fatal() {
        let directory = MockDirectory::new().with_failing_lookup("b");
        let mut resolver = PageResolver::new(&directory, "DOCS");

        resolver.ensure_namespace(&namespace(&[], "a")).unwrap();
        let err = resolver
            .ensure_namespace(&namespace(&[], "b"))
            .unwrap_err();

        assert!(!err.is_fatal());
        assert!(matches!(
            err,
            PublishError::NamespaceUnavailable { ref namespace, .. } if namespace == "b"
        ));
    }

    #[test]
    fn test_root_failure_stays_fatal() {
        let directory = MockDirectory::new().with_failing_lookup("Engineering Docs");
        let mut resolver = PageResolver::new(&directory, "DOCS").with_root(Some("Engineering Docs"));
        resolver.ensure_namespace(&namespace(&[], "other")).unwrap();

        let err = resolver
            .ensure_namespace(&namespace(&["Engineering Docs"], "guide"))
            .unwrap_err();

        assert!(err.is_fatal());
    }
}
